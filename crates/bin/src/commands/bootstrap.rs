//! Default user bootstrap.

use haus_auth::{AuthConfig, UserDirectory};

use crate::output::OutputFormat;
use crate::store::OpenStore;

/// Run the `bootstrap` command
pub async fn run(
    store: &OpenStore,
    config: &AuthConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let users = UserDirectory::new(store.store.clone());
    let created = users.ensure_default_user(&config.users.default).await?;
    if created.is_some() {
        store.persist().await?;
    }

    match format {
        OutputFormat::Human => match &created {
            Some(user) => println!("Created default user {} ({})", user.username, user.id),
            None => println!("Nothing to do."),
        },
        OutputFormat::Json => {
            let value = serde_json::json!({
                "created": created.as_ref().map(|u| u.redacted()),
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
