//! Scope check for a single user.

use haus_auth::UserDirectory;

use crate::cli::CheckArgs;
use crate::output::OutputFormat;
use crate::store::OpenStore;

/// Run the `check` command. Returns whether the scope is held.
pub async fn run(
    store: &OpenStore,
    args: &CheckArgs,
    format: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
    let users = UserDirectory::new(store.store.clone());
    let user = users
        .get_by_username(&args.username)
        .await?
        .ok_or_else(|| format!("No such user: {}", args.username))?;
    let granted = users.authorize(&user, &args.scope);

    match format {
        OutputFormat::Human => {
            let verdict = if granted { "granted" } else { "denied" };
            println!("{} {}: {verdict}", user.username, args.scope);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "username": user.username,
                "scope": args.scope,
                "granted": granted,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(granted)
}
