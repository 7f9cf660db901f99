//! User management commands.

use haus_auth::{UserDirectory, UserEdit};

use super::validate_scope;
use crate::cli::{UserCreateArgs, UserDeleteArgs, UserGrantArgs};
use crate::output::{OutputFormat, print_table};
use crate::store::OpenStore;

/// Run the `user create` command
pub async fn create(
    store: &OpenStore,
    args: &UserCreateArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    for scope in &args.scopes {
        validate_scope(scope)?;
    }

    let mut edit = UserEdit::new();
    if args.display_name.is_some() {
        edit = edit.display_name(args.display_name.clone());
    }
    if !args.scopes.is_empty() {
        edit = edit.scopes(args.scopes.iter().cloned());
    }
    let user = UserDirectory::new(store.store.clone())
        .create_with(&args.username, &args.password, edit)
        .await?;
    store.persist().await?;

    match format {
        OutputFormat::Human => println!("Created user {} ({})", user.username, user.id),
        OutputFormat::Json => println!("{}", serde_json::to_string(&user.redacted())?),
    }
    Ok(())
}

/// Run the `user list` command
pub async fn list(
    store: &OpenStore,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let users = UserDirectory::new(store.store.clone()).list().await?;

    match format {
        OutputFormat::Human => {
            if users.is_empty() {
                println!("No users found.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = users
                .iter()
                .map(|u| {
                    vec![
                        u.id.clone(),
                        u.username.clone(),
                        u.display_name.clone().unwrap_or_default(),
                        u.scopes.join(","),
                    ]
                })
                .collect();
            print_table(&["ID", "USERNAME", "DISPLAY NAME", "SCOPES"], &rows);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&users)?),
    }
    Ok(())
}

/// Run the `user delete` command
pub async fn delete(
    store: &OpenStore,
    args: &UserDeleteArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    UserDirectory::new(store.store.clone())
        .delete(&args.id)
        .await?;
    store.persist().await?;
    println!("Deleted user {}", args.id);
    Ok(())
}

/// Run the `user grant` command
pub async fn grant(
    store: &OpenStore,
    args: &UserGrantArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    validate_scope(&args.scope)?;

    let users = UserDirectory::new(store.store.clone());
    let user = users
        .get_by_username(&args.username)
        .await?
        .ok_or_else(|| format!("No such user: {}", args.username))?;
    let user = users.grant_scope(&user.id, &args.scope).await?;
    store.persist().await?;

    match format {
        OutputFormat::Human => println!("{}: {}", user.username, user.scopes.join(",")),
        OutputFormat::Json => println!("{}", serde_json::to_string(&user.redacted())?),
    }
    Ok(())
}
