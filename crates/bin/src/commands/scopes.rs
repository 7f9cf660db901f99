//! Scope catalog listing.

use haus_auth::APPLICATION_SCOPES;

use crate::output::{OutputFormat, print_table};

/// Run the `scopes` command
pub fn run(format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = APPLICATION_SCOPES
                .paths()
                .into_iter()
                .filter_map(|path| {
                    let def = APPLICATION_SCOPES.lookup(&path)?;
                    Some(vec![
                        path.clone(),
                        def.friendly_name.clone(),
                        def.description.clone(),
                    ])
                })
                .collect();
            print_table(&["SCOPE", "NAME", "DESCRIPTION"], &rows);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&APPLICATION_SCOPES.serialize())?);
        }
    }
    Ok(())
}
