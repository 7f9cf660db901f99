//! Store creation and persistence helpers.

use std::path::PathBuf;
use std::sync::Arc;

use haus_auth::store::{AuthStore, InMemory, SqliteStore};

use crate::cli::{Backend, StoreArgs};

/// An opened store plus what is needed to write it back.
pub struct OpenStore {
    pub store: Arc<dyn AuthStore>,
    json_path: Option<PathBuf>,
}

impl OpenStore {
    /// Write an in-memory store back to its JSON file. A no-op for SQLite.
    pub async fn persist(&self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = &self.json_path else {
            return Ok(());
        };
        if let Some(in_memory) = self.store.as_any().downcast_ref::<InMemory>() {
            in_memory.save_to_file(path).await?;
            tracing::debug!("Saved store to {}", path.display());
        }
        Ok(())
    }
}

/// Open the store selected on the command line
pub async fn open_store(args: &StoreArgs) -> Result<OpenStore, Box<dyn std::error::Error>> {
    let data_dir = args.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    match args.backend {
        Backend::Inmemory => {
            let json_path = data_dir.join("haus-auth.json");
            tracing::info!(
                "Using in-memory store with persistence at {}",
                json_path.display()
            );
            let store = InMemory::load_from_file(&json_path).await?;
            Ok(OpenStore {
                store: Arc::new(store),
                json_path: Some(json_path),
            })
        }
        Backend::Sqlite => {
            let db_path = data_dir.join("haus-auth.db");
            tracing::info!("Using SQLite store at {}", db_path.display());
            Ok(OpenStore {
                store: Arc::new(SqliteStore::open(&db_path).await?),
                json_path: None,
            })
        }
    }
}
