//! CLI argument definitions for the haus-auth binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Storage backend type
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Backend {
    /// In-memory with JSON persistence (default)
    Inmemory,
    /// SQLite database
    Sqlite,
}

/// Manage Haus users, scopes and credentials
#[derive(Parser, Debug)]
#[command(name = "haus-auth")]
#[command(about = "Haus authorization core: users, scopes and sessions")]
#[command(version)]
pub struct Cli {
    /// TOML config file with the [sessions] and [users.default] sections
    #[arg(short, long, global = true, env = "HAUS_AUTH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where users and sessions are persisted
#[derive(clap::Args, Debug, Clone)]
pub struct StoreArgs {
    /// Storage backend to use
    #[arg(
        short,
        long,
        global = true,
        default_value = "inmemory",
        env = "HAUS_AUTH_BACKEND"
    )]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For InMemory: stores haus-auth.json
    /// For SQLite: stores haus-auth.db
    #[arg(short = 'D', long, global = true, env = "HAUS_AUTH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the scope catalog
    Scopes,
    /// Manage users
    #[command(subcommand)]
    User(UserCommands),
    /// Check whether a user holds a scope
    Check(CheckArgs),
    /// Create the default user from config if it is missing
    Bootstrap,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user
    Create(UserCreateArgs),
    /// List all users
    List,
    /// Delete a user by id
    Delete(UserDeleteArgs),
    /// Grant a scope to a user
    Grant(UserGrantArgs),
}

#[derive(clap::Args, Debug)]
pub struct UserCreateArgs {
    pub username: String,

    /// Password for the new user
    #[arg(long, env = "HAUS_AUTH_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Optional display name
    #[arg(long)]
    pub display_name: Option<String>,

    /// Scopes to grant; may be repeated
    #[arg(short, long = "scope")]
    pub scopes: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct UserDeleteArgs {
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct UserGrantArgs {
    pub username: String,
    pub scope: String,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    pub username: String,
    pub scope: String,
}
