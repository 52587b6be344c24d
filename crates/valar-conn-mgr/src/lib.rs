//! # valar-conn-mgr
//!
//! A minimal wrapper around SQLx that owns the MySQL connection pool for the Valar
//! database and knows how to find and read its connection settings.
//!
//! ## Core Types
//!
//! - **[`ValarDatabase`]**: Database handle wrapping a sqlx `MySqlPool`
//! - **[`ConnectionConfig`]**: Host, credentials and schema name read from a JSON file
//! - **[`ValarDatabaseConfig`]**: Pool settings
//! - **[`Error`]**: Error type for config and database operations
//!
//! ## Locating the config file
//!
//! [`resolve_config_path`] uses an explicit path if given. Otherwise the
//! `VALARPY_CONFIG` environment variable must be set; the first existing file among
//! `$VALARPY_CONFIG`, `~/.valarpy/config.json`, `~/.valarpy/connection.json` and
//! `~/.valarpy/read_only.json` is used.
//!
//! ## Usage
//!
//! ```no_run
//! use valar_conn_mgr::{ConnectionConfig, ValarDatabase, resolve_config_path};
//!
//! #[tokio::main]
//! async fn main() -> valar_conn_mgr::Result<()> {
//!     let path = resolve_config_path(None)?;
//!     let config = ConnectionConfig::from_json_file(&path)?;
//!     let db = ValarDatabase::connect(&config, None).await?;
//!
//!     let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM refs")
//!         .fetch_one(db.pool()?)
//!         .await?;
//!     println!("Found {count} refs");
//!
//!     db.close().await?;
//!     Ok(())
//! }
//! ```
//!
mod config;
mod database;
mod error;

// Re-export public types
pub use config::{
   CONFIG_ENV_VAR, ConnectionConfig, ValarDatabaseConfig, resolve_config_path,
   resolve_config_path_with,
};
pub use database::ValarDatabase;
pub use error::Error;

/// A type alias for Results with our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
