//! Error types for valar-conn-mgr

use std::path::PathBuf;

use thiserror::Error;

/// Errors that may occur when loading connection settings or talking to the pool
#[derive(Error, Debug)]
pub enum Error {
   /// IO error when reading the config file. Standard library IO errors
   /// are converted to this variant.
   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),

   /// Error from the sqlx library. Standard sqlx errors are converted to this variant
   #[error("Sqlx error: {0}")]
   Sqlx(#[from] sqlx::Error),

   /// The config file exists but is not valid JSON for a [`ConnectionConfig`](crate::ConnectionConfig)
   #[error("Invalid connection config {path}: {source}")]
   InvalidConfig {
      path: PathBuf,
      #[source]
      source: serde_json::Error,
   },

   /// No explicit config path was given and `VALARPY_CONFIG` is unset
   #[error("Set {0} as an environment variable")]
   ConfigNotSet(&'static str),

   /// None of the candidate config paths points at a readable file
   #[error("Path for VALARPY_CONFIG '{0}' does not exist or is not a file")]
   ConfigNotFound(String),

   /// Database has been closed and cannot be used
   #[error("Database has been closed")]
   DatabaseClosed,
}
