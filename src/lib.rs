//! Connect to Valar and fetch its rows by id, by name or by record.
//!
//! ```no_run
//! use valar::{Valar, model};
//!
//! # async fn example() -> valar::Result<()> {
//! // Uses VALARPY_CONFIG or ~/.valarpy/*.json
//! let valar = Valar::new(None)?;
//! valar.open().await?;
//!
//! let resolver = valar.resolver().await?;
//! let users = resolver
//!    .resolve_many_or_fail(&model::USERS, vec![valar::Identifier::from(1), "bob".into()])
//!    .await?;
//! println!("{}", users[1].sstring());
//!
//! valar.close().await?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info};
use valar_conn_mgr::{ConnectionConfig, ValarDatabase, ValarDatabaseConfig, resolve_config_path};
use valar_fetch::{FetchResolver, MySqlStore};

mod error;
pub mod model;

pub use error::{Error, Result};
pub use valar_fetch::{Condition, EntityType, Identifier, Record};

/// Handle on the Valar database.
///
/// The config file is located when the handle is created and read on every
/// [`open`](Self::open), so [`reconnect`](Self::reconnect) picks up edits to it.
pub struct Valar {
   config_path: PathBuf,
   pool_config: Option<ValarDatabaseConfig>,
   db: RwLock<Option<Arc<ValarDatabase>>>,
}

impl Valar {
   /// Create a closed handle.
   ///
   /// Without an explicit path, `VALARPY_CONFIG` must be set and one of the standard
   /// config locations must exist.
   pub fn new(config_path: Option<&Path>) -> Result<Self> {
      let config_path = resolve_config_path(config_path)?;
      debug!("Using Valar config at {}", config_path.display());

      Ok(Self {
         config_path,
         pool_config: None,
         db: RwLock::new(None),
      })
   }

   /// Use custom pool settings for connections opened from now on.
   pub fn with_pool_config(mut self, config: ValarDatabaseConfig) -> Self {
      self.pool_config = Some(config);
      self
   }

   pub fn config_path(&self) -> &Path {
      &self.config_path
   }

   /// Read the config file and connect. Does nothing if already open.
   pub async fn open(&self) -> Result<()> {
      let mut db = self.db.write().await;
      if db.is_some() {
         debug!("Valar connection already open");
         return Ok(());
      }

      let connection = ConnectionConfig::from_json_file(&self.config_path)?;
      *db = Some(ValarDatabase::connect(&connection, self.pool_config.clone()).await?);
      Ok(())
   }

   /// Close the connection. Does nothing if not open.
   pub async fn close(&self) -> Result<()> {
      let Some(db) = self.db.write().await.take() else {
         debug!("Valar connection already closed");
         return Ok(());
      };

      let name = db.database_name().to_string();
      if let Err(e) = db.close().await {
         error!("Failed to close connection to {}: {}", name, e);
         return Err(e.into());
      }
      info!("Closed connection to {}", name);
      Ok(())
   }

   /// Close, then open again with a fresh read of the config file.
   pub async fn reconnect(&self) -> Result<()> {
      self.close().await?;
      self.open().await
   }

   pub async fn is_open(&self) -> bool {
      self.db.read().await.is_some()
   }

   /// The open database, or [`Error::NotConnected`].
   pub async fn database(&self) -> Result<Arc<ValarDatabase>> {
      self.db.read().await.clone().ok_or(Error::NotConnected)
   }

   /// A resolver over the open database.
   ///
   /// The resolver keeps the pool it was created with; after [`close`](Self::close) its
   /// queries fail with a closed-database error.
   pub async fn resolver(&self) -> Result<FetchResolver<MySqlStore>> {
      Ok(FetchResolver::new(MySqlStore::new(self.database().await?)))
   }
}
