//! MySQL database handle with a shared connection pool

use crate::Result;
use crate::config::{ConnectionConfig, ValarDatabaseConfig};
use crate::error::Error;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Valar database with a pool of MySQL connections.
///
/// The handle is shared behind an `Arc`; every query borrows the pool through `pool()`,
/// which refuses to hand it out once the database has been closed.
///
/// # Example
///
/// ```no_run
/// use valar_conn_mgr::{ConnectionConfig, ValarDatabase};
///
/// # async fn example() -> Result<(), valar_conn_mgr::Error> {
/// let config = ConnectionConfig::from_json_file("connection.json")?;
/// let db = ValarDatabase::connect(&config, None).await?;
///
/// let rows = sqlx::query("SELECT * FROM refs")
///     .fetch_all(db.pool()?)
///     .await?;
///
/// db.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ValarDatabase {
   /// Shared connection pool
   pool: Pool<MySql>,

   /// Marks database as closed to prevent further operations
   closed: AtomicBool,

   /// Schema name, kept for logging
   database: String,
}

impl ValarDatabase {
   /// Connect to the Valar database described by `connection`
   ///
   /// At least one connection is opened eagerly so that bad credentials fail here
   /// rather than on the first query.
   ///
   /// # Arguments
   ///
   /// * `connection` - Host, credentials and schema name, usually read from the JSON config file
   /// * `custom_config` - Optional pool configuration.
   ///   Pass `None` to use defaults (6 max connections, 30 second idle timeout).
   pub async fn connect(
      connection: &ConnectionConfig,
      custom_config: Option<ValarDatabaseConfig>,
   ) -> Result<Arc<Self>> {
      let config = custom_config.unwrap_or_default();

      info!(
         "Opening connection to {} on {}:{}",
         connection.database, connection.host, connection.port
      );

      let pool = MySqlPoolOptions::new()
         .max_connections(config.max_connections)
         .min_connections(0)
         .idle_timeout(Some(std::time::Duration::from_secs(
            config.idle_timeout_secs,
         )))
         .connect_with(connection.connect_options())
         .await?;

      Ok(Arc::new(Self {
         pool,
         closed: AtomicBool::new(false),
         database: connection.database.clone(),
      }))
   }

   /// Get a reference to the connection pool for executing queries
   pub fn pool(&self) -> Result<&Pool<MySql>> {
      if self.closed.load(Ordering::SeqCst) {
         return Err(Error::DatabaseClosed);
      }
      Ok(&self.pool)
   }

   /// Name of the connected schema
   pub fn database_name(&self) -> &str {
      &self.database
   }

   /// Returns true once `close()` has been called
   pub fn is_closed(&self) -> bool {
      self.closed.load(Ordering::SeqCst)
   }

   /// Close the database and wait for all pooled connections to be returned
   ///
   /// After calling close, `pool()` returns `Error::DatabaseClosed`.
   ///
   /// Note: Takes `Arc<Self>` to consume ownership, preventing use-after-close at compile time.
   pub async fn close(self: Arc<Self>) -> Result<()> {
      self.closed.store(true, Ordering::SeqCst);

      info!("Closing connection to {}", self.database);
      self.pool.close().await;

      Ok(())
   }
}
