//! Connection settings and pool configuration for the Valar MySQL database

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;

use crate::Result;
use crate::error::Error;

/// Environment variable naming the JSON connection config file
pub const CONFIG_ENV_VAR: &str = "VALARPY_CONFIG";

/// Files under `~/.valarpy/` tried, in order, after `$VALARPY_CONFIG`
const FALLBACK_CONFIG_FILES: [&str; 3] = ["config.json", "connection.json", "read_only.json"];

/// Configuration for the ValarDatabase connection pool
///
/// # Examples
///
/// ```
/// use valar_conn_mgr::ValarDatabaseConfig;
///
/// // Use defaults
/// let config = ValarDatabaseConfig::default();
///
/// // Override just one field
/// let config = ValarDatabaseConfig {
///     max_connections: 2,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValarDatabaseConfig {
   /// Maximum number of pooled connections
   ///
   /// Default: 6
   pub max_connections: u32,

   /// Idle timeout for pooled connections (in seconds)
   ///
   /// Connections that remain idle for this duration will be closed automatically.
   ///
   /// Default: 30
   pub idle_timeout_secs: u64,
}

impl Default for ValarDatabaseConfig {
   fn default() -> Self {
      Self {
         max_connections: 6,
         idle_timeout_secs: 30,
      }
   }
}

/// Connection parameters read from the JSON config file.
///
/// ```json
/// {"database": "valar", "host": "127.0.0.1", "port": 3306, "user": "reader", "password": "..."}
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
   /// Name of the schema to use
   pub database: String,

   #[serde(default = "default_host")]
   pub host: String,

   #[serde(default = "default_port")]
   pub port: u16,

   #[serde(default)]
   pub user: Option<String>,

   #[serde(default)]
   pub password: Option<String>,

   /// Character set sent on connect; sqlx's default when unset
   #[serde(default)]
   pub charset: Option<String>,
}

fn default_host() -> String {
   "127.0.0.1".to_string()
}

fn default_port() -> u16 {
   3306
}

// Never print the password.
impl std::fmt::Debug for ConnectionConfig {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("ConnectionConfig")
         .field("database", &self.database)
         .field("host", &self.host)
         .field("port", &self.port)
         .field("user", &self.user)
         .field("charset", &self.charset)
         .finish_non_exhaustive()
   }
}

impl ConnectionConfig {
   /// Read and parse a JSON connection config file
   pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
      let path = path.as_ref();
      let text = std::fs::read_to_string(path)?;
      serde_json::from_str(&text).map_err(|source| Error::InvalidConfig {
         path: path.to_path_buf(),
         source,
      })
   }

   /// Build sqlx connect options from these settings
   pub fn connect_options(&self) -> MySqlConnectOptions {
      let mut options = MySqlConnectOptions::new()
         .host(&self.host)
         .port(self.port)
         .database(&self.database);

      if let Some(user) = &self.user {
         options = options.username(user);
      }
      if let Some(password) = &self.password {
         options = options.password(password);
      }
      if let Some(charset) = &self.charset {
         options = options.charset(charset);
      }

      options
   }
}

/// Locate the connection config file.
///
/// An explicit path is returned unchanged. Otherwise `VALARPY_CONFIG` must be set, and the
/// first existing path among `$VALARPY_CONFIG`, `~/.valarpy/config.json`,
/// `~/.valarpy/connection.json` and `~/.valarpy/read_only.json` is used.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
   resolve_config_path_with(
      explicit,
      std::env::var_os(CONFIG_ENV_VAR),
      dirs_next::home_dir(),
   )
}

/// [`resolve_config_path`] with the environment value and home directory supplied by the caller
pub fn resolve_config_path_with(
   explicit: Option<&Path>,
   env_value: Option<OsString>,
   home: Option<PathBuf>,
) -> Result<PathBuf> {
   if let Some(path) = explicit {
      return Ok(path.to_path_buf());
   }

   let env_value = env_value.ok_or(Error::ConfigNotSet(CONFIG_ENV_VAR))?;
   let env_path = PathBuf::from(&env_value);

   let mut candidates = vec![env_path.clone()];
   if let Some(home) = home {
      let dir = home.join(".valarpy");
      candidates.extend(FALLBACK_CONFIG_FILES.iter().map(|name| dir.join(name)));
   }

   match candidates.into_iter().find(|path| path.exists()) {
      Some(path) if path.is_file() => Ok(path),
      Some(path) => Err(Error::ConfigNotFound(path.display().to_string())),
      None => Err(Error::ConfigNotFound(env_path.display().to_string())),
   }
}
