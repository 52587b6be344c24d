use serde::{Serialize, Serializer};

/// Result type alias for facade operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured error response for callers that report errors as data.
#[derive(Serialize)]
struct ErrorResponse {
   code: String,
   message: String,
}

/// Error types for the Valar facade.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Error from entity resolution.
   #[error(transparent)]
   Fetch(#[from] valar_fetch::Error),

   /// Error from the connection manager.
   #[error(transparent)]
   ConnectionManager(#[from] valar_conn_mgr::Error),

   /// The facade was used while no connection is open.
   #[error("not connected to Valar; call open() first")]
   NotConnected,
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// Connection manager errors are unwrapped to their specific cause, including when
   /// they surface through a query.
   pub fn error_code(&self) -> String {
      match self {
         Error::Fetch(valar_fetch::Error::ConnectionManager(e)) | Error::ConnectionManager(e) => {
            connection_error_code(e)
         }
         Error::Fetch(e) => e.error_code(),
         Error::NotConnected => "NOT_CONNECTED".to_string(),
      }
   }
}

fn connection_error_code(error: &valar_conn_mgr::Error) -> String {
   use valar_conn_mgr::Error as E;

   match error {
      E::Io(_) => "IO_ERROR".to_string(),
      E::Sqlx(e) => {
         if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
            return format!("MYSQL_{}", code);
         }
         "SQLX_ERROR".to_string()
      }
      E::InvalidConfig { .. } => "INVALID_CONFIG".to_string(),
      E::ConfigNotSet(_) => "CONFIG_NOT_SET".to_string(),
      E::ConfigNotFound(_) => "CONFIG_NOT_FOUND".to_string(),
      E::DatabaseClosed => "DATABASE_CLOSED".to_string(),
   }
}

impl Serialize for Error {
   fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
   where
      S: Serializer,
   {
      let response = ErrorResponse {
         code: self.error_code(),
         message: self.to_string(),
      };
      response.serialize(serializer)
   }
}
