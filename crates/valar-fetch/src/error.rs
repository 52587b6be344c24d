/// Result type alias for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for entity fetching.
///
/// Caller mistakes (wrong identifier kinds, unknown rows) are kept apart from storage
/// failures and from `InternalConsistency`, which signals a resolver or data-integrity bug.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// The identifier was valid but no matching row exists.
   #[error("could not find {identifier} in {entity}")]
   Lookup {
      entity: &'static str,
      identifier: String,
   },

   /// A record of one entity type was passed where another was expected.
   #[error("fetching a {found} on {expected}")]
   TypeMismatch {
      expected: &'static str,
      found: &'static str,
   },

   /// The value cannot be used as an identifier (not a record, integer-like number or string).
   #[error("unsupported identifier type: {0}")]
   InvalidIdentifierType(String),

   /// A string lookup was attempted on a type without unique string columns.
   #[error("{0} has no unique string column to look up by name")]
   NoIndexingColumn(&'static str),

   /// Fuzzy `like` and `regex` matching were both requested.
   #[error("like and regex matching are mutually exclusive")]
   ConflictingMatchModes,

   /// Conditions and identifiers were mixed in one sequence of query terms.
   #[error("cannot mix conditions and identifiers when building a query on {0}")]
   MixedQueryTerms(&'static str),

   /// A row came back without a usable integer primary key.
   #[error("row from {entity} has no integer primary key {column}")]
   MissingPrimaryKey {
      entity: &'static str,
      column: &'static str,
   },

   /// The resolver's own post-conditions were violated.
   #[error("internal consistency error: {0}")]
   InternalConsistency(String),

   /// A `regex` pattern that the memory store could not compile.
   #[error("invalid pattern: {0}")]
   InvalidPattern(#[from] regex::Error),

   /// MySQL type that cannot be mapped to JSON.
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// Error from the connection manager.
   #[error(transparent)]
   ConnectionManager(#[from] valar_conn_mgr::Error),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::Lookup { .. } => "LOOKUP_FAILED".to_string(),
         Error::TypeMismatch { .. } => "TYPE_MISMATCH".to_string(),
         Error::InvalidIdentifierType(_) => "INVALID_IDENTIFIER_TYPE".to_string(),
         Error::NoIndexingColumn(_) => "NO_INDEXING_COLUMN".to_string(),
         Error::ConflictingMatchModes => "CONFLICTING_MATCH_MODES".to_string(),
         Error::MixedQueryTerms(_) => "MIXED_QUERY_TERMS".to_string(),
         Error::MissingPrimaryKey { .. } => "MISSING_PRIMARY_KEY".to_string(),
         Error::InternalConsistency(_) => "INTERNAL_CONSISTENCY".to_string(),
         Error::InvalidPattern(_) => "INVALID_PATTERN".to_string(),
         Error::UnsupportedDatatype(_) => "UNSUPPORTED_DATATYPE".to_string(),
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("MYSQL_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::ConnectionManager(_) => "CONNECTION_ERROR".to_string(),
      }
   }

   /// Returns true for errors caused by the caller's input rather than storage or a bug.
   pub fn is_caller_error(&self) -> bool {
      matches!(
         self,
         Error::Lookup { .. }
            | Error::TypeMismatch { .. }
            | Error::InvalidIdentifierType(_)
            | Error::NoIndexingColumn(_)
            | Error::ConflictingMatchModes
            | Error::MixedQueryTerms(_)
      )
   }
}
