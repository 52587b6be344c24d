//! Entity metadata and batch fetch resolution over the Valar MySQL schema.
//!
//! This crate sits between the connection manager (`valar-conn-mgr`) and application
//! code. It provides:
//!
//! - [`EntityType`] and [`Column`]: static table metadata, including the indexing
//!   columns a string identifier is matched against
//! - [`Record`]: one decoded row
//! - [`Identifier`]: a record, a primary key or a name
//! - [`FetchResolver`]: resolves one or many identifiers in at most two queries
//! - [`EntityStore`]: the query seam, with [`MySqlStore`] for a live database and
//!   [`MemoryStore`] for in-process data
//!
//! # Example
//!
//! ```no_run
//! use valar_conn_mgr::{ConnectionConfig, ValarDatabase};
//! use valar_fetch::{Column, EntityType, FetchResolver, Identifier, MySqlStore, SqlType};
//!
//! static REFS: EntityType = EntityType::with_short_prefix(
//!    "Refs",
//!    "refs",
//!    &[
//!       Column::new("id", SqlType::SmallInt).primary(),
//!       Column::new("name", SqlType::VarChar).unique(),
//!    ],
//!    "ref.",
//! );
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConnectionConfig::from_json_file("connection.json")?;
//! let db = ValarDatabase::connect(&config, None).await?;
//! let resolver = FetchResolver::new(MySqlStore::new(db));
//!
//! // One lookup by name
//! let chembl = resolver.resolve_one_or_fail(&REFS, "chembl").await?;
//!
//! // One query for the ids, one for the names
//! let refs = resolver
//!    .resolve_many_or_fail(&REFS, vec![Identifier::from(chembl), 2.into(), "drugbank".into()])
//!    .await?;
//! assert_eq!(refs.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod condition;
pub mod decode;
pub mod entity;
pub mod error;
pub mod identifier;
pub mod memory;
pub mod mysql;
pub mod record;
pub mod resolver;
pub mod store;

pub use builders::{ResolveManyBuilder, ResolveOneBuilder};
pub use condition::{Collation, Condition, QueryTerm, QueryTerms};
pub use entity::{Column, ColumnDescription, EntityType, SqlType};
pub use error::{Error, Result};
pub use identifier::Identifier;
pub use memory::{LoggedQuery, MemoryStore};
pub use mysql::{MySqlStore, select_query};
pub use record::Record;
pub use resolver::FetchResolver;
pub use store::EntityStore;

// Re-export commonly used types from dependencies
pub use valar_conn_mgr::{ConnectionConfig, ValarDatabase, ValarDatabaseConfig};
