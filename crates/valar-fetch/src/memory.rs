//! In-process [`EntityStore`] backed by plain vectors.
//!
//! Records are returned in insertion order. Every query is logged, which lets callers
//! check how many round trips an operation would have cost against MySQL.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::condition::{Collation, Condition};
use crate::entity::EntityType;
use crate::error::Result;
use crate::record::Record;
use crate::store::EntityStore;

/// A query as received by the memory store.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedQuery {
   pub table: &'static str,
   pub condition: Option<Condition>,
}

/// Entity store holding records in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
   tables: RwLock<HashMap<&'static str, Vec<Record>>>,
   log: Mutex<Vec<LoggedQuery>>,
   collation: Collation,
}

impl MemoryStore {
   pub fn new() -> Self {
      Self::default()
   }

   /// Create a store pre-filled with `records`.
   pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
      let store = Self::new();
      for record in records {
         store.insert(record);
      }
      store
   }

   /// Compare strings under `collation` instead of byte equality.
   pub fn with_collation(mut self, collation: Collation) -> Self {
      self.collation = collation;
      self
   }

   /// Append a record to its entity's table.
   pub fn insert(&self, record: Record) {
      self
         .tables
         .write()
         .entry(record.entity().table())
         .or_default()
         .push(record);
   }

   /// Number of queries issued since creation or the last [`clear_log`](Self::clear_log).
   pub fn query_count(&self) -> usize {
      self.log.lock().len()
   }

   /// Queries issued since creation or the last [`clear_log`](Self::clear_log), oldest first.
   pub fn queries(&self) -> Vec<LoggedQuery> {
      self.log.lock().clone()
   }

   pub fn clear_log(&self) {
      self.log.lock().clear();
   }

   fn run(&self, entity: &'static EntityType, condition: Option<&Condition>) -> Result<Vec<Record>> {
      self.log.lock().push(LoggedQuery {
         table: entity.table(),
         condition: condition.cloned(),
      });

      let tables = self.tables.read();
      let rows = tables.get(entity.table()).map(Vec::as_slice).unwrap_or(&[]);

      let mut matched = Vec::new();
      for record in rows {
         let keep = match condition {
            Some(condition) => condition.matches_with(record, self.collation)?,
            None => true,
         };
         if keep {
            matched.push(record.clone());
         }
      }

      trace!(
         "memory query on {} matched {} of {} rows",
         entity.table(),
         matched.len(),
         rows.len()
      );
      Ok(matched)
   }
}

impl EntityStore for MemoryStore {
   fn query(
      &self,
      entity: &'static EntityType,
      condition: Option<&Condition>,
   ) -> impl Future<Output = Result<Vec<Record>>> + Send {
      std::future::ready(self.run(entity, condition))
   }
}
