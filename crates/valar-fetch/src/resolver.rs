//! Fetch resolution: turning loosely typed identifiers into records.
//!
//! A batch of N identifiers costs at most two queries: one `pk IN (...)` for every
//! id, and one `col IN (...) OR ...` across the indexing columns for every name.
//! Records passed in as identifiers cost nothing. Results come back in input order,
//! with duplicates resolved from the same query row.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::builders::{ResolveManyBuilder, ResolveOneBuilder};
use crate::condition::{Collation, Condition, QueryTerm, QueryTerms};
use crate::entity::EntityType;
use crate::error::{Error, Result};
use crate::identifier::Identifier;
use crate::record::Record;
use crate::store::EntityStore;

/// How a name is compared against the indexing columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchMode {
   Exact,
   Like,
   Regex,
}

impl MatchMode {
   pub(crate) fn from_flags(like: bool, regex: bool) -> Result<Self> {
      match (like, regex) {
         (true, true) => Err(Error::ConflictingMatchModes),
         (true, false) => Ok(MatchMode::Like),
         (false, true) => Ok(MatchMode::Regex),
         (false, false) => Ok(MatchMode::Exact),
      }
   }
}

/// Options for a batch resolution.
#[derive(Debug, Clone, Default)]
pub(crate) struct BatchOptions {
   /// Look supplied records up again instead of trusting them.
   pub(crate) validate_instances: bool,
   /// ANDed into every query of the batch.
   pub(crate) restrict: Option<Condition>,
}

/// Resolves identifiers to records of a given entity type.
///
/// The resolver holds nothing but its store; it is cheap to clone and can be shared
/// between tasks whenever the store can.
///
/// # Example
///
/// ```
/// # async fn example() -> valar_fetch::Result<()> {
/// use valar_fetch::{Column, EntityType, FetchResolver, MemoryStore, SqlType};
///
/// static USERS: EntityType = EntityType::new(
///    "Users",
///    "users",
///    &[
///       Column::new("id", SqlType::Integer).primary(),
///       Column::new("username", SqlType::VarChar).unique(),
///    ],
/// );
///
/// let resolver = FetchResolver::new(MemoryStore::new());
///
/// // Nothing stored yet
/// assert!(resolver.resolve_one(&USERS, "john").await?.is_none());
///
/// let users = resolver.resolve_many(&USERS, [1, 2]).await?;
/// assert_eq!(users, vec![None, None]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FetchResolver<S> {
   store: S,
}

impl<S: EntityStore> FetchResolver<S> {
   pub fn new(store: S) -> Self {
      Self { store }
   }

   pub fn store(&self) -> &S {
      &self.store
   }

   pub fn into_store(self) -> S {
      self.store
   }

   /// Resolve one identifier, returning `None` if no row matches.
   ///
   /// Returns a builder; `.like()` or `.regex()` switch name lookups from equality to
   /// substring or regular-expression matching.
   pub fn resolve_one(
      &self,
      entity: &'static EntityType,
      id: impl Into<Identifier>,
   ) -> ResolveOneBuilder<'_, S> {
      ResolveOneBuilder::new(self, entity, id.into())
   }

   /// Resolve one identifier, failing with [`Error::Lookup`] if no row matches.
   pub async fn resolve_one_or_fail(
      &self,
      entity: &'static EntityType,
      id: impl Into<Identifier>,
   ) -> Result<Record> {
      self.resolve_one(entity, id).or_fail().await
   }

   /// Resolve a batch of identifiers in at most two queries.
   ///
   /// The result has one slot per input, in input order; `None` marks identifiers with
   /// no matching row.
   pub fn resolve_many<I>(&self, entity: &'static EntityType, ids: I) -> ResolveManyBuilder<'_, S>
   where
      I: IntoIterator,
      I::Item: Into<Identifier>,
   {
      ResolveManyBuilder::new(self, entity, ids.into_iter().map(Into::into).collect())
   }

   /// Resolve a batch, failing with [`Error::Lookup`] on the first unresolved identifier.
   pub async fn resolve_many_or_fail<I>(
      &self,
      entity: &'static EntityType,
      ids: I,
   ) -> Result<Vec<Record>>
   where
      I: IntoIterator,
      I::Item: Into<Identifier>,
   {
      self.resolve_many(entity, ids).or_fail().await
   }

   /// Normalize query terms into a list of conditions to AND together.
   ///
   /// Conditions pass through unchanged. A single identifier is resolved (and must exist)
   /// and becomes `pk = id`; several identifiers become `pk IN (ids)`. Mixing conditions
   /// and identifiers is an error.
   pub async fn to_query_conditions(
      &self,
      entity: &'static EntityType,
      terms: impl Into<QueryTerms>,
   ) -> Result<Vec<Condition>> {
      let terms = terms.into().into_inner();

      if terms.iter().all(|t| matches!(t, QueryTerm::Condition(_))) {
         return Ok(terms
            .into_iter()
            .filter_map(|t| match t {
               QueryTerm::Condition(c) => Some(c),
               QueryTerm::Identifier(_) => None,
            })
            .collect());
      }

      if !terms.iter().all(|t| matches!(t, QueryTerm::Identifier(_))) {
         return Err(Error::MixedQueryTerms(entity.name()));
      }

      let mut ids: Vec<Identifier> = terms
         .into_iter()
         .filter_map(|t| match t {
            QueryTerm::Identifier(id) => Some(id),
            QueryTerm::Condition(_) => None,
         })
         .collect();

      if ids.len() == 1 {
         let record = self.resolve_one_or_fail(entity, ids.remove(0)).await?;
         return Ok(vec![Condition::eq(entity.primary_key(), record.id())]);
      }

      let records = self.resolve_many_or_fail(entity, ids).await?;
      let keys: IndexSet<i64> = records.iter().map(Record::id).collect();
      Ok(vec![Condition::is_in(entity.primary_key(), keys)])
   }

   /// All records of `entity` matching every condition; all records when empty.
   pub async fn list_where(
      &self,
      entity: &'static EntityType,
      conditions: Vec<Condition>,
   ) -> Result<Vec<Record>> {
      if conditions.is_empty() {
         return self.store.query_all(entity).await;
      }
      self
         .store
         .query_where(entity, &Condition::all(conditions))
         .await
   }
}

/// Check that a supplied record belongs to `entity`.
fn check_instance(entity: &'static EntityType, record: &Record) -> Result<()> {
   if record.is_a(entity) {
      Ok(())
   } else {
      Err(Error::TypeMismatch {
         expected: entity.name(),
         found: record.entity().name(),
      })
   }
}

/// OR of one comparison per indexing column, for each name.
fn name_condition(columns: &[&'static str], names: &[String], mode: MatchMode) -> Condition {
   let comparisons = match mode {
      MatchMode::Exact if names.len() == 1 => columns
         .iter()
         .map(|col| Condition::eq(*col, names[0].as_str()))
         .collect(),
      MatchMode::Exact => columns
         .iter()
         .map(|col| Condition::is_in(*col, names.iter().map(String::as_str)))
         .collect(),
      MatchMode::Like => names
         .iter()
         .flat_map(|name| columns.iter().map(move |col| Condition::contains(*col, name)))
         .collect(),
      MatchMode::Regex => names
         .iter()
         .flat_map(|name| columns.iter().map(move |col| Condition::regexp(*col, name)))
         .collect(),
   };
   Condition::or(comparisons)
}

fn restricted(restrict: Option<&Condition>, condition: Condition) -> Condition {
   match restrict {
      Some(restrict) => Condition::and(vec![restrict.clone(), condition]),
      None => condition,
   }
}

pub(crate) async fn resolve_one<S: EntityStore>(
   store: &S,
   entity: &'static EntityType,
   id: Identifier,
   mode: MatchMode,
) -> Result<Option<Record>> {
   match id {
      Identifier::ByInstance(record) => {
         check_instance(entity, &record)?;
         Ok(Some(record))
      }
      Identifier::ById(key) => {
         let condition = Condition::eq(entity.primary_key(), key);
         let mut rows = store.query_where(entity, &condition).await?;
         match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            count => Err(Error::InternalConsistency(format!(
               "{} rows of {} share primary key {}",
               count,
               entity.name(),
               key
            ))),
         }
      }
      Identifier::ByName(name) => {
         let columns = entity.indexing_columns();
         if columns.is_empty() {
            return Err(Error::NoIndexingColumn(entity.name()));
         }
         let condition = name_condition(columns, std::slice::from_ref(&name), mode);
         let rows = store.query_where(entity, &condition).await?;
         if rows.len() > 1 {
            debug!(
               "{} rows of {} match {:?}; using the first",
               rows.len(),
               entity.name(),
               name
            );
         }
         Ok(rows.into_iter().next())
      }
   }
}

/// Per-position results. The outer `Option` records whether any pass attempted the
/// position; the inner one whether a row was found.
struct Slots {
   slots: Vec<Option<Option<Record>>>,
}

impl Slots {
   fn new(len: usize) -> Self {
      Self {
         slots: vec![None; len],
      }
   }

   /// Fill `positions` with `record`, refusing to replace a different record.
   fn fill(&mut self, positions: &[usize], record: &Record, key: &dyn std::fmt::Display) -> Result<()> {
      for &position in positions {
         if let Some(Some(existing)) = &self.slots[position]
            && existing.id() != record.id()
         {
            return Err(Error::InternalConsistency(format!(
               "{} matched both {} and {}",
               key, existing, record
            )));
         }
         self.slots[position] = Some(Some(record.clone()));
      }
      Ok(())
   }

   /// Mark every still-empty position in `positions` as not found.
   fn settle<'p>(&mut self, positions: impl IntoIterator<Item = &'p Vec<usize>>) {
      for &position in positions.into_iter().flatten() {
         if self.slots[position].is_none() {
            self.slots[position] = Some(None);
         }
      }
   }

   fn finish(self) -> Result<Vec<Option<Record>>> {
      let missing: Vec<usize> = self
         .slots
         .iter()
         .enumerate()
         .filter(|(_, slot)| slot.is_none())
         .map(|(i, _)| i)
         .collect();

      if !missing.is_empty() {
         return Err(Error::InternalConsistency(format!(
            "positions {:?} were never resolved",
            missing
         )));
      }

      Ok(self.slots.into_iter().flatten().collect())
   }
}

pub(crate) async fn resolve_many<S: EntityStore>(
   store: &S,
   entity: &'static EntityType,
   ids: Vec<Identifier>,
   options: &BatchOptions,
) -> Result<Vec<Option<Record>>> {
   // Reject the whole batch before issuing any query
   for id in &ids {
      if let Identifier::ByInstance(record) = id {
         check_instance(entity, record)?;
      }
   }
   let columns = entity.indexing_columns();
   if columns.is_empty() && ids.iter().any(|id| matches!(id, Identifier::ByName(_))) {
      return Err(Error::NoIndexingColumn(entity.name()));
   }

   let mut slots = Slots::new(ids.len());
   let mut by_key: IndexMap<i64, Vec<usize>> = IndexMap::new();
   let mut by_name: IndexMap<String, Vec<usize>> = IndexMap::new();
   let mut instances = 0usize;

   for (position, id) in ids.into_iter().enumerate() {
      match id {
         Identifier::ByInstance(record) if options.validate_instances => {
            instances += 1;
            by_key.entry(record.id()).or_default().push(position);
         }
         Identifier::ByInstance(record) => {
            instances += 1;
            slots.slots[position] = Some(Some(record));
         }
         Identifier::ById(key) => by_key.entry(key).or_default().push(position),
         Identifier::ByName(name) => by_name.entry(name).or_default().push(position),
      }
   }

   debug!(
      "resolving {} identifiers of {}: {} instances, {} distinct ids, {} distinct names",
      slots.slots.len(),
      entity.name(),
      instances,
      by_key.len(),
      by_name.len()
   );

   if !by_key.is_empty() {
      let condition = restricted(
         options.restrict.as_ref(),
         Condition::is_in(entity.primary_key(), by_key.keys().copied()),
      );
      for record in store.query_where(entity, &condition).await? {
         match by_key.get(&record.id()) {
            Some(positions) => {
               if positions
                  .iter()
                  .any(|&p| matches!(slots.slots[p], Some(Some(_))))
               {
                  return Err(Error::InternalConsistency(format!(
                     "more than one row of {} has primary key {}",
                     entity.name(),
                     record.id()
                  )));
               }
               slots.fill(positions, &record, &record.id())?;
            }
            None => {
               return Err(Error::InternalConsistency(format!(
                  "id lookup returned unrequested row {}",
                  record
               )));
            }
         }
      }
      slots.settle(by_key.values());
   }

   if !by_name.is_empty() {
      let names: Vec<String> = by_name.keys().cloned().collect();
      let condition = restricted(
         options.restrict.as_ref(),
         name_condition(columns, &names, MatchMode::Exact),
      );
      let rows = store.query_where(entity, &condition).await?;

      // The server compared names under its collation, which usually ignores case and
      // trailing spaces. Prefer an exact match and fall back to the folded form.
      let folding = Collation::CaseInsensitive;
      let mut exact: IndexMap<&str, IndexSet<usize>> = IndexMap::new();
      let mut folded: IndexMap<String, IndexSet<usize>> = IndexMap::new();
      for (row, record) in rows.iter().enumerate() {
         for column in columns {
            if let Some(value) = record.get_str(column) {
               exact.entry(value).or_default().insert(row);
               folded
                  .entry(folding.key(value).into_owned())
                  .or_default()
                  .insert(row);
            }
         }
      }

      let mut answered = vec![false; rows.len()];
      for (name, positions) in &by_name {
         let hits = match exact.get(name.as_str()) {
            Some(hits) => Some(hits),
            None => folded.get(&*folding.key(name)),
         };
         for &row in hits.into_iter().flatten() {
            answered[row] = true;
            slots.fill(positions, &rows[row], name)?;
         }
      }
      if let Some(row) = answered.iter().position(|a| !a) {
         return Err(Error::InternalConsistency(format!(
            "name lookup returned {}, which matches no requested name",
            rows[row]
         )));
      }
      slots.settle(by_name.values());
   }

   slots.finish()
}

/// Pair results with their identifiers, failing on the first one not found.
pub(crate) fn require_all(
   entity: &'static EntityType,
   ids: &[Identifier],
   results: Vec<Option<Record>>,
) -> Result<Vec<Record>> {
   results
      .into_iter()
      .zip(ids)
      .map(|(result, id)| {
         result.ok_or_else(|| Error::Lookup {
            entity: entity.name(),
            identifier: id.to_string(),
         })
      })
      .collect()
}
