//! Resolution builders returned by [`FetchResolver`]

use std::future::{Future, IntoFuture};
use std::pin::Pin;

use crate::condition::Condition;
use crate::entity::EntityType;
use crate::error::{Error, Result};
use crate::identifier::Identifier;
use crate::record::Record;
use crate::resolver::{self, BatchOptions, FetchResolver, MatchMode};
use crate::store::EntityStore;

/// Builder for resolving a single identifier
pub struct ResolveOneBuilder<'a, S> {
   resolver: &'a FetchResolver<S>,
   entity: &'static EntityType,
   id: Identifier,
   like: bool,
   regex: bool,
}

impl<'a, S: EntityStore + 'a> ResolveOneBuilder<'a, S> {
   pub(crate) fn new(
      resolver: &'a FetchResolver<S>,
      entity: &'static EntityType,
      id: Identifier,
   ) -> Self {
      Self {
         resolver,
         entity,
         id,
         like: false,
         regex: false,
      }
   }

   /// Match names as substrings of the indexing columns, with `%` and `_` taken literally
   pub fn like(mut self) -> Self {
      self.like = true;
      self
   }

   /// Match names as regular expressions against the indexing columns
   pub fn regex(mut self) -> Self {
      self.regex = true;
      self
   }

   /// Execute the lookup and return the record, if any
   pub async fn execute(self) -> Result<Option<Record>> {
      let mode = MatchMode::from_flags(self.like, self.regex)?;
      resolver::resolve_one(self.resolver.store(), self.entity, self.id, mode).await
   }

   /// Execute the lookup, failing with [`Error::Lookup`] when nothing matches
   pub async fn or_fail(self) -> Result<Record> {
      let entity = self.entity;
      let identifier = self.id.to_string();
      self.execute().await?.ok_or(Error::Lookup {
         entity: entity.name(),
         identifier,
      })
   }
}

impl<'a, S: EntityStore + 'a> IntoFuture for ResolveOneBuilder<'a, S> {
   type Output = Result<Option<Record>>;
   type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

   fn into_future(self) -> Self::IntoFuture {
      Box::pin(self.execute())
   }
}

/// Builder for resolving a batch of identifiers
pub struct ResolveManyBuilder<'a, S> {
   resolver: &'a FetchResolver<S>,
   entity: &'static EntityType,
   ids: Vec<Identifier>,
   options: BatchOptions,
}

impl<'a, S: EntityStore + 'a> ResolveManyBuilder<'a, S> {
   pub(crate) fn new(
      resolver: &'a FetchResolver<S>,
      entity: &'static EntityType,
      ids: Vec<Identifier>,
   ) -> Self {
      Self {
         resolver,
         entity,
         ids,
         options: BatchOptions::default(),
      }
   }

   /// Look supplied records up by primary key instead of returning them as given.
   ///
   /// They join the id query, so the batch still costs at most two queries.
   pub fn validate_instances(mut self) -> Self {
      self.options.validate_instances = true;
      self
   }

   /// Only match rows that also satisfy `condition`
   pub fn restrict(mut self, condition: Condition) -> Self {
      self.options.restrict = Some(condition);
      self
   }

   /// Execute the batch, returning one slot per identifier in input order
   pub async fn execute(self) -> Result<Vec<Option<Record>>> {
      resolver::resolve_many(self.resolver.store(), self.entity, self.ids, &self.options).await
   }

   /// Execute the batch, failing with [`Error::Lookup`] on the first identifier not found
   pub async fn or_fail(self) -> Result<Vec<Record>> {
      let entity = self.entity;
      let ids = self.ids.clone();
      let results = self.execute().await?;
      resolver::require_all(entity, &ids, results)
   }
}

impl<'a, S: EntityStore + 'a> IntoFuture for ResolveManyBuilder<'a, S> {
   type Output = Result<Vec<Option<Record>>>;
   type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + 'a>>;

   fn into_future(self) -> Self::IntoFuture {
      Box::pin(self.execute())
   }
}
