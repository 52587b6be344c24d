use std::future::Future;

use crate::condition::Condition;
use crate::entity::EntityType;
use crate::error::Result;
use crate::record::Record;

/// The query capability the resolver runs on.
///
/// A store answers exactly one question: which records of an entity type satisfy a
/// condition, in the order the storage returns them. Connection handling, SQL
/// generation and concurrency are the store's business.
pub trait EntityStore: Send + Sync {
   /// Select records of `entity`, filtered by `condition` when one is given.
   fn query(
      &self,
      entity: &'static EntityType,
      condition: Option<&Condition>,
   ) -> impl Future<Output = Result<Vec<Record>>> + Send;

   /// Every record of `entity`.
   fn query_all(
      &self,
      entity: &'static EntityType,
   ) -> impl Future<Output = Result<Vec<Record>>> + Send {
      self.query(entity, None)
   }

   /// Records of `entity` matching `condition`.
   fn query_where(
      &self,
      entity: &'static EntityType,
      condition: &Condition,
   ) -> impl Future<Output = Result<Vec<Record>>> + Send {
      self.query(entity, Some(condition))
   }
}

impl<S: EntityStore> EntityStore for &S {
   fn query(
      &self,
      entity: &'static EntityType,
      condition: Option<&Condition>,
   ) -> impl Future<Output = Result<Vec<Record>>> + Send {
      (**self).query(entity, condition)
   }
}

impl<S: EntityStore> EntityStore for std::sync::Arc<S> {
   fn query(
      &self,
      entity: &'static EntityType,
      condition: Option<&Condition>,
   ) -> impl Future<Output = Result<Vec<Record>>> + Send {
      (**self).query(entity, condition)
   }
}
