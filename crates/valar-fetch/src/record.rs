use std::fmt;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::entity::EntityType;
use crate::error::{Error, Result};

/// One fetched row of an entity type.
///
/// Column values are kept as JSON values in column order. The primary key is extracted
/// when the record is built, so every record is guaranteed to carry one.
#[derive(Clone)]
pub struct Record {
   entity: &'static EntityType,
   id: i64,
   values: IndexMap<String, JsonValue>,
}

impl Record {
   /// Build a record from decoded column values.
   ///
   /// Fails with [`Error::MissingPrimaryKey`] if the primary-key column is absent or not an
   /// integer.
   pub fn new(entity: &'static EntityType, values: IndexMap<String, JsonValue>) -> Result<Self> {
      let id = values
         .get(entity.primary_key())
         .and_then(JsonValue::as_i64)
         .ok_or(Error::MissingPrimaryKey {
            entity: entity.name(),
            column: entity.primary_key(),
         })?;

      Ok(Self { entity, id, values })
   }

   pub fn entity(&self) -> &'static EntityType {
      self.entity
   }

   /// Value of the primary key.
   pub fn id(&self) -> i64 {
      self.id
   }

   pub fn get(&self, column: &str) -> Option<&JsonValue> {
      self.values.get(column)
   }

   /// The column's value if it is a string.
   pub fn get_str(&self, column: &str) -> Option<&str> {
      self.values.get(column).and_then(JsonValue::as_str)
   }

   /// Every column value, in column order.
   pub fn values(&self) -> &IndexMap<String, JsonValue> {
      &self.values
   }

   pub fn into_values(self) -> IndexMap<String, JsonValue> {
      self.values
   }

   /// Returns true if this record belongs to `entity`.
   pub fn is_a(&self, entity: &EntityType) -> bool {
      self.entity == entity
   }

   /// Short string of the id, e.g. `u12` for `Users(12)` or `ref.3` for `Refs(3)`.
   pub fn sstring(&self) -> String {
      format!("{}{}", self.entity.short_prefix(), self.id)
   }
}

impl PartialEq for Record {
   fn eq(&self, other: &Self) -> bool {
      self.entity == other.entity && self.values == other.values
   }
}

impl fmt::Debug for Record {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct(self.entity.name())
         .field("id", &self.id)
         .field("values", &self.values)
         .finish()
   }
}

impl fmt::Display for Record {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "{}({})", self.entity.name(), self.id)
   }
}

impl Serialize for Record {
   fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
   where
      S: Serializer,
   {
      self.values.serialize(serializer)
   }
}
