//! Identifiers accepted by the fetch resolver.
//!
//! Typed callers build [`Identifier`]s with `From`. Loosely typed input (JSON from a
//! caller, user-entered numbers) goes through `TryFrom`, which is the only place an
//! identifier's kind is inferred at runtime.

use std::fmt;

use serde_json::Value as JsonValue;

use crate::error::Error;
use crate::record::Record;

/// Something that names one row of an entity type.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
   /// An already-fetched record; must belong to the requested entity type.
   ByInstance(Record),
   /// A primary-key value.
   ById(i64),
   /// A value of any of the entity type's indexing columns.
   ByName(String),
}

impl Identifier {
   /// Short name of the identifier kind, for logging.
   pub fn kind(&self) -> &'static str {
      match self {
         Identifier::ByInstance(_) => "instance",
         Identifier::ById(_) => "id",
         Identifier::ByName(_) => "name",
      }
   }
}

impl fmt::Display for Identifier {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Identifier::ByInstance(record) => write!(f, "{}", record),
         Identifier::ById(id) => write!(f, "{}", id),
         Identifier::ByName(name) => write!(f, "{}", name),
      }
   }
}

impl From<Record> for Identifier {
   fn from(record: Record) -> Self {
      Identifier::ByInstance(record)
   }
}

impl From<&Record> for Identifier {
   fn from(record: &Record) -> Self {
      Identifier::ByInstance(record.clone())
   }
}

impl From<String> for Identifier {
   fn from(name: String) -> Self {
      Identifier::ByName(name)
   }
}

impl From<&str> for Identifier {
   fn from(name: &str) -> Self {
      Identifier::ByName(name.to_string())
   }
}

impl From<&String> for Identifier {
   fn from(name: &String) -> Self {
      Identifier::ByName(name.clone())
   }
}

macro_rules! identifier_from_int {
   ($($t:ty),*) => {
      $(
         impl From<$t> for Identifier {
            fn from(id: $t) -> Self {
               Identifier::ById(i64::from(id))
            }
         }
      )*
   };
}

identifier_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl TryFrom<u64> for Identifier {
   type Error = Error;

   fn try_from(id: u64) -> Result<Self, Self::Error> {
      i64::try_from(id)
         .map(Identifier::ById)
         .map_err(|_| Error::InvalidIdentifierType(format!("u64 {} out of range", id)))
   }
}

impl TryFrom<usize> for Identifier {
   type Error = Error;

   fn try_from(id: usize) -> Result<Self, Self::Error> {
      i64::try_from(id)
         .map(Identifier::ById)
         .map_err(|_| Error::InvalidIdentifierType(format!("usize {} out of range", id)))
   }
}

/// Floats are accepted only when they hold an exact integer.
impl TryFrom<f64> for Identifier {
   type Error = Error;

   fn try_from(id: f64) -> Result<Self, Self::Error> {
      // i64::MAX as f64 rounds up to 2^63, which is itself out of range
      if id.is_finite() && id.fract() == 0.0 && id >= i64::MIN as f64 && id < i64::MAX as f64 {
         Ok(Identifier::ById(id as i64))
      } else {
         Err(Error::InvalidIdentifierType(format!(
            "float {} is not an integer",
            id
         )))
      }
   }
}

impl TryFrom<f32> for Identifier {
   type Error = Error;

   fn try_from(id: f32) -> Result<Self, Self::Error> {
      Identifier::try_from(f64::from(id))
   }
}

impl TryFrom<&JsonValue> for Identifier {
   type Error = Error;

   fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
      match value {
         JsonValue::String(name) => Ok(Identifier::ByName(name.clone())),
         JsonValue::Number(number) => {
            if let Some(id) = number.as_i64() {
               Ok(Identifier::ById(id))
            } else if let Some(id) = number.as_u64() {
               Identifier::try_from(id)
            } else {
               Identifier::try_from(number.as_f64().unwrap_or(f64::NAN))
            }
         }
         JsonValue::Null => Err(Error::InvalidIdentifierType("null".into())),
         JsonValue::Bool(_) => Err(Error::InvalidIdentifierType("bool".into())),
         JsonValue::Array(_) => Err(Error::InvalidIdentifierType("array".into())),
         JsonValue::Object(_) => Err(Error::InvalidIdentifierType("object".into())),
      }
   }
}

impl TryFrom<JsonValue> for Identifier {
   type Error = Error;

   fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
      Identifier::try_from(&value)
   }
}
