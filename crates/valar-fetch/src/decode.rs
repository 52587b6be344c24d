use serde_json::Value as JsonValue;
use sqlx::mysql::MySqlValueRef;
use sqlx::{TypeInfo, Value, ValueRef};
use time::{Date, PrimitiveDateTime, Time};

use crate::Error;

/// Convert a MySQL value to a JSON value.
///
/// Integers keep their precision (unsigned columns decode as `u64`). DECIMAL values are
/// returned as strings to avoid rounding, dates and times as their text form, and
/// BINARY/BLOB values as base64-encoded strings since JSON has no binary type.
pub fn to_json(value: MySqlValueRef) -> Result<JsonValue, Error> {
   if value.is_null() {
      return Ok(JsonValue::Null);
   }

   let column_type = value.type_info().into_owned();
   let name = column_type.name();
   let value = ValueRef::to_owned(&value);

   let result = match name {
      "VARCHAR" | "CHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
         if let Ok(v) = value.try_decode::<String>() {
            JsonValue::String(v)
         } else {
            JsonValue::Null
         }
      }

      "BOOLEAN" => {
         if let Ok(v) = value.try_decode::<bool>() {
            JsonValue::Bool(v)
         } else {
            JsonValue::Null
         }
      }

      "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
         if let Ok(v) = value.try_decode::<i64>() {
            JsonValue::Number(v.into())
         } else {
            JsonValue::Null
         }
      }

      unsigned if unsigned.ends_with(" UNSIGNED") => {
         if let Ok(v) = value.try_decode::<u64>() {
            JsonValue::Number(v.into())
         } else {
            JsonValue::Null
         }
      }

      "YEAR" => {
         if let Ok(v) = value.try_decode::<u16>() {
            JsonValue::Number(v.into())
         } else {
            JsonValue::Null
         }
      }

      "FLOAT" => {
         if let Ok(v) = value.try_decode::<f32>() {
            JsonValue::from(f64::from(v))
         } else {
            JsonValue::Null
         }
      }

      "DOUBLE" => {
         if let Ok(v) = value.try_decode::<f64>() {
            JsonValue::from(v)
         } else {
            JsonValue::Null
         }
      }

      "DECIMAL" => {
         // MySQL sends DECIMAL as text on the wire in both protocols
         if let Ok(v) = value.try_decode_unchecked::<String>() {
            JsonValue::String(v)
         } else {
            JsonValue::Null
         }
      }

      "DATE" => {
         if let Ok(v) = value.try_decode::<Date>() {
            JsonValue::String(v.to_string())
         } else {
            JsonValue::Null
         }
      }

      "TIME" => {
         if let Ok(v) = value.try_decode::<Time>() {
            JsonValue::String(v.to_string())
         } else if let Ok(v) = value.try_decode_unchecked::<String>() {
            // Durations and negative values fall outside a time of day
            JsonValue::String(v)
         } else {
            JsonValue::Null
         }
      }

      "DATETIME" | "TIMESTAMP" => {
         if let Ok(dt) = value.try_decode::<PrimitiveDateTime>() {
            JsonValue::String(dt.to_string())
         } else if let Ok(v) = value.try_decode_unchecked::<String>() {
            // Fall back to string representation
            JsonValue::String(v)
         } else {
            JsonValue::Null
         }
      }

      "JSON" => value.try_decode::<JsonValue>().unwrap_or(JsonValue::Null),

      "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => {
         if let Ok(blob) = value.try_decode::<Vec<u8>>() {
            JsonValue::String(base64_encode(&blob))
         } else {
            JsonValue::Null
         }
      }

      "NULL" => JsonValue::Null,

      _ => {
         // For unknown types, try to decode as text
         if let Ok(text) = value.try_decode_unchecked::<String>() {
            JsonValue::String(text)
         } else {
            return Err(Error::UnsupportedDatatype(format!(
               "Unknown MySQL type: {}",
               name
            )));
         }
      }
   };

   Ok(result)
}

/// Base64 encode binary data for JSON serialization.
///
/// Valar stores hashes (`sha1`, `lookup_hash`) and frame data as BINARY/BLOB columns.
fn base64_encode(data: &[u8]) -> String {
   use base64::Engine;
   base64::engine::general_purpose::STANDARD.encode(data)
}
