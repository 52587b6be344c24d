//! [`EntityStore`] over a live MySQL database.

use std::future::Future;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, QueryBuilder};
use tracing::debug;
use valar_conn_mgr::ValarDatabase;

use crate::condition::Condition;
use crate::entity::EntityType;
use crate::error::Result;
use crate::record::Record;
use crate::store::EntityStore;

/// Entity store that runs `SELECT * FROM <table> WHERE ...` against a [`ValarDatabase`].
///
/// Conditions are rendered with bound parameters; only identifiers are written into the
/// SQL text, and those are backtick-quoted.
#[derive(Debug, Clone)]
pub struct MySqlStore {
   db: Arc<ValarDatabase>,
}

impl MySqlStore {
   pub fn new(db: Arc<ValarDatabase>) -> Self {
      Self { db }
   }

   /// Get the inner database handle
   pub fn database(&self) -> &Arc<ValarDatabase> {
      &self.db
   }

   async fn run(
      &self,
      entity: &'static EntityType,
      condition: Option<&Condition>,
   ) -> Result<Vec<Record>> {
      let mut builder = select_query(entity, condition);
      debug!("{}", builder.sql());

      let rows = builder.build().fetch_all(self.db.pool()?).await?;
      decode_rows(entity, rows)
   }
}

impl EntityStore for MySqlStore {
   fn query(
      &self,
      entity: &'static EntityType,
      condition: Option<&Condition>,
   ) -> impl Future<Output = Result<Vec<Record>>> + Send {
      self.run(entity, condition)
   }
}

/// Build the SELECT statement for `entity` filtered by `condition`.
pub fn select_query(
   entity: &'static EntityType,
   condition: Option<&Condition>,
) -> QueryBuilder<'static, MySql> {
   let mut builder = QueryBuilder::new("SELECT * FROM ");
   builder.push(quote_ident(entity.table()));
   if let Some(condition) = condition {
      builder.push(" WHERE ");
      push_condition(&mut builder, condition);
   }
   builder
}

fn push_condition(builder: &mut QueryBuilder<'static, MySql>, condition: &Condition) {
   match condition {
      Condition::Eq { column, value } => {
         builder.push(quote_ident(column));
         builder.push(" = ");
         push_json_bind(builder, value.clone());
      }
      Condition::In { column, values } => {
         if values.is_empty() {
            builder.push("FALSE");
            return;
         }
         builder.push(quote_ident(column));
         builder.push(" IN (");
         for (i, value) in values.iter().enumerate() {
            if i > 0 {
               builder.push(", ");
            }
            push_json_bind(builder, value.clone());
         }
         builder.push(")");
      }
      Condition::Contains { column, needle } => {
         builder.push(quote_ident(column));
         builder.push(" LIKE ");
         builder.push_bind(format!("%{}%", escape_like(needle)));
      }
      Condition::Regexp { column, pattern } => {
         builder.push(quote_ident(column));
         builder.push(" REGEXP ");
         builder.push_bind(pattern.clone());
      }
      Condition::And(conditions) => push_joined(builder, conditions, " AND ", "TRUE"),
      Condition::Or(conditions) => push_joined(builder, conditions, " OR ", "FALSE"),
   }
}

fn push_joined(
   builder: &mut QueryBuilder<'static, MySql>,
   conditions: &[Condition],
   separator: &str,
   empty: &str,
) {
   if conditions.is_empty() {
      builder.push(empty);
      return;
   }
   builder.push("(");
   for (i, condition) in conditions.iter().enumerate() {
      if i > 0 {
         builder.push(separator);
      }
      push_condition(builder, condition);
   }
   builder.push(")");
}

/// Helper function to bind a JSON value to a MySQL query
fn push_json_bind(builder: &mut QueryBuilder<'static, MySql>, value: JsonValue) {
   match value {
      JsonValue::Null => {
         builder.push_bind(None::<String>);
      }
      JsonValue::String(s) => {
         builder.push_bind(s);
      }
      JsonValue::Bool(b) => {
         builder.push_bind(b);
      }
      JsonValue::Number(number) => {
         // Preserve integer precision by binding as i64 or u64 when possible
         if let Some(int_val) = number.as_i64() {
            builder.push_bind(int_val);
         } else if let Some(uint_val) = number.as_u64() {
            builder.push_bind(uint_val);
         } else {
            builder.push_bind(number.as_f64().unwrap_or_default());
         }
      }
      other => {
         builder.push_bind(other);
      }
   }
}

/// Backtick-quote a MySQL identifier.
fn quote_ident(ident: &str) -> String {
   format!("`{}`", ident.replace('`', "``"))
}

/// Escape LIKE wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
   let mut escaped = String::with_capacity(needle.len());
   for c in needle.chars() {
      if matches!(c, '\\' | '%' | '_') {
         escaped.push('\\');
      }
      escaped.push(c);
   }
   escaped
}

/// Helper to decode MySQL rows into records of `entity`
fn decode_rows(entity: &'static EntityType, rows: Vec<MySqlRow>) -> Result<Vec<Record>> {
   use sqlx::{Column, Row};

   let mut records = Vec::with_capacity(rows.len());
   for row in rows {
      let mut values = IndexMap::default();
      for (i, column) in row.columns().iter().enumerate() {
         let v = row.try_get_raw(i)?;
         let v = crate::decode::to_json(v)?;
         values.insert(column.name().to_string(), v);
      }
      records.push(Record::new(entity, values)?);
   }
   Ok(records)
}
