//! Static entity metadata: columns, primary key and indexing columns.
//!
//! Entity types are declared once as `static` items and never change:
//!
//! ```
//! use valar_fetch::{Column, EntityType, SqlType};
//!
//! static USERS: EntityType = EntityType::new(
//!    "Users",
//!    "users",
//!    &[
//!       Column::new("id", SqlType::Integer).primary(),
//!       Column::new("username", SqlType::VarChar).unique(),
//!       Column::new("first_name", SqlType::VarChar),
//!    ],
//! );
//!
//! assert_eq!(USERS.primary_key(), "id");
//! assert_eq!(USERS.indexing_columns(), &["username"]);
//! ```

use std::fmt;
use std::sync::OnceLock;

use serde::Serialize;

/// MySQL column types that the schema uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
   VarChar,
   Char,
   Enum,
   Text,
   TinyInt,
   SmallInt,
   Integer,
   BigInt,
   Float,
   Double,
   Decimal,
   Date,
   DateTime,
   Timestamp,
   Time,
   Blob,
   Binary,
}

impl SqlType {
   /// The SQL spelling of the type.
   pub const fn name(self) -> &'static str {
      match self {
         SqlType::VarChar => "VARCHAR",
         SqlType::Char => "CHAR",
         SqlType::Enum => "ENUM",
         SqlType::Text => "TEXT",
         SqlType::TinyInt => "TINYINT",
         SqlType::SmallInt => "SMALLINT",
         SqlType::Integer => "INTEGER",
         SqlType::BigInt => "BIGINT",
         SqlType::Float => "FLOAT",
         SqlType::Double => "DOUBLE",
         SqlType::Decimal => "DECIMAL",
         SqlType::Date => "DATE",
         SqlType::DateTime => "DATETIME",
         SqlType::Timestamp => "TIMESTAMP",
         SqlType::Time => "TIME",
         SqlType::Blob => "BLOB",
         SqlType::Binary => "BINARY",
      }
   }

   /// `VARCHAR`, `CHAR` and `ENUM` columns hold short strings a person would type.
   ///
   /// `TEXT` is deliberately excluded: it cannot carry a plain unique index.
   pub const fn is_string_like(self) -> bool {
      matches!(self, SqlType::VarChar | SqlType::Char | SqlType::Enum)
   }
}

impl fmt::Display for SqlType {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.name())
   }
}

/// One column of an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
   name: &'static str,
   sql_type: SqlType,
   length: Option<u32>,
   nullable: bool,
   primary: bool,
   unique: bool,
   choices: &'static [&'static str],
}

impl Column {
   /// A `NOT NULL`, non-unique column. `VARCHAR` columns default to a length of 255.
   pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
      let length = match sql_type {
         SqlType::VarChar => Some(255),
         _ => None,
      };
      Self {
         name,
         sql_type,
         length,
         nullable: false,
         primary: false,
         unique: false,
         choices: &[],
      }
   }

   pub const fn primary(mut self) -> Self {
      self.primary = true;
      self
   }

   pub const fn unique(mut self) -> Self {
      self.unique = true;
      self
   }

   pub const fn nullable(mut self) -> Self {
      self.nullable = true;
      self
   }

   pub const fn length(mut self, length: u32) -> Self {
      self.length = Some(length);
      self
   }

   /// Allowed values of an `ENUM` column.
   pub const fn choices(mut self, choices: &'static [&'static str]) -> Self {
      self.choices = choices;
      self
   }

   pub const fn name(&self) -> &'static str {
      self.name
   }

   pub const fn sql_type(&self) -> SqlType {
      self.sql_type
   }

   pub const fn is_nullable(&self) -> bool {
      self.nullable
   }

   pub const fn is_primary(&self) -> bool {
      self.primary
   }

   pub const fn is_unique(&self) -> bool {
      self.unique
   }

   /// Unique and string-like: a natural key usable for lookup by name.
   pub const fn is_indexing(&self) -> bool {
      self.unique && self.sql_type.is_string_like()
   }

   /// Approximate DDL for this column, e.g. `name VARCHAR(255) NOT NULL UNIQUE`.
   fn schema_line(&self) -> String {
      let mut line = format!("{} {}", self.name, self.sql_type);
      if !self.choices.is_empty() {
         let quoted: Vec<String> = self.choices.iter().map(|c| format!("'{}'", c)).collect();
         line.push_str(&format!("({})", quoted.join(",")));
      } else if let Some(length) = self.length {
         line.push_str(&format!("({})", length));
      }
      line.push_str(if self.nullable { " NULL" } else { " NOT NULL" });
      if self.primary {
         line.push_str(" PRIMARY KEY");
      } else if self.unique {
         line.push_str(" UNIQUE");
      }
      line
   }
}

/// A row of [`EntityType::describe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescription {
   pub name: String,
   #[serde(rename = "type")]
   pub sql_type: String,
   pub length: Option<u32>,
   pub nullable: bool,
   pub choices: Option<Vec<String>>,
   pub primary: bool,
   pub unique: bool,
}

/// A table of the schema and the metadata the resolver needs about it.
#[derive(Debug)]
pub struct EntityType {
   name: &'static str,
   table: &'static str,
   columns: &'static [Column],
   primary_key: &'static str,
   short_prefix: Option<&'static str>,
   indexing: OnceLock<Vec<&'static str>>,
}

impl EntityType {
   /// Declare an entity type. The primary key is the first column marked
   /// [`primary`](Column::primary), or `id` if none is.
   pub const fn new(name: &'static str, table: &'static str, columns: &'static [Column]) -> Self {
      Self::build(name, table, columns, None)
   }

   /// Like [`new`](Self::new), with a custom prefix for [`Record::sstring`](crate::Record::sstring).
   pub const fn with_short_prefix(
      name: &'static str,
      table: &'static str,
      columns: &'static [Column],
      prefix: &'static str,
   ) -> Self {
      Self::build(name, table, columns, Some(prefix))
   }

   const fn build(
      name: &'static str,
      table: &'static str,
      columns: &'static [Column],
      short_prefix: Option<&'static str>,
   ) -> Self {
      Self {
         name,
         table,
         columns,
         primary_key: find_primary_key(columns),
         short_prefix,
         indexing: OnceLock::new(),
      }
   }

   pub fn name(&self) -> &'static str {
      self.name
   }

   pub fn table(&self) -> &'static str {
      self.table
   }

   pub fn columns(&self) -> &'static [Column] {
      self.columns
   }

   pub fn column(&self, name: &str) -> Option<&'static Column> {
      self.columns.iter().find(|c| c.name == name)
   }

   /// Name of the integer identity column.
   pub fn primary_key(&self) -> &'static str {
      self.primary_key
   }

   /// Columns that are both unique and string-like, in declaration order.
   ///
   /// Computed on first use and cached for the life of the process.
   pub fn indexing_columns(&self) -> &[&'static str] {
      self.indexing.get_or_init(|| {
         self
            .columns
            .iter()
            .filter(|c| c.is_indexing())
            .map(|c| c.name)
            .collect()
      })
   }

   /// Prefix for short record strings: the custom prefix, or the lowercased first
   /// letter of the entity name.
   pub fn short_prefix(&self) -> String {
      match self.short_prefix {
         Some(prefix) => prefix.to_string(),
         None => self
            .name
            .chars()
            .next()
            .map(|c| c.to_lowercase().collect())
            .unwrap_or_default(),
      }
   }

   /// One description per column, in declaration order.
   pub fn describe(&self) -> Vec<ColumnDescription> {
      self
         .columns
         .iter()
         .map(|c| ColumnDescription {
            name: c.name.to_string(),
            sql_type: c.sql_type.name().to_string(),
            length: c.length,
            nullable: c.nullable,
            choices: (!c.choices.is_empty())
               .then(|| c.choices.iter().map(|s| s.to_string()).collect()),
            primary: c.primary,
            unique: c.unique,
         })
         .collect()
   }

   /// Approximately the column section of `SHOW CREATE TABLE`.
   pub fn schema_lines(&self) -> String {
      self
         .columns
         .iter()
         .map(Column::schema_line)
         .collect::<Vec<_>>()
         .join(",\n")
   }
}

impl PartialEq for EntityType {
   fn eq(&self, other: &Self) -> bool {
      self.name == other.name && self.table == other.table
   }
}

impl Eq for EntityType {}

impl fmt::Display for EntityType {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.name)
   }
}

const fn find_primary_key(columns: &[Column]) -> &'static str {
   let mut i = 0;
   while i < columns.len() {
      if columns[i].primary {
         return columns[i].name;
      }
      i += 1;
   }
   "id"
}
