//! WHERE-clause trees handed to an [`EntityStore`](crate::EntityStore).
//!
//! Conditions are plain data: the MySQL store renders them to SQL with bound
//! parameters, and the memory store evaluates them against records directly.

use std::borrow::Cow;
use std::fmt;

use regex::RegexBuilder;
use serde_json::Value as JsonValue;

use crate::error::Result;
use crate::identifier::Identifier;
use crate::record::Record;

/// A boolean condition over the columns of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
   /// `column = value`
   Eq { column: String, value: JsonValue },
   /// `column IN (values...)`; false when `values` is empty
   In {
      column: String,
      values: Vec<JsonValue>,
   },
   /// `column LIKE '%needle%'` with `needle` matched literally
   Contains { column: String, needle: String },
   /// `column REGEXP pattern`
   Regexp { column: String, pattern: String },
   /// All of the conditions; true when empty
   And(Vec<Condition>),
   /// Any of the conditions; false when empty
   Or(Vec<Condition>),
}

impl Condition {
   pub fn eq(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
      Condition::Eq {
         column: column.into(),
         value: value.into(),
      }
   }

   pub fn is_in<I, V>(column: impl Into<String>, values: I) -> Self
   where
      I: IntoIterator<Item = V>,
      V: Into<JsonValue>,
   {
      Condition::In {
         column: column.into(),
         values: values.into_iter().map(Into::into).collect(),
      }
   }

   pub fn contains(column: impl Into<String>, needle: impl Into<String>) -> Self {
      Condition::Contains {
         column: column.into(),
         needle: needle.into(),
      }
   }

   pub fn regexp(column: impl Into<String>, pattern: impl Into<String>) -> Self {
      Condition::Regexp {
         column: column.into(),
         pattern: pattern.into(),
      }
   }

   pub fn and(conditions: Vec<Condition>) -> Self {
      Condition::And(conditions)
   }

   pub fn or(conditions: Vec<Condition>) -> Self {
      Condition::Or(conditions)
   }

   /// AND a list of conditions, without wrapping a single one.
   pub fn all(mut conditions: Vec<Condition>) -> Self {
      if conditions.len() == 1 {
         conditions.remove(0)
      } else {
         Condition::And(conditions)
      }
   }

   /// Evaluate against a record the way MySQL would with a binary collation.
   ///
   /// NULL and missing columns never match.
   pub fn matches(&self, record: &Record) -> Result<bool> {
      self.matches_with(record, Collation::Binary)
   }

   /// Evaluate against a record, comparing strings under `collation`.
   pub fn matches_with(&self, record: &Record, collation: Collation) -> Result<bool> {
      let matched = match self {
         Condition::Eq { column, value } => match record.get(column) {
            Some(found) if !found.is_null() => collation.json_eq(found, value),
            _ => false,
         },
         Condition::In { column, values } => match record.get(column) {
            Some(found) if !found.is_null() => values.iter().any(|v| collation.json_eq(found, v)),
            _ => false,
         },
         Condition::Contains { column, needle } => record.get_str(column).is_some_and(|found| {
            if collation.is_case_insensitive() {
               found.to_lowercase().contains(&needle.to_lowercase())
            } else {
               found.contains(needle.as_str())
            }
         }),
         Condition::Regexp { column, pattern } => match record.get_str(column) {
            Some(found) => RegexBuilder::new(pattern)
               .case_insensitive(collation.is_case_insensitive())
               .build()?
               .is_match(found),
            None => false,
         },
         Condition::And(conditions) => {
            for condition in conditions {
               if !condition.matches_with(record, collation)? {
                  return Ok(false);
               }
            }
            true
         }
         Condition::Or(conditions) => {
            for condition in conditions {
               if condition.matches_with(record, collation)? {
                  return Ok(true);
               }
            }
            false
         }
      };
      Ok(matched)
   }
}

/// How string values compare.
///
/// MySQL's default collations (`utf8mb4_general_ci`, `utf8mb4_0900_ai_ci`) ignore case,
/// and the PAD SPACE ones also ignore trailing spaces. `CaseInsensitive` approximates
/// both; accent folding is not modelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Collation {
   /// Byte equality, as with `utf8mb4_bin`.
   #[default]
   Binary,
   CaseInsensitive,
}

impl Collation {
   pub fn is_case_insensitive(self) -> bool {
      self == Collation::CaseInsensitive
   }

   /// The form under which two strings compare equal.
   pub fn key(self, value: &str) -> Cow<'_, str> {
      match self {
         Collation::Binary => Cow::Borrowed(value),
         Collation::CaseInsensitive => Cow::Owned(value.trim_end_matches(' ').to_lowercase()),
      }
   }

   fn json_eq(self, found: &JsonValue, wanted: &JsonValue) -> bool {
      match (found, wanted) {
         (JsonValue::String(a), JsonValue::String(b)) => self.key(a) == self.key(b),
         _ => found == wanted,
      }
   }
}

impl fmt::Display for Condition {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Condition::Eq { column, value } => write!(f, "{} = {}", column, value),
         Condition::In { column, values } => {
            let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            write!(f, "{} IN ({})", column, values.join(", "))
         }
         Condition::Contains { column, needle } => write!(f, "{} LIKE %{}%", column, needle),
         Condition::Regexp { column, pattern } => write!(f, "{} REGEXP {}", column, pattern),
         Condition::And(conditions) => write_joined(f, conditions, " AND ", "TRUE"),
         Condition::Or(conditions) => write_joined(f, conditions, " OR ", "FALSE"),
      }
   }
}

/// One argument to [`FetchResolver::to_query_conditions`](crate::FetchResolver::to_query_conditions).
#[derive(Debug, Clone, PartialEq)]
pub enum QueryTerm {
   Condition(Condition),
   Identifier(Identifier),
}

/// A list of query terms; build it from a single term or from a `Vec`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryTerms(Vec<QueryTerm>);

impl QueryTerms {
   pub fn into_inner(self) -> Vec<QueryTerm> {
      self.0
   }
}

impl From<Condition> for QueryTerm {
   fn from(condition: Condition) -> Self {
      QueryTerm::Condition(condition)
   }
}

impl From<Identifier> for QueryTerm {
   fn from(id: Identifier) -> Self {
      QueryTerm::Identifier(id)
   }
}

impl From<QueryTerm> for QueryTerms {
   fn from(term: QueryTerm) -> Self {
      QueryTerms(vec![term])
   }
}

impl From<Vec<QueryTerm>> for QueryTerms {
   fn from(terms: Vec<QueryTerm>) -> Self {
      QueryTerms(terms)
   }
}

impl FromIterator<QueryTerm> for QueryTerms {
   fn from_iter<I: IntoIterator<Item = QueryTerm>>(iter: I) -> Self {
      QueryTerms(iter.into_iter().collect())
   }
}

macro_rules! query_terms_from {
   ($($t:ty),*) => {
      $(
         impl From<$t> for QueryTerms {
            fn from(term: $t) -> Self {
               QueryTerms(vec![term.into()])
            }
         }

         impl From<Vec<$t>> for QueryTerms {
            fn from(terms: Vec<$t>) -> Self {
               terms.into_iter().map(QueryTerm::from).collect()
            }
         }
      )*
   };
}

query_terms_from!(Condition, Identifier);

fn write_joined(
   f: &mut fmt::Formatter<'_>,
   conditions: &[Condition],
   separator: &str,
   empty: &str,
) -> fmt::Result {
   if conditions.is_empty() {
      return f.write_str(empty);
   }
   let parts: Vec<String> = conditions.iter().map(|c| c.to_string()).collect();
   write!(f, "({})", parts.join(separator))
}
