#![allow(dead_code)]

use indexmap::IndexMap;
use serde_json::{Value as JsonValue, json};
use valar_fetch::{Column, EntityType, FetchResolver, MemoryStore, Record, SqlType};

pub static USERS: EntityType = EntityType::new(
   "Users",
   "users",
   &[
      Column::new("id", SqlType::Integer).primary(),
      Column::new("username", SqlType::VarChar).unique(),
      Column::new("first_name", SqlType::VarChar),
      Column::new("last_name", SqlType::VarChar),
   ],
);

pub static REFS: EntityType = EntityType::with_short_prefix(
   "Refs",
   "refs",
   &[
      Column::new("id", SqlType::SmallInt).primary(),
      Column::new("name", SqlType::VarChar).unique(),
      Column::new("external_version", SqlType::VarChar).nullable(),
   ],
   "ref.",
);

pub static BATCHES: EntityType = EntityType::new(
   "Batches",
   "batches",
   &[
      Column::new("id", SqlType::Integer).primary(),
      Column::new("lookup_hash", SqlType::VarChar).unique(),
      Column::new("tag", SqlType::VarChar).unique().nullable(),
   ],
);

/// No unique string column, so it cannot be looked up by name.
pub static WELLS: EntityType = EntityType::new(
   "Wells",
   "wells",
   &[
      Column::new("id", SqlType::Integer).primary(),
      Column::new("well_index", SqlType::SmallInt),
   ],
);

pub fn record(entity: &'static EntityType, pairs: &[(&str, JsonValue)]) -> Record {
   let values: IndexMap<String, JsonValue> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.clone()))
      .collect();
   Record::new(entity, values).unwrap()
}

pub fn user(id: i64, username: &str) -> Record {
   record(
      &USERS,
      &[
         ("id", json!(id)),
         ("username", json!(username)),
         ("first_name", json!(username.to_uppercase())),
         ("last_name", json!("Test")),
      ],
   )
}

pub fn batch(id: i64, lookup_hash: &str, tag: Option<&str>) -> Record {
   record(
      &BATCHES,
      &[
         ("id", json!(id)),
         ("lookup_hash", json!(lookup_hash)),
         ("tag", tag.map_or(JsonValue::Null, |t| json!(t))),
      ],
   )
}

/// Users alice (1) and bob (2), plus a few refs, batches and wells.
pub fn seeded_store() -> MemoryStore {
   MemoryStore::with_records([
      user(1, "alice"),
      user(2, "bob"),
      record(&REFS, &[("id", json!(1)), ("name", json!("chembl")), ("external_version", json!("27"))]),
      record(&REFS, &[("id", json!(2)), ("name", json!("drugbank")), ("external_version", JsonValue::Null)]),
      record(&REFS, &[("id", json!(3)), ("name", json!("manual_100%")), ("external_version", JsonValue::Null)]),
      batch(10, "aaaa1111", Some("plate_a")),
      batch(11, "bbbb2222", None),
      record(&WELLS, &[("id", json!(100)), ("well_index", json!(1))]),
   ])
}

pub fn resolver() -> FetchResolver<MemoryStore> {
   FetchResolver::new(seeded_store())
}

pub fn ids(records: &[Option<Record>]) -> Vec<Option<i64>> {
   records.iter().map(|r| r.as_ref().map(Record::id)).collect()
}
