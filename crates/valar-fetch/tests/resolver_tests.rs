mod common;

use std::future::Future;
use std::sync::Arc;

use common::{BATCHES, REFS, USERS, WELLS, batch, ids, record, resolver, user};
use serde_json::json;
use valar_fetch::{
   Collation, Condition, EntityStore, EntityType, Error, FetchResolver, Identifier, LoggedQuery,
   MemoryStore, QueryTerm, QueryTerms, Record,
};

/// Returns every row of the table whatever the condition.
struct UnfilteredStore(MemoryStore);

impl EntityStore for UnfilteredStore {
   fn query(
      &self,
      entity: &'static EntityType,
      _condition: Option<&Condition>,
   ) -> impl Future<Output = valar_fetch::Result<Vec<Record>>> + Send {
      self.0.query(entity, None)
   }
}

#[tokio::test]
async fn test_resolve_one_by_id_and_name() {
   let resolver = resolver();

   let alice = resolver.resolve_one(&USERS, 1).await.unwrap().unwrap();
   assert_eq!(alice.get_str("username"), Some("alice"));

   let bob = resolver.resolve_one(&USERS, "bob").await.unwrap().unwrap();
   assert_eq!(bob.id(), 2);

   assert_eq!(resolver.store().query_count(), 2);
}

#[tokio::test]
async fn test_resolve_one_missing() {
   let resolver = resolver();

   assert!(resolver.resolve_one(&USERS, 999).await.unwrap().is_none());
   assert!(resolver.resolve_one(&USERS, "carol").await.unwrap().is_none());

   let err = resolver.resolve_one_or_fail(&USERS, 999).await.unwrap_err();
   assert!(matches!(err, Error::Lookup { entity: "Users", .. }));
   assert!(err.to_string().contains("999"));
   assert_eq!(err.error_code(), "LOOKUP_FAILED");
}

#[tokio::test]
async fn test_resolve_one_instance_needs_no_query() {
   let resolver = resolver();
   let alice = user(1, "alice");

   let resolved = resolver.resolve_one(&USERS, &alice).await.unwrap();
   assert_eq!(resolved, Some(alice));
   assert_eq!(resolver.store().query_count(), 0);
}

#[tokio::test]
async fn test_resolve_one_type_mismatch() {
   let resolver = resolver();
   let chembl = resolver.resolve_one_or_fail(&REFS, "chembl").await.unwrap();
   resolver.store().clear_log();

   let err = resolver.resolve_one(&USERS, chembl).await.unwrap_err();
   assert!(matches!(
      err,
      Error::TypeMismatch {
         expected: "Users",
         found: "Refs"
      }
   ));
   assert_eq!(resolver.store().query_count(), 0);
}

#[tokio::test]
async fn test_name_lookup_without_indexing_column() {
   let resolver = resolver();

   let err = resolver.resolve_one(&WELLS, "A01").await.unwrap_err();
   assert!(matches!(err, Error::NoIndexingColumn("Wells")));

   // Ids still work
   let well = resolver.resolve_one(&WELLS, 100).await.unwrap();
   assert!(well.is_some());
}

#[tokio::test]
async fn test_resolve_one_like() {
   let resolver = resolver();

   let alice = resolver.resolve_one(&USERS, "lic").like().await.unwrap();
   assert_eq!(alice.map(|r| r.id()), Some(1));

   // Wildcards in the needle match literally
   let manual = resolver.resolve_one(&REFS, "_100%").like().await.unwrap();
   assert_eq!(manual.map(|r| r.id()), Some(3));
   assert!(resolver.resolve_one(&USERS, "a_i").like().await.unwrap().is_none());

   assert_eq!(
      resolver.store().queries()[0].condition,
      Some(Condition::or(vec![Condition::contains("username", "lic")]))
   );
}

#[tokio::test]
async fn test_resolve_one_regex() {
   let resolver = resolver();

   let bob = resolver.resolve_one(&USERS, "^b.b$").regex().await.unwrap();
   assert_eq!(bob.map(|r| r.id()), Some(2));

   let none = resolver.resolve_one(&USERS, "^z").regex().await.unwrap();
   assert!(none.is_none());
}

#[tokio::test]
async fn test_like_and_regex_conflict() {
   let resolver = resolver();

   let err = resolver
      .resolve_one(&USERS, "a")
      .like()
      .regex()
      .await
      .unwrap_err();
   assert!(matches!(err, Error::ConflictingMatchModes));
   assert_eq!(resolver.store().query_count(), 0);
}

#[tokio::test]
async fn test_resolve_many_empty() {
   let resolver = resolver();

   let results = resolver
      .resolve_many(&USERS, Vec::<Identifier>::new())
      .await
      .unwrap();
   assert!(results.is_empty());
   assert_eq!(resolver.store().query_count(), 0);
}

#[tokio::test]
async fn test_resolve_many_query_bounds() {
   let resolver = resolver();

   // Instances only
   resolver
      .resolve_many(&USERS, [user(1, "alice"), user(2, "bob")])
      .await
      .unwrap();
   assert_eq!(resolver.store().query_count(), 0);

   // Ids only
   resolver.resolve_many(&USERS, [1, 2, 3]).await.unwrap();
   assert_eq!(resolver.store().query_count(), 1);
   resolver.store().clear_log();

   // Names only
   resolver.resolve_many(&USERS, ["alice", "bob"]).await.unwrap();
   assert_eq!(resolver.store().query_count(), 1);
   resolver.store().clear_log();

   // Everything
   let mixed: Vec<Identifier> = vec![user(1, "alice").into(), 2.into(), "bob".into()];
   resolver.resolve_many(&USERS, mixed).await.unwrap();
   assert_eq!(resolver.store().query_count(), 2);
}

#[tokio::test]
async fn test_resolve_many_preserves_order() {
   let resolver = resolver();

   let results = resolver
      .resolve_many(
         &USERS,
         vec![Identifier::from(1), "bob".into(), "alice".into(), 2.into()],
      )
      .await
      .unwrap();
   assert_eq!(ids(&results), vec![Some(1), Some(2), Some(1), Some(2)]);

   let results = resolver.resolve_many(&USERS, [2, 999, 1]).await.unwrap();
   assert_eq!(ids(&results), vec![Some(2), None, Some(1)]);
}

#[tokio::test]
async fn test_duplicate_ids_share_one_key() {
   let resolver = resolver();

   let results = resolver.resolve_many(&USERS, [2, 2, 2]).await.unwrap();
   assert_eq!(results, vec![Some(user(2, "bob")); 3]);
   assert_eq!(
      resolver.store().queries()[0].condition,
      Some(Condition::is_in("id", [2]))
   );
   resolver.store().clear_log();

   let results = resolver.resolve_many(&USERS, [5, 5, 5]).await.unwrap();
   assert_eq!(results, vec![None, None, None]);

   assert_eq!(
      resolver.store().queries(),
      vec![LoggedQuery {
         table: "users",
         condition: Some(Condition::is_in("id", [5])),
      }]
   );
}

#[tokio::test]
async fn test_names_match_every_indexing_column() {
   let resolver = resolver();

   let results = resolver
      .resolve_many(&BATCHES, ["plate_a", "bbbb2222", "nope"])
      .await
      .unwrap();
   assert_eq!(ids(&results), vec![Some(10), Some(11), None]);

   assert_eq!(
      resolver.store().queries()[0].condition,
      Some(Condition::or(vec![
         Condition::is_in("lookup_hash", ["plate_a", "bbbb2222", "nope"]),
         Condition::is_in("tag", ["plate_a", "bbbb2222", "nope"]),
      ]))
   );
}

#[tokio::test]
async fn test_bad_batch_fails_before_querying() {
   let resolver = resolver();
   let chembl = record(&REFS, &[("id", json!(1)), ("name", json!("chembl"))]);

   let batch: Vec<Identifier> = vec![1.into(), "bob".into(), chembl.into()];
   let err = resolver.resolve_many(&USERS, batch).await.unwrap_err();
   assert!(matches!(err, Error::TypeMismatch { .. }));

   let err = resolver
      .resolve_many(&WELLS, vec![Identifier::from(100), "A01".into()])
      .await
      .unwrap_err();
   assert!(matches!(err, Error::NoIndexingColumn("Wells")));

   assert_eq!(resolver.store().query_count(), 0);
}

#[tokio::test]
async fn test_resolve_many_or_fail_names_the_missing_identifier() {
   let resolver = resolver();

   let users = resolver
      .resolve_many_or_fail(&USERS, ["bob", "alice"])
      .await
      .unwrap();
   assert_eq!(users, vec![user(2, "bob"), user(1, "alice")]);

   let err = resolver
      .resolve_many_or_fail(&USERS, vec![Identifier::from(1), "carol".into()])
      .await
      .unwrap_err();
   assert!(matches!(err, Error::Lookup { ref identifier, .. } if identifier == "carol"));
}

#[tokio::test]
async fn test_conflicting_name_matches() {
   // The tag of one batch equals the lookup hash of another
   let resolver = FetchResolver::new(MemoryStore::with_records([
      batch(10, "aaaa1111", Some("shared")),
      batch(12, "shared", None),
   ]));

   let err = resolver
      .resolve_many(&BATCHES, ["shared"])
      .await
      .unwrap_err();
   assert!(matches!(err, Error::InternalConsistency(_)));
   assert_eq!(err.error_code(), "INTERNAL_CONSISTENCY");
   assert!(!err.is_caller_error());
}

#[tokio::test]
async fn test_names_follow_case_insensitive_collation() {
   let store = MemoryStore::with_records([user(1, "alice"), user(2, "bob")])
      .with_collation(Collation::CaseInsensitive);
   let resolver = FetchResolver::new(store);

   let one = resolver.resolve_one(&USERS, "ALICE").await.unwrap();
   assert_eq!(one.map(|r| r.id()), Some(1));

   let results = resolver
      .resolve_many(&USERS, ["ALICE", "bob ", "alice", "carol"])
      .await
      .unwrap();
   assert_eq!(ids(&results), vec![Some(1), Some(2), Some(1), None]);
}

#[tokio::test]
async fn test_unrequested_rows_are_inconsistent() {
   let resolver = FetchResolver::new(UnfilteredStore(MemoryStore::with_records([
      user(1, "alice"),
      user(2, "bob"),
   ])));

   let err = resolver.resolve_many(&USERS, ["alice"]).await.unwrap_err();
   assert!(matches!(err, Error::InternalConsistency(ref m) if m.contains("Users(2)")));

   let err = resolver.resolve_many(&USERS, [1]).await.unwrap_err();
   assert!(matches!(err, Error::InternalConsistency(_)));
}

#[tokio::test]
async fn test_duplicate_primary_keys() {
   let resolver = FetchResolver::new(MemoryStore::with_records([
      user(1, "alice"),
      user(1, "alice_again"),
   ]));

   let err = resolver.resolve_many(&USERS, [1]).await.unwrap_err();
   assert!(matches!(err, Error::InternalConsistency(_)));

   let err = resolver.resolve_one(&USERS, 1).await.unwrap_err();
   assert!(matches!(err, Error::InternalConsistency(_)));
}

#[tokio::test]
async fn test_validate_instances() {
   let resolver = resolver();
   let stale = user(1, "renamed");
   let deleted = user(50, "gone");

   let results = resolver
      .resolve_many(&USERS, vec![Identifier::from(stale), deleted.into(), "bob".into()])
      .validate_instances()
      .await
      .unwrap();

   assert_eq!(results, vec![Some(user(1, "alice")), None, Some(user(2, "bob"))]);
   assert_eq!(resolver.store().query_count(), 2);
   assert_eq!(
      resolver.store().queries()[0].condition,
      Some(Condition::is_in("id", [1, 50]))
   );
}

#[tokio::test]
async fn test_restrict_applies_to_every_query() {
   let resolver = resolver();
   let everyone = Condition::eq("last_name", "Test");
   let nobody = Condition::eq("last_name", "Nobody");

   let results = resolver
      .resolve_many(&USERS, vec![Identifier::from(1), "bob".into()])
      .restrict(everyone.clone())
      .await
      .unwrap();
   assert_eq!(ids(&results), vec![Some(1), Some(2)]);

   let results = resolver
      .resolve_many(&USERS, vec![Identifier::from(1), "bob".into()])
      .restrict(nobody.clone())
      .await
      .unwrap();
   assert_eq!(results, vec![None, None]);

   let queries = resolver.store().queries();
   assert_eq!(queries.len(), 4);
   assert_eq!(
      queries[2].condition,
      Some(Condition::and(vec![nobody, Condition::is_in("id", [1])]))
   );
}

#[tokio::test]
async fn test_to_query_conditions() {
   let resolver = resolver();

   // Conditions pass through
   let conditions = resolver
      .to_query_conditions(&USERS, vec![Condition::eq("last_name", "Test")])
      .await
      .unwrap();
   assert_eq!(conditions, vec![Condition::eq("last_name", "Test")]);
   assert_eq!(resolver.store().query_count(), 0);

   // One identifier becomes an equality on the primary key
   let conditions = resolver
      .to_query_conditions(&USERS, Identifier::from("bob"))
      .await
      .unwrap();
   assert_eq!(conditions, vec![Condition::eq("id", 2)]);

   // Several become IN, without repeats
   let conditions = resolver
      .to_query_conditions(
         &USERS,
         vec![Identifier::from(2), "alice".into(), 1.into()],
      )
      .await
      .unwrap();
   assert_eq!(conditions, vec![Condition::is_in("id", [2, 1])]);

   let conditions = resolver
      .to_query_conditions(&USERS, QueryTerms::default())
      .await
      .unwrap();
   assert!(conditions.is_empty());
}

#[tokio::test]
async fn test_to_query_conditions_errors() {
   let resolver = resolver();

   let mixed = QueryTerms::from(vec![
      QueryTerm::from(Condition::eq("last_name", "Test")),
      QueryTerm::from(Identifier::from(1)),
   ]);
   let err = resolver.to_query_conditions(&USERS, mixed).await.unwrap_err();
   assert!(matches!(err, Error::MixedQueryTerms("Users")));
   assert_eq!(resolver.store().query_count(), 0);

   let err = resolver
      .to_query_conditions(&USERS, Identifier::from(999))
      .await
      .unwrap_err();
   assert!(matches!(err, Error::Lookup { .. }));
}

#[tokio::test]
async fn test_list_where() {
   let resolver = resolver();

   let all = resolver.list_where(&USERS, vec![]).await.unwrap();
   assert_eq!(all.len(), 2);

   let bobs = resolver
      .list_where(
         &USERS,
         vec![Condition::eq("last_name", "Test"), Condition::contains("username", "ob")],
      )
      .await
      .unwrap();
   assert_eq!(bobs, vec![user(2, "bob")]);

   let conditions = resolver
      .to_query_conditions(&REFS, vec![Identifier::from("chembl"), "drugbank".into()])
      .await
      .unwrap();
   let refs = resolver.list_where(&REFS, conditions).await.unwrap();
   let names: Vec<&str> = refs.iter().filter_map(|r| r.get_str("name")).collect();
   assert_eq!(names, vec!["chembl", "drugbank"]);
}

#[tokio::test]
async fn test_identifiers_from_json() {
   let resolver = resolver();
   let raw = vec![json!(2), json!("alice"), json!(1.0)];

   let identifiers = raw
      .iter()
      .map(Identifier::try_from)
      .collect::<Result<Vec<_>, _>>()
      .unwrap();
   let results = resolver.resolve_many(&USERS, identifiers).await.unwrap();
   assert_eq!(ids(&results), vec![Some(2), Some(1), Some(1)]);

   let err = Identifier::try_from(&json!(true)).unwrap_err();
   assert!(err.is_caller_error());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resolver_is_shareable_across_tasks() {
   let resolver = FetchResolver::new(Arc::new(common::seeded_store()));

   let mut handles = Vec::new();
   for id in [1, 2, 999] {
      let resolver = resolver.clone();
      handles.push(tokio::spawn(async move {
         resolver.resolve_one(&USERS, id).await.map(|r| r.map(|r| r.id()))
      }));
   }

   let mut found = Vec::new();
   for handle in handles {
      found.push(handle.await.unwrap().unwrap());
   }
   assert_eq!(found, vec![Some(1), Some(2), None]);
   assert_eq!(resolver.store().query_count(), 3);
}

#[tokio::test]
async fn test_borrowed_store() {
   let store = common::seeded_store();
   let resolver = FetchResolver::new(&store);

   resolver.resolve_many(&USERS, [1, 2]).await.unwrap();
   assert_eq!(store.query_count(), 1);
   assert_eq!(store.query_all(&REFS).await.unwrap().len(), 3);
}
