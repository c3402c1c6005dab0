// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contract tests run against every store implementation.

use crate::{
    Collection, DocumentKey, DocumentPatch, DocumentStore, FieldOp, InMemoryStore,
    PersistenceError, ReadGuard, SqliteStore,
};
use serde_json::json;

fn key(id: &str) -> DocumentKey {
    DocumentKey::new(Collection::Postings, id)
}

fn set_status(id: &str, status: &str) -> DocumentPatch {
    DocumentPatch::update(
        key(id),
        vec![(String::from("status"), FieldOp::Set(json!(status)))],
    )
}

fn check_create_read_delete(store: &dyn DocumentStore) {
    assert!(store.read(&key("p-1")).unwrap().is_none());

    store.create(&key("p-1"), json!({ "status": "open" })).unwrap();
    let first = store.read(&key("p-1")).unwrap().unwrap();
    assert_eq!(first.value, json!({ "status": "open" }));

    store.create(&key("p-1"), json!({ "status": "closed" })).unwrap();
    let second = store.read(&key("p-1")).unwrap().unwrap();
    assert!(second.version > first.version);

    assert!(store.delete(&key("p-1")).unwrap());
    assert!(!store.delete(&key("p-1")).unwrap());
    assert!(store.read(&key("p-1")).unwrap().is_none());
}

fn check_commit_bumps_version(store: &dyn DocumentStore) {
    store.create(&key("p-1"), json!({ "status": "open" })).unwrap();
    let before = store.read(&key("p-1")).unwrap().unwrap();

    store
        .commit(
            &[ReadGuard {
                key: key("p-1"),
                version: Some(before.version),
            }],
            &[set_status("p-1", "closed")],
        )
        .unwrap();

    let after = store.read(&key("p-1")).unwrap().unwrap();
    assert!(after.version > before.version);
    assert_eq!(after.value, json!({ "status": "closed" }));
}

fn check_stale_read_conflicts_without_writing(store: &dyn DocumentStore) {
    store.create(&key("p-1"), json!({ "status": "open" })).unwrap();
    store.create(&key("p-2"), json!({ "status": "open" })).unwrap();
    let stale = store.read(&key("p-1")).unwrap().unwrap();

    store
        .commit(&[], &[set_status("p-1", "closed")])
        .unwrap();

    let result = store.commit(
        &[ReadGuard {
            key: key("p-1"),
            version: Some(stale.version),
        }],
        &[set_status("p-2", "closed")],
    );

    assert_eq!(
        result,
        Err(PersistenceError::Conflict {
            key: String::from("postings/p-1")
        })
    );
    assert_eq!(
        store.read(&key("p-2")).unwrap().unwrap().value,
        json!({ "status": "open" })
    );
}

fn check_deleted_document_conflicts(store: &dyn DocumentStore) {
    store.create(&key("p-1"), json!({ "status": "open" })).unwrap();
    let seen = store.read(&key("p-1")).unwrap().unwrap();
    store.delete(&key("p-1")).unwrap();
    store.create(&key("p-1"), json!({ "status": "open" })).unwrap();

    let result = store.commit(
        &[ReadGuard {
            key: key("p-1"),
            version: Some(seen.version),
        }],
        &[set_status("p-1", "closed")],
    );
    assert!(matches!(result, Err(PersistenceError::Conflict { .. })));
}

fn check_patch_of_missing_document_is_not_found(store: &dyn DocumentStore) {
    let result = store.commit(&[], &[set_status("missing", "closed")]);
    assert_eq!(
        result,
        Err(PersistenceError::NotFound(String::from("postings/missing")))
    );
}

fn check_insert_creates_missing_document_once(store: &dyn DocumentStore) {
    let absent = ReadGuard {
        key: key("p-new"),
        version: None,
    };
    let insert = DocumentPatch::insert(key("p-new"), json!({ "status": "open" })).unwrap();

    store.commit(&[absent.clone()], &[insert.clone()]).unwrap();
    assert_eq!(
        store.read(&key("p-new")).unwrap().unwrap().value,
        json!({ "status": "open" })
    );

    let again = store.commit(&[absent], &[insert]);
    assert!(matches!(again, Err(PersistenceError::Conflict { .. })));
}

fn check_list_filters_by_collection(store: &dyn DocumentStore) {
    store.create(&key("b"), json!({})).unwrap();
    store.create(&key("a"), json!({})).unwrap();
    store
        .create(&DocumentKey::work_record("w"), json!({}))
        .unwrap();

    let ids: Vec<String> = store
        .list(Collection::Postings)
        .unwrap()
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

fn check_all(make: impl Fn() -> Box<dyn DocumentStore>) {
    check_create_read_delete(make().as_ref());
    check_commit_bumps_version(make().as_ref());
    check_stale_read_conflicts_without_writing(make().as_ref());
    check_deleted_document_conflicts(make().as_ref());
    check_patch_of_missing_document_is_not_found(make().as_ref());
    check_insert_creates_missing_document_once(make().as_ref());
    check_list_filters_by_collection(make().as_ref());
}

#[test]
fn test_in_memory_store_contract() {
    check_all(|| -> Box<dyn DocumentStore> { Box::new(InMemoryStore::new()) });
}

#[test]
fn test_sqlite_in_memory_store_contract() {
    check_all(|| -> Box<dyn DocumentStore> { Box::new(SqliteStore::new_in_memory().unwrap()) });
}

#[test]
fn test_sqlite_file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staffing.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store.create(&key("p-1"), json!({ "status": "open" })).unwrap();
        store
            .commit(&[], &[set_status("p-1", "closed")])
            .unwrap();
    }

    let reopened = SqliteStore::open(&path).unwrap();
    let document = reopened.read(&key("p-1")).unwrap().unwrap();
    assert_eq!(document.value, json!({ "status": "closed" }));

    reopened.create(&key("p-2"), json!({})).unwrap();
    let newer = reopened.read(&key("p-2")).unwrap().unwrap();
    assert!(newer.version > document.version);
}
