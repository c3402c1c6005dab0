// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{EVENT_DATE, create_test_application, create_test_posting, legacy_posting_body};
use crate::{
    DocumentKey, DocumentStore, FieldOp, InMemoryStore, PersistenceError, RetryPolicy,
    application_ops, insert_application, insert_posting, load_application, load_posting,
    posting_ops, read_application, read_posting, run_transaction, stage_posting_patch,
};
use serde_json::{Value, json};
use staffing::{ApplicationPatch, PostingPatch, StatusChange};
use staffing_domain::{
    ActorId, ApplicationId, ApplicationStatus, CloseReason, ConfirmationAction,
    ConfirmationRecord, OccupantEntry, PostingId, PostingStatus, PostingType, SelectionItem,
    SlotTime,
};
use time::UtcOffset;
use time::macros::datetime;

#[test]
fn test_insert_then_read_posting_round_trips_canonical_view() {
    let store = InMemoryStore::new();
    let posting = create_test_posting();
    insert_posting(&store, &posting).unwrap();

    let read = read_posting(&store, &posting.id, UtcOffset::UTC).unwrap();
    assert_eq!(read, Some(posting));
}

#[test]
fn test_insert_then_load_application_in_transaction() {
    let store = InMemoryStore::new();
    let application = create_test_application();
    insert_application(&store, &application).unwrap();

    let loaded = run_transaction(&store, RetryPolicy::default(), |tx| {
        load_application(tx, &application.id)
    })
    .unwrap();
    assert_eq!(loaded, Some(application));
}

#[test]
fn test_missing_documents_read_as_none() {
    let store = InMemoryStore::new();
    assert!(
        read_posting(&store, &PostingId::new("nope"), UtcOffset::UTC)
            .unwrap()
            .is_none()
    );
    assert!(
        read_application(&store, &ApplicationId::new("nope"))
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_legacy_posting_document_is_normalized_on_read() {
    let store = InMemoryStore::new();
    let id = PostingId::new("legacy-1");
    store
        .create(&DocumentKey::posting(&id), legacy_posting_body())
        .unwrap();

    let posting = read_posting(&store, &id, UtcOffset::UTC).unwrap().unwrap();

    assert_eq!(posting.posting_type, PostingType::Regular);
    assert_eq!(posting.status, PostingStatus::Open);
    assert_eq!(posting.requirements.len(), 1);
    assert_eq!(posting.requirements[0].date, None);
    assert_eq!(posting.requirements[0].time_slots[0].time, SlotTime::at("18:00"));
    assert_eq!(posting.requirements[0].time_slots[0].required_for("dealer"), 2);
}

#[test]
fn test_legacy_application_aliases_are_accepted() {
    let store = InMemoryStore::new();
    let id = ApplicationId::new("legacy-app");
    store
        .create(
            &DocumentKey::application(&id),
            json!({
                "jobPostingId": "posting-1",
                "userId": "user-9",
                "status": "pending",
                "role": "dealer",
                "timeSlot": "18:00",
                "assignedDate": EVENT_DATE
            }),
        )
        .unwrap();

    let application = read_application(&store, &id).unwrap().unwrap();

    assert_eq!(application.posting_id, PostingId::new("posting-1"));
    assert_eq!(application.applicant_id, ActorId::new("user-9"));
    assert_eq!(application.status, ApplicationStatus::Applied);
    assert_eq!(
        application.selections,
        vec![SelectionItem::new("dealer", "18:00", Some(EVENT_DATE))]
    );
}

#[test]
fn test_unreadable_posting_document_is_an_error() {
    let store = InMemoryStore::new();
    let id = PostingId::new("broken");
    store
        .create(&DocumentKey::posting(&id), json!({ "confirmedStaff": "nope" }))
        .unwrap();

    let result = read_posting(&store, &id, UtcOffset::UTC);
    assert!(matches!(
        result,
        Err(PersistenceError::SerializationError(_))
    ));
}

#[test]
fn test_posting_ops_for_occupant_changes() {
    let entry = OccupantEntry::for_selection(
        &ActorId::new("user-1"),
        &SelectionItem::new("dealer", "18:00", Some(EVENT_DATE)),
    );
    let patch = PostingPatch {
        add_occupants: vec![entry.clone()],
        remove_occupants: vec![entry.clone()],
        status_change: None,
    };

    let ops = posting_ops(&patch).unwrap();
    let expected: Value = serde_json::to_value(&entry).unwrap();

    assert_eq!(
        ops,
        vec![
            (
                String::from("confirmedStaff"),
                FieldOp::ArrayUnion(vec![expected.clone()])
            ),
            (
                String::from("confirmedStaff"),
                FieldOp::ArrayRemoveMatching {
                    keys: vec![
                        String::from("userId"),
                        String::from("role"),
                        String::from("timeSlot"),
                        String::from("date"),
                    ],
                    values: vec![expected],
                }
            ),
        ]
    );
}

#[test]
fn test_posting_ops_for_status_changes() {
    let close = PostingPatch {
        status_change: Some(StatusChange::Close(CloseReason::Fulfilled)),
        ..PostingPatch::default()
    };
    assert_eq!(
        posting_ops(&close).unwrap(),
        vec![
            (String::from("status"), FieldOp::Set(json!("closed"))),
            (String::from("closeReason"), FieldOp::Set(json!("fulfilled"))),
        ]
    );

    let reopen = PostingPatch {
        status_change: Some(StatusChange::Reopen),
        ..PostingPatch::default()
    };
    assert_eq!(
        posting_ops(&reopen).unwrap(),
        vec![
            (String::from("status"), FieldOp::Set(json!("open"))),
            (String::from("closeReason"), FieldOp::Delete),
        ]
    );

    assert!(posting_ops(&PostingPatch::default()).unwrap().is_empty());
}

#[test]
fn test_application_ops_touch_only_owned_fields() {
    let selection = SelectionItem::new("dealer", "18:00", Some(EVENT_DATE));
    let patch = ApplicationPatch {
        status: ApplicationStatus::Confirmed,
        confirmed_selections: vec![selection.clone()],
        history_entry: ConfirmationRecord {
            action: ConfirmationAction::Confirmed,
            selections: vec![selection],
            actor_id: ActorId::new("owner-1"),
            at: datetime!(2026-10-19 12:00 UTC),
        },
    };

    let fields: Vec<String> = application_ops(&patch)
        .unwrap()
        .into_iter()
        .map(|(field, _)| field)
        .collect();
    assert_eq!(fields, vec!["status", "confirmedSelections", "history"]);
}

#[test]
fn test_staged_patch_preserves_legacy_fields() {
    let store = InMemoryStore::new();
    let id = PostingId::new("legacy-1");
    store
        .create(&DocumentKey::posting(&id), legacy_posting_body())
        .unwrap();

    let entry = OccupantEntry::for_selection(
        &ActorId::new("user-1"),
        &SelectionItem::new("dealer", "18:00", None),
    );
    let patch = PostingPatch {
        add_occupants: vec![entry.clone()],
        ..PostingPatch::default()
    };

    run_transaction(&store, RetryPolicy::default(), |tx| {
        let posting = load_posting(tx, &id, UtcOffset::UTC)?;
        assert!(posting.is_some());
        stage_posting_patch(tx, &id, &patch)
    })
    .unwrap();

    let body = store.read(&DocumentKey::posting(&id)).unwrap().unwrap().value;
    assert_eq!(body["type"], json!("application"));
    assert_eq!(body["title"], json!("Friday game night"));

    let posting = read_posting(&store, &id, UtcOffset::UTC).unwrap().unwrap();
    assert_eq!(posting.occupants, vec![entry]);
}
