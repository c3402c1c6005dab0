// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    ActorId, ApplicationId, ApplicationRecord, ApplicationStatus, DiagnosticSeverity, PostingId,
    PostingRecord, PostingStatus, PostingType, SelectionItem, SlotTime, normalize_application,
    normalize_posting, normalize_posting_type, normalize_selections,
};
use serde_json::{Value, json};
use time::UtcOffset;

fn posting_record(value: Value) -> PostingRecord {
    serde_json::from_value(value).unwrap()
}

fn application_record(value: Value) -> ApplicationRecord {
    serde_json::from_value(value).unwrap()
}

// ============================================================================
// Posting type
// ============================================================================

#[test]
fn test_legacy_application_type_maps_to_regular_with_warning() {
    let result = normalize_posting_type(&posting_record(json!({ "type": "application" })));

    assert_eq!(result.value, PostingType::Regular);
    let diagnostic = result.diagnostic.unwrap();
    assert_eq!(diagnostic.severity, DiagnosticSeverity::Warning);
    assert_eq!(diagnostic.field, "type");
}

#[test]
fn test_missing_type_defaults_to_regular_with_error() {
    let result = normalize_posting_type(&posting_record(json!({})));

    assert_eq!(result.value, PostingType::Regular);
    assert_eq!(
        result.diagnostic.unwrap().severity,
        DiagnosticSeverity::Error
    );
}

#[test]
fn test_canonical_type_wins_without_diagnostic() {
    let result = normalize_posting_type(&posting_record(
        json!({ "postingType": "urgent", "type": "application" }),
    ));

    assert_eq!(result.value, PostingType::Urgent);
    assert!(result.diagnostic.is_none());
}

#[test]
fn test_legacy_fixed_maps_to_fixed() {
    let result = normalize_posting_type(&posting_record(json!({ "type": "fixed" })));
    assert_eq!(result.value, PostingType::Fixed);
    assert_eq!(
        result.diagnostic.unwrap().severity,
        DiagnosticSeverity::Warning
    );
}

#[test]
fn test_recruitment_type_used_after_type() {
    let result = normalize_posting_type(&posting_record(
        json!({ "type": "something-else", "recruitmentType": "fixed" }),
    ));
    assert_eq!(result.value, PostingType::Fixed);
    assert_eq!(result.diagnostic.unwrap().field, "recruitmentType");
}

#[test]
fn test_unrecognised_canonical_type_falls_through() {
    let result = normalize_posting_type(&posting_record(
        json!({ "postingType": "gig", "type": "fixed" }),
    ));
    assert_eq!(result.value, PostingType::Fixed);
}

#[test]
fn test_posting_type_normalization_is_total() {
    let inputs: Vec<Value> = vec![
        json!({}),
        json!({ "postingType": null }),
        json!({ "postingType": 7 }),
        json!({ "type": null, "recruitmentType": null }),
        json!({ "type": true }),
        json!({ "type": ["application"] }),
        json!({ "recruitmentType": { "kind": "fixed" } }),
        json!({ "postingType": "", "type": "", "recruitmentType": "" }),
    ];

    for input in inputs {
        let result = normalize_posting_type(&posting_record(input));
        assert_eq!(result.value, PostingType::Regular);
        assert_eq!(
            result.diagnostic.unwrap().severity,
            DiagnosticSeverity::Error
        );
    }
}

// ============================================================================
// Selections
// ============================================================================

#[test]
fn test_canonical_selections_preferred() {
    let record = application_record(json!({
        "postingId": "p-1",
        "applicantId": "u-1",
        "selections": [{ "role": "dealer", "timeSlot": "18:00", "date": "2026-10-19" }],
        "role": "floor",
        "timeSlot": "20:00"
    }));

    assert_eq!(
        normalize_selections(&record),
        vec![SelectionItem::new("dealer", "18:00", Some("2026-10-19"))]
    );
}

#[test]
fn test_parallel_arrays_zip_by_index() {
    let record = application_record(json!({
        "postingId": "p-1",
        "applicantId": "u-1",
        "assignedRoles": ["dealer", "floor", "cashier"],
        "assignedTimes": ["18:00", "20:00"],
        "assignedDates": ["2026-10-19", ""]
    }));

    assert_eq!(
        normalize_selections(&record),
        vec![
            SelectionItem::new("dealer", "18:00", Some("2026-10-19")),
            SelectionItem::new("floor", "20:00", None),
        ]
    );
}

#[test]
fn test_legacy_single_fields() {
    let record = application_record(json!({
        "jobPostingId": "p-1",
        "userId": "u-1",
        "role": "dealer",
        "timeSlot": "18:00",
        "assignedDate": "2026-10-19"
    }));

    assert_eq!(record.posting_id, "p-1");
    assert_eq!(record.applicant_id, "u-1");
    assert_eq!(
        normalize_selections(&record),
        vec![SelectionItem::new("dealer", "18:00", Some("2026-10-19"))]
    );
}

#[test]
fn test_record_without_selections_yields_empty_list() {
    let record = application_record(json!({ "postingId": "p-1", "applicantId": "u-1" }));
    assert!(normalize_selections(&record).is_empty());
}

#[test]
fn test_duplicate_selections_collapse() {
    let record = application_record(json!({
        "postingId": "p-1",
        "applicantId": "u-1",
        "selections": [
            { "role": "dealer", "timeSlot": "18:00" },
            { "role": "dealer", "timeSlot": "18:00" }
        ]
    }));
    assert_eq!(normalize_selections(&record).len(), 1);
}

// ============================================================================
// Whole documents
// ============================================================================

#[test]
fn test_normalize_posting_with_epoch_dates_and_tba_slot() {
    let record = posting_record(json!({
        "createdBy": "owner-1",
        "postingType": "tournament",
        "status": "open",
        "title": "Friday game night",
        "dateSpecificRequirements": [{
            "date": { "seconds": 1_792_368_000, "nanoseconds": 0 },
            "timeSlots": [
                { "time": "18:00", "roles": [{ "name": "dealer", "count": 2 }] },
                { "time": "", "isTimeToBeAnnounced": true, "tentativeDescription": "late",
                  "roles": [{ "name": "floor", "count": 1 }] }
            ]
        }]
    }));

    let posting = normalize_posting(&PostingId::new("p-1"), &record, UtcOffset::UTC).unwrap();

    assert_eq!(posting.owner_id, Some(ActorId::new("owner-1")));
    assert_eq!(posting.posting_type, PostingType::Tournament);
    assert_eq!(posting.requirements.len(), 1);
    assert_eq!(posting.requirements[0].date.as_deref(), Some("2026-10-19"));
    assert_eq!(
        posting.requirements[0].time_slots[1].time,
        SlotTime::ToBeAnnounced {
            description: Some(String::from("late"))
        }
    );
    assert_eq!(
        record.extra.get("title"),
        Some(&json!("Friday game night"))
    );
}

#[test]
fn test_normalize_posting_legacy_time_slots_become_wildcard() {
    let record = posting_record(json!({
        "type": "application",
        "timeSlots": [{ "time": "18:00", "roles": [{ "name": "dealer", "count": 2 }] }]
    }));

    let posting = normalize_posting(&PostingId::new("p-1"), &record, UtcOffset::UTC).unwrap();
    assert_eq!(posting.requirements.len(), 1);
    assert!(posting.requirements[0].date.is_none());
    assert_eq!(posting.status, PostingStatus::Open);
}

#[test]
fn test_normalize_posting_unknown_status_is_open() {
    let record = posting_record(json!({ "postingType": "regular", "status": "paused" }));
    let posting = normalize_posting(&PostingId::new("p-1"), &record, UtcOffset::UTC).unwrap();
    assert!(posting.is_open());
}

#[test]
fn test_unrecognised_date_shape_is_rejected() {
    let result: Result<PostingRecord, _> = serde_json::from_value(json!({
        "dateSpecificRequirements": [{ "date": true, "timeSlots": [] }]
    }));
    assert!(result.is_err());
}

#[test]
fn test_normalize_legacy_confirmed_application() {
    let record = application_record(json!({
        "postingId": "p-1",
        "applicantId": "u-1",
        "status": "confirmed",
        "role": "dealer",
        "timeSlot": "18:00"
    }));

    let application = normalize_application(&ApplicationId::new("a-1"), &record);
    assert_eq!(application.status, ApplicationStatus::Confirmed);
    assert_eq!(
        application.confirmed_selections,
        vec![SelectionItem::new("dealer", "18:00", None)]
    );
}

#[test]
fn test_normalize_application_pending_is_applied() {
    let record = application_record(json!({
        "postingId": "p-1",
        "applicantId": "u-1",
        "status": "pending",
        "confirmedSelections": [{ "role": "dealer", "timeSlot": "18:00" }]
    }));

    let application = normalize_application(&ApplicationId::new("a-1"), &record);
    assert_eq!(application.status, ApplicationStatus::Applied);
    assert!(application.confirmed_selections.is_empty());
}

#[test]
fn test_posting_owner_prefers_owner_id_over_created_by() {
    let owner = |value: Value| {
        normalize_posting(&PostingId::new("p-1"), &posting_record(value), UtcOffset::UTC)
            .unwrap()
            .owner_id
    };

    assert_eq!(
        owner(json!({ "ownerId": "boss", "createdBy": "assistant" })),
        Some(ActorId::new("boss"))
    );
    assert_eq!(
        owner(json!({ "ownerId": " ", "createdBy": "assistant" })),
        Some(ActorId::new("assistant"))
    );
    assert_eq!(owner(json!({ "createdBy": "" })), None);
    assert_eq!(owner(json!({})), None);
}
