// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Cell, DateFulfillment, DateRequirement, FulfillmentKey, confirmed_count, full_cells,
    fulfillment_by_date, is_cell_full, is_fully_fulfilled, required_count,
    total_required_headcount, under_filled_dates,
};

use super::helpers::{
    EVENT_DATE, NEXT_DATE, create_posting, create_single_cell_posting, occupant, slot,
};

#[test]
fn test_confirmed_count_and_cell_full() {
    let mut posting = create_single_cell_posting();
    let cell = Cell::new(Some(EVENT_DATE), "18:00", "dealer");

    posting
        .occupants
        .push(occupant("x", "dealer", "18:00", Some(EVENT_DATE)));
    assert_eq!(confirmed_count(&posting, &cell), 1);
    assert!(!is_cell_full(&posting, &cell));

    posting
        .occupants
        .push(occupant("y", "dealer", "18:00", Some(EVENT_DATE)));
    assert_eq!(confirmed_count(&posting, &cell), 2);
    assert!(is_cell_full(&posting, &cell));
}

#[test]
fn test_undated_occupant_counts_toward_dated_cell() {
    let mut posting = create_single_cell_posting();
    posting.occupants.push(occupant("x", "dealer", "18:00", None));

    let cell = Cell::new(Some(EVENT_DATE), "18:00", "dealer");
    assert_eq!(confirmed_count(&posting, &cell), 1);
}

#[test]
fn test_unknown_cell_is_full() {
    let posting = create_single_cell_posting();
    let cell = Cell::new(Some(EVENT_DATE), "18:00", "floor");
    assert!(is_cell_full(&posting, &cell));
}

#[test]
fn test_full_cells_keeps_input_order() {
    let mut posting = create_posting(vec![DateRequirement::dated(
        EVENT_DATE,
        vec![slot("18:00", &[("dealer", 1), ("floor", 1)])],
    )]);
    posting
        .occupants
        .push(occupant("x", "floor", "18:00", Some(EVENT_DATE)));

    let dealer = Cell::new(Some(EVENT_DATE), "18:00", "dealer");
    let floor = Cell::new(Some(EVENT_DATE), "18:00", "floor");
    let cashier = Cell::new(Some(EVENT_DATE), "18:00", "cashier");

    assert_eq!(
        full_cells(&posting, &[cashier.clone(), dealer, floor.clone()]),
        vec![cashier, floor]
    );
}

#[test]
fn test_fulfillment_by_date_reports_each_date() {
    let mut posting = create_posting(vec![
        DateRequirement::dated(EVENT_DATE, vec![slot("18:00", &[("dealer", 2)])]),
        DateRequirement::dated(NEXT_DATE, vec![slot("18:00", &[("dealer", 3)])]),
    ]);
    posting
        .occupants
        .push(occupant("x", "dealer", "18:00", Some(EVENT_DATE)));
    posting
        .occupants
        .push(occupant("y", "dealer", "18:00", Some(EVENT_DATE)));
    posting
        .occupants
        .push(occupant("z", "dealer", "18:00", Some(NEXT_DATE)));

    let report = fulfillment_by_date(&posting);
    assert_eq!(
        report[&FulfillmentKey::Date(EVENT_DATE.to_string())],
        DateFulfillment {
            confirmed: 2,
            required: 2,
            percentage: 100
        }
    );
    assert_eq!(
        report[&FulfillmentKey::Date(NEXT_DATE.to_string())],
        DateFulfillment {
            confirmed: 1,
            required: 3,
            percentage: 33
        }
    );
    assert!(!is_fully_fulfilled(&posting));
    assert_eq!(
        under_filled_dates(&posting),
        vec![FulfillmentKey::Date(NEXT_DATE.to_string())]
    );
}

#[test]
fn test_overfilled_cell_does_not_mask_underfilled_sibling() {
    let mut posting = create_posting(vec![DateRequirement::dated(
        EVENT_DATE,
        vec![slot("18:00", &[("dealer", 1), ("floor", 1)])],
    )]);
    posting
        .occupants
        .push(occupant("x", "dealer", "18:00", Some(EVENT_DATE)));
    posting
        .occupants
        .push(occupant("y", "dealer", "18:00", Some(EVENT_DATE)));

    let report = fulfillment_by_date(&posting);
    let day = &report[&FulfillmentKey::Date(EVENT_DATE.to_string())];
    assert_eq!(day.confirmed, 1);
    assert_eq!(day.percentage, 50);
    assert!(!is_fully_fulfilled(&posting));
}

#[test]
fn test_non_positive_count_is_never_fulfilled() {
    let posting = create_posting(vec![DateRequirement::dated(
        EVENT_DATE,
        vec![slot("18:00", &[("dealer", 0)])],
    )]);

    let report = fulfillment_by_date(&posting);
    assert_eq!(
        report[&FulfillmentKey::Date(EVENT_DATE.to_string())].percentage,
        99
    );
    assert!(!is_fully_fulfilled(&posting));
}

#[test]
fn test_wildcard_counts_occupants_of_any_date() {
    let mut posting = create_posting(vec![DateRequirement::wildcard(vec![slot(
        "18:00",
        &[("dealer", 2)],
    )])]);
    posting
        .occupants
        .push(occupant("x", "dealer", "18:00", Some(EVENT_DATE)));
    posting.occupants.push(occupant("y", "dealer", "18:00", None));

    let report = fulfillment_by_date(&posting);
    assert_eq!(report.len(), 1);
    assert_eq!(report[&FulfillmentKey::All].confirmed, 2);
    assert!(is_fully_fulfilled(&posting));
}

#[test]
fn test_posting_without_requirements_is_not_fulfilled() {
    let posting = create_posting(Vec::new());
    assert!(fulfillment_by_date(&posting).is_empty());
    assert!(!is_fully_fulfilled(&posting));

    let empty_date = create_posting(vec![DateRequirement::dated(EVENT_DATE, Vec::new())]);
    assert!(!is_fully_fulfilled(&empty_date));
}

#[test]
fn test_fulfillment_serializes_with_all_key() {
    let posting = create_posting(vec![DateRequirement::wildcard(vec![slot(
        "18:00",
        &[("dealer", 2)],
    )])]);

    let json = serde_json::to_value(fulfillment_by_date(&posting)).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "all": { "confirmed": 0, "required": 2, "percentage": 0 } })
    );
}

#[test]
fn test_huge_counts_saturate_instead_of_overflowing() {
    let huge: i64 = 5_000_000_000_000_000_000;
    let mut posting = create_posting(vec![DateRequirement::dated(
        EVENT_DATE,
        vec![
            slot("18:00", &[("dealer", huge), ("dealer", huge)]),
            slot("20:00", &[("dealer", huge)]),
        ],
    )]);
    posting
        .occupants
        .push(occupant("x", "dealer", "18:00", Some(EVENT_DATE)));

    let cell = Cell::new(Some(EVENT_DATE), "18:00", "dealer");
    assert_eq!(required_count(&posting, &cell), i64::MAX);
    assert!(!is_cell_full(&posting, &cell));
    assert_eq!(total_required_headcount(&posting.requirements), i64::MAX);

    let report = fulfillment_by_date(&posting);
    let day = &report[&FulfillmentKey::Date(EVENT_DATE.to_string())];
    assert_eq!(day.required, i64::MAX);
    assert_eq!(day.confirmed, 1);
    assert_eq!(day.percentage, 0);
    assert!(!is_fully_fulfilled(&posting));
}
