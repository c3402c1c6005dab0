// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capacity checks and fulfillment math over a posting's matrix and occupants.

use crate::matrix::{DateRequirement, required_count};
use crate::posting::Posting;
use crate::types::{Cell, OccupantEntry};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Percentage reported for a date that can never be fulfilled.
const NEVER_FULFILLED_CAP: i64 = 99;

/// Key of a `fulfillment_by_date` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FulfillmentKey {
    /// A canonical `YYYY-MM-DD` date.
    Date(String),
    /// The date-less matrix.
    All,
}

impl FulfillmentKey {
    /// Returns the key as it appears in reports.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Date(date) => date,
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for FulfillmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FulfillmentKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Fulfillment of one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateFulfillment {
    /// Occupants credited, at most the requirement of each cell.
    pub confirmed: i64,
    /// Sum of positive cell requirements.
    pub required: i64,
    /// Rounded percentage, 100 when nothing is required.
    pub percentage: i64,
}

impl DateFulfillment {
    /// Returns whether the date is fully staffed.
    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        self.percentage >= 100
    }
}

/// Number of occupants counted toward `cell`.
#[must_use]
pub fn confirmed_count(posting: &Posting, cell: &Cell) -> i64 {
    count(posting.occupants.iter().filter(|entry| entry.occupies(cell)))
}

/// Returns whether `cell` has no free seat left.
///
/// A cell missing from the matrix requires nobody and is therefore full.
#[must_use]
pub fn is_cell_full(posting: &Posting, cell: &Cell) -> bool {
    confirmed_count(posting, cell) >= required_count(posting, cell)
}

/// The subset of `cells` that are full, in input order.
#[must_use]
pub fn full_cells(posting: &Posting, cells: &[Cell]) -> Vec<Cell> {
    cells
        .iter()
        .filter(|cell| is_cell_full(posting, cell))
        .cloned()
        .collect()
}

/// Fulfillment of every requirement of the posting, keyed by date.
///
/// The date-less matrix is reported under `FulfillmentKey::All` and counts
/// occupants regardless of their date. Each cell credits at most its own
/// requirement, so an over-filled cell cannot hide an under-filled one.
#[must_use]
pub fn fulfillment_by_date(posting: &Posting) -> BTreeMap<FulfillmentKey, DateFulfillment> {
    posting
        .requirements
        .iter()
        .map(|requirement| {
            let key = requirement
                .date
                .clone()
                .map_or(FulfillmentKey::All, FulfillmentKey::Date);
            (key, date_fulfillment(posting, requirement))
        })
        .collect()
}

fn date_fulfillment(posting: &Posting, requirement: &DateRequirement) -> DateFulfillment {
    let mut confirmed: i64 = 0;
    let mut required: i64 = 0;
    let mut never_fulfilled = false;

    for cell in requirement.cells() {
        let cell_required: i64 = requirement
            .time_slots
            .iter()
            .filter(|slot| slot.time.key() == cell.time)
            .map(|slot| slot.required_for(&cell.role))
            .fold(0, i64::saturating_add);

        if cell_required <= 0 {
            never_fulfilled = true;
            continue;
        }

        let occupied = count(
            posting
                .occupants
                .iter()
                .filter(|entry| credits(entry, &cell)),
        );
        confirmed = confirmed.saturating_add(occupied.min(cell_required));
        required = required.saturating_add(cell_required);
    }

    let percentage: i64 = if required == 0 {
        100
    } else {
        rounded_percentage(confirmed, required)
    };

    DateFulfillment {
        confirmed,
        required,
        percentage: if never_fulfilled {
            percentage.min(NEVER_FULFILLED_CAP)
        } else {
            percentage
        },
    }
}

/// `round(100 * confirmed / required)`, half up. Computed in `i128` since
/// stored counts are not bounded.
fn rounded_percentage(confirmed: i64, required: i64) -> i64 {
    let confirmed = i128::from(confirmed);
    let required = i128::from(required);
    let percentage: i128 = (confirmed * 200 + required) / (required * 2);
    i64::try_from(percentage).unwrap_or(i64::MAX)
}

fn credits(entry: &OccupantEntry, cell: &Cell) -> bool {
    if cell.date.is_none() {
        return entry.role == cell.role && entry.time == cell.time;
    }
    entry.occupies(cell)
}

/// Returns whether every date of the posting is fully staffed.
///
/// A posting whose matrix holds no cell at all is never fulfilled.
#[must_use]
pub fn is_fully_fulfilled(posting: &Posting) -> bool {
    let has_cells = posting
        .requirements
        .iter()
        .any(|requirement| !requirement.cells().is_empty());

    has_cells
        && fulfillment_by_date(posting)
            .values()
            .all(DateFulfillment::is_fulfilled)
}

/// Dates that are not fully staffed, in key order.
#[must_use]
pub fn under_filled_dates(posting: &Posting) -> Vec<FulfillmentKey> {
    fulfillment_by_date(posting)
        .into_iter()
        .filter(|(_, fulfillment)| !fulfillment.is_fulfilled())
        .map(|(key, _)| key)
        .collect()
}

fn count<'a>(entries: impl Iterator<Item = &'a OccupantEntry>) -> i64 {
    i64::try_from(entries.count()).unwrap_or(i64::MAX)
}
