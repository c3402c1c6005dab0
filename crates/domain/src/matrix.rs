// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The requirement matrix: dates, time slots and role headcounts.
//!
//! Everything here is pure data plus pure queries. Fulfillment math lives in
//! `capacity`.

use crate::posting::Posting;
use crate::types::Cell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Slot key used by selections and occupants for a time to be announced.
pub const TIME_TO_BE_ANNOUNCED: &str = "TBA";

/// Required headcount for one role in one time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequirement {
    /// Role identifier.
    pub name: String,
    /// Required headcount. Not validated; non-positive counts are never fulfilled.
    pub count: i64,
}

impl RoleRequirement {
    /// Creates a new role requirement.
    #[must_use]
    pub fn new(name: &str, count: i64) -> Self {
        Self {
            name: name.to_string(),
            count,
        }
    }
}

/// The time of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SlotTime {
    /// A concrete display label such as `"18:00"`.
    At {
        /// The display label, also used as the slot key.
        label: String,
    },
    /// The time is not known yet.
    ToBeAnnounced {
        /// Optional free text such as "evening".
        description: Option<String>,
    },
}

impl SlotTime {
    /// Creates a slot time with a concrete label.
    #[must_use]
    pub fn at(label: &str) -> Self {
        Self::At {
            label: label.to_string(),
        }
    }

    /// Returns the key selections and occupants use for this slot.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::At { label } => label,
            Self::ToBeAnnounced { .. } => TIME_TO_BE_ANNOUNCED,
        }
    }
}

/// Role requirements for one time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequirement {
    /// When the slot takes place.
    pub time: SlotTime,
    /// Required roles, in display order. Duplicate names are additive.
    pub roles: Vec<RoleRequirement>,
}

impl SlotRequirement {
    /// Creates a new slot requirement.
    #[must_use]
    pub const fn new(time: SlotTime, roles: Vec<RoleRequirement>) -> Self {
        Self { time, roles }
    }

    /// Sum of the counts of every entry named `role` in this slot.
    #[must_use]
    pub fn required_for(&self, role: &str) -> i64 {
        self.roles
            .iter()
            .filter(|r| r.name == role)
            .map(|r| r.count)
            .fold(0, i64::saturating_add)
    }

    /// Distinct role names in this slot, in first-seen order.
    #[must_use]
    pub fn distinct_roles(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for role in &self.roles {
            if !seen.contains(&role.name.as_str()) {
                seen.push(&role.name);
            }
        }
        seen
    }
}

/// Requirements scoped to one calendar date, or to every date when `date` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRequirement {
    /// Canonical `YYYY-MM-DD` date, or `None` for the date-less matrix.
    pub date: Option<String>,
    /// Time slots, in display order.
    pub time_slots: Vec<SlotRequirement>,
}

impl DateRequirement {
    /// Creates a requirement for a specific date.
    #[must_use]
    pub fn dated(date: &str, time_slots: Vec<SlotRequirement>) -> Self {
        Self {
            date: Some(date.to_string()),
            time_slots,
        }
    }

    /// Creates the date-less requirement.
    #[must_use]
    pub const fn wildcard(time_slots: Vec<SlotRequirement>) -> Self {
        Self {
            date: None,
            time_slots,
        }
    }

    /// Every distinct cell under this requirement, in matrix order.
    #[must_use]
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = Vec::new();
        for slot in &self.time_slots {
            for role in slot.distinct_roles() {
                let cell = Cell::new(self.date.as_deref(), slot.time.key(), role);
                if !cells.contains(&cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }
}

/// Returns whether any requirement of the posting is scoped to a specific date.
#[must_use]
pub fn has_dated_requirements(posting: &Posting) -> bool {
    posting.requirements.iter().any(|r| r.date.is_some())
}

/// Returns the date-less requirement of the posting, if it has one.
#[must_use]
pub fn wildcard_requirement(posting: &Posting) -> Option<&DateRequirement> {
    posting.requirements.iter().find(|r| r.date.is_none())
}

/// Returns the time slots that apply to `date`.
///
/// A posting that uses per-date requirements returns the slots of the
/// requirement with exactly that date (or nothing). A posting without any
/// dated requirement returns its single date-less matrix for every date.
#[must_use]
pub fn time_slots_for_date<'a>(posting: &'a Posting, date: Option<&str>) -> &'a [SlotRequirement] {
    if has_dated_requirements(posting) {
        return posting
            .requirements
            .iter()
            .find(|r| r.date.as_deref() == date)
            .map_or(&[], |r| r.time_slots.as_slice());
    }

    wildcard_requirement(posting).map_or(&[], |r| r.time_slots.as_slice())
}

/// Union of role names across every slot and every date.
///
/// Used for filtering and search, never for fulfillment math.
#[must_use]
pub fn all_role_names(posting: &Posting) -> BTreeSet<String> {
    posting
        .requirements
        .iter()
        .flat_map(|r| r.time_slots.iter())
        .flat_map(|s| s.roles.iter())
        .map(|role| role.name.clone())
        .collect()
}

/// Sum of every role count across the matrix. Display only.
#[must_use]
pub fn total_required_headcount(requirements: &[DateRequirement]) -> i64 {
    requirements
        .iter()
        .flat_map(|r| r.time_slots.iter())
        .flat_map(|s| s.roles.iter())
        .map(|role| role.count)
        .fold(0, i64::saturating_add)
}

/// Returns the requirement that governs `date`.
///
/// A dated cell resolves to the requirement with the same date and falls
/// back to the date-less matrix. An undated cell resolves only to the
/// date-less matrix.
#[must_use]
pub fn requirement_for_date<'a>(
    posting: &'a Posting,
    date: Option<&str>,
) -> Option<&'a DateRequirement> {
    match date {
        Some(d) => posting
            .requirements
            .iter()
            .find(|r| r.date.as_deref() == Some(d))
            .or_else(|| wildcard_requirement(posting)),
        None => wildcard_requirement(posting),
    }
}

/// Required headcount for one cell.
///
/// Duplicate role entries within a slot sum their counts. A cell that does
/// not exist in the matrix requires zero people.
#[must_use]
pub fn required_count(posting: &Posting, cell: &Cell) -> i64 {
    requirement_for_date(posting, cell.date.as_deref()).map_or(0, |requirement| {
        requirement
            .time_slots
            .iter()
            .filter(|slot| slot.time.key() == cell.time)
            .map(|slot| slot.required_for(&cell.role))
            .fold(0, i64::saturating_add)
    })
}
