// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Stored document shapes.
//!
//! Records mirror what is actually in the document store, including every
//! deprecated field older clients wrote. They are converted into the
//! canonical `Posting` / `Application` views by the normalizer and are never
//! rewritten into the canonical shape implicitly.

use crate::application::{Application, ConfirmationRecord};
use crate::date_value::DateValue;
use crate::matrix::{DateRequirement, RoleRequirement, SlotRequirement, SlotTime};
use crate::posting::Posting;
use crate::types::{CloseReason, OccupantEntry, SelectionItem};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Document field names written by the engine.
pub mod fields {
    /// Posting or application status.
    pub const STATUS: &str = "status";
    /// Why a posting is closed.
    pub const CLOSE_REASON: &str = "closeReason";
    /// Posting occupant entries.
    pub const CONFIRMED_STAFF: &str = "confirmedStaff";
    /// Fields identifying one occupant entry.
    pub const OCCUPANT_KEYS: [&str; 4] = ["userId", "role", "timeSlot", "date"];
    /// Application confirmed selections.
    pub const CONFIRMED_SELECTIONS: &str = "confirmedSelections";
    /// Application confirmation history.
    pub const HISTORY: &str = "history";
}

/// A posting document as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingRecord {
    /// The posting owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// The user who created the posting; the owner when `ownerId` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    /// Canonical posting type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posting_type: Option<Value>,
    /// Deprecated "general application / fixed" toggle.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<Value>,
    /// Deprecated recruitment kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruitment_type: Option<Value>,
    /// `open` or `closed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Why the posting is closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<CloseReason>,
    /// Per-date requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub date_specific_requirements: Vec<DateRequirementRecord>,
    /// Deprecated date-less requirement matrix.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time_slots: Vec<SlotRecord>,
    /// Confirmed occupants.
    #[serde(default)]
    pub confirmed_staff: Vec<OccupantEntry>,
    /// Fields this engine does not interpret (title, location, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A per-date requirement as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRequirementRecord {
    /// The date, in any accepted `DateValue` shape. Absent means every date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateValue>,
    /// Time slots.
    #[serde(default)]
    pub time_slots: Vec<SlotRecord>,
}

/// A time slot as stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRecord {
    /// Display label.
    #[serde(default)]
    pub time: String,
    /// Whether the time is still to be announced.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_time_to_be_announced: bool,
    /// Free-text description for a time to be announced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tentative_description: Option<String>,
    /// Required roles.
    #[serde(default)]
    pub roles: Vec<RoleRequirement>,
}

/// An application document as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    /// The posting applied to.
    #[serde(alias = "jobPostingId", alias = "eventId")]
    pub posting_id: String,
    /// The applicant.
    #[serde(alias = "userId")]
    pub applicant_id: String,
    /// Status string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Canonical selections.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selections: Vec<SelectionItem>,
    /// Parallel array of roles.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assigned_roles: Vec<String>,
    /// Parallel array of time slot keys.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assigned_times: Vec<String>,
    /// Parallel array of dates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assigned_dates: Vec<String>,
    /// Deprecated single role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Deprecated single time slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,
    /// Deprecated single date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_date: Option<String>,
    /// Confirmed subset.
    #[serde(default)]
    pub confirmed_selections: Vec<SelectionItem>,
    /// Confirmation history.
    #[serde(default)]
    pub history: Vec<ConfirmationRecord>,
    /// Fields this engine does not interpret (name, contact, answers, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<&SlotRequirement> for SlotRecord {
    fn from(slot: &SlotRequirement) -> Self {
        match &slot.time {
            SlotTime::At { label } => Self {
                time: label.clone(),
                is_time_to_be_announced: false,
                tentative_description: None,
                roles: slot.roles.clone(),
            },
            SlotTime::ToBeAnnounced { description } => Self {
                time: String::new(),
                is_time_to_be_announced: true,
                tentative_description: description.clone(),
                roles: slot.roles.clone(),
            },
        }
    }
}

impl From<&Posting> for PostingRecord {
    /// Writes a canonical posting in the current document shape.
    fn from(posting: &Posting) -> Self {
        Self {
            owner_id: posting.owner_id.as_ref().map(|owner| owner.value().to_string()),
            created_by: None,
            posting_type: Some(Value::String(posting.posting_type.as_str().to_string())),
            legacy_type: None,
            recruitment_type: None,
            status: Some(posting.status.as_str().to_string()),
            close_reason: posting.close_reason,
            date_specific_requirements: posting
                .requirements
                .iter()
                .map(|r: &DateRequirement| DateRequirementRecord {
                    date: r.date.clone().map(DateValue::IsoString),
                    time_slots: r.time_slots.iter().map(SlotRecord::from).collect(),
                })
                .collect(),
            time_slots: Vec::new(),
            confirmed_staff: posting.occupants.clone(),
            extra: Map::new(),
        }
    }
}

impl From<&Application> for ApplicationRecord {
    /// Writes a canonical application in the current document shape.
    fn from(application: &Application) -> Self {
        Self {
            posting_id: application.posting_id.value().to_string(),
            applicant_id: application.applicant_id.value().to_string(),
            status: Some(application.status.as_str().to_string()),
            selections: application.selections.clone(),
            confirmed_selections: application.confirmed_selections.clone(),
            history: application.history.clone(),
            ..Self::default()
        }
    }
}
