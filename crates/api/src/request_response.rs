// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API response data transfer objects.

use crate::outbox::FollowUpReport;
use serde::{Deserialize, Serialize};
use staffing_domain::{
    Application, ApplicationStatus, Cell, CloseReason, Posting, PostingStatus, PostingType,
};

/// Represents whether a specific action is permitted.
///
/// Serializes to JSON as true/false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(self.is_allowed())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let b = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(b))
    }
}

/// What an actor may do with one posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingCapabilities {
    /// Whether applications may be confirmed.
    pub can_confirm: Capability,
    /// Whether confirmations may be cancelled.
    pub can_cancel: Capability,
    /// Whether the posting may be force-closed.
    pub can_close: Capability,
    /// Whether the posting may be reopened.
    pub can_reopen: Capability,
}

/// API response for a confirm or cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentResponse {
    /// The application acted on.
    pub application_id: String,
    /// The application status after the action.
    pub application_status: ApplicationStatus,
    /// The posting acted on.
    pub posting_id: String,
    /// The posting status after follow-ups ran.
    pub posting_status: PostingStatus,
    /// Why the posting is closed, if it is.
    pub close_reason: Option<CloseReason>,
    /// Cells confirmed or released.
    pub cells: Vec<Cell>,
    /// Follow-up outcome.
    pub follow_ups: FollowUpReport,
}

/// API response for a posting read or a close/reopen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingResponse {
    /// The posting id.
    pub id: String,
    /// The normalized posting type.
    pub posting_type: PostingType,
    /// Open or closed.
    pub status: PostingStatus,
    /// Why the posting is closed, if it is.
    pub close_reason: Option<CloseReason>,
    /// Total positive headcount across the matrix.
    pub required_headcount: i64,
    /// Number of occupant entries.
    pub occupant_count: usize,
    /// Whether every date is fully staffed.
    pub fully_fulfilled: bool,
    /// What the asking actor may do, when an actor was given.
    pub capabilities: Option<PostingCapabilities>,
    /// The canonical posting.
    pub posting: Posting,
}

/// Fulfillment of one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateFulfillmentInfo {
    /// `YYYY-MM-DD`, or `all` for the date-less matrix.
    pub key: String,
    /// Display label such as `10/19 (Mon)`.
    pub label: String,
    /// Occupants credited.
    pub confirmed: i64,
    /// Required headcount.
    pub required: i64,
    /// Rounded percentage.
    pub percentage: i64,
    /// Whether the date is fully staffed.
    pub fulfilled: bool,
}

/// API response for per-date fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FulfillmentResponse {
    /// The posting id.
    pub posting_id: String,
    /// Whether every date is fully staffed.
    pub fully_fulfilled: bool,
    /// One entry per requirement date.
    pub dates: Vec<DateFulfillmentInfo>,
}

/// API response for an application read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationResponse {
    /// The application id.
    pub id: String,
    /// The status.
    pub status: ApplicationStatus,
    /// The canonical application.
    pub application: Application,
}
