// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::matrix::DateRequirement;
use crate::types::{ActorId, CloseReason, OccupantEntry, PostingId, PostingStatus, PostingType};
use serde::{Deserialize, Serialize};

/// An event's staffing request, in canonical form.
///
/// Built from a stored `PostingRecord` by `normalize_posting`; the engine
/// never works on the raw record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// The posting identifier.
    pub id: PostingId,
    /// The user who owns the posting. `None` when the stored record names
    /// no usable owner; such a posting is editable by admins only.
    pub owner_id: Option<ActorId>,
    /// Canonical posting type.
    pub posting_type: PostingType,
    /// Open/closed state.
    pub status: PostingStatus,
    /// Why the posting is closed, when it is.
    pub close_reason: Option<CloseReason>,
    /// The requirement matrix, in display order.
    pub requirements: Vec<DateRequirement>,
    /// Confirmed occupants. Unordered; append/remove only.
    pub occupants: Vec<OccupantEntry>,
}

impl Posting {
    /// Creates an open posting with no occupants.
    #[must_use]
    pub const fn new(
        id: PostingId,
        owner_id: ActorId,
        posting_type: PostingType,
        requirements: Vec<DateRequirement>,
    ) -> Self {
        Self {
            id,
            owner_id: Some(owner_id),
            posting_type,
            status: PostingStatus::Open,
            close_reason: None,
            requirements,
            occupants: Vec::new(),
        }
    }

    /// Returns whether the posting is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == PostingStatus::Open
    }

    /// Returns whether an operator closed the posting.
    #[must_use]
    pub fn is_operator_closed(&self) -> bool {
        self.status == PostingStatus::Closed && self.close_reason == Some(CloseReason::Operator)
    }

    /// Returns whether `entry` is already present.
    #[must_use]
    pub fn has_occupant(&self, entry: &OccupantEntry) -> bool {
        self.occupants.contains(entry)
    }

    /// Occupant entries held by `user_id`.
    #[must_use]
    pub fn occupants_of<'a>(&'a self, user_id: &'a ActorId) -> Vec<&'a OccupantEntry> {
        self.occupants
            .iter()
            .filter(|entry| &entry.user_id == user_id)
            .collect()
    }
}
