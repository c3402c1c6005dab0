// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::{ActorId, ApplicationId, ApplicationStatus, PostingId, SelectionItem};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// What happened in a confirmation history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationAction {
    /// The application was confirmed into the listed selections.
    Confirmed,
    /// A confirmation was cancelled.
    Cancelled,
}

/// One entry of an application's confirmation history.
///
/// History is append-only; cancelling keeps the record of what had been
/// confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRecord {
    /// Confirm or cancel.
    pub action: ConfirmationAction,
    /// The selections confirmed or released by this action.
    pub selections: Vec<SelectionItem>,
    /// The operator who acted.
    pub actor_id: ActorId,
    /// When the action was committed.
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

/// One applicant's relationship to one posting, in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// The application identifier.
    pub id: ApplicationId,
    /// The posting applied to.
    pub posting_id: PostingId,
    /// The applicant.
    pub applicant_id: ActorId,
    /// Current status.
    pub status: ApplicationStatus,
    /// Everything the applicant applied for. Immutable once submitted.
    pub selections: Vec<SelectionItem>,
    /// The subset currently confirmed. Empty unless confirmed.
    pub confirmed_selections: Vec<SelectionItem>,
    /// Confirmation history, oldest first.
    pub history: Vec<ConfirmationRecord>,
}

impl Application {
    /// Returns whether `selection` is one of the applied-for selections.
    #[must_use]
    pub fn applied_for(&self, selection: &SelectionItem) -> bool {
        self.selections.contains(selection)
    }

    /// Returns whether the application is currently confirmed.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status == ApplicationStatus::Confirmed
    }
}
