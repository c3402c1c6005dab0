// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::lifecycle::LifecycleDecision;
use staffing_domain::{
    Application, ApplicationStatus, Cell, CloseReason, ConfirmationRecord, OccupantEntry,
    Posting, PostingStatus, SelectionItem,
};

/// A change to a posting's open/closed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// Close the posting for the given reason.
    Close(CloseReason),
    /// Reopen the posting and clear its close reason.
    Reopen,
}

/// Field-level changes to one posting document.
///
/// Occupant changes are set operations: adding an entry that is already
/// present and removing one that is absent are both no-ops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingPatch {
    /// Entries to add to the occupant set.
    pub add_occupants: Vec<OccupantEntry>,
    /// Entries to remove from the occupant set.
    pub remove_occupants: Vec<OccupantEntry>,
    /// Status change, if any.
    pub status_change: Option<StatusChange>,
}

impl PostingPatch {
    /// Returns whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add_occupants.is_empty()
            && self.remove_occupants.is_empty()
            && self.status_change.is_none()
    }

    /// Projects the patch onto an in-memory posting.
    #[must_use]
    pub fn apply_to(&self, posting: &Posting) -> Posting {
        let mut next: Posting = posting.clone();
        for entry in &self.add_occupants {
            if !next.has_occupant(entry) {
                next.occupants.push(entry.clone());
            }
        }
        next.occupants
            .retain(|entry| !self.remove_occupants.contains(entry));
        match self.status_change {
            Some(StatusChange::Close(reason)) => {
                next.status = PostingStatus::Closed;
                next.close_reason = Some(reason);
            }
            Some(StatusChange::Reopen) => {
                next.status = PostingStatus::Open;
                next.close_reason = None;
            }
            None => {}
        }
        next
    }
}

/// Field-level changes to one application document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationPatch {
    /// New status.
    pub status: ApplicationStatus,
    /// New confirmed subset. Replaces the stored value.
    pub confirmed_selections: Vec<SelectionItem>,
    /// History record to append.
    pub history_entry: ConfirmationRecord,
}

impl ApplicationPatch {
    /// Projects the patch onto an in-memory application.
    #[must_use]
    pub fn apply_to(&self, application: &Application) -> Application {
        let mut next: Application = application.clone();
        next.status = self.status;
        next.confirmed_selections.clone_from(&self.confirmed_selections);
        next.history.push(self.history_entry.clone());
        next
    }
}

/// The result of a successful application command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// Changes to write to the posting.
    pub posting_patch: PostingPatch,
    /// Changes to write to the application.
    pub application_patch: ApplicationPatch,
    /// The posting as it will read after the write.
    pub new_posting: Posting,
    /// The application as it will read after the write.
    pub new_application: Application,
    /// Cells confirmed or released by the command.
    pub cells: Vec<Cell>,
}

/// The result of a posting lifecycle command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingTransition {
    /// What the command decided.
    pub decision: LifecycleDecision,
    /// Changes to write. Empty when the decision is `Unchanged`.
    pub patch: PostingPatch,
    /// The posting as it will read after the write.
    pub new_posting: Posting,
}
