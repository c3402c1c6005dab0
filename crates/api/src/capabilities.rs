// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Edit permission for postings, and capability computation for
//! authorization-aware UI gating.
//!
//! Capabilities expose what actions an actor is permitted to perform on a
//! posting. They are advisory only and do not replace the `EditPolicy`
//! check the engine makes before every write.

use crate::request_response::{Capability, PostingCapabilities};
use staffing_domain::{ActorId, Posting};
use std::collections::BTreeSet;

/// Decides whether an actor may confirm, cancel, close or reopen on a
/// posting.
pub trait EditPolicy: Send + Sync {
    /// Returns whether `actor` may edit `posting`.
    fn can_edit(&self, actor: &ActorId, posting: &Posting) -> bool;
}

/// Grants edit rights to the posting owner and to a fixed set of admins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerOrAdminPolicy {
    admins: BTreeSet<ActorId>,
}

impl OwnerOrAdminPolicy {
    /// Creates a policy with the given admins.
    ///
    /// # Arguments
    ///
    /// * `admins` - Actors allowed to edit every posting
    #[must_use]
    pub fn new(admins: impl IntoIterator<Item = ActorId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    /// Returns whether `actor` is a configured admin.
    #[must_use]
    pub fn is_admin(&self, actor: &ActorId) -> bool {
        self.admins.contains(actor)
    }
}

impl EditPolicy for OwnerOrAdminPolicy {
    fn can_edit(&self, actor: &ActorId, posting: &Posting) -> bool {
        if actor.value().trim().is_empty() {
            return false;
        }
        posting.owner_id.as_ref() == Some(actor) || self.is_admin(actor)
    }
}

/// Computes what `actor` may do with `posting` right now.
///
/// Confirm and cancel depend only on edit rights, since the outcome of each
/// depends on the application. Close is offered unless an operator already
/// closed the posting; reopen only while it is closed.
///
/// # Arguments
///
/// * `policy` - The edit policy
/// * `actor` - The actor asking
/// * `posting` - The posting
#[must_use]
pub fn compute_posting_capabilities(
    policy: &dyn EditPolicy,
    actor: &ActorId,
    posting: &Posting,
) -> PostingCapabilities {
    if !policy.can_edit(actor, posting) {
        return PostingCapabilities {
            can_confirm: Capability::Denied,
            can_cancel: Capability::Denied,
            can_close: Capability::Denied,
            can_reopen: Capability::Denied,
        };
    }

    PostingCapabilities {
        can_confirm: Capability::Allowed,
        can_cancel: Capability::Allowed,
        can_close: Capability::from_bool(!posting.is_operator_closed()),
        can_reopen: Capability::from_bool(!posting.is_open()),
    }
}
