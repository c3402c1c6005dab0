// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Best-effort work queued behind a committed transaction.

use crate::error::ApiError;
use crate::materializer::{MaterializationError, MaterializeRequest};
use serde::Serialize;
use staffing_domain::{ActorId, Cell, PostingId};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Work that follows a committed confirm, cancel or close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Create the work record of one confirmed cell.
    Materialize(MaterializeRequest),
    /// Remove the work records of cancelled cells.
    Dematerialize {
        /// The posting cancelled from.
        posting_id: PostingId,
        /// The applicant whose cells were released.
        applicant_id: ActorId,
        /// The released cells.
        cells: Vec<Cell>,
    },
    /// Close or reopen the posting to match its fulfillment.
    ReconcileLifecycle {
        /// The posting to reconcile.
        posting_id: PostingId,
    },
}

impl FollowUp {
    /// Returns the follow-up name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Materialize(_) => "materialize",
            Self::Dematerialize { .. } => "dematerialize",
            Self::ReconcileLifecycle { .. } => "reconcile_lifecycle",
        }
    }
}

/// Why a follow-up failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FollowUpError {
    /// The materializer failed.
    #[error(transparent)]
    Materialization(#[from] MaterializationError),

    /// The lifecycle transaction failed.
    #[error("Lifecycle reconciliation failed: {0}")]
    Lifecycle(#[from] ApiError),
}

/// Outcome of draining the outbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FollowUpReport {
    /// Follow-ups that succeeded.
    pub completed: usize,
    /// Follow-ups that failed and were logged.
    pub failed: usize,
}

/// A FIFO queue of pending follow-ups.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Mutex<VecDeque<FollowUp>>,
}

impl Outbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a follow-up.
    pub fn push(&self, follow_up: FollowUp) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(follow_up);
    }

    /// Takes every pending follow-up, oldest first.
    ///
    /// The lock is released before the caller runs them.
    #[must_use]
    pub fn take_all(&self) -> Vec<FollowUp> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    /// Returns the number of pending follow-ups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
