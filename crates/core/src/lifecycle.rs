// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Automatic close/reopen rules.

use staffing_domain::{FulfillmentKey, Posting, is_fully_fulfilled, under_filled_dates};

/// What the lifecycle rules decided for a posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleDecision {
    /// Close the posting.
    Close,
    /// Reopen the posting.
    Reopen {
        /// Dates that are no longer fully staffed.
        under_filled: Vec<FulfillmentKey>,
    },
    /// Leave the posting as it is.
    Unchanged,
}

/// Decides whether a posting should change state to match its fulfillment.
///
/// An open posting closes once every date is fully staffed. A closed posting
/// reopens once it is not, unless an operator closed it.
#[must_use]
pub fn evaluate_lifecycle(posting: &Posting) -> LifecycleDecision {
    let fulfilled: bool = is_fully_fulfilled(posting);

    if posting.is_open() {
        return if fulfilled {
            LifecycleDecision::Close
        } else {
            LifecycleDecision::Unchanged
        };
    }

    if fulfilled || posting.is_operator_closed() {
        return LifecycleDecision::Unchanged;
    }

    LifecycleDecision::Reopen {
        under_filled: under_filled_dates(posting),
    }
}
