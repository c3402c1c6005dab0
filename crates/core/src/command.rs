// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use staffing_domain::SelectionItem;

/// A command against one application and its posting, as data only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Confirm the applicant into a subset of what they applied for.
    Confirm {
        /// The chosen selections. Duplicates are collapsed.
        selections: Vec<SelectionItem>,
    },
    /// Release every confirmed selection of the application.
    Cancel,
}

impl Command {
    /// Returns the command name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Confirm { .. } => "Confirm",
            Self::Cancel => "Cancel",
        }
    }
}

/// A command against a posting's open/closed lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingCommand {
    /// Close the posting on an operator's request.
    Close,
    /// Reopen the posting on an operator's request.
    Reopen,
    /// Close or reopen the posting to match its fulfillment.
    ReconcileLifecycle,
}

impl PostingCommand {
    /// Returns the command name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Close => "Close",
            Self::Reopen => "Reopen",
            Self::ReconcileLifecycle => "ReconcileLifecycle",
        }
    }
}
