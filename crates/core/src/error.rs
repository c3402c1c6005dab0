// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use staffing_domain::{
    ApplicationId, ApplicationStatus, Cell, DomainError, PostingId, SelectionItem,
};

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// The application is not in a state the command can start from.
    InvalidTransition {
        /// Current status.
        from: ApplicationStatus,
        /// Status the command would produce.
        to: ApplicationStatus,
    },
    /// No selection was chosen.
    EmptySelection,
    /// A chosen selection is not one the applicant applied for.
    SelectionNotApplied(SelectionItem),
    /// One or more chosen cells have no free seat.
    CapacityExceeded {
        /// Every full cell among the chosen ones.
        cells: Vec<Cell>,
    },
    /// A selection names a cell the posting does not offer.
    SelectionNotOffered(SelectionItem),
    /// The posting no longer accepts applications.
    PostingClosed(PostingId),
    /// The applicant already has an application for the posting.
    AlreadyApplied(ApplicationId),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::InvalidTransition { from, to } => {
                write!(f, "Invalid application transition from {from} to {to}")
            }
            Self::EmptySelection => write!(f, "At least one selection must be chosen"),
            Self::SelectionNotApplied(selection) => {
                write!(f, "Selection '{}' was not applied for", selection.cell())
            }
            Self::CapacityExceeded { cells } => {
                let cells: Vec<String> = cells.iter().map(ToString::to_string).collect();
                write!(f, "Cells already full: {}", cells.join(", "))
            }
            Self::SelectionNotOffered(selection) => {
                write!(f, "Selection '{}' is not offered by the posting", selection.cell())
            }
            Self::PostingClosed(posting_id) => write!(f, "Posting {posting_id} is closed"),
            Self::AlreadyApplied(application_id) => {
                write!(f, "Application {application_id} already exists")
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
