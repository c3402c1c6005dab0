// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use staffing::CoreError;
use staffing_domain::{Cell, DomainError};
use staffing_persistence::PersistenceError;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the caller
/// contract of the assignment engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The actor may not edit the posting.
    PermissionDenied {
        /// The actor that attempted the action.
        actor: String,
        /// The action that was attempted.
        action: String,
    },
    /// One or more chosen cells are already full. Nothing was written.
    CapacityExceeded {
        /// Every chosen cell that had no free seat.
        cells: Vec<Cell>,
    },
    /// The chosen selections are empty or were not applied for.
    InvalidSelection {
        /// A human-readable description of the problem.
        reason: String,
    },
    /// The posting no longer accepts applications.
    PostingClosed {
        /// The posting applied to.
        posting_id: String,
    },
    /// The applicant already applied to the posting.
    AlreadyApplied {
        /// The existing application.
        application_id: String,
    },
    /// The application status does not allow the action.
    InvalidTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
    },
    /// Concurrent writers kept invalidating the transaction. Retryable.
    WriteConflict {
        /// Number of attempts made.
        attempts: u32,
    },
    /// A requested resource was not found.
    NotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// The identifier looked up.
        id: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns whether the caller may retry the same request unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::WriteConflict { .. })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied { actor, action } => {
                write!(f, "Permission denied: '{actor}' may not {action}")
            }
            Self::CapacityExceeded { cells } => {
                let listed: Vec<String> = cells.iter().map(ToString::to_string).collect();
                write!(f, "Capacity exceeded for: {}", listed.join(", "))
            }
            Self::InvalidSelection { reason } => write!(f, "Invalid selection: {reason}"),
            Self::PostingClosed { posting_id } => {
                write!(f, "Posting {posting_id} is not accepting applications")
            }
            Self::AlreadyApplied { application_id } => {
                write!(f, "Already applied: {application_id}")
            }
            Self::InvalidTransition { from, to } => {
                write!(f, "Invalid transition from '{from}' to '{to}'")
            }
            Self::WriteConflict { attempts } => {
                write!(f, "Write conflict persisted after {attempts} attempts")
            }
            Self::NotFound { resource_type, id } => write!(f, "{resource_type} not found: {id}"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// Domain errors reaching this layer come from stored data, not from the
/// caller, so they surface as internal errors.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    ApiError::Internal {
        message: err.to_string(),
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(err) => translate_domain_error(err),
        CoreError::InvalidTransition { from, to } => ApiError::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        },
        CoreError::EmptySelection => ApiError::InvalidSelection {
            reason: String::from("no selection was chosen"),
        },
        CoreError::SelectionNotApplied(selection) => ApiError::InvalidSelection {
            reason: format!("{} was not applied for", selection.cell()),
        },
        CoreError::CapacityExceeded { cells } => ApiError::CapacityExceeded { cells },
        CoreError::SelectionNotOffered(selection) => ApiError::InvalidSelection {
            reason: format!("{} is not offered by the posting", selection.cell()),
        },
        CoreError::PostingClosed(posting_id) => ApiError::PostingClosed {
            posting_id: posting_id.to_string(),
        },
        CoreError::AlreadyApplied(application_id) => ApiError::AlreadyApplied {
            application_id: application_id.to_string(),
        },
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        translate_core_error(err)
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::ConflictRetriesExhausted { attempts } => {
                Self::WriteConflict { attempts }
            }
            PersistenceError::Conflict { .. } => Self::WriteConflict { attempts: 1 },
            PersistenceError::NotFound(key) => Self::NotFound {
                resource_type: String::from("Document"),
                id: key,
            },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}
