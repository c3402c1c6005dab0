// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use staffing_domain::DomainError;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A document changed between being read and being committed.
    Conflict {
        /// The document whose version moved.
        key: String,
    },
    /// Every attempt of a transaction hit a write conflict.
    ConflictRetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
    },
    /// The requested document was not found.
    NotFound(String),
    /// A stored document could not be interpreted.
    InvalidDocument(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// A database error occurred.
    DatabaseError(String),
    /// A store lock was poisoned by a panicking holder.
    LockPoisoned,
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conflict { key } => write!(f, "Write conflict on {key}"),
            Self::ConflictRetriesExhausted { attempts } => {
                write!(f, "Write conflict persisted after {attempts} attempts")
            }
            Self::NotFound(key) => write!(f, "Not found: {key}"),
            Self::InvalidDocument(msg) => write!(f, "Invalid document: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::LockPoisoned => write!(f, "Store lock poisoned"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        Self::InvalidDocument(err.to_string())
    }
}
