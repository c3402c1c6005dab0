// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur while interpreting or validating domain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A stored date used a JSON shape that is not a string, a number of
    /// epoch seconds, or a `{ seconds, nanoseconds }` timestamp object.
    UnrecognizedDateShape {
        /// A short description of the rejected shape.
        shape: String,
    },
    /// A date string could not be parsed as `YYYY-MM-DD` or RFC 3339.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// An epoch timestamp is outside the representable range.
    TimestampOutOfRange {
        /// The offending number of seconds.
        seconds: i64,
    },
    /// A posting type string is not one of the canonical values.
    InvalidPostingType(String),
    /// A posting status string is not `open` or `closed`.
    InvalidPostingStatus(String),
    /// An application status string is not recognised.
    InvalidApplicationStatus(String),
    /// An identifier was empty.
    EmptyIdentifier(&'static str),
    /// An application was paired with a posting it does not belong to.
    ApplicationPostingMismatch {
        /// The application's posting.
        expected: String,
        /// The posting it was paired with.
        actual: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnrecognizedDateShape { shape } => {
                write!(f, "Unrecognized date shape: {shape}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::TimestampOutOfRange { seconds } => {
                write!(f, "Timestamp out of range: {seconds} seconds")
            }
            Self::InvalidPostingType(value) => write!(f, "Invalid posting type: '{value}'"),
            Self::InvalidPostingStatus(value) => write!(f, "Invalid posting status: '{value}'"),
            Self::InvalidApplicationStatus(value) => {
                write!(f, "Invalid application status: '{value}'")
            }
            Self::EmptyIdentifier(kind) => write!(f, "{kind} identifier must not be empty"),
            Self::ApplicationPostingMismatch { expected, actual } => write!(
                f,
                "Application belongs to posting '{expected}', not '{actual}'"
            ),
        }
    }
}

impl std::error::Error for DomainError {}
