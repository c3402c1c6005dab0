// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(value: &str) -> Self {
                Self(value.to_string())
            }

            /// Creates a new identifier, rejecting empty or blank values.
            ///
            /// # Errors
            ///
            /// Returns `DomainError::EmptyIdentifier` if `value` is blank.
            pub fn parse(value: &str) -> Result<Self, DomainError> {
                if value.trim().is_empty() {
                    return Err(DomainError::EmptyIdentifier($kind));
                }
                Ok(Self::new(value.trim()))
            }

            /// Returns the identifier value.
            #[must_use]
            pub fn value(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifies a posting document.
    PostingId,
    "Posting"
);
string_id!(
    /// Identifies an application document.
    ApplicationId,
    "Application"
);
string_id!(
    /// Identifies a user: an operator acting on a posting, a posting owner,
    /// or an applicant.
    ActorId,
    "Actor"
);

/// Canonical posting type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostingType {
    /// General application posting.
    #[default]
    Regular,
    /// Fixed-schedule posting.
    Fixed,
    /// Tournament posting.
    Tournament,
    /// Urgent posting.
    Urgent,
}

impl PostingType {
    /// Converts this posting type to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Fixed => "fixed",
            Self::Tournament => "tournament",
            Self::Urgent => "urgent",
        }
    }
}

impl FromStr for PostingType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Self::Regular),
            "fixed" => Ok(Self::Fixed),
            "tournament" => Ok(Self::Tournament),
            "urgent" => Ok(Self::Urgent),
            _ => Err(DomainError::InvalidPostingType(s.to_string())),
        }
    }
}

impl std::fmt::Display for PostingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open/closed state of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostingStatus {
    /// Accepting confirmations.
    #[default]
    Open,
    /// Fully staffed or closed by an operator.
    Closed,
}

impl PostingStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for PostingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(DomainError::InvalidPostingStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for PostingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a posting is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseReason {
    /// Closed automatically because every requirement was fulfilled.
    Fulfilled,
    /// Closed by an operator. Never reopened automatically.
    Operator,
}

impl CloseReason {
    /// Converts this reason to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fulfilled => "fulfilled",
            Self::Operator => "operator",
        }
    }
}

/// Status of one applicant's relationship to a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Submitted and awaiting confirmation.
    #[default]
    Applied,
    /// Confirmed into one or more cells.
    Confirmed,
    /// Rejected by an operator. Terminal.
    Rejected,
}

impl ApplicationStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
        }
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - Applied → Confirmed
    /// - Confirmed → Applied
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Applied, Self::Confirmed) | (Self::Confirmed, Self::Applied)
        )
    }
}

impl FromStr for ApplicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // "pending" is the status name used by older application records.
            "applied" | "pending" => Ok(Self::Applied),
            "confirmed" => Ok(Self::Confirmed),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidApplicationStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unique (date, time-slot, role) coordinate in a requirement matrix.
///
/// A cell without a date addresses the posting's date-less matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Calendar date (`YYYY-MM-DD`), or `None` for the date-less matrix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Time slot key.
    pub time: String,
    /// Role name.
    pub role: String,
}

impl Cell {
    /// Creates a new cell.
    #[must_use]
    pub fn new(date: Option<&str>, time: &str, role: &str) -> Self {
        Self {
            date: date.map(str::to_string),
            time: time.to_string(),
            role: role.to_string(),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.date {
            Some(date) => write!(f, "{date} {} - {}", self.time, self.role),
            None => write!(f, "{} - {}", self.time, self.role),
        }
    }
}

/// One (role, time, date) choice an applicant applied for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectionItem {
    /// Role name.
    pub role: String,
    /// Time slot key.
    #[serde(rename = "timeSlot")]
    pub time: String,
    /// Calendar date, if the applicant chose a specific date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl SelectionItem {
    /// Creates a new selection item.
    #[must_use]
    pub fn new(role: &str, time: &str, date: Option<&str>) -> Self {
        Self {
            role: role.to_string(),
            time: time.to_string(),
            date: date.map(str::to_string),
        }
    }

    /// Returns the matrix cell this selection addresses.
    #[must_use]
    pub fn cell(&self) -> Cell {
        Cell::new(self.date.as_deref(), &self.time, &self.role)
    }
}

/// One confirmed person occupying one cell.
///
/// Serialized with the field names of the posting's `confirmedStaff` array.
/// Stored entries may carry extra fields (name, contact details); only
/// `userId`, `role`, `timeSlot` and `date` identify an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantEntry {
    /// The confirmed applicant.
    pub user_id: ActorId,
    /// Role name.
    pub role: String,
    /// Time slot key.
    #[serde(rename = "timeSlot")]
    pub time: String,
    /// Calendar date; absent entries count toward every date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl OccupantEntry {
    /// Builds the occupant entry that confirming `selection` for `user_id` creates.
    #[must_use]
    pub fn for_selection(user_id: &ActorId, selection: &SelectionItem) -> Self {
        Self {
            user_id: user_id.clone(),
            role: selection.role.clone(),
            time: selection.time.clone(),
            date: selection.date.clone(),
        }
    }

    /// Returns whether this entry counts toward `cell`.
    ///
    /// Role and time must match exactly; a dated entry matches only the same
    /// date, an undated entry matches any date.
    #[must_use]
    pub fn occupies(&self, cell: &Cell) -> bool {
        self.role == cell.role
            && self.time == cell.time
            && (self.date.is_none() || self.date == cell.date)
    }
}
