// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod application;
mod capacity;
mod date_label;
mod date_value;
mod error;
mod matrix;
mod normalize;
mod posting;
pub mod records;
mod types;

#[cfg(test)]
mod tests;

// Re-export public types
pub use application::{Application, ConfirmationAction, ConfirmationRecord};
pub use capacity::{
    DateFulfillment, FulfillmentKey, confirmed_count, full_cells, fulfillment_by_date,
    is_cell_full, is_fully_fulfilled, under_filled_dates,
};
pub use date_label::{DEFAULT_DATE_LABEL_CAPACITY, DateLabelCache, format_date_label};
pub use date_value::{DateValue, canonical_date_string, parse_canonical_date};
pub use error::DomainError;
pub use matrix::{
    DateRequirement, RoleRequirement, SlotRequirement, SlotTime, TIME_TO_BE_ANNOUNCED,
    all_role_names, has_dated_requirements, required_count, requirement_for_date,
    time_slots_for_date, total_required_headcount, wildcard_requirement,
};
pub use normalize::{
    DiagnosticSeverity, LegacyDiagnostic, Normalized, normalize_application,
    normalize_posting, normalize_posting_type, normalize_selections,
};
pub use posting::Posting;
pub use records::{ApplicationRecord, DateRequirementRecord, PostingRecord, SlotRecord};
pub use types::{
    ActorId, ApplicationId, ApplicationStatus, Cell, CloseReason, OccupantEntry, PostingId,
    PostingStatus, PostingType, SelectionItem,
};
