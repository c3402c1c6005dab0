// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-time conversion of stored records into canonical views.
//!
//! Nothing in this module writes to storage. Recoverable legacy values are
//! reported at warning level; fallbacks to a default are reported at error
//! level so operators can find the affected documents.

use crate::application::Application;
use crate::date_value::DateValue;
use crate::error::DomainError;
use crate::matrix::{DateRequirement, SlotRequirement, SlotTime};
use crate::posting::Posting;
use crate::records::{ApplicationRecord, PostingRecord, SlotRecord};
use crate::types::{
    ActorId, ApplicationId, ApplicationStatus, PostingId, PostingStatus, PostingType,
    SelectionItem,
};
use serde_json::Value;
use time::UtcOffset;
use tracing::{error, warn};

/// Legacy value meaning "general application".
const LEGACY_APPLICATION: &str = "application";
/// Legacy value meaning "fixed schedule".
const LEGACY_FIXED: &str = "fixed";

/// How serious a normalization diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// A deprecated value was mapped to a well-defined canonical value.
    Warning,
    /// No usable value was found and a default was applied.
    Error,
}

/// A note produced while normalizing legacy data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyDiagnostic {
    /// Warning or error.
    pub severity: DiagnosticSeverity,
    /// The document field that triggered the diagnostic.
    pub field: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// A normalized value plus the diagnostic its normalization produced, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized<T> {
    /// The canonical value.
    pub value: T,
    /// Set when legacy data was involved.
    pub diagnostic: Option<LegacyDiagnostic>,
}

impl<T> Normalized<T> {
    const fn clean(value: T) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    fn warning(value: T, field: &'static str, message: String) -> Self {
        warn!(field, %message, "Normalized legacy field");
        Self {
            value,
            diagnostic: Some(LegacyDiagnostic {
                severity: DiagnosticSeverity::Warning,
                field,
                message,
            }),
        }
    }

    fn error(value: T, field: &'static str, message: String) -> Self {
        error!(field, %message, "Ambiguous legacy data, applied default");
        Self {
            value,
            diagnostic: Some(LegacyDiagnostic {
                severity: DiagnosticSeverity::Error,
                field,
                message,
            }),
        }
    }
}

/// Determines the canonical posting type of a stored posting.
///
/// Precedence: the canonical `postingType` field, then the deprecated `type`
/// toggle, then the deprecated `recruitmentType` field. The first field
/// holding a recognised value wins. When none does, `regular` is returned
/// with an error-level diagnostic. Never fails.
#[must_use]
pub fn normalize_posting_type(record: &PostingRecord) -> Normalized<PostingType> {
    if let Some(posting_type) = record
        .posting_type
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<PostingType>().ok())
    {
        return Normalized::clean(posting_type);
    }

    let legacy_fields: [(&'static str, Option<&Value>); 2] = [
        ("type", record.legacy_type.as_ref()),
        ("recruitmentType", record.recruitment_type.as_ref()),
    ];

    for (field, value) in legacy_fields {
        match value.and_then(Value::as_str) {
            Some(LEGACY_APPLICATION) => {
                return Normalized::warning(
                    PostingType::Regular,
                    field,
                    format!("deprecated {field}='{LEGACY_APPLICATION}' mapped to 'regular'"),
                );
            }
            Some(LEGACY_FIXED) => {
                return Normalized::warning(
                    PostingType::Fixed,
                    field,
                    format!("deprecated {field}='{LEGACY_FIXED}' mapped to 'fixed'"),
                );
            }
            _ => {}
        }
    }

    Normalized::error(
        PostingType::Regular,
        "postingType",
        format!(
            "no usable posting type (postingType={}, type={}, recruitmentType={}); defaulting to 'regular'",
            describe(record.posting_type.as_ref()),
            describe(record.legacy_type.as_ref()),
            describe(record.recruitment_type.as_ref()),
        ),
    )
}

fn describe(value: Option<&Value>) -> String {
    value.map_or_else(|| String::from("<absent>"), Value::to_string)
}

/// Expands whatever selection shape an application record carries into a
/// uniform list.
///
/// Shapes, in order of preference:
/// 1. canonical `selections`;
/// 2. parallel `assignedRoles` / `assignedTimes` / `assignedDates` arrays,
///    matched by index over the shorter of roles and times;
/// 3. the deprecated `role` / `timeSlot` / `assignedDate` triple.
///
/// A record with none of these yields an empty list. Exact duplicates are
/// dropped; order is preserved.
#[must_use]
pub fn normalize_selections(record: &ApplicationRecord) -> Vec<SelectionItem> {
    let items: Vec<SelectionItem> = if !record.selections.is_empty() {
        record
            .selections
            .iter()
            .map(|s| SelectionItem::new(&s.role, &s.time, non_empty(s.date.as_deref())))
            .collect()
    } else if !record.assigned_roles.is_empty() && !record.assigned_times.is_empty() {
        parallel_selections(
            &record.assigned_roles,
            &record.assigned_times,
            &record.assigned_dates,
        )
    } else if let (Some(role), Some(time)) = (
        non_empty(record.role.as_deref()),
        non_empty(record.time_slot.as_deref()),
    ) {
        vec![SelectionItem::new(
            role,
            time,
            non_empty(record.assigned_date.as_deref()),
        )]
    } else {
        Vec::new()
    };

    let mut unique: Vec<SelectionItem> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

fn parallel_selections(roles: &[String], times: &[String], dates: &[String]) -> Vec<SelectionItem> {
    roles
        .iter()
        .zip(times)
        .enumerate()
        .map(|(i, (role, time))| {
            SelectionItem::new(role, time, non_empty(dates.get(i).map(String::as_str)))
        })
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Builds the canonical view of a stored posting.
///
/// Per-date requirements take priority; a posting without them uses its
/// deprecated top-level `timeSlots` as the date-less matrix.
///
/// # Errors
///
/// Returns an error if a requirement date cannot be converted.
pub fn normalize_posting(
    id: &PostingId,
    record: &PostingRecord,
    offset: UtcOffset,
) -> Result<Posting, DomainError> {
    let posting_type: PostingType = normalize_posting_type(record).value;

    let status: PostingStatus = match record.status.as_deref() {
        None => PostingStatus::Open,
        Some(s) => s.parse().unwrap_or_else(|_| {
            error!(posting_id = %id, status = s, "Unknown posting status, treating as open");
            PostingStatus::Open
        }),
    };

    let requirements: Vec<DateRequirement> = if record.date_specific_requirements.is_empty() {
        if record.time_slots.is_empty() {
            Vec::new()
        } else {
            vec![DateRequirement::wildcard(
                record.time_slots.iter().map(slot_requirement).collect(),
            )]
        }
    } else {
        record
            .date_specific_requirements
            .iter()
            .map(|r| {
                let date: Option<String> = r
                    .date
                    .as_ref()
                    .map(|d: &DateValue| d.to_canonical_string(offset))
                    .transpose()?;
                Ok(DateRequirement {
                    date,
                    time_slots: r.time_slots.iter().map(slot_requirement).collect(),
                })
            })
            .collect::<Result<Vec<DateRequirement>, DomainError>>()?
    };

    Ok(Posting {
        id: id.clone(),
        owner_id: posting_owner(record),
        posting_type,
        status,
        close_reason: if status == PostingStatus::Closed {
            record.close_reason
        } else {
            None
        },
        requirements,
        occupants: record.confirmed_staff.clone(),
    })
}

/// `ownerId`, falling back to `createdBy`. Blank values are ignored.
fn posting_owner(record: &PostingRecord) -> Option<ActorId> {
    [record.owner_id.as_deref(), record.created_by.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|owner| ActorId::parse(owner).ok())
}

fn slot_requirement(slot: &SlotRecord) -> SlotRequirement {
    let time: SlotTime = if slot.is_time_to_be_announced {
        SlotTime::ToBeAnnounced {
            description: slot.tentative_description.clone(),
        }
    } else {
        SlotTime::at(&slot.time)
    };
    SlotRequirement::new(time, slot.roles.clone())
}

/// Builds the canonical view of a stored application.
///
/// A confirmed legacy record without `confirmedSelections` is treated as
/// confirmed for everything it applied for, which is what single-valued
/// records meant.
#[must_use]
pub fn normalize_application(id: &ApplicationId, record: &ApplicationRecord) -> Application {
    let status: ApplicationStatus = match record.status.as_deref() {
        None => ApplicationStatus::Applied,
        Some(s) => s.parse().unwrap_or_else(|_| {
            error!(
                application_id = %id,
                status = s,
                "Unknown application status, treating as applied"
            );
            ApplicationStatus::Applied
        }),
    };

    let selections: Vec<SelectionItem> = normalize_selections(record);

    let confirmed_selections: Vec<SelectionItem> =
        if status == ApplicationStatus::Confirmed && record.confirmed_selections.is_empty() {
            selections.clone()
        } else if status == ApplicationStatus::Confirmed {
            record.confirmed_selections.clone()
        } else {
            Vec::new()
        };

    Application {
        id: id.clone(),
        posting_id: PostingId::new(&record.posting_id),
        applicant_id: ActorId::new(&record.applicant_id),
        status,
        selections,
        confirmed_selections,
        history: record.history.clone(),
    }
}
