// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Command, PostingCommand};
use crate::error::CoreError;
use crate::lifecycle::{LifecycleDecision, evaluate_lifecycle};
use crate::state::{
    ApplicationPatch, PostingPatch, PostingTransition, StatusChange, TransitionResult,
};
use staffing_domain::{
    ActorId, Application, ApplicationId, ApplicationStatus, Cell, CloseReason,
    ConfirmationAction, ConfirmationRecord, DomainError, OccupantEntry, Posting, SelectionItem,
    is_cell_full, required_count, under_filled_dates,
};
use time::OffsetDateTime;

/// Applies an application command to a posting/application pair, producing
/// the patches to write and the resulting views.
///
/// Nothing is written here; the caller commits the patches atomically.
///
/// # Arguments
///
/// * `posting` - The posting as last read
/// * `application` - The application as last read
/// * `command` - The command to apply
/// * `actor` - The operator performing this action
/// * `at` - The commit timestamp recorded in history
///
/// # Errors
///
/// Returns an error if:
/// - The application does not belong to the posting
/// - The application status does not allow the command
/// - The chosen selections are empty or were not applied for
/// - Any chosen cell is already full
pub fn apply(
    posting: &Posting,
    application: &Application,
    command: Command,
    actor: &ActorId,
    at: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    if application.posting_id != posting.id {
        return Err(CoreError::DomainViolation(
            DomainError::ApplicationPostingMismatch {
                expected: application.posting_id.to_string(),
                actual: posting.id.to_string(),
            },
        ));
    }

    match command {
        Command::Confirm { selections } => confirm(posting, application, selections, actor, at),
        Command::Cancel => cancel(posting, application, actor, at),
    }
}

/// Builds a new application of `applicant` to `posting`.
///
/// # Arguments
///
/// * `posting` - The posting as last read
/// * `existing` - The application already stored under `id`, if any
/// * `id` - The identifier of the new application
/// * `applicant` - The applicant
/// * `selections` - The cells applied for; duplicates are collapsed
///
/// # Errors
///
/// Returns an error if:
/// - An application already exists under `id`
/// - The posting is closed
/// - `selections` is empty or names a cell the posting does not offer
/// - Every seat of a selected cell is already taken
pub fn submit_application(
    posting: &Posting,
    existing: Option<&Application>,
    id: ApplicationId,
    applicant: &ActorId,
    selections: Vec<SelectionItem>,
) -> Result<Application, CoreError> {
    if existing.is_some() {
        return Err(CoreError::AlreadyApplied(id));
    }
    if !posting.is_open() {
        return Err(CoreError::PostingClosed(posting.id.clone()));
    }

    let selections: Vec<SelectionItem> = dedup(selections);
    if selections.is_empty() {
        return Err(CoreError::EmptySelection);
    }

    if let Some(unknown) = selections
        .iter()
        .find(|s| required_count(posting, &s.cell()) <= 0)
    {
        return Err(CoreError::SelectionNotOffered(unknown.clone()));
    }

    let full: Vec<Cell> = selections
        .iter()
        .map(SelectionItem::cell)
        .filter(|cell| is_cell_full(posting, cell))
        .collect();
    if !full.is_empty() {
        return Err(CoreError::CapacityExceeded { cells: full });
    }

    Ok(Application {
        id,
        posting_id: posting.id.clone(),
        applicant_id: applicant.clone(),
        status: ApplicationStatus::Applied,
        selections,
        confirmed_selections: Vec::new(),
        history: Vec::new(),
    })
}

fn dedup(selections: Vec<SelectionItem>) -> Vec<SelectionItem> {
    let mut unique: Vec<SelectionItem> = Vec::with_capacity(selections.len());
    for selection in selections {
        if !unique.contains(&selection) {
            unique.push(selection);
        }
    }
    unique
}

fn confirm(
    posting: &Posting,
    application: &Application,
    selections: Vec<SelectionItem>,
    actor: &ActorId,
    at: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    if !application
        .status
        .can_transition_to(ApplicationStatus::Confirmed)
    {
        return Err(CoreError::InvalidTransition {
            from: application.status,
            to: ApplicationStatus::Confirmed,
        });
    }

    let chosen: Vec<SelectionItem> = dedup(selections);

    if chosen.is_empty() {
        return Err(CoreError::EmptySelection);
    }

    if let Some(missing) = chosen.iter().find(|s| !application.applied_for(s)) {
        return Err(CoreError::SelectionNotApplied(missing.clone()));
    }

    // Seats are taken one at a time on a working copy so that two chosen
    // selections competing for the same seat are both checked.
    let mut working: Posting = posting.clone();
    let mut added: Vec<OccupantEntry> = Vec::new();
    let mut full: Vec<Cell> = Vec::new();

    for selection in &chosen {
        let entry: OccupantEntry =
            OccupantEntry::for_selection(&application.applicant_id, selection);
        if working.has_occupant(&entry) {
            continue;
        }

        let cell: Cell = selection.cell();
        if is_cell_full(&working, &cell) {
            full.push(cell);
            continue;
        }

        working.occupants.push(entry.clone());
        added.push(entry);
    }

    if !full.is_empty() {
        return Err(CoreError::CapacityExceeded { cells: full });
    }

    let posting_patch: PostingPatch = PostingPatch {
        add_occupants: added,
        ..PostingPatch::default()
    };
    let application_patch: ApplicationPatch = ApplicationPatch {
        status: ApplicationStatus::Confirmed,
        confirmed_selections: chosen.clone(),
        history_entry: ConfirmationRecord {
            action: ConfirmationAction::Confirmed,
            selections: chosen.clone(),
            actor_id: actor.clone(),
            at,
        },
    };

    Ok(TransitionResult {
        new_posting: posting_patch.apply_to(posting),
        new_application: application_patch.apply_to(application),
        posting_patch,
        application_patch,
        cells: chosen.iter().map(SelectionItem::cell).collect(),
    })
}

fn cancel(
    posting: &Posting,
    application: &Application,
    actor: &ActorId,
    at: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    if !application
        .status
        .can_transition_to(ApplicationStatus::Applied)
    {
        return Err(CoreError::InvalidTransition {
            from: application.status,
            to: ApplicationStatus::Applied,
        });
    }

    let released: Vec<SelectionItem> = application.confirmed_selections.clone();

    let posting_patch: PostingPatch = PostingPatch {
        remove_occupants: released
            .iter()
            .map(|s| OccupantEntry::for_selection(&application.applicant_id, s))
            .collect(),
        ..PostingPatch::default()
    };
    let application_patch: ApplicationPatch = ApplicationPatch {
        status: ApplicationStatus::Applied,
        confirmed_selections: Vec::new(),
        history_entry: ConfirmationRecord {
            action: ConfirmationAction::Cancelled,
            selections: released.clone(),
            actor_id: actor.clone(),
            at,
        },
    };

    Ok(TransitionResult {
        new_posting: posting_patch.apply_to(posting),
        new_application: application_patch.apply_to(application),
        posting_patch,
        application_patch,
        cells: released.iter().map(SelectionItem::cell).collect(),
    })
}

/// Applies a lifecycle command to a posting.
///
/// Closing an already operator-closed posting and reopening an open one
/// are no-ops.
#[must_use]
pub fn apply_posting(posting: &Posting, command: PostingCommand) -> PostingTransition {
    let decision: LifecycleDecision = match command {
        PostingCommand::Close if posting.is_operator_closed() => LifecycleDecision::Unchanged,
        PostingCommand::Close => LifecycleDecision::Close,
        PostingCommand::Reopen if posting.is_open() => LifecycleDecision::Unchanged,
        PostingCommand::Reopen => LifecycleDecision::Reopen {
            under_filled: under_filled_dates(posting),
        },
        PostingCommand::ReconcileLifecycle => evaluate_lifecycle(posting),
    };

    let reason: CloseReason = if command == PostingCommand::Close {
        CloseReason::Operator
    } else {
        CloseReason::Fulfilled
    };

    let patch: PostingPatch = PostingPatch {
        status_change: match decision {
            LifecycleDecision::Close => Some(StatusChange::Close(reason)),
            LifecycleDecision::Reopen { .. } => Some(StatusChange::Reopen),
            LifecycleDecision::Unchanged => None,
        },
        ..PostingPatch::default()
    };

    PostingTransition {
        new_posting: patch.apply_to(posting),
        decision,
        patch,
    }
}
