// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The assignment transaction processor.
//!
//! Every state-changing call runs its reads, planning and writes in one
//! optimistic transaction, retried from scratch on write conflicts. Once it
//! has committed, follow-ups (work records, auto-close/reopen) are queued in
//! an outbox owned by the call and drained. A follow-up failure is logged
//! and never changes the result of the call that queued it.

use crate::capabilities::{EditPolicy, compute_posting_capabilities};
use crate::error::ApiError;
use crate::materializer::{MaterializeRequest, Materializer};
use crate::outbox::{FollowUp, FollowUpError, FollowUpReport, Outbox};
use crate::request_response::{
    ApplicationResponse, AssignmentResponse, DateFulfillmentInfo, FulfillmentResponse,
    PostingResponse,
};
use staffing::{
    Command, LifecycleDecision, PostingCommand, PostingTransition, TransitionResult, apply,
    apply_posting, submit_application,
};
use staffing_domain::{
    ActorId, Application, ApplicationId, DEFAULT_DATE_LABEL_CAPACITY, DateLabelCache,
    FulfillmentKey, Posting, PostingId, SelectionItem, is_fully_fulfilled,
    total_required_headcount,
};
use staffing_persistence::{
    DocumentStore, RetryPolicy, Transaction, load_application, load_posting, read_application,
    read_posting, run_transaction, stage_application_patch, stage_new_application,
    stage_posting_patch,
};
use std::sync::{Arc, Mutex, PoisonError};
use time::{OffsetDateTime, UtcOffset};
use tracing::{error, info, warn};

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// How often a conflicting transaction is attempted.
    pub retry: RetryPolicy,
    /// Offset used to turn stored timestamps into calendar dates.
    pub calendar_offset: UtcOffset,
    /// Number of date labels kept in memory.
    pub date_label_cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            calendar_offset: UtcOffset::UTC,
            date_label_cache_capacity: DEFAULT_DATE_LABEL_CAPACITY,
        }
    }
}

/// Confirms and cancels applications against postings and keeps each
/// posting's open/closed status in line with its fulfillment.
pub struct AssignmentEngine {
    store: Arc<dyn DocumentStore>,
    policy: Box<dyn EditPolicy>,
    materializer: Box<dyn Materializer>,
    config: EngineConfig,
    outbox: Outbox,
    labels: Mutex<DateLabelCache>,
}

fn not_found(resource_type: &str, id: &str) -> ApiError {
    ApiError::NotFound {
        resource_type: resource_type.to_string(),
        id: id.to_string(),
    }
}

impl AssignmentEngine {
    /// Creates an engine.
    ///
    /// # Arguments
    ///
    /// * `store` - The document store holding postings and applications
    /// * `policy` - Decides who may edit a posting
    /// * `materializer` - Receives confirmed and cancelled cells
    /// * `config` - Engine settings
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        policy: Box<dyn EditPolicy>,
        materializer: Box<dyn Materializer>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            policy,
            materializer,
            config,
            outbox: Outbox::new(),
            labels: Mutex::new(DateLabelCache::new(config.date_label_cache_capacity)),
        }
    }

    /// Returns the engine settings.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the shared outbox for follow-ups queued outside a confirm or
    /// cancel call. Those calls drain their own follow-ups.
    #[must_use]
    pub const fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Reads the canonical view of a posting.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the posting does not exist, or an
    /// internal error if it cannot be read.
    pub fn posting(&self, posting_id: &PostingId) -> Result<Posting, ApiError> {
        read_posting(&*self.store, posting_id, self.config.calendar_offset)?
            .ok_or_else(|| not_found("Posting", posting_id.value()))
    }

    /// Reads the canonical view of an application.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the application does not exist, or an
    /// internal error if it cannot be read.
    pub fn application(&self, application_id: &ApplicationId) -> Result<Application, ApiError> {
        read_application(&*self.store, application_id)?
            .ok_or_else(|| not_found("Application", application_id.value()))
    }

    /// Describes a posting, with the capabilities of `actor` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the posting cannot be read.
    pub fn posting_response(
        &self,
        posting_id: &PostingId,
        actor: Option<&ActorId>,
    ) -> Result<PostingResponse, ApiError> {
        let posting: Posting = self.posting(posting_id)?;
        Ok(self.describe_posting(posting, actor))
    }

    /// Describes an application.
    ///
    /// # Errors
    ///
    /// Returns an error if the application cannot be read.
    pub fn application_response(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationResponse, ApiError> {
        let application: Application = self.application(application_id)?;
        Ok(ApplicationResponse {
            id: application.id.to_string(),
            status: application.status,
            application,
        })
    }

    /// Computes per-date fulfillment of a posting with display labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the posting cannot be read.
    pub fn fulfillment_by_date(
        &self,
        posting_id: &PostingId,
    ) -> Result<FulfillmentResponse, ApiError> {
        let posting: Posting = self.posting(posting_id)?;
        let report = staffing_domain::fulfillment_by_date(&posting);

        let dates: Vec<DateFulfillmentInfo> = {
            let mut labels = self.labels.lock().unwrap_or_else(PoisonError::into_inner);
            report
                .iter()
                .map(|(key, fulfillment)| DateFulfillmentInfo {
                    key: key.to_string(),
                    label: match key {
                        FulfillmentKey::Date(date) => labels.label(date),
                        FulfillmentKey::All => String::from("All dates"),
                    },
                    confirmed: fulfillment.confirmed,
                    required: fulfillment.required,
                    percentage: fulfillment.percentage,
                    fulfilled: fulfillment.is_fulfilled(),
                })
                .collect()
        };

        Ok(FulfillmentResponse {
            posting_id: posting.id.to_string(),
            fully_fulfilled: is_fully_fulfilled(&posting),
            dates,
        })
    }

    /// Records an application of `applicant` to a posting.
    ///
    /// The application is stored as `{posting}_{applicant}`, so an applicant
    /// holds at most one application per posting.
    ///
    /// # Arguments
    ///
    /// * `applicant` - The user applying
    /// * `posting_id` - The posting applied to
    /// * `selections` - The cells applied for
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The applicant id is blank
    /// - The posting does not exist or is closed
    /// - The applicant already applied to the posting
    /// - `selections` is empty or names a cell the posting does not offer
    /// - A selected cell is already full
    /// - Write conflicts persisted through every retry
    pub fn apply(
        &self,
        applicant: &ActorId,
        posting_id: &PostingId,
        selections: &[SelectionItem],
    ) -> Result<ApplicationResponse, ApiError> {
        if applicant.value().trim().is_empty() {
            return Err(ApiError::PermissionDenied {
                actor: applicant.to_string(),
                action: String::from("apply to postings"),
            });
        }
        let application_id: ApplicationId =
            ApplicationId::new(&format!("{posting_id}_{applicant}"));

        let application: Application = self.transact(|tx| {
            let posting: Posting = load_posting(tx, posting_id, self.config.calendar_offset)?
                .ok_or_else(|| not_found("Posting", posting_id.value()))?;
            let existing: Option<Application> = load_application(tx, &application_id)?;

            let application: Application = submit_application(
                &posting,
                existing.as_ref(),
                application_id.clone(),
                applicant,
                selections.to_vec(),
            )?;
            stage_new_application(tx, &application)?;
            Ok(application)
        })?;

        info!(
            application_id = %application.id,
            posting_id = %posting_id,
            applicant = %applicant,
            selections = application.selections.len(),
            "Application submitted"
        );

        Ok(ApplicationResponse {
            id: application.id.to_string(),
            status: application.status,
            application,
        })
    }

    /// Confirms an application into the chosen cells.
    ///
    /// Either every chosen cell is taken or nothing is written. Afterwards a
    /// work record is materialized per cell and the posting is closed if it
    /// became fully staffed.
    ///
    /// # Arguments
    ///
    /// * `actor` - The operator confirming
    /// * `application_id` - The application to confirm
    /// * `chosen` - The selections to confirm, a subset of what was applied for
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The application or its posting does not exist
    /// - The actor may not edit the posting
    /// - The application is not in the applied state
    /// - `chosen` is empty or names a selection that was not applied for
    /// - Any chosen cell is already full
    /// - Write conflicts persisted through every retry
    pub fn confirm(
        &self,
        actor: &ActorId,
        application_id: &ApplicationId,
        chosen: &[SelectionItem],
    ) -> Result<AssignmentResponse, ApiError> {
        let at: OffsetDateTime = OffsetDateTime::now_utc();

        let result: TransitionResult = self.transact(|tx| {
            let (posting, application) = self.load_pair(tx, application_id)?;
            self.authorize(actor, &posting, "confirm applications")?;

            let command: Command = Command::Confirm {
                selections: chosen.to_vec(),
            };
            let result: TransitionResult = apply(&posting, &application, command, actor, at)?;
            stage_posting_patch(tx, &posting.id, &result.posting_patch)?;
            stage_application_patch(tx, &application.id, &result.application_patch)?;
            Ok(result)
        })?;

        info!(
            application_id = %application_id,
            posting_id = %result.new_posting.id,
            actor = %actor,
            cells = result.cells.len(),
            added = result.posting_patch.add_occupants.len(),
            "Application confirmed"
        );

        let follow_ups: Outbox = Outbox::new();
        for cell in &result.cells {
            follow_ups.push(FollowUp::Materialize(MaterializeRequest {
                posting_id: result.new_posting.id.clone(),
                posting_type: result.new_posting.posting_type,
                applicant_id: result.new_application.applicant_id.clone(),
                cell: cell.clone(),
            }));
        }
        follow_ups.push(FollowUp::ReconcileLifecycle {
            posting_id: result.new_posting.id.clone(),
        });

        let report: FollowUpReport = self.run_follow_ups(&follow_ups);
        Ok(self.assignment_response(result, report))
    }

    /// Cancels a confirmed application.
    ///
    /// Releases every confirmed cell, returns the application to applied and
    /// reopens the posting if it is no longer fully staffed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The application or its posting does not exist
    /// - The actor may not edit the posting
    /// - The application is not confirmed
    /// - Write conflicts persisted through every retry
    pub fn cancel(
        &self,
        actor: &ActorId,
        application_id: &ApplicationId,
    ) -> Result<AssignmentResponse, ApiError> {
        let at: OffsetDateTime = OffsetDateTime::now_utc();

        let result: TransitionResult = self.transact(|tx| {
            let (posting, application) = self.load_pair(tx, application_id)?;
            self.authorize(actor, &posting, "cancel confirmations")?;

            let result: TransitionResult =
                apply(&posting, &application, Command::Cancel, actor, at)?;
            stage_posting_patch(tx, &posting.id, &result.posting_patch)?;
            stage_application_patch(tx, &application.id, &result.application_patch)?;
            Ok(result)
        })?;

        info!(
            application_id = %application_id,
            posting_id = %result.new_posting.id,
            actor = %actor,
            released = result.cells.len(),
            "Confirmation cancelled"
        );

        let follow_ups: Outbox = Outbox::new();
        if !result.cells.is_empty() {
            follow_ups.push(FollowUp::Dematerialize {
                posting_id: result.new_posting.id.clone(),
                applicant_id: result.new_application.applicant_id.clone(),
                cells: result.cells.clone(),
            });
        }
        follow_ups.push(FollowUp::ReconcileLifecycle {
            posting_id: result.new_posting.id.clone(),
        });

        let report: FollowUpReport = self.run_follow_ups(&follow_ups);
        Ok(self.assignment_response(result, report))
    }

    /// Closes a posting on behalf of an operator.
    ///
    /// An operator-closed posting is never reopened automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the posting does not exist, the actor may not edit
    /// it, or write conflicts persisted through every retry.
    pub fn close_posting(
        &self,
        actor: &ActorId,
        posting_id: &PostingId,
    ) -> Result<PostingResponse, ApiError> {
        let transition: PostingTransition =
            self.transition_posting(actor, posting_id, PostingCommand::Close, "close postings")?;

        if transition.decision == LifecycleDecision::Close {
            info!(posting_id = %posting_id, actor = %actor, "Posting closed by operator");
        }

        Ok(self.describe_posting(transition.new_posting, Some(actor)))
    }

    /// Reopens a closed posting on behalf of an operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the posting does not exist, the actor may not edit
    /// it, or write conflicts persisted through every retry.
    pub fn reopen_posting(
        &self,
        actor: &ActorId,
        posting_id: &PostingId,
    ) -> Result<PostingResponse, ApiError> {
        let transition: PostingTransition = self.transition_posting(
            actor,
            posting_id,
            PostingCommand::Reopen,
            "reopen postings",
        )?;

        if let LifecycleDecision::Reopen { under_filled } = &transition.decision {
            let dates: Vec<&str> = under_filled.iter().map(FulfillmentKey::as_str).collect();
            info!(
                posting_id = %posting_id,
                actor = %actor,
                under_filled = ?dates,
                "Posting reopened by operator"
            );
        }

        Ok(self.describe_posting(transition.new_posting, Some(actor)))
    }

    /// Closes or reopens a posting to match its fulfillment.
    ///
    /// # Errors
    ///
    /// Returns an error if the posting does not exist or write conflicts
    /// persisted through every retry.
    pub fn reconcile_lifecycle(
        &self,
        posting_id: &PostingId,
    ) -> Result<LifecycleDecision, ApiError> {
        let transition: PostingTransition = self.transact(|tx| {
            let posting: Posting = load_posting(tx, posting_id, self.config.calendar_offset)?
                .ok_or_else(|| not_found("Posting", posting_id.value()))?;
            let transition: PostingTransition =
                apply_posting(&posting, PostingCommand::ReconcileLifecycle);
            stage_posting_patch(tx, posting_id, &transition.patch)?;
            Ok(transition)
        })?;

        match &transition.decision {
            LifecycleDecision::Close => {
                info!(posting_id = %posting_id, "Posting fully staffed, closed");
            }
            LifecycleDecision::Reopen { under_filled } => {
                let dates: Vec<&str> = under_filled.iter().map(FulfillmentKey::as_str).collect();
                info!(
                    posting_id = %posting_id,
                    under_filled = ?dates,
                    "Posting no longer fully staffed, reopened"
                );
            }
            LifecycleDecision::Unchanged => {}
        }

        Ok(transition.decision)
    }

    /// Runs every follow-up pending in the shared outbox.
    ///
    /// Failures are logged and counted; they never stop later follow-ups.
    pub fn drain_follow_ups(&self) -> FollowUpReport {
        self.run_follow_ups(&self.outbox)
    }

    fn run_follow_ups(&self, outbox: &Outbox) -> FollowUpReport {
        let mut report: FollowUpReport = FollowUpReport::default();

        for follow_up in outbox.take_all() {
            match self.run_follow_up(&follow_up) {
                Ok(()) => report.completed += 1,
                Err(err) => {
                    error!(follow_up = follow_up.name(), error = %err, "Follow-up failed");
                    report.failed += 1;
                }
            }
        }

        report
    }

    fn run_follow_up(&self, follow_up: &FollowUp) -> Result<(), FollowUpError> {
        match follow_up {
            FollowUp::Materialize(request) => self.materializer.materialize(request)?,
            FollowUp::Dematerialize {
                posting_id,
                applicant_id,
                cells,
            } => self
                .materializer
                .dematerialize(applicant_id, posting_id, cells)?,
            FollowUp::ReconcileLifecycle { posting_id } => {
                self.reconcile_lifecycle(posting_id)?;
            }
        }
        Ok(())
    }

    fn transact<T, F>(&self, body: F) -> Result<T, ApiError>
    where
        F: FnMut(&mut Transaction<'_, dyn DocumentStore>) -> Result<T, ApiError>,
    {
        run_transaction(&*self.store, self.config.retry, body)
    }

    fn transition_posting(
        &self,
        actor: &ActorId,
        posting_id: &PostingId,
        command: PostingCommand,
        action: &str,
    ) -> Result<PostingTransition, ApiError> {
        self.transact(|tx| {
            let posting: Posting = load_posting(tx, posting_id, self.config.calendar_offset)?
                .ok_or_else(|| not_found("Posting", posting_id.value()))?;
            self.authorize(actor, &posting, action)?;

            let transition: PostingTransition = apply_posting(&posting, command);
            stage_posting_patch(tx, posting_id, &transition.patch)?;
            Ok(transition)
        })
    }

    fn load_pair(
        &self,
        tx: &mut Transaction<'_, dyn DocumentStore>,
        application_id: &ApplicationId,
    ) -> Result<(Posting, Application), ApiError> {
        let application: Application = load_application(tx, application_id)?
            .ok_or_else(|| not_found("Application", application_id.value()))?;
        let posting: Posting =
            load_posting(tx, &application.posting_id, self.config.calendar_offset)?
                .ok_or_else(|| not_found("Posting", application.posting_id.value()))?;
        Ok((posting, application))
    }

    fn authorize(&self, actor: &ActorId, posting: &Posting, action: &str) -> Result<(), ApiError> {
        if self.policy.can_edit(actor, posting) {
            return Ok(());
        }

        warn!(actor = %actor, posting_id = %posting.id, action, "Permission denied");
        Err(ApiError::PermissionDenied {
            actor: actor.to_string(),
            action: action.to_string(),
        })
    }

    fn describe_posting(&self, posting: Posting, actor: Option<&ActorId>) -> PostingResponse {
        PostingResponse {
            id: posting.id.to_string(),
            posting_type: posting.posting_type,
            status: posting.status,
            close_reason: posting.close_reason,
            required_headcount: total_required_headcount(&posting.requirements),
            occupant_count: posting.occupants.len(),
            fully_fulfilled: is_fully_fulfilled(&posting),
            capabilities: actor
                .map(|actor| compute_posting_capabilities(self.policy.as_ref(), actor, &posting)),
            posting,
        }
    }

    fn assignment_response(
        &self,
        result: TransitionResult,
        follow_ups: FollowUpReport,
    ) -> AssignmentResponse {
        let posting_id: PostingId = result.new_posting.id.clone();
        let posting: Posting =
            match read_posting(&*self.store, &posting_id, self.config.calendar_offset) {
                Ok(Some(posting)) => posting,
                Ok(None) => {
                    warn!(posting_id = %posting_id, "Posting vanished after commit");
                    result.new_posting
                }
                Err(err) => {
                    warn!(posting_id = %posting_id, error = %err, "Could not re-read posting");
                    result.new_posting
                }
            };

        AssignmentResponse {
            application_id: result.new_application.id.to_string(),
            application_status: result.new_application.status,
            posting_id: posting_id.to_string(),
            posting_status: posting.status,
            close_reason: posting.close_reason,
            cells: result.cells,
            follow_ups,
        }
    }
}
