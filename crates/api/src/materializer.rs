// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Derived work records for confirmed cells.
//!
//! Materialization runs after the confirm transaction has committed. A
//! failure here is logged and never undoes the confirmation.

use serde_json::{Value, json};
use staffing_domain::{ActorId, Cell, PostingId, PostingType};
use staffing_persistence::{DocumentKey, DocumentStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Materialization errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MaterializationError {
    /// The work record could not be written or removed.
    #[error("Failed to store work record '{record_id}': {message}")]
    Store { record_id: String, message: String },

    /// The materializer refused to create a record for the cell.
    #[error("Work record for {cell} rejected: {reason}")]
    Rejected { cell: Cell, reason: String },
}

/// One confirmed cell to turn into a work record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeRequest {
    /// The posting confirmed into.
    pub posting_id: PostingId,
    /// The kind of posting.
    pub posting_type: PostingType,
    /// The confirmed applicant.
    pub applicant_id: ActorId,
    /// The confirmed cell.
    pub cell: Cell,
}

impl MaterializeRequest {
    /// Returns the id of the work record for this cell.
    #[must_use]
    pub fn record_id(&self) -> String {
        work_record_id(&self.posting_id, &self.applicant_id, &self.cell)
    }
}

/// Builds the deterministic id of a work record.
///
/// The same (posting, applicant, cell) always yields the same id, so writing
/// a record twice replaces it instead of duplicating it.
#[must_use]
pub fn work_record_id(posting_id: &PostingId, applicant_id: &ActorId, cell: &Cell) -> String {
    format!(
        "{}_{}_{}_{}_{}",
        posting_id,
        applicant_id,
        cell.date.as_deref().unwrap_or("all"),
        cell.time,
        cell.role
    )
}

/// Creates and removes derived records for confirmed cells.
pub trait Materializer: Send + Sync {
    /// Creates the derived record for one confirmed cell.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be created.
    fn materialize(&self, request: &MaterializeRequest) -> Result<(), MaterializationError>;

    /// Removes the derived records of cancelled cells.
    ///
    /// # Errors
    ///
    /// Returns an error if a record cannot be removed.
    fn dematerialize(
        &self,
        applicant_id: &ActorId,
        posting_id: &PostingId,
        cells: &[Cell],
    ) -> Result<(), MaterializationError>;
}

/// Writes work records into the `workRecords` collection of a store.
pub struct StoreMaterializer {
    store: Arc<dyn DocumentStore>,
}

impl StoreMaterializer {
    /// Creates a materializer writing into `store`.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

impl std::fmt::Debug for StoreMaterializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreMaterializer").finish_non_exhaustive()
    }
}

impl Materializer for StoreMaterializer {
    fn materialize(&self, request: &MaterializeRequest) -> Result<(), MaterializationError> {
        let record_id: String = request.record_id();
        let body: Value = json!({
            "postingId": request.posting_id.value(),
            "postingType": request.posting_type.as_str(),
            "userId": request.applicant_id.value(),
            "date": request.cell.date,
            "time": request.cell.time,
            "role": request.cell.role,
        });

        self.store
            .create(&DocumentKey::work_record(&record_id), body)
            .map_err(|err| MaterializationError::Store {
                record_id: record_id.clone(),
                message: err.to_string(),
            })?;

        debug!(record_id = %record_id, "Work record written");
        Ok(())
    }

    fn dematerialize(
        &self,
        applicant_id: &ActorId,
        posting_id: &PostingId,
        cells: &[Cell],
    ) -> Result<(), MaterializationError> {
        for cell in cells {
            let record_id: String = work_record_id(posting_id, applicant_id, cell);
            let removed: bool = self
                .store
                .delete(&DocumentKey::work_record(&record_id))
                .map_err(|err| MaterializationError::Store {
                    record_id: record_id.clone(),
                    message: err.to_string(),
                })?;
            debug!(record_id = %record_id, removed, "Work record removed");
        }
        Ok(())
    }
}
