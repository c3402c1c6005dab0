// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Typed access to posting and application documents.
//!
//! Reads normalize the stored record into the canonical view. Writes touch
//! only the fields a patch owns, so legacy fields stay as they were.

use crate::document::{DocumentKey, FieldOp};
use crate::error::PersistenceError;
use crate::store::DocumentStore;
use crate::transaction::Transaction;
use serde::Serialize;
use serde_json::Value;
use staffing::{ApplicationPatch, PostingPatch, StatusChange};
use staffing_domain::records::fields;
use staffing_domain::{
    Application, ApplicationId, ApplicationRecord, Posting, PostingId, PostingRecord,
    PostingStatus, normalize_application, normalize_posting,
};
use time::UtcOffset;

fn to_values<T: Serialize>(items: &[T]) -> Result<Vec<Value>, PersistenceError> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(Into::into))
        .collect()
}

fn posting_from_body(
    id: &PostingId,
    body: Value,
    offset: UtcOffset,
) -> Result<Posting, PersistenceError> {
    let record: PostingRecord = serde_json::from_value(body)?;
    Ok(normalize_posting(id, &record, offset)?)
}

fn application_from_body(
    id: &ApplicationId,
    body: Value,
) -> Result<Application, PersistenceError> {
    let record: ApplicationRecord = serde_json::from_value(body)?;
    Ok(normalize_application(id, &record))
}

/// Reads and normalizes a posting inside a transaction.
///
/// # Errors
///
/// Returns an error if the document cannot be read or interpreted.
pub fn load_posting<S: DocumentStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    id: &PostingId,
    offset: UtcOffset,
) -> Result<Option<Posting>, PersistenceError> {
    tx.get(&DocumentKey::posting(id))?
        .map(|body| posting_from_body(id, body, offset))
        .transpose()
}

/// Reads and normalizes an application inside a transaction.
///
/// # Errors
///
/// Returns an error if the document cannot be read or interpreted.
pub fn load_application<S: DocumentStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    id: &ApplicationId,
) -> Result<Option<Application>, PersistenceError> {
    tx.get(&DocumentKey::application(id))?
        .map(|body| application_from_body(id, body))
        .transpose()
}

/// Reads and normalizes a posting outside any transaction.
///
/// # Errors
///
/// Returns an error if the document cannot be read or interpreted.
pub fn read_posting<S: DocumentStore + ?Sized>(
    store: &S,
    id: &PostingId,
    offset: UtcOffset,
) -> Result<Option<Posting>, PersistenceError> {
    store
        .read(&DocumentKey::posting(id))?
        .map(|document| posting_from_body(id, document.value, offset))
        .transpose()
}

/// Reads and normalizes an application outside any transaction.
///
/// # Errors
///
/// Returns an error if the document cannot be read or interpreted.
pub fn read_application<S: DocumentStore + ?Sized>(
    store: &S,
    id: &ApplicationId,
) -> Result<Option<Application>, PersistenceError> {
    store
        .read(&DocumentKey::application(id))?
        .map(|document| application_from_body(id, document.value))
        .transpose()
}

/// Writes a canonical posting as a new document.
///
/// # Errors
///
/// Returns an error if the document cannot be written.
pub fn insert_posting<S: DocumentStore + ?Sized>(
    store: &S,
    posting: &Posting,
) -> Result<(), PersistenceError> {
    let body: Value = serde_json::to_value(PostingRecord::from(posting))?;
    store.create(&DocumentKey::posting(&posting.id), body)
}

/// Writes a canonical application as a new document.
///
/// # Errors
///
/// Returns an error if the document cannot be written.
pub fn insert_application<S: DocumentStore + ?Sized>(
    store: &S,
    application: &Application,
) -> Result<(), PersistenceError> {
    let body: Value = serde_json::to_value(ApplicationRecord::from(application))?;
    store.create(&DocumentKey::application(&application.id), body)
}

/// Translates a posting patch into field operations.
///
/// # Errors
///
/// Returns an error if an occupant entry cannot be serialized.
pub fn posting_ops(patch: &PostingPatch) -> Result<Vec<(String, FieldOp)>, PersistenceError> {
    let mut ops: Vec<(String, FieldOp)> = Vec::new();

    if !patch.add_occupants.is_empty() {
        ops.push((
            fields::CONFIRMED_STAFF.to_string(),
            FieldOp::ArrayUnion(to_values(&patch.add_occupants)?),
        ));
    }
    if !patch.remove_occupants.is_empty() {
        ops.push((
            fields::CONFIRMED_STAFF.to_string(),
            FieldOp::ArrayRemoveMatching {
                keys: fields::OCCUPANT_KEYS.into_iter().map(String::from).collect(),
                values: to_values(&patch.remove_occupants)?,
            },
        ));
    }

    match patch.status_change {
        Some(StatusChange::Close(reason)) => {
            ops.push((
                fields::STATUS.to_string(),
                FieldOp::Set(Value::from(PostingStatus::Closed.as_str())),
            ));
            ops.push((
                fields::CLOSE_REASON.to_string(),
                FieldOp::Set(Value::from(reason.as_str())),
            ));
        }
        Some(StatusChange::Reopen) => {
            ops.push((
                fields::STATUS.to_string(),
                FieldOp::Set(Value::from(PostingStatus::Open.as_str())),
            ));
            ops.push((fields::CLOSE_REASON.to_string(), FieldOp::Delete));
        }
        None => {}
    }

    Ok(ops)
}

/// Translates an application patch into field operations.
///
/// # Errors
///
/// Returns an error if a selection or history record cannot be serialized.
pub fn application_ops(
    patch: &ApplicationPatch,
) -> Result<Vec<(String, FieldOp)>, PersistenceError> {
    Ok(vec![
        (
            fields::STATUS.to_string(),
            FieldOp::Set(Value::from(patch.status.as_str())),
        ),
        (
            fields::CONFIRMED_SELECTIONS.to_string(),
            FieldOp::Set(Value::Array(to_values(&patch.confirmed_selections)?)),
        ),
        (
            fields::HISTORY.to_string(),
            FieldOp::ArrayUnion(vec![serde_json::to_value(&patch.history_entry)?]),
        ),
    ])
}

/// Stages a posting patch in a transaction.
///
/// # Errors
///
/// Returns an error if the patch cannot be serialized.
pub fn stage_posting_patch<S: DocumentStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    id: &PostingId,
    patch: &PostingPatch,
) -> Result<(), PersistenceError> {
    tx.update(&DocumentKey::posting(id), posting_ops(patch)?);
    Ok(())
}

/// Stages an application patch in a transaction.
///
/// # Errors
///
/// Returns an error if the patch cannot be serialized.
pub fn stage_application_patch<S: DocumentStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    id: &ApplicationId,
    patch: &ApplicationPatch,
) -> Result<(), PersistenceError> {
    tx.update(&DocumentKey::application(id), application_ops(patch)?);
    Ok(())
}

/// Stages a new application document in a transaction.
///
/// # Errors
///
/// Returns an error if the application cannot be serialized.
pub fn stage_new_application<S: DocumentStore + ?Sized>(
    tx: &mut Transaction<'_, S>,
    application: &Application,
) -> Result<(), PersistenceError> {
    let body: Value = serde_json::to_value(ApplicationRecord::from(application))?;
    tx.insert(&DocumentKey::application(&application.id), body)
}
