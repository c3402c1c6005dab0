// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Optimistic read-then-conditional-write transactions with bounded retry.

use crate::document::{DocumentKey, DocumentPatch, FieldOp, ReadGuard};
use crate::error::PersistenceError;
use crate::store::DocumentStore;
use serde_json::Value;
use tracing::{debug, warn};

/// Default number of attempts for a conflicting transaction.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// How many times a transaction is attempted before giving up on conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never zero.
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// Creates a policy; zero is raised to one attempt.
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

/// One attempt of a transaction.
///
/// Records the version of every document it reads and stages writes; nothing
/// reaches the store until `commit`.
pub struct Transaction<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    reads: Vec<(ReadGuard, Option<Value>)>,
    writes: Vec<DocumentPatch>,
}

impl<'a, S: DocumentStore + ?Sized> Transaction<'a, S> {
    /// Starts a transaction against `store`.
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Reads a document. Repeated reads return the first observed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn get(&mut self, key: &DocumentKey) -> Result<Option<Value>, PersistenceError> {
        if let Some((_, value)) = self.reads.iter().find(|(guard, _)| &guard.key == key) {
            return Ok(value.clone());
        }

        let read = self.store.read(key)?;
        let guard = ReadGuard {
            key: key.clone(),
            version: read.as_ref().map(|d| d.version),
        };
        let value: Option<Value> = read.map(|d| d.value);
        self.reads.push((guard, value.clone()));
        Ok(value)
    }

    /// Stages field writes against a document.
    pub fn update(&mut self, key: &DocumentKey, ops: Vec<(String, FieldOp)>) {
        if ops.is_empty() {
            return;
        }
        self.writes.push(DocumentPatch::update(key.clone(), ops));
    }

    /// Stages a new document.
    ///
    /// The key should have been read as missing in this transaction, so that
    /// the commit fails with a conflict if someone else created it first.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InvalidDocument` if `body` is not an object.
    pub fn insert(&mut self, key: &DocumentKey, body: Value) -> Result<(), PersistenceError> {
        self.writes.push(DocumentPatch::insert(key.clone(), body)?);
        Ok(())
    }

    /// Returns whether no write has been staged.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    /// Commits staged writes if every read is still current.
    ///
    /// A read-only transaction commits trivially.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Conflict` if a read went stale.
    pub fn commit(self) -> Result<(), PersistenceError> {
        if self.writes.is_empty() {
            return Ok(());
        }
        let guards: Vec<ReadGuard> = self.reads.into_iter().map(|(guard, _)| guard).collect();
        self.store.commit(&guards, &self.writes)
    }
}

/// Runs `body` in a transaction, retrying from scratch on write conflicts.
///
/// `body` must be free of side effects other than the transaction's own
/// reads and writes, since it may run several times.
///
/// # Errors
///
/// Returns whatever `body` returns, a storage error, or
/// `PersistenceError::ConflictRetriesExhausted` once every attempt conflicted.
pub fn run_transaction<S, T, E, F>(store: &S, policy: RetryPolicy, mut body: F) -> Result<T, E>
where
    S: DocumentStore + ?Sized,
    E: From<PersistenceError>,
    F: FnMut(&mut Transaction<'_, S>) -> Result<T, E>,
{
    for attempt in 1..=policy.max_attempts {
        let mut tx: Transaction<'_, S> = Transaction::new(store);
        let value: T = body(&mut tx)?;

        match tx.commit() {
            Ok(()) => return Ok(value),
            Err(PersistenceError::Conflict { key }) => {
                debug!(attempt, key = %key, "Write conflict, retrying transaction");
            }
            Err(err) => return Err(err.into()),
        }
    }

    warn!(
        attempts = policy.max_attempts,
        "Transaction abandoned after repeated write conflicts"
    );
    Err(PersistenceError::ConflictRetriesExhausted {
        attempts: policy.max_attempts,
    }
    .into())
}
