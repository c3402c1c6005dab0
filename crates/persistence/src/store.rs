// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::document::{Collection, DocumentKey, DocumentPatch, ReadGuard, Versioned, apply_ops};
use crate::error::PersistenceError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// A store of versioned JSON documents.
///
/// `commit` is the only way to modify existing documents. It is atomic and
/// conditional: it succeeds only if every document read by the caller still
/// has the version the caller saw.
pub trait DocumentStore: Send + Sync {
    /// Reads one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn read(&self, key: &DocumentKey) -> Result<Option<Versioned<Value>>, PersistenceError>;

    /// Atomically checks `reads` and applies `writes`.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Conflict` if any read version is stale,
    /// `PersistenceError::NotFound` if a patched document does not exist and
    /// the patch does not create it, or a storage error. Nothing is written
    /// when an error is returned.
    fn commit(&self, reads: &[ReadGuard], writes: &[DocumentPatch])
    -> Result<(), PersistenceError>;

    /// Creates a document, replacing any existing document with the same key.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    fn create(&self, key: &DocumentKey, value: Value) -> Result<(), PersistenceError>;

    /// Deletes a document. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be deleted.
    fn delete(&self, key: &DocumentKey) -> Result<bool, PersistenceError>;

    /// Lists every document of a collection as `(id, body)` pairs, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list(&self, collection: Collection) -> Result<Vec<(String, Value)>, PersistenceError>;
}

/// A process-local document store.
///
/// Versions come from a store-wide clock, so a document that is deleted and
/// created again never reuses a version a transaction may have observed.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Documents>,
}

#[derive(Debug, Default)]
struct Documents {
    clock: u64,
    by_key: HashMap<DocumentKey, Versioned<Value>>,
}

impl Documents {
    const fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Documents>, PersistenceError> {
        self.inner.lock().map_err(|_| PersistenceError::LockPoisoned)
    }
}

impl DocumentStore for InMemoryStore {
    fn read(&self, key: &DocumentKey) -> Result<Option<Versioned<Value>>, PersistenceError> {
        Ok(self.lock()?.by_key.get(key).cloned())
    }

    fn commit(
        &self,
        reads: &[ReadGuard],
        writes: &[DocumentPatch],
    ) -> Result<(), PersistenceError> {
        let mut documents = self.lock()?;

        for guard in reads {
            let current: Option<u64> = documents.by_key.get(&guard.key).map(|d| d.version);
            if current != guard.version {
                debug!(key = %guard.key, expected = ?guard.version, found = ?current, "Stale read");
                return Err(PersistenceError::Conflict {
                    key: guard.key.to_string(),
                });
            }
        }

        // Build every new body before touching the map so a failure leaves it unchanged.
        let mut staged: HashMap<DocumentKey, Versioned<Value>> = HashMap::new();
        for patch in writes {
            let base: Versioned<Value> = match staged.remove(&patch.key) {
                Some(pending) => pending,
                None => match documents.by_key.get(&patch.key) {
                    Some(current) => current.clone(),
                    None if patch.create => Versioned {
                        version: 0,
                        value: Value::Object(Map::new()),
                    },
                    None => return Err(PersistenceError::NotFound(patch.key.to_string())),
                },
            };
            let mut value: Value = base.value;
            apply_ops(&mut value, &patch.ops)?;
            staged.insert(
                patch.key.clone(),
                Versioned {
                    version: base.version,
                    value,
                },
            );
        }

        for (key, mut document) in staged {
            document.version = documents.tick();
            documents.by_key.insert(key, document);
        }
        Ok(())
    }

    fn create(&self, key: &DocumentKey, value: Value) -> Result<(), PersistenceError> {
        let mut documents = self.lock()?;
        let version: u64 = documents.tick();
        documents.by_key.insert(key.clone(), Versioned { version, value });
        Ok(())
    }

    fn delete(&self, key: &DocumentKey) -> Result<bool, PersistenceError> {
        Ok(self.lock()?.by_key.remove(key).is_some())
    }

    fn list(&self, collection: Collection) -> Result<Vec<(String, Value)>, PersistenceError> {
        let documents = self.lock()?;
        let mut listed: Vec<(String, Value)> = documents
            .by_key
            .iter()
            .filter(|(key, _)| key.collection == collection)
            .map(|(key, document)| (key.id.clone(), document.value.clone()))
            .collect();
        listed.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(listed)
    }
}
