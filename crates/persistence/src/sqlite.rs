// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::document::{Collection, DocumentKey, DocumentPatch, ReadGuard, Versioned, apply_ops};
use crate::error::PersistenceError;
use crate::store::DocumentStore;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// A document store backed by a single `SQLite` table.
///
/// Commits run inside `BEGIN IMMEDIATE`, so concurrent writers against the
/// same database file are serialized by `SQLite` itself.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Creates a store backed by a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        Self::initialize(Connection::open_in_memory()?)
    }

    /// Creates a store backed by a database file, creating it if needed.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let conn: Connection = Connection::open(path.as_ref())?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(journal_mode = %mode, "Opened database file");
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self, PersistenceError> {
        info!("Initializing document schema");

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                version INTEGER NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            );

            CREATE TABLE IF NOT EXISTS version_clock (
                id INTEGER PRIMARY KEY CHECK (id = 0),
                value INTEGER NOT NULL
            );

            INSERT OR IGNORE INTO version_clock (id, value) VALUES (0, 0);
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.conn.lock().map_err(|_| PersistenceError::LockPoisoned)
    }
}

const UPSERT: &str = "INSERT INTO documents (collection, id, version, body) VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT (collection, id) DO UPDATE SET version = excluded.version, body = excluded.body";

fn tick(conn: &Connection) -> Result<i64, PersistenceError> {
    conn.query_row(
        "UPDATE version_clock SET value = value + 1 WHERE id = 0 RETURNING value",
        [],
        |row| row.get(0),
    )
    .map_err(Into::into)
}

fn select(
    conn: &Connection,
    key: &DocumentKey,
) -> Result<Option<(i64, String)>, PersistenceError> {
    conn.query_row(
        "SELECT version, body FROM documents WHERE collection = ?1 AND id = ?2",
        params![key.collection.as_str(), key.id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
    .map_err(Into::into)
}

fn to_version(version: i64) -> Result<u64, PersistenceError> {
    u64::try_from(version)
        .map_err(|_| PersistenceError::DatabaseError(format!("negative version {version}")))
}

impl DocumentStore for SqliteStore {
    fn read(&self, key: &DocumentKey) -> Result<Option<Versioned<Value>>, PersistenceError> {
        let conn = self.lock()?;
        select(&conn, key)?
            .map(|(version, body)| -> Result<Versioned<Value>, PersistenceError> {
                Ok(Versioned {
                    version: to_version(version)?,
                    value: serde_json::from_str(&body)?,
                })
            })
            .transpose()
    }

    fn commit(
        &self,
        reads: &[ReadGuard],
        writes: &[DocumentPatch],
    ) -> Result<(), PersistenceError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        for guard in reads {
            let current: Option<u64> = select(&tx, &guard.key)?
                .map(|(version, _)| to_version(version))
                .transpose()?;
            if current != guard.version {
                debug!(key = %guard.key, expected = ?guard.version, found = ?current, "Stale read");
                return Err(PersistenceError::Conflict {
                    key: guard.key.to_string(),
                });
            }
        }

        for patch in writes {
            let mut value: Value = match select(&tx, &patch.key)? {
                Some((_, body)) => serde_json::from_str(&body)?,
                None if patch.create => Value::Object(Map::new()),
                None => return Err(PersistenceError::NotFound(patch.key.to_string())),
            };
            apply_ops(&mut value, &patch.ops)?;
            let version: i64 = tick(&tx)?;
            tx.execute(
                UPSERT,
                params![
                    patch.key.collection.as_str(),
                    patch.key.id,
                    version,
                    serde_json::to_string(&value)?
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn create(&self, key: &DocumentKey, value: Value) -> Result<(), PersistenceError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let version: i64 = tick(&tx)?;
        tx.execute(
            UPSERT,
            params![
                key.collection.as_str(),
                key.id,
                version,
                serde_json::to_string(&value)?
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, key: &DocumentKey) -> Result<bool, PersistenceError> {
        let conn = self.lock()?;
        let removed: usize = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![key.collection.as_str(), key.id],
        )?;
        Ok(removed > 0)
    }

    fn list(&self, collection: Collection) -> Result<Vec<(String, Value)>, PersistenceError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, body FROM documents WHERE collection = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![collection.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut listed: Vec<(String, Value)> = Vec::new();
        for row in rows {
            let (id, body) = row?;
            listed.push((id, serde_json::from_str(&body)?));
        }
        Ok(listed)
    }
}
