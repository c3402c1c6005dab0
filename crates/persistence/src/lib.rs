// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for staffing postings and applications.
//!
//! Documents are JSON objects addressed by collection and id, each carrying a
//! version that every write bumps. Mutations happen through transactions
//! that record the versions they read and commit conditionally, the same
//! contract as a hosted document database.
//!
//! ## Backends
//!
//! - **`InMemoryStore`**: process-local, used by tests and by the server
//!   when no database file is given
//! - **`SqliteStore`**: a single `documents` table; commits run inside
//!   `BEGIN IMMEDIATE`
//!
//! ## Transactions
//!
//! `run_transaction` runs a closure against a fresh `Transaction`, commits,
//! and re-runs the closure from scratch when a read went stale, up to the
//! `RetryPolicy` attempt count.

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
#![allow(clippy::multiple_crate_versions)]

mod document;
mod error;
mod repository;
mod sqlite;
mod store;
mod transaction;

#[cfg(test)]
mod tests;

pub use document::{
    Collection, DocumentKey, DocumentPatch, FieldOp, ReadGuard, Versioned, apply_ops,
};
pub use error::PersistenceError;
pub use repository::{
    application_ops, insert_application, insert_posting, load_application, load_posting,
    posting_ops, read_application, read_posting, stage_application_patch, stage_new_application,
    stage_posting_patch,
};
pub use sqlite::SqliteStore;
pub use store::{DocumentStore, InMemoryStore};
pub use transaction::{DEFAULT_MAX_ATTEMPTS, RetryPolicy, Transaction, run_transaction};
