// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::Value;
use staffing_domain::{
    ActorId, Application, ApplicationId, ApplicationStatus, Cell, DateRequirement, Posting,
    PostingId, PostingType, RoleRequirement, SelectionItem, SlotRequirement, SlotTime,
};
use staffing_persistence::{
    Collection, DocumentKey, DocumentPatch, DocumentStore, InMemoryStore, PersistenceError,
    ReadGuard, RetryPolicy, Versioned, insert_application, insert_posting,
};

use crate::{
    AssignmentEngine, EngineConfig, MaterializationError, MaterializeRequest, Materializer,
    OwnerOrAdminPolicy, StoreMaterializer,
};

pub const EVENT_DATE: &str = "2026-10-19";
pub const OWNER: &str = "owner-1";
pub const ADMIN: &str = "admin-1";

pub fn owner() -> ActorId {
    ActorId::new(OWNER)
}

pub fn posting_id() -> PostingId {
    PostingId::new("posting-1")
}

pub fn dealer_selection() -> SelectionItem {
    SelectionItem::new("dealer", "18:00", Some(EVENT_DATE))
}

pub fn floor_selection() -> SelectionItem {
    SelectionItem::new("floor", "18:00", Some(EVENT_DATE))
}

pub fn dealer_cell() -> Cell {
    dealer_selection().cell()
}

/// A posting on `EVENT_DATE` at 18:00 needing `dealers` dealers and one floor.
pub fn create_test_posting(dealers: i64) -> Posting {
    Posting::new(
        posting_id(),
        owner(),
        PostingType::Regular,
        vec![DateRequirement::dated(
            EVENT_DATE,
            vec![SlotRequirement::new(
                SlotTime::at("18:00"),
                vec![
                    RoleRequirement::new("dealer", dealers),
                    RoleRequirement::new("floor", 1),
                ],
            )],
        )],
    )
}

/// A posting needing only `dealers` dealers.
pub fn create_dealer_only_posting(dealers: i64) -> Posting {
    Posting::new(
        posting_id(),
        owner(),
        PostingType::Regular,
        vec![DateRequirement::dated(
            EVENT_DATE,
            vec![SlotRequirement::new(
                SlotTime::at("18:00"),
                vec![RoleRequirement::new("dealer", dealers)],
            )],
        )],
    )
}

pub fn create_test_application(
    id: &str,
    user: &str,
    selections: Vec<SelectionItem>,
) -> Application {
    Application {
        id: ApplicationId::new(id),
        posting_id: posting_id(),
        applicant_id: ActorId::new(user),
        status: ApplicationStatus::Applied,
        selections,
        confirmed_selections: Vec::new(),
        history: Vec::new(),
    }
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        retry: RetryPolicy::new(20),
        ..EngineConfig::default()
    }
}

/// An engine over `store` with the store materializer and one admin.
pub fn create_engine(store: Arc<dyn DocumentStore>) -> AssignmentEngine {
    create_engine_with(
        store.clone(),
        Box::new(StoreMaterializer::new(store)),
    )
}

pub fn create_engine_with(
    store: Arc<dyn DocumentStore>,
    materializer: Box<dyn Materializer>,
) -> AssignmentEngine {
    AssignmentEngine::new(
        store,
        Box::new(OwnerOrAdminPolicy::new([ActorId::new(ADMIN)])),
        materializer,
        test_config(),
    )
}

/// Seeds a store with a posting and applications.
pub fn seed(store: &dyn DocumentStore, posting: &Posting, applications: &[Application]) {
    insert_posting(store, posting).unwrap();
    for application in applications {
        insert_application(store, application).unwrap();
    }
}

pub fn posting_version(store: &dyn DocumentStore) -> u64 {
    store
        .read(&DocumentKey::posting(&posting_id()))
        .unwrap()
        .unwrap()
        .version
}

pub fn work_record_ids(store: &dyn DocumentStore) -> Vec<String> {
    store
        .list(Collection::WorkRecords)
        .unwrap()
        .into_iter()
        .map(|(id, _)| id)
        .collect()
}

/// Counts calls and fails for one role.
#[derive(Debug, Default)]
pub struct FlakyMaterializer {
    pub failing_role: String,
    pub materialized: Arc<AtomicUsize>,
    pub dematerialized: Arc<AtomicUsize>,
}

impl Materializer for FlakyMaterializer {
    fn materialize(&self, request: &MaterializeRequest) -> Result<(), MaterializationError> {
        self.materialized.fetch_add(1, Ordering::SeqCst);
        if request.cell.role == self.failing_role {
            return Err(MaterializationError::Rejected {
                cell: request.cell.clone(),
                reason: String::from("payroll system offline"),
            });
        }
        Ok(())
    }

    fn dematerialize(
        &self,
        _applicant_id: &ActorId,
        _posting_id: &PostingId,
        _cells: &[Cell],
    ) -> Result<(), MaterializationError> {
        self.dematerialized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Deletes one document right before the first commit goes through.
pub struct DeletingStore {
    pub inner: InMemoryStore,
    pub victim: DocumentKey,
    pub armed: AtomicBool,
}

impl DocumentStore for DeletingStore {
    fn read(&self, key: &DocumentKey) -> Result<Option<Versioned<Value>>, PersistenceError> {
        self.inner.read(key)
    }

    fn commit(
        &self,
        reads: &[ReadGuard],
        writes: &[DocumentPatch],
    ) -> Result<(), PersistenceError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.inner.delete(&self.victim)?;
        }
        self.inner.commit(reads, writes)
    }

    fn create(&self, key: &DocumentKey, value: Value) -> Result<(), PersistenceError> {
        self.inner.create(key, value)
    }

    fn delete(&self, key: &DocumentKey) -> Result<bool, PersistenceError> {
        self.inner.delete(key)
    }

    fn list(&self, collection: Collection) -> Result<Vec<(String, Value)>, PersistenceError> {
        self.inner.list(collection)
    }
}
