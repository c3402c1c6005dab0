// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod capabilities;
mod engine;
mod error;
mod materializer;
mod outbox;
mod request_response;

#[cfg(test)]
mod tests;

pub use capabilities::{EditPolicy, OwnerOrAdminPolicy, compute_posting_capabilities};
pub use engine::{AssignmentEngine, EngineConfig};
pub use error::{ApiError, translate_core_error, translate_domain_error};
pub use materializer::{
    MaterializationError, MaterializeRequest, Materializer, StoreMaterializer, work_record_id,
};
pub use outbox::{FollowUp, FollowUpError, FollowUpReport, Outbox};
pub use request_response::{
    ApplicationResponse, AssignmentResponse, Capability, DateFulfillmentInfo,
    FulfillmentResponse, PostingCapabilities, PostingResponse,
};
