// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod repository_tests;
mod store_tests;

use serde_json::{Value, json};
use staffing_domain::{
    ActorId, Application, ApplicationId, ApplicationStatus, DateRequirement, Posting, PostingId,
    PostingType, RoleRequirement, SelectionItem, SlotRequirement, SlotTime,
};

pub const EVENT_DATE: &str = "2026-10-19";

pub fn create_test_posting() -> Posting {
    Posting::new(
        PostingId::new("posting-1"),
        ActorId::new("owner-1"),
        PostingType::Regular,
        vec![DateRequirement::dated(
            EVENT_DATE,
            vec![SlotRequirement::new(
                SlotTime::at("18:00"),
                vec![RoleRequirement::new("dealer", 2)],
            )],
        )],
    )
}

pub fn create_test_application() -> Application {
    Application {
        id: ApplicationId::new("app-1"),
        posting_id: PostingId::new("posting-1"),
        applicant_id: ActorId::new("user-1"),
        status: ApplicationStatus::Applied,
        selections: vec![SelectionItem::new("dealer", "18:00", Some(EVENT_DATE))],
        confirmed_selections: Vec::new(),
        history: Vec::new(),
    }
}

pub fn legacy_posting_body() -> Value {
    json!({
        "createdBy": "owner-1",
        "type": "application",
        "title": "Friday game night",
        "timeSlots": [{ "time": "18:00", "roles": [{ "name": "dealer", "count": 2 }] }],
        "confirmedStaff": []
    })
}
