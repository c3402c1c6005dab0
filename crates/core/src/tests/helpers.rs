// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use staffing_domain::{
    ActorId, Application, ApplicationId, ApplicationStatus, DateRequirement, Posting, PostingId,
    PostingType, RoleRequirement, SelectionItem, SlotRequirement, SlotTime,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub const EVENT_DATE: &str = "2026-10-19";

pub fn create_test_actor() -> ActorId {
    ActorId::new("owner-1")
}

pub fn create_test_time() -> OffsetDateTime {
    datetime!(2026-10-19 12:00 UTC)
}

pub fn dealer_selection() -> SelectionItem {
    SelectionItem::new("dealer", "18:00", Some(EVENT_DATE))
}

pub fn floor_selection() -> SelectionItem {
    SelectionItem::new("floor", "18:00", Some(EVENT_DATE))
}

/// One date, `18:00`, `dealer` x `dealers` and `floor` x 1.
pub fn create_test_posting(dealers: i64) -> Posting {
    Posting::new(
        PostingId::new("posting-1"),
        create_test_actor(),
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

pub fn create_test_application(applicant: &str, selections: Vec<SelectionItem>) -> Application {
    Application {
        id: ApplicationId::new(&format!("app-{applicant}")),
        posting_id: PostingId::new("posting-1"),
        applicant_id: ActorId::new(applicant),
        status: ApplicationStatus::Applied,
        selections,
        confirmed_selections: Vec::new(),
        history: Vec::new(),
    }
}
