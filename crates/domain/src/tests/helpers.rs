// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    ActorId, DateRequirement, OccupantEntry, Posting, PostingId, PostingType, RoleRequirement,
    SlotRequirement, SlotTime,
};

pub const EVENT_DATE: &str = "2026-10-19";
pub const NEXT_DATE: &str = "2026-10-20";

pub fn create_test_owner() -> ActorId {
    ActorId::new("owner-1")
}

pub fn slot(time: &str, roles: &[(&str, i64)]) -> SlotRequirement {
    SlotRequirement::new(
        SlotTime::at(time),
        roles
            .iter()
            .map(|(name, count)| RoleRequirement::new(name, *count))
            .collect(),
    )
}

pub fn create_posting(requirements: Vec<DateRequirement>) -> Posting {
    Posting::new(
        PostingId::new("posting-1"),
        create_test_owner(),
        PostingType::Regular,
        requirements,
    )
}

/// One date, one `18:00` slot, two dealers.
pub fn create_single_cell_posting() -> Posting {
    create_posting(vec![DateRequirement::dated(
        EVENT_DATE,
        vec![slot("18:00", &[("dealer", 2)])],
    )])
}

pub fn occupant(user: &str, role: &str, time: &str, date: Option<&str>) -> OccupantEntry {
    OccupantEntry {
        user_id: ActorId::new(user),
        role: role.to_string(),
        time: time.to_string(),
        date: date.map(str::to_string),
    }
}
