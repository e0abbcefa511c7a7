// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, CoreError, RegistrationChange, ResourceState, TransitionResult, apply};
use clubreg_audit::{Actor, Cause};
use clubreg_domain::{
    Capacity, Registration, RegistrationDetails, RegistrationStatus, Resource, ResourceKind,
    ResourceRef,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("admin-123"), String::from("admin"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Admin request"))
}

pub fn test_time(minutes: i64) -> OffsetDateTime {
    datetime!(2026-04-01 08:00:00 UTC) + Duration::minutes(minutes)
}

pub fn test_resource_ref() -> ResourceRef {
    ResourceRef::new(ResourceKind::Competition, 1)
}

pub fn create_resource_state(max_capacity: Option<i64>) -> ResourceState {
    let capacity: Option<Capacity> = max_capacity.map(|c| Capacity::new(c).unwrap());
    ResourceState::new(
        test_resource_ref(),
        Resource::with_id(
            1,
            ResourceKind::Competition,
            String::from("Spring Cup"),
            capacity,
            true,
        ),
        Vec::new(),
    )
}

/// Mimics the storage layer: assigns ids to inserted registrations and
/// returns the committed state.
pub fn commit(result: TransitionResult) -> ResourceState {
    let mut state: ResourceState = result.new_state;
    let mut next_id: i64 = state
        .registrations
        .iter()
        .filter_map(Registration::registration_id)
        .max()
        .unwrap_or(0);

    for slot in &mut state.registrations {
        if slot.registration_id().is_none() {
            next_id += 1;
            *slot = slot.clone().with_registration_id(next_id);
        }
    }
    state
}

/// Applies a command at the given minute offset and commits it.
pub fn run(
    state: &ResourceState,
    command: Command,
    minutes: i64,
) -> Result<ResourceState, CoreError> {
    apply(
        state,
        command,
        create_test_actor(),
        create_test_cause(),
        test_time(minutes),
    )
    .map(commit)
}

pub fn submit(registrant_id: i64) -> Command {
    Command::Submit {
        registrant_id,
        details: RegistrationDetails::default(),
    }
}

pub fn status_of(state: &ResourceState, registration_id: i64) -> RegistrationStatus {
    state.find(registration_id).unwrap().status()
}

pub fn updated_ids(result: &TransitionResult) -> Vec<i64> {
    result
        .changes
        .iter()
        .filter(|c| matches!(c, RegistrationChange::Updated { .. }))
        .filter_map(|c| c.registration().registration_id())
        .collect()
}
