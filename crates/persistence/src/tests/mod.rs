// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod audit_tests;
mod cursor_tests;

use crate::{Persistence, PersistenceError};
use clubreg::CoreError;
use clubreg_audit::{Actor, Cause};
use clubreg_domain::{
    DomainError, Registration, RegistrationDetails, RegistrationStatus, ResourceKind, ResourceRef,
};

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("test-actor"), String::from("admin"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn new_db() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

pub fn create_competition(db: &mut Persistence, max_capacity: Option<i64>) -> ResourceRef {
    db.create_resource(
        ResourceKind::Competition,
        "Spring Cup",
        max_capacity,
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap()
    .reference()
    .unwrap()
}

pub fn submit(db: &mut Persistence, resource: ResourceRef, registrant_id: i64) -> Registration {
    db.submit_registration(
        resource,
        registrant_id,
        RegistrationDetails::default(),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap()
    .registrations
    .remove(0)
}

pub fn id_of(registration: &Registration) -> i64 {
    registration.registration_id().unwrap()
}

pub fn approve(db: &mut Persistence, registration_id: i64) -> Result<Registration, PersistenceError> {
    db.approve_registration(registration_id, create_test_actor(), create_test_cause())
        .map(|p| p.registrations[0].clone())
}

pub fn cancel(db: &mut Persistence, registration_id: i64) -> Vec<Registration> {
    db.cancel_registration(registration_id, create_test_actor(), create_test_cause())
        .unwrap()
        .registrations
}

pub fn status_of(db: &mut Persistence, registration_id: i64) -> RegistrationStatus {
    db.get_registration(registration_id).unwrap().status()
}

/// Unwraps the domain rule behind a rejected operation.
pub fn domain_rejection(err: PersistenceError) -> DomainError {
    match err {
        PersistenceError::Rejected(CoreError::DomainViolation(e)) => e,
        other => panic!("expected a domain rejection, got {other:?}"),
    }
}
