// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use clubreg_audit::Cause;
use clubreg_domain::RegistrationDetails;
use clubreg_persistence::Persistence;

use crate::{
    AuthenticatedActor, CreateResourceRequest, ResourceResponse, Role, SubmitRegistrationRequest,
    TransitionResponse, create_resource, submit_registration,
};

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-123"), Role::Admin)
}

pub fn create_test_registrant(registrant_id: i64) -> AuthenticatedActor {
    AuthenticatedActor::new(registrant_id.to_string(), Role::Registrant)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn setup_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

/// Creates a competition and returns its id.
pub fn setup_competition(persistence: &mut Persistence, max_capacity: Option<i64>) -> i64 {
    let response: ResourceResponse = create_resource(
        persistence,
        &CreateResourceRequest {
            kind: String::from("competition"),
            title: String::from("Club Championship"),
            max_capacity,
        },
        &create_test_admin(),
        create_test_cause(),
    )
    .expect("Failed to create competition");
    response.resource.resource_id
}

pub fn submit_request(resource_id: i64, registrant_id: i64) -> SubmitRegistrationRequest {
    SubmitRegistrationRequest {
        kind: String::from("competition"),
        resource_id,
        registrant_id,
        details: RegistrationDetails {
            participant_name: Some(format!("Member {registrant_id}")),
            ..RegistrationDetails::default()
        },
    }
}

/// Submits as the registrant themself and returns the registration id.
pub fn submit_as_self(persistence: &mut Persistence, resource_id: i64, registrant_id: i64) -> i64 {
    let response: TransitionResponse = submit_registration(
        persistence,
        submit_request(resource_id, registrant_id),
        &create_test_registrant(registrant_id),
        create_test_cause(),
    )
    .expect("Failed to submit registration");
    response.registration.registration_id
}
