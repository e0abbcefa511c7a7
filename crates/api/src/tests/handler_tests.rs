// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Handler behavior against an in-memory database.

use crate::{
    ApiError, CreateResourceRequest, ListRegistrationsRequest, RejectRegistrationRequest,
    SetCapacityRequest, SetResourceOpenRequest, approve_registration, audit_timeline,
    cancel_registration, create_resource, dashboard, get_capacity, get_registration,
    get_resource, list_registrations, list_resources, registration_history, reject_registration,
    set_capacity, set_resource_open, submit_registration,
};
use clubreg_domain::{RegistrationStatus, ResourceKind};

use super::helpers::{
    create_test_admin, create_test_cause, setup_competition, setup_test_persistence,
    submit_as_self, submit_request,
};

#[test]
fn test_create_and_get_resource() {
    let mut persistence = setup_test_persistence();
    let response = create_resource(
        &mut persistence,
        &CreateResourceRequest {
            kind: String::from("Formation"),
            title: String::from("First Aid Course"),
            max_capacity: Some(12),
        },
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(response.resource.kind, "formation");
    assert_eq!(response.resource.max_capacity, Some(12));
    assert!(response.resource.is_open);

    let fetched = get_resource(&mut persistence, "formation", response.resource.resource_id)
        .unwrap();
    assert_eq!(fetched, response.resource);

    let listed = list_resources(&mut persistence, Some("formation")).unwrap();
    assert_eq!(listed.resources.len(), 1);
    assert!(list_resources(&mut persistence, Some("event"))
        .unwrap()
        .resources
        .is_empty());
}

#[test]
fn test_create_resource_validates_input() {
    let mut persistence = setup_test_persistence();
    let bad_kind = create_resource(
        &mut persistence,
        &CreateResourceRequest {
            kind: String::from("party"),
            title: String::from("Party"),
            max_capacity: None,
        },
        &create_test_admin(),
        create_test_cause(),
    );
    assert!(matches!(bad_kind, Err(ApiError::InvalidInput { ref field, .. }) if field == "kind"));

    let bad_capacity = create_resource(
        &mut persistence,
        &CreateResourceRequest {
            kind: String::from("event"),
            title: String::from("Party"),
            max_capacity: Some(-1),
        },
        &create_test_admin(),
        create_test_cause(),
    );
    assert!(
        matches!(bad_capacity, Err(ApiError::InvalidInput { ref field, .. }) if field == "max_capacity")
    );
}

#[test]
fn test_missing_resource_is_not_found() {
    let mut persistence = setup_test_persistence();
    assert!(matches!(
        get_resource(&mut persistence, "event", 99),
        Err(ApiError::ResourceNotFound { .. })
    ));
    assert!(matches!(
        get_capacity(&mut persistence, "event", 99),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_submission_flow_with_waitlist() {
    let mut persistence = setup_test_persistence();
    let resource_id = setup_competition(&mut persistence, Some(1));

    let first = submit_as_self(&mut persistence, resource_id, 1);
    let approved = approve_registration(
        &mut persistence,
        first,
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(approved.registration.status, "approved");
    assert_eq!(approved.registration.status_label, "accepted");
    assert!(approved.registration.decided_at.is_some());
    assert!(approved.promoted.is_none());

    let second = submit_registration(
        &mut persistence,
        submit_request(resource_id, 2),
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(second.registration.status, "waitlisted");

    let capacity = get_capacity(&mut persistence, "competition", resource_id).unwrap();
    assert_eq!(capacity.accepted_count, 1);
    assert_eq!(capacity.remaining, Some(0));
    assert!(!capacity.has_room);

    let cancelled = cancel_registration(
        &mut persistence,
        first,
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(cancelled.registration.status_label, "withdrawn");
    let promoted = cancelled.promoted.unwrap();
    assert_eq!(promoted.registration_id, second.registration.registration_id);
    assert_eq!(promoted.status, "pending");
    assert!(cancelled.message.contains("promoted"));
}

#[test]
fn test_conflicts_are_reported() {
    let mut persistence = setup_test_persistence();
    let resource_id = setup_competition(&mut persistence, Some(1));
    let a = submit_as_self(&mut persistence, resource_id, 1);
    let b = submit_as_self(&mut persistence, resource_id, 2);

    let duplicate = submit_registration(
        &mut persistence,
        submit_request(resource_id, 1),
        &create_test_admin(),
        create_test_cause(),
    );
    assert!(matches!(duplicate, Err(ApiError::DuplicateRegistration { .. })));

    approve_registration(&mut persistence, a, &create_test_admin(), create_test_cause()).unwrap();
    let full = approve_registration(&mut persistence, b, &create_test_admin(), create_test_cause());
    assert!(matches!(full, Err(ApiError::CapacityExceeded { .. })));

    reject_registration(
        &mut persistence,
        b,
        RejectRegistrationRequest {
            reason: Some(String::from("No place left")),
        },
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();
    let again = approve_registration(&mut persistence, b, &create_test_admin(), create_test_cause());
    assert!(matches!(again, Err(ApiError::InvalidTransition { .. })));

    let missing = approve_registration(&mut persistence, 999, &create_test_admin(), create_test_cause());
    assert_eq!(
        missing.unwrap_err(),
        ApiError::RegistrationNotFound {
            registration_id: 999
        }
    );
}

#[test]
fn test_closed_resource_rejects_submissions() {
    let mut persistence = setup_test_persistence();
    let resource_id = setup_competition(&mut persistence, None);
    set_resource_open(
        &mut persistence,
        "competition",
        resource_id,
        SetResourceOpenRequest { is_open: false },
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();

    let result = submit_registration(
        &mut persistence,
        submit_request(resource_id, 1),
        &create_test_admin(),
        create_test_cause(),
    );
    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_set_capacity_below_approved() {
    let mut persistence = setup_test_persistence();
    let resource_id = setup_competition(&mut persistence, Some(3));
    for registrant in 1..=2 {
        let id = submit_as_self(&mut persistence, resource_id, registrant);
        approve_registration(&mut persistence, id, &create_test_admin(), create_test_cause())
            .unwrap();
    }

    let too_low = set_capacity(
        &mut persistence,
        "competition",
        resource_id,
        SetCapacityRequest {
            max_capacity: Some(1),
        },
        &create_test_admin(),
        create_test_cause(),
    );
    assert!(matches!(too_low, Err(ApiError::InvalidInput { .. })));

    let unlimited = set_capacity(
        &mut persistence,
        "competition",
        resource_id,
        SetCapacityRequest { max_capacity: None },
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(unlimited.resource.max_capacity, None);
    assert!(unlimited.message.ends_with("unlimited"));
}

#[test]
fn test_list_registrations_with_filter_and_paging() {
    let mut persistence = setup_test_persistence();
    let resource_id = setup_competition(&mut persistence, None);
    let ids: Vec<i64> = (1..=5)
        .map(|registrant| submit_as_self(&mut persistence, resource_id, registrant))
        .collect();
    approve_registration(&mut persistence, ids[3], &create_test_admin(), create_test_cause())
        .unwrap();

    let all = list_registrations(
        &mut persistence,
        "competition",
        resource_id,
        &ListRegistrationsRequest {
            status: None,
            page_size: Some(2),
        },
    )
    .unwrap();
    assert_eq!(
        all.registrations
            .iter()
            .map(|r| r.registration_id)
            .collect::<Vec<i64>>(),
        ids
    );

    let approved = list_registrations(
        &mut persistence,
        "competition",
        resource_id,
        &ListRegistrationsRequest {
            status: Some(String::from("approved")),
            page_size: None,
        },
    )
    .unwrap();
    assert_eq!(approved.registrations.len(), 1);
    assert_eq!(approved.registrations[0].registration_id, ids[3]);

    let bad = list_registrations(
        &mut persistence,
        "competition",
        resource_id,
        &ListRegistrationsRequest {
            status: Some(String::from("maybe")),
            page_size: None,
        },
    );
    assert!(matches!(bad, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_history_and_audit_timeline() {
    let mut persistence = setup_test_persistence();
    let resource_id = setup_competition(&mut persistence, None);
    let id = submit_as_self(&mut persistence, resource_id, 4);
    reject_registration(
        &mut persistence,
        id,
        RejectRegistrationRequest {
            reason: Some(String::from("Late entry")),
        },
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();

    let history = registration_history(&mut persistence, id).unwrap();
    assert_eq!(history.entries.len(), 2);
    assert_eq!(history.entries[0].previous_status, None);
    assert_eq!(history.entries[0].actor_id, "4");
    assert_eq!(history.entries[1].new_status, "rejected");
    assert_eq!(history.entries[1].notes.as_deref(), Some("Late entry"));

    let timeline = audit_timeline(&mut persistence, "competition", resource_id).unwrap();
    let names: Vec<&str> = timeline
        .events
        .iter()
        .map(|e| e.action_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["CreateResource", "SubmitRegistration", "RejectRegistration"]
    );
    assert_eq!(timeline.events[2].registration_id, Some(id));

    let info = get_registration(&mut persistence, id).unwrap();
    assert_eq!(info.status_label, "rejected");
    assert_eq!(info.details.participant_name.as_deref(), Some("Member 4"));
}

#[test]
fn test_dashboard_counts() {
    let mut persistence = setup_test_persistence();
    let resource_id = setup_competition(&mut persistence, None);
    submit_as_self(&mut persistence, resource_id, 1);
    submit_as_self(&mut persistence, resource_id, 2);

    let summary = dashboard(&mut persistence).unwrap();
    let competitions = summary.for_kind(ResourceKind::Competition).unwrap();
    assert_eq!(competitions.total_resources, 1);
    assert_eq!(competitions.open_resources, 1);
    assert_eq!(competitions.registrations.get(RegistrationStatus::Pending), 2);
}
