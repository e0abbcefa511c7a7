// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::*;
use crate::RegistrationHistoryEntry;
use clubreg_audit::AuditEvent;

#[test]
fn test_resource_creation_is_audited() {
    let mut db: Persistence = new_db();
    let resource: ResourceRef = create_competition(&mut db, Some(4));

    let timeline: Vec<AuditEvent> = db.audit_timeline(resource).unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].action.name, "CreateResource");
    assert_eq!(timeline[0].before.data, "none");
    assert_eq!(timeline[0].resource, resource);
    assert!(timeline[0].registration_id.is_none());
}

#[test]
fn test_each_operation_writes_one_audit_event() {
    let mut db: Persistence = new_db();
    let resource: ResourceRef = create_competition(&mut db, Some(1));
    let a: Registration = submit(&mut db, resource, 1);
    approve(&mut db, id_of(&a)).unwrap();
    submit(&mut db, resource, 2);
    cancel(&mut db, id_of(&a));

    let actions: Vec<String> = db
        .audit_timeline(resource)
        .unwrap()
        .into_iter()
        .map(|e| e.action.name)
        .collect();
    assert_eq!(
        actions,
        vec![
            "CreateResource",
            "SubmitRegistration",
            "ApproveRegistration",
            "SubmitRegistration",
            "CancelRegistration",
        ]
    );
}

#[test]
fn test_audit_event_round_trips() {
    let mut db: Persistence = new_db();
    let resource: ResourceRef = create_competition(&mut db, None);
    let persisted = db
        .submit_registration(
            resource,
            9,
            RegistrationDetails::default(),
            create_test_actor(),
            create_test_cause(),
        )
        .unwrap();

    let event: AuditEvent = db.get_audit_event(persisted.event_id).unwrap();
    assert_eq!(event.event_id, Some(persisted.event_id));
    assert_eq!(event.actor, create_test_actor());
    assert_eq!(event.cause, create_test_cause());
    assert_eq!(event.registration_id, persisted.registrations[0].registration_id());
    assert_eq!(event.action.name, "SubmitRegistration");
}

#[test]
fn test_missing_audit_event() {
    let mut db: Persistence = new_db();
    assert_eq!(
        db.get_audit_event(12345).unwrap_err(),
        PersistenceError::EventNotFound(12345)
    );
}

#[test]
fn test_history_records_every_status_change() {
    let mut db: Persistence = new_db();
    let resource: ResourceRef = create_competition(&mut db, Some(1));
    let a: Registration = submit(&mut db, resource, 1);
    approve(&mut db, id_of(&a)).unwrap();
    let b: Registration = submit(&mut db, resource, 2);
    cancel(&mut db, id_of(&a));

    let history_a: Vec<RegistrationHistoryEntry> = db.registration_history(id_of(&a)).unwrap();
    let transitions: Vec<(Option<RegistrationStatus>, RegistrationStatus)> = history_a
        .iter()
        .map(|h| (h.previous_status, h.new_status))
        .collect();
    assert_eq!(
        transitions,
        vec![
            (None, RegistrationStatus::Pending),
            (Some(RegistrationStatus::Pending), RegistrationStatus::Approved),
            (Some(RegistrationStatus::Approved), RegistrationStatus::Cancelled),
        ]
    );
    assert!(history_a.iter().all(|h| h.actor_id == "test-actor"));

    let history_b: Vec<RegistrationHistoryEntry> = db.registration_history(id_of(&b)).unwrap();
    assert_eq!(history_b.len(), 2);
    let promotion: &RegistrationHistoryEntry = &history_b[1];
    assert_eq!(promotion.previous_status, Some(RegistrationStatus::Waitlisted));
    assert_eq!(promotion.new_status, RegistrationStatus::Pending);
    assert!(promotion.notes.is_some());
    assert_eq!(promotion.audit_event_id, history_a[2].audit_event_id);
}

#[test]
fn test_reject_reason_is_kept_in_history() {
    let mut db: Persistence = new_db();
    let resource: ResourceRef = create_competition(&mut db, None);
    let registration: Registration = submit(&mut db, resource, 1);
    db.reject_registration(
        id_of(&registration),
        Some(String::from("Missing medical certificate")),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    let history: Vec<RegistrationHistoryEntry> =
        db.registration_history(id_of(&registration)).unwrap();
    assert_eq!(
        history[1].notes.as_deref(),
        Some("Missing medical certificate")
    );
}

#[test]
fn test_failed_operation_writes_nothing() {
    let mut db: Persistence = new_db();
    let resource: ResourceRef = create_competition(&mut db, Some(1));
    let a: Registration = submit(&mut db, resource, 1);
    let b: Registration = submit(&mut db, resource, 2);
    approve(&mut db, id_of(&a)).unwrap();

    let events_before: usize = db.audit_timeline(resource).unwrap().len();
    let history_before: usize = db.registration_history(id_of(&b)).unwrap().len();

    assert!(approve(&mut db, id_of(&b)).is_err());
    assert!(db
        .submit_registration(
            resource,
            1,
            RegistrationDetails::default(),
            create_test_actor(),
            create_test_cause(),
        )
        .is_err());
    assert!(db
        .set_capacity(resource, Some(5_000_000_000), create_test_actor(), create_test_cause())
        .is_err());

    assert_eq!(db.audit_timeline(resource).unwrap().len(), events_before);
    assert_eq!(
        db.registration_history(id_of(&b)).unwrap().len(),
        history_before
    );
}

#[test]
fn test_history_of_missing_registration() {
    let mut db: Persistence = new_db();
    assert_eq!(
        db.registration_history(3).unwrap_err(),
        PersistenceError::RegistrationNotFound(3)
    );
}
