// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writes complete transition results.

use clubreg::{CoreError, RegistrationChange, ResourceTransition, TransitionResult};
use clubreg_audit::AuditEvent;
use clubreg_domain::{Capacity, DomainError, Registration, Resource, ResourceRef};
use diesel::SqliteConnection;
use tracing::{debug, warn};

use crate::error::PersistenceError;
use crate::mutations::audit::persist_audit_event;
use crate::mutations::registrations::{
    insert_history, insert_registration, update_registration_status,
};
use crate::mutations::resources::update_resource;
use crate::queries::registrations::count_approved;
use crate::queries::resources::find_resource;

/// The stored outcome of a registration transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTransition {
    /// The audit event id.
    pub event_id: i64,
    /// Every registration written, with ids, in change order.
    pub registrations: Vec<Registration>,
}

impl PersistedTransition {
    /// Returns the registration the command targeted.
    #[must_use]
    pub fn primary(&self) -> Option<&Registration> {
        self.registrations.first()
    }
}

/// Maps a schema backstop violation to the domain error it stands for.
///
/// A capacity rejection is reported with the approved count and limit
/// read back from storage, since the trigger saw rows the loaded state
/// did not.
fn translate_backstop(
    conn: &mut SqliteConnection,
    err: PersistenceError,
    registration: &Registration,
) -> PersistenceError {
    match err {
        PersistenceError::UniqueViolation(msg) => {
            warn!(%msg, "Unique index rejected registration write");
            PersistenceError::Rejected(CoreError::DomainViolation(
                DomainError::DuplicateRegistration {
                    resource: registration.resource(),
                    registrant_id: registration.registrant_id(),
                },
            ))
        }
        PersistenceError::CapacityViolation(msg) => {
            warn!(%msg, "Capacity trigger rejected registration write");
            let resource: ResourceRef = registration.resource();
            let accepted: u32 = match count_approved(conn, resource) {
                Ok(accepted) => accepted,
                Err(e) => return e,
            };
            let max: Option<Capacity> = match find_resource(conn, resource) {
                Ok(stored) => stored.as_ref().and_then(Resource::max_capacity),
                Err(e) => return e,
            };
            match max {
                Some(max) => PersistenceError::Rejected(CoreError::DomainViolation(
                    DomainError::CapacityExceeded {
                        resource,
                        accepted,
                        max: max.value(),
                    },
                )),
                None => PersistenceError::CapacityViolation(msg),
            }
        }
        other => other,
    }
}

/// Persists a registration transition: rows, audit event and history.
///
/// Must run inside the transaction that loaded the state the transition
/// was computed from.
///
/// # Errors
///
/// Returns an error if any write fails. Unique index and capacity trigger
/// violations are reported as the matching domain rejection.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistedTransition, PersistenceError> {
    let mut written: Vec<Registration> = Vec::with_capacity(result.changes.len());

    for change in &result.changes {
        let registration: &Registration = change.registration();
        let stored: Registration = match change {
            RegistrationChange::Inserted(_) => {
                let id: i64 = match insert_registration(conn, registration) {
                    Ok(id) => id,
                    Err(e) => return Err(translate_backstop(conn, e, registration)),
                };
                registration.clone().with_registration_id(id)
            }
            RegistrationChange::Updated {
                previous_status, ..
            } => {
                if let Err(e) = update_registration_status(conn, registration, *previous_status) {
                    return Err(translate_backstop(conn, e, registration));
                }
                registration.clone()
            }
        };
        written.push(stored);
    }

    let mut audit_event: AuditEvent = result.audit_event.clone();
    if let (None, Some(id)) = (
        audit_event.registration_id,
        written.first().and_then(Registration::registration_id),
    ) {
        audit_event = audit_event.for_registration(id);
    }
    let event_id: i64 = persist_audit_event(conn, &audit_event)?;

    for (change, stored) in result.changes.iter().zip(&written) {
        let registration_id: i64 = stored.registration_id().ok_or_else(|| {
            PersistenceError::DatabaseError(String::from("Registration id missing after write"))
        })?;
        insert_history(
            conn,
            registration_id,
            event_id,
            change.previous_status(),
            stored.status(),
            audit_event.occurred_at,
            &audit_event.actor.id,
            change.notes(),
        )?;
    }

    debug!(
        event_id,
        changes = written.len(),
        resource = %result.new_state.reference,
        "Persisted registration transition"
    );

    Ok(PersistedTransition {
        event_id,
        registrations: written,
    })
}

/// Persists an administrative resource change and its audit event.
///
/// # Errors
///
/// Returns an error if any write fails.
pub fn persist_resource_transition(
    conn: &mut SqliteConnection,
    transition: &ResourceTransition,
) -> Result<i64, PersistenceError> {
    update_resource(conn, &transition.new_state.resource)?;
    persist_audit_event(conn, &transition.audit_event)
}
