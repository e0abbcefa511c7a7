// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Command, ResourceCommand};
use crate::error::CoreError;
use crate::state::{RegistrationChange, ResourceState, ResourceTransition, TransitionResult};
use clubreg_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use clubreg_domain::{
    Capacity, CapacitySnapshot, DomainError, Registration, RegistrationDetails,
    RegistrationStatus, Resource, ResourceKind, ResourceRef, next_waitlisted, validate_details,
    validate_title,
};
use time::OffsetDateTime;

/// Applies a registration command to a resource's state.
///
/// The function is pure: it decides the outcome from `state` alone and
/// describes the rows to write. Callers are responsible for loading `state`
/// and persisting the result under one exclusive transaction.
///
/// # Arguments
///
/// * `state` - The current resource state (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The time the decision is made
///
/// # Errors
///
/// Returns an error if:
/// - The resource is closed (`ResourceNotFound`)
/// - The registrant already holds a non-cancelled registration
/// - The registration does not exist
/// - The lifecycle forbids the transition
/// - Approval would exceed the capacity
pub fn apply(
    state: &ResourceState,
    command: Command,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let action_name: &'static str = command.action_name();

    let (changes, details): (Vec<RegistrationChange>, String) = match command {
        Command::Submit {
            registrant_id,
            details,
        } => submit(state, registrant_id, details, now)?,
        Command::Approve { registration_id } => approve(state, registration_id, now)?,
        Command::Reject {
            registration_id,
            reason,
        } => reject(state, registration_id, reason, now)?,
        Command::Cancel { registration_id } => cancel(state, registration_id, now)?,
    };

    let mut new_state: ResourceState = state.clone();
    for change in &changes {
        match change {
            RegistrationChange::Inserted(registration) => {
                new_state.registrations.push(registration.clone());
            }
            RegistrationChange::Updated { registration, .. } => new_state.replace(registration),
        }
    }

    let mut audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(String::from(action_name), Some(details)),
        state.to_snapshot(),
        new_state.to_snapshot(),
        state.reference,
        now,
    );
    if let Some(registration_id) = changes
        .first()
        .and_then(|change| change.registration().registration_id())
    {
        audit_event = audit_event.for_registration(registration_id);
    }

    Ok(TransitionResult {
        new_state,
        changes,
        audit_event,
    })
}

fn submit(
    state: &ResourceState,
    registrant_id: i64,
    details: RegistrationDetails,
    now: OffsetDateTime,
) -> Result<(Vec<RegistrationChange>, String), CoreError> {
    if !state.resource.is_open() {
        return Err(DomainError::ResourceNotFound(state.reference).into());
    }

    validate_details(&details)?;

    if state.active_for(registrant_id).is_some() {
        return Err(DomainError::DuplicateRegistration {
            resource: state.reference,
            registrant_id,
        }
        .into());
    }

    let capacity: CapacitySnapshot = state.capacity_snapshot();
    let registration: Registration = Registration::submit(
        state.reference,
        registrant_id,
        capacity.initial_status(),
        now,
        details,
    )?;

    let summary: String = format!(
        "Registrant {registrant_id} submitted for {} as {}",
        state.reference,
        registration.status()
    );
    Ok((vec![RegistrationChange::Inserted(registration)], summary))
}

fn approve(
    state: &ResourceState,
    registration_id: i64,
    now: OffsetDateTime,
) -> Result<(Vec<RegistrationChange>, String), CoreError> {
    let current: &Registration = find(state, registration_id)?;

    // Lifecycle first: approving a terminal registration is never a capacity problem.
    let approved: Registration = current.transition_to(RegistrationStatus::Approved, now)?;
    state.capacity_snapshot().ensure_room()?;

    let summary: String = format!(
        "Approved registration {registration_id} (was {})",
        current.status()
    );
    Ok((
        vec![RegistrationChange::Updated {
            registration: approved,
            previous_status: current.status(),
            notes: None,
        }],
        summary,
    ))
}

fn reject(
    state: &ResourceState,
    registration_id: i64,
    reason: Option<String>,
    now: OffsetDateTime,
) -> Result<(Vec<RegistrationChange>, String), CoreError> {
    let current: &Registration = find(state, registration_id)?;
    let rejected: Registration = current.transition_to(RegistrationStatus::Rejected, now)?;

    let summary: String = reason.as_ref().map_or_else(
        || format!("Rejected registration {registration_id}"),
        |reason| format!("Rejected registration {registration_id}: {reason}"),
    );
    Ok((
        vec![RegistrationChange::Updated {
            registration: rejected,
            previous_status: current.status(),
            notes: reason,
        }],
        summary,
    ))
}

fn cancel(
    state: &ResourceState,
    registration_id: i64,
    now: OffsetDateTime,
) -> Result<(Vec<RegistrationChange>, String), CoreError> {
    let current: &Registration = find(state, registration_id)?;
    let cancelled: Registration = current.transition_to(RegistrationStatus::Cancelled, now)?;

    let mut changes: Vec<RegistrationChange> = vec![RegistrationChange::Updated {
        registration: cancelled,
        previous_status: current.status(),
        notes: None,
    }];
    let mut summary: String = format!(
        "Cancelled registration {registration_id} (was {})",
        current.status()
    );

    // Freeing an approved place moves the head of the waitlist back to review.
    let next: Option<&Registration> = if current.status().counts_toward_capacity() {
        next_waitlisted(&state.registrations)
    } else {
        None
    };
    if let Some(next) = next {
        let promoted: Registration = next.transition_to(RegistrationStatus::Pending, now)?;
        if let Some(promoted_id) = promoted.registration_id() {
            summary.push_str(&format!("; promoted registration {promoted_id} from waitlist"));
        }
        changes.push(RegistrationChange::Updated {
            registration: promoted,
            previous_status: RegistrationStatus::Waitlisted,
            notes: Some(format!(
                "Promoted from waitlist after registration {registration_id} was cancelled"
            )),
        });
    }

    Ok((changes, summary))
}

fn find(state: &ResourceState, registration_id: i64) -> Result<&Registration, CoreError> {
    state
        .find(registration_id)
        .ok_or_else(|| DomainError::RegistrationNotFound(registration_id).into())
}

/// Validates the fields of a new resource.
///
/// # Returns
///
/// An open, unpersisted `Resource` with a normalized title.
///
/// # Errors
///
/// Returns an error if the title is blank or too long, or the capacity is
/// not positive.
pub fn apply_create_resource(
    kind: ResourceKind,
    title: &str,
    max_capacity: Option<i64>,
) -> Result<Resource, CoreError> {
    let title: String = validate_title(title)?;
    let max_capacity: Option<Capacity> = max_capacity.map(Capacity::new).transpose()?;
    Ok(Resource::new(kind, title, max_capacity))
}

/// Builds the audit event for a freshly persisted resource.
///
/// # Errors
///
/// Returns `CoreError::Internal` if the resource has no id yet.
pub fn resource_created_event(
    resource: &Resource,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<AuditEvent, CoreError> {
    let reference: ResourceRef = resource.reference().ok_or_else(|| {
        CoreError::Internal(String::from("resource must be persisted before auditing"))
    })?;

    let after: CapacitySnapshot = CapacitySnapshot::new(reference, 0, resource.max_capacity());
    Ok(AuditEvent::new(
        actor,
        cause,
        Action::new(
            String::from("CreateResource"),
            Some(format!("Created {reference} '{}'", resource.title())),
        ),
        StateSnapshot::new(String::from("none")),
        StateSnapshot::new(after.to_string()),
        reference,
        now,
    ))
}

/// Applies an administrative command to an existing resource.
///
/// # Errors
///
/// Returns an error if:
/// - The new capacity is not positive
/// - The new capacity is below the approved count
pub fn apply_resource(
    state: &ResourceState,
    command: ResourceCommand,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<ResourceTransition, CoreError> {
    let (resource, action): (Resource, Action) = match command {
        ResourceCommand::SetOpen { is_open } => {
            let verb: &str = if is_open { "Opened" } else { "Closed" };
            (
                state.resource.with_open(is_open),
                Action::new(
                    String::from("SetResourceOpen"),
                    Some(format!("{verb} {}", state.reference)),
                ),
            )
        }
        ResourceCommand::SetCapacity { max_capacity } => {
            let max_capacity: Option<Capacity> = max_capacity.map(Capacity::new).transpose()?;
            state
                .capacity_snapshot()
                .validate_capacity_change(max_capacity)?;
            let rendered: String = max_capacity
                .map_or_else(|| String::from("unlimited"), |c| c.value().to_string());
            (
                state.resource.with_capacity(max_capacity),
                Action::new(
                    String::from("SetCapacity"),
                    Some(format!("Set capacity of {} to {rendered}", state.reference)),
                ),
            )
        }
    };

    let new_state: ResourceState = ResourceState {
        resource,
        ..state.clone()
    };

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        state.to_snapshot(),
        new_state.to_snapshot(),
        state.reference,
        now,
    );

    Ok(ResourceTransition {
        new_state,
        audit_event,
    })
}
