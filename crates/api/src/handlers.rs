// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every handler follows the same order: authorize, validate the request,
//! call persistence, translate the outcome into a response DTO.

use clubreg_audit::{AuditEvent, Cause};
use clubreg_domain::{
    CapacitySnapshot, Registration, RegistrationStatus, Resource, ResourceKind, ResourceRef,
    format_timestamp,
};
use clubreg_persistence::{
    DashboardSummary, PersistedTransition, Persistence, RegistrationHistoryEntry,
    RegistrationQuery,
};
use time::OffsetDateTime;
use tracing::debug;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::request_response::{
    AuditEventInfo, AuditTimelineResponse, CapacityInfo, CreateResourceRequest,
    HistoryEntryInfo, ListRegistrationsRequest, ListRegistrationsResponse, ListResourcesResponse,
    RegistrationHistoryResponse, RegistrationInfo, RejectRegistrationRequest, ResourceInfo,
    ResourceResponse, SetCapacityRequest, SetResourceOpenRequest, SubmitRegistrationRequest,
    TransitionResponse,
};
use crate::validation::{parse_kind, parse_status, require_non_blank, require_positive};

fn resource_ref(kind: &str, resource_id: i64) -> Result<ResourceRef, ApiError> {
    let kind: ResourceKind = parse_kind(kind)?;
    require_positive("resource_id", resource_id)?;
    Ok(ResourceRef::new(kind, resource_id))
}

fn timestamp(at: OffsetDateTime) -> Result<String, ApiError> {
    format_timestamp(at).map_err(translate_domain_error)
}

fn resource_info(resource: &Resource) -> Result<ResourceInfo, ApiError> {
    let resource_id: i64 = resource.resource_id().ok_or_else(|| ApiError::Internal {
        message: String::from("Resource has no canonical id"),
    })?;
    Ok(ResourceInfo {
        resource_id,
        kind: resource.kind().as_str().to_string(),
        title: resource.title().to_string(),
        max_capacity: resource.max_capacity().map(|c| c.value()),
        is_open: resource.is_open(),
    })
}

fn registration_info(registration: &Registration) -> Result<RegistrationInfo, ApiError> {
    let registration_id: i64 = registration
        .registration_id()
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Registration has no canonical id"),
        })?;
    let resource: ResourceRef = registration.resource();
    Ok(RegistrationInfo {
        registration_id,
        kind: resource.kind().as_str().to_string(),
        resource_id: resource.id(),
        registrant_id: registration.registrant_id(),
        status: registration.status().as_str().to_string(),
        status_label: resource
            .kind()
            .status_label(registration.status())
            .to_string(),
        submitted_at: timestamp(registration.submitted_at())?,
        decided_at: registration.decided_at().map(timestamp).transpose()?,
        details: registration.details().clone(),
    })
}

fn audit_event_info(event: &AuditEvent) -> Result<AuditEventInfo, ApiError> {
    Ok(AuditEventInfo {
        event_id: event.event_id,
        actor_id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
        cause_id: event.cause.id.clone(),
        cause_description: event.cause.description.clone(),
        action_name: event.action.name.clone(),
        action_details: event.action.details.clone(),
        before_snapshot: event.before.data.clone(),
        after_snapshot: event.after.data.clone(),
        registration_id: event.registration_id,
        occurred_at: timestamp(event.occurred_at)?,
    })
}

fn transition_response(
    persisted: &PersistedTransition,
    outcome: &str,
) -> Result<TransitionResponse, ApiError> {
    let mut infos = persisted.registrations.iter().map(registration_info);
    let registration: RegistrationInfo = infos.next().transpose()?.ok_or_else(|| {
        ApiError::Internal {
            message: String::from("Transition wrote no registration"),
        }
    })?;
    let promoted: Option<RegistrationInfo> = infos.next().transpose()?;
    debug!(
        event_id = persisted.event_id,
        registration_id = registration.registration_id,
        outcome,
        promoted = ?promoted.as_ref().map(|p| p.registration_id),
        "Registration transition committed"
    );

    let message: String = promoted.as_ref().map_or_else(
        || format!("Registration {} {outcome}", registration.registration_id),
        |p| {
            format!(
                "Registration {} {outcome}; registration {} promoted from the waitlist",
                registration.registration_id, p.registration_id
            )
        },
    );

    Ok(TransitionResponse {
        event_id: persisted.event_id,
        registration,
        promoted,
        message,
    })
}

// ============================================================================
// Resources
// ============================================================================

/// Creates a new resource.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The kind is unknown or the title is blank
/// - The capacity is not positive
pub fn create_resource(
    persistence: &mut Persistence,
    request: &CreateResourceRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ResourceResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "create_resource")?;

    let kind: ResourceKind = parse_kind(&request.kind)?;
    require_non_blank("title", &request.title)?;

    let resource: Resource = persistence
        .create_resource(
            kind,
            &request.title,
            request.max_capacity,
            authenticated_actor.to_audit_actor(),
            cause,
        )
        .map_err(translate_persistence_error)?;

    let info: ResourceInfo = resource_info(&resource)?;
    Ok(ResourceResponse {
        message: format!("Created {} {} '{}'", info.kind, info.resource_id, info.title),
        resource: info,
    })
}

/// Lists resources, optionally of one kind.
///
/// # Errors
///
/// Returns an error if the kind is unknown or the query fails.
pub fn list_resources(
    persistence: &mut Persistence,
    kind: Option<&str>,
) -> Result<ListResourcesResponse, ApiError> {
    let kind: Option<ResourceKind> = kind.map(parse_kind).transpose()?;
    let resources: Vec<ResourceInfo> = persistence
        .list_resources(kind)
        .map_err(translate_persistence_error)?
        .iter()
        .map(resource_info)
        .collect::<Result<_, _>>()?;
    Ok(ListResourcesResponse { resources })
}

/// Retrieves one resource.
///
/// # Errors
///
/// Returns an error if the reference is invalid or the resource is missing.
pub fn get_resource(
    persistence: &mut Persistence,
    kind: &str,
    resource_id: i64,
) -> Result<ResourceInfo, ApiError> {
    let resource: ResourceRef = resource_ref(kind, resource_id)?;
    let record: Resource = persistence
        .get_resource(resource)
        .map_err(translate_persistence_error)?;
    resource_info(&record)
}

/// Opens or closes a resource.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the resource is missing.
pub fn set_resource_open(
    persistence: &mut Persistence,
    kind: &str,
    resource_id: i64,
    request: SetResourceOpenRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ResourceResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "set_resource_open")?;
    let resource: ResourceRef = resource_ref(kind, resource_id)?;

    let updated: Resource = persistence
        .set_resource_open(
            resource,
            request.is_open,
            authenticated_actor.to_audit_actor(),
            cause,
        )
        .map_err(translate_persistence_error)?;

    let verb: &str = if request.is_open { "Opened" } else { "Closed" };
    Ok(ResourceResponse {
        resource: resource_info(&updated)?,
        message: format!("{verb} {resource}"),
    })
}

/// Changes or removes a resource's capacity.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The resource is missing
/// - The new capacity is not positive or below the approved count
pub fn set_capacity(
    persistence: &mut Persistence,
    kind: &str,
    resource_id: i64,
    request: SetCapacityRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<ResourceResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "set_capacity")?;
    let resource: ResourceRef = resource_ref(kind, resource_id)?;

    let updated: Resource = persistence
        .set_capacity(
            resource,
            request.max_capacity,
            authenticated_actor.to_audit_actor(),
            cause,
        )
        .map_err(translate_persistence_error)?;

    let rendered: String = updated
        .max_capacity()
        .map_or_else(|| String::from("unlimited"), |c| c.value().to_string());
    Ok(ResourceResponse {
        resource: resource_info(&updated)?,
        message: format!("Set capacity of {resource} to {rendered}"),
    })
}

/// Returns a resource's capacity snapshot.
///
/// # Errors
///
/// Returns an error if the reference is invalid or the resource is missing.
pub fn get_capacity(
    persistence: &mut Persistence,
    kind: &str,
    resource_id: i64,
) -> Result<CapacityInfo, ApiError> {
    let resource: ResourceRef = resource_ref(kind, resource_id)?;
    let snapshot: CapacitySnapshot = persistence
        .capacity_snapshot(resource)
        .map_err(translate_persistence_error)?;

    Ok(CapacityInfo {
        kind: resource.kind().as_str().to_string(),
        resource_id: resource.id(),
        accepted_count: snapshot.accepted_count(),
        max_capacity: snapshot.max_capacity(),
        remaining: snapshot.remaining(),
        has_room: snapshot.has_room(),
    })
}

// ============================================================================
// Registrations
// ============================================================================

/// Submits a registration.
///
/// Starts `pending` while a place is free and `waitlisted` otherwise.
///
/// # Errors
///
/// Returns an error if:
/// - A registrant submits for someone else
/// - The resource is missing or closed
/// - The registrant already holds a non-cancelled registration
pub fn submit_registration(
    persistence: &mut Persistence,
    request: SubmitRegistrationRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<TransitionResponse, ApiError> {
    require_positive("registrant_id", request.registrant_id)?;
    AuthorizationService::authorize_submit(authenticated_actor, request.registrant_id)?;
    let resource: ResourceRef = resource_ref(&request.kind, request.resource_id)?;

    let persisted: PersistedTransition = persistence
        .submit_registration(
            resource,
            request.registrant_id,
            request.details,
            authenticated_actor.to_audit_actor(),
            cause,
        )
        .map_err(translate_persistence_error)?;

    transition_response(&persisted, "submitted")
}

/// Retrieves one registration.
///
/// # Errors
///
/// Returns an error if the registration does not exist.
pub fn get_registration(
    persistence: &mut Persistence,
    registration_id: i64,
) -> Result<RegistrationInfo, ApiError> {
    let registration: Registration = persistence
        .get_registration(registration_id)
        .map_err(translate_persistence_error)?;
    registration_info(&registration)
}

/// Approves a pending or waitlisted registration.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The registration does not exist or is already decided
/// - The resource is at capacity
pub fn approve_registration(
    persistence: &mut Persistence,
    registration_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<TransitionResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "approve_registration")?;

    let persisted: PersistedTransition = persistence
        .approve_registration(
            registration_id,
            authenticated_actor.to_audit_actor(),
            cause,
        )
        .map_err(translate_persistence_error)?;

    transition_response(&persisted, "approved")
}

/// Rejects a pending or waitlisted registration.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, or the registration does
/// not exist or is already decided.
pub fn reject_registration(
    persistence: &mut Persistence,
    registration_id: i64,
    request: RejectRegistrationRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<TransitionResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "reject_registration")?;

    let reason: Option<String> = request.reason.filter(|r| !r.trim().is_empty());
    let persisted: PersistedTransition = persistence
        .reject_registration(
            registration_id,
            reason,
            authenticated_actor.to_audit_actor(),
            cause,
        )
        .map_err(translate_persistence_error)?;

    transition_response(&persisted, "rejected")
}

/// Cancels a registration.
///
/// Cancelling an approved registration promotes the longest-waiting
/// waitlisted registration to `pending`.
///
/// # Errors
///
/// Returns an error if:
/// - A registrant cancels someone else's registration
/// - The registration does not exist or is already closed
pub fn cancel_registration(
    persistence: &mut Persistence,
    registration_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<TransitionResponse, ApiError> {
    let registration: Registration = persistence
        .get_registration(registration_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_cancel(authenticated_actor, &registration)?;

    let persisted: PersistedTransition = persistence
        .cancel_registration(
            registration_id,
            authenticated_actor.to_audit_actor(),
            cause,
        )
        .map_err(translate_persistence_error)?;

    transition_response(&persisted, "cancelled")
}

/// Lists a resource's registrations in submission order.
///
/// # Errors
///
/// Returns an error if the reference or status filter is invalid, or the
/// resource is missing.
pub fn list_registrations(
    persistence: &mut Persistence,
    kind: &str,
    resource_id: i64,
    request: &ListRegistrationsRequest,
) -> Result<ListRegistrationsResponse, ApiError> {
    let resource: ResourceRef = resource_ref(kind, resource_id)?;
    let status: Option<RegistrationStatus> =
        request.status.as_deref().map(parse_status).transpose()?;
    if let Some(page_size) = request.page_size {
        require_positive("page_size", page_size)?;
    }

    let mut query: RegistrationQuery<'_> = persistence
        .query_registrations(resource)
        .map_err(translate_persistence_error)?;
    if let Some(page_size) = request.page_size {
        query = query.with_page_size(page_size);
    }

    let mut registrations: Vec<RegistrationInfo> = Vec::new();
    for row in query.iter() {
        let registration: Registration = row.map_err(translate_persistence_error)?;
        if status.is_none_or(|s| registration.status() == s) {
            registrations.push(registration_info(&registration)?);
        }
    }

    Ok(ListRegistrationsResponse {
        kind: resource.kind().as_str().to_string(),
        resource_id: resource.id(),
        registrations,
    })
}

/// Returns a registration's status history.
///
/// # Errors
///
/// Returns an error if the registration does not exist.
pub fn registration_history(
    persistence: &mut Persistence,
    registration_id: i64,
) -> Result<RegistrationHistoryResponse, ApiError> {
    let entries: Vec<HistoryEntryInfo> = persistence
        .registration_history(registration_id)
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|entry: RegistrationHistoryEntry| -> Result<HistoryEntryInfo, ApiError> {
            Ok(HistoryEntryInfo {
                event_id: entry.audit_event_id,
                previous_status: entry.previous_status.map(|s| s.as_str().to_string()),
                new_status: entry.new_status.as_str().to_string(),
                transitioned_at: timestamp(entry.transitioned_at)?,
                actor_id: entry.actor_id,
                notes: entry.notes,
            })
        })
        .collect::<Result<_, _>>()?;

    Ok(RegistrationHistoryResponse {
        registration_id,
        entries,
    })
}

// ============================================================================
// Audit & Dashboard
// ============================================================================

/// Returns the audit timeline of a resource.
///
/// # Errors
///
/// Returns an error if the reference is invalid or the resource is missing.
pub fn audit_timeline(
    persistence: &mut Persistence,
    kind: &str,
    resource_id: i64,
) -> Result<AuditTimelineResponse, ApiError> {
    let resource: ResourceRef = resource_ref(kind, resource_id)?;
    let events: Vec<AuditEventInfo> = persistence
        .audit_timeline(resource)
        .map_err(translate_persistence_error)?
        .iter()
        .map(audit_event_info)
        .collect::<Result<_, _>>()?;

    Ok(AuditTimelineResponse {
        kind: resource.kind().as_str().to_string(),
        resource_id: resource.id(),
        events,
    })
}

/// Returns the dashboard aggregates.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn dashboard(persistence: &mut Persistence) -> Result<DashboardSummary, ApiError> {
    persistence
        .dashboard_summary()
        .map_err(translate_persistence_error)
}
