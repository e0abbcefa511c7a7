// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use clubreg_domain::RegistrationDetails;

/// API request to create a new resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateResourceRequest {
    /// The resource kind (`competition`, `event` or `formation`).
    pub kind: String,
    /// The display title.
    pub title: String,
    /// The maximum number of approved registrations, or `None` for unlimited.
    pub max_capacity: Option<i64>,
}

/// API request to open or close a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetResourceOpenRequest {
    /// Whether new submissions are accepted.
    pub is_open: bool,
}

/// API request to change a resource's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCapacityRequest {
    /// The new maximum, or `None` for unlimited.
    pub max_capacity: Option<i64>,
}

/// Resource information.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceInfo {
    /// The canonical resource identifier.
    pub resource_id: i64,
    /// The resource kind.
    pub kind: String,
    /// The display title.
    pub title: String,
    /// The configured maximum, if any.
    pub max_capacity: Option<u32>,
    /// Whether new submissions are accepted.
    pub is_open: bool,
}

/// API response for a resource write.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceResponse {
    /// The resource after the write.
    pub resource: ResourceInfo,
    /// A success message.
    pub message: String,
}

/// API response for listing resources.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListResourcesResponse {
    /// The resources, in id order.
    pub resources: Vec<ResourceInfo>,
}

/// A capacity snapshot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CapacityInfo {
    /// The resource kind.
    pub kind: String,
    /// The canonical resource identifier.
    pub resource_id: i64,
    /// Number of approved registrations.
    pub accepted_count: u32,
    /// The configured maximum, if any.
    pub max_capacity: Option<u32>,
    /// Free places, if a maximum is set.
    pub remaining: Option<u32>,
    /// Whether another registration could be approved.
    pub has_room: bool,
}

/// API request to submit a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRegistrationRequest {
    /// The resource kind.
    pub kind: String,
    /// The canonical resource identifier.
    pub resource_id: i64,
    /// The registrant being registered.
    pub registrant_id: i64,
    /// Display data copied onto the registration.
    pub details: RegistrationDetails,
}

/// API request to reject a registration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RejectRegistrationRequest {
    /// Optional reason, kept in the status history.
    pub reason: Option<String>,
}

/// API request to list a resource's registrations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListRegistrationsRequest {
    /// Only return registrations in this status.
    pub status: Option<String>,
    /// Rows fetched per database round trip.
    pub page_size: Option<i64>,
}

/// Registration information.
///
/// `status` is the canonical status; `status_label` is the word used for
/// this resource kind.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegistrationInfo {
    /// The canonical registration identifier.
    pub registration_id: i64,
    /// The resource kind.
    pub kind: String,
    /// The canonical resource identifier.
    pub resource_id: i64,
    /// The registrant.
    pub registrant_id: i64,
    /// The canonical status.
    pub status: String,
    /// The display label for the status.
    pub status_label: String,
    /// Submission time (RFC 3339).
    pub submitted_at: String,
    /// Decision time (RFC 3339), once decided.
    pub decided_at: Option<String>,
    /// Display data.
    pub details: RegistrationDetails,
}

/// API response for a registration transition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransitionResponse {
    /// The event ID of the persisted audit event.
    pub event_id: i64,
    /// The registration the command targeted.
    pub registration: RegistrationInfo,
    /// A waitlisted registration promoted by the same transition.
    pub promoted: Option<RegistrationInfo>,
    /// A success message.
    pub message: String,
}

/// API response for listing registrations.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListRegistrationsResponse {
    /// The resource kind.
    pub kind: String,
    /// The canonical resource identifier.
    pub resource_id: i64,
    /// Registrations in submission order.
    pub registrations: Vec<RegistrationInfo>,
}

/// One status change of a registration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntryInfo {
    /// The audit event that recorded the change.
    pub event_id: i64,
    /// Previous status, absent for the submission itself.
    pub previous_status: Option<String>,
    /// New status.
    pub new_status: String,
    /// When the change happened (RFC 3339).
    pub transitioned_at: String,
    /// Who made the change.
    pub actor_id: String,
    /// Reject reason or promotion note.
    pub notes: Option<String>,
}

/// API response for a registration's history.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegistrationHistoryResponse {
    /// The registration.
    pub registration_id: i64,
    /// Status changes, oldest first.
    pub entries: Vec<HistoryEntryInfo>,
}

/// An audit event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditEventInfo {
    /// The event ID.
    pub event_id: Option<i64>,
    /// The actor ID.
    pub actor_id: String,
    /// The actor type.
    pub actor_type: String,
    /// The cause ID.
    pub cause_id: String,
    /// The cause description.
    pub cause_description: String,
    /// The action name.
    pub action_name: String,
    /// Optional action details.
    pub action_details: Option<String>,
    /// The state before the action.
    pub before_snapshot: String,
    /// The state after the action.
    pub after_snapshot: String,
    /// The registration the event concerns, if any.
    pub registration_id: Option<i64>,
    /// When the event happened (RFC 3339).
    pub occurred_at: String,
}

/// API response for a resource's audit timeline.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditTimelineResponse {
    /// The resource kind.
    pub kind: String,
    /// The canonical resource identifier.
    pub resource_id: i64,
    /// Events, oldest first.
    pub events: Vec<AuditEventInfo>,
}
