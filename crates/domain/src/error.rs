// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::resource::ResourceRef;
use crate::status::RegistrationStatus;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A non-cancelled registration already exists for the pair.
    DuplicateRegistration {
        /// The resource being registered for.
        resource: ResourceRef,
        /// The registrant who already holds a registration.
        registrant_id: i64,
    },
    /// The resource does not exist or is not open for registration.
    ResourceNotFound(ResourceRef),
    /// The registration does not exist.
    RegistrationNotFound(i64),
    /// The requested status change is not permitted.
    InvalidTransition {
        /// The current status.
        from: RegistrationStatus,
        /// The requested status.
        to: RegistrationStatus,
        /// Why the transition was refused.
        reason: String,
    },
    /// The resource has no remaining capacity.
    CapacityExceeded {
        /// The resource at capacity.
        resource: ResourceRef,
        /// The number of approved registrations.
        accepted: u32,
        /// The configured maximum.
        max: u32,
    },
    /// A capacity change would drop below the approved count.
    CapacityBelowAccepted {
        /// The resource being changed.
        resource: ResourceRef,
        /// The number of approved registrations.
        accepted: u32,
        /// The requested maximum.
        requested: u32,
    },
    /// Status string is not recognised.
    InvalidStatus(String),
    /// Resource kind string is not recognised.
    InvalidResourceKind(String),
    /// Capacity value is out of range.
    InvalidCapacity(i64),
    /// Resource title is empty or invalid.
    InvalidTitle(String),
    /// Registrant identifier is invalid.
    InvalidRegistrantId(i64),
    /// Registration payload is invalid.
    InvalidDetails(String),
    /// A timestamp could not be formatted or parsed.
    InvalidTimestamp {
        /// The offending value.
        value: String,
        /// The underlying error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRegistration {
                resource,
                registrant_id,
            } => {
                write!(
                    f,
                    "Registrant {registrant_id} is already registered for {resource}"
                )
            }
            Self::ResourceNotFound(resource) => {
                write!(f, "Resource {resource} not found or not open")
            }
            Self::RegistrationNotFound(id) => write!(f, "Registration {id} not found"),
            Self::InvalidTransition { from, to, reason } => {
                write!(f, "Cannot transition registration from '{from}' to '{to}': {reason}")
            }
            Self::CapacityExceeded {
                resource,
                accepted,
                max,
            } => {
                write!(
                    f,
                    "Resource {resource} is at capacity ({accepted} of {max} places taken)"
                )
            }
            Self::CapacityBelowAccepted {
                resource,
                accepted,
                requested,
            } => {
                write!(
                    f,
                    "Cannot set capacity of {resource} to {requested}: {accepted} registrations already approved"
                )
            }
            Self::InvalidStatus(status) => write!(f, "Invalid registration status: {status}"),
            Self::InvalidResourceKind(kind) => write!(f, "Invalid resource kind: {kind}"),
            Self::InvalidCapacity(value) => {
                write!(f, "Invalid capacity: {value}. Must be greater than 0")
            }
            Self::InvalidTitle(msg) => write!(f, "Invalid title: {msg}"),
            Self::InvalidRegistrantId(id) => write!(f, "Invalid registrant id: {id}"),
            Self::InvalidDetails(msg) => write!(f, "Invalid registration details: {msg}"),
            Self::InvalidTimestamp { value, error } => {
                write!(f, "Invalid timestamp '{value}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
