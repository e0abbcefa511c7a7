// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use clubreg::CoreError;
use clubreg_domain::DomainError;
use clubreg_persistence::PersistenceError;

use crate::validation::RequestValidationError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The registrant already holds a registration for the resource.
    DuplicateRegistration {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A requested resource was not found, or is closed.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The registration does not exist.
    RegistrationNotFound {
        /// The requested registration id.
        registration_id: i64,
    },
    /// The lifecycle does not allow the requested change.
    InvalidTransition {
        /// A human-readable description of the refusal.
        message: String,
    },
    /// No place is left on the resource.
    CapacityExceeded {
        /// A human-readable description of the refusal.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::DuplicateRegistration { message }
            | Self::InvalidTransition { message }
            | Self::CapacityExceeded { message } => write!(f, "{message}"),
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::RegistrationNotFound { registration_id } => {
                write!(f, "Registration {registration_id} not found")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<RequestValidationError> for ApiError {
    fn from(err: RequestValidationError) -> Self {
        Self::InvalidInput {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

fn invalid_input(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::DuplicateRegistration { .. } => ApiError::DuplicateRegistration { message },
        DomainError::ResourceNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message,
        },
        DomainError::RegistrationNotFound(registration_id) => {
            ApiError::RegistrationNotFound { registration_id }
        }
        DomainError::InvalidTransition { .. } => ApiError::InvalidTransition { message },
        DomainError::CapacityExceeded { .. } => ApiError::CapacityExceeded { message },
        DomainError::CapacityBelowAccepted { .. } | DomainError::InvalidCapacity(_) => {
            invalid_input("max_capacity", message)
        }
        DomainError::InvalidStatus(_) => invalid_input("status", message),
        DomainError::InvalidResourceKind(_) => invalid_input("kind", message),
        DomainError::InvalidTitle(_) => invalid_input("title", message),
        DomainError::InvalidRegistrantId(_) => invalid_input("registrant_id", message),
        DomainError::InvalidDetails(_) => invalid_input("details", message),
        DomainError::InvalidTimestamp { .. } => ApiError::Internal { message },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Internal(msg) => ApiError::Internal {
            message: format!("Internal error: {msg}"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Rejected transitions carry their domain cause; everything else the
/// caller cannot fix is reported as internal.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Rejected(core_err) => translate_core_error(core_err),
        PersistenceError::ResourceNotFound(resource) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message: format!("Resource {resource} does not exist"),
        },
        PersistenceError::RegistrationNotFound(registration_id) => {
            ApiError::RegistrationNotFound { registration_id }
        }
        PersistenceError::EventNotFound(event_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Audit event"),
            message: format!("Audit event {event_id} does not exist"),
        },
        PersistenceError::UniqueViolation(message) => ApiError::DuplicateRegistration { message },
        PersistenceError::CapacityViolation(message) => ApiError::CapacityExceeded { message },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
