// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request payload validation.
//!
//! These checks run before any domain logic and only look at the shape
//! of the request.

use clubreg_domain::{RegistrationStatus, ResourceKind};
use thiserror::Error;

use crate::auth::Role;

/// Request validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestValidationError {
    /// A required text field is empty.
    #[error("{field} cannot be blank")]
    BlankField { field: &'static str },

    /// A numeric field must be greater than zero.
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: i64 },

    /// The actor role is not recognised.
    #[error("Invalid role: '{0}'. Must be 'admin' or 'registrant'")]
    UnknownRole(String),

    /// The resource kind is not recognised.
    #[error("Invalid resource kind: '{0}'. Must be 'competition', 'event' or 'formation'")]
    UnknownKind(String),

    /// The status filter is not recognised.
    #[error("Invalid status: '{0}'")]
    UnknownStatus(String),
}

impl RequestValidationError {
    /// Returns the request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::BlankField { field } | Self::NotPositive { field, .. } => field,
            Self::UnknownRole(_) => "actor_role",
            Self::UnknownKind(_) => "kind",
            Self::UnknownStatus(_) => "status",
        }
    }
}

/// Parses an actor role, ignoring case.
///
/// # Errors
///
/// Returns an error for anything but `admin` or `registrant`.
pub fn parse_role(value: &str) -> Result<Role, RequestValidationError> {
    match value.trim().to_lowercase().as_str() {
        "admin" => Ok(Role::Admin),
        "registrant" => Ok(Role::Registrant),
        _ => Err(RequestValidationError::UnknownRole(value.to_string())),
    }
}

/// Parses a resource kind, ignoring case.
///
/// # Errors
///
/// Returns an error if the kind is not recognised.
pub fn parse_kind(value: &str) -> Result<ResourceKind, RequestValidationError> {
    value
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|_| RequestValidationError::UnknownKind(value.to_string()))
}

/// Parses a canonical status name, ignoring case.
///
/// # Errors
///
/// Returns an error if the status is not recognised.
pub fn parse_status(value: &str) -> Result<RegistrationStatus, RequestValidationError> {
    value
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|_| RequestValidationError::UnknownStatus(value.to_string()))
}

/// Ensures a text field is not blank.
///
/// # Errors
///
/// Returns an error if the value is empty after trimming.
pub fn require_non_blank(field: &'static str, value: &str) -> Result<(), RequestValidationError> {
    if value.trim().is_empty() {
        return Err(RequestValidationError::BlankField { field });
    }
    Ok(())
}

/// Ensures an identifier is positive.
///
/// # Errors
///
/// Returns an error if the value is zero or negative.
pub const fn require_positive(
    field: &'static str,
    value: i64,
) -> Result<(), RequestValidationError> {
    if value <= 0 {
        return Err(RequestValidationError::NotPositive { field, value });
    }
    Ok(())
}
