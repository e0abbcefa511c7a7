// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

//! API boundary for the club registration system.
//!
//! Handlers here authorize the caller, validate request DTOs, call the
//! persistence layer and translate every lower-level error into an
//! [`ApiError`]. Transport concerns live in the server crate.

mod auth;
mod error;
mod handlers;
mod request_response;
mod validation;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate_stub};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    approve_registration, audit_timeline, cancel_registration, create_resource, dashboard,
    get_capacity, get_registration, get_resource, list_registrations, list_resources,
    registration_history, reject_registration, set_capacity, set_resource_open,
    submit_registration,
};
pub use request_response::{
    AuditEventInfo, AuditTimelineResponse, CapacityInfo, CreateResourceRequest,
    HistoryEntryInfo, ListRegistrationsRequest, ListRegistrationsResponse, ListResourcesResponse,
    RegistrationHistoryResponse, RegistrationInfo, RejectRegistrationRequest, ResourceInfo,
    ResourceResponse, SetCapacityRequest, SetResourceOpenRequest, SubmitRegistrationRequest,
    TransitionResponse,
};
pub use validation::{
    RequestValidationError, parse_kind, parse_role, parse_status, require_non_blank,
    require_positive,
};
