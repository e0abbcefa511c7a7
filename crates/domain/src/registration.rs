// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registration records.
//!
//! A registration ties one registrant to one resource. Its status only
//! changes through [`Registration::transition_to`], which enforces the
//! lifecycle rules and stamps the decision time.

use crate::error::DomainError;
use crate::resource::ResourceRef;
use crate::status::RegistrationStatus;
use crate::validation::validate_registrant_id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// Display data copied onto a registration at submission time.
///
/// The state machine never reads these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDetails {
    /// Participant name as entered on the form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_name: Option<String>,
    /// Contact email as entered on the form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    /// Team or group member names, for group entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_members: Vec<String>,
    /// Any further form fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// A registration of one registrant for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    registration_id: Option<i64>,
    resource: ResourceRef,
    registrant_id: i64,
    status: RegistrationStatus,
    submitted_at: OffsetDateTime,
    decided_at: Option<OffsetDateTime>,
    details: RegistrationDetails,
}

impl Registration {
    /// Creates a freshly submitted registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the registrant id is not positive or the initial
    /// status is not `pending` or `waitlisted`.
    pub fn submit(
        resource: ResourceRef,
        registrant_id: i64,
        initial_status: RegistrationStatus,
        submitted_at: OffsetDateTime,
        details: RegistrationDetails,
    ) -> Result<Self, DomainError> {
        validate_registrant_id(registrant_id)?;
        if !initial_status.is_awaiting_decision() {
            return Err(DomainError::InvalidStatus(format!(
                "'{initial_status}' is not a valid initial status"
            )));
        }

        Ok(Self {
            registration_id: None,
            resource,
            registrant_id,
            status: initial_status,
            submitted_at,
            decided_at: None,
            details,
        })
    }

    /// Rehydrates a persisted registration.
    ///
    /// No lifecycle checks are made; the stored row is authoritative.
    #[must_use]
    pub const fn restore(
        registration_id: i64,
        resource: ResourceRef,
        registrant_id: i64,
        status: RegistrationStatus,
        submitted_at: OffsetDateTime,
        decided_at: Option<OffsetDateTime>,
        details: RegistrationDetails,
    ) -> Self {
        Self {
            registration_id: Some(registration_id),
            resource,
            registrant_id,
            status,
            submitted_at,
            decided_at,
            details,
        }
    }

    /// Returns a copy carrying the given canonical id.
    #[must_use]
    pub fn with_registration_id(self, registration_id: i64) -> Self {
        Self {
            registration_id: Some(registration_id),
            ..self
        }
    }

    /// Moves the registration to a new status.
    ///
    /// The decision time is recorded the first time a terminal status is
    /// entered and never overwritten afterwards.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the lifecycle forbids it.
    pub fn transition_to(
        &self,
        new_status: RegistrationStatus,
        at: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        self.status.validate_transition(new_status)?;

        let decided_at: Option<OffsetDateTime> = match self.decided_at {
            Some(existing) => Some(existing),
            None if new_status.is_terminal() => Some(at),
            None => None,
        };

        Ok(Self {
            status: new_status,
            decided_at,
            ..self.clone()
        })
    }

    #[must_use]
    pub const fn registration_id(&self) -> Option<i64> {
        self.registration_id
    }

    #[must_use]
    pub const fn resource(&self) -> ResourceRef {
        self.resource
    }

    #[must_use]
    pub const fn registrant_id(&self) -> i64 {
        self.registrant_id
    }

    #[must_use]
    pub const fn status(&self) -> RegistrationStatus {
        self.status
    }

    #[must_use]
    pub const fn submitted_at(&self) -> OffsetDateTime {
        self.submitted_at
    }

    #[must_use]
    pub const fn decided_at(&self) -> Option<OffsetDateTime> {
        self.decided_at
    }

    #[must_use]
    pub const fn details(&self) -> &RegistrationDetails {
        &self.details
    }

    /// Returns the key that orders registrations for waitlist fairness.
    ///
    /// Earliest submission first; ties go to the lower id. Unpersisted
    /// registrations sort after every persisted one with the same time.
    #[must_use]
    pub fn queue_key(&self) -> (OffsetDateTime, i64) {
        (self.submitted_at, self.registration_id.unwrap_or(i64::MAX))
    }
}
