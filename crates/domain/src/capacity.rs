// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capacity accounting for registrable resources.
//!
//! The accepted count is always derived from the set of `approved`
//! registrations; it is never stored as an independent source of truth.

use crate::error::DomainError;
use crate::registration::Registration;
use crate::resource::{Capacity, ResourceRef};
use crate::status::RegistrationStatus;
use serde::{Deserialize, Serialize};

/// A point-in-time view of a resource's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacitySnapshot {
    resource: ResourceRef,
    accepted_count: u32,
    max_capacity: Option<Capacity>,
}

impl CapacitySnapshot {
    /// Creates a snapshot from an already computed accepted count.
    #[must_use]
    pub const fn new(
        resource: ResourceRef,
        accepted_count: u32,
        max_capacity: Option<Capacity>,
    ) -> Self {
        Self {
            resource,
            accepted_count,
            max_capacity,
        }
    }

    /// Computes a snapshot by counting approved registrations.
    ///
    /// Registrations for other resources are ignored.
    #[must_use]
    pub fn from_registrations<'a, I>(
        resource: ResourceRef,
        max_capacity: Option<Capacity>,
        registrations: I,
    ) -> Self
    where
        I: IntoIterator<Item = &'a Registration>,
    {
        let accepted_count: usize = registrations
            .into_iter()
            .filter(|r| r.resource() == resource && r.status().counts_toward_capacity())
            .count();

        Self {
            resource,
            accepted_count: u32::try_from(accepted_count).unwrap_or(u32::MAX),
            max_capacity,
        }
    }

    #[must_use]
    pub const fn resource(&self) -> ResourceRef {
        self.resource
    }

    #[must_use]
    pub const fn accepted_count(&self) -> u32 {
        self.accepted_count
    }

    /// Returns the configured maximum, or `None` for unlimited.
    #[must_use]
    pub fn max_capacity(&self) -> Option<u32> {
        self.max_capacity.map(|c| c.value())
    }

    /// Returns true if one more registration could be approved.
    #[must_use]
    pub fn has_room(&self) -> bool {
        self.max_capacity
            .is_none_or(|max| self.accepted_count < max.value())
    }

    /// Returns the number of free places, or `None` for unlimited.
    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        self.max_capacity
            .map(|max| max.value().saturating_sub(self.accepted_count))
    }

    /// Ensures one more registration could be approved.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CapacityExceeded` if the resource is full.
    pub fn ensure_room(&self) -> Result<(), DomainError> {
        match self.max_capacity {
            Some(max) if self.accepted_count >= max.value() => {
                Err(DomainError::CapacityExceeded {
                    resource: self.resource,
                    accepted: self.accepted_count,
                    max: max.value(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Returns the status a new submission starts in.
    ///
    /// `pending` while a place is free, `waitlisted` once the resource is full.
    #[must_use]
    pub fn initial_status(&self) -> RegistrationStatus {
        if self.has_room() {
            RegistrationStatus::Pending
        } else {
            RegistrationStatus::Waitlisted
        }
    }

    /// Validates a change to the configured maximum.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CapacityBelowAccepted` if the new maximum is
    /// smaller than the number of approved registrations.
    pub fn validate_capacity_change(&self, new_max: Option<Capacity>) -> Result<(), DomainError> {
        match new_max {
            Some(max) if max.value() < self.accepted_count => {
                Err(DomainError::CapacityBelowAccepted {
                    resource: self.resource,
                    accepted: self.accepted_count,
                    requested: max.value(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for CapacitySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max_capacity {
            Some(max) => write!(
                f,
                "resource={},accepted={},max={}",
                self.resource,
                self.accepted_count,
                max.value()
            ),
            None => write!(
                f,
                "resource={},accepted={},max=unlimited",
                self.resource, self.accepted_count
            ),
        }
    }
}
