// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubreg_audit::{AuditEvent, StateSnapshot};
use clubreg_domain::{
    CapacitySnapshot, Registration, RegistrationStatus, Resource, ResourceRef,
};

/// The state of one resource, as seen by a single transition.
///
/// `registrations` must hold every non-cancelled registration of the
/// resource, plus any cancelled registration a command targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState {
    /// The resource this state is scoped to.
    pub reference: ResourceRef,
    /// The resource record.
    pub resource: Resource,
    /// The registrations relevant to the transition.
    pub registrations: Vec<Registration>,
}

impl ResourceState {
    /// Creates a state for a persisted resource.
    #[must_use]
    pub const fn new(
        reference: ResourceRef,
        resource: Resource,
        registrations: Vec<Registration>,
    ) -> Self {
        Self {
            reference,
            resource,
            registrations,
        }
    }

    /// Returns the number of approved registrations.
    #[must_use]
    pub fn accepted_count(&self) -> u32 {
        self.capacity_snapshot().accepted_count()
    }

    /// Computes the capacity snapshot from the loaded registrations.
    #[must_use]
    pub fn capacity_snapshot(&self) -> CapacitySnapshot {
        CapacitySnapshot::from_registrations(
            self.reference,
            self.resource.max_capacity(),
            &self.registrations,
        )
    }

    /// Finds a registration by id.
    #[must_use]
    pub fn find(&self, registration_id: i64) -> Option<&Registration> {
        self.registrations
            .iter()
            .find(|r| r.registration_id() == Some(registration_id))
    }

    /// Finds the registration that blocks a new submission by this registrant.
    #[must_use]
    pub fn active_for(&self, registrant_id: i64) -> Option<&Registration> {
        self.registrations
            .iter()
            .find(|r| r.registrant_id() == registrant_id && r.status().blocks_resubmission())
    }

    /// Counts loaded registrations in the given status.
    #[must_use]
    pub fn count_in(&self, status: RegistrationStatus) -> usize {
        self.registrations
            .iter()
            .filter(|r| r.status() == status)
            .count()
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(format!(
            "{},open={},waitlisted={}",
            self.capacity_snapshot(),
            self.resource.is_open(),
            self.count_in(RegistrationStatus::Waitlisted)
        ))
    }

    pub(crate) fn replace(&mut self, updated: &Registration) {
        if let Some(slot) = self
            .registrations
            .iter_mut()
            .find(|r| r.registration_id() == updated.registration_id())
        {
            *slot = updated.clone();
        }
    }
}

/// A single registration row written by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationChange {
    /// A new registration to insert.
    Inserted(Registration),
    /// An existing registration whose status changed.
    Updated {
        /// The registration after the change.
        registration: Registration,
        /// The status it held before.
        previous_status: RegistrationStatus,
        /// Free-text notes for the history row.
        notes: Option<String>,
    },
}

impl RegistrationChange {
    /// Returns the registration as it will be stored.
    #[must_use]
    pub const fn registration(&self) -> &Registration {
        match self {
            Self::Inserted(registration) | Self::Updated { registration, .. } => registration,
        }
    }

    /// Returns the prior status, `None` for an insert.
    #[must_use]
    pub const fn previous_status(&self) -> Option<RegistrationStatus> {
        match self {
            Self::Inserted(_) => None,
            Self::Updated {
                previous_status, ..
            } => Some(*previous_status),
        }
    }

    /// Returns the history notes for this change.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        match self {
            Self::Inserted(_) => None,
            Self::Updated { notes, .. } => notes.as_deref(),
        }
    }
}

/// The result of a successful registration transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
/// The first change is always the registration the command targeted; any
/// further change is a consequence of it (waitlist promotion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The resource state after the transition.
    pub new_state: ResourceState,
    /// The registration rows to write, in order.
    pub changes: Vec<RegistrationChange>,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

impl TransitionResult {
    /// Returns the registration the command targeted.
    #[must_use]
    pub fn primary(&self) -> Option<&Registration> {
        self.changes.first().map(RegistrationChange::registration)
    }
}

/// The result of an administrative change to a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTransition {
    /// The resource state after the change.
    pub new_state: ResourceState,
    /// The audit event recording this change.
    pub audit_event: AuditEvent,
}
