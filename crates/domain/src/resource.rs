// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registrable resources: competitions, events and formations.

use crate::error::DomainError;
use crate::status::RegistrationStatus;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of thing a registrant can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A competition entry.
    Competition,
    /// An event attendance.
    Event,
    /// A formation (course) enrollment.
    Formation,
}

impl ResourceKind {
    /// All resource kinds.
    pub const ALL: [Self; 3] = [Self::Competition, Self::Event, Self::Formation];

    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Competition => "competition",
            Self::Event => "event",
            Self::Formation => "formation",
        }
    }

    /// Returns the display word used for a status on this kind of resource.
    ///
    /// Labels are presentation only. Storage and transition rules always use
    /// [`RegistrationStatus::as_str`].
    #[must_use]
    pub const fn status_label(&self, status: RegistrationStatus) -> &'static str {
        match (self, status) {
            (_, RegistrationStatus::Pending) => "pending",
            (_, RegistrationStatus::Waitlisted) => "waitlisted",
            (Self::Competition, RegistrationStatus::Approved) => "accepted",
            (Self::Event, RegistrationStatus::Approved) => "confirmed",
            (Self::Formation, RegistrationStatus::Approved) => "enrolled",
            (Self::Competition, RegistrationStatus::Rejected) => "rejected",
            (Self::Event, RegistrationStatus::Rejected) => "declined",
            (Self::Formation, RegistrationStatus::Rejected) => "refused",
            (Self::Competition, RegistrationStatus::Cancelled) => "withdrawn",
            (Self::Event, RegistrationStatus::Cancelled) => "cancelled",
            (Self::Formation, RegistrationStatus::Cancelled) => "dropped",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "competition" => Ok(Self::Competition),
            "event" => Ok(Self::Event),
            "formation" => Ok(Self::Formation),
            _ => Err(DomainError::InvalidResourceKind(s.to_string())),
        }
    }
}

/// A reference to a registrable resource.
///
/// Resources of different kinds have independent id spaces, so a reference
/// is always the pair of kind and id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceRef {
    kind: ResourceKind,
    id: i64,
}

impl ResourceRef {
    /// Creates a new resource reference.
    #[must_use]
    pub const fn new(kind: ResourceKind, id: i64) -> Self {
        Self { kind, id }
    }

    /// Returns the resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the resource id within its kind.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} #{}", self.kind, self.id)
    }
}

/// Maximum number of approved registrations a resource accepts.
///
/// A capacity is between one and [`Capacity::MAX`]; "unlimited" is
/// expressed by the absence of a capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capacity(u32);

impl Capacity {
    /// Largest capacity a resource can carry; the stored column is a signed
    /// 32-bit integer.
    pub const MAX: u32 = i32::MAX.unsigned_abs();

    /// Creates a new capacity.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCapacity` if the value is zero, negative,
    /// or larger than [`Capacity::MAX`].
    pub fn new(value: i64) -> Result<Self, DomainError> {
        match i32::try_from(value) {
            Ok(v) if v > 0 => Ok(Self(v.unsigned_abs())),
            _ => Err(DomainError::InvalidCapacity(value)),
        }
    }

    /// Returns the capacity value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

/// A registrable resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// The canonical id, `None` until persisted.
    resource_id: Option<i64>,
    kind: ResourceKind,
    title: String,
    max_capacity: Option<Capacity>,
    is_open: bool,
}

impl Resource {
    /// Creates a new, open, unpersisted resource.
    #[must_use]
    pub const fn new(kind: ResourceKind, title: String, max_capacity: Option<Capacity>) -> Self {
        Self {
            resource_id: None,
            kind,
            title,
            max_capacity,
            is_open: true,
        }
    }

    /// Rehydrates a persisted resource.
    #[must_use]
    pub const fn with_id(
        resource_id: i64,
        kind: ResourceKind,
        title: String,
        max_capacity: Option<Capacity>,
        is_open: bool,
    ) -> Self {
        Self {
            resource_id: Some(resource_id),
            kind,
            title,
            max_capacity,
            is_open,
        }
    }

    /// Returns the canonical id, if persisted.
    #[must_use]
    pub const fn resource_id(&self) -> Option<i64> {
        self.resource_id
    }

    /// Returns a reference to this resource, if persisted.
    #[must_use]
    pub fn reference(&self) -> Option<ResourceRef> {
        self.resource_id.map(|id| ResourceRef::new(self.kind, id))
    }

    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn max_capacity(&self) -> Option<Capacity> {
        self.max_capacity
    }

    /// Returns true if the resource accepts new submissions.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Returns a copy with the open flag replaced.
    #[must_use]
    pub fn with_open(&self, is_open: bool) -> Self {
        Self {
            is_open,
            ..self.clone()
        }
    }

    /// Returns a copy with the capacity replaced.
    #[must_use]
    pub fn with_capacity(&self, max_capacity: Option<Capacity>) -> Self {
        Self {
            max_capacity,
            ..self.clone()
        }
    }
}
