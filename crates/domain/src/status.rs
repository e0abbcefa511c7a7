// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registration status tracking and transition logic.
//!
//! This module defines registration states and valid transitions.
//! Approval and rejection are administrator decisions; cancellation may be
//! requested by the registrant or an administrator. The only
//! system-initiated transition is waitlist promotion (`waitlisted` to
//! `pending`) when an approved place is given back.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Registration status states.
///
/// Status is tracked per registrant, per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    /// Submitted and eligible for a decision
    Pending,
    /// Submitted while the resource was full
    Waitlisted,
    /// Accepted by an administrator; holds a place
    Approved,
    /// Refused by an administrator
    Rejected,
    /// Withdrawn by the registrant or an administrator
    Cancelled,
}

impl RegistrationStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Waitlisted,
        Self::Approved,
        Self::Rejected,
        Self::Cancelled,
    ];

    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Waitlisted => "waitlisted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "waitlisted" => Ok(Self::Waitlisted),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }

    /// Returns true if this status is terminal.
    ///
    /// Entering a terminal status records the decision time. `Approved` is
    /// terminal but may still be cancelled.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Cancelled)
    }

    /// Returns true if the registration still awaits an administrator decision.
    #[must_use]
    pub const fn is_awaiting_decision(&self) -> bool {
        matches!(self, Self::Pending | Self::Waitlisted)
    }

    /// Returns true if this status occupies a place against capacity.
    #[must_use]
    pub const fn counts_toward_capacity(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Returns true if this status blocks a new submission for the same pair.
    #[must_use]
    pub const fn blocks_resubmission(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if matches!(self, Self::Rejected | Self::Cancelled) {
            return Err(DomainError::InvalidTransition {
                from: *self,
                to: new_status,
                reason: String::from("cannot transition from terminal state"),
            });
        }

        let valid = match self {
            Self::Pending => matches!(
                new_status,
                Self::Approved | Self::Rejected | Self::Cancelled
            ),
            Self::Waitlisted => matches!(
                new_status,
                Self::Pending | Self::Approved | Self::Rejected | Self::Cancelled
            ),
            Self::Approved => {
                if new_status == Self::Cancelled {
                    true
                } else {
                    return Err(DomainError::InvalidTransition {
                        from: *self,
                        to: new_status,
                        reason: String::from("approved registrations can only be cancelled"),
                    });
                }
            }
            Self::Rejected | Self::Cancelled => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: *self,
                to: new_status,
                reason: String::from("transition not permitted by registration lifecycle rules"),
            })
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}
