// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubreg_domain::RegistrationDetails;

/// A registration command, expressed as data only.
///
/// Every command is scoped to the resource whose state it is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit a new registration for the resource.
    Submit {
        /// The registering user.
        registrant_id: i64,
        /// Display payload copied onto the record.
        details: RegistrationDetails,
    },
    /// Approve a pending or waitlisted registration.
    Approve {
        /// The registration to approve.
        registration_id: i64,
    },
    /// Reject a pending or waitlisted registration.
    Reject {
        /// The registration to reject.
        registration_id: i64,
        /// Optional free-text reason kept in the history.
        reason: Option<String>,
    },
    /// Cancel a registration that has not been rejected.
    Cancel {
        /// The registration to cancel.
        registration_id: i64,
    },
}

impl Command {
    /// Returns the audit action name for this command.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::Submit { .. } => "SubmitRegistration",
            Self::Approve { .. } => "ApproveRegistration",
            Self::Reject { .. } => "RejectRegistration",
            Self::Cancel { .. } => "CancelRegistration",
        }
    }

    /// Returns the targeted registration, if the command names one.
    #[must_use]
    pub const fn registration_id(&self) -> Option<i64> {
        match self {
            Self::Submit { .. } => None,
            Self::Approve { registration_id }
            | Self::Reject {
                registration_id, ..
            }
            | Self::Cancel { registration_id } => Some(*registration_id),
        }
    }
}

/// An administrative command against an existing resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceCommand {
    /// Open or close the resource for new submissions.
    SetOpen {
        /// Whether submissions are accepted.
        is_open: bool,
    },
    /// Change or remove the capacity limit.
    SetCapacity {
        /// The new maximum, `None` for unlimited.
        max_capacity: Option<i64>,
    },
}
