// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubreg_domain::DomainError;

/// Why a command was refused.
///
/// A refused command changes nothing: no registration moves and no audit
/// event is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A registration rule refused the command.
    DomainViolation(DomainError),
    /// The loaded state does not fit the command (wrong resource, missing id).
    Internal(String),
}

impl CoreError {
    /// Returns the registration rule that refused the command, if any.
    #[must_use]
    pub const fn domain_error(&self) -> Option<&DomainError> {
        match self {
            Self::DomainViolation(err) => Some(err),
            Self::Internal(_) => None,
        }
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Command refused: {err}"),
            Self::Internal(msg) => write!(f, "Inconsistent command state: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DomainViolation(err) => Some(err),
            Self::Internal(_) => None,
        }
    }
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
