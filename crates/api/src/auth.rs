// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization.
//!
//! Authentication is a stub: the caller states who they are and which
//! role they hold. Authorization is enforced here, never in the core.

use clubreg_audit::Actor;
use clubreg_domain::Registration;

use crate::error::AuthError;
use tracing::warn;

/// Actor roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Administrators manage resources and decide on registrations.
    ///
    /// Admins may:
    /// - create, open, close and resize resources
    /// - approve or reject registrations
    /// - submit or cancel on behalf of any registrant
    Admin,
    /// A registrant acting for themself.
    ///
    /// The actor id is the registrant id. Registrants may submit and
    /// cancel only their own registrations.
    Registrant,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Registrant => "registrant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// Returns the registrant this actor speaks for, if it is a registrant.
    #[must_use]
    pub fn registrant_id(&self) -> Option<i64> {
        match self.role {
            Role::Registrant => self.id.parse().ok(),
            Role::Admin => None,
        }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role.as_str().to_string())
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor is an administrator.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor does not have the Admin role.
    pub fn authorize_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Registrant => {
                warn!(actor_id = %actor.id, action, "Admin action refused");
                Err(AuthError::Unauthorized {
                    action: action.to_string(),
                    required_role: String::from("Admin"),
                })
            }
        }
    }

    /// Checks that the actor may submit for the given registrant.
    ///
    /// # Errors
    ///
    /// Returns an error if a registrant submits for someone else.
    pub fn authorize_submit(
        actor: &AuthenticatedActor,
        registrant_id: i64,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Registrant if actor.registrant_id() == Some(registrant_id) => Ok(()),
            Role::Registrant => Err(AuthError::Unauthorized {
                action: String::from("submit_registration for another registrant"),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Checks that the actor may cancel the registration.
    ///
    /// Admins may cancel any registration; registrants only their own.
    ///
    /// # Errors
    ///
    /// Returns an error if a registrant cancels someone else's registration.
    pub fn authorize_cancel(
        actor: &AuthenticatedActor,
        registration: &Registration,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Registrant if actor.registrant_id() == Some(registration.registrant_id()) => {
                Ok(())
            }
            Role::Registrant => Err(AuthError::Unauthorized {
                action: String::from("cancel_registration of another registrant"),
                required_role: String::from("Admin"),
            }),
        }
    }
}

/// Stub authentication: accepts the stated identity.
///
/// # Errors
///
/// Returns an error if the actor id is blank, or a registrant's id is not a
/// positive registrant number.
pub fn authenticate_stub(actor_id: String, role: Role) -> Result<AuthenticatedActor, AuthError> {
    if actor_id.trim().is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }

    let actor: AuthenticatedActor = AuthenticatedActor::new(actor_id, role);
    if role == Role::Registrant && actor.registrant_id().is_none_or(|id| id <= 0) {
        return Err(AuthError::AuthenticationFailed {
            reason: format!(
                "Registrant actor ID '{}' is not a registrant number",
                actor.id
            ),
        });
    }

    Ok(actor)
}
