// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the club registration system.
//!
//! Storage is `SQLite` through Diesel, with the schema created by embedded
//! migrations. Every state-changing operation runs as one
//! `BEGIN IMMEDIATE` transaction:
//!
//! 1. Load the resource and the registrations the command can see
//! 2. Run the pure transition from the core crate
//! 3. Write the changed rows, the audit event and the history rows
//!
//! Holding the write lock from the first read makes the capacity check and
//! the write atomic against every other connection, including connections
//! in other processes that share the database file. A partial unique index
//! and a capacity trigger back the same rules up at the schema level.
//!
//! ## Testing
//!
//! Tests run against isolated in-memory databases. One test opens two
//! connections to a temporary file to exercise cross-connection locking.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use clubreg::{
    Command, CoreError, ResourceCommand, ResourceState, ResourceTransition, TransitionResult,
    apply, apply_create_resource, apply_resource, resource_created_event,
};
use clubreg_audit::{Actor, AuditEvent, Cause};
use clubreg_domain::{
    CapacitySnapshot, DomainError, Registration, RegistrationDetails, Resource, ResourceKind,
    ResourceRef, normalize_timestamp,
};
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod cursor;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::sqlite::{DEFAULT_BUSY_TIMEOUT, MIGRATIONS};
pub use cursor::{DEFAULT_PAGE_SIZE, RegistrationCursor, RegistrationQuery};
pub use error::PersistenceError;
pub use mutations::PersistedTransition;
pub use queries::dashboard::{DashboardSummary, KindSummary, StatusCounts};
pub use queries::registrations::RegistrationHistoryEntry;

use backend::PersistenceBackend;

/// Persistence adapter for resources, registrations and audit events.
pub struct Persistence {
    conn: SqliteConnection,
}

fn rejected(err: DomainError) -> PersistenceError {
    PersistenceError::Rejected(CoreError::DomainViolation(err))
}

fn now() -> Result<OffsetDateTime, PersistenceError> {
    normalize_timestamp(OffsetDateTime::now_utc())
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

fn load_state(
    conn: &mut SqliteConnection,
    resource: ResourceRef,
    include: Option<i64>,
) -> Result<ResourceState, PersistenceError> {
    let record: Resource = queries::resources::find_resource(conn, resource)?
        .ok_or_else(|| rejected(DomainError::ResourceNotFound(resource)))?;
    let registrations: Vec<Registration> =
        queries::registrations::load_for_state(conn, resource, include)?;
    Ok(ResourceState::new(resource, record, registrations))
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared-cache database, so tests are
    /// isolated from each other.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// The database is switched to WAL mode so readers never block the
    /// single writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Changes how long writers wait for a competing transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the PRAGMA statement fails.
    pub fn set_busy_timeout(&mut self, timeout: Duration) -> Result<(), PersistenceError> {
        backend::sqlite::set_busy_timeout(&mut self.conn, timeout)
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// Creates a new, open resource.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the title or capacity is invalid, or another
    /// error if the write fails.
    pub fn create_resource(
        &mut self,
        kind: ResourceKind,
        title: &str,
        max_capacity: Option<i64>,
        actor: Actor,
        cause: Cause,
    ) -> Result<Resource, PersistenceError> {
        let resource: Resource = apply_create_resource(kind, title, max_capacity)?;

        let created: Resource = self.conn.immediate_transaction(|conn| {
            let at: OffsetDateTime = now()?;
            let resource_id: i64 = mutations::resources::insert_resource(conn, &resource, at)?;
            let created: Resource = Resource::with_id(
                resource_id,
                resource.kind(),
                resource.title().to_string(),
                resource.max_capacity(),
                resource.is_open(),
            );
            let event: AuditEvent = resource_created_event(&created, actor, cause, at)?;
            mutations::audit::persist_audit_event(conn, &event)?;
            Ok::<Resource, PersistenceError>(created)
        })?;

        info!(resource = ?created.reference(), title = created.title(), "Created resource");
        Ok(created)
    }

    /// Opens or closes a resource for new submissions.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the resource does not exist.
    pub fn set_resource_open(
        &mut self,
        resource: ResourceRef,
        is_open: bool,
        actor: Actor,
        cause: Cause,
    ) -> Result<Resource, PersistenceError> {
        self.transact_resource(resource, ResourceCommand::SetOpen { is_open }, actor, cause)
    }

    /// Changes or removes a resource's capacity.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the resource does not exist, the capacity is
    /// invalid, or it is below the number of approved registrations.
    pub fn set_capacity(
        &mut self,
        resource: ResourceRef,
        max_capacity: Option<i64>,
        actor: Actor,
        cause: Cause,
    ) -> Result<Resource, PersistenceError> {
        self.transact_resource(
            resource,
            ResourceCommand::SetCapacity { max_capacity },
            actor,
            cause,
        )
    }

    fn transact_resource(
        &mut self,
        resource: ResourceRef,
        command: ResourceCommand,
        actor: Actor,
        cause: Cause,
    ) -> Result<Resource, PersistenceError> {
        let outcome: Result<Resource, PersistenceError> =
            self.conn.immediate_transaction(|conn| {
                let state: ResourceState = load_state(conn, resource, None)?;
                let transition: ResourceTransition =
                    apply_resource(&state, command, actor, cause, now()?)?;
                mutations::persist_resource_transition(conn, &transition)?;
                Ok(transition.new_state.resource)
            });

        match &outcome {
            Ok(updated) => info!(
                %resource,
                is_open = updated.is_open(),
                max_capacity = ?updated.max_capacity().map(|c| c.value()),
                "Updated resource"
            ),
            Err(err) => warn!(%resource, error = %err, "Resource update rejected"),
        }
        outcome
    }

    /// Retrieves a resource.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if it does not exist.
    pub fn get_resource(&mut self, resource: ResourceRef) -> Result<Resource, PersistenceError> {
        queries::resources::find_resource(&mut self.conn, resource)?
            .ok_or(PersistenceError::ResourceNotFound(resource))
    }

    /// Lists resources, optionally of one kind only.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_resources(
        &mut self,
        kind: Option<ResourceKind>,
    ) -> Result<Vec<Resource>, PersistenceError> {
        queries::resources::list_resources(&mut self.conn, kind)
    }

    /// Computes a resource's capacity snapshot with a `COUNT` query.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if it does not exist.
    pub fn capacity_snapshot(
        &mut self,
        resource: ResourceRef,
    ) -> Result<CapacitySnapshot, PersistenceError> {
        let record: Resource = self.get_resource(resource)?;
        let accepted: u32 = queries::registrations::count_approved(&mut self.conn, resource)?;
        Ok(CapacitySnapshot::new(
            resource,
            accepted,
            record.max_capacity(),
        ))
    }

    // ========================================================================
    // Registrations
    // ========================================================================

    /// Submits a registration for a resource.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` with `ResourceNotFound` or `DuplicateRegistration`,
    /// or another error if the write fails.
    pub fn submit_registration(
        &mut self,
        resource: ResourceRef,
        registrant_id: i64,
        details: RegistrationDetails,
        actor: Actor,
        cause: Cause,
    ) -> Result<PersistedTransition, PersistenceError> {
        self.transact(
            Some(resource),
            Command::Submit {
                registrant_id,
                details,
            },
            actor,
            cause,
        )
    }

    /// Approves a pending or waitlisted registration.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` with `RegistrationNotFound`, `InvalidTransition`
    /// or `CapacityExceeded`.
    pub fn approve_registration(
        &mut self,
        registration_id: i64,
        actor: Actor,
        cause: Cause,
    ) -> Result<PersistedTransition, PersistenceError> {
        self.transact(None, Command::Approve { registration_id }, actor, cause)
    }

    /// Rejects a pending or waitlisted registration.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` with `RegistrationNotFound` or `InvalidTransition`.
    pub fn reject_registration(
        &mut self,
        registration_id: i64,
        reason: Option<String>,
        actor: Actor,
        cause: Cause,
    ) -> Result<PersistedTransition, PersistenceError> {
        self.transact(
            None,
            Command::Reject {
                registration_id,
                reason,
            },
            actor,
            cause,
        )
    }

    /// Cancels a registration, promoting the waitlist if a place was freed.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` with `RegistrationNotFound` or `InvalidTransition`.
    pub fn cancel_registration(
        &mut self,
        registration_id: i64,
        actor: Actor,
        cause: Cause,
    ) -> Result<PersistedTransition, PersistenceError> {
        self.transact(None, Command::Cancel { registration_id }, actor, cause)
    }

    /// Runs one registration command as an immediate transaction.
    fn transact(
        &mut self,
        scope: Option<ResourceRef>,
        command: Command,
        actor: Actor,
        cause: Cause,
    ) -> Result<PersistedTransition, PersistenceError> {
        let action: &'static str = command.action_name();
        let target: Option<i64> = command.registration_id();

        let outcome: Result<PersistedTransition, PersistenceError> =
            self.conn.immediate_transaction(|conn| {
                let resource: ResourceRef = match (scope, target) {
                    (Some(resource), _) => resource,
                    (None, Some(registration_id)) => {
                        queries::registrations::resource_of(conn, registration_id)?.ok_or_else(
                            || rejected(DomainError::RegistrationNotFound(registration_id)),
                        )?
                    }
                    (None, None) => {
                        return Err(PersistenceError::Rejected(CoreError::Internal(
                            String::from("command has no resource scope"),
                        )));
                    }
                };

                let state: ResourceState = load_state(conn, resource, target)?;
                let result: TransitionResult = apply(&state, command, actor, cause, now()?)?;
                mutations::persist_transition(conn, &result)
            });

        match &outcome {
            Ok(persisted) => {
                if let Some(registration) = persisted.primary() {
                    info!(
                        action,
                        event_id = persisted.event_id,
                        registration_id = ?registration.registration_id(),
                        status = %registration.status(),
                        "Committed registration transition"
                    );
                }
            }
            Err(err) => warn!(action, ?target, error = %err, "Registration transition rejected"),
        }
        outcome
    }

    /// Retrieves a registration by id.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationNotFound` if it does not exist.
    pub fn get_registration(
        &mut self,
        registration_id: i64,
    ) -> Result<Registration, PersistenceError> {
        queries::registrations::find_registration(&mut self.conn, registration_id)?
            .ok_or(PersistenceError::RegistrationNotFound(registration_id))
    }

    /// Returns a lazy, restartable query over a resource's registrations.
    ///
    /// Registrations come back ordered by submission time, ties by id.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the resource does not exist.
    pub fn query_registrations(
        &mut self,
        resource: ResourceRef,
    ) -> Result<RegistrationQuery<'_>, PersistenceError> {
        self.get_resource(resource)?;
        Ok(RegistrationQuery::new(&mut self.conn, resource))
    }

    /// Retrieves the status history of a registration.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationNotFound` if it does not exist.
    pub fn registration_history(
        &mut self,
        registration_id: i64,
    ) -> Result<Vec<RegistrationHistoryEntry>, PersistenceError> {
        self.get_registration(registration_id)?;
        queries::registrations::history(&mut self.conn, registration_id)
    }

    // ========================================================================
    // Audit & Dashboard
    // ========================================================================

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Retrieves the audit timeline of a resource.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the resource does not exist.
    pub fn audit_timeline(
        &mut self,
        resource: ResourceRef,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        self.get_resource(resource)?;
        queries::audit::get_audit_timeline(&mut self.conn, resource)
    }

    /// Computes the dashboard aggregates.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn dashboard_summary(&mut self) -> Result<DashboardSummary, PersistenceError> {
        queries::dashboard::dashboard_summary(&mut self.conn)
    }
}
