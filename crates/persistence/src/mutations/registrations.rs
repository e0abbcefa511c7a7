// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubreg_domain::{Registration, RegistrationStatus, format_timestamp};
use diesel::prelude::*;
use diesel::SqliteConnection;
use time::OffsetDateTime;

use crate::backend::PersistenceBackend;
use crate::data_models::{NewRegistration, NewRegistrationHistory};
use crate::diesel_schema::{registration_history, registrations};
use crate::error::PersistenceError;

fn timestamp_column(at: OffsetDateTime) -> Result<String, PersistenceError> {
    format_timestamp(at).map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Inserts a newly submitted registration.
///
/// # Returns
///
/// The registration ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails. A second non-cancelled
/// registration for the same pair surfaces as `UniqueViolation`.
pub fn insert_registration(
    conn: &mut SqliteConnection,
    registration: &Registration,
) -> Result<i64, PersistenceError> {
    let record: NewRegistration = NewRegistration {
        resource_kind: registration.resource().kind().as_str().to_string(),
        resource_id: registration.resource().id(),
        registrant_id: registration.registrant_id(),
        status: registration.status().as_str().to_string(),
        submitted_at: timestamp_column(registration.submitted_at())?,
        decided_at: registration
            .decided_at()
            .map(timestamp_column)
            .transpose()?,
        details_json: serde_json::to_string(registration.details())?,
    };

    diesel::insert_into(registrations::table)
        .values(&record)
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Writes the status and decision time of a persisted registration.
///
/// The update is guarded on the expected prior status so that a row changed
/// outside the current transaction is never overwritten.
///
/// # Errors
///
/// Returns an error if the update fails or no row matched.
pub fn update_registration_status(
    conn: &mut SqliteConnection,
    registration: &Registration,
    previous_status: RegistrationStatus,
) -> Result<(), PersistenceError> {
    let registration_id: i64 = registration.registration_id().ok_or_else(|| {
        PersistenceError::DatabaseError(String::from("Cannot update an unsaved registration"))
    })?;

    let updated: usize = diesel::update(
        registrations::table
            .filter(registrations::registration_id.eq(registration_id))
            .filter(registrations::status.eq(previous_status.as_str())),
    )
    .set((
        registrations::status.eq(registration.status().as_str()),
        registrations::decided_at.eq(registration
            .decided_at()
            .map(timestamp_column)
            .transpose()?),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::RegistrationNotFound(registration_id));
    }
    Ok(())
}

/// Inserts a registration history record.
///
/// # Errors
///
/// Returns an error if the database insert fails.
#[allow(clippy::too_many_arguments)]
pub fn insert_history(
    conn: &mut SqliteConnection,
    registration_id: i64,
    audit_event_id: i64,
    previous_status: Option<RegistrationStatus>,
    new_status: RegistrationStatus,
    transitioned_at: OffsetDateTime,
    actor_id: &str,
    notes: Option<&str>,
) -> Result<(), PersistenceError> {
    let record: NewRegistrationHistory = NewRegistrationHistory {
        registration_id,
        audit_event_id,
        previous_status: previous_status.map(|s| s.as_str().to_string()),
        new_status: new_status.as_str().to_string(),
        transitioned_at: timestamp_column(transitioned_at)?,
        actor_id: actor_id.to_string(),
        notes: notes.map(ToString::to_string),
    };

    diesel::insert_into(registration_history::table)
        .values(&record)
        .execute(conn)?;
    Ok(())
}
