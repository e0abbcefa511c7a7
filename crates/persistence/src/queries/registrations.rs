// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registration queries.

use clubreg_domain::{
    Registration, RegistrationStatus, ResourceRef, format_timestamp, parse_timestamp,
};
use diesel::prelude::*;
use diesel::SqliteConnection;
use num_traits::ToPrimitive;
use serde::Serialize;
use time::OffsetDateTime;

use crate::data_models::{RegistrationHistoryRow, RegistrationRow, parse_kind, parse_status};
use crate::diesel_schema::{registration_history, registrations};
use crate::error::PersistenceError;

/// One entry in a registration's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationHistoryEntry {
    pub history_id: i64,
    pub registration_id: i64,
    pub audit_event_id: i64,
    /// `None` for the initial submission.
    pub previous_status: Option<RegistrationStatus>,
    pub new_status: RegistrationStatus,
    pub transitioned_at: OffsetDateTime,
    pub actor_id: String,
    pub notes: Option<String>,
}

/// Position of the last row returned by a keyset page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueKey {
    pub submitted_at: String,
    pub registration_id: i64,
}

impl QueueKey {
    /// Builds the key for a persisted registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration has no id or its timestamp
    /// cannot be formatted.
    pub fn of(registration: &Registration) -> Result<Self, PersistenceError> {
        let registration_id: i64 = registration.registration_id().ok_or_else(|| {
            PersistenceError::ReconstructionError(String::from("registration without id"))
        })?;
        let submitted_at: String = format_timestamp(registration.submitted_at())
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
        Ok(Self {
            submitted_at,
            registration_id,
        })
    }
}

/// Retrieves a registration by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_registration(
    conn: &mut SqliteConnection,
    registration_id: i64,
) -> Result<Option<Registration>, PersistenceError> {
    registrations::table
        .filter(registrations::registration_id.eq(registration_id))
        .select(RegistrationRow::as_select())
        .first::<RegistrationRow>(conn)
        .optional()?
        .map(RegistrationRow::into_domain)
        .transpose()
}

/// Returns the resource a registration belongs to.
///
/// # Errors
///
/// Returns an error if the query fails or the stored kind is invalid.
pub fn resource_of(
    conn: &mut SqliteConnection,
    registration_id: i64,
) -> Result<Option<ResourceRef>, PersistenceError> {
    registrations::table
        .filter(registrations::registration_id.eq(registration_id))
        .select((registrations::resource_kind, registrations::resource_id))
        .first::<(String, i64)>(conn)
        .optional()?
        .map(|(kind, id)| parse_kind(&kind).map(|kind| ResourceRef::new(kind, id)))
        .transpose()
}

/// Loads the registrations a transition on `resource` needs to see.
///
/// Every non-cancelled registration is returned; `include` adds one more
/// registration by id regardless of its status.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn load_for_state(
    conn: &mut SqliteConnection,
    resource: ResourceRef,
    include: Option<i64>,
) -> Result<Vec<Registration>, PersistenceError> {
    let included: i64 = include.unwrap_or(0);

    registrations::table
        .filter(registrations::resource_kind.eq(resource.kind().as_str()))
        .filter(registrations::resource_id.eq(resource.id()))
        .filter(
            registrations::status
                .ne(RegistrationStatus::Cancelled.as_str())
                .or(registrations::registration_id.eq(included)),
        )
        .order((
            registrations::submitted_at.asc(),
            registrations::registration_id.asc(),
        ))
        .select(RegistrationRow::as_select())
        .load::<RegistrationRow>(conn)?
        .into_iter()
        .map(RegistrationRow::into_domain)
        .collect()
}

/// Loads one page of a resource's registrations in queue order.
///
/// Rows strictly after `after` are returned, ordered by
/// (`submitted_at`, `registration_id`).
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn registration_page(
    conn: &mut SqliteConnection,
    resource: ResourceRef,
    after: Option<&QueueKey>,
    limit: i64,
) -> Result<Vec<Registration>, PersistenceError> {
    let mut query = registrations::table
        .filter(registrations::resource_kind.eq(resource.kind().as_str()))
        .filter(registrations::resource_id.eq(resource.id()))
        .select(RegistrationRow::as_select())
        .order((
            registrations::submitted_at.asc(),
            registrations::registration_id.asc(),
        ))
        .limit(limit)
        .into_boxed();

    if let Some(key) = after {
        query = query.filter(
            registrations::submitted_at.gt(key.submitted_at.clone()).or(registrations::submitted_at
                .eq(key.submitted_at.clone())
                .and(registrations::registration_id.gt(key.registration_id))),
        );
    }

    query
        .load::<RegistrationRow>(conn)?
        .into_iter()
        .map(RegistrationRow::into_domain)
        .collect()
}

/// Counts approved registrations for a resource.
///
/// # Errors
///
/// Returns an error if the query fails or the count does not fit in a `u32`.
pub fn count_approved(
    conn: &mut SqliteConnection,
    resource: ResourceRef,
) -> Result<u32, PersistenceError> {
    let count: i64 = registrations::table
        .filter(registrations::resource_kind.eq(resource.kind().as_str()))
        .filter(registrations::resource_id.eq(resource.id()))
        .filter(registrations::status.eq(RegistrationStatus::Approved.as_str()))
        .count()
        .get_result(conn)?;

    count
        .to_u32()
        .ok_or_else(|| PersistenceError::DatabaseError("Count conversion failed".to_string()))
}

/// Retrieves the status history of a registration, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn history(
    conn: &mut SqliteConnection,
    registration_id: i64,
) -> Result<Vec<RegistrationHistoryEntry>, PersistenceError> {
    registration_history::table
        .filter(registration_history::registration_id.eq(registration_id))
        .order(registration_history::history_id.asc())
        .select(RegistrationHistoryRow::as_select())
        .load::<RegistrationHistoryRow>(conn)?
        .into_iter()
        .map(|row| -> Result<RegistrationHistoryEntry, PersistenceError> {
            Ok(RegistrationHistoryEntry {
                history_id: row.history_id,
                registration_id: row.registration_id,
                audit_event_id: row.audit_event_id,
                previous_status: row.previous_status.as_deref().map(parse_status).transpose()?,
                new_status: parse_status(&row.new_status)?,
                transitioned_at: parse_timestamp(&row.transitioned_at)
                    .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?,
                actor_id: row.actor_id,
                notes: row.notes,
            })
        })
        .collect()
}
