// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubreg_domain::{
    Capacity, Registration, RegistrationDetails, RegistrationStatus, Resource, ResourceKind,
    ResourceRef, parse_timestamp,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::diesel_schema::{audit_events, registration_history, registrations, resources};
use crate::error::PersistenceError;

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub actor_type: String,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

/// A row of the `resources` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = resources)]
pub struct ResourceRow {
    pub resource_id: i64,
    pub kind: String,
    pub title: String,
    pub max_capacity: Option<i32>,
    pub is_open: i32,
    #[allow(dead_code)]
    pub created_at: String,
}

impl ResourceRow {
    /// Rebuilds the domain resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored kind or capacity is invalid.
    pub fn into_domain(self) -> Result<Resource, PersistenceError> {
        let kind: ResourceKind = parse_kind(&self.kind)?;
        let max_capacity: Option<Capacity> = self
            .max_capacity
            .map(|c| Capacity::new(i64::from(c)))
            .transpose()
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;

        Ok(Resource::with_id(
            self.resource_id,
            kind,
            self.title,
            max_capacity,
            self.is_open != 0,
        ))
    }
}

/// Insertable row for the `resources` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = resources)]
pub struct NewResource {
    pub kind: String,
    pub title: String,
    pub max_capacity: Option<i32>,
    pub is_open: i32,
    pub created_at: String,
}

/// A row of the `registrations` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = registrations)]
pub struct RegistrationRow {
    pub registration_id: i64,
    pub resource_kind: String,
    pub resource_id: i64,
    pub registrant_id: i64,
    pub status: String,
    pub submitted_at: String,
    pub decided_at: Option<String>,
    pub details_json: String,
}

impl RegistrationRow {
    /// Rebuilds the domain registration.
    ///
    /// # Errors
    ///
    /// Returns an error if any stored field cannot be parsed.
    pub fn into_domain(self) -> Result<Registration, PersistenceError> {
        let resource: ResourceRef =
            ResourceRef::new(parse_kind(&self.resource_kind)?, self.resource_id);
        let status: RegistrationStatus = parse_status(&self.status)?;
        let submitted_at = parse_timestamp(&self.submitted_at)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
        let decided_at = self
            .decided_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
        let details: RegistrationDetails = serde_json::from_str(&self.details_json)?;

        Ok(Registration::restore(
            self.registration_id,
            resource,
            self.registrant_id,
            status,
            submitted_at,
            decided_at,
            details,
        ))
    }
}

/// Insertable row for the `registrations` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = registrations)]
pub struct NewRegistration {
    pub resource_kind: String,
    pub resource_id: i64,
    pub registrant_id: i64,
    pub status: String,
    pub submitted_at: String,
    pub decided_at: Option<String>,
    pub details_json: String,
}

/// A row of the `registration_history` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = registration_history)]
pub struct RegistrationHistoryRow {
    pub history_id: i64,
    pub registration_id: i64,
    pub audit_event_id: i64,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub transitioned_at: String,
    pub actor_id: String,
    pub notes: Option<String>,
}

/// Insertable row for the `registration_history` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = registration_history)]
pub struct NewRegistrationHistory {
    pub registration_id: i64,
    pub audit_event_id: i64,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub transitioned_at: String,
    pub actor_id: String,
    pub notes: Option<String>,
}

/// A row of the `audit_events` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_events)]
pub struct AuditEventRow {
    pub event_id: i64,
    pub resource_kind: String,
    pub resource_id: i64,
    pub registration_id: Option<i64>,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
    pub created_at: String,
}

/// Insertable row for the `audit_events` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_events)]
pub struct NewAuditEvent {
    pub resource_kind: String,
    pub resource_id: i64,
    pub registration_id: Option<i64>,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
    pub created_at: String,
}

pub fn parse_kind(value: &str) -> Result<ResourceKind, PersistenceError> {
    ResourceKind::from_str(value).map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}

pub fn parse_status(value: &str) -> Result<RegistrationStatus, PersistenceError> {
    RegistrationStatus::from_str(value)
        .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}
