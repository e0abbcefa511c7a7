// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use clubreg_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use clubreg_domain::{ResourceRef, parse_timestamp};
use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::{
    ActionData, ActorData, AuditEventRow, CauseData, StateSnapshotData, parse_kind,
};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

fn row_to_event(row: AuditEventRow) -> Result<AuditEvent, PersistenceError> {
    let actor_data: ActorData = serde_json::from_str(&row.actor_json)?;
    let cause_data: CauseData = serde_json::from_str(&row.cause_json)?;
    let action_data: ActionData = serde_json::from_str(&row.action_json)?;
    let before_data: StateSnapshotData = serde_json::from_str(&row.before_snapshot_json)?;
    let after_data: StateSnapshotData = serde_json::from_str(&row.after_snapshot_json)?;

    let resource: ResourceRef = ResourceRef::new(parse_kind(&row.resource_kind)?, row.resource_id);
    let occurred_at = parse_timestamp(&row.created_at)
        .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;

    let mut event: AuditEvent = AuditEvent::new(
        Actor::new(actor_data.id, actor_data.actor_type),
        Cause::new(cause_data.id, cause_data.description),
        Action::new(action_data.name, action_data.details),
        StateSnapshot::new(before_data.data),
        StateSnapshot::new(after_data.data),
        resource,
        occurred_at,
    )
    .with_event_id(row.event_id);

    if let Some(registration_id) = row.registration_id {
        event = event.for_registration(registration_id);
    }
    Ok(event)
}

/// Retrieves an audit event by ID.
///
/// # Errors
///
/// Returns an error if the event is not found or cannot be deserialized.
pub fn get_audit_event(
    conn: &mut SqliteConnection,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let row: AuditEventRow = audit_events::table
        .filter(audit_events::event_id.eq(event_id))
        .select(AuditEventRow::as_select())
        .first::<AuditEventRow>(conn)
        .optional()?
        .ok_or(PersistenceError::EventNotFound(event_id))?;

    row_to_event(row)
}

/// Retrieves every audit event scoped to a resource, in commit order.
///
/// # Errors
///
/// Returns an error if the query fails or an event cannot be deserialized.
pub fn get_audit_timeline(
    conn: &mut SqliteConnection,
    resource: ResourceRef,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    audit_events::table
        .filter(audit_events::resource_kind.eq(resource.kind().as_str()))
        .filter(audit_events::resource_id.eq(resource.id()))
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load::<AuditEventRow>(conn)?
        .into_iter()
        .map(row_to_event)
        .collect()
}
