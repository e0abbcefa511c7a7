// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubreg_audit::AuditEvent;
use clubreg_domain::format_timestamp;
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::{ActionData, ActorData, CauseData, NewAuditEvent, StateSnapshotData};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Persists an audit event.
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let actor_data: ActorData = ActorData {
        id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
    };
    let cause_data: CauseData = CauseData {
        id: event.cause.id.clone(),
        description: event.cause.description.clone(),
    };
    let action_data: ActionData = ActionData {
        name: event.action.name.clone(),
        details: event.action.details.clone(),
    };
    let before_data: StateSnapshotData = StateSnapshotData {
        data: event.before.data.clone(),
    };
    let after_data: StateSnapshotData = StateSnapshotData {
        data: event.after.data.clone(),
    };

    let record: NewAuditEvent = NewAuditEvent {
        resource_kind: event.resource.kind().as_str().to_string(),
        resource_id: event.resource.id(),
        registration_id: event.registration_id,
        actor_json: serde_json::to_string(&actor_data)?,
        cause_json: serde_json::to_string(&cause_data)?,
        action_json: serde_json::to_string(&action_data)?,
        before_snapshot_json: serde_json::to_string(&before_data)?,
        after_snapshot_json: serde_json::to_string(&after_data)?,
        created_at: format_timestamp(event.occurred_at)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?,
    };

    diesel::insert_into(audit_events::table)
        .values(&record)
        .execute(conn)?;

    let event_id: i64 = conn.get_last_insert_rowid()?;
    debug!(event_id, action = %event.action.name, "Persisted audit event");

    Ok(event_id)
}
