// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubreg_domain::{Capacity, Resource, format_timestamp};
use diesel::prelude::*;
use diesel::SqliteConnection;
use num_traits::ToPrimitive;
use time::OffsetDateTime;

use crate::backend::PersistenceBackend;
use crate::data_models::NewResource;
use crate::diesel_schema::resources;
use crate::error::PersistenceError;

fn capacity_column(capacity: Option<Capacity>) -> Result<Option<i32>, PersistenceError> {
    capacity
        .map(|c| {
            c.value().to_i32().ok_or_else(|| {
                PersistenceError::SerializationError(format!(
                    "Capacity {} does not fit the column",
                    c.value()
                ))
            })
        })
        .transpose()
}

/// Inserts a new resource.
///
/// # Returns
///
/// The resource ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_resource(
    conn: &mut SqliteConnection,
    resource: &Resource,
    created_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let record: NewResource = NewResource {
        kind: resource.kind().as_str().to_string(),
        title: resource.title().to_string(),
        max_capacity: capacity_column(resource.max_capacity())?,
        is_open: i32::from(resource.is_open()),
        created_at: format_timestamp(created_at)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?,
    };

    diesel::insert_into(resources::table)
        .values(&record)
        .execute(conn)?;

    conn.get_last_insert_rowid()
}

/// Writes the mutable fields of a persisted resource.
///
/// # Errors
///
/// Returns an error if the resource has no id or the update fails.
pub fn update_resource(
    conn: &mut SqliteConnection,
    resource: &Resource,
) -> Result<(), PersistenceError> {
    let resource_id: i64 = resource.resource_id().ok_or_else(|| {
        PersistenceError::DatabaseError(String::from("Cannot update an unsaved resource"))
    })?;

    diesel::update(resources::table.filter(resources::resource_id.eq(resource_id)))
        .set((
            resources::is_open.eq(i32::from(resource.is_open())),
            resources::max_capacity.eq(capacity_column(resource.max_capacity())?),
        ))
        .execute(conn)?;
    Ok(())
}
