// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use clubreg_domain::{Resource, ResourceKind, ResourceRef};
use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::ResourceRow;
use crate::diesel_schema::resources;
use crate::error::PersistenceError;

/// Looks up a resource by reference.
///
/// Both the kind and the id must match.
///
/// # Errors
///
/// Returns an error if the query fails or the row is malformed.
pub fn find_resource(
    conn: &mut SqliteConnection,
    resource: ResourceRef,
) -> Result<Option<Resource>, PersistenceError> {
    resources::table
        .filter(resources::resource_id.eq(resource.id()))
        .filter(resources::kind.eq(resource.kind().as_str()))
        .select(ResourceRow::as_select())
        .first::<ResourceRow>(conn)
        .optional()?
        .map(ResourceRow::into_domain)
        .transpose()
}

/// Lists resources, optionally restricted to one kind, in id order.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_resources(
    conn: &mut SqliteConnection,
    kind: Option<ResourceKind>,
) -> Result<Vec<Resource>, PersistenceError> {
    let mut query = resources::table
        .select(ResourceRow::as_select())
        .order(resources::resource_id.asc())
        .into_boxed();

    if let Some(kind) = kind {
        query = query.filter(resources::kind.eq(kind.as_str()));
    }

    query
        .load::<ResourceRow>(conn)?
        .into_iter()
        .map(ResourceRow::into_domain)
        .collect()
}
