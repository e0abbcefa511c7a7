// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Aggregate counts for the administration dashboard.

use clubreg_domain::{RegistrationStatus, ResourceKind};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::SqliteConnection;
use num_traits::ToPrimitive;
use serde::Serialize;

use crate::data_models::{parse_kind, parse_status};
use crate::diesel_schema::{registrations, resources};
use crate::error::PersistenceError;

/// Registration counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u32,
    pub waitlisted: u32,
    pub approved: u32,
    pub rejected: u32,
    pub cancelled: u32,
}

impl StatusCounts {
    fn slot(&mut self, status: RegistrationStatus) -> &mut u32 {
        match status {
            RegistrationStatus::Pending => &mut self.pending,
            RegistrationStatus::Waitlisted => &mut self.waitlisted,
            RegistrationStatus::Approved => &mut self.approved,
            RegistrationStatus::Rejected => &mut self.rejected,
            RegistrationStatus::Cancelled => &mut self.cancelled,
        }
    }

    /// Returns the count for one status.
    #[must_use]
    pub const fn get(&self, status: RegistrationStatus) -> u32 {
        match status {
            RegistrationStatus::Pending => self.pending,
            RegistrationStatus::Waitlisted => self.waitlisted,
            RegistrationStatus::Approved => self.approved,
            RegistrationStatus::Rejected => self.rejected,
            RegistrationStatus::Cancelled => self.cancelled,
        }
    }

    /// Returns the total across all statuses.
    #[must_use]
    pub fn total(&self) -> u32 {
        RegistrationStatus::ALL
            .iter()
            .map(|s| self.get(*s))
            .fold(0, u32::saturating_add)
    }
}

/// Dashboard figures for one resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindSummary {
    pub kind: ResourceKind,
    pub open_resources: u32,
    pub total_resources: u32,
    pub registrations: StatusCounts,
}

impl KindSummary {
    const fn empty(kind: ResourceKind) -> Self {
        Self {
            kind,
            open_resources: 0,
            total_resources: 0,
            registrations: StatusCounts {
                pending: 0,
                waitlisted: 0,
                approved: 0,
                rejected: 0,
                cancelled: 0,
            },
        }
    }
}

/// Dashboard figures for every resource kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub kinds: Vec<KindSummary>,
}

impl DashboardSummary {
    /// Returns the summary for one kind.
    #[must_use]
    pub fn for_kind(&self, kind: ResourceKind) -> Option<&KindSummary> {
        self.kinds.iter().find(|k| k.kind == kind)
    }
}

fn to_u32(count: i64) -> Result<u32, PersistenceError> {
    count
        .to_u32()
        .ok_or_else(|| PersistenceError::DatabaseError("Count conversion failed".to_string()))
}

/// Computes the dashboard aggregates.
///
/// Every resource kind is present in the result, even with no rows.
///
/// # Errors
///
/// Returns an error if a query fails or a stored value is invalid.
pub fn dashboard_summary(conn: &mut SqliteConnection) -> Result<DashboardSummary, PersistenceError> {
    let mut kinds: Vec<KindSummary> = ResourceKind::ALL
        .iter()
        .map(|kind| KindSummary::empty(*kind))
        .collect();

    let resource_rows: Vec<(String, i32, i64)> = resources::table
        .group_by((resources::kind, resources::is_open))
        .select((resources::kind, resources::is_open, count_star()))
        .load::<(String, i32, i64)>(conn)?;

    for (kind, is_open, count) in resource_rows {
        let kind = parse_kind(&kind)?;
        let count: u32 = to_u32(count)?;
        if let Some(summary) = kinds.iter_mut().find(|k| k.kind == kind) {
            summary.total_resources = summary.total_resources.saturating_add(count);
            if is_open != 0 {
                summary.open_resources = summary.open_resources.saturating_add(count);
            }
        }
    }

    let registration_rows: Vec<(String, String, i64)> = registrations::table
        .group_by((registrations::resource_kind, registrations::status))
        .select((
            registrations::resource_kind,
            registrations::status,
            count_star(),
        ))
        .load::<(String, String, i64)>(conn)?;

    for (kind, status, count) in registration_rows {
        let kind = parse_kind(&kind)?;
        let status = parse_status(&status)?;
        if let Some(summary) = kinds.iter_mut().find(|k| k.kind == kind) {
            *summary.registrations.slot(status) = to_u32(count)?;
        }
    }

    Ok(DashboardSummary { kinds })
}
