// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use time::OffsetDateTime;
use time::macros::datetime;

use crate::{Registration, RegistrationDetails, RegistrationStatus, ResourceKind, ResourceRef};

pub fn test_resource() -> ResourceRef {
    ResourceRef::new(ResourceKind::Competition, 1)
}

pub fn base_time() -> OffsetDateTime {
    datetime!(2026-02-01 12:00:00 UTC)
}

/// Builds a persisted registration submitted `offset_secs` after the base time.
pub fn registration(
    id: i64,
    registrant_id: i64,
    status: RegistrationStatus,
    offset_secs: i64,
) -> Registration {
    Registration::restore(
        id,
        test_resource(),
        registrant_id,
        status,
        base_time() + time::Duration::seconds(offset_secs),
        None,
        RegistrationDetails::default(),
    )
}
