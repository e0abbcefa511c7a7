// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `resources` — resource lookups and listings
//! - `registrations` — registration lookups, state loading, keyset pages, history
//! - `audit` — audit events and timelines
//! - `dashboard` — aggregate counts

pub mod audit;
pub mod dashboard;
pub mod registrations;
pub mod resources;
