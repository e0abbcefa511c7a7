// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `audit` — audit event inserts
//! - `resources` — resource inserts and updates
//! - `registrations` — registration rows and their history
//! - `transitions` — writes a whole transition result
//!
//! Every function here expects to run inside the caller's transaction.

pub mod audit;
pub mod registrations;
pub mod resources;
pub mod transitions;

pub use transitions::{PersistedTransition, persist_resource_transition, persist_transition};
