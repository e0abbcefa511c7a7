// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod capacity;
mod error;
mod registration;
mod resource;
mod status;
mod timestamp;
mod validation;
mod waitlist;

#[cfg(test)]
mod tests;

pub use capacity::CapacitySnapshot;
pub use error::DomainError;
pub use registration::{Registration, RegistrationDetails};
pub use resource::{Capacity, Resource, ResourceKind, ResourceRef};
pub use status::RegistrationStatus;
pub use timestamp::{format_timestamp, normalize_timestamp, parse_timestamp};
pub use validation::{
    MAX_GROUP_MEMBERS, MAX_TITLE_LENGTH, validate_details, validate_registrant_id, validate_title,
};
pub use waitlist::next_waitlisted;
