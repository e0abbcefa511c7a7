// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::registration::Registration;
use crate::status::RegistrationStatus;

/// Returns the longest-waiting `waitlisted` registration, if any.
///
/// Earliest `submitted_at` wins; ties go to the lowest registration id.
pub fn next_waitlisted<'a, I>(registrations: I) -> Option<&'a Registration>
where
    I: IntoIterator<Item = &'a Registration>,
{
    registrations
        .into_iter()
        .filter(|r| r.status() == RegistrationStatus::Waitlisted)
        .min_by_key(|r| r.queue_key())
}
