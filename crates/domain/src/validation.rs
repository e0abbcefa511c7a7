// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::registration::RegistrationDetails;

/// Maximum length of a resource title, in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum number of group members on one registration.
pub const MAX_GROUP_MEMBERS: usize = 50;

/// Maximum length of a free-text field, in characters.
const MAX_FIELD_LENGTH: usize = 200;

/// Maximum length of an extra field key, in characters.
const MAX_EXTRA_KEY_LENGTH: usize = 64;

/// Validates and normalizes a resource title.
///
/// # Returns
///
/// The trimmed title.
///
/// # Errors
///
/// Returns an error if the title is blank or longer than
/// [`MAX_TITLE_LENGTH`] characters.
pub fn validate_title(title: &str) -> Result<String, DomainError> {
    let trimmed: &str = title.trim();

    if trimmed.is_empty() {
        return Err(DomainError::InvalidTitle(String::from(
            "Title cannot be empty",
        )));
    }

    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(DomainError::InvalidTitle(format!(
            "Title cannot exceed {MAX_TITLE_LENGTH} characters"
        )));
    }

    Ok(trimmed.to_string())
}

/// Validates a registrant identifier.
///
/// # Errors
///
/// Returns an error if the id is not positive.
pub const fn validate_registrant_id(registrant_id: i64) -> Result<(), DomainError> {
    if registrant_id <= 0 {
        return Err(DomainError::InvalidRegistrantId(registrant_id));
    }
    Ok(())
}

/// Validates the display payload of a registration.
///
/// Only shape is checked; the contents are never interpreted.
///
/// # Errors
///
/// Returns an error if:
/// - A text field is blank or too long
/// - The contact email has no `@`
/// - There are too many group members
/// - An extra field has a blank or oversized key
pub fn validate_details(details: &RegistrationDetails) -> Result<(), DomainError> {
    if let Some(name) = &details.participant_name {
        validate_text_field("participant_name", name)?;
    }

    if let Some(email) = &details.contact_email {
        validate_text_field("contact_email", email)?;
        if !email.contains('@') {
            return Err(DomainError::InvalidDetails(format!(
                "contact_email '{email}' is not an email address"
            )));
        }
    }

    if details.group_members.len() > MAX_GROUP_MEMBERS {
        return Err(DomainError::InvalidDetails(format!(
            "At most {MAX_GROUP_MEMBERS} group members are allowed"
        )));
    }
    for member in &details.group_members {
        validate_text_field("group_members", member)?;
    }

    for key in details.extra.keys() {
        if key.trim().is_empty() || key.chars().count() > MAX_EXTRA_KEY_LENGTH {
            return Err(DomainError::InvalidDetails(format!(
                "Extra field keys must be 1 to {MAX_EXTRA_KEY_LENGTH} characters"
            )));
        }
    }

    Ok(())
}

fn validate_text_field(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::InvalidDetails(format!(
            "{field} cannot be blank"
        )));
    }
    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(DomainError::InvalidDetails(format!(
            "{field} cannot exceed {MAX_FIELD_LENGTH} characters"
        )));
    }
    Ok(())
}
