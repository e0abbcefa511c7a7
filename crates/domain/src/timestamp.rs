// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Timestamp normalization and text encoding.
//!
//! Timestamps are stored as fixed-width UTC text with microsecond precision,
//! so lexical order equals chronological order in the database.

use crate::error::DomainError;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z"
);

/// Converts a timestamp to UTC and truncates it to microsecond precision.
///
/// # Errors
///
/// Returns an error if the truncated value cannot be represented.
pub fn normalize_timestamp(at: OffsetDateTime) -> Result<OffsetDateTime, DomainError> {
    let utc: OffsetDateTime = at.to_offset(UtcOffset::UTC);
    utc.replace_microsecond(utc.microsecond())
        .map_err(|e| DomainError::InvalidTimestamp {
            value: utc.to_string(),
            error: e.to_string(),
        })
}

/// Formats a timestamp in the storage representation.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted.
pub fn format_timestamp(at: OffsetDateTime) -> Result<String, DomainError> {
    let normalized: OffsetDateTime = normalize_timestamp(at)?;
    normalized
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: normalized.to_string(),
            error: e.to_string(),
        })
}

/// Parses a timestamp from the storage representation.
///
/// # Errors
///
/// Returns an error if the string is not in the storage representation.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: value.to_string(),
            error: e.to_string(),
        })
}
