// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lazy, restartable registration queries.
//!
//! A [`RegistrationQuery`] names the resource; each call to
//! [`RegistrationQuery::iter`] starts a fresh [`RegistrationCursor`] that
//! walks the resource's registrations in queue order, one keyset page at a
//! time. Nothing is read until the cursor is advanced.

use clubreg_domain::{Registration, ResourceRef};
use diesel::SqliteConnection;
use num_traits::ToPrimitive;
use std::collections::VecDeque;

use crate::error::PersistenceError;
use crate::queries::registrations::{QueueKey, registration_page};

/// Number of rows fetched per page unless overridden.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// A restartable query over one resource's registrations.
pub struct RegistrationQuery<'a> {
    conn: &'a mut SqliteConnection,
    resource: ResourceRef,
    page_size: i64,
}

impl<'a> RegistrationQuery<'a> {
    pub(crate) const fn new(conn: &'a mut SqliteConnection, resource: ResourceRef) -> Self {
        Self {
            conn,
            resource,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the number of rows fetched per round trip (at least one).
    #[must_use]
    pub fn with_page_size(self, page_size: i64) -> Self {
        Self {
            page_size: page_size.max(1),
            ..self
        }
    }

    /// Starts a new pass from the first registration.
    pub fn iter(&mut self) -> RegistrationCursor<'_> {
        RegistrationCursor {
            conn: self.conn,
            resource: self.resource,
            page_size: self.page_size,
            buffer: VecDeque::new(),
            last: None,
            exhausted: false,
        }
    }

    /// Runs a full pass and collects the result.
    ///
    /// # Errors
    ///
    /// Returns the first error any page produced.
    pub fn fetch_all(&mut self) -> Result<Vec<Registration>, PersistenceError> {
        self.iter().collect()
    }
}

/// One pass over a [`RegistrationQuery`].
pub struct RegistrationCursor<'q> {
    conn: &'q mut SqliteConnection,
    resource: ResourceRef,
    page_size: i64,
    buffer: VecDeque<Registration>,
    last: Option<QueueKey>,
    exhausted: bool,
}

impl RegistrationCursor<'_> {
    fn fetch_page(&mut self) -> Result<(), PersistenceError> {
        let page: Vec<Registration> =
            registration_page(self.conn, self.resource, self.last.as_ref(), self.page_size)?;

        let full_page: usize = self.page_size.to_usize().unwrap_or(usize::MAX);
        if page.len() < full_page {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.last = Some(QueueKey::of(last)?);
        }
        self.buffer.extend(page);
        Ok(())
    }
}

impl Iterator for RegistrationCursor<'_> {
    type Item = Result<Registration, PersistenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                self.buffer.clear();
                return Some(Err(err));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
