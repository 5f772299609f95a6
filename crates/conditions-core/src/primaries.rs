//! Iteration over primary (locally stored) conditions

use crate::entry::ConditionEntry;
use std::collections::btree_map;
use std::iter::FusedIterator;

/// Lazy iterator over stored `(key, value)` pairs in ascending key order
///
/// Derived rows are skipped. The iterator parks on the next primary row as
/// soon as it is created or advanced and copies that row's value at that
/// moment, so [`Primaries::peek`] and the next call to `next` agree.
///
/// Two iterators compare equal when they are parked on the same row; the
/// copied values take no part in the comparison.
#[derive(Debug, Clone)]
pub struct Primaries<'a> {
    rows: Option<btree_map::Range<'a, String, ConditionEntry>>,
    current: Option<(&'a str, i64)>,
}

impl<'a> Primaries<'a> {
    pub(crate) fn new(rows: btree_map::Range<'a, String, ConditionEntry>) -> Self {
        let mut primaries = Self {
            rows: Some(rows),
            current: None,
        };
        primaries.advance();
        primaries
    }

    /// An iterator parked past the last row
    pub(crate) fn end() -> Self {
        Self {
            rows: None,
            current: None,
        }
    }

    fn advance(&mut self) {
        self.current = self.rows.as_mut().and_then(|rows| {
            rows.find_map(|(key, entry)| entry.as_local().map(|value| (key.as_str(), value)))
        });
    }

    /// The key of the row this iterator is parked on, `None` at the end
    pub fn position(&self) -> Option<&'a str> {
        self.current.map(|(key, _)| key)
    }

    /// The pair the next call to `next` will yield
    pub fn peek(&self) -> Option<(&'a str, i64)> {
        self.current
    }

    /// Check if the iterator has no more pairs
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }
}

impl<'a> Iterator for Primaries<'a> {
    type Item = (&'a str, i64);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.current.take()?;
        self.advance();
        Some(item)
    }
}

impl FusedIterator for Primaries<'_> {}

impl PartialEq for Primaries<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.position() == other.position()
    }
}

impl Eq for Primaries<'_> {}
