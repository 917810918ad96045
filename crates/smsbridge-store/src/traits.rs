// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the message store.
//
// The store is tabular: rows addressable by named columns, split into
// partitions (inbox, sent, ...), with a caller-requested sort order. All
// access is read-only.

use smsbridge_core::error::Result;

/// Columns read for every message, in projection order.
pub const MESSAGE_COLUMNS: [&str; 4] = ["address", "body", "date", "type"];

/// Partition holding received messages.
pub const INBOX: &str = "inbox";

/// Sort order requested from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: &'static str,
    pub descending: bool,
}

impl SortOrder {
    /// SQL-style clause, e.g. `date DESC`.
    pub fn clause(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("{} {direction}", self.column)
    }
}

/// A single bounded read against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreQuery {
    pub partition: &'static str,
    pub projection: &'static [&'static str],
    pub sort_order: SortOrder,
}

impl StoreQuery {
    /// All inbox messages, newest first.
    pub fn inbox() -> Self {
        Self {
            partition: INBOX,
            projection: &MESSAGE_COLUMNS,
            sort_order: SortOrder {
                column: "date",
                descending: true,
            },
        }
    }
}

/// Opaque capability granting read access to the message store.
///
/// Acquiring the context (and any permission prompt behind it) belongs to
/// the host. Implementations never write to the store.
pub trait ExecutionContext {
    /// Open a read cursor for `query`.
    ///
    /// `Ok(None)` means the store produced no cursor at all (Android's
    /// `ContentResolver.query` returning null). `Err` means the store could
    /// not be opened or queried.
    fn query(&self, query: &StoreQuery) -> Result<Option<Box<dyn Cursor + '_>>>;

    /// Short description for log output.
    fn describe(&self) -> String;
}

impl<T: ExecutionContext + ?Sized> ExecutionContext for Box<T> {
    fn query(&self, query: &StoreQuery) -> Result<Option<Box<dyn Cursor + '_>>> {
        (**self).query(query)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Forward-only read cursor over a query result.
///
/// The cursor owns its store handle and releases it when dropped, so every
/// exit path (including an early `?` mid-iteration) closes it.
pub trait Cursor {
    /// Index of the named column, or `None` if the cursor lacks it.
    fn column_index(&self, name: &str) -> Option<usize>;

    /// Advance to the next row. Returns `false` once past the last row.
    fn move_to_next(&mut self) -> Result<bool>;

    /// Value of column `column` in the current row as text; `None` for NULL.
    fn get_string(&mut self, column: usize) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbox_query_shape() {
        let query = StoreQuery::inbox();
        assert_eq!(query.partition, "inbox");
        assert_eq!(query.projection, &["address", "body", "date", "type"]);
        assert_eq!(query.sort_order.clause(), "date DESC");
    }
}
