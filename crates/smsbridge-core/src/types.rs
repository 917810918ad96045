// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for smsbridge.

use serde::{Deserialize, Serialize};

/// One message read from the device message store.
///
/// Every field mirrors a store column and is `None` when the store has no
/// value for it. Nothing is defaulted: an absent address stays absent, it is
/// never turned into an empty string.
///
/// `date` and `kind` are kept as the store's own text representation. On
/// Android `date` is epoch milliseconds and `kind` is the numeric
/// `Telephony.TextBasedSmsColumns.TYPE` code, but neither is parsed here.
///
/// Wire field order is `address`, `body`, `date`, `type` and is part of the
/// schema.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl MessageRecord {
    pub fn new(
        address: Option<String>,
        body: Option<String>,
        date: Option<String>,
        kind: Option<String>,
    ) -> Self {
        Self {
            address,
            body,
            date,
            kind,
        }
    }

    /// True when the store supplied none of the four columns.
    pub fn is_empty(&self) -> bool {
        self.address.is_none() && self.body.is_none() && self.date.is_none() && self.kind.is_none()
    }
}
