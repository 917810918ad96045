// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub context for desktop/CI builds where no platform message store exists.
//
// Every query reports `PlatformUnavailable`, which the adapter absorbs into
// an empty inbox. The real implementation lives in the `android` module.

use smsbridge_core::error::{Result, SmsBridgeError};

use crate::traits::{Cursor, ExecutionContext, StoreQuery};

/// Context returned by `platform_context()` on non-Android targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubContext;

impl ExecutionContext for StubContext {
    fn query(&self, _query: &StoreQuery) -> Result<Option<Box<dyn Cursor + '_>>> {
        tracing::warn!("ExecutionContext::query called on stub context");
        Err(SmsBridgeError::PlatformUnavailable)
    }

    fn describe(&self) -> String {
        "Desktop (stub)".into()
    }
}
