// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// smsbridge-store: Read-only access to the device message store.
//
// The adapter issues one bounded inbox query through an `ExecutionContext`
// and turns the resulting cursor into `MessageRecord`s. Back-ends:
//
//   android  ContentResolver over JNI (content://sms/inbox)
//   sqlite   read-only SQLite snapshot with an Android-shaped `sms` table
//   stub     every other target; the store is always unavailable

pub mod adapter;
pub mod sqlite;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

pub use adapter::list_messages;
pub use sqlite::SqliteContext;
pub use traits::{Cursor, ExecutionContext, SortOrder, StoreQuery};

/// Returns the execution context for the target operating system.
pub fn platform_context() -> smsbridge_core::error::Result<Box<dyn ExecutionContext + Send + Sync>> {
    #[cfg(target_os = "android")]
    {
        // Android: ContentResolver reached through the NDK-provided JavaVM.
        Ok(Box::new(android::AndroidContext::from_ndk()?))
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: no platform message store.
        Ok(Box::new(stub::StubContext))
    }
}
