// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for smsbridge.

use thiserror::Error;

/// Top-level error type for all smsbridge operations.
#[derive(Debug, Error)]
pub enum SmsBridgeError {
    // -- Store errors --
    #[error("message store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("cursor iteration failed: {0}")]
    Cursor(String),

    #[error("database error: {0}")]
    Database(String),

    // -- Wire errors --
    #[error("payload decode failed: {0}")]
    Decode(String),

    #[error("reply encode failed: {0}")]
    Encode(String),

    #[error("unsupported wire schema version: expected {expected}, got {found}")]
    UnsupportedSchema { expected: u32, found: u32 },

    #[error("no method named {0:?} is registered")]
    UnknownMethod(String),

    #[error("method handler panicked: {0}")]
    HandlerPanic(String),

    // -- Host side of the channel --
    #[error("unable to establish connection on channel {0:?}")]
    ChannelUnavailable(String),

    #[error("remote call failed ({code}): {message}")]
    Remote {
        code: String,
        message: String,
        details: Option<String>,
    },

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Ambient --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SmsBridgeError>;
