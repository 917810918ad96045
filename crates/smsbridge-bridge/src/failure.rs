// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structured failure replies.
//
// Every error that reaches the dispatcher is reported to the caller as a
// `{code, message, details}` triple instead of crossing the boundary as a
// fault. Codes are stable strings; the host matches on them.

use serde::{Deserialize, Serialize};
use smsbridge_core::error::SmsBridgeError;

/// Failure payload of a reply envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReply {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
}

/// Stable wire code for an error.
pub fn error_code(err: &SmsBridgeError) -> &'static str {
    match err {
        SmsBridgeError::StoreUnavailable(_) => "store-unavailable",
        SmsBridgeError::Cursor(_) => "cursor-failure",
        SmsBridgeError::Database(_) => "store-failure",
        SmsBridgeError::Decode(_) | SmsBridgeError::UnsupportedSchema { .. } => "decode-failure",
        SmsBridgeError::Encode(_) | SmsBridgeError::Serialization(_) => "encode-failure",
        SmsBridgeError::UnknownMethod(_) => "unknown-method",
        SmsBridgeError::HandlerPanic(_) => "handler-panic",
        SmsBridgeError::ChannelUnavailable(_) => "channel-error",
        SmsBridgeError::Remote { .. } => "remote-failure",
        SmsBridgeError::Bridge(_) => "bridge-failure",
        SmsBridgeError::PlatformUnavailable => "platform-unavailable",
        SmsBridgeError::Io(_) => "io-failure",
    }
}

impl FailureReply {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Build the reply for `err`. A relayed remote failure keeps its own code.
    pub fn from_error(err: &SmsBridgeError) -> Self {
        if let SmsBridgeError::Remote {
            code,
            message,
            details,
        } = err
        {
            return Self {
                code: code.clone(),
                message: message.clone(),
                details: details.clone(),
            };
        }

        Self {
            code: error_code(err).to_owned(),
            message: err.to_string(),
            details: source_chain(err),
        }
    }
}

impl From<FailureReply> for SmsBridgeError {
    fn from(reply: FailureReply) -> Self {
        SmsBridgeError::Remote {
            code: reply.code,
            message: reply.message,
            details: reply.details,
        }
    }
}

/// `Caused by` chain of an error, if it has one.
fn source_chain(err: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    if causes.is_empty() {
        None
    } else {
        Some(format!("Caused by: {}", causes.join(": ")))
    }
}
