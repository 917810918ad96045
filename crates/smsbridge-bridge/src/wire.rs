// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire envelopes, schema version 1.
//
//   call     {"v": 1, "args": [ ... ]}
//   success  {"v": 1, "result": <value>}
//   failure  {"v": 1, "error": {"code": "...", "message": "...", "details": null}}
//
// Decoding is lenient about absence: an empty call payload, a missing `args`
// or a missing `v` all mean "current version, no arguments". A `v` that is
// present and different is rejected.

use std::fmt;

use serde::de::{self, DeserializeOwned, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use smsbridge_core::error::{Result, SmsBridgeError};

use crate::failure::FailureReply;

/// Version stamped on every envelope this crate writes.
pub const SCHEMA_VERSION: u32 = 1;

fn current_version() -> u32 {
    SCHEMA_VERSION
}

fn check_version(found: u32) -> Result<()> {
    if found == SCHEMA_VERSION {
        Ok(())
    } else {
        Err(SmsBridgeError::UnsupportedSchema {
            expected: SCHEMA_VERSION,
            found,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CallEnvelope {
    #[serde(default = "current_version")]
    v: u32,
    #[serde(default)]
    args: Vec<Value>,
}

/// Keeps `"result": null` distinct from a missing `result`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, Deserialize)]
struct ReplyEnvelope {
    #[serde(default = "current_version")]
    v: u32,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<FailureReply>,
}

/// Argument shape of a method that takes no arguments.
///
/// Decodes from `[]` or `null`; any argument is a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NoArgs;

impl<'de> Deserialize<'de> for NoArgs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct NoArgsVisitor;

        impl<'de> Visitor<'de> for NoArgsVisitor {
            type Value = NoArgs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an empty argument list")
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<NoArgs, E> {
                Ok(NoArgs)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<NoArgs, A::Error> {
                if seq.next_element::<IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(1, &self));
                }
                Ok(NoArgs)
            }
        }

        deserializer.deserialize_any(NoArgsVisitor)
    }
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// Encode a call carrying `args`.
pub fn encode_call(args: Vec<Value>) -> Result<Vec<u8>> {
    serde_json::to_vec(&CallEnvelope {
        v: SCHEMA_VERSION,
        args,
    })
    .map_err(|e| SmsBridgeError::Encode(format!("call envelope: {e}")))
}

/// Decode a call payload into its argument list.
pub fn decode_call(payload: &[u8]) -> Result<Vec<Value>> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let envelope: CallEnvelope = serde_json::from_slice(payload)
        .map_err(|e| SmsBridgeError::Decode(format!("call envelope: {e}")))?;
    check_version(envelope.v)?;
    Ok(envelope.args)
}

/// Decode an argument list into a method's declared argument shape.
pub fn decode_args<A: DeserializeOwned>(args: Vec<Value>) -> Result<A> {
    serde_json::from_value(Value::Array(args))
        .map_err(|e| SmsBridgeError::Decode(format!("arguments: {e}")))
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// Encode a typed success value.
pub fn encode_result<R: Serialize>(result: &R) -> Result<Value> {
    serde_json::to_value(result).map_err(|e| SmsBridgeError::Encode(format!("result: {e}")))
}

pub fn encode_success(result: Value) -> Result<Vec<u8>> {
    serde_json::to_vec(&ReplyEnvelope {
        v: SCHEMA_VERSION,
        result: Some(result),
        error: None,
    })
    .map_err(|e| SmsBridgeError::Encode(format!("reply envelope: {e}")))
}

/// Encode a failure reply. Never fails: if serialization itself breaks, a
/// fixed `encode-failure` envelope is returned instead.
pub fn encode_failure(failure: &FailureReply) -> Vec<u8> {
    serde_json::to_vec(&ReplyEnvelope {
        v: SCHEMA_VERSION,
        result: None,
        error: Some(failure.clone()),
    })
    .unwrap_or_else(|_| {
        br#"{"v":1,"error":{"code":"encode-failure","message":"failure reply could not be encoded","details":null}}"#
            .to_vec()
    })
}

/// Decode a reply payload. A failure reply becomes `SmsBridgeError::Remote`.
pub fn decode_reply(payload: &[u8]) -> Result<Value> {
    let envelope: ReplyEnvelope = serde_json::from_slice(payload)
        .map_err(|e| SmsBridgeError::Decode(format!("reply envelope: {e}")))?;
    check_version(envelope.v)?;
    match (envelope.error, envelope.result) {
        (Some(failure), _) => Err(failure.into()),
        (None, Some(result)) => Ok(result),
        (None, None) => Err(SmsBridgeError::Decode(
            "reply envelope carries neither result nor error".into(),
        )),
    }
}

/// Decode a success value into the method's declared return type.
pub fn decode_result<R: DeserializeOwned>(result: Value) -> Result<R> {
    serde_json::from_value(result).map_err(|e| SmsBridgeError::Decode(format!("result: {e}")))
}
