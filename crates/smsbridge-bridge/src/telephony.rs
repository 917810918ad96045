// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// TelephonyApi: the one API this bridge exposes.
//
//   TelephonyApi.readSMS()  ->  [MessageRecord]
//
// `set_up` binds the method channels on a messenger, `tear_down` unbinds
// them. `TelephonyClient` is the calling side, used by the host binary and
// by tests in place of the host runtime.

use std::sync::Arc;

use smsbridge_core::error::{Result, SmsBridgeError};
use smsbridge_core::types::MessageRecord;
use smsbridge_store::{ExecutionContext, list_messages};
use tracing::{debug, instrument};

use crate::endpoint::Endpoint;
use crate::messenger::{BinaryMessenger, ChannelConfig};
use crate::wire::{self, NoArgs};

pub const API_NAME: &str = "TelephonyApi";
pub const READ_SMS: &str = "readSMS";

/// Every method of the API, in declaration order.
pub const METHODS: [&str; 1] = [READ_SMS];

/// Callee side of the API.
pub trait TelephonyApi: Send + Sync {
    /// All inbox messages, newest first.
    fn read_sms(&self) -> Result<Vec<MessageRecord>>;
}

/// `TelephonyApi` backed by a message store.
pub struct TelephonyHandler<C> {
    context: C,
}

impl<C: ExecutionContext> TelephonyHandler<C> {
    pub fn new(context: C) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &C {
        &self.context
    }
}

impl<C: ExecutionContext + Send + Sync> TelephonyApi for TelephonyHandler<C> {
    fn read_sms(&self) -> Result<Vec<MessageRecord>> {
        list_messages(&self.context)
    }
}

/// Method table for `api`.
pub fn endpoint(api: Arc<dyn TelephonyApi>) -> Endpoint {
    let mut endpoint = Endpoint::new(API_NAME);
    endpoint.method(READ_SMS, move |_: NoArgs| api.read_sms());
    endpoint
}

/// Bind `api` on `messenger`. `None` unbinds, the same as `tear_down`.
pub fn set_up(messenger: &dyn BinaryMessenger, api: Option<Arc<dyn TelephonyApi>>, channels: &ChannelConfig) {
    match api {
        Some(api) => Arc::new(endpoint(api)).attach(messenger, channels),
        None => tear_down(messenger, channels),
    }
}

pub fn tear_down(messenger: &dyn BinaryMessenger, channels: &ChannelConfig) {
    for method in METHODS {
        messenger.set_message_handler(&channels.channel(API_NAME, method), None);
    }
    debug!(suffix = ?channels.suffix, "TelephonyApi channels unbound");
}

/// Host side of `TelephonyApi`.
pub struct TelephonyClient<'m> {
    messenger: &'m dyn BinaryMessenger,
    channels: ChannelConfig,
}

impl<'m> TelephonyClient<'m> {
    pub fn new(messenger: &'m dyn BinaryMessenger, channels: ChannelConfig) -> Self {
        Self {
            messenger,
            channels,
        }
    }

    #[instrument(skip_all, fields(suffix = ?self.channels.suffix))]
    pub fn read_sms(&self) -> Result<Vec<MessageRecord>> {
        let channel = self.channels.channel(API_NAME, READ_SMS);
        let call = wire::encode_call(Vec::new())?;
        let reply = self
            .messenger
            .send(&channel, &call)
            .ok_or(SmsBridgeError::ChannelUnavailable(channel))?;
        wire::decode_result(wire::decode_reply(&reply)?)
    }
}
