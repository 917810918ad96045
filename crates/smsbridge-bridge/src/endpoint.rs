// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Declared method table and dispatcher.
//
// Each method is registered by name with a typed handler. Registration wraps
// the handler in decode → invoke → encode, so the table itself only deals in
// JSON values. `dispatch` always returns reply bytes: errors and panics are
// turned into failure replies and never cross the messenger.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use smsbridge_core::error::{Result, SmsBridgeError};
use tracing::{debug, error, info, info_span};
use uuid::Uuid;

use crate::failure::FailureReply;
use crate::messenger::{BinaryMessenger, ChannelConfig, MessageHandler};
use crate::wire;

type Handler = Box<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;

/// Method table for one API.
pub struct Endpoint {
    api: String,
    methods: BTreeMap<String, Handler>,
}

impl Endpoint {
    pub fn new(api: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            methods: BTreeMap::new(),
        }
    }

    pub fn api(&self) -> &str {
        &self.api
    }

    /// Register `handler` under `name`, replacing any earlier registration.
    ///
    /// `A` is decoded from the call's positional `args` array (`NoArgs` for
    /// none, a tuple for several) and `R` is encoded as the reply result.
    pub fn method<A, R, F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        A: DeserializeOwned + 'static,
        R: Serialize + 'static,
        F: Fn(A) -> Result<R> + Send + Sync + 'static,
    {
        let name = name.into();
        let wrapped: Handler = Box::new(move |args: Vec<Value>| {
            let args: A = wire::decode_args(args)?;
            let result = handler(args)?;
            wire::encode_result(&result)
        });
        if self.methods.insert(name.clone(), wrapped).is_some() {
            debug!(api = %self.api, method = %name, "replaced method handler");
        }
        self
    }

    /// Declared method names, sorted.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Channel names this endpoint binds under `channels`.
    pub fn channels(&self, channels: &ChannelConfig) -> Vec<String> {
        self.method_names()
            .map(|method| channels.channel(&self.api, method))
            .collect()
    }

    /// Run one call and produce its reply envelope.
    pub fn dispatch(&self, method: &str, payload: &[u8]) -> Vec<u8> {
        let call_id = Uuid::new_v4();
        let span = info_span!(
            "dispatch",
            %call_id,
            api = %self.api,
            method,
            payload_bytes = payload.len()
        );
        let _entered = span.enter();

        let reply = self.invoke(method, payload).and_then(wire::encode_success);
        match reply {
            Ok(bytes) => {
                info!(reply_bytes = bytes.len(), "call completed");
                bytes
            }
            Err(e) => {
                let failure = FailureReply::from_error(&e);
                error!(code = %failure.code, error = %e, "call failed");
                wire::encode_failure(&failure)
            }
        }
    }

    fn invoke(&self, method: &str, payload: &[u8]) -> Result<Value> {
        let handler = self
            .methods
            .get(method)
            .ok_or_else(|| SmsBridgeError::UnknownMethod(method.to_owned()))?;
        let args = wire::decode_call(payload)?;

        match panic::catch_unwind(AssertUnwindSafe(|| handler(args))) {
            Ok(result) => result,
            Err(panic) => Err(SmsBridgeError::HandlerPanic(panic_message(&*panic))),
        }
    }

    /// Bind one messenger channel per declared method.
    ///
    /// Attaching again (same messenger, same channels) replaces the earlier
    /// bindings.
    pub fn attach(self: &Arc<Self>, messenger: &dyn BinaryMessenger, channels: &ChannelConfig) {
        for method in self.methods.keys() {
            let endpoint = Arc::clone(self);
            let name = method.clone();
            let handler: MessageHandler =
                Arc::new(move |payload: &[u8]| endpoint.dispatch(&name, payload));
            messenger.set_message_handler(&channels.channel(&self.api, method), Some(handler));
        }
        info!(api = %self.api, methods = self.methods.len(), suffix = ?channels.suffix, "endpoint attached");
    }

    /// Unbind every channel this endpoint declares.
    pub fn detach(&self, messenger: &dyn BinaryMessenger, channels: &ChannelConfig) {
        for method in self.methods.keys() {
            messenger.set_message_handler(&channels.channel(&self.api, method), None);
        }
        info!(api = %self.api, suffix = ?channels.suffix, "endpoint detached");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
