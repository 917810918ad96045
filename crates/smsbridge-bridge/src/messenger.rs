// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Messenger shared with the host runtime, and channel addressing.
//
// The real messenger belongs to the host (on Android, the engine's binary
// messenger). `LocalMessenger` is the in-process implementation used by the
// host binary and by tests.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use smsbridge_core::BridgeConfig;

/// Handler bound to one channel: encoded call in, encoded reply out.
pub type MessageHandler = Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

/// "Send bytes, receive reply bytes" transport between two runtimes.
pub trait BinaryMessenger: Send + Sync {
    /// Bind `handler` to `channel`, replacing any earlier binding.
    /// `None` removes the binding.
    fn set_message_handler(&self, channel: &str, handler: Option<MessageHandler>);

    /// Deliver `message` on `channel` and wait for the reply.
    /// Returns `None` when nothing is bound to the channel.
    fn send(&self, channel: &str, message: &[u8]) -> Option<Vec<u8>>;
}

/// In-process messenger: a channel → handler map.
#[derive(Default)]
pub struct LocalMessenger {
    handlers: RwLock<HashMap<String, MessageHandler>>,
}

impl LocalMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channels with a bound handler, sorted.
    pub fn channels(&self) -> Vec<String> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let mut channels: Vec<String> = handlers.keys().cloned().collect();
        channels.sort();
        channels
    }

    pub fn is_bound(&self, channel: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(channel)
    }
}

impl BinaryMessenger for LocalMessenger {
    fn set_message_handler(&self, channel: &str, handler: Option<MessageHandler>) {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        match handler {
            Some(handler) => {
                handlers.insert(channel.to_owned(), handler);
            }
            None => {
                handlers.remove(channel);
            }
        }
    }

    fn send(&self, channel: &str, message: &[u8]) -> Option<Vec<u8>> {
        // Clone the handler out so the lock is not held while it runs.
        let handler = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(channel)
            .cloned()?;
        Some(handler(message))
    }
}

/// How method channels are named on a messenger.
///
/// `"{prefix}.{api}.{method}"`, followed by `".{suffix}"` when a non-empty
/// suffix is set. Suffixes let several independent endpoints share one
/// messenger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub prefix: String,
    pub suffix: Option<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::from_config(&BridgeConfig::default())
    }
}

impl ChannelConfig {
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            prefix: config.channel_prefix.clone(),
            suffix: config.message_channel_suffix.clone(),
        }
    }

    pub fn channel(&self, api: &str, method: &str) -> String {
        match self.suffix.as_deref() {
            Some(suffix) if !suffix.is_empty() => {
                format!("{}.{api}.{method}.{suffix}", self.prefix)
            }
            _ => format!("{}.{api}.{method}", self.prefix),
        }
    }
}
