// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// smsbridge-bridge: Typed method calls across a runtime boundary.
//
// A host runtime and this library share a `BinaryMessenger`. Each declared
// method gets its own channel; a call arrives as a versioned JSON envelope,
// is dispatched by method name to a typed handler, and the result (or a
// structured failure) goes back as a reply envelope.

pub mod endpoint;
pub mod failure;
pub mod messenger;
pub mod telephony;
pub mod wire;

pub use endpoint::Endpoint;
pub use failure::FailureReply;
pub use messenger::{BinaryMessenger, ChannelConfig, LocalMessenger, MessageHandler};
pub use telephony::{TelephonyApi, TelephonyClient, TelephonyHandler};
pub use wire::{NoArgs, SCHEMA_VERSION};
