// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// smsbridge-host: stands in for the host runtime.
//
// Entry point. Loads config, initialises logging, binds TelephonyApi on an
// in-process messenger and calls it the way the host would.

mod cli;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use smsbridge_bridge::telephony::{self, API_NAME, METHODS};
use smsbridge_bridge::{ChannelConfig, LocalMessenger, TelephonyClient, TelephonyHandler};
use smsbridge_core::BridgeConfig;
use smsbridge_core::error::Result;
use smsbridge_store::{ExecutionContext, SqliteContext};

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("smsbridge-host: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    tracing::info!("smsbridge-host starting");

    match run(&cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("smsbridge-host: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Config file (if any), then command-line overrides.
fn load_config(cli: &Cli) -> Result<BridgeConfig> {
    let mut config = match &cli.config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(database) = &cli.database {
        config.database_path = Some(database.clone());
    }
    if let Some(suffix) = &cli.suffix {
        config.message_channel_suffix = Some(suffix.clone());
    }
    Ok(config)
}

fn store(config: &BridgeConfig) -> Result<Box<dyn ExecutionContext + Send + Sync>> {
    match &config.database_path {
        Some(path) => Ok(Box::new(SqliteContext::new(path))),
        None => smsbridge_store::platform_context(),
    }
}

fn run(command: &Command, config: &BridgeConfig) -> Result<()> {
    let channels = ChannelConfig::from_config(config);

    match command {
        Command::Read { format } => {
            let context = store(config)?;
            tracing::info!(store = %context.describe(), "using message store");

            let messenger = LocalMessenger::new();
            telephony::set_up(&messenger, Some(Arc::new(TelephonyHandler::new(context))), &channels);

            let records = TelephonyClient::new(&messenger, channels.clone()).read_sms();
            telephony::tear_down(&messenger, &channels);

            let records = records?;
            tracing::info!(count = records.len(), "inbox read");
            print!("{}", render::render(&records, *format)?);
            if *format == cli::Format::Json {
                println!();
            }
        }
        Command::Channels => {
            for method in METHODS {
                println!("{}", channels.channel(API_NAME, method));
            }
        }
    }
    Ok(())
}
