// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "smsbridge-host",
    version,
    about = "Bind TelephonyApi on an in-process messenger and call it",
    propagate_version = true
)]
pub struct Cli {
    /// JSON config file (missing file = defaults)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// SQLite snapshot to read instead of the platform store
    #[arg(long = "db", global = true)]
    pub database: Option<PathBuf>,

    /// Message channel suffix
    #[arg(long = "suffix", global = true)]
    pub suffix: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Call TelephonyApi.readSMS and print the inbox
    Read {
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// List the channels TelephonyApi binds
    Channels,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Table,
}
