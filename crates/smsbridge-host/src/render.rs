// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal output for `read`.

use chrono::{DateTime, SecondsFormat};
use smsbridge_core::error::Result;
use smsbridge_core::types::MessageRecord;

use crate::cli::Format;

const ABSENT: &str = "-";

pub fn render(records: &[MessageRecord], format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string_pretty(records)?),
        Format::Table => Ok(table(records)),
    }
}

/// Display form of a `date` field. Epoch milliseconds become RFC 3339 (UTC);
/// anything else is shown as stored.
fn display_date(date: Option<&str>) -> String {
    let Some(raw) = date else {
        return ABSENT.to_owned();
    };
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| raw.to_owned())
}

fn table(records: &[MessageRecord]) -> String {
    let rows: Vec<[String; 4]> = records
        .iter()
        .map(|r| {
            [
                display_date(r.date.as_deref()),
                r.kind.clone().unwrap_or_else(|| ABSENT.into()),
                r.address.clone().unwrap_or_else(|| ABSENT.into()),
                r.body.as_deref().unwrap_or(ABSENT).replace('\n', " "),
            ]
        })
        .collect();

    let header = ["DATE", "TYPE", "ADDRESS", "BODY"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut line = |cells: [&str; 4]| {
        // Last column is not padded.
        let padded: Vec<String> = cells[..3]
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push_str("  ");
        out.push_str(cells[3]);
        out.push('\n');
    };

    line(header);
    for row in &rows {
        line([&row[0], &row[1], &row[2], &row[3]]);
    }
    out
}
