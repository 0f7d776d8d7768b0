//! CSV bounce report.
//!
//! One row per bounce. Rows for unrecognized reasons carry two extra
//! columns with the message headers and body, and the same context is
//! echoed to a separate diagnostic stream so new rules can be written.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::model::bounce::{BounceRecord, FailureReason};

/// Column names of the report.
pub const REPORT_COLUMNS: [&str; 4] = [
    "Email",
    "Failure Reason",
    "Headers (for debugging)",
    "Body (for debugging)",
];

/// Banner that precedes each unknown bounce on the diagnostic stream.
pub const UNKNOWN_BANNER: &str = "=== UNKNOWN ERROR, DETAILS: ===";

/// Per-reason totals of one report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub by_reason: BTreeMap<FailureReason, usize>,
    /// Records for which no recipient address could be recovered.
    pub without_address: usize,
}

impl ReportSummary {
    fn record(&mut self, record: &BounceRecord) {
        self.total += 1;
        *self.by_reason.entry(record.reason).or_default() += 1;
        if record.address.is_none() {
            self.without_address += 1;
        }
    }

    pub fn count(&self, reason: FailureReason) -> usize {
        self.by_reason.get(&reason).copied().unwrap_or(0)
    }
}

/// Streams [`BounceRecord`]s as CSV (RFC 4180, CRLF line endings).
pub struct ReportWriter<W: Write, D: Write> {
    out: W,
    diagnostics: Option<D>,
    summary: ReportSummary,
}

impl<W: Write, D: Write> ReportWriter<W, D> {
    /// `diagnostics` receives the full context of every `Unknown` bounce; pass
    /// `None` to keep it only in the CSV.
    pub fn new(out: W, diagnostics: Option<D>) -> Self {
        Self {
            out,
            diagnostics,
            summary: ReportSummary::default(),
        }
    }

    /// Write the column header row.
    pub fn write_header(&mut self) -> Result<()> {
        write_row(&mut self.out, &REPORT_COLUMNS)
    }

    /// Write one record.
    pub fn write_record(&mut self, record: &BounceRecord) -> Result<()> {
        self.summary.record(record);
        let address = record.address.as_deref().unwrap_or("");

        match &record.diagnostics {
            Some(diag) => {
                if let Some(d) = self.diagnostics.as_mut() {
                    writeln!(d, "{UNKNOWN_BANNER}")?;
                    writeln!(d, "{}", diag.headers)?;
                    writeln!(d, "{}", diag.body)?;
                }
                write_row(
                    &mut self.out,
                    &[
                        address,
                        record.reason.label(),
                        diag.headers.as_str(),
                        diag.body.as_str(),
                    ],
                )
            }
            None => write_row(&mut self.out, &[address, record.reason.label()]),
        }
    }

    /// Totals so far.
    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    /// Flush both streams and return the totals.
    pub fn finish(mut self) -> Result<ReportSummary> {
        self.out.flush()?;
        if let Some(d) = self.diagnostics.as_mut() {
            d.flush()?;
        }
        Ok(self.summary)
    }
}

fn write_row(out: &mut impl Write, fields: &[&str]) -> Result<()> {
    let row = fields
        .iter()
        .map(|f| csv_escape(f))
        .collect::<Vec<_>>()
        .join(",");
    write!(out, "{row}\r\n")?;
    Ok(())
}

/// Escape a value for CSV (RFC 4180).
///
/// Wraps in double quotes if the value contains commas, quotes, or newlines.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
