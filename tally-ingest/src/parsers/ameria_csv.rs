//! Ameriabank business CSV parser
//!
//! UTF-16 tab-separated export with a single header row:
//!   Date  Transaction Type  Doc.No.  Account  Credit  Debit  Remitter/Beneficiary  Details

use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::path::Path;
use tally_core::Transaction;

use super::{parse_amount, parse_statement_date};
use crate::text::decode_text;
use crate::types::{FileParser, SourceKind};

pub const AMERIA_CSV_HEADERS: [&str; 8] = [
    "Date",
    "Transaction Type",
    "Doc.No.",
    "Account",
    "Credit",
    "Debit",
    "Remitter/Beneficiary",
    "Details",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct AmeriaCsvParser;

impl FileParser for AmeriaCsvParser {
    fn kind(&self) -> SourceKind {
        SourceKind::AmeriaCsv
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<Transaction>> {
        let bytes = fs::read(path).with_context(|| format!("opening {}", path.display()))?;
        let text = decode_text(&bytes).with_context(|| format!("decoding {}", path.display()))?;
        parse_ameria_csv(&text).with_context(|| format!("parsing {}", path.display()))
    }
}

fn clean(field: &str) -> &str {
    field.trim_start_matches('\u{feff}').trim().trim_matches('"').trim()
}

/// Parse the decoded text of an Ameriabank CSV export.
pub fn parse_ameria_csv(text: &str) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());
    let mut records = rdr.records();

    let header = records
        .next()
        .ok_or_else(|| anyhow!("empty file"))?
        .context("failed to read header")?;
    for (i, expected) in AMERIA_CSV_HEADERS.iter().enumerate() {
        let got = header.get(i).map(clean).unwrap_or("");
        if got != *expected {
            bail!("unexpected header: got '{got}', want '{expected}'");
        }
    }

    let mut out = Vec::new();
    for (i, result) in records.enumerate() {
        let row = i + 2;
        let record = result.with_context(|| format!("row {row}"))?;
        if record.len() < AMERIA_CSV_HEADERS.len() {
            if record.iter().all(|f| clean(f).is_empty()) {
                continue;
            }
            tracing::debug!(row, fields = record.len(), "short row, stopping");
            break;
        }
        let field = |idx: usize| clean(&record[idx]);

        let date = parse_statement_date(field(0)).with_context(|| format!("row {row}"))?;
        let credit = parse_amount(field(4)).with_context(|| format!("row {row}: credit"))?;
        let debit = parse_amount(field(5)).with_context(|| format!("row {row}: debit"))?;
        let details = field(7);

        out.push(if credit.is_zero() {
            Transaction::expense(date, details, debit)
        } else {
            Transaction::income(date, details, credit)
        });
    }

    tracing::debug!(rows = out.len(), "parsed Ameriabank CSV export");
    Ok(out)
}
