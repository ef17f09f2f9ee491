//! MyAmeria transaction history workbook parser.
//!
//! The first sheet starts with a few lines of account info, then a header row
//! with Armenian column titles, then one row per transaction until the first
//! row whose date cell is empty. The export has no direction column, so
//! income is recognised by the beneficiary account (one of the owner's own
//! accounts) or by configured substrings of the details.

use anyhow::{Context, Result, anyhow};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate};
use std::path::Path;
use tally_core::{Money, Transaction};

use super::{parse_amount, parse_statement_date};
use crate::types::{FileParser, SourceKind};

pub const MYAMERIA_HEADERS: [&str; 11] = [
    "Ամսաթիվ",
    "Փաստ N",
    "ԳՏ",
    "Ելքագրվող հաշիվ",
    "Շահառուի հաշիվ",
    "Վճարող/Շահառու",
    "Մանրամասներ",
    "Կարգավիճակ",
    "Մեկնաբանություն",
    "Գումար",
    "Արժույթ",
];

/// Give up looking for the header after this many rows.
const HEADER_SEARCH_ROWS: usize = 15;

const COL_DATE: usize = 0;
const COL_BENEFICIARY_ACCOUNT: usize = 4;
const COL_DETAILS: usize = 6;
const COL_AMOUNT: usize = 9;

/// Workbook cell reduced to what the parser cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format(super::STATEMENT_DATE_FORMAT).to_string(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn date(&self) -> Result<NaiveDate> {
        match self {
            Cell::Date(d) => Ok(*d),
            Cell::Number(serial) => excel_serial_to_date(*serial)
                .ok_or_else(|| anyhow!("invalid date serial {serial}")),
            other => parse_statement_date(&other.text()),
        }
    }

    fn amount(&self) -> Result<Money> {
        match self {
            Cell::Number(n) => Money::parse(&format!("{n:.2}")).with_context(|| format!("invalid amount {n}")),
            other => parse_amount(&other.text()),
        }
    }
}

/// Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.trunc() as i64))
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).map_or(Cell::Empty, Cell::Date),
        other => Cell::Text(other.to_string()),
    }
}

/// Direction rules for MyAmeria rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MyAmeriaExcelParser {
    /// Own account numbers; a row paying into one of them is income
    pub my_accounts: Vec<String>,
    /// Used only when `my_accounts` is empty: details containing one of these are income
    pub income_substrings: Vec<String>,
}

impl MyAmeriaExcelParser {
    pub fn new(my_accounts: Vec<String>, income_substrings: Vec<String>) -> Self {
        Self {
            my_accounts,
            income_substrings,
        }
    }

    fn is_expense(&self, beneficiary_account: &str, details: &str) -> bool {
        if !self.my_accounts.is_empty() {
            return !self.my_accounts.iter().any(|a| a == beneficiary_account);
        }
        if !self.income_substrings.is_empty() {
            return !self.income_substrings.iter().any(|s| details.contains(s.as_str()));
        }
        true
    }

    /// Parse already-extracted sheet rows.
    pub fn parse_rows(&self, rows: &[Vec<Cell>]) -> Result<Vec<Transaction>> {
        let header_at = rows
            .iter()
            .take(HEADER_SEARCH_ROWS + 1)
            .position(|row| {
                row.len() >= MYAMERIA_HEADERS.len()
                    && MYAMERIA_HEADERS
                        .iter()
                        .zip(row)
                        .all(|(header, cell)| cell.text() == *header)
            })
            .ok_or_else(|| {
                anyhow!(
                    "after scanning {} rows can't find headers {:?}",
                    HEADER_SEARCH_ROWS.min(rows.len()),
                    MYAMERIA_HEADERS
                )
            })?;

        let mut out = Vec::new();
        for (i, row) in rows.iter().enumerate().skip(header_at + 1) {
            if row.len() < MYAMERIA_HEADERS.len() || row[COL_DATE].is_empty() {
                break;
            }

            let date = row[COL_DATE]
                .date()
                .with_context(|| format!("failed to parse date from 1st cell of row {}", i + 1))?;
            let amount = row[COL_AMOUNT]
                .amount()
                .with_context(|| format!("failed to parse amount from 10th cell of row {}", i + 1))?;
            let details = row[COL_DETAILS].text();
            let is_expense = self.is_expense(&row[COL_BENEFICIARY_ACCOUNT].text(), &details);

            out.push(Transaction::new(date, details, is_expense, amount));
        }
        Ok(out)
    }
}

impl FileParser for MyAmeriaExcelParser {
    fn kind(&self) -> SourceKind {
        SourceKind::MyAmeriaXlsx
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<Transaction>> {
        let mut workbook =
            open_workbook_auto(path).with_context(|| format!("opening {}", path.display()))?;
        let sheets = workbook.sheet_names();
        let first = sheets
            .first()
            .cloned()
            .ok_or_else(|| anyhow!("{}: workbook has no sheets", path.display()))?;
        tracing::debug!(
            file = %path.display(),
            sheet = %first,
            sheets = sheets.len(),
            "parsing first sheet"
        );

        let range = workbook
            .worksheet_range(&first)
            .with_context(|| format!("{}: reading sheet '{first}'", path.display()))?;
        let rows: Vec<Vec<Cell>> = range.rows().map(|r| r.iter().map(to_cell).collect()).collect();

        self.parse_rows(&rows)
            .with_context(|| format!("parsing {}", path.display()))
    }
}
