//! Inecobank CSV statement parser
//!
//! The export is a report with a preamble; the data rows sit between the
//! column header line and the `Total` line:
//!   n/n,Number,Date,Currency,Income,Expense,Receiver/Payer Account,Receiver/Payer,Details
//!   1,A1,05/01/2024,AMD,0.00,"5,000.00",123,YANDEX,YANDEX.GO
//!   Total,,,,...

use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;
use tally_core::Transaction;

use super::{parse_amount, parse_statement_date};
use crate::text::{decode_text, section_between};
use crate::types::{FileParser, SourceKind};

pub const INECO_CSV_HEADER: &str =
    "n/n,Number,Date,Currency,Income,Expense,Receiver/Payer Account,Receiver/Payer,Details";
const TOTAL_PREFIX: &str = "Total";

#[derive(Debug, Clone, Copy, Default)]
pub struct InecoCsvParser;

impl FileParser for InecoCsvParser {
    fn kind(&self) -> SourceKind {
        SourceKind::InecoCsv
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<Transaction>> {
        let bytes = fs::read(path).with_context(|| format!("opening {}", path.display()))?;
        let text = decode_text(&bytes).with_context(|| format!("decoding {}", path.display()))?;
        parse_ineco_csv(&text).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Parse the decoded text of an Inecobank CSV statement.
pub fn parse_ineco_csv(text: &str) -> Result<Vec<Transaction>> {
    let section = section_between(text, INECO_CSV_HEADER, TOTAL_PREFIX)
        .ok_or_else(|| anyhow!("header line '{INECO_CSV_HEADER}' not found"))?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(section.as_bytes());

    let mut out = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("data row {}", i + 1))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if record.len() < 9 {
            return Err(anyhow!(
                "data row {} has {} fields, expected 9",
                i + 1,
                record.len()
            ));
        }

        let date = parse_statement_date(&record[2]).with_context(|| format!("data row {}", i + 1))?;
        let income = parse_amount(&record[4]).with_context(|| format!("data row {}", i + 1))?;
        let expense = parse_amount(&record[5]).with_context(|| format!("data row {}", i + 1))?;
        let details = record[8].trim();

        out.push(if expense.is_zero() {
            Transaction::income(date, details, income)
        } else {
            Transaction::expense(date, details, expense)
        });
    }

    tracing::debug!(rows = out.len(), "parsed Inecobank CSV statement");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::encode_utf16le_with_bom;
    use chrono::NaiveDate;
    use tally_core::Money;

    fn statement() -> String {
        [
            "INECOBANK",
            "Statement for 01/01/2024 - 31/01/2024",
            INECO_CSV_HEADER,
            r#"1,A1,05/01/2024,AMD,0.00,"5,000.00",123,YANDEX,"YANDEX.GO, ride""#,
            r#"2,A2,20/01/2024,AMD,"300,000.00",0.00,,EMPLOYER,SALARY"#,
            "",
            "Total,,,,300000.00,5000.00,,,",
            "Closing balance,305000.00",
        ]
        .join("\n")
    }

    #[test]
    fn test_parse_rows_between_header_and_total() {
        let txns = parse_ineco_csv(&statement()).unwrap();
        assert_eq!(txns.len(), 2);

        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert!(txns[0].is_expense);
        assert_eq!(txns[0].amount, Money::from_minor(500_000));
        assert_eq!(txns[0].details, "YANDEX.GO, ride");

        assert!(txns[1].is_income());
        assert_eq!(txns[1].amount, Money::from_minor(30_000_000));
    }

    #[test]
    fn test_missing_header() {
        let err = parse_ineco_csv("no data here\n").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_utf16_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Statement 123.csv");
        std::fs::write(&path, encode_utf16le_with_bom(&statement())).unwrap();
        let txns = InecoCsvParser.parse_file(&path).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[1].details, "SALARY");
    }

    #[test]
    fn test_bad_amount_reports_row() {
        let text = statement().replace("\"5,000.00\"", "five");
        let err = parse_ineco_csv(&text).unwrap_err();
        assert!(err.to_string().contains("data row 1"));
    }
}
