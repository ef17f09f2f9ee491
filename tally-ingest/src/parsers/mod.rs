pub mod ameria_csv;
pub mod ineco_csv;
pub mod ineco_xml;
pub mod myameria_xlsx;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_core::Money;

pub use ameria_csv::AmeriaCsvParser;
pub use ineco_csv::InecoCsvParser;
pub use ineco_xml::InecoXmlParser;
pub use myameria_xlsx::MyAmeriaExcelParser;

/// Armenian banks write dates as dd/mm/yyyy.
pub const STATEMENT_DATE_FORMAT: &str = "%d/%m/%Y";

fn parse_statement_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, STATEMENT_DATE_FORMAT).with_context(|| format!("invalid date '{s}'"))
}

/// Blank cells mean zero.
fn parse_amount(s: &str) -> Result<Money> {
    let s = s.trim().trim_matches('"');
    if s.is_empty() {
        return Ok(Money::ZERO);
    }
    Money::parse(s).with_context(|| format!("invalid amount '{s}'"))
}
