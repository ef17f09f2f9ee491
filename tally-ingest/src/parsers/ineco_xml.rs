//! Inecobank XML statement parser
//!
//! Expected layout:
//!   <Statement>
//!     <Client>..</Client> <AccountNumber>..</AccountNumber> <Currency>..</Currency>
//!     <Period>..</Period> <Openingbalance>..</Openingbalance> <Closingbalance>..</Closingbalance>
//!     <Operations>
//!       <Operation>
//!         <n-n>1</n-n> <Number>..</Number> <Date>05/01/2024</Date> <Currency>AMD</Currency>
//!         <Income>0.00</Income> <Expense>5,000.00</Expense>
//!         <Receiver-PayerAccount>..</Receiver-PayerAccount> <Receiver-Payer>..</Receiver-Payer>
//!         <Details>YANDEX.GO</Details>
//!       </Operation>
//!     </Operations>
//!   </Statement>

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tally_core::Transaction;

use super::{parse_amount, parse_statement_date};
use crate::text::decode_text;
use crate::types::{FileParser, SourceKind};

/// Header fields are required even though only the operations are used.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Statement {
    client: String,
    account_number: String,
    currency: String,
    period: String,
    #[serde(rename = "Openingbalance")]
    opening_balance: String,
    #[serde(rename = "Closingbalance")]
    closing_balance: String,
    operations: Operations,
}

#[derive(Debug, Deserialize)]
struct Operations {
    #[serde(rename = "Operation", default)]
    operations: Vec<Operation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Operation {
    date: String,
    income: String,
    expense: String,
    details: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InecoXmlParser;

impl FileParser for InecoXmlParser {
    fn kind(&self) -> SourceKind {
        SourceKind::InecoXml
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<Transaction>> {
        let bytes = fs::read(path).with_context(|| format!("opening {}", path.display()))?;
        let text = decode_text(&bytes).with_context(|| format!("decoding {}", path.display()))?;
        parse_ineco_xml(&text).with_context(|| format!("parsing {}", path.display()))
    }
}

/// Parse the text of an Inecobank XML statement.
pub fn parse_ineco_xml(text: &str) -> Result<Vec<Transaction>> {
    if !text.contains("<Statement") {
        bail!("missing <Statement> element");
    }
    let statement: Statement =
        quick_xml::de::from_str(text).map_err(|e| anyhow!("malformed statement: {e}"))?;
    tracing::debug!(
        client = %statement.client.trim(),
        account = %statement.account_number.trim(),
        currency = %statement.currency.trim(),
        period = %statement.period.trim(),
        opening = %statement.opening_balance.trim(),
        closing = %statement.closing_balance.trim(),
        "Inecobank XML statement header"
    );

    let mut out = Vec::with_capacity(statement.operations.operations.len());
    for (i, op) in statement.operations.operations.into_iter().enumerate() {
        let date = parse_statement_date(&op.date).with_context(|| format!("operation {}", i + 1))?;
        let income = parse_amount(&op.income).with_context(|| format!("operation {}", i + 1))?;
        let expense = parse_amount(&op.expense).with_context(|| format!("operation {}", i + 1))?;
        let details = op.details.trim();

        out.push(if income.is_positive() {
            Transaction::income(date, details, income)
        } else {
            Transaction::expense(date, details, expense)
        });
    }

    tracing::debug!(operations = out.len(), "parsed Inecobank XML statement");
    Ok(out)
}
