use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tally_core::Transaction;

/// Supported statement export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    InecoXml,
    InecoCsv,
    AmeriaCsv,
    #[serde(rename = "myameria-xlsx")]
    MyAmeriaXlsx,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::InecoXml,
        SourceKind::InecoCsv,
        SourceKind::AmeriaCsv,
        SourceKind::MyAmeriaXlsx,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::InecoXml => "ineco-xml",
            Self::InecoCsv => "ineco-csv",
            Self::AmeriaCsv => "ameria-csv",
            Self::MyAmeriaXlsx => "myameria-xlsx",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::InecoXml => "Inecobank XML statement",
            Self::InecoCsv => "Inecobank CSV statement",
            Self::AmeriaCsv => "Ameriabank CSV statement",
            Self::MyAmeriaXlsx => "MyAmeria history workbook",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.key() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown source kind '{s}'"))
    }
}

/// Capability shared by all bank-specific parsers: turn one exported file
/// into normalized transactions.
pub trait FileParser {
    fn kind(&self) -> SourceKind;

    fn parse_file(&self, path: &Path) -> Result<Vec<Transaction>>;
}
