//! tally-ingest: bank statement readers producing normalized transactions.

pub mod files;
pub mod parsers;
pub mod text;
pub mod types;

use std::path::{Path, PathBuf};
use tally_core::Transaction;

pub use files::{expand_all, expand_pattern};
pub use parsers::{AmeriaCsvParser, InecoCsvParser, InecoXmlParser, MyAmeriaExcelParser};
pub use types::{FileParser, SourceKind};

/// A file that could not be read; ingestion carries on without it.
#[derive(Debug)]
pub struct FileFailure {
    pub kind: SourceKind,
    pub path: PathBuf,
    pub error: anyhow::Error,
}

/// Transactions accumulated across all configured sources.
#[derive(Debug, Default)]
pub struct Ingested {
    pub transactions: Vec<Transaction>,
    pub files: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl Ingested {
    /// Parse each path with `parser`, appending what it yields.
    ///
    /// A broken file is logged and recorded in `failures`; the rest still load.
    pub fn ingest<P: AsRef<Path>>(&mut self, parser: &dyn FileParser, paths: &[P]) {
        for path in paths {
            let path = path.as_ref();
            match parser.parse_file(path) {
                Ok(txns) => {
                    tracing::info!(
                        kind = %parser.kind(),
                        file = %path.display(),
                        transactions = txns.len(),
                        "parsed statement"
                    );
                    self.transactions.extend(txns);
                    self.files.push(path.to_path_buf());
                }
                Err(error) => {
                    tracing::warn!(
                        kind = %parser.kind(),
                        file = %path.display(),
                        "skipping file: {error:#}"
                    );
                    self.failures.push(FileFailure {
                        kind: parser.kind(),
                        path: path.to_path_buf(),
                        error,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::Money;

    #[test]
    fn test_ingest_keeps_going_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        std::fs::write(
            &good,
            format!(
                "{}\n1,A1,05/01/2024,AMD,0.00,100.00,,,TAXI\nTotal\n",
                parsers::ineco_csv::INECO_CSV_HEADER
            ),
        )
        .unwrap();
        let missing = dir.path().join("missing.csv");

        let mut ingested = Ingested::default();
        ingested.ingest(&InecoCsvParser, &[missing.clone(), good.clone()]);

        assert_eq!(ingested.transactions.len(), 1);
        assert_eq!(ingested.transactions[0].amount, Money::from_minor(10_000));
        assert_eq!(ingested.files, vec![good]);
        assert_eq!(ingested.failures.len(), 1);
        assert_eq!(ingested.failures[0].path, missing);
        assert_eq!(ingested.failures[0].kind, SourceKind::InecoCsv);
    }
}
