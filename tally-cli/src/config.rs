use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tally_core::{MonthStartDay, Tz, parse_time_zone};
use tally_ingest::{MyAmeriaExcelParser, SourceKind};
use tally_stats::{ClassificationTable, UnknownPolicy};

pub const DEFAULT_CONFIG_FILE: &str = "tally.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub month_start_day: MonthStartDay,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// One pooled "unknown" group instead of a group per details text
    #[serde(default)]
    pub group_all_unknown: bool,
    #[serde(default)]
    pub detailed_output: bool,
    #[serde(default)]
    pub ignore_substrings: Vec<String>,
    #[serde(default)]
    pub sources: SourcesSection,
    #[serde(default)]
    pub myameria: MyAmeriaSection,
    /// Group name -> substrings of transaction details
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesSection {
    #[serde(default)]
    pub ineco_xml: Vec<PathBuf>,
    #[serde(default)]
    pub ineco_csv: Vec<PathBuf>,
    #[serde(default)]
    pub ameria_csv: Vec<PathBuf>,
    #[serde(default)]
    pub myameria_xlsx: Vec<PathBuf>,
}

impl SourcesSection {
    pub fn paths(&self, kind: SourceKind) -> &[PathBuf] {
        match kind {
            SourceKind::InecoXml => &self.ineco_xml,
            SourceKind::InecoCsv => &self.ineco_csv,
            SourceKind::AmeriaCsv => &self.ameria_csv,
            SourceKind::MyAmeriaXlsx => &self.myameria_xlsx,
        }
    }

    pub fn is_empty(&self) -> bool {
        SourceKind::ALL.iter().all(|k| self.paths(*k).is_empty())
    }

    /// Make relative entries relative to `base` (the config file's directory).
    fn rebase(&mut self, base: &Path) {
        for list in [
            &mut self.ineco_xml,
            &mut self.ineco_csv,
            &mut self.ameria_csv,
            &mut self.myameria_xlsx,
        ] {
            for p in list.iter_mut() {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MyAmeriaSection {
    #[serde(default)]
    pub my_accounts: Vec<String>,
    #[serde(default)]
    pub income_substrings: Vec<String>,
}

/// $TZ when it names an IANA zone, UTC otherwise.
fn default_time_zone() -> String {
    std::env::var("TZ")
        .ok()
        .filter(|tz| parse_time_zone(tz).is_ok())
        .unwrap_or_else(|| "UTC".to_string())
}

impl Config {
    pub fn tz(&self) -> Result<Tz> {
        parse_time_zone(&self.time_zone).context("invalid time_zone")
    }

    pub fn unknown_policy(&self) -> UnknownPolicy {
        UnknownPolicy::from_group_all(self.group_all_unknown)
    }

    pub fn classification_table(&self) -> Result<ClassificationTable> {
        ClassificationTable::new(
            self.groups.iter().map(|(name, subs)| (name.as_str(), subs.iter().map(String::as_str))),
            self.ignore_substrings.iter().map(String::as_str),
            self.unknown_policy(),
        )
        .context("invalid [groups] or ignore_substrings")
    }

    pub fn myameria_parser(&self) -> MyAmeriaExcelParser {
        MyAmeriaExcelParser::new(
            self.myameria.my_accounts.clone(),
            self.myameria.income_substrings.clone(),
        )
    }

    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        if self.sources.is_empty() {
            bail!("no statement files configured under [sources]");
        }
        Ok(())
    }
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut cfg = parse_config(&s).with_context(|| format!("parse {}", path.display()))?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        cfg.sources.rebase(dir);
    }
    Ok(cfg)
}
