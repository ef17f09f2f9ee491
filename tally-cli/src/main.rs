use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tally_ingest::{
    AmeriaCsvParser, FileParser, InecoCsvParser, InecoXmlParser, Ingested, SourceKind, expand_all,
};
use tally_stats::{ReportOptions, build_monthly_statistics, render_report};
use tracing::{info, warn};

mod config;
mod output;

use config::{Config, DEFAULT_CONFIG_FILE, load_config};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version,
    long_version = LONG_VERSION,
    about = "Monthly income/expense statistics from bank statement exports"
)]
struct Cli {
    /// Log per-file and per-interval details (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse every configured statement and print monthly statistics
    Report {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// List the transactions of every group
        #[arg(long)]
        detailed: bool,

        /// Open the written report with the system viewer
        #[arg(long, requires = "output")]
        open: bool,
    },

    /// Validate the configuration and show what it resolves to
    Check {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Print the normalized transactions of a single statement file
    Parse {
        /// ineco-xml, ineco-csv, ameria-csv or myameria-xlsx
        #[arg(long)]
        kind: SourceKind,

        /// Config providing the [myameria] direction rules
        #[arg(long)]
        config: Option<PathBuf>,

        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "tally={level},tally_cli={level},tally_ingest={level},tally_stats={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Report {
            config,
            output,
            detailed,
            open,
        } => {
            run_report(&config, output.as_deref(), detailed)?;
            if open {
                if let Some(path) = output.as_deref() {
                    output::open_in_viewer(path)?;
                }
            }
        }

        Command::Check { config } => {
            run_check(&config)?;
        }

        Command::Parse { kind, config, file } => {
            run_parse(kind, config.as_deref(), &file)?;
        }
    }

    Ok(())
}

fn parser_for(kind: SourceKind, cfg: Option<&Config>) -> Box<dyn FileParser> {
    match kind {
        SourceKind::InecoXml => Box::new(InecoXmlParser),
        SourceKind::InecoCsv => Box::new(InecoCsvParser),
        SourceKind::AmeriaCsv => Box::new(AmeriaCsvParser),
        SourceKind::MyAmeriaXlsx => Box::new(cfg.map(Config::myameria_parser).unwrap_or_default()),
    }
}

fn load_transactions(cfg: &Config) -> Result<Ingested> {
    let mut ingested = Ingested::default();
    for kind in SourceKind::ALL {
        let patterns = cfg.sources.paths(kind);
        if patterns.is_empty() {
            continue;
        }
        let files = expand_all(patterns).with_context(|| format!("resolving [sources] {kind}"))?;
        if files.is_empty() {
            warn!(%kind, "no files match the configured paths");
            continue;
        }
        ingested.ingest(parser_for(kind, Some(cfg)).as_ref(), &files);
    }
    Ok(ingested)
}

fn run_report(config_path: &Path, output: Option<&Path>, detailed: bool) -> Result<()> {
    let cfg = load_config(config_path)?;
    let tz = cfg.tz()?;
    let table = cfg.classification_table()?;

    let ingested = load_transactions(&cfg)?;
    info!(
        files = ingested.files.len(),
        failed = ingested.failures.len(),
        transactions = ingested.transactions.len(),
        "statements loaded"
    );

    let stats = build_monthly_statistics(ingested.transactions, &table, cfg.month_start_day, tz)
        .context("building monthly statistics")?;
    info!(intervals = stats.len(), "statistics built");

    let options = ReportOptions {
        detailed: detailed || cfg.detailed_output,
    };
    output::write_report(output, &render_report(&stats, options))
}

fn run_check(config_path: &Path) -> Result<()> {
    let cfg = load_config(config_path)?;
    let tz = cfg.tz()?;
    let table = cfg.classification_table()?;

    println!("Config OK: {}", config_path.display());
    println!(
        "Intervals start on day {} at midnight {}",
        cfg.month_start_day.get(),
        tz.name()
    );
    println!(
        "{} groups, {} substrings, {} ignore substrings, unknown: {:?}",
        table.group_count(),
        table.substring_count(),
        cfg.ignore_substrings.len(),
        table.unknown_policy()
    );
    for kind in SourceKind::ALL {
        let patterns = cfg.sources.paths(kind);
        if patterns.is_empty() {
            continue;
        }
        let files = expand_all(patterns)?;
        println!("{:<14} {} file(s) ({})", kind.key(), files.len(), kind.name());
        for f in &files {
            println!("  {}", f.display());
        }
    }
    Ok(())
}

fn run_parse(kind: SourceKind, config_path: Option<&Path>, file: &Path) -> Result<()> {
    let cfg = config_path.map(load_config).transpose()?;
    let parser = parser_for(kind, cfg.as_ref());
    let txns = parser.parse_file(file)?;

    println!("Parsed {} transactions from {}", txns.len(), file.display());
    for t in &txns {
        println!(
            "{}  {:>13}  {}",
            t.date.format(tally_stats::report::DATE_FORMAT),
            t.signed_amount(),
            t.details
        );
    }
    Ok(())
}
