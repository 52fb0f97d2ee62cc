//! `flagparity` command line
//!
//! Loads platform exports, runs the reconciliation engine and writes the
//! console report plus JSON exports. Findings are data: every completed run
//! exits 0.

mod presenter;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use flagparity_core::{
    AllowlistAudit, ChecklistSynthesizer, InventorySummary, Platform, PlatformSnapshot,
    ReconciliationReport, TracingObserver,
};
use flagparity_io::{fetch_both, ConfigFetcher, ExportWriter, FileFetcher, JsonExportWriter, RunConfig};
use presenter::ConsolePresenter;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Combined export of one reconcile run
#[derive(Debug, Serialize)]
struct ExportedReport<'a> {
    exported_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a ReconciliationReport,
    inventory: &'a InventorySummary,
    allowlist_audit: Option<&'a AllowlistAudit>,
}

fn cli() -> Command {
    Command::new("flagparity")
        .version(flagparity_core::VERSION)
        .about("Audit feature flag and experiment parity between two platforms")
        .subcommand_required(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("reconcile")
                .about("Reconcile target keys across both platform exports")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML run configuration"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the combined report as JSON instead of text"),
                ),
        )
        .subcommand(
            Command::new("inventory")
                .about("Summarize a platform A export")
                .arg(
                    Arg::new("source-a")
                        .long("source-a")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Platform A export JSON"),
                )
                .arg(
                    Arg::new("allowlist")
                        .long("allowlist")
                        .value_parser(value_parser!(PathBuf))
                        .help("Allowlist file: JSON array or one key per line"),
                ),
        )
        .subcommand(
            Command::new("checklist")
                .about("Print the migration checklist for a platform A export")
                .arg(
                    Arg::new("source-a")
                        .long("source-a")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Platform A export JSON"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn required_path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing --{name}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("reconcile", args)) => reconcile(required_path(args, "config")?, args.get_flag("json")).await,
        Some(("inventory", args)) => {
            inventory(required_path(args, "source-a")?, args.get_one::<PathBuf>("allowlist")).await
        }
        Some(("checklist", args)) => checklist(required_path(args, "source-a")?).await,
        _ => unreachable!("clap enforces a subcommand"),
    }
}

async fn reconcile(config_path: &Path, json: bool) -> Result<()> {
    let config = RunConfig::load(config_path)
        .await
        .with_context(|| format!("loading {}", config_path.display()))?;
    let reconciler = config.reconciler()?;

    let (snapshot_a, snapshot_b) = fetch_both(
        &FileFetcher::new(Platform::A, &config.source_a),
        &FileFetcher::new(Platform::B, &config.source_b),
    )
    .await?;

    let report = reconciler.run(&snapshot_a, &snapshot_b, &config.targets);
    let inventory = InventorySummary::from_records(snapshot_a.records());
    let audit = config
        .allowlist
        .as_ref()
        .map(|allowlist| AllowlistAudit::audit(allowlist, snapshot_a.records()));

    let mut tracing_observer = TracingObserver;
    let mut presenter = ConsolePresenter::new();
    if json {
        report.notify(&mut [&mut tracing_observer]);
    } else {
        presenter.inventory(&inventory);
        presenter.record_details(snapshot_a.records());
        if let Some(audit) = &audit {
            presenter.allowlist(audit);
        }
        report.notify(&mut [&mut tracing_observer, &mut presenter]);
    }

    let exported = ExportedReport {
        exported_at: Utc::now(),
        report: &report,
        inventory: &inventory,
        allowlist_audit: audit.as_ref(),
    };

    let writer = JsonExportWriter::new(&config.output_dir);
    writer.write("comparison", &report.results).await?;
    writer.write("checklist", &report.checklist).await?;
    writer.write("inventory", &inventory).await?;
    let combined = writer.write("reconciliation_report", &exported).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&exported)?);
    } else {
        println!("{}", presenter.render());
        println!();
        println!("Exports written to {}", config.output_dir.display());
        println!("   {}", combined.display());
    }
    Ok(())
}

async fn load_source_a(path: &Path) -> Result<PlatformSnapshot> {
    let snapshot = FileFetcher::new(Platform::A, path)
        .snapshot()
        .await
        .with_context(|| format!("loading platform A export {}", path.display()))?;
    for issue in snapshot.issues() {
        tracing::warn!(%issue, "record excluded");
    }
    Ok(snapshot)
}

/// Allowlist as a JSON array of strings, or one key per line with `#` comments
async fn load_allowlist(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading allowlist {}", path.display()))?;
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(&content)
            .with_context(|| format!("parsing allowlist {}", path.display()));
    }
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

async fn inventory(source_a: &Path, allowlist: Option<&PathBuf>) -> Result<()> {
    let snapshot = load_source_a(source_a).await?;
    let mut presenter = ConsolePresenter::new();
    presenter.inventory(&InventorySummary::from_records(snapshot.records()));
    presenter.record_details(snapshot.records());

    if let Some(path) = allowlist {
        let keys = load_allowlist(path).await?;
        presenter.allowlist(&AllowlistAudit::audit(&keys, snapshot.records()));
    }
    println!("{}", presenter.render());
    Ok(())
}

async fn checklist(source_a: &Path) -> Result<()> {
    let snapshot = load_source_a(source_a).await?;
    let checklist = ChecklistSynthesizer::default().synthesize(snapshot.records(), &[]);
    print!("{checklist}");
    Ok(())
}
