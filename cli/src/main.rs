//! Evidence Ledger operator CLI
//!
//! Drives an `EvidenceLedger` over a JSON Lines file store. Every subcommand
//! opens the ledger, performs one operation, and exits; the file is the
//! only state.
//!
//! Usage:
//!   ledger init
//!   ledger record --event-type inspection --module-id ism --module-name "ISM Code" \
//!       --originator chief.officer@mv-aurora --description "Lifeboat drill" \
//!       --data '{"deficiencies": 0}' --vessel-id IMO9321483
//!   ledger query --event-type inspection --limit 10
//!   ledger verify
//!   ledger export --output ledger-export.json
//!   ledger audit ledger-export.json

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use evidence_contracts::{
    EventType, EvidenceEntry, EvidenceValue, IntegrityReport, IntegrityStatus, LedgerError,
    LedgerQuery, LedgerResult, LedgerSummary, NewEvidence,
};
use evidence_ledger::{verify_export, EvidenceLedger, JsonlLedgerStore, LedgerConfig};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Evidence Ledger: tamper-evident compliance evidence for the fleet.
#[derive(Parser)]
#[command(
    name = "ledger",
    about = "Append-only, hash-chained evidence ledger",
    long_about = "Records compliance evidence (inspections, audits, corrections, checklists,\n\
                  incidents, training) into a SHA-256 hash chain and verifies that no\n\
                  recorded block has been altered or removed."
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ledger file. Overrides `[storage] path` from the configuration.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the genesis block if the ledger is empty.
    Init {
        /// Discard every existing block and start a new chain.
        #[arg(long)]
        reset: bool,
    },
    /// Append one piece of evidence.
    Record(RecordArgs),
    /// Verify the whole chain; exits 1 if any block is corrupted.
    Verify,
    /// List evidence, newest first.
    Query(QueryArgs),
    /// Show one block by number.
    Show {
        #[arg(allow_negative_numbers = true)]
        block: i64,
    },
    /// List every block recorded for a module, newest first.
    Chain { module_id: String },
    /// Totals, recent activity, and an integrity verdict.
    Summary,
    /// Write every block as a JSON array.
    Export {
        /// Destination file; stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Verify an exported ledger file without opening the live ledger.
    Audit { file: PathBuf },
}

#[derive(Args)]
struct RecordArgs {
    #[arg(long)]
    event_type: EventType,
    #[arg(long)]
    module_id: String,
    #[arg(long)]
    module_name: String,
    #[arg(long)]
    originator: String,
    #[arg(long)]
    description: String,
    /// JSON payload stored with the evidence.
    #[arg(long)]
    data: Option<String>,
    #[arg(long)]
    vessel_id: Option<String>,
    /// JSON annotations stored with the evidence.
    #[arg(long)]
    metadata: Option<String>,
}

#[derive(Args)]
struct QueryArgs {
    #[arg(long)]
    event_type: Option<EventType>,
    #[arg(long)]
    module_id: Option<String>,
    #[arg(long)]
    originator: Option<String>,
    #[arg(long)]
    vessel_id: Option<String>,
    /// Inclusive lower bound, RFC 3339 (e.g. 2024-05-01T00:00:00Z).
    #[arg(long)]
    since: Option<DateTime<Utc>>,
    /// Inclusive upper bound, RFC 3339.
    #[arg(long)]
    until: Option<DateTime<Utc>>,
    #[arg(long)]
    limit: Option<usize>,
}

impl From<QueryArgs> for LedgerQuery {
    fn from(args: QueryArgs) -> Self {
        LedgerQuery {
            event_type: args.event_type,
            module_id: args.module_id,
            originator: args.originator,
            vessel_id: args.vessel_id,
            start_date: args.since,
            end_date: args.until,
            limit: args.limit,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("ledger error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Execute one subcommand. `Ok(false)` means the command ran but found
/// corruption.
async fn run(cli: Cli) -> LedgerResult<bool> {
    let config = match &cli.config {
        Some(path) => LedgerConfig::from_file(path)?,
        None => LedgerConfig::default(),
    };

    let json = cli.json;
    match cli.command {
        // Offline: reads the export file only, never the live store.
        Command::Audit { file } => audit(&file, json),
        command => {
            let path = cli.store.unwrap_or_else(|| config.storage.path.clone());
            debug!(store = %path.display(), "opening ledger");
            let ledger = EvidenceLedger::new(JsonlLedgerStore::new(path)).with_config(config);
            run_on_ledger(command, &ledger, json).await
        }
    }
}

/// Execute a subcommand that reads or writes the live ledger.
async fn run_on_ledger(
    command: Command,
    ledger: &EvidenceLedger<JsonlLedgerStore>,
    json: bool,
) -> LedgerResult<bool> {
    match command {
        Command::Init { reset } => {
            ledger.initialize(reset).await?;
            let head = ledger.head().await;
            match head {
                Some(head) if !json => {
                    println!("ledger active: head #{} {}", head.block_number, head.hash)
                }
                head => print_json(&head)?,
            }
            Ok(true)
        }

        Command::Record(args) => {
            let entry = ledger.record_evidence(new_evidence(args)?).await?;
            if json {
                print_json(&entry)?;
            } else {
                println!("recorded {}", entry.summary());
                println!("  hash      {}", entry.hash);
                println!("  previous  {}", entry.previous_hash);
            }
            Ok(true)
        }

        Command::Verify => {
            let report = ledger.verify_ledger_integrity().await?;
            if json {
                print_json(&report)?;
            } else {
                print_report(&report);
            }
            Ok(report.is_valid)
        }

        Command::Query(args) => {
            let entries = ledger.query_ledger(&args.into()).await?;
            print_entries(&entries, json)?;
            Ok(true)
        }

        Command::Show { block } => {
            let entry = match u64::try_from(block) {
                Ok(number) => ledger.get_evidence_entry(number).await?,
                Err(_) => None,
            };
            match entry {
                Some(entry) => print_json(&entry)?,
                None if json => print_json(&Option::<EvidenceEntry>::None)?,
                None => println!("block {} not found", block),
            }
            Ok(true)
        }

        Command::Chain { module_id } => {
            let entries = ledger.get_module_evidence_chain(&module_id).await?;
            print_entries(&entries, json)?;
            Ok(true)
        }

        Command::Summary => {
            let summary = ledger.get_ledger_summary().await?;
            if json {
                print_json(&summary)?;
            } else {
                print_summary(&summary);
            }
            Ok(summary.integrity_status.is_verified())
        }

        Command::Export { output } => {
            let text = ledger.export_ledger().await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text).map_err(|e| {
                        LedgerError::persistence(format!(
                            "failed to write export '{}': {}",
                            path.display(),
                            e
                        ))
                    })?;
                    println!("exported ledger to {}", path.display());
                }
                None => println!("{}", text),
            }
            Ok(true)
        }

        Command::Audit { file } => audit(&file, json),
    }
}

fn audit(file: &Path, json: bool) -> LedgerResult<bool> {
    let text = std::fs::read_to_string(file).map_err(|e| LedgerError::ExportFormat {
        reason: format!("failed to read export '{}': {}", file.display(), e),
    })?;
    let report = verify_export(&text)?;
    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }
    Ok(report.is_valid)
}

fn new_evidence(args: RecordArgs) -> LedgerResult<NewEvidence> {
    let mut evidence = NewEvidence::new(
        args.event_type,
        args.module_id,
        args.module_name,
        args.originator,
        args.description,
    );
    if let Some(data) = args.data {
        evidence = evidence.with_data(parse_payload("--data", &data)?);
    }
    if let Some(vessel_id) = args.vessel_id {
        evidence = evidence.with_vessel(vessel_id);
    }
    if let Some(metadata) = args.metadata {
        evidence = evidence.with_metadata(parse_payload("--metadata", &metadata)?);
    }
    Ok(evidence)
}

fn parse_payload(flag: &str, raw: &str) -> LedgerResult<EvidenceValue> {
    serde_json::from_str(raw).map_err(|e| LedgerError::InvalidEvidence {
        reason: format!("{} is not valid JSON: {}", flag, e),
    })
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_json<T: Serialize>(value: &T) -> LedgerResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| LedgerError::Serialization {
        reason: e.to_string(),
    })?;
    println!("{}", text);
    Ok(())
}

fn print_entries(entries: &[EvidenceEntry], json: bool) -> LedgerResult<()> {
    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("no matching evidence");
    }
    for entry in entries {
        println!("{}  {}", entry.timestamp.to_rfc3339(), entry.summary());
    }
    Ok(())
}

fn print_report(report: &IntegrityReport) {
    let verdict = if report.is_valid { "VALID" } else { "CORRUPTED" };
    println!("{}: {}", verdict, report.message);
    for violation in &report.violations {
        println!(
            "  block {:>6}  {:?}  {}",
            violation.block_number, violation.kind, violation.detail
        );
    }
}

fn print_summary(summary: &LedgerSummary) {
    println!("blocks      {}", summary.total_blocks);
    match &summary.integrity_status {
        IntegrityStatus::Verified => println!("integrity   verified"),
        IntegrityStatus::Compromised { corrupted_blocks } => {
            println!("integrity   COMPROMISED {:?}", corrupted_blocks)
        }
    }
    for (event_type, count) in &summary.total_events {
        println!("  {:<12}{}", event_type.to_string(), count);
    }
    if let Some(first) = &summary.first_block {
        println!("first       {}", first.summary());
    }
    if let Some(last) = &summary.last_block {
        println!("head        {}", last.summary());
    }
    if !summary.recent_entries.is_empty() {
        println!("recent:");
        for entry in &summary.recent_entries {
            println!("  {}", entry.summary());
        }
    }
}
