//! # termsweep CLI
//!
//! ## Usage
//!
//! ```bash
//! termsweep [--config termsweep.toml] [--verbose] [--log-file run.log] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `termsweep scan` | Scan a tree for all terms and write per-term results |
//! | `termsweep resolve <term>` | Show which owner and contact a term resolves to |
//! | `termsweep files` | List the candidate files a scan would read |
//!
//! ## Examples
//!
//! ```bash
//! # One literal term, default extensions, results under ./Export
//! termsweep scan --terms example.com --root /data/dumps
//!
//! # Term list, owner map, empty outputs, deterministic ordering
//! termsweep scan --terms domains.txt --root /data/dumps --owners owners.csv \
//!     --create-empty --ordering path --out ./results
//!
//! # Check owner attribution for a host
//! termsweep resolve shop.example.com --owners owners.csv
//! ```
//!
//! Exit codes: `0` success, `1` error, `130` interrupted.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use termsweep::config::{self, Config};
use termsweep::discover::ExtensionFilter;
use termsweep::logging::{init_logging, LogConfig};
use termsweep::pipeline;
use termsweep::progress::ProgressMode;
use termsweep::scan::CancelToken;
use termsweep::stats::print_summary;
use termsweep_core::aggregate::MergeOrder;
use termsweep_core::error::ScanError;
use termsweep_core::owner::contact::{display_owner, resolve_contact};
use tracing::{error, warn};

/// termsweep: multi-term search over large flat-file corpora.
///
/// Settings can come from a TOML file (`--config`); flags override it.
#[derive(Parser)]
#[command(
    name = "termsweep",
    about = "Search a file tree for many terms at once and write one result file per term",
    version
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also append logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the corpus and write per-term result files.
    Scan(ScanArgs),

    /// Resolve the owner and contact for one term.
    Resolve {
        /// Term or host to resolve.
        term: String,

        /// Owner map (CSV-like; delimiter and header auto-detected).
        #[arg(long)]
        owners: Option<PathBuf>,

        /// Matched line to use for inference and contact lookup. Repeatable.
        #[arg(long = "line")]
        lines: Vec<String>,

        /// Do not infer the owner from hosts in the given lines.
        #[arg(long)]
        no_infer_owner: bool,
    },

    /// List the candidate files a scan would read.
    Files {
        /// Root directory of the corpus.
        #[arg(long)]
        root: Option<PathBuf>,

        /// Extension allow-list, comma-separated.
        #[arg(long, value_delimiter = ',')]
        ext: Vec<String>,

        /// Do not skip system and temporary files.
        #[arg(long)]
        no_ignore: bool,
    },
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Term list file, or a single literal term.
    #[arg(long, short)]
    terms: Option<String>,

    /// Root directory of the corpus.
    #[arg(long, short)]
    root: Option<PathBuf>,

    /// Extension allow-list, comma-separated (e.g. `txt,csv,sql`).
    #[arg(long, value_delimiter = ',')]
    ext: Vec<String>,

    /// Parent directory for the `Export` result directory.
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Write a result file for terms with no matches.
    #[arg(long)]
    create_empty: bool,

    /// Worker count (default: one per CPU).
    #[arg(long, short)]
    jobs: Option<usize>,

    /// Do not skip system and temporary files.
    #[arg(long)]
    no_ignore: bool,

    /// Owner map (CSV-like; delimiter and header auto-detected).
    #[arg(long)]
    owners: Option<PathBuf>,

    /// Do not infer owners from hosts in matched lines.
    #[arg(long)]
    no_infer_owner: bool,

    /// Merge order of file results: `completion` or `path`.
    #[arg(long)]
    ordering: Option<MergeOrder>,

    /// Notification mode: `off`, `log` or `outbox`.
    #[arg(long)]
    notify: Option<String>,

    /// Outbox directory for `--notify outbox`.
    #[arg(long)]
    outbox_dir: Option<PathBuf>,

    /// Progress on stderr: `off`, `human` or `json` (default: human on a TTY).
    #[arg(long)]
    progress: Option<ProgressMode>,
}

impl ScanArgs {
    /// Fold flags over the file configuration; flags win.
    fn apply(self, config: &mut Config) {
        if let Some(terms) = self.terms {
            config.scan.terms = Some(terms);
        }
        if let Some(root) = self.root {
            config.scan.root = Some(root);
        }
        if !self.ext.is_empty() {
            config.scan.extensions = self.ext;
        }
        if let Some(out) = self.out {
            config.output.dir = out;
        }
        if self.create_empty {
            config.output.create_empty = true;
        }
        if let Some(jobs) = self.jobs {
            config.scan.jobs = jobs;
        }
        if self.no_ignore {
            config.scan.ignore_system_files = false;
        }
        if let Some(owners) = self.owners {
            config.owners.map = Some(owners);
        }
        if self.no_infer_owner {
            config.owners.infer = false;
        }
        if let Some(ordering) = self.ordering {
            config.output.ordering = ordering;
        }
        if let Some(mode) = self.notify {
            config.notify.mode = mode;
        }
        if let Some(dir) = self.outbox_dir {
            config.notify.outbox_dir = Some(dir);
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(LogConfig {
        verbose: cli.verbose,
        log_file: cli.log_file.as_deref(),
    }) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if matches!(e.downcast_ref::<ScanError>(), Some(ScanError::Interrupted)) => {
            warn!("{}", e);
            ExitCode::from(130)
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Scan(args) => {
            let progress = args.progress.unwrap_or_else(ProgressMode::default_for_tty);
            args.apply(&mut cfg);

            let cancel = CancelToken::new();
            let handler_token = cancel.clone();
            if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
                warn!(error = %e, "could not install interrupt handler");
            }

            let reporter = progress.reporter();
            let report = pipeline::run_scan(&cfg, &cancel, reporter.as_ref())?;
            print_summary(
                &report.summary,
                &report.records,
                &report.output_dir,
                report.notify.as_ref(),
            );
        }
        Commands::Resolve {
            term,
            owners,
            lines,
            no_infer_owner,
        } => {
            if let Some(owners) = owners {
                cfg.owners.map = Some(owners);
            }
            if no_infer_owner {
                cfg.owners.infer = false;
            }
            if cfg.owners.map.is_none() {
                anyhow::bail!("no owner map given (--owners or owners.map)");
            }
            let resolver = pipeline::owner_resolver(&cfg);
            match resolver.resolve(&term, &lines) {
                Some(found) => {
                    println!("term:    {}", term);
                    println!("owner:   {}", display_owner(&found.owner));
                    println!("key:     {}", found.key);
                    println!("via:     {}", found.via);
                    match resolve_contact(&found.owner, &lines) {
                        Some(contact) => println!("contact: {}", contact),
                        None => println!("contact: -"),
                    }
                }
                None => println!("term:    {}\nowner:   -", term),
            }
        }
        Commands::Files {
            root,
            ext,
            no_ignore,
        } => {
            if let Some(root) = root {
                cfg.scan.root = Some(root);
            }
            if !ext.is_empty() {
                cfg.scan.extensions = ext;
            }
            if no_ignore {
                cfg.scan.ignore_system_files = false;
            }
            let discovery = pipeline::discover(&cfg, None)?;
            for path in &discovery.files {
                println!("{}", path.display());
            }
            eprintln!(
                "{} files ({} ignored, extensions: {})",
                discovery.files.len(),
                discovery.ignored,
                describe_extensions(&cfg.scan.extensions)
            );
        }
    }

    Ok(())
}

fn describe_extensions(extensions: &[String]) -> String {
    if ExtensionFilter::new(extensions).is_empty() {
        "any".to_string()
    } else {
        extensions.join(",")
    }
}
