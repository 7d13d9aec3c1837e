//! # PDF Search Client CLI (`pdfs`)
//!
//! Talks to a running document-search server: upload PDFs, load the demo
//! set, search, reset, and check index stats.
//!
//! ## Usage
//!
//! ```bash
//! pdfs --config ./config/pdfs.toml <command>
//! pdfs --base-url http://search.local:8000 <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pdfs stats` | Show document and index counts |
//! | `pdfs health` | Check that the server is up |
//! | `pdfs load-demo` | Load the server's demo PDFs |
//! | `pdfs reset` | Clear the server's index |
//! | `pdfs upload <files…>` | Upload PDFs one at a time |
//! | `pdfs search "<query>"` | Search indexed documents |
//! | `pdfs shell` | Interactive session |
//!
//! The status line is always printed last on stdout. Logs go to stderr;
//! set `PDFS_LOG` (e.g. `PDFS_LOG=debug`) or pass `--verbose` to see them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pdf_search_client::api::HttpBackend;
use pdf_search_client::config::{self, Config, UploadFailurePolicy};
use pdf_search_client::controller::{Controller, Outcome};
use pdf_search_client::shell::{self, ShellOptions};
use pdf_search_client::view::{OutputFormat, Sections};

/// PDF search client: upload, index and search PDFs on a search server.
///
/// All commands accept `--config` pointing to a TOML file; without one the
/// built-in defaults are used (server at `http://127.0.0.1:8000`).
#[derive(Parser)]
#[command(
    name = "pdfs",
    about = "Client for a PDF document-search server",
    version,
    long_about = "Uploads PDFs to a document-search server, triggers demo loading, runs \
    keyword searches and prints ranked results with snippets."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/pdfs.toml`. A missing file means built-in
    /// defaults; a file that fails to parse is an error.
    #[arg(long, global = true, default_value = "./config/pdfs.toml")]
    config: PathBuf,

    /// Server base URL, overriding `[server].base_url`.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show document and index counts.
    Stats,

    /// Check that the server is reachable.
    Health,

    /// Load the server's bundled demo PDFs.
    LoadDemo {
        /// Maximum pages processed per PDF.
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Clear every document from the server's index.
    Reset,

    /// Upload PDFs, one at a time, in the order given.
    ///
    /// By default the first failure stops the batch and later files are not
    /// sent (`[upload].on_failure = "abort"`).
    Upload {
        /// PDF files to upload.
        files: Vec<PathBuf>,

        /// Maximum pages processed per PDF.
        #[arg(long)]
        max_pages: Option<u32>,

        /// Keep uploading after a failed file.
        #[arg(long)]
        continue_on_error: bool,
    },

    /// Search indexed documents.
    Search {
        /// The search query.
        query: String,

        /// Number of results to return.
        #[arg(short, long)]
        k: Option<u32>,

        /// Output format for the results.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Interactive session; type `help` for commands.
    Shell {
        /// Output format for search results.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("PDFS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut cfg = config::load_or_default(&cli.config)?;
    if let Some(url) = &cli.base_url {
        cfg.server.base_url = url.clone();
        config::validate(&cfg).context("Invalid --base-url")?;
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = load_config(&cli)?;
    let backend = HttpBackend::from_config(&cfg)?;
    tracing::debug!(base_url = %backend.base_url(), "using server");
    let mut controller = Controller::new(backend, &cfg);

    let (outcome, sections, format) = match cli.command {
        Commands::Stats => (
            controller.refresh_stats().await,
            Sections::STATUS_ONLY,
            OutputFormat::Text,
        ),
        Commands::Health => {
            match controller.check_health().await {
                Ok(health) => println!("health: {}", health.status),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
            return Ok(());
        }
        Commands::LoadDemo { max_pages } => {
            if let Some(n) = max_pages {
                controller.update_controls(|c| c.max_pages = n.to_string());
            }
            (
                controller.load_demo().await,
                Sections::STATUS_ONLY,
                OutputFormat::Text,
            )
        }
        Commands::Reset => (
            controller.reset().await,
            Sections::STATUS_ONLY,
            OutputFormat::Text,
        ),
        Commands::Upload {
            files,
            max_pages,
            continue_on_error,
        } => {
            if continue_on_error {
                controller.set_upload_policy(UploadFailurePolicy::Continue);
            }
            controller.update_controls(|c| {
                c.files = files;
                if let Some(n) = max_pages {
                    c.max_pages = n.to_string();
                }
            });
            (controller.upload().await, Sections::LOG, OutputFormat::Text)
        }
        Commands::Search { query, k, format } => {
            controller.update_controls(|c| {
                c.query = query;
                if let Some(n) = k {
                    c.k = n.to_string();
                }
            });
            let outcome = controller.search().await;
            if format == OutputFormat::Json && outcome.is_success() {
                // Keep stdout a single JSON document.
                println!("{}", controller.snapshot().results.render(format));
                return Ok(());
            }
            (outcome, Sections::RESULTS, format)
        }
        Commands::Shell { format } => {
            let options = ShellOptions {
                format,
                prompt: atty::is(atty::Stream::Stdin),
            };
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            shell::run(&controller, stdin, tokio::io::stdout(), options).await?;
            return Ok(());
        }
    };

    print!("{}", controller.snapshot().report(sections, format));

    match outcome {
        Outcome::Done | Outcome::Busy => Ok(()),
        Outcome::Failed(_) | Outcome::Rejected => std::process::exit(1),
    }
}
