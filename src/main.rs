//! # Albert RAG CLI (`albert`)
//!
//! ## Usage
//!
//! ```bash
//! albert --config ./config/albert.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `albert ingest` | Convert and upload the source tree into the collection |
//! | `albert documents` | List documents already in the collection |
//! | `albert search "<query>"` | Show the chunks retrieved for a query |
//! | `albert ask "<question>"` | One-shot question, optionally augmented (`--rag`) |
//! | `albert serve` | Start the chat proxy HTTP server |
//!
//! Connection settings come from the environment (`ALBERT_API_ROOT`,
//! `ALBERT_API_VERSION`, `ALBERT_API_KEY`, `ALBERT_COLLECTION_ID`), a `.env`
//! file in the working directory, or the config file.

use albert_rag::client::AlbertClient;
use albert_rag::collection::list_documents;
use albert_rag::config;
use albert_rag::ingest::{run_ingest, IngestOptions};
use albert_rag::logging;
use albert_rag::progress::ProgressMode;
use albert_rag::prompt::seed_conversation;
use albert_rag::rag;
use albert_rag::search::{search, SearchOptions};
use albert_rag::server;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "albert",
    about = "Ingest sources into an AlbertAPI collection and chat over them",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Optional; the environment
    /// supplies anything it leaves out.
    #[arg(long, global = true, default_value = "./config/albert.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every matching source file to PDF and upload it.
    ///
    /// Files whose document name is already in the collection are skipped,
    /// so re-running resumes where the previous run stopped. A failing file
    /// is reported and the run continues.
    Ingest {
        /// Source root; overrides `ingest.root`.
        #[arg(long)]
        root: Option<PathBuf>,

        /// List what would be uploaded without converting or uploading.
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of files to convert and upload.
        #[arg(long)]
        limit: Option<usize>,

        /// Progress output on stderr. Defaults to human when stderr is a TTY.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// List document names already stored in the collection.
    Documents,

    /// Search the collection and print the ranked chunks.
    Search {
        query: String,

        /// Number of chunks to retrieve; overrides `retrieval.k`.
        #[arg(long)]
        k: Option<usize>,

        /// Search method passed to the API; overrides `retrieval.method`.
        #[arg(long)]
        method: Option<String>,
    },

    /// Ask a single question, starting from the Albert persona.
    Ask {
        question: String,

        /// Augment the question with chunks retrieved from the collection.
        #[arg(long)]
        rag: bool,
    },

    /// Start the chat proxy HTTP server on `server.bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ingest {
            root,
            dry_run,
            limit,
            progress,
        } => {
            let client = AlbertClient::new(&cfg.api)?;
            let options = IngestOptions {
                root,
                dry_run,
                limit,
            };
            let reporter = progress
                .unwrap_or_else(ProgressMode::default_for_tty)
                .reporter();
            let report = run_ingest(&cfg, &client, &options, reporter.as_ref()).await?;
            report.print_summary();
        }
        Commands::Documents => {
            let client = AlbertClient::new(&cfg.api)?;
            let names = list_documents(&client, &cfg.retrieval.collection_id).await?;
            if names.is_empty() {
                println!("No documents.");
            }
            for name in names {
                println!("{}", name);
            }
        }
        Commands::Search { query, k, method } => {
            let client = AlbertClient::new(&cfg.api)?;
            let mut options = SearchOptions::from(&cfg.retrieval);
            if let Some(k) = k {
                options.k = k;
            }
            if let Some(method) = method {
                options.method = method;
            }
            let chunks = search(&client, &cfg.retrieval.collection_id, &query, &options).await?;
            if chunks.is_empty() {
                println!("No results.");
            }
            for (i, chunk) in chunks.iter().enumerate() {
                println!("{}. {}", i + 1, chunk.content.trim());
                println!();
            }
        }
        Commands::Ask {
            question,
            rag: augmented,
        } => {
            let client = AlbertClient::new(&cfg.api)?;
            let conversation = seed_conversation(&question);
            let reply = if augmented {
                rag::rag_chat(&client, &cfg.models, &cfg.retrieval, &conversation).await?
            } else {
                rag::chat(&client, &cfg.models, &conversation).await?
            };
            println!("{}", reply);
        }
        Commands::Serve => {
            server::run_server(cfg).await?;
        }
    }

    Ok(())
}
