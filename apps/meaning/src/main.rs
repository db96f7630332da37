//! # Meaning - Command-Line Host
//!
//! The main binary for the meaning engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │              apps/meaning (THE BINARY)           │
//! │                                                  │
//! │  ┌─────────────┐   ┌──────────────────────────┐  │
//! │  │    CLI      │   │  World files + resolvers │  │
//! │  │   (clap)    │   │   (std::fs, tokio::fs)   │  │
//! │  └──────┬──────┘   └─────────────┬────────────┘  │
//! │         └───────────┬────────────┘               │
//! │                     ▼                            │
//! │             ┌───────────────┐                    │
//! │             │ meaning-core  │                    │
//! │             │ (THE ENGINE)  │                    │
//! │             └───────────────┘                    │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! meaning -w world.json validate
//! meaning -w world.json stats --json
//! meaning -w world.json project scene-1 tools --match all
//! meaning -w world.json filter tools --where '{"year": {"$gte": 2019}}'
//! ```

use clap::Parser;
use meaning::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // MEANING_LOG_FORMAT=json enables machine-parseable logs. Logs go to
    // stderr so command output on stdout stays clean.
    let log_format = std::env::var("MEANING_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "meaning=debug,meaning_core=debug"
    } else {
        "meaning=info,meaning_core=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
