//! # Shardgraph - Partitioned Graph Storage
//!
//! The main binary for the Shardgraph storage core.
//!
//! This application provides:
//! - CLI interface for inspecting the id codec and the demo schema
//! - An in-process demo cluster running a configurable workload
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 apps/shardgraph (THE BINARY)                 │
//! │                                                              │
//! │  ┌──────────────┐   ┌──────────────┐   ┌─────────────────┐  │
//! │  │    CLI       │   │ demo cluster │   │ codec inspector │  │
//! │  │   (clap)     │   │ (in-process) │   │                 │  │
//! │  └──────┬───────┘   └──────┬───────┘   └────────┬────────┘  │
//! │         │                  │                    │           │
//! │         └──────────────────┼────────────────────┘           │
//! │                            ▼                                │
//! │                  ┌──────────────────┐                       │
//! │                  │  shardgraph-core │                       │
//! │                  │  (THE SUBSTRATE) │                       │
//! │                  └──────────────────┘                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Run the demo cluster
//! shardgraph demo --partitions 3 --vertices 100 --cross-edges 50
//!
//! # Inspect a global id
//! shardgraph codec --id 8589934593
//! shardgraph codec --partition 2 --local 1
//!
//! # Show the demo schema
//! shardgraph schema
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Initialize tracing — SHARDGRAPH_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("SHARDGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "shardgraph=debug"
    } else {
        "shardgraph=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Shardgraph startup banner.
fn print_banner() {
    println!(
        r#"
  ███████╗██╗  ██╗ █████╗ ██████╗ ██████╗
  ██╔════╝██║  ██║██╔══██╗██╔══██╗██╔══██╗
  ███████╗███████║███████║██████╔╝██║  ██║
  ╚════██║██╔══██║██╔══██║██╔══██╗██║  ██║
  ███████║██║  ██║██║  ██║██║  ██║██████╔╝
  ╚══════╝╚═╝  ╚═╝╚═╝  ╚═╝╚═╝  ╚═╝╚═════╝

  Partitioned Graph Storage v{}

  One graph • Many partitions • 64-bit identity
"#,
        env!("CARGO_PKG_VERSION")
    );
}
