//! # Shardgraph CLI Module
//!
//! This module implements the CLI interface for Shardgraph.
//!
//! ## Available Commands
//!
//! - `demo` - Run a workload on an in-process demo cluster
//! - `codec` - Encode or decode a 64-bit global id
//! - `schema` - Show the demo type registry

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Shardgraph - Partitioned Graph Storage
///
/// One logical graph split across partitions. Every element carries a
/// 64-bit global id; the high half routes to the owning partition.
#[derive(Parser, Debug)]
#[command(name = "shardgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a workload on an in-process demo cluster
    Demo {
        /// Path to a TOML config file ([cluster] and [workload] tables)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of partitions
        #[arg(short, long, default_value = "3")]
        partitions: u32,

        /// Vertices created per partition
        #[arg(long, default_value = "100")]
        vertices: u32,

        /// Cross-partition edges created from each partition
        #[arg(long, default_value = "50")]
        cross_edges: u32,
    },

    /// Encode or decode a 64-bit global id
    Codec {
        /// Decode this packed global id
        #[arg(short, long)]
        id: Option<u64>,

        /// Partition half for encoding
        #[arg(short, long)]
        partition: Option<u32>,

        /// Local half for encoding
        #[arg(short, long)]
        local: Option<u32>,
    },

    /// Show the demo type registry
    Schema,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), AppError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Demo {
            config,
            partitions,
            vertices,
            cross_edges,
        }) => cmd_demo(
            json_mode,
            config.as_deref(),
            partitions,
            vertices,
            cross_edges,
        ),
        Some(Commands::Codec {
            id,
            partition,
            local,
        }) => cmd_codec(json_mode, id, partition, local),
        Some(Commands::Schema) => cmd_schema(json_mode),
        None => {
            // No subcommand - run the default demo
            cmd_demo(json_mode, None, 3, 100, 50)
        }
    }
}
