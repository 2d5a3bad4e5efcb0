//! ADIT CLI Library
//!
//! Command-line interface over the staging and eligibility operations:
//!
//! - **Batch initialization**: claim a volume's source directory
//!   (`adit init-batch`)
//! - **Pre-flight validation**: inspect a source tree and resolve its
//!   records without staging anything (`adit validate`)
//! - **Eligibility classification**: resolve an identifier to a
//!   resource or a single record (`adit classify`)

pub mod commands;

use clap::{Parser, Subcommand};

/// ADIT - Archival Digital Ingest Tools
#[derive(Parser, Debug)]
#[command(name = "adit")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Claim a volume's source directory as a new batch
    InitBatch {
        /// Volume name under the mount root
        volume: String,

        /// Batch set identifier (e.g. a date stamp)
        batch_set_id: String,

        /// Pipeline name the batch is staged for
        pipeline: String,
    },

    /// Pre-flight a volume's source tree without staging anything
    Validate {
        /// Volume name under the mount root
        volume: String,
    },

    /// Classify an identifier as a resource or a single record
    Classify {
        /// Resource identifier or component id
        identifier: String,

        /// Workflow target: metadata, publication, or files
        #[arg(long, default_value = "metadata")]
        target: String,
    },
}
