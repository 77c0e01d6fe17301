//! Command-line interface

pub mod handlers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::reference::ReferenceKind;

#[derive(Parser, Debug)]
#[command(name = "ipam-console")]
#[command(about = "Terminal console for a NetBox-style IPAM / DCIM inventory")]
#[command(version)]
pub struct Cli {
    /// Inventory API base URL (overrides config and IPAM_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// API token (overrides config and IPAM_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Path to an alternative config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive console (default)
    Tui,
    /// Check the credentials against the API status endpoint
    Status,
    /// List one reference collection with its local indices
    Refs {
        #[arg(value_enum)]
        kind: ReferenceKind,
    },
    /// Resolve free text against a reference collection
    Resolve {
        #[arg(value_enum)]
        kind: ReferenceKind,
        text: String,
    },
    /// Create devices from an xlsx or csv sheet
    Import {
        file: PathBuf,
        /// Resolve and report without creating anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Write a device or prefix snapshot to xlsx or csv
    Export {
        #[command(subcommand)]
        target: ExportTarget,
    },
    /// Show one device by its id
    Device { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum ExportTarget {
    Devices {
        path: PathBuf,
        /// Only devices whose name contains this text
        #[arg(long, default_value = "")]
        filter: String,
    },
    Prefixes { path: PathBuf },
}

impl Cli {
    /// True when the interactive console will run
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tui))
    }
}
