//! # Beacond Scanner
//!
//! BLE beacon scanner daemon built on [`beacond_core`].
//!
//! Reads `hcidump -R` output (from a pipe or a capture file), groups and
//! parses each advertising event into a beacon record, encodes it into the
//! versioned binary wire format and hands it to a message bus publisher.
//!
//! The pipeline is single-threaded and synchronous: the next line is not
//! read until the current record's encode/publish step returns, so a slow
//! transport naturally backpressures the dump stream.
//!
//! ## Key Components
//!
//! - [`Cli`] - Command-line interface
//! - [`publisher::MsgPublisher`] - Capability interface for the bus client
//! - [`stream::process_stream`] - The sequential line-stream driver

use std::path::PathBuf;

use clap::Parser;

use crate::publisher::QoS;

pub mod publisher;
pub mod stream;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Clone, Debug)]
#[command(name = "beacond", version, about = "BLE beacon scanner daemon")]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Scanner identifier attached to every beacon record
    #[arg(short, long)]
    pub scanner_id: String,

    /// Bus client identifier; defaults to the scanner id
    #[arg(short, long)]
    pub client_id: Option<String>,

    /// Message bus destination for beacon events
    #[arg(short, long, default_value = "beaconEvents")]
    pub topic: String,

    /// Delivery quality of service for binary payloads
    #[arg(long, value_enum, default_value_t)]
    pub qos: QoS,

    /// Spool file the publisher writes framed payloads to
    #[arg(long, default_value = "beacond.spool")]
    pub spool: PathBuf,

    /// Publish records as typed properties instead of binary payloads
    #[arg(long, default_value_t = false)]
    pub properties: bool,

    /// Parse and print events without publishing anything
    #[arg(long, default_value_t = false)]
    pub skip_publish: bool,

    /// Dump file to read; standard input when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

impl Cli {
    /// Bus client identifier, falling back to the scanner id.
    pub fn client_id(&self) -> &str {
        self.client_id.as_deref().unwrap_or(&self.scanner_id)
    }
}
