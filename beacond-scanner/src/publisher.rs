//! Publisher boundary between the parsing pipeline and the message bus.
//!
//! The stream driver depends only on the [`MsgPublisher`] trait; which
//! implementation backs it is a configuration-time decision. Two are
//! provided here:
//!
//! - [`SpoolPublisher`] frames each binary payload into a spool file for a
//!   bus bridge to drain, and appends the typed-properties form as JSON
//!   lines next to it.
//! - [`ConsolePublisher`] prints each parsed record instead of sending it
//!   anywhere, which is the `--skip-publish` diagnostic mode.
//!
//! Delivery guarantees and connection lifecycle belong to the transport
//! behind the spool, not to this process.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use log::{debug, info};

use beacond_core::Beacon;

/// Requested delivery quality of service for a published payload.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QoS {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

/// Minimal capability interface the scanner requires from a message bus
/// client: lifecycle plus fire-and-forget publishing of either an opaque
/// binary payload or a structured record.
pub trait MsgPublisher {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;

    /// Publish an encoded beacon message as an opaque payload.
    fn publish(&mut self, destination: &str, qos: QoS, payload: &[u8]) -> Result<()>;

    /// Publish a record as individual typed properties, for transports that
    /// want fields rather than a blob.
    fn publish_beacon(&mut self, destination: &str, beacon: &Beacon) -> Result<()>;
}

/// Render a beacon timestamp as local wall-clock time for diagnostics.
pub fn format_timestamp(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(ts) => ts.format("%F %T%.3f").to_string(),
        None => format!("{}ms", millis),
    }
}

// =============================================================================
// Spool publisher
// =============================================================================

/// Writes publishes to spool files for an out-of-process bus bridge.
///
/// Binary payloads are framed as `[u32 big-endian length][payload]` in
/// `<spool>`; typed-properties publishes go to `<spool>.jsonl` as one JSON
/// object per line.
pub struct SpoolPublisher {
    path: PathBuf,
    frames: Option<BufWriter<File>>,
    records: Option<BufWriter<File>>,
    published: u64,
}

impl SpoolPublisher {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            frames: None,
            records: None,
            published: 0,
        }
    }

    fn jsonl_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".jsonl");
        PathBuf::from(name)
    }

    fn open_append(path: &Path) -> Result<BufWriter<File>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open spool file {}", path.display()))?;
        Ok(BufWriter::new(file))
    }
}

impl MsgPublisher for SpoolPublisher {
    fn start(&mut self) -> Result<()> {
        self.frames = Some(Self::open_append(&self.path)?);
        self.records = Some(Self::open_append(&self.jsonl_path())?);
        info!("spooling beacon messages to {}", self.path.display());
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(mut w) = self.frames.take() {
            w.flush()?;
        }
        if let Some(mut w) = self.records.take() {
            w.flush()?;
        }
        info!("spool closed after {} messages", self.published);
        Ok(())
    }

    fn publish(&mut self, destination: &str, qos: QoS, payload: &[u8]) -> Result<()> {
        let writer = self
            .frames
            .as_mut()
            .context("publisher used before start()")?;
        writer.write_all(&(payload.len() as u32).to_be_bytes())?;
        writer.write_all(payload)?;
        self.published += 1;
        debug!(
            "spooled {} byte payload for {} ({:?})",
            payload.len(),
            destination,
            qos
        );
        Ok(())
    }

    fn publish_beacon(&mut self, destination: &str, beacon: &Beacon) -> Result<()> {
        let writer = self
            .records
            .as_mut()
            .context("publisher used before start()")?;
        serde_json::to_writer(&mut *writer, beacon)?;
        writer.write_all(b"\n")?;
        self.published += 1;
        debug!("spooled record for {}: {}", destination, beacon);
        Ok(())
    }
}

// =============================================================================
// Console publisher
// =============================================================================

/// No-op transport: prints every record instead of publishing it.
#[derive(Debug, Default)]
pub struct ConsolePublisher {
    published: u64,
}

impl ConsolePublisher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MsgPublisher for ConsolePublisher {
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        debug!("console publisher saw {} messages", self.published);
        Ok(())
    }

    fn publish(&mut self, _destination: &str, _qos: QoS, payload: &[u8]) -> Result<()> {
        self.published += 1;
        debug!("skipping publish of {} byte payload", payload.len());
        Ok(())
    }

    fn publish_beacon(&mut self, _destination: &str, beacon: &Beacon) -> Result<()> {
        self.published += 1;
        println!("Parsed: {} at {}", beacon, format_timestamp(beacon.time));
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
