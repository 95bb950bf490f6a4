//! Line-stream driver: grouper -> parser -> encode -> publish.
//!
//! Strictly sequential: each record is parsed, encoded and handed to the
//! publisher before the next line is read, so backpressure from a slow
//! transport is enforced by the synchronous hand-off. There are no
//! overlapping in-flight records and no shared mutable state.

use std::io::BufRead;

use anyhow::Result;
use log::{debug, warn};

use beacond_core::{parse_event, EventGrouper, GrouperOutput, ParseError};

use crate::publisher::{MsgPublisher, QoS};

/// Per-run settings for the stream driver.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Scanner identifier attached to every parsed record
    pub scanner_id: String,
    /// Message bus destination
    pub topic: String,
    /// Delivery quality of service for binary payloads
    pub qos: QoS,
    /// Publish the typed-properties form instead of the binary payload
    pub properties: bool,
}

/// Counters reported when the stream ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    /// Complete three-line events handed to the parser
    pub events: u64,
    /// Records published
    pub published: u64,
    /// Events discarded (no manufacturer data, malformed, truncated)
    pub discarded: u64,
    /// Non-matching lines forwarded as diagnostics
    pub passthrough: u64,
}

/// Consume an hcidump text stream to exhaustion, publishing every beacon
/// record it contains.
///
/// Per-event failures are logged and the stream continues; only I/O errors
/// from the reader or the publisher abort the run.
pub fn process_stream<R: BufRead>(
    reader: R,
    options: &StreamOptions,
    publisher: &mut dyn MsgPublisher,
) -> Result<StreamStats> {
    let mut grouper = EventGrouper::new();
    let mut stats = StreamStats::default();

    for line in reader.lines() {
        let line = line?;
        match grouper.push_line(&line) {
            GrouperOutput::Event(buffer) => {
                stats.events += 1;
                match parse_event(&options.scanner_id, &buffer) {
                    Ok(beacon) => {
                        if options.properties {
                            publisher.publish_beacon(&options.topic, &beacon)?;
                        } else {
                            let msg = beacon.encode();
                            publisher.publish(&options.topic, options.qos, &msg)?;
                        }
                        stats.published += 1;
                    }
                    Err(ParseError::NoManufacturerData) => {
                        stats.discarded += 1;
                        debug!("event without manufacturer data discarded");
                    }
                    Err(err) => {
                        stats.discarded += 1;
                        warn!("discarding unparseable event: {}", err);
                    }
                }
            }
            GrouperOutput::Passthrough(line) => {
                stats.passthrough += 1;
                debug!("No match: {}", line);
            }
            GrouperOutput::Consumed => {}
        }
    }

    if let Err(err) = grouper.finish() {
        stats.discarded += 1;
        warn!("discarding partial event at end of stream: {}", err);
    }

    Ok(stats)
}

// =============================================================================
// Tests
// =============================================================================
