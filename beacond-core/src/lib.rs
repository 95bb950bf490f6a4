//! # Beacond Core
//!
//! Platform-independent BLE beacon parsing and wire codec.
//!
//! This crate contains pure parsing and codec logic with **zero I/O
//! dependencies**: it turns the raw `hcidump -R` text of BLE advertising
//! events into structured [`Beacon`] records and serializes them into the
//! compact binary message published on the message bus.
//!
//! ## Architecture
//!
//! `beacond-core` is the shared foundation under `beacond-scanner`, the
//! native scanner daemon. All I/O (reading the dump stream, publishing)
//! lives in the scanner; the core is a pure data pipeline:
//!
//! ```text
//! raw text lines
//!     │  EventGrouper      (3-line event recognition and joining)
//!     ▼
//! assembled hex buffer
//!     │  hcidump parser    (AD-structure walk, field decoding)
//!     ▼
//! Beacon
//!     │  Beacon::encode    (versioned big-endian wire format)
//!     ▼
//! binary payload ──► external publisher
//! ```
//!
//! ## Key Modules
//!
//! - [`grouper`] - Line-stream state machine grouping one advertising event
//! - [`hcidump`] - Hex-octet parsing of the manufacturer specific payload
//! - [`beacon`] - The beacon record and its encode/decode bindings
//! - [`bytes`] - Primitive big-endian reader/writer with truncation checks
//! - [`error`] - Parse and codec error types
//!
//! ## Example
//!
//! ```rust
//! use beacond_core::{Beacon, EventGrouper, GrouperOutput, parse_event};
//!
//! let mut grouper = EventGrouper::new();
//! let lines = [
//!     "> 04 3E 2A 02 01 03 01 D1 5B 65 41 2A EA 1E 02 01 1A 1A FF 00 59 ",
//!     "02 15 E2 C5 6D B5 DF FB 48 D2 B0 60 D0 F5 A7 10 96 E0 00 01 ",
//!     "00 02 C5 BF ",
//! ];
//! for line in lines {
//!     if let GrouperOutput::Event(buffer) = grouper.push_line(line) {
//!         let beacon = parse_event("scanner1", &buffer).unwrap();
//!         let payload = beacon.encode();
//!         assert_eq!(Beacon::decode(&payload).unwrap(), beacon);
//!     }
//! }
//! grouper.finish().unwrap();
//! ```

pub mod beacon;
pub mod bytes;
pub mod error;
pub mod grouper;
pub mod hcidump;

pub use beacon::{Beacon, MessageType, MESSAGE_VERSION};
pub use bytes::{ByteReader, ByteWriter};
pub use error::{CodecError, ParseError};
pub use grouper::{EventGrouper, GrouperOutput};
pub use hcidump::{now_millis, parse_event, parse_event_at};
