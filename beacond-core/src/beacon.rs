//! The beacon record and its binary codec bindings.
//!
//! A [`Beacon`] is produced either by the hcidump parser (one grouped text
//! event) or by [`Beacon::decode`] (one binary message). It is a plain value:
//! no shared ownership, passed by move to its consumer and then discarded.
//!
//! # Wire format
//!
//! All integers are big-endian; text fields are i32-length-prefixed UTF-8
//! (see [`crate::bytes`]). Field order is fixed:
//!
//! ```text
//! int32  version
//! text   scannerID
//! text   proximityUUID
//! int32  beaconCode
//! int32  manufacturerCode
//! int32  major
//! int32  minor
//! int32  txPower
//! int32  calibratedPower
//! int32  rssi
//! int32  messageType
//! int32  heartbeatFlag
//! int64  timestampMillis
//! ```
//!
//! Fields that are logically 16-bit or 8-bit are still transmitted as 4-byte
//! integers for forward compatibility.

use serde::Serialize;

use crate::bytes::{ByteReader, ByteWriter};
use crate::error::CodecError;

/// Current wire format version, written as the leading int32 of every message.
pub const MESSAGE_VERSION: i32 = 5;

// =============================================================================
// Message Type
// =============================================================================

/// Kind of message a beacon record represents on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageType {
    /// Normal advertising event read by a scanner
    ScannerRead,
    /// Scanner liveness heartbeat
    ScannerHeartbeat,
    /// Unrecognized wire value, preserved for exact round-trips
    Unknown(i32),
}

impl MessageType {
    pub fn from_value(v: i32) -> Self {
        match v {
            0 => MessageType::ScannerRead,
            1 => MessageType::ScannerHeartbeat,
            _ => MessageType::Unknown(v),
        }
    }

    pub fn to_value(self) -> i32 {
        match self {
            MessageType::ScannerRead => 0,
            MessageType::ScannerHeartbeat => 1,
            MessageType::Unknown(v) => v,
        }
    }
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::ScannerRead
    }
}

// =============================================================================
// Beacon
// =============================================================================

/// One received BLE beacon advertising event, in structured form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Beacon {
    /// Identifier of the receiving scanner (assigned by configuration)
    pub scanner_id: String,
    /// Proximity UUID, 32 hex characters with separators stripped
    pub uuid: String,
    /// Two-octet discriminator preceding the UUID (0x0215 for iBeacon)
    pub code: u16,
    /// Advertiser's manufacturer code (e.g. 0x0059 Nordic, 0x004C Apple)
    pub manufacturer: u16,
    /// Application-assigned major id
    pub major: u16,
    /// Application-assigned minor id
    pub minor: u16,
    /// Transmit power; 0 when parsed from dump text, only meaningful
    /// when the record originated from a binary message
    pub power: i32,
    /// Reference RSSI at 1 meter, two's-complement corrected
    pub calibrated_power: i32,
    /// Observed received signal strength, two's-complement corrected
    pub rssi: i32,
    pub message_type: MessageType,
    pub heartbeat: bool,
    /// Milliseconds since the Unix epoch, captured at parse time
    pub time: i64,
}

impl Beacon {
    /// Serialize to the binary wire form for publishing on the message bus.
    ///
    /// Use [`Beacon::decode`] to unserialize.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_i32(MESSAGE_VERSION);
        w.write_text(&self.scanner_id);
        w.write_text(&self.uuid);
        w.write_i32(self.code as i32);
        w.write_i32(self.manufacturer as i32);
        w.write_i32(self.major as i32);
        w.write_i32(self.minor as i32);
        w.write_i32(self.power);
        w.write_i32(self.calibrated_power);
        w.write_i32(self.rssi);
        w.write_i32(self.message_type.to_value());
        w.write_i32(self.heartbeat as i32);
        w.write_i64(self.time);
        w.into_bytes()
    }

    /// Deserialize a binary message produced by [`Beacon::encode`].
    ///
    /// A version field that does not match [`MESSAGE_VERSION`] is non-fatal:
    /// old records still decode as long as the layout is unchanged, and the
    /// mismatch is logged. Truncation at any field fails with
    /// [`CodecError::TruncatedInput`] and produces no partial record.
    pub fn decode(msg: &[u8]) -> Result<Beacon, CodecError> {
        let mut r = ByteReader::new(msg);
        let version = r.read_i32()?;
        if version != MESSAGE_VERSION {
            log::warn!(
                "Msg version: {} does not match current version: {}",
                version,
                MESSAGE_VERSION
            );
        }
        let scanner_id = r.read_text()?;
        let uuid = r.read_text()?;
        let code = r.read_i32()? as u16;
        let manufacturer = r.read_i32()? as u16;
        let major = r.read_i32()? as u16;
        let minor = r.read_i32()? as u16;
        let power = r.read_i32()?;
        let calibrated_power = r.read_i32()?;
        let rssi = r.read_i32()?;
        let message_type = MessageType::from_value(r.read_i32()?);
        let heartbeat = r.read_i32()? != 0;
        let time = r.read_i64()?;
        Ok(Beacon {
            scanner_id,
            uuid,
            code,
            manufacturer,
            major,
            minor,
            power,
            calibrated_power,
            rssi,
            message_type,
            heartbeat,
            time,
        })
    }

    /// Late-bound message type setter, used when reconstructing a record
    /// from a decoded stream.
    pub fn set_message_type(&mut self, message_type: MessageType) {
        self.message_type = message_type;
    }
}

/// Diagnostic rendering of a record.
///
/// `time` is printed as raw epoch milliseconds; this crate has no clock
/// formatting. Callers wanting local wall-clock output format the timestamp
/// themselves, as the scanner's console publisher does.
impl std::fmt::Display for Beacon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{[{},{},{}]@{}; code={},manufacturer={},power={},calibratedPower={},rssi={},time={}}}",
            self.uuid,
            self.major,
            self.minor,
            self.scanner_id,
            self.code,
            self.manufacturer,
            self.power,
            self.calibrated_power,
            self.rssi,
            self.time
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
