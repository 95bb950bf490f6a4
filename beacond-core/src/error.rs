//! Error types for hcidump parsing and the beacon wire codec

use thiserror::Error;

/// Errors that can occur when parsing hcidump text events
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Packet text is too short to contain required data
    #[error("Packet too short: expected at least {expected} characters, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// No AD structure of type 0xFF (manufacturer specific data) in the event
    #[error("Input packet has no manufacturer specific data")]
    NoManufacturerData,

    /// Input stream ended while an event group was still being assembled
    #[error("Stream ended mid-event: {got} of {want} continuation lines read")]
    TruncatedEvent { want: u32, got: u32 },

    /// A two-character field failed hex conversion
    #[error("Malformed hex octet {octet:?} at text offset {offset}")]
    MalformedHexOctet { octet: String, offset: usize },
}

/// Errors that can occur when decoding a binary beacon message
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Decode ran past the end of the buffer
    #[error("Truncated input: needed {expected} more bytes, {actual} remain")]
    TruncatedInput { expected: usize, actual: usize },

    /// A text field did not hold valid UTF-8
    #[error("Invalid string encoding")]
    InvalidString,
}
