//! Hex-dump parsing for BLE advertising events.
//!
//! Input is the concatenated text of one `hcidump -R` advertising event
//! ("> 04 3E ..."), where each octet is two hex characters followed by a
//! separating space. The fixed layout is:
//!
//! ```text
//! > [7 octet HCI event prefix] [6 octet device address] [1 octet length]
//!   [AD structures...]
//! ```
//!
//! Each Advertising-Data structure is `[length][type][length-1 data bytes]`.
//! The parser walks the structures until it finds type 0xFF (manufacturer
//! specific data) and decodes the iBeacon-style payload that follows:
//! manufacturer code, beacon code, proximity UUID, major, minor, calibrated
//! power and RSSI.
//!
//! A malformed octet in a field position is recoverable: it is logged and
//! the octet value defaults to 0, mirroring the resilience expected from
//! lossy sniffer output. An event with no 0xFF structure yields
//! [`ParseError::NoManufacturerData`] and must be discarded by the caller.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::beacon::{Beacon, MessageType};
use crate::error::ParseError;

/// Octets in the hcidump HCI event prefix of an advertising event
pub const HCIDUMP_PREFIX: usize = 7;
/// Octets in the advertiser's Bluetooth device address
pub const BADDR_SIZE: usize = 6;
/// Octets in the proximity UUID
pub const UUID_SIZE: usize = 16;

/// Text units per octet: two hex characters plus one separating space
const OCTET_STRIDE: usize = 3;

/// AD structure type for manufacturer specific data
const MANUFACTURER_SPECIFIC: u32 = 0xFF;

/// Current wall clock in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Read the two-character hex octet at `index`.
///
/// Running off the end of the packet is an error; a malformed octet is
/// logged and defaults to 0 so that parsing can continue.
fn octet_at(packet: &str, index: usize) -> Result<u32, ParseError> {
    let text = packet
        .get(index..index + 2)
        .ok_or(ParseError::TooShort {
            expected: index + 2,
            actual: packet.len(),
        })?;
    match u32::from_str_radix(text, 16) {
        Ok(value) => Ok(value),
        Err(_) => {
            let err = ParseError::MalformedHexOctet {
                octet: text.to_string(),
                offset: index,
            };
            log::warn!("{}, defaulting to 0", err);
            Ok(0)
        }
    }
}

/// Parse one grouped advertising event, timestamping it with the current
/// wall clock.
pub fn parse_event(scanner_id: &str, packet: &str) -> Result<Beacon, ParseError> {
    parse_event_at(scanner_id, packet, now_millis())
}

/// Parse one grouped advertising event with an explicit timestamp.
///
/// The dump text carries no timestamp in this format, so the caller supplies
/// one; [`parse_event`] is the wall-clock convenience wrapper.
pub fn parse_event_at(
    scanner_id: &str,
    packet: &str,
    timestamp_millis: i64,
) -> Result<Beacon, ParseError> {
    let size = packet.len();

    // Move past the "> ", the hcidump prefix, the device address and the
    // remaining-length octet to reach the first AD structure.
    let mut index = 2 + OCTET_STRIDE * (HCIDUMP_PREFIX + BADDR_SIZE + 1);

    // The first AD structure's length/type pair must be present.
    if size < index + 5 {
        return Err(ParseError::TooShort {
            expected: index + 5,
            actual: size,
        });
    }

    // Walk the AD structures until we find the manufacturer specific data.
    let mut length = octet_at(packet, index)?;
    let mut ad_type = octet_at(packet, index + OCTET_STRIDE)?;
    while ad_type != MANUFACTURER_SPECIFIC {
        index += OCTET_STRIDE * (length as usize + 1);
        if index + 5 > size {
            return Err(ParseError::NoManufacturerData);
        }
        length = octet_at(packet, index)?;
        ad_type = octet_at(packet, index + OCTET_STRIDE)?;
    }

    // Move past the length and 0xFF octets
    index += 2 * OCTET_STRIDE;

    // Manufacturer payload: 2 + 2 + 16 + 2 + 2 + 1 + 1 = 26 octets,
    // the last of which carries no trailing separator.
    let needed = index + 26 * OCTET_STRIDE - 1;
    if size < needed {
        return Err(ParseError::TooShort {
            expected: needed,
            actual: size,
        });
    }

    // Two octets of manufacturer code, high order octet first
    let manufacturer = 256 * octet_at(packet, index)? + octet_at(packet, index + 3)?;
    index += 2 * OCTET_STRIDE;

    // Two octets of beacon code
    let code = 256 * octet_at(packet, index)? + octet_at(packet, index + 3)?;
    index += 2 * OCTET_STRIDE;

    // The proximity uuid, separators stripped. Corrupt sniffer output can
    // put a multi-byte character in the uuid region; a range that does not
    // land on character boundaries is rejected rather than sliced.
    let uuid_end = index + UUID_SIZE * OCTET_STRIDE - 1;
    let uuid: String = packet
        .get(index..uuid_end)
        .ok_or(ParseError::TooShort {
            expected: uuid_end,
            actual: packet.len(),
        })?
        .chars()
        .filter(|c| *c != ' ')
        .collect();
    index += UUID_SIZE * OCTET_STRIDE;

    let major = 256 * octet_at(packet, index)? + octet_at(packet, index + 3)?;
    index += 2 * OCTET_STRIDE;

    let minor = 256 * octet_at(packet, index)? + octet_at(packet, index + 3)?;
    index += 2 * OCTET_STRIDE;

    // Calibrated power and RSSI are encoded as the two's complement of a
    // single octet. A raw octet of 0x00 decodes to -256, outside the valid
    // signed byte range; the correction is preserved as-is rather than
    // clamped, leaving the consumer to reject such values.
    let calibrated_power = octet_at(packet, index)? as i32 - 256;
    index += OCTET_STRIDE;

    let rssi = octet_at(packet, index)? as i32 - 256;

    Ok(Beacon {
        scanner_id: scanner_id.to_string(),
        uuid,
        code: code as u16,
        manufacturer: manufacturer as u16,
        major: major as u16,
        minor: minor as u16,
        power: 0,
        calibrated_power,
        rssi,
        message_type: MessageType::ScannerRead,
        heartbeat: false,
        time: timestamp_millis,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // One event, already grouped into a single buffer. The manufacturer
    // specific block encodes manufacturer 0x0059, beacon code 0x0215,
    // major 1, minor 2, calibrated power 0xC5 and RSSI 0xBF.
    const PACKET: &str = "> 04 3E 2A 02 01 03 01 D1 5B 65 41 2A EA 1E \
                          02 01 1A \
                          1A FF 00 59 02 15 \
                          E2 C5 6D B5 DF FB 48 D2 B0 60 D0 F5 A7 10 96 E0 \
                          00 01 00 02 C5 BF";

    #[test]
    fn test_parse_event() {
        let beacon = parse_event_at("scanner1", PACKET, 1_424_822_481_000).unwrap();
        assert_eq!(beacon.scanner_id, "scanner1");
        assert_eq!(beacon.manufacturer, 89);
        assert_eq!(beacon.code, 533);
        assert_eq!(beacon.uuid, "E2C56DB5DFFB48D2B060D0F5A71096E0");
        assert_eq!(beacon.uuid.len(), 32);
        assert_eq!(beacon.major, 1);
        assert_eq!(beacon.minor, 2);
        assert_eq!(beacon.power, 0);
        assert_eq!(beacon.calibrated_power, -59);
        assert_eq!(beacon.rssi, -65);
        assert_eq!(beacon.message_type, MessageType::ScannerRead);
        assert_eq!(beacon.time, 1_424_822_481_000);
    }

    #[test]
    fn test_parse_then_encode_round_trips() {
        let beacon = parse_event_at("scanner1", PACKET, 1_424_822_481_000).unwrap();
        let decoded = Beacon::decode(&beacon.encode()).unwrap();
        assert_eq!(decoded, beacon);
    }

    #[test]
    fn test_wall_clock_timestamp() {
        let before = now_millis();
        let beacon = parse_event("scanner1", PACKET).unwrap();
        let after = now_millis();
        assert!(beacon.time >= before && beacon.time <= after);
    }

    #[test]
    fn test_manufacturer_block_as_third_structure() {
        // Flags (3 octets), shortened local name (5 octets), then the
        // manufacturer specific block; the scan must skip the first two
        // regardless of their declared lengths.
        let packet = "> 04 3E 2A 02 01 03 01 D1 5B 65 41 2A EA 1E \
                      02 01 1A \
                      04 08 61 62 63 \
                      1A FF 00 59 02 15 \
                      E2 C5 6D B5 DF FB 48 D2 B0 60 D0 F5 A7 10 96 E0 \
                      00 01 00 02 C5 BF";
        let beacon = parse_event_at("s", packet, 0).unwrap();
        assert_eq!(beacon.manufacturer, 89);
        assert_eq!(beacon.major, 1);
        assert_eq!(beacon.minor, 2);
    }

    #[test]
    fn test_no_manufacturer_data() {
        // Flags and a local name, no 0xFF structure at all
        let packet = "> 04 3E 2A 02 01 03 01 D1 5B 65 41 2A EA 0B \
                      02 01 1A \
                      04 08 61 62 63";
        assert_eq!(
            parse_event_at("s", packet, 0),
            Err(ParseError::NoManufacturerData)
        );
    }

    #[test]
    fn test_twos_complement_boundaries() {
        // 0x01 -> -255, 0xFF -> -1
        let packet = "> 04 3E 2A 02 01 03 01 D1 5B 65 41 2A EA 1E \
                      1A FF 00 59 02 15 \
                      E2 C5 6D B5 DF FB 48 D2 B0 60 D0 F5 A7 10 96 E0 \
                      00 01 00 02 01 FF";
        let beacon = parse_event_at("s", packet, 0).unwrap();
        assert_eq!(beacon.calibrated_power, -255);
        assert_eq!(beacon.rssi, -1);
    }

    #[test]
    fn test_malformed_octet_defaults_to_zero() {
        // Major's high octet is not hex; the field decodes as 0x00 * 256 + 1
        let packet = "> 04 3E 2A 02 01 03 01 D1 5B 65 41 2A EA 1E \
                      1A FF 00 59 02 15 \
                      E2 C5 6D B5 DF FB 48 D2 B0 60 D0 F5 A7 10 96 E0 \
                      ZZ 01 00 02 C5 BF";
        let beacon = parse_event_at("s", packet, 0).unwrap();
        assert_eq!(beacon.major, 1);
        assert_eq!(beacon.minor, 2);
    }

    #[test]
    fn test_multibyte_char_in_uuid_region_is_recoverable() {
        // Corrupt sniffer output can leave a non-ASCII character where hex
        // octets belong; the event must be rejected with an error, never
        // abort the stream. The last uuid octet here is "Eé", putting the
        // uuid slice boundary inside the two-byte character.
        let packet = "> 04 3E 2A 02 01 03 01 D1 5B 65 41 2A EA 1E \
                      1A FF 00 59 02 15 \
                      E2 C5 6D B5 DF FB 48 D2 B0 60 D0 F5 A7 10 96 Eé \
                      00 01 00 02 C5 BF";
        assert!(matches!(
            parse_event_at("s", packet, 0),
            Err(ParseError::TooShort { .. })
        ));
    }

    #[test]
    fn test_packet_too_short_for_prefix() {
        assert!(matches!(
            parse_event_at("s", "> 04 3E 2A", 0),
            Err(ParseError::TooShort { .. })
        ));
    }

    #[test]
    fn test_packet_truncated_inside_payload() {
        // Manufacturer block found but the payload is cut off
        let packet = "> 04 3E 2A 02 01 03 01 D1 5B 65 41 2A EA 1E \
                      1A FF 00 59 02 15 E2 C5";
        assert!(matches!(
            parse_event_at("s", packet, 0),
            Err(ParseError::TooShort { .. })
        ));
    }
}
