//! Grouping of raw dump lines into single advertising events.
//!
//! `hcidump -R` prints one advertising event as three consecutive lines:
//! a start line beginning with `"> 04 3E"` and two continuation lines of
//! further hex octets. The grouper recognizes that shape, joins the three
//! lines into one buffer for the parser, and passes everything else through
//! unchanged as diagnostic output.
//!
//! This is a pure state machine with no I/O: the stream driver feeds it one
//! line at a time and acts on the returned [`GrouperOutput`]. That keeps the
//! core crate platform-independent and makes end-of-stream handling explicit
//! through [`EventGrouper::finish`].

use crate::error::ParseError;

/// Start-of-event marker for a BLE advertising report
const EVENT_START: &str = "> 04 3E";

/// Manufacturer specific data marker (0x1A length octet followed by the
/// 0xFF AD type) that a beacon-carrying start line contains
const MANUFACTURER_MARKER: &str = " 1A FF ";

/// Minimum character offset of the manufacturer marker in a start line;
/// anything earlier is still inside the event prefix
const MARKER_MIN_OFFSET: usize = 16;

/// Continuation lines that complete one advertising event
const CONTINUATION_LINES: u32 = 2;

/// Result of feeding one line to the grouper
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrouperOutput {
    /// A complete advertising event, joined into one parse buffer
    Event(String),
    /// A line that did not match the event-start pattern, unmodified
    Passthrough(String),
    /// A continuation line absorbed into the event being assembled
    Consumed,
}

/// State machine over a line-oriented dump stream.
///
/// Idle until a start line arrives, then accumulates exactly two
/// continuation lines and emits the joined event buffer.
#[derive(Debug, Default)]
pub struct EventGrouper {
    pending: Option<Pending>,
}

#[derive(Debug)]
struct Pending {
    buffer: String,
    remaining: u32,
}

/// Check whether a line starts a beacon-carrying advertising event.
fn is_event_start(line: &str) -> bool {
    line.starts_with(EVENT_START)
        && matches!(line.find(MANUFACTURER_MARKER), Some(pos) if pos > MARKER_MIN_OFFSET)
}

impl EventGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line from the stream.
    ///
    /// Trailing whitespace is trimmed from every grouped line; the three
    /// lines of an event are joined with single separating spaces.
    pub fn push_line(&mut self, line: &str) -> GrouperOutput {
        match self.pending.take() {
            Some(mut pending) => {
                pending.buffer.push(' ');
                pending.buffer.push_str(line.trim_end());
                pending.remaining -= 1;
                if pending.remaining == 0 {
                    GrouperOutput::Event(pending.buffer)
                } else {
                    self.pending = Some(pending);
                    GrouperOutput::Consumed
                }
            }
            None => {
                if is_event_start(line) {
                    self.pending = Some(Pending {
                        buffer: line.trim_end().to_string(),
                        remaining: CONTINUATION_LINES,
                    });
                    GrouperOutput::Consumed
                } else {
                    GrouperOutput::Passthrough(line.to_string())
                }
            }
        }
    }

    /// Signal end of stream.
    ///
    /// A stream that ends mid-accumulation is a truncated event: the partial
    /// buffer is discarded, never force-parsed.
    pub fn finish(self) -> Result<(), ParseError> {
        match self.pending {
            None => Ok(()),
            Some(pending) => Err(ParseError::TruncatedEvent {
                want: CONTINUATION_LINES,
                got: CONTINUATION_LINES - pending.remaining,
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str =
        "> 04 3E 2A 02 01 03 01 D1 5B 65 41 2A EA 1E 02 01 1A 1A FF 00 59 02 15 ";
    const CONT1: &str = "  E2 C5 6D B5 DF FB 48 D2 B0 60 D0 F5 A7 10 96 E0 00 01 ";
    const CONT2: &str = "  00 02 C5 BF ";

    #[test]
    fn test_event_start_detection() {
        assert!(is_event_start(START));
        // Right event type but no manufacturer marker
        assert!(!is_event_start(
            "> 04 3E 0C 02 01 04 00 D1 5B 65 41 2A EA 00"
        ));
        // Different HCI event
        assert!(!is_event_start("> 04 0E 04 01 0B 20 00"));
        // Marker too early to be inside the AD structures
        assert!(!is_event_start("> 04 3E 1A FF 00"));
    }

    #[test]
    fn test_groups_three_lines() {
        let mut grouper = EventGrouper::new();
        assert_eq!(grouper.push_line(START), GrouperOutput::Consumed);
        assert_eq!(grouper.push_line(CONT1), GrouperOutput::Consumed);
        let event = match grouper.push_line(CONT2) {
            GrouperOutput::Event(buf) => buf,
            other => panic!("expected event, got {:?}", other),
        };
        // Trailing whitespace trimmed, single separating spaces added
        assert_eq!(
            event,
            format!(
                "{} {} {}",
                START.trim_end(),
                CONT1.trim_end(),
                CONT2.trim_end()
            )
        );
        assert!(grouper.finish().is_ok());
    }

    #[test]
    fn test_non_matching_line_passes_through_unmodified() {
        let mut grouper = EventGrouper::new();
        let line = "< 01 0B 20 07 01 10 00 10 00 00 00 ";
        assert_eq!(
            grouper.push_line(line),
            GrouperOutput::Passthrough(line.to_string())
        );
        // Passthrough does not affect grouping state
        assert_eq!(grouper.push_line(START), GrouperOutput::Consumed);
        assert_eq!(grouper.push_line(CONT1), GrouperOutput::Consumed);
        assert!(matches!(
            grouper.push_line(CONT2),
            GrouperOutput::Event(_)
        ));
    }

    #[test]
    fn test_truncated_event_at_end_of_stream() {
        let mut grouper = EventGrouper::new();
        grouper.push_line(START);
        grouper.push_line(CONT1);
        assert_eq!(
            grouper.finish(),
            Err(ParseError::TruncatedEvent { want: 2, got: 1 })
        );
    }

    #[test]
    fn test_clean_end_of_stream_when_idle() {
        let mut grouper = EventGrouper::new();
        grouper.push_line("noise");
        assert!(grouper.finish().is_ok());
    }
}
