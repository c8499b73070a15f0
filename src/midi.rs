//! MIDI utilities and inbound message types
//!
//! Parses the raw bytes delivered by the input port into control change
//! events. Only CC messages matter to the bridge; everything else is ignored.

use std::fmt;
use std::time::Instant;

use crate::error::{Error, Result};

/// Largest value a MIDI data byte may carry.
pub const MAX_DATA_BYTE: u8 = 0x7F;

/// Control Change: channel (0-15), cc (0-127), value (0-127)
///
/// Data bytes are kept exactly as received. Range checking happens in one
/// place, [`CcEvent::validate`], which both the engine and its callers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcEvent {
    pub channel: u8,
    pub cc: u8,
    pub value: u8,
}

impl CcEvent {
    pub fn new(channel: u8, cc: u8, value: u8) -> Self {
        Self { channel, cc, value }
    }

    /// Reject controller numbers or values outside 0-127.
    pub fn validate(&self) -> Result<()> {
        if self.cc > MAX_DATA_BYTE {
            return Err(Error::OutOfRange {
                field: "CC number",
                value: self.cc,
            });
        }
        if self.value > MAX_DATA_BYTE {
            return Err(Error::OutOfRange {
                field: "CC value",
                value: self.value,
            });
        }
        Ok(())
    }

    /// Parse a Control Change from raw bytes.
    ///
    /// Returns `None` for anything that is not a complete CC message. Data
    /// bytes are not masked, so a malformed byte surfaces in `validate`.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&status, rest) = data.split_first()?;
        if status & 0xF0 != 0xB0 {
            return None;
        }
        match rest {
            [cc, value, ..] => Some(Self::new(status & 0x0F, *cc, *value)),
            _ => None,
        }
    }
}

impl fmt::Display for CcEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CC ch:{} cc:{} v:{}", self.channel + 1, self.cc, self.value)
    }
}

/// CC event from the input port, stamped on arrival
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub timestamp: Instant,
    pub event: CcEvent,
    pub raw_data: Vec<u8>,
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_change() {
        let data = vec![0xB2, 7, 100]; // CC ch 3, volume, value 100
        let msg = CcEvent::parse(&data).unwrap();

        assert_eq!(msg, CcEvent::new(2, 7, 100));
        assert_eq!(msg.to_string(), "CC ch:3 cc:7 v:100");
    }

    #[test]
    fn test_non_cc_ignored() {
        assert_eq!(CcEvent::parse(&[0x90, 60, 100]), None); // Note On
        assert_eq!(CcEvent::parse(&[0xE0, 0x00, 0x40]), None); // Pitch Bend
        assert_eq!(CcEvent::parse(&[0xF8]), None); // Timing Clock
        assert_eq!(CcEvent::parse(&[]), None);
    }

    #[test]
    fn test_truncated_cc_ignored() {
        assert_eq!(CcEvent::parse(&[0xB0, 7]), None);
    }

    #[test]
    fn test_bad_data_byte_survives_parse_and_fails_validation() {
        let msg = CcEvent::parse(&[0xB0, 7, 0x80]).unwrap();
        assert_eq!(msg.value, 0x80);

        let err = msg.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfRange {
                field: "CC value",
                value: 0x80
            }
        ));

        let msg = CcEvent::new(0, 200, 0);
        assert!(matches!(
            msg.validate(),
            Err(Error::OutOfRange {
                field: "CC number",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(CcEvent::new(0, 0, 0).validate().is_ok());
        assert!(CcEvent::new(15, 127, 127).validate().is_ok());
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0xB0, 0x0F, 0x03]), "B0 0F 03");
        assert_eq!(format_hex(&[]), "");
    }
}
