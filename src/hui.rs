//! HUI fader codec
//!
//! Converts 7-bit controller values to the 14-bit HUI fader range and
//! produces the wire frames for fader move, touch and release.
//!
//! All HUI traffic goes out as Control Change on MIDI channel 1:
//!
//! | Message | Frame 1       | Frame 2       |
//! |---------|---------------|---------------|
//! | Move    | `B0 0z hi`    | `B0 2z lo`    |
//! | Touch   | `B0 0F 0z`    | `B0 2F 40`    |
//! | Release | `B0 0F 0z`    | `B0 2F 00`    |

use std::fmt;

/// Number of HUI faders driven by the bridge.
pub const ZONE_COUNT: usize = 8;

/// Largest 14-bit fader position.
pub const MAX_FADER_VALUE: u16 = 0x3FFF;

/// HUI uses CC on MIDI channel 1.
const STATUS_CC_CH1: u8 = 0xB0;

/// Fader position MSB controllers start here (`0x00 + zone`).
const FADER_HI_BASE: u8 = 0x00;

/// Fader position LSB controllers start here (`0x20 + zone`).
const FADER_LO_BASE: u8 = 0x20;

/// Zone select for switch messages.
const SWITCH_ZONE_SELECT: u8 = 0x0F;

/// Port on/off for switch messages.
const SWITCH_PORT: u8 = 0x2F;

/// Port 0 of a channel strip is the fader touch sensor.
const TOUCH_ON: u8 = 0x40;
const TOUCH_OFF: u8 = 0x00;

/// One of the eight HUI fader channels (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaderZone(u8);

impl FaderZone {
    /// Returns `None` for indices outside 0-7.
    pub fn new(index: u8) -> Option<Self> {
        (usize::from(index) < ZONE_COUNT).then_some(Self(index))
    }

    /// Zone for a slot of an array sized `ZONE_COUNT`.
    pub(crate) fn from_slot(slot: usize) -> Self {
        debug_assert!(slot < ZONE_COUNT);
        Self(slot as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// All zones in ascending order.
    pub fn all() -> impl Iterator<Item = FaderZone> {
        (0..ZONE_COUNT as u8).map(FaderZone)
    }
}

impl fmt::Display for FaderZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound HUI message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuiMessage {
    /// Fader position, 14-bit (0-16383)
    FaderMove { zone: FaderZone, value: u16 },

    /// Fader touch sensor down
    Touch { zone: FaderZone },

    /// Fader touch sensor up
    Release { zone: FaderZone },
}

impl HuiMessage {
    pub fn zone(&self) -> FaderZone {
        match *self {
            HuiMessage::FaderMove { zone, .. }
            | HuiMessage::Touch { zone }
            | HuiMessage::Release { zone } => zone,
        }
    }

    /// Encode to the two 3-byte CC frames sent on the wire.
    pub fn frames(&self) -> [[u8; 3]; 2] {
        match *self {
            HuiMessage::FaderMove { zone, value } => {
                let value = value.min(MAX_FADER_VALUE);
                let hi = ((value >> 7) & 0x7F) as u8;
                let lo = (value & 0x7F) as u8;
                [
                    [STATUS_CC_CH1, FADER_HI_BASE + zone.index(), hi],
                    [STATUS_CC_CH1, FADER_LO_BASE + zone.index(), lo],
                ]
            }
            HuiMessage::Touch { zone } => switch_frames(zone, TOUCH_ON),
            HuiMessage::Release { zone } => switch_frames(zone, TOUCH_OFF),
        }
    }
}

impl fmt::Display for HuiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HuiMessage::FaderMove { zone, value } => write!(f, "Move z:{} v:{}", zone, value),
            HuiMessage::Touch { zone } => write!(f, "Touch z:{}", zone),
            HuiMessage::Release { zone } => write!(f, "Release z:{}", zone),
        }
    }
}

fn switch_frames(zone: FaderZone, port_state: u8) -> [[u8; 3]; 2] {
    [
        [STATUS_CC_CH1, SWITCH_ZONE_SELECT, zone.index()],
        [STATUS_CC_CH1, SWITCH_PORT, port_state],
    ]
}

/// Spread a 7-bit value over the full 14-bit range.
///
/// `v * 129` equals `round(v * 16383 / 127)` for every input, maps 0 to 0 and
/// 127 to 16383. Inputs above 127 saturate.
pub fn scale_7bit_to_14bit(value: u8) -> u16 {
    u16::from(value.min(0x7F)) * 129
}

pub fn encode_move(zone: FaderZone, cc_value: u8) -> HuiMessage {
    HuiMessage::FaderMove {
        zone,
        value: scale_7bit_to_14bit(cc_value),
    }
}

pub fn encode_touch(zone: FaderZone) -> HuiMessage {
    HuiMessage::Touch { zone }
}

pub fn encode_release(zone: FaderZone) -> HuiMessage {
    HuiMessage::Release { zone }
}
