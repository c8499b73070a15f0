//! cc-hui - MIDI CC to HUI fader bridge
//!
//! Turns fader moves from any CC controller into HUI touch/move/release
//! messages so a DAW writes them as volume automation.

pub mod config;
pub mod engine;
pub mod error;
pub mod hui;
pub mod mapping;
pub mod midi;
pub mod ports;
pub mod tracker;

pub use engine::{HuiOutput, TranslationEngine};
pub use error::{Error, Result};
