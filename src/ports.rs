//! MIDI port adapter
//!
//! Opens the controller input and the HUI output through midir. The input
//! callback runs on midir's thread and only forwards parsed CC events into a
//! channel; all translation happens on the consumer side.

use colored::*;
use midir::{MidiInput, MidiInputConnection, MidiInputPort, MidiOutput, MidiOutputConnection, MidiOutputPort};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::engine::HuiOutput;
use crate::error::{Error, Result};
use crate::hui::HuiMessage;
use crate::midi::{format_hex, CcEvent, InboundEvent};

const CLIENT_NAME: &str = "cc-hui";

/// Capacity of the inbound event channel
pub const EVENT_QUEUE_CAPACITY: usize = 1000;

/// List available MIDI input ports
pub fn list_input_ports() -> Result<Vec<String>> {
    let midi_in = MidiInput::new("cc-hui-scanner")?;
    Ok(midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect())
}

/// List available MIDI output ports
pub fn list_output_ports() -> Result<Vec<String>> {
    let midi_out = MidiOutput::new("cc-hui-scanner")?;
    Ok(midi_out
        .ports()
        .iter()
        .filter_map(|port| midi_out.port_name(port).ok())
        .collect())
}

/// Print discovered ports
pub fn print_ports() -> Result<()> {
    println!("\n{}", "=== MIDI Input Ports ===".bold().cyan());
    for (i, name) in list_input_ports()?.iter().enumerate() {
        println!("  {}: {}", i, name);
    }

    println!("\n{}", "=== MIDI Output Ports ===".bold().cyan());
    for (i, name) in list_output_ports()?.iter().enumerate() {
        println!("  {}: {}", i, name);
    }
    println!();
    Ok(())
}

/// Case-insensitive substring match (Windows-friendly port names)
fn matches_pattern(name: &str, pattern: &str) -> bool {
    name.to_lowercase().contains(&pattern.to_lowercase())
}

fn find_input_port(midi_in: &MidiInput, pattern: &str) -> Option<(MidiInputPort, String)> {
    midi_in.ports().into_iter().find_map(|port| {
        let name = midi_in.port_name(&port).ok()?;
        matches_pattern(&name, pattern).then(|| {
            debug!("Found port '{}' matching pattern '{}'", name, pattern);
            (port, name)
        })
    })
}

fn find_output_port(midi_out: &MidiOutput, pattern: &str) -> Option<(MidiOutputPort, String)> {
    midi_out.ports().into_iter().find_map(|port| {
        let name = midi_out.port_name(&port).ok()?;
        matches_pattern(&name, pattern).then(|| {
            debug!("Found port '{}' matching pattern '{}'", name, pattern);
            (port, name)
        })
    })
}

/// Accept the event when no filter is set or its channel is listed.
fn channel_allowed(filter: Option<&[u8]>, channel: u8) -> bool {
    filter.map_or(true, |channels| channels.contains(&channel))
}

/// Controller input; events arrive on the receiver passed to `connect`
pub struct InputListener {
    _conn: MidiInputConnection<()>,
    port_name: String,
}

impl InputListener {
    /// Connect to the first input whose name contains `pattern`.
    ///
    /// `channels` holds zero-based MIDI channels to accept; `None` accepts all.
    pub fn connect(
        pattern: &str,
        channels: Option<Vec<u8>>,
        event_tx: mpsc::Sender<InboundEvent>,
    ) -> Result<Self> {
        let midi_in = MidiInput::new(&format!("{}-input", CLIENT_NAME))?;

        let (port, port_name) =
            find_input_port(&midi_in, pattern).ok_or_else(|| Error::PortNotFound {
                direction: "input",
                pattern: pattern.to_string(),
            })?;

        info!("Connecting to input port: {}", port_name);

        let conn = midi_in
            .connect(
                &port,
                CLIENT_NAME,
                move |_timestamp, data, _| {
                    let timestamp = Instant::now();

                    let Some(event) = CcEvent::parse(data) else {
                        trace!("Ignoring non-CC input: {}", format_hex(data));
                        return;
                    };
                    if !channel_allowed(channels.as_deref(), event.channel) {
                        trace!("Ignoring {} (channel filtered)", event);
                        return;
                    }

                    let inbound = InboundEvent {
                        timestamp,
                        event,
                        raw_data: data.to_vec(),
                    };

                    // Never block the MIDI thread
                    if let Err(e) = event_tx.try_send(inbound) {
                        warn!("Dropping inbound event: {}", e);
                    }
                },
                (),
            )
            .map_err(|e| Error::Midi(format!("failed to connect to input port: {}", e)))?;

        Ok(Self {
            _conn: conn,
            port_name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// HUI output towards the DAW
pub struct HuiPort {
    conn: MidiOutputConnection,
    port_name: String,
}

impl HuiPort {
    /// Connect to the first output whose name contains `pattern`.
    pub fn connect(pattern: &str) -> Result<Self> {
        let midi_out = MidiOutput::new(&format!("{}-output", CLIENT_NAME))?;

        let (port, port_name) =
            find_output_port(&midi_out, pattern).ok_or_else(|| Error::PortNotFound {
                direction: "output",
                pattern: pattern.to_string(),
            })?;

        info!("Connecting to output port: {}", port_name);

        let conn = midi_out
            .connect(&port, CLIENT_NAME)
            .map_err(|e| Error::Midi(format!("failed to connect to output port: {}", e)))?;

        Ok(Self { conn, port_name })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Send raw MIDI bytes
    pub fn send_raw(&mut self, data: &[u8]) -> Result<()> {
        self.conn.send(data)?;
        debug!("Sent raw: {}", format_hex(data));
        Ok(())
    }

    /// Close the connection and give the port back.
    pub fn close(self) {
        self.conn.close();
        info!("Output port closed: {}", self.port_name);
    }
}

impl HuiOutput for HuiPort {
    fn send(&mut self, message: &HuiMessage) -> Result<()> {
        for frame in message.frames() {
            self.send_raw(&frame)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_matching_is_case_insensitive() {
        assert!(matches_pattern("IAC Driver CC_to_HUI", "cc_to_hui"));
        assert!(matches_pattern("Sparrow 8x60", "SPARROW"));
        assert!(!matches_pattern("Supernova II", "sparrow"));
    }

    #[test]
    fn test_channel_filter() {
        assert!(channel_allowed(None, 15));
        assert!(channel_allowed(Some(&[0, 1]), 1));
        assert!(!channel_allowed(Some(&[0, 1]), 2));
    }

    #[test]
    fn test_port_discovery() {
        // Only checks the backend calls don't panic; CI may have no MIDI
        let _ = list_input_ports();
        let _ = list_output_ports();
    }
}
