//! Translation engine
//!
//! Consumes CC events and clock ticks, drives the per-zone activity
//! trackers and forwards the resulting HUI messages to an output, in the
//! order they were emitted. The engine itself does no I/O.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::Result;
use crate::hui::{FaderZone, HuiMessage};
use crate::mapping::ZoneMapper;
use crate::midi::CcEvent;
use crate::tracker::{ActivityTracker, FaderState};

/// Destination for encoded HUI messages
///
/// Implemented by the MIDI output port; tests record messages instead.
pub trait HuiOutput {
    fn send(&mut self, message: &HuiMessage) -> Result<()>;
}

impl HuiOutput for Vec<HuiMessage> {
    fn send(&mut self, message: &HuiMessage) -> Result<()> {
        self.push(*message);
        Ok(())
    }
}

/// CC → HUI translation state for one output
#[derive(Debug, Clone)]
pub struct TranslationEngine {
    mapper: ZoneMapper,
    tracker: ActivityTracker,
    /// Reused between calls to avoid per-event allocation
    pending: Vec<HuiMessage>,
}

impl TranslationEngine {
    pub fn new(mapper: ZoneMapper, inactivity_timeout: Duration) -> Self {
        Self {
            mapper,
            tracker: ActivityTracker::new(inactivity_timeout),
            pending: Vec::with_capacity(2 * crate::hui::ZONE_COUNT),
        }
    }

    pub fn mapper(&self) -> &ZoneMapper {
        &self.mapper
    }

    pub fn inactivity_timeout(&self) -> Duration {
        self.tracker.inactivity_timeout()
    }

    pub fn fader_state(&self, zone: FaderZone) -> &FaderState {
        self.tracker.fader(zone).state()
    }

    /// Number of zones currently touched.
    pub fn active_faders(&self) -> usize {
        self.tracker.active_count()
    }

    /// Handle one inbound CC event.
    ///
    /// Out-of-range events are rejected before any state changes. Unmapped
    /// controllers are ignored. If the output fails, tracker state still
    /// reflects the event and the remaining messages are dropped.
    pub fn on_cc_event(
        &mut self,
        event: &CcEvent,
        now: Instant,
        out: &mut dyn HuiOutput,
    ) -> Result<()> {
        event.validate()?;

        let Some(zone) = self.mapper.resolve(event.cc) else {
            trace!("Ignoring unmapped {}", event);
            return Ok(());
        };

        self.pending.clear();
        self.tracker.on_value(zone, event.value, now, &mut self.pending);
        self.flush(out)
    }

    /// Advance the clock: release zones idle for the inactivity timeout.
    pub fn on_clock_tick(&mut self, now: Instant, out: &mut dyn HuiOutput) -> Result<()> {
        self.pending.clear();
        self.tracker.on_tick(now, &mut self.pending);
        self.flush(out)
    }

    /// Release every touched zone, regardless of the deadline.
    pub fn release_all(&mut self, out: &mut dyn HuiOutput) -> Result<()> {
        self.pending.clear();
        self.tracker.release_all(&mut self.pending);
        self.flush(out)
    }

    fn flush(&mut self, out: &mut dyn HuiOutput) -> Result<()> {
        for message in self.pending.drain(..) {
            debug!("HUI -> {}", message);
            out.send(&message)?;
        }
        Ok(())
    }
}
