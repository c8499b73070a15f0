//! Fader activity tracking
//!
//! Raw CC streams carry no touch information, so gesture boundaries are
//! inferred: the first value after a pause touches the fader, and a quiet
//! period of `inactivity_timeout` releases it.
//!
//! ## States
//! - **Idle**: no touch outstanding
//! - **Active**: touch sent, release not yet sent

use std::time::{Duration, Instant};

use crate::hui::{encode_move, encode_release, encode_touch, FaderZone, HuiMessage, ZONE_COUNT};

/// State for a single fader zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaderState {
    /// Touch sent for the current gesture, no release yet
    pub touched: bool,
    /// Arrival time of the most recent value
    pub last_activity: Option<Instant>,
    /// Last raw 7-bit value received
    pub current_value: u8,
}

/// Touch/release state machine for one zone
#[derive(Debug, Clone)]
pub struct FaderTracker {
    zone: FaderZone,
    state: FaderState,
}

impl FaderTracker {
    pub fn new(zone: FaderZone) -> Self {
        Self {
            zone,
            state: FaderState::default(),
        }
    }

    pub fn zone(&self) -> FaderZone {
        self.zone
    }

    pub fn state(&self) -> &FaderState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.touched
    }

    /// Record a new value; touches first when idle.
    pub fn on_value(&mut self, value: u8, now: Instant, out: &mut Vec<HuiMessage>) {
        self.state.current_value = value;
        self.state.last_activity = Some(now);

        if !self.state.touched {
            out.push(encode_touch(self.zone));
            self.state.touched = true;
        }
        out.push(encode_move(self.zone, self.state.current_value));
    }

    /// Release once `timeout` has elapsed since the last value.
    pub fn on_tick(&mut self, now: Instant, timeout: Duration, out: &mut Vec<HuiMessage>) {
        if !self.state.touched {
            return;
        }
        let Some(last) = self.state.last_activity else {
            return;
        };
        if now.saturating_duration_since(last) >= timeout {
            self.release(out);
        }
    }

    /// Release unconditionally if touched.
    pub fn release(&mut self, out: &mut Vec<HuiMessage>) {
        if self.state.touched {
            out.push(encode_release(self.zone));
            self.state.touched = false;
        }
    }
}

/// Owns one [`FaderTracker`] per zone
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    faders: [FaderTracker; ZONE_COUNT],
    inactivity_timeout: Duration,
}

impl ActivityTracker {
    pub fn new(inactivity_timeout: Duration) -> Self {
        Self {
            faders: std::array::from_fn(|slot| FaderTracker::new(FaderZone::from_slot(slot))),
            inactivity_timeout,
        }
    }

    pub fn inactivity_timeout(&self) -> Duration {
        self.inactivity_timeout
    }

    pub fn fader(&self, zone: FaderZone) -> &FaderTracker {
        &self.faders[usize::from(zone.index())]
    }

    pub fn on_value(&mut self, zone: FaderZone, value: u8, now: Instant, out: &mut Vec<HuiMessage>) {
        self.faders[usize::from(zone.index())].on_value(value, now, out);
    }

    /// Sweep every zone in ascending order.
    pub fn on_tick(&mut self, now: Instant, out: &mut Vec<HuiMessage>) {
        let timeout = self.inactivity_timeout;
        for fader in &mut self.faders {
            fader.on_tick(now, timeout, out);
        }
    }

    /// Release every touched zone in ascending order.
    pub fn release_all(&mut self, out: &mut Vec<HuiMessage>) {
        for fader in &mut self.faders {
            fader.release(out);
        }
    }

    pub fn active_count(&self) -> usize {
        self.faders.iter().filter(|f| f.is_active()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hui::scale_7bit_to_14bit;

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn zone(index: u8) -> FaderZone {
        FaderZone::new(index).unwrap()
    }

    fn ms(t0: Instant, millis: u64) -> Instant {
        t0 + Duration::from_millis(millis)
    }

    #[test]
    fn test_first_value_touches_then_moves() {
        let t0 = Instant::now();
        let mut fader = FaderTracker::new(zone(4));
        let mut out = Vec::new();

        fader.on_value(64, t0, &mut out);

        assert_eq!(
            out,
            vec![
                HuiMessage::Touch { zone: zone(4) },
                HuiMessage::FaderMove {
                    zone: zone(4),
                    value: scale_7bit_to_14bit(64)
                },
            ]
        );
        assert!(fader.is_active());
        assert_eq!(fader.state().current_value, 64);
        assert_eq!(fader.state().last_activity, Some(t0));
    }

    #[test]
    fn test_no_duplicate_touch_while_active() {
        let t0 = Instant::now();
        let mut fader = FaderTracker::new(zone(0));
        let mut out = Vec::new();

        fader.on_value(10, t0, &mut out);
        out.clear();

        for (i, v) in [20u8, 30, 40].iter().enumerate() {
            fader.on_value(*v, ms(t0, 10 * (i as u64 + 1)), &mut out);
        }

        assert_eq!(out.len(), 3);
        assert!(out
            .iter()
            .all(|m| matches!(m, HuiMessage::FaderMove { .. })));
    }

    #[test]
    fn test_release_exactly_at_timeout() {
        let t0 = Instant::now();
        let mut fader = FaderTracker::new(zone(1));
        let mut out = Vec::new();

        fader.on_value(100, t0, &mut out);
        out.clear();

        fader.on_tick(ms(t0, 199), TIMEOUT, &mut out);
        assert!(out.is_empty());
        assert!(fader.is_active());

        fader.on_tick(ms(t0, 200), TIMEOUT, &mut out);
        assert_eq!(out, vec![HuiMessage::Release { zone: zone(1) }]);
        assert!(!fader.is_active());
    }

    #[test]
    fn test_new_value_extends_deadline() {
        let t0 = Instant::now();
        let mut fader = FaderTracker::new(zone(1));
        let mut out = Vec::new();

        fader.on_value(1, t0, &mut out);
        fader.on_value(2, ms(t0, 150), &mut out);
        out.clear();

        fader.on_tick(ms(t0, 300), TIMEOUT, &mut out);
        assert!(out.is_empty());

        fader.on_tick(ms(t0, 350), TIMEOUT, &mut out);
        assert_eq!(out, vec![HuiMessage::Release { zone: zone(1) }]);
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let t0 = Instant::now();
        let mut fader = FaderTracker::new(zone(2));
        let mut out = Vec::new();

        for i in 0..5 {
            fader.on_tick(ms(t0, i * 1000), TIMEOUT, &mut out);
        }
        assert!(out.is_empty());

        // After a full gesture, idle ticks stay silent as well
        fader.on_value(5, t0, &mut out);
        fader.on_tick(ms(t0, 500), TIMEOUT, &mut out);
        out.clear();
        fader.on_tick(ms(t0, 1000), TIMEOUT, &mut out);
        fader.on_tick(ms(t0, 2000), TIMEOUT, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_release_all_only_touched() {
        let t0 = Instant::now();
        let mut tracker = ActivityTracker::new(TIMEOUT);
        let mut out = Vec::new();

        tracker.on_value(zone(5), 1, t0, &mut out);
        tracker.on_value(zone(2), 1, t0, &mut out);
        assert_eq!(tracker.active_count(), 2);
        out.clear();

        tracker.release_all(&mut out);
        assert_eq!(
            out,
            vec![
                HuiMessage::Release { zone: zone(2) },
                HuiMessage::Release { zone: zone(5) },
            ]
        );
        assert_eq!(tracker.active_count(), 0);

        out.clear();
        tracker.release_all(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_sweep_in_zone_order() {
        let t0 = Instant::now();
        let mut tracker = ActivityTracker::new(TIMEOUT);
        let mut out = Vec::new();

        tracker.on_value(zone(6), 1, t0, &mut out);
        tracker.on_value(zone(0), 1, ms(t0, 10), &mut out);
        tracker.on_value(zone(3), 1, ms(t0, 20), &mut out);
        out.clear();

        tracker.on_tick(ms(t0, 500), &mut out);
        assert_eq!(
            out,
            vec![
                HuiMessage::Release { zone: zone(0) },
                HuiMessage::Release { zone: zone(3) },
                HuiMessage::Release { zone: zone(6) },
            ]
        );
    }
}
