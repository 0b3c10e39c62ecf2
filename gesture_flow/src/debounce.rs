//! Hold-to-confirm debouncing.
//!
//! A gesture fires once it has been classified identically for the whole
//! hold window, and then not again until the hand lets go of it (a
//! different symbol, `none` included, re-arms it).

use std::time::{Duration, Instant};

use tracing::trace;

use crate::gesture::Gesture;

/// What one observation did to the hold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hold {
    /// A new symbol arrived; the hold timer restarted.
    Reset(Gesture),
    /// Same symbol, still inside the hold window.  Percentage is 0–99.
    Charging(u8),
    /// The hold window just elapsed — execute this gesture.
    Fire(Gesture),
    /// Already fired during this hold.
    Spent,
}

#[derive(Clone, Debug)]
pub struct Debouncer {
    hold:          Duration,
    last:          Gesture,
    hold_start:    Option<Instant>,
    last_executed: Gesture,
}

impl Debouncer {
    pub fn new(hold: Duration) -> Self {
        Debouncer {
            hold,
            last:          Gesture::None,
            hold_start:    None,
            last_executed: Gesture::None,
        }
    }

    pub fn observe(&mut self, gesture: Gesture, now: Instant) -> Hold {
        if gesture == self.last && !gesture.is_none() {
            let held = self
                .hold_start
                .map(|start| now.saturating_duration_since(start))
                .unwrap_or_default();

            if held < self.hold {
                let pct = (held.as_secs_f64() / self.hold.as_secs_f64() * 100.0) as u8;
                trace!(gesture = %gesture, pct, "holding");
                return Hold::Charging(pct.min(99));
            }
            if self.last_executed != gesture {
                self.last_executed = gesture;
                return Hold::Fire(gesture);
            }
            return Hold::Spent;
        }

        self.last          = gesture;
        self.last_executed = Gesture::None;
        self.hold_start    = Some(now);
        Hold::Reset(gesture)
    }

}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HOLD: Duration = Duration::from_millis(1000);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn first_frame_only_resets() {
        let mut d = Debouncer::new(HOLD);
        let t0 = Instant::now();
        assert_eq!(d.observe(Gesture::Heart, t0), Hold::Reset(Gesture::Heart));
    }

    #[test]
    fn fires_at_hold_boundary() {
        let mut d = Debouncer::new(HOLD);
        let t0 = Instant::now();
        d.observe(Gesture::Heart, t0);
        assert_eq!(d.observe(Gesture::Heart, t0 + ms(500)), Hold::Charging(50));
        assert_eq!(d.observe(Gesture::Heart, t0 + ms(999)), Hold::Charging(99));
        assert_eq!(d.observe(Gesture::Heart, t0 + ms(1000)), Hold::Fire(Gesture::Heart));
    }

    #[test]
    fn fires_once_per_hold() {
        let mut d = Debouncer::new(HOLD);
        let t0 = Instant::now();
        d.observe(Gesture::Love, t0);
        assert_eq!(d.observe(Gesture::Love, t0 + ms(1100)), Hold::Fire(Gesture::Love));
        assert_eq!(d.observe(Gesture::Love, t0 + ms(1200)), Hold::Spent);
        assert_eq!(d.observe(Gesture::Love, t0 + ms(5000)), Hold::Spent);
    }

    #[test]
    fn release_rearms() {
        let mut d = Debouncer::new(HOLD);
        let t0 = Instant::now();
        d.observe(Gesture::Love, t0);
        d.observe(Gesture::Love, t0 + ms(1000));
        assert_eq!(d.observe(Gesture::None, t0 + ms(1100)), Hold::Reset(Gesture::None));
        d.observe(Gesture::Love, t0 + ms(1200));
        assert_eq!(d.observe(Gesture::Love, t0 + ms(2200)), Hold::Fire(Gesture::Love));
    }

    #[test]
    fn switching_symbol_restarts_timer() {
        let mut d = Debouncer::new(HOLD);
        let t0 = Instant::now();
        d.observe(Gesture::Heart, t0);
        d.observe(Gesture::Love, t0 + ms(900));
        assert_eq!(d.observe(Gesture::Love, t0 + ms(1000)), Hold::Charging(10));
    }

    #[test]
    fn none_never_charges() {
        let mut d = Debouncer::new(HOLD);
        let t0 = Instant::now();
        d.observe(Gesture::None, t0);
        assert_eq!(d.observe(Gesture::None, t0 + ms(2000)), Hold::Reset(Gesture::None));
    }

    #[test]
    fn charging_tops_out_below_full() {
        let mut d = Debouncer::new(HOLD);
        let t0 = Instant::now();
        d.observe(Gesture::Heart, t0);
        assert_eq!(d.observe(Gesture::Heart, t0 + ms(250)), Hold::Charging(25));
        assert_eq!(d.observe(Gesture::Heart, t0 + Duration::from_micros(999_900)), Hold::Charging(99));
    }

    fn arb_gesture() -> impl Strategy<Value = Gesture> {
        prop::sample::select(Gesture::ALL.to_vec())
    }

    proptest! {
        /// Replay a jittery stream and check every firing against the
        /// stream itself: the fired symbol was seen continuously for the
        /// full hold, and nothing fires twice within one unbroken run.
        #[test]
        fn never_fires_early_or_twice(
            steps in prop::collection::vec((arb_gesture(), 1u64..400), 1..80)
        ) {
            let mut d = Debouncer::new(HOLD);
            let t0 = Instant::now();
            let mut at = Duration::ZERO;
            let mut run_start = Duration::ZERO;
            let mut prev: Option<Gesture> = None;
            let mut fired_this_run = false;

            for (g, gap) in steps {
                at += ms(gap);
                if prev != Some(g) {
                    run_start = at;
                    fired_this_run = false;
                }
                if let Hold::Fire(f) = d.observe(g, t0 + at) {
                    prop_assert_eq!(f, g);
                    prop_assert!(at - run_start >= HOLD);
                    prop_assert!(!fired_this_run);
                    fired_this_run = true;
                }
                prev = Some(g);
            }
        }
    }
}
