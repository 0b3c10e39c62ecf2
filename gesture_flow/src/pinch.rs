//! Pinch interrupt.
//!
//! A pinch bypasses the hold-to-confirm path entirely: it engages on the
//! first pinching frame and ends on the first frame that isn't.  While
//! engaged the camera distance is pinned and the field plays a short burst:
//! particles gather into a tight cluster around one rest particle, then
//! unfold into a ring.
//!
//! ```text
//!   idle ──pinch──▶ active(burst) ──520 ms──▶ active(ring) ──release──▶ idle
//!                        │                                     ▲
//!                        └────────────── release ──────────────┘
//! ```
//!
//! Tutorial credit for the pinch step is only granted on release.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::camera::Mode;
use crate::shape::PointCloud;
use crate::smoothing::ease_in_out;

// ════════════════════════════════════════════════════════════════════════════
// PinchBurst
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct PinchBurst {
    pub start:       Instant,
    pub duration:    Duration,
    /// Rest position of the particle the burst grows from.
    pub seed:        [f32; 2],
    pub ring:        Arc<PointCloud>,
    pub scatter:     f32,
    pub depth_scale: f32,
}

impl PinchBurst {
    /// Linear progress through the burst, `0.0..=1.0`.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = now.saturating_duration_since(self.start).as_secs_f32() / self.duration.as_secs_f32();
        t.clamp(0.0, 1.0)
    }

    pub fn finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn frame(&self, now: Instant) -> BurstFrame {
        BurstFrame {
            seed:        self.seed,
            ring:        Arc::clone(&self.ring),
            eased:       ease_in_out(self.progress(now)),
            scatter:     self.scatter,
            depth_scale: self.depth_scale,
        }
    }
}

/// One render tick of the burst, evaluated per particle by the renderer.
#[derive(Clone, Debug)]
pub struct BurstFrame {
    pub seed:        [f32; 2],
    pub ring:        Arc<PointCloud>,
    pub eased:       f32,
    pub scatter:     f32,
    pub depth_scale: f32,
}

impl BurstFrame {
    /// Where particle `i` (with depth jitter `jitter`) should be right now.
    pub fn target_for(&self, i: usize, jitter: f32) -> [f32; 3] {
        let f = i as f32;
        let sx = self.seed[0] + (f * 12.9898).sin() * self.scatter;
        let sy = self.seed[1] + (f * 78.233).cos() * self.scatter;
        let [rx, ry, _] = self.ring.target_for(i, 0.0);
        [
            sx + (rx - sx) * self.eased,
            sy + (ry - sy) * self.eased,
            jitter * self.depth_scale,
        ]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PinchSession / PinchHandler
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct PinchSession {
    pub pre_pinch_mode:     Mode,
    pub lock_camera_z:      f32,
    pub pending_completion: bool,
    pub burst:              Option<PinchBurst>,
}

/// What the controller must undo when a pinch ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchRelease {
    pub restore_mode:       Mode,
    pub pending_completion: bool,
}

/// Result of advancing the burst by one render tick.
#[derive(Clone, Debug)]
pub enum BurstTick {
    Frame(BurstFrame),
    /// The burst just finished; the ring is now the steady target.
    Landed(Arc<PointCloud>),
}

#[derive(Clone, Debug, Default)]
pub struct PinchHandler {
    session: Option<PinchSession>,
}

impl PinchHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    #[cfg(test)]
    fn session(&self) -> Option<&PinchSession> {
        self.session.as_ref()
    }

    /// Camera distance to hold while a session is open.
    pub fn lock_z(&self) -> Option<f32> {
        self.session.as_ref().map(|s| s.lock_camera_z)
    }

    /// Open a session.  Returns `false` (and changes nothing) if one is
    /// already open.
    pub fn engage(&mut self, mode: Mode, camera_z: f32, pending: bool, burst: PinchBurst) -> bool {
        if self.session.is_some() {
            return false;
        }
        debug!(mode = mode.as_str(), lock_z = camera_z, pending, "pinch engaged");
        self.session = Some(PinchSession {
            pre_pinch_mode:     mode,
            lock_camera_z:      camera_z,
            pending_completion: pending,
            burst:              Some(burst),
        });
        true
    }

    /// Close the session, cancelling any burst still in flight.
    pub fn release(&mut self) -> Option<PinchRelease> {
        let session = self.session.take()?;
        debug!(
            restore = session.pre_pinch_mode.as_str(),
            pending = session.pending_completion,
            burst_cancelled = session.burst.is_some(),
            "pinch released"
        );
        Some(PinchRelease {
            restore_mode:       session.pre_pinch_mode,
            pending_completion: session.pending_completion,
        })
    }

    /// Advance the burst.  `None` once it has landed or when idle.
    pub fn advance(&mut self, now: Instant) -> Option<BurstTick> {
        let session = self.session.as_mut()?;
        let burst = session.burst.as_ref()?;
        if burst.finished(now) {
            let ring = Arc::clone(&burst.ring);
            session.burst = None;
            return Some(BurstTick::Landed(ring));
        }
        Some(BurstTick::Frame(burst.frame(now)))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
