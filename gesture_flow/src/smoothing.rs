//! Frame-rate independent exponential smoothing.
//!
//! Tuning is expressed as "fraction of the remaining distance covered per
//! frame at 60 Hz".  For an arbitrary tick length `dt` the equivalent
//! fraction is `1 − (1 − f)^(60·dt)`, i.e. `1 − exp(−rate·dt)` with
//! `rate = −60·ln(1 − f)`.  At exactly 60 fps this collapses to `f`.

pub const REFERENCE_HZ: f32 = 60.0;

/// Per-tick blend factor for a per-frame fraction `per_frame`.
pub fn factor(per_frame: f32, dt: f32) -> f32 {
    if per_frame >= 1.0 {
        return 1.0;
    }
    let dt = dt.max(0.0);
    (1.0 - (1.0 - per_frame).powf(dt * REFERENCE_HZ)).clamp(0.0, 1.0)
}

/// Move `current` toward `target` by `factor` of the gap.
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Quadratic ease-in-out on `[0, 1]`.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// A scalar chasing a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Smoothed {
    pub current:   f32,
    pub target:    f32,
    pub per_frame: f32,
}

impl Smoothed {
    pub fn new(value: f32, per_frame: f32) -> Self {
        Smoothed { current: value, target: value, per_frame }
    }

    pub fn tick(&mut self, dt: f32) {
        self.current = approach(self.current, self.target, factor(self.per_frame, dt));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
