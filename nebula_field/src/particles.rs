//! Particle field state.
//!
//! Every particle has a fixed rest position (the starfield), a current
//! target written by morph events, a point size and a depth jitter.  The
//! displayed position blends rest → target by the controller's morph
//! blend, plus a slow drift that fades as the shape forms.

use std::sync::Arc;

use gesture_flow::{BurstFrame, PointCloud};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ════════════════════════════════════════════════════════════════════════════
// Colour ramp
// ════════════════════════════════════════════════════════════════════════════

pub const CORE_COLOR: u32 = 0xFFFFFFFF;
pub const EDGE_COLOR: u32 = 0xFFFF0D99;
/// Distance from the origin at which particles are fully edge-coloured.
const RAMP_RADIUS: f32 = 30.0;

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

/// White at the core, pink at the edge.  While unmorphed everything leans
/// to the edge colour.
pub fn particle_color(pos: [f32; 3], morph: f32) -> u32 {
    let dist = (pos[0] * pos[0] + pos[1] * pos[1] + pos[2] * pos[2]).sqrt() / RAMP_RADIUS;
    blend(CORE_COLOR, EDGE_COLOR, dist + (1.0 - morph))
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleField
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct ParticleField {
    rest:    Arc<PointCloud>,
    targets: Vec<[f32; 3]>,
    /// Depth given to planar targets, `±0.5`.
    jitter:  Vec<f32>,
    /// Point size factor, `0.5..1.0`.
    sizes:   Vec<f32>,
}

impl ParticleField {
    pub fn new(rest: Arc<PointCloud>, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s.wrapping_add(2)),
            None    => StdRng::from_entropy(),
        };
        let n = rest.len();
        let jitter = (0..n).map(|_| rng.gen::<f32>() - 0.5).collect();
        let sizes  = (0..n).map(|_| 0.5 + rng.gen::<f32>() * 0.5).collect();
        ParticleField {
            targets: vec![[0.0; 3]; n],
            rest,
            jitter,
            sizes,
        }
    }

    pub fn len(&self)      -> usize { self.rest.len() }
    pub fn is_empty(&self) -> bool  { self.rest.is_empty() }

    pub fn rest(&self, i: usize)   -> [f32; 3] { self.rest.points()[i] }
    pub fn target(&self, i: usize) -> [f32; 3] { self.targets[i] }
    pub fn size(&self, i: usize)   -> f32      { self.sizes[i] }

    /// Retarget every particle onto `cloud`.
    pub fn set_target(&mut self, cloud: &PointCloud) {
        for (i, t) in self.targets.iter_mut().enumerate() {
            *t = cloud.target_for(i, self.jitter[i]);
        }
    }

    pub fn apply_burst(&mut self, frame: &BurstFrame) {
        for (i, t) in self.targets.iter_mut().enumerate() {
            *t = frame.target_for(i, self.jitter[i]);
        }
    }

    /// Position to draw particle `i` at, `time` in seconds.
    pub fn position(&self, i: usize, morph: f32, time: f32) -> [f32; 3] {
        let r = self.rest.points()[i];
        let t = self.targets[i];
        let m = morph.clamp(0.0, 1.0);
        let mix = |a: f32, b: f32| a + (b - a) * m;

        let drift = 0.2 * mix(1.0, 0.18);
        [
            mix(r[0], t[0]) + (time * 0.15 + r[2]).sin() * drift,
            mix(r[1], t[1]) + (time * 0.15 + r[0]).cos() * drift,
            mix(r[2], t[2]),
        ]
    }

    /// Size multiplier grows slightly as the shape forms.
    pub fn size_scale(morph: f32) -> f32 {
        1.0 + 0.25 * morph.clamp(0.0, 1.0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn field() -> ParticleField {
        let rest = PointCloud::new(vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [0.0, 10.0, 5.0]]);
        ParticleField::new(Arc::new(rest), Some(1))
    }

    #[test]
    fn jitter_and_size_ranges() {
        let f = field();
        for i in 0..f.len() {
            assert!((-0.5..0.5).contains(&f.jitter[i]));
            assert!((0.5..1.0).contains(&f.size(i)));
        }
    }

    #[test]
    fn planar_target_uses_jitter() {
        let mut f = field();
        f.set_target(&PointCloud::planar(vec![[1.0, 1.0]]));
        for i in 0..f.len() {
            assert_eq!(f.target(i), [1.0, 1.0, f.jitter[i]]);
        }
    }

    #[test]
    fn fully_morphed_sits_near_target() {
        let mut f = field();
        f.set_target(&PointCloud::new(vec![[5.0, 5.0, 5.0]]));
        // drift is 0.036 at full morph
        let p = f.position(1, 1.0, 0.0);
        assert!((p[0] - 5.0).abs() < 0.04 && (p[1] - 5.0).abs() < 0.04);
        assert_eq!(p[2], 5.0);
    }

    #[test]
    fn unmorphed_sits_near_rest() {
        let f = field();
        let p = f.position(2, 0.0, PI);
        assert!((p[0] - 0.0).abs() <= 0.2 && (p[1] - 10.0).abs() <= 0.2);
    }

    #[test]
    fn colour_ramp_ends() {
        assert_eq!(particle_color([0.0; 3], 1.0), CORE_COLOR);
        assert_eq!(particle_color([0.0, 40.0, 0.0], 1.0), EDGE_COLOR);
        assert_eq!(particle_color([0.0; 3], 0.0), EDGE_COLOR);
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }
}
