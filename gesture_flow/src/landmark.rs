//! Landmark normalisation — 21 tracked hand points → a handful of signals.
//!
//! Landmarks follow the usual 21-point hand layout:
//!
//! ```text
//!          8   12  16  20      tips
//!          7   11  15  19
//!     4    6   10  14  18      PIP joints
//!     3    5 — 9 — 13— 17      knuckles (5 ↔ 17 = palm span)
//!     2
//!     1
//!          0                   wrist
//! ```
//!
//! Coordinates are normalized to the image, `y` grows downward, so a finger
//! pointing up has a *smaller* tip `y` than its PIP joint.

use crate::config::ClassifierConfig;
use crate::error::{FlowError, FlowResult};

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:       usize = 0;
pub const THUMB_TIP:   usize = 4;
pub const INDEX_MCP:   usize = 5;
pub const INDEX_PIP:   usize = 6;
pub const INDEX_TIP:   usize = 8;
pub const MIDDLE_PIP:  usize = 10;
pub const MIDDLE_TIP:  usize = 12;
pub const RING_PIP:    usize = 14;
pub const RING_TIP:    usize = 16;
pub const PINKY_MCP:   usize = 17;
pub const PINKY_PIP:   usize = 18;
pub const PINKY_TIP:   usize = 20;

// ════════════════════════════════════════════════════════════════════════════
// Point2 / LandmarkFrame
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Point2 { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One detected hand in one camera frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkFrame {
    points: [Point2; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Point2; LANDMARK_COUNT]) -> Self {
        LandmarkFrame { points }
    }

    /// Build a frame from raw `(x, y)` pairs, as delivered by an inference
    /// backend.
    pub fn from_xy(raw: &[(f32, f32)]) -> FlowResult<Self> {
        if raw.len() != LANDMARK_COUNT {
            return Err(FlowError::LandmarkCount {
                expected: LANDMARK_COUNT,
                actual:   raw.len(),
            });
        }
        let mut points = [Point2::default(); LANDMARK_COUNT];
        for (index, (&(x, y), slot)) in raw.iter().zip(points.iter_mut()).enumerate() {
            if !x.is_finite() || !y.is_finite() {
                return Err(FlowError::NonFiniteLandmark { index });
            }
            *slot = Point2::new(x, y);
        }
        Ok(LandmarkFrame { points })
    }

    pub fn point(&self, index: usize) -> Point2 {
        self.points[index]
    }

    pub fn points(&self) -> &[Point2; LANDMARK_COUNT] {
        &self.points
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandSignals
// ════════════════════════════════════════════════════════════════════════════

/// Everything the classifier and the camera rig need from one hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSignals {
    pub index_up:       bool,
    pub middle_up:      bool,
    pub ring_up:        bool,
    pub pinky_up:       bool,
    pub up_count:       u8,
    pub pinch_distance: f32,
    pub pinching:       bool,
    pub peace:          bool,
    pub middle_only:    bool,
    pub open_palm:      bool,
    pub closed_palm:    bool,
    /// Knuckle-to-knuckle width, grows as the hand approaches the camera.
    pub palm_span:      f32,
    pub wrist:          Point2,
}

impl HandSignals {
    pub fn from_frame(frame: &LandmarkFrame, cfg: &ClassifierConfig) -> Self {
        let up = |tip: usize, pip: usize| {
            frame.point(tip).y < frame.point(pip).y - cfg.up_margin
        };

        let index_up  = up(INDEX_TIP,  INDEX_PIP);
        let middle_up = up(MIDDLE_TIP, MIDDLE_PIP);
        let ring_up   = up(RING_TIP,   RING_PIP);
        let pinky_up  = up(PINKY_TIP,  PINKY_PIP);

        let up_count = [index_up, middle_up, ring_up, pinky_up]
            .iter()
            .filter(|&&f| f)
            .count() as u8;

        let pinch_distance = frame.point(THUMB_TIP).distance(&frame.point(INDEX_TIP));

        let peace       = index_up && middle_up && up_count == 2;
        let middle_only = middle_up && up_count == 1;

        HandSignals {
            index_up,
            middle_up,
            ring_up,
            pinky_up,
            up_count,
            pinch_distance,
            pinching:    pinch_distance < cfg.pinch_threshold,
            peace,
            middle_only,
            open_palm:   up_count >= 3,
            closed_palm: up_count <= 1 && !middle_only && !peace,
            palm_span:   frame.point(INDEX_MCP).distance(&frame.point(PINKY_MCP)),
            wrist:       frame.point(WRIST),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
