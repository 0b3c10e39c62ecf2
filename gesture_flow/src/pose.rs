//! Synthetic hand poses.
//!
//! Builds plausible 21-point [`LandmarkFrame`]s for a chosen set of raised
//! fingers, so the pipeline can be driven without a camera — by the
//! keyboard simulator in the viewer and by the tests here.

use crate::gesture::Gesture;
use crate::landmark::{LandmarkFrame, Point2, LANDMARK_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    fn slot(self) -> usize {
        match self {
            Finger::Index  => 0,
            Finger::Middle => 1,
            Finger::Ring   => 2,
            Finger::Pinky  => 3,
        }
    }
}

/// A hand held upright in front of the camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPose {
    pub wrist:    Point2,
    /// Knuckle width (landmark 5 ↔ 17) in normalized units.
    pub span:     f32,
    pub up:       [bool; 4],
    pub pinching: bool,
}

impl Default for HandPose {
    fn default() -> Self {
        HandPose {
            wrist:    Point2::new(0.5, 0.75),
            span:     0.2,
            up:       [false; 4],
            pinching: false,
        }
    }
}

impl HandPose {
    pub fn with_fingers(fingers: &[Finger]) -> Self {
        let mut pose = HandPose::default();
        for f in fingers {
            pose.up[f.slot()] = true;
        }
        pose
    }

    pub fn open_palm() -> Self { Self::with_fingers(&Finger::ALL) }
    pub fn fist()      -> Self { Self::default() }
    pub fn peace()     -> Self { Self::with_fingers(&[Finger::Index, Finger::Middle]) }
    pub fn middle()    -> Self { Self::with_fingers(&[Finger::Middle]) }

    pub fn pinch() -> Self {
        HandPose { pinching: true, ..Self::default() }
    }

    /// A pose that the classifier maps onto `gesture`.  For
    /// [`Gesture::None`] that is index + ring raised, which matches no rule.
    pub fn for_gesture(gesture: Gesture) -> Self {
        match gesture {
            Gesture::Heart     => Self::open_palm(),
            Gesture::Love      => Self::fist(),
            Gesture::Pinch     => Self::pinch(),
            Gesture::Bitch     => Self::middle(),
            Gesture::Valentine => Self::peace(),
            Gesture::None      => Self::with_fingers(&[Finger::Index, Finger::Ring]),
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.wrist = Point2::new(x, y);
        self
    }

    pub fn span(mut self, span: f32) -> Self {
        self.span = span;
        self
    }

    /// Lay out all 21 landmarks.
    pub fn frame(&self) -> LandmarkFrame {
        let s  = self.span;
        let wx = self.wrist.x;
        let wy = self.wrist.y;

        let mut pts = [Point2::default(); LANDMARK_COUNT];
        pts[0] = self.wrist;

        // Thumb fans out to the left of the palm.
        pts[1] = Point2::new(wx - 0.35 * s, wy - 0.25 * s);
        pts[2] = Point2::new(wx - 0.60 * s, wy - 0.45 * s);
        pts[3] = Point2::new(wx - 0.80 * s, wy - 0.60 * s);
        pts[4] = Point2::new(wx - 1.00 * s, wy - 0.70 * s);

        let columns = [wx - s / 2.0, wx - s / 6.0, wx + s / 6.0, wx + s / 2.0];
        let mcp_y = wy - s;
        let pip_y = mcp_y - 0.35 * s;

        for (slot, &x) in columns.iter().enumerate() {
            let base = 5 + slot * 4;
            let (dip_y, tip_y) = if self.up[slot] {
                (pip_y - 0.25 * s, pip_y - 0.5 * s)
            } else {
                (pip_y + 0.15 * s, pip_y + 0.3 * s)
            };
            pts[base]     = Point2::new(x, mcp_y);
            pts[base + 1] = Point2::new(x, pip_y);
            pts[base + 2] = Point2::new(x, dip_y);
            pts[base + 3] = Point2::new(x, tip_y);
        }

        if self.pinching {
            let tip = pts[8];
            pts[3] = Point2::new(tip.x - 0.02, tip.y + 0.02);
            pts[4] = Point2::new(tip.x + 0.004, tip.y + 0.004);
        }

        LandmarkFrame::new(pts)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
