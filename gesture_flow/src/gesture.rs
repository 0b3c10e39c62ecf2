//! The gesture vocabulary and the classifier.
//!
//! | Symbol | Pose |
//! |---|---|
//! | `pinch` | thumb tip touching index tip |
//! | `valentine` | peace sign — index + middle raised, nothing else |
//! | `bitch` | middle finger alone |
//! | `heart` | open palm — three or more fingers raised |
//! | `love` | closed palm — at most one finger raised |
//! | `none` | anything else, or no hand |
//!
//! Rules are tried top to bottom; the first match wins.

use std::fmt;
use std::str::FromStr;

use crate::landmark::HandSignals;

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Gesture {
    #[default]
    None,
    Heart,
    Love,
    Pinch,
    Bitch,
    Valentine,
}

impl Gesture {
    pub const ALL: [Gesture; 6] = [
        Gesture::None,
        Gesture::Heart,
        Gesture::Love,
        Gesture::Pinch,
        Gesture::Bitch,
        Gesture::Valentine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::None      => "none",
            Gesture::Heart     => "heart",
            Gesture::Love      => "love",
            Gesture::Pinch     => "pinch",
            Gesture::Bitch     => "bitch",
            Gesture::Valentine => "valentine",
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Gesture::None
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownGesture(pub String);

impl fmt::Display for UnknownGesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown gesture key {:?}", self.0)
    }
}

impl std::error::Error for UnknownGesture {}

impl FromStr for Gesture {
    type Err = UnknownGesture;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gesture::ALL
            .iter()
            .copied()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownGesture(s.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

/// Map one hand's signals onto exactly one gesture.
pub fn classify(s: &HandSignals) -> Gesture {
    if s.pinching {
        Gesture::Pinch
    } else if s.peace {
        Gesture::Valentine
    } else if s.middle_only {
        Gesture::Bitch
    } else if s.open_palm {
        Gesture::Heart
    } else if s.closed_palm {
        Gesture::Love
    } else {
        Gesture::None
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
