//! # gesture_flow
//!
//! Hand-gesture interpretation for an interactive particle field: turns a
//! stream of 21-point hand landmark frames into mode changes, morph
//! targets and camera motion, gated by a fixed five-step tutorial.
//!
//! ## Pipeline
//!
//! ```text
//! LandmarkFrame ─▶ HandSignals ─▶ classify ─▶ TutorialGate::filter
//!                                                  │
//!                         ┌────── pinch ───────────┤
//!                         ▼                        ▼
//!                   PinchHandler              Debouncer ─▶ execute
//!                         │                        │
//!                         └──────────▶ CameraRig ◀─┘ ─▶ ViewState
//! ```
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Hand | Action |
//! |---|---|---|
//! | `heart` | 3+ fingers up | Form the heart curve |
//! | `love` | fist | Show the love banner |
//! | `pinch` | thumb on index tip | Burst into a ring while held; pins the camera |
//! | `bitch` | middle finger alone | Show the rebuff banner |
//! | `valentine` | index + middle | Open the prompt (first time), banner afterwards |
//!
//! Holds must last a full second; a pinch acts immediately.  Until the
//! tutorial is finished only the step it expects is acted on.
//!
//! The crate owns no window and spawns no threads.  [`flow::GestureFlow`]
//! returns [`flow::FlowEvent`]s for the presentation layer to apply.

pub mod error;
pub mod config;
pub mod landmark;
pub mod gesture;
pub mod pose;
pub mod debounce;
pub mod tutorial;
pub mod smoothing;
pub mod camera;
pub mod glyph;
pub mod shape;
pub mod pinch;
pub mod flow;

pub use camera::{Mode, ViewState, Viewport};
pub use config::FlowConfig;
pub use error::{FlowError, FlowResult};
pub use flow::{FlowEvent, GestureFlow, Hint};
pub use gesture::Gesture;
pub use landmark::LandmarkFrame;
pub use pinch::BurstFrame;
pub use shape::{ParametricShapes, PointCloud, ShapeProvider, ShapeRequest};
