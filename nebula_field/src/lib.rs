//! # nebula_field
//!
//! A field of tens of thousands of particles that a hand in front of the
//! camera reshapes.  Hand poses are held for a second to take effect; a
//! five-step tutorial gates them in order and ends with a question.
//!
//! ## Pose → Effect mapping
//!
//! | Pose | Effect |
//! |---|---|
//! | Open palm | Particles gather into a heart |
//! | Closed palm | Particles spell the love banner |
//! | Pinch (held) | Particles burst into a ring, camera locks |
//! | Middle finger | Particles spell the rebuff banner |
//! | Peace sign | Opens the question prompt (banner once answered) |
//!
//! Wrist position orbits the camera; hand size (closer / farther) zooms.
//!
//! ## Simulation keyboard shortcuts
//!
//! | Key | Effect |
//! |---|---|
//! | `1`–`5` | Show open palm, closed palm, pinch (hold), middle finger, peace |
//! | `0` | Relaxed hand (no pose) |
//! | `H` | Hand in / out of view |
//! | Arrows | Move the wrist |
//! | `=` / `-` | Hand nearer / farther |
//! | `Y` / `N` | Answer the prompt |
//! | `Q` / `Escape` | Quit |

pub mod hand;
pub mod particles;
pub mod hud;
pub mod modal;
pub mod visualizer;
pub mod app;
