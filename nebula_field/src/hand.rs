//! Hand tracking sources.
//!
//! The public interface is [`HandEvent`] delivered over a `mpsc` channel.
//! The render loop doesn't know whether frames came from a tracker or from
//! the keyboard simulator.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use gesture_flow::pose::HandPose;
use gesture_flow::{Gesture, LandmarkFrame};
use tracing::debug;

// ════════════════════════════════════════════════════════════════════════════
// HandEvent
// ════════════════════════════════════════════════════════════════════════════

/// Raw tracker output: `(x, y)` per landmark, normalized to the image.
pub type RawLandmarks = Vec<(f32, f32)>;

#[derive(Clone, Debug)]
pub enum HandEvent {
    /// One camera frame; `None` when no hand is in view.  Not validated
    /// yet, see [`LandmarkFrame::from_xy`].
    Frame(Option<RawLandmarks>),
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`HandEvent`]s over a channel.
pub trait HandSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<HandEvent>);
}

/// Spawn a hand source on its own thread and return the receiving end.
pub fn spawn_hand_source<H: HandSource>(source: H) -> Receiver<HandEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimInput — raw keys from the window
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    KeyDown(SimKey),
    KeyUp(SimKey),
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    /// 1–5 select a pose, 0 relaxes the hand.
    Pose(Gesture),
    ToggleHand,     // H
    Left,           // ←
    Right,          // →
    Up,             // ↑
    Down,           // ↓
    Nearer,         // =
    Farther,        // -
    Quit,           // Q
}

// ════════════════════════════════════════════════════════════════════════════
// SimHand — the simulated hand itself
// ════════════════════════════════════════════════════════════════════════════

const WRIST_STEP: f32 = 0.04;
const SPAN_STEP:  f32 = 0.02;
const SPAN_RANGE: (f32, f32) = (0.08, 0.40);

/// Keyboard-driven hand.  Pose keys latch, except pinch, which lasts only
/// while its key is held.
#[derive(Clone, Debug)]
pub struct SimHand {
    pub present: bool,
    pub pose:    Gesture,
    pub pinch:   bool,
    pub wrist:   (f32, f32),
    pub span:    f32,
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand {
            present: false,
            pose:    Gesture::None,
            pinch:   false,
            wrist:   (0.5, 0.75),
            span:    0.2,
        }
    }
}

impl SimHand {
    pub fn apply(&mut self, input: &SimInput) {
        match *input {
            SimInput::KeyDown(SimKey::Pose(Gesture::Pinch)) => {
                self.present = true;
                self.pinch = true;
            }
            SimInput::KeyUp(SimKey::Pose(Gesture::Pinch)) => self.pinch = false,
            SimInput::KeyDown(SimKey::Pose(g)) => {
                self.present = true;
                self.pose = g;
            }
            SimInput::KeyDown(SimKey::ToggleHand) => self.present = !self.present,
            SimInput::KeyDown(SimKey::Left)  => self.wrist.0 = (self.wrist.0 - WRIST_STEP).max(0.0),
            SimInput::KeyDown(SimKey::Right) => self.wrist.0 = (self.wrist.0 + WRIST_STEP).min(1.0),
            SimInput::KeyDown(SimKey::Up)    => self.wrist.1 = (self.wrist.1 - WRIST_STEP).max(0.3),
            SimInput::KeyDown(SimKey::Down)  => self.wrist.1 = (self.wrist.1 + WRIST_STEP).min(1.0),
            SimInput::KeyDown(SimKey::Nearer) => {
                self.span = (self.span + SPAN_STEP).min(SPAN_RANGE.1);
            }
            SimInput::KeyDown(SimKey::Farther) => {
                self.span = (self.span - SPAN_STEP).max(SPAN_RANGE.0);
            }
            _ => {}
        }
    }

    pub fn frame(&self) -> Option<LandmarkFrame> {
        if !self.present {
            return None;
        }
        let pose = if self.pinch { Gesture::Pinch } else { self.pose };
        Some(
            HandPose::for_gesture(pose)
                .at(self.wrist.0, self.wrist.1)
                .span(self.span)
                .frame(),
        )
    }

    pub fn landmarks(&self) -> Option<RawLandmarks> {
        self.frame()
            .map(|f| f.points().iter().map(|p| (p.x, p.y)).collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource
// ════════════════════════════════════════════════════════════════════════════

/// Emits synthetic landmark frames at a steady rate, like a webcam would.
pub struct SimHandSource {
    pub rx:       Receiver<SimInput>,
    pub interval: Duration,
}

impl SimHandSource {
    /// ~30 Hz, a typical webcam rate.
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimHandSource { rx, interval: Duration::from_millis(33) }
    }
}

impl HandSource for SimHandSource {
    fn run(self: Box<Self>, tx: Sender<HandEvent>) {
        let mut hand = SimHand::default();
        loop {
            loop {
                match self.rx.try_recv() {
                    Ok(SimInput::KeyDown(SimKey::Quit)) => {
                        let _ = tx.send(HandEvent::Quit);
                        return;
                    }
                    Ok(input) => {
                        hand.apply(&input);
                        debug!(?input, pose = %hand.pose, present = hand.present, "sim hand");
                    }
                    Err(TryRecvError::Empty)        => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }
            if tx.send(HandEvent::Frame(hand.landmarks())).is_err() {
                return;
            }
            thread::sleep(self.interval);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
