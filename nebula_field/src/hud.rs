//! Heads-up display state: step badge, tutorial list, hint line, hold
//! progress bar and the centre toast.
//!
//! [`Hud`] folds [`FlowEvent`]s into plain strings the visualizer draws;
//! it never talks to the pipeline.

use std::time::{Duration, Instant};

use gesture_flow::tutorial::TUTORIAL_STEPS;
use gesture_flow::{FlowEvent, Gesture, Hint};

/// Short label for the step list.
pub fn step_label(step: Gesture) -> &'static str {
    match step {
        Gesture::Heart     => "OPEN PALM",
        Gesture::Love      => "CLOSE PALM",
        Gesture::Pinch     => "PINCH",
        Gesture::Bitch     => "HINT",
        Gesture::Valentine => "PEACE",
        Gesture::None      => "",
    }
}

/// Instruction shown on the hint line while `step` is expected.
pub fn step_hint(step: Gesture) -> &'static str {
    match step {
        Gesture::Heart     => "Open palm to wake the nebula",
        Gesture::Love      => "Close palm to gather stars",
        Gesture::Pinch     => "Pinch to reveal a surprise",
        Gesture::Bitch     => "Hint: i dont like u, what hand gesture will u give me?",
        Gesture::Valentine => "Peace sign to ask the question",
        Gesture::None      => "",
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub text:  String,
    pub until: Instant,
}

/// Row of the step list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepState {
    Done,
    Active,
    Pending,
}

#[derive(Clone, Debug)]
pub struct Hud {
    pub hint:     String,
    pub progress: Option<u8>,
    pub toast:    Option<Toast>,
    index:        usize,
    total:        usize,
    done:         bool,
}

impl Default for Hud {
    fn default() -> Self {
        Hud {
            hint:     step_hint(TUTORIAL_STEPS[0]).to_string(),
            progress: None,
            toast:    None,
            index:    0,
            total:    TUTORIAL_STEPS.len(),
            done:     false,
        }
    }
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &FlowEvent, now: Instant) {
        match event {
            FlowEvent::Progress(p) => self.progress = *p,
            FlowEvent::Hint(hint) => {
                self.hint = match hint {
                    Hint::Step(g)         => step_hint(*g).to_string(),
                    Hint::Holding         => "HOLDING...".to_string(),
                    Hint::WaitingForHands => "Waiting for Hands".to_string(),
                    Hint::Clear           => String::new(),
                };
            }
            FlowEvent::Steps { index, total, done } => {
                self.index = *index;
                self.total = *total;
                self.done  = *done;
            }
            FlowEvent::Toast { text, duration } => {
                self.toast = Some(Toast { text: text.clone(), until: now + *duration });
            }
            FlowEvent::ToastDismissed | FlowEvent::PinchEngaged => self.toast = None,
            FlowEvent::OpenPrompt => {
                self.hint.clear();
                self.progress = None;
            }
            _ => {}
        }
    }

    /// Drop the toast once its time is up.
    pub fn tick(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| now >= t.until) {
            self.toast = None;
        }
    }

    pub fn toast_text(&self) -> Option<&str> {
        self.toast.as_ref().map(|t| t.text.as_str())
    }

    pub fn badge(&self) -> String {
        if self.done {
            "EXPLORE MODE".to_string()
        } else {
            format!("FLOW {}/{}", (self.index + 1).min(self.total), self.total)
        }
    }

    pub fn steps(&self) -> impl Iterator<Item = (&'static str, StepState)> + '_ {
        TUTORIAL_STEPS.iter().enumerate().map(move |(i, &g)| {
            let state = if i < self.index {
                StepState::Done
            } else if i == self.index && !self.done {
                StepState::Active
            } else {
                StepState::Pending
            };
            (step_label(g), state)
        })
    }

    /// How long the current toast has left.
    pub fn toast_remaining(&self, now: Instant) -> Duration {
        self.toast
            .as_ref()
            .map(|t| t.until.saturating_duration_since(now))
            .unwrap_or_default()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
