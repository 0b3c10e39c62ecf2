//! Ordered tutorial gate.
//!
//! Until the last step is done only the expected gesture gets through to
//! the debouncer; everything else is flattened to `none`.  Pinch is let
//! through regardless because its completion runs on release (see
//! [`crate::pinch`]).  The final `valentine` step only completes when the
//! prompt collaborator accepts, never from a hold.

use tracing::{debug, info};

use crate::gesture::Gesture;

pub const TUTORIAL_STEPS: [Gesture; 5] = [
    Gesture::Heart,
    Gesture::Love,
    Gesture::Pinch,
    Gesture::Bitch,
    Gesture::Valentine,
];

/// How a completion was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Debounced hold executed the gesture.
    Hold,
    /// A pinch session ended.
    Release,
    /// The prompt collaborator accepted.
    Prompt,
}

#[derive(Clone, Debug)]
pub struct TutorialGate {
    steps: [Gesture; 5],
    index: usize,
    done:  bool,
}

impl Default for TutorialGate {
    fn default() -> Self {
        TutorialGate { steps: TUTORIAL_STEPS, index: 0, done: false }
    }
}

impl TutorialGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expected(&self) -> Option<Gesture> {
        if self.done {
            return None;
        }
        self.steps.get(self.index).copied()
    }

    pub fn index(&self) -> usize { self.index }
    pub fn total(&self) -> usize { self.steps.len() }
    pub fn done(&self)  -> bool  { self.done }

    /// Pre-filter applied before the debouncer.
    pub fn filter(&self, detected: Gesture) -> Gesture {
        if self.done || detected == Gesture::Pinch || self.expected() == Some(detected) {
            detected
        } else {
            Gesture::None
        }
    }

    /// Advance past `gesture` if it is the current step.  Returns whether
    /// the gate moved; out-of-order completions are ignored.
    pub fn complete(&mut self, gesture: Gesture, how: Completion) -> bool {
        if self.expected() != Some(gesture) {
            return false;
        }
        if gesture == Gesture::Valentine && how != Completion::Prompt {
            return false;
        }

        self.index = (self.index + 1).min(self.steps.len());
        debug!(step = %gesture, index = self.index, ?how, "tutorial step complete");
        if self.index >= self.steps.len() {
            self.done = true;
            info!("tutorial finished — explore mode");
        }
        true
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_all_but_last(gate: &mut TutorialGate) {
        assert!(gate.complete(Gesture::Heart, Completion::Hold));
        assert!(gate.complete(Gesture::Love,  Completion::Hold));
        assert!(gate.complete(Gesture::Pinch, Completion::Release));
        assert!(gate.complete(Gesture::Bitch, Completion::Hold));
    }

    #[test]
    fn expected_tracks_completions() {
        let mut gate = TutorialGate::new();
        for (n, step) in TUTORIAL_STEPS.iter().enumerate() {
            assert_eq!(gate.expected(), Some(*step));
            assert_eq!(gate.index(), n);
            let how = if *step == Gesture::Valentine { Completion::Prompt } else { Completion::Hold };
            assert!(gate.complete(*step, how));
        }
        assert!(gate.done());
        assert_eq!(gate.expected(), None);
        assert_eq!(gate.index(), 5);
    }

    #[test]
    fn out_of_order_completion_ignored() {
        let mut gate = TutorialGate::new();
        assert!(!gate.complete(Gesture::Love, Completion::Hold));
        assert_eq!(gate.index(), 0);
    }

    #[test]
    fn valentine_needs_the_prompt() {
        let mut gate = TutorialGate::new();
        complete_all_but_last(&mut gate);
        assert!(!gate.complete(Gesture::Valentine, Completion::Hold));
        assert!(!gate.done());
        assert!(gate.complete(Gesture::Valentine, Completion::Prompt));
        assert!(gate.done());
    }

    #[test]
    fn filter_flattens_unexpected() {
        let gate = TutorialGate::new();
        assert_eq!(gate.filter(Gesture::Heart),     Gesture::Heart);
        assert_eq!(gate.filter(Gesture::Love),      Gesture::None);
        assert_eq!(gate.filter(Gesture::Valentine), Gesture::None);
        assert_eq!(gate.filter(Gesture::Bitch),     Gesture::None);
    }

    #[test]
    fn pinch_always_passes_filter() {
        let gate = TutorialGate::new();
        assert_eq!(gate.filter(Gesture::Pinch), Gesture::Pinch);
    }

    #[test]
    fn done_gate_passes_everything() {
        let mut gate = TutorialGate::new();
        complete_all_but_last(&mut gate);
        gate.complete(Gesture::Valentine, Completion::Prompt);
        for g in Gesture::ALL {
            assert_eq!(gate.filter(g), g);
        }
        assert!(!gate.complete(Gesture::Heart, Completion::Hold));
        assert!(gate.done());
    }
}
