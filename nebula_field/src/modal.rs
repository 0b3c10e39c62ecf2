//! The question prompt.
//!
//! Two buttons.  "Yes" accepts; "No" jumps away from the pointer every time
//! it is tried, and after enough tries it is gone for good.

use rand::Rng;
use tracing::{debug, info};

pub const MAX_NO_ATTEMPTS: u32 = 7;
/// Largest jump of the "No" button, in pixels.
const DODGE_X: i32 = 90;
const DODGE_Y: i32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptAnswer {
    /// Closed with "Yes"; the caller finishes the tutorial.
    Accepted,
    /// "No" was tried and dodged.
    Dodged { attempts: u32 },
    /// That was the last "No"; only "Yes" remains.
    NoRemoved,
    /// Nothing happened (prompt closed or button already gone).
    Ignored,
}

#[derive(Clone, Debug)]
pub struct PromptModal {
    question:    String,
    open:        bool,
    no_attempts: u32,
    /// Pixel offset of the "No" button from its home spot.
    no_offset:   (i32, i32),
}

impl PromptModal {
    pub fn new(question: impl Into<String>) -> Self {
        PromptModal {
            question:    question.into(),
            open:        false,
            no_attempts: 0,
            no_offset:   (0, 0),
        }
    }

    pub fn question(&self)    -> &str       { &self.question }
    pub fn is_open(&self)     -> bool       { self.open }
    pub fn attempts(&self)    -> u32        { self.no_attempts }
    pub fn no_offset(&self)   -> (i32, i32) { self.no_offset }
    pub fn no_visible(&self)  -> bool       { self.no_attempts < MAX_NO_ATTEMPTS }

    pub fn open(&mut self) {
        info!("prompt shown");
        self.open        = true;
        self.no_attempts = 0;
        self.no_offset   = (0, 0);
    }

    pub fn subtitle(&self) -> &'static str {
        match self.no_attempts {
            0 => "Be honest... but not too honest",
            n if n >= MAX_NO_ATTEMPTS => "Nice try. Only YES is left now.",
            _ => "Nope. try again...",
        }
    }

    pub fn counter(&self) -> String {
        match self.no_attempts {
            0 => String::new(),
            n if n >= MAX_NO_ATTEMPTS => "NO OPTION REMOVED".to_string(),
            n => format!("NO ATTEMPTS: {}/{}", n, MAX_NO_ATTEMPTS),
        }
    }

    pub fn press_yes(&mut self) -> PromptAnswer {
        if !self.open {
            return PromptAnswer::Ignored;
        }
        self.open = false;
        info!(no_attempts = self.no_attempts, "prompt accepted");
        PromptAnswer::Accepted
    }

    pub fn press_no(&mut self, rng: &mut impl Rng) -> PromptAnswer {
        if !self.open || !self.no_visible() {
            return PromptAnswer::Ignored;
        }
        self.no_attempts += 1;
        self.no_offset = (rng.gen_range(-DODGE_X..=DODGE_X), rng.gen_range(-DODGE_Y..=DODGE_Y));
        debug!(attempts = self.no_attempts, offset = ?self.no_offset, "no dodged");

        if self.no_attempts >= MAX_NO_ATTEMPTS {
            PromptAnswer::NoRemoved
        } else {
            PromptAnswer::Dodged { attempts: self.no_attempts }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
