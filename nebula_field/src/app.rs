//! Top-level application state machine.
//!
//! `AppState` owns the `GestureFlow`, the `ParticleField`, the `Hud` and the
//! `PromptModal`.  It feeds hand frames into the flow, folds the resulting
//! `FlowEvent`s into the display state and drives the visualizer each frame.

use std::sync::mpsc::{self, TryRecvError};
use std::time::Instant;

use anyhow::{anyhow, Context};
use gesture_flow::{
    FlowConfig, FlowEvent, FlowResult, Gesture, GestureFlow, LandmarkFrame, ParametricShapes,
    ViewState, Viewport,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::hand::{spawn_hand_source, HandEvent, SimHandSource, SimInput};
use crate::hud::Hud;
use crate::modal::{PromptAnswer, PromptModal};
use crate::particles::ParticleField;
use crate::visualizer::{UiInput, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub flow:     FlowConfig,
    pub width:    usize,
    pub height:   usize,
    /// Force a viewport instead of deriving it from the window size.
    pub viewport: Option<Viewport>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            flow:     FlowConfig::default(),
            width:    1280,
            height:   800,
            viewport: None,
        }
    }
}

impl AppConfig {
    pub fn viewport(&self) -> Viewport {
        self.viewport
            .unwrap_or_else(|| Viewport::classify(self.width, self.height))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── pipeline ─────────────────────────────────────────────────────────
    flow:    GestureFlow,

    // ── display state ────────────────────────────────────────────────────
    field:   ParticleField,
    hud:     Hud,
    modal:   PromptModal,

    // ── "No" button dodges ───────────────────────────────────────────────
    rng:     StdRng,
    started: Instant,
}

impl AppState {
    pub fn new(cfg: &AppConfig, now: Instant) -> FlowResult<Self> {
        let mut shapes = ParametricShapes::new(cfg.flow.seed);
        shapes.fit_viewport(cfg.width, cfg.height);
        let flow = GestureFlow::with_shapes(cfg.flow.clone(), cfg.viewport(), shapes, now)?;

        let field = ParticleField::new(flow.rest_cloud(), cfg.flow.seed);
        let modal = PromptModal::new(cfg.flow.banners.prompt.clone());
        let rng = match cfg.flow.seed {
            Some(s) => StdRng::seed_from_u64(s.wrapping_add(3)),
            None    => StdRng::from_entropy(),
        };

        let mut app = AppState {
            field,
            hud: Hud::new(),
            modal,
            rng,
            started: now,
            flow,
        };
        let initial = app.flow.tutorial_hud();
        app.apply(initial, now);
        Ok(app)
    }

    // ── process one camera frame ─────────────────────────────────────────

    /// Validate a raw tracker frame and feed it to the flow.  A malformed
    /// frame is dropped; the previous hand state stands.
    pub fn handle_hand(&mut self, raw: Option<&[(f32, f32)]>, now: Instant) {
        let frame = match raw {
            None => None,
            Some(points) => match LandmarkFrame::from_xy(points) {
                Ok(f) => Some(f),
                Err(e) => {
                    warn!(error = %e, "dropping malformed hand frame");
                    return;
                }
            },
        };
        let events = self.flow.on_frame(frame.as_ref(), now);
        self.apply(events, now);
    }

    // ── prompt buttons ───────────────────────────────────────────────────

    pub fn handle_ui(&mut self, ui: UiInput, now: Instant) {
        if ui.yes {
            self.answer_yes(now);
        }
        if ui.no {
            self.answer_no();
        }
    }

    pub fn answer_yes(&mut self, now: Instant) -> PromptAnswer {
        let answer = self.modal.press_yes();
        if answer == PromptAnswer::Accepted {
            let mut events = self.flow.complete_step(Gesture::Valentine);
            events.extend(self.flow.lock_forever());
            self.apply(events, now);
        }
        answer
    }

    pub fn answer_no(&mut self) -> PromptAnswer {
        let answer = self.modal.press_no(&mut self.rng);
        if answer == PromptAnswer::NoRemoved {
            info!("no button removed");
        }
        answer
    }

    // ── per-frame tick ───────────────────────────────────────────────────

    pub fn tick(&mut self, now: Instant) {
        let events = self.flow.tick(now);
        self.apply(events, now);
        self.hud.tick(now);
    }

    fn apply(&mut self, events: Vec<FlowEvent>, now: Instant) {
        for event in events {
            match &event {
                FlowEvent::MorphTarget(cloud) => self.field.set_target(cloud),
                FlowEvent::Burst(frame)       => self.field.apply_burst(frame),
                FlowEvent::OpenPrompt         => self.modal.open(),
                FlowEvent::ModeChanged(mode)  => debug!(?mode, "mode"),
                _ => {}
            }
            self.hud.apply(&event, now);
        }
    }

    // ── accessors for the render loop ────────────────────────────────────

    pub fn view(&self)   -> ViewState      { self.flow.view() }
    pub fn field(&self)  -> &ParticleField { &self.field }
    pub fn hud(&self)    -> &Hud           { &self.hud }
    pub fn modal(&self)  -> &PromptModal   { &self.modal }
    pub fn flow(&self)   -> &GestureFlow   { &self.flow }

    /// Seconds since start, for the drift animation.
    pub fn time(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.started).as_secs_f32()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the visualizer and the keyboard hand simulator, then drives the
/// event/render loop at ~60 fps until the window closes or Q is pressed.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    // ── Sim hand channel ─────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let hand_rx = spawn_hand_source(SimHandSource::new(sim_rx));

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(cfg.width, cfg.height, sim_tx)
        .map_err(|e| anyhow!(e))
        .context("opening window")?;

    // ── App state ────────────────────────────────────────────────────────
    let mut app = AppState::new(&cfg, Instant::now()).context("building gesture flow")?;
    info!(viewport = ?cfg.viewport(), particles = app.field().len(), "running");

    // ── Main loop ────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Window input
        let ui = vis.poll_input();
        if !ui.open {
            break;
        }
        let now = Instant::now();

        // 2. Drain hand frames
        loop {
            match hand_rx.try_recv() {
                Ok(HandEvent::Quit) => return Ok(()),
                Ok(HandEvent::Frame(raw)) => app.handle_hand(raw.as_deref(), now),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        // 3. Prompt buttons
        app.handle_ui(ui, now);

        // 4. Per-frame logic
        app.tick(now);

        // 5. Render
        vis.render(app.field(), &app.view(), app.hud(), app.modal(), app.time(now))
            .map_err(|e| anyhow!(e))
            .context("rendering frame")?;
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_flow::pose::HandPose;
    use gesture_flow::Mode;
    use std::time::Duration;

    const FRAME: Duration = Duration::from_millis(16);

    fn make_app() -> (AppState, Instant) {
        let cfg = AppConfig {
            flow: FlowConfig { particle_count: 400, seed: Some(9), ..FlowConfig::default() },
            ..AppConfig::default()
        };
        let now = Instant::now();
        (AppState::new(&cfg, now).unwrap(), now)
    }

    fn raw(gesture: Gesture) -> Vec<(f32, f32)> {
        HandPose::for_gesture(gesture)
            .frame()
            .points()
            .iter()
            .map(|p| (p.x, p.y))
            .collect()
    }

    /// Hold `gesture` for `ms`, one frame and one tick every 16 ms.
    fn hold(app: &mut AppState, now: &mut Instant, gesture: Gesture, ms: u64) {
        let pts = raw(gesture);
        let end = *now + Duration::from_millis(ms);
        while *now < end {
            app.handle_hand(Some(pts.as_slice()), *now);
            app.tick(*now);
            *now += FRAME;
        }
    }

    fn no_hand(app: &mut AppState, now: &mut Instant, ms: u64) {
        let end = *now + Duration::from_millis(ms);
        while *now < end {
            app.handle_hand(None, *now);
            app.tick(*now);
            *now += FRAME;
        }
    }

    /// Walk the tutorial up to the peace step.
    fn reach_peace(app: &mut AppState, now: &mut Instant) {
        for g in [Gesture::Heart, Gesture::Love] {
            hold(app, now, g, 1200);
            no_hand(app, now, 100);
        }
        hold(app, now, Gesture::Pinch, 200);
        no_hand(app, now, 100);
        hold(app, now, Gesture::Bitch, 1200);
        no_hand(app, now, 100);
    }

    #[test]
    fn fresh_app_shows_first_step() {
        let (app, _) = make_app();
        assert_eq!(app.hud().badge(), "FLOW 1/5");
        assert_eq!(app.field().len(), 400);
        assert!(!app.modal().is_open());
    }

    #[test]
    fn open_palm_retargets_particles() {
        let (mut app, mut now) = make_app();
        hold(&mut app, &mut now, Gesture::Heart, 1200);
        assert_eq!(app.view().mode, Mode::Heart);
        assert_eq!(app.hud().badge(), "FLOW 2/5");
        assert!((0..app.field().len()).any(|i| app.field().target(i) != [0.0; 3]));
    }

    #[test]
    fn malformed_frame_is_dropped() {
        let (mut app, now) = make_app();
        app.handle_hand(Some(&[(0.5, 0.5); 3][..]), now);
        assert!(!app.flow().hand_present());
        assert_eq!(app.hud().badge(), "FLOW 1/5");
    }

    #[test]
    fn peace_prompt_then_yes_seals() {
        let (mut app, mut now) = make_app();
        reach_peace(&mut app, &mut now);
        assert_eq!(app.hud().badge(), "FLOW 5/5");
        hold(&mut app, &mut now, Gesture::Valentine, 1200);
        assert!(app.modal().is_open());
        assert!(app.flow().prompt_open());

        assert!(matches!(app.answer_no(), PromptAnswer::Dodged { attempts: 1 }));
        assert!(app.modal().is_open());

        assert_eq!(app.answer_yes(now), PromptAnswer::Accepted);
        assert!(!app.modal().is_open());
        assert!(app.flow().sealed());
        assert_eq!(app.view().mode, Mode::Text);
        assert_eq!(app.hud().badge(), "EXPLORE MODE");

        // Sealed: a second answer does nothing.
        assert_eq!(app.answer_yes(now), PromptAnswer::Ignored);
    }

    #[test]
    fn ui_yes_without_prompt_is_ignored() {
        let (mut app, now) = make_app();
        app.handle_ui(UiInput { open: true, yes: true, no: true }, now);
        assert!(!app.flow().sealed());
        assert_eq!(app.modal().attempts(), 0);
    }

    #[test]
    fn lost_hand_shows_waiting_hint() {
        let (mut app, mut now) = make_app();
        hold(&mut app, &mut now, Gesture::Heart, 100);
        app.handle_hand(None, now);
        assert_eq!(app.hud().hint, "Waiting for Hands");
    }
}
