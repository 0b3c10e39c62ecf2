//! The gesture pipeline, end to end.
//!
//! [`GestureFlow`] owns every stateful piece and is driven from two
//! directions:
//!
//! | Call | When | Does |
//! |---|---|---|
//! | [`on_frame`](GestureFlow::on_frame) | each camera frame | classify → gate → pinch / debounce → execute |
//! | [`tick`](GestureFlow::tick) | each render frame | advance burst and smoothing |
//! | [`complete_step`](GestureFlow::complete_step) | prompt accepted | finish the tutorial |
//! | [`lock_forever`](GestureFlow::lock_forever) | prompt accepted | never show the prompt again |
//!
//! Each call returns the [`FlowEvent`]s the presentation layer should apply;
//! continuous state (camera, rotation, morph blend) is read with
//! [`view`](GestureFlow::view).
//!
//! Gesture → action while executing a confirmed hold:
//!
//! | Gesture | Mode | Target | Toast |
//! |---|---|---|---|
//! | heart | heart | heart curve | "Forming Heart" |
//! | love | text | love banner | love banner |
//! | bitch | text | rebuff banner | rebuff banner |
//! | valentine (first time) | idle, blend off | — | "WAIT", then prompt |
//! | valentine (sealed/done) | text | prompt banner | "PEACE" |

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::camera::{CameraRig, Mode, ViewState, Viewport};
use crate::config::FlowConfig;
use crate::debounce::{Debouncer, Hold};
use crate::error::FlowResult;
use crate::gesture::{classify, Gesture};
use crate::landmark::{HandSignals, LandmarkFrame};
use crate::pinch::{BurstFrame, BurstTick, PinchBurst, PinchHandler};
use crate::shape::{ParametricShapes, PointCloud, ShapeProvider, ShapeRequest};
use crate::tutorial::{Completion, TutorialGate};

/// Longest render step fed to the smoothers.
const MAX_TICK: f32 = 0.1;
const FIRST_TICK: f32 = 1.0 / 60.0;

// ════════════════════════════════════════════════════════════════════════════
// Events
// ════════════════════════════════════════════════════════════════════════════

/// Hint line under the step badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hint {
    /// Instructions for the current tutorial step.
    Step(Gesture),
    Holding,
    WaitingForHands,
    Clear,
}

#[derive(Clone, Debug)]
pub enum FlowEvent {
    ModeChanged(Mode),
    /// New steady morph target; blend is switched on alongside it.
    MorphTarget(Arc<PointCloud>),
    MorphBlend(bool),
    /// Per-tick burst targets while a pinch burst plays.
    Burst(BurstFrame),
    PinchEngaged,
    PinchReleased,
    /// Hold progress bar, `None` hides it.
    Progress(Option<u8>),
    Hint(Hint),
    Steps { index: usize, total: usize, done: bool },
    Toast { text: String, duration: Duration },
    ToastDismissed,
    OpenPrompt,
    StepCompleted(Gesture),
}

impl FlowEvent {
    fn toast(text: impl Into<String>, ms: u64) -> Self {
        FlowEvent::Toast { text: text.into(), duration: Duration::from_millis(ms) }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureFlow
// ════════════════════════════════════════════════════════════════════════════

pub struct GestureFlow<P: ShapeProvider = ParametricShapes> {
    cfg:          FlowConfig,
    shapes:       P,
    rig:          CameraRig,
    debouncer:    Debouncer,
    gate:         TutorialGate,
    pinch:        PinchHandler,
    rng:          StdRng,
    rest:         Arc<PointCloud>,

    hand_present: bool,
    prompt_open:  bool,
    /// Set once the prompt has been accepted; it never opens again.
    sealed:       bool,

    started:      Instant,
    last_tick:    Option<Instant>,
}

impl GestureFlow<ParametricShapes> {
    pub fn new(cfg: FlowConfig, viewport: Viewport, now: Instant) -> FlowResult<Self> {
        let shapes = ParametricShapes::new(cfg.seed);
        Self::with_shapes(cfg, viewport, shapes, now)
    }
}

impl<P: ShapeProvider> GestureFlow<P> {
    pub fn with_shapes(cfg: FlowConfig, viewport: Viewport, mut shapes: P, now: Instant) -> FlowResult<Self> {
        cfg.validate()?;

        let rest = Arc::new(shapes.shape(ShapeRequest::Starfield { count: cfg.particle_count }));
        let rng = match cfg.seed {
            Some(s) => StdRng::seed_from_u64(s.wrapping_add(1)),
            None    => StdRng::from_entropy(),
        };
        info!(particles = cfg.particle_count, ?viewport, "gesture flow ready");

        Ok(GestureFlow {
            rig:          CameraRig::new(&cfg, viewport),
            debouncer:    Debouncer::new(Duration::from_millis(cfg.hold.hold_ms)),
            gate:         TutorialGate::new(),
            pinch:        PinchHandler::new(),
            cfg,
            shapes,
            rng,
            rest,
            hand_present: false,
            prompt_open:  false,
            sealed:       false,
            started:      now,
            last_tick:    None,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn view(&self)           -> ViewState        { self.rig.view() }
    pub fn rest_cloud(&self)     -> Arc<PointCloud>  { Arc::clone(&self.rest) }
    pub fn gate(&self)           -> &TutorialGate    { &self.gate }
    pub fn config(&self)         -> &FlowConfig      { &self.cfg }
    pub fn hand_present(&self)   -> bool             { self.hand_present }
    pub fn prompt_open(&self)    -> bool             { self.prompt_open }
    pub fn sealed(&self)         -> bool             { self.sealed }
    pub fn pinch_active(&self)   -> bool             { self.pinch.is_active() }

    /// Window resized: refit banner text and pick the viewport class.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.shapes.resize(width, height);
        self.set_viewport(Viewport::classify(width, height));
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.rig.viewport() {
            debug!(?viewport, "viewport class changed");
            self.rig.set_viewport(viewport);
        }
    }

    /// Badge and hint for the current tutorial position.
    pub fn tutorial_hud(&self) -> Vec<FlowEvent> {
        let mut out = Vec::new();
        self.push_tutorial_hud(&mut out);
        out
    }

    // ── Camera frames ────────────────────────────────────────────────────

    pub fn on_frame(&mut self, frame: Option<&LandmarkFrame>, now: Instant) -> Vec<FlowEvent> {
        let mut out = Vec::new();
        self.hand_present = frame.is_some();

        if self.prompt_open {
            out.push(FlowEvent::Progress(None));
            return out;
        }

        let detected = match frame {
            Some(frame) => {
                let signals = HandSignals::from_frame(frame, &self.cfg.classifier);
                self.rig.track_hand(signals.wrist.x, signals.wrist.y, signals.palm_span);
                classify(&signals)
            }
            None => {
                self.rig.relax_proximity();
                Gesture::None
            }
        };
        let gated = self.gate.filter(detected);

        if gated == Gesture::Pinch {
            if !self.pinch.is_active() {
                self.engage_pinch(now, &mut out);
            }
            return out;
        }
        if self.pinch.is_active() {
            self.release_pinch(&mut out);
        }

        match self.debouncer.observe(gated, now) {
            Hold::Reset(g) => {
                out.push(FlowEvent::Progress(None));
                if g.is_none() {
                    if self.hand_present {
                        self.push_tutorial_hud(&mut out);
                    } else {
                        self.set_mode(Mode::Idle, &mut out);
                        self.set_blend(false, &mut out);
                        out.push(FlowEvent::Hint(Hint::WaitingForHands));
                    }
                } else {
                    debug!(gesture = %g, "hold started");
                }
            }
            Hold::Charging(pct) => {
                out.push(FlowEvent::Progress(Some(pct)));
                out.push(FlowEvent::Hint(Hint::Holding));
            }
            Hold::Fire(g) => {
                out.push(FlowEvent::Progress(None));
                self.execute(g, &mut out);
            }
            Hold::Spent => out.push(FlowEvent::Progress(None)),
        }
        out
    }

    // ── Render frames ────────────────────────────────────────────────────

    pub fn tick(&mut self, now: Instant) -> Vec<FlowEvent> {
        let dt = match self.last_tick {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f32().min(MAX_TICK),
            None       => FIRST_TICK,
        };
        self.last_tick = Some(now);
        let elapsed = now.saturating_duration_since(self.started).as_secs_f32();

        let mut out = Vec::new();
        match self.pinch.advance(now) {
            Some(BurstTick::Frame(frame)) => out.push(FlowEvent::Burst(frame)),
            Some(BurstTick::Landed(ring)) => {
                debug!("pinch burst landed");
                self.publish_target(ring, &mut out);
            }
            None => {}
        }

        self.rig.tick(dt, elapsed, self.pinch.lock_z(), self.hand_present);
        out
    }

    // ── Prompt collaborator ──────────────────────────────────────────────

    /// External completion.  `Valentine` is the prompt's accept path: it
    /// closes the prompt and shows the prompt banner.  With no prompt open
    /// and another step expected it does nothing.
    pub fn complete_step(&mut self, gesture: Gesture) -> Vec<FlowEvent> {
        let mut out = Vec::new();
        match gesture {
            Gesture::Valentine => {
                if !self.prompt_open && self.gate.expected() != Some(Gesture::Valentine) {
                    return out;
                }
                self.prompt_open = false;
                if self.gate.expected() == Some(Gesture::Valentine) {
                    self.advance_step(Gesture::Valentine, Completion::Prompt, &mut out);
                }
                self.push_tutorial_hud(&mut out);
                info!("prompt accepted");

                self.set_mode(Mode::Text, &mut out);
                out.push(FlowEvent::toast("OKAYYYYY", 1100));
                let banner = self.cfg.banners.prompt.clone();
                self.publish_text(&banner, &mut out);
            }
            Gesture::Heart | Gesture::Love | Gesture::Pinch | Gesture::Bitch => {
                if self.advance_step(gesture, Completion::Hold, &mut out) {
                    self.push_tutorial_hud(&mut out);
                }
            }
            Gesture::None => {}
        }
        out
    }

    pub fn lock_forever(&mut self) -> Vec<FlowEvent> {
        if !self.sealed {
            info!("prompt sealed");
        }
        self.sealed = true;
        self.prompt_open = false;
        self.tutorial_hud()
    }

    // ════════════════════════════════════════════════════════════════════
    // Internals
    // ════════════════════════════════════════════════════════════════════

    fn engage_pinch(&mut self, now: Instant, out: &mut Vec<FlowEvent>) {
        let b = self.cfg.burst;
        let seed = match self.rest.len() {
            0 => [0.0, 0.0],
            n => {
                let [x, y, _] = self.rest.points()[self.rng.gen_range(0..n)];
                [x, y]
            }
        };
        let (radius, thickness) = match self.rig.viewport() {
            Viewport::Standard => (b.ring_radius, b.ring_thickness),
            Viewport::Compact  => (b.compact_ring_radius, b.compact_ring_thickness),
        };
        let ring = Arc::new(self.shapes.shape(ShapeRequest::Ring {
            count: b.ring_count,
            radius,
            thickness,
        }));
        let cluster = Arc::new(self.shapes.shape(ShapeRequest::Cluster {
            center: seed,
            radius: b.seed_radius,
            count:  b.seed_count,
        }));

        let pending = self.gate.expected() == Some(Gesture::Pinch);
        let burst = PinchBurst {
            start:       now,
            duration:    Duration::from_millis(b.duration_ms),
            seed,
            ring,
            scatter:     b.scatter,
            depth_scale: b.depth_scale,
        };
        if !self.pinch.engage(self.rig.mode(), self.rig.camera_z(), pending, burst) {
            return;
        }
        self.rig.set_zoom_allowed(false);

        out.push(FlowEvent::ToastDismissed);
        out.push(FlowEvent::Progress(None));
        self.publish_target(cluster, out);
        out.push(FlowEvent::Hint(Hint::Clear));
        out.push(FlowEvent::PinchEngaged);
    }

    fn release_pinch(&mut self, out: &mut Vec<FlowEvent>) {
        let Some(release) = self.pinch.release() else {
            return;
        };
        self.rig.set_zoom_allowed(true);
        self.set_mode(release.restore_mode, out);
        out.push(FlowEvent::PinchReleased);

        if release.pending_completion && self.gate.expected() == Some(Gesture::Pinch) {
            self.advance_step(Gesture::Pinch, Completion::Release, out);
        }
        self.push_tutorial_hud(out);
    }

    fn execute(&mut self, gesture: Gesture, out: &mut Vec<FlowEvent>) {
        debug!(gesture = %gesture, "execute");
        match gesture {
            Gesture::Heart => {
                self.set_mode(Mode::Heart, out);
                out.push(FlowEvent::Hint(Hint::Clear));
                out.push(FlowEvent::toast("Forming Heart", 700));
                let cloud = self.shapes.shape(ShapeRequest::Heart { count: self.cfg.particle_count });
                self.publish_target(Arc::new(cloud), out);
                self.advance_step(Gesture::Heart, Completion::Hold, out);
            }
            Gesture::Love => {
                let banner = self.cfg.banners.love.clone();
                self.show_banner(&banner, out);
                self.advance_step(Gesture::Love, Completion::Hold, out);
            }
            Gesture::Bitch => {
                let banner = self.cfg.banners.rebuff.clone();
                self.show_banner(&banner, out);
                self.advance_step(Gesture::Bitch, Completion::Hold, out);
            }
            Gesture::Valentine => {
                if self.sealed || self.gate.done() {
                    self.set_mode(Mode::Text, out);
                    out.push(FlowEvent::Hint(Hint::Clear));
                    out.push(FlowEvent::toast("PEACE", 750));
                    let banner = self.cfg.banners.prompt.clone();
                    self.publish_text(&banner, out);
                } else {
                    self.set_mode(Mode::Idle, out);
                    self.set_blend(false, out);
                    out.push(FlowEvent::toast("WAIT", 700));
                    self.prompt_open = true;
                    out.push(FlowEvent::OpenPrompt);
                    out.push(FlowEvent::Hint(Hint::Clear));
                    info!("prompt opened");
                }
                return;
            }
            Gesture::Pinch | Gesture::None => return,
        }
        self.push_tutorial_hud(out);
    }

    fn show_banner(&mut self, text: &str, out: &mut Vec<FlowEvent>) {
        self.set_mode(Mode::Text, out);
        out.push(FlowEvent::Hint(Hint::Clear));
        out.push(FlowEvent::toast(text, 900));
        self.publish_text(text, out);
    }

    fn advance_step(&mut self, gesture: Gesture, how: Completion, out: &mut Vec<FlowEvent>) -> bool {
        if !self.gate.complete(gesture, how) {
            return false;
        }
        out.push(FlowEvent::StepCompleted(gesture));
        if how != Completion::Prompt {
            out.push(FlowEvent::toast("STEP COMPLETE", 650));
        }
        true
    }

    fn push_tutorial_hud(&self, out: &mut Vec<FlowEvent>) {
        out.push(FlowEvent::Steps {
            index: self.gate.index(),
            total: self.gate.total(),
            done:  self.gate.done(),
        });
        if self.prompt_open {
            return;
        }
        if let Some(step) = self.gate.expected() {
            out.push(FlowEvent::Hint(Hint::Step(step)));
        }
    }

    fn set_mode(&mut self, mode: Mode, out: &mut Vec<FlowEvent>) {
        let changed = self.rig.mode() != mode;
        self.rig.set_mode(mode);
        if changed {
            out.push(FlowEvent::ModeChanged(mode));
        }
    }

    fn set_blend(&mut self, on: bool, out: &mut Vec<FlowEvent>) {
        self.rig.set_morph(on);
        out.push(FlowEvent::MorphBlend(on));
    }

    fn publish_text(&mut self, text: &str, out: &mut Vec<FlowEvent>) {
        let cloud = self.shapes.shape(ShapeRequest::Text(text));
        self.publish_target(Arc::new(cloud), out);
    }

    fn publish_target(&mut self, cloud: Arc<PointCloud>, out: &mut Vec<FlowEvent>) {
        out.push(FlowEvent::MorphTarget(cloud));
        self.set_blend(true, out);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::HandPose;

    const FRAME: Duration = Duration::from_millis(33);

    fn cfg() -> FlowConfig {
        FlowConfig { particle_count: 500, seed: Some(3), ..FlowConfig::default() }
    }

    struct Rig {
        flow: GestureFlow,
        now:  Instant,
    }

    impl Rig {
        fn new() -> Self {
            let now = Instant::now();
            Rig { flow: GestureFlow::new(cfg(), Viewport::Standard, now).unwrap(), now }
        }

        /// Feed `ms` worth of camera frames showing `gesture`, ticking the
        /// renderer once per frame.
        fn hold(&mut self, gesture: Gesture, ms: u64) -> Vec<FlowEvent> {
            let frame = HandPose::for_gesture(gesture).frame();
            self.feed(Some(&frame), ms)
        }

        fn no_hand(&mut self, ms: u64) -> Vec<FlowEvent> {
            self.feed(None, ms)
        }

        fn feed(&mut self, frame: Option<&LandmarkFrame>, ms: u64) -> Vec<FlowEvent> {
            let end = self.now + Duration::from_millis(ms);
            let mut out = Vec::new();
            loop {
                out.extend(self.flow.on_frame(frame, self.now));
                out.extend(self.flow.tick(self.now));
                if self.now >= end {
                    break;
                }
                self.now += FRAME;
            }
            out
        }

        fn step(&mut self, gesture: Gesture) {
            self.hold(gesture, 1100);
            self.no_hand(100);
        }
    }

    fn completed(events: &[FlowEvent]) -> Vec<Gesture> {
        events
            .iter()
            .filter_map(|e| match e {
                FlowEvent::StepCompleted(g) => Some(*g),
                _ => None,
            })
            .collect()
    }

    fn toasts(events: &[FlowEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                FlowEvent::Toast { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(events: &[FlowEvent], pred: impl Fn(&FlowEvent) -> bool) -> usize {
        events.iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn open_palm_hold_forms_heart_and_advances() {
        let mut r = Rig::new();
        let ev = r.hold(Gesture::Heart, 1100);
        assert_eq!(completed(&ev), vec![Gesture::Heart]);
        assert_eq!(r.flow.view().mode, Mode::Heart);
        assert_eq!(r.flow.gate().expected(), Some(Gesture::Love));
        assert!(toasts(&ev).contains(&"Forming Heart".to_string()));
        assert!(ev.iter().any(|e| matches!(e, FlowEvent::MorphTarget(c) if c.len() == 500)));
    }

    #[test]
    fn short_hold_does_nothing() {
        let mut r = Rig::new();
        let ev = r.hold(Gesture::Heart, 900);
        assert!(completed(&ev).is_empty());
        assert!(ev.iter().any(|e| matches!(e, FlowEvent::Progress(Some(p)) if *p > 80)));
        assert_eq!(r.flow.gate().index(), 0);
    }

    #[test]
    fn out_of_order_gesture_is_ignored() {
        let mut r = Rig::new();
        let ev = r.hold(Gesture::Love, 2000);
        assert!(completed(&ev).is_empty());
        assert_eq!(r.flow.view().mode, Mode::Idle);
        assert_eq!(r.flow.gate().index(), 0);
    }

    #[test]
    fn pinch_completes_on_release_exactly_once() {
        let mut r = Rig::new();
        r.step(Gesture::Heart);
        r.step(Gesture::Love);
        assert_eq!(r.flow.gate().expected(), Some(Gesture::Pinch));

        let ev = r.hold(Gesture::Pinch, 1500);
        assert!(completed(&ev).is_empty());
        assert_eq!(count(&ev, |e| matches!(e, FlowEvent::PinchEngaged)), 1);

        let ev = r.no_hand(500);
        assert_eq!(completed(&ev), vec![Gesture::Pinch]);
        assert_eq!(count(&ev, |e| matches!(e, FlowEvent::PinchReleased)), 1);
        assert_eq!(r.flow.gate().expected(), Some(Gesture::Bitch));
        // Pre-pinch mode restored.
        assert_eq!(r.flow.view().mode, Mode::Idle);
    }

    #[test]
    fn pinch_restores_pre_pinch_mode() {
        let mut r = Rig::new();
        r.hold(Gesture::Heart, 1100);
        assert_eq!(r.flow.view().mode, Mode::Heart);
        r.hold(Gesture::Pinch, 200);
        assert!(r.flow.pinch_active());
        let frame = HandPose::open_palm().frame();
        r.flow.on_frame(Some(&frame), r.now + FRAME);
        assert!(!r.flow.pinch_active());
        assert_eq!(r.flow.view().mode, Mode::Heart);
    }

    #[test]
    fn early_pinch_fires_but_does_not_advance() {
        let mut r = Rig::new();
        let ev = r.hold(Gesture::Pinch, 300);
        assert_eq!(count(&ev, |e| matches!(e, FlowEvent::PinchEngaged)), 1);
        let ev = r.no_hand(100);
        assert!(completed(&ev).is_empty());
        assert_eq!(r.flow.gate().expected(), Some(Gesture::Heart));
    }

    #[test]
    fn camera_target_locked_during_pinch() {
        let mut r = Rig::new();
        r.no_hand(2000);
        let pinch = HandPose::pinch().frame();
        r.flow.on_frame(Some(&pinch), r.now);
        let locked = r.flow.view().camera_z;

        // Hand rushes toward the camera while still pinching.
        let near = HandPose::pinch().span(0.45).frame();
        for _ in 0..60 {
            r.now += FRAME;
            r.flow.on_frame(Some(&near), r.now);
            r.flow.tick(r.now);
            assert_eq!(r.flow.view().target_camera_z, locked);
        }
        assert!((r.flow.view().camera_z - locked).abs() < 1e-3);
    }

    #[test]
    fn burst_runs_then_lands_on_ring() {
        let mut r = Rig::new();
        let ev = r.hold(Gesture::Pinch, 800);
        let bursts = count(&ev, |e| matches!(e, FlowEvent::Burst(_)));
        assert!(bursts >= 10, "{}", bursts);
        let ring_len = cfg().burst.ring_count;
        assert!(ev.iter().any(|e| matches!(e, FlowEvent::MorphTarget(c) if c.len() == ring_len)));
        // Cluster published first.
        let first = ev.iter().find_map(|e| match e {
            FlowEvent::MorphTarget(c) => Some(c.len()),
            _ => None,
        });
        assert_eq!(first, Some(cfg().burst.seed_count));
    }

    #[test]
    fn valentine_opens_prompt_then_locks_input() {
        let mut r = Rig::new();
        for g in [Gesture::Heart, Gesture::Love] {
            r.step(g);
        }
        r.hold(Gesture::Pinch, 200);
        r.no_hand(100);
        r.step(Gesture::Bitch);
        assert_eq!(r.flow.gate().expected(), Some(Gesture::Valentine));

        let ev = r.hold(Gesture::Valentine, 1100);
        assert_eq!(count(&ev, |e| matches!(e, FlowEvent::OpenPrompt)), 1);
        assert!(completed(&ev).is_empty());
        assert!(r.flow.prompt_open());
        assert_eq!(r.flow.view().mode, Mode::Idle);

        // Anything shown while the prompt is up is ignored.
        let ev = r.hold(Gesture::Valentine, 3000);
        assert_eq!(count(&ev, |e| matches!(e, FlowEvent::OpenPrompt)), 0);

        let ev = r.flow.complete_step(Gesture::Valentine);
        r.flow.lock_forever();
        assert_eq!(completed(&ev), vec![Gesture::Valentine]);
        assert!(toasts(&ev).contains(&"OKAYYYYY".to_string()));
        assert!(r.flow.gate().done());
        assert!(r.flow.sealed());
        assert_eq!(r.flow.view().mode, Mode::Text);
    }

    #[test]
    fn sealed_valentine_shows_banner_without_prompt() {
        let mut r = Rig::new();
        r.flow.lock_forever();
        // Not done: gate still expects heart, so valentine is filtered out.
        let ev = r.hold(Gesture::Valentine, 1500);
        assert_eq!(count(&ev, |e| matches!(e, FlowEvent::OpenPrompt)), 0);
        assert_eq!(r.flow.view().mode, Mode::Idle);
    }

    #[test]
    fn explore_mode_accepts_any_gesture() {
        let mut r = Rig::new();
        r.step(Gesture::Heart);
        r.step(Gesture::Love);
        r.hold(Gesture::Pinch, 200);
        r.no_hand(100);
        r.step(Gesture::Bitch);
        r.hold(Gesture::Valentine, 1100);
        r.flow.complete_step(Gesture::Valentine);
        r.flow.lock_forever();
        r.no_hand(100);

        let ev = r.hold(Gesture::Love, 1100);
        assert!(toasts(&ev).contains(&"I LOVE YOUUU".to_string()));
        assert!(completed(&ev).is_empty());
        r.no_hand(100);

        let ev = r.hold(Gesture::Valentine, 1100);
        assert!(toasts(&ev).contains(&"PEACE".to_string()));
        assert_eq!(count(&ev, |e| matches!(e, FlowEvent::OpenPrompt)), 0);
        assert!(!r.flow.prompt_open());
    }

    #[test]
    fn explore_mode_rebuff_sets_text_mode() {
        let mut r = Rig::new();
        r.step(Gesture::Heart);
        r.step(Gesture::Love);
        r.hold(Gesture::Pinch, 200);
        r.no_hand(100);
        r.step(Gesture::Bitch);
        r.hold(Gesture::Valentine, 1100);
        r.flow.complete_step(Gesture::Valentine);
        r.flow.lock_forever();
        r.no_hand(100);
        assert!(r.flow.gate().done());

        r.hold(Gesture::Heart, 1100);
        assert_eq!(r.flow.view().mode, Mode::Heart);
        r.no_hand(100);

        let ev = r.hold(Gesture::Bitch, 1100);
        assert_eq!(r.flow.view().mode, Mode::Text);
        assert!(completed(&ev).is_empty());
    }

    #[test]
    fn one_frame_pinch_advances_exactly_once() {
        let mut r = Rig::new();
        r.step(Gesture::Heart);
        r.step(Gesture::Love);
        assert_eq!(r.flow.gate().index(), 2);

        let pinch = HandPose::for_gesture(Gesture::Pinch).frame();
        let mut ev = r.flow.on_frame(Some(&pinch), r.now);
        assert!(r.flow.pinch_active());
        r.now += FRAME;
        ev.extend(r.flow.on_frame(None, r.now));

        assert!(!r.flow.pinch_active());
        assert_eq!(r.flow.gate().index(), 3);
        assert_eq!(completed(&ev), vec![Gesture::Pinch]);
        assert_eq!(count(&ev, |e| matches!(e, FlowEvent::PinchReleased)), 1);
    }

    #[test]
    fn resize_refits_banner_text() {
        fn banner_width(r: &mut Rig) -> f32 {
            r.step(Gesture::Heart);
            let ev = r.hold(Gesture::Love, 1100);
            ev.iter()
                .filter_map(|e| match e {
                    FlowEvent::MorphTarget(c) if c.is_planar() => Some(Arc::clone(c)),
                    _ => None,
                })
                .last()
                .map(|c| c.points().iter().map(|p| p[0].abs()).fold(0.0, f32::max))
                .unwrap()
        }

        let mut wide = Rig::new();
        let mut small = Rig::new();
        small.flow.resize(500, 500);
        assert_eq!(small.flow.view().viewport, Viewport::Compact);
        assert!(banner_width(&mut small) < banner_width(&mut wide));
    }

    #[test]
    fn compact_viewport_moves_camera_back() {
        let mut r = Rig::new();
        r.no_hand(100);
        assert!((r.flow.view().target_camera_z - 38.0).abs() < 0.01);
        r.flow.set_viewport(Viewport::Compact);
        r.no_hand(100);
        assert!((r.flow.view().target_camera_z - 42.0).abs() < 0.01);
    }

    #[test]
    fn losing_hands_resets_to_idle() {
        let mut r = Rig::new();
        r.hold(Gesture::Heart, 1100);
        let ev = r.no_hand(100);
        assert_eq!(r.flow.view().mode, Mode::Idle);
        assert!(ev.iter().any(|e| matches!(e, FlowEvent::Hint(Hint::WaitingForHands))));
        assert!(ev.iter().any(|e| matches!(e, FlowEvent::MorphBlend(false))));
    }

    #[test]
    fn relaxed_hand_shows_step_hint() {
        let mut r = Rig::new();
        let ev = r.hold(Gesture::None, 100);
        assert!(ev.iter().any(|e| matches!(e, FlowEvent::Hint(Hint::Step(Gesture::Heart)))));
    }

    #[test]
    fn out_of_order_completion_is_silent() {
        let mut r = Rig::new();
        assert!(r.flow.complete_step(Gesture::Bitch).is_empty());
        assert!(r.flow.complete_step(Gesture::Valentine).is_empty());
        assert_eq!(r.flow.gate().index(), 0);
        assert_eq!(r.flow.view().mode, Mode::Idle);
        assert!(!r.flow.sealed());
    }

    #[test]
    fn invalid_config_rejected() {
        let bad = FlowConfig { particle_count: 0, ..FlowConfig::default() };
        assert!(GestureFlow::new(bad, Viewport::Standard, Instant::now()).is_err());
    }
}
