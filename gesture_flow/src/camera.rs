//! Display mode, camera distance, rotation and morph blend.
//!
//! [`CameraRig`] keeps a target and a smoothed current value for each of
//! these and advances them every render tick, independent of how often
//! camera frames arrive.  Gesture handling only moves targets.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{CameraConfig, CameraPreset, FlowConfig, ProximityConfig, RotationConfig};
use crate::smoothing::{Smoothed, REFERENCE_HZ};

// ════════════════════════════════════════════════════════════════════════════
// Mode / Viewport
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Idle,
    Heart,
    Text,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Idle, Mode::Heart, Mode::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Idle  => "idle",
            Mode::Heart => "heart",
            Mode::Text  => "text",
        }
    }
}

/// Viewport class: small or touch-first screens sit the camera further back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    #[default]
    Standard,
    Compact,
}

impl Viewport {
    /// Compact when the short side is under 700 px.
    pub fn classify(width: usize, height: usize) -> Self {
        if width.min(height) < 700 { Viewport::Compact } else { Viewport::Standard }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ViewState — what the renderer reads every frame
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub mode:              Mode,
    pub viewport:          Viewport,
    pub camera_z:          f32,
    pub target_camera_z:   f32,
    /// Pitch.
    pub rotation_x:        f32,
    /// Yaw.
    pub rotation_y:        f32,
    pub target_rotation_x: f32,
    pub target_rotation_y: f32,
    pub morph_blend:       f32,
    pub proximity:         f32,
}

// ════════════════════════════════════════════════════════════════════════════
// CameraRig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct CameraRig {
    presets:   CameraConfig,
    rotation:  RotationConfig,
    prox_cfg:  ProximityConfig,

    viewport:  Viewport,
    mode:      Mode,
    base_z:    f32,
    camera_z:  Smoothed,
    rot_x:     Smoothed,
    rot_y:     Smoothed,
    morph:     Smoothed,
    proximity: f32,
    zoom_allowed: bool,
}

impl CameraRig {
    pub fn new(cfg: &FlowConfig, viewport: Viewport) -> Self {
        let base_z = Self::table(&cfg.camera, viewport).idle.base_z;

        let mut camera_z = Smoothed::new(cfg.start_camera_z, cfg.smoothing.camera);
        camera_z.target = base_z;

        CameraRig {
            presets:   cfg.camera,
            rotation:  cfg.rotation,
            prox_cfg:  cfg.proximity,
            viewport,
            mode:      Mode::Idle,
            base_z,
            camera_z,
            rot_x:     Smoothed::new(0.0, cfg.smoothing.rotation),
            rot_y:     Smoothed::new(0.0, cfg.smoothing.rotation),
            morph:     Smoothed::new(0.0, cfg.smoothing.morph),
            proximity: cfg.proximity.neutral,
            zoom_allowed: true,
        }
    }

    fn table(presets: &CameraConfig, viewport: Viewport) -> &crate::config::ModePresets {
        match viewport {
            Viewport::Standard => &presets.standard,
            Viewport::Compact  => &presets.compact,
        }
    }

    fn preset(&self) -> &CameraPreset {
        Self::table(&self.presets, self.viewport).get(self.mode)
    }

    // ── Targets ──────────────────────────────────────────────────────────

    /// Switch display mode and pick up that mode's base distance.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode   = mode;
        self.base_z = self.preset().base_z;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.base_z   = self.preset().base_z;
    }

    pub fn set_morph(&mut self, active: bool) {
        self.morph.target = if active { 1.0 } else { 0.0 };
    }

    pub fn set_zoom_allowed(&mut self, allowed: bool) {
        self.zoom_allowed = allowed;
    }

    /// Follow the hand: wrist steers rotation, palm span steers proximity.
    pub fn track_hand(&mut self, wrist_x: f32, wrist_y: f32, palm_span: f32) {
        let r = &self.rotation;
        self.rot_y.target = (-(wrist_x - 0.5) * r.sensitivity).clamp(-r.clamp, r.clamp);
        self.rot_x.target = ((wrist_y - 0.5) * r.sensitivity).clamp(-r.clamp, r.clamp);

        let p = &self.prox_cfg;
        let raw = ((palm_span - p.palm_min) / (p.palm_max - p.palm_min)).clamp(0.0, 1.0);
        self.proximity += (raw - self.proximity) * p.smooth;
    }

    /// No hand this camera frame: drift proximity back to neutral.
    pub fn relax_proximity(&mut self) {
        let p = &self.prox_cfg;
        self.proximity += (p.neutral - self.proximity) * p.relax;
    }

    fn apply_hand_zoom(&mut self) {
        let t = (0.5 - self.proximity) * 2.0;
        let p = *self.preset();
        self.camera_z.target = (self.base_z + t * p.zoom_range).clamp(p.min_z, p.max_z);
    }

    // ── Per-frame ────────────────────────────────────────────────────────

    /// Advance every smoothed value by `dt` seconds.  `elapsed` drives the
    /// ambient sway; `lock` pins the camera target for a pinch session.
    pub fn tick(&mut self, dt: f32, elapsed: f32, lock: Option<f32>, hand_present: bool) {
        self.morph.tick(dt);

        match lock {
            Some(z) => self.camera_z.target = z,
            None if self.zoom_allowed => self.apply_hand_zoom(),
            None => {}
        }
        self.camera_z.tick(dt);

        if !hand_present {
            self.rot_y.target += self.rotation.idle_yaw_per_frame * dt * REFERENCE_HZ;
            self.rot_x.target = (elapsed * self.rotation.idle_pitch_rate).sin()
                * self.rotation.idle_pitch_amplitude;
        }
        self.rot_x.tick(dt);
        self.rot_y.tick(dt);

        trace!(z = self.camera_z.current, morph = self.morph.current, "rig tick");
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn mode(&self)      -> Mode     { self.mode }
    pub fn viewport(&self)  -> Viewport { self.viewport }
    pub fn base_z(&self)    -> f32      { self.base_z }
    pub fn camera_z(&self)  -> f32      { self.camera_z.current }
    pub fn proximity(&self) -> f32      { self.proximity }
    pub fn zoom_allowed(&self) -> bool  { self.zoom_allowed }

    pub fn view(&self) -> ViewState {
        ViewState {
            mode:              self.mode,
            viewport:          self.viewport,
            camera_z:          self.camera_z.current,
            target_camera_z:   self.camera_z.target,
            rotation_x:        self.rot_x.current,
            rotation_y:        self.rot_y.current,
            target_rotation_x: self.rot_x.target,
            target_rotation_y: self.rot_y.target,
            morph_blend:       self.morph.current,
            proximity:         self.proximity,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn rig() -> CameraRig {
        CameraRig::new(&FlowConfig::default(), Viewport::Standard)
    }

    #[test]
    fn viewport_class_from_size() {
        assert_eq!(Viewport::classify(1280, 800), Viewport::Standard);
        assert_eq!(Viewport::classify(1280, 650), Viewport::Compact);
        assert_eq!(Viewport::classify(390, 844),  Viewport::Compact);
    }

    #[test]
    fn starts_far_and_glides_to_idle() {
        let mut r = rig();
        assert_eq!(r.camera_z(), 100.0);
        for _ in 0..600 { r.tick(DT, 0.0, None, false); }
        assert!((r.camera_z() - 38.0).abs() < 0.1, "{}", r.camera_z());
    }

    #[test]
    fn set_mode_uses_viewport_presets() {
        let mut r = rig();
        r.set_mode(Mode::Text);
        assert_eq!(r.base_z(), 46.0);
        r.set_viewport(Viewport::Compact);
        assert_eq!(r.base_z(), 58.0);
        r.set_mode(Mode::Heart);
        assert_eq!(r.base_z(), 48.0);
    }

    #[test]
    fn near_hand_zooms_in_within_clamp() {
        let mut r = rig();
        for _ in 0..200 { r.track_hand(0.5, 0.5, 0.40); }
        r.tick(DT, 0.0, None, true);
        // prox → 1: base 38 − 4 = 34, the idle floor.
        assert!((r.view().target_camera_z - 34.0).abs() < 0.01);
    }

    #[test]
    fn far_hand_zoom_clamped_to_max() {
        let mut cfg = FlowConfig::default();
        cfg.camera.standard.idle.max_z = 40.0;
        let mut r = CameraRig::new(&cfg, Viewport::Standard);
        for _ in 0..200 { r.track_hand(0.5, 0.5, 0.0); }
        r.tick(DT, 0.0, None, true);
        assert_eq!(r.view().target_camera_z, 40.0);
    }

    #[test]
    fn lock_overrides_proximity() {
        let mut r = rig();
        for _ in 0..200 { r.track_hand(0.5, 0.5, 0.40); }
        r.tick(DT, 0.0, Some(50.0), true);
        assert_eq!(r.view().target_camera_z, 50.0);
    }

    #[test]
    fn suppressed_zoom_keeps_target() {
        let mut r = rig();
        r.set_zoom_allowed(false);
        for _ in 0..200 { r.track_hand(0.5, 0.5, 0.40); }
        r.tick(DT, 0.0, None, true);
        assert_eq!(r.view().target_camera_z, 38.0);
    }

    #[test]
    fn wrist_rotation_clamped() {
        let mut r = rig();
        r.track_hand(-1.0, 2.0, 0.2);
        let v = r.view();
        assert_eq!(v.target_rotation_y, 0.85);
        assert_eq!(v.target_rotation_x, 0.85);
    }

    #[test]
    fn idle_yaw_drifts_without_hand() {
        let mut r = rig();
        for _ in 0..60 { r.tick(DT, 0.0, None, false); }
        assert!((r.view().target_rotation_y - 60.0 * 0.0018).abs() < 1e-4);
    }

    #[test]
    fn hand_freezes_idle_drift() {
        let mut r = rig();
        r.track_hand(0.5, 0.5, 0.2);
        for _ in 0..60 { r.tick(DT, 1.0, None, true); }
        assert_eq!(r.view().target_rotation_y, 0.0);
    }

    #[test]
    fn proximity_relaxes_to_neutral() {
        let mut r = rig();
        for _ in 0..100 { r.track_hand(0.5, 0.5, 0.40); }
        assert!(r.proximity() > 0.99);
        for _ in 0..200 { r.relax_proximity(); }
        assert!((r.proximity() - 0.5).abs() < 0.01);
    }

    #[test]
    fn morph_blend_chases_target() {
        let mut r = rig();
        r.set_morph(true);
        r.tick(DT, 0.0, None, false);
        assert!((r.view().morph_blend - 0.045).abs() < 1e-4);
    }
}
