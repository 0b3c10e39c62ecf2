//! Tuning for the whole pipeline.
//!
//! Every threshold, smoothing fraction and camera preset lives in
//! [`FlowConfig`].  The defaults reproduce the hand-tuned feel of the
//! installation; a TOML file can override any subset of fields.
//!
//! ```toml
//! particle_count = 24000
//!
//! [hold]
//! hold_ms = 800
//!
//! [burst]
//! duration_ms = 600
//! ```
//!
//! Camera preset tables are replaced whole: a `[camera.compact]` section
//! must list `idle`, `heart` and `text`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::Mode;
use crate::error::{FlowError, FlowResult};

// ════════════════════════════════════════════════════════════════════════════
// FlowConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Number of particles in the rest starfield.
    pub particle_count: usize,
    /// Camera distance on the very first frame; glides to the idle preset.
    pub start_camera_z: f32,
    /// Fixed RNG seed for reproducible bursts.  `None` seeds from entropy.
    pub seed:           Option<u64>,

    pub classifier: ClassifierConfig,
    pub hold:       HoldConfig,
    pub proximity:  ProximityConfig,
    pub rotation:   RotationConfig,
    pub smoothing:  SmoothingConfig,
    pub camera:     CameraConfig,
    pub burst:      BurstConfig,
    pub banners:    Banners,
}

impl Default for FlowConfig {
    fn default() -> Self {
        FlowConfig {
            particle_count: 85_000,
            start_camera_z: 100.0,
            seed:           None,
            classifier:     ClassifierConfig::default(),
            hold:           HoldConfig::default(),
            proximity:      ProximityConfig::default(),
            rotation:       RotationConfig::default(),
            smoothing:      SmoothingConfig::default(),
            camera:         CameraConfig::default(),
            burst:          BurstConfig::default(),
            banners:        Banners::default(),
        }
    }
}

impl FlowConfig {
    /// Read and validate a TOML tuning file.
    pub fn load(path: impl AsRef<Path>) -> FlowResult<Self> {
        let content = fs::read_to_string(path)?;
        let cfg: FlowConfig = toml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> FlowResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject values that would make the pipeline misbehave silently.
    pub fn validate(&self) -> FlowResult<()> {
        if self.particle_count == 0 {
            return Err(FlowError::Config("particle_count must be at least 1".into()));
        }
        if self.hold.hold_ms == 0 {
            return Err(FlowError::Config("hold.hold_ms must be positive".into()));
        }
        if self.burst.duration_ms == 0 {
            return Err(FlowError::Config("burst.duration_ms must be positive".into()));
        }
        if !(self.proximity.palm_max > self.proximity.palm_min) {
            return Err(FlowError::Config(format!(
                "proximity range inverted: palm_min {} >= palm_max {}",
                self.proximity.palm_min, self.proximity.palm_max
            )));
        }
        if !(self.classifier.pinch_threshold > 0.0) {
            return Err(FlowError::Config("classifier.pinch_threshold must be positive".into()));
        }
        if !(self.rotation.clamp >= 0.0) {
            return Err(FlowError::Config(format!(
                "rotation.clamp must be non-negative, got {}",
                self.rotation.clamp
            )));
        }
        let r = &self.rotation;
        for (name, v) in [
            ("rotation.sensitivity",          r.sensitivity),
            ("rotation.idle_yaw_per_frame",   r.idle_yaw_per_frame),
            ("rotation.idle_pitch_amplitude", r.idle_pitch_amplitude),
            ("rotation.idle_pitch_rate",      r.idle_pitch_rate),
        ] {
            if !v.is_finite() {
                return Err(FlowError::Config(format!("{} must be finite, got {}", name, v)));
            }
        }

        let fractions = [
            ("smoothing.morph",    self.smoothing.morph),
            ("smoothing.camera",   self.smoothing.camera),
            ("smoothing.rotation", self.smoothing.rotation),
            ("proximity.smooth",   self.proximity.smooth),
            ("proximity.relax",    self.proximity.relax),
        ];
        for (name, f) in fractions {
            if !(f > 0.0 && f <= 1.0) {
                return Err(FlowError::Config(format!("{} must be in (0, 1], got {}", name, f)));
            }
        }

        for (class, table) in [("standard", &self.camera.standard), ("compact", &self.camera.compact)] {
            for mode in Mode::ALL {
                let p = table.get(mode);
                if !(p.min_z <= p.max_z) {
                    return Err(FlowError::Config(format!(
                        "camera.{}.{} clamp inverted: [{}, {}]",
                        class, mode.as_str(), p.min_z, p.max_z
                    )));
                }
            }
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

/// Landmark thresholds, in normalized image units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// A finger is up when its tip sits this far above its PIP joint.
    pub up_margin:       f32,
    /// Thumb-tip to index-tip distance below which the hand is pinching.
    pub pinch_threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig { up_margin: 0.018, pinch_threshold: 0.032 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldConfig {
    /// Continuous identical classification required before execution.
    pub hold_ms: u64,
}

impl Default for HoldConfig {
    fn default() -> Self {
        HoldConfig { hold_ms: 1000 }
    }
}

/// Palm-span → proximity mapping.  Fractions apply once per camera sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    pub palm_min: f32,
    pub palm_max: f32,
    pub smooth:   f32,
    /// Relaxation toward `neutral` while no hand is visible.
    pub relax:    f32,
    pub neutral:  f32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        ProximityConfig {
            palm_min: 0.12,
            palm_max: 0.30,
            smooth:   0.14,
            relax:    0.06,
            neutral:  0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Radians of rotation per unit of wrist offset from screen centre.
    pub sensitivity:          f32,
    pub clamp:                f32,
    /// Ambient yaw drift, radians per 60 Hz frame.
    pub idle_yaw_per_frame:   f32,
    pub idle_pitch_amplitude: f32,
    /// Angular frequency of the ambient pitch sway, radians per second.
    pub idle_pitch_rate:      f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        RotationConfig {
            sensitivity:          1.6,
            clamp:                0.85,
            idle_yaw_per_frame:   0.0018,
            idle_pitch_amplitude: 0.1,
            idle_pitch_rate:      0.4,
        }
    }
}

/// Fraction of the remaining distance covered per 60 Hz frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub morph:    f32,
    pub camera:   f32,
    pub rotation: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        SmoothingConfig { morph: 0.045, camera: 0.04, rotation: 0.08 }
    }
}

// ── Camera presets ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPreset {
    pub base_z:     f32,
    /// Camera travel for the full proximity swing.
    pub zoom_range: f32,
    pub min_z:      f32,
    pub max_z:      f32,
}

impl CameraPreset {
    pub const fn new(base_z: f32, zoom_range: f32, min_z: f32, max_z: f32) -> Self {
        CameraPreset { base_z, zoom_range, min_z, max_z }
    }
}

/// One preset per display mode.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModePresets {
    pub idle:  CameraPreset,
    pub heart: CameraPreset,
    pub text:  CameraPreset,
}

impl ModePresets {
    pub fn get(&self, mode: Mode) -> &CameraPreset {
        match mode {
            Mode::Idle  => &self.idle,
            Mode::Heart => &self.heart,
            Mode::Text  => &self.text,
        }
    }
}

/// Standard viewports and compact (small or touch) viewports use
/// different, further-back presets.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub standard: ModePresets,
    pub compact:  ModePresets,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            standard: ModePresets {
                idle:  CameraPreset::new(38.0, 4.0, 34.0, 44.0),
                heart: CameraPreset::new(40.0, 5.0, 34.0, 46.0),
                text:  CameraPreset::new(46.0, 5.5, 40.0, 56.0),
            },
            compact: ModePresets {
                idle:  CameraPreset::new(42.0, 3.0, 36.0, 54.0),
                heart: CameraPreset::new(48.0, 4.2, 40.0, 60.0),
                text:  CameraPreset::new(58.0, 3.6, 50.0, 72.0),
            },
        }
    }
}

// ── Pinch burst ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    pub duration_ms:            u64,
    pub ring_count:             usize,
    pub ring_radius:            f32,
    pub ring_thickness:         f32,
    pub compact_ring_radius:    f32,
    pub compact_ring_thickness: f32,
    /// Points in the initial cluster around the seed particle.
    pub seed_count:             usize,
    pub seed_radius:            f32,
    /// Per-particle offset applied to the seed while the ring unfolds.
    pub scatter:                f32,
    /// Multiplier on particle z jitter during the burst.
    pub depth_scale:            f32,
}

impl Default for BurstConfig {
    fn default() -> Self {
        BurstConfig {
            duration_ms:            520,
            ring_count:             2600,
            ring_radius:            14.2,
            ring_thickness:         2.4,
            compact_ring_radius:    12.6,
            compact_ring_thickness: 2.0,
            seed_count:             1800,
            seed_radius:            0.28,
            scatter:                0.18,
            depth_scale:            0.9,
        }
    }
}

/// Text shown for the banner gestures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Banners {
    pub love:   String,
    pub rebuff: String,
    pub prompt: String,
}

impl Default for Banners {
    fn default() -> Self {
        Banners {
            love:   "I LOVE YOUUU".to_string(),
            rebuff: "HEY YOU".to_string(),
            prompt: "CAN U BE MY VALENTINE DATE?".to_string(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
