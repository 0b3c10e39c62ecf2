//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ FLOW 2/5                                    OPEN PALM  ✓ │
//! │                                             CLOSE PALM ▶ │
//! │                    · ·  ·:·  · ·            PINCH        │
//! │                 ·  particle field  ·        ...          │
//! │                    ·  · ·:·  ·  ·                        │
//! │                     [ centre toast ]                     │
//! │                                                          │
//! │              hint line / hold progress bar               │
//! │ key legend                                               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Particles are projected with a pinhole camera sitting on +z and looking
//! at the origin, and splatted additively.

use std::sync::mpsc::Sender;

use gesture_flow::glyph::{lit_cells, ADVANCE, GLYPH_H};
use gesture_flow::{Gesture, ViewState};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::hand::{SimInput, SimKey};
use crate::hud::{Hud, StepState};
use crate::modal::PromptModal;
use crate::particles::{blend, particle_color, ParticleField};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR:      u32 = 0xFF05030A;
const TEXT_COLOR:    u32 = 0xFFEEEEEE;
const DIM_COLOR:     u32 = 0xFF888888;
const ACCENT_COLOR:  u32 = 0xFFFF4FB0;
const BAR_BG:        u32 = 0xFF2A1A30;
const MODAL_BG:      u32 = 0xFF1B1026;
const BUTTON_YES:    u32 = 0xFFE0357F;
const BUTTON_NO:     u32 = 0xFF3A3050;
/// Additive weight of one particle splat.
const SPLAT_ALPHA:   f32 = 0.9;
const NEAR_PLANE:    f32 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// Projection
// ════════════════════════════════════════════════════════════════════════════

/// Vertical field of view: wider on portrait screens.
pub fn fov_degrees(width: usize, height: usize) -> f32 {
    let aspect = width as f32 / height.max(1) as f32;
    if aspect < 0.9 { 72.0 } else { 60.0 }
}

/// Rotate by the field's pitch/yaw, then project.  Returns screen `(x, y)`
/// and the distance in front of the camera, or `None` behind it.
pub fn project(p: [f32; 3], view: &ViewState, width: usize, height: usize) -> Option<(f32, f32, f32)> {
    let (sy, cy) = view.rotation_y.sin_cos();
    let x1 =  p[0] * cy + p[2] * sy;
    let z1 = -p[0] * sy + p[2] * cy;

    let (sx, cx) = view.rotation_x.sin_cos();
    let y2 = p[1] * cx - z1 * sx;
    let z2 = p[1] * sx + z1 * cx;

    let depth = view.camera_z - z2;
    if depth < NEAR_PLANE {
        return None;
    }
    let half_h = height as f32 / 2.0;
    let focal  = half_h / (fov_degrees(width, height).to_radians() / 2.0).tan();
    Some((
        width as f32 / 2.0 + x1 / depth * focal,
        half_h - y2 / depth * focal,
        depth,
    ))
}

/// Splat diameter in pixels.
pub fn splat_size(size: f32, morph: f32, depth: f32) -> f32 {
    (size * 45.0 * ParticleField::size_scale(morph) / depth).clamp(1.0, 72.0)
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — pixel buffer and drawing primitives
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub buf: Vec<u32>,
    pub w:   usize,
    pub h:   usize,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Canvas { buf: vec![BG_COLOR; w * h], w, h }
    }

    pub fn clear(&mut self) {
        self.buf.fill(BG_COLOR);
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.buf[y * self.w + x]
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.w && y < self.h {
            self.buf[y * self.w + x] = color;
        }
    }

    /// Additively blend `color` scaled by `alpha` into one pixel.
    pub fn add_pixel(&mut self, x: isize, y: isize, color: u32, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return;
        }
        let idx = y as usize * self.w + x as usize;
        let dst = self.buf[idx];
        let add = |shift: u32| {
            let d = (dst >> shift) & 0xFF;
            let s = ((color >> shift) & 0xFF) as f32 * alpha;
            (d + s as u32).min(0xFF) << shift
        };
        self.buf[idx] = 0xFF000000 | add(16) | add(8) | add(0);
    }

    /// Round splat with a soft edge.
    pub fn splat(&mut self, cx: f32, cy: f32, diameter: f32, color: u32) {
        if diameter <= 1.5 {
            self.add_pixel(cx as isize, cy as isize, color, SPLAT_ALPHA);
            return;
        }
        let r = diameter / 2.0;
        let (x0, x1) = ((cx - r).floor() as isize, (cx + r).ceil() as isize);
        let (y0, y1) = ((cy - r).floor() as isize, (cy + r).ceil() as isize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = ((x as f32 + 0.5 - cx).hypot(y as f32 + 0.5 - cy)) / diameter;
                if d > 0.5 {
                    continue;
                }
                // smoothstep(0.5, 0.1, d)
                let t = ((0.5 - d) / 0.4).clamp(0.0, 1.0);
                let a = t * t * (3.0 - 2.0 * t) * SPLAT_ALPHA;
                self.add_pixel(x, y, color, a);
            }
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 {
            return;
        }
        for col in x..(x + w).min(self.w) {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..(y + h).min(self.h) {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    /// Bitmap text, each font cell drawn `scale` pixels square.
    pub fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            if cx + ADVANCE * scale > self.w {
                break;
            }
            for (col, row) in lit_cells(ch) {
                self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
            }
            cx += ADVANCE * scale;
        }
    }

    /// Text centred horizontally on `cx`.
    pub fn draw_text_centered(&mut self, text: &str, cx: usize, y: usize, scale: usize, color: u32) {
        let x = cx.saturating_sub(text_width(text, scale) / 2);
        self.draw_text(text, x, y, scale, color);
    }
}

pub fn text_width(text: &str, scale: usize) -> usize {
    (text.chars().count() * ADVANCE).saturating_sub(1) * scale
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

/// One frame's worth of UI input that bypasses the hand simulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiInput {
    pub open: bool,
    pub yes:  bool,
    pub no:   bool,
}

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    sim_tx: Sender<SimInput>,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Sender<SimInput>) -> Result<Self, String> {
        let mut window = Window::new(
            "Nebula Field — gesture particles",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(width, height),
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard inputs: hand keys go to the simulator, prompt keys
    /// come back to the caller.
    pub fn poll_input(&mut self) -> UiInput {
        if !self.window.is_open() {
            return UiInput::default();
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let held     = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);
        let send     = |input: SimInput| { let _ = self.sim_tx.send(input); };

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            send(SimInput::KeyDown(SimKey::Quit));
            return UiInput::default();
        }

        for (key, pose) in [
            (Key::Key1, Gesture::Heart),
            (Key::Key2, Gesture::Love),
            (Key::Key3, Gesture::Pinch),
            (Key::Key4, Gesture::Bitch),
            (Key::Key5, Gesture::Valentine),
            (Key::Key0, Gesture::None),
        ] {
            if one_shot(key) {
                send(SimInput::KeyDown(SimKey::Pose(pose)));
            }
        }
        if self.window.is_key_released(Key::Key3) {
            send(SimInput::KeyUp(SimKey::Pose(Gesture::Pinch)));
        }
        if one_shot(Key::H) {
            send(SimInput::KeyDown(SimKey::ToggleHand));
        }

        for (key, sim) in [
            (Key::Left,  SimKey::Left),
            (Key::Right, SimKey::Right),
            (Key::Up,    SimKey::Up),
            (Key::Down,  SimKey::Down),
            (Key::Equal, SimKey::Nearer),
            (Key::Minus, SimKey::Farther),
        ] {
            if held(key) {
                send(SimInput::KeyDown(sim));
            }
        }

        UiInput {
            open: true,
            yes:  one_shot(Key::Y),
            no:   one_shot(Key::N),
        }
    }

    /// Render one frame.
    pub fn render(
        &mut self,
        field: &ParticleField,
        view:  &ViewState,
        hud:   &Hud,
        modal: &PromptModal,
        time:  f32,
    ) -> Result<(), String> {
        self.canvas.clear();
        draw_field(&mut self.canvas, field, view, time);
        draw_hud(&mut self.canvas, hud);
        if modal.is_open() {
            draw_modal(&mut self.canvas, modal);
        }

        let (w, h) = (self.canvas.w, self.canvas.h);
        self.window
            .update_with_buffer(&self.canvas.buf, w, h)
            .map_err(|e| e.to_string())
    }
}

// ── Field ─────────────────────────────────────────────────────────────────

fn draw_field(canvas: &mut Canvas, field: &ParticleField, view: &ViewState, time: f32) {
    let morph = view.morph_blend;
    for i in 0..field.len() {
        let pos = field.position(i, morph, time);
        let Some((sx, sy, depth)) = project(pos, view, canvas.w, canvas.h) else {
            continue;
        };
        let d = splat_size(field.size(i), morph, depth);
        canvas.splat(sx, sy, d, particle_color(pos, morph));
    }
}

// ── HUD ───────────────────────────────────────────────────────────────────

fn draw_hud(canvas: &mut Canvas, hud: &Hud) {
    let (w, h) = (canvas.w, canvas.h);

    canvas.draw_text(&hud.badge(), 16, 16, 3, ACCENT_COLOR);

    // Step list, top right
    let list_x = w.saturating_sub(150);
    for (row, (label, state)) in hud.steps().enumerate() {
        let y = 18 + row * 14;
        let (marker, color) = match state {
            StepState::Done    => ("+", DIM_COLOR),
            StepState::Active  => (">", ACCENT_COLOR),
            StepState::Pending => (" ", TEXT_COLOR),
        };
        canvas.draw_text(marker, list_x, y, 2, color);
        canvas.draw_text(label, list_x + 12, y, 2, color);
    }

    // Toast, centre
    if let Some(text) = hud.toast_text() {
        let scale = if text_width(text, 5) < w * 9 / 10 { 5 } else { 3 };
        canvas.draw_text_centered(text, w / 2, (h / 2).saturating_sub(GLYPH_H * scale / 2), scale, TEXT_COLOR);
    }

    // Hint and hold bar, bottom
    let hint_y = h.saturating_sub(70);
    if !hud.hint.is_empty() {
        canvas.draw_text_centered(&hud.hint, w / 2, hint_y, 2, TEXT_COLOR);
    }
    if let Some(pct) = hud.progress {
        let bar_w = w / 3;
        let bar_x = (w - bar_w) / 2;
        let bar_y = hint_y + 18;
        canvas.fill_rect(bar_x, bar_y, bar_w, 6, BAR_BG);
        canvas.fill_rect(bar_x, bar_y, bar_w * pct.min(100) as usize / 100, 6, ACCENT_COLOR);
    }

    canvas.draw_text(
        "1=palm 2=fist 3=pinch(hold) 4=middle 5=peace 0=relax H=hand arrows=move +/-=near/far Y/N=answer Q=quit",
        10, h.saturating_sub(16), 2, DIM_COLOR,
    );
}

// ── Prompt ─────────────────────────────────────────────────────────────────

fn draw_modal(canvas: &mut Canvas, modal: &PromptModal) {
    let (w, h) = (canvas.w, canvas.h);
    let mw = (w * 2 / 3).min(620);
    let mh = 200;
    let mx = (w - mw) / 2;
    let my = h.saturating_sub(mh) / 2;

    // Dim the field behind the prompt.
    for px in canvas.buf.iter_mut() {
        *px = blend(*px, BG_COLOR, 0.6);
    }
    canvas.fill_rect(mx, my, mw, mh, MODAL_BG);
    canvas.draw_border(mx, my, mw, mh, ACCENT_COLOR);

    let cx = mx + mw / 2;
    canvas.draw_text_centered(modal.question(), cx, my + 24, 3, TEXT_COLOR);
    canvas.draw_text_centered(modal.subtitle(), cx, my + 60, 2, DIM_COLOR);

    let (bw, bh) = (120, 40);
    let by = my + 100;
    let yes_x = cx - bw - 20;
    canvas.fill_rect(yes_x, by, bw, bh, BUTTON_YES);
    canvas.draw_text_centered("YES (Y)", yes_x + bw / 2, by + 13, 3, TEXT_COLOR);

    if modal.no_visible() {
        let (dx, dy) = modal.no_offset();
        let no_x = ((cx + 20) as i32 + dx).max(0) as usize;
        let no_y = (by as i32 + dy).max(0) as usize;
        let color = if modal.attempts() > 0 { blend(BUTTON_NO, MODAL_BG, 0.22) } else { BUTTON_NO };
        canvas.fill_rect(no_x, no_y, bw, bh, color);
        canvas.draw_text_centered("NO (N)", no_x + bw / 2, no_y + 13, 3, TEXT_COLOR);
    }

    let counter = modal.counter();
    if !counter.is_empty() {
        canvas.draw_text_centered(&counter, cx, my + mh - 28, 2, ACCENT_COLOR);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_flow::{Mode, Viewport};

    fn view(z: f32) -> ViewState {
        ViewState {
            mode:              Mode::Idle,
            viewport:          Viewport::Standard,
            camera_z:          z,
            target_camera_z:   z,
            rotation_x:        0.0,
            rotation_y:        0.0,
            target_rotation_x: 0.0,
            target_rotation_y: 0.0,
            morph_blend:       0.0,
            proximity:         0.5,
        }
    }

    #[test]
    fn fov_widens_on_portrait() {
        assert_eq!(fov_degrees(1280, 800), 60.0);
        assert_eq!(fov_degrees(390, 844), 72.0);
    }

    #[test]
    fn origin_projects_to_centre() {
        let (x, y, d) = project([0.0; 3], &view(40.0), 800, 600).unwrap();
        assert_eq!((x, y), (400.0, 300.0));
        assert_eq!(d, 40.0);
    }

    #[test]
    fn up_is_up_on_screen() {
        let (_, y, _) = project([0.0, 5.0, 0.0], &view(40.0), 800, 600).unwrap();
        assert!(y < 300.0);
    }

    #[test]
    fn behind_camera_is_culled() {
        assert!(project([0.0, 0.0, 50.0], &view(40.0), 800, 600).is_none());
    }

    #[test]
    fn yaw_moves_points_sideways() {
        let mut v = view(40.0);
        v.rotation_y = std::f32::consts::FRAC_PI_2;
        let (x, _, _) = project([0.0, 0.0, 5.0], &v, 800, 600).unwrap();
        assert!(x > 400.0);
    }

    #[test]
    fn splats_add_and_saturate() {
        let mut c = Canvas::new(4, 4);
        c.buf.fill(0xFF000000);
        c.add_pixel(1, 1, 0xFFFFFFFF, 0.9);
        c.add_pixel(1, 1, 0xFFFFFFFF, 0.9);
        assert_eq!(c.pixel(1, 1), 0xFFFFFFFF);
        c.add_pixel(-1, 9, 0xFFFFFFFF, 1.0);
    }

    #[test]
    fn splat_size_clamped() {
        assert_eq!(splat_size(0.5, 0.0, 1000.0), 1.0);
        assert_eq!(splat_size(1.0, 1.0, 0.1), 72.0);
    }

    #[test]
    fn text_draws_lit_cells() {
        let mut c = Canvas::new(20, 10);
        c.draw_text("T", 0, 0, 1, 0xFFFFFFFF);
        assert_eq!(c.pixel(0, 0), 0xFFFFFFFF);
        assert_eq!(c.pixel(1, 4), 0xFFFFFFFF);
        assert_eq!(c.pixel(0, 4), BG_COLOR);
        assert_eq!(text_width("AB", 2), 14);
    }
}
