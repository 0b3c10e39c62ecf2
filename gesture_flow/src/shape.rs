//! Morph targets — the point clouds particles fly toward.
//!
//! The pipeline never builds geometry itself; it asks a [`ShapeProvider`].
//! [`ParametricShapes`] is the stock provider: a spiral starfield, the
//! classic heart curve, rings, clusters, and banner text rasterized from
//! the bitmap font in [`crate::glyph`].

use std::f32::consts::{PI, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::glyph::{lit_cells, ADVANCE, GLYPH_H};

// ════════════════════════════════════════════════════════════════════════════
// PointCloud
// ════════════════════════════════════════════════════════════════════════════

/// A morph target.  Particle `i` maps onto point `i % len`.
///
/// Planar clouds carry meaningless `z`; each particle substitutes its own
/// depth jitter so flat shapes keep a little thickness.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    points: Vec<[f32; 3]>,
    planar: bool,
}

impl PointCloud {
    pub fn new(points: Vec<[f32; 3]>) -> Self {
        PointCloud { points, planar: false }
    }

    pub fn planar(points: Vec<[f32; 2]>) -> Self {
        PointCloud {
            points: points.into_iter().map(|[x, y]| [x, y, 0.0]).collect(),
            planar: true,
        }
    }

    pub fn len(&self)       -> usize         { self.points.len() }
    pub fn is_empty(&self)  -> bool          { self.points.is_empty() }
    pub fn is_planar(&self) -> bool          { self.planar }
    pub fn points(&self)    -> &[[f32; 3]]   { &self.points }

    pub fn get(&self, i: usize) -> Option<[f32; 3]> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points[i % self.points.len()])
    }

    /// Target position for particle `i` with depth jitter `jitter`.
    pub fn target_for(&self, i: usize, jitter: f32) -> [f32; 3] {
        match self.get(i) {
            Some([x, y, _]) if self.planar => [x, y, jitter],
            Some(p) => p,
            None => [0.0, 0.0, jitter],
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ShapeProvider
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeRequest<'a> {
    /// Rest layout of the whole field.
    Starfield { count: usize },
    Heart     { count: usize },
    Text(&'a str),
    Ring      { count: usize, radius: f32, thickness: f32 },
    Cluster   { center: [f32; 2], radius: f32, count: usize },
}

pub trait ShapeProvider {
    fn shape(&mut self, request: ShapeRequest<'_>) -> PointCloud;

    /// The window changed size.
    fn resize(&mut self, _width: usize, _height: usize) {}
}

// ════════════════════════════════════════════════════════════════════════════
// ParametricShapes
// ════════════════════════════════════════════════════════════════════════════

pub const BASE_TEXT_SCALE: f32 = 0.16;
/// Banners longer than this wrap onto two lines.
pub const WRAP_AT: usize = 20;
/// World units per font cell at a text scale of 1.
const CELL_UNITS: f32 = 13.0;
/// Points per font cell edge.
const CELL_DENSITY: usize = 4;

pub struct ParametricShapes {
    rng:        StdRng,
    text_scale: f32,
}

impl ParametricShapes {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None    => StdRng::from_entropy(),
        };
        ParametricShapes { rng, text_scale: BASE_TEXT_SCALE }
    }

    /// Shrink banner text on small windows so it stays on screen.
    pub fn fit_viewport(&mut self, width: usize, height: usize) {
        self.text_scale = text_scale(width, height);
    }

    fn starfield(&mut self, count: usize) -> PointCloud {
        let rng = &mut self.rng;
        let points = (0..count)
            .map(|i| {
                let r = rng.gen::<f32>().sqrt() * 40.0;
                let theta = r * 0.2 + (i % 3) as f32 * (PI * 0.66);
                [
                    theta.cos() * r + (rng.gen::<f32>() - 0.5) * 10.0,
                    (rng.gen::<f32>() - 0.5) * 12.0,
                    theta.sin() * r + (rng.gen::<f32>() - 0.5) * 10.0,
                ]
            })
            .collect();
        PointCloud::new(points)
    }

    fn heart(&mut self, count: usize) -> PointCloud {
        let rng = &mut self.rng;
        let points = (0..count)
            .map(|_| {
                let t = rng.gen::<f32>() * TAU;
                let x = 16.0 * t.sin().powi(3);
                let y = 13.0 * t.cos()
                    - 5.0 * (2.0 * t).cos()
                    - 2.0 * (3.0 * t).cos()
                    - (4.0 * t).cos();
                [x * 1.1, y * 1.1, (rng.gen::<f32>() - 0.5) * 5.0]
            })
            .collect();
        PointCloud::new(points)
    }

    fn ring(&mut self, count: usize, radius: f32, thickness: f32) -> PointCloud {
        let rng = &mut self.rng;
        let points = (0..count)
            .map(|i| {
                let a = i as f32 / count.max(1) as f32 * TAU;
                let r = radius + (rng.gen::<f32>() - 0.5) * thickness;
                [a.cos() * r, a.sin() * r]
            })
            .collect();
        PointCloud::planar(points)
    }

    fn cluster(&mut self, center: [f32; 2], radius: f32, count: usize) -> PointCloud {
        let rng = &mut self.rng;
        let points = (0..count)
            .map(|_| {
                let a = rng.gen::<f32>() * TAU;
                let r = rng.gen::<f32>() * radius;
                [center[0] + a.cos() * r, center[1] + a.sin() * r]
            })
            .collect();
        PointCloud::planar(points)
    }

    fn text(&self, text: &str) -> PointCloud {
        let lines = wrap(text);
        let cell = CELL_UNITS * self.text_scale;
        let step = cell / CELL_DENSITY as f32;
        let line_h = (GLYPH_H + 2) as f32 * cell;
        let block_h = lines.len() as f32 * line_h - 2.0 * cell;

        let mut points = Vec::new();
        for (li, line) in lines.iter().enumerate() {
            let width = (line.chars().count() * ADVANCE).saturating_sub(1) as f32 * cell;
            let left = -width / 2.0;
            let top  = block_h / 2.0 - li as f32 * line_h;

            for (ci, ch) in line.chars().enumerate() {
                let gx = left + (ci * ADVANCE) as f32 * cell;
                for (col, row) in lit_cells(ch) {
                    let x0 = gx + col as f32 * cell;
                    let y0 = top - row as f32 * cell;
                    for sy in 0..CELL_DENSITY {
                        for sx in 0..CELL_DENSITY {
                            points.push([
                                x0 + (sx as f32 + 0.5) * step,
                                y0 - (sy as f32 + 0.5) * step,
                            ]);
                        }
                    }
                }
            }
        }
        PointCloud::planar(points)
    }
}

impl ShapeProvider for ParametricShapes {
    fn shape(&mut self, request: ShapeRequest<'_>) -> PointCloud {
        match request {
            ShapeRequest::Starfield { count }                   => self.starfield(count),
            ShapeRequest::Heart { count }                       => self.heart(count),
            ShapeRequest::Text(text)                            => self.text(text),
            ShapeRequest::Ring { count, radius, thickness }     => self.ring(count, radius, thickness),
            ShapeRequest::Cluster { center, radius, count }     => self.cluster(center, radius, count),
        }
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.fit_viewport(width, height);
    }
}

/// Banner text scale for a window: `0.16 · clamp(min(w/900, h/700), 0.55, 1)`.
pub fn text_scale(width: usize, height: usize) -> f32 {
    let s = (width as f32 / 900.0).min(height as f32 / 700.0).clamp(0.55, 1.0);
    BASE_TEXT_SCALE * s
}

/// Split long banners at the space closest to the middle.
pub fn wrap(text: &str) -> Vec<&str> {
    let text = text.trim();
    if text.chars().count() <= WRAP_AT {
        return vec![text];
    }
    let mid = text.len() / 2;
    let split = text
        .match_indices(' ')
        .map(|(i, _)| i)
        .min_by_key(|&i| i.abs_diff(mid));
    match split {
        Some(i) => vec![text[..i].trim_end(), text[i + 1..].trim_start()],
        None    => vec![text],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
