//! CPU-side drawing surfaces. Each layer owns a retained `LayerSurface`
//! that it repaints only on frames where it actually updated; the GPU side
//! composites every surface in paint order.

pub mod layers;

use glam::Vec2;

pub use crate::simulation::FieldImage;
pub use layers::{compose_layers, FrameContext, Layer};

/// Pixel-space vertex, converted to clip space in the shader
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Triangle list built by the canvas-style drawing calls
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    vertices: Vec<Vertex>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
        for p in [a, b, c] {
            self.vertices.push(Vertex {
                position: p.to_array(),
                color,
            });
        }
    }

    /// Filled circle as a fan; segment count grows with radius
    pub fn circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        if radius <= 0.0 || color[3] <= 0.0 {
            return;
        }
        let segments = ((radius * 2.0) as usize).clamp(6, 24);
        let step = std::f32::consts::TAU / segments as f32;
        for i in 0..segments {
            let a0 = i as f32 * step;
            let a1 = a0 + step;
            self.triangle(
                center,
                center + Vec2::new(a0.cos(), a0.sin()) * radius,
                center + Vec2::new(a1.cos(), a1.sin()) * radius,
                color,
            );
        }
    }

    /// Line segment as a quad of the given width
    pub fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: [f32; 4]) {
        let dir = b - a;
        let len = dir.length();
        if len <= f32::EPSILON || color[3] <= 0.0 {
            return;
        }
        let normal = Vec2::new(-dir.y, dir.x) / len * (width * 0.5);
        self.triangle(a + normal, b + normal, b - normal, color);
        self.triangle(a + normal, b - normal, a - normal, color);
    }

    pub fn polyline(&mut self, points: &[Vec2], width: f32, color: [f32; 4]) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], width, color);
        }
    }

    /// Dashed polyline over sampled segments. `offset` shifts the pattern
    /// along the line, in segments.
    pub fn dashed_polyline(&mut self, points: &[Vec2], width: f32, color: [f32; 4], pattern: (usize, usize), offset: f32) {
        let period = pattern.0 + pattern.1;
        if period == 0 {
            self.polyline(points, width, color);
            return;
        }
        let shift = offset.rem_euclid(period as f32) as usize;
        for (i, pair) in points.windows(2).enumerate() {
            if (i + period - shift) % period < pattern.0 {
                self.line(pair[0], pair[1], width, color);
            }
        }
    }

    /// Triangulated local-space glyph, rotated by `heading` and scaled
    pub fn glyph(&mut self, shape: &[[f32; 2]], center: Vec2, heading: f32, scale: f32, color: [f32; 4]) {
        let rotation = Vec2::from_angle(heading);
        for tri in shape.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|p| center + rotation.rotate(Vec2::from(p) * scale));
            self.triangle(a, b, c, color);
        }
    }
}

/// Retained output of one layer
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerSurface {
    pub shapes: DrawList,
    pub image: Option<FieldImage>,
}

/// Multiply a color's alpha
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn test_line_is_two_triangles() {
        let mut list = DrawList::new();
        list.line(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0, [1.0; 4]);
        assert_eq!(list.vertices().len(), 6);
        let ys: Vec<f32> = list.vertices().iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|y| (y.abs() - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_degenerate_shapes_are_skipped() {
        let mut list = DrawList::new();
        list.line(Vec2::ONE, Vec2::ONE, 2.0, [1.0; 4]);
        list.circle(Vec2::ONE, 0.0, [1.0; 4]);
        list.circle(Vec2::ONE, 4.0, [1.0, 1.0, 1.0, 0.0]);
        assert!(list.is_empty());
    }

    #[test]
    fn test_dash_pattern_counts() {
        let points: Vec<Vec2> = (0..15).map(|i| Vec2::new(i as f32, 0.0)).collect();
        let mut list = DrawList::new();
        list.dashed_polyline(&points, 1.0, [1.0; 4], (4, 3), 0.0);
        // 14 segments, period 7, 4 on per period
        assert_eq!(list.vertices().len(), 8 * 6);
    }

    #[test]
    fn test_glyph_rotation() {
        let mut list = DrawList::new();
        let shape = [[1.0, 0.0], [0.0, 0.0], [0.0, 0.0]];
        list.glyph(&shape, Vec2::new(5.0, 5.0), std::f32::consts::FRAC_PI_2, 2.0, [1.0; 4]);
        let tip = list.vertices()[0].position;
        assert!((tip[0] - 5.0).abs() < 1e-5 && (tip[1] - 7.0).abs() < 1e-5);
    }
}
