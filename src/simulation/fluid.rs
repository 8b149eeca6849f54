use glam::Vec2;

use crate::config::{
    FLUID_COLS_HIGH, FLUID_COLS_LOW, FLUID_COLS_MEDIUM, FLUID_DENSITY_FLOOR, FLUID_DENSITY_INJECTION,
    FLUID_FADE_SPEED, FLUID_FORCE, FLUID_HUE_SPEED, FLUID_IMPULSE_RADIUS, FLUID_MIN_POINTER_SPEED,
    FLUID_VISCOSITY,
};
use crate::policy::PerformanceTier;

/// One grid cell: velocity (u, v) and ink density
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FluidCell {
    pub u: f32,
    pub v: f32,
    pub density: f32,
}

impl FluidCell {
    pub fn speed(&self) -> f32 {
        (self.u * self.u + self.v * self.v).sqrt()
    }
}

/// Grid columns for a tier
pub fn columns_for_tier(tier: PerformanceTier) -> usize {
    match tier {
        PerformanceTier::High => FLUID_COLS_HIGH,
        PerformanceTier::Medium => FLUID_COLS_MEDIUM,
        PerformanceTier::Low | PerformanceTier::Minimal => FLUID_COLS_LOW,
    }
}

/// Row-major velocity/density grid spanning the container.
///
/// Stepping is pointer impulse, then 4-neighbour diffusion, then density
/// decay. The grid is only rebuilt on resize.
pub struct FluidField {
    cols: usize,
    rows: usize,
    cells: Vec<FluidCell>,
    scratch: Vec<(f32, f32)>,
    /// Pixels per cell along each axis
    cell_size: Vec2,
    last_pointer: Option<Vec2>,
    viscosity: f32,
    fade_speed: f32,
}

impl FluidField {
    pub fn new(cols: usize, width: f32, height: f32) -> Self {
        let mut field = Self {
            cols: cols.max(1),
            rows: 0,
            cells: Vec::new(),
            scratch: Vec::new(),
            cell_size: Vec2::ONE,
            last_pointer: None,
            viscosity: FLUID_VISCOSITY,
            fade_speed: FLUID_FADE_SPEED,
        };
        field.resize(width, height);
        field
    }

    pub fn for_tier(tier: PerformanceTier, width: f32, height: f32) -> Self {
        Self::new(columns_for_tier(tier), width, height)
    }

    /// Rows follow the aspect ratio. Zero or negative sizes keep the
    /// previous grid; returns true when the grid was rebuilt.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if !(width > 0.0 && height > 0.0) {
            return false;
        }
        let rows = ((self.cols as f32 * height / width).round() as usize).max(1);
        self.rows = rows;
        self.cells = vec![FluidCell::default(); self.cols * rows];
        self.scratch = vec![(0.0, 0.0); self.cols * rows];
        self.cell_size = Vec2::new(width / self.cols as f32, height / rows as f32);
        self.last_pointer = None;
        true
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cells(&self) -> &[FluidCell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [FluidCell] {
        &mut self.cells
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&FluidCell> {
        if col < self.cols && row < self.rows {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    pub fn step(&mut self, should_animate: bool, pointer: Option<Vec2>) {
        if !should_animate || self.cells.is_empty() {
            return;
        }

        if let (Some(current), Some(previous)) = (pointer, self.last_pointer) {
            let delta = current - previous;
            if delta.length() > FLUID_MIN_POINTER_SPEED {
                self.inject(current, delta);
            }
        }
        self.last_pointer = pointer;

        self.diffuse();

        for cell in &mut self.cells {
            cell.density *= self.fade_speed;
            // Repeated scaling stalls once density goes subnormal
            if cell.density < FLUID_DENSITY_FLOOR {
                cell.density = 0.0;
            }
        }
    }

    /// Add velocity and density around the pointer, falling off linearly
    fn inject(&mut self, pointer: Vec2, delta: Vec2) {
        let center = pointer / self.cell_size;
        let reach = FLUID_IMPULSE_RADIUS.ceil() as isize;
        let center_col = center.x.floor() as isize;
        let center_row = center.y.floor() as isize;

        for row in (center_row - reach)..=(center_row + reach) {
            if row < 0 || row >= self.rows as isize {
                continue;
            }
            for col in (center_col - reach)..=(center_col + reach) {
                if col < 0 || col >= self.cols as isize {
                    continue;
                }
                let dx = (col - center_col) as f32;
                let dy = (row - center_row) as f32;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist >= FLUID_IMPULSE_RADIUS {
                    continue;
                }
                let falloff = 1.0 - dist / FLUID_IMPULSE_RADIUS;
                let cell = &mut self.cells[row as usize * self.cols + col as usize];
                cell.u += delta.x * FLUID_FORCE * falloff;
                cell.v += delta.y * FLUID_FORCE * falloff;
                cell.density = (cell.density + FLUID_DENSITY_INJECTION * falloff).min(1.0);
            }
        }
    }

    /// Average each cell's velocity with its in-bounds 4-neighbours
    fn diffuse(&mut self) {
        let (cols, rows) = (self.cols, self.rows);
        for row in 0..rows {
            for col in 0..cols {
                let index = row * cols + col;
                let own = self.cells[index];
                let mut sum_u = own.u;
                let mut sum_v = own.v;
                let mut count = 1.0;

                let mut add = |i: usize| {
                    sum_u += self.cells[i].u;
                    sum_v += self.cells[i].v;
                    count += 1.0;
                };
                if col > 0 {
                    add(index - 1);
                }
                if col + 1 < cols {
                    add(index + 1);
                }
                if row > 0 {
                    add(index - cols);
                }
                if row + 1 < rows {
                    add(index + cols);
                }

                self.scratch[index] = (sum_u / count * self.viscosity, sum_v / count * self.viscosity);
            }
        }
        for (cell, &(u, v)) in self.cells.iter_mut().zip(&self.scratch) {
            cell.u = u;
            cell.v = v;
        }
    }

    pub fn total_density(&self) -> f32 {
        self.cells.iter().map(|c| c.density).sum()
    }

    /// Sample the grid every `stride` pixels into an RGBA bitmap. Hue rotates
    /// with time and local speed; alpha is density × speed.
    pub fn paint(&self, width: u32, height: u32, stride: u32, time_ms: f64, image: &mut FieldImage) {
        let stride = stride.max(1);
        let out_w = width.div_ceil(stride).max(1);
        let out_h = height.div_ceil(stride).max(1);
        image.resize(out_w, out_h);

        if self.cells.is_empty() {
            image.pixels.fill(0);
            return;
        }

        let base_hue = (time_ms as f32 * FLUID_HUE_SPEED).rem_euclid(360.0);
        for by in 0..out_h {
            let py = (by * stride) as f32;
            let row = ((py / self.cell_size.y) as usize).min(self.rows - 1);
            for bx in 0..out_w {
                let px = (bx * stride) as f32;
                let col = ((px / self.cell_size.x) as usize).min(self.cols - 1);
                let cell = &self.cells[row * self.cols + col];
                let speed = cell.speed();

                let offset = ((by * out_w + bx) * 4) as usize;
                let alpha = (cell.density * speed).clamp(0.0, 1.0);
                if alpha <= 0.0 {
                    image.pixels[offset..offset + 4].fill(0);
                    continue;
                }
                let hue = (base_hue + 200.0 + speed * 40.0).rem_euclid(360.0);
                let [r, g, b] = hsl_to_rgb(hue, 0.8, 0.6);
                image.pixels[offset] = (r * 255.0) as u8;
                image.pixels[offset + 1] = (g * 255.0) as u8;
                image.pixels[offset + 2] = (b * 255.0) as u8;
                image.pixels[offset + 3] = (alpha * 255.0) as u8;
            }
        }
    }
}

/// Blocked RGBA8 bitmap, uploaded as one texture and stretched over the surface
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl FieldImage {
    fn resize(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.pixels = vec![0; (width * height * 4) as usize];
        }
    }
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stirred() -> FluidField {
        let mut field = FluidField::new(50, 1000.0, 500.0);
        field.step(true, Some(Vec2::new(400.0, 200.0)));
        field.step(true, Some(Vec2::new(440.0, 220.0)));
        field
    }

    #[test]
    fn test_rows_follow_aspect() {
        let field = FluidField::new(50, 1000.0, 500.0);
        assert_eq!(field.cols(), 50);
        assert_eq!(field.rows(), 25);
        assert_eq!(field.cells().len(), 50 * 25);
    }

    #[test]
    fn test_tier_columns() {
        assert_eq!(columns_for_tier(PerformanceTier::High), 80);
        assert_eq!(columns_for_tier(PerformanceTier::Medium), 50);
        assert_eq!(columns_for_tier(PerformanceTier::Low), 30);
    }

    #[test]
    fn test_pointer_injects_density_and_velocity() {
        let field = stirred();
        assert!(field.total_density() > 0.0);
        // Pointer moved right and down
        let cell = field.cell(22, 11).unwrap();
        assert!(cell.u > 0.0 && cell.v > 0.0);
    }

    #[test]
    fn test_slow_pointer_is_ignored() {
        let mut field = FluidField::new(50, 1000.0, 500.0);
        field.step(true, Some(Vec2::new(400.0, 200.0)));
        field.step(true, Some(Vec2::new(400.5, 200.0)));
        assert_eq!(field.total_density(), 0.0);
    }

    #[test]
    fn test_density_decays_strictly_without_input() {
        let mut field = stirred();
        for _ in 0..200 {
            let before: Vec<f32> = field.cells().iter().map(|c| c.density).collect();
            field.step(true, None);
            for (old, cell) in before.iter().zip(field.cells()) {
                if *old > 0.0 {
                    assert!(cell.density < *old);
                } else {
                    assert_eq!(cell.density, 0.0);
                }
            }
        }
    }

    #[test]
    fn test_density_reaches_exact_zero() {
        let mut field = FluidField::new(10, 100.0, 100.0);
        field.cells_mut()[55].density = 1.0;
        for step in 0..8_000 {
            let before = field.cells()[55].density;
            field.step(true, None);
            let after = field.cells()[55].density;
            if before > 0.0 {
                assert!(after < before, "step {step}: {after} not below {before}");
            } else {
                assert_eq!(after, 0.0);
            }
        }
        assert!(field.cells().iter().all(|c| c.density == 0.0));
    }

    #[test]
    fn test_density_converges_to_zero() {
        let mut field = stirred();
        let start = field.total_density();
        for _ in 0..2_000 {
            field.step(true, None);
        }
        assert!(field.total_density() < start * 1e-6);
    }

    #[test]
    fn test_closed_gate_is_noop() {
        let mut field = stirred();
        let before = field.cells().to_vec();
        field.step(false, Some(Vec2::new(10.0, 10.0)));
        assert_eq!(field.cells(), &before[..]);
    }

    #[test]
    fn test_diffusion_spreads_velocity() {
        let mut field = FluidField::new(10, 100.0, 100.0);
        let center = 5 * 10 + 5;
        field.cells_mut()[center].u = 1.0;
        field.step(true, None);
        let cells = field.cells();
        assert!(cells[center].u < 1.0);
        assert!(cells[center + 1].u > 0.0);
        assert!(cells[center - 10].u > 0.0);
        assert_eq!(cells[center + 2].u, 0.0);
    }

    #[test]
    fn test_zero_resize_keeps_grid() {
        let mut field = stirred();
        let before = field.cells().to_vec();
        assert!(!field.resize(0.0, 0.0));
        assert_eq!(field.cells(), &before[..]);
    }

    #[test]
    fn test_paint_is_blocked() {
        let field = stirred();
        let mut image = FieldImage::default();
        field.paint(1000, 500, 2, 0.0, &mut image);
        assert_eq!((image.width, image.height), (500, 250));
        assert_eq!(image.pixels.len(), 500 * 250 * 4);
        assert!(image.pixels.chunks_exact(4).any(|px| px[3] > 0));
    }

    #[test]
    fn test_hsl_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-6 && red[1].abs() < 1e-6 && red[2].abs() < 1e-6);
        let blue = hsl_to_rgb(240.0, 1.0, 0.5);
        assert!((blue[2] - 1.0).abs() < 1e-6);
    }
}
