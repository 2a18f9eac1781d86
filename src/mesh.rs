use crate::{Field2, Grid2, Vec2};

/// Axis-aligned rectangle the fluid quad covers in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub center: Vec2,
    pub half_extent: Vec2,
}

impl Bounds {
    pub fn new(center: Vec2, half_extent: Vec2) -> Self {
        assert!(
            half_extent.x > 0.0 && half_extent.y > 0.0,
            "bounds must have positive extent"
        );
        Self {
            center,
            half_extent,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center.sub(self.half_extent)
    }

    pub fn max(&self) -> Vec2 {
        self.center.add(self.half_extent)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(Vec2::zero(), Vec2::new(10.0, 10.0))
    }
}

/// Vertex grid for drawing a density field: one vertex per stored cell,
/// boundary ring included, and two triangles per quad between them.
#[derive(Clone, Debug)]
pub struct FluidMesh {
    grid: Grid2,
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl FluidMesh {
    pub fn new(grid: Grid2, bounds: Bounds) -> Self {
        let quads = grid.stride() - 1;
        let step_x = bounds.half_extent.x * 2.0 / quads as f32;
        let step_y = bounds.half_extent.y * 2.0 / quads as f32;
        let origin = bounds.min();
        let mut positions = vec![[0.0; 3]; grid.size()];
        for j in 0..grid.stride() {
            for i in 0..grid.stride() {
                positions[grid.idx(i, j)] = [
                    i as f32 * step_x + origin.x,
                    j as f32 * step_y + origin.y,
                    0.0,
                ];
            }
        }
        Self {
            grid,
            positions,
            colors: vec![[0.0; 3]; grid.size()],
            indices: quad_indices(grid),
        }
    }

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Red channel = density clamped into `[0, 1]`.
    pub fn update(&mut self, density: &Field2) {
        assert_eq!(density.grid(), self.grid, "mesh grid mismatch");
        for (color, value) in self.colors.iter_mut().zip(density.data()) {
            *color = [value.clamp(0.0, 1.0), 0.0, 0.0];
        }
    }
}

fn quad_indices(grid: Grid2) -> Vec<u32> {
    let quads = grid.stride() - 1;
    let vertex = |i: usize, j: usize| grid.idx(i, j) as u32;
    let mut indices = Vec::with_capacity(quads * quads * 6);
    for i in 0..quads {
        for j in 0..quads {
            indices.extend_from_slice(&[
                vertex(i + 1, j),
                vertex(i, j + 1),
                vertex(i + 1, j + 1),
                vertex(i + 1, j),
                vertex(i, j),
                vertex(i, j + 1),
            ]);
        }
    }
    indices
}

/// Interior of `density` as 8-bit grayscale, rows bottom to top.
pub fn density_to_luma(density: &Field2, out: &mut Vec<u8>) {
    let n = density.grid().n();
    out.resize(n * n, 0);
    for j in 1..=n {
        for i in 1..=n {
            let t = density.get_unit(i, j);
            out[(j - 1) * n + (i - 1)] = (t * 255.0) as u8;
        }
    }
}
