use crate::grid::Grid2;

/// Dense scalar field over every cell of a [`Grid2`], boundary ring included.
#[derive(Clone, Debug, PartialEq)]
pub struct Field2 {
    grid: Grid2,
    data: Vec<f32>,
}

impl Field2 {
    pub fn new(grid: Grid2, fill: f32) -> Self {
        let data = vec![fill; grid.size()];
        Self { grid, data }
    }

    pub fn from_fn(grid: Grid2, f: impl Fn(usize, usize) -> f32) -> Self {
        let stride = grid.stride();
        let data = (0..grid.size())
            .map(|idx| f(idx % stride, idx / stride))
            .collect();
        Self { grid, data }
    }

    pub fn from_data(grid: Grid2, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), grid.size(), "field data mismatch");
        Self { grid, data }
    }

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[self.grid.idx(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f32) {
        let idx = self.grid.idx(i, j);
        self.data[idx] = value;
    }

    pub fn add(&mut self, i: usize, j: usize, value: f32) {
        let idx = self.grid.idx(i, j);
        self.data[idx] += value;
    }

    /// Value clamped into `[0, 1]`, the range renderers consume.
    pub fn get_unit(&self, i: usize, j: usize) -> f32 {
        self.get(i, j).clamp(0.0, 1.0)
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Bilinear sample at fractional grid coordinates.
    ///
    /// The caller keeps `(x, y)` inside `[0, N + 1)` so that the upper
    /// stencil cell is still a stored cell.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        debug_assert!(x >= 0.0 && y >= 0.0);
        let i0 = x as usize;
        let j0 = y as usize;
        let i1 = i0 + 1;
        let j1 = j0 + 1;
        let s1 = x - i0 as f32;
        let s0 = 1.0 - s1;
        let t1 = y - j0 as f32;
        let t0 = 1.0 - t1;
        s0 * (t0 * self.get(i0, j0) + t1 * self.get(i0, j1))
            + s1 * (t0 * self.get(i1, j0) + t1 * self.get(i1, j1))
    }

    pub fn interior_sum(&self) -> f32 {
        self.grid.interior().map(|(i, j)| self.get(i, j)).sum()
    }

    pub fn max_abs(&self) -> f32 {
        self.data.iter().fold(0.0, |acc, value| acc.max(value.abs()))
    }

    pub fn min_max(&self) -> (f32, f32) {
        let mut iter = self.data.iter().filter(|value| value.is_finite());
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        iter.fold((*first, *first), |(lo, hi), value| {
            (lo.min(*value), hi.max(*value))
        })
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|value| value.is_finite())
    }

    pub(crate) fn assert_same_grid(&self, other: &Self) {
        assert_eq!(self.grid, other.grid, "field grid mismatch");
    }
}

/// Current and previous buffers of one simulated quantity.
///
/// The solver reads last step's values from `previous` while writing
/// `current`; [`FieldPair::swap`] exchanges the two without copying.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldPair {
    pub current: Field2,
    pub previous: Field2,
}

impl FieldPair {
    pub fn new(grid: Grid2) -> Self {
        Self {
            current: Field2::new(grid, 0.0),
            previous: Field2::new(grid, 0.0),
        }
    }

    pub fn grid(&self) -> Grid2 {
        self.current.grid()
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
    }

    pub fn clear_previous(&mut self) {
        self.previous.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    #[test]
    fn from_fn_maps_coords() {
        let grid = Grid2::new(2);
        let field = Field2::from_fn(grid, |i, j| (i + j * 10) as f32);
        assert_close(field.get(3, 1), 13.0, 1e-6);
        assert_close(field.data()[grid.idx(1, 2)], 21.0, 1e-6);
    }

    #[test]
    fn sample_bilinear_hits_cell_values_at_integers() {
        let grid = Grid2::new(3);
        let field = Field2::from_fn(grid, |i, j| (i * 7 + j * 3) as f32);
        assert_close(field.sample_bilinear(2.0, 1.0), field.get(2, 1), 1e-6);
    }

    #[test]
    fn sample_bilinear_blends_four_neighbours() {
        let grid = Grid2::new(2);
        let mut field = Field2::new(grid, 0.0);
        field.set(1, 1, 1.0);
        field.set(2, 1, 3.0);
        field.set(1, 2, 5.0);
        field.set(2, 2, 7.0);
        assert_close(field.sample_bilinear(1.5, 1.5), 4.0, 1e-6);
        assert_close(field.sample_bilinear(1.25, 1.0), 1.5, 1e-6);
    }

    #[test]
    fn interior_sum_ignores_boundary() {
        let grid = Grid2::new(2);
        let field = Field2::from_fn(grid, |i, j| {
            if grid.is_interior(i, j) {
                1.0
            } else {
                100.0
            }
        });
        assert_close(field.interior_sum(), 4.0, 1e-6);
        assert_close(field.data().iter().sum(), 4.0 + 12.0 * 100.0, 1e-3);
    }

    #[test]
    fn get_unit_clamps_for_rendering() {
        let grid = Grid2::new(1);
        let mut field = Field2::new(grid, 0.0);
        field.set(1, 1, 3.5);
        field.set(0, 1, -2.0);
        assert_close(field.get_unit(1, 1), 1.0, 1e-6);
        assert_close(field.get_unit(0, 1), 0.0, 1e-6);
        assert_close(field.get(1, 1), 3.5, 1e-6);
    }

    #[test]
    fn min_max_skips_non_finite() {
        let grid = Grid2::new(1);
        let mut field = Field2::from_fn(grid, |i, j| (i + j) as f32 - 1.0);
        field.set(1, 1, f32::NAN);
        let (lo, hi) = field.min_max();
        assert_close(lo, -1.0, 1e-6);
        assert_close(hi, 3.0, 1e-6);
        assert!(!field.is_finite());
    }

    #[test]
    fn pair_swap_exchanges_buffers() {
        let grid = Grid2::new(2);
        let mut pair = FieldPair::new(grid);
        pair.current.set(1, 1, 2.0);
        pair.previous.set(2, 2, 5.0);
        pair.swap();
        assert_close(pair.previous.get(1, 1), 2.0, 1e-6);
        assert_close(pair.current.get(2, 2), 5.0, 1e-6);
        pair.clear_previous();
        assert_close(pair.previous.max_abs(), 0.0, 1e-6);
        assert_close(pair.current.get(2, 2), 5.0, 1e-6);
    }
}
