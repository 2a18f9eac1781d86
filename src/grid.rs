/// Square simulation grid with `n` interior cells per axis and a one-cell
/// boundary ring, so every field stores `(n + 2)²` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid2 {
    n: usize,
}

impl Grid2 {
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "interior resolution must be > 0");
        Self { n }
    }

    /// Interior resolution `N`.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Cells per row including the boundary ring.
    pub fn stride(&self) -> usize {
        self.n + 2
    }

    pub fn size(&self) -> usize {
        self.stride() * self.stride()
    }

    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i <= self.n + 1 && j <= self.n + 1);
        i + self.stride() * j
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        i <= self.n + 1 && j <= self.n + 1
    }

    pub fn is_interior(&self, i: usize, j: usize) -> bool {
        (1..=self.n).contains(&i) && (1..=self.n).contains(&j)
    }

    /// Interior cells in relaxation order: `i` outer, `j` inner.
    pub fn interior(&self) -> impl Iterator<Item = (usize, usize)> {
        let n = self.n;
        (1..=n).flat_map(move |i| (1..=n).map(move |j| (i, j)))
    }
}
