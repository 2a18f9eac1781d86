use crate::field::Field2;

/// How the boundary ring of a field is derived from its interior neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// Copy the neighbour: zero gradient across every wall.
    None,
    /// Negate across the left and right walls (x velocity).
    MirrorX,
    /// Negate across the bottom and top walls (y velocity).
    MirrorY,
}

impl Boundary {
    fn x_sign(self) -> f32 {
        if self == Boundary::MirrorX {
            -1.0
        } else {
            1.0
        }
    }

    fn y_sign(self) -> f32 {
        if self == Boundary::MirrorY {
            -1.0
        } else {
            1.0
        }
    }
}

/// Rewrites the edges from their adjacent interior cell, then each corner as
/// the mean of its two edge neighbours.
pub fn set_boundary(field: &mut Field2, kind: Boundary) {
    let grid = field.grid();
    let n = grid.n();
    let sx = kind.x_sign();
    let sy = kind.y_sign();
    let x = field.data_mut();
    for k in 1..=n {
        x[grid.idx(0, k)] = sx * x[grid.idx(1, k)];
        x[grid.idx(n + 1, k)] = sx * x[grid.idx(n, k)];
        x[grid.idx(k, 0)] = sy * x[grid.idx(k, 1)];
        x[grid.idx(k, n + 1)] = sy * x[grid.idx(k, n)];
    }
    x[grid.idx(0, 0)] = 0.5 * (x[grid.idx(1, 0)] + x[grid.idx(0, 1)]);
    x[grid.idx(0, n + 1)] = 0.5 * (x[grid.idx(1, n + 1)] + x[grid.idx(0, n)]);
    x[grid.idx(n + 1, 0)] = 0.5 * (x[grid.idx(n, 0)] + x[grid.idx(n + 1, 1)]);
    x[grid.idx(n + 1, n + 1)] = 0.5 * (x[grid.idx(n, n + 1)] + x[grid.idx(n + 1, n)]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid2;

    fn interior_ramp(n: usize) -> Field2 {
        let grid = Grid2::new(n);
        Field2::from_fn(grid, |i, j| {
            if grid.is_interior(i, j) {
                (i * 3 + j * 5) as f32 - 7.5
            } else {
                99.0
            }
        })
    }

    #[test]
    fn mirror_x_negates_left_and_right_walls() {
        let n = 5;
        let mut field = interior_ramp(n);
        set_boundary(&mut field, Boundary::MirrorX);
        for j in 1..=n {
            assert_eq!(field.get(0, j), -field.get(1, j));
            assert_eq!(field.get(n + 1, j), -field.get(n, j));
        }
        for i in 1..=n {
            assert_eq!(field.get(i, 0), field.get(i, 1));
            assert_eq!(field.get(i, n + 1), field.get(i, n));
        }
    }

    #[test]
    fn mirror_y_negates_bottom_and_top_walls() {
        let n = 4;
        let mut field = interior_ramp(n);
        set_boundary(&mut field, Boundary::MirrorY);
        for k in 1..=n {
            assert_eq!(field.get(k, 0), -field.get(k, 1));
            assert_eq!(field.get(k, n + 1), -field.get(k, n));
            assert_eq!(field.get(0, k), field.get(1, k));
            assert_eq!(field.get(n + 1, k), field.get(n, k));
        }
    }

    #[test]
    fn none_copies_neighbours() {
        let n = 3;
        let mut field = interior_ramp(n);
        set_boundary(&mut field, Boundary::None);
        for j in 1..=n {
            assert_eq!(field.get(0, j), field.get(1, j));
            assert_eq!(field.get(n + 1, j), field.get(n, j));
        }
    }

    #[test]
    fn corners_average_adjacent_edges() {
        let n = 4;
        for kind in [Boundary::None, Boundary::MirrorX, Boundary::MirrorY] {
            let mut field = interior_ramp(n);
            set_boundary(&mut field, kind);
            assert_eq!(field.get(0, 0), 0.5 * (field.get(1, 0) + field.get(0, 1)));
            assert_eq!(
                field.get(0, n + 1),
                0.5 * (field.get(1, n + 1) + field.get(0, n))
            );
            assert_eq!(
                field.get(n + 1, 0),
                0.5 * (field.get(n, 0) + field.get(n + 1, 1))
            );
            assert_eq!(
                field.get(n + 1, n + 1),
                0.5 * (field.get(n, n + 1) + field.get(n + 1, n))
            );
        }
    }

    #[test]
    fn applying_twice_matches_once() {
        for kind in [Boundary::None, Boundary::MirrorX, Boundary::MirrorY] {
            let mut once = interior_ramp(6);
            set_boundary(&mut once, kind);
            let mut twice = once.clone();
            set_boundary(&mut twice, kind);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn interior_is_untouched() {
        let mut field = interior_ramp(3);
        let before = field.clone();
        set_boundary(&mut field, Boundary::MirrorX);
        for (i, j) in field.grid().interior() {
            assert_eq!(field.get(i, j), before.get(i, j));
        }
    }
}
