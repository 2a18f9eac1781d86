use crate::{set_boundary, Boundary, Field2, FieldPair, Grid2};
use std::sync::OnceLock;

/// Gauss-Seidel sweeps per relaxation. There is no residual check.
pub const RELAX_ITERATIONS: usize = 20;

const PAR_THRESHOLD_DEFAULT: usize = 262_144;

fn parallel_threshold() -> usize {
    static THRESHOLD: OnceLock<usize> = OnceLock::new();
    *THRESHOLD.get_or_init(|| {
        std::env::var("SIM_PAR_THRESHOLD")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(PAR_THRESHOLD_DEFAULT)
    })
}

fn should_parallel(len: usize) -> bool {
    len >= parallel_threshold() && rayon::current_num_threads() > 1
}

fn join_if(parallel: bool, a: impl FnOnce() + Send, b: impl FnOnce() + Send) {
    if parallel {
        rayon::join(a, b);
    } else {
        a();
        b();
    }
}

/// All six buffers of one simulation: density and both velocity components,
/// each double buffered.
#[derive(Clone, Debug, PartialEq)]
pub struct FluidState {
    pub density: FieldPair,
    pub velocity_x: FieldPair,
    pub velocity_y: FieldPair,
}

impl FluidState {
    pub fn new(grid: Grid2) -> Self {
        Self {
            density: FieldPair::new(grid),
            velocity_x: FieldPair::new(grid),
            velocity_y: FieldPair::new(grid),
        }
    }

    pub fn grid(&self) -> Grid2 {
        self.density.grid()
    }

    /// Zeroes the source buffers before new forcing is written into them.
    pub fn clear_sources(&mut self) {
        self.density.clear_previous();
        self.velocity_x.clear_previous();
        self.velocity_y.clear_previous();
    }

    pub fn is_finite(&self) -> bool {
        [&self.density, &self.velocity_x, &self.velocity_y]
            .iter()
            .all(|pair| pair.current.is_finite() && pair.previous.is_finite())
    }
}

/// `field += dt * source` over every cell, boundary included.
pub fn add_source_in_place(field: &mut Field2, source: &Field2, dt: f32) {
    field.assert_same_grid(source);
    for (value, src) in field.data_mut().iter_mut().zip(source.data()) {
        *value += dt * src;
    }
}

/// Solves `c*x - a*(sum of 4 neighbours) = x0` on the interior by
/// [`RELAX_ITERATIONS`] in-place Gauss-Seidel sweeps, fixing the boundary
/// after each sweep.
pub fn relax_in_place(x: &mut Field2, x0: &Field2, kind: Boundary, a: f32, c: f32) {
    x.assert_same_grid(x0);
    let grid = x.grid();
    let stride = grid.stride();
    let source = x0.data();
    for _ in 0..RELAX_ITERATIONS {
        let data = x.data_mut();
        for (i, j) in grid.interior() {
            let idx = grid.idx(i, j);
            let neighbours = data[idx - 1] + data[idx + 1] + data[idx - stride] + data[idx + stride];
            data[idx] = (source[idx] + a * neighbours) / c;
        }
        set_boundary(x, kind);
    }
}

/// Implicit diffusion of `x0` into `x` at `rate`. A zero rate copies the
/// interior and only refreshes the boundary.
pub fn diffuse_into(x: &mut Field2, x0: &Field2, kind: Boundary, rate: f32, dt: f32) {
    let n = x.grid().n();
    let a = dt * rate * (n * n) as f32;
    relax_in_place(x, x0, kind, a, 1.0 + 4.0 * a);
}

/// Semi-Lagrangian transport of `d0` into `d` along `(u, v)`.
pub fn advect_into(
    d: &mut Field2,
    d0: &Field2,
    u: &Field2,
    v: &Field2,
    kind: Boundary,
    dt: f32,
) {
    d.assert_same_grid(d0);
    d.assert_same_grid(u);
    d.assert_same_grid(v);
    let grid = d.grid();
    let n = grid.n() as f32;
    let dt0 = dt * n;
    let (lo, hi) = (0.5, n + 0.5);
    for (i, j) in grid.interior() {
        let x = (i as f32 - dt0 * u.get(i, j)).clamp(lo, hi);
        let y = (j as f32 - dt0 * v.get(i, j)).clamp(lo, hi);
        d.set(i, j, d0.sample_bilinear(x, y));
    }
    set_boundary(d, kind);
}

/// Central-difference divergence of `(u, v)` on the interior, in grid units
/// scaled by `N`. Boundary cells of `out` are left at zero.
pub fn divergence_into(out: &mut Field2, u: &Field2, v: &Field2) {
    out.assert_same_grid(u);
    out.assert_same_grid(v);
    let grid = out.grid();
    let half_n = 0.5 * grid.n() as f32;
    out.fill(0.0);
    for (i, j) in grid.interior() {
        let du = u.get(i + 1, j) - u.get(i - 1, j);
        let dv = v.get(i, j + 1) - v.get(i, j - 1);
        out.set(i, j, half_n * (du + dv));
    }
}

/// Removes the divergent part of `(u, v)`. `p` and `div` are scratch fields
/// and hold the pressure and scaled divergence afterwards.
pub fn project_in_place(u: &mut Field2, v: &mut Field2, p: &mut Field2, div: &mut Field2) {
    u.assert_same_grid(v);
    u.assert_same_grid(p);
    u.assert_same_grid(div);
    let grid = u.grid();
    let n = grid.n() as f32;
    for (i, j) in grid.interior() {
        let u_r = u.get(i + 1, j);
        let u_l = u.get(i - 1, j);
        let v_u = v.get(i, j + 1);
        let v_d = v.get(i, j - 1);
        div.set(i, j, -0.5 * (u_r - u_l + v_u - v_d) / n);
        p.set(i, j, 0.0);
    }
    set_boundary(div, Boundary::None);
    set_boundary(p, Boundary::None);

    relax_in_place(p, div, Boundary::None, 1.0, 4.0);

    let half_n = 0.5 * n;
    for (i, j) in grid.interior() {
        let grad_x = p.get(i + 1, j) - p.get(i - 1, j);
        let grad_y = p.get(i, j + 1) - p.get(i, j - 1);
        u.add(i, j, -(half_n * grad_x));
        v.add(i, j, -(half_n * grad_y));
    }
    set_boundary(u, Boundary::MirrorX);
    set_boundary(v, Boundary::MirrorY);
}

/// Advances the velocity field by one step; the `previous` buffers hold the
/// velocity sources on entry and solver scratch on exit.
pub fn velocity_step(state: &mut FluidState, viscosity: f32, dt: f32) {
    let parallel = should_parallel(state.grid().size());
    velocity_step_with(state, viscosity, dt, parallel);
}

fn velocity_step_with(state: &mut FluidState, viscosity: f32, dt: f32, parallel: bool) {
    let FluidState {
        velocity_x: u,
        velocity_y: v,
        ..
    } = state;

    add_source_in_place(&mut u.current, &u.previous, dt);
    add_source_in_place(&mut v.current, &v.previous, dt);

    u.swap();
    v.swap();
    {
        let (u_cur, u_prev) = (&mut u.current, &u.previous);
        let (v_cur, v_prev) = (&mut v.current, &v.previous);
        join_if(
            parallel,
            move || diffuse_into(u_cur, u_prev, Boundary::MirrorX, viscosity, dt),
            move || diffuse_into(v_cur, v_prev, Boundary::MirrorY, viscosity, dt),
        );
    }

    project_in_place(
        &mut u.current,
        &mut v.current,
        &mut u.previous,
        &mut v.previous,
    );

    u.swap();
    v.swap();
    {
        let (u_cur, u_prev) = (&mut u.current, &u.previous);
        let (v_cur, v_prev) = (&mut v.current, &v.previous);
        join_if(
            parallel,
            move || advect_into(u_cur, u_prev, u_prev, v_prev, Boundary::MirrorX, dt),
            move || advect_into(v_cur, v_prev, u_prev, v_prev, Boundary::MirrorY, dt),
        );
    }

    project_in_place(
        &mut u.current,
        &mut v.current,
        &mut u.previous,
        &mut v.previous,
    );
}

/// Advances density by one step through the current velocity field; the
/// `previous` density buffer holds the density sources on entry.
pub fn density_step(state: &mut FluidState, diffusion: f32, dt: f32) {
    let FluidState {
        density: x,
        velocity_x: u,
        velocity_y: v,
    } = state;

    add_source_in_place(&mut x.current, &x.previous, dt);

    x.swap();
    diffuse_into(&mut x.current, &x.previous, Boundary::None, diffusion, dt);

    x.swap();
    advect_into(
        &mut x.current,
        &x.previous,
        &u.current,
        &v.current,
        Boundary::None,
        dt,
    );
}
