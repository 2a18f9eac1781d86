use crate::{density_step, velocity_step, Bounds, Field2, FluidState, Grid2, Vec2};
use std::sync::OnceLock;
use std::time::Instant;

/// Fixed time step of one rendered frame.
pub const FRAME_DT: f32 = 1.0 / 30.0;

fn finite_check_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| {
        std::env::var("SIM_CHECK_FINITE")
            .ok()
            .map(|value| value != "0")
            .unwrap_or(cfg!(debug_assertions))
    })
}

/// Point forcing injected every frame: a fixed amount of density and a
/// velocity of fixed magnitude whose direction turns with the frame number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Impulse {
    pub cell: (usize, usize),
    pub density: f32,
    pub speed: f32,
    /// Radians per frame.
    pub angular_rate: f32,
}

impl Impulse {
    pub fn velocity_at(&self, frame: u64) -> Vec2 {
        Vec2::from_polar(self.speed, frame as f32 * self.angular_rate)
    }
}

impl Default for Impulse {
    fn default() -> Self {
        Self {
            cell: (50, 50),
            density: 100.0,
            speed: 10.0,
            angular_rate: 0.01,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidParams {
    pub dt: f32,
    pub viscosity: f32,
    pub diffusion: f32,
    pub impulse: Option<Impulse>,
}

impl Default for FluidParams {
    fn default() -> Self {
        Self {
            dt: FRAME_DT,
            viscosity: 0.0,
            diffusion: 0.0,
            impulse: Some(Impulse::default()),
        }
    }
}

/// Snapshot of the simulation for logging and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidStats {
    pub steps: u64,
    pub total_density: f32,
    pub max_density: f32,
    pub max_speed: f32,
    pub finite: bool,
}

/// A stable-fluids simulation driven once per frame.
#[derive(Clone, Debug)]
pub struct FluidSim {
    state: FluidState,
    params: FluidParams,
    bounds: Bounds,
    steps: u64,
    instability_reported: bool,
}

impl FluidSim {
    /// Square grid with `grid_size.0` interior cells per axis and the default
    /// per-frame forcing. That forcing sits at cell (50, 50), so this panics
    /// below 50 cells per axis; use [`FluidSim::new`] with `impulse: None` or
    /// a closer cell for smaller grids.
    pub fn configure(grid_size: (usize, usize), bounds: Bounds) -> Self {
        Self::new(grid_size, bounds, FluidParams::default())
    }

    pub fn new(grid_size: (usize, usize), bounds: Bounds, params: FluidParams) -> Self {
        assert_eq!(grid_size.0, grid_size.1, "fluid grid must be square");
        let grid = Grid2::new(grid_size.0);
        if let Some(impulse) = params.impulse {
            let (i, j) = impulse.cell;
            assert!(grid.contains(i, j), "impulse cell ({i}, {j}) outside grid");
        }
        log::debug!(
            "fluid grid {}x{} ({} cells per field)",
            grid.n(),
            grid.n(),
            grid.size()
        );
        Self {
            state: FluidState::new(grid),
            params,
            bounds,
            steps: 0,
            instability_reported: false,
        }
    }

    pub fn grid(&self) -> Grid2 {
        self.state.grid()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn params(&self) -> FluidParams {
        self.params
    }

    pub fn state(&self) -> &FluidState {
        &self.state
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn density(&self) -> &Field2 {
        &self.state.density.current
    }

    pub fn velocity_x(&self) -> &Field2 {
        &self.state.velocity_x.current
    }

    pub fn velocity_y(&self) -> &Field2 {
        &self.state.velocity_y.current
    }

    /// Raw density; renderers clamp into `[0, 1]`.
    pub fn sample_density(&self, i: usize, j: usize) -> f32 {
        self.density().get(i, j)
    }

    pub fn sample_velocity(&self, i: usize, j: usize) -> Vec2 {
        Vec2::new(self.velocity_x().get(i, j), self.velocity_y().get(i, j))
    }

    /// Adds density and velocity to the source buffers consumed by the next
    /// [`FluidSim::advance`].
    pub fn inject(&mut self, i: usize, j: usize, density: f32, velocity: Vec2) {
        self.state.density.previous.add(i, j, density);
        self.state.velocity_x.previous.add(i, j, velocity.x);
        self.state.velocity_y.previous.add(i, j, velocity.y);
    }

    /// One frame: clear the sources, apply the configured impulse, advance.
    pub fn step(&mut self, frame: u64) {
        let started = Instant::now();
        self.state.clear_sources();
        if let Some(impulse) = self.params.impulse {
            let (i, j) = impulse.cell;
            self.inject(i, j, impulse.density, impulse.velocity_at(frame));
        }
        self.advance();
        log::debug!(
            "frame {frame}: step took {:.3}ms",
            started.elapsed().as_secs_f64() * 1000.0
        );
    }

    /// Velocity step then density step on whatever the source buffers hold.
    pub fn advance(&mut self) {
        let FluidParams {
            dt,
            viscosity,
            diffusion,
            ..
        } = self.params;
        velocity_step(&mut self.state, viscosity, dt);
        density_step(&mut self.state, diffusion, dt);
        self.steps += 1;
        self.check_finite();
    }

    /// Zeroes every field; the grid and parameters are kept.
    pub fn clear(&mut self) {
        self.state = FluidState::new(self.grid());
        self.steps = 0;
        self.instability_reported = false;
    }

    pub fn stats(&self) -> FluidStats {
        let grid = self.grid();
        let density = self.density();
        let max_speed = grid
            .interior()
            .map(|(i, j)| self.sample_velocity(i, j).length())
            .fold(0.0, f32::max);
        FluidStats {
            steps: self.steps,
            total_density: density.interior_sum(),
            max_density: density.min_max().1,
            max_speed,
            finite: self.state.is_finite(),
        }
    }

    fn check_finite(&mut self) {
        if self.instability_reported || !finite_check_enabled() {
            return;
        }
        if !self.state.is_finite() {
            log::warn!(
                "non-finite values in fluid fields after step {} (viscosity {}, diffusion {})",
                self.steps,
                self.params.viscosity,
                self.params.diffusion
            );
            self.instability_reported = true;
        }
    }
}
