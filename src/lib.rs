mod boundary;
mod field;
mod grid;
mod mesh;
mod sim;
mod solver;
mod vec2;

pub use boundary::{set_boundary, Boundary};
pub use field::{Field2, FieldPair};
pub use grid::Grid2;
pub use mesh::{density_to_luma, Bounds, FluidMesh};
pub use sim::{FluidParams, FluidSim, FluidStats, Impulse, FRAME_DT};
pub use solver::{
    add_source_in_place, advect_into, density_step, diffuse_into, divergence_into,
    project_in_place, relax_in_place, velocity_step, FluidState, RELAX_ITERATIONS,
};
pub use vec2::Vec2;
