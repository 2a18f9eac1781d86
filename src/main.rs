use anyhow::{ensure, Context, Result};
use stable_fluids::{density_to_luma, Bounds, FluidMesh, FluidSim, Impulse};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

const DEFAULT_FRAMES: u64 = 300;
const DEFAULT_RESOLUTION: usize = 99;
const LOG_EVERY: u64 = 30;

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("invalid {key}={value:?}")),
        Err(_) => Ok(default),
    }
}

fn write_pgm(path: &Path, width: usize, height: usize, luma: &[u8]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write!(out, "P5\n{width} {height}\n255\n")?;
    // Image rows run top to bottom, the grid bottom to top.
    for row in luma.chunks(width).rev() {
        out.write_all(row)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let frames = env_or("SIM_FRAMES", DEFAULT_FRAMES)?;
    let n = env_or("SIM_RESOLUTION", DEFAULT_RESOLUTION)?;
    let (ci, cj) = Impulse::default().cell;
    ensure!(
        n >= ci.max(cj),
        "SIM_RESOLUTION={n} leaves the impulse cell ({ci}, {cj}) outside the interior"
    );
    let output = std::env::args().nth(1);

    let mut sim = FluidSim::configure((n, n), Bounds::default());
    let mut mesh = FluidMesh::new(sim.grid(), sim.bounds());
    log::info!(
        "running {frames} frames on a {n}x{n} grid ({} vertices, {} indices)",
        mesh.positions().len(),
        mesh.indices().len()
    );

    for frame in 0..frames {
        sim.step(frame);
        mesh.update(sim.density());
        if (frame + 1) % LOG_EVERY == 0 {
            let stats = sim.stats();
            log::info!(
                "frame {:>5}  total {:>10.3}  max {:>8.3}  speed {:>7.3}",
                frame + 1,
                stats.total_density,
                stats.max_density,
                stats.max_speed
            );
        }
    }

    let stats = sim.stats();
    if !stats.finite {
        log::warn!("simulation ended with non-finite values");
    }

    if let Some(path) = output {
        let path = Path::new(&path);
        let mut luma = Vec::new();
        density_to_luma(sim.density(), &mut luma);
        write_pgm(path, n, n, &luma)?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}
