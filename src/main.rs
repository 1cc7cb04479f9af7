use std::path::PathBuf;

use clap::Parser;

mod run;

/// Headless smoke-simulation baker.
///
/// Runs the periodic stable-fluids solver with a scripted stirring rotor and
/// writes the density/velocity fields of every frame to a directory.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Cells per grid axis.
    #[arg(long, default_value_t = 50)]
    size: usize,

    /// Number of frames to bake.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Playback rate recorded in the output metadata.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Integration step per frame. Larger is faster but less stable.
    #[arg(long, default_value_t = 0.04)]
    dt: f32,

    /// Fluid viscosity (spectral damping strength).
    #[arg(long, default_value_t = 0.001)]
    viscosity: f32,

    /// Output directory for the baked frames.
    #[arg(long, default_value = "output/smoke")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(err) = run::run(
        cli.size,
        cli.frames,
        cli.fps,
        cli.dt,
        cli.viscosity,
        cli.output,
    ) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
