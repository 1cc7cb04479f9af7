use std::f32::consts::TAU;
use std::path::PathBuf;

use glam::Vec2;
use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};
use thiserror::Error;
use tracing::info;

use plume_fluids::{
    stable::{
        d2::{StableFluids2D, StableFluids2DParams},
        InitError,
    },
    Fluid,
};
use plume_io::encode::{EncodingError, FluidDataEncoder};

#[derive(Debug, Error)]
pub enum BakeError {
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

pub fn run(
    size: usize,
    frames: u64,
    fps: u32,
    dt: f32,
    viscosity: f32,
    output: PathBuf,
) -> Result<(), BakeError> {
    let mut sim = StableFluids2D::new(size)?;
    let params = StableFluids2DParams {
        viscosity,
        frozen: false,
    };

    let mut encoder = FluidDataEncoder::new(output, frames, fps)?;
    encoder.encode_metadata(&sim, dt)?;

    info!(size, frames, dt, viscosity, "baking smoke simulation");

    let bar_template = "Baking Smoke {spinner:.green} [{elapsed}] [{bar:50.white/white}] {pos}/{len} ({eta})";
    let style = ProgressStyle::with_template(bar_template).unwrap()
        .progress_chars("=> ").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress = ProgressBar::new(frames).with_style(style);

    let n = size as f32;
    let center = Vec2::splat(0.5 * n);
    let radius = 0.25 * n;

    for frame in (0..frames).progress_with(progress) {
        // A rotor circling the grid center: push along its direction of
        // travel and shed smoke, like the interactive drag in the classic
        // demo (force magnitude 0.1, density set to 10.0).
        let theta = 0.5 * TAU * frame as f32 / fps as f32;
        let pos = center + radius * Vec2::new(theta.cos(), theta.sin());
        let tangent = Vec2::new(-theta.sin(), theta.cos());

        let cell = pos.floor().as_ivec2();
        sim.inject_force(cell, 0.1 * tangent);
        sim.inject_density(cell, 10.0);

        sim.step(dt, &params);
        encoder.encode_frame(&sim)?;
    }

    Ok(())
}
