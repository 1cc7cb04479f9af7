use glam::{IVec2, Vec2};
use ndarray::{azip, Array2};
use rustfft::num_complex::Complex;
use tracing::debug;

use crate::Fluid;

use super::advect::advect;
use super::grid_2d::FluidGrid2D;
use super::spectral::Transform2D;
use super::InitError;

/// Per-tick damping applied to accumulated forces.
const FORCE_DECAY: f32 = 0.85;
/// Per-tick damping applied to smoke density.
const DENSITY_DECAY: f32 = 0.995;

/// FFT-based "stable fluids" solver on a periodic square grid.
///
/// Each step runs the forcing policy, the five-stage velocity solve (force
/// integration, self-advection, forward transform, spectral viscosity plus
/// divergence projection, inverse transform and normalization), then advects
/// the smoke density through the updated velocity. After every step the
/// velocity field is divergence free up to spectral precision.
///
/// Extreme `dt`/viscosity choices can diverge numerically; that is accepted
/// and left undetected rather than checked per step.
pub struct StableFluids2D {
    grid: FluidGrid2D,
    transform: Transform2D,
    spec_x: Array2<Complex<f32>>,
    spec_y: Array2<Complex<f32>>,
}

pub struct StableFluids2DParams {
    /// Spectral damping strength. Higher frequencies decay faster.
    pub viscosity: f32,
    /// Gates the whole step off while still letting injections accumulate.
    pub frozen: bool,
}

impl Default for StableFluids2DParams {
    fn default() -> Self {
        Self {
            viscosity: 0.001,
            frozen: false,
        }
    }
}

impl StableFluids2D {
    /// Allocates all fields and transform plans for an `n` by `n` grid.
    ///
    /// This is the only fallible operation; a solver that constructed
    /// successfully never fails during stepping. (Out-of-memory aborts the
    /// process, as for any Rust allocation.)
    pub fn new(n: usize) -> Result<Self, InitError> {
        if n < 2 {
            return Err(InitError::GridTooSmall(n));
        }

        let transform = Transform2D::new(n);
        let spec_x = transform.spectrum();
        let spec_y = transform.spectrum();

        debug!(n, "allocated stable-fluids solver");

        Ok(Self {
            grid: FluidGrid2D::new(n),
            transform,
            spec_x,
            spec_y,
        })
    }

    /// Cells per grid axis.
    pub fn size(&self) -> usize {
        self.grid.n
    }

    pub fn grid(&self) -> &FluidGrid2D {
        &self.grid
    }

    pub fn velocity(&self, i: usize, j: usize) -> Vec2 {
        Vec2::new(self.grid.vx[[j, i]], self.grid.vy[[j, i]])
    }

    pub fn force(&self, i: usize, j: usize) -> Vec2 {
        Vec2::new(self.grid.fx[[j, i]], self.grid.fy[[j, i]])
    }

    pub fn density(&self, i: usize, j: usize) -> f32 {
        self.grid.rho[[j, i]]
    }

    /// Adds a force delta at a cell. Out-of-range coordinates are clamped
    /// onto the grid rather than rejected.
    pub fn inject_force(&mut self, cell: IVec2, delta: Vec2) {
        let (j, i) = self.clamp_cell(cell);
        self.grid.fx[[j, i]] += delta.x;
        self.grid.fy[[j, i]] += delta.y;
    }

    /// Sets (does not add) the smoke density at a cell, clamped like
    /// [`inject_force`](Self::inject_force).
    pub fn inject_density(&mut self, cell: IVec2, amount: f32) {
        let (j, i) = self.clamp_cell(cell);
        self.grid.rho[[j, i]] = amount;
    }

    fn clamp_cell(&self, cell: IVec2) -> (usize, usize) {
        let max = self.grid.n as i32 - 1;
        let cell = cell.clamp(IVec2::ZERO, IVec2::splat(max));
        (cell.y as usize, cell.x as usize)
    }

    /// Forcing policy: decay accumulated density and forces, then seed the
    /// velocity scratch fields with the decayed forces for stage 1.
    fn apply_forcing(&mut self) {
        let grid = &mut self.grid;

        azip!((r0 in &mut grid.rho_prev, &r in &grid.rho) *r0 = DENSITY_DECAY * r);
        azip!((f in &mut grid.fx, v0 in &mut grid.vx_prev) {
            *f *= FORCE_DECAY;
            *v0 = *f;
        });
        azip!((f in &mut grid.fy, v0 in &mut grid.vy_prev) {
            *f *= FORCE_DECAY;
            *v0 = *f;
        });
    }

    fn solve_velocity(&mut self, dt: f32, viscosity: f32) {
        let Self {
            grid,
            transform,
            spec_x,
            spec_y,
        } = self;

        // Stage 1: integrate forces, then seed the advection source with the
        // force-perturbed velocity.
        azip!((v in &mut grid.vx, v0 in &mut grid.vx_prev) {
            *v += dt * *v0;
            *v0 = *v;
        });
        azip!((v in &mut grid.vy, v0 in &mut grid.vy_prev) {
            *v += dt * *v0;
            *v0 = *v;
        });

        // Stage 2: self-advection. Reads only the scratch fields, writes only
        // the live ones.
        advect(dt, &grid.vx_prev, &grid.vy_prev, &grid.vx_prev, &mut grid.vx);
        advect(dt, &grid.vx_prev, &grid.vy_prev, &grid.vy_prev, &mut grid.vy);

        // Stage 3: to frequency space.
        transform.forward(&grid.vx, spec_x);
        transform.forward(&grid.vy, spec_y);

        // Stage 4: viscous damping and divergence projection.
        project(dt, viscosity, spec_x, spec_y);

        // Stage 5: back to spatial samples, undoing the unnormalized
        // transform pair.
        transform.inverse(spec_x, &mut grid.vx);
        transform.inverse(spec_y, &mut grid.vy);

        let norm = 1.0 / (grid.n * grid.n) as f32;
        grid.vx.mapv_inplace(|v| v * norm);
        grid.vy.mapv_inplace(|v| v * norm);
    }

    /// Scalar transport: pure advection of the decayed density through the
    /// already-updated velocity. No diffusion term is applied.
    fn transport_density(&mut self, dt: f32) {
        let grid = &mut self.grid;
        advect(dt, &grid.vx, &grid.vy, &grid.rho_prev, &mut grid.rho);
    }
}

impl Fluid for StableFluids2D {
    type Params = StableFluids2DParams;

    fn step(&mut self, dt: f32, params: &Self::Params) {
        if params.frozen {
            return;
        }

        self.apply_forcing();
        self.solve_velocity(dt, params.viscosity);
        self.transport_density(dt);
    }
}

/// Damps every retained frequency by `exp(-|k|^2 * dt * visc)` and removes
/// the component of the velocity spectrum parallel to its wavevector, which
/// is what enforces incompressibility. The zero-frequency bin (mean flow)
/// passes through untouched.
fn project(
    dt: f32,
    viscosity: f32,
    spec_x: &mut Array2<Complex<f32>>,
    spec_y: &mut Array2<Complex<f32>>,
) {
    let n = spec_x.nrows();
    let half = spec_x.ncols();

    for j in 0..n {
        // Row indices above n/2 stand for the negative frequencies.
        let ky = if j <= n / 2 {
            j as f32
        } else {
            j as f32 - n as f32
        };

        for k in 0..half {
            let kx = k as f32;
            let r = kx * kx + ky * ky;
            if r == 0.0 {
                continue;
            }

            let damp = (-r * dt * viscosity).exp();
            let u = spec_x[[j, k]];
            let v = spec_y[[j, k]];

            spec_x[[j, k]] = (u * (1.0 - kx * kx / r) - v * (kx * ky / r)) * damp;
            spec_y[[j, k]] = (u * (-ky * kx / r) + v * (1.0 - ky * ky / r)) * damp;
        }
    }
}
