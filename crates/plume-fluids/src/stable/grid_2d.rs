use ndarray::Array2;

/// Field storage for the periodic smoke solver.
///
/// Every field is a square `(n, n)` array indexed `[[j, i]]` (row `j`, column
/// `i`), so the standard-layout slice matches the row-major `i + n * j` order
/// the frame codec reads. The grid is toroidal: there is no edge, and any
/// possibly-out-of-range index must go through [`wrap`] first.
#[derive(Debug, Clone)]
pub struct FluidGrid2D {
    /// Number of cells per axis.
    pub n: usize,
    /// Velocity in the X direction.
    pub vx: Array2<f32>,
    /// Velocity in the Y direction.
    pub vy: Array2<f32>,
    /// Advection source for `vx`; holds the decayed forces at the start of a
    /// step and the force-perturbed velocity during it.
    pub vx_prev: Array2<f32>,
    /// Advection source for `vy`.
    pub vy_prev: Array2<f32>,
    /// Accumulated external forces in the X direction.
    pub fx: Array2<f32>,
    /// Accumulated external forces in the Y direction.
    pub fy: Array2<f32>,
    /// Smoke density.
    pub rho: Array2<f32>,
    /// Previous-step smoke density, the advection source.
    pub rho_prev: Array2<f32>,
}

impl FluidGrid2D {
    /// Allocates all fields zero-filled. No further allocation happens per
    /// step; resizing means building a new grid.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            vx: Array2::zeros((n, n)),
            vy: Array2::zeros((n, n)),
            vx_prev: Array2::zeros((n, n)),
            vy_prev: Array2::zeros((n, n)),
            fx: Array2::zeros((n, n)),
            fy: Array2::zeros((n, n)),
            rho: Array2::zeros((n, n)),
            rho_prev: Array2::zeros((n, n)),
        }
    }
}

/// Wraps an index onto the periodic `[0, n)` range.
#[inline]
pub fn wrap(k: i32, n: usize) -> usize {
    k.rem_euclid(n as i32) as usize
}
