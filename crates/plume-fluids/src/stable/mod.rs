pub mod advect;
pub mod d2;
pub mod grid_2d;
pub mod spectral;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InitError {
    /// The spectral transform needs at least two cells per axis.
    #[error("grid size {0} is too small for the spectral transform (minimum 2)")]
    GridTooSmall(usize),
}
