use std::io::Write;

use glam::Vec2;

use encode::{EncodingError, FluidFrameEncoder};
use plume_fluids::stable::d2::StableFluids2D;

pub mod as_bytes;
pub mod decode;
pub mod encode;

pub trait EncodeFluid {
    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError>;
}

impl EncodeFluid for StableFluids2D {
    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError> {
        let grid = self.grid();
        let cells = grid.n * grid.n;

        encoder.encode_section(cells, grid.rho.iter().copied())?;
        encoder.encode_section(
            cells,
            grid.vx
                .iter()
                .zip(grid.vy.iter())
                .map(|(&x, &y)| Vec2::new(x, y)),
        )?;

        Ok(())
    }
}
