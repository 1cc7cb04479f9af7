use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::PathBuf,
};

use glam::Vec2;
use thiserror::Error;

use super::as_bytes::AsBytes;

/// Reads baked simulation output written by
/// [`FluidDataEncoder`](crate::encode::FluidDataEncoder).
pub struct FluidDataDecoder {
    /// The path to the directory in which the fluid data resides.
    path: PathBuf,
    num_frames: u64,
    current_frame: u64,
}

impl FluidDataDecoder {
    pub fn new(path: PathBuf) -> FluidDataDecoder {
        Self {
            path,
            num_frames: 0,
            current_frame: 0,
        }
    }

    fn read_value<const N: usize, T: AsBytes<N>, R: Read>(reader: &mut R) -> Result<T, DecodingError> {
        let mut bytes = [0; N];
        reader.read_exact(&mut bytes)?;
        Ok(T::from_bytes(bytes))
    }

    fn read_section<const N: usize, T: AsBytes<N>, R: BufRead>(
        reader: &mut R,
    ) -> Result<Vec<T>, DecodingError> {
        let len: u64 = Self::read_value(reader)?;

        let mut values = Vec::with_capacity(len as usize);
        let mut bytes = [0; N];
        for _ in 0..len {
            reader.read_exact(&mut bytes)?;
            values.push(T::from_bytes(bytes));
        }

        Ok(values)
    }

    fn frame_path(&self, frame: u64) -> PathBuf {
        let max_digits = (self.num_frames - 1).checked_ilog10().unwrap_or(0) + 1;
        let zeros = max_digits - (frame.checked_ilog10().unwrap_or(0) + 1);

        self.path.join(format!("{}{frame}.dat", "0".repeat(zeros as usize)))
    }

    pub fn decode_metadata(&mut self) -> Result<FluidMetadata, DecodingError> {
        let path = self.path.join("_meta");
        let mut reader = BufReader::new(File::open(path)?);

        let size: u32 = Self::read_value(&mut reader)?;
        let fps: u32 = Self::read_value(&mut reader)?;
        let num_frames: u64 = Self::read_value(&mut reader)?;
        let dt: f32 = Self::read_value(&mut reader)?;

        self.num_frames = num_frames;

        Ok(FluidMetadata {
            size,
            fps,
            num_frames,
            dt,
        })
    }

    pub fn decode_frame(&mut self) -> Result<Option<FluidFrameData>, DecodingError> {
        if self.current_frame >= self.num_frames {
            return Ok(None);
        }

        let path = self.frame_path(self.current_frame);
        let mut reader = BufReader::new(File::open(path)?);

        let density = Self::read_section(&mut reader)?;
        let velocity = Self::read_section(&mut reader)?;

        self.current_frame += 1;

        Ok(Some(FluidFrameData { density, velocity }))
    }

    pub fn reset(&mut self) {
        self.current_frame = 0;
    }
}

pub struct FluidMetadata {
    /// Cells per grid axis.
    pub size: u32,
    pub fps: u32,
    pub num_frames: u64,
    pub dt: f32,
}

/// One decoded frame, both sections in the grid's row-major cell order.
pub struct FluidFrameData {
    pub density: Vec<f32>,
    pub velocity: Vec<Vec2>,
}

#[derive(Debug, Error)]
pub enum DecodingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use glam::IVec2;

    use plume_fluids::stable::d2::{StableFluids2D, StableFluids2DParams};
    use plume_fluids::Fluid;

    use crate::encode::FluidDataEncoder;

    use super::*;

    #[test]
    fn round_trips_baked_frames() {
        let dir = std::env::temp_dir().join(format!("plume-io-roundtrip-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let mut sim = StableFluids2D::new(8).unwrap();
        let params = StableFluids2DParams::default();
        sim.inject_density(IVec2::new(3, 4), 10.0);
        sim.inject_force(IVec2::new(3, 4), glam::Vec2::new(0.5, -0.25));

        let frames = 3;
        let mut encoder = FluidDataEncoder::new(dir.clone(), frames, 30).unwrap();
        encoder.encode_metadata(&sim, 0.04).unwrap();

        let mut expected = Vec::new();
        for _ in 0..frames {
            sim.step(0.04, &params);
            encoder.encode_frame(&sim).unwrap();

            let grid = sim.grid();
            expected.push((
                grid.rho.iter().copied().collect::<Vec<_>>(),
                grid.vx
                    .iter()
                    .zip(grid.vy.iter())
                    .map(|(&x, &y)| Vec2::new(x, y))
                    .collect::<Vec<_>>(),
            ));
        }

        let mut decoder = FluidDataDecoder::new(dir.clone());
        let meta = decoder.decode_metadata().unwrap();
        assert_eq!(meta.size, 8);
        assert_eq!(meta.fps, 30);
        assert_eq!(meta.num_frames, frames);
        assert_eq!(meta.dt, 0.04);

        for (density, velocity) in &expected {
            let frame = decoder.decode_frame().unwrap().expect("missing frame");
            assert_eq!(&frame.density, density);
            assert_eq!(&frame.velocity, velocity);
        }
        assert!(decoder.decode_frame().unwrap().is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
