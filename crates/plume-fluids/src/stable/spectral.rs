use std::sync::Arc;

use ndarray::Array2;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Real 2-D Fourier transform pair for the periodic grid.
///
/// The forward direction maps a real `(n, n)` field onto the packed
/// half-spectrum `(n, n/2 + 1)`: each row keeps only the non-redundant
/// coefficients of its real-input transform (Hermitian symmetry), then a full
/// complex transform runs down every retained column. Entry `[[j, k]]` is the
/// coefficient for wavenumber `kx = k` and row-frequency index `j`.
///
/// The inverse is the exact reverse and is NOT normalized: a forward/inverse
/// round trip scales the field by `n * n`, and callers divide that back out.
///
/// Plans and scratch are built once in [`Transform2D::new`]; transform calls
/// allocate nothing.
pub struct Transform2D {
    n: usize,
    fwd: Arc<dyn Fft<f32>>,
    inv: Arc<dyn Fft<f32>>,
    line: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl Transform2D {
    pub fn new(n: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fwd = planner.plan_fft_forward(n);
        let inv = planner.plan_fft_inverse(n);
        let scratch_len = fwd
            .get_inplace_scratch_len()
            .max(inv.get_inplace_scratch_len());

        Self {
            n,
            fwd,
            inv,
            line: vec![Complex::new(0.0, 0.0); n],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
        }
    }

    /// Number of retained frequency columns, `n/2 + 1`.
    pub fn half_width(&self) -> usize {
        self.n / 2 + 1
    }

    /// A zeroed half-spectrum buffer of the right shape.
    pub fn spectrum(&self) -> Array2<Complex<f32>> {
        Array2::from_elem((self.n, self.half_width()), Complex::new(0.0, 0.0))
    }

    /// Real-to-complex forward transform of `spatial` into `spectrum`.
    pub fn forward(&mut self, spatial: &Array2<f32>, spectrum: &mut Array2<Complex<f32>>) {
        let n = self.n;
        let half = self.half_width();

        for j in 0..n {
            for i in 0..n {
                self.line[i] = Complex::new(spatial[[j, i]], 0.0);
            }
            self.fwd.process_with_scratch(&mut self.line, &mut self.scratch);
            for k in 0..half {
                spectrum[[j, k]] = self.line[k];
            }
        }

        for k in 0..half {
            for j in 0..n {
                self.line[j] = spectrum[[j, k]];
            }
            self.fwd.process_with_scratch(&mut self.line, &mut self.scratch);
            for j in 0..n {
                spectrum[[j, k]] = self.line[j];
            }
        }
    }

    /// Complex-to-real inverse transform of `spectrum` into `spatial`,
    /// unnormalized. The spectrum contents are consumed in the process.
    pub fn inverse(&mut self, spectrum: &mut Array2<Complex<f32>>, spatial: &mut Array2<f32>) {
        let n = self.n;
        let half = self.half_width();

        for k in 0..half {
            for j in 0..n {
                self.line[j] = spectrum[[j, k]];
            }
            self.inv.process_with_scratch(&mut self.line, &mut self.scratch);
            for j in 0..n {
                spectrum[[j, k]] = self.line[j];
            }
        }

        for j in 0..n {
            for k in 0..half {
                self.line[k] = spectrum[[j, k]];
            }
            // The dropped upper half of each row is the mirror image of the
            // stored half: coefficient n - k is the conjugate of k.
            for i in half..n {
                self.line[i] = spectrum[[j, n - i]].conj();
            }
            self.inv.process_with_scratch(&mut self.line, &mut self.scratch);
            for i in 0..n {
                spatial[[j, i]] = self.line[i].re;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use rustfft::num_complex::Complex;
    use std::f32::consts::TAU;

    use super::*;

    fn test_field(n: usize) -> Array2<f32> {
        Array2::from_shape_fn((n, n), |(j, i)| {
            let x = i as f32 / n as f32;
            let y = j as f32 / n as f32;
            (TAU * x).sin() + 0.5 * (2.0 * TAU * y).cos() + 0.25 * (i as f32 - j as f32)
        })
    }

    #[test]
    fn round_trip_scales_by_n_squared() {
        let n = 16;
        let mut transform = Transform2D::new(n);
        let field = test_field(n);

        let mut spectrum = transform.spectrum();
        transform.forward(&field, &mut spectrum);

        let mut out = Array2::zeros((n, n));
        transform.inverse(&mut spectrum, &mut out);

        let scale = (n * n) as f32;
        for (got, want) in out.iter().zip(field.iter()) {
            assert_relative_eq!(*got, scale * want, epsilon = 1e-2, max_relative = 1e-3);
        }
    }

    #[test]
    fn round_trip_handles_odd_sizes() {
        let n = 15;
        let mut transform = Transform2D::new(n);
        let field = test_field(n);

        let mut spectrum = transform.spectrum();
        transform.forward(&field, &mut spectrum);

        let mut out = Array2::zeros((n, n));
        transform.inverse(&mut spectrum, &mut out);

        let scale = (n * n) as f32;
        for (got, want) in out.iter().zip(field.iter()) {
            assert_relative_eq!(*got, scale * want, epsilon = 1e-2, max_relative = 1e-3);
        }
    }

    #[test]
    fn constant_field_is_pure_dc() {
        let n = 8;
        let mut transform = Transform2D::new(n);
        let field = Array2::from_elem((n, n), 2.5);

        let mut spectrum = transform.spectrum();
        transform.forward(&field, &mut spectrum);

        assert_relative_eq!(spectrum[[0, 0]].re, 2.5 * (n * n) as f32, max_relative = 1e-5);
        assert_relative_eq!(spectrum[[0, 0]].im, 0.0, epsilon = 1e-3);

        for j in 0..n {
            for k in 0..transform.half_width() {
                if j == 0 && k == 0 {
                    continue;
                }
                assert!(
                    spectrum[[j, k]].norm() < 1e-3,
                    "non-DC bin ({j}, {k}) holds energy: {}",
                    spectrum[[j, k]]
                );
            }
        }
    }

    #[test]
    fn forward_matches_direct_dft() {
        let n = 8;
        let mut transform = Transform2D::new(n);
        let field = test_field(n);

        let mut spectrum = transform.spectrum();
        transform.forward(&field, &mut spectrum);

        // Direct O(n^4) DFT over a few bins.
        for &(kx, ky) in &[(1usize, 2usize), (3, 5), (0, 7), (4, 1)] {
            let mut direct = Complex::new(0.0, 0.0);
            for j in 0..n {
                for i in 0..n {
                    let phase = -TAU * (kx * i + ky * j) as f32 / n as f32;
                    direct += field[[j, i]] * Complex::new(phase.cos(), phase.sin());
                }
            }

            let got = spectrum[[ky, kx]];
            assert_relative_eq!(got.re, direct.re, epsilon = 1e-2, max_relative = 1e-3);
            assert_relative_eq!(got.im, direct.im, epsilon = 1e-2, max_relative = 1e-3);
        }
    }
}
