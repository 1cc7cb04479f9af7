use ndarray::Array2;

use super::grid_2d::wrap;

/// Integer cell containing `x`, equal to `f32::floor` for any sign.
///
/// Truncating `as` conversion rounds toward zero, which picks the wrong cell
/// for negative back-traced coordinates and corrupts the periodic seam.
#[inline]
pub(crate) fn floor_cell(x: f32) -> i32 {
    x.floor() as i32
}

/// Semi-Lagrangian backward advection on the toroidal grid.
///
/// For every cell center the sampler traces `dt` backward along `(u, v)`,
/// wraps the landing cell onto the torus and bilinearly blends the four
/// surrounding `src` values into `dst`. `src` and `dst` must be distinct
/// arrays; the velocity fields may alias `src`.
pub fn advect(
    dt: f32,
    u: &Array2<f32>,
    v: &Array2<f32>,
    src: &Array2<f32>,
    dst: &mut Array2<f32>,
) {
    let n = src.nrows();
    let nf = n as f32;

    for j in 0..n {
        let y = (j as f32 + 0.5) / nf;
        for i in 0..n {
            let x = (i as f32 + 0.5) / nf;

            let x0 = nf * (x - dt * u[[j, i]]) - 0.5;
            let y0 = nf * (y - dt * v[[j, i]]) - 0.5;

            let ic = floor_cell(x0);
            let s = x0 - ic as f32;
            let jc = floor_cell(y0);
            let t = y0 - jc as f32;

            let i0 = wrap(ic, n);
            let i1 = wrap(ic + 1, n);
            let j0 = wrap(jc, n);
            let j1 = wrap(jc + 1, n);

            dst[[j, i]] = (1.0 - s) * ((1.0 - t) * src[[j0, i0]] + t * src[[j1, i0]])
                + s * ((1.0 - t) * src[[j0, i1]] + t * src[[j1, i1]]);
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::Array2;

    use super::*;

    #[test]
    fn floor_cell_matches_floor() {
        assert_eq!(floor_cell(-0.3), -1);
        assert_eq!(floor_cell(2.7), 2);
        assert_eq!(floor_cell(0.0), 0);
        assert_eq!(floor_cell(-2.0), -2);

        for k in -40..40 {
            let x = k as f32 * 0.37;
            assert_eq!(floor_cell(x), x.floor() as i32, "x = {x}");
        }
    }

    #[test]
    fn zero_velocity_is_identity() {
        let n = 8;
        let zero = Array2::zeros((n, n));
        let src = Array2::from_shape_fn((n, n), |(j, i)| (i + n * j) as f32);
        let mut dst = Array2::zeros((n, n));

        advect(0.04, &zero, &zero, &src, &mut dst);

        for (a, b) in dst.iter().zip(src.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn uniform_flow_shifts_with_wraparound() {
        let n = 8;
        let dt = 0.125;
        // One whole cell per step: n * dt * u == 1.
        let u = Array2::from_elem((n, n), 1.0 / (n as f32 * dt));
        let zero = Array2::zeros((n, n));
        let src = Array2::from_shape_fn((n, n), |(j, i)| (i + n * j) as f32);
        let mut dst = Array2::zeros((n, n));

        advect(dt, &u, &zero, &src, &mut dst);

        for j in 0..n {
            for i in 0..n {
                let expected = src[[j, wrap(i as i32 - 1, n)]];
                assert_relative_eq!(dst[[j, i]], expected, epsilon = 1e-4);
            }
        }
    }
}
