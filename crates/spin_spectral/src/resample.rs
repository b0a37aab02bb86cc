// crates/spin_spectral/src/resample.rs

//! 傅里叶重采样与三角插值
//!
//! - [`resample`]: 谱系数在不同点数的网格之间搬运（补零或截断）。
//!   上采样时源 Nyquist 系数对半拆到 `±N/2`，下采样时 `±M/2` 合并到目标
//!   Nyquist 位置，保证实函数仍为实函数。
//! - [`evaluate_at`]: 由 N^d 个系数在任意点求三角插值多项式的值。

use crate::grid::{fft_index, Grid};
use crate::state::SpectralState;
use num_complex::Complex64;
use num_traits::Zero;
use spin_foundation::{SpinError, SpinResult};
use tracing::trace;

/// 一维下标映射：源下标 -> [(目标下标, 权重)]
fn axis_map(from_n: usize, to_n: usize) -> Vec<Vec<(usize, f64)>> {
    (0..from_n)
        .map(|i| {
            let k = crate::grid::signed_index(i, from_n);
            if to_n == from_n {
                vec![(i, 1.0)]
            } else if to_n > from_n {
                if i == from_n / 2 {
                    let half = (from_n / 2) as i64;
                    vec![
                        (fft_index(-half, to_n), 0.5),
                        (fft_index(half, to_n), 0.5),
                    ]
                } else {
                    vec![(fft_index(k, to_n), 1.0)]
                }
            } else if k.unsigned_abs() as usize > to_n / 2 {
                Vec::new()
            } else {
                vec![(fft_index(k, to_n), 1.0)]
            }
        })
        .collect()
}

/// 将谱状态从 `from` 网格重采样到 `to` 网格
///
/// 两个网格须有相同的维度和计算域长度；系数按 `(M/N)^d` 缩放以保持
/// 物理值不变（正变换不归一化）。
pub fn resample(spectral: &SpectralState, from: &Grid, to: &Grid) -> SpinResult<SpectralState> {
    if from.dim() != to.dim() {
        return Err(SpinError::invalid_input(format!(
            "重采样维度不一致: {} vs {}",
            from.dim(),
            to.dim()
        )));
    }
    if spectral.len() != from.len() {
        return Err(SpinError::size_mismatch("resample input", from.len(), spectral.len()));
    }
    if from.n() == to.n() {
        return Ok(spectral.clone());
    }

    trace!(from = from.n(), to = to.n(), dim = from.dim(), "谱重采样");
    let dim = from.dim();
    let map = axis_map(from.n(), to.n());
    let scale = (to.n() as f64 / from.n() as f64).powi(dim as i32);
    let mut out = SpectralState::zeros(spectral.n_components(), to.len());

    for (src, dst) in spectral
        .components()
        .iter()
        .zip(out.components_mut().iter_mut())
    {
        for (flat, &value) in src.iter().enumerate() {
            if value.is_zero() {
                continue;
            }
            let idx = from.multi_index(flat);
            let empty = [(0usize, 1.0f64)];
            let lists: Vec<&[(usize, f64)]> = (0..3)
                .map(|a| if a < dim { map[idx[a]].as_slice() } else { &empty[..] })
                .collect();
            for &(i0, w0) in lists[0] {
                for &(i1, w1) in lists[1] {
                    for &(i2, w2) in lists[2] {
                        let target = to.flat_index(&[i0, i1, i2]);
                        dst[target] += value * (w0 * w1 * w2 * scale);
                    }
                }
            }
        }
    }
    Ok(out)
}

/// 在任意点 `x` 处求第 `component` 个分量的三角插值
///
/// Nyquist 模态按 `cos(k_N (x - a))` 处理，与 `±k_N` 平均的约定一致。
pub fn evaluate_at(
    spectral: &SpectralState,
    grid: &Grid,
    component: usize,
    x: &[f64],
) -> SpinResult<Complex64> {
    if x.len() != grid.dim() {
        return Err(SpinError::size_mismatch("evaluation point", grid.dim(), x.len()));
    }
    if component >= spectral.n_components() {
        return Err(SpinError::component_mismatch(
            "evaluate_at",
            spectral.n_components(),
            component,
        ));
    }
    let n = grid.n();
    let dim = grid.dim();

    let factors: Vec<Vec<Complex64>> = (0..dim)
        .map(|axis| {
            let dx = x[axis] - grid.domain().lower(axis);
            grid.wavenumbers(axis)
                .iter()
                .enumerate()
                .map(|(i, &k)| {
                    if grid.is_nyquist(i) {
                        Complex64::new((k * dx).cos(), 0.0)
                    } else {
                        Complex64::new(0.0, k * dx).exp()
                    }
                })
                .collect()
        })
        .collect();

    let coeffs = spectral.component(component);
    let mut sum = Complex64::zero();
    for (flat, &c) in coeffs.iter().enumerate() {
        let idx = grid.multi_index(flat);
        let mut term = c;
        for axis in 0..dim {
            term *= factors[axis][idx[axis]];
        }
        sum += term;
    }
    Ok(sum / (n.pow(dim as u32) as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::state::PhysicalState;
    use std::f64::consts::PI;

    fn sample(g: &Grid, f: impl Fn(f64) -> f64) -> PhysicalState {
        PhysicalState::from_real(vec![g.coordinates(0).iter().map(|&x| f(x)).collect()]).unwrap()
    }

    #[test]
    fn test_upsample_preserves_band_limited() {
        let d = Domain::interval(0.0, 2.0 * PI).unwrap();
        let coarse = Grid::new(d.clone(), 8).unwrap();
        let fine = Grid::new(d, 32).unwrap();
        let f = |x: f64| (3.0 * x).sin() + 0.5 * (x).cos() + (4.0 * x).cos();
        let spec = coarse.transform().to_spectral(&sample(&coarse, f)).unwrap();
        let up = resample(&spec, &coarse, &fine).unwrap();
        let phys = fine.transform().to_physical(&up).unwrap();
        let exact = sample(&fine, f);
        for (a, b) in phys.component(0).iter().zip(exact.component(0).iter()) {
            assert!((a - b).norm() < 1e-12);
        }
        assert!(phys.max_imaginary() < 1e-13);
    }

    #[test]
    fn test_downsample_truncates() {
        let d = Domain::interval(0.0, 2.0 * PI).unwrap();
        let fine = Grid::new(d.clone(), 32).unwrap();
        let coarse = Grid::new(d, 8).unwrap();
        let f = |x: f64| 1.0 + (2.0 * x).sin() + 1e-3 * (10.0 * x).cos();
        let spec = fine.transform().to_spectral(&sample(&fine, f)).unwrap();
        let down = resample(&spec, &fine, &coarse).unwrap();
        let phys = coarse.transform().to_physical(&down).unwrap();
        let kept = sample(&coarse, |x| 1.0 + (2.0 * x).sin());
        for (a, b) in phys.component(0).iter().zip(kept.component(0).iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_evaluate_at_off_grid() {
        let d = Domain::interval(-1.0, 1.0).unwrap();
        let g = Grid::new(d, 16).unwrap();
        let f = |x: f64| (PI * x).sin() + (3.0 * PI * x).cos();
        let spec = g.transform().to_spectral(&sample(&g, f)).unwrap();
        for &x in &[0.123, -0.77, 0.999] {
            let v = evaluate_at(&spec, &g, 0, &[x]).unwrap();
            assert!((v.re - f(x)).abs() < 1e-12, "x={}", x);
            assert!(v.im.abs() < 1e-12);
        }
    }
}
