// crates/spin_spectral/src/resolution.rs

//! 分辨率判据与去混叠
//!
//! - [`tail_ratio`]: 最高 1/8 波数带内系数最大模与全体最大模之比，
//!   用于自动选择 N（比值不超过容差即认为已解析）。
//! - [`dealias_mask`]: 2/3 规则掩码。

use crate::grid::Grid;
use crate::state::SpectralState;
use rayon::prelude::*;

/// 尾带起始编号：`|k| >= N/2 - max(1, N/16)` 的模态属于尾带
#[inline]
pub fn tail_band_start(n: usize) -> usize {
    n / 2 - (n / 16).max(1)
}

/// 展平下标是否落在尾带（任一维）
fn in_tail(grid: &Grid, flat: usize, start: usize) -> bool {
    let idx = grid.multi_index(flat);
    (0..grid.dim()).any(|a| grid.signed_index(idx[a]).unsigned_abs() as usize >= start)
}

/// 尾带系数相对幅值（各分量取最大）
///
/// 全零分量不参与计算；所有分量为零时返回 0。
pub fn tail_ratio(spectral: &SpectralState, grid: &Grid) -> f64 {
    let start = tail_band_start(grid.n());
    spectral
        .components()
        .iter()
        .map(|c| {
            let (tail, total) = c
                .par_iter()
                .enumerate()
                .map(|(f, v)| {
                    let m = v.norm();
                    let t = if in_tail(grid, f, start) { m } else { 0.0 };
                    (t, m)
                })
                .reduce(|| (0.0, 0.0), |a, b| (a.0.max(b.0), a.1.max(b.1)));
            if total > 0.0 {
                tail / total
            } else {
                0.0
            }
        })
        .fold(0.0, f64::max)
}

/// 2/3 规则掩码：所有维度都满足 `3|k| < N` 的模态保留
pub fn dealias_mask(grid: &Grid) -> Vec<bool> {
    let n = grid.n();
    (0..grid.len())
        .map(|f| {
            let idx = grid.multi_index(f);
            (0..grid.dim()).all(|a| 3 * (grid.signed_index(idx[a]).unsigned_abs() as usize) < n)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use crate::state::PhysicalState;
    use std::f64::consts::PI;

    #[test]
    fn test_tail_band_start() {
        assert_eq!(tail_band_start(32), 14);
        assert_eq!(tail_band_start(8), 3);
        assert_eq!(tail_band_start(4), 1);
    }

    #[test]
    fn test_smooth_function_resolved() {
        let g = Grid::new(Domain::interval(0.0, 2.0 * PI).unwrap(), 64).unwrap();
        let u: Vec<f64> = g.coordinates(0).iter().map(|&x| x.sin().exp()).collect();
        let spec = g
            .transform()
            .to_spectral(&PhysicalState::from_real(vec![u]).unwrap())
            .unwrap();
        assert!(tail_ratio(&spec, &g) < 1e-12);
    }

    #[test]
    fn test_sharp_function_unresolved() {
        let g = Grid::new(Domain::interval(-1.0, 1.0).unwrap(), 16).unwrap();
        let u: Vec<f64> = g
            .coordinates(0)
            .iter()
            .map(|&x| (-400.0 * x * x).exp())
            .collect();
        let spec = g
            .transform()
            .to_spectral(&PhysicalState::from_real(vec![u]).unwrap())
            .unwrap();
        assert!(tail_ratio(&spec, &g) > 1e-3);
    }

    #[test]
    fn test_dealias_mask_counts() {
        let g = Grid::new(Domain::interval(0.0, 1.0).unwrap(), 64).unwrap();
        let mask = dealias_mask(&g);
        // |k| <= 21 保留: 0, ±1..±21 共 43 个
        assert_eq!(mask.iter().filter(|&&m| m).count(), 43);
    }
}
