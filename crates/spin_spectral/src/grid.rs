// crates/spin_spectral/src/grid.rs

//! 周期谱网格
//!
//! 每个维度 N 个等距点（N 为 2 的幂且不小于 4），存储按展平数组组织，
//! 第 0 维（x）变化最快：
//!
//! ```text
//! flat = i0 + N·i1 + N²·i2
//! ```
//!
//! 波数按 FFT 顺序排列 `(0, 1, …, N/2-1, -N/2, …, -1)·2π/L`。
//! 下标 N/2 是 Nyquist 模态，符号在 `±k_N` 上取平均处理（见 `multiplier`）。

use crate::domain::Domain;
use crate::fft::FftPlan;
use crate::transform::Transform;
use spin_foundation::{SpinError, SpinResult};
use std::f64::consts::PI;
use std::sync::Arc;

/// 周期谱网格
#[derive(Debug, Clone)]
pub struct Grid {
    domain: Domain,
    n: usize,
    len: usize,
    coordinates: Vec<Vec<f64>>,
    wavenumbers: Vec<Vec<f64>>,
    plan: Arc<FftPlan>,
}

impl Grid {
    /// 每维最少点数
    pub const MIN_POINTS: usize = 4;

    /// 创建网格
    ///
    /// # 错误
    ///
    /// `n` 不是 2 的幂或小于 [`Grid::MIN_POINTS`] 时返回 `InvalidGrid`。
    pub fn new(domain: Domain, n: usize) -> SpinResult<Self> {
        if n < Self::MIN_POINTS || !n.is_power_of_two() {
            return Err(SpinError::invalid_grid(format!(
                "每维点数必须是不小于 {} 的 2 的幂, 实际 {}",
                Self::MIN_POINTS,
                n
            )));
        }
        let dim = domain.dim();
        let len = n
            .checked_pow(dim as u32)
            .ok_or_else(|| SpinError::invalid_grid(format!("网格过大: {}^{}", n, dim)))?;

        let coordinates = (0..dim)
            .map(|axis| {
                let a = domain.lower(axis);
                let h = domain.length(axis) / n as f64;
                (0..n).map(|j| a + j as f64 * h).collect()
            })
            .collect();

        let wavenumbers = (0..dim)
            .map(|axis| {
                let scale = 2.0 * PI / domain.length(axis);
                (0..n)
                    .map(|i| signed_index(i, n) as f64 * scale)
                    .collect()
            })
            .collect();

        let plan = Arc::new(FftPlan::new(n)?);

        Ok(Self {
            domain,
            n,
            len,
            coordinates,
            wavenumbers,
            plan,
        })
    }

    /// 计算域
    #[inline]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// 空间维度
    #[inline]
    pub fn dim(&self) -> usize {
        self.domain.dim()
    }

    /// 每维点数
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// 总点数 N^d
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// 网格是否为空（恒为 false）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 一维 FFT 计划
    #[inline]
    pub fn plan(&self) -> &Arc<FftPlan> {
        &self.plan
    }

    /// 与本网格匹配的多维变换器
    pub fn transform(&self) -> Transform {
        Transform::new(self)
    }

    /// 某一维的物理坐标
    #[inline]
    pub fn coordinates(&self, axis: usize) -> &[f64] {
        &self.coordinates[axis]
    }

    /// 某一维的波数（FFT 顺序）
    #[inline]
    pub fn wavenumbers(&self, axis: usize) -> &[f64] {
        &self.wavenumbers[axis]
    }

    /// 某一维的网格间距
    #[inline]
    pub fn spacing(&self, axis: usize) -> f64 {
        self.domain.length(axis) / self.n as f64
    }

    /// 某一维在展平数组中的步长 N^axis
    #[inline]
    pub fn stride(&self, axis: usize) -> usize {
        self.n.pow(axis as u32)
    }

    /// 展平下标 -> 多重下标（未用维度为 0）
    #[inline]
    pub fn multi_index(&self, flat: usize) -> [usize; 3] {
        let n = self.n;
        let mut idx = [0usize; 3];
        let mut rem = flat;
        for slot in idx.iter_mut().take(self.dim()) {
            *slot = rem % n;
            rem /= n;
        }
        idx
    }

    /// 多重下标 -> 展平下标
    #[inline]
    pub fn flat_index(&self, idx: &[usize]) -> usize {
        idx.iter()
            .take(self.dim())
            .rev()
            .fold(0, |acc, &i| acc * self.n + i)
    }

    /// 展平下标处的物理坐标（未用维度为 0）
    #[inline]
    pub fn point(&self, flat: usize) -> [f64; 3] {
        let idx = self.multi_index(flat);
        let mut x = [0.0; 3];
        for axis in 0..self.dim() {
            x[axis] = self.coordinates[axis][idx[axis]];
        }
        x
    }

    /// 展平下标处的波矢量（未用维度为 0）
    #[inline]
    pub fn wavevector(&self, flat: usize) -> [f64; 3] {
        let idx = self.multi_index(flat);
        let mut k = [0.0; 3];
        for axis in 0..self.dim() {
            k[axis] = self.wavenumbers[axis][idx[axis]];
        }
        k
    }

    /// 展平下标处各维是否为 Nyquist 模态
    #[inline]
    pub fn nyquist_axes(&self, flat: usize) -> [bool; 3] {
        let idx = self.multi_index(flat);
        let mut nyq = [false; 3];
        for axis in 0..self.dim() {
            nyq[axis] = idx[axis] == self.n / 2;
        }
        nyq
    }

    /// 一维下标对应的带符号波数编号
    #[inline]
    pub fn signed_index(&self, i: usize) -> i64 {
        signed_index(i, self.n)
    }

    /// 一维下标是否为 Nyquist 模态
    #[inline]
    pub fn is_nyquist(&self, i: usize) -> bool {
        i == self.n / 2
    }

    /// Nyquist 波数 `k_N = π N / L`
    #[inline]
    pub fn nyquist_wavenumber(&self, axis: usize) -> f64 {
        PI * self.n as f64 / self.domain.length(axis)
    }
}

/// FFT 顺序下标 -> 带符号编号：`0..N/2-1` 为非负，`N/2..N-1` 为负
#[inline]
pub fn signed_index(i: usize, n: usize) -> i64 {
    if i < n / 2 {
        i as i64
    } else {
        i as i64 - n as i64
    }
}

/// 带符号编号 -> FFT 顺序下标，`k` 须在 `[-N/2, N/2]` 内（`±N/2` 都映射到 N/2）
#[inline]
pub fn fft_index(k: i64, n: usize) -> usize {
    if k >= 0 {
        k as usize
    } else {
        (n as i64 + k) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_rejects_bad_n() {
        let d = Domain::interval(0.0, 1.0).unwrap();
        assert!(Grid::new(d.clone(), 12).is_err());
        assert!(Grid::new(d.clone(), 2).is_err());
        assert!(Grid::new(d, 8).is_ok());
    }

    #[test]
    fn test_coordinates_and_wavenumbers() {
        let d = Domain::interval(0.0, 2.0 * PI).unwrap();
        let g = Grid::new(d, 8).unwrap();
        assert_eq!(g.coordinates(0)[0], 0.0);
        assert!((g.coordinates(0)[4] - PI).abs() < 1e-14);
        let k: Vec<f64> = g.wavenumbers(0).to_vec();
        let expected = [0.0, 1.0, 2.0, 3.0, -4.0, -3.0, -2.0, -1.0];
        for (a, b) in k.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-14);
        }
        assert!(g.is_nyquist(4));
        assert!((g.nyquist_wavenumber(0) - 4.0).abs() < 1e-14);
    }

    #[test]
    fn test_flat_index_roundtrip() {
        let d = Domain::cube(0.0, 1.0).unwrap();
        let g = Grid::new(d, 4).unwrap();
        assert_eq!(g.len(), 64);
        for flat in 0..g.len() {
            let idx = g.multi_index(flat);
            assert_eq!(g.flat_index(&idx), flat);
        }
        // x 最快
        assert_eq!(g.multi_index(1), [1, 0, 0]);
        assert_eq!(g.multi_index(4), [0, 1, 0]);
        assert_eq!(g.multi_index(16), [0, 0, 1]);
    }

    #[test]
    fn test_signed_index_mapping() {
        for n in [4usize, 8, 16] {
            for i in 0..n {
                assert_eq!(fft_index(signed_index(i, n), n), i);
            }
        }
        assert_eq!(fft_index(4, 8), 4);
        assert_eq!(fft_index(-4, 8), 4);
    }
}
