// crates/spin_spectral/src/transform.rs

//! 多维离散傅里叶变换
//!
//! 逐维做一维 FFT。第 0 维的线在内存中连续，直接 `par_chunks_mut`；
//! 更高维的线步长为 N^axis，先把每个大小为 N^{axis+1} 的块转置到临时
//! 缓冲区，使线连续后并行变换，再写回。
//!
//! 正变换不归一化，逆变换乘 `1/N^d`，二者严格互逆。

use crate::fft::FftPlan;
use crate::grid::Grid;
use crate::state::{PhysicalState, SpectralState};
use num_complex::Complex64;
use num_traits::Zero;
use rayon::prelude::*;
use spin_foundation::{SpinError, SpinResult};
use std::sync::Arc;

/// 多维变换器，与某一网格形状绑定
#[derive(Debug, Clone)]
pub struct Transform {
    plan: Arc<FftPlan>,
    n: usize,
    dim: usize,
    len: usize,
}

impl Transform {
    /// 为网格创建变换器（共享网格的 FFT 计划）
    pub fn new(grid: &Grid) -> Self {
        Self {
            plan: Arc::clone(grid.plan()),
            n: grid.n(),
            dim: grid.dim(),
            len: grid.len(),
        }
    }

    /// 每个分量的长度 N^d
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// 是否为空（恒为 false）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 原地正变换
    pub fn forward_in_place(&self, data: &mut [Complex64]) {
        debug_assert_eq!(data.len(), self.len);
        for axis in 0..self.dim {
            self.transform_axis(data, axis, false);
        }
    }

    /// 原地逆变换（含 `1/N^d` 缩放）
    pub fn inverse_in_place(&self, data: &mut [Complex64]) {
        debug_assert_eq!(data.len(), self.len);
        for axis in 0..self.dim {
            self.transform_axis(data, axis, true);
        }
        let scale = 1.0 / self.len as f64;
        data.par_iter_mut().for_each(|v| *v *= scale);
    }

    /// 物理空间 -> 谱空间
    pub fn to_spectral(&self, state: &PhysicalState) -> SpinResult<SpectralState> {
        let mut out = SpectralState::zeros(state.n_components(), self.len);
        self.to_spectral_into(state, &mut out)?;
        Ok(out)
    }

    /// 谱空间 -> 物理空间
    pub fn to_physical(&self, state: &SpectralState) -> SpinResult<PhysicalState> {
        let mut out = PhysicalState::zeros(state.n_components(), self.len);
        self.to_physical_into(state, &mut out)?;
        Ok(out)
    }

    /// 物理空间 -> 谱空间，写入已有缓冲区
    pub fn to_spectral_into(
        &self,
        src: &PhysicalState,
        dst: &mut SpectralState,
    ) -> SpinResult<()> {
        self.check_shape(src.len(), src.n_components(), dst.len(), dst.n_components())?;
        for (s, d) in src.components().iter().zip(dst.components_mut().iter_mut()) {
            d.copy_from_slice(s);
            self.forward_in_place(d);
        }
        Ok(())
    }

    /// 谱空间 -> 物理空间，写入已有缓冲区
    pub fn to_physical_into(
        &self,
        src: &SpectralState,
        dst: &mut PhysicalState,
    ) -> SpinResult<()> {
        self.check_shape(src.len(), src.n_components(), dst.len(), dst.n_components())?;
        for (s, d) in src.components().iter().zip(dst.components_mut().iter_mut()) {
            d.copy_from_slice(s);
            self.inverse_in_place(d);
        }
        Ok(())
    }

    fn check_shape(
        &self,
        src_len: usize,
        src_comp: usize,
        dst_len: usize,
        dst_comp: usize,
    ) -> SpinResult<()> {
        if src_len != self.len {
            return Err(SpinError::size_mismatch("transform input", self.len, src_len));
        }
        if dst_len != self.len {
            return Err(SpinError::size_mismatch("transform output", self.len, dst_len));
        }
        if src_comp != dst_comp {
            return Err(SpinError::component_mismatch("transform", src_comp, dst_comp));
        }
        Ok(())
    }

    fn transform_axis(&self, data: &mut [Complex64], axis: usize, inverse: bool) {
        let n = self.n;
        let plan = &self.plan;
        let stride = n.pow(axis as u32);

        if stride == 1 {
            data.par_chunks_mut(n)
                .for_each(|line| plan.process(line, inverse));
            return;
        }

        // 块内下标 j + k·stride，j 为低维偏移，k 为当前维下标
        let block = stride * n;
        data.par_chunks_mut(block).for_each(|chunk| {
            let mut lines = vec![Complex64::zero(); block];
            for k in 0..n {
                for j in 0..stride {
                    lines[j * n + k] = chunk[k * stride + j];
                }
            }
            lines
                .par_chunks_mut(n)
                .for_each(|line| plan.process(line, inverse));
            for k in 0..n {
                for j in 0..stride {
                    chunk[k * stride + j] = lines[j * n + k];
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use std::f64::consts::PI;

    #[test]
    fn test_2d_single_mode() {
        // e^{i(x + 2y)} 只在 (1, 2) 处有能量
        let g = Grid::new(Domain::square(0.0, 2.0 * PI).unwrap(), 8).unwrap();
        let values: Vec<Complex64> = (0..g.len())
            .map(|f| {
                let x = g.point(f);
                Complex64::new(0.0, x[0] + 2.0 * x[1]).exp()
            })
            .collect();
        let phys = PhysicalState::from_components(vec![values]).unwrap();
        let spec = g.transform().to_spectral(&phys).unwrap();
        let target = g.flat_index(&[1, 2]);
        for (f, c) in spec.component(0).iter().enumerate() {
            let expected = if f == target { g.len() as f64 } else { 0.0 };
            assert!((c - Complex64::new(expected, 0.0)).norm() < 1e-10, "flat {}", f);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let g = Grid::new(Domain::interval(0.0, 1.0).unwrap(), 8).unwrap();
        let phys = PhysicalState::zeros(1, 16);
        assert!(g.transform().to_spectral(&phys).is_err());
    }
}
