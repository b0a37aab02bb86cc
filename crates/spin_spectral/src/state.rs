// crates/spin_spectral/src/state.rs

//! 物理空间与谱空间状态
//!
//! 两种状态都是"按分量组织的复数数组"，长度等于网格总点数 N^d。
//! 用不同类型区分所处空间，避免把谱系数当作网格值使用。

use num_complex::Complex64;
use num_traits::Zero;
use rayon::prelude::*;
use spin_foundation::{SpinError, SpinResult};

macro_rules! component_storage {
    ($name:ident) => {
        impl $name {
            /// 全零状态
            pub fn zeros(n_components: usize, len: usize) -> Self {
                Self {
                    components: vec![vec![Complex64::zero(); len]; n_components],
                }
            }

            /// 由分量数组构造
            ///
            /// # 错误
            ///
            /// 没有分量、分量为空或分量长度不一致时返回错误。
            pub fn from_components(components: Vec<Vec<Complex64>>) -> SpinResult<Self> {
                let first = components
                    .first()
                    .ok_or_else(|| SpinError::invalid_input("状态至少需要一个分量"))?;
                let len = first.len();
                if len == 0 {
                    return Err(SpinError::invalid_input("状态分量不能为空"));
                }
                if let Some(bad) = components.iter().find(|c| c.len() != len) {
                    return Err(SpinError::size_mismatch("component", len, bad.len()));
                }
                Ok(Self { components })
            }

            /// 分量数
            #[inline]
            pub fn n_components(&self) -> usize {
                self.components.len()
            }

            /// 每个分量的长度
            #[inline]
            pub fn len(&self) -> usize {
                self.components.first().map_or(0, Vec::len)
            }

            /// 是否为空
            #[inline]
            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            /// 第 `i` 个分量
            #[inline]
            pub fn component(&self, i: usize) -> &[Complex64] {
                &self.components[i]
            }

            /// 第 `i` 个分量（可变）
            #[inline]
            pub fn component_mut(&mut self, i: usize) -> &mut [Complex64] {
                &mut self.components[i]
            }

            /// 全部分量
            #[inline]
            pub fn components(&self) -> &[Vec<Complex64>] {
                &self.components
            }

            /// 全部分量（可变）
            #[inline]
            pub fn components_mut(&mut self) -> &mut [Vec<Complex64>] {
                &mut self.components
            }

            /// 取出分量数组
            pub fn into_components(self) -> Vec<Vec<Complex64>> {
                self.components
            }

            /// 最大模
            pub fn max_abs(&self) -> f64 {
                self.components
                    .iter()
                    .map(|c| c.par_iter().map(|v| v.norm()).reduce(|| 0.0, f64::max))
                    .fold(0.0, f64::max)
            }

            /// 所有值是否有限
            pub fn is_finite(&self) -> bool {
                self.components
                    .iter()
                    .all(|c| c.par_iter().all(|v| v.re.is_finite() && v.im.is_finite()))
            }

            /// 复制另一状态的值（形状须一致）
            pub fn copy_from(&mut self, other: &Self) {
                for (dst, src) in self.components.iter_mut().zip(other.components.iter()) {
                    dst.copy_from_slice(src);
                }
            }

            /// 形状是否与另一状态一致
            pub fn same_shape(&self, other: &Self) -> bool {
                self.n_components() == other.n_components() && self.len() == other.len()
            }
        }
    };
}

/// 物理空间状态（网格点上的值）
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalState {
    components: Vec<Vec<Complex64>>,
}

/// 谱空间状态（傅里叶系数，未归一化）
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralState {
    components: Vec<Vec<Complex64>>,
}

component_storage!(PhysicalState);
component_storage!(SpectralState);

impl PhysicalState {
    /// 由实数分量构造
    pub fn from_real(components: Vec<Vec<f64>>) -> SpinResult<Self> {
        Self::from_components(
            components
                .into_iter()
                .map(|c| c.into_iter().map(|v| Complex64::new(v, 0.0)).collect())
                .collect(),
        )
    }

    /// 第 `i` 个分量的实部
    pub fn real_part(&self, i: usize) -> Vec<f64> {
        self.components[i].iter().map(|v| v.re).collect()
    }

    /// 所有分量虚部的最大绝对值
    pub fn max_imaginary(&self) -> f64 {
        self.components
            .iter()
            .flat_map(|c| c.iter())
            .fold(0.0, |m, v| m.max(v.im.abs()))
    }
}

impl SpectralState {
    /// `self += alpha * other`
    pub fn axpy(&mut self, alpha: Complex64, other: &Self) {
        for (dst, src) in self.components.iter_mut().zip(other.components.iter()) {
            dst.par_iter_mut()
                .zip(src.par_iter())
                .for_each(|(d, s)| *d += alpha * s);
        }
    }

    /// 所有系数置零
    pub fn fill_zero(&mut self) {
        for c in self.components.iter_mut() {
            c.fill(Complex64::zero());
        }
    }
}
