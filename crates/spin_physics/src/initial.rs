// crates/spin_physics/src/initial.rs

//! 初值
//!
//! 两种来源：位置的函数（在任意网格上采样），或某一网格上的采样值
//! （通过傅里叶插值重采样到运行网格）。

use crate::error::{SolveError, SolveResult};
use num_complex::Complex64;
use rayon::prelude::*;
use spin_spectral::{resample, Grid, PhysicalState, SpectralState};
use std::fmt;
use std::sync::Arc;

/// 初值函数：由坐标写出各分量的值
pub type InitialFn = Arc<dyn Fn(&[f64], &mut [Complex64]) + Send + Sync>;

/// 初值
#[derive(Clone)]
pub enum InitialCondition {
    /// 位置的函数
    Function {
        /// 分量数
        n_components: usize,
        /// 采样函数
        f: InitialFn,
    },
    /// 给定网格上的采样值
    Samples {
        /// 采样网格
        grid: Grid,
        /// 采样值
        state: PhysicalState,
    },
}

impl InitialCondition {
    /// 多分量函数
    pub fn from_fn(
        n_components: usize,
        f: impl Fn(&[f64], &mut [Complex64]) + Send + Sync + 'static,
    ) -> Self {
        Self::Function {
            n_components,
            f: Arc::new(f),
        }
    }

    /// 单分量实函数
    pub fn scalar(f: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Self::from_fn(1, move |x, out| out[0] = Complex64::new(f(x), 0.0))
    }

    /// 单分量复函数
    pub fn complex(f: impl Fn(&[f64]) -> Complex64 + Send + Sync + 'static) -> Self {
        Self::from_fn(1, move |x, out| out[0] = f(x))
    }

    /// 多分量实函数，每个分量一个闭包
    pub fn real_components(fs: Vec<Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>>) -> Self {
        let m = fs.len();
        Self::from_fn(m, move |x, out| {
            for (o, f) in out.iter_mut().zip(fs.iter()) {
                *o = Complex64::new(f(x), 0.0);
            }
        })
    }

    /// 采样值
    ///
    /// # 错误
    ///
    /// 采样长度与网格不符时返回 `InvalidInitialCondition`。
    pub fn from_samples(grid: Grid, state: PhysicalState) -> SolveResult<Self> {
        if state.len() != grid.len() {
            return Err(SolveError::invalid_initial_condition(format!(
                "采样点数 {} 与网格点数 {} 不符",
                state.len(),
                grid.len()
            )));
        }
        Ok(Self::Samples { grid, state })
    }

    /// 分量数
    pub fn n_components(&self) -> usize {
        match self {
            Self::Function { n_components, .. } => *n_components,
            Self::Samples { state, .. } => state.n_components(),
        }
    }

    /// 在网格上采样（物理空间）
    pub fn sample_physical(&self, grid: &Grid) -> SolveResult<PhysicalState> {
        let state = match self {
            Self::Function { n_components, f } => {
                let m = *n_components;
                let dim = grid.dim();
                let mut values = vec![Complex64::new(0.0, 0.0); grid.len() * m];
                values
                    .par_chunks_mut(m)
                    .enumerate()
                    .for_each(|(flat, out)| {
                        let x = grid.point(flat);
                        f(&x[..dim], out);
                    });
                let components = (0..m)
                    .map(|c| (0..grid.len()).map(|p| values[p * m + c]).collect())
                    .collect();
                PhysicalState::from_components(components)?
            }
            Self::Samples { .. } => {
                let spectral = self.sample(grid)?;
                grid.transform().to_physical(&spectral)?
            }
        };
        if !state.is_finite() {
            return Err(SolveError::invalid_initial_condition("初值含非有限值"));
        }
        Ok(state)
    }

    /// 在网格上采样并变换到谱空间
    pub fn sample(&self, grid: &Grid) -> SolveResult<SpectralState> {
        match self {
            Self::Function { .. } => {
                let phys = self.sample_physical(grid)?;
                Ok(grid.transform().to_spectral(&phys)?)
            }
            Self::Samples {
                grid: source,
                state,
            } => {
                if source.domain() != grid.domain() {
                    return Err(SolveError::invalid_initial_condition(
                        "采样网格与运行网格的计算域不一致",
                    ));
                }
                if !state.is_finite() {
                    return Err(SolveError::invalid_initial_condition("初值含非有限值"));
                }
                let spectral = source.transform().to_spectral(state)?;
                Ok(resample(&spectral, source, grid)?)
            }
        }
    }
}

impl fmt::Debug for InitialCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function { n_components, .. } => {
                write!(f, "InitialCondition::Function({} 分量)", n_components)
            }
            Self::Samples { grid, state } => write!(
                f,
                "InitialCondition::Samples(N={}, {} 分量)",
                grid.n(),
                state.n_components()
            ),
        }
    }
}
