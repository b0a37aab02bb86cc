// crates/spin_spectral/src/lib.rs

//! Spin Spectral Layer
//!
//! 周期谱离散层：计算域、网格、FFT、物理/谱状态及其变换。
//!
//! # 模块概览
//!
//! - [`domain`]: 周期计算域
//! - [`grid`]: 等距网格、坐标与波数
//! - [`fft`]: 一维 FFT 计划（rustfft）
//! - [`transform`]: 多维变换（rayon 并行处理各条线）
//! - [`state`]: `PhysicalState` / `SpectralState`
//! - [`resample`]: 傅里叶重采样与任意点插值
//! - [`resolution`]: 尾带判据与 2/3 去混叠
//!
//! # 设计原则
//!
//! 1. **构造期校验**: 非法的点数与计算域在 `Grid`/`Domain` 构造时拒绝
//! 2. **计划共享**: FFT 计划不可变，经 `Arc` 在网格与变换器间共享
//!
//! # 示例
//!
//! ```
//! use spin_spectral::prelude::*;
//!
//! let grid = Grid::new(Domain::interval(0.0, 1.0).unwrap(), 16).unwrap();
//! let u = PhysicalState::from_real(vec![vec![1.0; 16]]).unwrap();
//! let t = grid.transform();
//! let back = t.to_physical(&t.to_spectral(&u).unwrap()).unwrap();
//! assert!((back.component(0)[3].re - 1.0).abs() < 1e-14);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod fft;
pub mod grid;
pub mod resample;
pub mod resolution;
pub mod state;
pub mod transform;

// 重导出常用类型
pub use domain::Domain;
pub use fft::FftPlan;
pub use grid::Grid;
pub use resample::{evaluate_at, resample};
pub use resolution::{dealias_mask, tail_ratio};
pub use state::{PhysicalState, SpectralState};
pub use transform::Transform;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::domain::Domain;
    pub use crate::grid::Grid;
    pub use crate::state::{PhysicalState, SpectralState};
    pub use crate::transform::Transform;
}
