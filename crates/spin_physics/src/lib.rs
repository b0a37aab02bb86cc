// crates/spin_physics/src/lib.rs

//! Spin Physics Layer
//!
//! 刚性周期偏微分方程 `u_t = L u + N(u)` 的指数时间积分：
//! 线性部分在傅里叶空间精确传播，非线性部分用指数 Runge-Kutta 格式处理。
//!
//! # 模块概览
//!
//! - [`operator`]: 算子定义（线性符号、逐点非线性项、构建器）
//! - [`presets`]: 预置问题目录（ac, burg, ch, kdv, ks, nls, gs, gl2, gs2, sh2, gl3）
//! - [`initial`]: 初值（函数或采样）
//! - [`time_span`]: 输出时刻
//! - [`engine`]: φ 函数、格式系数表、积分器与驱动器
//! - [`result`]: 模拟结果
//! - [`error`]: 积分器错误类型
//!
//! # 示例
//!
//! ```
//! use spin_physics::prelude::*;
//!
//! let preset = presets::create("ks").unwrap();
//! let span = TimeSpan::until(1.0).unwrap();
//! let result = integrate(&preset.operator, &span, &preset.initial, &preset.preferences()).unwrap();
//! assert!(result.max_imaginary() < 1e-10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod initial;
pub mod operator;
pub mod presets;
pub mod result;
pub mod time_span;

// 重导出常用类型
pub use engine::{integrate, CancelToken, Phase, Progress, ProgressCallback, Simulation};
pub use error::{SolveError, SolveResult};
pub use initial::InitialCondition;
pub use operator::{LinearPart, NonlinearPart, OperatorBuilder, OperatorSpec, PointInput};
pub use presets::Preset;
pub use result::{RunStats, RunStatus, SimulationResult, Snapshot};
pub use time_span::TimeSpan;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::engine::{integrate, CancelToken, Progress, Simulation};
    pub use crate::error::{SolveError, SolveResult};
    pub use crate::initial::InitialCondition;
    pub use crate::operator::{symbols, LinearPart, NonlinearPart, OperatorBuilder, OperatorSpec};
    pub use crate::presets;
    pub use crate::result::{RunStatus, SimulationResult};
    pub use crate::time_span::TimeSpan;
    pub use spin_config::{Preferences, SchemeName};
}
