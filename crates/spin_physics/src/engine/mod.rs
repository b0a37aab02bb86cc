// crates/spin_physics/src/engine/mod.rs

//! 指数积分引擎
//!
//! # 层级架构
//!
//! ```text
//! driver        ─> Simulation / integrate，状态机与自动 N 重启
//!   auto_select ─> 初值分辨率判据选 N，dt 与 dt/2 试探选 dt
//!   stepper     ─> 单网格推进 + 发散检查
//!     integrator   ─> TimeIntegrator trait，系数表驱动的指数 RK
//!     coefficients ─> 按步长缓存的 φ 组合系数
//!     nonlinear    ─> 物理空间逐点求值
//!     scheme       ─> 各格式的系数表
//!     phi / matrix ─> 标量 φ 函数与块矩阵指数
//!     multiplier   ─> 符号在网格上的取值
//! ```

pub mod auto_select;
pub mod coefficients;
pub mod driver;
pub mod integrator;
pub mod matrix;
pub mod multiplier;
pub mod nonlinear;
pub mod phi;
pub mod progress;
pub mod scheme;
pub(crate) mod stepper;

// 重导出常用类型
pub use auto_select::{select_dt, select_n, NSelection};
pub use coefficients::{CoefficientCache, StepCoefficients};
pub use driver::{integrate, Simulation};
pub use integrator::{create_integrator, ExponentialRk, TimeIntegrator};
pub use matrix::CMatrix;
pub use nonlinear::NonlinearEvaluator;
pub use phi::PhiEvaluator;
pub use progress::{CancelToken, Phase, Progress, ProgressCallback};
pub use scheme::Tableau;
