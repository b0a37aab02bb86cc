// crates/spin_foundation/src/lib.rs

//! Spin Foundation Layer
//!
//! 基础层，为谱网格、变换和积分器提供共享的错误类型与数值容差。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `SpinError`
//! - [`tolerance`]: 步数计算的数值容差
//!
//! # 设计原则
//!
//! 1. **最少依赖**: 仅依赖 thiserror
//! 2. **层次化**: 积分器相关错误（发散、容差不可达）在 spin_physics 中定义

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod tolerance;

// 重导出常用类型
pub use error::{SpinError, SpinResult};
pub use tolerance::steps_to_cover;

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{SpinError, SpinResult};
    pub use crate::tolerance::steps_to_cover;
}
