// crates/spin_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `SpinError` 枚举和 `SpinResult` 类型别名，供谱网格、变换等底层模块使用。
//!
//! # 设计原则
//!
//! 1. **层次化**: 基础层只定义核心错误，积分器相关错误在 spin_physics 中定义
//! 2. **易用性**: 提供便捷的构造方法
//!
//! # 示例
//!
//! ```
//! use spin_foundation::error::{SpinError, SpinResult};
//!
//! fn check_points(n: usize) -> SpinResult<()> {
//!     if !n.is_power_of_two() {
//!         return Err(SpinError::invalid_grid(format!("N={} 不是 2 的幂", n)));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_points(12).is_err());
//! ```

use thiserror::Error;

/// 统一结果类型
pub type SpinResult<T> = Result<T, SpinError>;

/// 基础层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpinError {
    // ========================================================================
    // 几何与网格
    // ========================================================================
    /// 计算域无效（退化区间、非有限边界、维度超出范围）
    #[error("无效的计算域: {message}")]
    InvalidDomain {
        /// 具体错误信息
        message: String,
    },

    /// 网格无效（点数非 2 的幂、过小等），在网格构造时检测
    #[error("无效的网格: {message}")]
    InvalidGrid {
        /// 具体错误信息
        message: String,
    },

    // ========================================================================
    // 数据
    // ========================================================================
    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 分量数不匹配
    #[error("分量数不匹配: {context} 期望{expected}, 实际{actual}")]
    ComponentMismatch {
        /// 出错位置
        context: &'static str,
        /// 期望分量数
        expected: usize,
        /// 实际分量数
        actual: usize,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数值异常（NaN / Inf）
    #[error("数值异常: {context}")]
    NonFinite {
        /// 出错位置
        context: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl SpinError {
    /// 无效计算域
    pub fn invalid_domain(message: impl Into<String>) -> Self {
        Self::InvalidDomain {
            message: message.into(),
        }
    }

    /// 无效网格
    pub fn invalid_grid(message: impl Into<String>) -> Self {
        Self::InvalidGrid {
            message: message.into(),
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 分量数不匹配
    pub fn component_mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::ComponentMismatch {
            context,
            expected,
            actual,
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数值异常
    pub fn non_finite(context: impl Into<String>) -> Self {
        Self::NonFinite {
            context: context.into(),
        }
    }

    /// 是否属于构造期（几何/网格）错误
    pub fn is_construction_error(&self) -> bool {
        matches!(self, Self::InvalidDomain { .. } | Self::InvalidGrid { .. })
    }
}
