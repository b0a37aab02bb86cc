// crates/spin_physics/src/error.rs

//! 积分器错误类型
//!
//! 在基础层 `SpinError` 与配置层 `ConfigError` 之上，增加算子构造、
//! 数值发散与容差不可达等积分相关错误。发散与容差不可达都携带已得到的
//! 部分结果，调用方可以继续使用。

use crate::result::SimulationResult;
use spin_config::ConfigError;
use spin_foundation::SpinError;
use spin_spectral::PhysicalState;
use thiserror::Error;

/// 积分器结果类型
pub type SolveResult<T> = Result<T, SolveError>;

/// 积分器错误
#[derive(Error, Debug)]
pub enum SolveError {
    /// 算子定义无效（构造期，致命）
    #[error("无效的算子: {message}")]
    InvalidOperator {
        /// 具体错误信息
        message: String,
    },

    /// 数值发散
    #[error("数值发散: t={time}")]
    Divergence {
        /// 最后一个有效状态的时刻
        time: f64,
        /// 最后一个有效状态
        state: PhysicalState,
        /// 发散前已得到的结果
        partial: Box<SimulationResult>,
    },

    /// 自动选择 dt / N 在允许范围内无法达到容差
    #[error("无法达到容差: 实际 {achieved:.3e}, 要求 {tolerance:.3e}")]
    ToleranceUnachievable {
        /// 能达到的最好精度
        achieved: f64,
        /// 要求的容差
        tolerance: f64,
        /// 最好的一次结果
        best: Box<SimulationResult>,
    },

    /// 输出时间序列无效
    #[error("无效的时间区间: {message}")]
    InvalidTimeSpan {
        /// 具体错误信息
        message: String,
    },

    /// 初值无效
    #[error("无效的初值: {message}")]
    InvalidInitialCondition {
        /// 具体错误信息
        message: String,
    },

    /// 基础层错误
    #[error(transparent)]
    Spin(#[from] SpinError),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl SolveError {
    /// 无效算子
    pub fn invalid_operator(message: impl Into<String>) -> Self {
        Self::InvalidOperator {
            message: message.into(),
        }
    }

    /// 无效时间区间
    pub fn invalid_time_span(message: impl Into<String>) -> Self {
        Self::InvalidTimeSpan {
            message: message.into(),
        }
    }

    /// 无效初值
    pub fn invalid_initial_condition(message: impl Into<String>) -> Self {
        Self::InvalidInitialCondition {
            message: message.into(),
        }
    }

    /// 是否为发散
    pub fn is_divergence(&self) -> bool {
        matches!(self, Self::Divergence { .. })
    }

    /// 附带的部分结果（发散或容差不可达时）
    pub fn partial_result(&self) -> Option<&SimulationResult> {
        match self {
            Self::Divergence { partial, .. } => Some(partial),
            Self::ToleranceUnachievable { best, .. } => Some(best),
            _ => None,
        }
    }
}
