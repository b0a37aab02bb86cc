// crates/spin_physics/src/engine/progress.rs

//! 运行阶段、进度回调与协作式取消

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 驱动器阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// 选择 N、dt，构造网格并变换初值
    Initializing,
    /// 时间推进
    Stepping,
    /// 记录输出时刻的状态
    Snapshotting,
    /// 检测到发散
    Diverged,
    /// 全部输出时刻完成
    Completed,
    /// 被取消
    Cancelled,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initializing => "initializing",
            Self::Stepping => "stepping",
            Self::Snapshotting => "snapshotting",
            Self::Diverged => "diverged",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// 进度信息
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// 当前阶段
    pub phase: Phase,
    /// 当前模拟时间
    pub time: f64,
    /// 最终时刻
    pub final_time: f64,
    /// 本次尝试已完成的步数
    pub step: u64,
    /// 当前步长
    pub dt: f64,
    /// 每维点数
    pub n: usize,
}

impl Progress {
    /// 完成比例 (0.0-1.0)
    pub fn fraction(&self, start_time: f64) -> f64 {
        let span = self.final_time - start_time;
        if span > 0.0 {
            ((self.time - start_time) / span).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }
}

/// 进度回调，仅作通知，不影响积分
pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

/// 取消令牌
///
/// 克隆后共享同一标志，驱动器在每一步之前检查。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// 创建令牌
    pub fn new() -> Self {
        Self::default()
    }

    /// 请求取消
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// 是否已取消
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_progress_fraction() {
        let p = Progress {
            phase: Phase::Stepping,
            time: 1.5,
            final_time: 3.0,
            step: 15,
            dt: 0.1,
            n: 64,
        };
        assert!((p.fraction(0.0) - 0.5).abs() < 1e-12);
        assert_eq!(Phase::Stepping.to_string(), "stepping");
    }
}
