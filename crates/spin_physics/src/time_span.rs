// crates/spin_physics/src/time_span.rs

//! 时间区间与输出时刻

use crate::error::{SolveError, SolveResult};

/// 起始时刻加非递减的输出时刻序列
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSpan {
    start: f64,
    outputs: Vec<f64>,
}

impl TimeSpan {
    /// 从 `start` 出发，在 `outputs` 各时刻输出
    ///
    /// # 错误
    ///
    /// 输出为空、含非有限值、递减或早于起始时刻时返回 `InvalidTimeSpan`。
    pub fn new(start: f64, outputs: Vec<f64>) -> SolveResult<Self> {
        if !start.is_finite() {
            return Err(SolveError::invalid_time_span(format!("起始时刻非有限: {}", start)));
        }
        if outputs.is_empty() {
            return Err(SolveError::invalid_time_span("输出时刻不能为空"));
        }
        let mut prev = start;
        for &t in &outputs {
            if !t.is_finite() {
                return Err(SolveError::invalid_time_span(format!("输出时刻非有限: {}", t)));
            }
            if t < prev {
                return Err(SolveError::invalid_time_span(format!(
                    "输出时刻必须非递减且不早于起始时刻: {} < {}",
                    t, prev
                )));
            }
            prev = t;
        }
        Ok(Self { start, outputs })
    }

    /// 从 0 出发，在 `outputs` 各时刻输出
    pub fn from_outputs(outputs: Vec<f64>) -> SolveResult<Self> {
        Self::new(0.0, outputs)
    }

    /// 从 0 积分到 `t_final`，只输出终态
    pub fn until(t_final: f64) -> SolveResult<Self> {
        Self::new(0.0, vec![t_final])
    }

    /// 起始时刻
    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// 输出时刻
    #[inline]
    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    /// 最终时刻
    #[inline]
    pub fn final_time(&self) -> f64 {
        self.outputs.last().copied().unwrap_or(self.start)
    }

    /// 第一个正长度输出区间的长度（全部输出都在起始时刻时为 0）
    pub fn first_interval(&self) -> f64 {
        self.outputs
            .iter()
            .map(|&t| t - self.start)
            .find(|&d| d > 0.0)
            .unwrap_or(0.0)
    }

    /// 以新的最终时刻截断或替换（CLI 覆盖最终时刻时使用）
    pub fn with_final_time(&self, t_final: f64) -> SolveResult<Self> {
        let mut outputs: Vec<f64> = self
            .outputs
            .iter()
            .copied()
            .filter(|&t| t < t_final)
            .collect();
        outputs.push(t_final);
        Self::new(self.start, outputs)
    }
}
