// crates/spin_physics/src/result.rs

//! 模拟结果
//!
//! 按时间排序的快照序列加终态，生成后只读。

use crate::error::SolveResult;
use num_complex::Complex64;
use spin_config::SchemeName;
use spin_spectral::{evaluate_at, Grid, PhysicalState};
use std::fmt;

/// 一个输出时刻的状态
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// 时刻
    pub time: f64,
    /// 物理空间状态
    pub state: PhysicalState,
}

/// 运行结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    /// 所有输出时刻均已完成
    Completed,
    /// 被取消，快照只包含取消前完成的部分
    Cancelled,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 运行统计
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    /// 最终尝试中的时间步数
    pub steps: u64,
    /// 名义步长
    pub dt: f64,
    /// 每维点数
    pub n: usize,
    /// 积分格式
    pub scheme: SchemeName,
    /// 尝试次数（自动 N 重启计入）
    pub attempts: u32,
    /// 非线性项求值次数
    pub nonlinear_evaluations: u64,
    /// 墙钟时间（秒）
    pub wall_seconds: f64,
}

/// 模拟结果
#[derive(Debug, Clone)]
pub struct SimulationResult {
    grid: Grid,
    snapshots: Vec<Snapshot>,
    final_time: f64,
    final_state: PhysicalState,
    status: RunStatus,
    stats: RunStats,
}

impl SimulationResult {
    pub(crate) fn new(
        grid: Grid,
        snapshots: Vec<Snapshot>,
        final_time: f64,
        final_state: PhysicalState,
        status: RunStatus,
        stats: RunStats,
    ) -> Self {
        Self {
            grid,
            snapshots,
            final_time,
            final_state,
            status,
            stats,
        }
    }

    /// 快照（按时间排序）
    #[inline]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// 快照时刻
    pub fn times(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.time).collect()
    }

    /// 最后完成的时刻
    #[inline]
    pub fn final_time(&self) -> f64 {
        self.final_time
    }

    /// 最后完成的状态
    #[inline]
    pub fn final_state(&self) -> &PhysicalState {
        &self.final_state
    }

    /// 结束方式
    #[inline]
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// 运行统计
    #[inline]
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// 运行网格
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// 所有快照中虚部的最大模
    pub fn max_imaginary(&self) -> f64 {
        self.snapshots
            .iter()
            .map(|s| s.state.max_imaginary())
            .fold(self.final_state.max_imaginary(), f64::max)
    }

    /// 在任意点处对终态做三角插值
    pub fn evaluate_at(&self, component: usize, x: &[f64]) -> SolveResult<Complex64> {
        let spectral = self.grid.transform().to_spectral(&self.final_state)?;
        Ok(evaluate_at(&spectral, &self.grid, component, x)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spin_spectral::Domain;
    use std::f64::consts::PI;

    fn sample_result() -> SimulationResult {
        let g = Grid::new(Domain::interval(0.0, 2.0 * PI).unwrap(), 16).unwrap();
        let u = PhysicalState::from_real(vec![g.coordinates(0).iter().map(|x| x.sin()).collect()])
            .unwrap();
        let snaps = vec![
            Snapshot { time: 0.0, state: u.clone() },
            Snapshot { time: 1.0, state: u.clone() },
        ];
        let stats = RunStats {
            steps: 10,
            dt: 0.1,
            n: 16,
            scheme: SchemeName::Etdrk4,
            attempts: 1,
            nonlinear_evaluations: 40,
            wall_seconds: 0.0,
        };
        SimulationResult::new(g, snaps, 1.0, u, RunStatus::Completed, stats)
    }

    #[test]
    fn test_accessors() {
        let r = sample_result();
        assert_eq!(r.times(), vec![0.0, 1.0]);
        assert_eq!(r.status(), RunStatus::Completed);
        assert_eq!(r.max_imaginary(), 0.0);
        assert_eq!(r.stats().n, 16);
    }

    #[test]
    fn test_evaluate_between_nodes() {
        let r = sample_result();
        let v = r.evaluate_at(0, &[0.3]).unwrap();
        assert!((v.re - 0.3f64.sin()).abs() < 1e-12);
    }
}
