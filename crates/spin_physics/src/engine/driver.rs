// crates/spin_physics/src/engine/driver.rs

//! 时间推进驱动器
//!
//! 状态机：
//!
//! ```text
//! Initializing -> Stepping -> { Stepping | Snapshotting | Diverged | Completed | Cancelled }
//! ```
//!
//! - Initializing: 选择 N 与 dt，构造网格，初值变换到谱空间
//! - Stepping: 每个输出区间内以 `h = Δt / ⌈Δt / dt⌉` 等长推进，恰好落在输出时刻
//! - Snapshotting: 记录物理空间状态；自动 N 时检查尾带比值
//! - Diverged / 欠分辨: 自动 N 时以 2N 重启，否则返回错误
//! - Cancelled: 每步前检查取消令牌，返回已完成的部分

use crate::engine::auto_select::{select_dt, select_n};
use crate::engine::progress::{CancelToken, Phase, Progress, ProgressCallback};
use crate::engine::stepper::{StepStatus, Stepper};
use crate::error::{SolveError, SolveResult};
use crate::initial::InitialCondition;
use crate::operator::OperatorSpec;
use crate::result::{RunStats, RunStatus, SimulationResult, Snapshot};
use crate::time_span::TimeSpan;
use spin_config::Preferences;
use spin_foundation::steps_to_cover;
use spin_spectral::{tail_ratio, Grid, PhysicalState, SpectralState};
use std::time::Instant;
use tracing::{debug, info, warn};

/// 一次尝试（固定 N 与 dt）的结局
enum Attempt {
    /// 正常结束或被取消
    Finished(SimulationResult),
    /// 快照欠分辨
    Unresolved {
        time: f64,
        ratio: f64,
        partial: SimulationResult,
    },
}

/// 一次模拟运行
///
/// # 示例
///
/// ```
/// use spin_physics::prelude::*;
///
/// let op = OperatorBuilder::new("heat")
///     .bounds(vec![[0.0, 2.0 * std::f64::consts::PI]])
///     .linear(symbols::laplacian())
///     .build()
///     .unwrap();
/// let span = TimeSpan::until(0.5).unwrap();
/// let ic = InitialCondition::scalar(|x| x[0].cos());
/// let prefs = Preferences::default().with_n(16).with_dt(0.1);
///
/// let result = Simulation::new(&op, &span, &ic)
///     .preferences(prefs)
///     .run()
///     .unwrap();
/// assert_eq!(result.snapshots().len(), 1);
/// ```
pub struct Simulation<'a> {
    operator: &'a OperatorSpec,
    span: &'a TimeSpan,
    initial: &'a InitialCondition,
    preferences: Preferences,
    progress: Option<ProgressCallback>,
    cancel: Option<CancelToken>,
}

impl<'a> Simulation<'a> {
    /// 创建运行（默认偏好）
    pub fn new(
        operator: &'a OperatorSpec,
        span: &'a TimeSpan,
        initial: &'a InitialCondition,
    ) -> Self {
        Self {
            operator,
            span,
            initial,
            preferences: Preferences::default(),
            progress: None,
            cancel: None,
        }
    }

    /// 设置偏好
    pub fn preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// 设置进度回调
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// 设置取消令牌
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// 执行
    pub fn run(&self) -> SolveResult<SimulationResult> {
        let prefs = &self.preferences;
        prefs.validate()?;
        if self.initial.n_components() != self.operator.n_components() {
            return Err(SolveError::invalid_initial_condition(format!(
                "初值分量数 {} 与算子分量数 {} 不符",
                self.initial.n_components(),
                self.operator.n_components()
            )));
        }

        let clock = Instant::now();
        let n_max = prefs.n_max_for_dim(self.operator.dim());
        let mut n = match prefs.n {
            Some(n) => n,
            None => select_n(self.operator, self.initial, prefs)?.n,
        };
        let mut attempts = 0u32;

        info!(
            operator = self.operator.name(),
            scheme = %prefs.scheme,
            t0 = self.span.start(),
            t1 = self.span.final_time(),
            "开始积分"
        );

        loop {
            attempts += 1;
            self.notify(Phase::Initializing, self.span.start(), 0, 0.0, n);

            let grid = Grid::new(self.operator.domain().clone(), n)?;
            let v0 = self.initial.sample(&grid)?;
            let dt = match prefs.dt {
                Some(dt) => dt,
                None => select_dt(self.operator, &grid, &v0, self.span, prefs)?,
            };
            debug!(attempt = attempts, n, dt, "尝试");

            let can_refine = prefs.auto_n() && n * 2 <= n_max;
            match self.attempt(&grid, v0, dt, attempts, clock) {
                Ok(Attempt::Finished(result)) => {
                    info!(
                        status = %result.status(),
                        steps = result.stats().steps,
                        n,
                        dt,
                        seconds = result.stats().wall_seconds,
                        "积分结束"
                    );
                    return Ok(result);
                }
                Ok(Attempt::Unresolved { time, ratio, .. }) if can_refine => {
                    warn!(t = time, n, ratio, "快照欠分辨, 以 2N 重启");
                    n *= 2;
                }
                Ok(Attempt::Unresolved { ratio, partial, .. }) => {
                    return Err(SolveError::ToleranceUnachievable {
                        achieved: ratio,
                        tolerance: prefs.tolerance,
                        best: Box::new(partial),
                    });
                }
                Err(SolveError::Divergence { time, .. }) if can_refine => {
                    warn!(t = time, n, "发散, 以 2N 重启");
                    n *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 固定网格与步长的一次完整尝试
    fn attempt(
        &self,
        grid: &Grid,
        v0: SpectralState,
        dt: f64,
        attempts: u32,
        clock: Instant,
    ) -> SolveResult<Attempt> {
        let prefs = &self.preferences;
        let transform = grid.transform();
        let t_final = self.span.final_time();
        let mut stepper = Stepper::new(self.operator, grid, prefs, v0, self.span.start())?;
        let mut snapshots: Vec<Snapshot> = Vec::with_capacity(self.span.outputs().len());

        let stats = |stepper: &Stepper| RunStats {
            steps: stepper.steps(),
            dt,
            n: grid.n(),
            scheme: prefs.scheme,
            attempts,
            nonlinear_evaluations: stepper.nonlinear_evaluations(),
            wall_seconds: clock.elapsed().as_secs_f64(),
        };

        for &t_out in self.span.outputs() {
            let t0 = stepper.time();
            let steps = steps_to_cover(t0, t_out, dt);
            let h = if steps > 0 {
                (t_out - t0) / steps as f64
            } else {
                0.0
            };

            for i in 1..=steps {
                if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                    info!(t = stepper.time(), "运行被取消");
                    self.notify(Phase::Cancelled, stepper.time(), stepper.steps(), h, grid.n());
                    let state = transform.to_physical(stepper.state())?;
                    return Ok(Attempt::Finished(SimulationResult::new(
                        grid.clone(),
                        snapshots,
                        stepper.time(),
                        state,
                        RunStatus::Cancelled,
                        stats(&stepper),
                    )));
                }

                let t_next = if i == steps { t_out } else { t0 + i as f64 * h };
                if stepper.step(h, t_next)? == StepStatus::Diverged {
                    let time = stepper.time();
                    warn!(t = time, n = grid.n(), h, "检测到发散");
                    self.notify(Phase::Diverged, time, stepper.steps(), h, grid.n());
                    let state = transform.to_physical(stepper.state())?;
                    let partial = SimulationResult::new(
                        grid.clone(),
                        snapshots,
                        time,
                        state.clone(),
                        RunStatus::Completed,
                        stats(&stepper),
                    );
                    return Err(SolveError::Divergence {
                        time,
                        state,
                        partial: Box::new(partial),
                    });
                }

                if prefs.progress_every > 0 && stepper.steps() % prefs.progress_every as u64 == 0 {
                    self.notify(Phase::Stepping, stepper.time(), stepper.steps(), h, grid.n());
                }
            }

            self.notify(Phase::Snapshotting, t_out, stepper.steps(), h, grid.n());
            if prefs.auto_n() {
                let ratio = tail_ratio(stepper.state(), grid);
                if ratio > prefs.tolerance {
                    let state = transform.to_physical(stepper.state())?;
                    snapshots.push(Snapshot {
                        time: t_out,
                        state: state.clone(),
                    });
                    let partial = SimulationResult::new(
                        grid.clone(),
                        snapshots,
                        t_out,
                        state,
                        RunStatus::Completed,
                        stats(&stepper),
                    );
                    return Ok(Attempt::Unresolved {
                        time: t_out,
                        ratio,
                        partial,
                    });
                }
            }
            snapshots.push(Snapshot {
                time: t_out,
                state: transform.to_physical(stepper.state())?,
            });
        }

        self.notify(Phase::Completed, t_final, stepper.steps(), dt, grid.n());
        let final_state: PhysicalState = match snapshots.last() {
            Some(s) => s.state.clone(),
            None => transform.to_physical(stepper.state())?,
        };
        Ok(Attempt::Finished(SimulationResult::new(
            grid.clone(),
            snapshots,
            t_final,
            final_state,
            RunStatus::Completed,
            stats(&stepper),
        )))
    }

    fn notify(&self, phase: Phase, time: f64, step: u64, dt: f64, n: usize) {
        if let Some(cb) = &self.progress {
            cb(&Progress {
                phase,
                time,
                final_time: self.span.final_time(),
                step,
                dt,
                n,
            });
        }
    }
}

/// 以给定偏好运行一次模拟
pub fn integrate(
    operator: &OperatorSpec,
    span: &TimeSpan,
    initial: &InitialCondition,
    preferences: &Preferences,
) -> SolveResult<SimulationResult> {
    Simulation::new(operator, span, initial)
        .preferences(preferences.clone())
        .run()
}
