// crates/spin_physics/src/engine/auto_select.rs

//! 自动选择点数 N 与步长 dt
//!
//! # N
//!
//! 从 `n_min` 起逐次加倍，直到初值的尾带比值不超过容差或到达 `n_max`。
//! 运行中快照欠分辨或发散时由驱动器以 2N 重启。
//!
//! # dt
//!
//! 从 `dt_max` 起，在试探窗口 `min(第一个输出区间, 10·dt_max)` 上分别以
//! dt 与 dt/2 推进，两者的相对最大模差小于容差即接受 dt，否则减半。
//! 试探发散按"需要减半"处理。减半次数受 `max_refinements` 限制，
//! dt 不低于 `dt_min`。

use crate::engine::stepper::{StepStatus, Stepper};
use crate::error::{SolveError, SolveResult};
use crate::initial::InitialCondition;
use crate::operator::OperatorSpec;
use crate::result::{RunStats, RunStatus, SimulationResult, Snapshot};
use crate::time_span::TimeSpan;
use spin_config::Preferences;
use spin_spectral::{tail_ratio, Grid, SpectralState};
use std::time::Instant;
use tracing::{debug, warn};

/// 试探窗口相对 `dt_max` 的倍数
pub const TRIAL_WINDOW_FACTOR: f64 = 10.0;

/// 自动选择的点数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NSelection {
    /// 选中的点数
    pub n: usize,
    /// 该点数下初值的尾带比值
    pub tail_ratio: f64,
    /// 是否满足容差
    pub resolved: bool,
}

/// 为初值选择每维点数
pub fn select_n(
    operator: &OperatorSpec,
    initial: &InitialCondition,
    preferences: &Preferences,
) -> SolveResult<NSelection> {
    let n_max = preferences.n_max_for_dim(operator.dim());
    let mut n = preferences.n_min.min(n_max);
    loop {
        let grid = Grid::new(operator.domain().clone(), n)?;
        let ratio = tail_ratio(&initial.sample(&grid)?, &grid);
        debug!(n, ratio, "自动 N: 初值尾带比值");
        if ratio <= preferences.tolerance {
            return Ok(NSelection {
                n,
                tail_ratio: ratio,
                resolved: true,
            });
        }
        if n * 2 > n_max {
            warn!(n, ratio, tolerance = preferences.tolerance, "初值在 n_max 下仍未解析");
            return Ok(NSelection {
                n,
                tail_ratio: ratio,
                resolved: false,
            });
        }
        n *= 2;
    }
}

/// 试探窗口长度
pub fn trial_window(span: &TimeSpan, preferences: &Preferences) -> f64 {
    span.first_interval()
        .min(TRIAL_WINDOW_FACTOR * preferences.dt_max)
}

/// 为给定网格与初值选择时间步长
///
/// # 错误
///
/// 在 `max_refinements` 次减半内（且不低于 `dt_min`）达不到容差时返回
/// `ToleranceUnachievable`，`best` 为最细一次试探的结果。
pub fn select_dt(
    operator: &OperatorSpec,
    grid: &Grid,
    initial: &SpectralState,
    span: &TimeSpan,
    preferences: &Preferences,
) -> SolveResult<f64> {
    let window = trial_window(span, preferences);
    let mut dt = preferences.dt_max;
    if window <= 0.0 || preferences.max_refinements == 0 {
        return Ok(dt);
    }
    dt = dt.min(window);

    let clock = Instant::now();
    let t0 = span.start();
    let t1 = t0 + window;
    let transform = grid.transform();

    let mut coarse = trial_run(operator, grid, initial, preferences, t0, t1, dt)?;
    let mut best: Option<(f64, f64, SpectralState)> = None;

    for refinement in 0..preferences.max_refinements {
        let half = dt / 2.0;
        if half < preferences.dt_min {
            debug!(dt, dt_min = preferences.dt_min, "自动 dt: 已到下限");
            break;
        }
        let fine = trial_run(operator, grid, initial, preferences, t0, t1, half)?;

        if let (Some(c), Some(f)) = (&coarse, &fine) {
            let uc = transform.to_physical(c)?;
            let uf = transform.to_physical(f)?;
            let scale = uf.max_abs();
            let diff = uc
                .components()
                .iter()
                .zip(uf.components())
                .flat_map(|(a, b)| a.iter().zip(b.iter()).map(|(x, y)| (x - y).norm()))
                .fold(0.0, f64::max);
            let err = if scale > 0.0 { diff / scale } else { diff };
            debug!(refinement, dt, err, "自动 dt: 试探差");
            if err < preferences.tolerance {
                debug!(dt, "自动 dt: 接受");
                return Ok(dt);
            }
            if best.as_ref().map_or(true, |(e, _, _)| err < *e) {
                best = Some((err, half, f.clone()));
            }
        } else {
            debug!(refinement, dt, "自动 dt: 试探发散, 减半");
        }

        dt = half;
        coarse = fine;
    }

    let (achieved, best_dt, best_state) = match best {
        Some(b) => b,
        None => (f64::INFINITY, dt, initial.clone()),
    };
    warn!(achieved, tolerance = preferences.tolerance, "自动 dt: 无法达到容差");
    let state = transform.to_physical(&best_state)?;
    let final_time = if achieved.is_finite() { t1 } else { t0 };
    let result = SimulationResult::new(
        grid.clone(),
        vec![Snapshot {
            time: final_time,
            state: state.clone(),
        }],
        final_time,
        state,
        RunStatus::Completed,
        RunStats {
            steps: 0,
            dt: best_dt,
            n: grid.n(),
            scheme: preferences.scheme,
            attempts: 1,
            nonlinear_evaluations: 0,
            wall_seconds: clock.elapsed().as_secs_f64(),
        },
    );
    Err(SolveError::ToleranceUnachievable {
        achieved,
        tolerance: preferences.tolerance,
        best: Box::new(result),
    })
}

/// 一次试探运行，发散时返回 `None`
fn trial_run(
    operator: &OperatorSpec,
    grid: &Grid,
    initial: &SpectralState,
    preferences: &Preferences,
    t0: f64,
    t1: f64,
    dt: f64,
) -> SolveResult<Option<SpectralState>> {
    let mut stepper = Stepper::new(operator, grid, preferences, initial.clone(), t0)?;
    match stepper.advance_to(t1, dt)? {
        StepStatus::Advanced => Ok(Some(stepper.state().clone())),
        StepStatus::Diverged => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{symbols, LinearPart, NonlinearPart};
    use spin_spectral::Domain;
    use std::f64::consts::PI;

    fn heat() -> OperatorSpec {
        OperatorSpec::new(
            Domain::interval(0.0, 2.0 * PI).unwrap(),
            LinearPart::scalar(symbols::laplacian()),
            NonlinearPart::zero(1),
        )
        .unwrap()
    }

    #[test]
    fn test_select_n_smooth_initial() {
        let op = heat();
        let ic = InitialCondition::scalar(|x| x[0].sin());
        let prefs = Preferences::default();
        let sel = select_n(&op, &ic, &prefs).unwrap();
        assert!(sel.resolved);
        assert_eq!(sel.n, prefs.n_min);
    }

    #[test]
    fn test_select_n_refines_for_narrow_pulse() {
        let op = heat();
        let ic = InitialCondition::scalar(|x| (-40.0 * (x[0] - PI).powi(2)).exp());
        let prefs = Preferences::default();
        let sel = select_n(&op, &ic, &prefs).unwrap();
        assert!(sel.resolved);
        assert!(sel.n > prefs.n_min);
    }

    #[test]
    fn test_select_n_caps_at_n_max() {
        let op = heat();
        let ic = InitialCondition::scalar(|x| if x[0] < PI { 1.0 } else { 0.0 });
        let prefs = Preferences {
            n_max: Some(64),
            ..Preferences::default()
        };
        let sel = select_n(&op, &ic, &prefs).unwrap();
        assert!(!sel.resolved);
        assert_eq!(sel.n, 64);
    }

    #[test]
    fn test_linear_problem_accepts_dt_max() {
        // 纯线性问题每一步都是精确传播，dt 与 dt/2 的结果一致
        let op = heat();
        let grid = Grid::new(op.domain().clone(), 16).unwrap();
        let ic = InitialCondition::scalar(|x| x[0].cos());
        let v0 = ic.sample(&grid).unwrap();
        let span = TimeSpan::until(1.0).unwrap();
        let prefs = Preferences::default();
        let dt = select_dt(&op, &grid, &v0, &span, &prefs).unwrap();
        assert_eq!(dt, prefs.dt_max);
    }

    #[test]
    fn test_trial_window() {
        let prefs = Preferences::default();
        let span = TimeSpan::from_outputs(vec![0.0, 50.0]).unwrap();
        assert_eq!(trial_window(&span, &prefs), 1.0);
        let span = TimeSpan::until(0.2).unwrap();
        assert_eq!(trial_window(&span, &prefs), 0.2);
    }
}
