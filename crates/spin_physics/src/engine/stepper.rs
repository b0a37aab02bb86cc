// crates/spin_physics/src/engine/stepper.rs

//! 单个网格上的推进器
//!
//! 把积分器、系数缓存、非线性求值器和当前谱状态打包在一起，
//! 每一步之后做发散检查。驱动器的正式运行与自动 dt 的试探运行共用它。

use crate::engine::coefficients::CoefficientCache;
use crate::engine::integrator::{create_integrator, TimeIntegrator};
use crate::engine::multiplier::evaluate_linear;
use crate::engine::nonlinear::NonlinearEvaluator;
use crate::engine::phi::PhiEvaluator;
use crate::error::{SolveError, SolveResult};
use crate::operator::OperatorSpec;
use spin_config::Preferences;
use spin_foundation::steps_to_cover;
use spin_spectral::{Grid, SpectralState};
use std::sync::Arc;
use tracing::trace;

/// 单步结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepStatus {
    /// 正常推进
    Advanced,
    /// 出现非有限值或超过发散阈值，状态已回退到步前
    Diverged,
}

pub(crate) struct Stepper {
    integrator: Box<dyn TimeIntegrator>,
    cache: CoefficientCache,
    nonlinear: NonlinearEvaluator,
    state: SpectralState,
    previous: SpectralState,
    time: f64,
    bound: f64,
    steps: u64,
}

impl Stepper {
    pub(crate) fn new(
        operator: &OperatorSpec,
        grid: &Grid,
        preferences: &Preferences,
        initial: SpectralState,
        start_time: f64,
    ) -> SolveResult<Self> {
        let m = operator.n_components();
        let integrator = create_integrator(preferences.scheme, m, grid.len());
        let values = evaluate_linear(operator.linear(), grid);
        if !values.is_finite() {
            return Err(SolveError::invalid_operator(format!(
                "线性部分在 N={} 的网格上出现非有限值",
                grid.n()
            )));
        }
        let values = Arc::new(values);
        let cache = CoefficientCache::new(
            Arc::clone(integrator.tableau()),
            values,
            PhiEvaluator::new(preferences.contour_points),
        );
        let bound = preferences.divergence_factor * initial.max_abs().max(1.0);
        Ok(Self {
            integrator,
            cache,
            nonlinear: NonlinearEvaluator::new(operator, grid, preferences.dealias),
            previous: initial.clone(),
            state: initial,
            time: start_time,
            bound,
            steps: 0,
        })
    }

    #[inline]
    pub(crate) fn state(&self) -> &SpectralState {
        &self.state
    }

    #[inline]
    pub(crate) fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub(crate) fn steps(&self) -> u64 {
        self.steps
    }

    #[inline]
    pub(crate) fn nonlinear_evaluations(&self) -> u64 {
        self.nonlinear.evaluations()
    }

    /// 推进一步到 `t_next`
    pub(crate) fn step(&mut self, h: f64, t_next: f64) -> SolveResult<StepStatus> {
        // e^{hL} 溢出与状态发散同样处理
        let Some(coeffs) = self.cache.get(h)? else {
            return Ok(StepStatus::Diverged);
        };
        self.previous.copy_from(&self.state);
        self.integrator
            .advance(&mut self.state, &coeffs, &mut self.nonlinear)?;

        if !self.state.is_finite() || self.state.max_abs() > self.bound {
            self.state.copy_from(&self.previous);
            return Ok(StepStatus::Diverged);
        }
        self.steps += 1;
        self.time = t_next;
        trace!(step = self.steps, t = self.time, h, "step");
        Ok(StepStatus::Advanced)
    }

    /// 以名义步长 `dt` 推进到 `t_end`，不做任何输出
    ///
    /// 用于试探运行；发散时返回 `Diverged`。
    pub(crate) fn advance_to(&mut self, t_end: f64, dt: f64) -> SolveResult<StepStatus> {
        let t0 = self.time;
        let steps = steps_to_cover(t0, t_end, dt);
        if steps == 0 {
            return Ok(StepStatus::Advanced);
        }
        let h = (t_end - t0) / steps as f64;
        for i in 1..=steps {
            let t_next = if i == steps { t_end } else { t0 + i as f64 * h };
            if self.step(h, t_next)? == StepStatus::Diverged {
                return Ok(StepStatus::Diverged);
            }
        }
        Ok(StepStatus::Advanced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{symbols, LinearPart, NonlinearPart};
    use num_complex::Complex64;
    use spin_spectral::Domain;

    fn decay_operator(rate: f64) -> OperatorSpec {
        OperatorSpec::new(
            Domain::interval(0.0, 1.0).unwrap(),
            LinearPart::scalar(symbols::constant(rate)),
            NonlinearPart::zero(1),
        )
        .unwrap()
    }

    fn constant_state(n: usize) -> SpectralState {
        let mut s = SpectralState::zeros(1, n);
        s.component_mut(0)[0] = Complex64::new(n as f64, 0.0);
        s
    }

    #[test]
    fn test_linear_decay_exact() {
        let op = decay_operator(-2.0);
        let grid = Grid::new(op.domain().clone(), 8).unwrap();
        let prefs = Preferences::default();
        let mut st = Stepper::new(&op, &grid, &prefs, constant_state(8), 0.0).unwrap();
        assert_eq!(st.advance_to(1.0, 0.3).unwrap(), StepStatus::Advanced);
        assert_eq!(st.steps(), 4);
        assert_eq!(st.time(), 1.0);
        let v = st.state().component(0)[0].re / 8.0;
        assert!((v - (-2.0f64).exp()).abs() < 1e-13);
    }

    #[test]
    fn test_divergence_rolls_back() {
        let op = decay_operator(50.0);
        let grid = Grid::new(op.domain().clone(), 8).unwrap();
        let prefs = Preferences::default();
        let mut st = Stepper::new(&op, &grid, &prefs, constant_state(8), 0.0).unwrap();
        assert_eq!(st.advance_to(10.0, 0.1).unwrap(), StepStatus::Diverged);
        assert!(st.state().is_finite());
        assert!(st.state().max_abs() <= 1e8 * 8.0);
        assert!(st.steps() < 10);
    }

    #[test]
    fn test_overflowing_exponential_counts_as_divergence() {
        let op = decay_operator(1000.0);
        let grid = Grid::new(op.domain().clone(), 8).unwrap();
        let prefs = Preferences::default();
        let mut st = Stepper::new(&op, &grid, &prefs, constant_state(8), 0.0).unwrap();
        assert_eq!(st.step(1.0, 1.0).unwrap(), StepStatus::Diverged);
        assert_eq!(st.steps(), 0);
        assert_eq!(st.time(), 0.0);
        assert_eq!(st.state().component(0)[0].re, 8.0);
    }

    #[test]
    fn test_non_finite_symbol_rejected() {
        let op = decay_operator(f64::NAN);
        let grid = Grid::new(op.domain().clone(), 8).unwrap();
        let err = Stepper::new(&op, &grid, &Preferences::default(), constant_state(8), 0.0)
            .err()
            .unwrap();
        assert!(matches!(err, SolveError::InvalidOperator { .. }));
    }
}
