// crates/spin_physics/src/engine/integrator.rs

//! 指数 Runge-Kutta 时间积分器
//!
//! 所有格式共享同一个推进过程，差别只在系数表：
//!
//! ```text
//! for i in 0..s:
//!     U_i = e^{c_i Z} u + Σ_{j<i} (h a_ij) N_j
//!     N_i = N(U_i)
//! u ← e^{Z} u + Σ_i (h b_i) N_i
//! ```
//!
//! 每一级做一次非线性求值，即一对逆/正变换。非线性项为零时
//! 一步恰好等于 `e^{hL}` 传播。

use crate::engine::coefficients::StepCoefficients;
use crate::engine::nonlinear::NonlinearEvaluator;
use crate::engine::scheme::Tableau;
use crate::error::SolveResult;
use spin_config::SchemeName;
use spin_spectral::SpectralState;
use std::sync::Arc;

/// 时间积分器 trait
pub trait TimeIntegrator: Send {
    /// 积分器名称
    fn name(&self) -> &'static str;

    /// 经典精度阶数
    fn order(&self) -> u8;

    /// Runge-Kutta 级数
    fn stages(&self) -> u8;

    /// 系数表
    fn tableau(&self) -> &Arc<Tableau>;

    /// 推进一个时间步
    ///
    /// # 参数
    /// - `state`: 要更新的谱状态（in-place 修改）
    /// - `coeffs`: 当前步长的系数
    /// - `nonlinear`: 非线性项求值器
    fn advance(
        &mut self,
        state: &mut SpectralState,
        coeffs: &StepCoefficients,
        nonlinear: &mut NonlinearEvaluator,
    ) -> SolveResult<()>;
}

/// 系数表驱动的指数 RK 积分器
pub struct ExponentialRk {
    tableau: Arc<Tableau>,
    stage: SpectralState,
    stage_n: Vec<SpectralState>,
    next: SpectralState,
}

impl ExponentialRk {
    /// 创建积分器
    pub fn new(tableau: Arc<Tableau>, n_components: usize, len: usize) -> Self {
        let s = tableau.stages();
        Self {
            tableau,
            stage: SpectralState::zeros(n_components, len),
            stage_n: (0..s)
                .map(|_| SpectralState::zeros(n_components, len))
                .collect(),
            next: SpectralState::zeros(n_components, len),
        }
    }
}

impl TimeIntegrator for ExponentialRk {
    fn name(&self) -> &'static str {
        self.tableau.name.name()
    }

    fn order(&self) -> u8 {
        self.tableau.order
    }

    fn stages(&self) -> u8 {
        self.tableau.stages() as u8
    }

    fn tableau(&self) -> &Arc<Tableau> {
        &self.tableau
    }

    fn advance(
        &mut self,
        state: &mut SpectralState,
        coeffs: &StepCoefficients,
        nonlinear: &mut NonlinearEvaluator,
    ) -> SolveResult<()> {
        let s = self.tableau.stages();

        if !nonlinear.is_zero() {
            for i in 0..s {
                match coeffs.stage_exp(i) {
                    Some(e) => e.apply(state, &mut self.stage, false),
                    None => self.stage.copy_from(state),
                }
                for j in 0..i {
                    if let Some(a) = coeffs.a(i, j) {
                        a.apply(&self.stage_n[j], &mut self.stage, true);
                    }
                }
                nonlinear.evaluate(&self.stage, &mut self.stage_n[i])?;
            }
        }

        coeffs.full_exp().apply(state, &mut self.next, false);
        if !nonlinear.is_zero() {
            for i in 0..s {
                if let Some(b) = coeffs.b(i) {
                    b.apply(&self.stage_n[i], &mut self.next, true);
                }
            }
        }
        state.copy_from(&self.next);
        Ok(())
    }
}

/// 积分器工厂函数
pub fn create_integrator(
    name: SchemeName,
    n_components: usize,
    len: usize,
) -> Box<dyn TimeIntegrator> {
    Box::new(ExponentialRk::new(
        Arc::new(Tableau::for_scheme(name)),
        n_components,
        len,
    ))
}
