// crates/spin_physics/src/operator/builder.rs

//! 算子构建器
//!
//! 从原始边界、符号和逐点函数流式构造 [`OperatorSpec`]。
//! 退化边界在这里统一转换为 `InvalidOperator`。

use super::symbols::Symbol;
use super::{LinearPart, NonlinearPart, OperatorSpec, PointInput};
use crate::error::{SolveError, SolveResult};
use num_complex::Complex64;
use spin_spectral::Domain;

/// 算子构建器
///
/// # 示例
///
/// ```
/// use spin_physics::operator::{symbols, OperatorBuilder};
///
/// // Allen-Cahn: u_t = 5e-3 u_xx + u - u³
/// let op = OperatorBuilder::new("ac")
///     .bounds(vec![[0.0, 2.0 * std::f64::consts::PI]])
///     .linear(symbols::scaled(5e-3, symbols::laplacian()))
///     .nonlinear_scalar(|u| u - u * u * u)
///     .build()
///     .unwrap();
/// assert_eq!(op.n_components(), 1);
/// ```
pub struct OperatorBuilder {
    name: String,
    bounds: Vec<[f64; 2]>,
    linear: Option<LinearPart>,
    nonlinear: Option<NonlinearPart>,
}

impl OperatorBuilder {
    /// 创建新的构建器
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
            linear: None,
            nonlinear: None,
        }
    }

    /// 设置各维边界
    pub fn bounds(mut self, bounds: Vec<[f64; 2]>) -> Self {
        self.bounds = bounds;
        self
    }

    /// 设置已构造的计算域
    pub fn domain(mut self, domain: &Domain) -> Self {
        self.bounds = domain.bounds().to_vec();
        self
    }

    /// 单分量线性符号
    pub fn linear(mut self, symbol: Symbol) -> Self {
        self.linear = Some(LinearPart::scalar(symbol));
        self
    }

    /// 多分量对角线性符号
    pub fn linear_diagonal(mut self, symbols: Vec<Symbol>) -> Self {
        self.linear = Some(LinearPart::Diagonal(symbols));
        self
    }

    /// 耦合线性块符号
    pub fn linear_coupled(
        mut self,
        n_components: usize,
        symbol: impl Fn(&[f64], &mut [Complex64]) + Send + Sync + 'static,
    ) -> Self {
        self.linear = Some(LinearPart::coupled(n_components, symbol));
        self
    }

    /// 设置非线性部分
    pub fn nonlinear(mut self, nonlinear: NonlinearPart) -> Self {
        self.nonlinear = Some(nonlinear);
        self
    }

    /// 单分量逐点非线性 `f(u)`
    pub fn nonlinear_scalar(
        mut self,
        f: impl Fn(Complex64) -> Complex64 + Send + Sync + 'static,
    ) -> Self {
        self.nonlinear = Some(NonlinearPart::scalar(f));
        self
    }

    /// 多分量逐点非线性 `f(x, u)`
    pub fn nonlinear_pointwise(
        mut self,
        n_components: usize,
        f: impl Fn(&PointInput<'_>, &mut [Complex64]) + Send + Sync + 'static,
    ) -> Self {
        self.nonlinear = Some(NonlinearPart::pointwise(n_components, f));
        self
    }

    /// 构建算子
    ///
    /// 未给出非线性部分时视为零。
    pub fn build(self) -> SolveResult<OperatorSpec> {
        let domain = Domain::new(self.bounds)
            .map_err(|e| SolveError::invalid_operator(e.to_string()))?;
        let linear = self
            .linear
            .ok_or_else(|| SolveError::invalid_operator("缺少线性部分"))?;
        let nonlinear = self
            .nonlinear
            .unwrap_or_else(|| NonlinearPart::zero(linear.n_components()));
        Ok(OperatorSpec::new(domain, linear, nonlinear)?.with_name(self.name))
    }
}
