// crates/spin_physics/src/operator/mod.rs

//! 算子定义
//!
//! 方程写成 `u_t = L u + N(u)`：
//!
//! - **线性部分 L**：每个波数上的常系数算子，以傅里叶符号给出。
//!   各分量独立时为对角形式，分量之间有线性耦合时为块形式（每个波数一个
//!   m×m 矩阵）。
//! - **非线性部分 N**：物理空间中的逐点函数 `f(x, u, ∇u)`，可选地再乘一个
//!   对角谱乘子（守恒形式 `-½(u²)_x` 写成 逐点 `u²` 加乘子 `-½ik`）。
//!   只有显式请求时才计算梯度。
//!
//! # 子模块
//!
//! - [`symbols`]: 常用符号与组合子
//! - [`builder`]: 流式构建器

pub mod builder;
pub mod symbols;

pub use builder::OperatorBuilder;
pub use symbols::Symbol;

use crate::error::{SolveError, SolveResult};
use num_complex::Complex64;
use spin_spectral::Domain;
use std::fmt;
use std::sync::Arc;

/// 块符号：对波矢量 `k` 按行主序填充 m×m 矩阵
pub type BlockSymbol = Arc<dyn Fn(&[f64], &mut [Complex64]) + Send + Sync>;

/// 逐点非线性函数：由 [`PointInput`] 写出 m 个分量的值
pub type PointwiseFn = Arc<dyn Fn(&PointInput<'_>, &mut [Complex64]) + Send + Sync>;

/// 逐点非线性函数的输入
#[derive(Debug, Clone, Copy)]
pub struct PointInput<'a> {
    /// 物理坐标（长度为空间维度）
    pub x: &'a [f64],
    /// 各分量的值
    pub u: &'a [Complex64],
    /// 梯度，`grad[c * dim + axis]`；未请求梯度时为空
    pub grad: &'a [Complex64],
}

impl<'a> PointInput<'a> {
    /// 第 `c` 个分量沿 `axis` 的偏导数（未请求梯度时为零）
    #[inline]
    pub fn du(&self, c: usize, axis: usize) -> Complex64 {
        let dim = self.x.len();
        self.grad
            .get(c * dim + axis)
            .copied()
            .unwrap_or_else(|| Complex64::new(0.0, 0.0))
    }
}

/// 线性部分
#[derive(Clone)]
pub enum LinearPart {
    /// 每个分量一个符号
    Diagonal(Vec<Symbol>),
    /// 分量间耦合
    Coupled {
        /// 分量数
        n_components: usize,
        /// 块符号
        symbol: BlockSymbol,
    },
}

impl LinearPart {
    /// 单分量
    pub fn scalar(symbol: Symbol) -> Self {
        Self::Diagonal(vec![symbol])
    }

    /// 耦合块符号
    pub fn coupled(
        n_components: usize,
        symbol: impl Fn(&[f64], &mut [Complex64]) + Send + Sync + 'static,
    ) -> Self {
        Self::Coupled {
            n_components,
            symbol: Arc::new(symbol),
        }
    }

    /// 分量数
    pub fn n_components(&self) -> usize {
        match self {
            Self::Diagonal(s) => s.len(),
            Self::Coupled { n_components, .. } => *n_components,
        }
    }
}

impl fmt::Debug for LinearPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diagonal(s) => write!(f, "LinearPart::Diagonal({} 分量)", s.len()),
            Self::Coupled { n_components, .. } => {
                write!(f, "LinearPart::Coupled({}×{})", n_components, n_components)
            }
        }
    }
}

/// 非线性部分
#[derive(Clone)]
pub struct NonlinearPart {
    n_components: usize,
    pointwise: Option<PointwiseFn>,
    needs_gradient: bool,
    spectral: Option<Vec<Symbol>>,
}

impl NonlinearPart {
    /// 零非线性项（纯线性问题）
    pub fn zero(n_components: usize) -> Self {
        Self {
            n_components,
            pointwise: None,
            needs_gradient: false,
            spectral: None,
        }
    }

    /// 逐点函数 `f(x, u)`
    pub fn pointwise(
        n_components: usize,
        f: impl Fn(&PointInput<'_>, &mut [Complex64]) + Send + Sync + 'static,
    ) -> Self {
        Self {
            n_components,
            pointwise: Some(Arc::new(f)),
            needs_gradient: false,
            spectral: None,
        }
    }

    /// 逐点函数 `f(x, u, ∇u)`，计算时提供梯度
    pub fn with_gradient(
        n_components: usize,
        f: impl Fn(&PointInput<'_>, &mut [Complex64]) + Send + Sync + 'static,
    ) -> Self {
        Self {
            needs_gradient: true,
            ..Self::pointwise(n_components, f)
        }
    }

    /// 单分量 `f(u)` 的简写
    pub fn scalar(f: impl Fn(Complex64) -> Complex64 + Send + Sync + 'static) -> Self {
        Self::pointwise(1, move |p, out| out[0] = f(p.u[0]))
    }

    /// 在逐点结果上再乘对角谱乘子（每个分量一个符号）
    pub fn then_multiply(mut self, multipliers: Vec<Symbol>) -> Self {
        self.spectral = Some(multipliers);
        self
    }

    /// 分量数
    #[inline]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// 是否恒为零
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.pointwise.is_none()
    }

    /// 是否需要梯度
    #[inline]
    pub fn needs_gradient(&self) -> bool {
        self.needs_gradient
    }

    /// 逐点函数
    #[inline]
    pub fn pointwise_fn(&self) -> Option<&PointwiseFn> {
        self.pointwise.as_ref()
    }

    /// 谱乘子
    #[inline]
    pub fn spectral_multipliers(&self) -> Option<&[Symbol]> {
        self.spectral.as_deref()
    }
}

impl fmt::Debug for NonlinearPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonlinearPart")
            .field("n_components", &self.n_components)
            .field("zero", &self.is_zero())
            .field("needs_gradient", &self.needs_gradient)
            .field("spectral", &self.spectral.is_some())
            .finish()
    }
}

/// 完整算子 `u_t = L u + N(u)`
#[derive(Clone, Debug)]
pub struct OperatorSpec {
    name: String,
    domain: Domain,
    n_components: usize,
    linear: LinearPart,
    nonlinear: NonlinearPart,
}

impl OperatorSpec {
    /// 创建算子
    ///
    /// # 错误
    ///
    /// 分量数为零，或 L、N、谱乘子之间分量数不一致时返回 `InvalidOperator`。
    pub fn new(domain: Domain, linear: LinearPart, nonlinear: NonlinearPart) -> SolveResult<Self> {
        let n_components = linear.n_components();
        if n_components == 0 {
            return Err(SolveError::invalid_operator("线性部分至少需要一个分量"));
        }
        if nonlinear.n_components() != n_components {
            return Err(SolveError::invalid_operator(format!(
                "分量数不一致: 线性部分 {}, 非线性部分 {}",
                n_components,
                nonlinear.n_components()
            )));
        }
        if let Some(m) = nonlinear.spectral_multipliers() {
            if m.len() != n_components {
                return Err(SolveError::invalid_operator(format!(
                    "谱乘子个数 {} 与分量数 {} 不一致",
                    m.len(),
                    n_components
                )));
            }
        }
        Ok(Self {
            name: String::from("custom"),
            domain,
            n_components,
            linear,
            nonlinear,
        })
    }

    /// 设置名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 名称
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 计算域
    #[inline]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// 空间维度
    #[inline]
    pub fn dim(&self) -> usize {
        self.domain.dim()
    }

    /// 分量数
    #[inline]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// 线性部分
    #[inline]
    pub fn linear(&self) -> &LinearPart {
        &self.linear
    }

    /// 非线性部分
    #[inline]
    pub fn nonlinear(&self) -> &NonlinearPart {
        &self.nonlinear
    }
}
