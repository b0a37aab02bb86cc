// crates/spin_spectral/src/domain.rs

//! 周期计算域
//!
//! 每个空间维度一个 `[lower, upper)` 区间，1 到 3 维，始终按周期处理。

use spin_foundation::{SpinError, SpinResult};

/// 周期计算域
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    bounds: Vec<[f64; 2]>,
}

impl Domain {
    /// 支持的最大空间维度
    pub const MAX_DIM: usize = 3;

    /// 创建计算域
    ///
    /// # 错误
    ///
    /// 维度不在 1..=3、边界非有限或 `lower >= upper` 时返回 `InvalidDomain`。
    pub fn new(bounds: Vec<[f64; 2]>) -> SpinResult<Self> {
        if bounds.is_empty() || bounds.len() > Self::MAX_DIM {
            return Err(SpinError::invalid_domain(format!(
                "维度必须在 1..={} 之间, 实际 {}",
                Self::MAX_DIM,
                bounds.len()
            )));
        }
        for (axis, [lo, hi]) in bounds.iter().enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(SpinError::invalid_domain(format!(
                    "第 {} 维边界非有限: [{}, {}]",
                    axis, lo, hi
                )));
            }
            if lo >= hi {
                return Err(SpinError::invalid_domain(format!(
                    "第 {} 维退化: 下界 {} 不小于上界 {}",
                    axis, lo, hi
                )));
            }
        }
        Ok(Self { bounds })
    }

    /// 一维区间 `[a, b)`
    pub fn interval(a: f64, b: f64) -> SpinResult<Self> {
        Self::new(vec![[a, b]])
    }

    /// 二维正方形 `[a, b)²`
    pub fn square(a: f64, b: f64) -> SpinResult<Self> {
        Self::new(vec![[a, b]; 2])
    }

    /// 三维立方体 `[a, b)³`
    pub fn cube(a: f64, b: f64) -> SpinResult<Self> {
        Self::new(vec![[a, b]; 3])
    }

    /// 空间维度
    #[inline]
    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    /// 全部边界
    #[inline]
    pub fn bounds(&self) -> &[[f64; 2]] {
        &self.bounds
    }

    /// 某一维下界
    #[inline]
    pub fn lower(&self, axis: usize) -> f64 {
        self.bounds[axis][0]
    }

    /// 某一维上界
    #[inline]
    pub fn upper(&self, axis: usize) -> f64 {
        self.bounds[axis][1]
    }

    /// 某一维周期长度
    #[inline]
    pub fn length(&self, axis: usize) -> f64 {
        self.bounds[axis][1] - self.bounds[axis][0]
    }

    /// 计算域体积（长度/面积/体积）
    pub fn measure(&self) -> f64 {
        (0..self.dim()).map(|a| self.length(a)).product()
    }

    /// 将坐标按周期折回 `[lower, upper)`
    pub fn wrap(&self, axis: usize, x: f64) -> f64 {
        let lo = self.lower(axis);
        let len = self.length(axis);
        lo + (x - lo).rem_euclid(len)
    }
}
