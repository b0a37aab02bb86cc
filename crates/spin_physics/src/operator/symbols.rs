// crates/spin_physics/src/operator/symbols.rs

//! 常系数微分算子的傅里叶符号
//!
//! 符号是波矢量 `k`（长度等于空间维度）到复数的纯函数：
//! `∂^n/∂x_a^n ↦ (i k_a)^n`，`Δ ↦ -|k|²`。
//! 组合子按线性叠加构造常见算子，例如 KS 方程的 `-∂xx - ∂xxxx`：
//!
//! ```
//! use spin_physics::operator::symbols;
//! let l = symbols::combine(vec![(-1.0, symbols::diff(0, 2)), (-1.0, symbols::diff(0, 4))]);
//! let v = l(&[2.0]);
//! assert!((v.re - (4.0 - 16.0)).abs() < 1e-12);
//! ```

use num_complex::Complex64;
use std::sync::Arc;

/// 傅里叶符号
pub type Symbol = Arc<dyn Fn(&[f64]) -> Complex64 + Send + Sync>;

/// 由闭包构造符号
pub fn from_fn(f: impl Fn(&[f64]) -> Complex64 + Send + Sync + 'static) -> Symbol {
    Arc::new(f)
}

/// `∂^order/∂x_axis^order` 的符号 `(i k_axis)^order`
pub fn diff(axis: usize, order: u32) -> Symbol {
    Arc::new(move |k: &[f64]| {
        let ik = Complex64::new(0.0, k.get(axis).copied().unwrap_or(0.0));
        ik.powu(order)
    })
}

/// Laplace 算子 `-|k|²`
pub fn laplacian() -> Symbol {
    Arc::new(|k: &[f64]| Complex64::new(-k.iter().map(|v| v * v).sum::<f64>(), 0.0))
}

/// 双调和算子 `Δ² ↦ |k|⁴`
pub fn biharmonic() -> Symbol {
    Arc::new(|k: &[f64]| {
        let k2: f64 = k.iter().map(|v| v * v).sum();
        Complex64::new(k2 * k2, 0.0)
    })
}

/// 常数符号
pub fn constant(c: impl Into<Complex64>) -> Symbol {
    let c = c.into();
    Arc::new(move |_: &[f64]| c)
}

/// 零符号
pub fn zero() -> Symbol {
    constant(0.0)
}

/// 数乘
pub fn scaled(c: impl Into<Complex64>, s: Symbol) -> Symbol {
    let c = c.into();
    Arc::new(move |k: &[f64]| c * s(k))
}

/// 线性组合 `Σ c_i s_i`
pub fn combine<C: Into<Complex64>>(terms: Vec<(C, Symbol)>) -> Symbol {
    let terms: Vec<(Complex64, Symbol)> = terms.into_iter().map(|(c, s)| (c.into(), s)).collect();
    Arc::new(move |k: &[f64]| terms.iter().map(|(c, s)| c * s(k)).sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_orders() {
        let k = [3.0];
        assert!((diff(0, 1)(&k) - Complex64::new(0.0, 3.0)).norm() < 1e-14);
        assert!((diff(0, 2)(&k) - Complex64::new(-9.0, 0.0)).norm() < 1e-14);
        assert!((diff(0, 3)(&k) - Complex64::new(0.0, -27.0)).norm() < 1e-12);
        assert!((diff(0, 4)(&k) - Complex64::new(81.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_laplacian_matches_second_derivatives() {
        let k = [1.5, -2.0];
        let sum = combine(vec![(1.0, diff(0, 2)), (1.0, diff(1, 2))]);
        assert!((laplacian()(&k) - sum(&k)).norm() < 1e-14);
        assert!((biharmonic()(&k).re - 6.25 * 6.25).abs() < 1e-12);
    }

    #[test]
    fn test_scaled_and_constant() {
        let s = scaled(Complex64::new(0.0, 1.0), constant(2.0));
        assert_eq!(s(&[0.0]), Complex64::new(0.0, 2.0));
        assert_eq!(zero()(&[1.0, 2.0, 3.0]), Complex64::new(0.0, 0.0));
    }
}
