// crates/spin_physics/src/engine/phi.rs

//! φ 函数
//!
//! $$ \varphi_0(z) = e^z, \quad \varphi_{k+1}(z) = \frac{\varphi_k(z) - 1/k!}{z} $$
//!
//! 递推在 |z| 较小时有严重的相消误差。按 Kassam-Trefethen 的做法，
//! |z| < 1 时在以 z 为圆心、半径 1 的圆周上取 M 个点求平均（梯形法则
//! 计算 Cauchy 积分），圆周上的点离原点足够远，递推在那里是稳定的。
//! 节点方向相对 `-z` 错开半个步长，避免节点落到原点附近。
//!
//! |z| >= 1 时直接用递推。

use num_complex::Complex64;
use std::f64::consts::PI;

/// 围道半径
const CONTOUR_RADIUS: f64 = 1.0;

/// 标量 φ 函数求值器
#[derive(Debug, Clone)]
pub struct PhiEvaluator {
    contour_points: usize,
}

impl Default for PhiEvaluator {
    fn default() -> Self {
        Self::new(32)
    }
}

impl PhiEvaluator {
    /// 创建求值器，`contour_points` 为围道节点数
    pub fn new(contour_points: usize) -> Self {
        Self {
            contour_points: contour_points.max(8),
        }
    }

    /// 围道节点数
    pub fn contour_points(&self) -> usize {
        self.contour_points
    }

    /// 计算 `[φ0(z), …, φp(z)]` 写入 `out`（长度 p+1）
    pub fn phi_all(&self, z: Complex64, out: &mut [Complex64]) {
        if z.norm() >= CONTOUR_RADIUS {
            recurrence(z, out);
            return;
        }

        let p = out.len().saturating_sub(1);
        let m = self.contour_points;
        // 以 -z 方向为基准错开半步
        let base = if z.norm() > 0.0 { (-z).arg() } else { 0.0 };
        let mut acc = vec![Complex64::new(0.0, 0.0); p + 1];
        let mut tmp = vec![Complex64::new(0.0, 0.0); p + 1];
        for j in 0..m {
            let theta = base + PI * (2 * j + 1) as f64 / m as f64;
            let w = z + Complex64::from_polar(CONTOUR_RADIUS, theta);
            recurrence(w, &mut tmp);
            for (a, t) in acc.iter_mut().zip(tmp.iter()) {
                *a += t;
            }
        }
        let inv = 1.0 / m as f64;
        for (o, a) in out.iter_mut().zip(acc.iter()) {
            *o = a * inv;
        }
        // φ0 直接求指数
        out[0] = z.exp();
    }

    /// 单个 φ_k(z)
    pub fn phi(&self, k: usize, z: Complex64) -> Complex64 {
        let mut out = vec![Complex64::new(0.0, 0.0); k + 1];
        self.phi_all(z, &mut out);
        out[k]
    }
}

/// 显式递推，`out[k] = φ_k(z)`
fn recurrence(z: Complex64, out: &mut [Complex64]) {
    if out.is_empty() {
        return;
    }
    out[0] = z.exp();
    let mut inv_fact = 1.0;
    for k in 1..out.len() {
        out[k] = (out[k - 1] - inv_fact) / z;
        inv_fact /= k as f64;
    }
}

/// `φ_k(0) = 1/k!`
pub fn phi_at_zero(k: usize) -> f64 {
    (1..=k).fold(1.0, |acc, j| acc / j as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Taylor 级数参考值（仅用于小 |z|）
    fn taylor(k: usize, z: Complex64) -> Complex64 {
        let mut sum = Complex64::new(0.0, 0.0);
        let mut term = Complex64::new(phi_at_zero(k), 0.0);
        for j in 0..60 {
            sum += term;
            term = term * z / (j + k + 1) as f64;
        }
        sum
    }

    #[test]
    fn test_phi_at_zero() {
        let ev = PhiEvaluator::default();
        let z = Complex64::new(0.0, 0.0);
        assert!((ev.phi(1, z) - 1.0).norm() < 1e-15);
        assert!((ev.phi(2, z) - 0.5).norm() < 1e-15);
        assert!((ev.phi(4, z) - 1.0 / 24.0).norm() < 1e-15);
    }

    #[test]
    fn test_small_z_matches_taylor() {
        let ev = PhiEvaluator::default();
        for &mag in &[1e-12, 1e-8, 1e-4, 1e-2, 0.3, 0.9] {
            for &dir in &[1.0, -1.0] {
                for &(re, im) in &[(1.0, 0.0), (0.0, 1.0), (0.6, 0.8)] {
                    let z = Complex64::new(re * mag * dir, im * mag * dir);
                    for k in 1..=4 {
                        let r = taylor(k, z);
                        let v = ev.phi(k, z);
                        assert!(
                            (v - r).norm() <= 1e-10 * r.norm(),
                            "φ{}({}) = {} vs {}",
                            k,
                            z,
                            v,
                            r
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_large_negative_z() {
        let ev = PhiEvaluator::default();
        for &mag in &[1.0, 10.0, 1e2, 1e4] {
            let z = Complex64::new(-mag, 0.0);
            // 大 |z| 时 φ_k(z) ≈ -1/((k-1)! z) 的主项
            let phi1 = ev.phi(1, z);
            let exact = (z.exp() - 1.0) / z;
            assert!((phi1 - exact).norm() <= 1e-14 * exact.norm());
            if mag >= 1e2 {
                let phi2 = ev.phi(2, z);
                let lead = -1.0 / z;
                assert!((phi2 - lead).norm() <= 2.0 / (mag * mag));
            }
        }
    }

    #[test]
    fn test_imaginary_axis() {
        let ev = PhiEvaluator::default();
        let z = Complex64::new(0.0, 1e3);
        let phi1 = ev.phi(1, z);
        let exact = (z.exp() - 1.0) / z;
        assert!((phi1 - exact).norm() < 1e-15);
        assert!(ev.phi(3, z).norm() < 2e-3);
    }

    #[test]
    fn test_transition_continuity() {
        // |z| = 1 两侧结果一致
        let ev = PhiEvaluator::default();
        let inside = Complex64::new(-0.999_999_9, 0.0);
        let outside = Complex64::new(-1.000_000_1, 0.0);
        for k in 1..=4 {
            let a = ev.phi(k, inside);
            let b = ev.phi(k, outside);
            assert!((a - b).norm() < 1e-6, "φ{} 在 |z|=1 处不连续", k);
        }
    }
}
