// crates/spin_physics/src/engine/matrix.rs

//! 耦合线性部分的小型稠密复矩阵
//!
//! 耦合线性部分在每个波数上是一个 m×m 矩阵（m 为分量数，通常不超过 3），
//! 用 `nalgebra::DMatrix<Complex64>` 表示，矩阵指数直接用 `DMatrix::exp`。
//!
//! ## 块 φ 函数
//!
//! 对增广矩阵
//!
//! ```text
//! W = [ A  I  0 … 0 ]
//!     [ 0  0  I … 0 ]
//!     [ …        … I ]
//!     [ 0  0  0 … 0 ]
//! ```
//!
//! 有 `exp(W)` 的第一块行为 `[e^A, φ1(A), …, φp(A)]`。

use nalgebra::DMatrix;
use num_complex::Complex64;
use num_traits::One;

/// m×m 复矩阵
pub type CMatrix = DMatrix<Complex64>;

/// 由行主序数据构造 m×m 矩阵
///
/// `data` 长度须为 m²。
pub fn from_row_major(m: usize, data: &[Complex64]) -> CMatrix {
    CMatrix::from_row_slice(m, m, data)
}

/// 按行主序追加矩阵元素
pub fn extend_row_major(a: &CMatrix, out: &mut Vec<Complex64>) {
    for row in a.row_iter() {
        out.extend(row.iter().copied());
    }
}

/// 块 φ 函数 `[φ0(A), φ1(A), …, φp(A)]`，`φ0 = e^A`
pub fn phi_block(a: &CMatrix, p: usize) -> Vec<CMatrix> {
    let m = a.nrows();
    if p == 0 {
        return vec![a.exp()];
    }
    let size = m * (p + 1);
    let mut w = CMatrix::zeros(size, size);
    w.view_mut((0, 0), (m, m)).copy_from(a);
    for blk in 0..p {
        for i in 0..m {
            w[(blk * m + i, (blk + 1) * m + i)] = Complex64::one();
        }
    }
    let e = w.exp();
    (0..=p)
        .map(|k| e.view((0, k * m), (m, m)).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_row_major_layout() {
        let a = from_row_major(2, &[c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0), c(4.0, 0.0)]);
        assert_eq!(a[(0, 1)], c(2.0, 0.0));
        assert_eq!(a[(1, 0)], c(3.0, 0.0));
        let mut flat = Vec::new();
        extend_row_major(&a, &mut flat);
        assert_eq!(flat, vec![c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0), c(4.0, 0.0)]);
    }

    #[test]
    fn test_rotation_exponential() {
        // [[0, -θ], [θ, 0]] 的指数是旋转矩阵
        let theta = 2.5;
        let a = from_row_major(2, &[c(0.0, 0.0), c(-theta, 0.0), c(theta, 0.0), c(0.0, 0.0)]);
        let e = phi_block(&a, 0).remove(0);
        assert!((e[(0, 0)].re - theta.cos()).abs() < 1e-13);
        assert!((e[(0, 1)].re + theta.sin()).abs() < 1e-13);
        assert!((e[(1, 0)].re - theta.sin()).abs() < 1e-13);
    }

    #[test]
    fn test_phi_block_scalar_consistency() {
        let z = c(-2.0, 1.0);
        let a = from_row_major(1, &[z]);
        let phis = phi_block(&a, 3);
        let phi1 = (z.exp() - 1.0) / z;
        let phi2 = (phi1 - 1.0) / z;
        let phi3 = (phi2 - 0.5) / z;
        assert!((phis[0][(0, 0)] - z.exp()).norm() < 1e-13);
        assert!((phis[1][(0, 0)] - phi1).norm() < 1e-13);
        assert!((phis[2][(0, 0)] - phi2).norm() < 1e-13);
        assert!((phis[3][(0, 0)] - phi3).norm() < 1e-13);
    }

    #[test]
    fn test_phi_block_zero_matrix() {
        let phis = phi_block(&CMatrix::zeros(2, 2), 2);
        assert!((phis[1][(0, 0)] - c(1.0, 0.0)).norm() < 1e-14);
        assert!((phis[2][(1, 1)] - c(0.5, 0.0)).norm() < 1e-14);
        assert!(phis[2][(0, 1)].norm() < 1e-14);
    }
}
