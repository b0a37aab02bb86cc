// crates/spin_physics/src/engine/multiplier.rs

//! 谱微分乘子
//!
//! 把傅里叶符号在网格的全部波矢量上求值。Nyquist 下标对应 `-k_N`，
//! 但离散数据无法区分 `±k_N`，因此在每个 Nyquist 维上对两种符号取平均：
//! 奇数阶导数在那里为零，实问题保持为实。

use crate::engine::matrix::{from_row_major, CMatrix};
use crate::operator::{BlockSymbol, LinearPart, Symbol};
use num_complex::Complex64;
use rayon::prelude::*;
use spin_spectral::Grid;

/// 线性部分在网格上的取值
#[derive(Debug, Clone)]
pub enum LinearValues {
    /// `values[c][mode]`
    Diagonal(Vec<Vec<Complex64>>),
    /// 每个波数一个 m×m 矩阵
    Block {
        /// 分量数
        m: usize,
        /// `matrices[mode]`
        matrices: Vec<CMatrix>,
    },
}

impl LinearValues {
    /// 分量数
    pub fn n_components(&self) -> usize {
        match self {
            Self::Diagonal(v) => v.len(),
            Self::Block { m, .. } => *m,
        }
    }

    /// 波数个数
    pub fn len(&self) -> usize {
        match self {
            Self::Diagonal(v) => v.first().map_or(0, Vec::len),
            Self::Block { matrices, .. } => matrices.len(),
        }
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 所有取值是否有限
    pub fn is_finite(&self) -> bool {
        let finite = |z: &Complex64| z.re.is_finite() && z.im.is_finite();
        match self {
            Self::Diagonal(v) => v.iter().all(|c| c.par_iter().all(finite)),
            Self::Block { matrices, .. } => {
                matrices.par_iter().all(|a| a.iter().all(finite))
            }
        }
    }
}

/// 对 Nyquist 维的全部符号组合取平均
fn nyquist_average<F>(grid: &Grid, flat: usize, mut eval: F)
where
    F: FnMut(&[f64], f64),
{
    let dim = grid.dim();
    let k = grid.wavevector(flat);
    let nyq = grid.nyquist_axes(flat);
    let axes: Vec<usize> = (0..dim).filter(|&a| nyq[a]).collect();
    let combos = 1usize << axes.len();
    let weight = 1.0 / combos as f64;
    let mut kv = [0.0; 3];
    for mask in 0..combos {
        kv[..dim].copy_from_slice(&k[..dim]);
        for (bit, &a) in axes.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                kv[a] = -kv[a];
            }
        }
        eval(&kv[..dim], weight);
    }
}

/// 在全部波数上求标量符号
pub fn evaluate_symbol(symbol: &Symbol, grid: &Grid) -> Vec<Complex64> {
    (0..grid.len())
        .into_par_iter()
        .map(|flat| {
            let mut acc = Complex64::new(0.0, 0.0);
            nyquist_average(grid, flat, |k, w| acc += symbol(k) * w);
            acc
        })
        .collect()
}

/// 在全部波数上求块符号
pub fn evaluate_block(symbol: &BlockSymbol, m: usize, grid: &Grid) -> Vec<CMatrix> {
    (0..grid.len())
        .into_par_iter()
        .map(|flat| {
            let mut acc = vec![Complex64::new(0.0, 0.0); m * m];
            let mut buf = vec![Complex64::new(0.0, 0.0); m * m];
            nyquist_average(grid, flat, |k, w| {
                buf.iter_mut().for_each(|v| *v = Complex64::new(0.0, 0.0));
                symbol(k, &mut buf);
                for (a, b) in acc.iter_mut().zip(buf.iter()) {
                    *a += b * w;
                }
            });
            from_row_major(m, &acc)
        })
        .collect()
}

/// 线性部分在网格上的取值
pub fn evaluate_linear(linear: &LinearPart, grid: &Grid) -> LinearValues {
    match linear {
        LinearPart::Diagonal(symbols) => LinearValues::Diagonal(
            symbols.iter().map(|s| evaluate_symbol(s, grid)).collect(),
        ),
        LinearPart::Coupled {
            n_components,
            symbol,
        } => LinearValues::Block {
            m: *n_components,
            matrices: evaluate_block(symbol, *n_components, grid),
        },
    }
}

/// 梯度乘子 `i k_axis`（Nyquist 维上为零）
pub fn gradient_multiplier(grid: &Grid, axis: usize) -> Vec<Complex64> {
    (0..grid.len())
        .into_par_iter()
        .map(|flat| {
            if grid.nyquist_axes(flat)[axis] {
                Complex64::new(0.0, 0.0)
            } else {
                Complex64::new(0.0, grid.wavevector(flat)[axis])
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::symbols;
    use spin_spectral::Domain;
    use std::f64::consts::PI;

    fn grid_1d(n: usize) -> Grid {
        Grid::new(Domain::interval(0.0, 2.0 * PI).unwrap(), n).unwrap()
    }

    #[test]
    fn test_odd_derivative_zero_at_nyquist() {
        let g = grid_1d(8);
        let v = evaluate_symbol(&symbols::diff(0, 1), &g);
        assert_eq!(v[4], Complex64::new(0.0, 0.0));
        assert!((v[1] - Complex64::new(0.0, 1.0)).norm() < 1e-14);
        assert!((v[7] - Complex64::new(0.0, -1.0)).norm() < 1e-14);
        let v3 = evaluate_symbol(&symbols::diff(0, 3), &g);
        assert!(v3[4].norm() < 1e-12);
    }

    #[test]
    fn test_even_derivative_unchanged_at_nyquist() {
        let g = grid_1d(8);
        let v = evaluate_symbol(&symbols::diff(0, 2), &g);
        assert!((v[4] - Complex64::new(-16.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_2d_corner_average() {
        let g = Grid::new(Domain::square(0.0, 2.0 * PI).unwrap(), 4).unwrap();
        // k_x k_y 在 (Nyquist, Nyquist) 处四种符号组合平均为零
        let s = symbols::from_fn(|k| Complex64::new(k[0] * k[1], 0.0));
        let v = evaluate_symbol(&s, &g);
        let corner = g.flat_index(&[2, 2]);
        assert!(v[corner].norm() < 1e-14);
        let inner = g.flat_index(&[1, 1]);
        assert!((v[inner].re - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_block_evaluation() {
        let g = grid_1d(4);
        let linear = LinearPart::coupled(2, |k, out| {
            out[1] = Complex64::new(-1.0, 0.0);
            out[2] = Complex64::new(1.0, 0.0);
            out[3] = Complex64::new(-k[0] * k[0], 0.0);
        });
        let vals = evaluate_linear(&linear, &g);
        assert_eq!(vals.n_components(), 2);
        assert_eq!(vals.len(), 4);
        if let LinearValues::Block { matrices, .. } = vals {
            assert_eq!(matrices[1][(1, 1)], Complex64::new(-1.0, 0.0));
            assert_eq!(matrices[1][(0, 1)], Complex64::new(-1.0, 0.0));
        } else {
            panic!("应为块形式");
        }
    }

    #[test]
    fn test_gradient_multiplier() {
        let g = grid_1d(8);
        let d = gradient_multiplier(&g, 0);
        assert_eq!(d[4], Complex64::new(0.0, 0.0));
        assert!((d[3] - Complex64::new(0.0, 3.0)).norm() < 1e-14);
    }
}
