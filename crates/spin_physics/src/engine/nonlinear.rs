// crates/spin_physics/src/engine/nonlinear.rs

//! 非线性项求值
//!
//! 谱状态 -> 逆变换到物理空间 -> 逐点求值（rayon 并行）-> 正变换
//! -> 可选的对角谱乘子 -> 可选的 2/3 去混叠。
//! 只有算子请求梯度时才额外做 `m × dim` 次逆变换。

use crate::engine::multiplier::{evaluate_symbol, gradient_multiplier};
use crate::error::SolveResult;
use crate::operator::{OperatorSpec, PointInput, PointwiseFn};
use num_complex::Complex64;
use rayon::prelude::*;
use spin_spectral::{dealias_mask, Grid, SpectralState, Transform};

/// 非线性项求值器（持有工作缓冲区）
pub struct NonlinearEvaluator {
    pointwise: Option<PointwiseFn>,
    n_components: usize,
    dim: usize,
    transform: Transform,
    points: Vec<[f64; 3]>,
    multipliers: Option<Vec<Vec<Complex64>>>,
    gradient_ops: Option<Vec<Vec<Complex64>>>,
    mask: Option<Vec<bool>>,
    /// 物理空间分量
    physical: Vec<Vec<Complex64>>,
    /// 梯度，`gradients[c * dim + axis]`
    gradients: Vec<Vec<Complex64>>,
    /// 逐点结果，按点排列 `[point * m + c]`
    pointwise_out: Vec<Complex64>,
    evaluations: u64,
}

impl NonlinearEvaluator {
    /// 为算子和网格创建求值器
    pub fn new(operator: &OperatorSpec, grid: &Grid, dealias: bool) -> Self {
        let nonlinear = operator.nonlinear();
        let m = operator.n_components();
        let dim = grid.dim();
        let len = grid.len();
        let needs_gradient = nonlinear.needs_gradient() && !nonlinear.is_zero();

        let multipliers = nonlinear
            .spectral_multipliers()
            .map(|syms| syms.iter().map(|s| evaluate_symbol(s, grid)).collect());
        let gradient_ops =
            needs_gradient.then(|| (0..dim).map(|a| gradient_multiplier(grid, a)).collect());
        let gradients = if needs_gradient {
            vec![vec![Complex64::new(0.0, 0.0); len]; m * dim]
        } else {
            Vec::new()
        };

        Self {
            pointwise: nonlinear.pointwise_fn().cloned(),
            n_components: m,
            dim,
            transform: grid.transform(),
            points: (0..len).map(|f| grid.point(f)).collect(),
            multipliers,
            gradient_ops,
            mask: dealias.then(|| dealias_mask(grid)),
            physical: vec![vec![Complex64::new(0.0, 0.0); len]; m],
            gradients,
            pointwise_out: vec![Complex64::new(0.0, 0.0); len * m],
            evaluations: 0,
        }
    }

    /// 非线性项是否恒为零
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.pointwise.is_none()
    }

    /// 已求值次数
    #[inline]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// 计算 `out = N̂(v)`
    pub fn evaluate(&mut self, v: &SpectralState, out: &mut SpectralState) -> SolveResult<()> {
        let pointwise = match &self.pointwise {
            Some(f) => f,
            None => {
                out.fill_zero();
                return Ok(());
            }
        };
        self.evaluations += 1;
        let m = self.n_components;
        let dim = self.dim;

        for (c, phys) in self.physical.iter_mut().enumerate() {
            phys.copy_from_slice(v.component(c));
            self.transform.inverse_in_place(phys);
        }

        if let Some(ops) = &self.gradient_ops {
            for c in 0..m {
                for (axis, op) in ops.iter().enumerate() {
                    let buf = &mut self.gradients[c * dim + axis];
                    buf.par_iter_mut()
                        .zip(v.component(c).par_iter().zip(op.par_iter()))
                        .for_each(|(g, (x, d))| *g = x * d);
                    self.transform.inverse_in_place(buf);
                }
            }
        }

        let physical = &self.physical;
        let gradients = &self.gradients;
        let points = &self.points;
        let n_grad = gradients.len();
        self.pointwise_out
            .par_chunks_mut(m)
            .enumerate()
            .for_each_init(
                || {
                    (
                        vec![Complex64::new(0.0, 0.0); m],
                        vec![Complex64::new(0.0, 0.0); n_grad],
                    )
                },
                |(u, g), (f, res)| {
                    for c in 0..m {
                        u[c] = physical[c][f];
                    }
                    for (slot, grad) in g.iter_mut().zip(gradients.iter()) {
                        *slot = grad[f];
                    }
                    let input = PointInput {
                        x: &points[f][..dim],
                        u,
                        grad: g,
                    };
                    pointwise(&input, res);
                },
            );

        for c in 0..m {
            let dst = out.component_mut(c);
            for (f, d) in dst.iter_mut().enumerate() {
                *d = self.pointwise_out[f * m + c];
            }
            self.transform.forward_in_place(dst);
        }

        if let Some(mult) = &self.multipliers {
            for (c, values) in mult.iter().enumerate() {
                out.component_mut(c)
                    .par_iter_mut()
                    .zip(values.par_iter())
                    .for_each(|(d, s)| *d *= s);
            }
        }

        if let Some(mask) = &self.mask {
            for c in 0..m {
                out.component_mut(c)
                    .par_iter_mut()
                    .zip(mask.par_iter())
                    .for_each(|(d, &keep)| {
                        if !keep {
                            *d = Complex64::new(0.0, 0.0);
                        }
                    });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{symbols, LinearPart, NonlinearPart};
    use spin_spectral::{Domain, PhysicalState};
    use std::f64::consts::PI;

    fn grid() -> Grid {
        Grid::new(Domain::interval(0.0, 2.0 * PI).unwrap(), 32).unwrap()
    }

    fn spectral_of(g: &Grid, f: impl Fn(f64) -> f64) -> SpectralState {
        let u = PhysicalState::from_real(vec![g.coordinates(0).iter().map(|&x| f(x)).collect()])
            .unwrap();
        g.transform().to_spectral(&u).unwrap()
    }

    #[test]
    fn test_conservative_burgers_term() {
        // -½(u²)_x 对 u = sin x 等于 -sin x cos x
        let g = grid();
        let op = OperatorSpec::new(
            g.domain().clone(),
            LinearPart::scalar(symbols::zero()),
            NonlinearPart::scalar(|u| u * u)
                .then_multiply(vec![symbols::scaled(-0.5, symbols::diff(0, 1))]),
        )
        .unwrap();
        let mut ev = NonlinearEvaluator::new(&op, &g, false);
        let v = spectral_of(&g, |x| x.sin());
        let mut out = SpectralState::zeros(1, g.len());
        ev.evaluate(&v, &mut out).unwrap();
        let phys = g.transform().to_physical(&out).unwrap();
        for (j, &x) in g.coordinates(0).iter().enumerate() {
            let expected = -x.sin() * x.cos();
            assert!((phys.component(0)[j].re - expected).abs() < 1e-12);
        }
        assert_eq!(ev.evaluations(), 1);
    }

    #[test]
    fn test_gradient_input() {
        // N = u · u_x
        let g = grid();
        let op = OperatorSpec::new(
            g.domain().clone(),
            LinearPart::scalar(symbols::zero()),
            NonlinearPart::with_gradient(1, |p, out| out[0] = p.u[0] * p.du(0, 0)),
        )
        .unwrap();
        let mut ev = NonlinearEvaluator::new(&op, &g, false);
        let v = spectral_of(&g, |x| x.cos());
        let mut out = SpectralState::zeros(1, g.len());
        ev.evaluate(&v, &mut out).unwrap();
        let phys = g.transform().to_physical(&out).unwrap();
        for (j, &x) in g.coordinates(0).iter().enumerate() {
            assert!((phys.component(0)[j].re + x.cos() * x.sin()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_position_dependent() {
        let g = grid();
        let op = OperatorSpec::new(
            g.domain().clone(),
            LinearPart::scalar(symbols::zero()),
            NonlinearPart::pointwise(1, |p, out| {
                out[0] = Complex64::new(p.x[0].cos(), 0.0) * p.u[0]
            }),
        )
        .unwrap();
        let mut ev = NonlinearEvaluator::new(&op, &g, false);
        let v = spectral_of(&g, |_| 2.0);
        let mut out = SpectralState::zeros(1, g.len());
        ev.evaluate(&v, &mut out).unwrap();
        let phys = g.transform().to_physical(&out).unwrap();
        assert!((phys.component(0)[0].re - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_dealias_removes_high_modes() {
        let g = grid();
        let op = OperatorSpec::new(
            g.domain().clone(),
            LinearPart::scalar(symbols::zero()),
            NonlinearPart::scalar(|u| u * u),
        )
        .unwrap();
        let mut ev = NonlinearEvaluator::new(&op, &g, true);
        let v = spectral_of(&g, |x| (6.0 * x).cos());
        let mut out = SpectralState::zeros(1, g.len());
        ev.evaluate(&v, &mut out).unwrap();
        // cos²(6x) = ½ + ½cos(12x)，|k| = 12 > 32/3 被去除
        assert!(out.component(0)[12].norm() < 1e-12);
        assert!((out.component(0)[0].re - 16.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_nonlinearity() {
        let g = grid();
        let op = OperatorSpec::new(
            g.domain().clone(),
            LinearPart::scalar(symbols::laplacian()),
            NonlinearPart::zero(1),
        )
        .unwrap();
        let mut ev = NonlinearEvaluator::new(&op, &g, false);
        assert!(ev.is_zero());
        let v = spectral_of(&g, |x| x.sin());
        let mut out = SpectralState::zeros(1, g.len());
        ev.evaluate(&v, &mut out).unwrap();
        assert_eq!(out.max_abs(), 0.0);
        assert_eq!(ev.evaluations(), 0);
    }
}
