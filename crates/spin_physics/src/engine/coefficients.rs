// crates/spin_physics/src/engine/coefficients.rs

//! 每个步长的积分系数
//!
//! 对给定步长 h，先对每个不同的节点 c 计算 `φ_0..φ_p(c h L)` 表
//! （对角情形逐分量逐波数用标量求值器，块情形逐波数用增广矩阵指数），
//! 再按系数表把 `a_ij`、`b_i` 线性组合成 [`ModeOperator`] 并乘以 h。
//! 结果按步长缓存，输出区间内步长相同的步共享同一组系数。

use crate::engine::matrix::{extend_row_major, phi_block, CMatrix};
use crate::engine::multiplier::LinearValues;
use crate::engine::phi::{phi_at_zero, PhiEvaluator};
use crate::engine::scheme::{Combination, Tableau};
use crate::error::{SolveError, SolveResult};
use num_complex::Complex64;
use rayon::prelude::*;
use spin_spectral::SpectralState;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// 逐波数作用的线性算子
#[derive(Debug, Clone)]
pub enum ModeOperator {
    /// `values[c][mode]`
    Diagonal(Vec<Vec<Complex64>>),
    /// `data[mode * m * m + i * m + j]`
    Block {
        /// 分量数
        m: usize,
        /// 行主序，按波数排列
        data: Vec<Complex64>,
    },
}

impl ModeOperator {
    fn zeros_like(values: &LinearValues) -> Self {
        let len = values.len();
        match values {
            LinearValues::Diagonal(v) => {
                Self::Diagonal(vec![vec![Complex64::new(0.0, 0.0); len]; v.len()])
            }
            LinearValues::Block { m, .. } => Self::Block {
                m: *m,
                data: vec![Complex64::new(0.0, 0.0); len * m * m],
            },
        }
    }

    /// `self += w · other`
    fn add_scaled(&mut self, w: f64, other: &Self) {
        match (self, other) {
            (Self::Diagonal(a), Self::Diagonal(b)) => {
                for (ac, bc) in a.iter_mut().zip(b.iter()) {
                    ac.par_iter_mut()
                        .zip(bc.par_iter())
                        .for_each(|(x, y)| *x += y * w);
                }
            }
            (Self::Block { data: a, .. }, Self::Block { data: b, .. }) => {
                a.par_iter_mut()
                    .zip(b.par_iter())
                    .for_each(|(x, y)| *x += y * w);
            }
            _ => {}
        }
    }

    /// `self += w · I`
    fn add_identity(&mut self, w: f64) {
        match self {
            Self::Diagonal(a) => {
                for ac in a.iter_mut() {
                    ac.par_iter_mut().for_each(|x| *x += w);
                }
            }
            Self::Block { m, data } => {
                let m = *m;
                data.par_chunks_mut(m * m).for_each(|blk| {
                    for i in 0..m {
                        blk[i * m + i] += w;
                    }
                });
            }
        }
    }

    fn scale(&mut self, h: f64) {
        match self {
            Self::Diagonal(a) => {
                for ac in a.iter_mut() {
                    ac.par_iter_mut().for_each(|x| *x *= h);
                }
            }
            Self::Block { data, .. } => data.par_iter_mut().for_each(|x| *x *= h),
        }
    }

    /// 所有元素是否有限
    pub fn is_finite(&self) -> bool {
        let finite = |z: &Complex64| z.re.is_finite() && z.im.is_finite();
        match self {
            Self::Diagonal(a) => a.iter().all(|c| c.par_iter().all(finite)),
            Self::Block { data, .. } => data.par_iter().all(finite),
        }
    }

    /// `out = A · input`，`accumulate` 为真时 `out += A · input`
    pub fn apply(&self, input: &SpectralState, out: &mut SpectralState, accumulate: bool) {
        match self {
            Self::Diagonal(a) => {
                for ((ac, src), dst) in a
                    .iter()
                    .zip(input.components().iter())
                    .zip(out.components_mut().iter_mut())
                {
                    dst.par_iter_mut()
                        .zip(ac.par_iter().zip(src.par_iter()))
                        .for_each(|(d, (x, s))| {
                            if accumulate {
                                *d += x * s;
                            } else {
                                *d = x * s;
                            }
                        });
                }
            }
            Self::Block { m, data } => {
                let m = *m;
                let len = input.len();
                let mut result = vec![Complex64::new(0.0, 0.0); len * m];
                result
                    .par_chunks_mut(m)
                    .zip(data.par_chunks(m * m))
                    .enumerate()
                    .for_each(|(mode, (res, blk))| {
                        for i in 0..m {
                            let mut acc = Complex64::new(0.0, 0.0);
                            for j in 0..m {
                                acc += blk[i * m + j] * input.component(j)[mode];
                            }
                            res[i] = acc;
                        }
                    });
                for (c, dst) in out.components_mut().iter_mut().enumerate() {
                    for (mode, d) in dst.iter_mut().enumerate() {
                        let v = result[mode * m + c];
                        if accumulate {
                            *d += v;
                        } else {
                            *d = v;
                        }
                    }
                }
            }
        }
    }
}

/// 某一节点 c 的 `φ_0..φ_p(c h L)` 表
struct PhiTable {
    c: f64,
    by_k: Vec<ModeOperator>,
}

fn build_phi_table(
    values: &LinearValues,
    c: f64,
    h: f64,
    p: usize,
    evaluator: &PhiEvaluator,
) -> PhiTable {
    let scale = c * h;
    let by_k = match values {
        LinearValues::Diagonal(v) => {
            // per_comp[comp][mode] = [φ0..φp]
            let per_comp: Vec<Vec<Vec<Complex64>>> = v
                .iter()
                .map(|comp| {
                    comp.par_iter()
                        .map(|&l| {
                            let mut out = vec![Complex64::new(0.0, 0.0); p + 1];
                            evaluator.phi_all(l * scale, &mut out);
                            out
                        })
                        .collect()
                })
                .collect();
            (0..=p)
                .map(|k| {
                    ModeOperator::Diagonal(
                        per_comp
                            .iter()
                            .map(|comp| comp.iter().map(|phis| phis[k]).collect())
                            .collect(),
                    )
                })
                .collect()
        }
        LinearValues::Block { m, matrices } => {
            let m = *m;
            let per_mode: Vec<Vec<CMatrix>> = matrices
                .par_iter()
                .map(|a| phi_block(&(a * Complex64::new(scale, 0.0)), p))
                .collect();
            (0..=p)
                .map(|k| {
                    let mut data = Vec::with_capacity(per_mode.len() * m * m);
                    for phis in &per_mode {
                        extend_row_major(&phis[k], &mut data);
                    }
                    ModeOperator::Block { m, data }
                })
                .collect()
        }
    };
    PhiTable { c, by_k }
}

/// 一个步长的全部系数
#[derive(Debug, Clone)]
pub struct StepCoefficients {
    h: f64,
    /// `e^{c_i Z}`，`c_i = 0` 时为 `None`（恒等）
    stage_exp: Vec<Option<ModeOperator>>,
    /// `h · a_ij(Z)`，零项为 `None`
    a: Vec<Vec<Option<ModeOperator>>>,
    /// `e^{Z}`
    full_exp: ModeOperator,
    /// `h · b_i(Z)`
    b: Vec<Option<ModeOperator>>,
}

impl StepCoefficients {
    /// 为步长 h 构造系数
    ///
    /// 不检查有限性：`e^{hL}` 溢出时结果含非有限值，由调用方用
    /// [`StepCoefficients::is_finite`] 判断。
    pub fn build(
        tableau: &Tableau,
        values: &LinearValues,
        h: f64,
        evaluator: &PhiEvaluator,
    ) -> SolveResult<Self> {
        let p = tableau.max_phi_index();

        let mut nodes: Vec<f64> = tableau
            .all_terms()
            .iter()
            .map(|term| term.c)
            .filter(|&c| c != 0.0)
            .collect();
        nodes.sort_by(|a, b| a.total_cmp(b));
        nodes.dedup();

        let tables: Vec<PhiTable> = nodes
            .iter()
            .map(|&c| build_phi_table(values, c, h, p, evaluator))
            .collect();

        let combine = |comb: &Combination, scale: f64| -> Option<ModeOperator> {
            if comb.is_empty() {
                return None;
            }
            let mut op = ModeOperator::zeros_like(values);
            for term in comb {
                if term.c == 0.0 {
                    op.add_identity(term.weight * phi_at_zero(term.k));
                } else if let Some(table) = tables.iter().find(|tb| tb.c == term.c) {
                    op.add_scaled(term.weight, &table.by_k[term.k]);
                }
            }
            op.scale(scale);
            Some(op)
        };

        let exp_at = |c: f64| -> Option<ModeOperator> {
            if c == 0.0 {
                None
            } else {
                tables
                    .iter()
                    .find(|tb| tb.c == c)
                    .map(|tb| tb.by_k[0].clone())
            }
        };

        let stage_exp: Vec<Option<ModeOperator>> =
            tableau.nodes.iter().map(|&c| exp_at(c)).collect();
        let a: Vec<Vec<Option<ModeOperator>>> = tableau
            .a
            .iter()
            .map(|row| row.iter().map(|comb| combine(comb, h)).collect())
            .collect();
        let b: Vec<Option<ModeOperator>> = tableau.b.iter().map(|comb| combine(comb, h)).collect();
        let full_exp = exp_at(1.0).ok_or_else(|| {
            SolveError::invalid_operator("系数表缺少 e^{hL} 项")
        })?;

        debug!(
            "构造积分系数: scheme={}, h={:.3e}, 节点数={}, φ 最高阶={}",
            tableau.name,
            h,
            nodes.len(),
            p
        );
        Ok(Self {
            h,
            stage_exp,
            a,
            full_exp,
            b,
        })
    }

    /// 所有系数是否有限
    pub fn is_finite(&self) -> bool {
        self.full_exp.is_finite()
            && self.stage_exp.iter().flatten().all(ModeOperator::is_finite)
            && self.a.iter().flatten().flatten().all(ModeOperator::is_finite)
            && self.b.iter().flatten().all(ModeOperator::is_finite)
    }

    /// 步长
    #[inline]
    pub fn h(&self) -> f64 {
        self.h
    }

    /// 第 i 级的 `e^{c_i Z}`
    #[inline]
    pub fn stage_exp(&self, i: usize) -> Option<&ModeOperator> {
        self.stage_exp[i].as_ref()
    }

    /// `h · a_ij`
    #[inline]
    pub fn a(&self, i: usize, j: usize) -> Option<&ModeOperator> {
        self.a[i][j].as_ref()
    }

    /// `e^{Z}`
    #[inline]
    pub fn full_exp(&self) -> &ModeOperator {
        &self.full_exp
    }

    /// `h · b_i`
    #[inline]
    pub fn b(&self, i: usize) -> Option<&ModeOperator> {
        self.b[i].as_ref()
    }
}

/// 按步长缓存系数
pub struct CoefficientCache {
    tableau: Arc<Tableau>,
    values: Arc<LinearValues>,
    evaluator: PhiEvaluator,
    entries: HashMap<u64, Arc<StepCoefficients>>,
    /// 插入顺序，满时淘汰最早的步长
    order: VecDeque<u64>,
}

impl CoefficientCache {
    /// 最多缓存的步长个数
    pub const CAPACITY: usize = 16;

    /// 创建缓存
    pub fn new(tableau: Arc<Tableau>, values: Arc<LinearValues>, evaluator: PhiEvaluator) -> Self {
        Self {
            tableau,
            values,
            evaluator,
            entries: HashMap::new(),
            order: VecDeque::with_capacity(Self::CAPACITY),
        }
    }

    /// 取出或构造步长 h 的系数
    ///
    /// 系数出现非有限值（`e^{hL}` 溢出）时返回 `Ok(None)`，不缓存。
    pub fn get(&mut self, h: f64) -> SolveResult<Option<Arc<StepCoefficients>>> {
        let key = h.to_bits();
        if let Some(c) = self.entries.get(&key) {
            return Ok(Some(Arc::clone(c)));
        }
        let coeffs = StepCoefficients::build(&self.tableau, &self.values, h, &self.evaluator)?;
        if !coeffs.is_finite() {
            debug!("步长 h={:.3e} 下指数系数溢出", h);
            return Ok(None);
        }
        if self.entries.len() >= Self::CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        let coeffs = Arc::new(coeffs);
        self.entries.insert(key, Arc::clone(&coeffs));
        self.order.push_back(key);
        Ok(Some(coeffs))
    }

    /// 是否已缓存步长 h
    pub fn contains(&self, h: f64) -> bool {
        self.entries.contains_key(&h.to_bits())
    }

    /// 已缓存的步长个数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 缓存是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
