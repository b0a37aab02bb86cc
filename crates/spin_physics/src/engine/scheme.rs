// crates/spin_physics/src/engine/scheme.rs

//! 指数 Runge-Kutta 格式的系数表
//!
//! ## 一般形式
//!
//! 记 `Z = hL`，`φ_{k,i} = φ_k(c_i Z)`：
//!
//! ```text
//! U_i  = e^{c_i Z} u_n + h Σ_{j<i} a_ij(Z) N(U_j)
//! u_n+1 = e^{Z} u_n + h Σ_i b_i(Z) N(U_i)
//! ```
//!
//! 每个 `a_ij`、`b_i` 是若干 `w · φ_k(c Z)` 之和（[`Term`] 的列表）。
//! `φ_0(cZ) = e^{cZ}`，`c = 0` 时 `φ_k(0) = 1/k!` 为单位阵的倍数。
//! 多数格式的第一列由行和条件 `Σ_j a_ij = c_i φ_1(c_i Z)` 与
//! `Σ_i b_i = φ_1(Z)` 给出。
//!
//! ## 参考文献
//!
//! 1. Cox, S. M., & Matthews, P. C. (2002). Exponential time differencing for
//!    stiff systems. J. Comput. Phys., 176(2), 430-455.
//! 2. Krogstad, S. (2005). Generalized integrating factor methods for stiff
//!    PDEs. J. Comput. Phys., 203(1), 72-88.
//! 3. Hochbruck, M., & Ostermann, A. (2005). Explicit exponential Runge-Kutta
//!    methods for semilinear parabolic problems. SIAM J. Numer. Anal., 43(3).
//! 4. Luan, V. T., & Ostermann, A. (2014). Explicit exponential Runge-Kutta
//!    methods of high order for parabolic problems. J. Comput. Appl. Math., 256.
//! 5. Kassam, A.-K., & Trefethen, L. N. (2005). Fourth-order time-stepping for
//!    stiff PDEs. SIAM J. Sci. Comput., 26(4), 1214-1233.

use crate::engine::phi::phi_at_zero;
use spin_config::SchemeName;

/// φ 函数项 `weight · φ_k(c Z)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    /// φ 函数下标
    pub k: usize,
    /// 节点缩放
    pub c: f64,
    /// 权重
    pub weight: f64,
}

/// φ 函数项之和
pub type Combination = Vec<Term>;

#[inline]
fn t(weight: f64, k: usize, c: f64) -> Term {
    Term { k, c, weight }
}

/// 行和条件确定的第一列：`c φ_1(cZ) - Σ others`
fn row_sum_first(c: f64, others: &[&Combination]) -> Combination {
    let mut out = vec![t(c, 1, c)];
    for comb in others {
        out.extend(comb.iter().map(|term| Term {
            weight: -term.weight,
            ..*term
        }));
    }
    out
}

/// 系数表
#[derive(Debug, Clone)]
pub struct Tableau {
    /// 格式名称
    pub name: SchemeName,
    /// 经典阶数
    pub order: u8,
    /// 节点 `c_i`
    pub nodes: Vec<f64>,
    /// `a[i][j]`，`j < i`；空列表表示零
    pub a: Vec<Vec<Combination>>,
    /// `b[i]`
    pub b: Vec<Combination>,
}

impl Tableau {
    /// 按名称查表
    pub fn for_scheme(name: SchemeName) -> Self {
        match name {
            SchemeName::Etdrk4 => Self::etdrk4(),
            SchemeName::Exprk5s8 => Self::exprk5s8(),
            SchemeName::Krogstad => Self::krogstad(),
            SchemeName::HochbruckOstermann => Self::hochbruck_ostermann(),
            SchemeName::Lawson4 => Self::lawson4(),
            SchemeName::Etd1 => Self::etd1(),
        }
    }

    /// 级数
    #[inline]
    pub fn stages(&self) -> usize {
        self.nodes.len()
    }

    /// 用到的最高 φ 下标
    pub fn max_phi_index(&self) -> usize {
        self.a
            .iter()
            .flatten()
            .chain(self.b.iter())
            .flatten()
            .map(|term| term.k)
            .max()
            .unwrap_or(1)
            .max(1)
    }

    /// 全部 `(k, c)` 项（含阶段指数 `φ_0(c_i Z)` 与 `φ_0(Z)`）
    pub fn all_terms(&self) -> Vec<Term> {
        let mut out: Vec<Term> = self
            .a
            .iter()
            .flatten()
            .chain(self.b.iter())
            .flatten()
            .copied()
            .collect();
        out.extend(self.nodes.iter().map(|&c| t(1.0, 0, c)));
        out.push(t(1.0, 0, 1.0));
        out
    }

    fn empty_rows(s: usize) -> Vec<Vec<Combination>> {
        (0..s).map(|i| vec![Vec::new(); i]).collect()
    }

    /// Cox-Matthews ETDRK4
    pub fn etdrk4() -> Self {
        let mut a = Self::empty_rows(4);
        a[1][0] = vec![t(0.5, 1, 0.5)];
        a[2][1] = vec![t(0.5, 1, 0.5)];
        a[3][0] = vec![t(1.0, 1, 1.0), t(-1.0, 1, 0.5)];
        a[3][2] = vec![t(1.0, 1, 0.5)];
        Self {
            name: SchemeName::Etdrk4,
            order: 4,
            nodes: vec![0.0, 0.5, 0.5, 1.0],
            a,
            b: Self::fourth_order_weights(),
        }
    }

    /// `b1 = φ1 - 3φ2 + 4φ3, b2 = b3 = 2φ2 - 4φ3, b4 = -φ2 + 4φ3`
    fn fourth_order_weights() -> Vec<Combination> {
        vec![
            vec![t(1.0, 1, 1.0), t(-3.0, 2, 1.0), t(4.0, 3, 1.0)],
            vec![t(2.0, 2, 1.0), t(-4.0, 3, 1.0)],
            vec![t(2.0, 2, 1.0), t(-4.0, 3, 1.0)],
            vec![t(-1.0, 2, 1.0), t(4.0, 3, 1.0)],
        ]
    }

    /// Krogstad
    pub fn krogstad() -> Self {
        let mut a = Self::empty_rows(4);
        a[1][0] = vec![t(0.5, 1, 0.5)];
        a[2][1] = vec![t(1.0, 2, 0.5)];
        a[2][0] = row_sum_first(0.5, &[&a[2][1]]);
        a[3][2] = vec![t(2.0, 2, 1.0)];
        a[3][0] = row_sum_first(1.0, &[&a[3][2]]);
        Self {
            name: SchemeName::Krogstad,
            order: 4,
            nodes: vec![0.0, 0.5, 0.5, 1.0],
            a,
            b: Self::fourth_order_weights(),
        }
    }

    /// Hochbruck-Ostermann 五级格式
    pub fn hochbruck_ostermann() -> Self {
        let mut a = Self::empty_rows(5);
        a[1][0] = vec![t(0.5, 1, 0.5)];

        a[2][1] = vec![t(1.0, 2, 0.5)];
        a[2][0] = row_sum_first(0.5, &[&a[2][1]]);

        a[3][1] = vec![t(1.0, 2, 1.0)];
        a[3][2] = vec![t(1.0, 2, 1.0)];
        a[3][0] = row_sum_first(1.0, &[&a[3][1], &a[3][2]]);

        // a52 = a53 = ½φ2,5 - φ3,4 + ¼φ2,4 - ½φ3,5
        let a52 = vec![
            t(0.5, 2, 0.5),
            t(-1.0, 3, 1.0),
            t(0.25, 2, 1.0),
            t(-0.5, 3, 0.5),
        ];
        // a54 = ¼φ2,5 - a52
        let mut a54 = vec![t(0.25, 2, 0.5)];
        a54.extend(a52.iter().map(|term| Term {
            weight: -term.weight,
            ..*term
        }));
        a[4][1] = a52.clone();
        a[4][2] = a52;
        a[4][3] = a54;
        a[4][0] = row_sum_first(0.5, &[&a[4][1], &a[4][2], &a[4][3]]);

        let b = vec![
            vec![t(1.0, 1, 1.0), t(-3.0, 2, 1.0), t(4.0, 3, 1.0)],
            Vec::new(),
            Vec::new(),
            vec![t(-1.0, 2, 1.0), t(4.0, 3, 1.0)],
            vec![t(4.0, 2, 1.0), t(-8.0, 3, 1.0)],
        ];
        Self {
            name: SchemeName::HochbruckOstermann,
            order: 4,
            nodes: vec![0.0, 0.5, 0.5, 1.0, 0.5],
            a,
            b,
        }
    }

    /// Lawson 积分因子 RK4
    pub fn lawson4() -> Self {
        let mut a = Self::empty_rows(4);
        a[1][0] = vec![t(0.5, 0, 0.5)];
        a[2][1] = vec![t(0.5, 0, 0.0)];
        a[3][2] = vec![t(1.0, 0, 0.5)];
        let b = vec![
            vec![t(1.0 / 6.0, 0, 1.0)],
            vec![t(1.0 / 3.0, 0, 0.5)],
            vec![t(1.0 / 3.0, 0, 0.5)],
            vec![t(1.0 / 6.0, 0, 0.0)],
        ];
        Self {
            name: SchemeName::Lawson4,
            order: 4,
            nodes: vec![0.0, 0.5, 0.5, 1.0],
            a,
            b,
        }
    }

    /// 指数 Euler
    pub fn etd1() -> Self {
        Self {
            name: SchemeName::Etd1,
            order: 1,
            nodes: vec![0.0],
            a: Self::empty_rows(1),
            b: vec![vec![t(1.0, 1, 1.0)]],
        }
    }

    /// Luan-Ostermann 八级格式
    pub fn exprk5s8() -> Self {
        let c = [0.0, 0.5, 0.5, 0.25, 0.5, 0.2, 2.0 / 3.0, 1.0];
        let mut a = Self::empty_rows(8);

        a[1][0] = vec![t(0.5, 1, c[1])];

        a[2][1] = vec![t(0.5, 2, c[2])];

        a[3][2] = vec![t(1.0 / 8.0, 2, c[3])];

        a[4][2] = vec![t(-0.5, 2, c[4]), t(2.0, 3, c[4])];
        a[4][3] = vec![t(2.0, 2, c[4]), t(-4.0, 3, c[4])];

        a[5][3] = vec![t(8.0 / 25.0, 2, c[5]), t(-32.0 / 125.0, 3, c[5])];
        a[5][4] = vec![t(-2.0 / 25.0, 2, c[5]), t(16.0 / 125.0, 3, c[5])];

        a[6][3] = vec![
            t(-128.0 / 9.0, 2, c[6]),
            t(3584.0 / 27.0, 3, c[6]),
            t(-10240.0 / 27.0, 4, c[6]),
        ];
        a[6][4] = vec![
            t(16.0 / 27.0, 2, c[6]),
            t(-64.0 / 9.0, 3, c[6]),
            t(2560.0 / 81.0, 4, c[6]),
        ];
        a[6][5] = vec![
            t(500.0 / 27.0, 2, c[6]),
            t(-4000.0 / 27.0, 3, c[6]),
            t(32000.0 / 81.0, 4, c[6]),
        ];

        a[7][4] = vec![
            t(-16.0 / 3.0, 2, 1.0),
            t(208.0 / 3.0, 3, 1.0),
            t(-240.0, 4, 1.0),
        ];
        a[7][5] = vec![
            t(250.0 / 21.0, 2, 1.0),
            t(-250.0 / 3.0, 3, 1.0),
            t(1500.0 / 7.0, 4, 1.0),
        ];
        a[7][6] = vec![
            t(27.0 / 14.0, 2, 1.0),
            t(-27.0, 3, 1.0),
            t(810.0 / 7.0, 4, 1.0),
        ];

        for i in 2..8 {
            let others: Vec<Combination> = a[i][1..].to_vec();
            let refs: Vec<&Combination> = others.iter().collect();
            a[i][0] = row_sum_first(c[i], &refs);
        }

        let mut b = vec![Vec::new(); 8];
        b[5] = vec![
            t(125.0 / 14.0, 2, 1.0),
            t(-625.0 / 14.0, 3, 1.0),
            t(1125.0 / 14.0, 4, 1.0),
        ];
        b[6] = vec![
            t(-27.0 / 14.0, 2, 1.0),
            t(162.0 / 7.0, 3, 1.0),
            t(-405.0 / 7.0, 4, 1.0),
        ];
        b[7] = vec![
            t(0.5, 2, 1.0),
            t(-13.0 / 2.0, 3, 1.0),
            t(45.0 / 2.0, 4, 1.0),
        ];
        let others: Vec<&Combination> = b[1..].iter().collect();
        b[0] = row_sum_first(1.0, &others);

        Self {
            name: SchemeName::Exprk5s8,
            order: 5,
            nodes: c.to_vec(),
            a,
            b,
        }
    }

    /// 在 `Z = 0` 处把组合求值为标量（φ_k(0) = 1/k!）
    pub fn eval_at_zero(comb: &Combination) -> f64 {
        comb.iter()
            .map(|term| term.weight * phi_at_zero(term.k))
            .sum()
    }
}
