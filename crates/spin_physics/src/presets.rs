// crates/spin_physics/src/presets.rs

//! 预置问题目录
//!
//! 名称到（算子、时间区间、初值、建议 N 与 dt）的静态映射。
//!
//! | 名称 | 方程 | 维度 |
//! |------|------|------|
//! | `ac`   | Allen-Cahn `u_t = 5e-3 u_xx + u - u³` | 1 |
//! | `burg` | Burgers `u_t = 1e-3 u_xx - ½(u²)_x` | 1 |
//! | `ch`   | Cahn-Hilliard `u_t = 1e-2 (-u_xxxx - u_xx + (u³)_xx)` | 1 |
//! | `kdv`  | KdV `u_t = -u_xxx - ½(u²)_x` | 1 |
//! | `ks`   | Kuramoto-Sivashinsky `u_t = -u_xx - u_xxxx - ½(u²)_x` | 1 |
//! | `nls`  | 非线性 Schrödinger `u_t = i u_xx + i|u|²u` | 1 |
//! | `gs`   | Gray-Scott 反应扩散 | 1 |
//! | `gl2`  | 复 Ginzburg-Landau `u_t = Δu + u - (1+1.5i)u|u|²` | 2 |
//! | `gs2`  | Gray-Scott 反应扩散 | 2 |
//! | `sh2`  | Swift-Hohenberg `u_t = -2Δu - Δ²u - 0.9u - u³` | 2 |
//! | `gl3`  | 复 Ginzburg-Landau | 3 |

use crate::error::{SolveError, SolveResult};
use crate::initial::InitialCondition;
use crate::operator::{symbols, NonlinearPart, OperatorBuilder, OperatorSpec};
use crate::time_span::TimeSpan;
use num_complex::Complex64;
use spin_config::Preferences;
use std::f64::consts::PI;

/// 全部预置名称
pub const PRESET_NAMES: [&str; 11] = [
    "ac", "burg", "ch", "kdv", "ks", "nls", "gs", "gl2", "gs2", "sh2", "gl3",
];

/// 预置问题
#[derive(Debug, Clone)]
pub struct Preset {
    /// 名称
    pub name: &'static str,
    /// 一行说明
    pub description: &'static str,
    /// 算子
    pub operator: OperatorSpec,
    /// 默认时间区间
    pub time_span: TimeSpan,
    /// 默认初值
    pub initial: InitialCondition,
    /// 建议的每维点数
    pub suggested_n: usize,
    /// 建议的时间步长
    pub suggested_dt: f64,
}

impl Preset {
    /// 使用建议 N 与 dt 的偏好
    pub fn preferences(&self) -> Preferences {
        Preferences::default()
            .with_n(self.suggested_n)
            .with_dt(self.suggested_dt)
    }
}

/// 按名称创建预置问题
///
/// # 错误
///
/// 名称未知时返回 `InvalidOperator`。
pub fn create(name: &str) -> SolveResult<Preset> {
    match name.trim().to_lowercase().as_str() {
        "ac" => allen_cahn(),
        "burg" => burgers(),
        "ch" => cahn_hilliard(),
        "kdv" => kdv(),
        "ks" => kuramoto_sivashinsky(),
        "nls" => nls(),
        "gs" => gray_scott_1d(),
        "gl2" => ginzburg_landau(2),
        "gs2" => gray_scott_2d(),
        "sh2" => swift_hohenberg(),
        "gl3" => ginzburg_landau(3),
        other => Err(SolveError::invalid_operator(format!(
            "未知的预置问题: {} (可选: {})",
            other,
            PRESET_NAMES.join(", ")
        ))),
    }
}

fn real(v: f64) -> Complex64 {
    Complex64::new(v, 0.0)
}

fn sech(x: f64) -> f64 {
    1.0 / x.cosh()
}

fn allen_cahn() -> SolveResult<Preset> {
    let operator = OperatorBuilder::new("ac")
        .bounds(vec![[0.0, 2.0 * PI]])
        .linear(symbols::scaled(5e-3, symbols::laplacian()))
        .nonlinear_scalar(|u| u - u * u * u)
        .build()?;
    Ok(Preset {
        name: "ac",
        description: "Allen-Cahn 方程，亚稳态界面合并",
        operator,
        time_span: TimeSpan::until(100.0)?,
        initial: InitialCondition::scalar(|x| {
            let x = x[0];
            (2.0 * x.sin()).tanh() + 3.0 * (-27.1 * (x - 4.2).powi(2)).exp()
                - 3.0 * (-23.6 * (x - PI / 2.0).powi(2)).exp()
                + 3.0 * (-38.2 * (x - 5.4).powi(2)).exp()
        }),
        suggested_n: 256,
        suggested_dt: 0.1,
    })
}

fn burgers() -> SolveResult<Preset> {
    let operator = OperatorBuilder::new("burg")
        .bounds(vec![[-1.0, 1.0]])
        .linear(symbols::scaled(1e-3, symbols::laplacian()))
        .nonlinear(
            NonlinearPart::scalar(|u| u * u)
                .then_multiply(vec![symbols::scaled(-0.5, symbols::diff(0, 1))]),
        )
        .build()?;
    Ok(Preset {
        name: "burg",
        description: "粘性 Burgers 方程，激波形成",
        operator,
        time_span: TimeSpan::until(30.0)?,
        initial: InitialCondition::scalar(|x| {
            let x = x[0];
            (1.0 - x * x) * (-30.0 * (x + 0.5).powi(2)).exp()
        }),
        suggested_n: 512,
        suggested_dt: 1e-2,
    })
}

fn cahn_hilliard() -> SolveResult<Preset> {
    let operator = OperatorBuilder::new("ch")
        .bounds(vec![[-1.0, 1.0]])
        .linear(symbols::combine(vec![
            (-1e-2, symbols::diff(0, 4)),
            (-1e-2, symbols::diff(0, 2)),
        ]))
        .nonlinear(
            NonlinearPart::scalar(|u| u * u * u)
                .then_multiply(vec![symbols::scaled(1e-2, symbols::diff(0, 2))]),
        )
        .build()?;
    Ok(Preset {
        name: "ch",
        description: "Cahn-Hilliard 方程，相分离",
        operator,
        time_span: TimeSpan::until(70.0)?,
        initial: InitialCondition::scalar(|x| {
            let x = x[0];
            (4.0 * PI * x).sin().powi(5) - (PI * x).sin()
        }),
        suggested_n: 256,
        suggested_dt: 1e-2,
    })
}

fn kdv() -> SolveResult<Preset> {
    const A: f64 = 25.0;
    const B: f64 = 16.0;
    let operator = OperatorBuilder::new("kdv")
        .bounds(vec![[-PI, PI]])
        .linear(symbols::scaled(-1.0, symbols::diff(0, 3)))
        .nonlinear(
            NonlinearPart::scalar(|u| u * u)
                .then_multiply(vec![symbols::scaled(-0.5, symbols::diff(0, 1))]),
        )
        .build()?;
    Ok(Preset {
        name: "kdv",
        description: "KdV 方程，两个孤立子碰撞",
        operator,
        time_span: TimeSpan::until(2.0 * PI * 3.0 / (A * A))?,
        initial: InitialCondition::scalar(|x| {
            let x = x[0];
            3.0 * A * A * sech(0.5 * A * (x + 2.0)).powi(2)
                + 3.0 * B * B * sech(0.5 * B * (x + 1.0)).powi(2)
        }),
        suggested_n: 256,
        suggested_dt: 7.5e-6,
    })
}

fn kuramoto_sivashinsky() -> SolveResult<Preset> {
    let operator = OperatorBuilder::new("ks")
        .bounds(vec![[0.0, 32.0 * PI]])
        .linear(symbols::combine(vec![
            (-1.0, symbols::diff(0, 2)),
            (-1.0, symbols::diff(0, 4)),
        ]))
        .nonlinear(
            NonlinearPart::scalar(|u| u * u)
                .then_multiply(vec![symbols::scaled(-0.5, symbols::diff(0, 1))]),
        )
        .build()?;
    Ok(Preset {
        name: "ks",
        description: "Kuramoto-Sivashinsky 方程，时空混沌",
        operator,
        time_span: TimeSpan::until(300.0)?,
        initial: InitialCondition::scalar(|x| {
            let x = x[0];
            (x / 16.0).cos() * (1.0 + (x / 16.0).sin())
        }),
        suggested_n: 256,
        suggested_dt: 0.25,
    })
}

fn nls() -> SolveResult<Preset> {
    let operator = OperatorBuilder::new("nls")
        .bounds(vec![[-20.0, 20.0]])
        .linear(symbols::scaled(Complex64::i(), symbols::diff(0, 2)))
        .nonlinear_scalar(|u| Complex64::i() * u.norm_sqr() * u)
        .build()?;
    Ok(Preset {
        name: "nls",
        description: "聚焦非线性 Schrödinger 方程，两个孤子",
        operator,
        time_span: TimeSpan::until(20.0)?,
        initial: InitialCondition::complex(|x| {
            let x = x[0];
            // 左右两个相向运动的孤子 √2 a sech(a x) e^{i v x / 2}
            let left = 2f64.sqrt() * sech(x + 6.0) * Complex64::from_polar(1.0, 0.5 * x);
            let right = 2f64.sqrt() * sech(x - 6.0) * Complex64::from_polar(1.0, -0.5 * x);
            left + right
        }),
        suggested_n: 256,
        suggested_dt: 0.01,
    })
}

/// Gray-Scott 反应项，`b` 为补给率，`d` 为衰减率
fn gray_scott_reaction(b: f64, d: f64) -> NonlinearPart {
    NonlinearPart::pointwise(2, move |p, out| {
        let (u, v) = (p.u[0], p.u[1]);
        let uv2 = u * v * v;
        out[0] = real(b) * (real(1.0) - u) - uv2;
        out[1] = uv2 - real(d) * v;
    })
}

fn gray_scott_1d() -> SolveResult<Preset> {
    let (b, d) = (0.04, 0.06);
    let operator = OperatorBuilder::new("gs")
        .bounds(vec![[-50.0, 50.0]])
        .linear_diagonal(vec![
            symbols::laplacian(),
            symbols::scaled(1e-2, symbols::laplacian()),
        ])
        .nonlinear(gray_scott_reaction(b, d))
        .build()?;
    Ok(Preset {
        name: "gs",
        description: "一维 Gray-Scott 反应扩散，斑图分裂",
        operator,
        time_span: TimeSpan::until(1000.0)?,
        initial: InitialCondition::from_fn(2, |x, out| {
            let g = (-0.05 * x[0] * x[0]).exp();
            out[0] = real(1.0 - 0.5 * g);
            out[1] = real(0.25 * g);
        }),
        suggested_n: 256,
        suggested_dt: 0.5,
    })
}

fn gray_scott_2d() -> SolveResult<Preset> {
    let (b, d) = (0.04, 0.06);
    let operator = OperatorBuilder::new("gs2")
        .bounds(vec![[-1.0, 1.0], [-1.0, 1.0]])
        .linear_diagonal(vec![
            symbols::scaled(2e-5, symbols::laplacian()),
            symbols::scaled(1e-5, symbols::laplacian()),
        ])
        .nonlinear(gray_scott_reaction(b, d))
        .build()?;
    Ok(Preset {
        name: "gs2",
        description: "二维 Gray-Scott 反应扩散，斑点与条纹",
        operator,
        time_span: TimeSpan::until(3500.0)?,
        initial: InitialCondition::from_fn(2, |x, out| {
            let r1 = (x[0] + 0.05).powi(2) + (x[1] + 0.02).powi(2);
            let r2 = (x[0] - 0.05).powi(2) + (x[1] - 0.02).powi(2);
            out[0] = real(1.0 - (-80.0 * r1).exp());
            out[1] = real((-80.0 * r2).exp());
        }),
        suggested_n: 64,
        suggested_dt: 1.0,
    })
}

fn ginzburg_landau(dim: usize) -> SolveResult<Preset> {
    let (name, description, length, t_final, n) = if dim == 2 {
        ("gl2", "二维复 Ginzburg-Landau 方程，螺旋波", 100.0, 100.0, 128)
    } else {
        ("gl3", "三维复 Ginzburg-Landau 方程，涡丝", 50.0, 10.0, 32)
    };
    let operator = OperatorBuilder::new(name)
        .bounds(vec![[0.0, length]; dim])
        .linear(symbols::combine(vec![
            (1.0, symbols::laplacian()),
            (1.0, symbols::constant(1.0)),
        ]))
        .nonlinear_scalar(|u| -Complex64::new(1.0, 1.5) * u * u.norm_sqr())
        .build()?;
    let w = 2.0 * PI / length;
    Ok(Preset {
        name,
        description,
        operator,
        time_span: TimeSpan::until(t_final)?,
        initial: InitialCondition::complex(move |x| {
            // 几个低波数模态叠加，给出非零相位缠绕
            let re = (w * x[0]).sin() * (w * x[1]).cos()
                + 0.5 * (2.0 * w * x.iter().sum::<f64>()).cos();
            let im = (w * x[1]).sin() - 0.3 * (3.0 * w * x[0]).cos();
            Complex64::new(0.1 * re, 0.1 * im)
        }),
        suggested_n: n,
        suggested_dt: 0.1,
    })
}

fn swift_hohenberg() -> SolveResult<Preset> {
    let operator = OperatorBuilder::new("sh2")
        .bounds(vec![[0.0, 50.0], [0.0, 50.0]])
        .linear(symbols::combine(vec![
            (-2.0, symbols::laplacian()),
            (-1.0, symbols::biharmonic()),
            (-0.9, symbols::constant(1.0)),
        ]))
        .nonlinear_scalar(|u| -u * u * u)
        .build()?;
    let w = 2.0 * PI / 50.0;
    Ok(Preset {
        name: "sh2",
        description: "二维 Swift-Hohenberg 方程，条纹斑图",
        operator,
        time_span: TimeSpan::until(200.0)?,
        initial: InitialCondition::scalar(move |x| {
            0.1 * ((w * x[0]).cos() + (w * x[1]).cos())
                + 0.1 * (8.0 * w * x[0]).sin() * (8.0 * w * x[1]).sin()
        }),
        suggested_n: 64,
        suggested_dt: 0.5,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_construct() {
        for name in PRESET_NAMES {
            let p = create(name).unwrap();
            assert_eq!(p.name, name);
            assert_eq!(p.operator.name(), name);
            assert_eq!(p.initial.n_components(), p.operator.n_components());
            assert!(p.suggested_n.is_power_of_two());
            assert!(p.preferences().validate().is_ok());
        }
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(create("ks").unwrap().operator.dim(), 1);
        assert_eq!(create("gs").unwrap().operator.n_components(), 2);
        assert_eq!(create("gl2").unwrap().operator.dim(), 2);
        assert_eq!(create("gl3").unwrap().operator.dim(), 3);
    }

    #[test]
    fn test_unknown_preset() {
        let err = create("heat9").unwrap_err();
        assert!(matches!(err, SolveError::InvalidOperator { .. }));
        assert!(create(" KS ").is_ok());
    }
}
