// crates/spin_physics/tests/driver.rs

//! 驱动器行为：快照、发散、取消、自动 dt / N、实值保持

use num_complex::Complex64;
use spin_physics::prelude::*;
use std::f64::consts::PI;
use std::sync::Arc;

fn heat() -> OperatorSpec {
    OperatorBuilder::new("heat")
        .bounds(vec![[0.0, 2.0 * PI]])
        .linear(symbols::laplacian())
        .build()
        .unwrap()
}

#[test]
fn test_snapshot_fidelity() {
    let op = heat();
    let ic = InitialCondition::scalar(|x| x[0].cos());
    let span = TimeSpan::from_outputs(vec![0.0, 1.0, 2.0, 3.0]).unwrap();
    let prefs = Preferences::default().with_n(16).with_dt(0.3);
    let result = integrate(&op, &span, &ic, &prefs).unwrap();

    assert_eq!(result.snapshots().len(), 4);
    assert_eq!(result.times(), vec![0.0, 1.0, 2.0, 3.0]);
    assert_eq!(result.status(), RunStatus::Completed);
    assert_eq!(result.final_time(), 3.0);
    // 每个区间 ⌈1/0.3⌉ = 4 步
    assert_eq!(result.stats().steps, 12);

    let grid = result.grid();
    for snap in result.snapshots() {
        let decay = (-snap.time).exp();
        for (j, &x) in grid.coordinates(0).iter().enumerate() {
            let v = snap.state.component(0)[j].re;
            assert!((v - decay * x.cos()).abs() < 1e-12, "t={}", snap.time);
        }
    }
}

#[test]
fn test_divergence_detected() {
    let op = OperatorBuilder::new("blowup")
        .bounds(vec![[0.0, 2.0 * PI]])
        .linear(symbols::constant(50.0))
        .nonlinear_scalar(|u| u * u)
        .build()
        .unwrap();
    let ic = InitialCondition::scalar(|x| 1.0 + 0.1 * x[0].sin());
    let span = TimeSpan::from_outputs(vec![0.0, 10.0]).unwrap();
    let prefs = Preferences::default().with_n(16).with_dt(0.1);
    let err = integrate(&op, &span, &ic, &prefs).unwrap_err();

    match &err {
        SolveError::Divergence {
            time,
            state,
            partial,
        } => {
            assert!(*time < 1.0, "发散检测过晚: t={}", time);
            assert!(state.is_finite());
            assert_eq!(partial.snapshots().len(), 1);
            assert_eq!(partial.final_time(), *time);
        }
        other => panic!("期望发散错误, 实际 {:?}", other),
    }
    assert!(err.is_divergence());
    assert!(err.partial_result().is_some());
}

#[test]
fn test_cancellation_keeps_last_state() {
    let op = heat();
    let ic = InitialCondition::scalar(|x| x[0].sin());
    let span = TimeSpan::until(10.0).unwrap();
    let token = CancelToken::new();
    let trigger = token.clone();
    let prefs = Preferences {
        progress_every: 1,
        ..Preferences::default().with_n(16).with_dt(0.1)
    };
    let result = Simulation::new(&op, &span, &ic)
        .preferences(prefs)
        .with_progress(Arc::new(move |p: &Progress| {
            if p.step >= 5 {
                trigger.cancel();
            }
        }))
        .with_cancel(token)
        .run()
        .unwrap();

    assert_eq!(result.status(), RunStatus::Cancelled);
    assert_eq!(result.stats().steps, 5);
    assert!((result.final_time() - 0.5).abs() < 1e-12);
    assert!(result.snapshots().is_empty());
    let grid = result.grid();
    let decay = (-0.5f64).exp();
    for (j, &x) in grid.coordinates(0).iter().enumerate() {
        assert!((result.final_state().component(0)[j].re - decay * x.sin()).abs() < 1e-12);
    }
}

#[test]
fn test_auto_dt_meets_tolerance() {
    // u' = -u - u², u(0) = 1，精确解 1/(2e^t - 1)
    let op = OperatorBuilder::new("bernoulli")
        .bounds(vec![[0.0, 2.0 * PI]])
        .linear(symbols::constant(-1.0))
        .nonlinear_scalar(|u| -u * u)
        .build()
        .unwrap();
    let ic = InitialCondition::scalar(|_| 1.0);
    let span = TimeSpan::until(1.0).unwrap();
    let prefs = Preferences::default().with_n(4).with_tolerance(1e-8);
    let result = integrate(&op, &span, &ic, &prefs).unwrap();

    let exact = 1.0 / (2.0 * 1f64.exp() - 1.0);
    let err = (result.final_state().component(0)[0].re - exact).abs();
    assert!(err < 1e-7, "误差 {:.3e}, dt={}", err, result.stats().dt);
    assert!(result.stats().dt <= prefs.dt_max);
}

#[test]
fn test_auto_dt_reports_unachievable() {
    let op = OperatorBuilder::new("bernoulli")
        .bounds(vec![[0.0, 2.0 * PI]])
        .linear(symbols::constant(-1.0))
        .nonlinear_scalar(|u| -u * u)
        .build()
        .unwrap();
    let ic = InitialCondition::scalar(|_| 1.0);
    let span = TimeSpan::until(1.0).unwrap();
    let prefs = Preferences {
        max_refinements: 1,
        ..Preferences::default().with_n(4).with_tolerance(1e-15)
    };
    let err = integrate(&op, &span, &ic, &prefs).unwrap_err();
    match err {
        SolveError::ToleranceUnachievable {
            achieved,
            tolerance,
            best,
        } => {
            assert_eq!(tolerance, 1e-15);
            assert!(achieved > tolerance && achieved.is_finite());
            assert_eq!(best.stats().dt, 0.05);
            assert_eq!(best.snapshots().len(), 1);
        }
        other => panic!("期望容差不可达, 实际 {:?}", other),
    }
}

#[test]
fn test_auto_n_resolves_initial_pulse() {
    let op = heat();
    let ic = InitialCondition::scalar(|x| (-40.0 * (x[0] - PI).powi(2)).exp());
    let span = TimeSpan::until(0.1).unwrap();
    let prefs = Preferences::default().with_dt(0.05);
    let result = integrate(&op, &span, &ic, &prefs).unwrap();
    assert!(result.stats().n > prefs.n_min);
    assert_eq!(result.stats().attempts, 1);
}

#[test]
fn test_ks_stays_real() {
    let preset = presets::create("ks").unwrap();
    let span = TimeSpan::until(5.0).unwrap();
    let prefs = preset.preferences().with_n(128);
    let result = integrate(&preset.operator, &span, &preset.initial, &prefs).unwrap();
    assert!(result.max_imaginary() < 1e-10, "虚部 {:.3e}", result.max_imaginary());
    assert!(result.final_state().is_finite());
}

#[test]
fn test_complex_initial_with_samples() {
    // 粗网格采样作为初值，重采样到运行网格后结果与函数初值一致
    let op = heat();
    let coarse = spin_spectral::Grid::new(op.domain().clone(), 8).unwrap();
    let samples = spin_spectral::PhysicalState::from_components(vec![coarse
        .coordinates(0)
        .iter()
        .map(|&x| Complex64::new(x.cos(), x.sin()))
        .collect()])
    .unwrap();
    let ic = InitialCondition::from_samples(coarse, samples).unwrap();
    let span = TimeSpan::until(0.5).unwrap();
    let prefs = Preferences::default().with_n(32).with_dt(0.1);
    let result = integrate(&op, &span, &ic, &prefs).unwrap();
    let grid = result.grid();
    let decay = (-0.5f64).exp();
    for (j, &x) in grid.coordinates(0).iter().enumerate() {
        let expected = Complex64::from_polar(decay, x);
        assert!((result.final_state().component(0)[j] - expected).norm() < 1e-12);
    }
}

#[test]
fn test_invalid_preferences_rejected() {
    let op = heat();
    let ic = InitialCondition::scalar(|x| x[0].cos());
    let span = TimeSpan::until(1.0).unwrap();
    let prefs = Preferences::default().with_n(12);
    let err = integrate(&op, &span, &ic, &prefs).unwrap_err();
    assert!(matches!(err, SolveError::Config(_)));
}

#[test]
fn test_overflowing_exponential_reported_as_divergence() {
    let op = OperatorBuilder::new("overflow")
        .bounds(vec![[0.0, 2.0 * PI]])
        .linear(symbols::constant(1000.0))
        .nonlinear_scalar(|u| u * u)
        .build()
        .unwrap();
    let ic = InitialCondition::scalar(|x| 1.0 + 0.1 * x[0].sin());
    let span = TimeSpan::from_outputs(vec![0.0, 1.0]).unwrap();
    let prefs = Preferences::default().with_n(16).with_dt(1.0);
    let err = integrate(&op, &span, &ic, &prefs).unwrap_err();

    assert!(err.is_divergence(), "期望发散错误, 实际 {:?}", err);
    if let SolveError::Divergence { time, state, partial } = err {
        assert_eq!(time, 0.0);
        assert!(state.is_finite());
        assert_eq!(partial.snapshots().len(), 1);
        assert_eq!(partial.stats().steps, 0);
    }
}

/// 只有 |k| = 12 的模态不稳定
fn unstable_at_twelve() -> OperatorSpec {
    OperatorBuilder::new("mode12")
        .bounds(vec![[0.0, 2.0 * PI]])
        .linear(symbols::from_fn(|k| {
            if (k[0].abs() - 12.0).abs() < 0.5 {
                Complex64::new(5.0, 0.0)
            } else {
                Complex64::new(-1.0, 0.0)
            }
        }))
        .build()
        .unwrap()
}

#[test]
fn test_auto_n_restarts_after_divergence() {
    // N=32 上 sin(20x) 混叠为 |k|=12 的不稳定模态，N=64 上正常衰减
    let op = unstable_at_twelve();
    let ic = InitialCondition::scalar(|x| (20.0 * x[0]).sin());
    let span = TimeSpan::until(10.0).unwrap();
    let prefs = Preferences::default().with_dt(0.1);
    let result = integrate(&op, &span, &ic, &prefs).unwrap();

    assert_eq!(result.stats().attempts, 2);
    assert_eq!(result.stats().n, 2 * prefs.n_min);
    assert_eq!(result.status(), RunStatus::Completed);
    let grid = result.grid();
    let decay = (-10.0f64).exp();
    for (j, &x) in grid.coordinates(0).iter().enumerate() {
        let v = result.final_state().component(0)[j].re;
        assert!((v - decay * (20.0 * x).sin()).abs() < 1e-10);
    }
}

/// |k| = 15 的模态以 e^t 增长，其余不变
fn growing_at_fifteen() -> OperatorSpec {
    OperatorBuilder::new("mode15")
        .bounds(vec![[0.0, 2.0 * PI]])
        .linear(symbols::from_fn(|k| {
            if (k[0].abs() - 15.0).abs() < 0.5 {
                Complex64::new(1.0, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            }
        }))
        .build()
        .unwrap()
}

#[test]
fn test_auto_n_restarts_on_unresolved_snapshot() {
    // 初值在 N=32 上已解析，t=10 时 k=15 进入尾带并超过容差
    let op = growing_at_fifteen();
    let ic = InitialCondition::scalar(|x| x[0].cos() + 1e-9 * (15.0 * x[0]).cos());
    let span = TimeSpan::until(10.0).unwrap();
    let prefs = Preferences::default().with_dt(0.5);
    let result = integrate(&op, &span, &ic, &prefs).unwrap();

    assert_eq!(result.stats().attempts, 2);
    assert_eq!(result.stats().n, 2 * prefs.n_min);
    assert_eq!(result.snapshots().len(), 1);
}

#[test]
fn test_auto_n_budget_exhausted() {
    let op = growing_at_fifteen();
    let ic = InitialCondition::scalar(|x| x[0].cos() + 1e-9 * (15.0 * x[0]).cos());
    let span = TimeSpan::until(10.0).unwrap();
    let prefs = Preferences {
        n_max: Some(32),
        ..Preferences::default().with_dt(0.5)
    };
    let err = integrate(&op, &span, &ic, &prefs).unwrap_err();
    match err {
        SolveError::ToleranceUnachievable {
            achieved,
            tolerance,
            best,
        } => {
            assert!(achieved > tolerance, "尾带比值 {:.3e}", achieved);
            assert!(achieved < 1e-3);
            assert_eq!(best.stats().n, 32);
            assert_eq!(best.stats().attempts, 1);
            assert_eq!(best.snapshots().len(), 1);
            assert_eq!(best.final_time(), 10.0);
        }
        other => panic!("期望容差不可达, 实际 {:?}", other),
    }
}
