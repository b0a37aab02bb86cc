// crates/spin_spectral/src/fft.rs

//! 一维 FFT 计划
//!
//! 基于 `rustfft`。进程内共用一个 `FftPlanner`，同一长度的正/逆变换
//! 只规划一次，`FftPlan` 持有两个 `Arc<dyn Fft<f64>>`，可在网格、变换器
//! 和多个独立模拟之间共享。
//!
//! ## 约定
//!
//! - 正变换: $\hat u_k = \sum_j u_j e^{-2\pi i jk/N}$（不归一化）
//! - 逆变换: $u_j = \sum_k \hat u_k e^{+2\pi i jk/N}$（不归一化，缩放由调用方完成）

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use spin_foundation::{SpinError, SpinResult};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

/// 全局规划器，内部按长度缓存计划
fn planner() -> &'static Mutex<FftPlanner<f64>> {
    static PLANNER: OnceLock<Mutex<FftPlanner<f64>>> = OnceLock::new();
    PLANNER.get_or_init(|| Mutex::new(FftPlanner::new()))
}

/// 固定长度的 FFT 计划
#[derive(Clone)]
pub struct FftPlan {
    n: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for FftPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftPlan").field("n", &self.n).finish()
    }
}

impl FftPlan {
    /// 创建计划
    ///
    /// # 错误
    ///
    /// `n` 为零时返回 `InvalidGrid`。点数的 2 的幂约束由 [`crate::Grid`] 负责。
    pub fn new(n: usize) -> SpinResult<Self> {
        if n == 0 {
            return Err(SpinError::invalid_grid("FFT 长度不能为零"));
        }
        let mut planner = planner()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);
        Ok(Self {
            n,
            forward,
            inverse,
        })
    }

    /// 变换长度
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    /// 长度是否为零（恒为 false）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// 原地正变换
    #[inline]
    pub fn forward(&self, buf: &mut [Complex64]) {
        self.process(buf, false);
    }

    /// 原地逆变换（不含 1/N 缩放）
    #[inline]
    pub fn inverse(&self, buf: &mut [Complex64]) {
        self.process(buf, true);
    }

    /// 原地变换
    pub fn process(&self, buf: &mut [Complex64], inverse: bool) {
        debug_assert_eq!(buf.len(), self.n, "FFT 缓冲区长度与计划不符");
        if inverse {
            self.inverse.process(buf);
        } else {
            self.forward.process(buf);
        }
    }
}
