// crates/spin_foundation/src/tolerance.rs

//! 数值容差工具
//!
//! 驱动器与试探运行共用的步数计算。

/// 区间长度与步长之比的相对容差，比值在此容差内视为整数
pub const STEP_RATIO_TOL: f64 = 1e-9;

/// 区间 `[t0, t1]` 内以不超过 `dt` 的等长步覆盖所需的步数
///
/// 允许 `dt` 在时间容差内恰好整除区间，避免多出一步。
#[inline]
pub fn steps_to_cover(t0: f64, t1: f64, dt: f64) -> usize {
    let span = t1 - t0;
    if span <= 0.0 || dt <= 0.0 {
        return 0;
    }
    let ratio = span / dt;
    let rounded = ratio.round();
    if (ratio - rounded).abs() <= STEP_RATIO_TOL * ratio.max(1.0) {
        (rounded as usize).max(1)
    } else {
        (ratio.ceil() as usize).max(1)
    }
}
