// crates/spin_config/src/preferences.rs

//! Preferences - 运行偏好配置
//!
//! 积分格式、时间步长、网格点数、容差以及自动选择的边界。
//! `dt` 与 `n` 为 `None` 时由驱动器自动选择，显式给出时跳过自动选择。
//! 进度回调不属于可序列化配置，由 `Simulation::with_progress` 提供。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::scheme_name::SchemeName;

/// 运行偏好
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// 积分格式
    #[serde(default)]
    pub scheme: SchemeName,

    /// 固定时间步长，`None` 表示自动选择
    #[serde(default)]
    pub dt: Option<f64>,

    /// 每维固定点数，`None` 表示自动选择
    #[serde(default)]
    pub n: Option<usize>,

    /// 自动选择 dt / N 时的目标相对精度
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// 是否对非线性项做 2/3 规则去混叠
    #[serde(default)]
    pub dealias: bool,

    /// φ 函数围道积分节点数
    #[serde(default = "default_contour_points")]
    pub contour_points: usize,

    /// 自动 N 的起始点数
    #[serde(default = "default_n_min")]
    pub n_min: usize,

    /// 自动 N 的上限，`None` 时按维度取默认值
    #[serde(default)]
    pub n_max: Option<usize>,

    /// 自动 dt 的下限
    #[serde(default = "default_dt_min")]
    pub dt_min: f64,

    /// 自动 dt 的起始值（上限）
    #[serde(default = "default_dt_max")]
    pub dt_max: f64,

    /// 自动 dt 的最大减半次数
    #[serde(default = "default_max_refinements")]
    pub max_refinements: usize,

    /// 发散判据：谱系数最大模超过初值的该倍数即视为发散
    #[serde(default = "default_divergence_factor")]
    pub divergence_factor: f64,

    /// 每隔多少步调用一次进度回调（0 关闭）
    #[serde(default)]
    pub progress_every: usize,
}

fn default_tolerance() -> f64 { 1e-6 }
fn default_contour_points() -> usize { 32 }
fn default_n_min() -> usize { 32 }
fn default_dt_min() -> f64 { 1e-8 }
fn default_dt_max() -> f64 { 0.1 }
fn default_max_refinements() -> usize { 12 }
fn default_divergence_factor() -> f64 { 1e8 }

impl Default for Preferences {
    fn default() -> Self {
        Self {
            scheme: SchemeName::default(),
            dt: None,
            n: None,
            tolerance: default_tolerance(),
            dealias: false,
            contour_points: default_contour_points(),
            n_min: default_n_min(),
            n_max: None,
            dt_min: default_dt_min(),
            dt_max: default_dt_max(),
            max_refinements: default_max_refinements(),
            divergence_factor: default_divergence_factor(),
            progress_every: 0,
        }
    }
}

impl Preferences {
    /// 各维度默认的 N 上限
    pub const DEFAULT_N_MAX: [usize; 3] = [4096, 512, 128];

    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串解析并验证
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let prefs: Preferences =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        prefs.validate()?;
        Ok(prefs)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0 && self.tolerance < 1.0) {
            return Err(ConfigError::invalid_value(
                "tolerance",
                self.tolerance,
                "容差必须在 (0, 1) 范围内",
            ));
        }

        if let Some(dt) = self.dt {
            if !(dt.is_finite() && dt > 0.0) {
                return Err(ConfigError::invalid_value("dt", dt, "时间步长必须为正"));
            }
        }

        if let Some(n) = self.n {
            check_points("n", n)?;
        }
        check_points("n_min", self.n_min)?;
        if let Some(n_max) = self.n_max {
            check_points("n_max", n_max)?;
            if n_max < self.n_min {
                return Err(ConfigError::invalid_value(
                    "n_max",
                    n_max,
                    format!("不能小于 n_min={}", self.n_min),
                ));
            }
        }

        if !(self.dt_min.is_finite() && self.dt_min > 0.0) {
            return Err(ConfigError::invalid_value("dt_min", self.dt_min, "必须为正"));
        }
        if !(self.dt_max.is_finite() && self.dt_max >= self.dt_min) {
            return Err(ConfigError::invalid_value(
                "dt_max",
                self.dt_max,
                format!("必须为有限值且不小于 dt_min={}", self.dt_min),
            ));
        }

        if self.max_refinements > 60 {
            return Err(ConfigError::invalid_value(
                "max_refinements",
                self.max_refinements,
                "不能超过 60",
            ));
        }

        if !(self.divergence_factor.is_finite() && self.divergence_factor > 1.0) {
            return Err(ConfigError::invalid_value(
                "divergence_factor",
                self.divergence_factor,
                "必须大于 1",
            ));
        }

        if self.contour_points < 8 {
            return Err(ConfigError::invalid_value(
                "contour_points",
                self.contour_points,
                "至少需要 8 个节点",
            ));
        }

        Ok(())
    }

    /// 给定空间维度下的 N 上限
    pub fn n_max_for_dim(&self, dim: usize) -> usize {
        self.n_max.unwrap_or_else(|| {
            Self::DEFAULT_N_MAX[dim.clamp(1, 3) - 1].max(self.n_min)
        })
    }

    /// 是否自动选择时间步长
    #[inline]
    pub fn auto_dt(&self) -> bool {
        self.dt.is_none()
    }

    /// 是否自动选择点数
    #[inline]
    pub fn auto_n(&self) -> bool {
        self.n.is_none()
    }

    /// 设置积分格式
    pub fn with_scheme(mut self, scheme: SchemeName) -> Self {
        self.scheme = scheme;
        self
    }

    /// 设置固定时间步长
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// 设置固定点数
    pub fn with_n(mut self, n: usize) -> Self {
        self.n = Some(n);
        self
    }

    /// 设置容差
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// 开关去混叠
    pub fn with_dealias(mut self, dealias: bool) -> Self {
        self.dealias = dealias;
        self
    }
}

fn check_points(key: &str, n: usize) -> Result<(), ConfigError> {
    if n < 4 || !n.is_power_of_two() {
        return Err(ConfigError::invalid_value(
            key,
            n,
            "点数必须是不小于 4 的 2 的幂",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let prefs = Preferences::default();
        assert!(prefs.validate().is_ok());
        assert_eq!(prefs.scheme, SchemeName::Etdrk4);
        assert!(prefs.auto_dt() && prefs.auto_n());
        assert_eq!(prefs.tolerance, 1e-6);
    }

    #[test]
    fn test_invalid_values() {
        let bad = Preferences::default().with_dt(-0.1);
        assert_eq!(bad.validate().unwrap_err().key(), Some("dt"));

        let bad = Preferences::default().with_n(48);
        assert_eq!(bad.validate().unwrap_err().key(), Some("n"));

        let bad = Preferences::default().with_tolerance(0.0);
        assert_eq!(bad.validate().unwrap_err().key(), Some("tolerance"));

        let mut bad = Preferences::default();
        bad.n_max = Some(16);
        assert_eq!(bad.validate().unwrap_err().key(), Some("n_max"));

        let mut bad = Preferences::default();
        bad.divergence_factor = 0.5;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_serialize_deserialize() {
        let prefs = Preferences::default()
            .with_scheme(SchemeName::Exprk5s8)
            .with_dt(0.01)
            .with_n(128);
        let json = serde_json::to_string(&prefs).unwrap();
        let parsed = Preferences::from_json(&json).unwrap();
        assert_eq!(parsed, prefs);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed = Preferences::from_json(r#"{ "scheme": "krogstad", "n": 64 }"#).unwrap();
        assert_eq!(parsed.scheme, SchemeName::Krogstad);
        assert_eq!(parsed.n, Some(64));
        assert_eq!(parsed.dt, None);
        assert_eq!(parsed.contour_points, 32);
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        assert!(Preferences::from_json(r#"{ "scheme": "rk4" }"#).is_err());
    }

    #[test]
    fn test_n_max_per_dim() {
        let prefs = Preferences::default();
        assert_eq!(prefs.n_max_for_dim(1), 4096);
        assert_eq!(prefs.n_max_for_dim(3), 128);
    }

    #[test]
    fn test_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("spin_prefs_{}.json", std::process::id()));
        let prefs = Preferences::default().with_dealias(true);
        prefs.save_to_file(&path).unwrap();
        let loaded = Preferences::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, prefs);
    }
}
