// crates/spin_config/src/scheme_name.rs

//! 时间积分格式名称
//!
//! 可序列化的封闭枚举，配置文件与命令行通过名称选择格式，
//! 具体系数表在 spin_physics 中由名称查表得到。

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 指数积分格式名称
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SchemeName {
    /// Cox-Matthews ETDRK4（四阶，4 级）
    #[default]
    Etdrk4,
    /// Luan-Ostermann 八级五阶格式
    Exprk5s8,
    /// Krogstad 四阶格式
    Krogstad,
    /// Hochbruck-Ostermann 五级四阶格式（刚性阶 4）
    HochbruckOstermann,
    /// Lawson 积分因子 RK4
    Lawson4,
    /// 指数 Euler（一阶）
    Etd1,
}

impl SchemeName {
    /// 全部格式
    pub const ALL: [SchemeName; 6] = [
        Self::Etdrk4,
        Self::Exprk5s8,
        Self::Krogstad,
        Self::HochbruckOstermann,
        Self::Lawson4,
        Self::Etd1,
    ];

    /// 格式名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Etdrk4 => "etdrk4",
            Self::Exprk5s8 => "exprk5s8",
            Self::Krogstad => "krogstad",
            Self::HochbruckOstermann => "hochbruck-ostermann",
            Self::Lawson4 => "lawson4",
            Self::Etd1 => "etd1",
        }
    }
}

impl std::fmt::Display for SchemeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 格式名称解析错误
#[derive(Debug, Clone)]
pub struct SchemeParseError(String);

impl FromStr for SchemeName {
    type Err = SchemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "etdrk4" => Ok(Self::Etdrk4),
            "exprk5s8" => Ok(Self::Exprk5s8),
            "krogstad" | "etdrk4-b" => Ok(Self::Krogstad),
            "hochbruck-ostermann" | "hochost4" => Ok(Self::HochbruckOstermann),
            "lawson4" | "lirk4" => Ok(Self::Lawson4),
            "etd1" | "expeuler" => Ok(Self::Etd1),
            _ => Err(SchemeParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for SchemeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = SchemeName::ALL.iter().map(|s| s.name()).collect();
        write!(f, "未知的积分格式: '{}', 可选: {}", self.0, names.join(", "))
    }
}

impl std::error::Error for SchemeParseError {}
