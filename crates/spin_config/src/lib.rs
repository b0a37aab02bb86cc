// crates/spin_config/src/lib.rs

//! Spin Config Layer
//!
//! 配置层，提供积分格式选择与运行偏好。
//!
//! # 模块概览
//!
//! - [`scheme_name`]: SchemeName 积分格式名称（serde kebab-case）
//! - [`preferences`]: Preferences 运行偏好（容差、dt、N、自动选择边界）
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: spin_cli        ─> uses Preferences, SchemeName
//! Layer 4: spin_config     ─> Preferences, SchemeName (本层)
//! Layer 3: spin_physics    ─> 由 SchemeName 查表构造格式
//! Layer 2: spin_spectral
//! Layer 1: spin_foundation
//! ```
//!
//! # 设计原则
//!
//! 1. **可序列化**: 所有配置都能以 JSON 读写
//! 2. **加载即验证**: `from_file` / `from_json` 返回前调用 `validate`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod preferences;
pub mod scheme_name;

// 重导出核心类型
pub use error::ConfigError;
pub use preferences::Preferences;
pub use scheme_name::{SchemeName, SchemeParseError};
