// apps/spin_cli/src/commands/validate.rs

//! 偏好文件验证命令
//!
//! 错误：JSON 无法解析或 `Preferences::validate` 失败。
//! 警告：未知字段、固定 dt 超出自动范围、固定 N 超出维度上限等可运行但可疑的设置。

use anyhow::{bail, Context, Result};
use clap::Args;
use spin_config::Preferences;
use spin_physics::presets;
use std::path::PathBuf;
use tracing::info;

/// 已知的偏好字段
const KNOWN_KEYS: [&str; 13] = [
    "scheme",
    "dt",
    "n",
    "tolerance",
    "dealias",
    "contour_points",
    "n_min",
    "n_max",
    "dt_min",
    "dt_max",
    "max_refinements",
    "divergence_factor",
    "progress_every",
];

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 偏好文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 同时检查与某个预置问题的搭配
    #[arg(short, long)]
    pub preset: Option<String>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== Spin 偏好验证 ===");
    let mut result = ValidationResult::default();

    println!("\n检查偏好文件: {}", args.config.display());
    if !args.config.exists() {
        result.add_error(format!("文件不存在: {}", args.config.display()));
        return print_validation_result(&result, args.strict);
    }

    let content = std::fs::read_to_string(&args.config).context("无法读取偏好文件")?;

    let json: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            result.add_error(format!("JSON 解析错误: {}", e));
            return print_validation_result(&result, args.strict);
        }
    };
    if let Some(obj) = json.as_object() {
        for key in obj.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                result.add_warning(format!("未知字段将被忽略: {}", key));
            }
        }
    } else {
        result.add_error("偏好文件顶层必须是 JSON 对象");
        return print_validation_result(&result, args.strict);
    }

    match Preferences::from_json(&content) {
        Ok(prefs) => {
            println!("  ✓ 偏好格式有效 (格式: {})", prefs.scheme);
            check_preferences(&prefs, &mut result);
            if let Some(name) = &args.preset {
                check_with_preset(&prefs, name, &mut result)?;
            }
        }
        Err(e) => result.add_error(e.to_string()),
    }

    print_validation_result(&result, args.strict)
}

fn check_preferences(prefs: &Preferences, result: &mut ValidationResult) {
    if let Some(dt) = prefs.dt {
        if dt > prefs.dt_max {
            result.add_warning(format!("dt = {} 大于 dt_max = {}", dt, prefs.dt_max));
        }
    }
    if prefs.tolerance < 1e-12 {
        result.add_warning(format!(
            "容差 {:.1e} 接近双精度极限，自动选择可能无法达到",
            prefs.tolerance
        ));
    }
    if prefs.auto_dt() && prefs.max_refinements == 0 {
        result.add_warning("max_refinements = 0 时自动 dt 直接取 dt_max，不做试探");
    }
}

fn check_with_preset(prefs: &Preferences, name: &str, result: &mut ValidationResult) -> Result<()> {
    let preset = match presets::create(name) {
        Ok(p) => p,
        Err(e) => {
            result.add_error(e.to_string());
            return Ok(());
        }
    };
    let dim = preset.operator.dim();
    let n_max = prefs.n_max_for_dim(dim);
    if let Some(n) = prefs.n {
        if n > n_max {
            result.add_warning(format!("{} 维问题 N = {} 超过上限 {}", dim, n, n_max));
        }
        if dim == 3 && n > 128 {
            result.add_warning(format!("三维 N = {} 需要 {} 个网格点", n, n.pow(3)));
        }
    }
    println!("  ✓ 已检查与预置问题 {} 的搭配", preset.name);
    Ok(())
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!();
    for w in &result.warnings {
        println!("  ⚠ 警告: {}", w);
    }
    for e in &result.errors {
        println!("  ✗ 错误: {}", e);
    }

    let ok = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };
    if ok {
        println!("\n验证通过 ({} 个警告)", result.warnings.len());
        Ok(())
    } else {
        bail!(
            "验证失败: {} 个错误, {} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
