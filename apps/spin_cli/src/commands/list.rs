// apps/spin_cli/src/commands/list.rs

//! 列出预置问题与积分格式

use anyhow::{Context, Result};
use clap::Args;
use spin_config::SchemeName;
use spin_physics::presets::{self, PRESET_NAMES};

/// 列表参数
#[derive(Args)]
pub struct ListArgs {
    /// 只列出积分格式
    #[arg(long)]
    pub schemes: bool,
}

/// 执行列表命令
pub fn execute(args: ListArgs) -> Result<()> {
    if !args.schemes {
        println!("=== 预置问题 ===");
        println!(
            "{:<6} {:>4} {:>4} {:>6} {:>10} {:>10}  说明",
            "名称", "维度", "分量", "N", "dt", "终止时刻"
        );
        for name in PRESET_NAMES {
            let p = presets::create(name).with_context(|| format!("构造预置问题 {} 失败", name))?;
            println!(
                "{:<6} {:>4} {:>4} {:>6} {:>10.3e} {:>10}  {}",
                p.name,
                p.operator.dim(),
                p.operator.n_components(),
                p.suggested_n,
                p.suggested_dt,
                p.time_span.final_time(),
                p.description
            );
        }
        println!();
    }

    println!("=== 积分格式 ===");
    for scheme in SchemeName::ALL {
        let marker = if scheme == SchemeName::default() { " (默认)" } else { "" };
        println!("  {}{}", scheme, marker);
    }
    Ok(())
}
