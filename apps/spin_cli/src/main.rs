// apps/spin_cli/src/main.rs

//! Spin 命令行界面
//!
//! 刚性周期偏微分方程指数积分器的命令行工具。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**：
//! - 预置问题通过名称查表构造
//! - 偏好从 JSON 文件读取，命令行参数覆盖

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// 刚性周期 PDE 指数积分器命令行工具
#[derive(Parser)]
#[command(name = "spin")]
#[command(author = "Spin Developers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Exponential integrator for stiff periodic PDEs", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行预置问题
    Run(commands::run::RunArgs),
    /// 列出预置问题与积分格式
    List(commands::list::ListArgs),
    /// 验证偏好文件
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::List(args) => commands::list::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
