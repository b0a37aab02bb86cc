// apps/spin_cli/src/commands/run.rs

//! 运行预置问题
//!
//! 偏好来源按优先级：命令行参数 > `--config` 文件 > 预置问题的建议 N 与 dt。
//! 结果以 CSV 写出：每行一个 (时刻, 网格点)，列为坐标与各分量实部/虚部。

use anyhow::{Context, Result};
use clap::Args;
use spin_config::{Preferences, SchemeName};
use spin_physics::presets;
use spin_physics::{Progress, Simulation, SimulationResult, TimeSpan};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 预置问题名称（见 `spin list`）
    pub preset: String,

    /// 偏好文件路径 (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 覆盖最终时刻
    #[arg(short = 't', long)]
    pub t_final: Option<f64>,

    /// 输出时刻列表，逗号分隔
    #[arg(long, value_delimiter = ',')]
    pub outputs: Vec<f64>,

    /// 每维点数
    #[arg(short, long)]
    pub n: Option<usize>,

    /// 时间步长
    #[arg(long)]
    pub dt: Option<f64>,

    /// 积分格式
    #[arg(short, long)]
    pub scheme: Option<String>,

    /// 自动选择容差
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// 忽略建议值，自动选择 N 与 dt
    #[arg(long)]
    pub auto: bool,

    /// 对非线性项做 2/3 去混叠
    #[arg(long)]
    pub dealias: bool,

    /// 每隔多少步输出一次进度
    #[arg(long)]
    pub progress_every: Option<usize>,

    /// 结果 CSV 文件
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== Spin 模拟启动 ===");

    let preset = presets::create(&args.preset)
        .with_context(|| format!("无法创建预置问题 {}", args.preset))?;
    info!("预置问题: {} - {}", preset.name, preset.description);

    let prefs = build_preferences(&args, preset.preferences())?;
    let span = build_time_span(&args, &preset.time_span)?;

    info!(
        "格式: {}, N: {}, dt: {}, 容差: {:.1e}",
        prefs.scheme,
        prefs.n.map_or("auto".to_string(), |n| n.to_string()),
        prefs.dt.map_or("auto".to_string(), |dt| dt.to_string()),
        prefs.tolerance
    );

    let start = span.start();
    let mut simulation = Simulation::new(&preset.operator, &span, &preset.initial)
        .preferences(prefs);
    if args.progress_every.is_some_and(|k| k > 0) {
        simulation = simulation.with_progress(Arc::new(move |p: &Progress| {
            info!(
                "[{}] t={:.4} ({:.1}%), step={}, dt={:.3e}, N={}",
                p.phase,
                p.time,
                100.0 * p.fraction(start),
                p.step,
                p.dt,
                p.n
            );
        }));
    }

    let result = match simulation.run() {
        Ok(r) => r,
        Err(e) => {
            if let (Some(partial), Some(path)) = (e.partial_result(), &args.output) {
                warn!("写出部分结果: t={}", partial.final_time());
                write_csv(partial, path)?;
            }
            return Err(e).context("积分失败");
        }
    };

    print_summary(&result);
    if let Some(path) = &args.output {
        write_csv(&result, path)?;
        info!("结果已写入 {}", path.display());
    }
    Ok(())
}

fn build_preferences(args: &RunArgs, suggested: Preferences) -> Result<Preferences> {
    let mut prefs = match &args.config {
        Some(path) => Preferences::from_file(path)
            .with_context(|| format!("无法读取偏好文件 {}", path.display()))?,
        None => suggested,
    };
    if args.auto {
        prefs.n = None;
        prefs.dt = None;
    }
    if let Some(n) = args.n {
        prefs.n = Some(n);
    }
    if let Some(dt) = args.dt {
        prefs.dt = Some(dt);
    }
    if let Some(s) = &args.scheme {
        prefs.scheme = s.parse::<SchemeName>()?;
    }
    if let Some(tol) = args.tolerance {
        prefs.tolerance = tol;
    }
    if args.dealias {
        prefs.dealias = true;
    }
    if let Some(k) = args.progress_every {
        prefs.progress_every = k;
    }
    prefs.validate().context("偏好无效")?;
    Ok(prefs)
}

fn build_time_span(args: &RunArgs, default: &TimeSpan) -> Result<TimeSpan> {
    let span = if !args.outputs.is_empty() {
        TimeSpan::new(default.start(), args.outputs.clone())?
    } else if let Some(t) = args.t_final {
        default.with_final_time(t)?
    } else {
        default.clone()
    };
    Ok(span)
}

fn print_summary(result: &SimulationResult) {
    let stats = result.stats();
    info!("=== 模拟完成 ({}) ===", result.status());
    info!("格式: {}, N: {}, dt: {:.3e}", stats.scheme, stats.n, stats.dt);
    info!("步数: {}, 非线性求值: {}", stats.steps, stats.nonlinear_evaluations);
    info!("尝试次数: {}", stats.attempts);
    info!("计算时间: {:.2} s", stats.wall_seconds);
    for snap in result.snapshots() {
        info!(
            "t={:.4}: max|u|={:.6e}, max|Im u|={:.3e}",
            snap.time,
            snap.state.max_abs(),
            snap.state.max_imaginary()
        );
    }
}

fn write_csv(result: &SimulationResult, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("无法创建输出文件 {}", path.display()))?;
    let mut w = BufWriter::new(file);
    let grid = result.grid();
    let dim = grid.dim();
    let m = result.final_state().n_components();

    let mut header = vec!["t".to_string()];
    header.extend(["x", "y", "z"].iter().take(dim).map(|s| s.to_string()));
    for c in 0..m {
        header.push(format!("u{}_re", c));
        header.push(format!("u{}_im", c));
    }
    writeln!(w, "{}", header.join(","))?;

    for snap in result.snapshots() {
        for flat in 0..grid.len() {
            let x = grid.point(flat);
            let mut row = vec![format!("{}", snap.time)];
            row.extend(x.iter().take(dim).map(|v| format!("{:.12e}", v)));
            for c in 0..m {
                let v = snap.state.component(c)[flat];
                row.push(format!("{:.12e}", v.re));
                row.push(format!("{:.12e}", v.im));
            }
            writeln!(w, "{}", row.join(","))?;
        }
    }
    w.flush()?;
    Ok(())
}
