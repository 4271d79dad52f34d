//! # tween
//!
//! 补间场景运行器。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p tween-cli -- run scenes/demo.json
//! cargo run -p tween-cli -- run scenes/demo.json --fps 30 --log-level debug
//! cargo run -p tween-cli -- run scenes/demo.json --config tween.json
//! cargo run -p tween-cli -- curves --samples 11
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, reload};
use tween_cli::{CliConfig, Scene, curves, run_scene};

#[derive(Parser)]
#[command(name = "tween")]
#[command(about = "补间场景运行器 - 以固定帧率播放场景文件中的补间")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行场景，输出最终值（JSON）
    Run {
        /// 场景文件路径
        scene: PathBuf,

        /// 配置文件（默认：tween.json）
        #[arg(long, default_value = "tween.json")]
        config: PathBuf,

        /// 帧率，覆盖配置文件
        #[arg(long)]
        fps: Option<u32>,

        /// 日志级别，覆盖配置文件
        #[arg(long)]
        log_level: Option<String>,
    },

    /// 打印缓动曲线采样表
    Curves {
        /// 采样点数量
        #[arg(long, default_value_t = 5)]
        samples: usize,
    },
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// 安装日志 subscriber
///
/// 设置了 `RUST_LOG` 时以环境变量为准，且不再被配置覆盖。
/// 已有全局 subscriber 时返回错误。
fn init_tracing(level: &str) -> anyhow::Result<Option<FilterHandle>> {
    let from_env = EnvFilter::try_from_default_env().ok();
    let overridable = from_env.is_none();
    let filter = from_env.unwrap_or_else(|| EnvFilter::new(level));

    let (filter_layer, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber).context("无法安装日志 subscriber")?;

    Ok(overridable.then_some(handle))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scene,
            config,
            fps,
            log_level,
        } => {
            // 配置文件的加载日志需要先有 subscriber，级别在配置生效后再调整
            let filter = init_tracing(log_level.as_deref().unwrap_or("info"))?;

            let mut config = CliConfig::load(&config);
            if let Some(fps) = fps {
                config.fps = fps;
            }
            if let Some(level) = log_level {
                config.log_level = level;
            }
            config.validate()?;
            if let Some(filter) = filter {
                filter.modify(|f| *f = EnvFilter::new(&config.log_level))?;
            }
            tracing::debug!(?config, "生效配置");

            let scene = Scene::load(&scene)
                .with_context(|| format!("无法加载场景 {}", scene.display()))?;
            let run = run_scene(&scene, &config)?;

            println!("{}", serde_json::to_string_pretty(&run)?);
        }
        Commands::Curves { samples } => {
            println!("{}", curves::render_table(samples));
        }
    }

    Ok(())
}
