//! # Tween CLI
//!
//! `tween-runtime` 的命令行宿主。
//!
//! 提供运行时本身不负责的部分：
//! - [`board`]：场景里的目标对象（属性板、参数表材质）
//! - [`scene`]：JSON 场景文件
//! - [`frame_loop`]：固定步长的帧驱动
//! - [`config`]：配置文件
//! - [`curves`]：曲线采样表

pub mod board;
pub mod config;
pub mod curves;
pub mod frame_loop;
pub mod scene;

pub use board::{BoardSpec, ParameterTable, PropertyBoard, TableSpec};
pub use config::{CliConfig, ConfigError};
pub use frame_loop::{FrameLoop, RunReport};
pub use scene::{CompletionRecord, Scene, SceneError, Stage, StageSnapshot, TweenSpec};

use serde::Serialize;
use tracing::info;
use tween_runtime::AnimationManager;

/// 一次场景运行的输出
#[derive(Debug, Clone, Serialize)]
pub struct SceneRun {
    pub report: RunReport,
    pub completions: Vec<CompletionRecord>,
    /// 运行结束时各目标的值
    pub state: StageSnapshot,
}

/// 加载场景中的目标，启动全部补间，并驱动到结束
pub fn run_scene(scene: &Scene, config: &CliConfig) -> Result<SceneRun, SceneError> {
    let stage = scene.check()?;
    let manager = AnimationManager::new();
    stage.launch(scene, &manager)?;
    info!(tweens = manager.active_count(), fps = config.fps, "场景已启动");

    let frame_loop = FrameLoop::new(manager, config);
    let report = frame_loop.run(|frame, time| {
        if config.trace_values {
            match serde_json::to_string(&stage.snapshot()) {
                Ok(values) => info!(frame, time, %values, "帧"),
                Err(e) => info!(frame, time, error = %e, "帧"),
            }
        }
    })?;

    Ok(SceneRun {
        report,
        completions: stage.completions(),
        state: stage.snapshot(),
    })
}
