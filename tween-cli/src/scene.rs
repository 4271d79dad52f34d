//! # Scene 模块
//!
//! 场景文件：目标对象、材质和要播放的补间。
//!
//! ## 文件格式
//!
//! ```json
//! {
//!   "objects": {
//!     "hero": {
//!       "properties": { "alpha": { "type": "Scalar", "data": 0.0 } },
//!       "fields": { "path": [ { "type": "Scalar", "data": 0.0 } ] }
//!     }
//!   },
//!   "materials": {
//!     "glow": { "floats": { "_Intensity": 0.0 } }
//!   },
//!   "tweens": [
//!     {
//!       "target": "hero", "member": "alpha",
//!       "to": { "type": "Scalar", "data": 1.0 },
//!       "duration": 0.5, "delay": 0.0, "curve": "ease_out",
//!       "then": { "target": "glow", "member": "_Intensity", "to": { "type": "Scalar", "data": 2.0 } }
//!     }
//!   ]
//! }
//! ```
//!
//! `then` 中的补间在前一个补间正常结束（或被强制结束）时启动，被取消则不启动。

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use tween_runtime::{AnimationManager, Curve, Target, Tween, TweenError, TweenState, Value};

use crate::board::{BoardSpec, ParameterTable, PropertyBoard, TableSpec};

/// 场景错误
#[derive(Error, Debug)]
pub enum SceneError {
    /// 读取失败
    #[error("读取场景文件 {path} 失败: {message}")]
    Io { path: String, message: String },

    /// JSON 解析失败
    #[error("场景解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    /// 对象名与材质名重复
    #[error("目标名 '{0}' 重复定义")]
    DuplicateTarget(String),

    /// 材质参数在多个分组中重复声明
    #[error("材质 '{material}' 的参数 '{name}' 重复声明")]
    DuplicateParameter { material: String, name: String },

    /// 补间引用了不存在的目标
    #[error("补间引用了未定义的目标 '{0}'")]
    UnknownTarget(String),

    /// 补间构造或运行失败
    #[error("补间 {target}.{member} 失败: {source}")]
    Tween {
        target: String,
        member: String,
        #[source]
        source: TweenError,
    },

    /// 帧循环中的补间错误
    #[error("运行失败: {0}")]
    Runtime(#[from] TweenError),
}

fn default_duration() -> f32 {
    1.0
}

/// 补间定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenSpec {
    /// 目标名（对象或材质）
    pub target: String,
    /// 成员名（属性、字段或 shader 参数）
    pub member: String,
    /// 序列成员的下标
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// 结束值
    pub to: Value,
    /// 时长（秒）
    #[serde(default = "default_duration")]
    pub duration: f32,
    /// 相对启动时刻的延迟（秒）
    #[serde(default)]
    pub delay: f32,
    #[serde(default)]
    pub curve: Curve,
    /// 结束后接着播放的补间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<Box<TweenSpec>>,
}

impl TweenSpec {
    /// 本补间及其后续链条
    pub fn chain(&self) -> impl Iterator<Item = &TweenSpec> {
        std::iter::successors(Some(self), |spec| spec.then.as_deref())
    }
}

/// 场景
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub objects: BTreeMap<String, BoardSpec>,
    #[serde(default)]
    pub materials: BTreeMap<String, TableSpec>,
    #[serde(default)]
    pub tweens: Vec<TweenSpec>,
}

impl Scene {
    /// 从 JSON 文本解析
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SceneError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&text)
    }

    /// 补间总数（含 `then` 链）
    pub fn tween_count(&self) -> usize {
        self.tweens.iter().map(|spec| spec.chain().count()).sum()
    }

    /// 创建目标对象
    pub fn instantiate(&self) -> Result<Stage, SceneError> {
        let mut boards = BTreeMap::new();
        let mut tables = BTreeMap::new();
        let mut targets = BTreeMap::new();

        for (name, spec) in &self.objects {
            let board = Rc::new(PropertyBoard::new(spec));
            targets.insert(name.clone(), Target::object(board.clone()));
            boards.insert(name.clone(), board);
        }

        for (name, spec) in &self.materials {
            if targets.contains_key(name) {
                return Err(SceneError::DuplicateTarget(name.clone()));
            }
            let table = ParameterTable::new(spec).map_err(|param| SceneError::DuplicateParameter {
                material: name.clone(),
                name: param,
            })?;
            let table = Rc::new(table);
            targets.insert(name.clone(), Target::material(table.clone()));
            tables.insert(name.clone(), table);
        }

        Ok(Stage {
            boards,
            tables,
            targets: Rc::new(targets),
            completions: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// 检查场景：创建目标并解析每一个补间（不启动）
    pub fn check(&self) -> Result<Stage, SceneError> {
        let stage = self.instantiate()?;
        for spec in self.tweens.iter().flat_map(TweenSpec::chain) {
            stage.build(spec)?;
        }
        Ok(stage)
    }
}

/// 补间结束记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRecord {
    pub id: u64,
    pub target: String,
    pub member: String,
    pub state: TweenState,
    /// 结束时管理器的时间
    pub time: f32,
}

/// 场景的运行时实例
pub struct Stage {
    boards: BTreeMap<String, Rc<PropertyBoard>>,
    tables: BTreeMap<String, Rc<ParameterTable>>,
    targets: Rc<BTreeMap<String, Target>>,
    completions: Rc<RefCell<Vec<CompletionRecord>>>,
}

/// 场景当前状态（用于输出）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageSnapshot {
    pub objects: BTreeMap<String, BoardSpec>,
    pub materials: BTreeMap<String, TableSpec>,
}

impl Stage {
    /// 按定义构造补间
    pub fn build(&self, spec: &TweenSpec) -> Result<Tween, SceneError> {
        build_tween(&self.targets, spec)
    }

    /// 启动场景中的全部补间
    pub fn launch(&self, scene: &Scene, manager: &AnimationManager) -> Result<(), SceneError> {
        for spec in &scene.tweens {
            launch_tween(&self.targets, &self.completions, manager, spec)?;
        }
        Ok(())
    }

    /// 已结束补间的记录
    pub fn completions(&self) -> Vec<CompletionRecord> {
        self.completions.borrow().clone()
    }

    pub fn board(&self, name: &str) -> Option<&Rc<PropertyBoard>> {
        self.boards.get(name)
    }

    pub fn table(&self, name: &str) -> Option<&Rc<ParameterTable>> {
        self.tables.get(name)
    }

    pub fn snapshot(&self) -> StageSnapshot {
        StageSnapshot {
            objects: self
                .boards
                .iter()
                .map(|(name, board)| (name.clone(), board.snapshot()))
                .collect(),
            materials: self
                .tables
                .iter()
                .map(|(name, table)| (name.clone(), table.snapshot()))
                .collect(),
        }
    }
}

fn build_tween(targets: &BTreeMap<String, Target>, spec: &TweenSpec) -> Result<Tween, SceneError> {
    let target = targets
        .get(&spec.target)
        .ok_or_else(|| SceneError::UnknownTarget(spec.target.clone()))?;

    let result = match spec.index {
        Some(index) => Tween::animate_element(
            target,
            &spec.member,
            index,
            spec.to,
            spec.duration,
            spec.curve,
        ),
        None => Tween::animate(target, &spec.member, spec.to, spec.duration, spec.curve),
    };
    result.map_err(|source| SceneError::Tween {
        target: spec.target.clone(),
        member: spec.member.clone(),
        source,
    })
}

fn launch_tween(
    targets: &Rc<BTreeMap<String, Target>>,
    completions: &Rc<RefCell<Vec<CompletionRecord>>>,
    manager: &AnimationManager,
    spec: &TweenSpec,
) -> Result<(), SceneError> {
    let tween = build_tween(targets, spec)?;

    let next = spec.then.clone();
    let targets_for_next = targets.clone();
    let log = completions.clone();
    let handle = manager.clone();
    let (target, member) = (spec.target.clone(), spec.member.clone());

    let on_complete = move |t: &Tween| {
        log.borrow_mut().push(CompletionRecord {
            id: t.id().get(),
            target,
            member,
            state: t.state(),
            time: handle.now(),
        });

        let Some(next) = next else {
            return;
        };
        if t.state() == TweenState::Canceled {
            debug!(id = %t.id(), "补间被取消，不启动后续补间");
            return;
        }
        // 回调无法向上返回错误，只记录日志
        if let Err(e) = launch_tween(&targets_for_next, &log, &handle, &next) {
            error!(target = %next.target, member = %next.member, error = %e, "后续补间启动失败");
        }
    };

    tween
        .start_with_callback(manager, spec.delay, on_complete)
        .map_err(|source| SceneError::Tween {
            target: spec.target.clone(),
            member: spec.member.clone(),
            source,
        })
}
