//! # Error 模块
//!
//! 定义 tween-runtime 中使用的错误类型。
//!
//! - [`BindingError`]：值绑定（成员解析、读写）错误
//! - [`FadeError`]：值类型与插值方式不匹配
//! - [`StateError`]：状态机契约违例
//! - [`TweenError`]：统一错误类型

use thiserror::Error;

use crate::tween::TweenState;
use crate::value::ValueKind;

/// 值绑定错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    /// 材质上不存在该 shader 参数
    #[error("未知的 shader 参数 '{name}'")]
    UnknownShaderParameter { name: String },

    /// 目标类型上既没有同名属性，也没有同名字段
    #[error("类型 {type_name} 上找不到成员 '{member}'")]
    MemberNotFound { type_name: String, member: String },

    /// shader 参数不支持数组下标
    #[error("shader 参数 '{name}' 不支持数组下标 {index}")]
    IndexedShaderParameter { name: String, index: usize },

    /// 带下标访问，但成员不是序列
    #[error("成员 '{member}' 不是可索引的序列")]
    NotIndexable { member: String },

    /// 不带下标访问，但成员是序列
    #[error("成员 '{member}' 是序列，需要指定下标")]
    NotSequence { member: String },

    /// 下标越界
    #[error("成员 '{member}' 下标 {index} 越界（长度 {len}）")]
    IndexOutOfRange {
        member: String,
        index: usize,
        len: usize,
    },

    /// 读取成员失败（目标在解析后移除了该成员）
    #[error("读取成员 '{member}' 失败")]
    Unreadable { member: String },

    /// 目标拒绝写入
    #[error("成员 '{member}' 拒绝写入 {kind:?} 类型的值")]
    Rejected { member: String, kind: ValueKind },

    /// shader 参数不支持该值类型
    #[error("shader 参数 '{name}' 不支持 {kind:?} 类型的值")]
    UnsupportedShaderKind { name: String, kind: ValueKind },
}

/// 插值错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FadeError {
    /// 起止值类型不一致
    #[error("起始值类型 {start:?} 与结束值类型 {end:?} 不一致")]
    KindMismatch { start: ValueKind, end: ValueKind },

    /// 倒数/对数插值只支持标量
    #[error("曲线 {curve} 只支持标量，实际为 {kind:?}")]
    CurveRequiresScalar { curve: &'static str, kind: ValueKind },
}

/// 状态机契约违例
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// 当前状态不允许此操作
    #[error("无效的状态转换：补间 #{id} 在 {state:?} 状态下不能执行 {operation}")]
    InvalidTransition {
        id: u64,
        operation: &'static str,
        state: TweenState,
    },
}

/// tween-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// 值绑定错误
    #[error("绑定错误: {0}")]
    Binding(#[from] BindingError),

    /// 插值错误
    #[error("插值错误: {0}")]
    Fade(#[from] FadeError),

    /// 状态错误
    #[error("状态错误: {0}")]
    State(#[from] StateError),
}

/// Result 类型别名
pub type TweenResult<T> = Result<T, TweenError>;
