//! # Tween Runtime
//!
//! 通用属性补间核心库。
//!
//! ## 架构概述
//!
//! `tween-runtime` 是纯逻辑核心，不依赖 IO，也没有自己的时钟。
//! 宿主每帧把当前时间交给管理器：
//!
//! ```text
//! Host                               Runtime
//!   │                                   │
//!   │── Tween::start(&manager, delay) ─►│ register（冲突时取消旧补间）
//!   │                                   │
//!   │── manager.tick(now) ─────────────►│ advance 所有补间
//!   │                                   │ 移出已完成的补间，再调用回调
//!   │◄── 目标对象上的值被改写 ───────────│
//! ```
//!
//! ## 核心类型
//!
//! - [`Tween`]：单个补间及其状态机
//! - [`AnimationManager`]：帧驱动的管理器
//! - [`Slot`]：解析后的值槽位
//! - [`Curve`]：缓动曲线
//! - [`Value`]：可补间的值
//!
//! ## 使用示例
//!
//! ```ignore
//! use tween_runtime::{AnimationManager, Curve, Target, Tween, Value};
//!
//! let manager = AnimationManager::new();
//! let target = Target::object(sprite.clone());
//!
//! let fade = Tween::animate(&target, "alpha", Value::Scalar(0.0), 0.3, Curve::EaseOut)?;
//! fade.start_with_callback(&manager, 0.0, |t| println!("{} 结束: {:?}", t.id(), t.state()))?;
//!
//! // 主循环
//! loop {
//!     manager.tick(clock.now())?;
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`value`]：值类型与各自的插值
//! - [`easing`]：缓动曲线
//! - [`fade`]：按曲线在起止值之间插值
//! - [`binding`]：目标、成员解析与冲突标识
//! - [`tween`]：补间实体
//! - [`manager`]：管理器
//! - [`error`]：错误类型定义

pub mod binding;
pub mod easing;
pub mod error;
pub mod fade;
pub mod manager;
pub mod tween;
pub mod value;

// 重导出核心类型
pub use binding::{
    Accessor, Animatable, ConflictKey, Material, MemberId, ShaderParamId, Slot, Target, TargetId,
};
pub use easing::{BACK_OVERSHOOT, BlendSpace, Curve};
pub use error::{BindingError, FadeError, StateError, TweenError, TweenResult};
pub use fade::fade;
pub use manager::AnimationManager;
pub use tween::{Callback, Tween, TweenId, TweenState};
pub use value::{Color, Color32, Member, Quat, Value, ValueKind, Vec2, Vec3, Vec4};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let _manager = AnimationManager::new();
        let _curve = Curve::default();
        let _value = Value::Vec2(Vec2::new(1.0, 2.0));
        let _member = Member::Sequence(vec![Value::Scalar(0.0)]);
        let _state = TweenState::Initialized;
    }
}
