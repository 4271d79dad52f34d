//! # Binding 模块
//!
//! 值绑定：把 (目标, 成员名, 可选下标) 解析为补间每帧读写的槽位。
//!
//! ## 解析顺序
//!
//! - 材质目标：按参数名翻译为 shader 参数句柄，找不到即报错
//! - 其他目标：先找属性，再找字段，都没有即报错
//!
//! 访问方式在解析时选定一次，之后不再按名字分派。

mod slot;
mod target;
mod traits;

pub use slot::{Accessor, MemberRef, ShaderRef, Slot};
pub use target::{ConflictKey, MemberId, Target, TargetId};
pub use traits::{Animatable, Material, ShaderParamId};
