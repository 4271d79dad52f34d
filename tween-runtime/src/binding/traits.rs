//! # Traits 模块
//!
//! 补间目标需要实现的接口。
//!
//! - [`Animatable`]：按名字读写成员的普通对象（属性 + 字段）
//! - [`Material`]：按句柄读写参数的材质类对象

use crate::value::{Color, Member, Vec4};

/// shader 参数句柄
///
/// 由 [`Material::parameter_id`] 把参数名翻译得到，解析一次后不再按名字查找。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderParamId(pub u32);

impl std::fmt::Display for ShaderParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 可动画对象接口
///
/// 对象通过此 trait 声明哪些成员可以被补间。成员分两类：
/// - 属性（property）：经过 getter/setter 的计算成员，解析时优先匹配
/// - 字段（field）：直接存储的成员
///
/// 读写都通过 `&self` 进行，对象自己用 `RefCell` 之类的内部可变性保存状态。
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct Sprite {
///     alpha: RefCell<f32>,
/// }
///
/// impl Animatable for Sprite {
///     fn has_property(&self, name: &str) -> bool {
///         name == "alpha"
///     }
///
///     fn get_property(&self, name: &str) -> Option<Member> {
///         match name {
///             "alpha" => Some((*self.alpha.borrow()).into()),
///             _ => None,
///         }
///     }
///
///     fn set_property(&self, name: &str, value: Member) -> bool {
///         match (name, value) {
///             ("alpha", Member::Value(Value::Scalar(v))) => {
///                 *self.alpha.borrow_mut() = v;
///                 true
///             }
///             _ => false,
///         }
///     }
/// }
/// ```
pub trait Animatable: 'static {
    /// 是否存在该属性
    fn has_property(&self, name: &str) -> bool;

    /// 读取属性
    ///
    /// # 返回
    /// - `Some(member)`: 属性存在
    /// - `None`: 属性不存在
    fn get_property(&self, name: &str) -> Option<Member>;

    /// 写入属性
    ///
    /// # 返回
    /// - `true`: 写入成功
    /// - `false`: 属性不存在或值类型不被接受
    fn set_property(&self, name: &str, value: Member) -> bool;

    /// 是否存在该字段
    fn has_field(&self, _name: &str) -> bool {
        false
    }

    /// 读取字段
    fn get_field(&self, _name: &str) -> Option<Member> {
        None
    }

    /// 写入字段
    fn set_field(&self, _name: &str, _value: Member) -> bool {
        false
    }
}

/// 材质类对象接口
///
/// 参数按句柄访问，向量参数统一以四维向量存取。
pub trait Material: 'static {
    /// 参数名到句柄的翻译，未知参数返回 `None`
    fn parameter_id(&self, name: &str) -> Option<ShaderParamId>;

    fn get_float(&self, id: ShaderParamId) -> f32;
    fn set_float(&self, id: ShaderParamId, value: f32);

    fn get_vector(&self, id: ShaderParamId) -> Vec4;
    fn set_vector(&self, id: ShaderParamId, value: Vec4);

    fn get_color(&self, id: ShaderParamId) -> Color;
    fn set_color(&self, id: ShaderParamId, value: Color);
}
