//! # Target 模块
//!
//! 补间目标与冲突标识。

use std::any::TypeId;
use std::rc::Rc;

use super::traits::{Animatable, Material, ShaderParamId};

/// 补间目标
///
/// 持有目标对象的共享引用，补间存活期间目标不会被释放。
#[derive(Clone)]
pub enum Target {
    /// 普通对象实例
    Object {
        object: Rc<dyn Animatable>,
        type_name: &'static str,
    },

    /// 静态绑定：只以类型区分，不区分实例
    Static {
        members: Rc<dyn Animatable>,
        type_id: TypeId,
        type_name: &'static str,
    },

    /// 材质类对象
    Material {
        material: Rc<dyn Material>,
        type_name: &'static str,
    },
}

impl Target {
    /// 创建对象目标
    pub fn object<T: Animatable>(object: Rc<T>) -> Self {
        Self::Object {
            object,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// 创建静态绑定目标
    ///
    /// 同一类型的所有静态目标互相冲突，无论传入的是哪个值。
    pub fn of_type<T: Animatable>(members: Rc<T>) -> Self {
        Self::Static {
            members,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// 创建材质目标
    pub fn material<M: Material>(material: Rc<M>) -> Self {
        Self::Material {
            material,
            type_name: std::any::type_name::<M>(),
        }
    }

    /// 目标身份
    pub fn id(&self) -> TargetId {
        match self {
            Self::Object { object, .. } => TargetId::Instance(address(object)),
            Self::Static { type_id, .. } => TargetId::Type(*type_id),
            Self::Material { material, .. } => TargetId::Instance(address(material)),
        }
    }

    /// 目标类型名（用于错误信息和日志）
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Object { type_name, .. }
            | Self::Static { type_name, .. }
            | Self::Material { type_name, .. } => type_name,
        }
    }

    /// 是否为材质目标
    pub fn is_material(&self) -> bool {
        matches!(self, Self::Material { .. })
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("type_name", &self.type_name())
            .field("id", &self.id())
            .finish()
    }
}

fn address<T: ?Sized>(rc: &Rc<T>) -> usize {
    Rc::as_ptr(rc) as *const () as usize
}

/// 目标身份
///
/// 实例按地址区分（目标由补间持有，存活期间地址不会复用），静态绑定按类型区分。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetId {
    Instance(usize),
    Type(TypeId),
}

/// 被寻址的成员
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberId {
    Property(String),
    Field(String),
    ShaderParameter(ShaderParamId),
}

/// 冲突标识
///
/// 两个补间寻址同一 (目标, 成员, 下标) 即视为冲突，与结束值和曲线无关。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConflictKey {
    pub target: TargetId,
    pub member: MemberId,
    pub index: Option<usize>,
}

impl std::fmt::Display for ConflictKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.target {
            TargetId::Instance(addr) => write!(f, "{addr:#x}")?,
            TargetId::Type(type_id) => write!(f, "{type_id:?}")?,
        }
        match &self.member {
            MemberId::Property(name) | MemberId::Field(name) => write!(f, ".{name}")?,
            MemberId::ShaderParameter(id) => write!(f, ".{id}")?,
        }
        if let Some(index) = self.index {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}
