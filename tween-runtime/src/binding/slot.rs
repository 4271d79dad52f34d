//! # Slot 模块
//!
//! 把 (目标, 成员名, 可选下标) 解析为可读写的槽位。
//!
//! 访问方式在构造时选定一次（[`Accessor`]），之后每帧直接按选定方式读写，
//! 不再按名字重新分派。下标元素的合法性（成员是否为序列、下标是否越界）
//! 推迟到首次读写时检查。

use std::rc::Rc;

use tracing::trace;

use super::target::{ConflictKey, MemberId, Target};
use super::traits::{Animatable, Material, ShaderParamId};
use crate::error::BindingError;
use crate::value::{Color, Color32, Member, Value, ValueKind, Vec2, Vec3, Vec4};

/// 对象成员引用
#[derive(Clone)]
pub struct MemberRef {
    object: Rc<dyn Animatable>,
    name: String,
}

/// shader 参数引用
#[derive(Clone)]
pub struct ShaderRef {
    material: Rc<dyn Material>,
    name: String,
    id: ShaderParamId,
}

/// 访问方式
#[derive(Clone)]
pub enum Accessor {
    /// 属性
    Property(MemberRef),
    /// 字段
    Field(MemberRef),
    /// 序列成员中的单个元素
    Element { source: Box<Accessor>, index: usize },
    /// 材质参数
    ShaderParameter(ShaderRef),
}

impl Accessor {
    /// 成员名
    pub fn name(&self) -> &str {
        match self {
            Self::Property(m) | Self::Field(m) => &m.name,
            Self::Element { source, .. } => source.name(),
            Self::ShaderParameter(s) => &s.name,
        }
    }

    fn read_member(&self) -> Result<Member, BindingError> {
        let member = match self {
            Self::Property(m) => m.object.get_property(&m.name),
            Self::Field(m) => m.object.get_field(&m.name),
            Self::Element { .. } | Self::ShaderParameter(_) => {
                return Err(BindingError::NotIndexable {
                    member: self.name().to_string(),
                });
            }
        };
        member.ok_or_else(|| BindingError::Unreadable {
            member: self.name().to_string(),
        })
    }

    fn write_member(&self, member: Member, kind: ValueKind) -> Result<(), BindingError> {
        let accepted = match self {
            Self::Property(m) => m.object.set_property(&m.name, member),
            Self::Field(m) => m.object.set_field(&m.name, member),
            Self::Element { .. } | Self::ShaderParameter(_) => false,
        };
        if accepted {
            Ok(())
        } else {
            Err(BindingError::Rejected {
                member: self.name().to_string(),
                kind,
            })
        }
    }

    /// 读取当前值
    ///
    /// `expected` 只对 shader 参数有意义：材质按值类型选择 float/vector/color 通道。
    pub fn get(&self, expected: ValueKind) -> Result<Value, BindingError> {
        match self {
            Self::Property(_) | Self::Field(_) => match self.read_member()? {
                Member::Value(value) => Ok(value),
                Member::Sequence(_) => Err(BindingError::NotSequence {
                    member: self.name().to_string(),
                }),
            },
            Self::Element { source, index } => {
                let items = source.read_sequence()?;
                items
                    .get(*index)
                    .copied()
                    .ok_or_else(|| BindingError::IndexOutOfRange {
                        member: self.name().to_string(),
                        index: *index,
                        len: items.len(),
                    })
            }
            Self::ShaderParameter(s) => s.get(expected),
        }
    }

    /// 写入新值
    pub fn set(&self, value: Value) -> Result<(), BindingError> {
        match self {
            Self::Property(_) | Self::Field(_) => self.write_member(value.into(), value.kind()),
            Self::Element { source, index } => {
                let mut items = source.read_sequence()?;
                let len = items.len();
                let slot = items
                    .get_mut(*index)
                    .ok_or_else(|| BindingError::IndexOutOfRange {
                        member: self.name().to_string(),
                        index: *index,
                        len,
                    })?;
                *slot = value;
                source.write_member(Member::Sequence(items), value.kind())
            }
            Self::ShaderParameter(s) => s.set(value),
        }
    }

    fn read_sequence(&self) -> Result<Vec<Value>, BindingError> {
        match self.read_member()? {
            Member::Sequence(items) => Ok(items),
            Member::Value(_) => Err(BindingError::NotIndexable {
                member: self.name().to_string(),
            }),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Property(_) => "property",
            Self::Field(_) => "field",
            Self::Element { .. } => "element",
            Self::ShaderParameter(_) => "shader_parameter",
        }
    }
}

impl std::fmt::Debug for Accessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Element { source, index } => f
                .debug_struct("Element")
                .field("source", source)
                .field("index", index)
                .finish(),
            Self::ShaderParameter(s) => f
                .debug_struct("ShaderParameter")
                .field("name", &s.name)
                .field("id", &s.id)
                .finish(),
            _ => write!(f, "{}({})", self.kind_name(), self.name()),
        }
    }
}

impl ShaderRef {
    fn unsupported(&self, kind: ValueKind) -> BindingError {
        BindingError::UnsupportedShaderKind {
            name: self.name.clone(),
            kind,
        }
    }

    fn get(&self, expected: ValueKind) -> Result<Value, BindingError> {
        let m = &self.material;
        let value = match expected {
            ValueKind::Scalar => Value::Scalar(m.get_float(self.id)),
            ValueKind::Vec2 => {
                let v = m.get_vector(self.id);
                Value::Vec2(Vec2::new(v.x, v.y))
            }
            ValueKind::Vec3 => {
                let v = m.get_vector(self.id);
                Value::Vec3(Vec3::new(v.x, v.y, v.z))
            }
            ValueKind::Vec4 => Value::Vec4(m.get_vector(self.id)),
            ValueKind::Color => Value::Color(m.get_color(self.id)),
            ValueKind::Color32 => Value::Color32(Color32::from(m.get_color(self.id))),
            ValueKind::Quat => return Err(self.unsupported(expected)),
        };
        Ok(value)
    }

    fn set(&self, value: Value) -> Result<(), BindingError> {
        let m = &self.material;
        match value {
            Value::Scalar(v) => m.set_float(self.id, v),
            Value::Vec2(v) => m.set_vector(self.id, Vec4::new(v.x, v.y, 0.0, 0.0)),
            Value::Vec3(v) => m.set_vector(self.id, Vec4::new(v.x, v.y, v.z, 0.0)),
            Value::Vec4(v) => m.set_vector(self.id, v),
            Value::Color(c) => m.set_color(self.id, c),
            Value::Color32(c) => m.set_color(self.id, Color::from(c)),
            Value::Quat(_) => return Err(self.unsupported(value.kind())),
        }
        Ok(())
    }
}

/// 已解析的槽位
#[derive(Clone)]
pub struct Slot {
    target: Target,
    accessor: Accessor,
    key: ConflictKey,
}

impl Slot {
    /// 解析槽位
    ///
    /// 解析顺序：材质目标按 shader 参数解析；否则先找属性，再找字段。
    ///
    /// # 参数
    /// - `target`: 目标对象
    /// - `member`: 成员名
    /// - `index`: 可选下标，存在时成员本身必须是序列（首次读写时检查）
    pub fn resolve(
        target: &Target,
        member: &str,
        index: Option<usize>,
    ) -> Result<Self, BindingError> {
        let (base, member_id) = match target {
            Target::Material { material, .. } => {
                let id = material.parameter_id(member).ok_or_else(|| {
                    BindingError::UnknownShaderParameter {
                        name: member.to_string(),
                    }
                })?;
                if let Some(index) = index {
                    return Err(BindingError::IndexedShaderParameter {
                        name: member.to_string(),
                        index,
                    });
                }
                let shader = ShaderRef {
                    material: material.clone(),
                    name: member.to_string(),
                    id,
                };
                (Accessor::ShaderParameter(shader), MemberId::ShaderParameter(id))
            }
            Target::Object { object, .. } | Target::Static { members: object, .. } => {
                let member_ref = MemberRef {
                    object: object.clone(),
                    name: member.to_string(),
                };
                if object.has_property(member) {
                    (
                        Accessor::Property(member_ref),
                        MemberId::Property(member.to_string()),
                    )
                } else if object.has_field(member) {
                    (
                        Accessor::Field(member_ref),
                        MemberId::Field(member.to_string()),
                    )
                } else {
                    return Err(BindingError::MemberNotFound {
                        type_name: target.type_name().to_string(),
                        member: member.to_string(),
                    });
                }
            }
        };

        let accessor = match index {
            Some(index) => Accessor::Element {
                source: Box::new(base),
                index,
            },
            None => base,
        };

        let key = ConflictKey {
            target: target.id(),
            member: member_id,
            index,
        };
        trace!(key = %key, accessor = ?accessor, "槽位解析完成");

        Ok(Self {
            target: target.clone(),
            accessor,
            key,
        })
    }

    /// 读取当前值
    pub fn get(&self, expected: ValueKind) -> Result<Value, BindingError> {
        self.accessor.get(expected)
    }

    /// 写入新值
    pub fn set(&self, value: Value) -> Result<(), BindingError> {
        self.accessor.set(value)
    }

    /// 冲突标识
    pub fn conflict_key(&self) -> &ConflictKey {
        &self.key
    }

    /// 访问方式
    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    /// 目标
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// 成员名
    pub fn member(&self) -> &str {
        self.accessor.name()
    }
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("target", &self.target)
            .field("accessor", &self.accessor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// 测试用对象：`alpha` 是属性，`tint` 和 `weights` 是字段
    struct Sprite {
        alpha: RefCell<f32>,
        tint: RefCell<Color>,
        weights: RefCell<Vec<Value>>,
    }

    impl Sprite {
        fn new() -> Self {
            Self {
                alpha: RefCell::new(1.0),
                tint: RefCell::new(Color::WHITE),
                weights: RefCell::new(vec![Value::Scalar(0.0), Value::Scalar(0.5)]),
            }
        }
    }

    impl Animatable for Sprite {
        fn has_property(&self, name: &str) -> bool {
            name == "alpha"
        }

        fn get_property(&self, name: &str) -> Option<Member> {
            match name {
                "alpha" => Some(Member::Value(Value::Scalar(*self.alpha.borrow()))),
                _ => None,
            }
        }

        fn set_property(&self, name: &str, value: Member) -> bool {
            match (name, value) {
                ("alpha", Member::Value(Value::Scalar(v))) => {
                    *self.alpha.borrow_mut() = v;
                    true
                }
                _ => false,
            }
        }

        fn has_field(&self, name: &str) -> bool {
            matches!(name, "tint" | "weights")
        }

        fn get_field(&self, name: &str) -> Option<Member> {
            match name {
                "tint" => Some(Member::Value(Value::Color(*self.tint.borrow()))),
                "weights" => Some(Member::Sequence(self.weights.borrow().clone())),
                _ => None,
            }
        }

        fn set_field(&self, name: &str, value: Member) -> bool {
            match (name, value) {
                ("tint", Member::Value(Value::Color(c))) => {
                    *self.tint.borrow_mut() = c;
                    true
                }
                ("weights", Member::Sequence(items)) => {
                    *self.weights.borrow_mut() = items;
                    true
                }
                _ => false,
            }
        }
    }

    /// 测试用材质
    #[derive(Default)]
    struct TestMaterial {
        names: HashMap<&'static str, ShaderParamId>,
        floats: RefCell<HashMap<ShaderParamId, f32>>,
        vectors: RefCell<HashMap<ShaderParamId, Vec4>>,
        colors: RefCell<HashMap<ShaderParamId, Color>>,
    }

    impl TestMaterial {
        fn new() -> Self {
            let mut names = HashMap::new();
            names.insert("_Glow", ShaderParamId(1));
            names.insert("_Offset", ShaderParamId(2));
            names.insert("_Tint", ShaderParamId(3));
            Self {
                names,
                ..Default::default()
            }
        }
    }

    impl Material for TestMaterial {
        fn parameter_id(&self, name: &str) -> Option<ShaderParamId> {
            self.names.get(name).copied()
        }

        fn get_float(&self, id: ShaderParamId) -> f32 {
            self.floats.borrow().get(&id).copied().unwrap_or_default()
        }

        fn set_float(&self, id: ShaderParamId, value: f32) {
            self.floats.borrow_mut().insert(id, value);
        }

        fn get_vector(&self, id: ShaderParamId) -> Vec4 {
            self.vectors.borrow().get(&id).copied().unwrap_or_default()
        }

        fn set_vector(&self, id: ShaderParamId, value: Vec4) {
            self.vectors.borrow_mut().insert(id, value);
        }

        fn get_color(&self, id: ShaderParamId) -> Color {
            self.colors.borrow().get(&id).copied().unwrap_or_default()
        }

        fn set_color(&self, id: ShaderParamId, value: Color) {
            self.colors.borrow_mut().insert(id, value);
        }
    }

    #[test]
    fn test_resolve_property_then_field() {
        let target = Target::object(Rc::new(Sprite::new()));

        let alpha = Slot::resolve(&target, "alpha", None).unwrap();
        assert!(matches!(alpha.accessor(), Accessor::Property(_)));
        assert_eq!(alpha.conflict_key().member, MemberId::Property("alpha".into()));

        let tint = Slot::resolve(&target, "tint", None).unwrap();
        assert!(matches!(tint.accessor(), Accessor::Field(_)));
        assert_eq!(tint.conflict_key().member, MemberId::Field("tint".into()));
    }

    #[test]
    fn test_member_not_found() {
        let target = Target::object(Rc::new(Sprite::new()));
        let err = Slot::resolve(&target, "unknown", None).unwrap_err();
        assert!(matches!(err, BindingError::MemberNotFound { .. }));
    }

    #[test]
    fn test_property_get_set() {
        let sprite = Rc::new(Sprite::new());
        let slot = Slot::resolve(&Target::object(sprite.clone()), "alpha", None).unwrap();

        assert_eq!(slot.get(ValueKind::Scalar).unwrap(), Value::Scalar(1.0));
        slot.set(Value::Scalar(0.25)).unwrap();
        assert_eq!(*sprite.alpha.borrow(), 0.25);
    }

    #[test]
    fn test_rejected_kind() {
        let slot = Slot::resolve(&Target::object(Rc::new(Sprite::new())), "alpha", None).unwrap();
        let err = slot.set(Value::Color(Color::BLACK)).unwrap_err();
        assert_eq!(
            err,
            BindingError::Rejected {
                member: "alpha".into(),
                kind: ValueKind::Color,
            }
        );
    }

    #[test]
    fn test_element_access() {
        let sprite = Rc::new(Sprite::new());
        let slot = Slot::resolve(&Target::object(sprite.clone()), "weights", Some(1)).unwrap();

        assert_eq!(slot.get(ValueKind::Scalar).unwrap(), Value::Scalar(0.5));
        slot.set(Value::Scalar(0.75)).unwrap();
        assert_eq!(
            *sprite.weights.borrow(),
            vec![Value::Scalar(0.0), Value::Scalar(0.75)]
        );
        assert_eq!(slot.conflict_key().index, Some(1));
    }

    #[test]
    fn test_element_errors_deferred_to_first_use() {
        let target = Target::object(Rc::new(Sprite::new()));

        // 构造时不检查序列与下标
        let out_of_range = Slot::resolve(&target, "weights", Some(5)).unwrap();
        let not_indexable = Slot::resolve(&target, "alpha", Some(0)).unwrap();

        assert_eq!(
            out_of_range.get(ValueKind::Scalar).unwrap_err(),
            BindingError::IndexOutOfRange {
                member: "weights".into(),
                index: 5,
                len: 2,
            }
        );
        assert_eq!(
            not_indexable.set(Value::Scalar(1.0)).unwrap_err(),
            BindingError::NotIndexable {
                member: "alpha".into()
            }
        );
    }

    #[test]
    fn test_sequence_without_index() {
        let slot = Slot::resolve(&Target::object(Rc::new(Sprite::new())), "weights", None).unwrap();
        assert!(matches!(
            slot.get(ValueKind::Scalar),
            Err(BindingError::NotSequence { .. })
        ));
    }

    #[test]
    fn test_shader_parameter() {
        let material = Rc::new(TestMaterial::new());
        let target = Target::material(material.clone());

        let glow = Slot::resolve(&target, "_Glow", None).unwrap();
        assert_eq!(
            glow.conflict_key().member,
            MemberId::ShaderParameter(ShaderParamId(1))
        );
        glow.set(Value::Scalar(2.0)).unwrap();
        assert_eq!(glow.get(ValueKind::Scalar).unwrap(), Value::Scalar(2.0));

        // 二维向量以四维向量存储
        let offset = Slot::resolve(&target, "_Offset", None).unwrap();
        offset.set(Value::Vec2(Vec2::new(1.0, 2.0))).unwrap();
        assert_eq!(
            material.get_vector(ShaderParamId(2)),
            Vec4::new(1.0, 2.0, 0.0, 0.0)
        );
        assert_eq!(
            offset.get(ValueKind::Vec2).unwrap(),
            Value::Vec2(Vec2::new(1.0, 2.0))
        );

        // 8 位颜色经浮点颜色读写
        let tint = Slot::resolve(&target, "_Tint", None).unwrap();
        tint.set(Value::Color32(Color32::new(255, 0, 0, 255))).unwrap();
        assert_eq!(material.get_color(ShaderParamId(3)), Color::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(
            tint.get(ValueKind::Color32).unwrap(),
            Value::Color32(Color32::new(255, 0, 0, 255))
        );
    }

    #[test]
    fn test_shader_parameter_errors() {
        let target = Target::material(Rc::new(TestMaterial::new()));

        assert_eq!(
            Slot::resolve(&target, "_Missing", None).unwrap_err(),
            BindingError::UnknownShaderParameter {
                name: "_Missing".into()
            }
        );
        assert_eq!(
            Slot::resolve(&target, "_Glow", Some(0)).unwrap_err(),
            BindingError::IndexedShaderParameter {
                name: "_Glow".into(),
                index: 0,
            }
        );

        // 旋转不能写入 shader 参数
        let glow = Slot::resolve(&target, "_Glow", None).unwrap();
        assert!(matches!(
            glow.get(ValueKind::Quat),
            Err(BindingError::UnsupportedShaderKind { .. })
        ));
    }
}
