//! # Board 模块
//!
//! 场景里的补间目标。
//!
//! - [`PropertyBoard`]：按名字保存属性与字段的普通对象
//! - [`ParameterTable`]：按句柄读写参数的材质

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tween_runtime::{Animatable, Color, Material, Member, ShaderParamId, Vec4};

/// 对象定义（场景文件中的一项）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSpec {
    #[serde(default)]
    pub properties: BTreeMap<String, Member>,
    #[serde(default)]
    pub fields: BTreeMap<String, Member>,
}

/// 属性板
///
/// 写入时要求新值与已有成员形状一致：单值只接受同类型单值，序列只接受序列。
#[derive(Debug, Default)]
pub struct PropertyBoard {
    properties: RefCell<BTreeMap<String, Member>>,
    fields: RefCell<BTreeMap<String, Member>>,
}

impl PropertyBoard {
    pub fn new(spec: &BoardSpec) -> Self {
        Self {
            properties: RefCell::new(spec.properties.clone()),
            fields: RefCell::new(spec.fields.clone()),
        }
    }

    /// 当前内容
    pub fn snapshot(&self) -> BoardSpec {
        BoardSpec {
            properties: self.properties.borrow().clone(),
            fields: self.fields.borrow().clone(),
        }
    }
}

fn write_member(map: &RefCell<BTreeMap<String, Member>>, name: &str, value: Member) -> bool {
    let mut map = map.borrow_mut();
    let Some(slot) = map.get_mut(name) else {
        return false;
    };
    let compatible = match (&*slot, &value) {
        (Member::Value(old), Member::Value(new)) => old.kind() == new.kind(),
        (Member::Sequence(_), Member::Sequence(_)) => true,
        _ => false,
    };
    if compatible {
        *slot = value;
    }
    compatible
}

impl Animatable for PropertyBoard {
    fn has_property(&self, name: &str) -> bool {
        self.properties.borrow().contains_key(name)
    }

    fn get_property(&self, name: &str) -> Option<Member> {
        self.properties.borrow().get(name).cloned()
    }

    fn set_property(&self, name: &str, value: Member) -> bool {
        write_member(&self.properties, name, value)
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.borrow().contains_key(name)
    }

    fn get_field(&self, name: &str) -> Option<Member> {
        self.fields.borrow().get(name).cloned()
    }

    fn set_field(&self, name: &str, value: Member) -> bool {
        write_member(&self.fields, name, value)
    }
}

/// 材质定义（场景文件中的一项）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    #[serde(default)]
    pub floats: BTreeMap<String, f32>,
    #[serde(default)]
    pub vectors: BTreeMap<String, Vec4>,
    #[serde(default)]
    pub colors: BTreeMap<String, Color>,
}

impl TableSpec {
    /// 所有参数名（按字典序，含重复声明检测）
    fn names(&self) -> Result<BTreeSet<&str>, String> {
        let mut names = BTreeSet::new();
        let all = self
            .floats
            .keys()
            .chain(self.vectors.keys())
            .chain(self.colors.keys());
        for name in all {
            if !names.insert(name.as_str()) {
                return Err(name.clone());
            }
        }
        Ok(names)
    }
}

/// 参数表材质
///
/// 参数句柄按参数名字典序从 1 开始分配，同一份定义得到的句柄稳定不变。
#[derive(Debug, Default)]
pub struct ParameterTable {
    ids: BTreeMap<String, ShaderParamId>,
    floats: RefCell<BTreeMap<ShaderParamId, f32>>,
    vectors: RefCell<BTreeMap<ShaderParamId, Vec4>>,
    colors: RefCell<BTreeMap<ShaderParamId, Color>>,
}

impl ParameterTable {
    /// 创建参数表
    ///
    /// # 返回
    /// - `Err(name)`: 同一参数名在多个分组中重复声明
    pub fn new(spec: &TableSpec) -> Result<Self, String> {
        let ids: BTreeMap<String, ShaderParamId> = spec
            .names()?
            .into_iter()
            .zip(1..)
            .map(|(name, id)| (name.to_string(), ShaderParamId(id)))
            .collect();

        let mut floats = BTreeMap::new();
        let mut vectors = BTreeMap::new();
        let mut colors = BTreeMap::new();
        for (name, &id) in &ids {
            if let Some(v) = spec.floats.get(name) {
                floats.insert(id, *v);
            }
            if let Some(v) = spec.vectors.get(name) {
                vectors.insert(id, *v);
            }
            if let Some(v) = spec.colors.get(name) {
                colors.insert(id, *v);
            }
        }

        Ok(Self {
            ids,
            floats: RefCell::new(floats),
            vectors: RefCell::new(vectors),
            colors: RefCell::new(colors),
        })
    }

    /// 当前内容
    pub fn snapshot(&self) -> TableSpec {
        let mut spec = TableSpec::default();
        for (name, id) in &self.ids {
            if let Some(v) = self.floats.borrow().get(id) {
                spec.floats.insert(name.clone(), *v);
            }
            if let Some(v) = self.vectors.borrow().get(id) {
                spec.vectors.insert(name.clone(), *v);
            }
            if let Some(v) = self.colors.borrow().get(id) {
                spec.colors.insert(name.clone(), *v);
            }
        }
        spec
    }
}

impl Material for ParameterTable {
    fn parameter_id(&self, name: &str) -> Option<ShaderParamId> {
        self.ids.get(name).copied()
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

#[cfg(test)]
mod tests {
    use super::*;
    use tween_runtime::Value;

    fn board() -> PropertyBoard {
        let mut spec = BoardSpec::default();
        spec.properties
            .insert("alpha".into(), Member::Value(Value::Scalar(1.0)));
        spec.fields.insert(
            "stops".into(),
            Member::Sequence(vec![Value::Scalar(0.0), Value::Scalar(1.0)]),
        );
        PropertyBoard::new(&spec)
    }

    #[test]
    fn test_board_members() {
        let board = board();
        assert!(board.has_property("alpha"));
        assert!(!board.has_property("stops"));
        assert!(board.has_field("stops"));
        assert_eq!(
            board.get_property("alpha"),
            Some(Member::Value(Value::Scalar(1.0)))
        );
    }

    #[test]
    fn test_board_rejects_shape_change() {
        let board = board();

        assert!(board.set_property("alpha", Member::Value(Value::Scalar(0.5))));
        assert!(!board.set_property("alpha", Member::Value(Value::Color(Color::WHITE))));
        assert!(!board.set_property("alpha", Member::Sequence(Vec::new())));
        assert!(!board.set_property("missing", Member::Value(Value::Scalar(0.0))));
        assert!(board.set_field("stops", Member::Sequence(vec![Value::Scalar(3.0)])));

        let snapshot = board.snapshot();
        assert_eq!(
            snapshot.properties["alpha"],
            Member::Value(Value::Scalar(0.5))
        );
        assert_eq!(
            snapshot.fields["stops"],
            Member::Sequence(vec![Value::Scalar(3.0)])
        );
    }

    #[test]
    fn test_table_ids_sorted_by_name() {
        let mut spec = TableSpec::default();
        spec.floats.insert("_Glow".into(), 0.5);
        spec.colors.insert("_Base".into(), Color::BLACK);

        let table = ParameterTable::new(&spec).unwrap();
        assert_eq!(table.parameter_id("_Base"), Some(ShaderParamId(1)));
        assert_eq!(table.parameter_id("_Glow"), Some(ShaderParamId(2)));
        assert_eq!(table.parameter_id("_Missing"), None);
        assert_eq!(table.get_float(ShaderParamId(2)), 0.5);
    }

    #[test]
    fn test_table_duplicate_name() {
        let mut spec = TableSpec::default();
        spec.floats.insert("_Tint".into(), 0.0);
        spec.colors.insert("_Tint".into(), Color::WHITE);

        assert_eq!(ParameterTable::new(&spec).unwrap_err(), "_Tint");
    }

    #[test]
    fn test_table_snapshot_round_trip() {
        let mut spec = TableSpec::default();
        spec.vectors
            .insert("_Offset".into(), Vec4::new(1.0, 2.0, 3.0, 4.0));
        let table = ParameterTable::new(&spec).unwrap();

        let id = table.parameter_id("_Offset").unwrap();
        table.set_vector(id, Vec4::new(0.0, 0.0, 0.0, 1.0));

        assert_eq!(
            table.snapshot().vectors["_Offset"],
            Vec4::new(0.0, 0.0, 0.0, 1.0)
        );
    }
}
