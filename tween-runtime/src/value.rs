//! # Value 模块
//!
//! 可补间的值类型。
//!
//! [`Value`] 是所有支持类型的标签联合，插值按标签分派，不做运行期类型探测。
//! 每个具体类型自带不截断（unclamped）的线性插值，超调曲线可以越过 [a, b]。

use serde::{Deserialize, Serialize};

/// 二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// 创建新的向量
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 线性插值（不截断）
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: lerp_f32(self.x, other.x, t),
            y: lerp_f32(self.y, other.y, t),
        }
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// 三维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// 创建新的向量
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// 线性插值（不截断）
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: lerp_f32(self.x, other.x, t),
            y: lerp_f32(self.y, other.y, t),
            z: lerp_f32(self.z, other.z, t),
        }
    }
}

/// 四维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    /// 创建新的向量
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// 线性插值（不截断）
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: lerp_f32(self.x, other.x, t),
            y: lerp_f32(self.y, other.y, t),
            z: lerp_f32(self.z, other.z, t),
            w: lerp_f32(self.w, other.w, t),
        }
    }
}

/// 旋转（四元数，x, y, z, w）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// 单位四元数
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// 创建新的四元数
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// 绕 Z 轴旋转 `angle` 弧度
    pub fn from_rotation_z(angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(0.0, 0.0, s, c)
    }

    fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    fn normalize(self) -> Self {
        let len2 = self.dot(self);
        if len2 > 0.0 {
            let inv = len2.sqrt().recip();
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        } else {
            self
        }
    }

    /// 归一化线性插值，走最短弧（不截断）
    pub fn lerp(self, mut other: Self, t: f32) -> Self {
        if self.dot(other) < 0.0 {
            other = Self::new(-other.x, -other.y, -other.z, -other.w);
        }
        Self::new(
            lerp_f32(self.x, other.x, t),
            lerp_f32(self.y, other.y, t),
            lerp_f32(self.z, other.z, t),
            lerp_f32(self.w, other.w, t),
        )
        .normalize()
    }
}

/// 浮点颜色（RGBA）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// 创建新的颜色
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// 逐通道线性插值（不截断）
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            r: lerp_f32(self.r, other.r, t),
            g: lerp_f32(self.g, other.g, t),
            b: lerp_f32(self.b, other.b, t),
            a: lerp_f32(self.a, other.a, t),
        }
    }
}

/// 8 位颜色（RGBA）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color32 {
    /// 创建新的颜色
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 逐通道插值
    ///
    /// 在浮点空间计算，再以饱和截断转回 8 位，超调部分被压到 0..=255。
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let channel = |a: u8, b: u8| lerp_f32(f32::from(a), f32::from(b), t) as u8;
        Self {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: channel(self.a, other.a),
        }
    }
}

impl From<Color32> for Color {
    fn from(c: Color32) -> Self {
        Self::new(
            f32::from(c.r) / 255.0,
            f32::from(c.g) / 255.0,
            f32::from(c.b) / 255.0,
            f32::from(c.a) / 255.0,
        )
    }
}

impl From<Color> for Color32 {
    fn from(c: Color) -> Self {
        let channel = |v: f32| (v * 255.0).round() as u8;
        Self::new(channel(c.r), channel(c.g), channel(c.b), channel(c.a))
    }
}

/// 标量线性插值（不截断）
///
/// 写成 `(1 - t)a + tb`，保证 `t == 1` 时精确得到 `b`。
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + t * b
}

/// 值类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Quat,
    Color,
    Color32,
}

/// 可补间的值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    Scalar(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    /// 旋转
    Quat(Quat),
    /// 浮点颜色
    Color(Color),
    /// 8 位颜色
    Color32(Color32),
}

impl Value {
    /// 值类型标签
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::Quat(_) => ValueKind::Quat,
            Value::Color(_) => ValueKind::Color,
            Value::Color32(_) => ValueKind::Color32,
        }
    }

    /// 取标量
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Scalar(v)
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Value::Vec2(v)
    }
}

impl From<Vec3> for Value {
    fn from(v: Vec3) -> Self {
        Value::Vec3(v)
    }
}

impl From<Vec4> for Value {
    fn from(v: Vec4) -> Self {
        Value::Vec4(v)
    }
}

impl From<Quat> for Value {
    fn from(v: Quat) -> Self {
        Value::Quat(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Value::Color(v)
    }
}

impl From<Color32> for Value {
    fn from(v: Color32) -> Self {
        Value::Color32(v)
    }
}

/// 目标成员持有的内容
///
/// 单个值，或可按下标访问的值序列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Member {
    Value(Value),
    Sequence(Vec<Value>),
}

impl From<Value> for Member {
    fn from(v: Value) -> Self {
        Member::Value(v)
    }
}

impl From<f32> for Member {
    fn from(v: f32) -> Self {
        Member::Value(Value::Scalar(v))
    }
}

impl From<Vec<Value>> for Member {
    fn from(v: Vec<Value>) -> Self {
        Member::Sequence(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_lerp_unclamped() {
        let a = Vec2::new(0.0, 10.0);
        let b = Vec2::new(10.0, 20.0);
        assert_eq!(a.lerp(b, 0.5), Vec2::new(5.0, 15.0));
        // 超出 [0, 1] 时继续外推
        assert_eq!(a.lerp(b, 1.5), Vec2::new(15.0, 25.0));

        let c = Vec3::new(0.0, 0.0, 0.0).lerp(Vec3::new(2.0, 4.0, 6.0), 0.5);
        assert_eq!(c, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_quat_lerp_endpoints() {
        let a = Quat::IDENTITY;
        let b = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let start = a.lerp(b, 0.0);
        let end = a.lerp(b, 1.0);
        assert!((start.w - 1.0).abs() < 1e-6);
        assert!((end.z - b.z).abs() < 1e-6);
        assert!((end.w - b.w).abs() < 1e-6);
    }

    #[test]
    fn test_quat_lerp_shortest_arc() {
        let a = Quat::IDENTITY;
        // 与 a 表示同一旋转的反号四元数
        let b = Quat::new(0.0, 0.0, 0.0, -1.0);
        let mid = a.lerp(b, 0.5);
        assert!((mid.w - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_color32_lerp_saturates() {
        let a = Color32::new(0, 100, 200, 255);
        let b = Color32::new(100, 200, 250, 255);
        assert_eq!(a.lerp(b, 0.5), Color32::new(50, 150, 225, 255));
        // 超调被压到 255
        assert_eq!(a.lerp(b, 2.0).b, 255);
    }

    #[test]
    fn test_color_conversion() {
        let c: Color = Color32::new(255, 0, 51, 255).into();
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.2).abs() < 1e-6);
        let back: Color32 = c.into();
        assert_eq!(back, Color32::new(255, 0, 51, 255));
    }

    #[test]
    fn test_value_serde_tagged() {
        let v = Value::Vec2(Vec2::new(1.0, 2.0));
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"type":"Vec2","data":{"x":1.0,"y":2.0}}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn test_member_untagged() {
        let m: Member = serde_json::from_str(r#"{"type":"Scalar","data":3.0}"#).unwrap();
        assert_eq!(m, Member::Value(Value::Scalar(3.0)));

        let seq: Member =
            serde_json::from_str(r#"[{"type":"Scalar","data":1.0},{"type":"Scalar","data":2.0}]"#)
                .unwrap();
        assert_eq!(seq, Member::Sequence(vec![Value::Scalar(1.0), Value::Scalar(2.0)]));
    }
}
