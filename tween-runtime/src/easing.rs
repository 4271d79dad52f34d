//! # Easing 模块
//!
//! 缓动曲线：把归一化时间 `t` 映射为缓动进度 `t'`。
//!
//! 缓动进度不做截断，超调曲线（[`Curve::EaseOutBack`]）在 `t < 1` 时可以大于 1。

use serde::{Deserialize, Serialize};

/// `EaseOutBack` 的超调系数
pub const BACK_OVERSHOOT: f32 = 2.0;

/// 缓动曲线
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Curve {
    /// 线性（匀速）
    Linear,
    /// 三次缓入（先慢后快）
    EaseIn,
    /// 三次缓出（先快后慢）
    #[default]
    EaseOut,
    /// 回弹缓出（越过终点再回落）
    EaseOutBack,
    /// 三次缓入缓出
    EaseInOut,
    /// 线性，倒数空间插值
    LinearReciprocal,
    /// 缓入缓出，倒数空间插值
    EaseInOutReciprocal,
    /// 线性，对数空间插值
    LinearLogarithmic,
}

/// 插值空间
///
/// 决定缓动进度如何作用到起止值上。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendSpace {
    /// 值自身空间（各类型的线性插值）
    Direct,
    /// `1 / (1/a + t'(1/b - 1/a))`
    Reciprocal,
    /// `exp(ln a + t'(ln b - ln a))`
    Logarithmic,
}

impl Curve {
    /// 全部曲线（用于枚举输出）
    pub const ALL: [Curve; 8] = [
        Curve::Linear,
        Curve::EaseIn,
        Curve::EaseOut,
        Curve::EaseOutBack,
        Curve::EaseInOut,
        Curve::LinearReciprocal,
        Curve::EaseInOutReciprocal,
        Curve::LinearLogarithmic,
    ];

    /// 计算缓动进度
    ///
    /// # 参数
    /// - `t`: 归一化时间，通常在 [0, 1]，允许外推
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Curve::Linear | Curve::LinearReciprocal | Curve::LinearLogarithmic => t,
            Curve::EaseIn => t * t * t,
            Curve::EaseOut => ease_out(t),
            Curve::EaseOutBack => ease_out_back(t, BACK_OVERSHOOT),
            Curve::EaseInOut | Curve::EaseInOutReciprocal => ease_in_out(t),
        }
    }

    /// 曲线对应的插值空间
    pub fn blend_space(&self) -> BlendSpace {
        match self {
            Curve::LinearReciprocal | Curve::EaseInOutReciprocal => BlendSpace::Reciprocal,
            Curve::LinearLogarithmic => BlendSpace::Logarithmic,
            _ => BlendSpace::Direct,
        }
    }

    /// 是否只能作用于标量
    pub fn requires_scalar(&self) -> bool {
        self.blend_space() != BlendSpace::Direct
    }

    /// 曲线名称（与序列化名一致）
    pub fn name(&self) -> &'static str {
        match self {
            Curve::Linear => "linear",
            Curve::EaseIn => "ease_in",
            Curve::EaseOut => "ease_out",
            Curve::EaseOutBack => "ease_out_back",
            Curve::EaseInOut => "ease_in_out",
            Curve::LinearReciprocal => "linear_reciprocal",
            Curve::EaseInOutReciprocal => "ease_in_out_reciprocal",
            Curve::LinearLogarithmic => "linear_logarithmic",
        }
    }
}

impl std::fmt::Display for Curve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 缓出（Cubic）
fn ease_out(t: f32) -> f32 {
    let u = t - 1.0;
    1.0 + u * u * u
}

/// 回弹缓出，`k` 为超调系数
fn ease_out_back(t: f32, k: f32) -> f32 {
    let u = t - 1.0;
    u * u * ((k + 1.0) * u + k) + 1.0
}

/// 缓入缓出（Cubic）
fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear() {
        let curve = Curve::Linear;
        assert_eq!(curve.apply(0.0), 0.0);
        assert_eq!(curve.apply(0.5), 0.5);
        assert_eq!(curve.apply(1.0), 1.0);
    }

    #[test]
    fn test_endpoints() {
        for curve in Curve::ALL {
            assert!(curve.apply(0.0).abs() < 1e-6, "{curve} 起点");
            assert!((curve.apply(1.0) - 1.0).abs() < 1e-6, "{curve} 终点");
        }
    }

    #[test]
    fn test_ease_in_out_symmetry() {
        let curve = Curve::EaseInOut;
        assert_eq!(curve.apply(0.5), 0.5);
        assert_eq!(curve.apply(0.25), 0.0625);
        assert!((curve.apply(0.75) - 0.9375).abs() < 1e-6);
    }

    #[test]
    fn test_ease_out_back_overshoot() {
        let curve = Curve::EaseOutBack;
        assert_eq!(curve.apply(1.0), 1.0);
        // (0.9 - 1)^2 * (3 * -0.1 + 2) + 1 = 1.017
        let v = curve.apply(0.9);
        assert!(v > 1.0);
        assert!((v - 1.017).abs() < 1e-5);
    }

    #[test]
    fn test_no_clamp() {
        // 外推是允许的
        assert_eq!(Curve::Linear.apply(1.5), 1.5);
        assert_eq!(Curve::EaseIn.apply(2.0), 8.0);
    }

    #[test]
    fn test_blend_space() {
        assert_eq!(Curve::EaseOut.blend_space(), BlendSpace::Direct);
        assert_eq!(Curve::LinearReciprocal.blend_space(), BlendSpace::Reciprocal);
        assert_eq!(Curve::EaseInOutReciprocal.blend_space(), BlendSpace::Reciprocal);
        assert_eq!(Curve::LinearLogarithmic.blend_space(), BlendSpace::Logarithmic);
        assert!(Curve::LinearLogarithmic.requires_scalar());
        assert!(!Curve::EaseOutBack.requires_scalar());
    }

    #[test]
    fn test_default_is_ease_out() {
        assert_eq!(Curve::default(), Curve::EaseOut);
    }
}
