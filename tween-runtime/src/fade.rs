//! # Fade 模块
//!
//! 根据起止值和缓动进度计算插值结果。
//!
//! 直接插值按 [`Value`] 标签分派到各类型自己的 `lerp`；
//! 倒数与对数插值只对标量定义，其他类型直接报错，不退回线性插值。

use crate::easing::{BlendSpace, Curve};
use crate::error::FadeError;
use crate::value::{Value, lerp_f32};

/// 按曲线计算归一化时间 `t` 处的值
pub fn fade(start: &Value, end: &Value, t: f32, curve: Curve) -> Result<Value, FadeError> {
    let eased = curve.apply(t);
    match curve.blend_space() {
        BlendSpace::Direct => fade_direct(start, end, eased),
        BlendSpace::Reciprocal => {
            let (a, b) = scalar_pair(start, end, curve)?;
            Ok(Value::Scalar(fade_reciprocal(a, b, eased)))
        }
        BlendSpace::Logarithmic => {
            let (a, b) = scalar_pair(start, end, curve)?;
            Ok(Value::Scalar(fade_logarithmic(a, b, eased)))
        }
    }
}

/// 在值自身空间内插值（不截断）
pub fn fade_direct(start: &Value, end: &Value, t: f32) -> Result<Value, FadeError> {
    let value = match (start, end) {
        (Value::Scalar(a), Value::Scalar(b)) => Value::Scalar(lerp_f32(*a, *b, t)),
        (Value::Vec2(a), Value::Vec2(b)) => Value::Vec2(a.lerp(*b, t)),
        (Value::Vec3(a), Value::Vec3(b)) => Value::Vec3(a.lerp(*b, t)),
        (Value::Vec4(a), Value::Vec4(b)) => Value::Vec4(a.lerp(*b, t)),
        (Value::Quat(a), Value::Quat(b)) => Value::Quat(a.lerp(*b, t)),
        (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(*b, t)),
        (Value::Color32(a), Value::Color32(b)) => Value::Color32(a.lerp(*b, t)),
        _ => {
            return Err(FadeError::KindMismatch {
                start: start.kind(),
                end: end.kind(),
            });
        }
    };
    Ok(value)
}

/// 倒数空间插值
#[inline]
pub fn fade_reciprocal(a: f32, b: f32, t: f32) -> f32 {
    1.0 / (1.0 / a + t * (1.0 / b - 1.0 / a))
}

/// 对数空间插值
#[inline]
pub fn fade_logarithmic(a: f32, b: f32, t: f32) -> f32 {
    (a.ln() + t * (b.ln() - a.ln())).exp()
}

/// 检查曲线能否作用于该值
pub fn check_curve(curve: Curve, value: &Value) -> Result<(), FadeError> {
    if curve.requires_scalar() && value.as_scalar().is_none() {
        return Err(FadeError::CurveRequiresScalar {
            curve: curve.name(),
            kind: value.kind(),
        });
    }
    Ok(())
}

fn scalar_pair(start: &Value, end: &Value, curve: Curve) -> Result<(f32, f32), FadeError> {
    check_curve(curve, start)?;
    check_curve(curve, end)?;
    match (start, end) {
        (Value::Scalar(a), Value::Scalar(b)) => Ok((*a, *b)),
        _ => Err(FadeError::KindMismatch {
            start: start.kind(),
            end: end.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Color, Color32, Vec3, ValueKind};

    fn s(v: f32) -> Value {
        Value::Scalar(v)
    }

    #[test]
    fn test_linear_midpoint() {
        let v = fade(&s(0.0), &s(10.0), 0.5, Curve::Linear).unwrap();
        assert_eq!(v, Value::Scalar(5.0));
    }

    #[test]
    fn test_linear_end_exact() {
        let v = fade(&s(3.25), &s(-7.5), 1.0, Curve::Linear).unwrap();
        assert_eq!(v, Value::Scalar(-7.5));
    }

    #[test]
    fn test_reciprocal_midpoint() {
        let v = fade(&s(2.0), &s(4.0), 0.5, Curve::LinearReciprocal).unwrap();
        let r = v.as_scalar().unwrap();
        // 1 / (1/2 + 0.5 * (1/4 - 1/2)) = 8/3，而不是 3
        assert!((r - 8.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_logarithmic_midpoint() {
        let v = fade(&s(1.0), &s(100.0), 0.5, Curve::LinearLogarithmic).unwrap();
        assert!((v.as_scalar().unwrap() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_overshoot_exceeds_end() {
        let v = fade(&s(0.0), &s(10.0), 0.9, Curve::EaseOutBack).unwrap();
        assert!(v.as_scalar().unwrap() > 10.0);
    }

    #[test]
    fn test_vector_and_color() {
        let v = fade(
            &Vec3::new(0.0, 0.0, 0.0).into(),
            &Vec3::new(4.0, 8.0, 12.0).into(),
            0.5,
            Curve::Linear,
        )
        .unwrap();
        assert_eq!(v, Value::Vec3(Vec3::new(2.0, 4.0, 6.0)));

        let c = fade(&Color::BLACK.into(), &Color::WHITE.into(), 0.5, Curve::Linear).unwrap();
        assert_eq!(c, Value::Color(Color::new(0.5, 0.5, 0.5, 1.0)));

        let c32 = fade(
            &Color32::new(0, 0, 0, 0).into(),
            &Color32::new(200, 100, 50, 255).into(),
            1.0,
            Curve::EaseInOut,
        )
        .unwrap();
        assert_eq!(c32, Value::Color32(Color32::new(200, 100, 50, 255)));
    }

    #[test]
    fn test_reciprocal_rejects_vector() {
        let err = fade(
            &Vec3::default().into(),
            &Vec3::new(1.0, 1.0, 1.0).into(),
            0.5,
            Curve::EaseInOutReciprocal,
        )
        .unwrap_err();
        assert_eq!(
            err,
            FadeError::CurveRequiresScalar {
                curve: "ease_in_out_reciprocal",
                kind: ValueKind::Vec3,
            }
        );
    }

    #[test]
    fn test_kind_mismatch() {
        let err = fade(&s(0.0), &Color::WHITE.into(), 0.5, Curve::Linear).unwrap_err();
        assert_eq!(
            err,
            FadeError::KindMismatch {
                start: ValueKind::Scalar,
                end: ValueKind::Color,
            }
        );
    }
}
