//! Tweenable value types
//!
//! A tween interpolates one value kind from start to end. Instead of boxing
//! arbitrary types, values travel through hooks as a small `Copy` enum of the
//! kinds the engine knows how to move: scalars and `glam` vectors.

use std::fmt;

use glam::{Quat, Vec2, Vec3, Vec4};

use crate::error::HookError;

/// The kind of a [`TweenValue`]
///
/// All endpoint values of a single tween share one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Float,
    Double,
    Int,
    Vec2,
    Vec3,
    Vec4,
    Quat,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Float => "f32",
            ValueKind::Double => "f64",
            ValueKind::Int => "i64",
            ValueKind::Vec2 => "Vec2",
            ValueKind::Vec3 => "Vec3",
            ValueKind::Vec4 => "Vec4",
            ValueKind::Quat => "Quat",
        };
        f.write_str(name)
    }
}

/// A value read from, written to, or computed for a tweened property
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenValue {
    Float(f32),
    Double(f64),
    Int(i64),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Quat(Quat),
}

impl TweenValue {
    /// Kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            TweenValue::Float(_) => ValueKind::Float,
            TweenValue::Double(_) => ValueKind::Double,
            TweenValue::Int(_) => ValueKind::Int,
            TweenValue::Vec2(_) => ValueKind::Vec2,
            TweenValue::Vec3(_) => ValueKind::Vec3,
            TweenValue::Vec4(_) => ValueKind::Vec4,
            TweenValue::Quat(_) => ValueKind::Quat,
        }
    }

    /// Check that this value has the expected kind
    pub fn expect_kind(&self, expected: ValueKind) -> Result<(), HookError> {
        let found = self.kind();
        if found == expected {
            Ok(())
        } else {
            Err(HookError::KindMismatch { expected, found })
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            TweenValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            TweenValue::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<Vec2> {
        match *self {
            TweenValue::Vec2(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match *self {
            TweenValue::Vec3(v) => Some(v),
            _ => None,
        }
    }

    /// Approximate equality within `epsilon` per component
    ///
    /// Values of different kinds are never equal.
    pub fn approx_eq(&self, other: &TweenValue, epsilon: f32) -> bool {
        match (*self, *other) {
            (TweenValue::Float(a), TweenValue::Float(b)) => (a - b).abs() <= epsilon,
            (TweenValue::Double(a), TweenValue::Double(b)) => (a - b).abs() <= epsilon as f64,
            (TweenValue::Int(a), TweenValue::Int(b)) => a == b,
            (TweenValue::Vec2(a), TweenValue::Vec2(b)) => a.abs_diff_eq(b, epsilon),
            (TweenValue::Vec3(a), TweenValue::Vec3(b)) => a.abs_diff_eq(b, epsilon),
            (TweenValue::Vec4(a), TweenValue::Vec4(b)) => a.abs_diff_eq(b, epsilon),
            (TweenValue::Quat(a), TweenValue::Quat(b)) => a.abs_diff_eq(b, epsilon),
            _ => false,
        }
    }
}

macro_rules! value_conversions {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TweenValue {
                fn from(value: $ty) -> Self {
                    TweenValue::$variant(value)
                }
            }

            impl TryFrom<TweenValue> for $ty {
                type Error = HookError;

                fn try_from(value: TweenValue) -> Result<Self, Self::Error> {
                    match value {
                        TweenValue::$variant(inner) => Ok(inner),
                        other => Err(HookError::KindMismatch {
                            expected: ValueKind::$variant,
                            found: other.kind(),
                        }),
                    }
                }
            }
        )*
    };
}

value_conversions! {
    f32 => Float,
    f64 => Double,
    i64 => Int,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Quat => Quat,
}

impl From<i32> for TweenValue {
    fn from(value: i32) -> Self {
        TweenValue::Int(value as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kind() {
        assert_eq!(TweenValue::from(1.0f32).kind(), ValueKind::Float);
        assert_eq!(TweenValue::from(3i32).kind(), ValueKind::Int);
        assert_eq!(TweenValue::from(Vec2::ONE).kind(), ValueKind::Vec2);
        assert_eq!(TweenValue::from(Quat::IDENTITY).kind(), ValueKind::Quat);
    }

    #[test]
    fn test_try_from_mismatch() {
        let value = TweenValue::Vec3(Vec3::X);
        let err = f32::try_from(value).unwrap_err();
        assert_eq!(
            err,
            HookError::KindMismatch {
                expected: ValueKind::Float,
                found: ValueKind::Vec3,
            }
        );
        assert_eq!(Vec3::try_from(value).unwrap(), Vec3::X);
    }

    #[test]
    fn test_approx_eq() {
        let a = TweenValue::Float(1.0);
        assert!(a.approx_eq(&TweenValue::Float(1.0005), 0.001));
        assert!(!a.approx_eq(&TweenValue::Float(1.1), 0.001));
        // Different kinds never compare equal
        assert!(!a.approx_eq(&TweenValue::Double(1.0), 0.001));
    }
}
