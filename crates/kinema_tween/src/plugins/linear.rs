//! Linear arithmetic for the built-in value kinds

use std::rc::Rc;

use kinema_core::{
    Arithmetic, HookData, HookError, PluginContext, PluginLoader, PluginProposal, TweenValue,
};

/// Interpolates scalars and vectors linearly and rotations spherically
///
/// Positions of exactly 0 and 1 return the start and end values untouched, so
/// finishing or cancelling a tween restores the endpoints bit for bit.
///
/// Integers interpolate between the endpoints in `f64` and saturate to the
/// `i64` range. Their delta saturates too, so it is only exact for ranges
/// that fit in an `i64`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearArithmetic;

impl LinearArithmetic {
    pub const ID: &'static str = "kinema.linear";
}

fn mismatch(a: TweenValue, b: TweenValue) -> HookError {
    HookError::KindMismatch {
        expected: a.kind(),
        found: b.kind(),
    }
}

/// Interpolate across the full `i64` range; `as` saturates out-of-range results
fn lerp_int(a: i64, b: i64, t: f32) -> i64 {
    let span = (i128::from(b) - i128::from(a)) as f64;
    (a as f64 + span * f64::from(t)).round() as i64
}

impl Arithmetic for LinearArithmetic {
    fn delta(
        &self,
        start: TweenValue,
        end: TweenValue,
        _data: &HookData,
    ) -> Result<TweenValue, HookError> {
        use TweenValue::*;
        Ok(match (start, end) {
            (Float(a), Float(b)) => Float(b - a),
            (Double(a), Double(b)) => Double(b - a),
            (Int(a), Int(b)) => Int(b.saturating_sub(a)),
            (Vec2(a), Vec2(b)) => Vec2(b - a),
            (Vec3(a), Vec3(b)) => Vec3(b - a),
            (Vec4(a), Vec4(b)) => Vec4(b - a),
            // Rotation taking `a` to `b`
            (Quat(a), Quat(b)) => Quat(b * a.inverse()),
            _ => return Err(mismatch(start, end)),
        })
    }

    fn endpoint(
        &self,
        start: TweenValue,
        delta: TweenValue,
        _data: &HookData,
    ) -> Result<TweenValue, HookError> {
        use TweenValue::*;
        Ok(match (start, delta) {
            (Float(a), Float(d)) => Float(a + d),
            (Double(a), Double(d)) => Double(a + d),
            (Int(a), Int(d)) => Int(a.checked_add(d).ok_or_else(|| {
                HookError::Other(format!("{a} + {d} overflows an i64"))
            })?),
            (Vec2(a), Vec2(d)) => Vec2(a + d),
            (Vec3(a), Vec3(d)) => Vec3(a + d),
            (Vec4(a), Vec4(d)) => Vec4(a + d),
            (Quat(a), Quat(d)) => Quat((d * a).normalize()),
            _ => return Err(mismatch(start, delta)),
        })
    }

    fn value_at(
        &self,
        start: TweenValue,
        end: TweenValue,
        delta: TweenValue,
        position: f32,
        _data: &HookData,
    ) -> Result<TweenValue, HookError> {
        if start.kind() != end.kind() {
            return Err(mismatch(start, end));
        }
        if position == 0.0 {
            return Ok(start);
        }
        if position == 1.0 {
            return Ok(end);
        }

        use TweenValue::*;
        let t = position;
        Ok(match (start, end, delta) {
            (Float(a), _, Float(d)) => Float(a + d * t),
            (Double(a), _, Double(d)) => Double(a + d * t as f64),
            (Int(a), Int(b), Int(_)) => Int(lerp_int(a, b, t)),
            (Vec2(a), _, Vec2(d)) => Vec2(a + d * t),
            (Vec3(a), _, Vec3(d)) => Vec3(a + d * t),
            (Vec4(a), _, Vec4(d)) => Vec4(a + d * t),
            (Quat(a), Quat(b), Quat(_)) => Quat(a.slerp(b, t)),
            _ => return Err(mismatch(start, delta)),
        })
    }
}

impl PluginLoader for LinearArithmetic {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn load(&self, _ctx: &PluginContext<'_>, _required: bool) -> Option<PluginProposal> {
        Some(
            PluginProposal::new(Self::ID)
                .with_arithmetic(Rc::new(*self))
                .weak(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec2};

    fn at(start: TweenValue, end: TweenValue, position: f32) -> TweenValue {
        let delta = LinearArithmetic.delta(start, end, &None).unwrap();
        LinearArithmetic
            .value_at(start, end, delta, position, &None)
            .unwrap()
    }

    #[test]
    fn test_float_interpolation() {
        let start = TweenValue::Float(10.0);
        let end = TweenValue::Float(20.0);
        assert_eq!(at(start, end, 0.0), start);
        assert_eq!(at(start, end, 0.5), TweenValue::Float(15.0));
        assert_eq!(at(start, end, 1.0), end);
        // Overshooting easings extrapolate
        assert_eq!(at(start, end, 1.5), TweenValue::Float(25.0));
    }

    #[test]
    fn test_vector_and_int() {
        let v = at(
            TweenValue::Vec2(Vec2::ZERO),
            TweenValue::Vec2(Vec2::new(4.0, -2.0)),
            0.25,
        );
        assert_eq!(v, TweenValue::Vec2(Vec2::new(1.0, -0.5)));

        let i = at(TweenValue::Int(0), TweenValue::Int(10), 0.26);
        assert_eq!(i, TweenValue::Int(3));
    }

    #[test]
    fn test_int_wide_ranges() {
        let mid = at(TweenValue::Int(-10), TweenValue::Int(i64::MAX), 0.5);
        assert!(matches!(mid, TweenValue::Int(v) if v > i64::MAX / 2 - 16 && v < i64::MAX / 2 + 16));

        let full = at(TweenValue::Int(i64::MIN), TweenValue::Int(i64::MAX), 0.5);
        assert!(matches!(full, TweenValue::Int(v) if v.abs() <= 1));

        // Overshooting easings saturate instead of wrapping
        let over = at(TweenValue::Int(0), TweenValue::Int(i64::MAX), 1.5);
        assert_eq!(over, TweenValue::Int(i64::MAX));
        let under = at(TweenValue::Int(i64::MIN), TweenValue::Int(0), -0.5);
        assert_eq!(under, TweenValue::Int(i64::MIN));
    }

    #[test]
    fn test_int_endpoint_overflow_is_an_error() {
        let err = LinearArithmetic
            .endpoint(TweenValue::Int(i64::MAX), TweenValue::Int(1), &None)
            .unwrap_err();
        assert!(matches!(err, HookError::Other(_)));
    }

    #[test]
    fn test_endpoint_from_delta() {
        let end = LinearArithmetic
            .endpoint(TweenValue::Float(1.0), TweenValue::Float(2.5), &None)
            .unwrap();
        assert_eq!(end, TweenValue::Float(3.5));
    }

    #[test]
    fn test_quat_slerp() {
        let a = Quat::IDENTITY;
        let b = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let mid = at(TweenValue::Quat(a), TweenValue::Quat(b), 0.5);
        let expected = TweenValue::Quat(Quat::from_rotation_z(std::f32::consts::FRAC_PI_4));
        assert!(mid.approx_eq(&expected, 1e-5));
    }

    #[test]
    fn test_kind_mismatch() {
        let err = LinearArithmetic
            .delta(TweenValue::Float(0.0), TweenValue::Int(1), &None)
            .unwrap_err();
        assert!(matches!(err, HookError::KindMismatch { .. }));
    }
}
