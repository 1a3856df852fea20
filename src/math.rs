//! Scalar and vector helpers shared by the collision pipeline.
//!
//! Everything here operates on `nalgebra::Vector2<f32>`. The tolerances are
//! fixed properties of the engine, not configuration: two points closer than
//! [`CLOSELY_EQUAL_TOLERANCE`] per component are considered the same contact,
//! and vectors shorter than [`NORMALIZE_EPSILON`] normalise to zero.

use nalgebra::{Rotation2, Vector2};

// ComplexField provides sqrt()/cos()/sin() for f32 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;

/// Per-component tolerance under which two floats count as equal.
pub const CLOSELY_EQUAL_TOLERANCE: f32 = 1e-3;

/// Vectors with a magnitude at or below this normalise to the zero vector.
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// Half-millimetre precision float comparison.
#[inline]
pub fn closely_equal(a: f32, b: f32) -> bool {
    (a - b).abs() < CLOSELY_EQUAL_TOLERANCE
}

/// Per-component [`closely_equal`] on two vectors.
#[inline]
pub fn vec_closely_equal(a: &Vector2<f32>, b: &Vector2<f32>) -> bool {
    closely_equal(a.x, b.x) && closely_equal(a.y, b.y)
}

/// Unit vector in the direction of `v`, or zero when `v` is too short to
/// normalise. Callers must tolerate the zero result.
#[inline]
pub fn normalize_or_zero(v: Vector2<f32>) -> Vector2<f32> {
    v.try_normalize(NORMALIZE_EPSILON).unwrap_or_else(Vector2::zeros)
}

/// Applies a rigid transform to a local-space point, returning world space.
///
/// Positive rotation is counter-clockwise.
#[inline]
pub fn to_world_space(p: &Vector2<f32>, position: &Vector2<f32>, rotation: f32) -> Vector2<f32> {
    Rotation2::new(rotation) * p + position
}

/// Squared distance from point `p` to segment `ab`, plus the closest point
/// on the segment.
///
/// The projection parameter is clamped to `[0, 1]`; a degenerate segment
/// collapses to the point `a`.
pub fn point_segment_distance_sq(
    a: &Vector2<f32>,
    b: &Vector2<f32>,
    p: &Vector2<f32>,
) -> (f32, Vector2<f32>) {
    let ab = b - a;
    let ap = p - a;

    let ab_length_sq = ab.norm_squared();
    if ab_length_sq <= 0.0 {
        return ((p - a).norm_squared(), *a);
    }

    let t = ap.dot(&ab) / ab_length_sq;
    let closest = if t <= 0.0 {
        *a
    } else if t >= 1.0 {
        *b
    } else {
        a + ab * t
    };

    ((p - closest).norm_squared(), closest)
}
