//! Unit conversion helpers.
//!
//! RTF measures lengths in twips (1/20 point) and font sizes in half-points.
//! Serializers convert these to their own output units.

pub const TWIPS_PER_POINT: i32 = 20;
pub const HALF_POINTS_PER_POINT: i32 = 2;
pub const POINTS_PER_INCH: f32 = 72.0;

#[inline]
pub fn twips_to_points(twips: i32) -> f32 {
    twips as f32 / TWIPS_PER_POINT as f32
}

#[inline]
pub fn half_points_to_points(half_points: i32) -> f32 {
    half_points as f32 / HALF_POINTS_PER_POINT as f32
}

/// Points to CSS pixels at the given resolution.
#[inline]
pub fn points_to_px(points: f32, dpi: f32) -> f32 {
    points * dpi / POINTS_PER_INCH
}
