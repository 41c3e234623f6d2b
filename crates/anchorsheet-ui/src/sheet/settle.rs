//! Settle duration math.
//!
//! The curve is the horizontal snap-duration curve of a drag helper, weighted
//! by the container width even though the sheet moves vertically.

use anchorsheet_foundation::clamp_magnitude;

/// Upper bound for any settle, in milliseconds.
pub const MAX_SETTLE_DURATION_MS: i32 = 200;

const BASE_SETTLE_DURATION_MS: f32 = 256.0;

/// 0.3 * PI / 2: maps the centred distance ratio onto the sine's gentle part.
const SNAP_INFLUENCE: f32 = 0.471_238_94;

fn distance_influence_for_snap_duration(fraction: f32) -> f32 {
    ((fraction - 0.5) * SNAP_INFLUENCE).sin()
}

/// Duration of a settle covering `delta` pixels after a release at
/// `velocity` px/s, where `motion_range` is the vertical drag range.
pub fn compute_axis_duration(delta: i32, velocity: i32, motion_range: i32, width: i32) -> i32 {
    if delta == 0 {
        return 0;
    }
    let half_width = (width / 2) as f32;
    let distance_ratio = if width > 0 {
        (delta.abs() as f32 / width as f32).min(1.0)
    } else {
        1.0
    };
    let distance = half_width + half_width * distance_influence_for_snap_duration(distance_ratio);

    let velocity = velocity.abs();
    let duration = if velocity > 0 {
        4 * (1000.0 * (distance / velocity as f32).abs()).round() as i32
    } else if motion_range > 0 {
        let range = delta.abs() as f32 / motion_range as f32;
        ((range + 1.0) * BASE_SETTLE_DURATION_MS).round() as i32
    } else {
        MAX_SETTLE_DURATION_MS
    };
    duration.min(MAX_SETTLE_DURATION_MS)
}

/// Clamps the release velocity with the recognizer's rule, then computes the
/// settle duration in milliseconds.
pub fn compute_settle_duration(
    delta: i32,
    y_velocity: i32,
    min_velocity: f32,
    max_velocity: f32,
    motion_range: i32,
    width: i32,
) -> u64 {
    let velocity = clamp_magnitude(
        y_velocity as f32,
        min_velocity.trunc(),
        max_velocity.trunc(),
    ) as i32;
    compute_axis_duration(delta, velocity, motion_range, width).max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_distance_means_no_duration() {
        assert_eq!(compute_axis_duration(0, 3000, 1000, 400), 0);
        assert_eq!(compute_settle_duration(0, 0, 100.0, 3000.0, 1000, 400), 0);
    }

    #[test]
    fn stationary_settle_is_capped() {
        // (|delta| / range + 1) * 256 never fits under the cap.
        assert_eq!(compute_axis_duration(283, 0, 1000, 400), 200);
        assert_eq!(compute_axis_duration(-283, 0, 1000, 400), 200);
    }

    #[test]
    fn fast_release_over_a_narrow_container_is_short() {
        // distance = 50 + 50 * sin(-0.4 * 0.4712) ~= 40.63 -> 4 * round(13.54)
        assert_eq!(compute_axis_duration(10, 3000, 1000, 100), 56);
        assert_eq!(compute_axis_duration(10, -3000, 1000, 100), 56);
    }

    #[test]
    fn release_velocity_is_clamped_before_use() {
        // 50 px/s is noise: same as a stationary release.
        assert_eq!(compute_settle_duration(10, 50, 100.0, 3000.0, 1000, 100), 200);
        // 9000 px/s saturates at 3000.
        assert_eq!(compute_settle_duration(10, 9000, 100.0, 3000.0, 1000, 100), 56);
    }

    #[test]
    fn degenerate_geometry_still_yields_a_bounded_duration() {
        assert_eq!(compute_axis_duration(100, 0, 0, 0), 200);
        assert_eq!(compute_axis_duration(100, 3000, 1000, 0), 0);
    }
}
