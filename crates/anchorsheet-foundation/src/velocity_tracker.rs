//! Release velocity estimation.
//!
//! The drag recognizer feeds every sample of its active pointer into a
//! [`VelocityEstimator`]. The default [`VelocityTracker`] runs the impulse
//! strategy on each axis independently.

use anchorsheet_ui_graphics::Point;
use smallvec::SmallVec;

/// Samples kept per axis.
const HISTORY_SIZE: usize = 20;

/// Samples further than this from the newest one are stale: the pointer is
/// considered to have stopped in between.
pub const ASSUME_STOPPED_MS: i64 = 40;

/// Velocity estimation primitive: feed timed positions, then ask for the
/// velocity over a time base.
pub trait VelocityEstimator {
    fn add_sample(&mut self, time_ms: i64, position: Point);

    /// Computes the current velocity in pixels per `units_ms` milliseconds.
    fn compute_current_velocity(&mut self, units_ms: u32);

    fn horizontal_velocity(&self) -> f32;

    fn vertical_velocity(&self) -> f32;

    fn clear(&mut self);
}

#[derive(Clone, Copy, Debug)]
struct Sample {
    time_ms: i64,
    value: f32,
}

/// Impulse-based estimator for one axis.
///
/// The pointer is treated as a unit mass. Each pair of consecutive samples
/// does work on it, and the estimate is the velocity whose kinetic energy
/// matches the accumulated work. This weighs recent motion heavily without
/// the overshoot a least-squares fit shows on sharp direction changes.
#[derive(Clone, Debug, Default)]
pub struct AxisVelocityTracker {
    history: [Option<Sample>; HISTORY_SIZE],
    next: usize,
}

impl AxisVelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an absolute position at `time_ms`.
    pub fn add_data_point(&mut self, time_ms: i64, value: f32) {
        self.history[self.next] = Some(Sample { time_ms, value });
        self.next = (self.next + 1) % HISTORY_SIZE;
    }

    /// Velocity in units per second; zero with fewer than two fresh samples.
    pub fn calculate_velocity(&self) -> f32 {
        let mut window = self.fresh_samples();
        if window.len() < 2 {
            return 0.0;
        }
        window.reverse();
        let per_second = impulse_velocity(&window) * 1000.0;
        if per_second.is_finite() {
            per_second
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Samples within [`ASSUME_STOPPED_MS`] of the newest one, newest first.
    fn fresh_samples(&self) -> SmallVec<[Sample; HISTORY_SIZE]> {
        let mut window = SmallVec::new();
        let newest_index = (self.next + HISTORY_SIZE - 1) % HISTORY_SIZE;
        let Some(newest) = self.history[newest_index] else {
            return window;
        };
        for back in 0..HISTORY_SIZE {
            let index = (newest_index + HISTORY_SIZE - back) % HISTORY_SIZE;
            let Some(sample) = self.history[index] else {
                break;
            };
            if (newest.time_ms - sample.time_ms).abs() > ASSUME_STOPPED_MS {
                break;
            }
            window.push(sample);
        }
        window
    }
}

/// Velocity per millisecond of chronologically ordered samples.
fn impulse_velocity(samples: &[Sample]) -> f32 {
    let mut work = 0.0f32;
    for (index, pair) in samples.windows(2).enumerate() {
        let (earlier, later) = (pair[0], pair[1]);
        if earlier.time_ms == later.time_ms {
            continue;
        }
        let velocity = (later.value - earlier.value) / (later.time_ms - earlier.time_ms) as f32;
        work += (velocity - energy_to_velocity(work)) * velocity.abs();
        if index == 0 {
            // The first segment starts from rest.
            work *= 0.5;
        }
    }
    energy_to_velocity(work)
}

/// Inverse of `E = v^2 / 2` for a unit mass, keeping the sign of `energy`.
fn energy_to_velocity(energy: f32) -> f32 {
    energy.signum() * (2.0 * energy.abs()).sqrt()
}

/// Two-axis impulse tracker.
#[derive(Clone, Debug, Default)]
pub struct VelocityTracker {
    x: AxisVelocityTracker,
    y: AxisVelocityTracker,
    x_velocity: f32,
    y_velocity: f32,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VelocityEstimator for VelocityTracker {
    fn add_sample(&mut self, time_ms: i64, position: Point) {
        self.x.add_data_point(time_ms, position.x);
        self.y.add_data_point(time_ms, position.y);
    }

    fn compute_current_velocity(&mut self, units_ms: u32) {
        let scale = units_ms as f32 / 1000.0;
        self.x_velocity = self.x.calculate_velocity() * scale;
        self.y_velocity = self.y.calculate_velocity() * scale;
    }

    fn horizontal_velocity(&self) -> f32 {
        self.x_velocity
    }

    fn vertical_velocity(&self) -> f32 {
        self.y_velocity
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_with(samples: &[(i64, f32)]) -> AxisVelocityTracker {
        let mut tracker = AxisVelocityTracker::new();
        for &(time_ms, value) in samples {
            tracker.add_data_point(time_ms, value);
        }
        tracker
    }

    #[test]
    fn fewer_than_two_samples_have_no_velocity() {
        assert_eq!(tracker_with(&[]).calculate_velocity(), 0.0);
        assert_eq!(tracker_with(&[(0, 100.0)]).calculate_velocity(), 0.0);
    }

    #[test]
    fn steady_motion_reports_its_speed() {
        // 10px every 8ms.
        let tracker = tracker_with(&[(0, 0.0), (8, 10.0), (16, 20.0), (24, 30.0)]);
        assert!((tracker.calculate_velocity() - 1250.0).abs() < 1.0);

        let upward = tracker_with(&[(0, 30.0), (8, 20.0), (16, 10.0)]);
        assert!((upward.calculate_velocity() + 1250.0).abs() < 1.0);
    }

    #[test]
    fn final_pause_in_place_keeps_the_speed() {
        let tracker = tracker_with(&[(0, 0.0), (8, 10.0), (16, 20.0), (24, 20.0)]);
        assert!((tracker.calculate_velocity() - 1250.0).abs() < 1.0);
    }

    #[test]
    fn stale_samples_are_ignored() {
        // The jump at the start is more than 40ms before the newest sample.
        let tracker = tracker_with(&[(0, -500.0), (50, 0.0), (60, 10.0), (70, 20.0), (80, 30.0)]);
        assert!((tracker.calculate_velocity() - 1000.0).abs() < 1.0);
    }

    #[test]
    fn pointer_that_stopped_has_no_velocity() {
        let tracker = tracker_with(&[(0, 0.0), (ASSUME_STOPPED_MS + 1, 100.0)]);
        assert_eq!(tracker.calculate_velocity(), 0.0);
    }

    #[test]
    fn history_wraps_around() {
        let mut tracker = AxisVelocityTracker::new();
        for step in 0..(HISTORY_SIZE as i64 * 3) {
            tracker.add_data_point(step * 2, step as f32 * 4.0);
        }
        assert!((tracker.calculate_velocity() - 2000.0).abs() < 1.0);

        tracker.reset();
        assert_eq!(tracker.calculate_velocity(), 0.0);
    }

    #[test]
    fn two_axis_tracker_scales_to_requested_units() {
        let mut tracker = VelocityTracker::new();
        for step in 0..4 {
            tracker.add_sample(step * 10, Point::new(0.0, step as f32 * 10.0));
        }
        tracker.compute_current_velocity(1000);
        let per_second = tracker.vertical_velocity();
        assert!((per_second - 1000.0).abs() < 1.0, "got {per_second}");
        assert_eq!(tracker.horizontal_velocity(), 0.0);

        tracker.compute_current_velocity(100);
        assert!((tracker.vertical_velocity() - per_second / 10.0).abs() < 0.1);

        tracker.clear();
        assert_eq!(tracker.vertical_velocity(), 0.0);
        tracker.compute_current_velocity(1000);
        assert_eq!(tracker.vertical_velocity(), 0.0);
    }
}
