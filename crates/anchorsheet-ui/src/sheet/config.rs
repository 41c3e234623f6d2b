use anchorsheet_animation::Easing;
use anchorsheet_foundation::gesture_constants::{DEFAULT_MAX_VELOCITY, DEFAULT_MIN_VELOCITY};

pub const DEFAULT_PEEK_HEIGHT: i32 = 217;
pub const DEFAULT_MIN_OFFSET: i32 = 0;
pub const DEFAULT_ANCHOR_THRESHOLD: f32 = 0.5;

/// Construction-time configuration of an anchor sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetConfig {
    /// Visible height while collapsed.
    pub peek_height: i32,
    /// Top of the child while expanded.
    pub min_offset: i32,
    pub hideable: bool,
    /// Downward releases go straight to hidden.
    pub skip_collapsed: bool,
    /// Fraction of the container height where the anchor state rests.
    pub anchor_threshold: f32,
    pub settle_easing: Easing,
    /// Release velocities below this magnitude count as zero (px/s).
    pub min_velocity: f32,
    /// Release velocities saturate at this magnitude (px/s).
    pub max_velocity: f32,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            peek_height: DEFAULT_PEEK_HEIGHT,
            min_offset: DEFAULT_MIN_OFFSET,
            hideable: true,
            skip_collapsed: false,
            anchor_threshold: DEFAULT_ANCHOR_THRESHOLD,
            settle_easing: Easing::LinearEasing,
            min_velocity: DEFAULT_MIN_VELOCITY,
            max_velocity: DEFAULT_MAX_VELOCITY,
        }
    }
}

impl SheetConfig {
    pub fn with_peek_height(mut self, peek_height: i32) -> Self {
        self.peek_height = peek_height.max(0);
        self
    }

    /// Negative offsets are clamped to 0.
    pub fn with_min_offset(mut self, min_offset: i32) -> Self {
        self.min_offset = min_offset.max(0);
        self
    }

    pub fn hideable(mut self, hideable: bool) -> Self {
        self.hideable = hideable;
        self
    }

    pub fn skip_collapsed(mut self, skip_collapsed: bool) -> Self {
        self.skip_collapsed = skip_collapsed;
        self
    }

    /// Clamped to `[0, 1]`; NaN falls back to the default.
    pub fn with_anchor_threshold(mut self, threshold: f32) -> Self {
        self.anchor_threshold = sanitize_threshold(threshold);
        self
    }

    pub fn with_settle_easing(mut self, easing: Easing) -> Self {
        self.settle_easing = easing;
        self
    }

    pub fn with_velocity_limits(mut self, min_velocity: f32, max_velocity: f32) -> Self {
        self.min_velocity = min_velocity.max(0.0);
        self.max_velocity = max_velocity.max(self.min_velocity);
        self
    }

    /// Re-applies every clamp, for configs assembled through the public
    /// fields.
    pub(crate) fn sanitized(self) -> Self {
        self.with_peek_height(self.peek_height)
            .with_min_offset(self.min_offset)
            .with_anchor_threshold(self.anchor_threshold)
            .with_velocity_limits(self.min_velocity, self.max_velocity)
    }
}

pub(crate) fn sanitize_threshold(threshold: f32) -> f32 {
    if threshold.is_nan() {
        DEFAULT_ANCHOR_THRESHOLD
    } else {
        threshold.clamp(0.0, 1.0)
    }
}
