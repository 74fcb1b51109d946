pub const DEFAULT_SAMPLING_INTERVAL_MS: u32 = 20;
pub const DEFAULT_STABLE_SAMPLE_COUNT: u32 = 10;

// Fraction (0-1) of the axis' full-scale value, higher means less sensitive
pub const DEFAULT_THRESHOLD_X: f32 = 0.90;
pub const DEFAULT_THRESHOLD_Y: f32 = 0.90;
pub const DEFAULT_THRESHOLD_Z: f32 = 0.75;

// Full-scale acceleration in g, fixed by the sensor calibration
pub const AXIS_MAX_X: f32 = 1.00;
pub const AXIS_MAX_Y: f32 = 1.00;
pub const AXIS_MAX_Z: f32 = 1.00;

/// Parameters of the classifier and its debounce window.
///
/// The sampling interval, stable sample count and thresholds come from the
/// host during the handshake. The axis maxima are calibration constants and
/// can't be changed over the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClassificationConfig {
    pub sampling_interval_ms: u32,
    pub stable_sample_count: u32,
    pub threshold_x: f32,
    pub threshold_y: f32,
    pub threshold_z: f32,
    pub axis_max_x: f32,
    pub axis_max_y: f32,
    pub axis_max_z: f32,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_SAMPLING_INTERVAL_MS,
            DEFAULT_STABLE_SAMPLE_COUNT,
            DEFAULT_THRESHOLD_X,
            DEFAULT_THRESHOLD_Y,
            DEFAULT_THRESHOLD_Z,
        )
    }
}

impl ClassificationConfig {
    pub fn new(
        sampling_interval_ms: u32,
        stable_sample_count: u32,
        threshold_x: f32,
        threshold_y: f32,
        threshold_z: f32,
    ) -> Self {
        Self {
            sampling_interval_ms,
            stable_sample_count,
            threshold_x,
            threshold_y,
            threshold_z,
            axis_max_x: AXIS_MAX_X,
            axis_max_y: AXIS_MAX_Y,
            axis_max_z: AXIS_MAX_Z,
        }
    }

    pub fn with_axis_max(self, axis_max_x: f32, axis_max_y: f32, axis_max_z: f32) -> Self {
        Self {
            axis_max_x,
            axis_max_y,
            axis_max_z,
            ..self
        }
    }

    /// Magnitude an x reading has to exceed to count as dominant.
    pub fn limit_x(&self) -> f32 {
        self.threshold_x * self.axis_max_x
    }

    pub fn limit_y(&self) -> f32 {
        self.threshold_y * self.axis_max_y
    }

    pub fn limit_z(&self) -> f32 {
        self.threshold_z * self.axis_max_z
    }
}
