use libm::fabsf;

use super::{AccelerationSample, ClassificationConfig, Orientation};

/// Classifies a single sample.
///
/// Axes are checked in the fixed order X, Y, Z and the first one whose
/// magnitude exceeds its limit wins, even if a later axis reads higher. When
/// no axis is dominant the device is between resting positions and `previous`
/// is returned unchanged.
pub fn classify(
    sample: &AccelerationSample,
    previous: Orientation,
    config: &ClassificationConfig,
) -> Orientation {
    if fabsf(sample.x) > config.limit_x() {
        if sample.x > 0.0 {
            Orientation::PositiveX
        } else {
            Orientation::NegativeX
        }
    } else if fabsf(sample.y) > config.limit_y() {
        if sample.y > 0.0 {
            Orientation::PositiveY
        } else {
            Orientation::NegativeY
        }
    } else if fabsf(sample.z) > config.limit_z() {
        Orientation::Flat
    } else {
        previous
    }
}
