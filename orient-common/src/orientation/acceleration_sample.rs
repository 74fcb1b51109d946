/// One accelerometer reading, in multiples of each axis' full-scale value
/// (1.0 = 1 g with the default calibration).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelerationSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl AccelerationSample {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for AccelerationSample {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}
