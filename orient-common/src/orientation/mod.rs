mod acceleration_sample;
mod classification_config;
mod classifier;
mod orientation;
mod orientation_tracker;

pub use acceleration_sample::AccelerationSample;
pub use classification_config::*;
pub use classifier::classify;
pub use orientation::Orientation;
pub use orientation_tracker::{resolve_orientation, OrientationTracker, SampleSource};
