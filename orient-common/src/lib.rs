#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

#[macro_use]
mod fmt;

pub mod device;
pub mod driver;
pub mod host;
pub mod orientation;
pub mod protocol;

#[cfg(test)]
mod test_utils;

pub use device::{DeviceError, OrientationDevice, RunningDevice};
pub use host::{HostEvent, HostLink};
pub use orientation::{
    classify, resolve_orientation, AccelerationSample, ClassificationConfig, Orientation,
    OrientationTracker, SampleSource,
};
