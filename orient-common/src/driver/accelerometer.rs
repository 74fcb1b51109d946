use core::fmt;

use crate::orientation::{AccelerationSample, SampleSource};

pub trait Accelerometer {
    type Error: fmt::Debug;

    /// Brings the sensor up. Called once at startup, nothing is read from the
    /// sensor if this fails.
    async fn reset(&mut self) -> Result<(), Self::Error>;

    /// Returns `None` when no new sample is ready yet.
    async fn read(&mut self) -> Result<Option<AccelerationSample>, Self::Error>;
}

/// Turns an [`Accelerometer`] into a [`SampleSource`] by holding on to the
/// last sample it produced.
pub struct LatchedSampleSource<A: Accelerometer> {
    accelerometer: A,
    last: AccelerationSample,
}

impl<A: Accelerometer> LatchedSampleSource<A> {
    pub fn new(accelerometer: A) -> Self {
        Self {
            accelerometer,
            last: AccelerationSample::default(),
        }
    }

    pub fn last(&self) -> AccelerationSample {
        self.last
    }

    pub fn into_inner(self) -> A {
        self.accelerometer
    }
}

impl<A: Accelerometer> SampleSource for LatchedSampleSource<A> {
    async fn read(&mut self) -> AccelerationSample {
        match self.accelerometer.read().await {
            Ok(Some(sample)) => self.last = sample,
            Ok(None) => {}
            Err(_) => log_warn!("accelerometer read failed, reusing last sample"),
        }
        self.last
    }
}
