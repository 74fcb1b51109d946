use std::convert::Infallible;

use orient_common::driver::accelerometer::Accelerometer;
use orient_common::AccelerationSample;
use tokio::sync::watch::{self, Receiver, Sender};

pub fn create_accelerometer() -> (Sender<AccelerationSample>, VirtualAccelerometer) {
    let (tx, rx) = watch::channel(AccelerationSample::default());
    (tx, VirtualAccelerometer { rx })
}

/// Reports a sample only once per value pushed into the channel, like a
/// sensor without fresh data between its output ticks.
pub struct VirtualAccelerometer {
    rx: Receiver<AccelerationSample>,
}

impl Accelerometer for VirtualAccelerometer {
    type Error = Infallible;

    async fn reset(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn read(&mut self) -> Result<Option<AccelerationSample>, Self::Error> {
        if self.rx.has_changed().unwrap_or(false) {
            Ok(Some(*self.rx.borrow_and_update()))
        } else {
            Ok(None)
        }
    }
}
