use std::convert::Infallible;

use anyhow::{anyhow, Result};
use orient_common::protocol::SerialError;
use orient_common::{ClassificationConfig, DeviceError, HostEvent, HostLink, OrientationDevice};
use tokio::time::{sleep, Duration};

use crate::motion::{play, MotionStep};
use crate::virt_drivers::{
    accelerometer::{create_accelerometer, VirtualAccelerometer},
    serial::{create_virtual_serial, Disconnected, VirtualSerial},
    timer::{TokioClock, TokioDelay},
    watchdog::VirtualWatchdog,
};

const WATCHDOG_CHECK_INTERVAL: Duration = Duration::from_millis(100);
// Lets the device settle on the last step before the simulation ends
const SETTLE_TIME: Duration = Duration::from_secs(2);

pub struct SimulationReport {
    pub watchdog_expirations: u32,
}

/// Runs a device and a host link against each other while `steps` move the
/// virtual sensor, passing every event the host sees to `on_event`.
pub async fn run_simulation(
    steps: &[MotionStep],
    config: ClassificationConfig,
    noise: f32,
    mut on_event: impl FnMut(HostEvent),
) -> Result<SimulationReport> {
    let (device_serial, host_serial) = create_virtual_serial();
    let (sensor, accelerometer) = create_accelerometer();
    let watchdog = VirtualWatchdog::default();

    let device = OrientationDevice::new(
        device_serial,
        accelerometer,
        watchdog.clone(),
        TokioDelay,
        TokioClock::new(),
    );
    let device = run_device(device);

    let mut link = HostLink::new(host_serial, TokioDelay, TokioClock::new(), config);
    let host = run_host(&mut link, &mut on_event);

    let motion = async {
        play(steps, &sensor, noise).await;
        sleep(SETTLE_TIME).await;
    };

    tokio::select! {
        Err(e) = device => return Err(anyhow!("device stopped: {:?}", e)),
        Err(e) = host => return Err(anyhow!("host link stopped: {:?}", e)),
        _ = watchdog.monitor(WATCHDOG_CHECK_INTERVAL) => unreachable!(),
        _ = motion => {}
    }

    Ok(SimulationReport {
        watchdog_expirations: watchdog.expirations(),
    })
}

type VirtualDevice =
    OrientationDevice<VirtualSerial, VirtualAccelerometer, VirtualWatchdog, TokioDelay, TokioClock>;

async fn run_device(
    device: VirtualDevice,
) -> Result<Infallible, DeviceError<Disconnected, Infallible>> {
    let mut running = device.start().await?;
    running.run().await
}

async fn run_host(
    link: &mut HostLink<VirtualSerial, TokioDelay, TokioClock>,
    on_event: &mut impl FnMut(HostEvent),
) -> Result<Infallible, SerialError<Disconnected>> {
    link.connect().await?;
    loop {
        on_event(link.next_event().await?);
    }
}
