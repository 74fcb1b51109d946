use core::convert::Infallible;

use embedded_hal_async::delay::DelayNs;

use crate::driver::{
    accelerometer::{Accelerometer, LatchedSampleSource},
    clock::Clock,
    serial::SplitableSerial,
    watchdog::Watchdog,
};
use crate::orientation::{ClassificationConfig, Orientation, OrientationTracker};
use crate::protocol::{
    encode_orientation_frame, write_line, ConfigMessageParser, LineReader, SerialError,
    CHECK_CONNECTION_INTERVAL_MS, CONFIRMATION_MESSAGE, CONNECTED_MESSAGE, DEVICE_LINE_END,
    LINE_CAPACITY, READY_MESSAGE, READY_MESSAGE_INTERVAL_MS, RESET_MESSAGE,
    WATCHDOG_INTERVAL_MS,
};

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<SE, AE> {
    Serial(SerialError<SE>),
    /// The accelerometer didn't come up, the device must not go on.
    SensorInit(AE),
}

impl<SE, AE> From<SerialError<SE>> for DeviceError<SE, AE> {
    fn from(error: SerialError<SE>) -> Self {
        DeviceError::Serial(error)
    }
}

type Result<T, S, A> = core::result::Result<
    T,
    DeviceError<<S as SplitableSerial>::Error, <A as Accelerometer>::Error>,
>;

/// Device side of the link, before the host has configured it.
pub struct OrientationDevice<S, A, W, D, C>
where
    S: SplitableSerial,
    A: Accelerometer,
    W: Watchdog,
    D: DelayNs,
    C: Clock,
{
    serial: S,
    accelerometer: A,
    watchdog: W,
    delay: D,
    clock: C,
    line_reader: LineReader<LINE_CAPACITY>,
}

impl<S, A, W, D, C> OrientationDevice<S, A, W, D, C>
where
    S: SplitableSerial,
    A: Accelerometer,
    W: Watchdog,
    D: DelayNs,
    C: Clock,
{
    pub fn new(serial: S, accelerometer: A, watchdog: W, delay: D, clock: C) -> Self {
        Self {
            serial,
            accelerometer,
            watchdog,
            delay,
            clock,
            line_reader: LineReader::new(),
        }
    }

    /// Handshakes with the host, receives the config and brings up the
    /// sensor. The orientation the device rests in at startup is settled
    /// here and isn't reported.
    pub async fn start(mut self) -> Result<RunningDevice<S, A, W, D, C>, S, A> {
        {
            let (mut tx, _) = self.serial.split();
            write_line(&mut tx, RESET_MESSAGE, DEVICE_LINE_END).await?;
        }

        log_info!("Waiting for host confirmation");
        self.establish_contact().await?;

        log_info!("Waiting for config");
        let config = self.read_config().await?;
        log_info!(
            "Config: sampling interval {}ms, {} stable samples, thresholds {} {} {}",
            config.sampling_interval_ms,
            config.stable_sample_count,
            config.threshold_x,
            config.threshold_y,
            config.threshold_z,
        );
        log_info!(
            "Axis maxima: {} {} {}",
            config.axis_max_x,
            config.axis_max_y,
            config.axis_max_z,
        );

        self.watchdog.enable(WATCHDOG_INTERVAL_MS);

        log_info!("Initializing accelerometer");
        if let Err(error) = self.accelerometer.reset().await {
            log_error!("Failed to initialize accelerometer");
            return Err(DeviceError::SensorInit(error));
        }

        let mut source = LatchedSampleSource::new(self.accelerometer);
        let mut tracker = OrientationTracker::new(config);
        tracker.update(&mut source, &mut self.delay).await;
        log_info!("Initial orientation: {}", tracker.current());

        Ok(RunningDevice {
            serial: self.serial,
            source,
            watchdog: self.watchdog,
            delay: self.delay,
            clock: self.clock,
            line_reader: self.line_reader,
            tracker,
            last_connection_check_ms: 0.0,
        })
    }

    async fn establish_contact(&mut self) -> Result<(), S, A> {
        loop {
            let (mut tx, mut rx) = self.serial.split();
            match self
                .line_reader
                .read_line_timeout(&mut rx, &mut self.delay, READY_MESSAGE_INTERVAL_MS)
                .await
            {
                Ok(Some(line)) if line.as_str() == CONFIRMATION_MESSAGE => return Ok(()),
                Ok(_) => {}
                Err(error) if error.is_recoverable() => {
                    log_warn!("Discarding garbled line during handshake");
                }
                Err(error) => return Err(error.into()),
            }
            write_line(&mut tx, READY_MESSAGE, DEVICE_LINE_END).await?;
        }
    }

    async fn read_config(&mut self) -> Result<ClassificationConfig, S, A> {
        let mut parser = ConfigMessageParser::new();
        loop {
            let (_, mut rx) = self.serial.split();
            match self.line_reader.read_line(&mut rx).await {
                Ok(line) => {
                    if let Some(config) = parser.feed_line(&line) {
                        return Ok(config);
                    }
                }
                Err(error) if error.is_recoverable() => {
                    log_warn!("Discarding garbled config line");
                }
                Err(error) => return Err(error.into()),
            }
        }
    }
}

/// Configured device, tracking orientation and reporting changes.
pub struct RunningDevice<S, A, W, D, C>
where
    S: SplitableSerial,
    A: Accelerometer,
    W: Watchdog,
    D: DelayNs,
    C: Clock,
{
    serial: S,
    source: LatchedSampleSource<A>,
    watchdog: W,
    delay: D,
    clock: C,
    line_reader: LineReader<LINE_CAPACITY>,
    tracker: OrientationTracker,
    last_connection_check_ms: f64,
}

impl<S, A, W, D, C> RunningDevice<S, A, W, D, C>
where
    S: SplitableSerial,
    A: Accelerometer,
    W: Watchdog,
    D: DelayNs,
    C: Clock,
{
    pub fn orientation(&self) -> Orientation {
        self.tracker.current()
    }

    pub fn config(&self) -> &ClassificationConfig {
        self.tracker.config()
    }

    /// One pass of the polling loop: check in with the host when due, then
    /// run a debounce window. Returns the orientation sent to the host, if
    /// it changed.
    pub async fn tick(&mut self) -> Result<Option<Orientation>, S, A> {
        let now = self.clock.now_ms();
        if now - self.last_connection_check_ms >= CHECK_CONNECTION_INTERVAL_MS as f64 {
            self.check_connection().await?;
            self.last_connection_check_ms = now;
        }

        let changed = self.tracker.update(&mut self.source, &mut self.delay).await;
        if let Some(orientation) = changed {
            log_info!("Orientation changed: {}", orientation);
            if let Some(frame) = encode_orientation_frame(orientation) {
                let (mut tx, _) = self.serial.split();
                write_line(&mut tx, &frame, DEVICE_LINE_END).await?;
            }
        }
        Ok(changed)
    }

    pub async fn run(&mut self) -> Result<Infallible, S, A> {
        loop {
            self.tick().await?;
        }
    }

    /// Waits for one line from the host and feeds the watchdog if it is the
    /// liveness message. Lines that arrived in the same read are drained too,
    /// so a backlog of liveness messages doesn't build up.
    async fn check_connection(&mut self) -> Result<(), S, A> {
        let (_, mut rx) = self.serial.split();
        let line = self
            .line_reader
            .read_line_timeout(&mut rx, &mut self.delay, CHECK_CONNECTION_INTERVAL_MS)
            .await;

        let mut connected = false;
        let mut next = match line {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                log_debug!("No message from host");
                None
            }
            Err(error) => Some(Err(error)),
        };
        while let Some(line) = next {
            match line {
                Ok(line) => connected |= line.as_str() == CONNECTED_MESSAGE,
                Err(error) if error.is_recoverable() => {
                    log_warn!("Discarding garbled line from host");
                }
                Err(error) => return Err(error.into()),
            }
            next = self.line_reader.next_buffered_line();
        }

        if connected {
            self.watchdog.feed();
        }
        Ok(())
    }
}
