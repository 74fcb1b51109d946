//! Host side of the link: confirms the device's handshake, pushes the
//! config and keeps the device's watchdog fed.

use embedded_hal_async::delay::DelayNs;

use crate::driver::{clock::Clock, serial::SplitableSerial};
use crate::orientation::{ClassificationConfig, Orientation};
use crate::protocol::{
    decode_orientation_frame, encode_config_message, write_line, LineReader, SerialError,
    CHECK_CONNECTION_INTERVAL_MS, CONFIRMATION_MESSAGE, CONNECTED_MESSAGE, HOST_LINE_END,
    LINE_CAPACITY, READY_MESSAGE, READY_MESSAGE_INTERVAL_MS, RESET_MESSAGE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostEvent {
    Orientation(Orientation),
    /// The device restarted its handshake and has been sent the config again.
    Reconnected,
    /// The device announced a reset, a handshake will follow.
    DeviceReset,
}

pub struct HostLink<S, D, C>
where
    S: SplitableSerial,
    D: DelayNs,
    C: Clock,
{
    serial: S,
    delay: D,
    clock: C,
    config: ClassificationConfig,
    line_reader: LineReader<LINE_CAPACITY>,
    last_connected_ms: f64,
}

impl<S, D, C> HostLink<S, D, C>
where
    S: SplitableSerial,
    D: DelayNs,
    C: Clock,
{
    pub fn new(serial: S, delay: D, clock: C, config: ClassificationConfig) -> Self {
        Self {
            serial,
            delay,
            clock,
            config,
            line_reader: LineReader::new(),
            last_connected_ms: 0.0,
        }
    }

    pub fn config(&self) -> &ClassificationConfig {
        &self.config
    }

    /// Used for the next handshake, the running device keeps its config.
    pub fn set_config(&mut self, config: ClassificationConfig) {
        self.config = config;
    }

    /// Waits for the device to announce itself, then confirms and sends the
    /// config.
    pub async fn connect(&mut self) -> Result<(), SerialError<S::Error>> {
        loop {
            let (_, mut rx) = self.serial.split();
            match self.line_reader.read_line(&mut rx).await {
                Ok(line) => {
                    if line.contains(READY_MESSAGE) {
                        break;
                    }
                    log_debug!("Ignoring line before handshake: {}", line.as_str());
                }
                Err(error) if error.is_recoverable() => {
                    log_warn!("Discarding garbled line before handshake");
                }
                Err(error) => return Err(error),
            }
        }
        self.confirm().await
    }

    async fn confirm(&mut self) -> Result<(), SerialError<S::Error>> {
        log_info!("Device ready, sending config");
        {
            let (mut tx, _) = self.serial.split();
            write_line(&mut tx, CONFIRMATION_MESSAGE, HOST_LINE_END).await?;
        }
        // the device only reads the config after its ready poll ran out
        self.discard_input(READY_MESSAGE_INTERVAL_MS).await?;

        let message = encode_config_message(&self.config);
        {
            let (mut tx, _) = self.serial.split();
            write_line(&mut tx, &message, "").await?;
        }
        self.last_connected_ms = self.clock.now_ms();
        Ok(())
    }

    /// Reads and drops everything the device sends for `duration_ms`,
    /// including a backlog already waiting on the port.
    async fn discard_input(&mut self, duration_ms: u32) -> Result<(), SerialError<S::Error>> {
        let start = self.clock.now_ms();
        loop {
            let elapsed = self.clock.now_ms() - start;
            if elapsed >= duration_ms as f64 {
                break;
            }
            let timeout_ms = ((duration_ms as f64 - elapsed) as u32).max(1);

            let (_, mut rx) = self.serial.split();
            match self
                .line_reader
                .read_line_timeout(&mut rx, &mut self.delay, timeout_ms)
                .await
            {
                Ok(_) => {}
                Err(error) if error.is_recoverable() => {}
                Err(error) => return Err(error),
            }
        }
        // a cut off handshake line must not be completed by later input
        self.line_reader.clear();
        Ok(())
    }

    /// Waits for the next thing the device has to say, sending liveness
    /// messages in the meantime.
    pub async fn next_event(&mut self) -> Result<HostEvent, SerialError<S::Error>> {
        loop {
            let elapsed = self.clock.now_ms() - self.last_connected_ms;
            let interval = CHECK_CONNECTION_INTERVAL_MS as f64;
            if elapsed >= interval {
                let (mut tx, _) = self.serial.split();
                write_line(&mut tx, CONNECTED_MESSAGE, HOST_LINE_END).await?;
                self.last_connected_ms = self.clock.now_ms();
                continue;
            }

            let timeout_ms = ((interval - elapsed) as u32).max(1);
            let read = {
                let (_, mut rx) = self.serial.split();
                self.line_reader
                    .read_line_timeout(&mut rx, &mut self.delay, timeout_ms)
                    .await
            };
            let line = match read {
                Ok(Some(line)) => line,
                Ok(None) => continue,
                Err(error) if error.is_recoverable() => {
                    log_warn!("Discarding garbled line from device");
                    continue;
                }
                Err(error) => return Err(error),
            };

            if let Some(orientation) = decode_orientation_frame(&line) {
                return Ok(HostEvent::Orientation(orientation));
            }
            if line.contains(READY_MESSAGE) {
                self.confirm().await?;
                return Ok(HostEvent::Reconnected);
            }
            if line.as_str() == RESET_MESSAGE {
                log_info!("Device reset");
                return Ok(HostEvent::DeviceReset);
            }
            log_debug!("Ignoring line from device: {}", line.as_str());
        }
    }
}
