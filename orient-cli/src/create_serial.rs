use orient_common::driver::serial::SplitableSerialWrapper;
use orient_common::protocol::BAUD_RATE;
use tokio::io::{split, AsyncReadExt, AsyncWriteExt, ReadHalf, WriteHalf};

use anyhow::Result;
use tokio_serial::{
    available_ports, SerialPortBuilderExt, SerialPortInfo, SerialPortType, SerialStream,
};

// Matched against the USB product and manufacturer strings
const LIKELY_DEVICE_NAMES: [&str; 2] = ["Arduino", "USB Serial Device"];

#[derive(Debug)]
pub struct SerialErrorWrapper(std::io::Error);

impl embedded_io_async::Error for SerialErrorWrapper {
    fn kind(&self) -> embedded_io_async::ErrorKind {
        embedded_io_async::ErrorKind::Other
    }
}

pub struct SerialRXWrapper(ReadHalf<SerialStream>);

impl embedded_io_async::ErrorType for SerialRXWrapper {
    type Error = SerialErrorWrapper;
}

impl embedded_io_async::Read for SerialRXWrapper {
    async fn read(&mut self, buf: &mut [u8]) -> std::result::Result<usize, Self::Error> {
        self.0.read(buf).await.map_err(SerialErrorWrapper)
    }
}

pub struct SerialTXWrapper(WriteHalf<SerialStream>);

impl embedded_io_async::ErrorType for SerialTXWrapper {
    type Error = SerialErrorWrapper;
}

impl embedded_io_async::Write for SerialTXWrapper {
    async fn write(&mut self, buf: &[u8]) -> std::result::Result<usize, Self::Error> {
        self.0.write(buf).await.map_err(SerialErrorWrapper)
    }

    async fn flush(&mut self) -> std::result::Result<(), Self::Error> {
        self.0.flush().await.map_err(SerialErrorWrapper)
    }
}

pub type Serial = SplitableSerialWrapper<SerialTXWrapper, SerialRXWrapper>;

pub fn create_serial(serial_port_name: &str) -> Result<Serial> {
    let serial: SerialStream =
        tokio_serial::new(serial_port_name, BAUD_RATE).open_native_async()?;
    let (rx, tx) = split(serial);
    Ok(SplitableSerialWrapper::new(
        SerialTXWrapper(tx),
        SerialRXWrapper(rx),
    ))
}

pub fn is_likely_device(port: &SerialPortInfo) -> bool {
    let SerialPortType::UsbPort(usb) = &port.port_type else {
        return false;
    };
    [usb.product.as_deref(), usb.manufacturer.as_deref()]
        .into_iter()
        .flatten()
        .any(|description| LIKELY_DEVICE_NAMES.iter().any(|name| description.contains(name)))
}

/// Names of the ports that look like an orientation sensor.
pub fn likely_device_ports() -> Result<Vec<String>> {
    Ok(available_ports()?
        .into_iter()
        .filter(is_likely_device)
        .map(|port| port.port_name)
        .collect())
}
