//! Text line protocol spoken between the device and the host.
//!
//! The device ends its lines with `\r\n`, the host with `\n`. Both sides
//! accept either.

mod config_message;
mod frame;
mod line_reader;

pub use config_message::{encode_config_message, ConfigMessage, ConfigMessageParser};
pub use frame::{decode_orientation_frame, encode_orientation_frame, OrientationFrame};
pub use line_reader::{write_line, Line, LineReader, SerialError, LINE_CAPACITY};

pub const BAUD_RATE: u32 = 9600;

pub const RESET_MESSAGE: &str = "Reset";
pub const READY_MESSAGE: &str = "Ready";
pub const CONFIRMATION_MESSAGE: &str = "Confirmation";
pub const CONNECTED_MESSAGE: &str = "Connected";

pub const COMMAND_START: char = '<';
pub const COMMAND_END: char = '>';

pub const DEVICE_LINE_END: &str = "\r\n";
pub const HOST_LINE_END: &str = "\n";

pub const READY_MESSAGE_INTERVAL_MS: u32 = 300;
pub const CHECK_CONNECTION_INTERVAL_MS: u32 = 1000;

// Has to be longer than CHECK_CONNECTION_INTERVAL_MS
pub const WATCHDOG_INTERVAL_MS: u32 = 5000;
