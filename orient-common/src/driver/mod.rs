pub mod accelerometer;
pub mod clock;
pub mod serial;
pub mod watchdog;
