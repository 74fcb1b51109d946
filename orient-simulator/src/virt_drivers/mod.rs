pub mod accelerometer;
pub mod serial;
pub mod timer;
pub mod watchdog;
