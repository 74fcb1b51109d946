/// Restarts the device when it isn't fed within the timeout.
pub trait Watchdog {
    fn enable(&mut self, timeout_ms: u32);
    fn feed(&mut self);
}
