use std::cell::Cell;
use std::rc::Rc;

use orient_common::driver::watchdog::Watchdog;
use tokio::time::{sleep, Duration, Instant};

#[derive(Default)]
struct WatchdogState {
    timeout: Cell<Option<Duration>>,
    last_feed: Cell<Option<Instant>>,
    expirations: Cell<u32>,
}

/// A watchdog that can't reset anything, it only logs when it would have.
#[derive(Clone, Default)]
pub struct VirtualWatchdog {
    state: Rc<WatchdogState>,
}

impl VirtualWatchdog {
    pub fn expirations(&self) -> u32 {
        self.state.expirations.get()
    }

    fn is_expired(&self) -> bool {
        match (self.state.timeout.get(), self.state.last_feed.get()) {
            (Some(timeout), Some(last_feed)) => last_feed.elapsed() > timeout,
            _ => false,
        }
    }

    /// Checks the watchdog forever, counting each expiry once.
    pub async fn monitor(&self, interval: Duration) {
        let mut expired = false;
        loop {
            sleep(interval).await;
            let now_expired = self.is_expired();
            if now_expired && !expired {
                log::warn!("Watchdog would have reset the device");
                self.state.expirations.set(self.state.expirations.get() + 1);
            }
            expired = now_expired;
        }
    }
}

impl Watchdog for VirtualWatchdog {
    fn enable(&mut self, timeout_ms: u32) {
        log::info!("Watchdog enabled, timeout {}ms", timeout_ms);
        self.state
            .timeout
            .set(Some(Duration::from_millis(timeout_ms as u64)));
        self.state.last_feed.set(Some(Instant::now()));
    }

    fn feed(&mut self) {
        self.state.last_feed.set(Some(Instant::now()));
    }
}
