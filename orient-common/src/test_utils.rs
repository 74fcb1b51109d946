use core::convert::Infallible;
use core::future::pending;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;

use crate::driver::{
    accelerometer::Accelerometer, clock::Clock, serial::SplitableSerialWrapper,
    watchdog::Watchdog,
};
use crate::orientation::{AccelerationSample, Orientation, SampleSource};

/// A sample that classifies to `orientation` with the default config. `Start`
/// maps to a sample with no dominant axis.
pub(crate) fn sample_for(orientation: Orientation) -> AccelerationSample {
    match orientation {
        Orientation::PositiveX => AccelerationSample::new(1.0, 0.1, 0.0),
        Orientation::NegativeX => AccelerationSample::new(-1.0, 0.0, 0.1),
        Orientation::PositiveY => AccelerationSample::new(0.0, 0.98, 0.1),
        Orientation::NegativeY => AccelerationSample::new(0.1, -0.98, 0.0),
        Orientation::Flat => AccelerationSample::new(0.05, 0.02, 0.99),
        Orientation::Start => AccelerationSample::new(0.4, 0.5, 0.6),
    }
}

/// Replays samples in order, then keeps returning the last one.
pub(crate) struct ScriptedSource {
    samples: VecDeque<AccelerationSample>,
    last: AccelerationSample,
    pub reads: usize,
}

impl ScriptedSource {
    pub(crate) fn new(samples: impl IntoIterator<Item = AccelerationSample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            last: AccelerationSample::default(),
            reads: 0,
        }
    }

    pub(crate) fn from_orientations(orientations: &[Orientation]) -> Self {
        Self::new(orientations.iter().map(|o| sample_for(*o)))
    }
}

impl SampleSource for ScriptedSource {
    async fn read(&mut self) -> AccelerationSample {
        self.reads += 1;
        if let Some(sample) = self.samples.pop_front() {
            self.last = sample;
        }
        self.last
    }
}

/// Delay and clock sharing a virtual timeline. Delays move the timeline
/// forward and only yield to the executor once.
#[derive(Clone, Default)]
pub(crate) struct VirtualTime {
    now_ms: Rc<Cell<f64>>,
    delays: Rc<RefCell<Vec<u32>>>,
}

impl VirtualTime {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn now(&self) -> f64 {
        self.now_ms.get()
    }

    pub(crate) fn advance(&self, ms: f64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    /// Every `delay_ms` call so far.
    pub(crate) fn delays(&self) -> Vec<u32> {
        self.delays.borrow().clone()
    }
}

impl Clock for VirtualTime {
    fn now_ms(&self) -> f64 {
        self.now()
    }
}

impl DelayNs for VirtualTime {
    async fn delay_ns(&mut self, ns: u32) {
        self.advance(ns as f64 / 1_000_000.0);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.delays.borrow_mut().push(ms);
        self.advance(ms as f64);
        tokio::task::yield_now().await;
    }
}

/// In-memory serial port. Reads wait forever when nothing was pushed, unless
/// the pipe was closed.
#[derive(Clone, Default)]
pub(crate) struct SerialPipe {
    incoming: Rc<RefCell<VecDeque<u8>>>,
    outgoing: Rc<RefCell<Vec<u8>>>,
    closed: Rc<Cell<bool>>,
}

impl SerialPipe {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_incoming(&self, text: &str) {
        self.push_incoming_bytes(text.as_bytes());
    }

    pub(crate) fn push_incoming_bytes(&self, bytes: &[u8]) {
        self.incoming.borrow_mut().extend(bytes.iter().copied());
    }

    pub(crate) fn close(&self) {
        self.closed.set(true);
    }

    /// Everything written since the last call.
    pub(crate) fn take_outgoing(&self) -> String {
        let bytes = core::mem::take(&mut *self.outgoing.borrow_mut());
        String::from_utf8(bytes).unwrap()
    }

    pub(crate) fn serial(&self) -> SplitableSerialWrapper<PipeTx, PipeRx> {
        SplitableSerialWrapper::new(
            PipeTx(self.outgoing.clone()),
            PipeRx {
                incoming: self.incoming.clone(),
                closed: self.closed.clone(),
            },
        )
    }
}

pub(crate) struct PipeTx(Rc<RefCell<Vec<u8>>>);

impl embedded_io_async::ErrorType for PipeTx {
    type Error = Infallible;
}

impl embedded_io_async::Write for PipeTx {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }
}

pub(crate) struct PipeRx {
    incoming: Rc<RefCell<VecDeque<u8>>>,
    closed: Rc<Cell<bool>>,
}

impl embedded_io_async::ErrorType for PipeRx {
    type Error = Infallible;
}

impl embedded_io_async::Read for PipeRx {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let available = self.incoming.borrow().len();
        if available == 0 {
            if self.closed.get() {
                return Ok(0);
            }
            return pending().await;
        }

        let len = available.min(buf.len());
        let mut incoming = self.incoming.borrow_mut();
        for (slot, byte) in buf.iter_mut().zip(incoming.drain(..len)) {
            *slot = byte;
        }
        Ok(len)
    }
}

pub(crate) struct ScriptedAccelerometer {
    readings: VecDeque<Result<Option<AccelerationSample>, ()>>,
    pub fail_reset: bool,
}

impl ScriptedAccelerometer {
    pub(crate) fn new(
        readings: impl IntoIterator<Item = Result<Option<AccelerationSample>, ()>>,
    ) -> Self {
        Self {
            readings: readings.into_iter().collect(),
            fail_reset: false,
        }
    }

    pub(crate) fn from_orientations(orientations: &[Orientation]) -> Self {
        Self::new(orientations.iter().map(|o| Ok(Some(sample_for(*o)))))
    }
}

impl Accelerometer for ScriptedAccelerometer {
    type Error = ();

    async fn reset(&mut self) -> Result<(), ()> {
        if self.fail_reset {
            Err(())
        } else {
            Ok(())
        }
    }

    async fn read(&mut self) -> Result<Option<AccelerationSample>, ()> {
        self.readings.pop_front().unwrap_or(Ok(None))
    }
}

#[derive(Clone, Default)]
pub(crate) struct CountingWatchdog {
    timeout_ms: Rc<Cell<Option<u32>>>,
    feeds: Rc<Cell<u32>>,
}

impl CountingWatchdog {
    pub(crate) fn timeout_ms(&self) -> Option<u32> {
        self.timeout_ms.get()
    }

    pub(crate) fn feeds(&self) -> u32 {
        self.feeds.get()
    }
}

impl Watchdog for CountingWatchdog {
    fn enable(&mut self, timeout_ms: u32) {
        self.timeout_ms.set(Some(timeout_ms));
    }

    fn feed(&mut self) {
        self.feeds.set(self.feeds.get() + 1);
    }
}
