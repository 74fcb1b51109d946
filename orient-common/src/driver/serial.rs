use core::fmt;

use embedded_io_async::{Error, Read, Write};

/// A serial port whose two directions can be used independently.
pub trait SplitableSerial {
    type Error: Error;
    type TX<'a>: Write<Error = Self::Error>
    where
        Self: 'a;
    type RX<'a>: Read<Error = Self::Error>
    where
        Self: 'a;

    fn split(&mut self) -> (Self::TX<'_>, Self::RX<'_>);
}

pub struct SplitableSerialWrapper<T, R> {
    tx: T,
    rx: R,
}

impl<T, R> fmt::Debug for SplitableSerialWrapper<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SplitableSerialWrapper")
    }
}

impl<T, R> SplitableSerialWrapper<T, R> {
    pub fn new(tx: T, rx: R) -> Self {
        Self { tx, rx }
    }

    pub fn into_inner(self) -> (T, R) {
        (self.tx, self.rx)
    }
}

impl<E, T, R> SplitableSerial for SplitableSerialWrapper<T, R>
where
    E: Error,
    T: Write<Error = E>,
    R: Read<Error = E>,
{
    type Error = E;
    type TX<'a> = &'a mut T where Self: 'a;
    type RX<'a> = &'a mut R where Self: 'a;

    fn split(&mut self) -> (&mut T, &mut R) {
        (&mut self.tx, &mut self.rx)
    }
}
