use orient_common::driver::serial::SplitableSerialWrapper;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// The other end of the virtual serial port was dropped.
#[derive(Debug)]
pub struct Disconnected;

impl embedded_io_async::Error for Disconnected {
    fn kind(&self) -> embedded_io_async::ErrorKind {
        embedded_io_async::ErrorKind::BrokenPipe
    }
}

pub struct VirtualSerialTx {
    tx: UnboundedSender<Vec<u8>>,
}

impl embedded_io_async::ErrorType for VirtualSerialTx {
    type Error = Disconnected;
}

impl embedded_io_async::Write for VirtualSerialTx {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx.send(Vec::from(buf)).map_err(|_| Disconnected)?;
        Ok(buf.len())
    }
}

pub struct VirtualSerialRx {
    rx: UnboundedReceiver<Vec<u8>>,
    buffer: Vec<u8>,
}

impl embedded_io_async::ErrorType for VirtualSerialRx {
    type Error = Disconnected;
}

impl embedded_io_async::Read for VirtualSerialRx {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.buffer.is_empty() {
            match self.rx.recv().await {
                Some(data) => self.buffer = data,
                // reads as end of stream
                None => return Ok(0),
            }
        }

        let len = std::cmp::min(self.buffer.len(), buf.len());
        buf[..len].copy_from_slice(&self.buffer[..len]);
        self.buffer.drain(..len);
        Ok(len)
    }
}

pub type VirtualSerial = SplitableSerialWrapper<VirtualSerialTx, VirtualSerialRx>;

/// Two serial ports wired to each other.
pub fn create_virtual_serial() -> (VirtualSerial, VirtualSerial) {
    let (a_tx, b_rx) = unbounded_channel::<Vec<u8>>();
    let (b_tx, a_rx) = unbounded_channel::<Vec<u8>>();
    (
        SplitableSerialWrapper::new(
            VirtualSerialTx { tx: a_tx },
            VirtualSerialRx {
                rx: a_rx,
                buffer: Vec::new(),
            },
        ),
        SplitableSerialWrapper::new(
            VirtualSerialTx { tx: b_tx },
            VirtualSerialRx {
                rx: b_rx,
                buffer: Vec::new(),
            },
        ),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use embedded_io_async::{Read, Write};
    use orient_common::driver::serial::SplitableSerial;

    #[tokio::test]
    async fn bytes_cross_over() {
        let (mut a, mut b) = create_virtual_serial();
        a.split().0.write_all(b"hello").await.unwrap();

        let mut buf = [0u8; 3];
        let (_, rx) = b.split();
        assert_eq!(rx.read(&mut buf).await.unwrap(), 3);
        assert_eq!(&buf, b"hel");
        assert_eq!(rx.read(&mut buf).await.unwrap(), 2);
        assert_eq!(&buf[..2], b"lo");
    }

    #[tokio::test]
    async fn dropped_end_is_end_of_stream() {
        let (mut a, b) = create_virtual_serial();
        drop(b);

        let mut buf = [0u8; 4];
        assert_eq!(a.split().1.read(&mut buf).await.unwrap(), 0);
        assert!(a.split().0.write(b"x").await.is_err());
    }
}
