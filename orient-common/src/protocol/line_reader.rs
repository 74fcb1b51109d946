use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, Write};
use heapless::String;

pub const LINE_CAPACITY: usize = 64;

pub type Line = String<LINE_CAPACITY>;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError<E> {
    Io(E),
    /// The other side closed the port.
    Eof,
    LineTooLong,
    InvalidUtf8,
}

impl<E> SerialError<E> {
    /// Garbage on the line, the link itself is still usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SerialError::LineTooLong | SerialError::InvalidUtf8)
    }
}

pub async fn write_line<W: Write>(
    tx: &mut W,
    line: &str,
    line_end: &str,
) -> Result<(), SerialError<W::Error>> {
    tx.write_all(line.as_bytes())
        .await
        .map_err(SerialError::Io)?;
    tx.write_all(line_end.as_bytes())
        .await
        .map_err(SerialError::Io)?;
    tx.flush().await.map_err(SerialError::Io)
}

/// Splits a byte stream into `\n` terminated lines, dropping a trailing `\r`.
///
/// Bytes after the end of a line stay buffered for the next call, so the same
/// reader has to be used for the whole lifetime of the port.
pub struct LineReader<const N: usize> {
    buffer: [u8; N],
    len: usize,
}

impl<const N: usize> LineReader<N> {
    pub const fn new() -> Self {
        Self {
            buffer: [0u8; N],
            len: 0,
        }
    }

    /// Drops whatever is buffered, including an unfinished line.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub async fn read_line<R: Read>(
        &mut self,
        rx: &mut R,
    ) -> Result<String<N>, SerialError<R::Error>> {
        loop {
            if let Some(line) = self.next_buffered_line() {
                return line;
            }
            if self.len == N {
                self.len = 0;
                return Err(SerialError::LineTooLong);
            }

            let read = rx
                .read(&mut self.buffer[self.len..])
                .await
                .map_err(SerialError::Io)?;
            if read == 0 {
                return Err(SerialError::Eof);
            }
            self.len += read;
        }
    }

    /// Like [`Self::read_line`], but gives up after `timeout_ms` and returns
    /// `None`. Partial lines received before the timeout are kept.
    pub async fn read_line_timeout<R: Read>(
        &mut self,
        rx: &mut R,
        delay: &mut impl DelayNs,
        timeout_ms: u32,
    ) -> Result<Option<String<N>>, SerialError<R::Error>> {
        match select(self.read_line(rx), delay.delay_ms(timeout_ms)).await {
            Either::First(line) => line.map(Some),
            Either::Second(_) => Ok(None),
        }
    }

    /// Takes a complete line out of the buffer without touching the port.
    pub fn next_buffered_line<E>(&mut self) -> Option<Result<String<N>, SerialError<E>>> {
        let end = self.buffer[..self.len].iter().position(|b| *b == b'\n')?;

        let mut content_end = end;
        if content_end > 0 && self.buffer[content_end - 1] == b'\r' {
            content_end -= 1;
        }
        let line = core::str::from_utf8(&self.buffer[..content_end])
            .map_err(|_| SerialError::InvalidUtf8)
            .and_then(|line| String::try_from(line).map_err(|_| SerialError::LineTooLong));

        self.buffer.copy_within(end + 1..self.len, 0);
        self.len -= end + 1;
        Some(line)
    }
}

impl<const N: usize> Default for LineReader<N> {
    fn default() -> Self {
        Self::new()
    }
}
