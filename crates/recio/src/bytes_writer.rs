use std::io;

use bytes::Bytes;

use crate::{
    buffer::{Buffer, MIN_BUFFER_SIZE},
    error::WriterError,
    rope::{BytesRope, RopeBuilder},
    writer::{FlushType, Position, Writer, WriterState},
};

/// A [`Writer`] that keeps everything written in its own growing buffer.
///
/// Finishing hands the buffer to the caller as an immutable value. Whether
/// that copies depends on how much of the allocation the data fills; see
/// [`Buffer::to_rope`].
///
/// ```rust
/// use recio::{BytesWriter, Writer};
///
/// let mut writer = BytesWriter::new();
/// writer.write(b"hello ").unwrap();
/// writer.write(b"world").unwrap();
/// assert_eq!(writer.into_bytes().unwrap(), &b"hello world"[..]);
/// ```
#[derive(Debug, Default)]
pub struct BytesWriter {
    state: WriterState,
}

impl BytesWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer with room for `capacity` bytes before its first reallocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: WriterState::with_buffer(Buffer::with_capacity(capacity)),
        }
    }

    /// Everything written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.state.staged()
    }

    /// Finish writing and return the data as [`Bytes`].
    ///
    /// # Errors
    ///
    /// Returns the error the writer failed with, if any.
    pub fn into_bytes(self) -> Result<Bytes, WriterError> {
        self.into_rope(&mut BytesRope)
    }

    /// Finish writing and return the data as a value built by `rope`.
    ///
    /// # Errors
    ///
    /// Returns the error the writer failed with, if any.
    pub fn into_rope<R: RopeBuilder>(mut self, rope: &mut R) -> Result<R::Rope, WriterError> {
        self.state.check()?;
        let len = self.state.written_to_buffer();
        let buffer = self.state.buffer_mut();
        buffer.set_len(len);
        Ok(buffer.to_rope(0..len, rope))
    }

    fn grow_to(&mut self, min: usize) -> Result<(), WriterError> {
        let staged = self.state.written_to_buffer();
        let buffer = self.state.buffer_mut();
        buffer.set_len(staged);
        buffer.ensure_capacity(min.max(MIN_BUFFER_SIZE));
        self.state.open_window()
    }
}

impl Writer for BytesWriter {
    fn state(&self) -> &WriterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut WriterState {
        &mut self.state
    }

    fn push_slow(&mut self) -> Result<(), WriterError> {
        debug_assert_eq!(
            self.available(),
            0,
            "Failed precondition of Writer::push_slow(): space available, use push() instead"
        );
        self.state.check()?;
        self.grow_to(self.state.written_to_buffer().saturating_add(1))
    }

    fn write_slow(&mut self, src: &[u8]) -> Result<(), WriterError> {
        self.state.check()?;
        if src.len() as Position > Position::MAX - self.pos() {
            return Err(self.state.fail_overflow());
        }
        let Some(needed) = self.state.written_to_buffer().checked_add(src.len()) else {
            return Err(self.state.fail_overflow());
        };
        self.grow_to(needed)?;
        self.state.put(src);
        Ok(())
    }

    fn flush(&mut self, _flush_type: FlushType) -> Result<(), WriterError> {
        self.state.check()
    }
}

impl io::Write for BytesWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Writer::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Writer::flush(self, FlushType::FromObject)?;
        Ok(())
    }
}
