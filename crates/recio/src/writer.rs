//! The buffered byte-sink protocol.
//!
//! A [`Writer`] stages bytes in a window of its own [`Buffer`]:
//!
//! ```text
//!  0                 cursor              limit        capacity
//!  |----- staged -----|---- available ----|-- unused --|
//!  ^ start_pos
//! ```
//!
//! Writes that fit in `available` are plain copies ([`Writer::write`],
//! [`Writer::chunk_mut`] + [`Writer::advance`]). Everything else goes
//! through the slow paths, [`Writer::push_slow`] and [`Writer::write_slow`],
//! which are the only places where a backend hands bytes to its destination
//! or changes the buffer.
//!
//! Failure is terminal. The first destination error (or a position overflow)
//! is stored, the window is closed, and every later slow-path call returns a
//! clone of the stored error.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{buffer::Buffer, error::WriterError};

/// Absolute position in a destination.
pub type Position = u64;

/// How far [`Writer::flush`] propagates staged data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FlushType {
    /// Hand staged bytes to the destination object; nothing more.
    #[default]
    FromObject,
    /// Also make the data visible to other processes.
    FromProcess,
    /// Also make the data survive a machine restart.
    FromMachine,
}

/// Window, position and status shared by every [`Writer`] implementation.
#[derive(Debug, Default)]
pub struct WriterState {
    buffer: Buffer,
    cursor: usize,
    limit: usize,
    start_pos: Position,
    status: Option<WriterError>,
}

impl WriterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A state staging into `buffer`, which is taken as empty, with the
    /// window open over its whole capacity.
    #[must_use]
    pub fn with_buffer(buffer: Buffer) -> Self {
        Self {
            limit: buffer.capacity(),
            buffer,
            ..Self::default()
        }
    }

    #[must_use]
    #[inline]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// The buffer, for backends that grow or hand it off.
    ///
    /// Callers must leave at least `cursor` bytes of capacity in place, or
    /// call [`WriterState::open_window`] again before the next write.
    #[inline]
    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    #[must_use]
    #[inline]
    pub fn available(&self) -> usize {
        self.limit - self.cursor
    }

    /// Bytes staged in the buffer and not yet handed to the destination.
    #[must_use]
    #[inline]
    pub fn written_to_buffer(&self) -> usize {
        self.cursor
    }

    /// The staged bytes.
    #[must_use]
    #[inline]
    pub fn staged(&self) -> &[u8] {
        &self.buffer.data()[..self.cursor]
    }

    #[must_use]
    #[inline]
    pub fn start_pos(&self) -> Position {
        self.start_pos
    }

    /// Re-base the window. Only valid while nothing is staged.
    pub fn set_start_pos(&mut self, start_pos: Position) {
        debug_assert_eq!(self.cursor, 0, "set_start_pos() with staged bytes");
        self.start_pos = start_pos;
        self.clamp_limit();
    }

    /// Position of the next byte written.
    #[must_use]
    #[inline]
    pub fn pos(&self) -> Position {
        self.start_pos + self.cursor as Position
    }

    #[must_use]
    #[inline]
    pub fn healthy(&self) -> bool {
        self.status.is_none()
    }

    #[must_use]
    #[inline]
    pub fn status(&self) -> Option<&WriterError> {
        self.status.as_ref()
    }

    /// `Err` with the stored failure, if any.
    ///
    /// # Errors
    ///
    /// Returns the error the state failed with.
    #[inline]
    pub fn check(&self) -> Result<(), WriterError> {
        match &self.status {
            None => Ok(()),
            Some(err) => Err(err.clone()),
        }
    }

    /// Enter the failed state and return the error to propagate.
    ///
    /// A state that already failed keeps its first error.
    pub fn fail(&mut self, err: WriterError) -> WriterError {
        if let Some(first) = &self.status {
            return first.clone();
        }
        tracing::warn!(error = %err, pos = self.pos(), "writer failed");
        self.limit = self.cursor;
        self.status = Some(err.clone());
        err
    }

    /// Fail with [`WriterError::Overflow`].
    pub fn fail_overflow(&mut self) -> WriterError {
        self.fail(WriterError::Overflow)
    }

    /// Enter the terminal [`WriterError::Closed`] state after an orderly
    /// shutdown. Staged bytes are discarded.
    pub fn close(&mut self) {
        if self.status.is_none() {
            self.status = Some(WriterError::Closed);
        }
        self.cursor = 0;
        self.limit = 0;
    }

    /// The writable part of the window.
    #[inline]
    pub fn chunk_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.data_mut()[self.cursor..self.limit]
    }

    /// Mark `n` bytes of [`WriterState::chunk_mut`] as written.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the available space.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        assert!(
            n <= self.available(),
            "Failed precondition of Writer::advance(): {n} bytes exceed available space {}",
            self.available()
        );
        self.cursor += n;
    }

    /// Copy `src` into the window.
    #[inline]
    pub(crate) fn put(&mut self, src: &[u8]) {
        self.chunk_mut()[..src.len()].copy_from_slice(src);
        self.cursor += src.len();
    }

    /// Open the window up to the buffer's capacity, clamped so that
    /// [`WriterState::pos`] cannot pass [`Position::MAX`].
    ///
    /// # Errors
    ///
    /// Fails with [`WriterError::Overflow`] when the position is already at
    /// the maximum, and with the stored error when the state has failed.
    pub fn open_window(&mut self) -> Result<(), WriterError> {
        self.check()?;
        if self.pos() == Position::MAX {
            return Err(self.fail_overflow());
        }
        self.limit = self.buffer.capacity();
        self.clamp_limit();
        Ok(())
    }

    /// Account for staged bytes the destination accepted and empty the
    /// window.
    pub fn commit_staged(&mut self) {
        self.start_pos += self.cursor as Position;
        self.cursor = 0;
        self.clamp_limit();
    }

    /// Account for `n` bytes written to the destination around the buffer.
    pub fn commit_direct(&mut self, n: usize) {
        debug_assert_eq!(self.cursor, 0, "direct write with staged bytes");
        self.start_pos += n as Position;
        self.clamp_limit();
    }

    /// Panic unless the window is consistent with the buffer and position.
    #[cfg(any(test, feature = "fuzzing"))]
    pub fn assert_invariants(&self) {
        assert!(self.cursor <= self.limit, "cursor {} past limit {}", self.cursor, self.limit);
        assert!(
            self.limit <= self.buffer.capacity(),
            "limit {} past capacity {}",
            self.limit,
            self.buffer.capacity()
        );
        assert!(
            self.start_pos.checked_add(self.limit as Position).is_some(),
            "window end overflows at start_pos {}",
            self.start_pos
        );
        if self.status.is_some() {
            assert_eq!(self.available(), 0, "failed writer with space available");
        }
    }

    fn clamp_limit(&mut self) {
        if self.status.is_some() {
            self.limit = self.cursor;
            return;
        }
        let room = Position::MAX - self.pos();
        let max_limit = usize::try_from(room)
            .map_or(usize::MAX, |room| self.cursor.saturating_add(room));
        self.limit = self.limit.min(max_limit).min(self.buffer.capacity());
    }
}

/// A sequential byte sink with a buffered fast path.
///
/// Implementors provide the state accessors, [`Writer::push_slow`] and
/// [`Writer::flush`]; everything else has a default in terms of those.
pub trait Writer {
    /// The window, position and status of this writer.
    fn state(&self) -> &WriterState;

    /// Mutable access to [`Writer::state`].
    fn state_mut(&mut self) -> &mut WriterState;

    /// Make at least one byte available.
    ///
    /// Called only when [`Writer::available`] is zero. Implementations hand
    /// staged bytes to the destination and/or grow the buffer, then reopen
    /// the window.
    ///
    /// # Errors
    ///
    /// Fails on destination errors and when the position reached
    /// [`Position::MAX`]. Either failure is terminal.
    fn push_slow(&mut self) -> Result<(), WriterError>;

    /// Write `src`, which does not fit in the available space.
    ///
    /// The default fills the window, pushes, and repeats.
    ///
    /// # Errors
    ///
    /// Propagates the first [`Writer::push_slow`] failure.
    fn write_slow(&mut self, src: &[u8]) -> Result<(), WriterError> {
        write_slow_buffered(self, src)
    }

    /// Hand staged bytes to the destination and propagate them as far as
    /// `flush_type` asks.
    ///
    /// # Errors
    ///
    /// Fails when draining or the destination's commit call fails.
    fn flush(&mut self, flush_type: FlushType) -> Result<(), WriterError>;

    /// Ensure at least one byte is available.
    ///
    /// # Errors
    ///
    /// See [`Writer::push_slow`].
    #[inline]
    fn push(&mut self) -> Result<(), WriterError> {
        if self.available() > 0 {
            Ok(())
        } else {
            self.push_slow()
        }
    }

    /// Write all of `src`.
    ///
    /// # Errors
    ///
    /// See [`Writer::write_slow`].
    #[inline]
    fn write(&mut self, src: &[u8]) -> Result<(), WriterError> {
        if src.len() <= self.available() {
            self.state_mut().put(src);
            Ok(())
        } else {
            self.write_slow(src)
        }
    }

    #[inline]
    fn available(&self) -> usize {
        self.state().available()
    }

    #[inline]
    fn written_to_buffer(&self) -> usize {
        self.state().written_to_buffer()
    }

    #[inline]
    fn pos(&self) -> Position {
        self.state().pos()
    }

    #[inline]
    fn start_pos(&self) -> Position {
        self.state().start_pos()
    }

    #[inline]
    fn healthy(&self) -> bool {
        self.state().healthy()
    }

    #[inline]
    fn status(&self) -> Option<&WriterError> {
        self.state().status()
    }

    /// Direct access to the available space; follow with
    /// [`Writer::advance`].
    #[inline]
    fn chunk_mut(&mut self) -> &mut [u8] {
        self.state_mut().chunk_mut()
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        self.state_mut().advance(n);
    }

    /// Fail with [`WriterError::Overflow`].
    fn fail_overflow(&mut self) -> WriterError {
        self.state_mut().fail_overflow()
    }
}

/// The default [`Writer::write_slow`]: fill the window, push, repeat.
///
/// Backends that override `write_slow` for some payloads call this for the
/// rest.
///
/// # Errors
///
/// Propagates the first [`Writer::push_slow`] failure.
pub fn write_slow_buffered<W: Writer + ?Sized>(
    writer: &mut W,
    mut src: &[u8],
) -> Result<(), WriterError> {
    debug_assert!(
        src.len() > writer.available(),
        "Failed precondition of Writer::write_slow(): length too small, use write() instead"
    );
    writer.state().check()?;
    if src.len() as Position > Position::MAX - writer.pos() {
        return Err(writer.fail_overflow());
    }
    loop {
        let (head, tail) = src.split_at(writer.available());
        writer.state_mut().put(head);
        src = tail;
        writer.push_slow()?;
        if src.len() <= writer.available() {
            break;
        }
    }
    writer.state_mut().put(src);
    Ok(())
}

impl<W: Writer + ?Sized> Writer for &mut W {
    fn state(&self) -> &WriterState {
        (**self).state()
    }

    fn state_mut(&mut self) -> &mut WriterState {
        (**self).state_mut()
    }

    fn push_slow(&mut self) -> Result<(), WriterError> {
        (**self).push_slow()
    }

    fn write_slow(&mut self, src: &[u8]) -> Result<(), WriterError> {
        (**self).write_slow(src)
    }

    fn flush(&mut self, flush_type: FlushType) -> Result<(), WriterError> {
        (**self).flush(flush_type)
    }
}
