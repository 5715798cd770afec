use std::{fmt, io, path::Path};

use super::{FileSystem, WritableFile};
use crate::{
    error::{IntoInnerError, WriterError},
    options::WriterOptions,
    writer::{FlushType, Position, Writer, WriterState, write_slow_buffered},
};

/// A [`Writer`] staging bytes in front of a [`WritableFile`].
///
/// The destination `D` is either owned (`StdFile`, `Box<dyn WritableFile>`)
/// or borrowed (`&mut F`). Payloads of at least one buffer's length bypass
/// the buffer and go to the destination in a single append.
///
/// Staged bytes are appended when the buffer fills, on [`Writer::flush`],
/// on [`FileWriter::close`], and best-effort on drop.
pub struct FileWriter<D: WritableFile> {
    state: WriterState,
    dest: Option<D>,
    filename: String,
    buffer_size: usize,
}

impl<D: WritableFile> FileWriter<D> {
    /// Write to an already open handle.
    ///
    /// The filename is taken from [`WritableFile::name`]; a handle without a
    /// name leaves it empty. With `options.append` the initial position is
    /// taken from [`WritableFile::tell`].
    ///
    /// Initialization failures leave the writer failed; check
    /// [`Writer::healthy`].
    pub fn new(dest: D, options: &WriterOptions) -> Self {
        let mut writer = Self::unopened(options);
        writer.initialize_filename(&dest);
        writer.dest = Some(dest);
        if options.append && writer.state.healthy() {
            writer.initialize_pos();
        }
        writer
    }

    /// Open `path` through `fs`, truncating it or, with `options.append`,
    /// appending to it.
    ///
    /// A failed open leaves the writer failed and without a destination;
    /// every later operation reports the open error.
    pub fn open<F>(fs: &F, path: impl AsRef<Path>, options: &WriterOptions) -> Self
    where
        F: FileSystem<File = D> + ?Sized,
    {
        let path = path.as_ref();
        let mut writer = Self::unopened(options);
        writer.filename = path.display().to_string();
        let (operation, opened) = if options.append {
            ("FileSystem::append()", fs.append(path))
        } else {
            ("FileSystem::create()", fs.create(path))
        };
        match opened {
            Ok(dest) => {
                tracing::debug!(filename = %writer.filename, append = options.append, "opened file");
                writer.dest = Some(dest);
                if options.append {
                    writer.initialize_pos();
                }
            }
            Err(err) => {
                writer.fail_operation(operation, &err);
            }
        }
        writer
    }

    fn unopened(options: &WriterOptions) -> Self {
        Self {
            state: WriterState::new(),
            dest: None,
            filename: String::new(),
            buffer_size: options.buffer_size.max(1),
        }
    }

    fn initialize_filename(&mut self, dest: &D) {
        match dest.name() {
            Ok(name) => self.filename = name,
            Err(err) if err.kind() == io::ErrorKind::Unsupported => {}
            Err(err) => {
                self.fail_operation("WritableFile::name()", &err);
            }
        }
    }

    fn initialize_pos(&mut self) {
        let Some(dest) = self.dest.as_mut() else {
            return;
        };
        match dest.tell() {
            Ok(pos) => self.state.set_start_pos(pos),
            Err(err) => {
                self.fail_operation("WritableFile::tell()", &err);
            }
        }
    }

    fn fail_operation(&mut self, operation: &str, err: &io::Error) -> WriterError {
        self.state
            .fail(WriterError::operation(operation, &self.filename, err))
    }

    /// Name of the destination for diagnostics; empty when unknown.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Capacity the buffer is allocated with.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// The destination, unless the open failed or the writer was closed.
    #[must_use]
    pub fn get_ref(&self) -> Option<&D> {
        self.dest.as_ref()
    }

    /// Append staged bytes and return the destination.
    ///
    /// # Errors
    ///
    /// Fails when the writer has failed or the final append fails. The error
    /// carries the destination, if any.
    pub fn into_inner(mut self) -> Result<D, IntoInnerError<D>> {
        let drained = self.push_internal();
        match (drained, self.dest.take()) {
            (Ok(()), Some(dest)) => Ok(dest),
            (Ok(()), None) => Err(IntoInnerError::new(WriterError::Closed, None)),
            (Err(error), dest) => Err(IntoInnerError::new(error, dest)),
        }
    }

    /// Append staged bytes and release the destination. An owned destination
    /// is dropped; a borrowed one becomes usable by its owner again.
    ///
    /// Closing an already closed writer succeeds.
    ///
    /// # Errors
    ///
    /// Fails when the writer has failed or the final append fails.
    pub fn close(&mut self) -> Result<(), WriterError> {
        if self.state.status() == Some(&WriterError::Closed) {
            return Ok(());
        }
        self.push_internal()?;
        self.dest = None;
        self.state.close();
        tracing::debug!(filename = %self.filename, pos = self.state.pos(), "closed file");
        Ok(())
    }

    /// Payloads at least this long skip the buffer.
    ///
    /// Such a payload would cost at least one full-buffer append anyway, so
    /// staging it only adds a copy.
    fn length_to_write_directly(&self) -> usize {
        self.buffer_size
    }

    /// Append the staged bytes, leaving the window empty.
    fn push_internal(&mut self) -> Result<(), WriterError> {
        self.state.check()?;
        if self.state.written_to_buffer() == 0 {
            return Ok(());
        }
        let Self {
            state,
            dest,
            filename,
            ..
        } = self;
        let Some(dest) = dest.as_mut() else {
            return Err(state.fail(WriterError::Closed));
        };
        match append(dest, filename.as_str(), state.start_pos(), state.staged()) {
            Ok(()) => {
                state.commit_staged();
                Ok(())
            }
            Err(err) => Err(state.fail(err)),
        }
    }

    /// Append `src` directly. Nothing may be staged.
    fn write_internal(&mut self, src: &[u8]) -> Result<(), WriterError> {
        debug_assert!(
            !src.is_empty(),
            "Failed precondition of FileWriter::write_internal(): nothing to write"
        );
        debug_assert_eq!(
            self.state.written_to_buffer(),
            0,
            "Failed precondition of FileWriter::write_internal(): buffer not empty"
        );
        self.state.check()?;
        let Self {
            state,
            dest,
            filename,
            ..
        } = self;
        let Some(dest) = dest.as_mut() else {
            return Err(state.fail(WriterError::Closed));
        };
        tracing::debug!(len = src.len(), pos = state.start_pos(), "writing around the buffer");
        match append(dest, filename.as_str(), state.start_pos(), src) {
            Ok(()) => {
                state.commit_direct(src.len());
                Ok(())
            }
            Err(err) => Err(state.fail(err)),
        }
    }
}

/// Append `src` at `start_pos`, annotating failures with `filename`.
fn append<D: WritableFile>(
    dest: &mut D,
    filename: &str,
    start_pos: Position,
    src: &[u8],
) -> Result<(), WriterError> {
    if src.len() as Position > Position::MAX - start_pos {
        return Err(WriterError::Overflow);
    }
    dest.append(src)
        .map_err(|err| WriterError::operation("WritableFile::append()", filename, &err))
}

impl<D: WritableFile> Writer for FileWriter<D> {
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
        self.push_internal()?;
        if self.state.buffer().capacity() < self.buffer_size {
            self.state.buffer_mut().ensure_capacity(self.buffer_size);
        }
        self.state.open_window()
    }

    fn write_slow(&mut self, src: &[u8]) -> Result<(), WriterError> {
        debug_assert!(
            src.len() > self.available(),
            "Failed precondition of Writer::write_slow(): length too small, use write() instead"
        );
        self.state.check()?;
        if src.len() as Position > Position::MAX - self.pos() {
            return Err(self.fail_overflow());
        }
        if src.len() >= self.length_to_write_directly() {
            self.push_internal()?;
            return self.write_internal(src);
        }
        write_slow_buffered(self, src)
    }

    fn flush(&mut self, flush_type: FlushType) -> Result<(), WriterError> {
        self.push_internal()?;
        let Self {
            state,
            dest,
            filename,
            ..
        } = self;
        let Some(dest) = dest.as_mut() else {
            return Err(state.fail(WriterError::Closed));
        };
        let (operation, result) = match flush_type {
            FlushType::FromObject => return Ok(()),
            FlushType::FromProcess => ("WritableFile::flush()", dest.flush()),
            FlushType::FromMachine => ("WritableFile::sync()", dest.sync()),
        };
        result.map_err(|err| state.fail(WriterError::operation(operation, filename.as_str(), &err)))?;
        tracing::debug!(?flush_type, filename = %filename, "flushed");
        Ok(())
    }
}

impl<D: WritableFile> Drop for FileWriter<D> {
    fn drop(&mut self) {
        if self.state.healthy() && self.state.written_to_buffer() > 0 {
            // Failures are already logged by `WriterState::fail`.
            let _ = self.push_internal();
        }
    }
}

impl<D: WritableFile> io::Write for FileWriter<D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Writer::write(self, buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Writer::flush(self, FlushType::FromProcess)?;
        Ok(())
    }
}

impl<D: WritableFile + fmt::Debug> fmt::Debug for FileWriter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileWriter")
            .field("filename", &self.filename)
            .field("buffer_size", &self.buffer_size)
            .field("pos", &self.state.pos())
            .field("status", &self.state.status())
            .field("dest", &self.dest)
            .finish()
    }
}
