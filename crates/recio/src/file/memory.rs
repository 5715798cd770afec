use std::{fmt, io};

use bstr::BStr;

use super::WritableFile;
use crate::writer::Position;

/// An in-memory [`WritableFile`] that records every call.
///
/// Failures can be injected per operation, which makes it the destination of
/// choice for exercising writer error paths.
#[derive(Default)]
pub struct MemoryFile {
    contents: Vec<u8>,
    appends: Vec<usize>,
    flushes: usize,
    syncs: usize,
    base_pos: Position,
    name: Option<String>,
    appends_before_failure: Option<usize>,
    fail_flush: bool,
    fail_sync: bool,
    fail_tell: bool,
}

impl MemoryFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `name` from [`WritableFile::name`].
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Pretend the file already holds `pos` bytes before `contents`.
    #[must_use]
    pub fn with_position(mut self, pos: Position) -> Self {
        self.base_pos = pos;
        self
    }

    /// Accept `n` appends, then fail every later one.
    #[must_use]
    pub fn fail_appends_after(mut self, n: usize) -> Self {
        self.appends_before_failure = Some(n);
        self
    }

    #[must_use]
    pub fn fail_flush(mut self) -> Self {
        self.fail_flush = true;
        self
    }

    #[must_use]
    pub fn fail_sync(mut self) -> Self {
        self.fail_sync = true;
        self
    }

    #[must_use]
    pub fn fail_tell(mut self) -> Self {
        self.fail_tell = true;
        self
    }

    /// Bytes appended so far.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Length of each successful append, in order.
    #[must_use]
    pub fn appends(&self) -> &[usize] {
        &self.appends
    }

    #[must_use]
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    #[must_use]
    pub fn syncs(&self) -> usize {
        self.syncs
    }
}

impl WritableFile for MemoryFile {
    fn append(&mut self, data: &[u8]) -> io::Result<()> {
        if self
            .appends_before_failure
            .is_some_and(|n| self.appends.len() >= n)
        {
            return Err(io::Error::other("injected append failure"));
        }
        self.contents.extend_from_slice(data);
        self.appends.push(data.len());
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.fail_flush {
            return Err(io::Error::other("injected flush failure"));
        }
        self.flushes += 1;
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        if self.fail_sync {
            return Err(io::Error::other("injected sync failure"));
        }
        self.syncs += 1;
        Ok(())
    }

    fn tell(&mut self) -> io::Result<Position> {
        if self.fail_tell {
            return Err(io::Error::other("injected tell failure"));
        }
        Ok(self.base_pos + self.contents.len() as Position)
    }

    fn name(&self) -> io::Result<String> {
        self.name
            .clone()
            .ok_or_else(|| io::ErrorKind::Unsupported.into())
    }
}

impl fmt::Debug for MemoryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFile")
            .field("name", &self.name)
            .field("contents", &BStr::new(&self.contents))
            .field("appends", &self.appends)
            .field("flushes", &self.flushes)
            .field("syncs", &self.syncs)
            .finish_non_exhaustive()
    }
}
