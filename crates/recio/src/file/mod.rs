//! File-backed destinations.
//!
//! [`FileWriter`] talks to its destination only through [`WritableFile`], and
//! opens destinations only through [`FileSystem`]. [`StdFileSystem`] backs
//! both with `std::fs`; [`MemoryFile`] keeps everything in memory and records
//! each call.

mod memory;
mod writer;

use std::{
    fs::{self, OpenOptions},
    io::{self, Write as _},
    path::{Path, PathBuf},
};

pub use memory::MemoryFile;
pub use writer::FileWriter;

use crate::writer::Position;

/// An open, append-only file handle.
pub trait WritableFile {
    /// Append `data` at the end of the file.
    ///
    /// # Errors
    ///
    /// Any I/O error; the file may have accepted a prefix of `data`.
    fn append(&mut self, data: &[u8]) -> io::Result<()>;

    /// Make appended data visible to other processes.
    ///
    /// # Errors
    ///
    /// Any I/O error.
    fn flush(&mut self) -> io::Result<()>;

    /// Make appended data durable across a machine restart.
    ///
    /// # Errors
    ///
    /// Any I/O error.
    fn sync(&mut self) -> io::Result<()>;

    /// Current size of the file, which is where the next append lands.
    ///
    /// # Errors
    ///
    /// Any I/O error.
    fn tell(&mut self) -> io::Result<Position>;

    /// Name of the file, for diagnostics.
    ///
    /// # Errors
    ///
    /// [`io::ErrorKind::Unsupported`] when the handle has no name.
    fn name(&self) -> io::Result<String> {
        Err(io::ErrorKind::Unsupported.into())
    }
}

impl<F: WritableFile + ?Sized> WritableFile for &mut F {
    fn append(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).append(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn sync(&mut self) -> io::Result<()> {
        (**self).sync()
    }

    fn tell(&mut self) -> io::Result<Position> {
        (**self).tell()
    }

    fn name(&self) -> io::Result<String> {
        (**self).name()
    }
}

impl<F: WritableFile + ?Sized> WritableFile for Box<F> {
    fn append(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).append(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn sync(&mut self) -> io::Result<()> {
        (**self).sync()
    }

    fn tell(&mut self) -> io::Result<Position> {
        (**self).tell()
    }

    fn name(&self) -> io::Result<String> {
        (**self).name()
    }
}

/// Opens [`WritableFile`]s by path.
pub trait FileSystem {
    type File: WritableFile;

    /// Open `path` for writing, truncating it or creating it.
    ///
    /// # Errors
    ///
    /// Any I/O error.
    fn create(&self, path: &Path) -> io::Result<Self::File>;

    /// Open `path` for appending, creating it if missing.
    ///
    /// # Errors
    ///
    /// Any I/O error.
    fn append(&self, path: &Path) -> io::Result<Self::File>;
}

/// [`FileSystem`] over `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    type File = StdFile;

    fn create(&self, path: &Path) -> io::Result<StdFile> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(StdFile {
            file,
            path: path.to_path_buf(),
            pos: 0,
        })
    }

    fn append(&self, path: &Path) -> io::Result<StdFile> {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        let pos = file.metadata()?.len();
        Ok(StdFile {
            file,
            path: path.to_path_buf(),
            pos,
        })
    }
}

/// A [`WritableFile`] over [`std::fs::File`].
#[derive(Debug)]
pub struct StdFile {
    file: fs::File,
    path: PathBuf,
    pos: Position,
}

impl StdFile {
    /// Wrap an already open file positioned at its end.
    ///
    /// # Errors
    ///
    /// Fails when the file's metadata cannot be read.
    pub fn from_file(file: fs::File, path: impl Into<PathBuf>) -> io::Result<Self> {
        let pos = file.metadata()?.len();
        Ok(Self {
            file,
            path: path.into(),
            pos,
        })
    }

    /// The path the file was opened at.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WritableFile for StdFile {
    fn append(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.pos += data.len() as Position;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn sync(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }

    fn tell(&mut self) -> io::Result<Position> {
        Ok(self.pos)
    }

    fn name(&self) -> io::Result<String> {
        Ok(self.path.display().to_string())
    }
}
