//! Buffered byte sinks for record I/O.
//!
//! A [`Writer`] stages bytes in a window of an owned [`Buffer`] and hands
//! them to its destination only from its slow paths. [`FileWriter`] writes
//! to a [`WritableFile`], [`BytesWriter`] accumulates into memory and hands
//! its buffer off as an immutable value without copying when that is not
//! wasteful.
//!
//! Writers are configured with [`WriterOptions`], which can be parsed from
//! option strings such as `"buffer_size:64k,append"`; see [`parse_options`]
//! for the grammar.
//!
//! ```rust
//! use recio::{FileWriter, FlushType, MemoryFile, Writer, WriterOptions};
//!
//! let mut file = MemoryFile::new();
//! let options: WriterOptions = "buffer_size:4k".parse().unwrap();
//! let mut writer = FileWriter::new(&mut file, &options);
//! writer.write(b"record").unwrap();
//! writer.flush(FlushType::FromObject).unwrap();
//! assert_eq!(writer.pos(), 6);
//! drop(writer);
//! assert_eq!(file.contents(), b"record");
//! ```

mod buffer;
mod bytes_writer;
mod error;
mod file;
mod options;
mod rope;
mod writer;

#[cfg(test)]
mod tests;

pub use buffer::{Buffer, Conversion, INLINE_THRESHOLD, MAX_FLAT_SIZE, MIN_BUFFER_SIZE, wasteful};
pub use bytes_writer::BytesWriter;
pub use error::{IntoInnerError, OptionsError, WriterError};
pub use file::{FileSystem, FileWriter, MemoryFile, StdFile, StdFileSystem, WritableFile};
pub use options::{
    DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE, OptionParser, OptionTarget, WriterOptions, alt_option,
    bytes_option, copy_option, enum_option, int_option, parse_options, real_option,
};
pub use rope::{BytesRope, ExternalBuffer, RopeBuilder};
pub use writer::{FlushType, Position, Writer, WriterState, write_slow_buffered};
