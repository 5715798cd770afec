mod parser;

use core::str::FromStr;

pub use parser::{
    OptionParser, OptionTarget, alt_option, bytes_option, copy_option, enum_option, int_option,
    parse_options, real_option,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Largest accepted `buffer_size`.
pub const MAX_BUFFER_SIZE: usize = (1 << 31) - 1;

/// Buffer size used when none is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 64 << 10;

/// Configuration of a [`FileWriter`](crate::FileWriter).
///
/// Options can be set field by field or parsed from an option string:
///
/// ```rust
/// use recio::WriterOptions;
///
/// let options: WriterOptions = "buffer_size:64k,append".parse().unwrap();
/// assert_eq!(options.buffer_size, 65536);
/// assert!(options.append);
/// ```
///
/// # Default
///
/// A 64 KiB buffer, truncating the destination on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WriterOptions {
    /// Capacity of the staging buffer, in bytes.
    ///
    /// Writes of at least this many bytes bypass the buffer.
    ///
    /// Option string key: `buffer_size`, a byte count such as `4096`, `64k`
    /// or `1.5M`, between 1 and [`MAX_BUFFER_SIZE`].
    ///
    /// # Default
    ///
    /// [`DEFAULT_BUFFER_SIZE`]
    pub buffer_size: usize,

    /// Whether to append to an existing destination instead of truncating
    /// it.
    ///
    /// When appending, positions reported by the writer start at the
    /// destination's current size.
    ///
    /// Option string key: `append`, `append:true` or `append:false`.
    ///
    /// # Default
    ///
    /// `false`
    pub append: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            append: false,
        }
    }
}

impl WriterOptions {
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    #[must_use]
    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Defaults overridden by the option string `text`.
    ///
    /// # Errors
    ///
    /// See [`WriterOptions::apply`].
    pub fn parse(text: &str) -> Result<Self, OptionsError> {
        let mut options = Self::default();
        options.apply(text)?;
        Ok(options)
    }

    /// Override fields from the option string `text`.
    ///
    /// Options before a failing one still take effect.
    ///
    /// # Errors
    ///
    /// Fails on unknown keys and on invalid values.
    pub fn apply(&mut self, text: &str) -> Result<(), OptionsError> {
        let mut buffer_size = self.buffer_size as u64;
        let mut append = self.append;
        let result = parse_options(
            &mut [
                (
                    "buffer_size",
                    bytes_option(&mut buffer_size, 1, MAX_BUFFER_SIZE as u64),
                ),
                (
                    "append",
                    enum_option(&mut append, [("", true), ("true", true), ("false", false)]),
                ),
            ],
            text,
        );
        self.buffer_size = usize::try_from(buffer_size).unwrap_or(MAX_BUFFER_SIZE);
        self.append = append;
        result
    }
}

impl FromStr for WriterOptions {
    type Err = OptionsError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}
