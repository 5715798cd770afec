use std::{
    fmt::{self, Write as _},
    io,
};

use thiserror::Error;

/// Terminal failure of a [`Writer`](crate::Writer).
///
/// Once a writer fails it keeps returning a clone of the same error from
/// every slow-path operation, so the error is cheap to clone and compare.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriterError {
    /// A destination call failed.
    ///
    /// `context` names the failing operation and, when known, the file
    /// being written, e.g. `WritableFile::append() failed writing out.bin`.
    #[error("{context}: {message}")]
    Operation {
        context: String,
        kind: io::ErrorKind,
        message: String,
    },
    /// The destination position would exceed [`Position::MAX`](crate::Position).
    #[error("writer position overflow")]
    Overflow,
    /// The writer was closed and no longer has a destination.
    #[error("writer closed")]
    Closed,
}

impl WriterError {
    /// Annotate an I/O error with the operation that produced it.
    pub(crate) fn operation(operation: &str, filename: &str, err: &io::Error) -> Self {
        let mut context = format!("{operation} failed");
        if !filename.is_empty() {
            let _ = write!(context, " writing {filename}");
        }
        WriterError::Operation {
            context,
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// The I/O error kind of a failed destination call, if any.
    #[must_use]
    pub fn kind(&self) -> Option<io::ErrorKind> {
        match self {
            WriterError::Operation { kind, .. } => Some(*kind),
            WriterError::Overflow | WriterError::Closed => None,
        }
    }
}

impl From<WriterError> for io::Error {
    fn from(err: WriterError) -> Self {
        let kind = match &err {
            WriterError::Operation { kind, .. } => *kind,
            WriterError::Overflow => io::ErrorKind::FileTooLarge,
            WriterError::Closed => io::ErrorKind::NotConnected,
        };
        io::Error::new(kind, err)
    }
}

/// Failure of [`FileWriter::into_inner`](crate::FileWriter::into_inner).
///
/// Carries the destination back so that an owned handle is not lost with the
/// writer. The destination is absent when the open failed or the writer was
/// already closed.
#[derive(Debug)]
pub struct IntoInnerError<D> {
    error: WriterError,
    dest: Option<D>,
}

impl<D> IntoInnerError<D> {
    pub(crate) fn new(error: WriterError, dest: Option<D>) -> Self {
        Self { error, dest }
    }

    /// The failure that prevented draining the staged bytes.
    #[must_use]
    pub fn error(&self) -> &WriterError {
        &self.error
    }

    /// The destination, which may be missing some of the staged bytes.
    #[must_use]
    pub fn into_inner(self) -> Option<D> {
        self.dest
    }

    /// The failure and the destination.
    #[must_use]
    pub fn into_parts(self) -> (WriterError, Option<D>) {
        (self.error, self.dest)
    }
}

impl<D> fmt::Display for IntoInnerError<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<D: fmt::Debug> std::error::Error for IntoInnerError<D> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl<D> From<IntoInnerError<D>> for WriterError {
    fn from(err: IntoInnerError<D>) -> Self {
        err.error
    }
}

/// Failure to parse an option string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// No parser is registered for `key`.
    #[error("Option {key}: unknown option, valid options: {valid_keys}")]
    UnknownKey { key: String, valid_keys: String },
    /// The parser registered for `key` rejected `value`.
    #[error("Option {key}: invalid value {value:?}, valid values: {valid_values}")]
    InvalidValue {
        key: String,
        value: String,
        valid_values: String,
    },
}

impl OptionsError {
    /// The key of the option that failed to parse.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            OptionsError::UnknownKey { key, .. } | OptionsError::InvalidValue { key, .. } => key,
        }
    }
}
