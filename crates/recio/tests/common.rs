#![allow(missing_docs, dead_code)]

use recio::WriterOptions;

pub fn options(buffer_size: usize) -> WriterOptions {
    WriterOptions::default().with_buffer_size(buffer_size)
}

pub fn append_options(buffer_size: usize) -> WriterOptions {
    options(buffer_size).with_append(true)
}

/// `len` bytes cycling through the printable ASCII range.
#[allow(clippy::cast_possible_truncation)]
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| b' ' + (i % 95) as u8).collect()
}
