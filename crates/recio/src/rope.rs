//! Immutable byte values built from writer buffers.
//!
//! The rope container itself is not part of this crate. A [`RopeBuilder`]
//! is the capability [`Buffer::to_rope`] needs from it: build a value from a
//! copy, or build a value that takes over an allocation and releases it when
//! the last reference is dropped. [`BytesRope`] is the default builder and
//! produces [`bytes::Bytes`].

use core::ops::Range;

use bytes::Bytes;

use crate::buffer::Buffer;

/// A [`Buffer`] handed to a rope value, together with the sub-range of its
/// allocation the value exposes.
///
/// Dropping an `ExternalBuffer` releases the allocation. Builders keep it
/// alive for as long as the value built from it is referenced.
pub struct ExternalBuffer {
    buffer: Buffer,
    range: Range<usize>,
}

impl ExternalBuffer {
    pub(crate) fn new(buffer: Buffer, range: Range<usize>) -> Self {
        debug_assert!(range.start <= range.end && range.end <= buffer.capacity());
        Self { buffer, range }
    }

    /// The bytes exposed by the value.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer.data()[self.range.clone()]
    }

    /// Size of the underlying allocation, which can exceed the exposed range.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.buffer.capacity()
    }
}

impl AsRef<[u8]> for ExternalBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl core::fmt::Debug for ExternalBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExternalBuffer")
            .field("allocated", &self.allocated())
            .field("range", &self.range)
            .finish()
    }
}

/// Construction capability of an immutable rope value.
#[allow(clippy::wrong_self_convention)]
pub trait RopeBuilder {
    /// The value type produced.
    type Rope;

    /// Build a value owning a fresh, tightly sized copy of `src`.
    fn from_copy(&mut self, src: &[u8]) -> Self::Rope;

    /// Build a value that references `owner` without copying. `owner` must be
    /// dropped exactly once, when the last reference to the value goes away.
    fn from_external(&mut self, owner: ExternalBuffer) -> Self::Rope;
}

/// Builds [`Bytes`] values.
#[derive(Clone, Copy, Debug, Default)]
pub struct BytesRope;

impl RopeBuilder for BytesRope {
    type Rope = Bytes;

    #[inline]
    fn from_copy(&mut self, src: &[u8]) -> Bytes {
        Bytes::copy_from_slice(src)
    }

    #[inline]
    fn from_external(&mut self, owner: ExternalBuffer) -> Bytes {
        Bytes::from_owner(owner)
    }
}
