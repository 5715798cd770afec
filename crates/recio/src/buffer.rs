//! Owned byte storage backing buffered writers.
//!
//! A [`Buffer`] is a fixed allocation plus a populated prefix. It is moved,
//! never shared: handing it to a rope value with [`Buffer::to_rope`] either
//! copies the requested bytes or moves the whole allocation into the value,
//! leaving the `Buffer` empty.

use core::{fmt, mem, ops::Range};

use bstr::BStr;
use bytes::Bytes;

use crate::rope::{BytesRope, ExternalBuffer, RopeBuilder};

/// Unused space a buffer may always keep without being considered wasteful.
pub const MIN_BUFFER_SIZE: usize = 256;

/// Payloads up to this length are always copied; a rope stores them inline.
pub const INLINE_THRESHOLD: usize = 15;

/// Largest payload a rope copies into a single node. Longer copies get an
/// exactly sized external node instead of being split.
pub const MAX_FLAT_SIZE: usize = 4096 - 13;

/// Whether keeping an allocation of `capacity` bytes for `used` bytes retains
/// disproportionate unused space.
///
/// # Panics
///
/// Panics in debug builds if `used > capacity`.
#[must_use]
#[inline]
pub fn wasteful(capacity: usize, used: usize) -> bool {
    debug_assert!(used <= capacity, "used {used} exceeds capacity {capacity}");
    capacity - used > used.max(MIN_BUFFER_SIZE)
}

/// How [`Buffer::to_rope`] materializes a sub-range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Copy into a tightly sized rope node.
    Copy,
    /// Copy into a new exactly sized buffer and hand that over as an
    /// external node, because a plain copy would be split.
    CopyExternal,
    /// Move this buffer's allocation into the rope without copying.
    Transfer,
}

/// Growable, uniquely owned byte allocation.
#[derive(Default)]
pub struct Buffer {
    data: Box<[u8]>,
    len: usize,
}

impl Buffer {
    /// An empty buffer without an allocation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer with exactly `capacity` bytes allocated.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of populated bytes.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Mark the first `len` bytes of the allocation as populated.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the capacity.
    #[inline]
    pub fn set_len(&mut self, len: usize) {
        assert!(
            len <= self.capacity(),
            "Failed precondition of Buffer::set_len(): length {len} exceeds capacity {}",
            self.capacity()
        );
        self.len = len;
    }

    /// The populated bytes.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// The whole allocation, populated or not.
    #[must_use]
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Make room for at least `min` bytes and return the whole allocation.
    ///
    /// Growth at least doubles the capacity and keeps the populated bytes.
    /// The buffer never shrinks.
    pub fn ensure_capacity(&mut self, min: usize) -> &mut [u8] {
        if min > self.capacity() {
            let capacity = min.max(self.capacity().saturating_mul(2));
            let mut data = vec![0; capacity].into_boxed_slice();
            data[..self.len].copy_from_slice(&self.data[..self.len]);
            self.data = data;
        }
        &mut self.data
    }

    /// Decide how `range` would be materialized by [`Buffer::to_rope`].
    ///
    /// # Panics
    ///
    /// Panics if `range` is not contained in the allocation.
    #[must_use]
    pub fn conversion_for(&self, range: &Range<usize>) -> Conversion {
        self.check_range(range, "Buffer::conversion_for()");
        let len = range.len();
        if len <= INLINE_THRESHOLD || wasteful(self.capacity(), len) {
            if len <= MAX_FLAT_SIZE {
                Conversion::Copy
            } else {
                Conversion::CopyExternal
            }
        } else {
            Conversion::Transfer
        }
    }

    /// Turn `range` of the allocation into a rope value.
    ///
    /// Small payloads and payloads that would waste most of the allocation
    /// are copied. Otherwise the allocation itself moves into the value and
    /// `self` is left empty; it must be re-grown before being written again.
    ///
    /// # Panics
    ///
    /// Panics if `range` is not contained in the allocation.
    #[allow(clippy::wrong_self_convention)]
    pub fn to_rope<R: RopeBuilder>(&mut self, range: Range<usize>, rope: &mut R) -> R::Rope {
        self.check_range(&range, "Buffer::to_rope()");
        match self.conversion_for(&range) {
            Conversion::Copy => rope.from_copy(&self.data[range]),
            Conversion::CopyExternal => {
                let len = range.len();
                let mut fresh = Buffer::with_capacity(len);
                fresh.data.copy_from_slice(&self.data[range]);
                fresh.len = len;
                rope.from_external(ExternalBuffer::new(fresh, 0..len))
            }
            Conversion::Transfer => {
                let buffer = mem::take(self);
                rope.from_external(ExternalBuffer::new(buffer, range))
            }
        }
    }

    /// [`Buffer::to_rope`] producing [`Bytes`].
    ///
    /// # Panics
    ///
    /// Panics if `range` is not contained in the allocation.
    #[allow(clippy::wrong_self_convention)]
    pub fn to_bytes(&mut self, range: Range<usize>) -> Bytes {
        self.to_rope(range, &mut BytesRope)
    }

    fn check_range(&self, range: &Range<usize>, operation: &str) {
        assert!(
            range.start <= range.end && range.end <= self.capacity(),
            "Failed precondition of {operation}: range {range:?} not contained in the buffer of capacity {}",
            self.capacity()
        );
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("capacity", &self.capacity())
            .field("data", &BStr::new(self.as_slice()))
            .finish()
    }
}
