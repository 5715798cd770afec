use crate::{
    Buffer, FlushType, Position, Writer, WriterError, WriterState, rope::ExternalBuffer,
    rope::RopeBuilder,
};

/// A writer that moves staged bytes into a `Vec` on every push.
///
/// Pushes reuse a fixed-size buffer, so the default buffered `write_slow` is
/// what gets exercised.
#[derive(Debug)]
pub struct VecSink {
    state: WriterState,
    pub pushed: Vec<u8>,
    pub pushes: usize,
    capacity: usize,
}

impl VecSink {
    pub fn new(capacity: usize) -> Self {
        Self::at(capacity, 0)
    }

    pub fn at(capacity: usize, start_pos: Position) -> Self {
        let mut state = WriterState::with_buffer(Buffer::with_capacity(capacity));
        state.set_start_pos(start_pos);
        Self {
            state,
            pushed: Vec::new(),
            pushes: 0,
            capacity,
        }
    }

    pub fn all_bytes(&self) -> Vec<u8> {
        let mut all = self.pushed.clone();
        all.extend_from_slice(self.state.staged());
        all
    }
}

impl Writer for VecSink {
    fn state(&self) -> &WriterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut WriterState {
        &mut self.state
    }

    fn push_slow(&mut self) -> Result<(), WriterError> {
        self.state.check()?;
        self.pushed.extend_from_slice(self.state.staged());
        self.pushes += 1;
        self.state.commit_staged();
        self.state.buffer_mut().ensure_capacity(self.capacity);
        self.state.open_window()
    }

    fn flush(&mut self, _flush_type: FlushType) -> Result<(), WriterError> {
        self.state.check()?;
        self.pushed.extend_from_slice(self.state.staged());
        self.state.commit_staged();
        Ok(())
    }
}

/// What a [`CountingRope`] was asked to build.
#[derive(Debug, PartialEq, Eq)]
pub enum Built {
    Copy(Vec<u8>),
    External { bytes: Vec<u8>, allocated: usize },
}

/// Records every conversion instead of building a real rope.
#[derive(Debug, Default)]
pub struct CountingRope {
    pub copies: usize,
    pub externals: usize,
}

impl RopeBuilder for CountingRope {
    type Rope = Built;

    fn from_copy(&mut self, src: &[u8]) -> Built {
        self.copies += 1;
        Built::Copy(src.to_vec())
    }

    fn from_external(&mut self, owner: ExternalBuffer) -> Built {
        self.externals += 1;
        Built::External {
            bytes: owner.as_bytes().to_vec(),
            allocated: owner.allocated(),
        }
    }
}

/// A buffer of `capacity` bytes filled with a recognizable pattern.
#[allow(clippy::cast_possible_truncation)]
pub fn patterned_buffer(capacity: usize) -> Buffer {
    let mut buffer = Buffer::with_capacity(capacity);
    for (i, byte) in buffer.data_mut().iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }
    buffer.set_len(capacity);
    buffer
}
