use tracing_test::traced_test;

use super::utils::VecSink;
use crate::{Buffer, FlushType, Position, Writer, WriterError, WriterState};

#[test]
fn fast_path_stays_in_buffer() {
    let mut sink = VecSink::new(16);
    sink.write(b"hello").unwrap();
    sink.write(b" world").unwrap();
    assert_eq!(sink.pushes, 0);
    assert_eq!(sink.written_to_buffer(), 11);
    assert_eq!(sink.available(), 5);
    assert_eq!(sink.pos(), 11);
    assert_eq!(sink.start_pos(), 0);
}

#[test]
fn buffered_write_slow_splits_across_pushes() {
    let mut sink = VecSink::new(4);
    sink.write(b"abcdefghij").unwrap();
    assert_eq!(sink.pushes, 2);
    assert_eq!(sink.pushed, b"abcdefgh");
    assert_eq!(sink.start_pos(), 8);
    assert_eq!(sink.pos(), 10);
    assert_eq!(sink.all_bytes(), b"abcdefghij");
}

#[test]
fn write_exactly_filling_window_does_not_push() {
    let mut sink = VecSink::new(4);
    sink.write(b"abcd").unwrap();
    assert_eq!(sink.pushes, 0);
    assert_eq!(sink.available(), 0);
    sink.push().unwrap();
    assert_eq!(sink.pushes, 1);
    assert_eq!(sink.available(), 4);
}

#[test]
fn chunk_mut_and_advance() {
    let mut sink = VecSink::new(8);
    let chunk = sink.chunk_mut();
    assert_eq!(chunk.len(), 8);
    chunk[..3].copy_from_slice(b"xyz");
    sink.advance(3);
    sink.flush(FlushType::FromObject).unwrap();
    assert_eq!(sink.pushed, b"xyz");
    assert_eq!(sink.pos(), 3);
}

#[test]
#[should_panic(expected = "Failed precondition of Writer::advance()")]
fn advance_past_window_panics() {
    let mut sink = VecSink::new(8);
    sink.advance(9);
}

#[test]
fn window_clamped_near_max_position() {
    let sink = VecSink::at(100, Position::MAX - 10);
    assert_eq!(sink.available(), 10);
    assert_eq!(sink.pos(), Position::MAX - 10);
    sink.state().assert_invariants();
}

#[test]
fn write_past_max_position_overflows() {
    let mut sink = VecSink::at(100, Position::MAX - 10);
    sink.write(b"12345").unwrap();
    assert_eq!(sink.write(b"0123456789"), Err(WriterError::Overflow));
    assert_eq!(sink.status(), Some(&WriterError::Overflow));
    assert_eq!(sink.available(), 0);
    assert_eq!(sink.pos(), Position::MAX - 5);
    assert_eq!(sink.pushes, 0);
    sink.state().assert_invariants();
    assert_eq!(sink.write(b"x"), Err(WriterError::Overflow));
    assert_eq!(sink.push(), Err(WriterError::Overflow));
}

#[test]
fn filling_to_max_position_then_pushing_overflows() {
    let mut sink = VecSink::at(100, Position::MAX - 4);
    sink.write(b"abcd").unwrap();
    assert_eq!(sink.pos(), Position::MAX);
    assert_eq!(sink.push(), Err(WriterError::Overflow));
    assert_eq!(sink.pushed, b"abcd");
}

#[traced_test]
#[test]
fn first_failure_is_kept() {
    let mut state = WriterState::with_buffer(Buffer::with_capacity(8));
    let first = state.fail(WriterError::Overflow);
    let second = state.fail(WriterError::Closed);
    assert_eq!(first, WriterError::Overflow);
    assert_eq!(second, WriterError::Overflow);
    assert_eq!(state.check(), Err(WriterError::Overflow));
    assert!(!state.healthy());
    assert_eq!(state.available(), 0);
    assert!(logs_contain("writer failed"));
}

#[test]
fn failure_keeps_staged_bytes_visible() {
    let mut state = WriterState::with_buffer(Buffer::with_capacity(8));
    state.chunk_mut()[..2].copy_from_slice(b"ok");
    state.advance(2);
    state.fail(WriterError::Overflow);
    assert_eq!(state.staged(), b"ok");
    assert_eq!(state.pos(), 2);
    assert_eq!(state.open_window(), Err(WriterError::Overflow));
}

#[test]
fn close_discards_window() {
    let mut state = WriterState::with_buffer(Buffer::with_capacity(8));
    state.advance(3);
    state.close();
    assert_eq!(state.status(), Some(&WriterError::Closed));
    assert_eq!(state.written_to_buffer(), 0);
    assert_eq!(state.available(), 0);
}

#[test]
fn writer_through_mutable_reference() {
    fn write_all(mut writer: impl Writer, chunks: &[&[u8]]) {
        for chunk in chunks {
            writer.write(chunk).unwrap();
        }
        writer.flush(FlushType::FromObject).unwrap();
    }

    let mut sink = VecSink::new(3);
    write_all(&mut sink, &[&b"ab"[..], &b"cde"[..], &b"f"[..]]);
    assert_eq!(sink.pushed, b"abcdef");
    assert_eq!(sink.pos(), 6);
}
