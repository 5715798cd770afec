use quickcheck::QuickCheck;

use super::utils::VecSink;
use crate::{BytesWriter, FlushType, Position, Writer};

/// Property: however a payload is chunked, the bytes reaching the sink are the
/// payload, and `pos()` counts every byte written.
#[test]
fn chunked_writes_preserve_bytes_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(payload: Vec<u8>, splits: Vec<usize>, capacity: u8) -> bool {
        let mut sink = VecSink::new(usize::from(capacity).max(1));
        let mut rest = &payload[..];
        let mut last_start_pos = 0;
        for split in splits {
            if rest.is_empty() {
                break;
            }
            let (chunk, tail) = rest.split_at(split % (rest.len() + 1));
            sink.write(chunk).unwrap();
            sink.state().assert_invariants();
            rest = tail;
            if sink.start_pos() < last_start_pos {
                return false;
            }
            last_start_pos = sink.start_pos();
        }
        sink.write(rest).unwrap();
        sink.flush(FlushType::FromObject).unwrap();
        sink.pushed == payload && sink.pos() == payload.len() as Position
    }

    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(Vec<u8>, Vec<usize>, u8) -> bool);
}

#[test]
fn bytes_writer_matches_input_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(chunks: Vec<Vec<u8>>, capacity: u16) -> bool {
        let mut writer = BytesWriter::with_capacity(usize::from(capacity));
        let mut expected = Vec::new();
        for chunk in &chunks {
            writer.write(chunk).unwrap();
            expected.extend_from_slice(chunk);
        }
        writer.into_bytes().unwrap() == expected
    }

    let tests = if is_ci::cached() { 2_000 } else { 200 };
    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(Vec<Vec<u8>>, u16) -> bool);
}
