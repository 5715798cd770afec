#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use recio::{FileWriter, FlushType, MemoryFile, Position, Writer, WriterOptions};

#[derive(Debug, Arbitrary)]
enum Op {
    Write(Vec<u8>),
    Push,
    Flush(u8),
    Advance(u8),
    Close,
}

#[derive(Debug, Arbitrary)]
struct Input {
    buffer_size: u16,
    /// Start this far below `Position::MAX` instead of at 0.
    headroom: Option<u16>,
    appends_before_failure: Option<u8>,
    split_seed: u64,
    ops: Vec<Op>,
}

fn run(input: Input) {
    let mut file = MemoryFile::new();
    if let Some(n) = input.appends_before_failure {
        file = file.fail_appends_after(usize::from(n));
    }
    let base = match input.headroom {
        Some(headroom) => {
            file = file.with_position(Position::MAX - Position::from(headroom));
            Position::MAX - Position::from(headroom)
        }
        None => 0,
    };
    let options = WriterOptions::default()
        .with_buffer_size(usize::from(input.buffer_size).max(1))
        .with_append(input.headroom.is_some());
    let mut rng = SmallRng::seed_from_u64(input.split_seed);
    let mut expected = Vec::new();
    let mut writer = FileWriter::new(&mut file, &options);

    for op in input.ops {
        let result = match op {
            Op::Write(data) => {
                // Split the payload so that both fast and slow paths see it.
                let mut rest = &data[..];
                let mut result = Ok(());
                while !rest.is_empty() && result.is_ok() {
                    let (chunk, tail) = rest.split_at(rng.random_range(1..=rest.len()));
                    result = writer.write(chunk);
                    if result.is_ok() {
                        expected.extend_from_slice(chunk);
                    }
                    rest = tail;
                }
                result
            }
            Op::Push => writer.push(),
            Op::Flush(kind) => writer.flush(match kind % 3 {
                0 => FlushType::FromObject,
                1 => FlushType::FromProcess,
                _ => FlushType::FromMachine,
            }),
            Op::Advance(n) => {
                let n = usize::from(n).min(writer.available());
                writer.chunk_mut()[..n].fill(b'#');
                writer.advance(n);
                expected.resize(expected.len() + n, b'#');
                Ok(())
            }
            Op::Close => writer.close(),
        };
        writer.state().assert_invariants();
        if result.is_err() {
            assert!(!writer.healthy());
            return;
        }
        assert_eq!(writer.pos(), base + expected.len() as Position);
    }

    if writer.close().is_ok() {
        drop(writer);
        assert_eq!(file.contents(), &expected[..]);
    }
}

fuzz_target!(|input: Input| run(input));
