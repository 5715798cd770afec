use super::utils::{Built, CountingRope};
use crate::{BytesWriter, MIN_BUFFER_SIZE, Writer, WriterError};

#[test]
fn full_buffer_is_handed_off() {
    let mut writer = BytesWriter::with_capacity(1000);
    writer.write(&[7; 1000]).unwrap();
    let mut rope = CountingRope::default();
    let built = writer.into_rope(&mut rope).unwrap();
    assert_eq!(
        built,
        Built::External {
            bytes: vec![7; 1000],
            allocated: 1000,
        }
    );
    assert_eq!(rope.copies, 0);
}

#[test]
fn short_content_is_copied() {
    let mut writer = BytesWriter::with_capacity(1000);
    writer.write(b"tiny").unwrap();
    let mut rope = CountingRope::default();
    let built = writer.into_rope(&mut rope).unwrap();
    assert_eq!(built, Built::Copy(b"tiny".to_vec()));
    assert_eq!(rope.externals, 0);
}

#[test]
fn growth_starts_at_minimum_size() {
    let mut writer = BytesWriter::new();
    assert_eq!(writer.available(), 0);
    writer.write(b"a").unwrap();
    assert_eq!(writer.available(), MIN_BUFFER_SIZE - 1);
}

#[test]
fn growth_keeps_written_bytes() {
    let mut writer = BytesWriter::with_capacity(4);
    writer.write(b"abc").unwrap();
    writer.write(b"defgh").unwrap();
    writer.push().unwrap();
    writer.write(&[b'i'; 600]).unwrap();
    assert_eq!(&writer.as_slice()[..8], b"abcdefgh");
    assert_eq!(writer.as_slice().len(), 608);
    assert_eq!(writer.pos(), 608);
}

#[test]
fn failed_writer_has_no_value() {
    let mut writer = BytesWriter::new();
    writer.write(b"lost").unwrap();
    writer.state_mut().fail(WriterError::Overflow);
    assert_eq!(writer.into_bytes(), Err(WriterError::Overflow));
}
