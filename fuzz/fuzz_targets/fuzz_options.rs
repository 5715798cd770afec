#![no_main]
use libfuzzer_sys::fuzz_target;
use recio::{MAX_BUFFER_SIZE, WriterOptions};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut options = WriterOptions::default();
    match options.apply(&text) {
        Ok(()) => assert_eq!(WriterOptions::parse(&text), Ok(options)),
        Err(err) => assert!(text.contains(err.key())),
    }
    assert!((1..=MAX_BUFFER_SIZE).contains(&options.buffer_size));
});
