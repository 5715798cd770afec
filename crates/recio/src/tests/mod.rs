mod bytes_writer;
mod property_writer;
mod writer_state;

pub mod utils;
