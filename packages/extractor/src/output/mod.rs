//! Output generation for extracted records.

mod writer;

pub use writer::{render, write_records};
