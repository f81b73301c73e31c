//! Rendering of sections to output formats.

mod json;

pub use json::{to_json, write_json, JsonFormat};
