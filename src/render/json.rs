//! JSON rendering for sections.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::{Error, Result};
use crate::model::Section;

/// Indentation of pretty-printed output.
const PRETTY_INDENT: &[u8] = b"    ";

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON, four-space indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize sections into `writer` as a JSON array.
fn write_sections<W: Write>(writer: W, sections: &[Section], format: JsonFormat) -> serde_json::Result<()> {
    match format {
        JsonFormat::Pretty => {
            let formatter = PrettyFormatter::with_indent(PRETTY_INDENT);
            let mut ser = Serializer::with_formatter(writer, formatter);
            sections.serialize(&mut ser)
        }
        JsonFormat::Compact => {
            let mut ser = Serializer::new(writer);
            sections.serialize(&mut ser)
        }
    }
}

/// Convert sections to a JSON array string.
pub fn to_json(sections: &[Section], format: JsonFormat) -> Result<String> {
    let mut buf = Vec::new();
    write_sections(&mut buf, sections, format)
        .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))?;
    String::from_utf8(buf).map_err(|e| Error::Render(e.to_string()))
}

/// Write sections as JSON to `path`, creating parent directories.
///
/// # Errors
/// Any failure to create or write the file is [`Error::Write`].
pub fn write_json<P: AsRef<Path>>(path: P, sections: &[Section], format: JsonFormat) -> Result<()> {
    let path = path.as_ref();
    let write_err = |source: io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    let json = to_json(sections, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, json).map_err(write_err)?;

    log::debug!("Wrote {} sections to {}", sections.len(), path.display());
    Ok(())
}
