use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Reads `DateTimeOriginal` from the image's EXIF block and formats it as
/// `YYYYMMDD`. Returns `None` when the file has no EXIF, no such tag, or a
/// value that does not parse.
pub fn derive_prefix(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(err) => {
            debug!("No EXIF data in {}: {}", path.display(), err);
            return None;
        }
    };

    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .or_else(|| {
            debug!("DateTimeOriginal tag not found in {}", path.display());
            None
        })?;
    let raw = match &field.value {
        Value::Ascii(values) => values.first()?,
        _ => return None,
    };
    let text = std::str::from_utf8(raw).ok()?;
    parse_prefix(text)
}

/// Formats an EXIF `YYYY:MM:DD HH:MM:SS` timestamp as `YYYYMMDD`.
pub fn parse_prefix(text: &str) -> Option<String> {
    let text = text.trim_end_matches('\0').trim();
    NaiveDateTime::parse_from_str(text, EXIF_DATETIME_FORMAT)
        .ok()
        .map(|datetime| datetime.format("%Y%m%d").to_string())
}

/// `<prefix>_<original name>`. The original name need not be UTF-8.
pub fn prefixed_name(prefix: &str, original: &OsStr) -> OsString {
    let mut name = OsString::from(prefix);
    name.push("_");
    name.push(original);
    name
}
