//! Text helpers shared by the statement parsers: BOM-aware decoding and
//! cutting the data section out of a report-style export.

use anyhow::{Context, Result, bail};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        bail!("UTF-16 data must have even length, got {} bytes", bytes.len());
    }
    let units = bytes.chunks_exact(2).map(|c| unit([c[0], c[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .context("invalid UTF-16 data")
}

/// Decode exported statement bytes.
///
/// Honours UTF-8 and UTF-16 byte order marks. Without a BOM, data whose
/// second byte is NUL is taken as UTF-16LE (banks export it that way),
/// anything else must be UTF-8.
pub fn decode_text(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&UTF16_LE_BOM) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&UTF16_BE_BOM) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&UTF8_BOM) {
        return String::from_utf8(rest.to_vec()).context("invalid UTF-8 data");
    }
    if bytes.len() >= 2 && bytes.len() % 2 == 0 && bytes[0] != 0 && bytes[1] == 0 {
        return decode_utf16(bytes, u16::from_le_bytes);
    }
    String::from_utf8(bytes.to_vec()).context("invalid UTF-8 data")
}

/// Lines strictly between the first line starting with `start` and the next
/// line starting with `end` (or the end of the text).
///
/// Returns `None` when no line starts with `start`.
pub fn section_between(text: &str, start: &str, end: &str) -> Option<String> {
    let mut lines = text.lines();
    let header_line = lines.position(|l| l.trim_start_matches('\u{feff}').starts_with(start))?;
    tracing::debug!(line = header_line + 1, "found start of data");

    let mut out = String::new();
    for line in lines {
        if line.starts_with(end) {
            break;
        }
        out.push_str(line);
        out.push('\n');
    }
    Some(out)
}

#[cfg(test)]
pub(crate) fn encode_utf16le_with_bom(text: &str) -> Vec<u8> {
    let mut out = UTF16_LE_BOM.to_vec();
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}
