use crate::error::{HwpError, Result};
use encoding_rs::UTF_16LE;

pub fn utf16le_to_string(data: &[u8]) -> Result<String> {
    let (cow, _, had_errors) = UTF_16LE.decode(data);
    if had_errors {
        return Err(HwpError::EncodingError("Invalid UTF-16LE data".to_string()));
    }
    Ok(cow.into_owned())
}

pub fn string_to_utf16le(s: &str) -> Vec<u8> {
    let mut result = Vec::new();
    for ch in s.encode_utf16() {
        result.extend_from_slice(&ch.to_le_bytes());
    }
    result
}

/// Splits a `PARA_TEXT` payload's code units into visible text and the
/// code-unit positions each visible unit started at (used to translate a
/// visible-character range into code-unit offsets for `SetFormat`).
///
/// Code units 0x09/0x0A/0x0D render as themselves (tab, LF, CR). Any other
/// code unit below 0x20 is an inline control marker: it and the 7 following
/// code units (its 14-byte control payload) are skipped entirely.
pub fn decode_para_text_units(units: &[u16]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < units.len() {
        let unit = units[i];
        match unit {
            0x09 => {
                out.push('\t');
                i += 1;
            }
            0x0A => {
                out.push('\n');
                i += 1;
            }
            0x0D => {
                out.push('\r');
                i += 1;
            }
            0x00..=0x1F => {
                // Inline control marker: this unit plus 7 payload units.
                i += (8).min(units.len() - i);
            }
            _ => {
                if let Some(ch) = char::from_u32(unit as u32) {
                    out.push(ch);
                }
                i += 1;
            }
        }
    }
    out
}

pub fn units_from_le_bytes(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_plain_text() {
        let units: Vec<u16> = "Hello".encode_utf16().collect();
        assert_eq!(decode_para_text_units(&units), "Hello");
    }

    #[test]
    fn keeps_tab_newline_and_cr() {
        let units = vec![0x09, 0x0A, 0x0D];
        assert_eq!(decode_para_text_units(&units), "\t\n\r");
    }

    #[test]
    fn skips_inline_control_payload() {
        let mut units: Vec<u16> = vec![0x02];
        units.extend(std::iter::repeat(0u16).take(7));
        units.extend("after".encode_utf16());
        assert_eq!(decode_para_text_units(&units), "after");
    }
}
