// Encoding utilities

use encoding_rs::mem::{decode_latin1, encode_latin1_lossy, is_str_latin1};
use encoding_rs::{UTF_16BE, UTF_16LE, UTF_8};
use serde::{Deserialize, Serialize};

/// Text encoding marker stored in byte 0 of ID3v2 text payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    Latin1 = 0,
    /// UTF-16 with byte order mark
    #[default]
    Utf16 = 1,
    /// UTF-16 big endian without byte order mark
    Utf16BE = 2,
    Utf8 = 3,
}

impl TextEncoding {
    /// Unknown markers fall back to Latin-1
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => TextEncoding::Latin1,
            1 => TextEncoding::Utf16,
            2 => TextEncoding::Utf16BE,
            3 => TextEncoding::Utf8,
            _ => TextEncoding::Latin1,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Width of one code unit, which is also the width of the NUL terminator
    pub fn unit_width(self) -> usize {
        match self {
            TextEncoding::Utf16 | TextEncoding::Utf16BE => 2,
            TextEncoding::Latin1 | TextEncoding::Utf8 => 1,
        }
    }

    /// Parse a user supplied encoding name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "latin1" | "iso88591" => Some(TextEncoding::Latin1),
            "utf16" => Some(TextEncoding::Utf16),
            "utf16be" => Some(TextEncoding::Utf16BE),
            "utf8" => Some(TextEncoding::Utf8),
            _ => None,
        }
    }
}

/// Strip trailing NUL terminators, respecting the code unit width.
pub fn trim_terminators(data: &[u8], encoding: TextEncoding) -> &[u8] {
    let width = encoding.unit_width();
    let mut end = data.len() - data.len() % width;
    while end >= width && data[end - width..end].iter().all(|&b| b == 0) {
        end -= width;
    }
    &data[..end]
}

/// Split `data` at the first NUL terminator of `encoding`.
///
/// Returns the text before the terminator and the bytes after it. When no
/// terminator is present the whole input is the text and the rest is empty.
pub fn split_terminated(data: &[u8], encoding: TextEncoding) -> (&[u8], &[u8]) {
    let width = encoding.unit_width();
    let mut pos = 0;
    while pos + width <= data.len() {
        if data[pos..pos + width].iter().all(|&b| b == 0) {
            return (&data[..pos], &data[pos + width..]);
        }
        pos += width;
    }
    (data, &[])
}

/// Decode text with specified encoding
pub fn decode_text(data: &[u8], encoding: TextEncoding) -> String {
    let data = trim_terminators(data, encoding);
    match encoding {
        TextEncoding::Latin1 => decode_latin1(data).into_owned(),
        TextEncoding::Utf16 => {
            // Detect BOM
            if data.len() >= 2 && data[0..2] == [0xFF, 0xFE] {
                UTF_16LE.decode_without_bom_handling(&data[2..]).0.into_owned()
            } else if data.len() >= 2 && data[0..2] == [0xFE, 0xFF] {
                UTF_16BE.decode_without_bom_handling(&data[2..]).0.into_owned()
            } else {
                UTF_16LE.decode_without_bom_handling(data).0.into_owned()
            }
        }
        TextEncoding::Utf16BE => UTF_16BE.decode_without_bom_handling(data).0.into_owned(),
        TextEncoding::Utf8 => UTF_8.decode_without_bom_handling(data).0.into_owned(),
    }
}

/// Encode text with specified encoding, without a terminator
pub fn encode_text(text: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Latin1 => encode_latin1(text),
        TextEncoding::Utf16 => {
            let mut bytes = vec![0xFF, 0xFE];
            bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
            bytes
        }
        TextEncoding::Utf16BE => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        TextEncoding::Utf8 => text.as_bytes().to_vec(),
    }
}

/// ISO-8859-1, one byte per character; characters above U+00FF become `?`
fn encode_latin1(text: &str) -> Vec<u8> {
    if is_str_latin1(text) {
        return encode_latin1_lossy(text).into_owned();
    }
    log::warn!("Text {:?} is not representable in Latin-1", text);
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Encode text followed by the terminator of `encoding`
pub fn encode_terminated(text: &str, encoding: TextEncoding) -> Vec<u8> {
    let mut bytes = encode_text(text, encoding);
    bytes.extend(std::iter::repeat(0u8).take(encoding.unit_width()));
    bytes
}
