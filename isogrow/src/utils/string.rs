//! String handling utilities
//!
//! Primary volumes store names in d-characters; Joliet stores UCS-2
//! big-endian code units.

use alloc::string::String;

/// Drop the space padding of an identifier field
///
/// Only U+0020 is padding; other whitespace is part of the identifier.
pub fn trim_trailing_spaces(text: &str) -> &str {
    text.trim_end_matches(' ')
}

/// Re-encode raw UCS-2 big-endian bytes as UTF-8
///
/// Conversion stops at the first NUL code unit. A dangling odd byte is
/// dropped and unpaired surrogates become U+FFFD.
pub fn from_ucs2(raw: &[u8]) -> String {
    let units = raw
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0);
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
