//! Code page lookup and text decoding.
//!
//! RTF documents declare a character set (`\ansi`, `\mac`, `\ansicpg1251`, ...)
//! that governs how bytes outside 7-bit ASCII are interpreted. This module maps
//! those declarations onto `encoding_rs` encodings.

use encoding_rs::Encoding;
use std::borrow::Cow;

/// Encoding assumed when a document declares nothing.
#[inline]
pub fn default_encoding() -> &'static Encoding {
    encoding_rs::WINDOWS_1252
}

/// Map a Windows code page number to an `encoding_rs` encoding.
///
/// Returns `None` for code pages with no reasonable equivalent.
///
/// # Examples
/// ```
/// use rtflayout::common::encoding::codepage_to_encoding;
///
/// let encoding = codepage_to_encoding(1251).unwrap();
/// assert_eq!(encoding.name(), "windows-1251");
/// ```
#[inline]
pub fn codepage_to_encoding(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        // DOS; IBM866 is the closest encoding_rs offers
        437 | 850 => Some(encoding_rs::IBM866),

        874 => Some(encoding_rs::WINDOWS_874),
        1250 => Some(encoding_rs::WINDOWS_1250),
        1251 => Some(encoding_rs::WINDOWS_1251),
        1252 => Some(encoding_rs::WINDOWS_1252),
        1253 => Some(encoding_rs::WINDOWS_1253),
        1254 => Some(encoding_rs::WINDOWS_1254),
        1255 => Some(encoding_rs::WINDOWS_1255),
        1256 => Some(encoding_rs::WINDOWS_1256),
        1257 => Some(encoding_rs::WINDOWS_1257),
        1258 => Some(encoding_rs::WINDOWS_1258),

        932 => Some(encoding_rs::SHIFT_JIS),
        936 => Some(encoding_rs::GBK),
        949 => Some(encoding_rs::EUC_KR),
        950 => Some(encoding_rs::BIG5),
        54936 => Some(encoding_rs::GB18030),

        28591 => Some(encoding_rs::WINDOWS_1252),
        28592 => Some(encoding_rs::ISO_8859_2),
        28595 => Some(encoding_rs::ISO_8859_5),
        28597 => Some(encoding_rs::ISO_8859_7),
        28605 => Some(encoding_rs::ISO_8859_15),
        20866 => Some(encoding_rs::KOI8_R),

        10000 => Some(encoding_rs::MACINTOSH),
        65001 => Some(encoding_rs::UTF_8),

        _ => None,
    }
}

/// Decode raw document bytes into text.
///
/// Input that is already valid UTF-8 is borrowed as is; anything else is
/// decoded with `fallback`, the encoding the document declared.
pub fn decode_text<'a>(bytes: &'a [u8], fallback: &'static Encoding) -> Cow<'a, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => fallback.decode_without_bom_handling(bytes).0,
    }
}
