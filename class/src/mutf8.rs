use crate::{ClassError, ClassResult};
use std::{borrow::Cow, fmt};

/// The text of a `Utf8` constant.
///
/// Modified UTF-8 encodes UTF-16 code units one by one, so a constant may hold
/// a lone surrogate that no `str` can represent. Such text is kept as its code
/// units and re-encodes to the same bytes.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum JavaString {
    Text(String),
    Units(Vec<u16>),
}

impl JavaString {
    /// `None` when the text contains an unpaired surrogate.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JavaString::Text(text) => Some(text),
            JavaString::Units(_) => None,
        }
    }

    /// Unpaired surrogates become U+FFFD.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        match self {
            JavaString::Text(text) => Cow::Borrowed(text),
            JavaString::Units(units) => Cow::Owned(String::from_utf16_lossy(units)),
        }
    }

    /// Number of bytes `to_mutf8` produces.
    pub fn mutf8_len(&self) -> usize {
        match self {
            JavaString::Text(text) => mutf8_len(text),
            JavaString::Units(units) => units.iter().map(|&unit| unit_len(unit)).sum(),
        }
    }

    pub fn to_mutf8(&self) -> Cow<'_, [u8]> {
        match self {
            JavaString::Text(text) => encode_mutf8(text),
            JavaString::Units(units) => {
                let mut out = Vec::with_capacity(self.mutf8_len());
                for &unit in units {
                    push_unit(&mut out, unit);
                }
                Cow::Owned(out)
            }
        }
    }
}

impl From<String> for JavaString {
    fn from(text: String) -> Self {
        JavaString::Text(text)
    }
}

impl From<&str> for JavaString {
    fn from(text: &str) -> Self {
        JavaString::Text(text.into())
    }
}

impl fmt::Display for JavaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// Decodes the modified UTF-8 used by `Utf8` constants.
///
/// Only the canonical encoding of each code unit is accepted, so that
/// `parse_mutf8(b)?.to_mutf8() == b` for every accepted input. Surrogates do
/// not need to be paired.
pub fn parse_mutf8(bytes: &[u8]) -> ClassResult<JavaString> {
    // Standard UTF-8 with no NUL and nothing outside the BMP is byte for byte
    // the same in both encodings.
    if let Ok(text) = std::str::from_utf8(bytes) {
        if bytes.iter().all(|&b| b != 0 && b < 0xf0) {
            return Ok(JavaString::Text(text.into()));
        }
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut pos = 0;

    let invalid = |pos: usize| ClassError::InvalidModifiedUtf8Byte(pos, bytes.get(pos).copied().unwrap_or(0));
    let continuation = |pos: usize| match bytes.get(pos) {
        Some(&b) if b & 0xc0 == 0x80 => Ok((b & 0x3f) as u16),
        _ => Err(invalid(pos)),
    };

    while pos < bytes.len() {
        let b1 = bytes[pos];

        let unit = if b1 != 0 && b1 & 0x80 == 0 {
            // 0xxxxxxx
            pos += 1;
            b1 as u16
        } else if b1 & 0xe0 == 0xc0 {
            // 110xxxxx 10xxxxxx
            let unit = ((b1 & 0x1f) as u16) << 6 | continuation(pos + 1)?;
            // NUL is the only code unit allowed to use an overlong form
            if unit != 0 && unit < 0x80 {
                return Err(invalid(pos));
            }
            pos += 2;
            unit
        } else if b1 & 0xf0 == 0xe0 {
            // 1110xxxx 10xxxxxx 10xxxxxx
            let unit = ((b1 & 0x0f) as u16) << 12
                | continuation(pos + 1)? << 6
                | continuation(pos + 2)?;
            if unit < 0x800 {
                return Err(invalid(pos));
            }
            pos += 3;
            unit
        } else {
            return Err(invalid(pos));
        };

        units.push(unit);
    }

    // Supplementary characters arrive as two 3-byte surrogate halves.
    Ok(match String::from_utf16(&units) {
        Ok(text) => JavaString::Text(text),
        Err(_) => JavaString::Units(units),
    })
}

fn unit_len(unit: u16) -> usize {
    match unit {
        0x01..=0x7f => 1,
        0x00 | 0x80..=0x7ff => 2,
        _ => 3,
    }
}

fn push_unit(out: &mut Vec<u8>, unit: u16) {
    match unit {
        0x01..=0x7f => out.push(unit as u8),
        0x00 | 0x80..=0x7ff => {
            out.push(0xc0 | (unit >> 6) as u8);
            out.push(0x80 | (unit & 0x3f) as u8);
        }
        _ => {
            out.push(0xe0 | (unit >> 12) as u8);
            out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
            out.push(0x80 | (unit & 0x3f) as u8);
        }
    }
}

/// Number of bytes `encode_mutf8` produces for `text`.
pub fn mutf8_len(text: &str) -> usize {
    text.chars()
        .map(|ch| match ch as u32 {
            0 => 2,
            0x01..=0x7f => 1,
            0x80..=0x7ff => 2,
            0x800..=0xffff => 3,
            _ => 6,
        })
        .sum()
}

pub fn encode_mutf8(text: &str) -> Cow<'_, [u8]> {
    if text.bytes().all(|b| b != 0 && b < 0xf0) {
        return Cow::Borrowed(text.as_bytes());
    }

    let mut out = Vec::with_capacity(mutf8_len(text));
    let mut buf = [0u16; 2];
    for ch in text.chars() {
        for &unit in ch.encode_utf16(&mut buf).iter() {
            push_unit(&mut out, unit);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutf8_normal() {
        let string = "Hello, world!";
        assert_eq!(parse_mutf8(string.as_bytes()), Ok(JavaString::from(string)));
    }

    #[test]
    fn test_mutf8_non_latin() {
        let string = "Здравствуй, мир";
        assert_eq!(parse_mutf8(string.as_bytes()), Ok(JavaString::from(string)));
    }

    #[test]
    fn test_mutf8_supplementary() {
        let string = &[0x41, 0xed, 0xa0, 0xb4, 0xed, 0xbc, 0xb9];
        assert_eq!(parse_mutf8(string), Ok(JavaString::from("A𝌹")));
        assert_eq!(&*encode_mutf8("A𝌹"), &string[..]);
        assert_eq!(mutf8_len("A𝌹"), 7);
    }

    #[test]
    fn test_mutf8_bmp_above_surrogates() {
        // U+D55C is encoded with a leading 0xED but is not a surrogate
        let bytes = "한".as_bytes();
        assert_eq!(bytes[0], 0xed);
        assert_eq!(parse_mutf8(bytes).unwrap().as_str(), Some("한"));
    }

    #[test]
    fn test_mutf8_overlong_nul() {
        let string = b"foo\xc0\x80bar\xc0\x80baz";
        assert_eq!(
            parse_mutf8(string),
            Ok(JavaString::from("foo\0bar\0baz"))
        );
        assert_eq!(&*encode_mutf8("foo\0bar\0baz"), &string[..]);
    }

    #[test]
    fn test_mutf8_invalid_nul() {
        let string = b"foo\0bar";
        assert_eq!(
            parse_mutf8(string),
            Err(ClassError::InvalidModifiedUtf8Byte(3, 0))
        )
    }

    #[test]
    fn test_mutf8_unpaired_surrogate() {
        let string = &[0x61, 0xed, 0xa0, 0xb4];
        let text = parse_mutf8(string).unwrap();
        assert_eq!(text, JavaString::Units(vec![0x61, 0xd834]));
        assert_eq!(text.as_str(), None);
        assert_eq!(text.to_string_lossy(), "a\u{fffd}");
        assert_eq!(text.mutf8_len(), string.len());
        assert_eq!(&*text.to_mutf8(), &string[..]);
    }

    #[test]
    fn test_mutf8_low_surrogate_first() {
        // A low half followed by a high half is two lone surrogates
        let string = &[0xed, 0xb0, 0x80, 0xed, 0xa0, 0x80, 0xc0, 0x80];
        let text = parse_mutf8(string).unwrap();
        assert_eq!(text, JavaString::Units(vec![0xdc00, 0xd800, 0]));
        assert_eq!(&*text.to_mutf8(), &string[..]);
    }

    #[test]
    fn test_mutf8_truncated() {
        assert_eq!(
            parse_mutf8(&[0x61, 0xed, 0xa0]),
            Err(ClassError::InvalidModifiedUtf8Byte(3, 0))
        );
    }

    #[test]
    fn test_mutf8_non_canonical_rejected() {
        // 'A' in a two byte form
        assert_eq!(
            parse_mutf8(&[0xc1, 0x81]),
            Err(ClassError::InvalidModifiedUtf8Byte(0, 0xc1))
        );
    }
}
