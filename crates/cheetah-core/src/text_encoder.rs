#![forbid(unsafe_code)]

//! Text to character-buffer encoding.
//!
//! The device shows one flat buffer of byte-sized character codes. Encoding
//! a string into that buffer happens in two steps:
//!
//! 1. Every line (split on `\n`) is fitted to the display width, measured
//!    in *effective* cells: padded with spaces when short, cut from the end
//!    when long.
//! 2. The fitted lines are concatenated and copied code-by-code into a
//!    zeroed buffer of exactly `charbuf_size` entries.
//!
//! Two behaviors are silent on purpose and callers rely on them:
//! - characters above U+00FF become code `0`;
//! - output beyond `charbuf_size` is dropped.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::display_info::{DisplayInfo, Quirk};

/// Fixed-length buffer of device character codes (`0` = blank).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacterBuffer {
    codes: Vec<u8>,
}

impl CharacterBuffer {
    /// A blank buffer of `len` entries.
    pub fn blank(len: usize) -> Self {
        Self {
            codes: vec![0; len],
        }
    }

    /// Character codes in display order.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.codes
    }

    /// Number of entries (always the device's `charbuf_size`).
    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True for a zero-sized device buffer.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Consume the buffer, returning the raw codes.
    pub fn into_vec(self) -> Vec<u8> {
        self.codes
    }

    /// Standard base64 of the codes, as the canvas API expects.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.codes)
    }

    /// Interpret the codes as Latin-1 text, stopping at the first blank.
    pub fn to_text(&self) -> String {
        self.codes
            .iter()
            .take_while(|&&code| code != 0)
            .map(|&code| char::from(code))
            .collect()
    }
}

impl AsRef<[u8]> for CharacterBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.codes
    }
}

/// Number of display cells `line` occupies on a device described by `info`.
///
/// Without quirks this is the character count. With
/// [`Quirk::CombiningFullStop`], the first character always counts; after
/// that a `.` only counts when the character before it is also a `.`, and
/// every other character counts.
pub fn effective_length(line: &str, info: &DisplayInfo) -> usize {
    if !info.has_quirk(Quirk::CombiningFullStop) {
        return line.chars().count();
    }

    let mut count = 0;
    let mut prev: Option<char> = None;
    for ch in line.chars() {
        let counts = match prev {
            None => true,
            Some(p) => ch != '.' || p == '.',
        };
        if counts {
            count += 1;
        }
        prev = Some(ch);
    }
    count
}

/// Pad or truncate one line to the display width.
///
/// With `excess = effective_length - width`, a negative excess appends
/// `-excess` spaces; otherwise the line keeps its first
/// `raw_length - excess` characters (never fewer than zero).
pub fn fit_line(line: &str, info: &DisplayInfo) -> String {
    let raw_len = line.chars().count();
    let effective = effective_length(line, info);

    if effective < info.width {
        let pad = info.width - effective;
        let mut out = String::with_capacity(line.len() + pad);
        out.push_str(line);
        out.extend(std::iter::repeat_n(' ', pad));
        out
    } else {
        let excess = effective - info.width;
        let keep = raw_len.saturating_sub(excess);
        line.chars().take(keep).collect()
    }
}

/// Encode `text` into a character buffer of exactly `info.charbuf_size`.
pub fn encode(text: &str, info: &DisplayInfo) -> CharacterBuffer {
    let fitted: String = text.split('\n').map(|line| fit_line(line, info)).collect();

    let mut buffer = CharacterBuffer::blank(info.charbuf_size);
    let mut replaced = 0usize;
    for (slot, ch) in buffer.codes.iter_mut().zip(fitted.chars()) {
        *slot = match u8::try_from(u32::from(ch)) {
            Ok(code) => code,
            Err(_) => {
                replaced += 1;
                0
            }
        };
    }

    let fitted_len = fitted.chars().count();
    tracing::trace!(
        charbuf_size = info.charbuf_size,
        fitted_len,
        dropped = fitted_len.saturating_sub(info.charbuf_size),
        replaced,
        "encoded text"
    );
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(charbuf_size: usize, width: usize) -> DisplayInfo {
        DisplayInfo::new(charbuf_size, width)
    }

    fn quirky(charbuf_size: usize, width: usize) -> DisplayInfo {
        DisplayInfo::new(charbuf_size, width).with_quirk(Quirk::CombiningFullStop)
    }

    #[test]
    fn effective_length_table() {
        // (input, quirk, expected)
        let cases: &[(&str, bool, usize)] = &[
            ("", false, 0),
            ("", true, 0),
            ("hello", false, 5),
            ("hello", true, 5),
            (".....", false, 5),
            // First char counts, each later '.' follows a '.', so all count.
            (".....", true, 5),
            ("A.", true, 1),
            ("A.B.", true, 2),
            ("A..", true, 2),
            (".A", true, 2),
            ("12.34", true, 4),
            ("12.34", false, 5),
            ("ÄÖ.", true, 2),
        ];
        for &(input, quirk, expected) in cases {
            let info = if quirk { quirky(8, 8) } else { plain(8, 8) };
            assert_eq!(
                effective_length(input, &info),
                expected,
                "input={input:?} quirk={quirk}"
            );
        }
    }

    #[test]
    fn fit_line_table() {
        // (input, quirk, width, expected)
        let cases: &[(&str, bool, usize, &str)] = &[
            ("hi", false, 10, "hi        "),
            ("hello world", false, 5, "hello"),
            ("exact", false, 5, "exact"),
            ("", false, 3, "   "),
            ("", false, 0, ""),
            ("abc", false, 0, ""),
            // "1.5" is 2 cells wide with the quirk, so only one pad space.
            ("1.5", true, 3, "1.5 "),
            // 3 cells, width 2: one raw char cut from the end.
            ("1.5.7", true, 2, "1.5."),
            ("1.5.7", false, 2, "1."),
        ];
        for &(input, quirk, width, expected) in cases {
            let info = if quirk { quirky(8, width) } else { plain(8, width) };
            assert_eq!(
                fit_line(input, &info),
                expected,
                "input={input:?} quirk={quirk} width={width}"
            );
        }
    }

    #[test]
    fn pads_short_line() {
        let buf = encode("hi", &plain(16, 10));
        assert_eq!(buf.len(), 16);
        assert_eq!(&buf.as_bytes()[..10], b"hi        ");
        assert!(buf.as_bytes()[10..].iter().all(|&b| b == 0));
    }

    #[test]
    fn truncates_long_line() {
        let buf = encode("hello world", &plain(8, 5));
        assert_eq!(&buf.as_bytes()[..5], b"hello");
        assert!(buf.as_bytes()[5..].iter().all(|&b| b == 0));
        assert_eq!(buf.to_text(), "hello");
    }

    #[test]
    fn lines_are_concatenated_in_order() {
        let buf = encode("ab\ncd", &plain(8, 3));
        assert_eq!(buf.as_bytes(), b"ab cd \0\0");
    }

    #[test]
    fn trailing_newline_yields_blank_line() {
        let buf = encode("ab\n", &plain(6, 3));
        assert_eq!(buf.as_bytes(), b"ab    ");
    }

    #[test]
    fn overflow_beyond_charbuf_is_dropped() {
        let buf = encode("abcdef", &plain(4, 6));
        assert_eq!(buf.as_bytes(), b"abcd");
    }

    #[test]
    fn wide_codepoints_become_zero() {
        // U+20AC is outside Latin-1; U+00E9 is inside.
        let buf = encode("€é", &plain(3, 3));
        assert_eq!(buf.as_bytes(), &[0, 0xE9, b' ']);
    }

    #[test]
    fn zero_sized_buffer() {
        let buf = encode("anything", &plain(0, 8));
        assert!(buf.is_empty());
        assert_eq!(buf.to_base64(), "");
    }

    #[test]
    fn quirk_keeps_extra_dots_in_buffer() {
        // "12.34" is 4 cells wide: with width 4 nothing is padded or cut,
        // and all 5 raw characters reach the buffer.
        let buf = encode("12.34", &quirky(6, 4));
        assert_eq!(buf.as_bytes(), b"12.34\0");
    }

    #[test]
    fn base64_matches_raw_bytes() {
        let buf = encode("AB", &plain(3, 2));
        assert_eq!(buf.to_base64(), "QUIA");
        assert_eq!(buf.clone().into_vec(), vec![b'A', b'B', 0]);
    }

    #[test]
    fn encoding_is_idempotent() {
        let info = quirky(32, 12);
        let text = "Gleis 3\nAbfahrt 12.30";
        assert_eq!(encode(text, &info), encode(text, &info));
    }
}
