//! Canonical font metrics and greedy line wrapping.
//!
//! Text is measured against the standard-14 Helvetica family as published in
//! the Adobe AFM files. The same tables drive line breaking in the PDF
//! renderer and height estimation in the pagination surface, so both agree
//! on where lines end.

/// One of the four Helvetica faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontStyle::Regular,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (true, true) => FontStyle::BoldItalic,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    /// PostScript name of the standard font.
    pub fn base_font(self) -> &'static str {
        match self {
            FontStyle::Regular => "Helvetica",
            FontStyle::Bold => "Helvetica-Bold",
            FontStyle::Italic => "Helvetica-Oblique",
            FontStyle::BoldItalic => "Helvetica-BoldOblique",
        }
    }

    /// Resource name used in page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
            FontStyle::Italic => "F3",
            FontStyle::BoldItalic => "F4",
        }
    }

    pub const ALL: [FontStyle; 4] = [
        FontStyle::Regular,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::BoldItalic,
    ];
}

/// Width used for glyphs missing from the tables.
const DEFAULT_WIDTH: u16 = 556;

// Advance widths in 1/1000 em, U+0020..=U+007E.
#[rustfmt::skip]
const REGULAR_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

// U+00A0..=U+00FF.
#[rustfmt::skip]
const REGULAR_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
const BOLD_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

/// Windows-1252 characters in 0x80..=0x9F: (char, byte, regular, bold).
#[rustfmt::skip]
const CP1252_SPECIALS: [(char, u8, u16, u16); 27] = [
    ('\u{20AC}', 0x80, 556, 556),
    ('\u{201A}', 0x82, 222, 278),
    ('\u{0192}', 0x83, 556, 556),
    ('\u{201E}', 0x84, 333, 500),
    ('\u{2026}', 0x85, 1000, 1000),
    ('\u{2020}', 0x86, 556, 556),
    ('\u{2021}', 0x87, 556, 556),
    ('\u{02C6}', 0x88, 333, 333),
    ('\u{2030}', 0x89, 1000, 1000),
    ('\u{0160}', 0x8A, 667, 667),
    ('\u{2039}', 0x8B, 333, 333),
    ('\u{0152}', 0x8C, 1000, 1000),
    ('\u{017D}', 0x8E, 611, 611),
    ('\u{2018}', 0x91, 222, 278),
    ('\u{2019}', 0x92, 222, 278),
    ('\u{201C}', 0x93, 333, 500),
    ('\u{201D}', 0x94, 333, 500),
    ('\u{2022}', 0x95, 350, 350),
    ('\u{2013}', 0x96, 556, 556),
    ('\u{2014}', 0x97, 1000, 1000),
    ('\u{02DC}', 0x98, 333, 333),
    ('\u{2122}', 0x99, 1000, 1000),
    ('\u{0161}', 0x9A, 500, 556),
    ('\u{203A}', 0x9B, 333, 333),
    ('\u{0153}', 0x9C, 944, 944),
    ('\u{017E}', 0x9E, 500, 500),
    ('\u{0178}', 0x9F, 667, 667),
];

/// Advance width of one character in 1/1000 em.
pub fn char_width(c: char, style: FontStyle) -> u16 {
    let bold = style.is_bold();
    let code = c as u32;
    match code {
        0x20..=0x7E => {
            let table = if bold { &BOLD_ASCII } else { &REGULAR_ASCII };
            table[(code - 0x20) as usize]
        }
        0xA0..=0xFF => {
            let table = if bold { &BOLD_LATIN1 } else { &REGULAR_LATIN1 };
            table[(code - 0xA0) as usize]
        }
        0x09 => char_width(' ', style),
        _ => CP1252_SPECIALS
            .iter()
            .find(|(ch, ..)| *ch == c)
            .map_or(DEFAULT_WIDTH, |&(_, _, regular, bold_w)| {
                if bold { bold_w } else { regular }
            }),
    }
}

/// Width of `text` in points at `size`.
pub fn text_width(text: &str, style: FontStyle, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c, style))).sum();
    units as f32 * size / 1000.0
}

/// Encode text for a WinAnsiEncoding simple font.
///
/// Characters outside the code page become `?`; tabs become spaces and other
/// control characters are dropped.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        match code {
            0x09 => out.push(b' '),
            0x00..=0x1F | 0x7F => {}
            0x20..=0x7E | 0xA0..=0xFF => out.push(code as u8),
            _ => match CP1252_SPECIALS.iter().find(|(ch, ..)| *ch == c) {
                Some(&(_, byte, ..)) => out.push(byte),
                None => out.push(b'?'),
            },
        }
    }
    out
}

/// Greedy one-pass line wrapping.
///
/// Breaks at spaces, honors embedded newlines and splits words that are
/// wider than `max_width` on character boundaries. Empty input yields no
/// lines; an empty segment between two newlines yields an empty line.
pub fn wrap_text(text: &str, max_width: f32, style: FontStyle, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }

    for segment in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0.0;
        let space = text_width(" ", style, size);

        for word in segment.split(' ').filter(|w| !w.is_empty()) {
            let word_width = text_width(word, style, size);
            let needed = if current.is_empty() {
                word_width
            } else {
                current_width + space + word_width
            };

            if needed <= max_width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_width = needed;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }

            if word_width <= max_width {
                current.push_str(word);
                current_width = word_width;
            } else {
                for c in word.chars() {
                    let w = text_width(c.encode_utf8(&mut [0; 4]), style, size);
                    if !current.is_empty() && current_width + w > max_width {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(c);
                    current_width += w;
                }
            }
        }
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        assert_eq!(char_width('a', FontStyle::Regular), 556);
        assert_eq!(char_width('i', FontStyle::Regular), 222);
        assert_eq!(char_width('i', FontStyle::Bold), 278);
        assert_eq!(char_width('W', FontStyle::Italic), 944);
        assert_eq!(char_width('ç', FontStyle::Regular), 500);
        assert_eq!(char_width('ç', FontStyle::BoldItalic), 556);
        assert_eq!(char_width('•', FontStyle::Regular), 350);
        assert_eq!(char_width('漢', FontStyle::Regular), 556);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let w12 = text_width("Hello", FontStyle::Regular, 12.0);
        let w24 = text_width("Hello", FontStyle::Regular, 24.0);
        assert!((w24 - 2.0 * w12).abs() < 1e-3);
        // H e l l o = 722 + 556 + 222 + 222 + 556
        assert!((w12 - 2278.0 * 12.0 / 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(to_win_ansi("Ação"), vec![b'A', 0xE7, 0xE3, b'o']);
        assert_eq!(to_win_ansi("• “x”"), vec![0x95, b' ', 0x93, b'x', 0x94]);
        assert_eq!(to_win_ansi("a\tb\u{1}漢"), b"a b?".to_vec());
    }

    #[test]
    fn test_wrap_breaks_at_spaces() {
        let width = text_width("aaa aaa", FontStyle::Regular, 10.0) + 0.5;
        let lines = wrap_text("aaa aaa aaa", width, FontStyle::Regular, 10.0);
        assert_eq!(lines, vec!["aaa aaa", "aaa"]);
    }

    #[test]
    fn test_wrap_honors_newlines_and_empty_input() {
        assert!(wrap_text("", 100.0, FontStyle::Regular, 12.0).is_empty());
        let lines = wrap_text("a\n\nb", 100.0, FontStyle::Regular, 12.0);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let width = text_width("mmm", FontStyle::Regular, 10.0) + 0.5;
        let lines = wrap_text("mmmmmmm", width, FontStyle::Regular, 10.0);
        assert_eq!(lines, vec!["mmm", "mmm", "m"]);
    }

    #[test]
    fn test_wrapped_lines_fit() {
        let text = "The quick brown fox jumps over the lazy dog again and again";
        for line in wrap_text(text, 90.0, FontStyle::Bold, 12.0) {
            assert!(text_width(&line, FontStyle::Bold, 12.0) <= 90.0);
        }
    }
}
