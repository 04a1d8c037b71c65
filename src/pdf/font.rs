//! Helvetica metrics and text wrapping
//!
//! The document uses the PDF base-14 Helvetica fonts, which need no embedded
//! program but also ship no metrics inside the file - so the layout math
//! carries the standard AFM advance widths (thousandths of an em) for the
//! printable ASCII range. Accented characters fall back to the width of 'o',
//! which is close enough for wrapping Spanish text.

/// AFM advance widths for Helvetica, characters 0x20..=0x7E.
const WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // 'A'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // 'a'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const FALLBACK_WIDTH: u16 = 556;
const MM_PER_PT: f64 = 25.4 / 72.0;

fn char_width(c: char) -> u16 {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        WIDTHS[(code - 0x20) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

/// Rendered width of `text` at `font_size` points, in millimeters.
pub fn text_width_mm(text: &str, font_size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| char_width(c) as u32).sum();
    units as f64 / 1000.0 * font_size * MM_PER_PT
}

/// Greedy word wrap to `max_width` millimeters at `font_size` points. Words
/// longer than a full line are emitted on their own line rather than split.
pub fn wrap(text: &str, font_size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width_mm(&candidate, font_size) <= max_width || current.is_empty() {
            current = candidate;
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Encode text for a WinAnsi (CP1252-ish) string operand. Latin-1 covers the
/// Spanish accents and the superscript two in "Chi²"; anything outside maps
/// to '?'.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_scales_with_font_size() {
        let narrow = text_width_mm("hola", 9.0);
        let wide = text_width_mm("hola", 18.0);
        assert!((wide - narrow * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_width_monotone_in_length() {
        assert!(text_width_mm("ab", 12.0) > text_width_mm("a", 12.0));
    }

    #[test]
    fn test_wide_and_narrow_chars() {
        // 'W' (944) is far wider than 'i' (222)
        assert!(text_width_mm("W", 12.0) > text_width_mm("i", 12.0) * 3.0);
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap(
            "uno dos tres cuatro cinco seis siete ocho nueve diez",
            12.0,
            30.0,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, 12.0) <= 30.0 + 1e-9, "line too wide: {line}");
        }
    }

    #[test]
    fn test_wrap_never_splits_words() {
        let lines = wrap("palabra extraordinariamente larga", 12.0, 10.0);
        assert_eq!(lines, vec!["palabra", "extraordinariamente", "larga"]);
    }

    #[test]
    fn test_wrap_short_text_single_line() {
        assert_eq!(wrap("corto", 12.0, 180.0), vec!["corto"]);
    }

    #[test]
    fn test_wrap_empty_text_yields_one_empty_line() {
        assert_eq!(wrap("", 12.0, 100.0), vec![""]);
    }

    #[test]
    fn test_encode_win_ansi_keeps_latin1() {
        assert_eq!(encode_win_ansi("Chi²"), vec![b'C', b'h', b'i', 0xB2]);
        assert_eq!(encode_win_ansi("ñ"), vec![0xF1]);
        assert_eq!(encode_win_ansi("→"), vec![b'?']);
    }
}
