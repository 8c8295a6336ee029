//! # Text Measurement
//!
//! Width measurement, single-line truncation and greedy line wrapping for
//! the standard fonts. Table rows have a fixed height, so cells are cut to
//! one line with an ellipsis; the summary footer (notes, terms, bank
//! details) wraps on UAX#14 break opportunities.

use crate::font::StandardFont;
use unicode_linebreak::{linebreaks, BreakOpportunity};

const ELLIPSIS: char = '\u{2026}';

/// Width of `text` in points.
pub fn measure_width(text: &str, font: StandardFont, font_size: f64) -> f64 {
    text.chars().map(|ch| font.char_width(ch, font_size)).sum()
}

/// Cut `text` so it fits `max_width`, ending in an ellipsis when shortened.
/// Returns an empty string when not even the ellipsis fits.
pub fn truncate_to_width(text: &str, max_width: f64, font: StandardFont, font_size: f64) -> String {
    if measure_width(text, font, font_size) <= max_width {
        return text.to_string();
    }

    let budget = max_width - font.char_width(ELLIPSIS, font_size);
    if budget < 0.0 {
        return String::new();
    }

    let mut width = 0.0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = font.char_width(ch, font_size);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(ch);
    }

    let mut out = out.trim_end().to_string();
    out.push(ELLIPSIS);
    out
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Entry `i` is the opportunity *before* char `i`; index 0 is always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        // A break at the very end of the text is implied.
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn make_line(chars: &[char]) -> String {
    let line: String = chars.iter().collect();
    line.trim_end().to_string()
}

/// Break `text` into lines no wider than `max_width`.
///
/// Greedy: each line takes as many characters as fit and breaks at the last
/// allowed opportunity. Words wider than the line are force-broken. Explicit
/// newlines always break. Empty input yields one empty line.
pub fn wrap_lines(text: &str, max_width: f64, font: StandardFont, font_size: f64) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }

    let chars: Vec<char> = text.chars().collect();
    let widths: Vec<f64> = chars.iter().map(|&ch| font.char_width(ch, font_size)).collect();
    let break_opps = compute_break_opportunities(text);

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0.0;
    let mut last_break_point: Option<usize> = None;

    for (i, &ch) in chars.iter().enumerate() {
        if i > 0 {
            match break_opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    let end = if is_newline(chars[i - 1]) { i - 1 } else { i };
                    lines.push(make_line(&chars[line_start..end.max(line_start)]));
                    line_start = i;
                    line_width = 0.0;
                    last_break_point = None;
                }
                Some(BreakOpportunity::Allowed) => {
                    last_break_point = Some(i - 1);
                }
                None => {}
            }
        }

        if is_newline(ch) {
            continue;
        }

        let char_width = widths[i];
        while line_width + char_width > max_width && line_start < i {
            if let Some(bp) = last_break_point.filter(|&bp| bp >= line_start) {
                lines.push(make_line(&chars[line_start..=bp]));
                line_start = bp + 1;
                line_width = widths[line_start..i].iter().sum();
                last_break_point = None;
                continue;
            }

            // No break opportunity on this line: force break here.
            lines.push(make_line(&chars[line_start..i]));
            line_start = i;
            line_width = 0.0;
            last_break_point = None;
        }

        line_width += char_width;
    }

    if line_start < chars.len() {
        lines.push(make_line(&chars[line_start..]));
    }

    lines
}

/// Keep at most `max_lines` lines. When lines are dropped, the last kept
/// line gets an ellipsis so the cut is visible.
pub fn clamp_lines(
    mut lines: Vec<String>,
    max_lines: usize,
    max_width: f64,
    font: StandardFont,
    font_size: f64,
) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        *last = mark_cut(last, max_width, font, font_size);
    }
    lines
}

/// Append an ellipsis to `line`, shortening it when the ellipsis would not
/// fit `max_width`.
pub fn mark_cut(line: &str, max_width: f64, font: StandardFont, font_size: f64) -> String {
    let mut marked = line.trim_end().to_string();
    marked.push(ELLIPSIS);
    if measure_width(&marked, font, font_size) <= max_width {
        return marked;
    }
    // Guarantee the input overflows so truncation adds its own ellipsis.
    marked.push(ELLIPSIS);
    truncate_to_width(&marked, max_width, font, font_size)
}
