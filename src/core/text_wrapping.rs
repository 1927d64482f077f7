//! Width-aware word wrapping for terminal display.
//!
//! Transcript text is pre-wrapped here and rendered by a `Paragraph` without
//! ratatui's own wrapping, so the scroll math and the rendered rows always
//! agree on the line count.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap `text` into lines no wider than `width` terminal columns.
///
/// Explicit newlines are kept. Words longer than a line are split at
/// character boundaries. Runs of spaces inside a line are preserved.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph.trim_end_matches('\r'), width, &mut lines);
    }
    lines
}

fn wrap_paragraph(paragraph: &str, width: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_width = 0usize;
    let mut started = false;

    for word in paragraph.split(' ') {
        let word_width = word.width();

        if started && current_width + 1 + word_width <= width {
            current.push(' ');
            current.push_str(word);
            current_width += 1 + word_width;
            continue;
        }

        if started {
            out.push(std::mem::take(&mut current));
            current_width = 0;
            if word.is_empty() {
                started = false;
                continue;
            }
        }

        let mut rest = word;
        while rest.width() > width {
            let (head, tail) = split_at_width(rest, width);
            out.push(head.to_string());
            rest = tail;
        }
        current.push_str(rest);
        current_width = rest.width();
        started = true;
    }

    out.push(current);
}

/// Split `text` so the head fits in `width` columns. The head always holds
/// at least one character.
fn split_at_width(text: &str, width: usize) -> (&str, &str) {
    let mut used = 0usize;
    for (idx, ch) in text.char_indices() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width && idx > 0 {
            return text.split_at(idx);
        }
        used += ch_width;
    }
    (text, "")
}

/// Truncate `text` to `max_width` columns, marking the cut with "...".
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let (head, _) = split_at_width(text, max_width - 3);
    format!("{head}...")
}
