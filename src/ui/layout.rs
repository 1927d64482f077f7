use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};
use ratatui::text::{Line, Span};

use super::theme::Theme;
use crate::core::message::{Message, ERROR_REPLY};
use crate::core::text_wrapping::wrap_text;

pub const SIDEBAR_WIDTH: u16 = 32;
pub const HEADER_HEIGHT: u16 = 1;
pub const INPUT_HEIGHT: u16 = 3;
/// Columns reserved on each side of the transcript.
pub const TRANSCRIPT_PADDING: u16 = 1;

const USER_LABEL: &str = "You";
const MODEL_LABEL: &str = "QuickGPT";
const THINKING_TEXT: &str = "Thinking...";

/// Mapping for a single message's contribution to the flattened line stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageLineSpan {
    pub start: usize,
    pub len: usize,
}

/// Result of a layout pass: pre-wrapped lines plus the rows each message
/// occupies.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    pub lines: Vec<Line<'static>>,
    pub message_spans: Vec<MessageLineSpan>,
}

pub struct LayoutEngine;

impl LayoutEngine {
    /// Lay out the transcript for a text column `width` cells wide. The
    /// renderer and the scroll math both consume this; nothing wraps again
    /// afterwards.
    pub fn layout_messages(messages: &[Message], theme: &Theme, width: usize) -> Layout {
        let mut lines = Vec::new();
        let mut message_spans = Vec::with_capacity(messages.len());

        for message in messages {
            let start = lines.len();
            lines.push(Self::header_line(message, theme));

            let body_style = if message.is_user() {
                theme.user_text_style
            } else if message.text == ERROR_REPLY && !message.is_streaming {
                theme.error_text_style
            } else {
                theme.assistant_text_style
            };

            if message.is_streaming && message.text.is_empty() {
                lines.push(Line::from(Span::styled(
                    THINKING_TEXT,
                    theme.system_text_style,
                )));
            } else {
                for row in wrap_text(&message.text, width) {
                    lines.push(Line::from(Span::styled(row, body_style)));
                }
            }
            lines.push(Line::from(""));

            message_spans.push(MessageLineSpan {
                start,
                len: lines.len() - start,
            });
        }

        Layout {
            lines,
            message_spans,
        }
    }

    fn header_line(message: &Message, theme: &Theme) -> Line<'static> {
        let mut spans = if message.is_user() {
            vec![Span::styled(USER_LABEL, theme.user_prefix_style)]
        } else {
            vec![Span::styled(MODEL_LABEL, theme.assistant_prefix_style)]
        };
        if message.is_streaming {
            spans.push(Span::styled(" ●", theme.streaming_indicator_style));
        }
        Line::from(spans)
    }
}

/// Screen regions of the main chat view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenAreas {
    pub sidebar: Option<Rect>,
    pub header: Rect,
    pub transcript: Rect,
    pub input: Rect,
}

impl ScreenAreas {
    pub fn compute(area: Rect, sidebar_open: bool) -> Self {
        let (sidebar, main) = if sidebar_open && area.width > SIDEBAR_WIDTH * 2 {
            let columns = RatatuiLayout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
                .split(area);
            (Some(columns[0]), columns[1])
        } else if sidebar_open {
            // Too narrow for both: the sidebar takes the whole screen.
            (Some(area), Rect::new(area.x, area.y, 0, 0))
        } else {
            (None, area)
        };

        let rows = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(INPUT_HEIGHT),
            ])
            .split(main);

        Self {
            sidebar,
            header: rows[0],
            transcript: rows[1],
            input: rows[2],
        }
    }

    /// Width available to transcript text.
    pub fn transcript_text_width(&self) -> usize {
        self.transcript
            .width
            .saturating_sub(TRANSCRIPT_PADDING * 2)
            .max(1) as usize
    }
}

/// Largest useful scroll offset, counted in rows up from the bottom.
pub fn max_scroll(total_lines: usize, visible_height: u16) -> u16 {
    total_lines
        .saturating_sub(visible_height as usize)
        .min(u16::MAX as usize) as u16
}

/// Top row to render, given an offset measured up from the bottom.
pub fn scroll_top(total_lines: usize, visible_height: u16, offset_from_bottom: u16) -> u16 {
    let max = max_scroll(total_lines, visible_height);
    max.saturating_sub(offset_from_bottom.min(max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn each_message_gets_header_body_and_gap() {
        let messages = vec![Message::user(1, "Hi"), Message::model(2, "Hello there")];
        let layout = LayoutEngine::layout_messages(&messages, &Theme::dark_default(), 40);

        let text: Vec<String> = layout.lines.iter().map(plain).collect();
        assert_eq!(text, vec!["You", "Hi", "", "QuickGPT", "Hello there", ""]);
        assert_eq!(
            layout.message_spans,
            vec![
                MessageLineSpan { start: 0, len: 3 },
                MessageLineSpan { start: 3, len: 3 }
            ]
        );
    }

    #[test]
    fn empty_streaming_placeholder_shows_thinking() {
        let messages = vec![Message::placeholder(7)];
        let layout = LayoutEngine::layout_messages(&messages, &Theme::light(), 40);

        assert_eq!(plain(&layout.lines[0]), "QuickGPT ●");
        assert_eq!(plain(&layout.lines[1]), THINKING_TEXT);
    }

    #[test]
    fn long_replies_wrap_to_width() {
        let messages = vec![Message::model(1, "one two three four")];
        let layout = LayoutEngine::layout_messages(&messages, &Theme::dark_default(), 9);
        let text: Vec<String> = layout.lines.iter().map(plain).collect();
        assert_eq!(text, vec!["QuickGPT", "one two", "three", "four", ""]);
    }

    #[test]
    fn sidebar_takes_fixed_column_when_open() {
        let areas = ScreenAreas::compute(Rect::new(0, 0, 100, 30), true);
        assert_eq!(areas.sidebar.map(|r| r.width), Some(SIDEBAR_WIDTH));
        assert_eq!(areas.transcript.width, 100 - SIDEBAR_WIDTH);
        assert_eq!(areas.input.height, INPUT_HEIGHT);
        assert_eq!(areas.transcript.height, 30 - HEADER_HEIGHT - INPUT_HEIGHT);

        let closed = ScreenAreas::compute(Rect::new(0, 0, 100, 30), false);
        assert!(closed.sidebar.is_none());
        assert_eq!(closed.transcript_text_width(), 98);
    }

    #[test]
    fn scroll_offsets_count_up_from_bottom() {
        assert_eq!(max_scroll(50, 20), 30);
        assert_eq!(scroll_top(50, 20, 0), 30);
        assert_eq!(scroll_top(50, 20, 10), 20);
        assert_eq!(scroll_top(50, 20, 99), 0);
        assert_eq!(scroll_top(5, 20, 3), 0);
    }
}
