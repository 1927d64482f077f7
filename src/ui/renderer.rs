use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tui_textarea::TextArea;
use unicode_width::UnicodeWidthStr;

use crate::core::app::App;
use crate::core::model::ModelType;
use crate::core::profile::CREDIT_PACKS;
use crate::core::text_wrapping::truncate_to_width;
use crate::ui::layout::{scroll_top, ScreenAreas, TRANSCRIPT_PADDING};
use crate::ui::theme::Theme;

const APP_TITLE: &str = "QuickGPT";

pub fn ui(f: &mut Frame, app: &App) {
    let area = f.area();
    let theme = &app.ui.theme;
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        area,
    );

    if !app.is_logged_in() {
        render_login(f, app, area);
        return;
    }

    let areas = ScreenAreas::compute(area, app.ui.sidebar_open);
    if let Some(sidebar) = areas.sidebar {
        render_sidebar(f, app, sidebar);
    }
    if areas.transcript.width > 0 {
        render_header(f, app, areas.header);
        render_transcript(f, app, &areas);
        render_input(f, app, areas.input);
    }

    if app.conversation.show_pricing() {
        render_pricing(f, app, area);
    }
}

fn render_login(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let popup = centered_rect(50, 40, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style)
        .title(Span::styled(format!(" {APP_TITLE} "), theme.title_style))
        .style(Style::default().bg(theme.background_color));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let intro = Paragraph::new(vec![
        Line::from(Span::styled("Welcome! What should we call you?", theme.assistant_text_style)),
        Line::from(Span::styled(
            "New accounts start with 5 Pro credits.",
            theme.system_text_style,
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(intro, rows[0]);

    let field_block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style)
        .title(Span::styled(" Display name ", theme.input_title_style));
    let field_area = field_block.inner(rows[1]);
    f.render_widget(field_block, rows[1]);
    render_textarea(f, &app.ui.login_input, field_area, true);

    let mut hints = vec![Line::from(Span::styled(
        "Enter to continue • Ctrl+C to quit",
        theme.system_text_style,
    ))];
    if let Some(status) = &app.ui.status {
        hints.push(Line::from(Span::styled(status.clone(), theme.credits_style)));
    }
    f.render_widget(
        Paragraph::new(hints).alignment(Alignment::Center),
        rows[2],
    );
}

fn render_sidebar(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let focused = app.ui.is_sidebar_focused();
    let border_style = if focused {
        theme.border_style.add_modifier(Modifier::BOLD)
    } else {
        theme.border_style
    };
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(border_style)
        .title(Span::styled(format!(" {APP_TITLE} "), theme.title_style));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(inner);

    let width = rows[0].width.saturating_sub(2) as usize;
    let mut lines = vec![
        Line::from(Span::styled("+ New chat (Ctrl+N)", theme.assistant_text_style)),
        Line::from(""),
        Line::from(Span::styled("Recent", theme.system_text_style)),
    ];

    let active = app.conversation.active_session_id();
    for (index, session) in app.conversation.sessions().list().iter().enumerate() {
        let marker = if active == Some(session.id.as_str()) {
            "▸ "
        } else {
            "  "
        };
        let mut title_style = theme.assistant_text_style;
        if focused && index == app.ui.sidebar_selected {
            title_style = theme.selection_highlight_style;
        }
        lines.push(Line::from(vec![
            Span::styled(marker, theme.streaming_indicator_style),
            Span::styled(truncate_to_width(&session.title, width), title_style),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", truncate_to_width(&session.date, width)),
            theme.system_text_style,
        )));
    }

    let list_height = rows[0].height as usize;
    let selected_row = 3 + app.ui.sidebar_selected * 2 + 1;
    let skip = selected_row.saturating_sub(list_height.max(1) - 1) as u16;
    f.render_widget(Paragraph::new(lines).scroll((skip, 0)), rows[0]);

    let (name, credits) = app
        .conversation
        .user()
        .map(|u| (u.name.as_str(), u.credits))
        .unwrap_or(("", 0));
    let theme_label = if theme.is_dark() { "Dark" } else { "Light" };
    let footer = vec![
        Line::from(Span::styled(
            format!("Theme: {theme_label} (Ctrl+T)"),
            theme.system_text_style,
        )),
        Line::from(vec![
            Span::styled(format!("Credits: {credits}"), theme.credits_style),
            Span::styled(" (Ctrl+P buy)", theme.system_text_style),
        ]),
        Line::from(Span::styled(
            truncate_to_width(name, width),
            theme.user_prefix_style,
        )),
        Line::from(Span::styled("Ctrl+X log out", theme.system_text_style)),
    ];
    f.render_widget(Paragraph::new(footer), rows[1]);
}

fn model_badge(model: ModelType, theme: &Theme) -> Span<'static> {
    let style = match model {
        ModelType::Pro => theme.pro_badge_style,
        ModelType::Fast => theme.streaming_indicator_style,
    };
    Span::styled(format!("[{}]", model.display_name()), style)
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let mut spans = vec![
        Span::styled(format!(" {APP_TITLE} "), theme.title_style),
        model_badge(app.conversation.selected_model(), theme),
    ];
    if app.conversation.is_loading() {
        spans.push(Span::styled(
            "  replying… (Esc to stop)",
            theme.streaming_indicator_style,
        ));
    }
    if let Some(status) = &app.ui.status {
        spans.push(Span::styled(format!("  {status}"), theme.credits_style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_transcript(f: &mut Frame, app: &App, areas: &ScreenAreas) {
    let theme = &app.ui.theme;
    let area = Rect {
        x: areas.transcript.x + TRANSCRIPT_PADDING,
        width: areas
            .transcript
            .width
            .saturating_sub(TRANSCRIPT_PADDING * 2),
        ..areas.transcript
    };

    if app.conversation.messages().is_empty() {
        let welcome = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "How can I help you today?",
                theme.title_style,
            )),
            Line::from(Span::styled(
                "Type a message below. Tab switches between Fast and Pro.",
                theme.system_text_style,
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        f.render_widget(welcome, area);
        return;
    }

    let layout = app.transcript_layout(areas.transcript_text_width());
    let top = scroll_top(layout.lines.len(), area.height, app.ui.scroll_offset);
    f.render_widget(Paragraph::new(layout.lines).scroll((top, 0)), area);
}

fn render_input(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let title = if app.conversation.is_loading() {
        " Message (Esc to stop) "
    } else {
        " Message (Enter send • Tab model • Ctrl+S sessions) "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style)
        .title(Span::styled(title, theme.input_title_style));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let badge = model_badge(app.conversation.selected_model(), theme);
    let badge_width = badge.content.width() as u16 + 1;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(badge_width), Constraint::Min(0)])
        .split(inner);
    f.render_widget(Paragraph::new(Line::from(badge)), chunks[0]);

    let show_cursor = app.ui.is_input_focused() && !app.conversation.show_pricing();
    render_textarea(f, &app.ui.input, chunks[1], show_cursor);
}

fn render_textarea(f: &mut Frame, textarea: &TextArea<'static>, area: Rect, focused: bool) {
    if focused {
        f.render_widget(textarea, area);
    } else {
        let mut idle = textarea.clone();
        idle.set_cursor_style(textarea.style());
        f.render_widget(&idle, area);
    }
}

fn render_pricing(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.ui.theme;
    let popup = centered_rect(60, 50, area);
    f.render_widget(Clear, popup);

    let balance = app.conversation.user().map(|u| u.credits).unwrap_or(0);
    let mut lines = vec![
        Line::from(Span::styled(
            "Pro answers need credits.",
            theme.assistant_text_style,
        )),
        Line::from(Span::styled(
            format!("Current balance: {balance}"),
            theme.credits_style,
        )),
        Line::from(""),
    ];
    for (index, pack) in CREDIT_PACKS.iter().enumerate() {
        let selected = index == app.ui.pricing_selected;
        let style = if selected {
            theme.selection_highlight_style
        } else {
            theme.assistant_text_style
        };
        let marker = if selected { "› " } else { "  " };
        lines.push(Line::from(Span::styled(
            format!(
                "{marker}{:<8} {:>4} credits  {}",
                pack.label, pack.credits, pack.price
            ),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "↑/↓ choose • Enter buy • Esc close",
        theme.system_text_style,
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style)
        .title(Span::styled(" Buy credits ", theme.title_style))
        .style(Style::default().bg(theme.background_color));
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        popup,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
