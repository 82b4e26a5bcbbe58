//! Layout helpers for consistent screen structure

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::Theme;
use crate::app::{Notice, NoticeKind};

/// Create a centered box for dialogs
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Create a fixed-size centered box
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Dialog frame shared by every overlay screen; returns the inner area
pub fn dialog(frame: &mut Frame, area: Rect, title: &str, danger: bool, theme: &Theme) -> Rect {
    let dialog = centered_rect_fixed(44, 24, area);
    let (title_style, border_style) = if danger {
        (theme.danger(), theme.danger())
    } else {
        (theme.title(), theme.border_focused())
    };
    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(title_style)
        .borders(Borders::ALL)
        .border_style(border_style);

    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);
    inner
}

/// Render a footer with key hints
pub fn render_footer(frame: &mut Frame, area: Rect, hints: &[(&str, &str)], theme: &Theme) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(theme.border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let hint_text: String = hints
        .iter()
        .map(|(key, action)| format!("[{}] {}", key, action))
        .collect::<Vec<_>>()
        .join("  ");

    let footer = Paragraph::new(hint_text)
        .style(theme.text_muted())
        .alignment(Alignment::Center);
    frame.render_widget(footer, inner);
}

/// Render the host's notice line
pub fn render_notice(frame: &mut Frame, area: Rect, notice: Option<&Notice>, theme: &Theme) {
    let Some(notice) = notice else {
        return;
    };
    let style = match notice.kind {
        NoticeKind::Info => theme.success(),
        NoticeKind::Error => theme.danger(),
    };
    let widget = Paragraph::new(notice.text.as_str())
        .style(style)
        .alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

/// Centered single-style paragraph
pub fn centered_text<'a>(text: impl Into<Text<'a>>, style: Style) -> Paragraph<'a> {
    Paragraph::new(text).style(style).alignment(Alignment::Center)
}
