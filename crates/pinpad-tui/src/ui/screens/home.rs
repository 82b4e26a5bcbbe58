//! Unlocked home menu

use chrono::Local;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem};

use crate::app::{App, HomeItem};
use crate::ui::layout::{centered_rect, centered_text, render_footer, render_notice};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let dialog = centered_rect(50, 50, area);

    let block = Block::default()
        .title(" Pinpad ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border());
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Status
            Constraint::Length(1), // Last changed
            Constraint::Length(1), // Spacer
            Constraint::Min(3),    // Menu
            Constraint::Length(1), // Notice
            Constraint::Length(2), // Help
        ])
        .split(inner);

    let status = format!(
        "Unlocked  {}  {}",
        '\u{25C6}',
        Local::now().format("%H:%M")
    );
    frame.render_widget(centered_text(status, theme.success()), chunks[0]);

    let changed = match app.state.last_changed {
        Some(at) => format!(
            "PIN last changed {}",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        None => "PIN not stored on disk".to_string(),
    };
    frame.render_widget(centered_text(changed, theme.text_muted()), chunks[1]);

    let items: Vec<ListItem> = HomeItem::ALL
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let selected = i == app.state.menu_index;
            let marker = if selected { "▸ " } else { "  " };
            ListItem::new(format!("{}{}", marker, item.label()))
                .style(theme.menu_item(selected))
        })
        .collect();
    frame.render_widget(List::new(items), chunks[3]);

    render_notice(frame, chunks[4], app.host.notice(), theme);

    let hints = [("↑↓", "Select"), ("Enter", "Open"), ("l", "Lock"), ("q", "Quit")];
    render_footer(frame, chunks[5], &hints, theme);
}
