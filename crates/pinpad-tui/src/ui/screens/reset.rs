//! Forgotten PIN confirmation

use ratatui::prelude::*;
use ratatui::widgets::Wrap;

use crate::app::App;
use crate::ui::layout::{centered_text, dialog, render_footer};

pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = &app.overlay.text().reset;

    let inner = dialog(frame, area, &text.title, true, theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(4), // Warning
            Constraint::Length(1), // Spacer
            Constraint::Length(2), // Question
            Constraint::Min(1),    // Spacer
            Constraint::Length(2), // Help
        ])
        .split(inner);

    frame.render_widget(
        centered_text(text.sub_title.as_str(), theme.warning()).wrap(Wrap { trim: true }),
        chunks[0],
    );
    frame.render_widget(
        centered_text(text.confirm.as_str(), theme.text()).wrap(Wrap { trim: true }),
        chunks[2],
    );

    let hints = [("y", "Remove PIN"), ("n", text.back.as_str())];
    render_footer(frame, chunks[4], &hints, theme);
}
