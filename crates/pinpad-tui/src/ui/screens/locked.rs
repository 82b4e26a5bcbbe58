//! Lockout screen shown after too many wrong entries

use std::time::Instant;

use ratatui::prelude::*;
use ratatui::widgets::Gauge;

use crate::app::App;
use crate::ui::layout::{centered_text, dialog, render_footer, render_notice};

/// Draw the lockout screen
pub fn draw(frame: &mut Frame, area: Rect, app: &App, now: Instant) {
    let theme = &app.theme;
    let text = &app.overlay.text().locked;

    let inner = dialog(frame, area, &text.title, true, theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Banner
            Constraint::Length(3), // Message
            Constraint::Length(2), // Countdown
            Constraint::Length(1), // Progress bar
            Constraint::Min(1),    // Spacer
            Constraint::Length(1), // Notice
            Constraint::Length(2), // Help
        ])
        .split(inner);

    let banner = format!("⚠  {}  ⚠", text.locked_text.to_uppercase());
    frame.render_widget(centered_text(banner, theme.danger()), chunks[0]);
    frame.render_widget(centered_text(text.sub_title.as_str(), theme.text()), chunks[1]);

    let remaining = app.overlay.locked_remaining(now).unwrap_or_default();
    let secs = remaining.as_secs();
    let countdown = if secs >= 60 {
        format!("Try again in {:02}:{:02}", secs / 60, secs % 60)
    } else {
        format!("Try again in {} seconds", secs)
    };
    frame.render_widget(centered_text(countdown, theme.warning()), chunks[2]);

    // Elapsed share of the lock
    let total = app.overlay.options().locked().as_secs_f64().max(1.0);
    let progress = (1.0 - remaining.as_secs_f64() / total).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .gauge_style(theme.danger())
        .ratio(progress)
        .label(format!("{:.0}%", progress * 100.0));
    frame.render_widget(gauge, chunks[3]);

    render_notice(frame, chunks[5], app.host.notice(), theme);

    let mut hints = Vec::new();
    if app.overlay.options().allow_reset {
        hints.push(("r", app.overlay.text().enter.footer_text.as_str()));
    }
    hints.push(("Esc", "Quit"));
    render_footer(frame, chunks[6], &hints, theme);
}
