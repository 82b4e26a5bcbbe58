//! New PIN screen

use pinpad_core::config::with_pin_length;
use pinpad_core::SetStep;
use ratatui::prelude::*;

use crate::app::App;
use crate::ui::components::{pin_dots, Keypad};
use crate::ui::layout::{centered_text, dialog, render_footer, render_notice};
use crate::ui::KeypadScreen;

/// Draw the two-step set flow
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = &app.overlay.text().set;
    let Some(view) = app.overlay.set_view() else {
        return;
    };

    let inner = dialog(frame, area, &text.title, false, theme);
    let slots = KeypadScreen::split(inner);

    let prompt = match view.step {
        SetStep::First => with_pin_length(&text.sub_title, view.pin_length),
        SetStep::Repeat => text.repeat.clone(),
    };
    frame.render_widget(centered_text(prompt, theme.text_secondary()), slots.sub_title);

    frame.render_widget(pin_dots(view.entered, view.pin_length, theme), slots.dots);

    if view.error_visible {
        frame.render_widget(centered_text(text.error.as_str(), theme.danger()), slots.message);
    } else {
        let step = match view.step {
            SetStep::First => "Step 1 of 2",
            SetStep::Repeat => "Step 2 of 2",
        };
        frame.render_widget(centered_text(step, theme.text_muted()), slots.message);
    }

    let keypad = Keypad {
        layout: view.layout,
        cursor: Some(app.state.cursor),
        enabled: true,
        delete_label: &app.overlay.text().enter.back_space,
    };
    keypad.render(frame, slots.keypad, theme);

    render_notice(frame, slots.notice, app.host.notice(), theme);

    let hints = [
        ("0-9", "Digit"),
        ("Bksp", app.overlay.text().enter.back_space.as_str()),
        ("Esc", text.cancel.as_str()),
    ];
    render_footer(frame, slots.footer, &hints, theme);
}
