//! PIN entry screen

use pinpad_core::config::with_pin_length;
use pinpad_core::BiometricAttemptState;
use ratatui::prelude::*;

use crate::app::App;
use crate::ui::components::{pin_dots, Keypad};
use crate::ui::layout::{centered_text, dialog, render_footer, render_notice};
use crate::ui::KeypadScreen;

/// Draw the PIN entry screen
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = &app.overlay.text().enter;
    let Some(session) = app.overlay.session() else {
        return;
    };

    let inner = dialog(frame, area, &text.title, false, theme);
    let slots = KeypadScreen::split(inner);

    let sub_title = with_pin_length(&text.sub_title, session.pin_length());
    frame.render_widget(centered_text(sub_title, theme.text_secondary()), slots.sub_title);

    frame.render_widget(
        pin_dots(session.entered_len(), session.pin_length(), theme),
        slots.dots,
    );

    // Wrong-PIN flag first, then biometric progress, then attempts left
    let message = if session.is_error_visible() {
        Some((text.error.clone(), theme.danger()))
    } else if session.biometric_state() == BiometricAttemptState::InFlight {
        Some(("Waiting for biometrics...".to_string(), theme.text_secondary()))
    } else {
        match session.attempts_remaining() {
            Some(left) if session.failure_count() > 0 => Some((
                format!("{} attempts remaining", left),
                theme.warning(),
            )),
            _ => None,
        }
    };
    if let Some((message, style)) = message {
        frame.render_widget(centered_text(message, style), slots.message);
    }

    let keypad = Keypad {
        layout: session.layout(),
        cursor: Some(app.state.cursor),
        enabled: session.is_input_enabled(),
        delete_label: &text.back_space,
    };
    keypad.render(frame, slots.keypad, theme);

    render_notice(frame, slots.notice, app.host.notice(), theme);

    let mut hints = vec![("0-9", "Digit"), ("Bksp", text.back_space.as_str())];
    if session.offers_local_auth() {
        hints.push(("b", text.local_auth_button.as_str()));
    }
    if app.overlay.options().allow_reset {
        hints.push(("r", text.footer_text.as_str()));
    }
    hints.push(("Esc", "Quit"));
    render_footer(frame, slots.footer, &hints, theme);
}
