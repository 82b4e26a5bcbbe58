//! Masked PIN progress

use ratatui::prelude::*;

use crate::ui::Theme;

/// One dot per digit, filled for digits entered so far
pub fn pin_dots(entered: usize, pin_length: usize, theme: &Theme) -> Line<'static> {
    let mut spans = Vec::with_capacity(pin_length * 2);
    for i in 0..pin_length {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        if i < entered {
            spans.push(Span::styled("●", theme.pin_dot()));
        } else {
            spans.push(Span::styled("○", theme.pin_placeholder()));
        }
    }
    Line::from(spans).alignment(Alignment::Center)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dots_match_progress() {
        let line = pin_dots(2, 4, &Theme::default());
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "● ● ○ ○");
    }
}
