//! Keypad grid

use pinpad_core::{KeyToken, KeypadLayout};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::Cursor;
use crate::ui::Theme;

/// Width of one key cell
const KEY_WIDTH: usize = 7;

/// Keypad widget
pub struct Keypad<'a> {
    pub layout: &'a KeypadLayout,
    pub cursor: Option<Cursor>,
    pub enabled: bool,
    pub delete_label: &'a str,
}

impl<'a> Keypad<'a> {
    /// Text for one key
    fn label(&self, token: KeyToken) -> String {
        match token {
            KeyToken::Digit(d) => d.to_string(),
            KeyToken::Delete => self.delete_label.chars().take(KEY_WIDTH - 2).collect(),
            KeyToken::Blank => String::new(),
        }
    }

    /// Lines of the grid, one per layout row with a spacer between
    pub fn lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (row, tokens) in self.layout.rows().iter().enumerate() {
            if row > 0 {
                lines.push(Line::default());
            }
            let spans: Vec<Span<'static>> = tokens
                .iter()
                .enumerate()
                .map(|(col, &token)| {
                    let focused = self.cursor == Some(Cursor { row, col });
                    let label = format!("{:^width$}", self.label(token), width = KEY_WIDTH);
                    Span::styled(label, theme.key(focused, self.enabled))
                })
                .collect();
            lines.push(Line::from(spans).alignment(Alignment::Center));
        }
        lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        frame.render_widget(Paragraph::new(self.lines(theme)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_canonical_grid() {
        let layout = KeypadLayout::canonical();
        let keypad = Keypad {
            layout: &layout,
            cursor: None,
            enabled: true,
            delete_label: "Delete",
        };
        let lines = keypad.lines(&Theme::default());

        // Four rows plus three spacers
        assert_eq!(lines.len(), 7);
        assert_eq!(row_text(&lines[0]).split_whitespace().collect::<Vec<_>>(), ["1", "2", "3"]);
        assert_eq!(row_text(&lines[6]).split_whitespace().collect::<Vec<_>>(), ["0", "Delet"]);
    }
}
