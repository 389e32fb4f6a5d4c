//! Screen-local rendering helpers
//!
//! Small state structs plus functions composing ratatui's standard
//! components (Block, Paragraph, Clear). No custom widgets.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Single-line text input with a cursor.
#[derive(Debug, Clone)]
pub struct InputState {
    title: String,
    hint: String,
    value: String,
    cursor: usize,
}

impl InputState {
    pub fn new(title: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            hint: hint.into(),
            value: String::new(),
            cursor: 0,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.value.len();
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns whether the key edited the input.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Left => {
                self.cursor = self.prev_boundary();
                true
            }
            KeyCode::Right => {
                self.cursor = self.next_boundary();
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.value.len();
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let prev = self.prev_boundary();
                    self.value.drain(prev..self.cursor);
                    self.cursor = prev;
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.value.len() {
                    let next = self.next_boundary();
                    self.value.drain(self.cursor..next);
                }
                true
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.value.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                true
            }
            _ => false,
        }
    }

    /// Render as a bordered box anchored to the bottom of `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let height = 4.min(area.height);
        let popup = Rect {
            x: area.x,
            y: area.y + area.height.saturating_sub(height),
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup);

        let lines = vec![
            Line::from(Span::styled(
                self.value.clone(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                self.hint.clone(),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                self.title.clone(),
                Style::default().fg(Color::Cyan),
            ));
        frame.render_widget(Paragraph::new(lines).block(block), popup);

        let prefix_width = self.value[..self.cursor].chars().count() as u16;
        let max_x = popup.x + popup.width.saturating_sub(2);
        frame.set_cursor((popup.x + 1 + prefix_width).min(max_x), popup.y + 1);
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.value.len())
    }
}

pub fn detail_line(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{label:<14}"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(value.into()),
    ])
}

pub fn section_title(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

/// Centered paragraph inside a titled block, for empty or error states.
pub fn render_notice(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(message.to_string())
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(paragraph, area);
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else if max_chars <= 3 {
        ".".repeat(max_chars)
    } else {
        let kept: String = text.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
pub fn buffer_to_string(buffer: &ratatui::buffer::Buffer) -> String {
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer.get(x, y).symbol());
        }
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_edits_at_cursor() {
        let mut input = InputState::new("Search", "").with_value("héllo");
        input.handle_key(&KeyEvent::new(KeyCode::Left, KeyModifiers::NONE));
        input.handle_key(&KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(input.value(), "hélo");

        input.handle_key(&KeyEvent::new(KeyCode::Home, KeyModifiers::NONE));
        input.handle_key(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(input.value(), "xhélo");

        let consumed = input.handle_key(&KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        assert!(!consumed);
        assert_eq!(input.value(), "xhélo");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ünïcödé-name", 8), "ünïcö...");
        assert_eq!(truncate("abc", 2), "..");
    }
}
