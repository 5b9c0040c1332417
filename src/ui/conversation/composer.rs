use crate::ui::conversation::commands::{command_entries, parse_slash_command, CommandEntry, SlashCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the composer.
#[derive(Debug, PartialEq, Eq)]
pub enum ComposerResult {
    /// Enter was pressed; carries the raw input text. Validation happens
    /// in the manager, so blank submissions are reported too.
    Submitted(String),
    Command(SlashCommand),
    None,
}

/// Single-line input composer for questions.
///
/// The composer is disabled while a request is in flight; key events are
/// dropped and the widget renders dimmed. The text is kept on submit and
/// only cleared by the manager once an answer arrives, so a failed ask
/// leaves the question in place for another try.
#[derive(Clone)]
pub struct Composer {
    content: String,
    cursor: usize, // char index, not bytes
    enabled: bool,
    command_entries: Vec<CommandEntry>,
    filtered_commands: Vec<CommandEntry>,
    show_command_palette: bool,
    selected_command: Option<usize>,
}

impl Composer {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            enabled: true,
            command_entries: command_entries(),
            filtered_commands: Vec::new(),
            show_command_palette: false,
            selected_command: None,
        }
    }

    /// Handle key input.
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press || !self.enabled {
            return ComposerResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if self.show_command_palette && self.apply_selected_command() {
                    return ComposerResult::None;
                }

                if let Some(command) = parse_slash_command(&self.content) {
                    self.clear();
                    return ComposerResult::Command(command);
                }

                return ComposerResult::Submitted(self.content.clone());
            }
            KeyCode::Up => {
                if self.show_command_palette {
                    self.move_command_selection(-1);
                }
            }
            KeyCode::Down => {
                if self.show_command_palette {
                    self.move_command_selection(1);
                }
            }
            KeyCode::Esc => {
                if self.show_command_palette {
                    self.close_command_palette();
                }
            }
            KeyCode::Tab => {
                if self.show_command_palette {
                    self.apply_selected_command();
                }
            }
            KeyCode::Char(c) => {
                if c == '/' && self.content.is_empty() {
                    self.insert_char(c);
                    self.open_command_palette();
                    return ComposerResult::None;
                }

                self.insert_char(c);

                if self.show_command_palette {
                    if self.content.starts_with('/') && !c.is_whitespace() {
                        self.refresh_command_palette();
                    } else {
                        self.close_command_palette();
                    }
                }
            }
            KeyCode::Backspace => {
                if self.backspace() && self.show_command_palette {
                    if self.content.starts_with('/') {
                        self.refresh_command_palette();
                    } else {
                        self.close_command_palette();
                    }
                }
            }
            KeyCode::Delete => {
                if self.delete() && self.show_command_palette {
                    if self.content.starts_with('/') {
                        self.refresh_command_palette();
                    } else {
                        self.close_command_palette();
                    }
                }
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor < self.char_count() {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => {
                self.cursor = 0;
            }
            KeyCode::End => {
                self.cursor = self.char_count();
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Enable or disable input. Disabled while a request is in flight.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.close_command_palette();
        }
    }

    #[allow(dead_code)]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[allow(dead_code)]
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.close_command_palette();
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Byte offset of the current cursor char index.
    fn byte_index(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index();
        self.content.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index();
            self.content.remove(at);
            true
        } else {
            false
        }
    }

    fn delete(&mut self) -> bool {
        if self.cursor < self.char_count() {
            let at = self.byte_index();
            self.content.remove(at);
            true
        } else {
            false
        }
    }

    fn open_command_palette(&mut self) {
        self.show_command_palette = true;
        self.refresh_command_palette();
        self.selected_command = Some(0);
    }

    fn close_command_palette(&mut self) {
        self.show_command_palette = false;
        self.filtered_commands.clear();
        self.selected_command = None;
    }

    fn refresh_command_palette(&mut self) {
        let query = self.content.trim_start_matches('/').to_lowercase();
        self.filtered_commands = self
            .command_entries
            .iter()
            .filter(|entry| query.is_empty() || entry.keyword.starts_with(&query))
            .copied()
            .collect();

        if self.filtered_commands.is_empty() {
            self.selected_command = None;
        } else {
            let index = self.selected_command.unwrap_or(0);
            self.selected_command = Some(index.min(self.filtered_commands.len() - 1));
        }
    }

    fn move_command_selection(&mut self, delta: isize) {
        if self.filtered_commands.is_empty() {
            self.selected_command = None;
            return;
        }

        let current = self.selected_command.unwrap_or(0) as isize;
        let len = self.filtered_commands.len() as isize;
        let next = (current + delta).rem_euclid(len);
        self.selected_command = Some(next as usize);
    }

    fn apply_selected_command(&mut self) -> bool {
        let Some(index) = self.selected_command else {
            return false;
        };
        let Some(entry) = self.filtered_commands.get(index).copied() else {
            return false;
        };

        self.content = format!("/{}", entry.keyword);
        self.cursor = self.char_count();
        self.close_command_palette();
        true
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Composer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, border_style) = if self.enabled {
            ("Ask something (Enter to send)", Style::default().fg(Color::Green))
        } else {
            ("Sending...", Style::default().fg(Color::DarkGray))
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(border_style);

        let inner_area = block.inner(area);
        block.render(area, buf);

        if inner_area.height == 0 {
            return;
        }

        if self.content.is_empty() {
            let placeholder = Line::from(vec![Span::styled(
                "Ask something...",
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder, inner_area.width);
        } else {
            let mut content = self.content.clone();
            if self.enabled {
                let at = content
                    .char_indices()
                    .nth(self.cursor)
                    .map(|(i, _)| i)
                    .unwrap_or(content.len());
                content.insert(at, '▌');
            }

            let line = Line::from(vec![Span::raw(content)]);
            buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
        }

        if self.show_command_palette {
            let palette_height = (self.filtered_commands.len().min(5) + 2) as u16;
            let palette_area = Rect {
                x: inner_area.x,
                y: inner_area.y.saturating_sub(palette_height),
                width: inner_area.width,
                height: palette_height,
            };

            let block = Block::default()
                .borders(Borders::ALL)
                .title("Commands")
                .style(Style::default().fg(Color::Blue));
            let inner = block.inner(palette_area);
            block.render(palette_area, buf);

            for (index, entry) in self.filtered_commands.iter().enumerate() {
                if index >= inner.height as usize {
                    break;
                }

                let style = if self.selected_command == Some(index) {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                let line = Line::from(vec![
                    Span::styled(format!("/{}", entry.keyword), style),
                    Span::styled(" — ", Style::default().fg(Color::DarkGray)),
                    Span::styled(entry.description, Style::default().fg(Color::Gray)),
                ]);

                buf.set_line(inner.x, inner.y + index as u16, &line, inner.width);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(composer: &mut Composer, text: &str) {
        for c in text.chars() {
            composer.handle_key(press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enter_submits_raw_content() {
        let mut composer = Composer::new();
        type_str(&mut composer, "what is rust?");
        let result = composer.handle_key(press(KeyCode::Enter));
        assert_eq!(result, ComposerResult::Submitted("what is rust?".to_string()));
        // content stays; the manager clears it once an answer arrives
        assert_eq!(composer.content(), "what is rust?");
    }

    #[test]
    fn enter_on_blank_still_submits() {
        let mut composer = Composer::new();
        type_str(&mut composer, "   ");
        // palette never opened for leading spaces
        let result = composer.handle_key(press(KeyCode::Enter));
        assert_eq!(result, ComposerResult::Submitted("   ".to_string()));
    }

    #[test]
    fn slash_command_is_parsed_and_cleared() {
        let mut composer = Composer::new();
        type_str(&mut composer, "/quit");
        composer.handle_key(press(KeyCode::Esc));
        let result = composer.handle_key(press(KeyCode::Enter));
        assert_eq!(result, ComposerResult::Command(SlashCommand::Quit));
        assert_eq!(composer.content(), "");
    }

    #[test]
    fn disabled_composer_ignores_keys() {
        let mut composer = Composer::new();
        composer.set_enabled(false);
        type_str(&mut composer, "hello");
        assert_eq!(composer.content(), "");
        assert_eq!(composer.handle_key(press(KeyCode::Enter)), ComposerResult::None);
    }

    #[test]
    fn cursor_editing_is_char_safe() {
        let mut composer = Composer::new();
        type_str(&mut composer, "héllo");
        composer.handle_key(press(KeyCode::Left));
        composer.handle_key(press(KeyCode::Left));
        composer.handle_key(press(KeyCode::Backspace));
        assert_eq!(composer.content(), "hélo");
    }

    #[test]
    fn palette_opens_on_leading_slash_and_completes() {
        let mut composer = Composer::new();
        composer.handle_key(press(KeyCode::Char('/')));
        assert!(composer.show_command_palette);
        type_str(&mut composer, "qu");
        assert_eq!(composer.filtered_commands.len(), 1);
        composer.handle_key(press(KeyCode::Tab));
        assert_eq!(composer.content(), "/quit");
        assert!(!composer.show_command_palette);
    }

    #[test]
    fn palette_closes_when_slash_removed() {
        let mut composer = Composer::new();
        composer.handle_key(press(KeyCode::Char('/')));
        composer.handle_key(press(KeyCode::Backspace));
        assert!(!composer.show_command_palette);
    }
}
