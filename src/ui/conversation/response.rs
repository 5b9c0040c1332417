use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Response display component.
///
/// Shows the latest answer, the inline error line when one is set, and an
/// animated thinking indicator while a request is in flight. Built fresh
/// each frame from the manager's state.
pub struct ResponsePanel<'a> {
    response: &'a str,
    error: Option<&'a str>,
    thinking: bool,
}

impl<'a> ResponsePanel<'a> {
    pub fn new(response: &'a str, error: Option<&'a str>, thinking: bool) -> Self {
        Self {
            response,
            error,
            thinking,
        }
    }
}

impl Widget for ResponsePanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Response");
        let inner_area = block.inner(area);
        block.render(area, buf);

        let mut y_offset: u16 = 0;

        if inner_area.height == 0 {
            return;
        }

        if let Some(error) = self.error {
            let error_line = Line::from(vec![
                Span::styled("Error: ", Style::default().fg(Color::Red)),
                Span::styled(error.to_string(), Style::default().fg(Color::Red)),
            ]);
            buf.set_line(inner_area.x, inner_area.y + y_offset, &error_line, inner_area.width);
            y_offset += 1;
        }

        if self.thinking {
            let dots = match (std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis()
                / 300)
                % 4
            {
                0 => ".",
                1 => "..",
                2 => "...",
                _ => "   ",
            };

            let indicator = Line::from(vec![
                Span::styled("Thinking", Style::default().fg(Color::Green)),
                Span::styled(dots, Style::default().fg(Color::Yellow)),
            ]);
            if y_offset < inner_area.height {
                buf.set_line(inner_area.x, inner_area.y + y_offset, &indicator, inner_area.width);
                y_offset += 1;
            }
        }

        if !self.response.is_empty() {
            let content_lines = wrap_text(self.response, inner_area.width.saturating_sub(2) as usize);
            for line in content_lines {
                if y_offset >= inner_area.height {
                    break;
                }
                let response_line = Line::from(vec![
                    Span::raw("  "),
                    Span::styled(line, Style::default().fg(Color::Green)),
                ]);
                buf.set_line(inner_area.x, inner_area.y + y_offset, &response_line, inner_area.width);
                y_offset += 1;
            }
        }
    }
}

/// Wrap text to fit within the given width.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current_line = String::new();

        for word in paragraph.split_whitespace() {
            if current_line.len() + word.len() + 1 <= width {
                if !current_line.is_empty() {
                    current_line.push(' ');
                }
                current_line.push_str(word);
            } else {
                if !current_line.is_empty() {
                    lines.push(current_line);
                    current_line = String::new();
                }
                current_line.push_str(word);
            }
        }

        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
