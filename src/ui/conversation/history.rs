//! Paginated history display component

use crate::events::AnswerRecord;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Records shown per page.
pub const PAGE_SIZE: usize = 5;

/// Paginated view over the accumulated question/answer history.
///
/// The record list is replaced wholesale on a history fetch (the manager
/// hands it over most-recent-first) and grows by appending as questions
/// are answered. The page index always satisfies
/// `current_page * PAGE_SIZE < records.len()` while records exist.
#[derive(Clone)]
pub struct HistoryView {
    records: Vec<AnswerRecord>,
    current_page: usize,
}

impl HistoryView {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            current_page: 0,
        }
    }

    /// Replace the whole list and jump back to the first page.
    pub fn replace_all(&mut self, records: Vec<AnswerRecord>) {
        self.records = records;
        self.current_page = 0;
    }

    /// Append a newly answered record to the end of the list.
    pub fn push(&mut self, record: AnswerRecord) {
        self.records.push(record);
    }

    #[allow(dead_code)]
    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[allow(dead_code)]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Number of pages, zero when there are no records.
    pub fn page_count(&self) -> usize {
        self.records.len().div_ceil(PAGE_SIZE)
    }

    /// The slice of records visible on the current page.
    pub fn visible(&self) -> &[AnswerRecord] {
        let start = self.current_page * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.records.len());
        &self.records[start.min(self.records.len())..end]
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 0
    }

    pub fn has_next(&self) -> bool {
        (self.current_page + 1) * PAGE_SIZE < self.records.len()
    }

    /// Move one page back; no-op on the first page.
    pub fn prev_page(&mut self) {
        if self.has_prev() {
            self.current_page -= 1;
        }
    }

    /// Move one page forward; no-op on the last page.
    pub fn next_page(&mut self) {
        if self.has_next() {
            self.current_page += 1;
        }
    }
}

impl Default for HistoryView {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for HistoryView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Previous Questions");

        let inner_area = block.inner(area);
        block.render(area, buf);

        if inner_area.height == 0 {
            return;
        }

        if self.records.is_empty() {
            let empty = Line::from(vec![Span::styled(
                "No previous questions yet.",
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &empty, inner_area.width);
            return;
        }

        let mut lines: Vec<Line> = Vec::new();
        for record in self.visible() {
            lines.extend(self.render_record(record, inner_area.width));
            lines.push(Line::from(vec![Span::raw("")]));
        }

        // Reserve the bottom row for the pagination footer
        let content_height = inner_area.height.saturating_sub(1) as usize;
        for (i, line) in lines.iter().take(content_height).enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }

        let footer = self.footer_line();
        buf.set_line(
            inner_area.x,
            inner_area.y + inner_area.height.saturating_sub(1),
            &footer,
            inner_area.width,
        );
    }
}

impl HistoryView {
    /// Render a single record into lines.
    fn render_record(&self, record: &AnswerRecord, width: u16) -> Vec<Line> {
        let mut lines = Vec::new();
        let wrap_width = width.saturating_sub(3) as usize;

        for (i, part) in self.wrap_text(&record.question, wrap_width).into_iter().enumerate() {
            let prefix = if i == 0 { "Q: " } else { "   " };
            lines.push(Line::from(vec![
                Span::styled(prefix, Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
                Span::styled(part, Style::default().fg(Color::Blue)),
            ]));
        }

        for (i, part) in self.wrap_text(&record.response, wrap_width).into_iter().enumerate() {
            let prefix = if i == 0 { "A: " } else { "   " };
            lines.push(Line::from(vec![
                Span::styled(prefix, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled(part, Style::default().fg(Color::Green)),
            ]));
        }

        if !record.timestamp.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("   "),
                Span::styled(record.timestamp.clone(), Style::default().fg(Color::DarkGray)),
            ]));
        }

        lines
    }

    fn footer_line(&self) -> Line {
        let active = Style::default().fg(Color::White);
        let disabled = Style::default().fg(Color::DarkGray);

        let prev_style = if self.has_prev() { active } else { disabled };
        let next_style = if self.has_next() { active } else { disabled };

        Line::from(vec![
            Span::styled("[PgUp] Previous", prev_style),
            Span::styled(
                format!("  page {}/{}  ", self.current_page + 1, self.page_count().max(1)),
                Style::default().fg(Color::Gray),
            ),
            Span::styled("[PgDn] Next", next_style),
        ])
    }

    /// Wrap text to fit within the given width.
    fn wrap_text(&self, text: &str, width: usize) -> Vec<String> {
        if width == 0 {
            return vec![text.to_string()];
        }

        let mut lines = Vec::new();
        let mut current_line = String::new();

        for word in text.split_whitespace() {
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

        if !current_line.is_empty() {
            lines.push(current_line);
        }

        if lines.is_empty() {
            lines.push(String::new());
        }

        lines
    }
}
