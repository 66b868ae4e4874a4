use crate::ApplicationMode;
use crate::ui::theme::TableColors;
use pid_sweep::ProcessRecord;

use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::Style,
    widgets::{Block, BorderType, Paragraph},
};

/// Search input that filters the process table by PID or label.
#[derive(Debug, Default)]
pub struct ProcessSearchComponent {
    /// Current input value
    pub value: String,
    /// Cursor position in terms of character index
    pub cursor_index: usize,
    /// Whether the search input is displayed
    pub display: bool,
}

impl ProcessSearchComponent {
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_index = 0;
    }

    pub fn toggle(&mut self) {
        self.display = !self.display;
        self.clear();
    }

    /// Case-insensitive match against the label, prefix match against the PID.
    pub fn matches(&self, record: &ProcessRecord) -> bool {
        let needle = self.value.trim();
        if needle.is_empty() {
            return true;
        }
        record.pid.to_string().starts_with(needle)
            || record
                .label
                .to_lowercase()
                .contains(&needle.to_lowercase())
    }

    pub fn filter(&self, records: &[ProcessRecord]) -> Vec<ProcessRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    fn clamp_cursor(&self, pos: usize) -> usize {
        pos.clamp(0, self.value.chars().count())
    }

    pub fn move_cursor_left(&mut self) {
        let new_idx = self.cursor_index.saturating_sub(1);
        self.cursor_index = self.clamp_cursor(new_idx);
    }

    pub fn move_cursor_right(&mut self) {
        let new_idx = self.cursor_index.saturating_add(1);
        self.cursor_index = self.clamp_cursor(new_idx);
    }

    /// Returns the byte index corresponding to the char cursor
    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor_index)
            .unwrap_or(self.value.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index();
        self.value.insert(idx, c);
        self.move_cursor_right();
    }

    /// Deletes the character before the cursor
    pub fn delete_char(&mut self) {
        if self.cursor_index > 0 {
            let before = self.value.chars().take(self.cursor_index - 1);
            let after = self.value.chars().skip(self.cursor_index);
            self.value = before.chain(after).collect();
            self.move_cursor_left();
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        colors: &TableColors,
        mode: &ApplicationMode,
    ) {
        let input = Paragraph::new(self.value.as_str())
            .style(Style::default().fg(colors.row_fg).bg(colors.buffer_bg))
            .block(
                Block::bordered()
                    .border_type(BorderType::Plain)
                    .border_style(Style::new().fg(colors.footer_border_color))
                    .title("Search PID / name"),
            );

        frame.render_widget(input, area);

        if matches!(mode, ApplicationMode::Editing) {
            #[allow(clippy::cast_possible_truncation)]
            frame.set_cursor_position(Position::new(
                area.x + self.cursor_index as u16 + 1,
                area.y + 1,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(text: &str) -> ProcessSearchComponent {
        let mut search = ProcessSearchComponent::default();
        for c in text.chars() {
            search.insert_char(c);
        }
        search
    }

    #[test]
    fn filters_by_pid_prefix_and_label() {
        let records = vec![
            ProcessRecord::new(1, "/sbin/init"),
            ProcessRecord::new(1843, "Firefox"),
            ProcessRecord::new(2210, "firefox-bin"),
        ];

        let pids = |s: &ProcessSearchComponent| -> Vec<u32> {
            s.filter(&records).iter().map(|r| r.pid).collect()
        };

        assert_eq!(pids(&search("")), vec![1, 1843, 2210]);
        assert_eq!(pids(&search("18")), vec![1843]);
        assert_eq!(pids(&search("FIREFOX")), vec![1843, 2210]);
        assert_eq!(pids(&search("sshd")), Vec::<u32>::new());
    }

    #[test]
    fn editing_keeps_cursor_in_bounds() {
        let mut s = search("abc");
        s.move_cursor_left();
        s.delete_char();
        assert_eq!(s.value, "ac");
        s.move_cursor_right();
        s.move_cursor_right();
        assert_eq!(s.cursor_index, 2);
        s.toggle();
        assert!(s.value.is_empty());
    }
}
