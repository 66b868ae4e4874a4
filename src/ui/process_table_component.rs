use crate::ui::theme::TableColors;
use pid_sweep::ProcessRecord;
use ratatui::{
    Frame,
    layout::{Constraint, Margin, Rect},
    style::{Modifier, Style, Stylize},
    widgets::HighlightSpacing,
    widgets::{Block, BorderType, Cell, Row, Scrollbar, ScrollbarState, Table, TableState},
};

/// A component that handles rendering a scrollable table of processes

#[derive(Debug)]
pub struct ProcessTableComponent {
    /// Filtered processes to display
    pub items: Vec<ProcessRecord>,
    /// Table selection state
    pub state: TableState,
    /// Scrollbar state
    pub scroll: ScrollbarState,
    /// Number of visible rows (set during render)
    pub visible_rows: usize,
    /// Width of the PID column
    pub pid_width: u16,
}

impl Default for ProcessTableComponent {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: TableState::default(),
            scroll: ScrollbarState::new(1),
            visible_rows: 0,
            pid_width: 7,
        }
    }
}

impl ProcessTableComponent {
    /// Replace current items, keeping the selection on the same PID if it is
    /// still present
    pub fn set_items(&mut self, items: Vec<ProcessRecord>) {
        let selected_pid = self.selected().map(|p| p.pid);

        self.items = items;
        let content_len = self.items.len() * crate::ITEM_HEIGHT as usize;
        self.scroll = self.scroll.content_length(content_len);

        let idx = selected_pid
            .and_then(|pid| self.items.iter().position(|p| p.pid == pid))
            .or(if self.items.is_empty() { None } else { Some(0) });
        self.select(idx);
    }

    pub fn selected(&self) -> Option<&ProcessRecord> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    fn select(&mut self, idx: Option<usize>) {
        self.state.select(idx);
        self.scroll = self
            .scroll
            .position(idx.unwrap_or(0) * crate::ITEM_HEIGHT as usize);
    }

    /// Move selection down by one row
    pub fn next_row(&mut self) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let idx = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.select(Some(idx));
    }

    /// Move selection up by one row
    pub fn previous_row(&mut self) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let idx = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.select(Some(idx));
    }

    pub fn first_row(&mut self) {
        if !self.items.is_empty() {
            self.select(Some(0));
        }
    }

    pub fn last_row(&mut self) {
        if !self.items.is_empty() {
            self.select(Some(self.items.len() - 1));
        }
    }

    pub fn page_down(&mut self) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        self.select(Some((current + self.visible_rows).min(len - 1)));
    }

    pub fn page_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let current = self.state.selected().unwrap_or(0);
        self.select(Some(current.saturating_sub(self.visible_rows)));
    }

    /// Render the table and its scrollbar
    pub fn render(&mut self, frame: &mut Frame, area: Rect, colors: &TableColors, title: &str) {
        // Borders and header take three rows
        self.visible_rows = area.height.saturating_sub(3) as usize;

        let header = Row::new(["PID", "Executable / Command"].map(Cell::from))
            .style(Style::default().fg(colors.header_fg).bg(colors.header_bg))
            .height(crate::ITEM_HEIGHT);

        let rows = self.items.iter().map(|item| {
            Row::new(item.ref_array().into_iter().map(Cell::from))
                .style(Style::default().fg(colors.row_fg))
                .height(crate::ITEM_HEIGHT)
        });

        let table = Table::new(
            rows,
            [Constraint::Length(self.pid_width), Constraint::Min(20)],
        )
        .header(header)
        .row_highlight_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(colors.selected_row_style_fg),
        )
        .bg(colors.buffer_bg)
        .highlight_spacing(HighlightSpacing::Always)
        .block(
            Block::bordered()
                .border_type(BorderType::Plain)
                .border_style(Style::new().fg(colors.footer_border_color))
                .title(title.to_string()),
        );

        frame.render_stateful_widget(table, area, &mut self.state);

        frame.render_stateful_widget(
            Scrollbar::default()
                .orientation(ratatui::widgets::ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            area.inner(Margin {
                vertical: 1,
                horizontal: 1,
            }),
            &mut self.scroll,
        );
    }
}
