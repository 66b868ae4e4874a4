use crate::ui::theme::TableColors;
use crate::util::popup_area;
use pid_sweep::{KillMode, ProcessRecord};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Margin, Rect},
    prelude::Style,
    style::Stylize,
    text::Line,
    widgets::{Block, BorderType, Clear, Paragraph, Wrap},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KillAction {
    #[default]
    Kill,
    Cancel,
}

/// Confirmation popup shown before a process is terminated.
#[derive(Debug, Default)]
pub struct KillComponent {
    pub display: bool,
    /// Process about to be terminated
    pub item: Option<ProcessRecord>,
    pub mode: KillMode,
    /// Focused button
    pub action: KillAction,
}

impl KillComponent {
    pub fn show(&mut self, item: ProcessRecord, mode: KillMode) {
        self.display = true;
        self.item = Some(item);
        self.mode = mode;
        self.action = KillAction::Kill;
    }

    pub fn hide(&mut self) {
        self.display = false;
        self.item = None;
    }

    pub fn focus_kill(&mut self) {
        self.action = KillAction::Kill;
    }

    pub fn focus_cancel(&mut self) {
        self.action = KillAction::Cancel;
    }

    pub fn toggle_focus(&mut self) {
        self.action = match self.action {
            KillAction::Kill => KillAction::Cancel,
            KillAction::Cancel => KillAction::Kill,
        };
    }

    /// Closes the popup and returns the target and mode when "Kill" was focused.
    pub fn confirm(&mut self) -> Option<(ProcessRecord, KillMode)> {
        let confirmed = self.action == KillAction::Kill;
        let item = self.item.take();
        self.hide();
        item.filter(|_| confirmed).map(|item| (item, self.mode))
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, colors: &TableColors) {
        if !self.display {
            return;
        }

        let title = match self.mode {
            KillMode::Graceful => "Terminate",
            KillMode::Force => "Force kill",
        };
        let block = Block::bordered()
            .border_type(BorderType::Plain)
            .border_style(Style::new().fg(colors.footer_border_color))
            .bg(colors.buffer_bg)
            .title(title);

        let area = popup_area(area, 50, 50);
        frame.render_widget(Clear, area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        let prompt = match &self.item {
            Some(item) => format!("Kill {} (PID {})?", item.label, item.pid),
            None => "Kill ?".to_string(),
        };
        let prompt = Paragraph::new(Line::from(prompt))
            .style(Style::default().fg(colors.row_fg).bg(colors.buffer_bg))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(
            prompt,
            chunks[1].inner(Margin {
                horizontal: 2,
                vertical: 0,
            }),
        );

        let desc = match self.mode {
            KillMode::Graceful => "The process is asked to exit and may clean up first.",
            KillMode::Force => "The process is stopped immediately. Unsaved data will be lost.",
        };
        let desc = Paragraph::new(Line::from(desc))
            .style(Style::default().fg(colors.row_fg).bg(colors.buffer_bg))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(
            desc,
            chunks[2].inner(Margin {
                horizontal: 2,
                vertical: 0,
            }),
        );

        let btns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
            .flex(Flex::Center)
            .split(chunks[4]);

        let button = |label: &'static str, action: KillAction| {
            let block = if self.action == action {
                Block::bordered().border_style(Style::new().fg(colors.selected_cell_style_fg))
            } else {
                Block::bordered()
            };
            Paragraph::new(label).alignment(Alignment::Center).block(block)
        };

        frame.render_widget(button("Kill", KillAction::Kill), btns[0]);
        frame.render_widget(button("Cancel", KillAction::Cancel), btns[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_returns_target_only_when_kill_focused() {
        let mut popup = KillComponent::default();

        popup.show(ProcessRecord::new(42, "sleep"), KillMode::Force);
        let confirmed = popup.confirm();
        assert_eq!(
            confirmed,
            Some((ProcessRecord::new(42, "sleep"), KillMode::Force))
        );
        assert!(!popup.display);

        popup.show(ProcessRecord::new(42, "sleep"), KillMode::Graceful);
        popup.focus_cancel();
        assert_eq!(popup.confirm(), None);
        assert!(popup.item.is_none());
    }

    #[test]
    fn focus_toggles_between_buttons() {
        let mut popup = KillComponent::default();
        popup.toggle_focus();
        assert_eq!(popup.action, KillAction::Cancel);
        popup.toggle_focus();
        assert_eq!(popup.action, KillAction::Kill);
        popup.focus_cancel();
        popup.focus_kill();
        assert_eq!(popup.action, KillAction::Kill);
    }
}
