use pid_sweep::export::ExportFormat;

use crate::ui::theme::TableColors;

use ratatui::widgets::{Block, BorderType};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    prelude::Style,
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
};

/// Outcome of the last user action, shown in the footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Info(String),
    Error(String),
}

#[derive(Debug, Default)]
pub struct FooterComponent {
    pub export_format: ExportFormat,
    pub status: Option<StatusMessage>,
}

impl FooterComponent {
    pub fn info(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::Info(message.into()));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.status = Some(StatusMessage::Error(message.into()));
    }

    pub fn cycle_format(&mut self) {
        self.export_format = self.export_format.next();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, colors: &TableColors, summary: &str) {
        let mut spans = vec![
            Span::styled(summary.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" | Export: "),
            Span::raw(format!("{:?}", self.export_format)),
        ];

        match &self.status {
            Some(StatusMessage::Info(msg)) => {
                spans.push(Span::raw(" | "));
                spans.push(Span::raw(msg.clone()));
            }
            Some(StatusMessage::Error(msg)) => {
                spans.push(Span::raw(" | "));
                spans.push(Span::styled(
                    msg.clone(),
                    Style::default().add_modifier(Modifier::BOLD | Modifier::ITALIC),
                ));
            }
            None => spans.push(Span::raw(" | Press [?] for help")),
        }

        let footer = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .style(Style::default().fg(colors.row_fg).bg(colors.buffer_bg))
            .block(
                Block::bordered()
                    .border_type(BorderType::Plain)
                    .border_style(Style::new().fg(colors.footer_border_color)),
            );

        frame.render_widget(footer, area);
    }
}
