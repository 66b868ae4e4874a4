use crate::ui::theme::TableColors;
use crate::util::{keybindings_constraint_len_calculator, popup_area};
use ratatui::{
    Frame,
    layout::{Constraint, Margin, Rect},
    prelude::Style,
    style::{Modifier, Stylize},
    widgets::{
        Block, BorderType, Cell, Clear, HighlightSpacing, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table, TableState,
    },
};

#[derive(Debug)]
pub struct Keybinding {
    combo: &'static str,
    description: &'static str,
}

impl Keybinding {
    const fn new(combo: &'static str, description: &'static str) -> Self {
        Self { combo, description }
    }

    pub fn combo(&self) -> &str {
        self.combo
    }

    pub fn description(&self) -> &str {
        self.description
    }
}

static KEYBINDINGS: [Keybinding; 15] = [
    Keybinding::new("Esc / q / Ctrl+C", "Quit the application"),
    Keybinding::new("F1 / ?", "Show or hide this help dialog"),
    Keybinding::new("r / F5", "Refresh the process list"),
    Keybinding::new("Ctrl+F", "Toggle the search input"),
    Keybinding::new("e", "Edit the search filter"),
    Keybinding::new("j / ↓", "Move selection down"),
    Keybinding::new("k / ↑", "Move selection up"),
    Keybinding::new("PageDown / PageUp", "Scroll one page"),
    Keybinding::new("Home / End", "Jump to first / last process"),
    Keybinding::new("d / Delete", "Terminate the selected process"),
    Keybinding::new("D", "Force kill the selected process"),
    Keybinding::new("Tab / ← / →", "Switch Kill / Cancel in the popup"),
    Keybinding::new("s", "Export a snapshot of the list"),
    Keybinding::new("f", "Cycle export format (JSON, CSV, YAML)"),
    Keybinding::new("Shift+Right / Shift+Left", "Next / previous color theme"),
];

/// Help popup listing every keybinding
#[derive(Debug)]
pub struct KeybindingsComponent {
    pub display: bool,
    pub state: TableState,
    pub scroll: ScrollbarState,
    /// Column widths (combo, description)
    col_widths: (u16, u16),
}

impl Default for KeybindingsComponent {
    fn default() -> Self {
        Self {
            display: false,
            state: TableState::default(),
            scroll: ScrollbarState::new(KEYBINDINGS.len()),
            col_widths: keybindings_constraint_len_calculator(&KEYBINDINGS),
        }
    }
}

impl KeybindingsComponent {
    pub fn toggle(&mut self) {
        self.display = !self.display;
        if self.display {
            self.select(0);
        }
    }

    fn select(&mut self, idx: usize) {
        self.state.select(Some(idx));
        self.scroll = self.scroll.position(idx * crate::ITEM_HEIGHT as usize);
    }

    pub fn next_row(&mut self) {
        let idx = match self.state.selected() {
            Some(i) if i + 1 < KEYBINDINGS.len() => i + 1,
            _ => 0,
        };
        self.select(idx);
    }

    pub fn previous_row(&mut self) {
        let idx = match self.state.selected() {
            Some(0) | None => KEYBINDINGS.len() - 1,
            Some(i) => i - 1,
        };
        self.select(idx);
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, colors: &TableColors) {
        let selected_row_style = Style::default()
            .add_modifier(Modifier::REVERSED)
            .fg(colors.selected_row_style_fg);

        let combo_style = Style::new()
            .fg(colors.selected_row_style_fg)
            .bg(colors.buffer_bg);
        let desc_style = Style::new().fg(colors.row_fg).bg(colors.buffer_bg);

        let rows = KEYBINDINGS.iter().map(|kb| {
            Row::new([
                Cell::from(kb.combo()).style(combo_style),
                Cell::from(kb.description()).style(desc_style),
            ])
            .height(crate::ITEM_HEIGHT)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(self.col_widths.0 + 1),
                Constraint::Min(self.col_widths.1),
            ],
        )
        .row_highlight_style(selected_row_style)
        .bg(colors.buffer_bg)
        .highlight_spacing(HighlightSpacing::Always)
        .block(
            Block::bordered()
                .border_type(BorderType::Plain)
                .border_style(Style::new().fg(colors.footer_border_color))
                .title("Keybindings"),
        );
        let area = popup_area(area, 60, 60);

        frame.render_widget(Clear, area);
        frame.render_stateful_widget(table, area, &mut self.state);

        frame.render_stateful_widget(
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
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
