use ratatui::prelude::Color;
use ratatui::style::palette::tailwind;

pub const PALETTES: [tailwind::Palette; 4] = [
    tailwind::RED,
    tailwind::BLUE,
    tailwind::EMERALD,
    tailwind::AMBER,
];

#[derive(Debug)]
pub struct Theme {
    idx: usize,
    pub table: TableColors,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            idx: 0,
            table: TableColors::new(&PALETTES[0]),
        }
    }
}

impl Theme {
    fn set(&mut self, idx: usize) {
        self.idx = idx % PALETTES.len();
        self.table = TableColors::new(&PALETTES[self.idx]);
    }

    pub fn cycle_next(&mut self) {
        self.set(self.idx + 1);
    }

    pub fn cycle_prev(&mut self) {
        self.set(self.idx + PALETTES.len() - 1);
    }
}

#[derive(Clone, Debug)]
pub struct TableColors {
    pub buffer_bg: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub row_fg: Color,
    pub selected_row_style_fg: Color,
    pub selected_cell_style_fg: Color,
    pub footer_border_color: Color,
}

impl TableColors {
    pub const fn new(color: &tailwind::Palette) -> Self {
        Self {
            buffer_bg: tailwind::SLATE.c950,
            header_bg: color.c900,
            header_fg: tailwind::SLATE.c200,
            row_fg: tailwind::SLATE.c200,
            selected_row_style_fg: color.c400,
            selected_cell_style_fg: color.c600,
            footer_border_color: color.c400,
        }
    }
}
