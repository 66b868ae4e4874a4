use std::path::PathBuf;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use pid_sweep::export::export_snapshot;
use pid_sweep::{KillMode, ProcessListResult, ProcessManager, ProcessRecord};
use ratatui::layout::{Constraint, Layout};
use ratatui::{DefaultTerminal, Frame};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::ApplicationMode;
use crate::ui::footer_component::FooterComponent;
use crate::ui::keybindings_component::KeybindingsComponent;
use crate::ui::kill_process_component::KillComponent;
use crate::ui::process_search_component::ProcessSearchComponent;
use crate::ui::process_table_component::ProcessTableComponent;
use crate::ui::theme::Theme;
use crate::util::pid_column_width;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const REFRESH_INTERVAL: Duration = Duration::from_secs(2);

pub enum AppControlFlow {
    Continue,
    Exit,
}

/// Interactive process table.
///
/// Facade calls run on the owned runtime with `block_on`, so the draw loop
/// itself stays synchronous.
pub struct App {
    runtime: Runtime,
    manager: ProcessManager,
    snapshot_dir: PathBuf,

    mode: ApplicationMode,
    /// Unfiltered result of the last refresh
    last_result: ProcessListResult,
    last_refresh: Option<Instant>,

    table: ProcessTableComponent,
    search: ProcessSearchComponent,
    kill: KillComponent,
    help: KeybindingsComponent,
    footer: FooterComponent,
    theme: Theme,
}

impl App {
    pub fn new(runtime: Runtime, manager: ProcessManager, snapshot_dir: PathBuf) -> Self {
        Self {
            runtime,
            manager,
            snapshot_dir,
            mode: ApplicationMode::Normal,
            last_result: ProcessListResult {
                processes: Some(Vec::new()),
                error: None,
            },
            last_refresh: None,
            table: ProcessTableComponent::default(),
            search: ProcessSearchComponent::default(),
            kill: KillComponent::default(),
            help: KeybindingsComponent::default(),
            footer: FooterComponent::default(),
            theme: Theme::default(),
        }
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        loop {
            if self.refresh_due() {
                self.refresh();
            }

            terminal.draw(|frame| self.render(frame))?;

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && matches!(self.handle_key_event(key), AppControlFlow::Exit)
                {
                    return Ok(());
                }
            }
        }
    }

    fn refresh_due(&self) -> bool {
        // Keep the confirmed target stable while the popup is open
        !self.kill.display
            && self
                .last_refresh
                .is_none_or(|at| at.elapsed() >= REFRESH_INTERVAL)
    }

    pub fn refresh(&mut self) {
        let result = self.runtime.block_on(self.manager.list_processes());
        self.last_refresh = Some(Instant::now());

        match &result.error {
            Some(error) => self.footer.error(error.clone()),
            None => self.apply_filter(result.processes.as_deref().unwrap_or_default()),
        }
        self.last_result = result;
    }

    fn apply_filter(&mut self, processes: &[ProcessRecord]) {
        self.table.pid_width = pid_column_width(processes);
        self.table.set_items(self.search.filter(processes));
    }

    fn reapply_filter(&mut self) {
        let processes = self.last_result.processes.clone().unwrap_or_default();
        self.apply_filter(&processes);
    }

    fn kill_selected(&mut self) {
        if let Some((target, mode)) = self.kill.confirm() {
            let result = self
                .runtime
                .block_on(self.manager.kill_process_with(target.pid, mode));
            self.refresh();
            match (result.result, result.error) {
                (_, Some(error)) => self.footer.error(format!("PID {}: {error}", target.pid)),
                (Some(message), None) => self.footer.info(message),
                (None, None) => {}
            }
        }
    }

    fn export(&mut self) {
        let format = self.footer.export_format;
        match export_snapshot(&self.last_result, format, Some(self.snapshot_dir.as_path())) {
            Ok(path) => {
                debug!(path = %path.display(), "exported snapshot");
                self.footer.info(format!("Exported to {}", path.display()));
            }
            Err(e) => self.footer.error(format!("Export failed: {e}")),
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> AppControlFlow {
        if key.modifiers == KeyModifiers::CONTROL && matches!(key.code, KeyCode::Char('c' | 'C')) {
            return AppControlFlow::Exit;
        }

        if self.help.display {
            self.handle_help_key(key);
        } else if self.kill.display {
            self.handle_kill_key(key);
        } else {
            match self.mode {
                ApplicationMode::Normal => return self.handle_normal_mode_key(key),
                ApplicationMode::Editing => self.handle_editing_mode_key(key),
            }
        }
        AppControlFlow::Continue
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::F(1) | KeyCode::Char('?' | 'q') | KeyCode::Esc => self.help.toggle(),
            KeyCode::Char('j') | KeyCode::Down => self.help.next_row(),
            KeyCode::Char('k') | KeyCode::Up => self.help.previous_row(),
            _ => {}
        }
    }

    fn handle_kill_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.kill.focus_kill(),
            KeyCode::Right | KeyCode::Char('l') => self.kill.focus_cancel(),
            KeyCode::Tab | KeyCode::BackTab => self.kill.toggle_focus(),
            KeyCode::Enter => self.kill_selected(),
            KeyCode::Esc | KeyCode::Char('q' | 'n') => self.kill.hide(),
            _ => {}
        }
    }

    fn handle_normal_mode_key(&mut self, key: KeyEvent) -> AppControlFlow {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q' | 'Q')) => return AppControlFlow::Exit,

            (KeyModifiers::CONTROL, KeyCode::Char('f' | 'F')) => {
                self.search.toggle();
                if self.search.display {
                    self.mode = ApplicationMode::Editing;
                }
                self.reapply_filter();
            }
            (_, KeyCode::Char('e')) => {
                self.search.display = true;
                self.mode = ApplicationMode::Editing;
            }
            (_, KeyCode::F(1) | KeyCode::Char('?')) => self.help.toggle(),
            (_, KeyCode::F(5) | KeyCode::Char('r')) => self.refresh(),

            (KeyModifiers::SHIFT, KeyCode::PageDown) | (_, KeyCode::End) => self.table.last_row(),
            (KeyModifiers::SHIFT, KeyCode::PageUp) | (_, KeyCode::Home) => self.table.first_row(),
            (_, KeyCode::PageDown) => self.table.page_down(),
            (_, KeyCode::PageUp) => self.table.page_up(),
            (_, KeyCode::Char('j') | KeyCode::Down) => self.table.next_row(),
            (_, KeyCode::Char('k') | KeyCode::Up) => self.table.previous_row(),

            (KeyModifiers::SHIFT, KeyCode::Right) => self.theme.cycle_next(),
            (KeyModifiers::SHIFT, KeyCode::Left) => self.theme.cycle_prev(),

            (_, KeyCode::Char('d') | KeyCode::Delete) => self.confirm_kill(self.manager.kill_mode()),
            (_, KeyCode::Char('D')) => self.confirm_kill(KillMode::Force),

            (_, KeyCode::Char('s')) => self.export(),
            (_, KeyCode::Char('f')) => self.footer.cycle_format(),
            _ => {}
        }
        AppControlFlow::Continue
    }

    fn confirm_kill(&mut self, mode: KillMode) {
        if let Some(item) = self.table.selected().cloned() {
            self.kill.show(item, mode);
        }
    }

    fn handle_editing_mode_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.search.insert_char(c),
            KeyCode::Backspace => self.search.delete_char(),
            KeyCode::Left => self.search.move_cursor_left(),
            KeyCode::Right => self.search.move_cursor_right(),
            KeyCode::Esc | KeyCode::Enter => {
                self.mode = ApplicationMode::Normal;
                return;
            }
            _ => return,
        }
        self.reapply_filter();
    }

    fn summary(&self) -> String {
        let total = self.last_result.processes.as_ref().map_or(0, Vec::len);
        let shown = self.table.items.len();
        let count = if shown == total {
            format!("{total} processes")
        } else {
            format!("{shown} of {total} processes")
        };
        format!(
            "{} | {} | {count}",
            self.manager.platform(),
            self.manager.source_name()
        )
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let search_height = if self.search.display { 3 } else { 0 };
        let [search_area, table_area, footer_area] = Layout::vertical([
            Constraint::Length(search_height),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .areas(area);

        let colors = self.theme.table.clone();

        if self.search.display {
            self.search.render(frame, search_area, &colors, &self.mode);
        }
        self.table.render(frame, table_area, &colors, "Processes");

        let summary = self.summary();
        self.footer.render(frame, footer_area, &colors, &summary);

        self.kill.render(frame, area, &colors);
        if self.help.display {
            self.help.render(frame, area, &colors);
        }
    }
}
