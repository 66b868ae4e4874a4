mod app;
mod ui;
mod util;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use pid_sweep::config::ConfigArgs;
use pid_sweep::export::{ExportFormat, write_result};
use pid_sweep::{Config, Platform, ProcessListResult, ProcessManager};
use serde::Serialize;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use crate::app::App;

pub const ITEM_HEIGHT: u16 = 1;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationMode {
    #[default]
    Normal,
    Editing,
}

/// List and kill processes on Linux, macOS and Windows
#[derive(Debug, Parser)]
#[command(name = "pid-sweep", version, about)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Append logs to this file. The TUI does not log without it
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every running process
    List {
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },
    /// Terminate a process
    Kill {
        /// Process identifier
        #[arg(allow_hyphen_values = true)]
        pid: String,
    },
    /// Report whether a process is still running
    Status {
        /// Process identifier
        #[arg(allow_hyphen_values = true)]
        pid: String,
    },
    /// Interactive process table (default)
    Tui {
        /// Directory that receives `snapshots/`
        #[arg(long, value_name = "DIR", default_value = ".")]
        snapshot_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ListFormat {
    Table,
    Json,
    Yaml,
    Csv,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Command::Tui {
        snapshot_dir: PathBuf::from("."),
    });
    init_logging(cli.log_file.as_ref(), matches!(command, Command::Tui { .. }))?;

    let config = Config::from(cli.config);
    let manager = ProcessManager::new(Platform::current(), &config)?;
    let runtime = Runtime::new().wrap_err("failed to start the async runtime")?;

    match command {
        Command::List { format } => {
            let result = runtime.block_on(manager.list_processes());
            print_list(&result, format)?;
            Ok(exit_code(result.error.as_ref()))
        }
        Command::Kill { pid } => {
            let result = runtime.block_on(manager.kill_process(pid));
            print_json(&result)?;
            Ok(exit_code(result.error.as_ref()))
        }
        Command::Status { pid } => {
            let result = runtime.block_on(manager.is_process_running(pid));
            print_json(&result)?;
            Ok(exit_code(result.error.as_ref()))
        }
        Command::Tui { snapshot_dir } => {
            let terminal = ratatui::init();
            let result = App::new(runtime, manager, snapshot_dir).run(terminal);
            ratatui::restore();
            result.map(|()| ExitCode::SUCCESS)
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>, tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("cannot open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // Writing to the terminal would corrupt the TUI
        None if tui => {}
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn exit_code(error: Option<&String>) -> ExitCode {
    match error {
        Some(_) => ExitCode::FAILURE,
        None => ExitCode::SUCCESS,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

fn print_list(result: &ProcessListResult, format: ListFormat) -> Result<()> {
    let mut stdout = io::stdout().lock();
    let format = match format {
        ListFormat::Json => ExportFormat::Json,
        ListFormat::Yaml => ExportFormat::Yaml,
        ListFormat::Csv => ExportFormat::Csv,
        ListFormat::Table => return write_table(&mut stdout, result),
    };
    write_result(&mut stdout, result, format)?;
    Ok(())
}

fn write_table(out: &mut dyn Write, result: &ProcessListResult) -> Result<()> {
    if let Some(error) = &result.error {
        eprintln!("error: {error}");
        return Ok(());
    }

    let processes = result.processes.as_deref().unwrap_or_default();
    let width = usize::from(util::pid_column_width(processes));
    writeln!(out, "{:>width$} {}", "PID", "COMMAND", width = width - 1)?;
    for p in processes {
        writeln!(out, "{:>width$} {}", p.pid, p.label, width = width - 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pid_sweep::ProcessRecord;

    #[test]
    fn cli_defaults_to_tui() {
        let cli = Cli::try_parse_from(["pid-sweep"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn force_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["pds", "kill", "1234", "--force"]).unwrap();
        assert!(cli.config.force);
        assert!(matches!(cli.command, Some(Command::Kill { pid }) if pid == "1234"));
    }

    #[test]
    fn list_format_parses() {
        let cli = Cli::try_parse_from(["pds", "list", "--format", "yaml"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::List {
                format: ListFormat::Yaml
            })
        ));
    }

    #[test]
    fn table_aligns_pids() {
        let result = ProcessListResult::from(Ok(vec![
            ProcessRecord::new(1, "init"),
            ProcessRecord::new(31337, "sshd"),
        ]));
        let mut out = Vec::new();
        write_table(&mut out, &result).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "  PID COMMAND\n    1 init\n31337 sshd\n"
        );
    }
}
