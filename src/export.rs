use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use csv::Writer;
use serde::Serialize;

use crate::model::{ProcessListResult, ProcessRecord};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Yaml,
}

impl ExportFormat {
    pub fn next(self) -> Self {
        match self {
            ExportFormat::Json => ExportFormat::Csv,
            ExportFormat::Csv => ExportFormat::Yaml,
            ExportFormat::Yaml => ExportFormat::Json,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }
}

/// Writes a list result in the given format.
///
/// JSON and YAML carry the whole `{processes, error}` shape, CSV only the
/// process rows.
pub fn write_result(
    writer: &mut dyn Write,
    result: &ProcessListResult,
    format: ExportFormat,
) -> io::Result<()> {
    match format {
        ExportFormat::Json => write_json(writer, result),
        ExportFormat::Yaml => write_yaml(writer, result),
        ExportFormat::Csv => write_csv(writer, result.processes.as_deref().unwrap_or_default()),
    }
}

/// Writes a snapshot under `<output_dir>/snapshots/processes-<timestamp>.<ext>`
/// and returns the created path.
pub fn export_snapshot(
    result: &ProcessListResult,
    format: ExportFormat,
    output_dir: Option<&Path>,
) -> io::Result<PathBuf> {
    let base_dir = output_dir.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let snapshots_dir = base_dir.join("snapshots");
    std::fs::create_dir_all(&snapshots_dir)?;

    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let path = snapshots_dir.join(format!("processes-{ts}.{}", format.extension()));

    let mut file = File::create(&path)?;
    write_result(&mut file, result, format)?;

    Ok(path)
}

fn write_csv(writer: &mut dyn Write, entries: &[ProcessRecord]) -> io::Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["PID", "Label"])?;

    for p in entries {
        wtr.write_record([p.pid.to_string(), p.label.clone()])?;
    }
    wtr.flush()
}

fn write_json<T: Serialize>(writer: &mut dyn Write, data: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")
}

fn write_yaml<T: Serialize>(writer: &mut dyn Write, data: &T) -> io::Result<()> {
    let yaml = serde_yaml::to_string(data).map_err(io::Error::other)?;
    writer.write_all(yaml.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessError;

    fn sample() -> ProcessListResult {
        ProcessListResult::from(Ok(vec![
            ProcessRecord::new(1, "/sbin/init"),
            ProcessRecord::new(812, "node, server.js"),
        ]))
    }

    fn render(result: &ProcessListResult, format: ExportFormat) -> String {
        let mut out = Vec::new();
        write_result(&mut out, result, format).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn csv_quotes_labels() {
        assert_eq!(
            render(&sample(), ExportFormat::Csv),
            "PID,Label\n1,/sbin/init\n812,\"node, server.js\"\n"
        );
    }

    #[test]
    fn json_keeps_result_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&render(&sample(), ExportFormat::Json)).unwrap();
        assert_eq!(json["processes"][1], serde_json::json!([812, "node, server.js"]));
        assert!(json["error"].is_null());
    }

    #[test]
    fn yaml_reports_errors() {
        let failed = ProcessListResult::from(Err(ProcessError::UnsupportedPlatform));
        let yaml = render(&failed, ExportFormat::Yaml);
        assert!(yaml.contains("processes: null"), "{yaml}");
        assert!(yaml.contains("error: Operating system is not supported"), "{yaml}");
    }

    #[test]
    fn exports_to_snapshots_dir() {
        let dir = std::env::temp_dir().join(format!("pid-sweep-export-{}", std::process::id()));

        let path = export_snapshot(&sample(), ExportFormat::Csv, Some(dir.as_path())).unwrap();

        assert!(path.starts_with(dir.join("snapshots")));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("csv"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("PID,Label\n"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn format_cycle() {
        assert_eq!(ExportFormat::Json.next(), ExportFormat::Csv);
        assert_eq!(ExportFormat::Csv.next(), ExportFormat::Yaml);
        assert_eq!(ExportFormat::Yaml.next(), ExportFormat::Json);
    }
}
