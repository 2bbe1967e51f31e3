use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use waypoint_ddm_wasm::converter::to_feature_collection;
use waypoint_ddm_wasm::error::WaypointError;
use waypoint_ddm_wasm::extractor::extract_records;
use waypoint_ddm_wasm::options::ExtractOptions;
use waypoint_ddm_wasm::table::{TableView, WaypointTable};
use waypoint_ddm_wasm::waypoint_types::{COLUMN_HEADERS, WaypointRow};

/// Show the waypoints of an XML flight plan in Degrees + Decimal Minutes.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// XML file to read
    pub file: PathBuf,

    /// Print one column, newline-joined, instead of the table
    #[arg(long, value_enum)]
    pub copy: Option<Column>,

    /// Print the waypoints as GeoJSON instead of the table
    #[arg(long, conflicts_with = "copy")]
    pub geojson: bool,

    /// Substring removed from every waypoint name
    #[arg(long, default_value = "Venom1")]
    pub strip_token: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Column {
    Name,
    Latitude,
    Longitude,
    Altitude,
}

impl Column {
    fn index(self) -> usize {
        match self {
            Column::Name => 0,
            Column::Latitude => 1,
            Column::Longitude => 2,
            Column::Altitude => 3,
        }
    }
}

/// Terminal stand-in for the table window: stdout is the clipboard,
/// notifications go to stderr.
#[derive(Default)]
struct TerminalView {
    rows: Vec<WaypointRow>,
}

impl TableView for TerminalView {
    fn replace_rows(&mut self, rows: &[WaypointRow]) {
        self.rows = rows.to_vec();
    }

    fn show_error(&mut self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }

    fn show_info(&mut self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }

    fn set_clipboard(&mut self, text: &str) {
        println!("{text}");
    }
}

pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = ExtractOptions {
        strip_name_token: cli.strip_token.clone(),
        ..ExtractOptions::default()
    };

    if cli.geojson {
        return match geojson(&cli.file, &options) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e.user_message());
                ExitCode::FAILURE
            }
        };
    }

    let mut table = WaypointTable::new(options);
    let mut view = TerminalView::default();
    if table.open_file(&cli.file, &mut view).is_err() {
        return ExitCode::FAILURE;
    }

    match cli.copy {
        Some(column) => {
            table.copy_column(column.index(), &mut view);
        }
        None => print!("{}", render_table(&view.rows)),
    }
    ExitCode::SUCCESS
}

fn geojson(path: &Path, options: &ExtractOptions) -> Result<String, WaypointError> {
    let xml = std::fs::read_to_string(path)?;
    let records = extract_records(&xml, options)?;
    let fc = to_feature_collection(&records, options);
    Ok(serde_json::to_string_pretty(&fc)?)
}

/// Left-aligned columns under the four headers, two spaces apart.
fn render_table(rows: &[WaypointRow]) -> String {
    let mut widths = COLUMN_HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, value) in widths.iter_mut().zip(row.columns()) {
            *width = (*width).max(value.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: [&str; 4]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    };

    push_line(COLUMN_HEADERS);
    for row in rows {
        push_line(row.columns());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_aligns_columns() {
        let rows = vec![WaypointRow {
            name: "Alpha".to_string(),
            latitude: "47°30.000' N".to_string(),
            longitude: "122°15.000' W".to_string(),
            altitude: "1500.00 ft".to_string(),
        }];
        let out = render_table(&rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Name   Latitude (DDM)  Longitude (DDM)  Altitude (ft)"));
        assert!(lines[1].starts_with("Alpha  47°30.000' N    122°15.000' W    1500.00 ft"));
    }

    #[test]
    fn test_column_indices_match_headers() {
        assert_eq!(COLUMN_HEADERS[Column::Name.index()], "Name");
        assert_eq!(COLUMN_HEADERS[Column::Altitude.index()], "Altitude (ft)");
    }

    #[test]
    fn test_cli_parses_copy_flag() {
        let cli = Cli::try_parse_from(["waypoint-ddm", "plan.xml", "--copy", "latitude"]).unwrap();
        assert_eq!(cli.copy, Some(Column::Latitude));
        assert_eq!(cli.strip_token, "Venom1");
        assert!(!cli.geojson);
    }

    #[test]
    fn test_geojson_output_is_pretty_json() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mission.xml");
        let json = geojson(&path, &ExtractOptions::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_geojson_reports_malformed_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/malformed.xml");
        let err = geojson(&path, &ExtractOptions::default()).unwrap_err();
        assert!(err.user_message().starts_with("Failed to parse XML:"));
    }
}
