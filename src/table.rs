use std::path::Path;

use crate::error::WaypointError;
use crate::extractor::{extract_waypoints_from_path, extract_waypoints_with};
use crate::options::ExtractOptions;
use crate::waypoint_types::WaypointRow;

/// The display side of the table: whatever renders rows, shows notifications and
/// owns the clipboard.
pub trait TableView {
    /// Replace every displayed row.
    fn replace_rows(&mut self, rows: &[WaypointRow]);
    fn show_error(&mut self, title: &str, message: &str);
    fn show_info(&mut self, title: &str, message: &str);
    fn set_clipboard(&mut self, text: &str);
}

/// Values of column `index` in row order, joined by newlines.
///
/// Rows without that column contribute nothing.
pub fn copy_column(rows: &[WaypointRow], index: usize) -> String {
    rows.iter()
        .filter_map(|row| row.column(index))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Rows currently shown, replaced wholesale on every load.
#[derive(Debug, Default)]
pub struct WaypointTable {
    rows: Vec<WaypointRow>,
    options: ExtractOptions,
}

impl WaypointTable {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            rows: Vec::new(),
            options,
        }
    }

    pub fn rows(&self) -> &[WaypointRow] {
        &self.rows
    }

    /// Load rows from an XML file. Returns the number of rows shown.
    pub fn open_file(
        &mut self,
        path: impl AsRef<Path>,
        view: &mut impl TableView,
    ) -> Result<usize, WaypointError> {
        self.clear(view);
        let result = extract_waypoints_from_path(path, &self.options);
        self.populate(result, view)
    }

    /// Load rows from XML text. Returns the number of rows shown.
    pub fn load_str(&mut self, xml: &str, view: &mut impl TableView) -> Result<usize, WaypointError> {
        self.clear(view);
        let result = extract_waypoints_with(xml, &self.options);
        self.populate(result, view)
    }

    /// Put one column on the clipboard and confirm it.
    pub fn copy_column(&self, index: usize, view: &mut impl TableView) -> String {
        let text = copy_column(&self.rows, index);
        view.set_clipboard(&text);
        view.show_info("Copied", &format!("Copied column {} to clipboard.", index + 1));
        text
    }

    fn clear(&mut self, view: &mut impl TableView) {
        self.rows.clear();
        view.replace_rows(&self.rows);
    }

    fn populate(
        &mut self,
        result: Result<Vec<WaypointRow>, WaypointError>,
        view: &mut impl TableView,
    ) -> Result<usize, WaypointError> {
        match result {
            Ok(rows) => {
                self.rows = rows;
                view.replace_rows(&self.rows);
                Ok(self.rows.len())
            }
            Err(e) => {
                tracing::warn!("Failed to load waypoints: {e}");
                view.show_error("Error", &e.user_message());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingView {
        rows: Vec<WaypointRow>,
        replace_calls: usize,
        errors: Vec<(String, String)>,
        infos: Vec<(String, String)>,
        clipboard: Option<String>,
    }

    impl TableView for RecordingView {
        fn replace_rows(&mut self, rows: &[WaypointRow]) {
            self.rows = rows.to_vec();
            self.replace_calls += 1;
        }

        fn show_error(&mut self, title: &str, message: &str) {
            self.errors.push((title.to_string(), message.to_string()));
        }

        fn show_info(&mut self, title: &str, message: &str) {
            self.infos.push((title.to_string(), message.to_string()));
        }

        fn set_clipboard(&mut self, text: &str) {
            self.clipboard = Some(text.to_string());
        }
    }

    const THREE_WAYPOINTS: &str = r#"<Plan>
  <Waypoint><Name>A</Name><Position><Latitude>47.5</Latitude><Longitude>8</Longitude><Altitude>100</Altitude></Position></Waypoint>
  <Waypoint><Name>B</Name><Position><Latitude>-33.25</Latitude><Longitude>151</Longitude><Altitude>200</Altitude></Position></Waypoint>
  <Waypoint><Name>C</Name><Position><Latitude>0</Latitude><Longitude>-0.5</Longitude><Altitude>300</Altitude></Position></Waypoint>
</Plan>"#;

    fn row(name: &str) -> WaypointRow {
        WaypointRow {
            name: name.to_string(),
            latitude: format!("{name} lat"),
            longitude: format!("{name} lon"),
            altitude: format!("{name} alt"),
        }
    }

    #[test]
    fn test_copy_column_joins_in_row_order() {
        let rows = vec![row("A"), row("B"), row("C")];
        assert_eq!(copy_column(&rows, 1), "A lat\nB lat\nC lat");
        assert_eq!(copy_column(&rows, 0), "A\nB\nC");
    }

    #[test]
    fn test_copy_column_out_of_range_is_empty() {
        let rows = vec![row("A"), row("B")];
        assert_eq!(copy_column(&rows, 4), "");
        assert_eq!(copy_column(&[], 0), "");
    }

    #[test]
    fn test_load_and_copy_latitude_column() {
        let mut table = WaypointTable::default();
        let mut view = RecordingView::default();

        let count = table.load_str(THREE_WAYPOINTS, &mut view).unwrap();
        assert_eq!(count, 3);
        assert_eq!(view.rows.len(), 3);

        let text = table.copy_column(1, &mut view);
        assert_eq!(text, "47°30.000' N\n33°15.000' S\n0°0.000' N");
        assert_eq!(view.clipboard.as_deref(), Some(text.as_str()));
        assert_eq!(
            view.infos,
            vec![(
                "Copied".to_string(),
                "Copied column 2 to clipboard.".to_string()
            )]
        );
    }

    #[test]
    fn test_malformed_load_clears_previous_rows() {
        let mut table = WaypointTable::default();
        let mut view = RecordingView::default();
        table.load_str(THREE_WAYPOINTS, &mut view).unwrap();

        let result = table.load_str("<Plan><Waypoint></Plan>", &mut view);
        assert!(result.is_err());
        assert!(table.rows().is_empty());
        assert!(view.rows.is_empty());
        assert_eq!(view.errors.len(), 1);
        assert_eq!(view.errors[0].0, "Error");
        assert!(view.errors[0].1.starts_with("Failed to parse XML:\n"));
    }

    #[test]
    fn test_reload_replaces_rows() {
        let mut table = WaypointTable::default();
        let mut view = RecordingView::default();
        table.load_str(THREE_WAYPOINTS, &mut view).unwrap();
        table.load_str("<Plan/>", &mut view).unwrap();
        assert!(view.rows.is_empty());
        // cleared, then populated, for each load
        assert_eq!(view.replace_calls, 4);
    }

    #[test]
    fn test_missing_file_reports_one_error() {
        let mut table = WaypointTable::default();
        let mut view = RecordingView::default();
        let result = table.open_file("/nonexistent/plan.xml", &mut view);
        assert!(matches!(result, Err(WaypointError::Io(_))));
        assert_eq!(view.errors.len(), 1);
        assert!(view.rows.is_empty());
    }
}
