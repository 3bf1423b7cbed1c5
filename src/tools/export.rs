//! Export formatting
//!
//! CSV and tab-separated renderings of planner and converter tables.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

/// Response for the CSV export tools
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub file_name: String,
    /// Where the file was written, if a directory was given
    pub file_path: Option<String>,
    pub row_count: usize,
    pub content: String,
}

/// Quote one CSV field, doubling embedded quotes
pub fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Join fields into one fully quoted CSV line
pub fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Header plus rows, newline separated, no trailing newline
pub fn join_lines(header: String, rows: impl IntoIterator<Item = String>) -> String {
    std::iter::once(header)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

/// File name like `ingredient_conversions_2026-01-13.csv`
pub fn dated_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

/// Today's date in UTC
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Write an export into `dir`, creating the directory if needed
pub fn write_export(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create directory {}: {}", dir.display(), e))?;
    let path = dir.join(file_name);
    std::fs::write(&path, content)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    tracing::info!(path = %path.display(), bytes = content.len(), "wrote export");
    Ok(path)
}

/// Build the export response, writing the file when a directory is given
pub fn finish_export(
    output_dir: Option<&str>,
    file_name: String,
    row_count: usize,
    content: String,
) -> Result<ExportResponse, String> {
    let file_path = match output_dir.map(str::trim).filter(|d| !d.is_empty()) {
        Some(dir) => Some(write_export(Path::new(dir), &file_name, &content)?.display().to_string()),
        None => None,
    };
    Ok(ExportResponse {
        file_name,
        file_path,
        row_count,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("Flour"), "\"Flour\"");
        assert_eq!(csv_field("12\" pan"), "\"12\"\" pan\"");
        assert_eq!(csv_line(&["a", "b,c"]), "\"a\",\"b,c\"");
    }

    #[test]
    fn test_dated_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 13).unwrap();
        assert_eq!(
            dated_file_name("ingredient_conversions", date),
            "ingredient_conversions_2026-01-13.csv"
        );
    }

    #[test]
    fn test_join_lines_has_no_trailing_newline() {
        let text = join_lines("H".to_string(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(text, "H\na\nb");
    }

    #[test]
    fn test_write_export() {
        let dir = std::env::temp_dir().join(format!("chef-tools-export-{}", std::process::id()));
        let path = write_export(&dir, "out.csv", "\"x\"").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "\"x\"");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
