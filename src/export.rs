//! Export of completed timers to a JSON file
//!
//! Builds the history document and writes it as `timers.json` into the
//! user's downloads directory, falling back to documents and then the
//! current directory. Only completed timers appear; a category that has
//! none yet still shows up with an empty list.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::error::ExportError;
use crate::state::Category;

pub const EXPORT_FILE_NAME: &str = "timers.json";

/// One completed timer in the export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTimer {
    pub name: String,
    pub duration: u64,
}

/// One category in the export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportCategory {
    pub name: String,
    pub timers: Vec<ExportTimer>,
}

/// The exported history document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Export date, `DD-MM-YYYY`
    pub date: String,
    pub categories: Vec<ExportCategory>,
}

/// Build the completed-timers view of the collection.
pub fn build_document(categories: &[Category], date: NaiveDate) -> ExportDocument {
    let categories = categories
        .iter()
        .map(|category| ExportCategory {
            name: category.name.clone(),
            timers: category
                .completed_timers()
                .map(|timer| ExportTimer {
                    name: timer.name.clone(),
                    duration: timer.duration,
                })
                .collect(),
        })
        .collect();

    ExportDocument {
        date: date.format("%d-%m-%Y").to_string(),
        categories,
    }
}

/// Returns the default export directory.
/// Prefers downloads, then documents, then the current directory.
pub fn default_export_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::document_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Write the document as pretty-printed JSON, returning the file path.
pub async fn write_export(
    document: &ExportDocument,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(EXPORT_FILE_NAME);
    let payload = serde_json::to_string_pretty(document)?;

    fs::write(&path, payload).await.map_err(|e| ExportError::Io {
        path: path.clone(),
        source: e,
    })?;

    info!("Exported completed timers to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Timer;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    #[test]
    fn document_contains_only_completed_timers() {
        // Two categories, one timer completed and one still running: the
        // completed timer is the only one exported.
        let mut work = Category::with_timer("Work", Timer::new("Focus", 300));
        work.timers[0].complete();
        let mut home = Category::with_timer("Home", Timer::new("Laundry", 900));
        home.timers[0].running = true;
        home.recompute_running();

        let document = build_document(&[work, home], date());
        assert_eq!(document.categories.len(), 2);
        assert_eq!(
            document.categories[0].timers,
            vec![ExportTimer {
                name: "Focus".to_string(),
                duration: 300,
            }]
        );
        assert!(document.categories[1].timers.is_empty());
    }

    #[test]
    fn date_uses_day_month_year_with_dashes() {
        let document = build_document(&[], date());
        assert_eq!(document.date, "07-08-2026");
    }

    #[tokio::test]
    async fn written_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut work = Category::with_timer("Work", Timer::new("Focus", 300));
        work.timers[0].complete();

        let document = build_document(&[work], date());
        let path = write_export(&document, dir.path()).await.unwrap();
        assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: ExportDocument = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, document);
    }
}
