//! Configuration-driven extraction and merge of single-record workbooks.
//!
//! A merge reads one row per input file (one cell per mapping entry), stacks
//! the rows under the mapping's header names and writes a new workbook whose
//! name never clobbers an existing file. Unreadable inputs are reported and
//! skipped; they never abort the batch.

pub mod naming;
pub mod progress;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use tracing::{debug, info, instrument, warn};

use crate::cellmerge::tools::error::{Result, ToolError};
use crate::cellmerge::tools::io::{excel_read, excel_write};
use crate::cellmerge::tools::model::{FileFailure, HeaderMapping, MergeResult, MergedTable};

pub use naming::{OutputNaming, base_file_name, folder_label, timestamped_file_name};
pub use progress::{
    FileStatus, MergeEvent, MergeObserver, NoopObserver, estimate_remaining, format_hms,
    progress_percent,
};

/// Extensions, compared case-insensitively, of the files picked up from the
/// source directory.
pub const SPREADSHEET_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Upper bound on timestamp-suffixed names tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1_000;

/// A single merge invocation.
#[derive(Debug, Clone)]
pub struct MergeJob {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub mapping: HeaderMapping,
    pub naming: OutputNaming,
}

impl MergeJob {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        mapping: HeaderMapping,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            mapping,
            naming: OutputNaming::default(),
        }
    }

    pub fn with_naming(mut self, naming: OutputNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Runs the merge to completion, reporting progress to `observer`.
    #[instrument(
        level = "info",
        skip_all,
        fields(source = %self.source_dir.display(), output = %self.output_dir.display())
    )]
    pub fn run<O: MergeObserver + ?Sized>(&self, observer: &mut O) -> Result<MergeResult> {
        let inputs = discover_inputs(&self.source_dir)?;
        let total = inputs.len();
        info!(file_count = total, columns = self.mapping.len(), "merging workbooks");
        observer.on_event(&MergeEvent::Started { total });

        let (table, failures) = self.extract_rows(&inputs, observer);
        let row_count = table.row_count();

        let output_path = self.write_output(&table)?;
        info!(
            output = %output_path.display(),
            row_count,
            skipped = failures.len(),
            "merged workbook written"
        );
        observer.on_event(&MergeEvent::Finished {
            output_path: output_path.clone(),
            row_count,
        });

        Ok(MergeResult {
            output_path,
            row_count,
            failures,
        })
    }

    fn extract_rows<O: MergeObserver + ?Sized>(
        &self,
        inputs: &[PathBuf],
        observer: &mut O,
    ) -> (MergedTable, Vec<FileFailure>) {
        let started = Instant::now();
        let total = inputs.len();
        let mut table = MergedTable::with_columns(self.mapping.column_names());
        let mut failures = Vec::new();

        for (index, path) in inputs.iter().enumerate() {
            let file_name = display_name(path);
            match excel_read::read_row(path, &self.mapping) {
                Ok(row) => {
                    debug!(file = %file_name, "row extracted");
                    table.rows.push(row);
                }
                Err(error) => {
                    let error = ToolError::FileRead {
                        file: file_name.clone(),
                        reason: error.to_string(),
                    };
                    let failure = FileFailure {
                        file_name: file_name.clone(),
                        reason: error.to_string(),
                    };
                    warn!(file = %failure.file_name, reason = %failure.reason, "skipping file");
                    observer.on_event(&MergeEvent::FileFailed(failure.clone()));
                    failures.push(failure);
                }
            }

            let processed = index + 1;
            observer.on_event(&MergeEvent::Progress {
                percent: progress_percent(processed, total),
            });
            observer.on_event(&MergeEvent::Status(FileStatus {
                file_name,
                processed,
                total,
                remaining: estimate_remaining(started.elapsed(), processed, total),
            }));
        }

        (table, failures)
    }

    fn write_output(&self, table: &MergedTable) -> Result<PathBuf> {
        let write_failed = |path: &Path, reason: String| ToolError::WriteFailed {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = excel_write::render_table(table)
            .map_err(|err| write_failed(&self.output_dir, err.to_string()))?;
        fs::create_dir_all(&self.output_dir)
            .map_err(|err| write_failed(&self.output_dir, err.to_string()))?;

        let folder = folder_label(&self.source_dir);
        let timestamp = Local::now().format(naming::TIMESTAMP_FORMAT).to_string();

        for attempt in 0..=MAX_NAME_ATTEMPTS {
            let path = naming::candidate_path(
                &self.output_dir,
                &folder,
                table.row_count(),
                &timestamp,
                attempt,
                &self.naming,
            );
            match excel_write::write_new_file(&path, &bytes) {
                Ok(()) => return Ok(path),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "output name taken");
                }
                Err(err) => return Err(write_failed(&path, err.to_string())),
            }
        }

        Err(write_failed(
            &self.output_dir,
            "no free output file name".to_string(),
        ))
    }
}

/// Merges every workbook in `source_dir` into a new workbook in `output_dir`
/// using the default output naming.
pub fn merge<O: MergeObserver + ?Sized>(
    source_dir: &Path,
    output_dir: &Path,
    mapping: &HeaderMapping,
    observer: &mut O,
) -> Result<MergeResult> {
    MergeJob::new(source_dir, output_dir, mapping.clone()).run(observer)
}

/// Lists the spreadsheet files directly inside `source_dir`, sorted by name.
/// Fails with [`ToolError::NoInputFiles`] when there are none.
pub fn discover_inputs(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(source_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && has_spreadsheet_extension(&path) {
            inputs.push(path);
        }
    }
    if inputs.is_empty() {
        return Err(ToolError::NoInputFiles(source_dir.to_path_buf()));
    }
    inputs.sort_by(|lhs, rhs| lhs.file_name().cmp(&rhs.file_name()));
    Ok(inputs)
}

fn has_spreadsheet_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_ignores_case() {
        assert!(has_spreadsheet_extension(Path::new("a.xlsx")));
        assert!(has_spreadsheet_extension(Path::new("B.XLS")));
        assert!(has_spreadsheet_extension(Path::new("c.XlSx")));
        assert!(!has_spreadsheet_extension(Path::new("notes.csv")));
        assert!(!has_spreadsheet_extension(Path::new("xlsx")));
        assert!(!has_spreadsheet_extension(Path::new("report.xlsx.bak")));
    }
}
