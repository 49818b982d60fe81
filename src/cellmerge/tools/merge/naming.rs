use std::path::{Path, PathBuf};

/// Pieces of the human-readable output file name
/// `<folder>_<merged_marker>_<rows><unit_marker>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    pub merged_marker: String,
    pub unit_marker: String,
    pub extension: String,
}

impl Default for OutputNaming {
    fn default() -> Self {
        Self {
            merged_marker: "merged".to_string(),
            unit_marker: "rows".to_string(),
            extension: "xlsx".to_string(),
        }
    }
}

/// Wall-clock format appended to a colliding output name.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// File name used when nothing collides, e.g. `north_merged_12rows.xlsx`.
pub fn base_file_name(folder: &str, row_count: usize, naming: &OutputNaming) -> String {
    format!(
        "{folder}_{}_{row_count}{}.{}",
        naming.merged_marker, naming.unit_marker, naming.extension
    )
}

/// Collision fallback carrying the merge timestamp, plus a counter when the
/// timestamped name is itself taken.
pub fn timestamped_file_name(
    folder: &str,
    row_count: usize,
    timestamp: &str,
    attempt: u32,
    naming: &OutputNaming,
) -> String {
    let counter = if attempt == 0 {
        String::new()
    } else {
        format!("_{attempt}")
    };
    format!(
        "{folder}_{}_{row_count}{}_{timestamp}{counter}.{}",
        naming.merged_marker, naming.unit_marker, naming.extension
    )
}

/// Last segment of the source directory. Paths such as `.` or `dir/..` are
/// resolved against the filesystem first.
pub fn folder_label(source_dir: &Path) -> String {
    let from_path = |path: &Path| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty())
    };
    from_path(source_dir)
        .filter(|name| name != "." && name != "..")
        .or_else(|| {
            source_dir
                .canonicalize()
                .ok()
                .and_then(|path| from_path(&path))
        })
        .unwrap_or_else(|| "root".to_string())
}

/// Candidate output paths in the order they are tried.
pub(crate) fn candidate_path(
    output_dir: &Path,
    folder: &str,
    row_count: usize,
    timestamp: &str,
    attempt: u32,
    naming: &OutputNaming,
) -> PathBuf {
    let file_name = match attempt {
        0 => base_file_name(folder, row_count, naming),
        n => timestamped_file_name(folder, row_count, timestamp, n - 1, naming),
    };
    output_dir.join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_follows_pattern() {
        let naming = OutputNaming::default();
        assert_eq!(base_file_name("north", 12, &naming), "north_merged_12rows.xlsx");

        let localized = OutputNaming {
            merged_marker: "集合".into(),
            unit_marker: "条".into(),
            extension: "xlsx".into(),
        };
        assert_eq!(base_file_name("华东", 3, &localized), "华东_集合_3条.xlsx");
    }

    #[test]
    fn timestamped_name_inserts_suffix_before_extension() {
        let naming = OutputNaming::default();
        assert_eq!(
            timestamped_file_name("north", 2, "20261016_093000", 0, &naming),
            "north_merged_2rows_20261016_093000.xlsx"
        );
        assert_eq!(
            timestamped_file_name("north", 2, "20261016_093000", 3, &naming),
            "north_merged_2rows_20261016_093000_3.xlsx"
        );
    }

    #[test]
    fn candidates_start_with_base_name() {
        let naming = OutputNaming::default();
        let out = Path::new("out");
        assert_eq!(
            candidate_path(out, "src", 1, "T", 0, &naming),
            out.join("src_merged_1rows.xlsx")
        );
        assert_eq!(
            candidate_path(out, "src", 1, "T", 1, &naming),
            out.join("src_merged_1rows_T.xlsx")
        );
        assert_eq!(
            candidate_path(out, "src", 1, "T", 2, &naming),
            out.join("src_merged_1rows_T_1.xlsx")
        );
    }

    #[test]
    fn folder_label_uses_last_segment() {
        assert_eq!(folder_label(Path::new("/data/reports/north")), "north");
        assert_eq!(folder_label(Path::new("/data/reports/north/")), "north");
        let cwd = std::env::current_dir().unwrap();
        let expected = cwd.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(folder_label(Path::new(".")), expected);
    }
}
