use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::cellmerge::tools::error::{Result, ToolError};
use crate::cellmerge::tools::model::HeaderMapping;

/// File extension of mapping records.
pub const RECORD_EXTENSION: &str = "json";

/// File inside the store directory holding the name of the mapping selected
/// last. Its extension keeps it out of [`MappingStore::list`].
pub const LAST_SELECTED_FILE: &str = "last_mapping.txt";

/// Directory-backed persistence for named [`HeaderMapping`] records, one JSON
/// file per record.
///
/// The store keeps no notion of an "active" mapping; callers hold on to the
/// mapping they loaded and pass it to the merge engine themselves.
#[derive(Debug, Clone)]
pub struct MappingStore {
    root: PathBuf,
}

impl MappingStore {
    /// Opens a store over `directory` without touching the filesystem.
    pub fn open(directory: impl Into<PathBuf>) -> Self {
        Self {
            root: directory.into(),
        }
    }

    /// Creates `directory` if needed, seeds an empty `default_name` record
    /// when it is absent, and returns the store along with that record.
    #[instrument(level = "info", skip_all, fields(directory = %directory.as_ref().display(), default_name = %default_name))]
    pub fn initialize(
        directory: impl AsRef<Path>,
        default_name: &str,
    ) -> Result<(Self, HeaderMapping)> {
        fs::create_dir_all(directory.as_ref())?;
        let store = Self::open(directory.as_ref());
        if !store.exists(default_name)? {
            info!(name = default_name, "creating empty default mapping");
            store.save(&HeaderMapping::new(), default_name)?;
        }
        let mapping = store.load(default_name)?;
        Ok((store, mapping))
    }

    /// Directory holding the records.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record called `name`. The `.json` suffix is optional.
    pub fn record_path(&self, name: &str) -> Result<PathBuf> {
        let stem = record_stem(name)?;
        Ok(self.root.join(format!("{stem}.{RECORD_EXTENSION}")))
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.record_path(name)?.is_file())
    }

    /// Names of every record in the directory, sorted for display.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, name: &str) -> Result<HeaderMapping> {
        let path = self.record_path(name)?;
        if !path.is_file() {
            return Err(ToolError::NotFound(name.to_string()));
        }
        let source = fs::read_to_string(&path)?;
        parse_record(name, &source)
    }

    /// Serialises `mapping` over the record called `name`, replacing any
    /// previous content.
    #[instrument(level = "debug", skip(self, mapping), fields(entries = mapping.len()))]
    pub fn save(&self, mapping: &HeaderMapping, name: &str) -> Result<()> {
        let path = self.record_path(name)?;
        let json_string = serde_json::to_string_pretty(mapping)?;
        fs::write(&path, json_string)?;
        debug!(path = %path.display(), "mapping saved");
        Ok(())
    }

    /// Creates a new, empty record. Fails when `name` is already taken.
    #[instrument(level = "info", skip(self))]
    pub fn create(&self, name: &str) -> Result<HeaderMapping> {
        if self.exists(name)? {
            return Err(ToolError::AlreadyExists(name.to_string()));
        }
        let mapping = HeaderMapping::new();
        self.save(&mapping, name)?;
        Ok(mapping)
    }

    /// Renames a record. Returns `false` without doing anything when `old_name`
    /// does not exist; an existing `new_name` is never overwritten.
    #[instrument(level = "info", skip(self))]
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<bool> {
        let old_path = self.record_path(old_name)?;
        let new_path = self.record_path(new_name)?;
        if !old_path.is_file() {
            debug!("source mapping absent, nothing to rename");
            return Ok(false);
        }
        if old_path == new_path {
            return Ok(true);
        }
        if new_path.exists() {
            return Err(ToolError::AlreadyExists(new_name.to_string()));
        }
        fs::rename(&old_path, &new_path)?;
        Ok(true)
    }

    /// Record name an external file is imported under: its file stem.
    pub fn import_name(external_path: &Path) -> Result<String> {
        let stem = external_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| ToolError::InvalidName(external_path.display().to_string()))?;
        Ok(record_stem(stem)?.to_string())
    }

    /// Like [`MappingStore::import_from`], but fails with
    /// [`ToolError::AlreadyExists`] instead of replacing another record of the
    /// same name. Importing the record's own file stays a no-op.
    #[instrument(level = "info", skip_all, fields(source = %external_path.display()))]
    pub fn import_new(&self, external_path: &Path) -> Result<String> {
        let name = Self::import_name(external_path)?;
        let destination = self.record_path(&name)?;
        if destination.is_file() && !same_file(external_path, &destination) {
            return Err(ToolError::AlreadyExists(name));
        }
        self.import_from(external_path)
    }

    /// Copies an external record into the store under its own file stem and
    /// returns the record name. A record with the same name is overwritten.
    #[instrument(level = "info", skip_all, fields(source = %external_path.display()))]
    pub fn import_from(&self, external_path: &Path) -> Result<String> {
        if !external_path.is_file() {
            return Err(ToolError::NotFound(external_path.display().to_string()));
        }
        let name = Self::import_name(external_path)?;
        let source = fs::read_to_string(external_path)?;
        parse_record(&name, &source)?;

        let destination = self.record_path(&name)?;
        if same_file(external_path, &destination) {
            debug!("record already lives in the store");
            return Ok(name);
        }
        fs::copy(external_path, &destination)?;
        Ok(name)
    }

    /// Copies the record called `name` to `external_path`. Exporting a record
    /// onto its own file is a no-op.
    #[instrument(level = "info", skip(self, external_path), fields(destination = %external_path.display()))]
    pub fn export_to(&self, name: &str, external_path: &Path) -> Result<()> {
        let path = self.record_path(name)?;
        if !path.is_file() {
            return Err(ToolError::NotFound(name.to_string()));
        }
        if same_file(&path, external_path) {
            debug!("destination is the record itself");
            return Ok(());
        }
        fs::copy(&path, external_path)?;
        Ok(())
    }

    /// Remembers `name` as the mapping selected last.
    pub fn remember_selected(&self, name: &str) -> Result<()> {
        let stem = record_stem(name)?;
        fs::write(self.root.join(LAST_SELECTED_FILE), stem)?;
        Ok(())
    }

    /// Mapping selected last, if it is still present in the store.
    pub fn last_selected(&self) -> Result<Option<String>> {
        let path = self.root.join(LAST_SELECTED_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let name = fs::read_to_string(&path)?.trim().to_string();
        match self.exists(&name) {
            Ok(true) => Ok(Some(name)),
            Ok(false) | Err(ToolError::InvalidName(_)) => {
                debug!(%name, "last selected mapping is gone");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// Picks the mapping to use: `requested` when given, otherwise the one
    /// selected last, otherwise `fallback`.
    pub fn resolve_selected(&self, requested: Option<&str>, fallback: &str) -> Result<String> {
        if let Some(name) = requested {
            return Ok(record_stem(name)?.to_string());
        }
        Ok(self.last_selected()?.unwrap_or_else(|| fallback.to_string()))
    }
}

fn record_stem(name: &str) -> Result<&str> {
    let stem = name
        .strip_suffix(&format!(".{RECORD_EXTENSION}"))
        .unwrap_or(name);
    let invalid = stem.trim().is_empty()
        || stem == "."
        || stem == ".."
        || stem.contains(['/', '\\']);
    if invalid {
        return Err(ToolError::InvalidName(name.to_string()));
    }
    Ok(stem)
}

fn parse_record(name: &str, source: &str) -> Result<HeaderMapping> {
    serde_json::from_str(source).map_err(|err| ToolError::Corrupt {
        name: name.to_string(),
        reason: err.to_string(),
    })
}

fn same_file(lhs: &Path, rhs: &Path) -> bool {
    match (lhs.canonicalize(), rhs.canonicalize()) {
        (Ok(lhs), Ok(rhs)) => lhs == rhs,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_stem_accepts_optional_extension() {
        assert_eq!(record_stem("default").unwrap(), "default");
        assert_eq!(record_stem("default.json").unwrap(), "default");
        assert_eq!(record_stem("季度汇总").unwrap(), "季度汇总");
    }

    #[test]
    fn record_stem_rejects_paths() {
        for name in ["", " ", ".json", "..", "../escape", "nested/name", r"win\name"] {
            assert!(
                matches!(record_stem(name), Err(ToolError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn corrupt_record_reports_name() {
        let error = parse_record("broken", "{\"headers\": 3}").unwrap_err();
        assert!(matches!(error, ToolError::Corrupt { ref name, .. } if name == "broken"));
    }
}
