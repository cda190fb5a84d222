//! Local JSON file holding the search-term list.

use jobscope_core::error::AppError;
use jobscope_core::terms::SearchTermList;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Loads and saves a [`SearchTermList`] as a JSON array of strings.
///
/// Concurrent writers are not coordinated; the last save wins.
#[derive(Debug, Clone)]
pub struct TermFileStore {
    path: PathBuf,
}

impl TermFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the list.
    ///
    /// A missing file is an empty list. So is a file that is not a JSON array
    /// of strings, which is logged and left on disk untouched.
    pub fn load(&self) -> Result<SearchTermList, AppError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No term file at {}, starting empty", self.path.display());
                return Ok(SearchTermList::new());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<SearchTermList>(&text) {
            Ok(list) => Ok(list.normalized()),
            Err(e) => {
                warn!(
                    "Term file {} is not a JSON list of strings ({}), treating as empty",
                    self.path.display(),
                    e
                );
                Ok(SearchTermList::new())
            }
        }
    }

    /// Writes the list, replacing the file.
    pub fn save(&self, list: &SearchTermList) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(list)?;
        let partial = self.path.with_extension("json.part");
        std::fs::write(&partial, json)?;
        std::fs::rename(&partial, &self.path)?;

        debug!("Saved {} terms to {}", list.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TermFileStore::new(dir.path().join("job_titles.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = TermFileStore::new(dir.path().join("data").join("job_titles.json"));

        let list = SearchTermList::from_terms(["Pflegefachkraft", "Data Engineer"]);
        store.save(&list).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, list);
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.trim_start().starts_with('['));
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job_titles.json");
        std::fs::write(&path, "{\"not\": \"a list\"}").unwrap();

        let store = TermFileStore::new(&path);
        assert!(store.load().unwrap().is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_load_drops_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job_titles.json");
        std::fs::write(&path, r#"["Koch", "Koch ", ""]"#).unwrap();

        let loaded = TermFileStore::new(&path).load().unwrap();
        assert_eq!(loaded.iter().collect::<Vec<_>>(), vec!["Koch"]);
    }
}
