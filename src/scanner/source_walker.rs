use crate::config::MergeConfig;
use crate::error::{MergeError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One candidate tabular file under the input root.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub filename: String,
    /// Filename with the extension stripped; tags every merged row.
    pub entity_id: String,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        let entity_id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&filename)
            .to_string();

        Self {
            path,
            filename,
            entity_id,
        }
    }
}

/// Enumerates candidate files under an input root: every non-directory entry
/// at any depth whose extension matches, in whatever order the filesystem
/// yields. The walk is lazy and single-pass; a traversal error surfaces as an
/// `Err` item and is fatal to the caller, unlike an individual file being
/// unreadable, which is the merger's concern.
pub struct SourceWalker {
    suffix: String,
    excludes: Vec<Regex>,
}

impl SourceWalker {
    pub fn new(config: &MergeConfig) -> Result<Self> {
        let excludes = config
            .exclude_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| MergeError::Config {
                    message: format!("Invalid exclude pattern '{}': {}", pattern, e),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            suffix: format!(".{}", config.extension.trim_start_matches('.').to_lowercase()),
            excludes,
        })
    }

    pub fn walk<'a>(&'a self, root: &Path) -> impl Iterator<Item = Result<SourceFile>> + 'a {
        let root_display = root.display().to_string();

        WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        return None;
                    }

                    let filename = entry.file_name().to_string_lossy();
                    if !filename.to_lowercase().ends_with(&self.suffix) {
                        return None;
                    }
                    if self.excludes.iter().any(|re| re.is_match(&filename)) {
                        return None;
                    }

                    Some(Ok(SourceFile::new(entry.into_path())))
                }
                Err(err) => Some(Err(MergeError::Walk {
                    path: root_display.clone(),
                    source: err,
                })),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn collect(walker: &SourceWalker, root: &Path) -> Vec<SourceFile> {
        walker
            .walk(root)
            .collect::<Result<Vec<_>>>()
            .expect("walk should succeed")
    }

    #[test]
    fn test_source_file_entity_id() {
        let source = SourceFile::new(PathBuf::from("/data/in/AAPL.csv"));
        assert_eq!(source.filename, "AAPL.csv");
        assert_eq!(source.entity_id, "AAPL");

        let dotted = SourceFile::new(PathBuf::from("BRK.B.csv"));
        assert_eq!(dotted.entity_id, "BRK.B");
    }

    #[test]
    fn test_walk_finds_nested_files_case_insensitively() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("AAPL.csv"), "h\n1").unwrap();
        fs::write(root.join("MSFT.CSV"), "h\n1").unwrap();
        fs::write(root.join("notes.txt"), "ignored").unwrap();
        let nested = root.join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("GOOG.Csv"), "h\n1").unwrap();

        let walker = SourceWalker::new(&MergeConfig::default()).unwrap();
        let mut names: Vec<String> = collect(&walker, root)
            .into_iter()
            .map(|s| s.entity_id)
            .collect();
        names.sort();

        assert_eq!(names, vec!["AAPL", "GOOG", "MSFT"]);
    }

    #[test]
    fn test_walk_applies_exclude_patterns() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("AAPL.csv"), "h\n1").unwrap();
        fs::write(root.join("_staging.csv"), "h\n1").unwrap();

        let config = MergeConfig {
            exclude_patterns: vec!["^_".to_string()],
            ..MergeConfig::default()
        };
        let walker = SourceWalker::new(&config).unwrap();
        let names: Vec<String> = collect(&walker, root)
            .into_iter()
            .map(|s| s.filename)
            .collect();

        assert_eq!(names, vec!["AAPL.csv"]);
    }

    #[test]
    fn test_walk_missing_root_is_fatal() {
        let walker = SourceWalker::new(&MergeConfig::default()).unwrap();
        let results: Vec<_> = walker.walk(Path::new("/nonexistent/tickmerge/in")).collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(MergeError::Walk { .. })));
    }

    #[test]
    fn test_walker_rejects_bad_pattern() {
        let config = MergeConfig {
            exclude_patterns: vec!["[unclosed".to_string()],
            ..MergeConfig::default()
        };
        assert!(SourceWalker::new(&config).is_err());
    }
}
