use crate::error::{MergeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub directories: DirectoryConfig,
    pub merge: MergeConfig,
}

/// The four directory roles of one run. All are required; they stay optional
/// here so a TOML file and CLI flags can each supply a subset before
/// `validate` runs.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DirectoryConfig {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MergeConfig {
    /// Tabular file extension, matched case-insensitively.
    pub extension: String,
    /// Single-byte field delimiter.
    pub delimiter: char,
    /// Name of the appended provenance column.
    pub provenance_column: String,
    /// Regex patterns; candidate filenames matching any of them are skipped.
    pub exclude_patterns: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            extension: "csv".to_string(),
            delimiter: ',',
            provenance_column: "tick_nm".to_string(),
            exclude_patterns: vec![],
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MergeError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| MergeError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| MergeError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["tickmerge.toml", ".tickmerge.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref input_dir) = cli_args.input_dir {
            self.directories.input_dir = Some(input_dir.clone());
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.directories.output_dir = Some(output_dir.clone());
        }

        if let Some(ref log_dir) = cli_args.log_dir {
            self.directories.log_dir = Some(log_dir.clone());
        }

        if let Some(ref archive_dir) = cli_args.archive_dir {
            self.directories.archive_dir = Some(archive_dir.clone());
        }

        if let Some(ref extension) = cli_args.extension {
            self.merge.extension = extension.trim_start_matches('.').to_lowercase();
        }

        if let Some(delimiter) = cli_args.delimiter {
            self.merge.delimiter = delimiter;
        }

        if let Some(ref column) = cli_args.provenance_column {
            self.merge.provenance_column = column.clone();
        }

        if let Some(ref exclude) = cli_args.exclude_patterns {
            self.merge.exclude_patterns.extend(exclude.clone());
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| MergeError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| MergeError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    /// A run cannot start without all four directories. Checked before any
    /// core logic touches the filesystem.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        if self.directories.input_dir.is_none() {
            missing.push("input directory (--input)");
        }
        if self.directories.output_dir.is_none() {
            missing.push("output directory (--output)");
        }
        if self.directories.log_dir.is_none() {
            missing.push("log directory (--log-dir)");
        }
        if self.directories.archive_dir.is_none() {
            missing.push("archive directory (--archive)");
        }

        if !missing.is_empty() {
            return Err(MergeError::Config {
                message: format!("Missing required settings: {}", missing.join(", ")),
            });
        }

        if self.merge.extension.is_empty() {
            return Err(MergeError::Config {
                message: "File extension must not be empty".to_string(),
            });
        }

        if !self.merge.delimiter.is_ascii() {
            return Err(MergeError::Config {
                message: format!(
                    "Delimiter must be a single ASCII character, got '{}'",
                    self.merge.delimiter
                ),
            });
        }

        if self.merge.provenance_column.is_empty() {
            return Err(MergeError::Config {
                message: "Provenance column name must not be empty".to_string(),
            });
        }

        for pattern in &self.merge.exclude_patterns {
            regex::Regex::new(pattern).map_err(|e| MergeError::Config {
                message: format!("Invalid exclude pattern '{}': {}", pattern, e),
            })?;
        }

        Ok(())
    }

    // Accessors for the validated directories; only meaningful after
    // `validate` has passed.
    pub fn input_dir(&self) -> &Path {
        self.directories.input_dir.as_deref().unwrap_or(Path::new("."))
    }

    pub fn output_dir(&self) -> &Path {
        self.directories.output_dir.as_deref().unwrap_or(Path::new("."))
    }

    pub fn log_dir(&self) -> &Path {
        self.directories.log_dir.as_deref().unwrap_or(Path::new("."))
    }

    pub fn archive_dir(&self) -> &Path {
        self.directories.archive_dir.as_deref().unwrap_or(Path::new("."))
    }

    pub fn create_sample_config() -> String {
        let sample = Self {
            directories: DirectoryConfig {
                input_dir: Some(PathBuf::from("data/in")),
                output_dir: Some(PathBuf::from("data/out")),
                log_dir: Some(PathBuf::from("data/log")),
                archive_dir: Some(PathBuf::from("data/archive")),
            },
            merge: MergeConfig::default(),
        };
        toml::to_string_pretty(&sample).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub delimiter: Option<char>,
    pub provenance_column: Option<String>,
    pub exclude_patterns: Option<Vec<String>>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.input_dir = dir;
        self
    }

    pub fn with_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.log_dir = dir;
        self
    }

    pub fn with_archive_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.archive_dir = dir;
        self
    }

    pub fn with_extension(mut self, extension: Option<String>) -> Self {
        self.extension = extension;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_provenance_column(mut self, column: Option<String>) -> Self {
        self.provenance_column = column;
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: Option<Vec<String>>) -> Self {
        self.exclude_patterns = patterns;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn fully_configured() -> Config {
        let mut config = Config::default();
        config.directories = DirectoryConfig {
            input_dir: Some(PathBuf::from("in")),
            output_dir: Some(PathBuf::from("out")),
            log_dir: Some(PathBuf::from("log")),
            archive_dir: Some(PathBuf::from("arch")),
        };
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.merge.extension, "csv");
        assert_eq!(config.merge.delimiter, ',');
        assert_eq!(config.merge.provenance_column, "tick_nm");
        assert!(config.directories.input_dir.is_none());
    }

    #[test]
    fn test_validation_requires_all_directories() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("input directory"));
        assert!(message.contains("archive directory"));

        assert!(fully_configured().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_pattern() {
        let mut config = fully_configured();
        config.merge.exclude_patterns.push("[unclosed".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_operations() {
        let config = fully_configured();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.directories.input_dir, config.directories.input_dir);
        assert_eq!(loaded.merge.extension, "csv");
    }

    #[test]
    fn test_missing_config_file() {
        assert!(Config::load_from_file("/nonexistent/tickmerge.toml").is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_input_dir(Some(PathBuf::from("in")))
            .with_extension(Some(".TSV".to_string()))
            .with_delimiter(Some('\t'))
            .with_exclude_patterns(Some(vec!["^_".to_string()]));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.directories.input_dir, Some(PathBuf::from("in")));
        assert_eq!(config.merge.extension, "tsv");
        assert_eq!(config.merge.delimiter, '\t');
        assert_eq!(config.merge.exclude_patterns, vec!["^_".to_string()]);
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[directories]"));
        assert!(sample.contains("[merge]"));
        assert!(sample.contains("tick_nm"));
    }
}
