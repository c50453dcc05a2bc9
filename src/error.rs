use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not prepare directory or file: {path}")]
    Setup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory traversal failed under: {path}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to write to merged output: {path}")]
    OutputWrite {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Could not list input root for archiving: {path}")]
    ArchiveList {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move merged file into archive: {path}")]
    ArchiveCommit {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for MergeError {
    fn user_message(&self) -> String {
        match self {
            MergeError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            MergeError::Setup { path, source } => {
                format!("Could not prepare {}: {}", path, source)
            }
            MergeError::Walk { path, source } => {
                format!("Could not walk input directory {}: {}", path, source)
            }
            MergeError::OutputWrite { path, source } => {
                format!("Writing to merged output {} failed: {}", path, source)
            }
            MergeError::ArchiveList { path, source } => {
                format!("Could not list {} for archiving: {}", path, source)
            }
            MergeError::ArchiveCommit { path, source } => {
                format!(
                    "Could not move merged file {} into the archive: {}",
                    path, source
                )
            }
            MergeError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            MergeError::Config { .. } => Some(
                "All four directories are required: --input, --output, --log-dir and --archive (or the matching [directories] keys in the TOML config).".to_string()
            ),
            MergeError::Setup { .. } => Some(
                "Check that the parent directory exists and that you have write permission.".to_string()
            ),
            MergeError::Walk { .. } => Some(
                "Verify the input directory exists and is readable.".to_string()
            ),
            MergeError::OutputWrite { .. } => Some(
                "The merged file cannot be trusted after a write failure; check free disk space and rerun. Source files were not moved.".to_string()
            ),
            MergeError::ArchiveList { .. } | MergeError::ArchiveCommit { .. } => Some(
                "The merged file is still in the output directory; fix the archive directory permissions and rerun.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for MergeError {
    fn from(error: toml::de::Error) -> Self {
        MergeError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = MergeError::Config {
            message: "missing input directory".to_string(),
        };
        assert!(error.user_message().contains("Configuration error"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = MergeError::from(io_error);
        assert!(matches!(error, MergeError::Io(_)));
        assert!(error.suggestion().is_none());
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("not = = valid").unwrap_err();
        let error = MergeError::from(toml_error);
        assert!(matches!(error, MergeError::Config { .. }));
    }
}
