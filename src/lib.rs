pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod merger;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, DirectoryConfig, MergeConfig};
pub use error::{MergeError, Result, UserFriendlyError};

// Core functionality re-exports
pub use archive::{ArchiveManager, ArchiveReport};
pub use merger::{MergeOutcome, RecordMerger};
pub use scanner::{SourceFile, SourceWalker};
pub use ui::ProcessLog;

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Final state of one successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Where the merged extract ended up, inside the archive directory.
    pub merged_file: PathBuf,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub rows_written: u64,
    pub archive_dir: PathBuf,
    pub archived_entries: Vec<String>,
    /// Source files that could not be moved and stayed in the input root.
    pub failed_moves: Vec<String>,
}

impl RunReport {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Merged {} files ({} data rows, {} skipped) into {}\nArchived {} source files to {}\n",
            self.files_processed,
            self.rows_written,
            self.files_skipped,
            self.merged_file.display(),
            self.archived_entries.len(),
            self.archive_dir.display()
        );

        if !self.failed_moves.is_empty() {
            summary.push_str(&format!(
                "{} files could not be archived and remain in the input directory: {}\n",
                self.failed_moves.len(),
                self.failed_moves.join(", ")
            ));
        }

        summary
    }
}

/// Main library interface: the merge-then-archive pipeline for one run.
pub struct TickMerge {
    config: Config,
    log: ProcessLog,
}

impl TickMerge {
    pub fn new(config: Config, log: ProcessLog) -> Self {
        Self { config, log }
    }

    /// Builds the instance from CLI arguments: loads and validates the
    /// configuration, then opens the run's log file under the log root.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = cli.load_config()?;
        let log = ProcessLog::create(config.log_dir(), cli.verbosity_level(), cli.quiet)?;
        Ok(Self::new(config, log))
    }

    /// Runs the pipeline to completion. Merging must succeed before archiving
    /// starts; a fatal merge error leaves the input root untouched and no
    /// archive directory is created.
    pub fn run(&self) -> Result<RunReport> {
        self.log.info("Process started.");
        self.log
            .info(&format!("Input directory: {}", self.config.input_dir().display()));
        self.log
            .info(&format!("Output directory: {}", self.config.output_dir().display()));
        self.log
            .info(&format!("Log directory: {}", self.config.log_dir().display()));
        self.log
            .info(&format!("Archive directory: {}", self.config.archive_dir().display()));

        let merger = RecordMerger::new(&self.config.merge, &self.log);
        let outcome = merger.merge(self.config.input_dir(), self.config.output_dir())?;

        let archiver = ArchiveManager::new(&self.log);
        let archive = archiver.archive(
            self.config.archive_dir(),
            &outcome.output_path,
            self.config.input_dir(),
        )?;

        self.log.success("Process completed successfully.");

        let merged_name = outcome
            .output_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| outcome.output_path.clone());

        Ok(RunReport {
            merged_file: archive.archive_dir.join(merged_name),
            files_processed: outcome.files_processed,
            files_skipped: outcome.files_skipped,
            rows_written: outcome.rows_written,
            archive_dir: archive.archive_dir,
            archived_entries: archive.archived,
            failed_moves: archive.failed,
        })
    }

    /// Dry run: enumerate the files a merge would consume without touching
    /// the output or archive roots.
    pub fn list_candidates(&self) -> Result<Vec<SourceFile>> {
        let walker = SourceWalker::new(&self.config.merge)?;
        walker.walk(self.config.input_dir()).collect()
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample).map_err(MergeError::Io)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn log(&self) -> &ProcessLog {
        &self.log
    }

    /// Record the fatal error in the log and on the terminal, with a
    /// suggestion where one exists.
    pub fn handle_error(&self, error: &MergeError) {
        self.log.error(&error.user_message());
        if let Some(suggestion) = error.suggestion() {
            self.log.info(&format!("Suggestion: {}", suggestion));
        }
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
