use crate::error::{MergeError, Result};
use crate::ui::ProcessLog;
use chrono::Local;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// What one archive batch did. `failed` entries stayed behind in the input
/// root; the batch still counts as a success.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
    pub archive_dir: PathBuf,
    pub archived: Vec<String>,
    pub failed: Vec<String>,
}

impl ArchiveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Relocates the merged extract and the processed source files into one
/// timestamped directory under the archive root. Runs only after a
/// successful merge.
pub struct ArchiveManager<'a> {
    log: &'a ProcessLog,
}

impl<'a> ArchiveManager<'a> {
    pub fn new(log: &'a ProcessLog) -> Self {
        Self { log }
    }

    /// The merged file is moved first; if that fails nothing else is touched
    /// and the run aborts. Source-file moves that fail are warnings and the
    /// batch continues.
    pub fn archive(
        &self,
        archive_root: &Path,
        merged_file: &Path,
        input_root: &Path,
    ) -> Result<ArchiveReport> {
        let archive_dir = archive_root.join(format!(
            "archive_{}",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        fs::create_dir_all(&archive_dir).map_err(|e| MergeError::Setup {
            path: archive_dir.display().to_string(),
            source: e,
        })?;
        self.log
            .info(&format!("Created archive directory: {}", archive_dir.display()));

        let merged_name = merged_file
            .file_name()
            .ok_or_else(|| MergeError::InvalidPath {
                path: merged_file.display().to_string(),
            })?;
        let merged_dest = archive_dir.join(merged_name);
        self.log
            .info(&format!("Archiving merged file to {}", merged_dest.display()));
        move_entry(merged_file, &merged_dest).map_err(|e| MergeError::ArchiveCommit {
            path: merged_file.display().to_string(),
            source: e,
        })?;

        self.log.info("Archiving source files...");
        let entries = fs::read_dir(input_root).map_err(|e| MergeError::ArchiveList {
            path: input_root.display().to_string(),
            source: e,
        })?;

        let mut report = ArchiveReport {
            archive_dir,
            archived: Vec::new(),
            failed: Vec::new(),
        };

        // Top-level entries only; subdirectories stay where they are.
        for entry in entries {
            let entry = entry.map_err(|e| MergeError::ArchiveList {
                path: input_root.display().to_string(),
                source: e,
            })?;

            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = match entry.file_type() {
                Ok(file_type) => file_type.is_dir(),
                Err(e) => {
                    self.log
                        .warning(&format!("Failed to inspect {}: {}", name, e));
                    report.failed.push(name);
                    continue;
                }
            };
            if is_dir {
                continue;
            }

            let dest = report.archive_dir.join(entry.file_name());
            match move_entry(&entry.path(), &dest) {
                Ok(()) => report.archived.push(name),
                Err(e) => {
                    self.log.warning(&format!(
                        "Failed to archive source file {}: {}",
                        entry.path().display(),
                        e
                    ));
                    report.failed.push(name);
                }
            }
        }

        self.log.info("Archiving and cleanup complete.");
        Ok(report)
    }
}

/// Rename where possible; across filesystems fall back to a buffered copy
/// that preserves the modification time, then delete the original.
fn move_entry(source: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(_) => copy_then_remove(source, dest),
    }
}

fn copy_then_remove(source: &Path, dest: &Path) -> io::Result<()> {
    let result = copy_preserving_mtime(source, dest).and_then(|()| fs::remove_file(source));

    // A failed move must leave the entry in the input root only, never in
    // both places; drop whatever partial copy reached the archive.
    if result.is_err() {
        let _ = fs::remove_file(dest);
    }

    result
}

fn copy_preserving_mtime(source: &Path, dest: &Path) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(source)?);
    let mut writer = BufWriter::new(File::create(dest)?);
    io::copy(&mut reader, &mut writer)?;
    io::Write::flush(&mut writer)?;

    if let Ok(metadata) = fs::metadata(source) {
        if let Ok(modified) = metadata.modified() {
            let _ = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(modified));
        }
    }

    Ok(())
}
