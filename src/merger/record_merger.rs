use crate::config::MergeConfig;
use crate::error::{MergeError, Result};
use crate::scanner::SourceWalker;
use crate::ui::ProcessLog;
use chrono::Local;
use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Result of a successful merge; consumed by the orchestrator to decide
/// whether archiving may run.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub output_path: PathBuf,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub rows_written: u64,
}

/// Streams every candidate file into one dated extract, appending the
/// provenance column to each row. A file that cannot be read is skipped with
/// a warning; a failure writing the shared output is fatal because a
/// partially written extract cannot be trusted.
pub struct RecordMerger<'a> {
    config: &'a MergeConfig,
    log: &'a ProcessLog,
}

impl<'a> RecordMerger<'a> {
    pub fn new(config: &'a MergeConfig, log: &'a ProcessLog) -> Self {
        Self { config, log }
    }

    /// The extract is named from the calendar date, one per day. A second run
    /// on the same day silently truncates the previous extract, so callers
    /// must archive promptly.
    pub fn merge(&self, input_root: &Path, output_root: &Path) -> Result<MergeOutcome> {
        let delimiter = self.delimiter_byte()?;

        fs::create_dir_all(output_root).map_err(|e| MergeError::Setup {
            path: output_root.display().to_string(),
            source: e,
        })?;

        let output_path =
            output_root.join(format!("extract_{}.csv", Local::now().format("%Y%m%d")));
        let output_file = File::create(&output_path).map_err(|e| MergeError::Setup {
            path: output_path.display().to_string(),
            source: e,
        })?;

        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_writer(output_file);

        let walker = SourceWalker::new(self.config)?;
        let mut header_written = false;
        let mut files_processed = 0;
        let mut files_skipped = 0;
        let mut rows_written = 0u64;

        self.log.info("Starting to walk input directory...");

        for source in walker.walk(input_root) {
            let source = source?;
            self.log.info(&format!("Processing file: {}", source.filename));

            let records = match self.read_records(&source.path, delimiter) {
                Ok(records) => records,
                Err(e) => {
                    self.log.warning(&format!(
                        "Could not read {}, skipping: {}",
                        source.path.display(),
                        e
                    ));
                    files_skipped += 1;
                    continue;
                }
            };

            self.log
                .debug(&format!("{}: {} records", source.filename, records.len()));

            if records.len() < 2 {
                self.log.info(&format!(
                    "Skipping empty or header-only file: {}",
                    source.filename
                ));
                files_skipped += 1;
                continue;
            }

            if !header_written {
                let mut header = records[0].clone();
                header.push_field(self.config.provenance_column.as_bytes());
                writer
                    .write_byte_record(&header)
                    .map_err(|e| self.write_error(&output_path, e))?;
                header_written = true;
            }

            for record in &records[1..] {
                let mut row = record.clone();
                row.push_field(source.entity_id.as_bytes());
                writer
                    .write_byte_record(&row)
                    .map_err(|e| self.write_error(&output_path, e))?;
                rows_written += 1;
            }

            files_processed += 1;
        }

        writer
            .flush()
            .map_err(|e| self.write_error(&output_path, csv::Error::from(e)))?;

        self.log.info(&format!(
            "Finished processing. Merged {} files into {}",
            files_processed,
            output_path.display()
        ));

        Ok(MergeOutcome {
            output_path,
            files_processed,
            files_skipped,
            rows_written,
        })
    }

    /// The csv codec takes a single-byte delimiter; anything wider is a
    /// configuration error rather than a silent truncation.
    fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.config.delimiter).map_err(|_| MergeError::Config {
            message: format!(
                "Delimiter must be a single-byte character, got '{}'",
                self.config.delimiter
            ),
        })
    }

    /// Reads a whole source file into records. Field counts are assumed, not
    /// verified, so ragged rows pass through unchanged.
    fn read_records(
        &self,
        path: &Path,
        delimiter: u8,
    ) -> std::result::Result<Vec<ByteRecord>, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_path(path)?;

        let mut records = Vec::new();
        for record in reader.byte_records() {
            records.push(record?);
        }
        Ok(records)
    }

    fn write_error(&self, output_path: &Path, source: csv::Error) -> MergeError {
        MergeError::OutputWrite {
            path: output_path.display().to_string(),
            source,
        }
    }
}
