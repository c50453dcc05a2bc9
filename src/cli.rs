use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tickmerge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Merge per-ticker CSV files and archive the processed inputs")]
#[command(
    long_about = "TickMerge walks an input directory for per-ticker CSV files, merges them \
                       into a single dated extract with a provenance column, then moves the \
                       extract and the source files into a timestamped archive directory."
)]
#[command(after_help = "EXAMPLES:\n  \
    tickmerge -i data/in -o data/out -l data/log -a data/archive\n  \
    tickmerge -i in -o out -l log -a arch --extension tsv --delimiter '\\t'\n  \
    tickmerge --config tickmerge.toml --dry-run\n  \
    tickmerge --generate-config")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input directory holding per-ticker CSV files
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory for the merged extract
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for run log files
    #[arg(short, long)]
    pub log_dir: Option<PathBuf>,

    /// Directory receiving the timestamped archive of each run
    #[arg(short, long)]
    pub archive: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// File extension to merge (matched case-insensitively)
    #[arg(long, help = "Tabular file extension (default: csv)")]
    pub extension: Option<String>,

    /// Field delimiter
    #[arg(long, help = "Single-character field delimiter (default: ,)")]
    pub delimiter: Option<char>,

    /// Provenance column name appended to every row
    #[arg(long, help = "Name of the appended provenance column (default: tick_nm)")]
    pub column: Option<String>,

    /// Filename patterns to exclude from merging
    #[arg(long, value_delimiter = ',', help = "Regex patterns; matching filenames are skipped")]
    pub exclude: Option<Vec<String>>,

    /// Output format for the run report
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential console output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// List the files that would be merged without touching anything
    #[arg(long, help = "Show what would be merged without executing")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Human,
    /// JSON run report
    Json,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_input_dir(self.input.clone())
            .with_output_dir(self.output.clone())
            .with_log_dir(self.log_dir.clone())
            .with_archive_dir(self.archive.clone())
            .with_extension(self.extension.clone())
            .with_delimiter(self.delimiter)
            .with_provenance_column(self.column.clone())
            .with_exclude_patterns(self.exclude.clone())
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose > 0 && !self.quiet
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_dirs() -> Cli {
        Cli {
            input: Some(PathBuf::from("in")),
            output: Some(PathBuf::from("out")),
            log_dir: Some(PathBuf::from("log")),
            archive: Some(PathBuf::from("arch")),
            config: None,
            extension: None,
            delimiter: None,
            column: None,
            exclude: None,
            output_format: OutputFormat::Human,
            verbose: 0,
            quiet: false,
            dry_run: false,
            generate_config: false,
        }
    }

    #[test]
    fn test_load_config_from_flags() {
        let cli = cli_with_dirs();
        let config = cli.load_config().unwrap();

        assert_eq!(config.input_dir(), PathBuf::from("in").as_path());
        assert_eq!(config.archive_dir(), PathBuf::from("arch").as_path());
        assert_eq!(config.merge.extension, "csv");
    }

    #[test]
    fn test_load_config_missing_directories() {
        let mut cli = cli_with_dirs();
        cli.archive = None;

        let err = cli.load_config().unwrap_err();
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_overrides_carry_merge_settings() {
        let mut cli = cli_with_dirs();
        cli.extension = Some("tsv".to_string());
        cli.delimiter = Some(';');
        cli.column = Some("source".to_string());

        let config = cli.load_config().unwrap();
        assert_eq!(config.merge.extension, "tsv");
        assert_eq!(config.merge.delimiter, ';');
        assert_eq!(config.merge.provenance_column, "source");
    }

    #[test]
    fn test_verbosity_level() {
        let mut cli = cli_with_dirs();
        cli.verbose = 2;
        assert_eq!(cli.verbosity_level(), 2);
        assert!(cli.is_verbose());

        cli.verbose = 0;
        cli.quiet = true;
        assert_eq!(cli.verbosity_level(), 0);
        assert!(!cli.is_verbose());
    }
}
