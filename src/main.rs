use clap::Parser;
use std::process;
use tickmerge::{Cli, MergeError, OutputFormat, RunReport, TickMerge, UserFriendlyError};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Configuration errors and log-file setup failures surface before any
    // core logic runs.
    let app = match TickMerge::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&app);
    }

    match app.run() {
        Ok(report) => {
            print_report(&report, cli.output_format, cli.quiet);
            // A partial archive is still an overall success.
            0
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &MergeError) -> i32 {
    match error {
        MergeError::Config { .. } => 2,
        MergeError::Setup { .. } => 3,
        MergeError::OutputWrite { .. } => 4,
        MergeError::ArchiveList { .. } | MergeError::ArchiveCommit { .. } => 5,
        _ => 1, // General error
    }
}

fn print_report(report: &RunReport, format: OutputFormat, quiet: bool) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize run report: {}", e),
        },
        OutputFormat::Human => {
            if !quiet {
                print!("{}", report.display_summary());
            }
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "tickmerge.toml".to_string());

    match TickMerge::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  tickmerge --config {}", config_path);
            println!("\nEdit the file to point at your data directories.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(app: &TickMerge) -> i32 {
    println!("DRY RUN MODE - no files will be merged or moved");

    match app.list_candidates() {
        Ok(candidates) => {
            for candidate in &candidates {
                println!("  {} ({})", candidate.path.display(), candidate.entity_id);
            }
            println!("{} candidate files under {}", candidates.len(), app.config().input_dir().display());
            0
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            exit_code_for(&e)
        }
    }
}

fn print_startup_error(error: &MergeError) {
    eprintln!("{}", error.user_message());
    if let Some(suggestion) = error.suggestion() {
        eprintln!("Suggestion: {}", suggestion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_generate_config_command() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let cli = Cli {
            input: None,
            output: None,
            log_dir: None,
            archive: None,
            config: Some(config_path.clone()),
            extension: None,
            delimiter: None,
            column: None,
            exclude: None,
            output_format: OutputFormat::Human,
            verbose: 0,
            quiet: false,
            dry_run: false,
            generate_config: true,
        };

        let exit_code = handle_generate_config(&cli);
        assert_eq!(exit_code, 0);
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[directories]"));
    }

    #[test]
    fn test_exit_code_mapping() {
        let config = MergeError::Config {
            message: "missing".to_string(),
        };
        assert_eq!(exit_code_for(&config), 2);

        let io = MergeError::Io(std::io::Error::new(std::io::ErrorKind::Other, "x"));
        assert_eq!(exit_code_for(&io), 1);
    }
}
