use crate::error::{MergeError, Result};
use chrono::Local;
use console::{style, Term};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
    Debug,
}

impl MessageType {
    fn label(self) -> &'static str {
        match self {
            MessageType::Success => "SUCCESS",
            MessageType::Error => "ERROR",
            MessageType::Warning => "WARNING",
            MessageType::Info => "INFO",
            MessageType::Debug => "DEBUG",
        }
    }
}

/// Explicit per-run logger: every message goes to a timestamped log file
/// under the log root and, subject to verbosity, to the terminal. There is no
/// global sink; components receive a `&ProcessLog` and stay testable through
/// `ProcessLog::disabled`.
pub struct ProcessLog {
    sink: Option<Mutex<std::fs::File>>,
    path: Option<PathBuf>,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl ProcessLog {
    /// Creates the log root if missing and opens
    /// `merge_process_<YYYYMMDD_HHMMSS>.log` inside it.
    pub fn create(log_root: &Path, verbose: u8, quiet: bool) -> Result<Self> {
        fs::create_dir_all(log_root).map_err(|e| MergeError::Setup {
            path: log_root.display().to_string(),
            source: e,
        })?;

        let path = log_root.join(format!(
            "merge_process_{}.log",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| MergeError::Setup {
                path: path.display().to_string(),
                source: e,
            })?;

        let use_colors = Term::stdout().features().colors_supported() && !quiet;

        Ok(Self {
            sink: Some(Mutex::new(file)),
            path: Some(path),
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        })
    }

    /// A logger with no file and no terminal output.
    pub fn disabled() -> Self {
        Self {
            sink: None,
            path: None,
            use_colors: false,
            verbose_level: 0,
            quiet: true,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn success(&self, message: &str) {
        self.emit(MessageType::Success, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(MessageType::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.emit(MessageType::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(MessageType::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(MessageType::Debug, message);
    }

    fn emit(&self, kind: MessageType, message: &str) {
        // The file is the run's artifact; it gets every level regardless of
        // terminal verbosity.
        self.write_to_file(kind, message);

        if !self.should_print(kind) {
            return;
        }

        match kind {
            MessageType::Error => {
                if self.use_colors {
                    eprintln!("{} {}", style("error:").red().bold(), message);
                } else {
                    eprintln!("ERROR: {}", message);
                }
            }
            MessageType::Warning => {
                if self.use_colors {
                    println!("{} {}", style("warning:").yellow().bold(), message);
                } else {
                    println!("WARNING: {}", message);
                }
            }
            MessageType::Success => {
                if self.use_colors {
                    println!("{} {}", style("✓").green(), message);
                } else {
                    println!("SUCCESS: {}", message);
                }
            }
            MessageType::Info => {
                if self.use_colors {
                    println!("{}", message);
                } else {
                    println!("INFO: {}", message);
                }
            }
            MessageType::Debug => {
                if self.use_colors {
                    println!("  {}", style(message).dim());
                } else {
                    println!("DEBUG: {}", message);
                }
            }
        }
    }

    fn should_print(&self, kind: MessageType) -> bool {
        match kind {
            MessageType::Error => true,
            MessageType::Success | MessageType::Warning | MessageType::Info => !self.quiet,
            MessageType::Debug => self.verbose_level >= 1,
        }
    }

    fn write_to_file(&self, kind: MessageType, message: &str) {
        if let Some(ref sink) = self.sink {
            if let Ok(mut file) = sink.lock() {
                let _ = writeln!(
                    file,
                    "{} {}: {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S"),
                    kind.label(),
                    message
                );
            }
        }
    }
}
