pub mod archive_manager;

pub use archive_manager::{ArchiveManager, ArchiveReport};
