pub mod record_merger;

pub use record_merger::{MergeOutcome, RecordMerger};
