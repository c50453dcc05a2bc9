pub mod source_walker;

pub use source_walker::{SourceFile, SourceWalker};
