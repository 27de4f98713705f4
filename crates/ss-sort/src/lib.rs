// Folder sorting: scan a tree of samples, classify each one, and move or
// copy it into its class subdirectory.

pub mod error;
pub mod scan;
pub mod sorter;
pub mod transfer;

pub use error::SortError;
pub use sorter::{FolderSorter, Progress, SkippedFile, SortReport, SortedFile};
pub use transfer::TransferMode;
