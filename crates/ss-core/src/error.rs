use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// Class index outside of the fixed label set.
    #[error("Index de classe invalide : {index} (attendu 0..{count})")]
    InvalidClassIndex {
        /// Index produced by the model.
        index: usize,
        /// Number of known classes.
        count: usize,
    },
}
