use std::path::PathBuf;

use ss_audio::AudioError;
use ss_model::ModelError;
use thiserror::Error;

/// Errors originating from the sorter.
#[derive(Error, Debug)]
pub enum SortError {
    /// Root path is missing or not a directory.
    #[error("Dossier introuvable : {}", .0.display())]
    NotADirectory(PathBuf),

    /// A class subdirectory could not be created.
    #[error("Impossible de créer {} : {source}", .path.display())]
    CreateDir {
        /// Directory being created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Feature extraction failed for one file.
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Inference failed for one file.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The file could not be moved or copied.
    #[error("Transfert {} → {} impossible : {source}", .from.display(), .to.display())]
    Transfer {
        /// Source file.
        from: PathBuf,
        /// Destination file.
        to: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
