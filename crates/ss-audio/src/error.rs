use thiserror::Error;

/// Errors originating from the audio module.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The file could not be opened.
    #[error("Impossible d'ouvrir {path} : {source}")]
    Io {
        /// File that failed to open.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Audio decode error (unsupported container, corrupt stream, no samples).
    #[error("Erreur de décodage ({path}) : {reason}")]
    Decode {
        /// File being decoded.
        path: String,
        /// Human readable cause.
        reason: String,
    },

    /// Sample rate conversion failed.
    #[error("Erreur de rééchantillonnage : {0}")]
    Resample(String),
}

impl AudioError {
    pub(crate) fn decode(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
