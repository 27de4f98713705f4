use std::path::PathBuf;

use thiserror::Error;

/// Errors originating from the model module.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Weight file does not exist.
    #[error("Fichier de poids introuvable : {}", .path.display())]
    WeightsNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Weight file is corrupt or incompatible with the architecture.
    #[error("Chargement des poids impossible ({}) : {reason}", .path.display())]
    WeightLoad {
        /// Weight file being loaded.
        path: PathBuf,
        /// Underlying cause (missing tensor, shape mismatch, parse error).
        reason: String,
    },

    /// Forward pass failed.
    #[error("Erreur d'inférence : {0}")]
    Inference(String),
}

impl From<candle_core::Error> for ModelError {
    fn from(e: candle_core::Error) -> Self {
        Self::Inference(e.to_string())
    }
}
