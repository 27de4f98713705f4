use std::path::PathBuf;

use thiserror::Error;

/// Errors originating from the scraper.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// The HTTP client could not be built.
    #[error("Client HTTP impossible à construire : {0}")]
    Client(#[source] reqwest::Error),

    /// Connection, timeout, or body read failure.
    #[error("Requête {url} échouée : {source}")]
    Http {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("Statut HTTP {status} pour {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Status code.
        status: u16,
    },

    /// Local file or directory could not be written.
    #[error("Écriture de {} impossible : {source}", .path.display())]
    Io {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
