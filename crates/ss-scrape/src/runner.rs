use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ss_core::config::{QuerySpec, ScrapeConfig};

use crate::error::ScrapeError;
use crate::files::file_name_for;
use crate::listing::parse_listing;
use crate::transport::Transport;

/// Why pagination stopped for a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Every page up to `max_pages` was processed.
    PageLimit,
    /// Page `page` contained no player widget.
    NoMorePages { page: u32 },
    /// Page `page` could not be fetched.
    FetchFailed { page: u32, error: String },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageLimit => write!(f, "limite de pages atteinte"),
            Self::NoMorePages { page } => write!(f, "page {page} vide"),
            Self::FetchFailed { page, error } => write!(f, "page {page} en erreur : {error}"),
        }
    }
}

/// Bilan d'une requête.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryReport {
    pub key: String,
    pub output_dir: PathBuf,
    /// Pages fully processed.
    pub pages: u32,
    /// Previews written to disk.
    pub saved: usize,
    /// Widgets with neither MP3 nor OGG link.
    pub without_preview: usize,
    /// Downloads that failed.
    pub failed: usize,
    pub stop: StopReason,
}

/// Bilan de toutes les requêtes, dans l'ordre de traitement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    pub queries: Vec<QueryReport>,
}

impl ScrapeReport {
    /// Total files saved across queries.
    #[must_use]
    pub fn total_saved(&self) -> usize {
        self.queries.iter().map(|q| q.saved).sum()
    }

    /// Total failed downloads across queries.
    #[must_use]
    pub fn total_failed(&self) -> usize {
        self.queries.iter().map(|q| q.failed).sum()
    }
}

/// URL of result page `page` (1-based) for a filtered search URL.
///
/// # Example
/// ```
/// assert_eq!(ss_scrape::page_url("https://f.org/search/?q=", 3), "https://f.org/search/?q=&page=3#sound");
/// ```
#[must_use]
pub fn page_url(base: &str, page: u32) -> String {
    format!("{base}&page={page}#sound")
}

/// Scrape pages `1..=max_pages` of one query into `<output_root>/<key>_samples`.
///
/// Stops at the first page that fails to load or has no widget. Download
/// failures are logged and counted, never propagated.
///
/// # Errors
/// Returns `ScrapeError::Io` only if the output directory cannot be created.
pub fn scrape_query<T: Transport + ?Sized>(
    transport: &T,
    query: &QuerySpec,
    max_pages: u32,
    output_root: &Path,
) -> Result<QueryReport, ScrapeError> {
    let output_dir = output_root.join(format!("{}_samples", query.key));
    fs::create_dir_all(&output_dir).map_err(|source| ScrapeError::Io {
        path: output_dir.clone(),
        source,
    })?;

    let mut report = QueryReport {
        key: query.key.clone(),
        output_dir,
        pages: 0,
        saved: 0,
        without_preview: 0,
        failed: 0,
        stop: StopReason::PageLimit,
    };

    for page in 1..=max_pages {
        let url = page_url(&query.url, page);
        log::info!("Page {page} : {url}");

        let html = match transport.get_text(&url) {
            Ok(html) => html,
            Err(e) => {
                log::error!("Erreur sur {url} : {e}");
                report.stop = StopReason::FetchFailed {
                    page,
                    error: e.to_string(),
                };
                break;
            }
        };

        let entries = parse_listing(&html);
        if entries.is_empty() {
            log::info!("Aucun lecteur sur la page {page}, fin de la requête");
            report.stop = StopReason::NoMorePages { page };
            break;
        }

        for entry in &entries {
            let Some(preview) = &entry.preview else {
                log::warn!("Pas de preview (mp3/ogg) pour {}", entry.title);
                report.without_preview += 1;
                continue;
            };
            let name = file_name_for(&entry.title, preview);
            let dest = report.output_dir.join(&name);
            log::info!("  Preview {} : {} -> {name}", preview.kind, preview.url);
            match transport.download(&preview.url, &dest) {
                Ok(bytes) => {
                    log::info!("Fichier enregistré : {} ({bytes} octets)", dest.display());
                    report.saved += 1;
                }
                Err(e) => {
                    log::warn!("Téléchargement de {} échoué : {e}", preview.url);
                    report.failed += 1;
                }
            }
        }

        report.pages = page;
        log::info!("Page {page} terminée");
    }

    Ok(report)
}

/// Run every configured query in order.
///
/// # Errors
/// Returns the first `ScrapeError::Io` raised while creating an output directory.
pub fn scrape_all<T: Transport + ?Sized>(
    transport: &T,
    config: &ScrapeConfig,
) -> Result<ScrapeReport, ScrapeError> {
    let mut report = ScrapeReport::default();
    for query in &config.queries {
        log::info!("Requête « {} »", query.key);
        report.queries.push(scrape_query(
            transport,
            query,
            config.max_pages,
            &config.output_root,
        )?);
    }
    Ok(report)
}
