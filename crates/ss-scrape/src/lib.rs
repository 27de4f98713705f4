// Freesound preview scraper: paginated listing fetch, widget extraction, downloads.

pub mod error;
pub mod files;
pub mod listing;
pub mod runner;
pub mod transport;

pub use error::ScrapeError;
pub use listing::{ListingEntry, PreviewKind, PreviewUrl, parse_listing};
pub use runner::{QueryReport, ScrapeReport, StopReason, page_url, scrape_all, scrape_query};
pub use transport::{HttpTransport, Transport};
