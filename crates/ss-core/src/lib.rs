// Configuration, labels, and shared structures for samplesort.
//
// This crate contains the types shared by the classification pipeline
// and the preview scraper.

pub mod config;
pub mod error;
pub mod label;

pub use config::{FeatureConfig, ScrapeConfig, SortConfig};
pub use error::CoreError;
pub use label::ClassLabel;
