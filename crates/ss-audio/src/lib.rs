// Audio decoding, resampling, and log-mel feature extraction for samplesort.

pub mod clip;
pub mod decode;
pub mod error;
pub mod features;
pub mod mel;
pub mod resample;
pub mod stft;

pub use clip::AudioClip;
pub use error::AudioError;
pub use features::{FeatureExtractor, MelSpectrogram};
