// Fixed-topology CNN inference over log-mel spectrograms.

pub mod device;
pub mod error;
pub mod network;

pub use device::select_device;
pub use error::ModelError;
pub use network::{PARAMETERS, SampleClassifier};
