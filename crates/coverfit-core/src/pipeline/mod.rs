//! Artwork pipeline components.
//!
//! - **discovery**: find MP3 files in directory trees
//! - **tags**: read and replace embedded ID3v2 pictures
//! - **normalize**: size check, downscale and JPEG re-encode
//! - **processor**: run the stages over one file and classify the outcome

pub mod discovery;
pub mod normalize;
pub mod processor;
pub mod tags;

// Re-exports for convenient access
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use normalize::{fit_within, ImageNormalizer};
pub use processor::ArtworkProcessor;
pub use tags::TagRewriter;
