//! # Processing Module
//!
//! The downscale-and-reencode step that runs before every upload.

pub mod media;
pub mod resize;

// Re-export commonly used types for convenience
pub use media::{Dimensions, OUTPUT_EXTENSION, OUTPUT_MIME_TYPE, ScaledFile, SourceImage};
pub use resize::{Downscaler, canonical_file_name, downscale_blocking, resize_image};
