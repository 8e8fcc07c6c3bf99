//! # Configuration Module
//!
//! Configuration and validation for classification submissions. It is the common
//! interface between the CLI and the library entry points.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Range | Description |
//! |-----------|------|-------|-------------|
//! | `endpoint` | `String` | `http://` or `https://` URL | Base URL of the classification service |
//! | `max_dimension` | `u32` | 1.. | Longest edge of the uploaded image, in pixels |
//!
//! The CLI reads `endpoint` from `--endpoint` or the `CLASSIFY_ENDPOINT`
//! environment variable. There is no config file and nothing is persisted.
//!
//! ## Examples
//!
//! ```rust
//! use image_classify::config::ClassifyConfig;
//!
//! let config = ClassifyConfig::new("http://localhost:3000".to_string(), 512);
//! assert!(config.validate().is_ok());
//! let options = config.to_options("photo.png");
//! assert_eq!(options.max_dimension, 512);
//! ```

use std::path::PathBuf;

use img_scale::presets::DEFAULT_MAX_DIMENSION;

/// Base URL used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://trump-sim.avosapps.us";

/// Configuration structure for classification submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifyConfig {
    /// Base URL of the classification service.
    ///
    /// The request path `/api/1.0/classify-image` is appended to it. A trailing
    /// slash is tolerated.
    pub endpoint: String,

    /// Longest edge, in pixels, of the image that gets uploaded.
    ///
    /// Larger images are downscaled to fit; smaller ones are sent at their
    /// original size. Must be greater than 0.
    pub max_dimension: u32,
}

impl Default for ClassifyConfig {
    /// Default values:
    /// - `endpoint`: [`DEFAULT_ENDPOINT`]
    /// - `max_dimension`: 512
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl ClassifyConfig {
    /// Creates a new configuration with the specified parameters.
    pub fn new(endpoint: String, max_dimension: u32) -> Self {
        Self {
            endpoint,
            max_dimension,
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_dimension == 0 {
            return Err("Max dimension must be greater than 0".to_string());
        }
        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(format!(
                "Endpoint must be an http:// or https:// URL (got '{}')",
                self.endpoint
            ));
        }
        Ok(())
    }

    /// Convert to ClassifyOptions for one submission of `input`.
    pub fn to_options(&self, input: impl Into<PathBuf>) -> crate::ClassifyOptions {
        crate::ClassifyOptions {
            input: input.into(),
            endpoint: self.endpoint.trim().to_string(),
            max_dimension: self.max_dimension,
        }
    }
}
