//! # Image Classify
//!
//! Client for a remote image classification service. A picked image is
//! downscaled locally to a bounded longest edge, re-encoded as JPEG, uploaded
//! in a single multipart request, and the reply is turned into either result
//! text or an error message.
//!
//! ## Architecture
//!
//! - `processing`: decode, downscale and re-encode (the only CPU-heavy step)
//! - `client`: the outbound HTTP call and response mapping
//! - `session`: the submission state machine and what the user sees
//! - `config`: configuration defaults and validation
//! - `error`: the error taxonomy shared by all of the above
//!
//! Dimension planning and resampling live in the `img-scale` workspace crate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use image_classify::{ClassifyOptions, classify_file};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let options = ClassifyOptions {
//!     input: "photo.png".into(),
//!     endpoint: "http://localhost:3000".to_string(),
//!     max_dimension: 512,
//! };
//!
//! let text = classify_file(options).await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

// Standard library imports
use std::path::PathBuf;

// External crate imports
use anyhow::{Result, anyhow};

// Internal module imports
pub mod client;
pub mod config;
pub mod error;
pub mod processing;
pub mod session;

/// Re-export error types for convenience
pub use error::{ClassifyError, ClassifyResult, HasRecoverySuggestion, HasSeverity};

pub use client::{Classifier, HttpClassifier};
pub use processing::{Dimensions, ScaledFile, SourceImage, resize_image};
pub use session::{Panels, Settlement, SubmissionSession, SubmissionState};

/// Options for one classification submission.
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    /// Image file to classify.
    pub input: PathBuf,

    /// Base URL of the classification service, without the request path.
    pub endpoint: String,

    /// Longest edge of the uploaded image in pixels. Must be greater than 0.
    pub max_dimension: u32,
}

/// Classify a single image file and return the result text.
///
/// Runs the same submission flow the interactive CLI uses, so the outcome is
/// exactly what the result or error panel would show.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the image cannot be decoded
/// or re-encoded, the service rejects it, or the service cannot be reached.
pub async fn classify_file(options: ClassifyOptions) -> Result<String> {
    let source = SourceImage::from_path(&options.input).await?;
    let classifier = HttpClassifier::new(&options.endpoint)?;
    let session = SubmissionSession::new(classifier, options.max_dimension);

    match session.submit(source).await {
        Settlement::Current(SubmissionState::Succeeded { result, .. }) => Ok(result),
        Settlement::Current(SubmissionState::Failed { error, .. }) => {
            Err(anyhow!(error.user_message()))
        }
        Settlement::Current(state) => Err(anyhow!(
            "submission ended in unexpected state '{}'",
            state.name()
        )),
        Settlement::Superseded => Err(anyhow!("submission was superseded")),
    }
}
