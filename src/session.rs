//! # Submission Session
//!
//! Drives one picked image through resize → upload → settle and keeps the
//! presentation state as a single explicit value.
//!
//! ## States
//!
//! ```text
//! Idle ──pick──▶ Resizing ──ok──▶ Uploading ──2xx──▶ Succeeded
//!                   │                 │
//!                   └──err──▶ Failed ◀┘ (non-2xx / no response)
//!
//! reset: any state ──▶ Idle
//! ```
//!
//! The loading indicator is derived from the state (`Resizing` or `Uploading`),
//! so "loading with a result already shown" cannot be represented, and it is
//! off as soon as a submission settles, whatever the outcome.
//!
//! ## Latest submission wins
//!
//! Every `begin` and `reset` bumps a generation counter. A submission only
//! writes its transitions while its [`Ticket`] still matches; anything that
//! settles after being superseded is dropped and reported as
//! [`Settlement::Superseded`]. In-flight requests are not cancelled.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::client::Classifier;
use crate::error::{ClassifyError, ClassifyResult};
use crate::processing::{Downscaler, ScaledFile, SourceImage};

/// Heading printed above every panel set.
pub const TITLE: &str = "Person, Woman, Man, Camera, TV";
/// Shown while a submission is resizing or uploading.
pub const LOADING_MESSAGE: &str = "Sending photo to the White House, please wait ...";
/// Label of the action that returns to `Idle`.
pub const RESET_LABEL: &str = "Try again";

/// Where the current submission is.
#[derive(Debug, Clone, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Resizing {
        source: Arc<SourceImage>,
    },
    Uploading {
        source: Arc<SourceImage>,
        scaled: Arc<ScaledFile>,
    },
    Succeeded {
        source: Arc<SourceImage>,
        result: String,
    },
    Failed {
        source: Arc<SourceImage>,
        error: Arc<ClassifyError>,
    },
}

impl SubmissionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Resizing { .. } => "resizing",
            Self::Uploading { .. } => "uploading",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }

    /// True while a submission is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Resizing { .. } | Self::Uploading { .. })
    }

    /// The picked image, shown as the preview.
    pub fn source(&self) -> Option<&SourceImage> {
        match self {
            Self::Idle => None,
            Self::Resizing { source }
            | Self::Uploading { source, .. }
            | Self::Succeeded { source, .. }
            | Self::Failed { source, .. } => Some(source.as_ref()),
        }
    }

    pub fn result(&self) -> Option<&str> {
        match self {
            Self::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClassifyError> {
        match self {
            Self::Failed { error, .. } => Some(error.as_ref()),
            _ => None,
        }
    }

    /// Presentation view of this state.
    pub fn panels(&self) -> Panels {
        Panels {
            preview: self.source().map(Preview::from),
            loading: self.is_loading(),
            result: self.result().map(str::to_string),
            error: self.error().map(ClassifyError::user_message),
        }
    }
}

/// Identifies one submission; stale tickets cannot change the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// How a submission ended, from the caller's point of view.
#[derive(Debug, Clone)]
pub enum Settlement {
    /// The submission was still current and left the session in this state.
    Current(SubmissionState),
    /// A newer submission or a reset replaced it before it settled.
    Superseded,
}

impl Settlement {
    pub fn state(&self) -> Option<&SubmissionState> {
        match self {
            Self::Current(state) => Some(state),
            Self::Superseded => None,
        }
    }
}

#[derive(Debug, Default)]
struct Tracked {
    generation: u64,
    state: SubmissionState,
}

/// Owns the submission state and drives submissions through it.
pub struct SubmissionSession<C: Classifier> {
    classifier: C,
    downscaler: Downscaler,
    tracked: Mutex<Tracked>,
}

impl<C: Classifier> SubmissionSession<C> {
    pub fn new(classifier: C, max_dimension: u32) -> Self {
        Self {
            classifier,
            downscaler: Downscaler::new(max_dimension),
            tracked: Mutex::new(Tracked::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tracked> {
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SubmissionState {
        self.lock().state.clone()
    }

    pub fn panels(&self) -> Panels {
        self.lock().state.panels()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().state.is_loading()
    }

    /// Start a submission: any previous result or error is replaced by `Resizing`.
    pub fn begin(&self, source: SourceImage) -> Ticket {
        let mut tracked = self.lock();
        tracked.generation += 1;
        info!(
            generation = tracked.generation,
            file = source.file_name(),
            previous = tracked.state.name(),
            "image selected"
        );
        tracked.state = SubmissionState::Resizing {
            source: Arc::new(source),
        };
        Ticket(tracked.generation)
    }

    /// Return to `Idle`. Anything still in flight becomes stale.
    pub fn reset(&self) {
        let mut tracked = self.lock();
        tracked.generation += 1;
        info!(
            generation = tracked.generation,
            previous = tracked.state.name(),
            "session reset"
        );
        tracked.state = SubmissionState::Idle;
    }

    /// Apply `next` if `ticket` is still current. Returns the new state.
    fn advance<F>(&self, ticket: Ticket, next: F) -> Option<SubmissionState>
    where
        F: FnOnce(Arc<SourceImage>) -> SubmissionState,
    {
        let mut tracked = self.lock();
        if tracked.generation != ticket.0 {
            debug!(
                ticket = ticket.0,
                current = tracked.generation,
                "ignoring stale transition"
            );
            return None;
        }
        let source = match &tracked.state {
            SubmissionState::Idle => return None,
            SubmissionState::Resizing { source }
            | SubmissionState::Uploading { source, .. }
            | SubmissionState::Succeeded { source, .. }
            | SubmissionState::Failed { source, .. } => Arc::clone(source),
        };
        tracked.state = next(source);
        debug!(generation = ticket.0, state = tracked.state.name(), "transition");
        Some(tracked.state.clone())
    }

    /// Settle `ticket` with the outcome of its resize or upload.
    pub fn settle(&self, ticket: Ticket, outcome: ClassifyResult<String>) -> Settlement {
        let applied = self.advance(ticket, |source| match outcome {
            Ok(result) => SubmissionState::Succeeded { source, result },
            Err(error) => {
                warn!(category = error.category(), error = %error, "submission failed");
                SubmissionState::Failed {
                    source,
                    error: Arc::new(error),
                }
            }
        });
        match applied {
            Some(state) => Settlement::Current(state),
            None => Settlement::Superseded,
        }
    }

    /// Run one full submission for `source`.
    pub async fn submit(&self, source: SourceImage) -> Settlement {
        let ticket = self.begin(source.clone());
        self.run(ticket, source).await
    }

    /// Resize and upload for an already started `ticket`.
    pub async fn run(&self, ticket: Ticket, source: SourceImage) -> Settlement {
        let scaled = match self.downscaler.resize(&source).await {
            Ok(scaled) => Arc::new(scaled),
            Err(error) => return self.settle(ticket, Err(error)),
        };

        let uploading = self.advance(ticket, |source| SubmissionState::Uploading {
            source,
            scaled: Arc::clone(&scaled),
        });
        if uploading.is_none() {
            return Settlement::Superseded;
        }

        let outcome = self.classifier.classify(&scaled).await;
        self.settle(ticket, outcome)
    }
}

/// What the preview shows about the picked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: usize,
}

impl From<&SourceImage> for Preview {
    fn from(source: &SourceImage) -> Self {
        Self {
            file_name: source.file_name().to_string(),
            mime_type: source.mime_type().to_string(),
            bytes: source.len(),
        }
    }
}

/// Everything the user can currently see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panels {
    pub preview: Option<Preview>,
    pub loading: bool,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl fmt::Display for Panels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", TITLE)?;
        match &self.preview {
            Some(p) => writeln!(f, "[preview] {} ({}, {} bytes)", p.file_name, p.mime_type, p.bytes)?,
            None => writeln!(f, "Choose an image")?,
        }
        if let Some(error) = &self.error {
            writeln!(f, "[error] {}", error)?;
        }
        if self.loading {
            writeln!(f, "{}", LOADING_MESSAGE)?;
        }
        if let Some(result) = &self.result {
            writeln!(f, "[result] {}", result)?;
            writeln!(f, "[{}]", RESET_LABEL)?;
        }
        Ok(())
    }
}
