//! # Error Handling
//!
//! Error types for the classification client. Every failure that can end a
//! submission is one variant of [`ClassifyError`], carrying an [`ErrorContext`]
//! with timestamp, operation, severity and an optional recovery suggestion.
//!
//! ## Taxonomy
//!
//! - **Local** (resize stage): `Decode`, `Encode`
//! - **Remote** (classification service): `Server`, `InvalidResponse`
//! - **Transport** (no response at all): `Transport`
//! - **Ambient**: `Config`, `Io`
//!
//! All of them are terminal for the current submission; nothing is retried.
//!
//! ## Usage
//!
//! ```rust
//! use image_classify::error::{ClassifyError, HasRecoverySuggestion};
//!
//! let error = ClassifyError::server(403, "unsupported format")
//!     .with_operation("classify_image")
//!     .with_recovery_suggestion("Upload a JPEG or PNG photo");
//!
//! assert_eq!(error.user_message(), "unsupported format");
//! assert_eq!(error.recovery_suggestion(), Some("Upload a JPEG or PNG photo"));
//! ```

use std::{collections::HashMap, error::Error as StdError, fmt, time::SystemTime};

/// Stable text shown when the classification service could not be reached.
pub const TRANSPORT_MESSAGE: &str =
    "Could not reach the classification service. Check your connection and try again.";

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Errors that end the current submission
    Error,
    /// Errors that prevent any submission from running
    Fatal,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The operation being performed when the error occurred
    pub operation: Option<String>,
    /// Suggested recovery action
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Additional metadata as key-value pairs
    pub metadata: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
            metadata: HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    fn fatal() -> Self {
        Self {
            severity: ErrorSeverity::Fatal,
            ..Self::default()
        }
    }
}

/// Base error type for the classification client
#[derive(Debug)]
pub enum ClassifyError {
    /// Configuration validation errors
    Config {
        field: String,
        value: String,
        reason: String,
        context: ErrorContext,
    },
    /// I/O errors while reading the source image
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// The source bytes are not a decodable raster image
    Decode {
        file_name: String,
        reason: String,
        context: ErrorContext,
    },
    /// The downscaled surface could not be re-encoded
    Encode {
        reason: String,
        context: ErrorContext,
    },
    /// The service answered with a non-success status
    Server {
        status: u16,
        message: String,
        context: ErrorContext,
    },
    /// The service answered with success but the payload was unusable
    InvalidResponse {
        status: u16,
        reason: String,
        context: ErrorContext,
    },
    /// No response was received
    Transport {
        endpoint: String,
        source: Box<dyn StdError + Send + Sync>,
        context: ErrorContext,
    },
}

impl ClassifyError {
    /// Create a configuration error
    pub fn config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
            context: ErrorContext::fatal(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create a decode error
    pub fn decode(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            file_name: file_name.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an encode error
    pub fn encode(reason: impl Into<String>) -> Self {
        Self::Encode {
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a server-reported error
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(status: u16, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            status,
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a transport error
    pub fn transport(
        endpoint: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            source: Box::new(source),
            context: ErrorContext::new(),
        }
    }

    /// Attach the path an I/O error happened on
    pub fn with_path(mut self, new_path: impl Into<String>) -> Self {
        if let Self::Io { path, .. } = &mut self {
            *path = Some(new_path.into());
        }
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_mut().metadata.insert(key.into(), value.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Config { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::Decode { context, .. } => context,
            Self::Encode { context, .. } => context,
            Self::Server { context, .. } => context,
            Self::InvalidResponse { context, .. } => context,
            Self::Transport { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Config { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::Decode { context, .. } => context,
            Self::Encode { context, .. } => context,
            Self::Server { context, .. } => context,
            Self::InvalidResponse { context, .. } => context,
            Self::Transport { context, .. } => context,
        }
    }

    /// Get the error category as a string
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Io { .. } => "io",
            Self::Decode { .. } => "decode",
            Self::Encode { .. } => "encode",
            Self::Server { .. } => "server",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::Transport { .. } => "transport",
        }
    }

    /// Text shown in the error panel.
    ///
    /// Server messages are shown verbatim, resize failures show whatever the
    /// decoder or encoder reported, and transport failures collapse to
    /// [`TRANSPORT_MESSAGE`] instead of exposing the underlying error object.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message, .. } => message.clone(),
            Self::Transport { .. } => TRANSPORT_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::Config {
                field,
                value,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Configuration error in '{}': {} (value: {})",
                    field, reason, value
                )
            }
            ClassifyError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(
                        f,
                        "I/O error during {} on '{}': {}",
                        operation, path, source
                    )
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)
                }
            }
            ClassifyError::Decode {
                file_name, reason, ..
            } => {
                write!(f, "Could not decode image '{}': {}", file_name, reason)
            }
            ClassifyError::Encode { reason, .. } => {
                write!(f, "Could not encode resized image: {}", reason)
            }
            ClassifyError::Server {
                status, message, ..
            } => {
                write!(f, "Classification failed (status {}): {}", status, message)
            }
            ClassifyError::InvalidResponse {
                status, reason, ..
            } => {
                write!(
                    f,
                    "Unexpected response from classifier (status {}): {}",
                    status, reason
                )
            }
            ClassifyError::Transport {
                endpoint, source, ..
            } => {
                write!(f, "Network error while calling {}: {}", endpoint, source)
            }
        }
    }
}

impl StdError for ClassifyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Transport { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Trait for errors with severity levels
pub trait HasSeverity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for ClassifyError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    /// Get recovery suggestion for this error
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for ClassifyError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}
