//! # Classification Client
//!
//! Uploads a [`ScaledFile`] to the remote classifier and maps the reply.
//!
//! ## Wire format
//!
//! - `POST <endpoint>/api/1.0/classify-image`
//! - `multipart/form-data` with a single part named `image` carrying the file
//!   bytes, file name and MIME type
//! - No extra headers, no authentication, no timeout
//!
//! ## Response mapping
//!
//! | Outcome | Result |
//! |---------|--------|
//! | 2xx with `{"result": ...}` | `Ok(result)` |
//! | 2xx without a usable `result` | `ClassifyError::InvalidResponse` |
//! | other status with `{"message": ...}` | `ClassifyError::Server` carrying the message |
//! | no response | `ClassifyError::Transport` |

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ClassifyError, ClassifyResult};
use crate::processing::ScaledFile;

/// Request path appended to the configured endpoint.
pub const CLASSIFY_PATH: &str = "/api/1.0/classify-image";
/// Multipart field that carries the image.
pub const IMAGE_FIELD: &str = "image";

/// Anything that can turn an uploaded image into result text.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify one image, returning the text to show the user.
    async fn classify(&self, file: &ScaledFile) -> ClassifyResult<String>;
}

#[derive(Debug, Deserialize)]
struct SuccessBody {
    result: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<serde_json::Value>,
}

/// HTTP implementation backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    url: String,
}

impl HttpClassifier {
    /// Build a classifier for `endpoint`.
    ///
    /// The client is built without a request timeout; a call settles only
    /// when the transport does.
    pub fn new(endpoint: &str) -> ClassifyResult<Self> {
        let client = Client::builder().build().map_err(|e| {
            ClassifyError::config("endpoint", endpoint, format!("cannot build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            url: format!("{}{}", endpoint.trim().trim_end_matches('/'), CLASSIFY_PATH),
        })
    }

    /// Full URL requests are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn form(file: &ScaledFile) -> ClassifyResult<Form> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.mime_type)
            .map_err(|e| ClassifyError::encode(format!("invalid MIME type: {}", e)))?;
        Ok(Form::new().part(IMAGE_FIELD, part))
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, file: &ScaledFile) -> ClassifyResult<String> {
        let form = Self::form(file)?;
        info!(url = %self.url, file = %file.file_name, bytes = file.bytes.len(), "uploading image");

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.url, error = %e, "classification request failed");
                ClassifyError::transport(self.url.clone(), e).with_operation("classify_image")
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ClassifyError::transport(self.url.clone(), e).with_operation("read_response")
        })?;
        debug!(status = status.as_u16(), body_len = body.len(), "classifier responded");

        interpret_response(status.as_u16(), status.is_success(), &body)
    }
}

/// Map a status and raw body onto the result text or an error.
fn interpret_response(status: u16, success: bool, body: &str) -> ClassifyResult<String> {
    if success {
        let parsed: SuccessBody = serde_json::from_str(body).map_err(|e| {
            ClassifyError::invalid_response(status, format!("body is not JSON: {}", e))
        })?;
        return match parsed.result {
            Some(value) => Ok(value_to_text(value)),
            None => Err(ClassifyError::invalid_response(
                status,
                "response has no 'result' field",
            )),
        };
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(value_to_text)
        .unwrap_or_else(|| format!("server responded with status {}", status));
    warn!(status, %message, "classifier rejected image");
    Err(ClassifyError::server(status, message))
}

/// Strings are shown as-is; any other JSON value is shown in its JSON form.
fn value_to_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
