//! PDF upload to the configured `pdfServer`
//!
//! Failures never escape as errors: they end up as inline text on the
//! [`UploadPanel`]. A second upload simply overwrites whatever the first one
//! left there.

use crate::error::Result;
use crate::schema::PdfSettings;
use serde_json::Value;
use std::future::Future;
use std::path::Path;

/// Shown while no upload endpoint is configured
pub const PDF_SERVER_NOT_SET: &str =
    "PDF Server not set. Please set the PDF Server in options.pdfServer so the upload can occur.";

/// Shown when the request could not be completed at all
pub const UPLOAD_FAILED: &str = "Upload failed.";

/// `Accept` header sent with uploads
pub const ACCEPT: &str = "application/json, text/plain, */*";

/// A file picked or dropped by the user
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: "application/pdf".to_string(),
            bytes,
        }
    }

    /// Read a PDF from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Ok(Self::pdf(name, bytes))
    }
}

/// What the server answered
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResponse {
    pub status: u16,
    /// Reason phrase of the status, e.g. `Internal Server Error`
    pub status_text: String,
    pub body: String,
}

impl UploadResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// PDF settings carried by a successful response, if any
    ///
    /// Accepts either `{"id", "src"}` or the same wrapped as
    /// `{"settings": {"pdf": {...}}}`.
    pub fn pdf_settings(&self) -> Option<PdfSettings> {
        let value: Value = serde_json::from_str(&self.body).ok()?;
        let candidate = value.pointer("/settings/pdf").cloned().unwrap_or(value);
        serde_json::from_value(candidate).ok()
    }
}

/// Sends a file to an upload endpoint as `multipart/form-data`
pub trait UploadTransport {
    /// POST `file` as the `file` part; `Err` only for network-level failures
    fn post_file(
        &self,
        url: &str,
        file: &UploadFile,
    ) -> impl Future<Output = Result<UploadResponse>> + Send;
}

/// Result of one upload attempt
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// No endpoint configured; no request was made
    NotConfigured,
    /// Server accepted the file
    Uploaded(Option<PdfSettings>),
    /// Server answered with a non-200 status
    Rejected { status: u16 },
    /// The request never completed
    Failed,
}

/// Inline upload UI state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadPanel {
    loaded: bool,
    error: Option<String>,
}

impl UploadPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the upload UI elements are present
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) fn load(&mut self) {
        self.loaded = true;
    }

    pub(crate) fn unload(&mut self) {
        self.loaded = false;
    }

    /// Set or clear the inline error
    pub fn set_error(&mut self, message: Option<&str>) {
        self.error = message.filter(|m| !m.is_empty()).map(str::to_string);
    }

    /// Whether the error element is shown; it only exists while loaded
    pub fn is_error_visible(&self) -> bool {
        self.loaded && self.error.is_some()
    }

    /// Text of the error element, empty when hidden
    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or("")
    }
}

/// Production transport backed by `reqwest`
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
impl UploadTransport for HttpTransport {
    async fn post_file(&self, url: &str, file: &UploadFile) -> Result<UploadResponse> {
        use crate::error::BuilderError;

        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| BuilderError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BuilderError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BuilderError::Transport(e.to_string()))?;

        Ok(UploadResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
