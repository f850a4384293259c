use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Json, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use pdf_builder::PdfSettings;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

/// Largest PDF accepted by the upload endpoint
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Magic bytes every PDF starts with
const PDF_HEADER: &[u8] = b"%PDF-";

/// An uploaded document held in memory
#[derive(Debug, Clone)]
pub struct StoredPdf {
    pub filename: String,
    pub bytes: Bytes,
    pub uploaded_at: DateTime<Utc>,
}

/// Shared application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pdfs: Arc<RwLock<HashMap<String, StoredPdf>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.pdfs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pdfs.read().await.is_empty()
    }
}

/// Response for the upload endpoint
///
/// `id` and `src` are the fields the builder stores under `settings.pdf`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadPdfResponse {
    #[serde(flatten)]
    pub pdf: PdfSettings,
    /// Uploaded file name
    pub filename: String,
    /// Size in bytes
    pub size: usize,
    pub uploaded_at: DateTime<Utc>,
}

/// Standard error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message describing what went wrong
    pub error: String,
}

/// Application-specific error types for the API
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file provided in upload")]
    MissingFile,

    #[error("Uploaded file is not a PDF")]
    NotPdf,

    #[error("Failed to read multipart field: {0}")]
    Multipart(#[from] MultipartError),

    #[error("PDF not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFile | AppError::NotPdf => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_response = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Build the application router with a fresh in-memory store
pub fn app() -> Router {
    app_with_state(AppState::new())
}

/// Build the application router around `state`
pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/api/upload", post(upload_pdf))
        .route("/api/pdf/{id}", get(get_pdf))
        .route("/api/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Content-derived document id: the first 16 bytes of the SHA-256, hex encoded
pub fn document_id(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .take(16)
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Whether `bytes` starts with a PDF header
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_HEADER)
}

/// Accept a PDF as the multipart `file` field and store it
pub async fn upload_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadPdfResponse>, AppError> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            debug!(field = field.name().unwrap_or_default(), "skipping multipart field");
            continue;
        }
        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("document.pdf")
            .to_string();
        upload = Some((filename, field.bytes().await?));
        break;
    }

    let (filename, bytes) = upload.ok_or(AppError::MissingFile)?;
    if !is_pdf(&bytes) {
        return Err(AppError::NotPdf);
    }

    let id = document_id(&bytes);
    let stored = StoredPdf {
        filename: filename.clone(),
        bytes,
        uploaded_at: Utc::now(),
    };
    let response = UploadPdfResponse {
        pdf: PdfSettings {
            id: id.clone(),
            src: format!("/api/pdf/{id}"),
        },
        filename,
        size: stored.bytes.len(),
        uploaded_at: stored.uploaded_at,
    };

    state.pdfs.write().await.insert(id.clone(), stored);
    info!(%id, filename = %response.filename, size = response.size, "stored PDF");

    Ok(Json(response))
}

/// Serve a stored PDF
pub async fn get_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let pdfs = state.pdfs.read().await;
    let stored = pdfs.get(&id).ok_or_else(|| AppError::NotFound(id.clone()))?;

    let disposition = format!("inline; filename=\"{}\"", stored.filename.replace('"', ""));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        stored.bytes.clone(),
    )
        .into_response())
}

/// Health check endpoint for monitoring and load balancing
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "pdf-builder API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
