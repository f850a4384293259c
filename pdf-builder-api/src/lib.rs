//! # pdf-builder-api
//!
//! Reference upload server for pdf-builder: accepts PDFs from the builder's
//! upload panel and serves them back to the viewer.
//!

mod api;
pub use api::{
    app, app_with_state, document_id, get_pdf, health_check, is_pdf, upload_pdf, AppError,
    AppState, ErrorResponse, StoredPdf, UploadPdfResponse, MAX_UPLOAD_BYTES,
};
