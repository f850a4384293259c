//! # pdf-builder
//!
//! A drag-and-drop form builder that overlays fields onto an uploaded PDF.
//!
//! ## Features
//!
//! - **Field Palette**: Eleven PDF field types ready to drag from the sidebar
//! - **Drop Placement**: Dropped fields are positioned at the exact drop offset
//! - **Unique Keys**: Keys are derived from labels and kept unique across the whole form tree
//! - **Viewer Bridge**: Typed `{name, data}` messages to and from the embedded PDF viewer
//! - **Upload**: Multipart upload to a configurable `pdfServer` with inline errors
//! - **Events**: `addComponent`, `updateComponent` and `change` for external listeners
//!
//! ## Quick Start
//!
//! ```rust
//! use pdf_builder::{BuilderOptions, BuilderSession, FormSchema, PdfSettings, Result};
//! use pdf_builder::drag::DropEvent;
//!
//! # fn main() -> Result<()> {
//! let mut session = BuilderSession::new(BuilderOptions::new());
//!
//! let mut form = FormSchema::pdf();
//! form.settings.pdf = Some(PdfSettings {
//!     id: "doc".to_string(),
//!     src: "/api/pdf/doc".to_string(),
//! });
//! session.set_form(form)?;
//! session.attach();
//!
//! // Drag a text field from the sidebar and drop it on the document
//! session.on_drag_start("textfield");
//! session.on_dropzone_drop(DropEvent::on_dropzone(15.0, 40.0));
//! let node = session.on_drag_end(Some("textfield"))?.unwrap();
//!
//! assert_eq!(node.key, "textField");
//! assert_eq!(session.form().components.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Talking to a viewer
//!
//! ```rust
//! use pdf_builder::{bridge_pair, BuilderOptions, BuilderSession, Envelope, PdfViewer};
//! use serde_json::json;
//!
//! let (builder_end, viewer_end) = bridge_pair();
//! let mut session = BuilderSession::with_viewer(BuilderOptions::new(), PdfViewer::new(builder_end));
//!
//! // Unknown messages are ignored
//! viewer_end.post_envelope(Envelope {
//!     name: "iframe-scroll".to_string(),
//!     data: json!({}),
//! });
//! assert_eq!(session.pump(), 0);
//! ```

pub mod bridge;
pub mod builder;
pub mod drag;
pub mod dropzone;
pub mod error;
pub mod geometry;
pub mod options;
pub mod registry;
pub mod schema;
pub mod upload;

// Re-export commonly used types
pub use bridge::{bridge_pair, BridgeEndpoint, BridgeMessage, Envelope, PdfViewer, ViewerContainer};
pub use builder::{BuilderEvent, BuilderSession, BuilderView};
pub use drag::{DropEvent, DropTarget, InputEvent};
pub use error::{BuilderError, Result};
pub use geometry::{Point, Rect};
pub use options::{AttachMode, BuilderOptions};
pub use registry::{FieldRegistry, SidebarGroup, SidebarItem, PDF_FIELD_TYPES};
pub use schema::{ComponentNode, FormSchema, Overlay, PdfSettings};
pub use upload::{UploadFile, UploadOutcome, UploadPanel, UploadResponse, UploadTransport};

#[cfg(feature = "http")]
pub use upload::HttpTransport;

/// Current version of pdf-builder
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
