//! The builder session: one explicit object owning all builder state
//!
//! A session composes two capabilities instead of layering them by
//! inheritance:
//!
//! - [`FormBuilder`] owns the canonical schema, key uniquification, the edit
//!   UI selection and event fan-out.
//! - [`PdfOverlay`] owns the dropzone, the drag session, the sidebar and the
//!   link to the document viewer.
//!
//! Every handler takes `&mut self` and runs to completion; the only
//! suspension points are the upload request and waiting for bridge traffic.

mod events;
mod form_builder;
mod pdf_overlay;

pub use events::{BuilderEvent, EventEmitter};
pub use form_builder::FormBuilder;
pub use pdf_overlay::PdfOverlay;

use crate::bridge::{
    BridgeMessage, ComponentClick, ComponentUpdate, ElementUpdate, Envelope, PdfViewer,
    ViewerContainer,
};
use crate::drag::{DragSession, DropEvent, InputEvent};
use crate::dropzone::Dropzone;
use crate::error::{BuilderError, Result};
use crate::geometry::{Point, Rect};
use crate::options::{AttachMode, BuilderOptions};
use crate::registry::{FieldRegistry, SidebarItem};
use crate::schema::{ComponentNode, FormSchema, Overlay};
use crate::upload::{
    UploadFile, UploadOutcome, UploadPanel, UploadTransport, PDF_SERVER_NOT_SET, UPLOAD_FAILED,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

/// Which face the builder currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderView {
    /// Not attached yet
    Detached,
    /// No PDF yet: the upload panel
    Upload,
    /// Sidebar, viewer and dropzone
    Editor,
}

/// Builder for overlaying form fields on a PDF
#[derive(Debug)]
pub struct BuilderSession {
    options: BuilderOptions,
    registry: FieldRegistry,
    form: FormBuilder,
    overlay: PdfOverlay,
    upload: UploadPanel,
    initialized: bool,
    view: BuilderView,
}

impl BuilderSession {
    /// Session with the default PDF field set and no viewer connection
    pub fn new(options: BuilderOptions) -> Self {
        Self::with_parts(options, FieldRegistry::pdf_defaults(), PdfViewer::detached())
    }

    /// Session talking to `viewer`
    pub fn with_viewer(options: BuilderOptions, viewer: PdfViewer) -> Self {
        Self::with_parts(options, FieldRegistry::pdf_defaults(), viewer)
    }

    /// Fully composed session
    ///
    /// All internal state is built before `init` runs; with `skip_init` the
    /// caller runs it later (attaching also runs it).
    pub fn with_parts(options: BuilderOptions, registry: FieldRegistry, viewer: PdfViewer) -> Self {
        let skip_init = options.skip_init;
        let mut session = Self {
            options,
            registry,
            form: FormBuilder::new(FormSchema::pdf()),
            overlay: PdfOverlay::new(viewer),
            upload: UploadPanel::new(),
            initialized: false,
            view: BuilderView::Detached,
        };
        if !skip_init {
            session.init();
        }
        session
    }

    /// Switch into builder attach mode; idempotent
    pub fn init(&mut self) {
        self.options.attach_mode = AttachMode::Builder;
        if !self.initialized {
            self.initialized = true;
            debug!(connected = self.overlay.viewer().is_connected(), "builder initialized");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Attach to the page: the upload panel without a PDF, the editor with one
    pub fn attach(&mut self) {
        self.init();

        if !self.has_pdf() {
            self.overlay.detach();
            self.upload.load();
            if self.options.pdf_server().is_none() {
                self.upload.set_error(Some(PDF_SERVER_NOT_SET));
            } else {
                self.upload.set_error(None);
            }
            self.view = BuilderView::Upload;
            return;
        }

        self.upload.unload();
        let sidebar = self.registry.sidebar_items();
        self.overlay.attach(sidebar);
        self.view = BuilderView::Editor;
    }

    /// Re-render against the current form
    pub fn rebuild(&mut self) {
        self.attach();
    }

    /// Replace the form and push it to the viewer
    pub fn set_form(&mut self, form: FormSchema) -> Result<()> {
        self.overlay.drag_end(None);
        self.form.set_form(form);
        self.overlay
            .viewer()
            .post_message(&BridgeMessage::Form(self.form.form().clone()))?;
        if self.view != BuilderView::Detached {
            self.rebuild();
        }
        Ok(())
    }

    /// Disconnect from the viewer and drop editor state
    pub fn destroy(&mut self) {
        self.overlay.destroy();
        self.upload.unload();
        self.view = BuilderView::Detached;
    }

    pub fn has_pdf(&self) -> bool {
        self.form.form().has_pdf()
    }

    pub fn view(&self) -> BuilderView {
        self.view
    }

    pub fn options(&self) -> &BuilderOptions {
        &self.options
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn form(&self) -> &FormSchema {
        self.form.form()
    }

    pub fn upload_panel(&self) -> &UploadPanel {
        &self.upload
    }

    pub fn dropzone(&self) -> Option<&Dropzone> {
        self.overlay.dropzone()
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.overlay.drag_session()
    }

    pub fn sidebar(&self) -> &[SidebarItem] {
        self.overlay.sidebar()
    }

    pub fn viewer(&self) -> &PdfViewer {
        self.overlay.viewer()
    }

    /// Component currently open in the edit UI
    pub fn editing(&self) -> Option<&ComponentNode> {
        self.form.editing()
    }

    /// Choose the container new components are added to
    pub fn select_container(&mut self, key: Option<&str>) -> Result<()> {
        self.form.select_container(key)
    }

    /// Listen for `addComponent`, `updateComponent` and `change`
    pub fn subscribe(&mut self) -> UnboundedReceiver<BuilderEvent> {
        self.form.subscribe()
    }

    // Drag and drop

    /// Feed one input event through the drag state machine
    ///
    /// Returns the component created by a completed drop, if any.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<Option<ComponentNode>> {
        match event {
            InputEvent::DragStart { field_type } => {
                self.on_drag_start(&field_type);
                Ok(None)
            }
            InputEvent::DragOver { .. } => Ok(None),
            InputEvent::Drop {
                target,
                offset_x,
                offset_y,
            } => {
                self.on_dropzone_drop(DropEvent {
                    target,
                    offset: Point::new(offset_x, offset_y),
                });
                Ok(None)
            }
            InputEvent::DragEnd { field_type } => self.on_drag_end(field_type.as_deref()),
            InputEvent::Resize => {
                self.on_window_resize(None);
                Ok(None)
            }
        }
    }

    pub fn on_drag_start(&mut self, field_type: &str) {
        self.overlay.drag_start(field_type);
    }

    pub fn on_dropzone_drop(&mut self, drop: DropEvent) {
        self.overlay.dropzone_drop(drop);
    }

    /// Finish the drag; creates a component only if a drop was recorded
    ///
    /// The dropzone is hidden and the session cleared in every case, even
    /// when the dropped type turns out to be unknown.
    pub fn on_drag_end(&mut self, source_type: Option<&str>) -> Result<Option<ComponentNode>> {
        let Some(placement) = self.overlay.drag_end(source_type) else {
            debug!("drag ended without a drop on the dropzone");
            return Ok(None);
        };
        self.place(&placement.field_type, Overlay::at(placement.offset))
            .map(Some)
    }

    /// Add a component of `field_type` at `overlay` and announce it to the viewer
    pub fn place(&mut self, field_type: &str, overlay: Overlay) -> Result<ComponentNode> {
        let template = self
            .registry
            .instantiate(field_type)
            .ok_or_else(|| BuilderError::UnknownFieldType(field_type.to_string()))?;

        let node = self.form.insert_component(template, overlay);
        self.overlay
            .viewer()
            .post_message(&BridgeMessage::AddElement(node.clone()))?;

        info!(
            key = %node.key,
            field_type,
            left = overlay.left,
            top = overlay.top,
            "placed component"
        );
        Ok(node)
    }

    // Viewer notifications

    /// The viewer rendered into a (possibly new) container element
    pub fn on_viewer_attach(&mut self, container: ViewerContainer) {
        self.overlay.viewer_attached(container);
    }

    /// The window was resized; `container_rect` is a fresh viewer measurement
    pub fn on_window_resize(&mut self, container_rect: Option<Rect>) {
        self.overlay.window_resized(container_rect);
    }

    /// Handle one envelope from the viewer; `true` if it changed anything
    ///
    /// Unknown names and malformed payloads are logged and dropped.
    pub fn handle_envelope(&mut self, envelope: Envelope) -> bool {
        let name = envelope.name.clone();
        match BridgeMessage::from_envelope(envelope) {
            Ok(Some(message)) => self.handle_message(message),
            Ok(None) => {
                debug!(message = %name, "ignoring unknown bridge message");
                false
            }
            Err(err) => {
                warn!(error = %err, "ignoring malformed bridge message");
                false
            }
        }
    }

    pub fn handle_message(&mut self, message: BridgeMessage) -> bool {
        match message {
            BridgeMessage::ElementUpdate(update) => self.on_element_update(&update),
            BridgeMessage::ComponentUpdate(update) => self.on_component_update(&update),
            BridgeMessage::ComponentClick(click) => self.on_component_click(&click),
            BridgeMessage::Form(_) | BridgeMessage::AddElement(_) => {
                debug!(message = message.name(), "builder-bound copy of a viewer message, ignoring");
                false
            }
        }
    }

    /// The viewer positioned a component: store it and open its editor
    pub fn on_element_update(&mut self, update: &ElementUpdate) -> bool {
        let Some(node) = self.form.set_overlay(&update.id, update.overlay()) else {
            debug!(id = %update.id, "element update for unknown component");
            return false;
        };
        self.form.edit_component(&update.id);
        self.form.emit(BuilderEvent::UpdateComponent(node));
        true
    }

    /// The user moved or resized a component inside the viewer
    pub fn on_component_update(&mut self, update: &ComponentUpdate) -> bool {
        let Some(node) = self.form.set_overlay(&update.id, update.overlay) else {
            debug!(id = %update.id, "component update for unknown component");
            return false;
        };
        self.form.emit(BuilderEvent::UpdateComponent(node));
        self.form.emit_change();
        true
    }

    /// The user clicked a component inside the viewer
    pub fn on_component_click(&mut self, click: &ComponentClick) -> bool {
        let opened = self.form.edit_component(&click.id);
        if !opened {
            debug!(id = %click.id, "click on unknown component");
        }
        opened
    }

    /// Handle every viewer message already queued; returns how many were applied
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(envelope) = self.overlay.viewer_mut().try_recv() {
            if self.handle_envelope(envelope) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next viewer message and handle it
    ///
    /// `None` once the viewer hangs up, otherwise whether the message applied.
    pub async fn recv(&mut self) -> Option<bool> {
        let envelope = self.overlay.viewer_mut().recv().await?;
        Some(self.handle_envelope(envelope))
    }

    /// Handle viewer messages until the viewer hangs up
    pub async fn run(&mut self) {
        while self.recv().await.is_some() {}
        debug!("viewer channel closed");
    }

    // Upload

    /// Upload a PDF to the configured `pdfServer`
    ///
    /// Every failure lands in the upload panel; nothing is retried.
    pub async fn upload<T: UploadTransport>(
        &mut self,
        transport: &T,
        file: &UploadFile,
    ) -> UploadOutcome {
        let Some(url) = self.options.pdf_server().map(str::to_string) else {
            self.upload.set_error(Some(PDF_SERVER_NOT_SET));
            return UploadOutcome::NotConfigured;
        };

        info!(%url, file = %file.name, bytes = file.bytes.len(), "uploading PDF");
        match transport.post_file(&url, file).await {
            Ok(response) if response.is_success() => {
                self.upload.set_error(None);
                let settings = response.pdf_settings();
                if let Some(pdf) = settings.clone() {
                    self.form.set_pdf(pdf);
                    if let Err(err) = self
                        .overlay
                        .viewer()
                        .post_message(&BridgeMessage::Form(self.form.form().clone()))
                    {
                        warn!(error = %err, "could not send uploaded form to viewer");
                    }
                    self.form.emit_change();
                }
                self.rebuild();
                UploadOutcome::Uploaded(settings)
            }
            Ok(response) => {
                let message = format!("{} - {}", response.status_text, response.body);
                warn!(status = response.status, "upload rejected");
                self.upload.set_error(Some(&message));
                UploadOutcome::Rejected {
                    status: response.status,
                }
            }
            Err(err) => {
                warn!(error = %err, "upload failed");
                self.upload.set_error(Some(UPLOAD_FAILED));
                UploadOutcome::Failed
            }
        }
    }
}
