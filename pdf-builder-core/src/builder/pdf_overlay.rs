//! PDF-specific capability: dropzone, drag session, sidebar and viewer link

use crate::bridge::{PdfViewer, ViewerContainer};
use crate::drag::{DragSession, DropEvent, Placement};
use crate::dropzone::{Dropzone, DROPZONE_REF};
use crate::geometry::Rect;
use crate::registry::SidebarItem;
use tracing::debug;

/// Positioning layer stacked on top of the generic form builder
#[derive(Debug, Default)]
pub struct PdfOverlay {
    viewer: PdfViewer,
    dropzone: Option<Dropzone>,
    drag: Option<DragSession>,
    sidebar: Vec<SidebarItem>,
}

impl PdfOverlay {
    pub fn new(viewer: PdfViewer) -> Self {
        Self {
            viewer,
            ..Default::default()
        }
    }

    /// Wire up the dropzone and sidebar for the editor view
    ///
    /// Re-attaching keeps the existing dropzone, so its listeners survive.
    pub fn attach(&mut self, sidebar: Vec<SidebarItem>) {
        let dropzone = self.dropzone.get_or_insert_with(Dropzone::new);
        if !dropzone.is_listening() {
            dropzone.bind_events();
        }
        self.mount_dropzone();
        self.update_dropzone_dimensions();

        self.sidebar = sidebar;
        for item in &mut self.sidebar {
            item.draggable = true;
        }
    }

    /// Tear down the editor view, e.g. when falling back to the upload panel
    pub fn detach(&mut self) {
        self.dropzone = None;
        self.drag = None;
        self.sidebar.clear();
    }

    /// Drop the viewer link and every piece of editor state
    pub fn destroy(&mut self) {
        self.detach();
        self.viewer.disconnect();
    }

    /// Size the dropzone to the viewer container
    pub fn update_dropzone_dimensions(&mut self) {
        if let Some(dropzone) = self.dropzone.as_mut() {
            dropzone.update_dimensions(self.viewer.container_rect());
        }
    }

    fn mount_dropzone(&mut self) {
        let (Some(dropzone), Some(container)) =
            (self.dropzone.as_mut(), self.viewer.container_mut())
        else {
            return;
        };
        if !container.contains(DROPZONE_REF) {
            container.prepend(DROPZONE_REF);
        }
        dropzone.mount(container.generation);
    }

    /// The viewer (re)rendered into `container`
    pub fn viewer_attached(&mut self, container: ViewerContainer) {
        if let Some(dropzone) = self.dropzone.as_mut() {
            dropzone.unmount();
        }
        self.viewer.set_container(container);
        self.mount_dropzone();
        self.update_dropzone_dimensions();
    }

    /// The window was resized, optionally with a fresh viewer measurement
    pub fn window_resized(&mut self, container_rect: Option<Rect>) {
        if let Some(rect) = container_rect {
            self.viewer.set_container_rect(rect);
        }
        self.update_dropzone_dimensions();
    }

    pub fn drag_start(&mut self, field_type: &str) {
        if let Some(previous) = self.drag.as_ref() {
            debug!(
                field_type = previous.field_type(),
                "replacing unfinished drag session"
            );
        }
        self.update_dropzone_dimensions();
        if let Some(dropzone) = self.dropzone.as_mut() {
            dropzone.enable();
        }
        self.drag = Some(DragSession::start(field_type));
    }

    /// Record a drop on the dropzone; `false` if nothing could receive it
    pub fn dropzone_drop(&mut self, drop: DropEvent) -> bool {
        let dropzone_enabled = self
            .dropzone
            .as_ref()
            .is_some_and(|dropzone| dropzone.is_enabled());
        match self.drag.as_mut() {
            Some(session) if dropzone_enabled => session.record_drop(drop),
            _ => {
                debug!("drop outside an active drag, ignoring");
                false
            }
        }
    }

    /// Finish the drag and hide the dropzone
    pub fn drag_end(&mut self, source_type: Option<&str>) -> Option<Placement> {
        // Offsets must be read before the dropzone is hidden.
        let placement = self
            .drag
            .take()
            .and_then(|session| session.finish(source_type));

        if let Some(dropzone) = self.dropzone.as_mut() {
            dropzone.disable();
        }
        placement
    }

    pub fn viewer(&self) -> &PdfViewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut PdfViewer {
        &mut self.viewer
    }

    pub fn dropzone(&self) -> Option<&Dropzone> {
        self.dropzone.as_ref()
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn sidebar(&self) -> &[SidebarItem] {
        &self.sidebar
    }
}
