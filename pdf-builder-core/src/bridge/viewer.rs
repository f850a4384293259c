//! Builder-side handle on the document viewer

use super::channel::BridgeEndpoint;
use super::message::{BridgeMessage, Envelope};
use crate::error::Result;
use crate::geometry::Rect;

/// The element the viewer renders into
///
/// The viewer recreates this element whenever it re-renders the document;
/// each incarnation gets a new `generation`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerContainer {
    pub generation: u64,
    /// Measured size, if the viewer has laid out yet
    pub rect: Option<Rect>,
    /// Element references currently inside the container, in order
    pub children: Vec<String>,
}

impl ViewerContainer {
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            rect: None,
            children: Vec::new(),
        }
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn contains(&self, element: &str) -> bool {
        self.children.iter().any(|child| child == element)
    }

    /// Insert `element` as the first child
    pub fn prepend(&mut self, element: impl Into<String>) {
        self.children.insert(0, element.into());
    }
}

/// Connection to the viewer plus the last known state of its container
#[derive(Debug, Default)]
pub struct PdfViewer {
    endpoint: Option<BridgeEndpoint>,
    container: Option<ViewerContainer>,
}

impl PdfViewer {
    pub fn new(endpoint: BridgeEndpoint) -> Self {
        Self {
            endpoint: Some(endpoint),
            container: None,
        }
    }

    /// Viewer with no channel; posts are dropped
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Post a message to the viewer; a no-op without a channel
    pub fn post_message(&self, message: &BridgeMessage) -> Result<bool> {
        match &self.endpoint {
            Some(endpoint) => endpoint.post(message),
            None => Ok(false),
        }
    }

    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.endpoint.as_mut().and_then(BridgeEndpoint::try_recv)
    }

    pub async fn recv(&mut self) -> Option<Envelope> {
        match self.endpoint.as_mut() {
            Some(endpoint) => endpoint.recv().await,
            None => None,
        }
    }

    pub fn container(&self) -> Option<&ViewerContainer> {
        self.container.as_ref()
    }

    pub fn container_mut(&mut self) -> Option<&mut ViewerContainer> {
        self.container.as_mut()
    }

    pub(crate) fn set_container(&mut self, container: ViewerContainer) {
        self.container = Some(container);
    }

    /// Measured rectangle of the container, if any
    pub fn container_rect(&self) -> Option<Rect> {
        self.container.as_ref().and_then(|container| container.rect)
    }

    /// Record a new measurement for the current container
    pub fn set_container_rect(&mut self, rect: Rect) {
        if let Some(container) = self.container.as_mut() {
            container.rect = Some(rect);
        }
    }

    /// Drop the channel and the container
    pub fn disconnect(&mut self) {
        self.endpoint = None;
        self.container = None;
    }
}
