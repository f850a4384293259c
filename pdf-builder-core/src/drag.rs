//! Drag lifecycle as explicit state transitions
//!
//! A drag is driven by an abstract [`InputEvent`] stream. The session records
//! the drop offset at drop time: once the dropzone is hidden at drag end the
//! pointer offsets are measured against a different box and become useless.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Where a drop landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropTarget {
    /// The dropzone overlaying the viewer
    Dropzone,
    /// Anywhere else, including outside the window
    Elsewhere,
}

/// A drop captured on the dropzone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropEvent {
    pub target: DropTarget,
    /// Pointer offset relative to the dropzone
    pub offset: Point,
}

impl DropEvent {
    pub fn on_dropzone(offset_x: f64, offset_y: f64) -> Self {
        Self {
            target: DropTarget::Dropzone,
            offset: Point::new(offset_x, offset_y),
        }
    }
}

/// Pointer and window input relevant to the builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InputEvent {
    /// A sidebar entry started dragging
    DragStart { field_type: String },
    /// The drag moved over a target
    DragOver { target: DropTarget },
    /// The dragged item was released over a target
    Drop {
        target: DropTarget,
        offset_x: f64,
        offset_y: f64,
    },
    /// The drag finished; `field_type` is the source element's `data-type`
    DragEnd {
        #[serde(default)]
        field_type: Option<String>,
    },
    /// The window was resized
    Resize,
}

/// A drop that should become a component
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub field_type: String,
    pub offset: Point,
}

/// State of the single in-progress drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    field_type: String,
    drop: Option<DropEvent>,
    dropzone_active: bool,
}

impl DragSession {
    /// Begin a drag of `field_type`; the dropzone becomes active
    pub fn start(field_type: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            drop: None,
            dropzone_active: true,
        }
    }

    pub fn field_type(&self) -> &str {
        &self.field_type
    }

    pub fn drop_event(&self) -> Option<&DropEvent> {
        self.drop.as_ref()
    }

    pub fn is_dropzone_active(&self) -> bool {
        self.dropzone_active
    }

    /// Remember the latest drop; drops outside the dropzone are not recorded
    pub fn record_drop(&mut self, drop: DropEvent) -> bool {
        if drop.target != DropTarget::Dropzone {
            return false;
        }
        self.drop = Some(drop);
        true
    }

    /// End the drag, consuming the session
    ///
    /// Yields a placement only if a drop on the dropzone was recorded.
    /// `source_type` is the type carried by the dragged element and wins over
    /// the type recorded at drag start.
    pub fn finish(self, source_type: Option<&str>) -> Option<Placement> {
        let offset = self.drop?.offset;
        let field_type = source_type
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or(self.field_type);
        Some(Placement { field_type, offset })
    }
}
