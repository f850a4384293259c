//! Bridge message types and their `{name, data}` envelope

use crate::error::{BuilderError, Result};
use crate::schema::{ComponentNode, FormSchema, Overlay};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full schema replace, builder -> viewer
pub const FORM: &str = "form";
/// New component placed, builder -> viewer
pub const ADD_ELEMENT: &str = "addElement";
/// Viewer positioned a newly added component
pub const ELEMENT_UPDATE: &str = "iframe-elementUpdate";
/// User moved or resized a component inside the viewer
pub const COMPONENT_UPDATE: &str = "iframe-componentUpdate";
/// User clicked a component inside the viewer
pub const COMPONENT_CLICK: &str = "iframe-componentClick";

/// Wire shape of every bridge message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub name: String,
    #[serde(default)]
    pub data: Value,
}

/// Position report for a component the viewer just placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementUpdate {
    pub id: String,
    #[serde(default)]
    pub page: Option<u32>,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementUpdate {
    pub fn overlay(&self) -> Overlay {
        Overlay {
            page: self.page,
            left: self.left,
            top: self.top,
            width: self.width,
            height: self.height,
        }
    }
}

/// New overlay for a component the user moved or resized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentUpdate {
    pub id: String,
    pub overlay: Overlay,
}

/// A component was clicked in the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentClick {
    pub id: String,
}

/// Typed bridge message
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeMessage {
    Form(FormSchema),
    AddElement(ComponentNode),
    ElementUpdate(ElementUpdate),
    ComponentUpdate(ComponentUpdate),
    ComponentClick(ComponentClick),
}

impl BridgeMessage {
    /// Wire name of this message
    pub fn name(&self) -> &'static str {
        match self {
            BridgeMessage::Form(_) => FORM,
            BridgeMessage::AddElement(_) => ADD_ELEMENT,
            BridgeMessage::ElementUpdate(_) => ELEMENT_UPDATE,
            BridgeMessage::ComponentUpdate(_) => COMPONENT_UPDATE,
            BridgeMessage::ComponentClick(_) => COMPONENT_CLICK,
        }
    }

    /// Encode into a wire envelope
    pub fn to_envelope(&self) -> Result<Envelope> {
        let data = match self {
            BridgeMessage::Form(form) => serde_json::to_value(form)?,
            BridgeMessage::AddElement(node) => serde_json::to_value(node)?,
            BridgeMessage::ElementUpdate(update) => serde_json::to_value(update)?,
            BridgeMessage::ComponentUpdate(update) => serde_json::to_value(update)?,
            BridgeMessage::ComponentClick(click) => serde_json::to_value(click)?,
        };
        Ok(Envelope {
            name: self.name().to_string(),
            data,
        })
    }

    /// Decode an envelope
    ///
    /// Unknown names decode to `Ok(None)` so newer peers can add messages.
    /// A known name with a payload of the wrong shape is an error.
    pub fn from_envelope(envelope: Envelope) -> Result<Option<Self>> {
        let Envelope { name, data } = envelope;
        let decoded = match name.as_str() {
            FORM => serde_json::from_value(data).map(BridgeMessage::Form),
            ADD_ELEMENT => serde_json::from_value(data).map(BridgeMessage::AddElement),
            ELEMENT_UPDATE => serde_json::from_value(data).map(BridgeMessage::ElementUpdate),
            COMPONENT_UPDATE => serde_json::from_value(data).map(BridgeMessage::ComponentUpdate),
            COMPONENT_CLICK => serde_json::from_value(data).map(BridgeMessage::ComponentClick),
            _ => return Ok(None),
        };

        decoded
            .map(Some)
            .map_err(|e| BuilderError::MalformedMessage {
                name,
                reason: e.to_string(),
            })
    }
}
