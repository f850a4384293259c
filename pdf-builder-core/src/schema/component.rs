//! Component nodes and their overlay records

use crate::geometry::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Position of a component on the document, in viewer units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// 1-based page number; absent until the viewer has placed the component
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Overlay {
    /// Width given to freshly dropped components
    pub const DEFAULT_WIDTH: f64 = 100.0;
    /// Height given to freshly dropped components
    pub const DEFAULT_HEIGHT: f64 = 20.0;

    /// Overlay at a drop offset with the default size and no page yet
    pub fn at(offset: Point) -> Self {
        Self {
            page: None,
            left: offset.x,
            top: offset.y,
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }

    /// Overlay with every field set
    pub fn on_page(page: u32, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            page: Some(page),
            left,
            top,
            width,
            height,
        }
    }
}

/// One node of the form schema tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    /// Instance id used by the viewer to address this node
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Data key, unique across the whole form
    #[serde(default)]
    pub key: String,

    #[serde(rename = "type")]
    pub component_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Overlay>,

    /// Type-specific configuration, preserved verbatim
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl ComponentNode {
    /// Create a bare node of the given type
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            ..Default::default()
        }
    }

    /// Set the key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the instance id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append a child component
    pub fn with_child(mut self, child: ComponentNode) -> Self {
        self.components.push(child);
        self
    }

    /// Visit this node and all of its descendants, parents first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ComponentNode)) {
        visit(self);
        for child in &self.components {
            child.walk(visit);
        }
    }

    /// Mutable variant of [`ComponentNode::walk`]
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut ComponentNode)) {
        visit(self);
        for child in &mut self.components {
            child.walk_mut(visit);
        }
    }

    /// Give this node and its descendants an instance id where they lack one
    ///
    /// New ids are drawn until they miss every id in `taken`, and are added
    /// to it.
    pub(crate) fn assign_missing_ids(&mut self, taken: &mut HashSet<String>) {
        self.assign_missing_ids_with(taken, &mut generate_id);
    }

    fn assign_missing_ids_with(
        &mut self,
        taken: &mut HashSet<String>,
        generate: &mut impl FnMut() -> String,
    ) {
        self.walk_mut(&mut |node| {
            if !node.id.is_empty() {
                return;
            }
            let id = loop {
                let candidate = generate();
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            taken.insert(id.clone());
            node.id = id;
        });
    }
}

/// Instance ids look like `e` followed by seven lowercase hex digits
fn generate_id() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..0x1000_0000);
    format!("e{value:07x}")
}
