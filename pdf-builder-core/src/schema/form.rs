//! Top-level form document

use super::ComponentNode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Location of the uploaded PDF the form is overlaid on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfSettings {
    pub id: String,
    pub src: String,
}

/// Form-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<PdfSettings>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A form document: the root container of the component tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(default)]
    pub components: Vec<ComponentNode>,

    #[serde(default)]
    pub settings: FormSettings,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormSchema {
    /// Empty form displayed as a PDF overlay
    pub fn pdf() -> Self {
        Self {
            display: Some("pdf".to_string()),
            ..Default::default()
        }
    }

    /// Whether a PDF has been uploaded for this form
    pub fn has_pdf(&self) -> bool {
        self.settings.pdf.is_some()
    }

    /// Visit every component in the tree, parents first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ComponentNode)) {
        for node in &self.components {
            node.walk(visit);
        }
    }

    /// Every key currently used in the tree
    pub fn keys(&self) -> HashSet<String> {
        let mut keys = HashSet::new();
        self.walk(&mut |node| {
            if !node.key.is_empty() {
                keys.insert(node.key.clone());
            }
        });
        keys
    }

    /// Every instance id currently used in the tree
    pub fn ids(&self) -> HashSet<String> {
        let mut ids = HashSet::new();
        self.walk(&mut |node| {
            if !node.id.is_empty() {
                ids.insert(node.id.clone());
            }
        });
        ids
    }

    /// Give every component without an instance id a fresh one
    pub fn assign_missing_ids(&mut self) {
        let mut taken = self.ids();
        for node in &mut self.components {
            node.assign_missing_ids(&mut taken);
        }
    }

    /// Number of components in the tree, at any depth
    pub fn component_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// Component with instance id `id`; an empty id never matches
    pub fn find_by_id(&self, id: &str) -> Option<&ComponentNode> {
        if id.is_empty() {
            return None;
        }
        let mut found = None;
        self.walk(&mut |node| {
            if found.is_none() && node.id == id {
                found = Some(node);
            }
        });
        found
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut ComponentNode> {
        if id.is_empty() {
            return None;
        }
        find_mut(&mut self.components, &|node| node.id == id)
    }

    pub fn find_by_key(&self, key: &str) -> Option<&ComponentNode> {
        let mut found = None;
        self.walk(&mut |node| {
            if found.is_none() && node.key == key {
                found = Some(node);
            }
        });
        found
    }

    /// Child list of the container with `key`, or the root list for `None`
    pub fn container_mut(&mut self, key: Option<&str>) -> Option<&mut Vec<ComponentNode>> {
        match key {
            None => Some(&mut self.components),
            Some(key) => find_mut(&mut self.components, &|node| node.key == key)
                .map(|node| &mut node.components),
        }
    }
}

fn find_mut<'a>(
    nodes: &'a mut [ComponentNode],
    predicate: &dyn Fn(&ComponentNode) -> bool,
) -> Option<&'a mut ComponentNode> {
    for node in nodes.iter_mut() {
        if predicate(&*node) {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.components, predicate) {
            return Some(found);
        }
    }
    None
}
