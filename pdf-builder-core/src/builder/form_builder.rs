//! Generic form-building capability: owns the schema tree and its mutations

use super::events::{BuilderEvent, EventEmitter};
use crate::error::{BuilderError, Result};
use crate::schema::{derive_key, uniquify, ComponentNode, FormSchema, Overlay, PdfSettings};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::warn;

/// Canonical form schema plus the editing state around it
#[derive(Debug, Default)]
pub struct FormBuilder {
    form: FormSchema,
    active_container: Option<String>,
    editing: Option<String>,
    events: EventEmitter,
}

impl FormBuilder {
    pub fn new(mut form: FormSchema) -> Self {
        form.assign_missing_ids();
        Self {
            form,
            ..Default::default()
        }
    }

    pub fn form(&self) -> &FormSchema {
        &self.form
    }

    /// Replace the whole form; editing state does not survive a reset
    ///
    /// Components arriving without an instance id get one here, so the
    /// viewer can address everything in the tree.
    pub fn set_form(&mut self, mut form: FormSchema) {
        form.assign_missing_ids();
        self.form = form;
        self.editing = None;
        if let Some(key) = self.active_container.as_deref() {
            if self.form.find_by_key(key).is_none() {
                self.active_container = None;
            }
        }
    }

    pub(crate) fn set_pdf(&mut self, pdf: PdfSettings) {
        self.form.settings.pdf = Some(pdf);
    }

    /// Choose where new components go; `None` selects the root
    pub fn select_container(&mut self, key: Option<&str>) -> Result<()> {
        if let Some(key) = key {
            if self.form.find_by_key(key).is_none() {
                return Err(BuilderError::UnknownContainer(key.to_string()));
            }
        }
        self.active_container = key.map(str::to_string);
        Ok(())
    }

    pub fn active_container(&self) -> Option<&str> {
        self.active_container.as_deref()
    }

    /// Insert a fresh component at `overlay`
    ///
    /// The key is derived from the node's label, placeholder or type and made
    /// unique against the entire tree before the node is appended to the
    /// active container. Emits `addComponent`.
    pub fn insert_component(&mut self, mut node: ComponentNode, overlay: Overlay) -> ComponentNode {
        node.key = derive_key(&node);
        let mut taken = self.form.keys();
        uniquify(&mut taken, &mut node);
        node.assign_missing_ids(&mut self.form.ids());
        node.overlay = Some(overlay);

        let container = self.active_container.clone();
        match self.form.container_mut(container.as_deref()) {
            Some(children) => children.push(node.clone()),
            None => {
                warn!(
                    container = container.as_deref().unwrap_or_default(),
                    "active container vanished, adding to root"
                );
                self.active_container = None;
                self.form.components.push(node.clone());
            }
        }

        self.events.emit(BuilderEvent::AddComponent(node.clone()));
        node
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ComponentNode> {
        self.form.find_by_id(id)
    }

    /// Replace a component's overlay wholesale; `None` if the id is unknown
    pub fn set_overlay(&mut self, id: &str, overlay: Overlay) -> Option<ComponentNode> {
        let node = self.form.find_by_id_mut(id)?;
        node.overlay = Some(overlay);
        Some(node.clone())
    }

    /// Open the edit UI for a component; `false` if the id is unknown
    pub fn edit_component(&mut self, id: &str) -> bool {
        if self.form.find_by_id(id).is_none() {
            return false;
        }
        self.editing = Some(id.to_string());
        true
    }

    /// Component currently open in the edit UI
    pub fn editing(&self) -> Option<&ComponentNode> {
        self.editing
            .as_deref()
            .and_then(|id| self.form.find_by_id(id))
    }

    pub fn close_editor(&mut self) {
        self.editing = None;
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<BuilderEvent> {
        self.events.subscribe()
    }

    pub fn emit(&mut self, event: BuilderEvent) {
        self.events.emit(event);
    }

    /// Emit `change` with a snapshot of the current form
    pub fn emit_change(&mut self) {
        let snapshot = self.form.clone();
        self.events.emit(BuilderEvent::Change(snapshot));
    }
}
