//! Field type registry and sidebar groups
//!
//! The registry owns the canonical template of every placeable field type.
//! Templates are never handed out mutably: [`FieldRegistry::instantiate`]
//! returns an owned deep copy, so editing a placed component can never leak
//! back into later drags of the same type.

use crate::schema::ComponentNode;
use lazy_static::lazy_static;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

/// Field types offered in the PDF sidebar group, in display order
pub const PDF_FIELD_TYPES: &[&str] = &[
    "textfield",
    "number",
    "password",
    "email",
    "phoneNumber",
    "currency",
    "checkbox",
    "signature",
    "select",
    "textarea",
    "datetime",
];

lazy_static! {
    static ref PDF_FIELD_TEMPLATES: BTreeMap<String, ComponentNode> = {
        let raw = json!({
            "textfield": {"type": "textfield", "label": "Text Field", "key": "textField", "input": true, "tableView": true},
            "number": {"type": "number", "label": "Number", "key": "number", "input": true, "tableView": true},
            "password": {"type": "password", "label": "Password", "key": "password", "input": true, "protected": true},
            "email": {"type": "email", "label": "Email", "key": "email", "input": true, "kickbox": {"enabled": false}},
            "phoneNumber": {"type": "phoneNumber", "label": "Phone Number", "key": "phoneNumber", "input": true, "inputMask": "(999) 999-9999"},
            "currency": {"type": "currency", "label": "Currency", "key": "currency", "input": true, "currency": "USD", "delimiter": true},
            "checkbox": {"type": "checkbox", "label": "Checkbox", "key": "checkbox", "input": true, "dataGridLabel": true},
            "signature": {"type": "signature", "label": "Signature", "key": "signature", "input": true, "footer": "Sign above", "width": "100%", "height": "150px"},
            "select": {"type": "select", "label": "Select", "key": "select", "input": true, "dataSrc": "values", "data": {"values": []}},
            "textarea": {"type": "textarea", "label": "Text Area", "key": "textArea", "input": true, "rows": 3},
            "datetime": {"type": "datetime", "label": "Date / Time", "key": "dateTime", "input": true, "format": "yyyy-MM-dd hh:mm a", "enableDate": true, "enableTime": true}
        });
        serde_json::from_value(raw).unwrap_or_default()
    };
}

/// A sidebar group of draggable field types
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarGroup {
    pub key: String,
    pub title: String,
    pub weight: i32,
    /// Whether the group starts expanded
    pub default: bool,
    pub components: Vec<String>,
}

/// A draggable sidebar entry, carrying the field type as `data-type`
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarItem {
    pub group: String,
    pub field_type: String,
    pub title: String,
    pub draggable: bool,
}

/// Registry of placeable field templates and their sidebar grouping
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    templates: BTreeMap<String, ComponentNode>,
    groups: Vec<SidebarGroup>,
}

impl FieldRegistry {
    /// Registry with the PDF field set in a single "PDF Fields" group
    pub fn pdf_defaults() -> Self {
        Self {
            templates: PDF_FIELD_TEMPLATES.clone(),
            groups: vec![SidebarGroup {
                key: "pdf".to_string(),
                title: "PDF Fields".to_string(),
                weight: 0,
                default: true,
                components: PDF_FIELD_TYPES.iter().map(|t| t.to_string()).collect(),
            }],
        }
    }

    /// Empty registry
    pub fn new() -> Self {
        Self {
            templates: BTreeMap::new(),
            groups: Vec::new(),
        }
    }

    /// Register (or replace) a template under its `type`
    pub fn register(&mut self, template: ComponentNode) {
        self.templates
            .insert(template.component_type.clone(), template);
    }

    /// Add a sidebar group
    pub fn add_group(&mut self, group: SidebarGroup) {
        self.groups.push(group);
    }

    /// Canonical template for a field type
    pub fn template(&self, field_type: &str) -> Option<&ComponentNode> {
        self.templates.get(field_type)
    }

    /// Owned deep copy of a field type's template
    pub fn instantiate(&self, field_type: &str) -> Option<ComponentNode> {
        self.templates.get(field_type).cloned()
    }

    pub fn contains(&self, field_type: &str) -> bool {
        self.templates.contains_key(field_type)
    }

    /// Groups sorted by weight, then key
    pub fn groups(&self) -> Vec<&SidebarGroup> {
        let mut groups: Vec<&SidebarGroup> = self.groups.iter().collect();
        groups.sort_by(|a, b| a.weight.cmp(&b.weight).then_with(|| a.key.cmp(&b.key)));
        groups
    }

    /// Sidebar entries for every registered type, in group order
    ///
    /// Group members without a registered template are skipped.
    pub fn sidebar_items(&self) -> Vec<SidebarItem> {
        self.groups()
            .into_iter()
            .flat_map(|group| {
                group.components.iter().filter_map(move |field_type| {
                    self.templates.get(field_type).map(|template| SidebarItem {
                        group: group.key.clone(),
                        field_type: field_type.clone(),
                        title: template
                            .label
                            .clone()
                            .unwrap_or_else(|| field_type.clone()),
                        draggable: false,
                    })
                })
            })
            .collect()
    }
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::pdf_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::schema::Overlay;

    #[test]
    fn test_pdf_defaults_cover_every_sidebar_type() {
        let registry = FieldRegistry::pdf_defaults();
        for field_type in PDF_FIELD_TYPES {
            let template = registry
                .template(field_type)
                .unwrap_or_else(|| panic!("missing template for {field_type}"));
            assert_eq!(template.component_type, *field_type);
            assert!(template.label.is_some());
        }
    }

    #[test]
    fn test_default_group() {
        let registry = FieldRegistry::default();
        let groups = registry.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].title, "PDF Fields");
        assert_eq!(groups[0].weight, 0);
        assert!(groups[0].default);
        assert_eq!(groups[0].components.len(), 11);
    }

    #[test]
    fn test_instantiate_does_not_alias_template() {
        let registry = FieldRegistry::pdf_defaults();
        let mut placed = registry.instantiate("textfield").unwrap();
        placed.key = "renamed".to_string();
        placed.overlay = Some(Overlay::at(Point::new(1.0, 2.0)));
        placed
            .properties
            .insert("input".to_string(), json!(false));

        let template = registry.template("textfield").unwrap();
        assert_eq!(template.key, "textField");
        assert!(template.overlay.is_none());
        assert_eq!(template.properties["input"], json!(true));
    }

    #[test]
    fn test_unknown_type() {
        let registry = FieldRegistry::pdf_defaults();
        assert!(registry.instantiate("hologram").is_none());
        assert!(!registry.contains("hologram"));
    }

    #[test]
    fn test_sidebar_items_skip_unregistered_members() {
        let mut registry = FieldRegistry::new();
        registry.register(ComponentNode::new("textfield").with_label("Text Field"));
        registry.add_group(SidebarGroup {
            key: "basic".to_string(),
            title: "Basic".to_string(),
            weight: 10,
            default: false,
            components: vec!["textfield".to_string(), "missing".to_string()],
        });

        let items = registry.sidebar_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].field_type, "textfield");
        assert_eq!(items[0].title, "Text Field");
        assert!(!items[0].draggable);
    }

    #[test]
    fn test_groups_sorted_by_weight() {
        let mut registry = FieldRegistry::new();
        for (key, weight) in [("late", 20), ("early", -5)] {
            registry.add_group(SidebarGroup {
                key: key.to_string(),
                title: key.to_string(),
                weight,
                default: false,
                components: Vec::new(),
            });
        }
        let keys: Vec<&str> = registry.groups().iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["early", "late"]);
    }
}
