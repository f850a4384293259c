//! Builder configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the builder attaches to its host element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachMode {
    /// Regular form rendering
    #[default]
    Full,
    /// Editing mode used by the builder
    Builder,
}

/// Options consumed by [`crate::BuilderSession`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderOptions {
    /// Upload endpoint for PDFs; without it uploading is disabled
    #[serde(default)]
    pub pdf_server: Option<String>,

    #[serde(default)]
    pub attach_mode: AttachMode,

    /// Leave initialization to the caller
    #[serde(default)]
    pub skip_init: bool,
}

impl BuilderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pdf_server(mut self, url: impl Into<String>) -> Self {
        self.pdf_server = Some(url.into());
        self
    }

    /// Configured upload endpoint; blank values count as unset
    pub fn pdf_server(&self) -> Option<&str> {
        self.pdf_server
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Load options from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
