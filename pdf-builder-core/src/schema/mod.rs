//! Form schema model with positional overlay metadata
//!
//! The schema format itself is defined externally; this module only models
//! the parts the builder touches (`id`, `key`, `type`, nested `components`,
//! `overlay` and `settings.pdf`) and carries every other property through
//! untouched.

mod component;
mod form;
mod key;

pub use component::{ComponentNode, Overlay};
pub use form::{FormSchema, FormSettings, PdfSettings};
pub use key::{camel_case, derive_key, iterate_key, unique_key, uniquify};
