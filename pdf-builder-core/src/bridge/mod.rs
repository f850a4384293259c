//! Cross-context message bridge between the builder and the document viewer
//!
//! The builder and the viewer share no memory. Every notification is a
//! one-way `{name, data}` envelope; there is no request/response pairing.
//! The builder owns the canonical schema, the viewer only ever displays a
//! copy that is reconciled by replaying messages.

mod channel;
pub mod message;
mod viewer;

pub use channel::{bridge_pair, BridgeEndpoint};
pub use message::{BridgeMessage, ComponentClick, ComponentUpdate, ElementUpdate, Envelope};
pub use viewer::{PdfViewer, ViewerContainer};
