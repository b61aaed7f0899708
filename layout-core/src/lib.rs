//! # Layout Builder Core
//!
//! Element tree engine and portable JSON contract for a drag-and-drop
//! builder of phone, tablet and laptop layouts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                layout-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Registry        │  Element Tree            │
//! │  - Types         │  - Insert / nest         │
//! │  - Defaults      │  - Reorder / remove      │
//! │  - Schemas       │  - Property updates      │
//! ├─────────────────────────────────────────────┤
//! │  Editor Session  │  Layout Document         │
//! │  - Selection     │  - Export (deny-list)    │
//! │  - Viewport      │  - Parse / shape check   │
//! │  - Drag routing  │  - Round-trip            │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod command;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod registry;
pub mod state;
pub mod tree;
pub mod viewport;

pub use command::{replay, Command, ReplayReport};
pub use document::{
    strip_properties, DocumentMetadata, ExportOptions, LayoutDocument, EXPORT_DENY_LIST,
    EXPORT_DENY_LIST_VERSION, FORMAT_VERSION,
};
pub use element::{Dimension, Element, ElementId, Properties};
pub use error::{BuilderError, BuilderResult};
pub use event::{route_drag_end, DragEnd, DragOutcome, DragSource, DropTarget};
pub use registry::{registry, ElementDefinition, ElementType, PropertyKind, PropertySchema, Registry};
pub use state::{EditorSession, SessionConfig};
pub use tree::{ElementTree, ROOT_CONTAINER_ID};
pub use viewport::{DeviceProfile, Viewport};

/// Layout core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
