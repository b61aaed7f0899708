//! Drag-and-drop completion events from the presentation layer.
//!
//! The presentation layer reports what was dragged (a palette entry or an
//! existing element) and where it was dropped. [`route_drag_end`] maps the
//! pair onto exactly one session operation.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::error::BuilderResult;
use crate::state::EditorSession;
use crate::tree::ROOT_CONTAINER_ID;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum DragSource {
    /// A new element of the given type, dragged from the palette.
    Palette {
        /// Registry type name.
        #[serde(rename = "elementType")]
        element_type: String,
    },
    /// An element already in the tree.
    Element {
        /// Dragged element.
        id: ElementId,
    },
}

/// Where the drag ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DropTarget {
    /// An insertion point between siblings.
    DropZone {
        /// Container id, or [`ROOT_CONTAINER_ID`] for the top level.
        #[serde(rename = "containerId")]
        container_id: String,
        /// Insertion index within that container.
        index: usize,
    },
    /// The device screen itself, outside any drop zone.
    DeviceCard,
    /// A container body, outside any drop zone.
    Container {
        /// Container id.
        #[serde(rename = "containerId")]
        container_id: ElementId,
    },
    /// Another element.
    Element {
        /// Element hovered at drop time.
        id: ElementId,
    },
}

/// A completed drag gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    /// What was dragged.
    pub active: DragSource,
    /// Where it was dropped, if anywhere.
    #[serde(default)]
    pub over: Option<DropTarget>,
}

impl DragEnd {
    /// Drag a new element from the palette.
    #[must_use]
    pub fn palette(element_type: impl Into<String>, over: DropTarget) -> Self {
        Self {
            active: DragSource::Palette {
                element_type: element_type.into(),
            },
            over: Some(over),
        }
    }

    /// Drag an existing element.
    #[must_use]
    pub fn element(id: ElementId, over: DropTarget) -> Self {
        Self {
            active: DragSource::Element { id },
            over: Some(over),
        }
    }
}

/// Which operation a drag resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// A new top-level element was created.
    Appended(ElementId),
    /// A new element was created inside a container.
    InsertedIntoContainer(ElementId),
    /// An element was moved to a drop-zone index.
    MovedToIndex,
    /// Two siblings were reordered.
    Reordered,
    /// The source/target combination has no operation.
    Ignored,
}

/// Apply a drag completion to the session.
///
/// # Errors
///
/// Propagates the error of the routed operation; the session is unchanged
/// in that case. Unrecognized combinations are not errors and yield
/// [`DragOutcome::Ignored`].
pub fn route_drag_end(session: &mut EditorSession, event: &DragEnd) -> BuilderResult<DragOutcome> {
    let Some(over) = &event.over else {
        return Ok(DragOutcome::Ignored);
    };

    let outcome = match (&event.active, over) {
        (DragSource::Palette { element_type }, DropTarget::DropZone { container_id, index }) => {
            if container_id == ROOT_CONTAINER_ID {
                DragOutcome::Appended(session.append(element_type, Some(*index))?)
            } else {
                let container = ElementId::from(container_id.as_str());
                DragOutcome::InsertedIntoContainer(session.insert_into_container(
                    element_type,
                    &container,
                    Some(*index),
                )?)
            }
        }
        (DragSource::Palette { element_type }, DropTarget::DeviceCard) => {
            DragOutcome::Appended(session.append(element_type, None)?)
        }
        (DragSource::Palette { element_type }, DropTarget::Container { container_id }) => {
            DragOutcome::InsertedIntoContainer(session.insert_into_container(
                element_type,
                container_id,
                None,
            )?)
        }
        (DragSource::Element { id }, DropTarget::DropZone { container_id, index }) => {
            session.reorder_to_index(id, *index, container_id)?;
            DragOutcome::MovedToIndex
        }
        (DragSource::Element { id }, DropTarget::Element { id: over_id }) => {
            session.reorder_siblings(id, over_id)?;
            DragOutcome::Reordered
        }
        _ => DragOutcome::Ignored,
    };

    tracing::debug!(?outcome, "routed drag end");
    Ok(outcome)
}
