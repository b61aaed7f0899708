//! # Session commands
//!
//! Serializable form of every session operation, so edits can be scripted
//! and replayed against a session.
//!
//! ## References
//!
//! Ids of elements created earlier in the same replay can be referenced as
//! `"$0"`, `"$1"`, ... in creation order.
//!
//! ```text
//! [
//!   { "op": "append", "type": "container" },
//!   { "op": "insertIntoContainer", "type": "button", "container": "$0" },
//!   { "op": "updateProperty", "id": "$1", "key": "text", "value": "Go" }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::element::ElementId;
use crate::error::BuilderResult;
use crate::event::{route_drag_end, DragEnd, DragOutcome, DragSource, DropTarget};
use crate::state::EditorSession;
use crate::tree::ROOT_CONTAINER_ID;
use crate::viewport::Viewport;

/// One session operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Command {
    /// Add a top-level element.
    Append {
        /// Element type.
        #[serde(rename = "type")]
        element_type: String,
        /// Insertion index (end if omitted).
        #[serde(default)]
        index: Option<usize>,
    },
    /// Add a top-level element after another.
    InsertAfter {
        /// Element type.
        #[serde(rename = "type")]
        element_type: String,
        /// Top-level element to insert after.
        after: ElementId,
    },
    /// Add an element inside a container.
    InsertIntoContainer {
        /// Element type.
        #[serde(rename = "type")]
        element_type: String,
        /// Target container.
        container: ElementId,
        /// Insertion index (end if omitted).
        #[serde(default)]
        index: Option<usize>,
    },
    /// Remove an element and its subtree.
    Remove {
        /// Element to remove.
        id: ElementId,
    },
    /// Replace one property.
    UpdateProperty {
        /// Element to update.
        id: ElementId,
        /// Property key.
        key: String,
        /// New value.
        value: Value,
    },
    /// Move an element onto a sibling's position.
    ReorderSiblings {
        /// Dragged element.
        active: ElementId,
        /// Element whose position it takes.
        over: ElementId,
    },
    /// Move an element to an index of a container.
    ReorderToIndex {
        /// Element to move.
        id: ElementId,
        /// Target index.
        index: usize,
        /// Target container (the top level if omitted).
        #[serde(default = "root_container")]
        container: String,
    },
    /// Change or clear the selection.
    Select {
        /// Element to select.
        #[serde(default)]
        id: Option<ElementId>,
    },
    /// Switch the viewport.
    SetViewport {
        /// New viewport.
        viewport: Viewport,
    },
    /// Replay a drag-and-drop completion.
    DragEnd(DragEnd),
}

fn root_container() -> String {
    ROOT_CONTAINER_ID.to_string()
}

/// Summary of a [`replay`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Number of commands that took effect.
    pub applied: usize,
    /// Commands that were rejected, as (position, reason).
    pub rejected: Vec<(usize, String)>,
    /// Ids of created elements, in creation order.
    pub created: Vec<ElementId>,
}

impl ReplayReport {
    /// Whether every command took effect.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Apply commands in order. A rejected command leaves the session as it
/// was and does not stop the replay.
pub fn replay(session: &mut EditorSession, commands: &[Command]) -> ReplayReport {
    let mut report = ReplayReport::default();
    for (position, command) in commands.iter().enumerate() {
        let command = command.resolve(&report.created);
        match command.apply(session) {
            Ok(created) => {
                report.applied += 1;
                report.created.extend(created);
            }
            Err(e) => {
                tracing::debug!(position, error = %e, "command rejected");
                report.rejected.push((position, e.to_string()));
            }
        }
    }
    tracing::info!(
        applied = report.applied,
        rejected = report.rejected.len(),
        "replayed commands"
    );
    report
}

impl Command {
    /// Apply to a session, returning the id of a created element, if any.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying session operation.
    pub fn apply(&self, session: &mut EditorSession) -> BuilderResult<Option<ElementId>> {
        match self {
            Self::Append {
                element_type,
                index,
            } => session.append(element_type, *index).map(Some),
            Self::InsertAfter {
                element_type,
                after,
            } => session.insert_after(element_type, after).map(Some),
            Self::InsertIntoContainer {
                element_type,
                container,
                index,
            } => session
                .insert_into_container(element_type, container, *index)
                .map(Some),
            Self::Remove { id } => session.remove_element(id).map(|_| None),
            Self::UpdateProperty { id, key, value } => session
                .update_property(id, key, value.clone())
                .map(|()| None),
            Self::ReorderSiblings { active, over } => {
                session.reorder_siblings(active, over).map(|()| None)
            }
            Self::ReorderToIndex {
                id,
                index,
                container,
            } => session.reorder_to_index(id, *index, container).map(|()| None),
            Self::Select { id } => session.select_element(id.clone()).map(|()| None),
            Self::SetViewport { viewport } => {
                session.set_viewport(*viewport);
                Ok(None)
            }
            Self::DragEnd(event) => route_drag_end(session, event).map(|outcome| match outcome {
                DragOutcome::Appended(id) | DragOutcome::InsertedIntoContainer(id) => Some(id),
                DragOutcome::MovedToIndex | DragOutcome::Reordered | DragOutcome::Ignored => None,
            }),
        }
    }

    /// Replace `$n` references with ids from `created`.
    fn resolve(&self, created: &[ElementId]) -> Self {
        let id = |id: &ElementId| resolve_id(id, created);
        match self {
            Self::InsertAfter {
                element_type,
                after,
            } => Self::InsertAfter {
                element_type: element_type.clone(),
                after: id(after),
            },
            Self::InsertIntoContainer {
                element_type,
                container,
                index,
            } => Self::InsertIntoContainer {
                element_type: element_type.clone(),
                container: id(container),
                index: *index,
            },
            Self::Remove { id: target } => Self::Remove { id: id(target) },
            Self::UpdateProperty {
                id: target,
                key,
                value,
            } => Self::UpdateProperty {
                id: id(target),
                key: key.clone(),
                value: value.clone(),
            },
            Self::ReorderSiblings { active, over } => Self::ReorderSiblings {
                active: id(active),
                over: id(over),
            },
            Self::ReorderToIndex {
                id: target,
                index,
                container,
            } => Self::ReorderToIndex {
                id: id(target),
                index: *index,
                container: resolve_id(&ElementId::from(container.as_str()), created).to_string(),
            },
            Self::Select { id: target } => Self::Select {
                id: target.as_ref().map(id),
            },
            Self::DragEnd(event) => Self::DragEnd(DragEnd {
                active: match &event.active {
                    DragSource::Element { id: target } => DragSource::Element { id: id(target) },
                    palette @ DragSource::Palette { .. } => palette.clone(),
                },
                over: event.over.as_ref().map(|over| match over {
                    DropTarget::DropZone {
                        container_id,
                        index,
                    } => DropTarget::DropZone {
                        container_id: resolve_id(&ElementId::from(container_id.as_str()), created)
                            .to_string(),
                        index: *index,
                    },
                    DropTarget::Container { container_id } => DropTarget::Container {
                        container_id: id(container_id),
                    },
                    DropTarget::Element { id: target } => DropTarget::Element { id: id(target) },
                    DropTarget::DeviceCard => DropTarget::DeviceCard,
                }),
            }),
            Self::Append { .. } | Self::SetViewport { .. } => self.clone(),
        }
    }
}

fn resolve_id(id: &ElementId, created: &[ElementId]) -> ElementId {
    id.as_str()
        .strip_prefix('$')
        .and_then(|n| n.parse::<usize>().ok())
        .and_then(|n| created.get(n))
        .unwrap_or(id)
        .clone()
}
