//! Editor session state: the element tree, the selection and the viewport.
//!
//! The session is the only owner of the tree. A presentation layer holds an
//! [`EditorSession`] and changes it exclusively through the methods below.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::document::{ExportOptions, LayoutDocument};
use crate::element::{Element, ElementId};
use crate::error::{BuilderError, BuilderResult};
use crate::tree::ElementTree;
use crate::viewport::Viewport;

/// Initial settings for an [`EditorSession`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Viewport a new session starts on.
    pub viewport: Viewport,
    /// How documents are exported.
    pub export: ExportOptions,
}

/// The complete editor state.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    tree: ElementTree,
    selected: Option<ElementId>,
    viewport: Viewport,
    export_options: ExportOptions,
    created_at: Option<DateTime<Utc>>,
}

impl EditorSession {
    /// Create an empty session on the default viewport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session with the given settings.
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            viewport: config.viewport,
            export_options: config.export,
            ..Self::default()
        }
    }

    /// Create a session holding an imported document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document's elements do not form a valid tree.
    pub fn from_document(document: LayoutDocument) -> BuilderResult<Self> {
        let mut session = Self::new();
        session.load_document(document)?;
        Ok(session)
    }

    /// Replace the tree and viewport with an imported document and clear the
    /// selection. The document's `createdAt` is carried into later exports.
    /// On error the session is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::MalformedDocument`] if element ids repeat or a
    /// leaf element carries children.
    pub fn load_document(&mut self, document: LayoutDocument) -> BuilderResult<()> {
        let viewport = document.metadata.viewport;
        let created_at = document.metadata.created_at;
        self.tree = document.into_tree_in(self.tree.registry())?;
        self.viewport = viewport;
        self.selected = None;
        self.created_at = Some(created_at);
        tracing::info!(elements = self.tree.len(), %viewport, "loaded layout document");
        Ok(())
    }

    /// The element tree.
    #[must_use]
    pub fn tree(&self) -> &ElementTree {
        &self.tree
    }

    /// Top-level elements in order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        self.tree.elements()
    }

    /// The selected element id, if any.
    #[must_use]
    pub fn selected_element_id(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// The selected element, looked up anywhere in the tree.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.as_ref().and_then(|id| self.tree.find(id))
    }

    /// The active viewport.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether `id` is nested inside a container.
    #[must_use]
    pub fn is_descendant_of_container(&self, id: &ElementId) -> bool {
        self.tree.is_descendant_of_container(id)
    }

    /// Add a top-level element and select it.
    ///
    /// # Errors
    ///
    /// See [`ElementTree::append`].
    pub fn append(&mut self, element_type: &str, insert_index: Option<usize>) -> BuilderResult<ElementId> {
        let id = self.tree.append(element_type, insert_index)?;
        self.selected = Some(id.clone());
        Ok(id)
    }

    /// Add a top-level element after `after_id` and select it.
    ///
    /// # Errors
    ///
    /// See [`ElementTree::insert_after`].
    pub fn insert_after(&mut self, element_type: &str, after_id: &ElementId) -> BuilderResult<ElementId> {
        let id = self.tree.insert_after(element_type, after_id)?;
        self.selected = Some(id.clone());
        Ok(id)
    }

    /// Add an element inside a container and select it.
    ///
    /// # Errors
    ///
    /// See [`ElementTree::insert_into_container`].
    pub fn insert_into_container(
        &mut self,
        element_type: &str,
        container_id: &ElementId,
        insert_index: Option<usize>,
    ) -> BuilderResult<ElementId> {
        let id = self
            .tree
            .insert_into_container(element_type, container_id, insert_index)?;
        self.selected = Some(id.clone());
        Ok(id)
    }

    /// Remove an element and its subtree.
    ///
    /// The selection is cleared when it pointed at the removed element or
    /// at one of its descendants, and kept otherwise.
    ///
    /// # Errors
    ///
    /// See [`ElementTree::remove`].
    pub fn remove_element(&mut self, id: &ElementId) -> BuilderResult<Element> {
        let removed = self.tree.remove(id)?;
        if self
            .selected
            .as_ref()
            .is_some_and(|selected| removed.subtree_contains(selected))
        {
            tracing::debug!(element_id = %id, "selection cleared by removal");
            self.selected = None;
        }
        Ok(removed)
    }

    /// Replace one property of an element.
    ///
    /// # Errors
    ///
    /// See [`ElementTree::update_property`].
    pub fn update_property(&mut self, id: &ElementId, key: &str, value: Value) -> BuilderResult<()> {
        self.tree.update_property(id, key, value)
    }

    /// Switch the active viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport != viewport {
            tracing::debug!(from = %self.viewport, to = %viewport, "viewport changed");
        }
        self.viewport = viewport;
    }

    /// Swap positions of two siblings.
    ///
    /// # Errors
    ///
    /// See [`ElementTree::reorder_siblings`].
    pub fn reorder_siblings(&mut self, active_id: &ElementId, over_id: &ElementId) -> BuilderResult<()> {
        self.tree.reorder_siblings(active_id, over_id)
    }

    /// Move an element to an index of the top level.
    ///
    /// # Errors
    ///
    /// See [`ElementTree::reorder_to_index`].
    pub fn reorder_to_index(&mut self, id: &ElementId, new_index: usize, container_id: &str) -> BuilderResult<()> {
        self.tree.reorder_to_index(id, new_index, container_id)
    }

    /// Select an element, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if the id does not exist;
    /// the previous selection is kept.
    pub fn select_element(&mut self, id: Option<ElementId>) -> BuilderResult<()> {
        if let Some(id) = &id {
            if !self.tree.contains(id) {
                return Err(BuilderError::ElementNotFound(id.to_string()));
            }
        }
        self.selected = id;
        Ok(())
    }

    /// Export the layout stamped with the current time.
    #[must_use]
    pub fn export(&self) -> LayoutDocument {
        self.export_at(Utc::now())
    }

    /// Export the layout with an explicit `updatedAt`. `createdAt` is the
    /// loaded document's, or `timestamp` for a session that started empty.
    #[must_use]
    pub fn export_at(&self, timestamp: DateTime<Utc>) -> LayoutDocument {
        let mut document =
            LayoutDocument::from_tree_with(&self.tree, self.viewport, timestamp, self.export_options);
        if let Some(created_at) = self.created_at {
            document.metadata.created_at = created_at;
        }
        document
    }
}
