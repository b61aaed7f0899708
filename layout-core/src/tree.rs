//! Element tree engine.
//!
//! The tree is an ordered list of top-level [`Element`]s, each container
//! owning an ordered list of children. Every structural operation works on a
//! private copy of the tree and swaps it in only when it succeeds, so a
//! failed operation never leaves a partially updated tree behind.
//!
//! Within every sibling group `order` equals array position (`0..n`), and
//! ids are unique across all depths.

use std::collections::HashSet;

use serde_json::Value;

use crate::element::{Element, ElementId};
use crate::error::{BuilderError, BuilderResult};
use crate::registry::{registry, Registry};

/// Drop-zone container id that stands for the top level of the device screen.
pub const ROOT_CONTAINER_ID: &str = "device-card";

/// The full element tree plus the registry it instantiates from.
#[derive(Debug, Clone)]
pub struct ElementTree {
    elements: Vec<Element>,
    registry: &'static Registry,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ElementTree {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl ElementTree {
    /// Create an empty tree backed by the built-in registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(registry())
    }

    /// Create an empty tree backed by a custom registry.
    #[must_use]
    pub fn with_registry(registry: &'static Registry) -> Self {
        Self {
            elements: Vec::new(),
            registry,
        }
    }

    /// Adopt an existing list of elements (for example from an imported
    /// document), backed by the built-in registry.
    ///
    /// Each sibling group is stably sorted by its stored `order` and then
    /// renumbered to `0..n`.
    ///
    /// # Errors
    ///
    /// See [`ElementTree::from_elements_in`].
    pub fn from_elements(elements: Vec<Element>) -> BuilderResult<Self> {
        Self::from_elements_in(elements, registry())
    }

    /// Adopt an existing list of elements, backed by `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::MalformedDocument`] if two elements share an
    /// id or an element of a registered leaf type carries a `children` list.
    pub fn from_elements_in(mut elements: Vec<Element>, registry: &'static Registry) -> BuilderResult<Self> {
        normalize(&mut elements);
        let mut seen = HashSet::new();
        check_group(&elements, registry, &mut seen)?;
        Ok(Self { elements, registry })
    }

    /// Top-level elements in order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Consume the tree, returning its top-level elements.
    #[must_use]
    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    /// The registry new elements are created from.
    #[must_use]
    pub fn registry(&self) -> &'static Registry {
        self.registry
    }

    /// Depth-first, parent-before-children iteration over every element.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        Walk::new(&self.elements)
    }

    /// Total number of elements at all depths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the tree has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Find an element anywhere in the tree.
    #[must_use]
    pub fn find(&self, id: &ElementId) -> Option<&Element> {
        find_in(&self.elements, id)
    }

    /// Whether an element with this id exists anywhere in the tree.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.find(id).is_some()
    }

    /// The container whose `children` hold `id`, or `None` for top-level
    /// and unknown ids.
    #[must_use]
    pub fn parent_of(&self, id: &ElementId) -> Option<&Element> {
        parent_in(&self.elements, id, self.registry)
    }

    /// Whether `id` is nested inside some container, at any depth.
    #[must_use]
    pub fn is_descendant_of_container(&self, id: &ElementId) -> bool {
        self.parent_of(id).is_some()
    }

    /// Create an element of `element_type` at the top level.
    ///
    /// With `insert_index` the element lands at that position (clamped to
    /// the list length) and later siblings shift down; otherwise it is
    /// appended.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::UnknownElementType`] if the registry does not
    /// know `element_type`.
    pub fn append(&mut self, element_type: &str, insert_index: Option<usize>) -> BuilderResult<ElementId> {
        let element = self.instantiate(element_type)?;
        let id = element.id.clone();
        self.commit(|elements| {
            let order = insert_ordered(elements, element, insert_index);
            tracing::debug!(element_id = %id, element_type, order, "appended element");
            Ok(id)
        })
    }

    /// Create an element of `element_type` directly after the top-level
    /// element `after_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if `after_id` is not a
    /// top-level element, or [`BuilderError::UnknownElementType`].
    pub fn insert_after(&mut self, element_type: &str, after_id: &ElementId) -> BuilderResult<ElementId> {
        let insert_order = self
            .elements
            .iter()
            .find(|e| e.id == *after_id)
            .map(|e| e.order + 1)
            .ok_or_else(|| not_found(after_id))?;
        let element = self.instantiate(element_type)?;
        let id = element.id.clone();
        self.commit(|elements| {
            let order = insert_ordered(elements, element, Some(insert_order));
            tracing::debug!(element_id = %id, after = %after_id, order, "inserted element");
            Ok(id)
        })
    }

    /// Create an element of `element_type` inside the container
    /// `container_id`, which may be nested at any depth.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if the container does not
    /// exist, [`BuilderError::NotAContainer`] if its type cannot hold
    /// children, or [`BuilderError::UnknownElementType`].
    pub fn insert_into_container(
        &mut self,
        element_type: &str,
        container_id: &ElementId,
        insert_index: Option<usize>,
    ) -> BuilderResult<ElementId> {
        let container = self.find(container_id).ok_or_else(|| not_found(container_id))?;
        if !self.registry.supports_children(&container.element_type) {
            return Err(BuilderError::NotAContainer(container_id.to_string()));
        }
        let element = self.instantiate(element_type)?;
        let id = element.id.clone();
        self.commit(|elements| {
            let container =
                find_in_mut(elements, container_id).ok_or_else(|| not_found(container_id))?;
            let children = container.children.get_or_insert_with(Vec::new);
            let order = insert_ordered(children, element, insert_index);
            tracing::debug!(element_id = %id, container = %container_id, order, "inserted into container");
            Ok(id)
        })
    }

    /// Remove an element and its whole subtree, wherever it is.
    ///
    /// Returns the removed element (with its descendants).
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if no such element exists.
    pub fn remove(&mut self, id: &ElementId) -> BuilderResult<Element> {
        self.commit(|elements| {
            let removed = remove_from(elements, id).ok_or_else(|| not_found(id))?;
            tracing::debug!(element_id = %id, element_type = %removed.element_type, "removed element");
            Ok(removed)
        })
    }

    /// Replace one property of an element, wherever it is.
    ///
    /// The value replaces the key wholesale; objects are not merged.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if no such element exists.
    pub fn update_property(&mut self, id: &ElementId, key: &str, value: Value) -> BuilderResult<()> {
        self.commit(|elements| {
            let element = find_in_mut(elements, id).ok_or_else(|| not_found(id))?;
            element.properties.insert(key.to_string(), value);
            tracing::debug!(element_id = %id, key, "updated property");
            Ok(())
        })
    }

    /// Move `active_id` to the position held by `over_id`.
    ///
    /// Both ids must belong to the same sibling group (the top level or one
    /// container's children, at any depth). The move is a splice: remove,
    /// then insert at `over_id`'s former index.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::ElementNotFound`] if either id does not
    /// exist, or [`BuilderError::Unsupported`] if they are not siblings.
    /// Moving an element into another container is not supported.
    pub fn reorder_siblings(&mut self, active_id: &ElementId, over_id: &ElementId) -> BuilderResult<()> {
        if !self.contains(over_id) {
            return Err(not_found(over_id));
        }
        self.commit(|elements| {
            let group = sibling_group_mut(elements, active_id).ok_or_else(|| not_found(active_id))?;
            let over_index = group.iter().position(|e| e.id == *over_id).ok_or_else(|| {
                BuilderError::Unsupported(format!(
                    "{active_id} and {over_id} are not in the same container"
                ))
            })?;
            let active_index = group
                .iter()
                .position(|e| e.id == *active_id)
                .ok_or_else(|| not_found(active_id))?;
            splice(group, active_index, over_index);
            tracing::debug!(element_id = %active_id, over = %over_id, order = over_index, "reordered siblings");
            Ok(())
        })
    }

    /// Move `id` to `new_index` within `container_id`.
    ///
    /// Only the top level ([`ROOT_CONTAINER_ID`]) is a valid target;
    /// `new_index` is clamped to the list length.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Unsupported`] for any other container and
    /// [`BuilderError::ElementNotFound`] if `id` is not a top-level element.
    pub fn reorder_to_index(&mut self, id: &ElementId, new_index: usize, container_id: &str) -> BuilderResult<()> {
        if container_id != ROOT_CONTAINER_ID {
            return Err(BuilderError::Unsupported(format!(
                "reorder to index inside container {container_id}"
            )));
        }
        self.commit(|elements| {
            let index = elements
                .iter()
                .position(|e| e.id == *id)
                .ok_or_else(|| not_found(id))?;
            let target = new_index.min(elements.len() - 1);
            splice(elements, index, target);
            tracing::debug!(element_id = %id, order = target, "moved element to index");
            Ok(())
        })
    }

    /// Check the structural invariants: unique ids, contiguous orders
    /// matching array position, and children only on container types.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::MalformedDocument`] describing the first
    /// violation found.
    pub fn validate(&self) -> BuilderResult<()> {
        let mut seen = HashSet::new();
        check_group(&self.elements, self.registry, &mut seen)
    }

    fn instantiate(&self, element_type: &str) -> BuilderResult<Element> {
        self.registry
            .create_default(element_type, 0)
            .ok_or_else(|| BuilderError::UnknownElementType(element_type.to_string()))
    }

    fn commit<T>(&mut self, op: impl FnOnce(&mut Vec<Element>) -> BuilderResult<T>) -> BuilderResult<T> {
        let mut next = self.elements.clone();
        match op(&mut next) {
            Ok(value) => {
                self.elements = next;
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(error = %e, "tree operation rejected");
                Err(e)
            }
        }
    }
}

/// Depth-first pre-order walk over a forest.
struct Walk<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Walk<'a> {
    fn new(roots: &'a [Element]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children().iter().rev());
        Some(element)
    }
}

fn not_found(id: &ElementId) -> BuilderError {
    BuilderError::ElementNotFound(id.to_string())
}

fn find_in<'a>(list: &'a [Element], id: &ElementId) -> Option<&'a Element> {
    Walk::new(list).find(|e| e.id == *id)
}

fn find_in_mut<'a>(list: &'a mut [Element], id: &ElementId) -> Option<&'a mut Element> {
    for element in list.iter_mut() {
        if element.id == *id {
            return Some(element);
        }
        if let Some(children) = element.children.as_mut() {
            if let Some(found) = find_in_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

fn parent_in<'a>(list: &'a [Element], id: &ElementId, registry: &Registry) -> Option<&'a Element> {
    Walk::new(list).find(|e| {
        registry.supports_children(&e.element_type) && e.children().iter().any(|child| child.id == *id)
    })
}

/// The sibling list that directly contains `id`.
fn sibling_group_mut<'a>(list: &'a mut Vec<Element>, id: &ElementId) -> Option<&'a mut Vec<Element>> {
    if list.iter().any(|e| e.id == *id) {
        return Some(list);
    }
    for element in list.iter_mut() {
        if let Some(children) = element.children.as_mut() {
            if let Some(group) = sibling_group_mut(children, id) {
                return Some(group);
            }
        }
    }
    None
}

/// Remove `id` from the forest, renumbering every group on the path to it.
fn remove_from(list: &mut Vec<Element>, id: &ElementId) -> Option<Element> {
    if let Some(index) = list.iter().position(|e| e.id == *id) {
        let removed = list.remove(index);
        renumber(list);
        return Some(removed);
    }
    let removed = list
        .iter_mut()
        .filter_map(|e| e.children.as_mut())
        .find_map(|children| remove_from(children, id))?;
    renumber(list);
    Some(removed)
}

/// Place `element` at `at` (or the end), shifting later siblings. Returns
/// the order the element received.
fn insert_ordered(list: &mut Vec<Element>, mut element: Element, at: Option<usize>) -> usize {
    let order = at.map_or(list.len(), |i| i.min(list.len()));
    for sibling in list.iter_mut().filter(|e| e.order >= order) {
        sibling.order += 1;
    }
    element.order = order;
    list.push(element);
    list.sort_by_key(|e| e.order);
    renumber(list);
    order
}

fn splice(list: &mut Vec<Element>, from: usize, to: usize) {
    let moved = list.remove(from);
    list.insert(to.min(list.len()), moved);
    renumber(list);
}

fn renumber(list: &mut [Element]) {
    for (index, element) in list.iter_mut().enumerate() {
        element.order = index;
    }
}

fn normalize(list: &mut [Element]) {
    list.sort_by_key(|e| e.order);
    renumber(list);
    for children in list.iter_mut().filter_map(|e| e.children.as_mut()) {
        normalize(children);
    }
}

fn check_group(list: &[Element], registry: &Registry, seen: &mut HashSet<ElementId>) -> BuilderResult<()> {
    for (index, element) in list.iter().enumerate() {
        if element.order != index {
            return Err(BuilderError::MalformedDocument(format!(
                "element {} has order {} at position {index}",
                element.id, element.order
            )));
        }
        if !seen.insert(element.id.clone()) {
            return Err(BuilderError::MalformedDocument(format!(
                "duplicate element id: {}",
                element.id
            )));
        }
        if let Some(children) = &element.children {
            if registry.lookup(&element.element_type).is_some()
                && !registry.supports_children(&element.element_type)
            {
                return Err(BuilderError::MalformedDocument(format!(
                    "{} element {} cannot have children",
                    element.element_type, element.id
                )));
            }
            check_group(children, registry, seen)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Properties;
    use serde_json::json;

    fn orders(list: &[Element]) -> Vec<usize> {
        list.iter().map(|e| e.order).collect()
    }

    fn ids(list: &[Element]) -> Vec<ElementId> {
        list.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn test_append_at_end_and_at_index() {
        let mut tree = ElementTree::new();
        let a = tree.append("button", None).expect("append a");
        let b = tree.append("heading", None).expect("append b");
        let c = tree.append("image", Some(1)).expect("insert c");

        assert_eq!(ids(tree.elements()), vec![a, c, b]);
        assert_eq!(orders(tree.elements()), vec![0, 1, 2]);
    }

    #[test]
    fn test_append_index_past_end_is_clamped() {
        let mut tree = ElementTree::new();
        tree.append("button", None).expect("append");
        let id = tree.append("button", Some(10)).expect("append");
        assert_eq!(tree.find(&id).map(|e| e.order), Some(1));
        tree.validate().expect("valid");
    }

    #[test]
    fn test_append_unknown_type_leaves_tree_unchanged() {
        let mut tree = ElementTree::new();
        tree.append("button", None).expect("append");
        let before = tree.clone();
        let err = tree.append("marquee", None).expect_err("unknown type");
        assert!(matches!(err, BuilderError::UnknownElementType(_)));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_insert_after_shifts_followers() {
        let mut tree = ElementTree::new();
        let a = tree.append("button", None).expect("a");
        let b = tree.append("button", None).expect("b");
        let new = tree.insert_after("image", &a).expect("insert");

        assert_eq!(ids(tree.elements()), vec![a, new.clone(), b.clone()]);
        assert_eq!(tree.find(&new).map(|e| e.order), Some(1));
        assert_eq!(tree.find(&b).map(|e| e.order), Some(2));
    }

    #[test]
    fn test_insert_after_only_matches_top_level() {
        let mut tree = ElementTree::new();
        let container = tree.append("container", None).expect("container");
        let child = tree
            .insert_into_container("button", &container, None)
            .expect("child");
        let before = tree.clone();
        assert!(tree.insert_after("button", &child).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_insert_into_nested_container() {
        let mut tree = ElementTree::new();
        let outer = tree.append("container", None).expect("outer");
        let inner = tree
            .insert_into_container("container", &outer, None)
            .expect("inner");
        let first = tree
            .insert_into_container("button", &inner, None)
            .expect("first");
        let second = tree
            .insert_into_container("heading", &inner, Some(0))
            .expect("second");

        let inner_el = tree.find(&inner).expect("inner exists");
        assert_eq!(ids(inner_el.children()), vec![second, first]);
        assert_eq!(orders(inner_el.children()), vec![0, 1]);
        tree.validate().expect("valid");
    }

    #[test]
    fn test_insert_into_leaf_is_rejected() {
        let mut tree = ElementTree::new();
        let button = tree.append("button", None).expect("button");
        let err = tree
            .insert_into_container("heading", &button, None)
            .expect_err("leaf");
        assert!(matches!(err, BuilderError::NotAContainer(_)));
        assert!(tree.find(&button).expect("button").children.is_none());
    }

    #[test]
    fn test_insert_into_missing_container() {
        let mut tree = ElementTree::new();
        let err = tree
            .insert_into_container("heading", &ElementId::from("nope"), None)
            .expect_err("missing");
        assert!(err.is_not_found());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_container_removes_subtree() {
        let mut tree = ElementTree::new();
        let container = tree.append("container", None).expect("container");
        let child = tree
            .insert_into_container("container", &container, None)
            .expect("child");
        let grandchild = tree
            .insert_into_container("button", &child, None)
            .expect("grandchild");
        let other = tree.append("paragraph", None).expect("other");

        let removed = tree.remove(&container).expect("remove");
        assert_eq!(removed.children().len(), 1);
        assert!(!tree.contains(&child));
        assert!(!tree.contains(&grandchild));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.find(&other).map(|e| e.order), Some(0));
    }

    #[test]
    fn test_remove_nested_renumbers_siblings() {
        let mut tree = ElementTree::new();
        let container = tree.append("container", None).expect("container");
        let a = tree.insert_into_container("button", &container, None).expect("a");
        let b = tree.insert_into_container("button", &container, None).expect("b");
        let c = tree.insert_into_container("button", &container, None).expect("c");

        tree.remove(&b).expect("remove");
        let children = tree.find(&container).expect("container").children();
        assert_eq!(ids(children), vec![a, c]);
        assert_eq!(orders(children), vec![0, 1]);
    }

    #[test]
    fn test_remove_missing_reports_not_found() {
        let mut tree = ElementTree::new();
        tree.append("button", None).expect("append");
        let err = tree.remove(&ElementId::from("ghost")).expect_err("missing");
        assert!(matches!(err, BuilderError::ElementNotFound(_)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_update_property_replaces_whole_value() {
        let mut tree = ElementTree::new();
        let container = tree.append("container", None).expect("container");
        let button = tree
            .insert_into_container("button", &container, None)
            .expect("button");

        tree.update_property(&button, "width", json!({ "value": 50, "unit": "px" }))
            .expect("update");
        tree.update_property(&button, "width", json!({ "value": 20 }))
            .expect("update");
        assert_eq!(
            tree.find(&button).expect("button").properties["width"],
            json!({ "value": 20 })
        );
        assert!(tree
            .update_property(&ElementId::from("ghost"), "text", json!("x"))
            .is_err());
    }

    #[test]
    fn test_reorder_top_level_siblings() {
        let mut tree = ElementTree::new();
        let a = tree.append("button", None).expect("a");
        let b = tree.append("button", None).expect("b");
        let c = tree.append("button", None).expect("c");

        tree.reorder_siblings(&a, &c).expect("reorder");
        assert_eq!(ids(tree.elements()), vec![b.clone(), c.clone(), a.clone()]);

        tree.reorder_siblings(&a, &b).expect("reorder back");
        assert_eq!(ids(tree.elements()), vec![a, b, c]);
        assert_eq!(orders(tree.elements()), vec![0, 1, 2]);
    }

    #[test]
    fn test_reorder_children_of_nested_container() {
        let mut tree = ElementTree::new();
        let outer = tree.append("container", None).expect("outer");
        let inner = tree.insert_into_container("container", &outer, None).expect("inner");
        let x = tree.insert_into_container("button", &inner, None).expect("x");
        let y = tree.insert_into_container("heading", &inner, None).expect("y");

        tree.reorder_siblings(&y, &x).expect("reorder");
        let children = tree.find(&inner).expect("inner").children();
        assert_eq!(ids(children), vec![y, x]);
        assert_eq!(orders(children), vec![0, 1]);
    }

    #[test]
    fn test_reorder_across_containers_is_unsupported() {
        let mut tree = ElementTree::new();
        let left = tree.append("container", None).expect("left");
        let right = tree.append("container", None).expect("right");
        let a = tree.insert_into_container("button", &left, None).expect("a");
        let b = tree.insert_into_container("button", &right, None).expect("b");

        let before = tree.clone();
        let err = tree.reorder_siblings(&a, &b).expect_err("cross container");
        assert!(matches!(err, BuilderError::Unsupported(_)));
        assert!(tree.reorder_siblings(&a, &left).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_reorder_to_index_top_level() {
        let mut tree = ElementTree::new();
        let a = tree.append("button", None).expect("a");
        let b = tree.append("button", None).expect("b");
        let c = tree.append("button", None).expect("c");

        tree.reorder_to_index(&a, 99, ROOT_CONTAINER_ID).expect("move");
        assert_eq!(ids(tree.elements()), vec![b.clone(), c.clone(), a.clone()]);

        tree.reorder_to_index(&a, 0, ROOT_CONTAINER_ID).expect("move");
        assert_eq!(ids(tree.elements()), vec![a, b, c]);
    }

    #[test]
    fn test_reorder_to_index_inside_container_is_unsupported() {
        let mut tree = ElementTree::new();
        let container = tree.append("container", None).expect("container");
        let child = tree.insert_into_container("button", &container, None).expect("child");
        let err = tree
            .reorder_to_index(&child, 0, container.as_str())
            .expect_err("nested target");
        assert!(matches!(err, BuilderError::Unsupported(_)));
        assert!(tree
            .reorder_to_index(&child, 0, ROOT_CONTAINER_ID)
            .is_err());
    }

    #[test]
    fn test_is_descendant_of_container() {
        let mut tree = ElementTree::new();
        let top = tree.append("button", None).expect("top");
        let container = tree.append("container", None).expect("container");
        let inner = tree.insert_into_container("container", &container, None).expect("inner");
        let deep = tree.insert_into_container("input", &inner, None).expect("deep");

        assert!(!tree.is_descendant_of_container(&top));
        assert!(!tree.is_descendant_of_container(&container));
        assert!(tree.is_descendant_of_container(&inner));
        assert!(tree.is_descendant_of_container(&deep));
        assert!(!tree.is_descendant_of_container(&ElementId::from("ghost")));
        assert_eq!(tree.parent_of(&deep).map(|e| e.id.clone()), Some(inner));
    }

    #[test]
    fn test_iter_is_parent_first_in_order() {
        let mut tree = ElementTree::new();
        let a = tree.append("container", None).expect("a");
        let b = tree.append("button", None).expect("b");
        let a1 = tree.insert_into_container("button", &a, None).expect("a1");
        let a0 = tree.insert_into_container("button", &a, Some(0)).expect("a0");

        let walked: Vec<_> = tree.iter().map(|e| e.id.clone()).collect();
        assert_eq!(walked, vec![a, a0, a1, b]);
    }

    #[test]
    fn test_from_elements_normalizes_and_rejects_duplicates() {
        let leaf = |id: &str, order| Element::new("button", Properties::new(), order).with_id(id);
        let tree = ElementTree::from_elements(vec![leaf("b", 7), leaf("a", 3)]).expect("adopt");
        assert_eq!(ids(tree.elements()), vec![ElementId::from("a"), ElementId::from("b")]);
        assert_eq!(orders(tree.elements()), vec![0, 1]);

        let nested = Element::new("container", Properties::new(), 1).with_id("c").with_children(vec![leaf("a", 0)]);
        let err = ElementTree::from_elements(vec![leaf("a", 0), nested]).expect_err("duplicate");
        assert!(matches!(err, BuilderError::MalformedDocument(_)));
    }

    #[test]
    fn test_import_rejects_children_on_leaf_types() {
        let nested = Element::new("heading", Properties::new(), 0).with_id("x");
        let bad = Element::new("button", Properties::new(), 0)
            .with_id("b")
            .with_children(vec![nested]);
        let err = ElementTree::from_elements(vec![bad]).expect_err("leaf with children");
        assert!(matches!(err, BuilderError::MalformedDocument(ref m) if m.contains("cannot have children")));

        let empty = Element::new("image", Properties::new(), 0).with_children(Vec::new());
        assert!(ElementTree::from_elements(vec![empty]).is_err());
    }

    #[test]
    fn test_only_containers_count_as_parents() {
        let registry = registry();
        let leaf = Element::new("button", Properties::new(), 0)
            .with_children(vec![Element::new("heading", Properties::new(), 0).with_id("x")]);
        assert!(parent_in(std::slice::from_ref(&leaf), &ElementId::from("x"), registry).is_none());

        let container = Element::new("container", Properties::new(), 0)
            .with_children(vec![Element::new("heading", Properties::new(), 0).with_id("y")]);
        assert!(parent_in(std::slice::from_ref(&container), &ElementId::from("y"), registry).is_some());
    }

    #[test]
    fn test_custom_registry_is_kept_on_import() {
        static CUSTOM: std::sync::OnceLock<Registry> = std::sync::OnceLock::new();
        let custom = CUSTOM.get_or_init(|| {
            let definitions = Registry::builtin()
                .definitions()
                .iter()
                .filter(|d| d.element_type.as_str() != "image")
                .cloned()
                .collect();
            Registry::new(definitions)
        });

        let mut tree = ElementTree::from_elements_in(Vec::new(), custom).expect("adopt");
        assert!(std::ptr::eq(tree.registry(), custom));
        assert!(matches!(
            tree.append("image", None),
            Err(BuilderError::UnknownElementType(_))
        ));
        tree.append("button", None).expect("button");
    }
}
