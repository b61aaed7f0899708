//! Canonical exported representation of a layout, shared between the
//! editor and the renderer.
//!
//! ```text
//! {
//!   "version": "1.0.0",
//!   "elements": [ { "id", "type", "properties", "children"?, "order" }, ... ],
//!   "metadata": { "createdAt", "updatedAt", "viewport" }
//! }
//! ```

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::element::{Element, Properties};
use crate::error::{BuilderError, BuilderResult};
use crate::registry::Registry;
use crate::tree::ElementTree;
use crate::viewport::Viewport;

/// Document format version written by [`LayoutDocument::from_tree`].
pub const FORMAT_VERSION: &str = "1.0.0";

/// Revision of [`EXPORT_DENY_LIST`]. Bump whenever the list changes.
pub const EXPORT_DENY_LIST_VERSION: u32 = 1;

/// Editor-internal or legacy property keys dropped on export.
pub const EXPORT_DENY_LIST: &[&str] = &[
    "paddingX",
    "paddingY",
    "marginX",
    "marginY",
    "position",
    "responsive",
    "display",
    "gridTemplateColumns",
    "gridTemplateRows",
];

/// Kept on export only when it holds a truthy value.
const CONDITIONAL_KEY: &str = "size";

/// Required top-level keys of an imported document.
const REQUIRED_KEYS: [&str; 3] = ["version", "elements", "metadata"];

/// Controls how the deny-list is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Strip denied keys from nested children as well as top-level elements.
    pub strip_nested: bool,
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last written.
    pub updated_at: DateTime<Utc>,
    /// Viewport the layout was designed on.
    pub viewport: Viewport,
}

/// Canonical layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Format version.
    pub version: String,
    /// Top-level elements in order.
    pub elements: Vec<Element>,
    /// Metadata.
    pub metadata: DocumentMetadata,
}

impl LayoutDocument {
    /// Build a document from a tree, stripping denied keys from top-level
    /// elements.
    #[must_use]
    pub fn from_tree(tree: &ElementTree, viewport: Viewport, timestamp: DateTime<Utc>) -> Self {
        Self::from_tree_with(tree, viewport, timestamp, ExportOptions::default())
    }

    /// Build a document from a tree with explicit export options.
    #[must_use]
    pub fn from_tree_with(
        tree: &ElementTree,
        viewport: Viewport,
        timestamp: DateTime<Utc>,
        options: ExportOptions,
    ) -> Self {
        let mut elements = tree.elements().to_vec();
        elements.sort_by_key(|e| e.order);
        for element in &mut elements {
            strip_element(element, options.strip_nested);
        }

        let timestamp = timestamp.trunc_subsecs(3);
        Self {
            version: FORMAT_VERSION.to_string(),
            elements,
            metadata: DocumentMetadata {
                created_at: timestamp,
                updated_at: timestamp,
                viewport,
            },
        }
    }

    /// Build a document stamped with the current time.
    #[must_use]
    pub fn export(tree: &ElementTree, viewport: Viewport) -> Self {
        Self::from_tree(tree, viewport, Utc::now())
    }

    /// Parse and shape-check a document.
    ///
    /// The text must be JSON whose `version`, `elements` and `metadata` keys
    /// are all present and truthy, and whose elements and metadata have the
    /// document shape.
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::Serialization`] for invalid JSON or a wrong
    /// shape, and [`BuilderError::MalformedDocument`] when a required key is
    /// missing or empty.
    pub fn parse(json: &str) -> BuilderResult<Self> {
        let result = serde_json::from_str::<Value>(json)
            .map_err(BuilderError::from)
            .and_then(|value| {
                if let Some(key) = REQUIRED_KEYS
                    .iter()
                    .find(|key| !value.get(**key).is_some_and(is_truthy))
                {
                    return Err(BuilderError::MalformedDocument(format!(
                        "missing required key `{key}`"
                    )));
                }
                serde_json::from_value::<Self>(value).map_err(BuilderError::from)
            });

        if let Err(e) = &result {
            tracing::warn!(error = %e, "failed to parse layout document");
        }
        result
    }

    /// Serialize the document to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> BuilderResult<String> {
        serde_json::to_string(self).map_err(BuilderError::Serialization)
    }

    /// Serialize the document to two-space indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> BuilderResult<String> {
        serde_json::to_string_pretty(self).map_err(BuilderError::Serialization)
    }

    /// Materialize the elements as an [`ElementTree`].
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::MalformedDocument`] if element ids repeat or a
    /// leaf element carries children.
    pub fn into_tree(self) -> BuilderResult<ElementTree> {
        ElementTree::from_elements(self.elements)
    }

    /// Materialize the elements as an [`ElementTree`] backed by `registry`.
    ///
    /// # Errors
    ///
    /// See [`LayoutDocument::into_tree`].
    pub fn into_tree_in(self, registry: &'static Registry) -> BuilderResult<ElementTree> {
        ElementTree::from_elements_in(self.elements, registry)
    }
}

/// Remove denied keys from a property map, in place.
pub fn strip_properties(properties: &mut Properties) {
    for key in EXPORT_DENY_LIST {
        properties.remove(*key);
    }
    if properties.get(CONDITIONAL_KEY).is_some_and(|v| !is_truthy(v)) {
        properties.remove(CONDITIONAL_KEY);
    }
}

fn strip_element(element: &mut Element, nested: bool) {
    strip_properties(&mut element.properties);
    if nested {
        for child in element.children.iter_mut().flatten() {
            strip_element(child, nested);
        }
    }
}

/// JSON truthiness as the editor evaluates it.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T10:30:00.123Z")
            .expect("timestamp")
            .with_timezone(&Utc)
    }

    fn tree_with_legacy_keys() -> (ElementTree, crate::ElementId, crate::ElementId) {
        let mut tree = ElementTree::new();
        let container = tree.append("container", None).expect("container");
        let child = tree
            .insert_into_container("button", &container, None)
            .expect("child");
        for id in [&container, &child] {
            tree.update_property(id, "display", json!("grid")).expect("display");
            tree.update_property(id, "paddingX", json!(4)).expect("paddingX");
        }
        (tree, container, child)
    }

    #[test]
    fn test_export_shape() {
        let mut tree = ElementTree::new();
        tree.append("heading", None).expect("heading");
        let doc = LayoutDocument::from_tree(&tree, Viewport::Tablet, fixed_time());
        let value = serde_json::to_value(&doc).expect("to value");

        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["metadata"]["viewport"], "tablet");
        assert_eq!(value["metadata"]["createdAt"], value["metadata"]["updatedAt"]);
        assert!(value["metadata"]["createdAt"]
            .as_str()
            .is_some_and(|s| s.starts_with("2024-05-01T10:30:00.123")));
        assert_eq!(value["elements"][0]["type"], "heading");
    }

    #[test]
    fn test_export_strips_top_level_only_by_default() {
        let (tree, container, child) = tree_with_legacy_keys();
        let doc = LayoutDocument::from_tree(&tree, Viewport::Phone, fixed_time());

        let top = &doc.elements[0];
        assert_eq!(top.id, container);
        assert!(top.property("display").is_none());
        assert!(top.property("paddingX").is_none());
        assert!(top.property("gap").is_some());

        let nested = &top.children()[0];
        assert_eq!(nested.id, child);
        assert!(nested.property("display").is_some());
    }

    #[test]
    fn test_export_can_strip_nested() {
        let (tree, _, _) = tree_with_legacy_keys();
        let doc = LayoutDocument::from_tree_with(
            &tree,
            Viewport::Phone,
            fixed_time(),
            ExportOptions { strip_nested: true },
        );
        let nested = &doc.elements[0].children()[0];
        assert!(nested.property("display").is_none());
        assert!(nested.property("paddingX").is_none());
    }

    #[test]
    fn test_size_kept_only_when_truthy() {
        let mut props = Properties::new();
        props.insert("size".into(), json!("lg"));
        strip_properties(&mut props);
        assert_eq!(props["size"], "lg");

        props.insert("size".into(), json!(""));
        strip_properties(&mut props);
        assert!(props.get("size").is_none());
    }

    #[test]
    fn test_export_does_not_touch_tree() {
        let (tree, container, _) = tree_with_legacy_keys();
        let _ = LayoutDocument::from_tree(&tree, Viewport::Phone, fixed_time());
        assert!(tree
            .find(&container)
            .and_then(|e| e.property("display"))
            .is_some());
    }

    #[test]
    fn test_round_trip() {
        let (tree, _, _) = tree_with_legacy_keys();
        let doc = LayoutDocument::from_tree(&tree, Viewport::Laptop, fixed_time());
        let text = doc.to_json_pretty().expect("serialize");
        let parsed = LayoutDocument::parse(&text).expect("parse");
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_unknown_property_keys_survive() {
        let mut tree = ElementTree::new();
        let id = tree.append("button", None).expect("button");
        tree.update_property(&id, "dataTestId", json!({ "nested": [1, 2] }))
            .expect("update");
        let doc = LayoutDocument::from_tree(&tree, Viewport::Phone, fixed_time());
        let parsed = LayoutDocument::parse(&doc.to_json().expect("json")).expect("parse");
        assert_eq!(parsed.elements[0].properties["dataTestId"], json!({ "nested": [1, 2] }));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = LayoutDocument::parse("not json").expect_err("invalid");
        assert!(matches!(err, BuilderError::Serialization(_)));
    }

    #[test]
    fn test_parse_requires_truthy_keys() {
        let missing = json!({ "version": "1.0.0", "elements": [] }).to_string();
        assert!(matches!(
            LayoutDocument::parse(&missing),
            Err(BuilderError::MalformedDocument(_))
        ));

        let empty_version = json!({
            "version": "",
            "elements": [],
            "metadata": { "createdAt": "2024-05-01T10:30:00Z", "updatedAt": "2024-05-01T10:30:00Z", "viewport": "phone" }
        })
        .to_string();
        assert!(LayoutDocument::parse(&empty_version).is_err());
    }

    #[test]
    fn test_parse_accepts_empty_element_list() {
        let text = json!({
            "version": "1.0.0",
            "elements": [],
            "metadata": { "createdAt": "2024-05-01T10:30:00Z", "updatedAt": "2024-05-01T10:30:00Z", "viewport": "phone" }
        })
        .to_string();
        let doc = LayoutDocument::parse(&text).expect("parse");
        assert!(doc.elements.is_empty());
        assert_eq!(doc.metadata.viewport, Viewport::Phone);
    }

    #[test]
    fn test_parse_rejects_unknown_viewport() {
        let text = json!({
            "version": "1.0.0",
            "elements": [],
            "metadata": { "createdAt": "2024-05-01T10:30:00Z", "updatedAt": "2024-05-01T10:30:00Z", "viewport": "watch" }
        })
        .to_string();
        assert!(LayoutDocument::parse(&text).is_err());
    }
}
