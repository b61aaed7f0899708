//! Layout elements - the nodes of the element tree.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Free-form property mapping stored on every element.
///
/// The registry schema describes which keys an editor offers, but any key
/// survives a round-trip through the document format.
pub type Properties = Map<String, Value>;

/// Unique identifier for an element.
///
/// Freshly created elements get a UUID; imported documents may carry any
/// string, so the id is kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for ElementId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ElementId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A structured size value such as `{ "value": 100, "unit": "%" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Numeric magnitude.
    pub value: f64,
    /// CSS-like unit (`px`, `%`, `rem`, ...).
    pub unit: String,
}

impl Dimension {
    /// A dimension in pixels.
    #[must_use]
    pub fn px(value: f64) -> Self {
        Self {
            value,
            unit: "px".to_string(),
        }
    }

    /// A dimension in percent of the parent.
    #[must_use]
    pub fn percent(value: f64) -> Self {
        Self {
            value,
            unit: "%".to_string(),
        }
    }

    /// Read a dimension object out of a property value.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            value: object.get("value")?.as_f64()?,
            unit: object.get("unit")?.as_str()?.to_string(),
        })
    }

    /// Convert into a property value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "value": self.value, "unit": self.unit })
    }

    /// Render a width/height property the way the renderer applies it.
    ///
    /// Dimension objects become `value` + `unit`, bare numbers are pixels and
    /// strings (`"fit-content"`, `"100%"`) pass through unchanged.
    #[must_use]
    pub fn css(value: &Value) -> Option<String> {
        match value {
            Value::Number(n) => n.as_f64().map(|n| format!("{n}px")),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(_) => Self::from_value(value).map(|d| d.to_string()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// A node of the UI tree: a container or a leaf widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier, never reused or changed.
    pub id: ElementId,
    /// Registry type name (`container`, `button`, ...).
    #[serde(rename = "type")]
    pub element_type: String,
    /// Editable properties.
    #[serde(default)]
    pub properties: Properties,
    /// Ordered children; present only on container-capable types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Element>>,
    /// Position among siblings.
    #[serde(default)]
    pub order: usize,
}

impl Element {
    /// Create a leaf element with a fresh id.
    #[must_use]
    pub fn new(element_type: impl Into<String>, properties: Properties, order: usize) -> Self {
        Self {
            id: ElementId::new(),
            element_type: element_type.into(),
            properties,
            children: None,
            order,
        }
    }

    /// Give the element a (possibly empty) child list.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = Some(children);
        self
    }

    /// Replace the generated id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    /// Children in order, empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Whether `id` names this element or any of its descendants.
    #[must_use]
    pub fn subtree_contains(&self, id: &ElementId) -> bool {
        self.id == *id || self.children().iter().any(|child| child.subtree_contains(id))
    }

    /// Look up a property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Short human label used in outlines: `text`, then `label`, then the id tail.
    #[must_use]
    pub fn label(&self) -> String {
        ["text", "label"]
            .iter()
            .filter_map(|key| self.property(key).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .map_or_else(
                || {
                    let id = self.id.as_str();
                    let start = id.char_indices().rev().nth(7).map_or(0, |(i, _)| i);
                    id[start..].to_string()
                },
                str::to_string,
            )
    }
}
