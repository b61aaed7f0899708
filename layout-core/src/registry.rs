//! Element registry - the built-in element types, their defaults and
//! the property schema an editor offers for each.
//!
//! The registry is immutable. [`registry()`] returns the shared built-in
//! instance; the tree engine consults it whenever it instantiates an element.

use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::element::{Dimension, Element, Properties};
use crate::error::BuilderError;

/// Placeholder shown by freshly dropped image elements.
pub const PLACEHOLDER_IMAGE_SRC: &str =
    "https://via.placeholder.com/300x200/e5e7eb/9ca3af?text=Image";

/// Property hidden from the editor for elements nested inside a container.
pub const HORIZONTAL_ALIGN: &str = "horizontalAlign";

/// The built-in element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Flex container holding ordered children.
    Container,
    /// Clickable button.
    Button,
    /// Heading text (h1-h6).
    Heading,
    /// Image.
    Image,
    /// Form input with optional label.
    Input,
    /// Body text.
    Paragraph,
}

impl ElementType {
    /// All types in palette order.
    pub const ALL: [Self; 6] = [
        Self::Container,
        Self::Button,
        Self::Heading,
        Self::Image,
        Self::Input,
        Self::Paragraph,
    ];

    /// The type name used in documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Button => "button",
            Self::Heading => "heading",
            Self::Image => "image",
            Self::Input => "input",
            Self::Paragraph => "paragraph",
        }
    }

    /// Name shown in the palette and the property panel header.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Container => "Container",
            Self::Button => "Button",
            Self::Heading => "Heading",
            Self::Image => "Image",
            Self::Input => "Input",
            Self::Paragraph => "Paragraph",
        }
    }

    /// Whether elements of this type own a `children` list.
    #[must_use]
    pub const fn supports_children(self) -> bool {
        matches!(self, Self::Container)
    }
}

impl FromStr for ElementType {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| BuilderError::UnknownElementType(s.to_string()))
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of editor widget a property uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// Free text.
    Text,
    /// Number.
    Number,
    /// Hex color.
    Color,
    /// One of a fixed list of options.
    Select,
    /// Checkbox.
    Boolean,
    /// Four-sided spacing edited through `sub_keys`.
    Spacing,
    /// A `{value, unit}` object or a keyword string.
    Dimension,
    /// Several dimensions edited through `sub_keys`.
    Dimensions,
}

/// One editable field of an element type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    /// Property key (or group key for spacing/dimensions).
    pub key: &'static str,
    /// Label shown in the editor.
    pub label: &'static str,
    /// Widget kind.
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    /// Allowed values for [`PropertyKind::Select`].
    #[serde(skip_serializing_if = "is_empty_list")]
    pub options: &'static [&'static str],
    /// Component keys for grouped kinds.
    #[serde(skip_serializing_if = "is_empty_list")]
    pub sub_keys: &'static [&'static str],
    /// Value used when the property is missing.
    pub default_value: Value,
}

fn is_empty_list(list: &&'static [&'static str]) -> bool {
    list.is_empty()
}

impl PropertySchema {
    fn new(key: &'static str, label: &'static str, kind: PropertyKind, default_value: Value) -> Self {
        Self {
            key,
            label,
            kind,
            options: &[],
            sub_keys: &[],
            default_value,
        }
    }

    fn select(key: &'static str, label: &'static str, options: &'static [&'static str]) -> Self {
        let default_value = options.first().map_or(Value::Null, |o| json!(o));
        Self {
            options,
            ..Self::new(key, label, PropertyKind::Select, default_value)
        }
    }

    fn spacing(key: &'static str, label: &'static str, sub_keys: &'static [&'static str]) -> Self {
        Self {
            sub_keys,
            ..Self::new(key, label, PropertyKind::Spacing, json!(0))
        }
    }
}

/// Everything the registry knows about one element type.
#[derive(Debug, Clone)]
pub struct ElementDefinition {
    /// The type.
    pub element_type: ElementType,
    /// Display name.
    pub name: &'static str,
    /// Properties copied onto every new element of this type.
    pub default_properties: Properties,
    /// Editable fields, in editor order.
    pub property_schema: Vec<PropertySchema>,
}

impl ElementDefinition {
    /// Whether elements of this type own a `children` list.
    #[must_use]
    pub const fn supports_children(&self) -> bool {
        self.element_type.supports_children()
    }
}

/// Static mapping from type name to [`ElementDefinition`].
#[derive(Debug, Clone)]
pub struct Registry {
    definitions: Vec<ElementDefinition>,
}

static BUILTIN: OnceLock<Registry> = OnceLock::new();

/// The shared built-in registry.
#[must_use]
pub fn registry() -> &'static Registry {
    BUILTIN.get_or_init(Registry::builtin)
}

impl Registry {
    /// Build a registry from explicit definitions, in palette order.
    ///
    /// Trees only borrow registries for `'static`, so a custom registry is
    /// usually kept in a `static` [`OnceLock`].
    #[must_use]
    pub fn new(definitions: Vec<ElementDefinition>) -> Self {
        Self { definitions }
    }

    /// Build the registry of the six built-in types.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(ElementType::ALL.into_iter().map(definition).collect())
    }

    /// Look up a type by name.
    #[must_use]
    pub fn lookup(&self, type_name: &str) -> Option<&ElementDefinition> {
        self.definitions
            .iter()
            .find(|d| d.element_type.as_str() == type_name)
    }

    /// Whether `type_name` is registered and container-capable.
    #[must_use]
    pub fn supports_children(&self, type_name: &str) -> bool {
        self.lookup(type_name)
            .is_some_and(ElementDefinition::supports_children)
    }

    /// Registered type names in palette order.
    pub fn types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions.iter().map(|d| d.element_type.as_str())
    }

    /// All definitions in palette order.
    #[must_use]
    pub fn definitions(&self) -> &[ElementDefinition] {
        &self.definitions
    }

    /// Build a fresh element of `type_name` with a new id and private copies
    /// of the default properties. Returns `None` for unknown types.
    #[must_use]
    pub fn create_default(&self, type_name: &str, order: usize) -> Option<Element> {
        let definition = self.lookup(type_name)?;
        let element = Element::new(type_name, definition.default_properties.clone(), order);
        Some(if definition.supports_children() {
            element.with_children(Vec::new())
        } else {
            element
        })
    }

    /// The schema an editor should show for an element of `type_name`.
    ///
    /// Elements nested in a container are aligned by their parent, so
    /// `horizontalAlign` is dropped for them.
    #[must_use]
    pub fn visible_schema(&self, type_name: &str, is_nested: bool) -> Vec<&PropertySchema> {
        self.lookup(type_name)
            .map(|d| {
                d.property_schema
                    .iter()
                    .filter(|s| !(is_nested && s.key == HORIZONTAL_ALIGN))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

const PADDING_KEYS: &[&str] = &["paddingTop", "paddingRight", "paddingBottom", "paddingLeft"];
const MARGIN_KEYS: &[&str] = &["marginTop", "marginRight", "marginBottom", "marginLeft"];
const TEXT_ALIGN: &[&str] = &["left", "center", "right"];
const FONT_WEIGHTS: &[&str] = &["normal", "medium", "semibold", "bold"];
const SIZES: &[&str] = &["sm", "md", "lg"];

fn definition(element_type: ElementType) -> ElementDefinition {
    let (default_properties, mut property_schema) = match element_type {
        ElementType::Container => container_defaults(),
        ElementType::Button => button_defaults(),
        ElementType::Heading => heading_defaults(),
        ElementType::Image => image_defaults(),
        ElementType::Input => input_defaults(),
        ElementType::Paragraph => paragraph_defaults(),
    };
    property_schema.extend(layout_schema());

    let mut properties = layout_defaults(element_type);
    if let Value::Object(specific) = default_properties {
        properties.extend(specific);
    }

    ElementDefinition {
        element_type,
        name: element_type.display_name(),
        default_properties: properties,
        property_schema,
    }
}

/// Spacing, size and alignment shared by every type.
fn layout_defaults(element_type: ElementType) -> Properties {
    let width = match element_type {
        ElementType::Container => json!("100%"),
        ElementType::Image => Dimension::px(300.0).to_value(),
        _ => Dimension::percent(100.0).to_value(),
    };

    let mut properties = Properties::new();
    for key in PADDING_KEYS.iter().chain(MARGIN_KEYS) {
        properties.insert((*key).to_string(), json!(0));
    }
    properties.insert("width".into(), width);
    properties.insert("height".into(), json!("fit-content"));
    properties.insert(HORIZONTAL_ALIGN.into(), json!("left"));
    properties
}

fn layout_schema() -> Vec<PropertySchema> {
    vec![
        PropertySchema::spacing("padding", "Padding", PADDING_KEYS),
        PropertySchema::spacing("margin", "Margin", MARGIN_KEYS),
        PropertySchema::new("width", "Width", PropertyKind::Dimension, Dimension::percent(100.0).to_value()),
        PropertySchema::new("height", "Height", PropertyKind::Dimension, json!("fit-content")),
        PropertySchema::select(HORIZONTAL_ALIGN, "Horizontal Align", TEXT_ALIGN),
    ]
}

fn container_defaults() -> (Value, Vec<PropertySchema>) {
    let defaults = json!({
        "justifyContent": "flex-start",
        "alignItems": "flex-start",
        "flexDirection": "row",
        "gap": 8,
        "backgroundColor": "transparent",
    });
    let schema = vec![
        PropertySchema::select("flexDirection", "Direction", &["row", "column"]),
        PropertySchema::select(
            "justifyContent",
            "Justify Content",
            &["flex-start", "center", "flex-end", "space-between", "space-around"],
        ),
        PropertySchema::select(
            "alignItems",
            "Align Items",
            &["flex-start", "center", "flex-end", "stretch"],
        ),
        PropertySchema::new("gap", "Gap", PropertyKind::Number, json!(8)),
        PropertySchema::new("backgroundColor", "Background", PropertyKind::Color, json!("transparent")),
    ];
    (defaults, schema)
}

fn button_defaults() -> (Value, Vec<PropertySchema>) {
    let defaults = json!({
        "text": "Button",
        "variant": "primary",
        "size": "md",
    });
    let schema = vec![
        PropertySchema::new("text", "Text", PropertyKind::Text, json!("Button")),
        PropertySchema::select("variant", "Variant", &["primary", "secondary", "danger", "outline"]),
        PropertySchema {
            default_value: json!("md"),
            ..PropertySchema::select("size", "Size", SIZES)
        },
    ];
    (defaults, schema)
}

fn heading_defaults() -> (Value, Vec<PropertySchema>) {
    let defaults = json!({
        "text": "Heading",
        "level": 1,
        "color": "#1f2937",
        "textAlign": "left",
        "fontWeight": "bold",
    });
    let schema = vec![
        PropertySchema::new("text", "Text", PropertyKind::Text, json!("Heading")),
        PropertySchema::new("level", "Level", PropertyKind::Number, json!(1)),
        PropertySchema::new("color", "Color", PropertyKind::Color, json!("#1f2937")),
        PropertySchema::select("textAlign", "Text Align", TEXT_ALIGN),
        PropertySchema {
            default_value: json!("bold"),
            ..PropertySchema::select("fontWeight", "Font Weight", FONT_WEIGHTS)
        },
    ];
    (defaults, schema)
}

fn image_defaults() -> (Value, Vec<PropertySchema>) {
    let defaults = json!({
        "src": PLACEHOLDER_IMAGE_SRC,
        "alt": "Placeholder image",
        "objectFit": "cover",
        "borderRadius": "md",
    });
    let schema = vec![
        PropertySchema::new("src", "Source URL", PropertyKind::Text, json!(PLACEHOLDER_IMAGE_SRC)),
        PropertySchema::new("alt", "Alt Text", PropertyKind::Text, json!("Placeholder image")),
        PropertySchema::select("objectFit", "Object Fit", &["cover", "contain", "fill", "none", "scale-down"]),
        PropertySchema {
            default_value: json!("md"),
            ..PropertySchema::select("borderRadius", "Border Radius", &["none", "sm", "md", "lg", "full"])
        },
    ];
    (defaults, schema)
}

fn input_defaults() -> (Value, Vec<PropertySchema>) {
    let defaults = json!({
        "type": "text",
        "placeholder": "Enter text...",
        "value": "",
        "label": "",
        "required": false,
        "disabled": false,
        "size": "md",
    });
    let schema = vec![
        PropertySchema::select("type", "Input Type", &["text", "email", "password", "number", "tel", "url"]),
        PropertySchema::new("label", "Label", PropertyKind::Text, json!("")),
        PropertySchema::new("placeholder", "Placeholder", PropertyKind::Text, json!("Enter text...")),
        PropertySchema::new("required", "Required", PropertyKind::Boolean, json!(false)),
        PropertySchema::new("disabled", "Disabled", PropertyKind::Boolean, json!(false)),
        PropertySchema {
            default_value: json!("md"),
            ..PropertySchema::select("size", "Size", SIZES)
        },
    ];
    (defaults, schema)
}

fn paragraph_defaults() -> (Value, Vec<PropertySchema>) {
    let text = "This is a paragraph. You can edit this text to add your content.";
    let defaults = json!({
        "text": text,
        "color": "#374151",
        "textAlign": "left",
        "fontSize": "base",
        "fontWeight": "normal",
        "lineHeight": "normal",
    });
    let schema = vec![
        PropertySchema::new("text", "Text", PropertyKind::Text, json!(text)),
        PropertySchema::new("color", "Color", PropertyKind::Color, json!("#374151")),
        PropertySchema::select("textAlign", "Text Align", TEXT_ALIGN),
        PropertySchema {
            default_value: json!("base"),
            ..PropertySchema::select("fontSize", "Font Size", &["xs", "sm", "base", "lg", "xl"])
        },
        PropertySchema::select("fontWeight", "Font Weight", FONT_WEIGHTS),
        PropertySchema {
            default_value: json!("normal"),
            ..PropertySchema::select("lineHeight", "Line Height", &["tight", "normal", "relaxed", "loose"])
        },
    ];
    (defaults, schema)
}
