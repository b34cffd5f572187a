#![forbid(unsafe_code)]

//! The schema node graph: tagged node variants and their wire shape.
//!
//! A wording schema is a flat map of nodes keyed by opaque string id.
//! Each node is one of five kinds: `string-template`, `number`,
//! `boolean`, `array`, `object`. Array and object nodes reference other
//! nodes **by id**; the map plus those references form the schema graph.
//!
//! # Wire shape
//!
//! One JSON object per node, internally tagged:
//!
//! ```json
//! { "id": "n3", "type": "string-template", "params": { "name": { "type": "string" } },
//!   "instances": { "en": "Hello {name}" } }
//! { "id": "n4", "type": "array", "itemTypeId": "n5" }
//! { "id": "n6", "type": "object", "fields": [ { "name": "{SIZE}Label", "typeId": "n7",
//!   "params": { "SIZE": { "type": "constant", "name": "SIZE" } } } ] }
//! ```
//!
//! Optional maps are serialized as **absent**, never empty — templated-
//! field-name detection treats "has params" as a boolean derived from
//! map presence.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::plural::PluralForms;

/// Opaque string id of a schema node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Definition of one template parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamDef {
    /// Free-form per-locale substitution.
    String,
    /// Numeric parameter (also drives plural-rule selection).
    Number,
    /// Reference to a named project constant; expands across the
    /// constant's enum options when used in a field name.
    Constant {
        /// Name of the referenced constant.
        name: String,
    },
}

/// Marker for string-template variants beyond the plain single form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateVariant {
    /// Two forms per locale (`one`/`other`) selected by a numeric count.
    Pluralized,
}

/// Per-locale value of a string-template node: a plain string, or a
/// pair of plural forms when the node is pluralized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    /// Single-form template text.
    Plain(String),
    /// `one`/`other` forms of a pluralized template.
    Pluralized(PluralForms),
}

impl TemplateValue {
    /// Every text form carried by this value, in a fixed order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        match self {
            TemplateValue::Plain(text) => vec![text],
            TemplateValue::Pluralized(forms) => vec![&forms.one, &forms.other],
        }
    }
}

/// One entry of an object node's ordered field list.
///
/// `params` is present exactly when the field name is a template
/// (contains `{param}` placeholders); it is re-derived from the name,
/// never hand-edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Display name, possibly templated (`"{SIZE}Label"`).
    pub name: String,
    /// Id of the node describing this field's value shape.
    pub type_id: NodeId,
    /// Derived parameters of a templated name; absent for plain names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, ParamDef>>,
}

impl Field {
    /// A fresh field referencing `type_id` with an empty name.
    #[must_use]
    pub fn new(type_id: NodeId) -> Self {
        Self {
            name: String::new(),
            type_id,
            params: None,
        }
    }

    /// True when the field name is templated (derived params present).
    #[must_use]
    pub fn is_templated(&self) -> bool {
        self.params.is_some()
    }
}

/// Discriminant of a node kind, used when replacing a node's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    StringTemplate,
    Number,
    Boolean,
    Array,
    Object,
}

/// Body of a schema node (everything except the id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeKind {
    /// Translatable string with `{param}` placeholders.
    StringTemplate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<BTreeMap<String, ParamDef>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variant: Option<TemplateVariant>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instances: Option<BTreeMap<String, TemplateValue>>,
    },
    /// Translatable number.
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instances: Option<BTreeMap<String, f64>>,
    },
    /// Translatable boolean.
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instances: Option<BTreeMap<String, bool>>,
    },
    /// Homogeneous list; per-locale instances are raw arrays whose items
    /// match the item node's shape.
    Array {
        #[serde(rename = "itemTypeId")]
        item_type_id: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instances: Option<BTreeMap<String, Vec<serde_json::Value>>>,
    },
    /// Structured record; carries no instances of its own — each field's
    /// values live on that field's type node (raw nested objects appear
    /// only inside array instances).
    Object {
        fields: Vec<Field>,
    },
}

impl NodeKind {
    /// The kind discriminant.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::StringTemplate { .. } => NodeType::StringTemplate,
            NodeKind::Number { .. } => NodeType::Number,
            NodeKind::Boolean { .. } => NodeType::Boolean,
            NodeKind::Array { .. } => NodeType::Array,
            NodeKind::Object { .. } => NodeType::Object,
        }
    }

    /// A fresh single-form string template with nothing filled in.
    #[must_use]
    pub fn empty_string_template() -> Self {
        NodeKind::StringTemplate {
            params: None,
            variant: None,
            instances: None,
        }
    }

    /// A fresh number node.
    #[must_use]
    pub fn empty_number() -> Self {
        NodeKind::Number { instances: None }
    }

    /// A fresh boolean node.
    #[must_use]
    pub fn empty_boolean() -> Self {
        NodeKind::Boolean { instances: None }
    }

    /// A fresh array node referencing `item_type_id`.
    #[must_use]
    pub fn empty_array(item_type_id: NodeId) -> Self {
        NodeKind::Array {
            item_type_id,
            instances: None,
        }
    }

    /// A fresh object node with no fields.
    #[must_use]
    pub fn empty_object() -> Self {
        NodeKind::Object { fields: Vec::new() }
    }

    /// The fields of an object node, if this is one.
    #[must_use]
    pub fn fields(&self) -> Option<&[Field]> {
        match self {
            NodeKind::Object { fields } => Some(fields),
            _ => None,
        }
    }
}

/// One schema node: id plus body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Opaque id; also the node's key in the node map.
    pub id: NodeId,
    /// The node body.
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl SchemaNode {
    /// Construct a node.
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Parse a node out of a store value. The `id` argument labels the
    /// error when the value does not conform.
    pub fn from_store_value(id: &NodeId, value: &wording_store::Value) -> Result<Self, SchemaError> {
        serde_json::from_value(value.to_json()).map_err(|source| SchemaError::MalformedNode {
            id: id.to_string(),
            source,
        })
    }

    /// Encode the node as a store value.
    pub fn to_store_value(&self) -> Result<wording_store::Value, SchemaError> {
        Ok(wording_store::Value::from_json(serde_json::to_value(self)?))
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
