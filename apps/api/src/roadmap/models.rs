//! Roadmap Model: the two roadmap shapes and the classification rule that picks one.
//!
//! A roadmap arrives as a plain JSON array. Its shape is decided once, from the first
//! element, when the array is turned into a [`Roadmap`]; everything downstream matches
//! on the enum instead of sniffing fields again.

use std::borrow::Cow;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// A field value kept exactly as it arrived. Generated roadmaps mix string and numeric
/// ids (`"id": 3`) and free-form dates, so nothing is coerced at ingestion; the value is
/// turned into text only where it is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValue(Value);

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// Strings verbatim, anything else as its JSON text.
    pub fn text(&self) -> Cow<'_, str> {
        match &self.0 {
            Value::String(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sequential variant
// ────────────────────────────────────────────────────────────────────────────

/// One dated step of a linear roadmap.
///
/// Every field is optional at ingestion; gaps are tolerated and surface when the step is
/// rendered. Dates stay as the text the source used. `end_date >= start_date` is expected
/// but not enforced. Fields not modelled here are carried in `extra` and serialized back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<FieldValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ────────────────────────────────────────────────────────────────────────────
// Branching variant
// ────────────────────────────────────────────────────────────────────────────

/// An outgoing edge of a branching node. Serialized as `{ "id": target, "label": edge label }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NextRef {
    #[serde(rename = "id", default, skip_serializing_if = "Option::is_none")]
    pub target: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<FieldValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NextRef {
    /// Edge label, treating an empty label the same as no label.
    pub fn edge_label(&self) -> Option<Cow<'_, str>> {
        self.label
            .as_ref()
            .map(FieldValue::text)
            .filter(|l| !l.is_empty())
    }
}

/// A labeled node of a branching roadmap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadmapNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<FieldValue>,
    #[serde(
        default,
        deserialize_with = "lenient_edges",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub next: Vec<NextRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `null` or any other non-array `next` means no outgoing edges; entries that are not
/// objects become edges with no target.
fn lenient_edges<'de, D>(deserializer: D) -> Result<Vec<NextRef>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => {
            warn!("Ignoring `next` of {}; expected an array", json_kind(&other));
            Ok(Vec::new())
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Classification
// ────────────────────────────────────────────────────────────────────────────

/// Result of inspecting a candidate roadmap value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadmapShape {
    Empty,
    Sequential,
    Branching,
    Invalid,
}

/// Classifies a candidate value by its first element only.
///
/// - empty array → `Empty`
/// - first element has non-null `id` and `label` → `Branching`
/// - first element has `stepId` → `Sequential`
/// - anything else, including non-arrays → `Invalid`
pub fn classify(value: &Value) -> RoadmapShape {
    let Some(items) = value.as_array() else {
        return RoadmapShape::Invalid;
    };
    let Some(first) = items.first() else {
        return RoadmapShape::Empty;
    };

    let has = |key: &str| first.get(key).is_some_and(|v| !v.is_null());

    if has("id") && has("label") {
        RoadmapShape::Branching
    } else if first.get("stepId").is_some() {
        RoadmapShape::Sequential
    } else {
        RoadmapShape::Invalid
    }
}

#[derive(Debug, Error)]
pub enum RoadmapError {
    #[error("roadmap must be an array whose first element has `id`+`label` or `stepId` (got {0})")]
    Unrecognized(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Roadmap
// ────────────────────────────────────────────────────────────────────────────

/// A roadmap in exactly one shape. On the wire it is always a bare JSON array.
#[derive(Debug, Clone, PartialEq)]
pub enum Roadmap {
    Empty,
    Sequential(Vec<RoadmapStep>),
    Branching(Vec<RoadmapNode>),
}

impl Roadmap {
    /// Classifies `value` and reads every element into the chosen variant.
    /// Only classification can fail. Later elements are not re-classified or validated;
    /// whatever they lack surfaces when the roadmap is rendered.
    pub fn from_value(value: Value) -> Result<Self, RoadmapError> {
        match classify(&value) {
            RoadmapShape::Empty => Ok(Roadmap::Empty),
            RoadmapShape::Sequential => Ok(Roadmap::Sequential(read_elements(value))),
            RoadmapShape::Branching => Ok(Roadmap::Branching(read_elements(value))),
            RoadmapShape::Invalid => Err(RoadmapError::Unrecognized(describe(&value))),
        }
    }

    pub fn shape(&self) -> RoadmapShape {
        match self {
            Roadmap::Empty => RoadmapShape::Empty,
            Roadmap::Sequential(_) => RoadmapShape::Sequential,
            Roadmap::Branching(_) => RoadmapShape::Branching,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Roadmap::Empty => 0,
            Roadmap::Sequential(steps) => steps.len(),
            Roadmap::Branching(nodes) => nodes.len(),
        }
    }
}

/// Object elements always deserialize since every field accepts any JSON value. A
/// non-object element becomes an empty one.
fn read_elements<T: de::DeserializeOwned + Default>(value: Value) -> Vec<T> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                warn!("Roadmap element {index} is not an object ({e}); treating it as empty");
                T::default()
            })
        })
        .collect()
}

fn describe(value: &Value) -> String {
    match value.as_array().and_then(|items| items.first()) {
        Some(first) => format!("array whose first element is {}", json_kind(first)),
        None => json_kind(value).to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Serialize for Roadmap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Roadmap::Empty => serializer.collect_seq(std::iter::empty::<Value>()),
            Roadmap::Sequential(steps) => serializer.collect_seq(steps),
            Roadmap::Branching(nodes) => serializer.collect_seq(nodes),
        }
    }
}

impl<'de> Deserialize<'de> for Roadmap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Roadmap::from_value(value).map_err(de::Error::custom)
    }
}
