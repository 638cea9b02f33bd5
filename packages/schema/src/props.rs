//! # Property Bags
//!
//! Open, type-tagged key/value sets carried by every node.
//!
//! Well-known keys (layout, box, visual, content, container, visibility)
//! are decoded into typed [`PropValue`]s when read from JSON. Unknown keys
//! are kept verbatim as raw JSON so a bag round-trips without loss.
//!
//! ## Merge semantics
//!
//! Merging is always **shallow**: an override value replaces the base value
//! for the same key wholesale. Nested values such as [`EdgeInsets`] are never
//! field-merged.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{SchemaError, SchemaResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Align {
    Start,
    Center,
    End,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Justify {
    Start,
    Center,
    End,
    SpaceBetween,
}

/// Per-side inset in pixels (padding, margin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeInsets {
    #[serde(serialize_with = "crate::number::serialize")]
    pub top: f64,
    #[serde(serialize_with = "crate::number::serialize")]
    pub right: f64,
    #[serde(serialize_with = "crate::number::serialize")]
    pub bottom: f64,
    #[serde(serialize_with = "crate::number::serialize")]
    pub left: f64,
}

impl EdgeInsets {
    pub fn all(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// The shared value when all four sides agree
    pub fn uniform(&self) -> Option<f64> {
        let same = self.top == self.right && self.top == self.bottom && self.top == self.left;
        same.then_some(self.top)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Background {
    Color(String),
    Image(String),
}

/// Property key. Known keys carry a fixed value kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropKey {
    Direction,
    Gap,
    Align,
    Justify,
    Padding,
    Margin,
    Radius,
    Background,
    IsVisible,
    Content,
    FontSize,
    FontWeight,
    ImageUrl,
    Ratio,
    Columns,
    Title,
    Price,
    Custom(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Direction,
    Align,
    Justify,
    Number,
    Insets,
    Background,
    Bool,
    Text,
    Raw,
}

impl PropKey {
    pub fn as_str(&self) -> &str {
        match self {
            PropKey::Direction => "direction",
            PropKey::Gap => "gap",
            PropKey::Align => "align",
            PropKey::Justify => "justify",
            PropKey::Padding => "padding",
            PropKey::Margin => "margin",
            PropKey::Radius => "radius",
            PropKey::Background => "background",
            PropKey::IsVisible => "isVisible",
            PropKey::Content => "content",
            PropKey::FontSize => "fontSize",
            PropKey::FontWeight => "fontWeight",
            PropKey::ImageUrl => "imageUrl",
            PropKey::Ratio => "ratio",
            PropKey::Columns => "columns",
            PropKey::Title => "title",
            PropKey::Price => "price",
            PropKey::Custom(name) => name,
        }
    }

    pub fn parse(name: &str) -> Self {
        match name {
            "direction" => PropKey::Direction,
            "gap" => PropKey::Gap,
            "align" => PropKey::Align,
            "justify" => PropKey::Justify,
            "padding" => PropKey::Padding,
            "margin" => PropKey::Margin,
            "radius" => PropKey::Radius,
            "background" => PropKey::Background,
            "isVisible" => PropKey::IsVisible,
            "content" => PropKey::Content,
            "fontSize" => PropKey::FontSize,
            "fontWeight" => PropKey::FontWeight,
            "imageUrl" => PropKey::ImageUrl,
            "ratio" => PropKey::Ratio,
            "columns" => PropKey::Columns,
            "title" => PropKey::Title,
            "price" => PropKey::Price,
            other => PropKey::Custom(other.to_string()),
        }
    }

    fn kind(&self) -> ValueKind {
        match self {
            PropKey::Direction => ValueKind::Direction,
            PropKey::Align => ValueKind::Align,
            PropKey::Justify => ValueKind::Justify,
            PropKey::Gap
            | PropKey::Radius
            | PropKey::FontSize
            | PropKey::FontWeight
            | PropKey::Columns => ValueKind::Number,
            PropKey::Padding | PropKey::Margin => ValueKind::Insets,
            PropKey::Background => ValueKind::Background,
            PropKey::IsVisible => ValueKind::Bool,
            PropKey::Content
            | PropKey::ImageUrl
            | PropKey::Ratio
            | PropKey::Title
            | PropKey::Price => ValueKind::Text,
            PropKey::Custom(_) => ValueKind::Raw,
        }
    }

    /// Decode a raw JSON value into the typed value this key expects
    pub fn decode(&self, value: serde_json::Value) -> SchemaResult<PropValue> {
        let invalid = |e: serde_json::Error| SchemaError::invalid_property(self.as_str(), e.to_string());

        let decoded = match self.kind() {
            ValueKind::Direction => PropValue::Direction(serde_json::from_value(value).map_err(invalid)?),
            ValueKind::Align => PropValue::Align(serde_json::from_value(value).map_err(invalid)?),
            ValueKind::Justify => PropValue::Justify(serde_json::from_value(value).map_err(invalid)?),
            ValueKind::Number => PropValue::Number(serde_json::from_value(value).map_err(invalid)?),
            ValueKind::Insets => PropValue::Insets(serde_json::from_value(value).map_err(invalid)?),
            ValueKind::Background => {
                PropValue::Background(serde_json::from_value(value).map_err(invalid)?)
            }
            ValueKind::Bool => PropValue::Bool(serde_json::from_value(value).map_err(invalid)?),
            ValueKind::Text => PropValue::Text(serde_json::from_value(value).map_err(invalid)?),
            ValueKind::Raw => PropValue::Raw(value),
        };

        Ok(decoded)
    }

    /// Whether `value` has the kind this key expects
    pub fn accepts(&self, value: &PropValue) -> bool {
        matches!(
            (self.kind(), value),
            (ValueKind::Direction, PropValue::Direction(_))
                | (ValueKind::Align, PropValue::Align(_))
                | (ValueKind::Justify, PropValue::Justify(_))
                | (ValueKind::Number, PropValue::Number(_))
                | (ValueKind::Insets, PropValue::Insets(_))
                | (ValueKind::Background, PropValue::Background(_))
                | (ValueKind::Bool, PropValue::Bool(_))
                | (ValueKind::Text, PropValue::Text(_))
                | (ValueKind::Raw, _)
        )
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for PropKey {
    fn from(name: &str) -> Self {
        PropKey::parse(name)
    }
}

/// Typed property value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropValue {
    Direction(Direction),
    Align(Align),
    Justify(Justify),
    Number(#[serde(serialize_with = "crate::number::serialize")] f64),
    Insets(EdgeInsets),
    Background(Background),
    Bool(bool),
    Text(String),
    Raw(serde_json::Value),
}

impl From<Direction> for PropValue {
    fn from(v: Direction) -> Self {
        PropValue::Direction(v)
    }
}

impl From<Align> for PropValue {
    fn from(v: Align) -> Self {
        PropValue::Align(v)
    }
}

impl From<Justify> for PropValue {
    fn from(v: Justify) -> Self {
        PropValue::Justify(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        PropValue::Number(v)
    }
}

impl From<EdgeInsets> for PropValue {
    fn from(v: EdgeInsets) -> Self {
        PropValue::Insets(v)
    }
}

impl From<Background> for PropValue {
    fn from(v: Background) -> Self {
        PropValue::Background(v)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        PropValue::Bool(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::Text(v.to_string())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        PropValue::Text(v)
    }
}

/// A node's property set (base bag or one breakpoint's override bag)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    entries: BTreeMap<PropKey, PropValue>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: PropKey, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Decode a bag from a JSON object
    pub fn from_json(value: serde_json::Value) -> SchemaResult<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(SchemaError::invalid_property("<bag>", "expected a JSON object"));
        };

        let mut bag = Self::new();
        for (name, raw) in map {
            if raw.is_null() {
                continue;
            }
            let key = PropKey::parse(&name);
            let value = key.decode(raw)?;
            bag.entries.insert(key, value);
        }
        Ok(bag)
    }

    pub fn get(&self, key: &PropKey) -> Option<&PropValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &PropKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: PropKey, value: impl Into<PropValue>) -> Option<PropValue> {
        self.entries.insert(key, value.into())
    }

    pub fn remove(&mut self, key: &PropKey) -> Option<PropValue> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &PropKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, PropKey, PropValue> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shallow merge: every key of `over` replaces the same key of `self`
    pub fn merged_with(&self, over: &PropertyBag) -> PropertyBag {
        let mut merged = self.clone();
        for (key, value) in &over.entries {
            merged.entries.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Apply a patch in place: `Some` sets, `None` removes
    pub fn apply_patch(&mut self, patch: &PropPatch) {
        for (key, change) in patch.iter() {
            match change {
                Some(value) => {
                    self.entries.insert(key.clone(), value.clone());
                }
                None => {
                    self.entries.remove(key);
                }
            }
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self.get(&PropKey::Direction) {
            Some(PropValue::Direction(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn is_visible(&self) -> Option<bool> {
        match self.get(&PropKey::IsVisible) {
            Some(PropValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn number(&self, key: &PropKey) -> Option<f64> {
        match self.get(key) {
            Some(PropValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn text(&self, key: &PropKey) -> Option<&str> {
        match self.get(key) {
            Some(PropValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn insets(&self, key: &PropKey) -> Option<&EdgeInsets> {
        match self.get(key) {
            Some(PropValue::Insets(i)) => Some(i),
            _ => None,
        }
    }

    pub fn gap(&self) -> Option<f64> {
        self.number(&PropKey::Gap)
    }

    pub fn columns(&self) -> Option<u32> {
        self.number(&PropKey::Columns)
            .filter(|n| *n >= 0.0)
            .map(|n| n as u32)
    }

    pub fn content(&self) -> Option<&str> {
        self.text(&PropKey::Content)
    }

    pub fn padding(&self) -> Option<&EdgeInsets> {
        self.insets(&PropKey::Padding)
    }

    pub fn background(&self) -> Option<&Background> {
        match self.get(&PropKey::Background) {
            Some(PropValue::Background(bg)) => Some(bg),
            _ => None,
        }
    }
}

impl<'a> IntoIterator for &'a PropertyBag {
    type Item = (&'a PropKey, &'a PropValue);
    type IntoIter = btree_map::Iter<'a, PropKey, PropValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for PropertyBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key.as_str(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertyBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        PropertyBag::from_json(raw).map_err(de::Error::custom)
    }
}

/// Partial change to a bag. A `None` entry is an explicit removal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropPatch {
    entries: BTreeMap<PropKey, Option<PropValue>>,
}

impl PropPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: PropKey, value: impl Into<PropValue>) -> Self {
        self.entries.insert(key, Some(value.into()));
        self
    }

    pub fn unset(mut self, key: PropKey) -> Self {
        self.entries.insert(key, None);
        self
    }

    /// Decode a patch from a JSON object; `null` values become removals
    pub fn from_json(value: serde_json::Value) -> SchemaResult<Self> {
        let serde_json::Value::Object(map) = value else {
            return Err(SchemaError::invalid_property("<patch>", "expected a JSON object"));
        };

        let mut patch = Self::new();
        for (name, raw) in map {
            let key = PropKey::parse(&name);
            let change = if raw.is_null() {
                None
            } else {
                Some(key.decode(raw)?)
            };
            patch.entries.insert(key, change);
        }
        Ok(patch)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, PropKey, Option<PropValue>> {
        self.entries.iter()
    }

    pub fn get(&self, key: &PropKey) -> Option<&Option<PropValue>> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PropPatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, change) in &self.entries {
            map.serialize_entry(key.as_str(), change)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropPatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        PropPatch::from_json(raw).map_err(de::Error::custom)
    }
}
