use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::breakpoint::Breakpoint;
use crate::error::SchemaError;
use crate::props::{Background, Direction, EdgeInsets, PropKey, PropPatch, PropertyBag};

pub type NodeId = String;

/// Closed set of node types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Block,
    Text,
    Image,
    Grid,
    List,
    ProductCard,
    BlogCard,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        NodeType::Block,
        NodeType::Text,
        NodeType::Image,
        NodeType::Grid,
        NodeType::List,
        NodeType::ProductCard,
        NodeType::BlogCard,
    ];

    /// Only BLOCK, GRID and LIST may own children
    pub fn is_container(&self) -> bool {
        matches!(self, NodeType::Block | NodeType::Grid | NodeType::List)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Block => "BLOCK",
            NodeType::Text => "TEXT",
            NodeType::Image => "IMAGE",
            NodeType::Grid => "GRID",
            NodeType::List => "LIST",
            NodeType::ProductCard => "PRODUCT_CARD",
            NodeType::BlogCard => "BLOG_CARD",
        }
    }

    /// Lowercase form used inside generated ids
    pub fn slug(&self) -> &'static str {
        match self {
            NodeType::Block => "block",
            NodeType::Text => "text",
            NodeType::Image => "image",
            NodeType::Grid => "grid",
            NodeType::List => "list",
            NodeType::ProductCard => "product_card",
            NodeType::BlogCard => "blog_card",
        }
    }

    /// Base properties for a node freshly inserted from the palette
    pub fn default_props(&self) -> PropertyBag {
        match self {
            NodeType::Text => PropertyBag::new()
                .with(PropKey::Content, "New text")
                .with(PropKey::FontSize, 14.0),
            NodeType::Image => PropertyBag::new()
                .with(PropKey::ImageUrl, "https://picsum.photos/600/400?random=99")
                .with(PropKey::Radius, 12.0),
            NodeType::Block => PropertyBag::new()
                .with(PropKey::Direction, Direction::Column)
                .with(PropKey::Gap, 12.0)
                .with(PropKey::Padding, EdgeInsets::all(12.0)),
            NodeType::Grid => PropertyBag::new()
                .with(PropKey::Columns, 2.0)
                .with(PropKey::Gap, 12.0),
            NodeType::List => PropertyBag::new().with(PropKey::Gap, 12.0),
            NodeType::ProductCard => PropertyBag::new()
                .with(PropKey::Title, "New product")
                .with(PropKey::Price, "0đ")
                .with(PropKey::ImageUrl, "https://picsum.photos/400/300?random=98"),
            NodeType::BlogCard => PropertyBag::new()
                .with(PropKey::Title, "New post")
                .with(PropKey::ImageUrl, "https://picsum.photos/600/400?random=97"),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SchemaError::UnknownNodeType(s.to_string()))
    }
}

/// Base bag plus optional per-breakpoint override bags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveProps {
    #[serde(default)]
    pub base: PropertyBag,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<Breakpoint, PropertyBag>,
}

impl ResponsiveProps {
    pub fn from_base(base: PropertyBag) -> Self {
        Self {
            base,
            overrides: BTreeMap::new(),
        }
    }

    pub fn override_for(&self, breakpoint: Breakpoint) -> Option<&PropertyBag> {
        self.overrides.get(&breakpoint)
    }

    /// Effective bag for `breakpoint`: base, then that breakpoint's override
    pub fn resolve(&self, breakpoint: Breakpoint) -> PropertyBag {
        match self.overrides.get(&breakpoint) {
            Some(over) => self.base.merged_with(over),
            None => self.base.clone(),
        }
    }

    pub fn with_base_patch(&self, patch: &PropPatch) -> Self {
        let mut next = self.clone();
        next.base.apply_patch(patch);
        next
    }

    /// Patch the override bag for `breakpoint`, creating it when absent
    pub fn with_override_patch(&self, breakpoint: Breakpoint, patch: &PropPatch) -> Self {
        let mut next = self.clone();
        next.overrides.entry(breakpoint).or_default().apply_patch(patch);
        next
    }

    /// Drop the whole override bag; `None` when there was nothing to drop
    pub fn without_override(&self, breakpoint: Breakpoint) -> Option<Self> {
        if !self.overrides.contains_key(&breakpoint) {
            return None;
        }
        let mut next = self.clone();
        next.overrides.remove(&breakpoint);
        Some(next)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    #[serde(default)]
    pub children: Vec<NodeId>,

    #[serde(default)]
    pub props: ResponsiveProps,
}

impl Node {
    /// New childless node carrying the type's default base properties
    pub fn new(id: impl Into<NodeId>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            children: Vec::new(),
            props: ResponsiveProps::from_base(node_type.default_props()),
        }
    }

    pub fn with_children(mut self, children: Vec<NodeId>) -> Self {
        self.children = children;
        self
    }

    pub fn with_props(mut self, props: ResponsiveProps) -> Self {
        self.props = props;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.props.base.insert(PropKey::Background, background);
        self
    }

    pub fn is_container(&self) -> bool {
        self.node_type.is_container()
    }
}
