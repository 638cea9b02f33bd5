//! # Page
//!
//! The typed document: zones, design tokens and the flat node map.
//!
//! Tree order lives in each node's `children` sequence, never in map order.
//! Nodes are held behind [`Arc`] so that every edit produces a new `Page`
//! sharing all untouched nodes with the previous version.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::breakpoint::Breakpoint;
use crate::error::{SchemaError, SchemaResult};
use crate::node::{Node, NodeId};
use crate::tokens::DesignTokens;
use crate::zones::{ZoneKind, Zones};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default = "default_mode_support")]
    pub mode_support: Vec<Breakpoint>,

    #[serde(default)]
    pub design_tokens: DesignTokens,

    pub zones: Zones,

    pub nodes: BTreeMap<NodeId, Arc<Node>>,
}

fn default_mode_support() -> Vec<Breakpoint> {
    Breakpoint::ALL.to_vec()
}

impl Page {
    pub fn from_json(source: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json_pretty(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn node(&self, id: &str) -> Option<&Arc<Node>> {
        self.nodes.get(id)
    }

    /// Like [`Page::node`], but a missing id is an error
    pub fn require(&self, id: &str) -> SchemaResult<&Arc<Node>> {
        self.nodes
            .get(id)
            .ok_or_else(|| SchemaError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Header, body and footer root ids, in that order
    pub fn zone_roots(&self) -> [&str; 3] {
        self.zones.root_ids()
    }

    pub fn is_zone_root(&self, id: &str) -> bool {
        self.zones.kind_of_root(id).is_some()
    }

    /// The zone whose subtree holds `id`
    pub fn zone_of(&self, id: &str) -> Option<ZoneKind> {
        ZoneKind::ALL.into_iter().find(|kind| {
            let root = &self.zones.get(*kind).root_id;
            self.subtree(root).iter().any(|n| n == id)
        })
    }

    pub fn children_of(&self, id: &str) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_container(&self, id: &str) -> bool {
        self.nodes.get(id).is_some_and(|n| n.is_container())
    }

    /// Depth-first preorder walk of `root` and everything reachable from it.
    ///
    /// Missing child ids are skipped and each id is visited once, so a
    /// corrupted map with a cycle still terminates.
    pub fn subtree(&self, root: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.nodes.contains_key(root) {
            return out;
        }

        let mut seen = HashSet::new();
        let mut stack = vec![root.to_string()];
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            for child in node.children.iter().rev() {
                if !seen.contains(child) {
                    stack.push(child.clone());
                }
            }
            out.push(id);
        }
        out
    }

    /// Every id reachable from the three zone roots
    pub fn reachable(&self) -> HashSet<NodeId> {
        self.zone_roots()
            .into_iter()
            .flat_map(|root| self.subtree(root))
            .collect()
    }

    /// New page with `node` stored under its id (added or replaced)
    pub fn with_node(&self, node: Node) -> Page {
        let mut next = self.clone();
        next.nodes.insert(node.id.clone(), Arc::new(node));
        next
    }

    /// Store a node in place. Only used while building a new version.
    pub fn replace_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), Arc::new(node));
    }

    pub fn remove_node(&mut self, id: &str) -> Option<Arc<Node>> {
        self.nodes.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeType;
    use crate::zones::Zone;

    fn page() -> Page {
        let mut nodes = BTreeMap::new();
        let mut add = |node: Node| {
            nodes.insert(node.id.clone(), Arc::new(node));
        };
        add(Node::new("h", NodeType::Block));
        add(Node::new("b", NodeType::Block).with_children(vec!["g".into(), "t".into()]));
        add(Node::new("f", NodeType::Block));
        add(Node::new("g", NodeType::Grid).with_children(vec!["c1".into(), "c2".into()]));
        add(Node::new("c1", NodeType::ProductCard));
        add(Node::new("c2", NodeType::ProductCard));
        add(Node::new("t", NodeType::Text));

        Page {
            page_id: "p".to_string(),
            name: "Test".to_string(),
            mode_support: Breakpoint::ALL.to_vec(),
            design_tokens: DesignTokens::default(),
            zones: Zones {
                header: Zone { root_id: "h".into() },
                body: Zone { root_id: "b".into() },
                footer: Zone { root_id: "f".into() },
            },
            nodes,
        }
    }

    #[test]
    fn test_subtree_is_preorder() {
        assert_eq!(page().subtree("b"), vec!["b", "g", "c1", "c2", "t"]);
        assert!(page().subtree("missing").is_empty());
    }

    #[test]
    fn test_subtree_survives_cycle() {
        let mut p = page();
        let g = p.node("g").unwrap().as_ref().clone();
        p.replace_node(g.with_children(vec!["c1".into(), "b".into()]));
        assert_eq!(p.subtree("b"), vec!["b", "g", "c1", "t"]);
    }

    #[test]
    fn test_zone_queries() {
        let p = page();
        assert!(p.is_zone_root("b"));
        assert!(!p.is_zone_root("g"));
        assert_eq!(p.zone_of("c2"), Some(ZoneKind::Body));
        assert_eq!(p.zone_of("h"), Some(ZoneKind::Header));
        assert_eq!(p.zone_of("nope"), None);
    }

    #[test]
    fn test_with_node_shares_untouched_nodes() {
        let p = page();
        let next = p.with_node(Node::new("t", NodeType::Text).with_children(vec![]));
        assert!(Arc::ptr_eq(p.node("g").unwrap(), next.node("g").unwrap()));
        assert!(!Arc::ptr_eq(p.node("t").unwrap(), next.node("t").unwrap()));
    }
}
