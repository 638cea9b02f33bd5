use std::collections::{HashMap, HashSet};

use crate::node::NodeId;
use crate::page::Page;

/// Child id to parent id, derived from a [`Page`].
///
/// Never authoritative. Rebuild it from the current page whenever the page
/// changes.
#[derive(Debug, Clone, Default)]
pub struct ParentIndex {
    parents: HashMap<NodeId, NodeId>,
}

impl ParentIndex {
    pub fn build(page: &Page) -> Self {
        let mut parents = HashMap::with_capacity(page.node_count());
        for node in page.nodes.values() {
            for child in &node.children {
                // first writer wins if the map is corrupt and a child is shared
                parents
                    .entry(child.clone())
                    .or_insert_with(|| node.id.clone());
            }
        }
        Self { parents }
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    /// Parent, grandparent and so on up to the topmost ancestor
    pub fn ancestors<'a>(&'a self, id: &str) -> Ancestors<'a> {
        Ancestors {
            index: self,
            current: self.parent_of(id),
            seen: HashSet::new(),
        }
    }

    /// Whether `ancestor` sits strictly above `id`
    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

pub struct Ancestors<'a> {
    index: &'a ParentIndex,
    current: Option<&'a str>,
    seen: HashSet<&'a str>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        if !self.seen.insert(id) {
            self.current = None;
            return None;
        }
        self.current = self.index.parent_of(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::home_page;

    #[test]
    fn test_parent_lookup() {
        let page = home_page().unwrap();
        let index = ParentIndex::build(&page);

        assert_eq!(index.parent_of("n_p1"), Some("n_featured_grid"));
        assert_eq!(index.parent_of("n_body_root"), None);
        assert_eq!(
            index.ancestors("n_hero_title").collect::<Vec<_>>(),
            vec!["n_hero_text", "n_hero", "n_body_root"]
        );
        assert!(index.is_ancestor("n_body_root", "n_b2"));
        assert!(!index.is_ancestor("n_header_root", "n_b2"));
    }

    #[test]
    fn test_every_child_is_indexed() {
        let page = home_page().unwrap();
        let index = ParentIndex::build(&page);
        let child_count: usize = page.nodes.values().map(|n| n.children.len()).sum();
        assert_eq!(index.len(), child_count);
    }
}
