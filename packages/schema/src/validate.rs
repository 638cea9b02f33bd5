//! Structural checks for a loaded page.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::page::Page;
use crate::zones::ZoneKind;

impl Page {
    /// Collect every structural invariant violation.
    ///
    /// An empty result means the page is a well-formed forest anchored at
    /// the three zone roots. Nothing is logged here; callers decide how to
    /// report problems.
    pub fn validate(&self) -> Vec<SchemaError> {
        let mut errors = Vec::new();

        for kind in ZoneKind::ALL {
            let root_id = &self.zones.get(kind).root_id;
            if !self.contains(root_id) {
                errors.push(SchemaError::MissingZoneRoot {
                    zone: kind.to_string(),
                    root_id: root_id.clone(),
                });
            }
        }

        let mut owner: HashMap<&str, &str> = HashMap::new();
        for (key, node) in &self.nodes {
            if *key != node.id {
                errors.push(SchemaError::KeyMismatch {
                    key: key.clone(),
                    id: node.id.clone(),
                });
            }

            if !node.is_container() && !node.children.is_empty() {
                errors.push(SchemaError::LeafWithChildren(node.id.clone()));
            }

            for child in &node.children {
                if !self.contains(child) {
                    errors.push(SchemaError::DanglingChild {
                        parent: node.id.clone(),
                        child: child.clone(),
                    });
                }

                if let Some(first) = owner.insert(child.as_str(), node.id.as_str()) {
                    errors.push(SchemaError::SharedChild {
                        child: child.clone(),
                        first: first.to_string(),
                        second: node.id.clone(),
                    });
                }

                if self.is_zone_root(child) {
                    errors.push(SchemaError::ZoneRootHasParent(child.clone()));
                }
            }
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::SchemaError;
    use crate::node::{Node, NodeType};
    use crate::seed::home_page;

    #[test]
    fn test_seed_page_is_valid() {
        assert!(home_page().unwrap().validate().is_empty());
    }

    #[test]
    fn test_detects_leaf_with_children_and_dangling_child() {
        let page = home_page()
            .unwrap()
            .with_node(Node::new("n_logo", NodeType::Text).with_children(vec!["ghost".into()]));

        let errors = page.validate();
        assert!(errors
            .iter()
            .any(|e| matches!(e, SchemaError::LeafWithChildren(id) if id == "n_logo")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, SchemaError::DanglingChild { child, .. } if child == "ghost")));
    }

    #[test]
    fn test_detects_shared_child_and_reparented_root() {
        let page = home_page().unwrap();
        let list = page.node("n_blog_list").unwrap().as_ref().clone();
        let mut children = list.children.clone();
        children.push("n_p1".into());
        children.push("n_footer_root".into());
        let page = page.with_node(list.with_children(children));

        let errors = page.validate();
        assert!(errors
            .iter()
            .any(|e| matches!(e, SchemaError::SharedChild { child, .. } if child == "n_p1")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, SchemaError::ZoneRootHasParent(id) if id == "n_footer_root")));
    }

    #[test]
    fn test_detects_missing_zone_root() {
        let mut page = home_page().unwrap();
        page.zones.footer.root_id = "nowhere".into();
        assert!(matches!(
            page.validate().as_slice(),
            [SchemaError::MissingZoneRoot { zone, .. }] if zone == "footer"
        ));
    }
}
