//! Props Resolution
//!
//! Computes the effective property bag of a node for a breakpoint by laying
//! the breakpoint's override over the base bag.

use crate::breakpoint::Breakpoint;
use crate::error::SchemaResult;
use crate::page::Page;
use crate::props::PropertyBag;

/// Props resolver bound to one page version
pub struct PropsResolver<'a> {
    page: &'a Page,
}

impl<'a> PropsResolver<'a> {
    pub fn new(page: &'a Page) -> Self {
        Self { page }
    }

    /// Effective properties of `node_id` under `breakpoint`.
    ///
    /// Fails with `NotFound` for an unknown id; callers treat that as
    /// "no props".
    pub fn resolve(&self, node_id: &str, breakpoint: Breakpoint) -> SchemaResult<PropertyBag> {
        let node = self.page.require(node_id)?;
        Ok(node.props.resolve(breakpoint))
    }

    /// Visible unless the resolved bag says `isVisible: false`.
    /// An unknown node counts as visible.
    pub fn is_visible(&self, node_id: &str, breakpoint: Breakpoint) -> bool {
        self.resolve(node_id, breakpoint)
            .ok()
            .and_then(|bag| bag.is_visible())
            .unwrap_or(true)
    }

    /// Whether `node_id` carries an override bag for `breakpoint`
    pub fn has_override(&self, node_id: &str, breakpoint: Breakpoint) -> bool {
        self.page
            .node(node_id)
            .is_some_and(|n| n.props.override_for(breakpoint).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::props::Direction;
    use crate::seed::home_page;

    #[test]
    fn test_override_wins() {
        let page = home_page().unwrap();
        let resolver = PropsResolver::new(&page);

        let mobile = resolver.resolve("n_hero", Breakpoint::Mobile).unwrap();
        let desktop = resolver.resolve("n_hero", Breakpoint::Desktop).unwrap();
        assert_eq!(mobile.direction(), Some(Direction::Column));
        assert_eq!(desktop.direction(), Some(Direction::Row));
    }

    #[test]
    fn test_resolved_keys_come_from_base_or_override() {
        let page = home_page().unwrap();
        let resolver = PropsResolver::new(&page);

        for (id, node) in &page.nodes {
            for bp in Breakpoint::ALL {
                let bag = resolver.resolve(id, bp).unwrap();
                for key in bag.keys() {
                    let in_override = node
                        .props
                        .override_for(bp)
                        .is_some_and(|o| o.contains(key));
                    assert!(node.props.base.contains(key) || in_override);
                    if in_override {
                        assert_eq!(bag.get(key), node.props.override_for(bp).unwrap().get(key));
                    }
                }
            }
        }
    }

    #[test]
    fn test_visibility() {
        let page = home_page().unwrap();
        let resolver = PropsResolver::new(&page);

        assert!(!resolver.is_visible("n_nav", Breakpoint::Mobile));
        assert!(resolver.is_visible("n_nav", Breakpoint::Desktop));
        assert!(resolver.is_visible("n_logo", Breakpoint::Mobile));
        assert!(resolver.is_visible("ghost", Breakpoint::Mobile));
    }

    #[test]
    fn test_missing_node() {
        let page = home_page().unwrap();
        let err = PropsResolver::new(&page)
            .resolve("ghost", Breakpoint::Mobile)
            .unwrap_err();
        assert!(matches!(err, SchemaError::NotFound(id) if id == "ghost"));
        assert!(!PropsResolver::new(&page).has_override("n_p1", Breakpoint::Desktop));
    }
}
