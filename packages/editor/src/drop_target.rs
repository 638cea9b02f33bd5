//! # Drop Target Resolution
//!
//! Maps pointer geometry onto the tree: which container a pointer is over,
//! where in that container's children a drop would land, and whether a drop
//! is legal at all.
//!
//! The resolver builds one [`ParentIndex`] up front and answers every query
//! against the same page version. Build a new resolver after each mutation.

use serde::{Deserialize, Serialize};
use tracing::trace;
use trellis_schema::{Breakpoint, Direction, NodeId, NodeType, Page, ParentIndex};

use crate::drag::DragPayload;
use crate::geometry::{LayoutProbe, Point, Rect};

/// Visual flow of a container's children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    Horizontal,
    /// Two-dimensional flow (grids)
    Mixed,
}

pub struct DropTargetResolver<'a> {
    page: &'a Page,
    parents: ParentIndex,
    breakpoint: Breakpoint,
}

impl<'a> DropTargetResolver<'a> {
    pub fn new(page: &'a Page, breakpoint: Breakpoint) -> Self {
        Self {
            page,
            parents: ParentIndex::build(page),
            breakpoint,
        }
    }

    pub fn parents(&self) -> &ParentIndex {
        &self.parents
    }

    /// `candidate` itself when it is a container, otherwise its closest
    /// container ancestor
    pub fn nearest_container(&self, candidate: &str) -> Option<NodeId> {
        if !self.page.contains(candidate) {
            return None;
        }
        if self.page.is_container(candidate) {
            return Some(candidate.to_string());
        }
        self.parents
            .ancestors(candidate)
            .find(|id| self.page.is_container(id))
            .map(str::to_string)
    }

    pub fn orientation(&self, container_id: &str) -> Option<Orientation> {
        let node = self.page.node(container_id)?;
        match node.node_type {
            NodeType::Grid => Some(Orientation::Mixed),
            NodeType::List => Some(Orientation::Vertical),
            NodeType::Block => match node.props.resolve(self.breakpoint).direction() {
                Some(Direction::Row) => Some(Orientation::Horizontal),
                _ => Some(Orientation::Vertical),
            },
            _ => None,
        }
    }

    /// Child position a drop at `pointer` would take in `container_id`.
    ///
    /// Children without a rendered rect are skipped. The result is always
    /// within `[0, children.len()]`; an empty container yields 0. `None`
    /// when `container_id` is not a container.
    pub fn insertion_index(
        &self,
        container_id: &str,
        pointer: Point,
        layout: &dyn LayoutProbe,
    ) -> Option<usize> {
        let orientation = self.orientation(container_id)?;
        let children = self.page.children_of(container_id);

        let placed: Vec<(usize, Rect)> = children
            .iter()
            .enumerate()
            .filter_map(|(i, id)| layout.rect_of(id).map(|rect| (i, rect)))
            .collect();

        let index = match orientation {
            Orientation::Vertical => placed
                .iter()
                .find(|(_, rect)| pointer.y < rect.center().y)
                .map(|(i, _)| *i),
            Orientation::Horizontal => placed
                .iter()
                .find(|(_, rect)| pointer.x < rect.center().x)
                .map(|(i, _)| *i),
            Orientation::Mixed => nearest_slot(&placed, pointer),
        }
        .unwrap_or(children.len());

        trace!(container_id, ?orientation, index, "insertion index");
        Some(index)
    }

    /// Whether `payload` may be dropped into `destination`.
    ///
    /// `hover` is the container the pointer currently resolves to, if any.
    pub fn can_accept_drop(
        &self,
        payload: &DragPayload,
        destination: &str,
        hover: Option<&str>,
    ) -> bool {
        if !self.page.is_container(destination) {
            return false;
        }

        match payload {
            DragPayload::Palette { .. } => hover.map_or(true, |over| over == destination),

            DragPayload::Node {
                node_id,
                from_parent_id,
            } => {
                if self.page.is_zone_root(node_id) {
                    return false;
                }
                // into itself or anywhere below itself
                if destination == node_id || self.parents.is_ancestor(node_id, destination) {
                    return false;
                }
                !self.parents.is_ancestor(destination, from_parent_id)
            }
        }
    }
}

/// Grid rule: find the closest rendered child, then land before or after it
/// depending on which side of its midpoint the pointer falls
fn nearest_slot(placed: &[(usize, Rect)], pointer: Point) -> Option<usize> {
    let (i, rect) = placed.iter().min_by(|(_, a), (_, b)| {
        a.distance_squared_to(pointer)
            .total_cmp(&b.distance_squared_to(pointer))
    })?;

    let before = if pointer.y < rect.top {
        true
    } else if pointer.y > rect.bottom() {
        false
    } else {
        pointer.x < rect.center().x
    };

    Some(if before { *i } else { *i + 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::StaticLayout;
    use trellis_schema::home_page;

    #[test]
    fn test_nearest_container_walks_up_from_leaf() {
        let page = home_page().unwrap();
        let resolver = DropTargetResolver::new(&page, Breakpoint::Mobile);

        assert_eq!(resolver.nearest_container("n_hero_title").as_deref(), Some("n_hero_text"));
        assert_eq!(resolver.nearest_container("n_p3").as_deref(), Some("n_featured_grid"));
        assert_eq!(resolver.nearest_container("n_blog_list").as_deref(), Some("n_blog_list"));
        assert_eq!(resolver.nearest_container("ghost"), None);
    }

    #[test]
    fn test_orientation_follows_breakpoint_direction() {
        let page = home_page().unwrap();

        let mobile = DropTargetResolver::new(&page, Breakpoint::Mobile);
        let desktop = DropTargetResolver::new(&page, Breakpoint::Desktop);

        assert_eq!(mobile.orientation("n_hero"), Some(Orientation::Vertical));
        assert_eq!(desktop.orientation("n_hero"), Some(Orientation::Horizontal));
        assert_eq!(mobile.orientation("n_featured_grid"), Some(Orientation::Mixed));
        assert_eq!(mobile.orientation("n_blog_list"), Some(Orientation::Vertical));
        assert_eq!(mobile.orientation("n_logo"), None);
    }

    #[test]
    fn test_grid_slot() {
        let page = home_page().unwrap();
        let resolver = DropTargetResolver::new(&page, Breakpoint::Mobile);
        let layout = StaticLayout::grid(
            &["n_p1", "n_p2", "n_p3", "n_p4"],
            Point::new(0.0, 0.0),
            2,
            100.0,
        );

        let at = |x, y| resolver.insertion_index("n_featured_grid", Point::new(x, y), &layout);
        assert_eq!(at(10.0, 50.0), Some(0));
        assert_eq!(at(90.0, 50.0), Some(1));
        assert_eq!(at(140.0, 150.0), Some(3));
        assert_eq!(at(190.0, 190.0), Some(4));
    }
}
