//! # Drag Lifecycle
//!
//! ```text
//! Idle ──begin──► Dragging ──hover*──► Dragging ──drop/cancel──► Idle
//! ```
//!
//! Hover memory belongs to the gesture: beginning a drag starts with none
//! and ending one (drop or cancel) always discards it, so a later drag never
//! sees a stale target.

use serde::{Deserialize, Serialize};
use tracing::trace;
use trellis_schema::{NodeId, NodeType, Page};

use crate::drop_target::DropTargetResolver;
use crate::geometry::{LayoutProbe, Point};
use crate::mutations::Mutation;

/// Prefix of a container's drop-list id
pub const DROP_LIST_PREFIX: &str = "dl-";

/// Drop-list id of the palette
pub const PALETTE_LIST_ID: &str = "palette";

pub fn drop_list_id(node_id: &str) -> String {
    format!("{}{}", DROP_LIST_PREFIX, node_id)
}

/// Node id behind a container drop-list id; `None` for the palette
pub fn node_id_from_drop_list(list_id: &str) -> Option<&str> {
    list_id.strip_prefix(DROP_LIST_PREFIX)
}

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DragPayload {
    /// A fresh node from the palette
    Palette { node_type: NodeType },

    /// An existing node and the container it currently sits in
    Node {
        node_id: NodeId,
        from_parent_id: NodeId,
    },
}

/// Pointer-derived target while dragging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragHover {
    pub container_id: Option<NodeId>,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        payload: DragPayload,
        hover: DragHover,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    pub fn payload(&self) -> Option<&DragPayload> {
        match self {
            DragState::Dragging { payload, .. } => Some(payload),
            DragState::Idle => None,
        }
    }

    pub fn hover(&self) -> Option<&DragHover> {
        match self {
            DragState::Dragging { hover, .. } => Some(hover),
            DragState::Idle => None,
        }
    }

    /// Start a gesture with no hover memory
    pub fn begin(&mut self, payload: DragPayload) {
        *self = DragState::Dragging {
            payload,
            hover: DragHover::default(),
        };
    }

    /// Record a new hover target. Returns whether anything changed.
    pub fn update_hover(&mut self, next: DragHover) -> bool {
        match self {
            DragState::Dragging { hover, .. } if *hover != next => {
                *hover = next;
                true
            }
            _ => false,
        }
    }

    /// Leave `Dragging`, handing back what was being dragged
    pub fn end(&mut self) -> Option<(DragPayload, DragHover)> {
        match std::mem::take(self) {
            DragState::Dragging { payload, hover } => Some((payload, hover)),
            DragState::Idle => None,
        }
    }
}

/// Drop notification from the drag-and-drop layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropEvent {
    /// Drop-list the item came from
    pub source_list_id: String,

    /// Drop-list the item was released over
    pub destination_list_id: String,

    #[serde(default)]
    pub previous_index: usize,

    #[serde(default)]
    pub current_index: usize,
}

/// Hover target for a pointer over `raw_hit` (the node under the pointer)
pub fn resolve_hover(
    resolver: &DropTargetResolver<'_>,
    raw_hit: Option<&str>,
    pointer: Point,
    layout: &dyn LayoutProbe,
) -> DragHover {
    let container_id = raw_hit.and_then(|id| resolver.nearest_container(id));
    let index = container_id
        .as_deref()
        .and_then(|id| resolver.insertion_index(id, pointer, layout));

    trace!(?raw_hit, ?container_id, ?index, "drag hover");
    DragHover {
        container_id,
        index,
    }
}

/// Turn a completed drop into the mutation it stands for.
///
/// `None` when the drop lands on the palette, names no container, or is not
/// legal for the payload.
pub fn translate_drop(
    page: &Page,
    resolver: &DropTargetResolver<'_>,
    payload: &DragPayload,
    hover: &DragHover,
    event: &DropEvent,
) -> Option<Mutation> {
    let raw_destination = node_id_from_drop_list(&event.destination_list_id)?;

    match payload {
        DragPayload::Palette { node_type } => {
            let over = hover
                .container_id
                .as_deref()
                .and_then(|id| resolver.nearest_container(id));
            let destination = over.unwrap_or_else(|| raw_destination.to_string());

            if !resolver.can_accept_drop(payload, &destination, hover.container_id.as_deref()) {
                return None;
            }

            // the event index belongs to the raw list, so it is meaningless
            // for a different container
            let index = match hover.index {
                Some(index) => index,
                None if destination != raw_destination => page.children_of(&destination).len(),
                None => event.current_index,
            };

            Some(Mutation::Insert {
                parent_id: destination,
                index,
                node_type: *node_type,
            })
        }

        DragPayload::Node {
            node_id,
            from_parent_id,
        } => {
            if !resolver.can_accept_drop(payload, raw_destination, None) {
                return None;
            }

            if from_parent_id == raw_destination {
                return Some(Mutation::Reorder {
                    parent_id: raw_destination.to_string(),
                    from_index: event.previous_index,
                    to_index: event.current_index,
                });
            }

            Some(Mutation::Move {
                node_id: node_id.clone(),
                from_parent_id: from_parent_id.clone(),
                to_parent_id: raw_destination.to_string(),
                to_index: event.current_index,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_schema::{home_page, Breakpoint};

    fn palette(node_type: NodeType) -> DragPayload {
        DragPayload::Palette { node_type }
    }

    #[test]
    fn test_list_ids() {
        assert_eq!(drop_list_id("n_hero"), "dl-n_hero");
        assert_eq!(node_id_from_drop_list("dl-n_hero"), Some("n_hero"));
        assert_eq!(node_id_from_drop_list(PALETTE_LIST_ID), None);
    }

    #[test]
    fn test_state_machine_clears_hover() {
        let mut state = DragState::default();
        assert!(!state.update_hover(DragHover::default()));

        state.begin(palette(NodeType::Text));
        assert!(state.update_hover(DragHover {
            container_id: Some("n_hero".into()),
            index: Some(1),
        }));
        assert!(!state.update_hover(DragHover {
            container_id: Some("n_hero".into()),
            index: Some(1),
        }));

        let (_, hover) = state.end().unwrap();
        assert_eq!(hover.index, Some(1));
        assert_eq!(state, DragState::Idle);
        assert!(state.end().is_none());

        state.begin(palette(NodeType::Image));
        assert_eq!(state.hover(), Some(&DragHover::default()));
    }

    #[test]
    fn test_palette_drop_over_nested_container_appends() {
        let page = home_page().unwrap();
        let resolver = DropTargetResolver::new(&page, Breakpoint::Mobile);
        let hover = DragHover {
            container_id: Some("n_blog_list".into()),
            index: None,
        };
        let event = DropEvent {
            source_list_id: PALETTE_LIST_ID.into(),
            destination_list_id: drop_list_id("n_body_root"),
            previous_index: 0,
            current_index: 1,
        };

        let mutation = translate_drop(&page, &resolver, &palette(NodeType::BlogCard), &hover, &event);
        assert_eq!(
            mutation,
            Some(Mutation::Insert {
                parent_id: "n_blog_list".into(),
                index: 3,
                node_type: NodeType::BlogCard,
            })
        );
    }

    #[test]
    fn test_node_drop_in_same_container_is_reorder() {
        let page = home_page().unwrap();
        let resolver = DropTargetResolver::new(&page, Breakpoint::Mobile);
        let payload = DragPayload::Node {
            node_id: "n_p1".into(),
            from_parent_id: "n_featured_grid".into(),
        };
        let event = DropEvent {
            source_list_id: drop_list_id("n_featured_grid"),
            destination_list_id: drop_list_id("n_featured_grid"),
            previous_index: 0,
            current_index: 2,
        };

        assert_eq!(
            translate_drop(&page, &resolver, &payload, &DragHover::default(), &event),
            Some(Mutation::Reorder {
                parent_id: "n_featured_grid".into(),
                from_index: 0,
                to_index: 2,
            })
        );
    }

    #[test]
    fn test_payload_json() {
        let payload: DragPayload = serde_json::from_str(
            r#"{"kind":"node","nodeId":"n_p1","fromParentId":"n_featured_grid"}"#,
        )
        .unwrap();
        assert!(matches!(payload, DragPayload::Node { ref node_id, .. } if node_id == "n_p1"));
    }
}
