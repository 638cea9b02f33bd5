//! # Tree Mutations
//!
//! Structural operations on a [`Page`].
//!
//! Every mutation is a pure function from the current page to a new page.
//! A mutation whose preconditions do not hold is a **no-op**, never an
//! error: the caller gets [`MutationOutcome::Unchanged`] with the reason and
//! the old page stays current.
//!
//! ## Mutation Semantics
//!
//! ### Insert
//! - Fresh id from the session's [`IdGenerator`]
//! - Type default properties
//! - Index clamped into `[0, len]`
//!
//! ### Move
//! - Same parent is a local index shift
//! - Zone roots never move
//! - A node never moves into itself or its own subtree
//!
//! ### Remove
//! - Removes the whole subtree
//! - Scrubs every other child list of deleted ids
//! - Refuses zone roots and orphans
//!
//! ### Visibility
//! - Showing removes `isVisible` from the target bag
//! - Hiding stores an explicit `false`

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::debug;
use trellis_schema::{
    Breakpoint, IdGenerator, Node, NodeId, NodeType, Page, ParentIndex, PropKey, PropPatch,
    PropsResolver,
};

/// Which bag a property edit lands in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropsScope {
    #[default]
    Base,

    /// The breakpoint's override bag
    #[serde(alias = "mode")]
    Override,
}

impl PropsScope {
    pub fn per_breakpoint() -> Self {
        PropsScope::Override
    }
}

/// Structural edit intents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Create a node of `node_type` under `parent_id`
    Insert {
        parent_id: NodeId,
        index: usize,
        node_type: NodeType,
    },

    /// Relocate a node, possibly within the same parent
    Move {
        node_id: NodeId,
        from_parent_id: NodeId,
        to_parent_id: NodeId,
        to_index: usize,
    },

    /// Positional move inside one container
    Reorder {
        parent_id: NodeId,
        from_index: usize,
        to_index: usize,
    },

    /// Delete a node and its subtree
    Remove { node_id: NodeId },

    /// Deep-clone a subtree right after the original
    Duplicate { node_id: NodeId },

    PatchProps {
        node_id: NodeId,
        patch: PropPatch,
        #[serde(default)]
        scope: PropsScope,
        #[serde(default)]
        breakpoint: Breakpoint,
    },

    /// Scope defaults to the breakpoint's override bag when omitted
    ToggleVisibility {
        node_id: NodeId,
        breakpoint: Breakpoint,
        #[serde(default = "PropsScope::per_breakpoint")]
        scope: PropsScope,
    },

    ClearOverride {
        node_id: NodeId,
        breakpoint: Breakpoint,
    },
}

/// Why a mutation left the page unchanged
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoOpReason {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Parent not found: {0}")]
    ParentNotFound(NodeId),

    #[error("Node {0} cannot have children")]
    NotAContainer(NodeId),

    #[error("Zone root {0} is protected")]
    ZoneRoot(NodeId),

    #[error("Node {0} has no parent")]
    Orphan(NodeId),

    #[error("Node {node_id} is not a child of {parent_id}")]
    NotAChild { node_id: NodeId, parent_id: NodeId },

    #[error("Moving {node_id} into {target_id} would create a cycle")]
    Cycle { node_id: NodeId, target_id: NodeId },

    #[error("Index {index} is out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Patch is empty")]
    EmptyPatch,

    #[error("Value for `{0}` has the wrong type")]
    InvalidValue(String),

    #[error("Node {node_id} has no {breakpoint} override")]
    NoOverride {
        node_id: NodeId,
        breakpoint: Breakpoint,
    },

    #[error("Mutation leaves the page unchanged")]
    NoEffect,

    #[error("No drag in progress")]
    NotDragging,

    #[error("Drop target rejected the dragged item")]
    DropRejected,
}

/// A mutation that went through
#[derive(Debug, Clone)]
pub struct Applied {
    pub page: Page,

    /// Root of a freshly created node or subtree
    pub created: Option<NodeId>,

    /// Every id deleted from the node map, preorder
    pub removed: Vec<NodeId>,
}

impl Applied {
    fn page(page: Page) -> Self {
        Self {
            page,
            created: None,
            removed: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum MutationOutcome {
    Applied(Applied),
    Unchanged(NoOpReason),
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied(_))
    }

    pub fn page(&self) -> Option<&Page> {
        match self {
            MutationOutcome::Applied(applied) => Some(&applied.page),
            MutationOutcome::Unchanged(_) => None,
        }
    }

    pub fn created(&self) -> Option<&str> {
        match self {
            MutationOutcome::Applied(applied) => applied.created.as_deref(),
            MutationOutcome::Unchanged(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&NoOpReason> {
        match self {
            MutationOutcome::Applied(_) => None,
            MutationOutcome::Unchanged(reason) => Some(reason),
        }
    }
}

type Step = Result<Applied, NoOpReason>;

fn node<'p>(page: &'p Page, id: &str) -> Result<&'p Node, NoOpReason> {
    page.node(id)
        .map(|n| n.as_ref())
        .ok_or_else(|| NoOpReason::NodeNotFound(id.to_string()))
}

fn parent<'p>(page: &'p Page, id: &str) -> Result<&'p Node, NoOpReason> {
    page.node(id)
        .map(|n| n.as_ref())
        .ok_or_else(|| NoOpReason::ParentNotFound(id.to_string()))
}

fn container<'p>(page: &'p Page, id: &str) -> Result<&'p Node, NoOpReason> {
    let n = parent(page, id)?;
    if !n.is_container() {
        return Err(NoOpReason::NotAContainer(id.to_string()));
    }
    Ok(n)
}

/// Existing, non-root node with a parent
fn detachable<'p>(page: &'p Page, id: &str) -> Result<(&'p Node, NodeId), NoOpReason> {
    let n = node(page, id)?;
    if page.is_zone_root(id) {
        return Err(NoOpReason::ZoneRoot(id.to_string()));
    }
    let parent_id = ParentIndex::build(page)
        .parent_of(id)
        .map(str::to_string)
        .ok_or_else(|| NoOpReason::Orphan(id.to_string()))?;
    Ok((n, parent_id))
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Insert { .. } => "insert",
            Mutation::Move { .. } => "move",
            Mutation::Reorder { .. } => "reorder",
            Mutation::Remove { .. } => "remove",
            Mutation::Duplicate { .. } => "duplicate",
            Mutation::PatchProps { .. } => "patchProps",
            Mutation::ToggleVisibility { .. } => "toggleVisibility",
            Mutation::ClearOverride { .. } => "clearOverride",
        }
    }

    /// The node (or container) the mutation is aimed at
    pub fn target_id(&self) -> &str {
        match self {
            Mutation::Insert { parent_id, .. } | Mutation::Reorder { parent_id, .. } => parent_id,
            Mutation::Move { node_id, .. }
            | Mutation::Remove { node_id }
            | Mutation::Duplicate { node_id }
            | Mutation::PatchProps { node_id, .. }
            | Mutation::ToggleVisibility { node_id, .. }
            | Mutation::ClearOverride { node_id, .. } => node_id,
        }
    }

    /// Apply to `page`, producing a new page or the reason nothing changed
    pub fn apply(&self, page: &Page, ids: &mut IdGenerator) -> MutationOutcome {
        let step = self.validate(page).and_then(|()| self.apply_unchecked(page, ids));

        match step {
            Ok(applied) => {
                debug!(
                    op = self.name(),
                    target = self.target_id(),
                    created = ?applied.created,
                    removed = applied.removed.len(),
                    "mutation applied"
                );
                MutationOutcome::Applied(applied)
            }
            Err(reason) => {
                debug!(op = self.name(), target = self.target_id(), %reason, "mutation is a no-op");
                MutationOutcome::Unchanged(reason)
            }
        }
    }

    fn apply_unchecked(&self, page: &Page, ids: &mut IdGenerator) -> Step {
        match self {
            Mutation::Insert {
                parent_id,
                index,
                node_type,
            } => Self::apply_insert(page, ids, parent_id, *index, *node_type),

            Mutation::Move {
                node_id,
                from_parent_id,
                to_parent_id,
                to_index,
            } => Self::apply_move(page, node_id, from_parent_id, to_parent_id, *to_index),

            Mutation::Reorder {
                parent_id,
                from_index,
                to_index,
            } => Self::apply_reorder(page, parent_id, *from_index, *to_index),

            Mutation::Remove { node_id } => Self::apply_remove(page, node_id),

            Mutation::Duplicate { node_id } => Self::apply_duplicate(page, ids, node_id),

            Mutation::PatchProps {
                node_id,
                patch,
                scope,
                breakpoint,
            } => Self::apply_patch_props(page, node_id, patch, *scope, *breakpoint),

            Mutation::ToggleVisibility {
                node_id,
                breakpoint,
                scope,
            } => Self::apply_toggle_visibility(page, node_id, *breakpoint, *scope),

            Mutation::ClearOverride {
                node_id,
                breakpoint,
            } => Self::apply_clear_override(page, node_id, *breakpoint),
        }
    }

    /// Check preconditions without applying
    pub fn validate(&self, page: &Page) -> Result<(), NoOpReason> {
        match self {
            Mutation::Insert { parent_id, .. } => {
                container(page, parent_id)?;
                Ok(())
            }

            Mutation::Move {
                node_id,
                from_parent_id,
                to_parent_id,
                ..
            } => {
                node(page, node_id)?;
                if page.is_zone_root(node_id) {
                    return Err(NoOpReason::ZoneRoot(node_id.clone()));
                }

                let from = parent(page, from_parent_id)?;
                if !from.children.contains(node_id) {
                    return Err(NoOpReason::NotAChild {
                        node_id: node_id.clone(),
                        parent_id: from_parent_id.clone(),
                    });
                }

                container(page, to_parent_id)?;
                if page.subtree(node_id).contains(to_parent_id) {
                    return Err(NoOpReason::Cycle {
                        node_id: node_id.clone(),
                        target_id: to_parent_id.clone(),
                    });
                }
                Ok(())
            }

            Mutation::Reorder {
                parent_id,
                from_index,
                to_index,
            } => {
                let len = parent(page, parent_id)?.children.len();
                for index in [*from_index, *to_index] {
                    if index >= len {
                        return Err(NoOpReason::IndexOutOfBounds { index, len });
                    }
                }
                if from_index == to_index {
                    return Err(NoOpReason::NoEffect);
                }
                Ok(())
            }

            Mutation::Remove { node_id } | Mutation::Duplicate { node_id } => {
                detachable(page, node_id)?;
                Ok(())
            }

            Mutation::PatchProps { node_id, patch, .. } => {
                node(page, node_id)?;
                if patch.is_empty() {
                    return Err(NoOpReason::EmptyPatch);
                }
                for (key, change) in patch.iter() {
                    if let Some(value) = change {
                        if !key.accepts(value) {
                            return Err(NoOpReason::InvalidValue(key.to_string()));
                        }
                    }
                }
                Ok(())
            }

            Mutation::ToggleVisibility { node_id, .. } => {
                node(page, node_id)?;
                Ok(())
            }

            Mutation::ClearOverride {
                node_id,
                breakpoint,
            } => {
                if node(page, node_id)?.props.override_for(*breakpoint).is_none() {
                    return Err(NoOpReason::NoOverride {
                        node_id: node_id.clone(),
                        breakpoint: *breakpoint,
                    });
                }
                Ok(())
            }
        }
    }

    fn apply_insert(
        page: &Page,
        ids: &mut IdGenerator,
        parent_id: &str,
        index: usize,
        node_type: NodeType,
    ) -> Step {
        let parent = container(page, parent_id)?;
        let id = ids.next_id(node_type, page);

        let mut children = parent.children.clone();
        let at = index.min(children.len());
        children.insert(at, id.clone());

        let mut next = page.clone();
        next.replace_node(parent.clone().with_children(children));
        next.replace_node(Node::new(id.clone(), node_type));

        Ok(Applied {
            page: next,
            created: Some(id),
            removed: Vec::new(),
        })
    }

    fn apply_move(
        page: &Page,
        node_id: &str,
        from_parent_id: &str,
        to_parent_id: &str,
        to_index: usize,
    ) -> Step {
        let from = parent(page, from_parent_id)?;
        let mut from_children = from.children.clone();
        let pos = from_children
            .iter()
            .position(|c| c == node_id)
            .ok_or_else(|| NoOpReason::NotAChild {
                node_id: node_id.to_string(),
                parent_id: from_parent_id.to_string(),
            })?;
        from_children.remove(pos);

        let mut next = page.clone();
        if from_parent_id == to_parent_id {
            let at = to_index.min(from_children.len());
            from_children.insert(at, node_id.to_string());
            if from_children == from.children {
                return Err(NoOpReason::NoEffect);
            }
            next.replace_node(from.clone().with_children(from_children));
        } else {
            let to = container(page, to_parent_id)?;
            let mut to_children = to.children.clone();
            let at = to_index.min(to_children.len());
            to_children.insert(at, node_id.to_string());

            next.replace_node(from.clone().with_children(from_children));
            next.replace_node(to.clone().with_children(to_children));
        }

        Ok(Applied::page(next))
    }

    fn apply_reorder(page: &Page, parent_id: &str, from_index: usize, to_index: usize) -> Step {
        let parent = parent(page, parent_id)?;
        let len = parent.children.len();
        if from_index >= len || to_index >= len {
            return Err(NoOpReason::IndexOutOfBounds {
                index: from_index.max(to_index),
                len,
            });
        }

        let mut children = parent.children.clone();
        let moved = children.remove(from_index);
        children.insert(to_index, moved);

        Ok(Applied::page(
            page.with_node(parent.clone().with_children(children)),
        ))
    }

    fn apply_remove(page: &Page, node_id: &str) -> Step {
        detachable(page, node_id)?;

        let removed = page.subtree(node_id);
        let doomed: HashSet<&str> = removed.iter().map(String::as_str).collect();

        let mut next = page.clone();
        for id in &removed {
            next.remove_node(id);
        }

        let scrubbed: Vec<Node> = next
            .nodes
            .values()
            .filter(|n| n.children.iter().any(|c| doomed.contains(c.as_str())))
            .map(|n| {
                let mut n = n.as_ref().clone();
                n.children.retain(|c| !doomed.contains(c.as_str()));
                n
            })
            .collect();
        for n in scrubbed {
            next.replace_node(n);
        }

        Ok(Applied {
            page: next,
            created: None,
            removed,
        })
    }

    fn apply_duplicate(page: &Page, ids: &mut IdGenerator, node_id: &str) -> Step {
        let (_, parent_id) = detachable(page, node_id)?;
        let subtree = page.subtree(node_id);

        // first pass: fresh ids, registered in `next` so later ids avoid them
        let mut next = page.clone();
        let mut renamed: HashMap<&str, NodeId> = HashMap::with_capacity(subtree.len());
        for old_id in &subtree {
            let old = node(page, old_id)?;
            let new_id = ids.next_id(old.node_type, &next);
            next.replace_node(Node {
                id: new_id.clone(),
                node_type: old.node_type,
                children: Vec::new(),
                props: old.props.clone(),
            });
            renamed.insert(old_id.as_str(), new_id);
        }

        // second pass: rewrite child lists through the rename map
        for old_id in &subtree {
            let old = node(page, old_id)?;
            if old.children.is_empty() {
                continue;
            }
            let Some(new_id) = renamed.get(old_id.as_str()) else {
                continue;
            };
            let children = old
                .children
                .iter()
                .filter_map(|c| renamed.get(c.as_str()).cloned())
                .collect();
            let clone = node(&next, new_id)?.clone().with_children(children);
            next.replace_node(clone);
        }

        let root_id = renamed
            .get(node_id)
            .cloned()
            .ok_or_else(|| NoOpReason::NodeNotFound(node_id.to_string()))?;

        let parent = parent(page, &parent_id)?;
        let mut siblings = parent.children.clone();
        let at = siblings
            .iter()
            .position(|c| c == node_id)
            .map_or(siblings.len(), |i| i + 1);
        siblings.insert(at, root_id.clone());
        next.replace_node(parent.clone().with_children(siblings));

        Ok(Applied {
            page: next,
            created: Some(root_id),
            removed: Vec::new(),
        })
    }

    fn apply_patch_props(
        page: &Page,
        node_id: &str,
        patch: &PropPatch,
        scope: PropsScope,
        breakpoint: Breakpoint,
    ) -> Step {
        let n = node(page, node_id)?;
        let props = match scope {
            PropsScope::Base => n.props.with_base_patch(patch),
            PropsScope::Override => n.props.with_override_patch(breakpoint, patch),
        };
        if props == n.props {
            return Err(NoOpReason::NoEffect);
        }

        Ok(Applied::page(page.with_node(n.clone().with_props(props))))
    }

    fn apply_toggle_visibility(
        page: &Page,
        node_id: &str,
        breakpoint: Breakpoint,
        scope: PropsScope,
    ) -> Step {
        node(page, node_id)?;
        let visible = PropsResolver::new(page).is_visible(node_id, breakpoint);

        let patch = if visible {
            PropPatch::new().set(PropKey::IsVisible, false)
        } else {
            PropPatch::new().unset(PropKey::IsVisible)
        };

        Self::apply_patch_props(page, node_id, &patch, scope, breakpoint)
    }

    fn apply_clear_override(page: &Page, node_id: &str, breakpoint: Breakpoint) -> Step {
        let n = node(page, node_id)?;
        let props = n
            .props
            .without_override(breakpoint)
            .ok_or_else(|| NoOpReason::NoOverride {
                node_id: node_id.to_string(),
                breakpoint,
            })?;

        Ok(Applied::page(page.with_node(n.clone().with_props(props))))
    }
}
