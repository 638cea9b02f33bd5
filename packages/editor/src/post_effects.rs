//! # Post-Effect System
//!
//! Applied mutations trigger follow-up changes to the session state around
//! the page: selection and hover.
//!
//! ## Design
//!
//! An effect looks at the mutation and its [`Applied`] result and returns
//! [`SessionEffect`]s for the store to carry out. For example:
//! - Inserting or duplicating a node focuses the new node
//! - Moving a node into another container focuses it
//! - Removing a subtree forgets selection and hover inside it
//!
//! Effects are deterministic. They never touch the page itself.

use std::fmt;

use trellis_schema::NodeId;

use crate::mutations::{Applied, Mutation};

/// A change to session state requested after a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    /// Select and hover this node
    Focus(NodeId),

    /// Clear selection and hover if they point at any of these ids
    Forget(Vec<NodeId>),
}

/// Post-effect that can be triggered by an applied mutation
pub trait PostEffect: fmt::Debug {
    fn analyze(&self, mutation: &Mutation, applied: &Applied) -> Vec<SessionEffect>;
}

/// Focus the node an insert or duplicate just created
#[derive(Debug)]
pub struct FocusCreatedNode;

impl PostEffect for FocusCreatedNode {
    fn analyze(&self, mutation: &Mutation, applied: &Applied) -> Vec<SessionEffect> {
        match (mutation, &applied.created) {
            (Mutation::Insert { .. } | Mutation::Duplicate { .. }, Some(id)) => {
                vec![SessionEffect::Focus(id.clone())]
            }
            _ => vec![],
        }
    }
}

/// Focus a node that landed in a different container
#[derive(Debug)]
pub struct FocusReparentedNode;

impl PostEffect for FocusReparentedNode {
    fn analyze(&self, mutation: &Mutation, _applied: &Applied) -> Vec<SessionEffect> {
        match mutation {
            Mutation::Move {
                node_id,
                from_parent_id,
                to_parent_id,
                ..
            } if from_parent_id != to_parent_id => vec![SessionEffect::Focus(node_id.clone())],
            _ => vec![],
        }
    }
}

/// Drop selection and hover that point into a deleted subtree
#[derive(Debug)]
pub struct ForgetRemovedNodes;

impl PostEffect for ForgetRemovedNodes {
    fn analyze(&self, _mutation: &Mutation, applied: &Applied) -> Vec<SessionEffect> {
        if applied.removed.is_empty() {
            return vec![];
        }
        vec![SessionEffect::Forget(applied.removed.clone())]
    }
}

/// Post-effect engine that runs all registered effects
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![
                Box::new(FocusCreatedNode),
                Box::new(FocusReparentedNode),
                Box::new(ForgetRemovedNodes),
            ],
        }
    }

    /// Analyze an applied mutation and collect every session effect
    pub fn analyze(&self, mutation: &Mutation, applied: &Applied) -> Vec<SessionEffect> {
        self.effects
            .iter()
            .flat_map(|effect| effect.analyze(mutation, applied))
            .collect()
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::MutationOutcome;
    use trellis_schema::{home_page, IdGenerator, NodeType};

    fn applied(mutation: &Mutation) -> Applied {
        let page = home_page().unwrap();
        let mut ids = IdGenerator::new(&page.page_id);
        match mutation.apply(&page, &mut ids) {
            MutationOutcome::Applied(applied) => applied,
            MutationOutcome::Unchanged(reason) => panic!("unexpected no-op: {reason}"),
        }
    }

    #[test]
    fn test_post_effect_engine_creation() {
        let engine = PostEffectEngine::new();
        assert_eq!(engine.effects.len(), 3);
    }

    #[test]
    fn test_insert_focuses_new_node() {
        let mutation = Mutation::Insert {
            parent_id: "n_body_root".to_string(),
            index: 0,
            node_type: NodeType::Text,
        };
        let applied = applied(&mutation);
        let created = applied.created.clone().unwrap();

        let effects = PostEffectEngine::new().analyze(&mutation, &applied);
        assert_eq!(effects, vec![SessionEffect::Focus(created)]);
    }

    #[test]
    fn test_reorder_has_no_effects() {
        let mutation = Mutation::Reorder {
            parent_id: "n_featured_grid".to_string(),
            from_index: 0,
            to_index: 3,
        };
        let effects = PostEffectEngine::new().analyze(&mutation, &applied(&mutation));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_remove_forgets_subtree() {
        let mutation = Mutation::Remove {
            node_id: "n_hero".to_string(),
        };
        let effects = PostEffectEngine::new().analyze(&mutation, &applied(&mutation));

        let [SessionEffect::Forget(ids)] = effects.as_slice() else {
            panic!("expected a single forget effect, got {effects:?}");
        };
        assert_eq!(ids.len(), 5);
        assert_eq!(ids[0], "n_hero");
    }
}
