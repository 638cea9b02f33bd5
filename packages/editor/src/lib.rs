//! # Trellis Editor
//!
//! Editing engine for Trellis pages.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: Page, nodes, props, resolution      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: mutations + session                 │
//! │  - Pure tree mutations (old page in,        │
//! │    new page out)                            │
//! │  - Drop target resolution and drag state    │
//! │  - DocumentStore: versions, view, selection │
//! │  - Preferences persistence                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer (host): subscribes to the store    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Pages are values**: a mutation never touches its input page
//! 2. **Refusal is not failure**: an illegal edit reports a reason and
//!    leaves the version alone
//! 3. **Structural sharing**: untouched nodes are shared between versions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trellis_editor::{DocumentStore, Mutation};
//! use trellis_schema::{home_page, NodeType};
//!
//! let mut store = DocumentStore::new(home_page()?);
//!
//! let result = store.apply(Mutation::Insert {
//!     parent_id: "n_body_root".to_string(),
//!     index: 0,
//!     node_type: NodeType::Text,
//! });
//! assert_eq!(result.version, 2);
//! ```

pub mod drag;
pub mod drop_target;
mod errors;
pub mod geometry;
mod mutations;
mod post_effects;
pub mod preferences;
mod store;
mod topic;

pub use drag::{DragHover, DragPayload, DragState, DropEvent};
pub use drop_target::{DropTargetResolver, Orientation};
pub use errors::{EditorError, EditorResult};
pub use geometry::{LayoutProbe, Point, Rect, StaticLayout};
pub use mutations::{Applied, Mutation, MutationOutcome, NoOpReason, PropsScope};
pub use post_effects::{PostEffect, PostEffectEngine, SessionEffect};
pub use preferences::{FileStorage, MemoryStorage, PreferenceStorage, Preferences, ToolMode};
pub use store::{ApplyResult, DocumentStore, SchemaSnapshot, SelectionState, ViewState};
pub use topic::{Subscription, Topic};
