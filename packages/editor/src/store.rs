//! # Document Store
//!
//! Session state around one page: the current page version, the active
//! breakpoint and tool mode, selection and hover, the drag gesture and the
//! registered drop lists.
//!
//! Every field group has its own [`Topic`]. A topic publishes only when its
//! value actually changed, right after the change, so subscribers see each
//! page version exactly once and in order.
//!
//! ```rust,ignore
//! use trellis_editor::DocumentStore;
//! use trellis_schema::{home_page, NodeType};
//!
//! let mut store = DocumentStore::new(home_page()?);
//! let _sub = store.subscribe_schema(|snapshot| println!("v{}", snapshot.version));
//!
//! let result = store.insert("n_body_root", 0, NodeType::Block);
//! assert!(result.changed);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};
use trellis_schema::{
    Breakpoint, IdGenerator, NodeId, NodeType, Page, PropPatch, PropertyBag, PropsResolver,
    SchemaResult,
};

use crate::drag::{
    drop_list_id, node_id_from_drop_list, resolve_hover, translate_drop, DragHover, DragPayload,
    DragState, DropEvent, PALETTE_LIST_ID,
};
use crate::drop_target::DropTargetResolver;
use crate::errors::EditorResult;
use crate::geometry::{LayoutProbe, Point};
use crate::mutations::{Mutation, MutationOutcome, NoOpReason, PropsScope};
use crate::post_effects::{PostEffectEngine, SessionEffect};
use crate::preferences::{PreferenceStorage, Preferences, ToolMode};
use crate::topic::{Subscription, Topic};

/// One published page version
#[derive(Debug, Clone)]
pub struct SchemaSnapshot {
    pub version: u64,
    pub page: Arc<Page>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    pub breakpoint: Breakpoint,
    pub tool_mode: ToolMode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected: Option<NodeId>,
    pub hovered: Option<NodeId>,
}

/// What a mutation entry point did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub changed: bool,

    /// Page version after the call
    pub version: u64,

    /// Root of a node or subtree the call created
    pub created: Option<NodeId>,

    /// Set when nothing changed
    pub reason: Option<NoOpReason>,
}

impl ApplyResult {
    fn unchanged(version: u64, reason: NoOpReason) -> Self {
        Self {
            changed: false,
            version,
            created: None,
            reason: Some(reason),
        }
    }
}

pub struct DocumentStore {
    schema: SchemaSnapshot,
    ids: IdGenerator,
    view: ViewState,
    selection: SelectionState,
    drag: DragState,
    drop_lists: BTreeSet<String>,
    effects: PostEffectEngine,
    storage: Option<Box<dyn PreferenceStorage>>,

    schema_topic: Topic<SchemaSnapshot>,
    view_topic: Topic<ViewState>,
    selection_topic: Topic<SelectionState>,
    drag_topic: Topic<DragState>,
    drop_lists_topic: Topic<BTreeSet<String>>,
}

impl DocumentStore {
    /// Store with default preferences and nowhere to persist them
    pub fn new(page: Page) -> Self {
        Self::build(page, Preferences::default(), None)
    }

    /// Store whose breakpoint and tool mode come from, and go back to,
    /// `storage`
    pub fn with_storage(page: Page, storage: Box<dyn PreferenceStorage>) -> Self {
        let preferences = storage.load();
        Self::build(page, preferences, Some(storage))
    }

    pub fn from_json(source: &str) -> EditorResult<Self> {
        Ok(Self::new(Page::from_json(source)?))
    }

    fn build(
        page: Page,
        preferences: Preferences,
        storage: Option<Box<dyn PreferenceStorage>>,
    ) -> Self {
        log_load(&page, 1);
        Self {
            ids: IdGenerator::new(&page.page_id),
            schema: SchemaSnapshot {
                version: 1,
                page: Arc::new(page),
            },
            view: ViewState {
                breakpoint: preferences.device_mode,
                tool_mode: preferences.tool_mode,
            },
            selection: SelectionState::default(),
            drag: DragState::default(),
            drop_lists: BTreeSet::new(),
            effects: PostEffectEngine::new(),
            storage,
            schema_topic: Topic::new(),
            view_topic: Topic::new(),
            selection_topic: Topic::new(),
            drag_topic: Topic::new(),
            drop_lists_topic: Topic::new(),
        }
    }

    /// Replace the whole page, resetting session state tied to the old one
    pub fn load_page(&mut self, page: Page) {
        let version = self.schema.version + 1;
        log_load(&page, version);

        self.ids = IdGenerator::new(&page.page_id);
        self.schema = SchemaSnapshot {
            version,
            page: Arc::new(page),
        };
        self.schema_topic.publish(&self.schema);

        self.end_drag();
        self.set_selection(SelectionState::default());

        let page = Arc::clone(&self.schema.page);
        let kept: BTreeSet<String> = self
            .drop_lists
            .iter()
            .filter(|id| node_id_from_drop_list(id).is_some_and(|n| page.is_container(n)))
            .cloned()
            .collect();
        self.set_drop_lists(kept);
    }

    // ---- snapshots ----

    pub fn schema(&self) -> SchemaSnapshot {
        self.schema.clone()
    }

    pub fn page(&self) -> Arc<Page> {
        Arc::clone(&self.schema.page)
    }

    pub fn version(&self) -> u64 {
        self.schema.version
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn breakpoint(&self) -> Breakpoint {
        self.view.breakpoint
    }

    pub fn tool_mode(&self) -> ToolMode {
        self.view.tool_mode
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.clone()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.selected.as_deref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.selection.hovered.as_deref()
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn drop_lists(&self) -> &BTreeSet<String> {
        &self.drop_lists
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            device_mode: self.view.breakpoint,
            tool_mode: self.view.tool_mode,
        }
    }

    // ---- subscriptions ----

    pub fn subscribe_schema(&self, f: impl Fn(&SchemaSnapshot) + 'static) -> Subscription {
        self.schema_topic.subscribe(f)
    }

    pub fn subscribe_view(&self, f: impl Fn(&ViewState) + 'static) -> Subscription {
        self.view_topic.subscribe(f)
    }

    pub fn subscribe_selection(&self, f: impl Fn(&SelectionState) + 'static) -> Subscription {
        self.selection_topic.subscribe(f)
    }

    pub fn subscribe_drag(&self, f: impl Fn(&DragState) + 'static) -> Subscription {
        self.drag_topic.subscribe(f)
    }

    pub fn subscribe_drop_lists(&self, f: impl Fn(&BTreeSet<String>) + 'static) -> Subscription {
        self.drop_lists_topic.subscribe(f)
    }

    // ---- derived reads ----

    pub fn resolve_props(&self, node_id: &str, breakpoint: Breakpoint) -> SchemaResult<PropertyBag> {
        PropsResolver::new(&self.schema.page).resolve(node_id, breakpoint)
    }

    pub fn is_visible(&self, node_id: &str, breakpoint: Breakpoint) -> bool {
        PropsResolver::new(&self.schema.page).is_visible(node_id, breakpoint)
    }

    pub fn nearest_container(&self, candidate: &str) -> Option<NodeId> {
        DropTargetResolver::new(&self.schema.page, self.view.breakpoint).nearest_container(candidate)
    }

    // ---- mutations ----

    /// Run a mutation against the current page and publish the result.
    ///
    /// Selection follow-ups (focusing a created node) only happen in
    /// `select` mode, since `preview` has no selection to show.
    pub fn apply(&mut self, mutation: Mutation) -> ApplyResult {
        let outcome = mutation.apply(&self.schema.page, &mut self.ids);

        let applied = match outcome {
            MutationOutcome::Applied(applied) => applied,
            MutationOutcome::Unchanged(reason) => {
                return ApplyResult::unchanged(self.schema.version, reason);
            }
        };

        let effects = self.effects.analyze(&mutation, &applied);
        let created = applied.created.clone();

        self.schema = SchemaSnapshot {
            version: self.schema.version + 1,
            page: Arc::new(applied.page),
        };
        debug!(version = self.schema.version, op = mutation.name(), "schema replaced");
        self.schema_topic.publish(&self.schema);

        for effect in effects {
            self.run_effect(effect);
        }

        ApplyResult {
            changed: true,
            version: self.schema.version,
            created,
            reason: None,
        }
    }

    /// Insert a palette node. In `select` mode the new node becomes the
    /// selection; in `preview` the selection is left alone.
    pub fn insert(&mut self, parent_id: &str, index: usize, node_type: NodeType) -> ApplyResult {
        self.apply(Mutation::Insert {
            parent_id: parent_id.to_string(),
            index,
            node_type,
        })
    }

    pub fn move_node(
        &mut self,
        node_id: &str,
        from_parent_id: &str,
        to_parent_id: &str,
        to_index: usize,
    ) -> ApplyResult {
        self.apply(Mutation::Move {
            node_id: node_id.to_string(),
            from_parent_id: from_parent_id.to_string(),
            to_parent_id: to_parent_id.to_string(),
            to_index,
        })
    }

    pub fn reorder(&mut self, parent_id: &str, from_index: usize, to_index: usize) -> ApplyResult {
        self.apply(Mutation::Reorder {
            parent_id: parent_id.to_string(),
            from_index,
            to_index,
        })
    }

    pub fn remove(&mut self, node_id: &str) -> ApplyResult {
        self.apply(Mutation::Remove {
            node_id: node_id.to_string(),
        })
    }

    /// Clone a subtree after the original. The copy is selected only in
    /// `select` mode.
    pub fn duplicate(&mut self, node_id: &str) -> ApplyResult {
        self.apply(Mutation::Duplicate {
            node_id: node_id.to_string(),
        })
    }

    pub fn patch_props(
        &mut self,
        node_id: &str,
        patch: PropPatch,
        scope: PropsScope,
        breakpoint: Breakpoint,
    ) -> ApplyResult {
        self.apply(Mutation::PatchProps {
            node_id: node_id.to_string(),
            patch,
            scope,
            breakpoint,
        })
    }

    pub fn toggle_visibility(
        &mut self,
        node_id: &str,
        breakpoint: Breakpoint,
        scope: PropsScope,
    ) -> ApplyResult {
        self.apply(Mutation::ToggleVisibility {
            node_id: node_id.to_string(),
            breakpoint,
            scope,
        })
    }

    pub fn clear_override(&mut self, node_id: &str, breakpoint: Breakpoint) -> ApplyResult {
        self.apply(Mutation::ClearOverride {
            node_id: node_id.to_string(),
            breakpoint,
        })
    }

    fn run_effect(&mut self, effect: SessionEffect) {
        match effect {
            SessionEffect::Focus(id) => {
                if self.view.tool_mode == ToolMode::Select {
                    self.set_selection(SelectionState {
                        selected: Some(id.clone()),
                        hovered: Some(id),
                    });
                }
            }
            SessionEffect::Forget(ids) => {
                let gone = |slot: &Option<NodeId>| slot.as_ref().is_some_and(|id| ids.contains(id));
                let mut next = self.selection.clone();
                if gone(&next.selected) {
                    next.selected = None;
                }
                if gone(&next.hovered) {
                    next.hovered = None;
                }
                self.set_selection(next);

                let kept: BTreeSet<String> = self
                    .drop_lists
                    .iter()
                    .filter(|list| {
                        node_id_from_drop_list(list).map_or(true, |id| !ids.iter().any(|g| g == id))
                    })
                    .cloned()
                    .collect();
                self.set_drop_lists(kept);
            }
        }
    }

    // ---- view ----

    pub fn set_breakpoint(&mut self, breakpoint: Breakpoint) {
        self.set_view(ViewState {
            breakpoint,
            ..self.view
        });
    }

    /// Switch tool mode. Leaving `select` clears selection and hover and
    /// cancels any drag.
    pub fn set_tool_mode(&mut self, tool_mode: ToolMode) {
        if tool_mode == self.view.tool_mode {
            return;
        }
        info!(from = %self.view.tool_mode, to = %tool_mode, "tool mode changed");

        self.set_view(ViewState {
            tool_mode,
            ..self.view
        });

        if tool_mode != ToolMode::Select {
            self.set_selection(SelectionState::default());
            self.end_drag();
        }
    }

    pub fn toggle_tool_mode(&mut self) -> ToolMode {
        let next = self.view.tool_mode.toggled();
        self.set_tool_mode(next);
        next
    }

    fn set_view(&mut self, next: ViewState) {
        if next == self.view {
            return;
        }
        self.view = next;
        self.view_topic.publish(&self.view);
        self.persist_preferences();
    }

    fn persist_preferences(&mut self) {
        let preferences = self.preferences();
        let Some(storage) = self.storage.as_mut() else {
            return;
        };

        let written = preferences.to_blob().and_then(|blob| storage.write(&blob));
        if let Err(error) = written {
            warn!(%error, "could not persist preferences");
        }
    }

    // ---- selection ----

    /// Select a node (or clear with `None`). Ignored outside select mode
    /// and for unknown ids.
    pub fn select(&mut self, node_id: Option<&str>) -> bool {
        let Some(id) = self.editable_id(node_id) else {
            return false;
        };
        self.set_selection(SelectionState {
            selected: id,
            ..self.selection.clone()
        })
    }

    pub fn hover(&mut self, node_id: Option<&str>) -> bool {
        let Some(id) = self.editable_id(node_id) else {
            return false;
        };
        self.set_selection(SelectionState {
            hovered: id,
            ..self.selection.clone()
        })
    }

    fn editable_id(&self, node_id: Option<&str>) -> Option<Option<NodeId>> {
        match node_id {
            None => Some(None),
            Some(_) if self.view.tool_mode != ToolMode::Select => None,
            Some(id) if self.schema.page.contains(id) => Some(Some(id.to_string())),
            Some(_) => None,
        }
    }

    fn set_selection(&mut self, next: SelectionState) -> bool {
        if next == self.selection {
            return false;
        }
        self.selection = next;
        self.selection_topic.publish(&self.selection);
        true
    }

    // ---- drag ----

    /// Start a drag. Refused outside select mode and for a node payload
    /// naming a missing node.
    pub fn begin_drag(&mut self, payload: DragPayload) -> bool {
        if self.view.tool_mode != ToolMode::Select {
            debug!(?payload, "drag ignored outside select mode");
            return false;
        }
        if let DragPayload::Node { node_id, .. } = &payload {
            if !self.schema.page.contains(node_id) {
                return false;
            }
        }

        debug!(?payload, "drag started");
        self.drag.begin(payload);
        self.drag_topic.publish(&self.drag);
        true
    }

    /// Recompute the hover target for a pointer over `raw_hit`
    pub fn drag_over(
        &mut self,
        raw_hit: Option<&str>,
        pointer: Point,
        layout: &dyn LayoutProbe,
    ) -> Option<DragHover> {
        if !self.drag.is_dragging() {
            return None;
        }

        let resolver = DropTargetResolver::new(&self.schema.page, self.view.breakpoint);
        let hover = resolve_hover(&resolver, raw_hit, pointer, layout);
        if self.drag.update_hover(hover.clone()) {
            self.drag_topic.publish(&self.drag);
        }
        Some(hover)
    }

    /// Overwrite the hover target computed elsewhere
    pub fn set_drag_hover(&mut self, hover: DragHover) -> bool {
        let changed = self.drag.update_hover(hover);
        if changed {
            self.drag_topic.publish(&self.drag);
        }
        changed
    }

    /// Finish the drag with a drop. The drag state is back to idle
    /// afterwards whether or not a mutation ran.
    pub fn drop(&mut self, event: &DropEvent) -> ApplyResult {
        let Some((payload, hover)) = self.end_drag() else {
            return ApplyResult::unchanged(self.schema.version, NoOpReason::NotDragging);
        };

        let mutation = {
            let page = Arc::clone(&self.schema.page);
            let resolver = DropTargetResolver::new(&page, self.view.breakpoint);
            translate_drop(&page, &resolver, &payload, &hover, event)
        };

        match mutation {
            Some(mutation) => self.apply(mutation),
            None => {
                debug!(?payload, destination = %event.destination_list_id, "drop rejected");
                ApplyResult::unchanged(self.schema.version, NoOpReason::DropRejected)
            }
        }
    }

    /// Abandon the drag without mutating anything
    pub fn cancel_drag(&mut self) -> bool {
        self.end_drag().is_some()
    }

    fn end_drag(&mut self) -> Option<(DragPayload, DragHover)> {
        let ended = self.drag.end();
        if ended.is_some() {
            self.drag_topic.publish(&self.drag);
        }
        ended
    }

    // ---- drop lists ----

    /// Register the drop list of a rendered container
    pub fn register_drop_list(&mut self, node_id: &str) -> bool {
        if !self.schema.page.is_container(node_id) {
            return false;
        }
        let mut next = self.drop_lists.clone();
        next.insert(drop_list_id(node_id));
        self.set_drop_lists(next)
    }

    pub fn unregister_drop_list(&mut self, node_id: &str) -> bool {
        let mut next = self.drop_lists.clone();
        next.remove(&drop_list_id(node_id));
        self.set_drop_lists(next)
    }

    /// Drop lists an item dragged out of `node_id`'s list may enter
    pub fn connected_drop_lists(&self, node_id: &str) -> Vec<String> {
        let palette = PALETTE_LIST_ID.to_string();
        if self.view.tool_mode != ToolMode::Select || !self.schema.page.is_container(node_id) {
            return vec![palette];
        }

        let own = drop_list_id(node_id);
        let mut lists: Vec<String> = self
            .drop_lists
            .iter()
            .filter(|list| **list != own)
            .filter(|list| node_id_from_drop_list(list).is_some_and(|id| self.schema.page.is_container(id)))
            .cloned()
            .collect();
        lists.push(palette);
        lists
    }

    fn set_drop_lists(&mut self, next: BTreeSet<String>) -> bool {
        if next == self.drop_lists {
            return false;
        }
        self.drop_lists = next;
        self.drop_lists_topic.publish(&self.drop_lists);
        true
    }
}

fn log_load(page: &Page, version: u64) {
    let problems = page.validate();
    info!(
        page_id = %page.page_id,
        nodes = page.node_count(),
        version,
        problems = problems.len(),
        "page loaded"
    );
    for problem in &problems {
        warn!(page_id = %page.page_id, %problem, "schema problem");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;
    use trellis_schema::home_page;

    fn store() -> DocumentStore {
        let mut store = DocumentStore::new(home_page().unwrap());
        store.set_tool_mode(ToolMode::Select);
        store
    }

    #[test]
    fn test_schema_versions_are_gap_free() {
        let mut store = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = store.subscribe_schema(move |s| sink.borrow_mut().push(s.version));

        store.insert("n_body_root", 0, NodeType::Block);
        store.remove("n_body_root");
        store.reorder("n_featured_grid", 0, 1);

        assert_eq!(*seen.borrow(), vec![2, 3]);
        assert_eq!(store.version(), 3);
    }

    #[test]
    fn test_no_op_reports_reason() {
        let mut store = store();
        let result = store.remove("n_header_root");
        assert!(!result.changed);
        assert_eq!(result.reason, Some(NoOpReason::ZoneRoot("n_header_root".into())));
        assert_eq!(result.version, 1);
    }

    #[test]
    fn test_preview_mode_clears_selection() {
        let mut store = store();
        assert!(store.select(Some("n_logo")));
        assert!(store.hover(Some("n_nav")));

        store.toggle_tool_mode();
        assert_eq!(store.tool_mode(), ToolMode::Preview);
        assert_eq!(store.selection(), SelectionState::default());
        assert!(!store.select(Some("n_logo")));
    }

    #[test]
    fn test_created_node_is_selected_only_in_select_mode() {
        let mut store = DocumentStore::new(home_page().unwrap());
        assert_eq!(store.tool_mode(), ToolMode::Preview);

        let result = store.insert("n_body_root", 0, NodeType::Text);
        assert!(result.changed);
        assert_eq!(store.selected(), None);

        store.set_tool_mode(ToolMode::Select);
        let copy = store.duplicate("n_logo").created.unwrap();
        assert_eq!(store.selected(), Some(copy.as_str()));
        assert_eq!(store.hovered(), Some(copy.as_str()));
    }

    #[derive(Clone, Default)]
    struct LogCapture(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_load_logs_each_problem_once() {
        let source = trellis_schema::seed::HOME_PAGE_JSON
            .replace("\"id\": \"n_footer_text\"", "\"id\": \"n_ghost\"");
        let page = Page::from_json(&source).unwrap();
        let problems = page.validate();
        assert_eq!(problems.len(), 1);

        let capture = LogCapture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            DocumentStore::new(page);
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches(&problems[0].to_string()).count(), 1);
    }

    #[test]
    fn test_view_changes_are_persisted() {
        let storage = MemoryStorage::with_blob(r#"{"v":1,"deviceMode":"desktop","toolMode":"select"}"#);
        let mut store = DocumentStore::with_storage(home_page().unwrap(), Box::new(storage));
        assert_eq!(store.breakpoint(), Breakpoint::Desktop);
        assert_eq!(store.tool_mode(), ToolMode::Select);

        let views = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&views);
        let _sub = store.subscribe_view(move |_| *sink.borrow_mut() += 1);

        store.set_breakpoint(Breakpoint::Desktop);
        store.set_breakpoint(Breakpoint::Mobile);
        assert_eq!(*views.borrow(), 1);
        assert_eq!(
            store.preferences(),
            Preferences {
                device_mode: Breakpoint::Mobile,
                tool_mode: ToolMode::Select,
            }
        );
    }

    #[test]
    fn test_connected_drop_lists() {
        let mut store = store();
        assert!(store.register_drop_list("n_body_root"));
        assert!(store.register_drop_list("n_blog_list"));
        assert!(!store.register_drop_list("n_logo"));
        assert!(!store.register_drop_list("n_blog_list"));

        assert_eq!(
            store.connected_drop_lists("n_blog_list"),
            vec!["dl-n_body_root".to_string(), "palette".to_string()]
        );
        assert_eq!(store.connected_drop_lists("n_logo"), vec!["palette".to_string()]);

        store.set_tool_mode(ToolMode::Preview);
        assert_eq!(store.connected_drop_lists("n_blog_list"), vec!["palette".to_string()]);
    }

    #[test]
    fn test_remove_unregisters_deleted_lists() {
        let mut store = store();
        store.register_drop_list("n_hero");
        store.register_drop_list("n_hero_text");
        store.register_drop_list("n_blog_list");

        store.remove("n_hero");
        assert_eq!(
            store.drop_lists().iter().collect::<Vec<_>>(),
            vec!["dl-n_blog_list"]
        );
    }
}
