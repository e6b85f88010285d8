//! Editing session: one document plus everything that lives only while it
//! is being edited.
//!
//! The session is the single owner of the document, selection, gesture
//! state, undo history and fetch bookkeeping. All of them are mutated
//! through `&mut self`, so each operation is atomic with respect to every
//! other. Background image fetches are the one asynchronous step: the
//! session hands out a [`FetchTicket`] via [`EditorSession::take_fetch_request`]
//! and accepts the result through [`EditorSession::complete_fetch`].

use std::fmt;

use crate::config::EditorConfig;
use crate::document::{round_to_i32, Background, Document, Intent, IntentOutcome};
use crate::drop_target::{resolve_drop, DropAction, DropOffer};
use crate::event::{Gesture, InputEvent};
use crate::fetch::{BackgroundImage, FetchStatus, FetchTicket, FetchTracker};
use crate::gesture::{GestureOutcome, GestureReconciler};
use crate::item::{clamp_item_size, ItemId, MIN_ITEM_SIZE};
use crate::selection::Selection;
use crate::transform::{Point, Size, Vector, ViewTransform};
use crate::undo::UndoStack;

/// What part of the session changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    /// Background or items changed.
    Document,
    /// Selection membership changed.
    Selection,
    /// View transform or viewport changed.
    Transform,
    /// Live offset or scale of the selected items changed.
    LivePreview,
    /// Decoded background image replaced or cleared.
    BackgroundImage,
    /// Fetch status changed.
    FetchStatus,
}

/// Handle returned by [`EditorSession::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback type for session change notifications.
pub type Observer = Box<dyn Fn(ChangeEvent, &Document) + Send + Sync>;

/// An open document and its editing state.
pub struct EditorSession {
    document: Document,
    selection: Selection,
    gestures: GestureReconciler,
    undo: UndoStack,
    fetch: FetchTracker,
    pending_fetch: Option<FetchTicket>,
    config: EditorConfig,
    /// Bumped on every document change.
    revision: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("items", &self.document.len())
            .field("selected", &self.selection.len())
            .field("transform", &self.gestures.transform())
            .field("fetch", self.fetch.status())
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Create a session for an empty document.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self::with_config(viewport, EditorConfig::default())
    }

    /// Create a session for an empty document with explicit configuration.
    #[must_use]
    pub fn with_config(viewport: Size, config: EditorConfig) -> Self {
        Self {
            document: Document::new(),
            selection: Selection::new(),
            gestures: GestureReconciler::new(viewport),
            undo: UndoStack::new(config.undo_depth),
            fetch: FetchTracker::new(),
            pending_fetch: None,
            config,
            revision: 0,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Open an existing document.
    ///
    /// A fetch is queued for the document's background.
    #[must_use]
    pub fn open(document: Document, viewport: Size, config: EditorConfig) -> Self {
        let mut session = Self::with_config(viewport, config);
        session.pending_fetch = session.fetch.begin(document.background());
        session.document = document;
        tracing::info!(
            items = session.document.len(),
            fetch = session.pending_fetch.is_some(),
            "document opened"
        );
        session
    }

    /// Replace the open document, as when loading another file.
    ///
    /// Selection, view transform and undo history are reset.
    pub fn replace_document(&mut self, document: Document) {
        let background_changed = document.background() != self.document.background();
        self.document = document;
        self.selection.clear();
        self.gestures.reset();
        self.undo.clear();
        self.revision += 1;
        if background_changed || self.fetch.image().is_none() {
            self.begin_fetch();
        }
        self.notify(ChangeEvent::Document);
        self.notify(ChangeEvent::Selection);
        self.notify(ChangeEvent::Transform);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The document being edited.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Currently selected items.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Gesture state, including the view transform.
    #[must_use]
    pub fn gestures(&self) -> &GestureReconciler {
        &self.gestures
    }

    /// Effective view transform.
    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.gestures.transform()
    }

    /// Document revision; increases on every document change.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Background fetch status.
    #[must_use]
    pub fn fetch_status(&self) -> &FetchStatus {
        self.fetch.status()
    }

    /// Decoded background image, once fetched.
    #[must_use]
    pub fn background_image(&self) -> Option<&BackgroundImage> {
        self.fetch.image()
    }

    /// Whether there is anything to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Whether there is anything to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// Name of the action undo would revert.
    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        self.undo.undo_description()
    }

    /// Name of the action redo would re-apply.
    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.undo.redo_description()
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Register a change observer.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(ChangeEvent, &Document) + Send + Sync + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn notify(&self, event: ChangeEvent) {
        for (_, observer) in &self.observers {
            observer(event, &self.document);
        }
    }

    // -----------------------------------------------------------------------
    // Document intents
    // -----------------------------------------------------------------------

    /// Apply intents as one undoable action named `description`.
    ///
    /// Nothing is recorded if no intent changed the document. Items removed
    /// by the action leave the selection in the same step, and a changed
    /// background queues a new fetch.
    pub fn perform(&mut self, description: &str, intents: &[Intent]) -> Vec<IntentOutcome> {
        let previous_background = self.document.background().clone();
        let mut outcomes = Vec::with_capacity(intents.len());
        let changed = self.undo.perform(description, &mut self.document, |doc| {
            outcomes.extend(intents.iter().map(|intent| doc.apply(intent)));
            outcomes.iter().any(|o| o.is_change())
        });
        if changed {
            tracing::debug!(description, intents = intents.len(), "document changed");
            self.document_changed(&previous_background);
        }
        outcomes
    }

    fn perform_one(&mut self, intent: Intent) -> IntentOutcome {
        let description = intent.description();
        self.perform(&description, std::slice::from_ref(&intent))
            .pop()
            .unwrap_or(IntentOutcome::Unchanged)
    }

    fn document_changed(&mut self, previous_background: &Background) {
        self.revision += 1;
        let pruned = self.selection.retain_existing(&self.document);
        self.notify(ChangeEvent::Document);
        if pruned > 0 {
            self.notify(ChangeEvent::Selection);
        }
        if self.document.background() != previous_background {
            self.begin_fetch();
        }
    }

    fn begin_fetch(&mut self) {
        self.pending_fetch = self.fetch.begin(self.document.background());
        self.notify(ChangeEvent::BackgroundImage);
        self.notify(ChangeEvent::FetchStatus);
    }

    /// Replace the background. Returns whether it changed.
    pub fn set_background(&mut self, background: Background) -> bool {
        self.perform_one(Intent::SetBackground(background)).is_change()
    }

    /// Place an emoji at a document position.
    pub fn add_item(&mut self, text: &str, at: (i32, i32), size: i32) -> Option<ItemId> {
        let outcome = self.perform_one(Intent::AddItem {
            text: text.to_string(),
            at,
            size,
        });
        match outcome {
            IntentOutcome::Added(id) => Some(id),
            _ => None,
        }
    }

    /// Place an emoji dropped at a view point.
    ///
    /// The size is the configured default divided by the current zoom, so
    /// the emoji appears at its default size on screen.
    pub fn add_emoji_at_view(&mut self, text: &str, at: Point) -> Option<ItemId> {
        let transform = self.transform();
        let p = self.gestures.to_document(at);
        let size = clamp_item_size(self.config.default_emoji_size / transform.zoom_scale)
            .unwrap_or(MIN_ITEM_SIZE);
        self.add_item(text, (round_to_i32(p.x), round_to_i32(p.y)), size)
    }

    /// Move an item by a document-space displacement.
    pub fn move_item(&mut self, id: ItemId, by: Vector) -> bool {
        self.perform_one(Intent::MoveItem { id, by }).is_change()
    }

    /// Scale an item's size.
    pub fn scale_item(&mut self, id: ItemId, by: f64) -> bool {
        self.perform_one(Intent::ScaleItem { id, by }).is_change()
    }

    /// Delete an item, dropping it from the selection.
    pub fn delete_item(&mut self, id: ItemId) -> bool {
        self.perform_one(Intent::DeleteItem { id }).is_change()
    }

    /// Delete every selected item as one action. Returns how many were
    /// deleted.
    pub fn delete_selection(&mut self) -> usize {
        let intents: Vec<_> = self
            .selection
            .sorted()
            .into_iter()
            .map(|id| Intent::DeleteItem { id })
            .collect();
        if intents.is_empty() {
            return 0;
        }
        self.perform("Delete", &intents)
            .into_iter()
            .filter(|o| o.is_change())
            .count()
    }

    // -----------------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------------

    /// Revert the last action. Returns its description.
    pub fn undo(&mut self) -> Option<String> {
        let previous_background = self.document.background().clone();
        let description = self.undo.undo(&mut self.document)?;
        tracing::debug!(%description, "undo");
        self.document_changed(&previous_background);
        Some(description)
    }

    /// Re-apply the last undone action. Returns its description.
    pub fn redo(&mut self) -> Option<String> {
        let previous_background = self.document.background().clone();
        let description = self.undo.redo(&mut self.document)?;
        tracing::debug!(%description, "redo");
        self.document_changed(&previous_background);
        Some(description)
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Route a gesture through the reconciler and apply what it produced.
    pub fn handle_gesture(&mut self, gesture: &Gesture) -> GestureOutcome {
        let background_size = self.fetch.image().map(BackgroundImage::size);
        let outcome = self.gestures.handle(
            gesture,
            &mut self.selection,
            &self.document,
            background_size,
        );
        if outcome.selection_changed {
            self.notify(ChangeEvent::Selection);
        }
        if outcome.transform_changed {
            self.notify(ChangeEvent::Transform);
        }
        if outcome.preview_changed {
            self.notify(ChangeEvent::LivePreview);
        }
        if let Some(description) = &outcome.description {
            self.perform(description, &outcome.intents);
        }
        outcome
    }

    /// Apply a drop at a view point. Returns what the drop resolved to.
    pub fn drop_offers(&mut self, offers: &[DropOffer], at: Point) -> Option<DropAction> {
        let action = resolve_drop(offers)?;
        match &action {
            DropAction::SetBackground(background) => {
                self.set_background(background.clone());
            }
            DropAction::AddEmoji { text } => {
                self.add_emoji_at_view(text, at);
            }
        }
        Some(action)
    }

    /// Set the viewport size.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.gestures.set_viewport(viewport);
        self.notify(ChangeEvent::Transform);
    }

    /// Dispatch any input event.
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Gesture(gesture) => {
                self.handle_gesture(gesture);
            }
            InputEvent::Drop { x, y, offers } => {
                if self.drop_offers(offers, Point::new(*x, *y)).is_none() {
                    tracing::debug!("drop had nothing usable");
                }
            }
            InputEvent::DeleteSelection => {
                self.delete_selection();
            }
            InputEvent::Undo => {
                self.undo();
            }
            InputEvent::Redo => {
                self.redo();
            }
            InputEvent::Resize { width, height } => {
                self.set_viewport(Size::new(*width, *height));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Background fetch
    // -----------------------------------------------------------------------

    /// Take the queued fetch, if any. Each ticket is handed out once.
    pub fn take_fetch_request(&mut self) -> Option<FetchTicket> {
        self.pending_fetch.take()
    }

    /// Deliver a fetch result. Returns `false` if it was stale and ignored.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, image: Option<BackgroundImage>) -> bool {
        let applied = self
            .fetch
            .complete(ticket, self.document.background(), image);
        if applied {
            self.notify(ChangeEvent::BackgroundImage);
            self.notify(ChangeEvent::FetchStatus);
        }
        applied
    }

    // -----------------------------------------------------------------------
    // Hit testing and live preview
    // -----------------------------------------------------------------------

    /// Topmost item under a view point.
    #[must_use]
    pub fn item_at_view_point(&self, at: Point) -> Option<ItemId> {
        self.document.item_at(self.gestures.to_document(at))
    }

    /// Where an item is drawn in view space, including any live drag.
    #[must_use]
    pub fn item_view_position(&self, id: ItemId) -> Option<Point> {
        let item = self.document.item(id)?;
        let mut position = item.position();
        if self.selection.contains(id) {
            position = position + self.gestures.live_selection_offset();
        }
        Some(self.gestures.to_view(position))
    }

    /// On-screen size of an item, including zoom and any live pinch.
    #[must_use]
    pub fn item_view_size(&self, id: ItemId) -> Option<f64> {
        let item = self.document.item(id)?;
        let mut size = f64::from(item.size) * self.transform().zoom_scale;
        if self.selection.contains(id) {
            size *= self.gestures.live_selection_scale();
        }
        Some(size)
    }
}
