//! Async driver for an [`EditorSession`].
//!
//! Every session mutation goes through [`Editor::update`]. Afterwards the
//! editor checks whether the session queued a background fetch and, if so,
//! spawns it, aborting the one already in flight. Completed fetches are sent
//! back over a channel and applied on the caller's task, where the session's
//! staleness check decides whether they still count.

use std::path::PathBuf;
use std::sync::Arc;

use emojiart_core::{BackgroundImage, DocumentLibrary, EditorSession, FetchTicket, InputEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::RuntimeResult;
use crate::loader::{load_background, ImageLoader};

/// Result of one background fetch.
#[derive(Debug)]
pub struct FetchCompletion {
    ticket: FetchTicket,
    image: Option<BackgroundImage>,
}

/// An editing session plus the tasks fetching its background.
pub struct Editor<L> {
    session: EditorSession,
    loader: Arc<L>,
    completions_tx: mpsc::UnboundedSender<FetchCompletion>,
    completions_rx: mpsc::UnboundedReceiver<FetchCompletion>,
    in_flight: Option<JoinHandle<()>>,
}

impl<L> std::fmt::Debug for Editor<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("session", &self.session)
            .field("in_flight", &self.in_flight.is_some())
            .finish_non_exhaustive()
    }
}

impl<L: ImageLoader + 'static> Editor<L> {
    /// Wrap a session. Must be called within a Tokio runtime; a fetch the
    /// session already queued starts immediately.
    pub fn new(session: EditorSession, loader: L) -> Self {
        Self::with_shared_loader(session, Arc::new(loader))
    }

    /// Wrap a session with a loader shared between editors.
    pub fn with_shared_loader(session: EditorSession, loader: Arc<L>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let mut editor = Self {
            session,
            loader,
            completions_tx,
            completions_rx,
            in_flight: None,
        };
        editor.dispatch_fetch();
        editor
    }

    /// The wrapped session.
    #[must_use]
    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Mutate the session, then start any fetch it queued.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut EditorSession) -> R) -> R {
        let result = f(&mut self.session);
        self.dispatch_fetch();
        result
    }

    /// Dispatch an input event to the session.
    pub fn handle_event(&mut self, event: &InputEvent) {
        self.update(|session| session.handle_event(event));
    }

    fn dispatch_fetch(&mut self) {
        let Some(ticket) = self.session.take_fetch_request() else {
            return;
        };
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                tracing::debug!("superseding in-flight background fetch");
            }
            handle.abort();
        }
        let loader = Arc::clone(&self.loader);
        let tx = self.completions_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let image = load_background(loader.as_ref(), ticket.background()).await;
            // The editor may have been dropped; nothing is waiting then.
            let _ = tx.send(FetchCompletion { ticket, image });
        }));
    }

    fn apply(&mut self, completion: FetchCompletion) -> bool {
        self.session
            .complete_fetch(&completion.ticket, completion.image)
    }

    /// Apply completions that have already arrived. Returns how many were
    /// accepted.
    pub fn drain_completions(&mut self) -> usize {
        let mut accepted = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            if self.apply(completion) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Wait for the next completion and apply it. Returns whether it was
    /// accepted.
    pub async fn next_completion(&mut self) -> Option<bool> {
        let completion = self.completions_rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Wait until no background fetch is outstanding.
    pub async fn settle(&mut self) {
        while self.session.fetch_status().is_fetching() {
            if self.next_completion().await.is_none() {
                break;
            }
        }
    }

    /// Save the document now.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, library: &DocumentLibrary, name: &str) -> RuntimeResult<PathBuf> {
        Ok(library.save(name, self.session.document())?)
    }
}

impl<L> Drop for Editor<L> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
