//! Debounced autosave.
//!
//! Document changes are collected by a background task and written once no
//! further change has arrived for the debounce period. [`Autosave::flush`]
//! writes the latest pending change immediately.

use std::time::Duration;

use emojiart_core::{
    ChangeEvent, CoreResult, Document, DocumentLibrary, EditorSession, SubscriptionId,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::{RuntimeError, RuntimeResult};

enum AutosaveMessage {
    Changed(Box<Document>),
    Flush(oneshot::Sender<CoreResult<()>>),
    Stop(oneshot::Sender<CoreResult<()>>),
}

/// Handle to a running autosave task.
#[derive(Debug)]
pub struct Autosave {
    tx: mpsc::UnboundedSender<AutosaveMessage>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for AutosaveMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Changed(doc) => write!(f, "Changed({} items)", doc.len()),
            Self::Flush(_) => f.write_str("Flush"),
            Self::Stop(_) => f.write_str("Stop"),
        }
    }
}

impl Autosave {
    /// Start autosaving into `library` under `name`. Must be called within a
    /// Tokio runtime.
    #[must_use]
    pub fn spawn(library: DocumentLibrary, name: impl Into<String>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(library, name.into(), debounce, rx));
        Self { tx, task }
    }

    /// Feed every document change of `session` into this autosave.
    pub fn attach(&self, session: &mut EditorSession) -> SubscriptionId {
        let tx = self.tx.clone();
        session.subscribe(move |event, document| {
            if event == ChangeEvent::Document {
                // A closed channel means autosave was shut down.
                let _ = tx.send(AutosaveMessage::Changed(Box::new(document.clone())));
            }
        })
    }

    /// Queue a document to be saved after the debounce period.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::AutosaveStopped`] if the task has exited.
    pub fn changed(&self, document: &Document) -> RuntimeResult<()> {
        self.tx
            .send(AutosaveMessage::Changed(Box::new(document.clone())))
            .map_err(|_| RuntimeError::AutosaveStopped)
    }

    /// Write any pending change now.
    ///
    /// # Errors
    ///
    /// Returns the save error, or [`RuntimeError::AutosaveStopped`] if the
    /// task has exited.
    pub async fn flush(&self) -> RuntimeResult<()> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(AutosaveMessage::Flush(reply))
            .map_err(|_| RuntimeError::AutosaveStopped)?;
        done.await.map_err(|_| RuntimeError::AutosaveStopped)??;
        Ok(())
    }

    /// Write any pending change and stop the task.
    ///
    /// Sessions this autosave is attached to may outlive it; their later
    /// changes are dropped.
    ///
    /// # Errors
    ///
    /// Returns the error of the final save, or
    /// [`RuntimeError::AutosaveStopped`] if the task had already exited.
    pub async fn shutdown(self) -> RuntimeResult<()> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(AutosaveMessage::Stop(reply))
            .map_err(|_| RuntimeError::AutosaveStopped)?;
        let result = done.await.map_err(|_| RuntimeError::AutosaveStopped);
        if let Err(e) = self.task.await {
            tracing::warn!("autosave task ended abnormally: {e}");
        }
        result??;
        Ok(())
    }
}

async fn run(
    library: DocumentLibrary,
    name: String,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<AutosaveMessage>,
) {
    let mut pending: Option<Box<Document>> = None;
    loop {
        let message = if pending.is_some() {
            tokio::select! {
                message = rx.recv() => message,
                () = tokio::time::sleep(debounce) => {
                    write(&library, &name, pending.take());
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match message {
            Some(AutosaveMessage::Changed(document)) => pending = Some(document),
            Some(AutosaveMessage::Flush(reply)) => {
                let _ = reply.send(save_now(&library, &name, pending.take()));
            }
            Some(AutosaveMessage::Stop(reply)) => {
                let _ = reply.send(save_now(&library, &name, pending.take()));
                break;
            }
            None => {
                write(&library, &name, pending.take());
                break;
            }
        }
    }
    tracing::debug!(%name, "autosave stopped");
}

fn save_now(library: &DocumentLibrary, name: &str, document: Option<Box<Document>>) -> CoreResult<()> {
    document.map_or(Ok(()), |doc| library.save(name, &doc).map(|_| ()))
}

fn write(library: &DocumentLibrary, name: &str, document: Option<Box<Document>>) {
    let Some(document) = document else {
        return;
    };
    if let Err(e) = library.save(name, &document) {
        tracing::warn!("Failed to autosave {name}: {e}");
    }
}
