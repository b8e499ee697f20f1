use std::sync::mpsc;

use crate::io::transport::CommentTransport;
use crate::model::comment::{Comment, CommentId};
use crate::model::forest::{Forest, ThreadError};
use crate::ops::{build, thread_ops};

/// A server-confirmed result, sent back to the forest owner.
#[derive(Debug, Clone)]
pub enum Completion {
    /// A full fetch finished; the thread is rebuilt from it
    Loaded(Vec<Comment>),
    Created(Comment),
    Updated(Comment),
    Deleted(CommentId),
}

/// Handed to background tasks so they can report completions.
pub type CompletionSender = mpsc::Sender<Completion>;

/// Error type for transport-first session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("request failed: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    Thread(#[from] ThreadError),
}

/// Sole owner of one card's comment thread.
///
/// The forest is never shared. Work done elsewhere comes back as
/// [`Completion`]s over a channel and is applied, in arrival order, only
/// when the owner calls [`ThreadSession::poll`].
pub struct ThreadSession {
    card_id: i64,
    forest: Forest,
    tx: CompletionSender,
    rx: mpsc::Receiver<Completion>,
}

impl ThreadSession {
    pub fn new(card_id: i64) -> Self {
        let (tx, rx) = mpsc::channel();
        ThreadSession {
            card_id,
            forest: Forest::new(),
            tx,
            rx,
        }
    }

    pub fn card_id(&self) -> i64 {
        self.card_id
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn sender(&self) -> CompletionSender {
        self.tx.clone()
    }

    /// Apply one completion to the forest. A failed `Loaded` keeps the
    /// current thread.
    pub fn apply(&mut self, completion: Completion) -> Result<(), ThreadError> {
        match completion {
            Completion::Loaded(comments) => {
                self.forest = build::build(comments)?;
                Ok(())
            }
            Completion::Created(record) => thread_ops::add_comment(&mut self.forest, record),
            Completion::Updated(record) => thread_ops::update(&mut self.forest, record),
            Completion::Deleted(id) => thread_ops::delete(&mut self.forest, id).map(|_| ()),
        }
    }

    /// Non-blocking: apply every queued completion, returning one outcome each.
    pub fn poll(&mut self) -> Vec<Result<(), ThreadError>> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            let outcome = self.apply(completion);
            if let Err(e) = &outcome {
                tracing::warn!(card_id = self.card_id, error = %e, "completion not applied");
            }
            outcomes.push(outcome);
        }
        if !outcomes.is_empty() {
            tracing::debug!(card_id = self.card_id, applied = outcomes.len(), "drained completions");
        }
        outcomes
    }

    // -----------------------------------------------------------------------
    // Synchronous transport-first helpers
    // -----------------------------------------------------------------------

    /// Fetch the card's comments and rebuild the thread.
    pub fn reload<T: CommentTransport>(&mut self, transport: &mut T) -> Result<(), SessionError> {
        let comments = transport
            .fetch_comments(self.card_id)
            .map_err(|e| SessionError::Transport(Box::new(e)))?;
        self.apply(Completion::Loaded(comments))?;
        Ok(())
    }

    /// Create a comment (a reply when `parent_id` is set) and add it to the thread.
    pub fn create<T: CommentTransport>(
        &mut self,
        transport: &mut T,
        message: &str,
        parent_id: Option<CommentId>,
    ) -> Result<Comment, SessionError> {
        if let Some(parent) = parent_id
            && !self.forest.contains(parent)
        {
            return Err(ThreadError::ParentNotFound(parent).into());
        }
        let record = transport
            .create_comment(self.card_id, message, parent_id)
            .map_err(|e| SessionError::Transport(Box::new(e)))?;
        self.apply(Completion::Created(record.clone()))?;
        Ok(record)
    }

    pub fn update<T: CommentTransport>(
        &mut self,
        transport: &mut T,
        id: CommentId,
        message: &str,
    ) -> Result<Comment, SessionError> {
        self.forest.find(id)?;
        let record = transport
            .update_comment(self.card_id, id, message)
            .map_err(|e| SessionError::Transport(Box::new(e)))?;
        self.apply(Completion::Updated(record.clone()))?;
        Ok(record)
    }

    pub fn delete<T: CommentTransport>(&mut self, transport: &mut T, id: CommentId) -> Result<(), SessionError> {
        self.forest.find(id)?;
        transport
            .delete_comment(self.card_id, id)
            .map_err(|e| SessionError::Transport(Box::new(e)))?;
        self.apply(Completion::Deleted(id))?;
        Ok(())
    }
}
