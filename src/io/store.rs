use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

use crate::io::lock::{DEFAULT_LOCK_TIMEOUT, LockError, StoreLock};
use crate::io::transport::CommentTransport;
use crate::model::comment::{Comment, CommentId};

const STORE_FILE: &str = "comments.json";

/// Error type for the local comment store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not encode store: {0}")]
    EncodeError(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("comment {comment_id} not found on card {card_id}")]
    CommentNotFound { card_id: i64, comment_id: CommentId },
}

/// On-disk layout of comments.json
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDoc {
    #[serde(default = "first_id")]
    next_id: CommentId,
    #[serde(default)]
    cards: BTreeMap<i64, Vec<Comment>>,
}

fn first_id() -> CommentId {
    1
}

impl StoreDoc {
    fn take_id(&mut self) -> CommentId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    fn card_mut(&mut self, card_id: i64) -> &mut Vec<Comment> {
        self.cards.entry(card_id).or_default()
    }
}

/// Who new comments are attributed to
#[derive(Debug, Clone)]
pub struct Author {
    pub id: String,
    pub display_name: String,
}

/// A comment server backed by one JSON file.
///
/// Behaves like the remote service: it assigns increasing ids, stamps
/// creation times, and when a comment is deleted its replies are re-pointed
/// at the deleted comment's parent.
pub struct FileStore {
    dir: PathBuf,
    author: Author,
}

impl FileStore {
    /// Open (creating if needed) the store in `dir`.
    pub fn open(dir: &Path, author: Author) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::WriteError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(FileStore {
            dir: dir.to_path_buf(),
            author,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    /// Merge comments obtained elsewhere (e.g. an OCS dump) into a card.
    /// Records with an id already on the card are replaced. Returns how many
    /// records were new.
    pub fn import(&mut self, card_id: i64, comments: Vec<Comment>) -> Result<usize, StoreError> {
        self.with_doc(|doc| {
            let max_id = comments.iter().map(|c| c.id).max().unwrap_or(0);
            let card = doc.card_mut(card_id);
            let mut added = 0;
            for comment in comments {
                match card.iter_mut().find(|c| c.id == comment.id) {
                    Some(existing) => *existing = comment,
                    None => {
                        card.push(comment);
                        added += 1;
                    }
                }
            }
            doc.next_id = doc.next_id.max(max_id + 1);
            tracing::info!(card_id, added, "imported comments");
            Ok(added)
        })
    }

    fn read_doc(&self) -> Result<StoreDoc, StoreError> {
        let path = self.path();
        if !path.exists() {
            return Ok(StoreDoc {
                next_id: first_id(),
                cards: BTreeMap::new(),
            });
        }
        let text = fs::read_to_string(&path).map_err(|e| StoreError::ReadError {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| StoreError::ParseError { path, source: e })
    }

    fn write_doc(&self, doc: &StoreDoc) -> Result<(), StoreError> {
        let path = self.path();
        let tmp = path.with_extension("json.tmp");
        let text = serde_json::to_string_pretty(doc)?;
        fs::write(&tmp, text).map_err(|e| StoreError::WriteError {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, &path).map_err(|e| StoreError::WriteError { path, source: e })
    }

    /// Locked read-modify-write. Nothing is written if `f` fails.
    fn with_doc<T>(
        &mut self,
        f: impl FnOnce(&mut StoreDoc) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _lock = StoreLock::acquire(&self.dir, DEFAULT_LOCK_TIMEOUT)?;
        let mut doc = self.read_doc()?;
        let out = f(&mut doc)?;
        self.write_doc(&doc)?;
        Ok(out)
    }
}

fn now() -> DateTime<FixedOffset> {
    Local::now().into()
}

impl CommentTransport for FileStore {
    type Error = StoreError;

    fn fetch_comments(&mut self, card_id: i64) -> Result<Vec<Comment>, StoreError> {
        let doc = self.read_doc()?;
        let comments = doc.cards.get(&card_id).cloned().unwrap_or_default();
        tracing::debug!(card_id, count = comments.len(), "fetched comments");
        Ok(comments)
    }

    fn create_comment(
        &mut self,
        card_id: i64,
        message: &str,
        parent_id: Option<CommentId>,
    ) -> Result<Comment, StoreError> {
        let author = self.author.clone();
        self.with_doc(|doc| {
            if let Some(parent) = parent_id
                && !doc.card_mut(card_id).iter().any(|c| c.id == parent)
            {
                return Err(StoreError::CommentNotFound {
                    card_id,
                    comment_id: parent,
                });
            }
            let comment = Comment {
                id: doc.take_id(),
                parent_id,
                author_id: author.id,
                author_display_name: author.display_name,
                message: message.to_string(),
                created_at: now(),
            };
            doc.card_mut(card_id).push(comment.clone());
            tracing::debug!(card_id, comment_id = comment.id, ?parent_id, "created comment");
            Ok(comment)
        })
    }

    fn update_comment(
        &mut self,
        card_id: i64,
        comment_id: CommentId,
        message: &str,
    ) -> Result<Comment, StoreError> {
        self.with_doc(|doc| {
            let comment = doc
                .card_mut(card_id)
                .iter_mut()
                .find(|c| c.id == comment_id)
                .ok_or(StoreError::CommentNotFound {
                    card_id,
                    comment_id,
                })?;
            comment.message = message.to_string();
            tracing::debug!(card_id, comment_id, "updated comment");
            Ok(comment.clone())
        })
    }

    fn delete_comment(&mut self, card_id: i64, comment_id: CommentId) -> Result<(), StoreError> {
        self.with_doc(|doc| {
            let card = doc.card_mut(card_id);
            let pos = card
                .iter()
                .position(|c| c.id == comment_id)
                .ok_or(StoreError::CommentNotFound {
                    card_id,
                    comment_id,
                })?;
            let removed = card.remove(pos);
            for reply in card.iter_mut().filter(|c| c.parent_id == Some(comment_id)) {
                reply.parent_id = removed.parent_id;
            }
            tracing::debug!(card_id, comment_id, "deleted comment");
            Ok(())
        })
    }
}
