//! Shared fixtures for ops tests.

use chrono::{DateTime, Duration, FixedOffset};

use crate::model::comment::{Comment, CommentId};

/// Timestamps advance one minute per id so records look like a real thread.
pub fn stamp(id: CommentId) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2025-05-01T12:00:00+00:00").unwrap() + Duration::minutes(id)
}

/// A top-level comment
pub fn comment(id: CommentId) -> Comment {
    Comment::new(id, "alice", "Alice", format!("comment {}", id), stamp(id))
}

/// A reply to `parent`
pub fn reply(id: CommentId, parent: CommentId) -> Comment {
    Comment::new(id, "bob", "Bob", format!("reply {}", id), stamp(id)).replying_to(parent)
}

