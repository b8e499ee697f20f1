use crate::model::comment::{Comment, CommentId};

/// The remote side of a comment thread.
///
/// Implementations own all I/O, retry and timeout policy. Every record they
/// return is server-confirmed and may be applied to a forest as is.
pub trait CommentTransport {
    type Error: std::error::Error + Send + Sync + 'static;

    /// All comments of a card, flat and in any order
    fn fetch_comments(&mut self, card_id: i64) -> Result<Vec<Comment>, Self::Error>;

    /// Create a comment, optionally as a reply; returns the stored record
    fn create_comment(
        &mut self,
        card_id: i64,
        message: &str,
        parent_id: Option<CommentId>,
    ) -> Result<Comment, Self::Error>;

    /// Change a comment's message; returns the stored record
    fn update_comment(
        &mut self,
        card_id: i64,
        comment_id: CommentId,
        message: &str,
    ) -> Result<Comment, Self::Error>;

    fn delete_comment(&mut self, card_id: i64, comment_id: CommentId) -> Result<(), Self::Error>;
}
