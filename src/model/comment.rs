use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, Serializer};

/// Server-assigned comment identifier. Ids grow monotonically on the server,
/// so ordering by id approximates creation order.
pub type CommentId = i64;

/// One comment as confirmed by the remote service.
///
/// Records are values: the forest replaces a node's record wholesale on edit
/// instead of patching it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    /// The comment this one replies to, as declared by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CommentId>,
    pub author_id: String,
    pub author_display_name: String,
    pub message: String,
    /// Written as RFC 3339 with a numeric offset, the way the server sends it
    #[serde(serialize_with = "serialize_rfc3339")]
    pub created_at: DateTime<FixedOffset>,
}

fn serialize_rfc3339<S: Serializer>(ts: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339())
}

impl Comment {
    /// Create a top-level comment record
    pub fn new(
        id: CommentId,
        author_id: impl Into<String>,
        author_display_name: impl Into<String>,
        message: impl Into<String>,
        created_at: DateTime<FixedOffset>,
    ) -> Self {
        Comment {
            id,
            parent_id: None,
            author_id: author_id.into(),
            author_display_name: author_display_name.into(),
            message: message.into(),
            created_at,
        }
    }

    /// Same record, declared as a reply to `parent_id`
    pub fn replying_to(mut self, parent_id: CommentId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}
