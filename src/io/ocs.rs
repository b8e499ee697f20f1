//! Decoding of the Deck comments API responses.
//!
//! Comment endpoints answer with Nextcloud's OCS envelope:
//! `{"ocs": {"meta": {...}, "data": ...}}`, where `data` is a single comment
//! or a list of them. A reply carries the full comment it answers under
//! `replyTo`; only its id is kept.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::model::comment::{Comment, CommentId};

/// Error type for OCS decoding
#[derive(Debug, thiserror::Error)]
pub enum OcsError {
    #[error("could not decode OCS response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server answered {code}: {message}")]
    Status { code: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct OcsResponse<T> {
    ocs: Ocs<T>,
}

#[derive(Debug, Deserialize)]
struct Ocs<T> {
    meta: Meta,
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    #[serde(default)]
    status: String,
    status_code: u16,
    #[serde(default)]
    message: Option<String>,
}

/// A comment as the server spells it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireComment {
    pub id: CommentId,
    pub message: String,
    pub actor_id: String,
    pub actor_display_name: String,
    /// e.g. `2023-04-01T10:00:00+00:00`
    pub creation_date_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub reply_to: Option<ReplyRef>,
}

/// The `replyTo` object; everything but the id is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRef {
    pub id: CommentId,
}

impl From<WireComment> for Comment {
    fn from(wire: WireComment) -> Self {
        Comment {
            id: wire.id,
            parent_id: wire.reply_to.map(|r| r.id),
            author_id: wire.actor_id,
            author_display_name: wire.actor_display_name,
            message: wire.message,
            created_at: wire.creation_date_time,
        }
    }
}

/// Decode a "list comments" response.
pub fn parse_comment_list(body: &str) -> Result<Vec<Comment>, OcsError> {
    let data: Vec<WireComment> = unwrap_envelope(body)?;
    Ok(data.into_iter().map(Comment::from).collect())
}

/// Decode a "create comment" / "update comment" response.
pub fn parse_comment(body: &str) -> Result<Comment, OcsError> {
    let data: WireComment = unwrap_envelope(body)?;
    Ok(data.into())
}

fn unwrap_envelope<T: DeserializeOwned>(body: &str) -> Result<T, OcsError> {
    let response: OcsResponse<serde_json::Value> = serde_json::from_str(body)?;
    let meta = response.ocs.meta;
    // OCS v1 reports success as 100, v2 as 200
    if meta.status_code != 100 && meta.status_code != 200 {
        return Err(OcsError::Status {
            code: meta.status_code,
            message: meta.message.unwrap_or(meta.status),
        });
    }
    Ok(serde_json::from_value(response.ocs.data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LIST: &str = r#"{
  "ocs": {
    "meta": {"status": "ok", "statusCode": 200, "message": "OK"},
    "data": [
      {
        "id": 175,
        "objectId": 12,
        "message": "a reply",
        "actorId": "bob",
        "actorType": "users",
        "actorDisplayName": "Bob",
        "creationDateTime": "2023-04-01T10:05:00+00:00",
        "mentions": [],
        "replyTo": {
          "id": 174,
          "objectId": 12,
          "message": "first",
          "actorId": "alice",
          "actorType": "users",
          "actorDisplayName": "Alice",
          "creationDateTime": "2023-04-01T10:00:00+00:00",
          "mentions": []
        }
      },
      {
        "id": 174,
        "objectId": 12,
        "message": "first",
        "actorId": "alice",
        "actorType": "users",
        "actorDisplayName": "Alice",
        "creationDateTime": "2023-04-01T10:00:00+00:00",
        "mentions": []
      }
    ]
  }
}"#;

    #[test]
    fn test_parse_list_maps_reply_to() {
        let comments = parse_comment_list(LIST).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, 175);
        assert_eq!(comments[0].parent_id, Some(174));
        assert_eq!(comments[0].author_display_name, "Bob");
        assert_eq!(comments[1].parent_id, None);
        assert_eq!(
            comments[1].created_at,
            DateTime::parse_from_rfc3339("2023-04-01T10:00:00+00:00").unwrap()
        );
    }

    #[test]
    fn test_parse_single_with_null_reply() {
        let body = r#"{"ocs":{"meta":{"status":"ok","statusCode":100},"data":
            {"id":9,"message":"hi","actorId":"a","actorDisplayName":"A",
             "creationDateTime":"2024-01-02T03:04:05+00:00","replyTo":null}}}"#;
        let comment = parse_comment(body).unwrap();
        assert_eq!(comment.id, 9);
        assert!(comment.parent_id.is_none());
    }

    #[test]
    fn test_failure_status() {
        let body = r#"{"ocs":{"meta":{"status":"failure","statusCode":404,"message":"Card not found"},"data":[]}}"#;
        match parse_comment_list(body) {
            Err(OcsError::Status { code, message }) => {
                assert_eq!(code, 404);
                assert_eq!(message, "Card not found");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_json_error() {
        assert!(matches!(parse_comment_list("not json"), Err(OcsError::Json(_))));
    }
}
