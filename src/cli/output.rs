use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::model::comment::{Comment, CommentId};
use crate::model::config::DisplayConfig;
use crate::model::forest::{Forest, Node};
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::flatten::{FlatEntry, flatten};
use crate::util::unicode::{one_line, truncate_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct CommentJson {
    pub id: CommentId,
    /// Where the comment sits now (may differ from the declared parent after a delete)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommentId>,
    pub depth: usize,
    pub author_id: String,
    pub author: String,
    pub created_at: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<CommentId>,
}

#[derive(Serialize)]
pub struct ThreadJson {
    pub card: i64,
    pub count: usize,
    /// Display order
    pub comments: Vec<CommentJson>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn comment_to_json(node: &Node, depth: usize) -> CommentJson {
    let c = node.comment();
    CommentJson {
        id: c.id,
        parent: node.parent(),
        depth,
        author_id: c.author_id.clone(),
        author: c.author_display_name.clone(),
        created_at: c.created_at.to_rfc3339(),
        message: c.message.clone(),
        replies: node.children().to_vec(),
    }
}

pub fn thread_to_json(card: i64, forest: &Forest) -> ThreadJson {
    ThreadJson {
        card,
        count: forest.len(),
        comments: flatten(forest)
            .map(|e| comment_to_json(e.node, e.depth))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a timestamp, falling back to RFC 3339 if the pattern is invalid
pub fn format_date(ts: &DateTime<FixedOffset>, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", ts.format(pattern)).is_err() {
        return ts.to_rfc3339();
    }
    out
}

/// One outline row: `#id - author - date - message`, indented by depth
pub fn format_comment_line(entry: &FlatEntry<'_>, display: &DisplayConfig) -> String {
    let c = entry.node.comment();
    let line = format!(
        "{}#{} - {} - {} - {}",
        " ".repeat(entry.depth * display.indent),
        c.id,
        c.author_display_name,
        format_date(&c.created_at, &display.date_format),
        one_line(&c.message)
    );
    if display.max_width == 0 {
        line
    } else {
        truncate_to_width(&line, display.max_width)
    }
}

/// The whole thread, one row per comment, in display order
pub fn format_outline(forest: &Forest, display: &DisplayConfig) -> Vec<String> {
    flatten(forest)
        .map(|e| format_comment_line(&e, display))
        .collect()
}

/// Detailed view of one comment
pub fn format_comment_detail(forest: &Forest, node: &Node, display: &DisplayConfig) -> Vec<String> {
    let c: &Comment = node.comment();
    let mut lines = vec![
        format!("#{} by {} ({})", c.id, c.author_display_name, c.author_id),
        format!("created: {}", format_date(&c.created_at, &display.date_format)),
    ];

    match node.parent() {
        Some(p) => lines.push(format!("reply to: #{}", p)),
        None => lines.push("reply to: -".to_string()),
    }
    if !node.children().is_empty() {
        let replies: Vec<String> = node.children().iter().map(|id| format!("#{}", id)).collect();
        lines.push(format!("replies: {}", replies.join(", ")));
    }
    if let Ok(depth) = forest.depth_of(c.id) {
        lines.push(format!("depth: {}", depth));
    }

    lines.push(String::new());
    lines.extend(c.message.lines().map(|l| l.to_string()));
    lines
}

pub fn format_check_error(err: &CheckError) -> String {
    match err {
        CheckError::MissingNode { id } => format!("#{} is listed but not indexed", id),
        CheckError::RootHasParent { id, parent } => {
            format!("root #{} still points at parent #{}", id, parent)
        }
        CheckError::ParentLink { id, expected, found } => format!(
            "#{} is listed under {} but points at {}",
            id,
            fmt_parent(*expected),
            fmt_parent(*found)
        ),
        CheckError::Repeated { id } => format!("#{} appears more than once", id),
        CheckError::Unreachable { id } => format!("#{} cannot be reached from any root", id),
    }
}

pub fn format_check_warning(warning: &CheckWarning) -> String {
    match warning {
        CheckWarning::MovedReply {
            id,
            declared,
            placed,
        } => format!(
            "#{} answers #{}, shown under {}",
            id,
            declared,
            fmt_parent(*placed)
        ),
    }
}

pub fn format_check_result(result: &CheckResult) -> Vec<String> {
    let mut lines: Vec<String> = result
        .errors
        .iter()
        .map(|e| format!("error: {}", format_check_error(e)))
        .chain(
            result
                .warnings
                .iter()
                .map(|w| format!("warning: {}", format_check_warning(w))),
        )
        .collect();
    if result.valid {
        lines.push("thread ok".to_string());
    }
    lines
}

fn fmt_parent(p: Option<CommentId>) -> String {
    match p {
        Some(id) => format!("#{}", id),
        None => "the roots".to_string(),
    }
}
