use std::collections::HashSet;

use serde::Serialize;

use crate::model::comment::CommentId;
use crate::model::forest::Forest;

/// Structured result from `dt check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A broken forest invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// A root or child list names an id with no index entry
    #[serde(rename = "missing_node")]
    MissingNode { id: CommentId },
    /// A node in the root list still points at a parent
    #[serde(rename = "root_has_parent")]
    RootHasParent { id: CommentId, parent: CommentId },
    /// A node's parent link disagrees with the list that holds it
    #[serde(rename = "parent_link")]
    ParentLink {
        id: CommentId,
        expected: Option<CommentId>,
        found: Option<CommentId>,
    },
    /// The same id is reachable more than once
    #[serde(rename = "repeated")]
    Repeated { id: CommentId },
    /// An indexed node cannot be reached from any root (leak or cycle)
    #[serde(rename = "unreachable")]
    Unreachable { id: CommentId },
}

/// A validation warning (the forest is sound, the data behind it is odd).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// The record names a parent other than the one it is shown under,
    /// because that parent was missing from the load or was deleted since
    #[serde(rename = "moved_reply")]
    MovedReply {
        id: CommentId,
        declared: CommentId,
        placed: Option<CommentId>,
    },
}

/// Validate the structural invariants of a forest.
///
/// This is a read-only operation. Checks performed:
/// 1. Every id occurs once across the forest
/// 2. Parent links agree with child lists
/// 3. Roots have no parent
/// 4. The index holds exactly the reachable ids (which also rules out cycles)
/// 5. Warnings for replies shown somewhere other than under their declared parent
pub fn check_forest(forest: &Forest) -> CheckResult {
    let mut result = CheckResult::default();
    let mut seen: HashSet<CommentId> = HashSet::with_capacity(forest.len());

    // (id, the parent the containing list implies)
    let mut stack: Vec<(CommentId, Option<CommentId>)> =
        forest.roots().iter().rev().map(|id| (*id, None)).collect();

    while let Some((id, expected)) = stack.pop() {
        let Some(node) = forest.get(id) else {
            result.errors.push(CheckError::MissingNode { id });
            continue;
        };
        match (expected, node.parent()) {
            (None, Some(parent)) => {
                result.errors.push(CheckError::RootHasParent { id, parent });
            }
            (expected, found) if expected != found => {
                result.errors.push(CheckError::ParentLink { id, expected, found });
            }
            _ => {}
        }
        if !seen.insert(id) {
            result.errors.push(CheckError::Repeated { id });
            continue;
        }
        for child in node.children().iter().rev() {
            stack.push((*child, Some(id)));
        }
    }

    let mut unreachable: Vec<CommentId> = forest
        .comments()
        .map(|c| c.id)
        .filter(|id| !seen.contains(id))
        .collect();
    unreachable.sort_unstable();
    result
        .errors
        .extend(unreachable.into_iter().map(|id| CheckError::Unreachable { id }));

    let mut moved: Vec<CheckWarning> = forest
        .comments()
        .filter_map(|c| {
            let declared = c.parent_id?;
            let placed = forest.get(c.id)?.parent();
            (placed != Some(declared)).then_some(CheckWarning::MovedReply {
                id: c.id,
                declared,
                placed,
            })
        })
        .collect();
    moved.sort_by_key(|w| match w {
        CheckWarning::MovedReply { id, .. } => *id,
    });
    result.warnings = moved;

    result.valid = result.errors.is_empty();
    result
}
