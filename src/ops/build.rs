use std::collections::HashSet;

use crate::model::comment::{Comment, CommentId};
use crate::model::forest::{Forest, Node, ThreadError};
use crate::ops::check::check_forest;

/// Reconstruct the reply forest of a card from a flat comment list.
///
/// Input order does not matter: every record is indexed first and linked
/// afterwards, so a reply may precede the comment it answers. Roots and
/// child lists come out ordered by id.
///
/// A record whose parent is missing from the batch (or names itself) is shown
/// as a root instead of being dropped. Parent references that loop back on
/// themselves are broken by promoting the lowest id of each loop to a root.
///
/// Fails with `DuplicateId` if two records share an id.
pub fn build(comments: impl IntoIterator<Item = Comment>) -> Result<Forest, ThreadError> {
    let mut forest = Forest::new();

    for comment in comments {
        let id = comment.id;
        if forest.index.contains_key(&id) {
            return Err(ThreadError::DuplicateId(id));
        }
        forest.index.insert(id, Node::new(comment));
    }

    // Ascending ids keep every attach an append.
    let mut ids: Vec<CommentId> = forest.index.keys().copied().collect();
    ids.sort_unstable();
    for id in ids {
        let parent = forest
            .get(id)
            .and_then(|n| n.comment.parent_id)
            .filter(|p| *p != id && forest.contains(*p));
        forest.attach(id, parent);
    }

    repair_cycles(&mut forest);

    debug_assert!(check_forest(&forest).valid);
    Ok(forest)
}

/// Promote one node per parent loop until everything hangs off a root.
///
/// Unreachable ids are visited once, lowest first. Each climb only walks
/// unreachable nodes and the promotion makes all of them reachable, so the
/// whole repair stays linear in the thread size.
fn repair_cycles(forest: &mut Forest) {
    let mut reachable = HashSet::with_capacity(forest.len());
    for root in forest.roots.clone() {
        mark_subtree(forest, root, &mut reachable);
    }
    if reachable.len() == forest.len() {
        return;
    }

    let mut stranded: Vec<CommentId> = forest
        .index
        .keys()
        .filter(|id| !reachable.contains(*id))
        .copied()
        .collect();
    stranded.sort_unstable();

    for start in stranded {
        if reachable.contains(&start) {
            continue;
        }

        // Climb until an id repeats; everything from that id on is the loop.
        let mut path = Vec::new();
        let mut on_path = HashSet::new();
        let mut current = start;
        while on_path.insert(current) {
            path.push(current);
            match forest.get(current).and_then(|n| n.parent) {
                Some(p) => current = p,
                None => break,
            }
        }
        let loop_start = path.iter().position(|id| *id == current).unwrap_or(0);
        let promote = path[loop_start..].iter().min().copied().unwrap_or(start);

        forest.detach(promote);
        forest.attach(promote, None);
        mark_subtree(forest, promote, &mut reachable);
    }
}

fn mark_subtree(forest: &Forest, id: CommentId, reachable: &mut HashSet<CommentId>) {
    let mut stack = vec![id];
    while let Some(id) = stack.pop() {
        if !reachable.insert(id) {
            continue;
        }
        if let Some(node) = forest.get(id) {
            stack.extend_from_slice(node.children());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
