use crate::model::comment::{Comment, CommentId};
use crate::model::forest::{Forest, Node, ThreadError};
use crate::ops::check::check_forest;

// All mutations run after the server has confirmed the change, so records
// always carry server-assigned ids. Every operation validates before it
// touches the forest: an error leaves the thread exactly as it was.

// ---------------------------------------------------------------------------
// Insertion
// ---------------------------------------------------------------------------

/// Add a new top-level comment, placed among the roots by id.
pub fn add_root(forest: &mut Forest, record: Comment) -> Result<(), ThreadError> {
    if record.parent_id.is_some() {
        return Err(ThreadError::ParentMismatch {
            id: record.id,
            expected: None,
            found: record.parent_id,
        });
    }
    if forest.contains(record.id) {
        return Err(ThreadError::DuplicateId(record.id));
    }

    let id = record.id;
    forest.index.insert(id, Node::new(record));
    forest.attach(id, None);

    debug_check(forest);
    Ok(())
}

/// Add a reply under `parent_id`, placed among its siblings by id.
///
/// Unlike `build`, a missing parent is an error here: the thread is already
/// loaded, so the caller's view is stale and should reload.
pub fn add_reply(forest: &mut Forest, parent_id: CommentId, record: Comment) -> Result<(), ThreadError> {
    if !forest.contains(parent_id) {
        return Err(ThreadError::ParentNotFound(parent_id));
    }
    if record.parent_id != Some(parent_id) {
        return Err(ThreadError::ParentMismatch {
            id: record.id,
            expected: Some(parent_id),
            found: record.parent_id,
        });
    }
    if forest.contains(record.id) {
        return Err(ThreadError::DuplicateId(record.id));
    }

    let id = record.id;
    forest.index.insert(id, Node::new(record));
    forest.attach(id, Some(parent_id));

    debug_check(forest);
    Ok(())
}

/// Route a freshly created record to `add_root` or `add_reply` by its parent.
pub fn add_comment(forest: &mut Forest, record: Comment) -> Result<(), ThreadError> {
    match record.parent_id {
        Some(parent_id) => add_reply(forest, parent_id, record),
        None => add_root(forest, record),
    }
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

/// Replace a comment's message. Position in the thread never changes.
pub fn edit(forest: &mut Forest, id: CommentId, message: impl Into<String>) -> Result<(), ThreadError> {
    let node = forest.node_mut(id).ok_or(ThreadError::NotFound(id))?;
    let record = Comment {
        message: message.into(),
        ..node.comment.clone()
    };
    node.comment = record;
    Ok(())
}

/// Swap in the record the server returned for an update.
///
/// Structure is kept as is, whatever `parent_id` the new record declares:
/// edits never move comments.
pub fn update(forest: &mut Forest, record: Comment) -> Result<(), ThreadError> {
    let node = forest
        .node_mut(record.id)
        .ok_or(ThreadError::NotFound(record.id))?;
    node.comment = record;
    Ok(())
}

// ---------------------------------------------------------------------------
// Removal
// ---------------------------------------------------------------------------

/// Remove a comment and hand back its record.
///
/// Replies are not deleted with it: they move up into the list the deleted
/// comment lived in (its parent's replies, or the roots), in id order.
pub fn delete(forest: &mut Forest, id: CommentId) -> Result<Comment, ThreadError> {
    let parent = forest.find(id)?.parent();

    forest.detach(id);
    let node = forest.index.remove(&id).ok_or(ThreadError::NotFound(id))?;
    for child in node.children {
        forest.attach(child, parent);
    }

    debug_check(forest);
    Ok(node.comment)
}

fn debug_check(forest: &Forest) {
    if cfg!(debug_assertions) {
        let result = check_forest(forest);
        debug_assert!(result.valid, "forest invariants broken: {:?}", result.errors);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::build::build;
    use crate::ops::flatten::flatten_ids;
    use crate::ops::test_helpers::{comment, reply};
    use pretty_assertions::assert_eq;

    fn chain() -> Forest {
        build(vec![comment(1), reply(2, 1), reply(3, 2)]).unwrap()
    }

    /// Roots 1 and 4; 2 replies to 1, 3 to 2, 5 to 4
    fn two_threads() -> Forest {
        build(vec![comment(1), reply(2, 1), reply(3, 2), comment(4), reply(5, 4)]).unwrap()
    }

    // --- add_root ---

    #[test]
    fn test_add_root_in_id_order() {
        let mut forest = build(vec![comment(1), comment(8)]).unwrap();
        add_root(&mut forest, comment(5)).unwrap();
        assert_eq!(forest.roots(), &[1, 5, 8]);
        assert!(forest.find(5).unwrap().is_root());
    }

    #[test]
    fn test_add_root_duplicate_leaves_forest_unchanged() {
        let mut forest = chain();
        let before = forest.clone();
        let err = add_root(&mut forest, comment(2)).unwrap_err();
        assert_eq!(err, ThreadError::DuplicateId(2));
        assert_eq!(forest, before);
    }

    #[test]
    fn test_add_root_rejects_reply_record() {
        let mut forest = chain();
        let err = add_root(&mut forest, reply(9, 1)).unwrap_err();
        assert_eq!(
            err,
            ThreadError::ParentMismatch {
                id: 9,
                expected: None,
                found: Some(1)
            }
        );
        assert!(!forest.contains(9));
    }

    // --- add_reply ---

    #[test]
    fn test_reply_lands_after_parent_subtree() {
        let mut forest = build(vec![
            comment(1),
            reply(2, 1),
            reply(3, 2),
            reply(4, 3),
            reply(6, 1),
            comment(7),
        ])
        .unwrap();
        add_reply(&mut forest, 2, reply(10, 2)).unwrap();

        let node = forest.find(10).unwrap();
        assert_eq!(forest.parent_of(10).unwrap().map(Node::id), Some(2));
        assert_eq!(node.parent(), Some(2));
        assert_eq!(
            flatten_ids(&forest),
            vec![(1, 0), (2, 1), (3, 2), (4, 3), (10, 2), (6, 1), (7, 0)]
        );
    }

    #[test]
    fn test_reply_to_missing_parent() {
        let mut forest = chain();
        let before = forest.clone();
        let err = add_reply(&mut forest, 42, reply(10, 42)).unwrap_err();
        assert_eq!(err, ThreadError::ParentNotFound(42));
        assert_eq!(forest, before);
    }

    #[test]
    fn test_reply_with_mismatched_parent() {
        let mut forest = chain();
        let err = add_reply(&mut forest, 2, reply(10, 1)).unwrap_err();
        assert_eq!(
            err,
            ThreadError::ParentMismatch {
                id: 10,
                expected: Some(2),
                found: Some(1)
            }
        );
        assert!(!forest.contains(10));
    }

    #[test]
    fn test_reply_duplicate_id() {
        let mut forest = chain();
        let before = forest.clone();
        assert_eq!(
            add_reply(&mut forest, 1, reply(3, 1)),
            Err(ThreadError::DuplicateId(3))
        );
        assert_eq!(forest, before);
    }

    #[test]
    fn test_add_comment_routes_by_parent() {
        let mut forest = chain();
        add_comment(&mut forest, comment(4)).unwrap();
        add_comment(&mut forest, reply(5, 3)).unwrap();
        assert_eq!(
            flatten_ids(&forest),
            vec![(1, 0), (2, 1), (3, 2), (5, 3), (4, 0)]
        );
    }

    // --- edit / update ---

    #[test]
    fn test_edit_replaces_message_only() {
        let mut forest = chain();
        let shape_before = flatten_ids(&forest);
        edit(&mut forest, 2, "reworded").unwrap();

        let node = forest.find(2).unwrap();
        assert_eq!(node.comment().message, "reworded");
        assert_eq!(node.comment().author_id, "bob");
        assert_eq!(flatten_ids(&forest), shape_before);
    }

    #[test]
    fn test_edit_swaps_in_a_new_record() {
        let mut forest = chain();
        let before = forest.find(3).unwrap().comment().clone();
        edit(&mut forest, 3, "second thoughts").unwrap();

        let expected = Comment {
            message: "second thoughts".to_string(),
            ..before
        };
        assert_eq!(forest.find(3).unwrap().comment(), &expected);
        assert_eq!(forest.find(3).unwrap().parent(), Some(2));
    }

    #[test]
    fn test_edit_missing() {
        let mut forest = chain();
        assert_eq!(edit(&mut forest, 9, "x"), Err(ThreadError::NotFound(9)));
    }

    #[test]
    fn test_update_keeps_position() {
        let mut forest = chain();
        let mut record = reply(3, 1);
        record.message = "server copy".to_string();
        update(&mut forest, record.clone()).unwrap();

        let node = forest.find(3).unwrap();
        assert_eq!(node.comment(), &record);
        assert_eq!(node.parent(), Some(2));
        assert_eq!(update(&mut forest, comment(77)), Err(ThreadError::NotFound(77)));
    }

    // --- delete ---

    #[test]
    fn test_delete_promotes_into_parent() {
        let mut forest = chain();
        let removed = delete(&mut forest, 2).unwrap();
        assert_eq!(removed.id, 2);

        assert_eq!(forest.find(2).unwrap_err(), ThreadError::NotFound(2));
        let three = forest.find(3).unwrap();
        assert_eq!(three.parent(), Some(1));
        assert_eq!(forest.find(1).unwrap().children(), &[3]);
        assert_eq!(flatten_ids(&forest), vec![(1, 0), (3, 1)]);
    }

    #[test]
    fn test_delete_root_promotes_only_its_children() {
        let mut forest = two_threads();
        delete(&mut forest, 1).unwrap();

        assert_eq!(forest.roots(), &[2, 4]);
        assert!(forest.find(2).unwrap().is_root());
        assert_eq!(forest.find(3).unwrap().parent(), Some(2));
        assert_eq!(forest.find(5).unwrap().parent(), Some(4));
        assert_eq!(
            flatten_ids(&forest),
            vec![(2, 0), (3, 1), (4, 0), (5, 1)]
        );
    }

    #[test]
    fn test_delete_interleaves_promoted_children_by_id() {
        // 1 has replies 2 and 6; 2 has replies 3 and 8
        let mut forest = build(vec![comment(1), reply(2, 1), reply(3, 2), reply(6, 1), reply(8, 2)]).unwrap();
        delete(&mut forest, 2).unwrap();
        assert_eq!(forest.find(1).unwrap().children(), &[3, 6, 8]);
    }

    #[test]
    fn test_delete_leaf_and_missing() {
        let mut forest = chain();
        delete(&mut forest, 3).unwrap();
        assert!(forest.find(2).unwrap().children().is_empty());
        assert_eq!(forest.len(), 2);

        let before = forest.clone();
        assert_eq!(delete(&mut forest, 3).unwrap_err(), ThreadError::NotFound(3));
        assert_eq!(forest, before);
    }

    #[test]
    fn test_mixed_session_keeps_invariants() {
        let mut forest = two_threads();
        add_reply(&mut forest, 5, reply(6, 5)).unwrap();
        add_root(&mut forest, comment(7)).unwrap();
        delete(&mut forest, 4).unwrap();
        edit(&mut forest, 6, "still here").unwrap();
        delete(&mut forest, 2).unwrap();

        assert!(check_forest(&forest).valid);
        assert_eq!(
            flatten_ids(&forest),
            vec![(1, 0), (3, 1), (5, 0), (6, 1), (7, 0)]
        );
        assert_eq!(forest.len(), 5);
    }
}
