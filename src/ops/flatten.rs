use crate::model::comment::CommentId;
use crate::model::forest::{Forest, Node};

/// One line of the pre-order view: a node and its reply depth (roots = 0).
#[derive(Debug, Clone, Copy)]
pub struct FlatEntry<'a> {
    pub node: &'a Node,
    pub depth: usize,
}

/// Pre-order walk over a forest: each root in stored order, immediately
/// followed by its replies, depth first.
///
/// The walk borrows the forest immutably, so nothing can change the thread
/// while a renderer is consuming it. Once exhausted it stays exhausted.
pub struct Flatten<'a> {
    forest: &'a Forest,
    stack: Vec<(CommentId, usize)>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = FlatEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            // Ids without a node only appear if the invariants are broken; skip them.
            let Some(node) = self.forest.get(id) else {
                continue;
            };
            self.stack
                .extend(node.children().iter().rev().map(|c| (*c, depth + 1)));
            return Some(FlatEntry { node, depth });
        }
        None
    }
}

/// Walk the forest in display order.
pub fn flatten(forest: &Forest) -> Flatten<'_> {
    Flatten {
        forest,
        stack: forest.roots().iter().rev().map(|id| (*id, 0)).collect(),
    }
}

/// Display-order ids with their depths, for callers that only need positions.
pub fn flatten_ids(forest: &Forest) -> Vec<(CommentId, usize)> {
    flatten(forest).map(|e| (e.node.id(), e.depth)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::build::build;
    use crate::ops::test_helpers::{comment, reply};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty() {
        let forest = Forest::new();
        assert_eq!(flatten(&forest).count(), 0);
    }

    #[test]
    fn test_pre_order_with_siblings() {
        let forest = build(vec![
            comment(1),
            reply(2, 1),
            reply(3, 2),
            reply(4, 1),
            comment(5),
            reply(6, 5),
        ])
        .unwrap();
        assert_eq!(
            flatten_ids(&forest),
            vec![(1, 0), (2, 1), (3, 2), (4, 1), (5, 0), (6, 1)]
        );
    }

    #[test]
    fn test_deterministic_across_runs() {
        let records = vec![reply(4, 1), comment(1), reply(2, 1), comment(3), reply(5, 2)];
        let first = flatten_ids(&build(records.clone()).unwrap());
        let second = flatten_ids(&build(records).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_exhausted_iterator_stays_empty() {
        let forest = build(vec![comment(1), reply(2, 1)]).unwrap();
        let mut walk = flatten(&forest);
        assert_eq!(walk.by_ref().count(), 2);
        assert!(walk.next().is_none());
    }

    #[test]
    fn test_entries_expose_records() {
        let forest = build(vec![comment(1), reply(2, 1)]).unwrap();
        let messages: Vec<&str> = flatten(&forest)
            .map(|e| e.node.comment().message.as_str())
            .collect();
        assert_eq!(messages, vec!["comment 1", "reply 2"]);
    }

    #[test]
    fn test_deep_thread_does_not_recurse() {
        let mut records = vec![comment(1)];
        records.extend((2..5000).map(|id| reply(id, id - 1)));
        let forest = build(records).unwrap();
        let last = flatten(&forest).last().unwrap();
        assert_eq!(last.node.id(), 4999);
        assert_eq!(last.depth, 4998);
    }
}
