//! Depth-first subtree copying, the engine behind split, join and prune.

use tracing::trace;

use super::{ChildGroups, MorphError, ParentId, SegmentId, SegmentTree};

/// A pending copy: attach source segment `id` under `parent` in the
/// destination tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CopyStart {
    pub parent: ParentId,
    pub id: SegmentId,
}

impl CopyStart {
    pub fn new(parent: impl Into<ParentId>, id: SegmentId) -> Self {
        CopyStart {
            parent: parent.into(),
            id,
        }
    }
}

/// Copies the subtree of `tree` rooted at `start.id` into `init`, attached
/// under `start.parent`, and returns the extended tree.
///
/// Whenever `predicate` rejects a pending copy, that segment and everything
/// below it is skipped. Children are copied in ascending source id order, so
/// copying the same source twice gives identical results.
///
/// `init` is consumed either way: on error it is dropped, so callers that
/// need the destination back should pass a clone.
pub fn copy_subtree_if<P>(
    tree: &SegmentTree,
    start: CopyStart,
    predicate: P,
    init: SegmentTree,
) -> Result<SegmentTree, MorphError>
where
    P: FnMut(&CopyStart) -> bool,
{
    copy_grouped_subtree_if(tree, &ChildGroups::new(tree), start, predicate, init)
}

/// As [`copy_subtree_if`], reusing an already computed adjacency of `tree`.
pub(crate) fn copy_grouped_subtree_if<P>(
    tree: &SegmentTree,
    children_of: &ChildGroups,
    start: CopyStart,
    mut predicate: P,
    init: SegmentTree,
) -> Result<SegmentTree, MorphError>
where
    P: FnMut(&CopyStart) -> bool,
{
    tree.segment(start.id)?;

    let mut result = init;
    let mut todo = vec![start];
    while let Some(node) = todo.pop() {
        if !predicate(&node) {
            trace!(id = %node.id, "skipping subtree");
            continue;
        }
        let segment = &tree.segments()[node.id.0];
        let current = result.append(node.parent, segment.prox, segment.dist, segment.tag)?;
        trace!(from = %node.id, to = %current, parent = %node.parent, "copied segment");

        // reversed, so the smallest child is popped first
        todo.extend(
            children_of
                .of(node.id.into())
                .iter()
                .rev()
                .map(|&child| CopyStart::new(current, child)),
        );
    }
    Ok(result)
}

#[cfg(test)]
mod test {
    use crate::geometry::Point;

    use super::*;

    fn pt(x: f64) -> Point {
        Point::new(x, 0.0, 0.0, 1.0)
    }

    /// 0 -> {1 -> {3}, 2}
    fn small() -> SegmentTree {
        let mut tree = SegmentTree::new();
        let r = tree.append(ParentId::Root, pt(0.0), pt(1.0), 1).unwrap();
        let a = tree.extend_branch(r.into(), pt(2.0), 2).unwrap();
        tree.extend_branch(r.into(), pt(3.0), 3).unwrap();
        tree.extend_branch(a.into(), pt(4.0), 4).unwrap();
        tree
    }

    #[test]
    fn copies_children_in_ascending_order() {
        let tree = small();
        let copy = copy_subtree_if(
            &tree,
            CopyStart::new(ParentId::Root, SegmentId(0)),
            |_| true,
            SegmentTree::new(),
        )
        .unwrap();

        // depth first: 0, 1, 3, then 2
        assert_eq!(
            copy.segments().iter().map(|s| s.tag).collect::<Vec<_>>(),
            vec![1, 2, 4, 3]
        );
        assert_eq!(
            copy.parents(),
            &[
                ParentId::Root,
                SegmentId(0).into(),
                SegmentId(1).into(),
                SegmentId(0).into()
            ]
        );
        copy.validate().unwrap();

        let again = copy_subtree_if(
            &tree,
            CopyStart::new(ParentId::Root, SegmentId(0)),
            |_| true,
            SegmentTree::new(),
        )
        .unwrap();
        assert_eq!(again, copy);
    }

    #[test]
    fn rejection_drops_whole_subtree() {
        let tree = small();
        let copy = copy_subtree_if(
            &tree,
            CopyStart::new(ParentId::Root, SegmentId(0)),
            |n| n.id != SegmentId(1),
            SegmentTree::new(),
        )
        .unwrap();

        assert_eq!(copy.size(), 2);
        assert_eq!(
            copy.segments().iter().map(|s| s.tag).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(copy.parents(), &[ParentId::Root, SegmentId(0).into()]);
    }

    #[test]
    fn extends_given_destination() {
        let tree = small();
        let mut init = SegmentTree::new();
        init.append(ParentId::Root, pt(-1.0), pt(0.0), 9).unwrap();

        let copy = copy_subtree_if(
            &tree,
            CopyStart::new(SegmentId(0), SegmentId(1)),
            |_| true,
            init,
        )
        .unwrap();

        assert_eq!(copy.size(), 3);
        assert_eq!(copy.segments()[0].tag, 9);
        assert_eq!(copy.segments()[1].tag, 2);
        assert_eq!(copy.segments()[2].tag, 4);
        assert_eq!(
            copy.parents(),
            &[ParentId::Root, SegmentId(0).into(), SegmentId(1).into()]
        );
    }

    #[test]
    fn invalid_start_is_rejected() {
        let tree = small();
        assert_eq!(
            copy_subtree_if(
                &tree,
                CopyStart::new(ParentId::Root, SegmentId(7)),
                |_| true,
                SegmentTree::new()
            ),
            Err(MorphError::NoSuchSegment(SegmentId(7)))
        );
        assert_eq!(
            copy_subtree_if(
                &tree,
                CopyStart::new(SegmentId(3), SegmentId(0)),
                |_| true,
                SegmentTree::new()
            ),
            Err(MorphError::InvalidParent {
                parent: SegmentId(3).into(),
                size: 0
            })
        );
    }
}
