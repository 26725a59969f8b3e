//! Splitting, joining and pruning segment trees.

use bitvec::vec::BitVec;
use tracing::debug;

use super::{
    copy::{copy_grouped_subtree_if, CopyStart},
    ChildGroups, MorphError, ParentId, SegmentId, SegmentTree, Tag,
};

/// Splits `tree` into the part outside the subtree rooted at `at` and the
/// subtree itself, in that order. Both come out with fresh ids starting at 0,
/// and `at` becomes the root of the second tree.
pub fn split_at(
    tree: &SegmentTree,
    at: SegmentId,
) -> Result<(SegmentTree, SegmentTree), MorphError> {
    if at.0 >= tree.size() {
        return Err(MorphError::InvalidParent {
            parent: at.into(),
            size: tree.size(),
        });
    }
    let children_of = ChildGroups::new(tree);

    let post = copy_grouped_subtree_if(
        tree,
        &children_of,
        CopyStart::new(ParentId::Root, at),
        |_| true,
        SegmentTree::new(),
    )?;

    let pre = children_of
        .roots()
        .iter()
        .try_fold(SegmentTree::new(), |pre, &root| {
            copy_grouped_subtree_if(
                tree,
                &children_of,
                CopyStart::new(ParentId::Root, root),
                |node| node.id != at,
                pre,
            )
        })?;

    debug!(
        %at,
        size = tree.size(),
        pre = pre.size(),
        post = post.size(),
        "split segment tree"
    );
    Ok((pre, post))
}

/// Grafts `rhs`'s segment 0 and everything below it onto `lhs` under `at`.
///
/// `lhs` keeps its ids; the grafted segments are numbered after them in
/// depth-first order. An empty `rhs` leaves `lhs` unchanged. `lhs` is
/// consumed even when the join fails.
pub fn join_at(
    lhs: SegmentTree,
    at: ParentId,
    rhs: &SegmentTree,
) -> Result<SegmentTree, MorphError> {
    if let ParentId::Node(p) = at {
        if p.0 >= lhs.size() {
            return Err(MorphError::InvalidParent {
                parent: at,
                size: lhs.size(),
            });
        }
    }
    if rhs.is_empty() {
        return Ok(lhs);
    }

    let lhs_size = lhs.size();
    let joined = copy_grouped_subtree_if(
        rhs,
        &ChildGroups::new(rhs),
        CopyStart::new(at, SegmentId(0)),
        |_| true,
        lhs,
    )?;
    debug!(
        %at,
        lhs = lhs_size,
        rhs = rhs.size(),
        joined = joined.size(),
        "joined segment trees"
    );
    Ok(joined)
}

fn is_tag_root(pruned: &BitVec, parent: ParentId, id: SegmentId) -> bool {
    pruned[id.0] && parent.node().map_or(true, |p| !pruned[p.0])
}

/// Ids of every `tag` segment whose parent is a root or carries another tag,
/// ascending. These are the entry points of the maximal `tag` regions.
pub fn tag_roots(tree: &SegmentTree, tag: Tag) -> Vec<SegmentId> {
    let pruned: BitVec = tree.segments().iter().map(|s| s.tag == tag).collect();
    tree.parents()
        .iter()
        .enumerate()
        .map(|(i, &parent)| (SegmentId(i), parent))
        .filter(|&(id, parent)| is_tag_root(&pruned, parent, id))
        .map(|(id, _)| id)
        .collect()
}

/// Removes every segment tagged `tag`.
///
/// The surviving segments keep their relative order and get dense ids. The
/// second value lists the entry points of the removed regions in the ids of
/// the input tree, exactly as [`tag_roots`] would.
///
/// A kept segment whose parent is removed cannot be reattached, so that fails
/// with [`MorphError::UnprunedChild`].
pub fn prune_tag(
    tree: &SegmentTree,
    tag: Tag,
) -> Result<(SegmentTree, Vec<SegmentId>), MorphError> {
    let segments = tree.segments();
    let parents = tree.parents();
    let pruned: BitVec = segments.iter().map(|s| s.tag == tag).collect();

    // For each maximal run of pruned ids, the first id after it and the
    // number of ids pruned up to there. A kept id is shifted down by the
    // count of the last run ending at or before it.
    let mut run_ends = Vec::new();
    let mut run_offsets = Vec::new();
    let mut tag_roots = Vec::new();
    let mut num_pruned = 0;
    for (i, &parent) in parents.iter().enumerate() {
        if !pruned[i] {
            continue;
        }
        num_pruned += 1;
        if is_tag_root(&pruned, parent, SegmentId(i)) {
            tag_roots.push(SegmentId(i));
        }
        if i + 1 < segments.len() && !pruned[i + 1] {
            run_ends.push(i + 1);
            run_offsets.push(num_pruned);
        }
    }

    let mut out = SegmentTree::with_capacity(segments.len() - num_pruned);
    for (seg, &parent) in segments.iter().zip(parents) {
        if pruned[seg.id.0] {
            continue;
        }
        let parent = match parent {
            ParentId::Node(p) if pruned[p.0] => {
                return Err(MorphError::UnprunedChild {
                    parent: p,
                    child: seg.id,
                    tag,
                });
            }
            ParentId::Node(p) => {
                let run = run_ends.partition_point(|&end| end <= p.0);
                let shift = if run > 0 { run_offsets[run - 1] } else { 0 };
                ParentId::Node(SegmentId(p.0 - shift))
            }
            ParentId::Root => ParentId::Root,
        };
        out.append(parent, seg.prox, seg.dist, seg.tag)?;
    }

    debug!(
        tag,
        removed = num_pruned,
        kept = out.size(),
        regions = tag_roots.len(),
        "pruned segment tree"
    );
    Ok((out, tag_roots))
}
