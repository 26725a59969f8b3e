use super::{ChildGroups, ParentId, Segment, SegmentTree};

/// Children of `cursor` sorted by geometry and tag.
fn fetch_children(
    cursor: ParentId,
    tree: &SegmentTree,
    children_of: &ChildGroups,
) -> Vec<Segment> {
    let mut segs: Vec<Segment> = children_of
        .of(cursor)
        .iter()
        .map(|id| tree.segments()[id.0])
        .collect();
    segs.sort_by(Segment::shape_cmp);
    segs
}

/// Whether `a` and `b` describe the same morphology, up to renumbering of
/// ids and reordering of siblings.
///
/// Both trees are walked in lockstep from their root sets. At every pair of
/// matched cursors the children are sorted by geometry and tag, compared
/// position by position, and paired up for the next round. Siblings with
/// identical geometry and tag are paired in id order.
pub fn equivalent(a: &SegmentTree, b: &SegmentTree) -> bool {
    if a.size() != b.size() {
        return false;
    }

    let a_children_of = ChildGroups::new(a);
    let b_children_of = ChildGroups::new(b);

    let mut todo = vec![(ParentId::Root, ParentId::Root)];
    while let Some((a_cursor, b_cursor)) = todo.pop() {
        let as_ = fetch_children(a_cursor, a, &a_children_of);
        let bs = fetch_children(b_cursor, b, &b_children_of);
        if as_.len() != bs.len() {
            return false;
        }
        for (l, r) in as_.iter().zip(&bs) {
            if !l.same_shape(r) {
                return false;
            }
            todo.push((l.id.into(), r.id.into()));
        }
    }
    true
}
