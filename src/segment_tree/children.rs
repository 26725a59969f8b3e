use super::{ParentId, SegmentId, SegmentTree, SegmentVec};

/// Parent-to-children adjacency of a [`SegmentTree`].
///
/// Children of every segment are stored contiguously in one arena, ordered
/// by ascending id. Roots are kept in their own list. Since ids are visited in
/// order while grouping, each group comes out sorted without a separate sort.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildGroups {
    roots: Vec<SegmentId>,
    /// `children[offsets[i]..offsets[i + 1]]` are the children of segment `i`.
    offsets: Vec<usize>,
    children: Vec<SegmentId>,
}

impl ChildGroups {
    pub fn new(tree: &SegmentTree) -> Self {
        let n = tree.size();
        let mut offsets = vec![0; n + 1];
        for p in tree.parents().iter().filter_map(ParentId::node) {
            offsets[p.0 + 1] += 1;
        }
        for i in 0..n {
            offsets[i + 1] += offsets[i];
        }

        let mut roots = Vec::new();
        let mut children = vec![SegmentId(0); offsets[n]];
        let mut fill: SegmentVec<usize> = offsets[..n].to_vec().into();
        for (id, parent) in tree.parents().iter().enumerate() {
            match parent {
                ParentId::Root => roots.push(SegmentId(id)),
                ParentId::Node(p) => {
                    children[fill[*p]] = SegmentId(id);
                    fill[*p] += 1;
                }
            }
        }

        ChildGroups {
            roots,
            offsets,
            children,
        }
    }

    /// Children of `parent`; for [`ParentId::Root`] these are the roots.
    ///
    /// Ids outside the grouped tree have no children.
    pub fn of(&self, parent: ParentId) -> &[SegmentId] {
        match parent {
            ParentId::Root => &self.roots,
            ParentId::Node(p) if p.0 + 1 < self.offsets.len() => {
                &self.children[self.offsets[p.0]..self.offsets[p.0 + 1]]
            }
            ParentId::Node(_) => &[],
        }
    }

    pub fn roots(&self) -> &[SegmentId] {
        &self.roots
    }
}

#[cfg(test)]
mod test {
    use crate::geometry::Point;

    use super::*;

    #[test]
    fn groups_are_sorted_and_complete() {
        let p = Point::new(0.0, 0.0, 0.0, 1.0);
        let mut tree = SegmentTree::new();
        let a = tree.append(ParentId::Root, p, p, 1).unwrap();
        let b = tree.append(a.into(), p, p, 1).unwrap();
        let c = tree.append(ParentId::Root, p, p, 1).unwrap();
        let d = tree.append(a.into(), p, p, 1).unwrap();
        let e = tree.append(b.into(), p, p, 1).unwrap();
        let f = tree.append(a.into(), p, p, 1).unwrap();

        let groups = ChildGroups::new(&tree);
        assert_eq!(groups.roots(), &[a, c]);
        assert_eq!(groups.of(ParentId::Root), &[a, c]);
        assert_eq!(groups.of(a.into()), &[b, d, f]);
        assert_eq!(groups.of(b.into()), &[e]);
        assert!(groups.of(c.into()).is_empty());
        assert!(groups.of(SegmentId(100).into()).is_empty());
    }

    #[test]
    fn empty_tree_has_no_groups() {
        let groups = ChildGroups::new(&SegmentTree::new());
        assert!(groups.of(ParentId::Root).is_empty());
        assert!(groups.of(SegmentId(0).into()).is_empty());
    }
}
