//! The segment tree: an append-only forest of labelled line segments.
//!
//! Segments are stored in id order alongside a parallel array of parent links
//! and a per-segment child count. Ids are handed out densely by
//! [`SegmentTree::append`] and a parent always has a smaller id than its
//! children, so every algorithm here can get away with single forward passes.
//!
//! Nothing is ever removed from a tree. Removing or reordering segments is
//! expressed as building a new tree with [`copy::copy_subtree_if`], which is
//! what [`split_at`], [`join_at`] and friends do.

use std::fmt::Display;

use itertools::Itertools;
use thiserror::Error;

use crate::geometry::{Isometry, Point};

pub mod children;
pub mod copy;
pub mod equivalence;
pub mod surgery;

pub use children::ChildGroups;
pub use copy::{copy_subtree_if, CopyStart};
pub use equivalence::equivalent;
pub use surgery::{join_at, prune_tag, split_at, tag_roots};

crate::define_indexed_vec!(
    /// Position of a segment in its [`SegmentTree`].
    #[derive(derive_more::Display)]
    pub struct SegmentId;

    /// A vector indexed by [`SegmentId`].
    pub struct SegmentVec;
);

/// Opaque region label carried by a segment (soma, axon, dendrite, ...).
pub type Tag = i32;

/// The parent of a segment, or the lack of one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub enum ParentId {
    #[default]
    Root,
    Node(SegmentId),
}

impl ParentId {
    pub fn is_root(&self) -> bool {
        matches!(self, ParentId::Root)
    }

    pub fn is_node(&self) -> bool {
        !self.is_root()
    }

    pub fn node(&self) -> Option<SegmentId> {
        match self {
            ParentId::Root => None,
            ParentId::Node(id) => Some(*id),
        }
    }
}

impl From<SegmentId> for ParentId {
    fn from(id: SegmentId) -> Self {
        ParentId::Node(id)
    }
}

impl From<Option<SegmentId>> for ParentId {
    fn from(id: Option<SegmentId>) -> Self {
        id.map_or(ParentId::Root, ParentId::Node)
    }
}

impl From<ParentId> for Option<SegmentId> {
    fn from(p: ParentId) -> Self {
        p.node()
    }
}

impl Display for ParentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParentId::Root => write!(f, "npos"),
            ParentId::Node(id) => write!(f, "{id}"),
        }
    }
}

/// A labelled line segment from `prox` to `dist`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct Segment {
    pub id: SegmentId,
    pub prox: Point,
    pub dist: Point,
    pub tag: Tag,
}

impl Segment {
    /// Total order over `(prox, dist, tag)`, ignoring the id.
    pub fn shape_cmp(&self, other: &Segment) -> std::cmp::Ordering {
        self.prox
            .total_cmp(&other.prox)
            .then_with(|| self.dist.total_cmp(&other.dist))
            .then_with(|| self.tag.cmp(&other.tag))
    }

    /// Equality of geometry and tag, ignoring the id.
    pub fn same_shape(&self, other: &Segment) -> bool {
        self.prox == other.prox && self.dist == other.dist && self.tag == other.tag
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(segment {} {} {} {})",
            self.id, self.prox, self.dist, self.tag
        )
    }
}

/// Number of children hanging off a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct ChildCount(usize);

impl ChildCount {
    fn increment(&mut self) {
        self.0 += 1;
    }

    pub fn count(&self) -> usize {
        self.0
    }

    pub fn is_fork(&self) -> bool {
        self.0 > 1
    }

    pub fn is_terminal(&self) -> bool {
        self.0 == 0
    }
}

/// Errors raised by segment tree construction, queries and surgery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MorphError {
    #[error("invalid parent {parent} for a segment tree of size {size}")]
    InvalidParent { parent: ParentId, size: usize },
    #[error("no such segment: {0}")]
    NoSuchSegment(SegmentId),
    #[error("segment {child} would be orphaned: its parent {parent} carries pruned tag {tag}")]
    UnprunedChild {
        parent: SegmentId,
        child: SegmentId,
        tag: Tag,
    },
    #[error("corrupt segment tree: {0}")]
    Corrupt(String),
}

/// An append-only forest of segments with dense ids.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bincode", derive(bincode::Encode, bincode::Decode))]
pub struct SegmentTree {
    segments: SegmentVec<Segment>,
    parents: SegmentVec<ParentId>,
    children: SegmentVec<ChildCount>,
}

impl SegmentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        SegmentTree {
            segments: SegmentVec::with_capacity(n),
            parents: SegmentVec::with_capacity(n),
            children: SegmentVec::with_capacity(n),
        }
    }

    /// Capacity hint, no effect on the contents.
    pub fn reserve(&mut self, n: usize) {
        self.segments.reserve(n);
        self.parents.reserve(n);
        self.children.reserve(n);
    }

    fn check_parent(&self, parent: ParentId) -> Result<(), MorphError> {
        match parent {
            ParentId::Node(p) if !self.segments.contains_index(p) => {
                Err(MorphError::InvalidParent {
                    parent,
                    size: self.size(),
                })
            }
            _ => Ok(()),
        }
    }

    fn check_segment(&self, id: SegmentId) -> Result<(), MorphError> {
        if self.segments.contains_index(id) {
            Ok(())
        } else {
            Err(MorphError::NoSuchSegment(id))
        }
    }

    /// Appends a segment under `parent` and returns its id.
    ///
    /// `parent` must be [`ParentId::Root`] or an existing segment.
    pub fn append(
        &mut self,
        parent: ParentId,
        prox: Point,
        dist: Point,
        tag: Tag,
    ) -> Result<SegmentId, MorphError> {
        self.check_parent(parent)?;

        let id = self.segments.push(Segment {
            id: self.segments.next_index(),
            prox,
            dist,
            tag,
        });
        self.parents.push(parent);
        self.children.push(ChildCount::default());
        if let ParentId::Node(p) = parent {
            self.children[p].increment();
        }
        Ok(id)
    }

    /// Extends the branch ending at `parent`: the new segment starts where
    /// the parent ends. A root has no such point, so `parent` must be a node.
    pub fn extend_branch(
        &mut self,
        parent: ParentId,
        dist: Point,
        tag: Tag,
    ) -> Result<SegmentId, MorphError> {
        let Some(p) = parent.node().filter(|p| self.segments.contains_index(*p)) else {
            return Err(MorphError::InvalidParent {
                parent,
                size: self.size(),
            });
        };
        let prox = self.segments[p].dist;
        self.append(parent, prox, dist, tag)
    }

    pub fn size(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        self.segments.as_slice()
    }

    pub fn parents(&self) -> &[ParentId] {
        self.parents.as_slice()
    }

    pub fn segment(&self, id: SegmentId) -> Result<&Segment, MorphError> {
        self.check_segment(id)?;
        Ok(&self.segments[id])
    }

    pub fn parent(&self, id: SegmentId) -> Result<ParentId, MorphError> {
        self.check_segment(id)?;
        Ok(self.parents[id])
    }

    pub fn child_count(&self, id: SegmentId) -> Result<usize, MorphError> {
        self.check_segment(id)?;
        Ok(self.children[id].count())
    }

    pub fn is_root(&self, id: SegmentId) -> Result<bool, MorphError> {
        Ok(self.parent(id)?.is_root())
    }

    pub fn is_fork(&self, id: SegmentId) -> Result<bool, MorphError> {
        self.check_segment(id)?;
        Ok(self.children[id].is_fork())
    }

    pub fn is_terminal(&self, id: SegmentId) -> Result<bool, MorphError> {
        self.check_segment(id)?;
        Ok(self.children[id].is_terminal())
    }

    /// Ids of all root segments, ascending.
    pub fn roots(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.parents
            .iter()
            .filter(|(_, p)| p.is_root())
            .map(|(id, _)| id)
    }

    /// Copy of this tree with every point pushed through `iso`.
    pub fn transformed(&self, iso: &impl Isometry) -> SegmentTree {
        let mut result = self.clone();
        for (_, seg) in result.segments.iter_mut() {
            seg.prox = iso.apply(seg.prox);
            seg.dist = iso.apply(seg.dist);
        }
        result
    }

    /// Checks dense ids, parent-before-child ordering and that the child
    /// counts agree with a recount from the parent links.
    pub fn validate(&self) -> Result<(), MorphError> {
        if self.parents.len() != self.size() || self.children.len() != self.size() {
            return Err(MorphError::Corrupt(format!(
                "{} segments, {} parents, {} child counts",
                self.size(),
                self.parents.len(),
                self.children.len()
            )));
        }

        let mut recount: SegmentVec<ChildCount> =
            self.segments.indices().map(|_| ChildCount::default()).collect();

        for (id, seg) in self.segments.iter() {
            if seg.id != id {
                return Err(MorphError::Corrupt(format!(
                    "segment at {id} carries id {}",
                    seg.id
                )));
            }
            if let ParentId::Node(p) = self.parents[id] {
                if p >= id {
                    return Err(MorphError::Corrupt(format!(
                        "segment {id} has parent {p}, which does not precede it"
                    )));
                }
                recount[p].increment();
            }
        }

        if let Some((id, _)) = recount
            .iter()
            .find(|(id, count)| self.children[*id] != **count)
        {
            return Err(MorphError::Corrupt(format!(
                "segment {id} records {} children but has {}",
                self.children[id].count(),
                recount[id].count()
            )));
        }
        Ok(())
    }
}

impl Display for SegmentTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let one_line = self.size() < 2;
        let segments = self.segments().iter().join("\n  ");
        let parents = self.parents().iter().join(" ");
        if one_line {
            write!(f, "(segment_tree ({segments}) ({parents}))")
        } else {
            write!(f, "(segment_tree (\n  {segments})\n  ({parents}))")
        }
    }
}

/// Copy of `tree` with every point pushed through `iso`.
pub fn apply(tree: &SegmentTree, iso: &impl Isometry) -> SegmentTree {
    tree.transformed(iso)
}
