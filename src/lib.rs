//! # Morphtree
//!
//! Morphtree models the branching morphology of a cell (a neuron, say) as a
//! forest of labelled line segments, and provides the surgery needed to work
//! with such descriptions: splitting a tree at a segment, grafting one tree
//! onto another, removing labelled regions, comparing trees up to reordering
//! and moving them around rigidly in space.
//!
//! The central type is [`segment_tree::SegmentTree`]. It is append-only:
//! every surgery operation builds a fresh tree (or extends a tree the caller
//! hands over by value) instead of editing one in place, so ids always stay
//! dense and parents always precede their children.

pub mod geometry;
pub mod segment_tree;
pub mod typed_vec;

pub use geometry::{Isometry, Point, RigidTransform};
pub use segment_tree::{
    apply, equivalent, join_at, prune_tag, split_at, tag_roots, MorphError, ParentId, Segment,
    SegmentId, SegmentTree, Tag,
};
