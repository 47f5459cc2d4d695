//! Small, bundled graphs standing in for the reference's R-MAT generator,
//! which is out of scope here: deterministic inputs a reader can check by
//! hand, one per algorithm family.

use crate::message::VertexId;

/// A 4-cycle: 0-1-2-3-0. Used to exercise BFS.
pub fn four_cycle() -> Vec<(VertexId, VertexId)> {
    vec![(0, 1), (1, 2), (2, 3), (3, 0)]
}

/// A directed 3-vertex chain 0 -> 1 -> 2. Used to exercise PageRank: vertex 0
/// has no in-edges, so its steady-state rank is pure teleport mass.
pub fn directed_three_chain() -> Vec<(VertexId, VertexId)> {
    vec![(0, 1), (1, 2)]
}

/// Two disconnected triangles: {0,1,2} and {3,4,5}. Used to exercise
/// connected components.
pub fn two_triangles() -> Vec<(VertexId, VertexId)> {
    vec![(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)]
}

/// A weighted path 0-1-2-3 with distinct edge weights. Used to exercise
/// single-source shortest paths.
pub fn weighted_path() -> (Vec<(VertexId, VertexId)>, Vec<u32>) {
    (vec![(0, 1), (1, 2), (2, 3)], vec![4, 1, 7])
}

/// K4: the complete graph on {0,1,2,3}. Every 3-subset is a triangle; used
/// to exercise triangle counting.
pub fn k4() -> Vec<(VertexId, VertexId)> {
    vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
}
