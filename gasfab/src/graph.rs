//! CSR graph storage and the vertex-id ↔ (PE, local index) mapping.
//!
//! Grounded on `sim/core/graph.cpp` (degree counting, prefix sum, edge
//! scatter, sort-and-dedupe) and `sim/core/graph_partition.cpp` (the
//! round-robin placement formula). The original builds its CSR arrays with a
//! literal stride-two C array to tolerate parallel insertion; we don't need
//! that tolerance here (graph construction is single-threaded), so the same
//! contract — tight offsets, deduped sorted neighbors, self-loops dropped —
//! is built by collecting into per-vertex `Vec`s first and flattening once.

use crate::message::VertexId;

/// Maps global vertex ids to `(pe, local)` slots and back.
///
/// `global = v + 1; pe = global mod num_pe; local = global div num_pe`,
/// reserving global id 0 (pe 0, local 0) as an invalid sentinel so every
/// component can detect an unset destination field. `NODEID_MASK` and
/// `PEID_SHIFT` are derived once from `max_vertices_per_pe`.
#[derive(Debug, Clone)]
pub struct Partition {
    pub num_pe: usize,
    pub max_vertices_per_pe: u64,
    pub node_id_mask: u64,
    pub pe_id_shift: u32,
}

impl Partition {
    pub fn new(num_pe: usize, max_vertices_per_pe: u64) -> Self {
        let pe_id_shift = ceil_log2(max_vertices_per_pe);
        let node_id_mask = if pe_id_shift >= 64 { u64::MAX } else { (1u64 << pe_id_shift) - 1 };
        Partition { num_pe, max_vertices_per_pe, node_id_mask, pe_id_shift }
    }

    pub fn pe_id(&self, global: VertexId) -> usize {
        (global >> self.pe_id_shift) as usize
    }

    pub fn local_id(&self, global: VertexId) -> u64 {
        global & self.node_id_mask
    }

    /// Round-robin placement of an original (0-based, contiguous) vertex
    /// number onto a global id.
    pub fn placement(&self, origin_vertex: VertexId) -> VertexId {
        let shifted = origin_vertex + 1;
        let pe = shifted % self.num_pe as u64;
        let local = shifted / self.num_pe as u64;
        (pe << self.pe_id_shift) | local
    }

    /// Inverse of [`Partition::placement`]: recovers the original vertex
    /// number from a `(pe, local)` slot. Negative results mark unused slots.
    pub fn origin(&self, pe: usize, local: u64) -> i64 {
        let shifted = local * self.num_pe as u64 + pe as u64;
        shifted as i64 - 1
    }

    /// `origin` of a global id, i.e. `origin(pe_id(global), local_id(global))`.
    pub fn origin_of(&self, global: VertexId) -> i64 {
        self.origin(self.pe_id(global), self.local_id(global))
    }
}

fn ceil_log2(n: u64) -> u32 {
    if n <= 1 {
        0
    } else {
        64 - (n - 1).leading_zeros()
    }
}

/// CSR adjacency over 0-based, contiguous "origin" vertex numbers (i.e. the
/// numbers a [`Partition`] maps to/from, independent of any placement).
#[derive(Debug, Clone)]
pub struct Graph<E> {
    num_vertices: usize,
    offsets: Vec<usize>,
    adjacency: Vec<(VertexId, E)>,
}

impl<E: Clone> Graph<E> {
    /// The out-neighbors (and associated edge data) of `origin`, empty for an
    /// out-of-range or negative (invalid-slot) origin.
    pub fn neighbors(&self, origin: i64) -> &[(VertexId, E)] {
        if origin < 0 || origin as usize >= self.num_vertices {
            return &[];
        }
        let v = origin as usize;
        &self.adjacency[self.offsets[v]..self.offsets[v + 1]]
    }

    pub fn degree(&self, origin: i64) -> usize {
        self.neighbors(origin).len()
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// Builds CSR storage from an edge list, scattering both directions of
    /// every edge (undirected), dropping self-loops, and deduping each
    /// vertex's adjacency list.
    ///
    /// `make_edge_data` is called once per directed arc, as `(a, b)` for the
    /// `a -> b` entry and `(b, a)` for the `b -> a` entry, so direction-
    /// dependent data (e.g. the far endpoint's degree) can differ between the
    /// two. Symmetric uses (an edge weight that doesn't depend on which
    /// endpoint is asking) can ignore the argument order entirely.
    pub fn from_edges_with(
        edges: &[(VertexId, VertexId)],
        mut make_edge_data: impl FnMut(VertexId, VertexId) -> E,
    ) -> Self {
        let num_vertices = edges
            .iter()
            .flat_map(|&(a, b)| [a, b])
            .max()
            .map(|m| m as usize + 1)
            .unwrap_or(0);

        let mut adj: Vec<Vec<(VertexId, E)>> = vec![Vec::new(); num_vertices];
        for &(a, b) in edges {
            if a == b {
                continue;
            }
            adj[a as usize].push((b, make_edge_data(a, b)));
            adj[b as usize].push((a, make_edge_data(b, a)));
        }
        for list in adj.iter_mut() {
            list.sort_unstable_by_key(|&(n, _)| n);
            list.dedup_by_key(|&mut (n, _)| n);
        }

        let mut offsets = Vec::with_capacity(num_vertices + 1);
        let mut adjacency = Vec::new();
        offsets.push(0);
        for list in adj {
            adjacency.extend(list);
            offsets.push(adjacency.len());
        }

        Graph { num_vertices, offsets, adjacency }
    }

    /// Builds CSR storage treating `edges` as already directed: each `(a, b)`
    /// produces only an `a -> b` adjacency entry.
    ///
    /// The core CSR ingestion pipeline (`from_edge_file` below) always
    /// symmetrizes, matching the graph-file format's undirected contract. But
    /// standard PageRank is defined over directed out-edges, and accumulating
    /// teleport mass only along true out-edges is what its seed scenario
    /// exercises — so PageRank graphs are built through this constructor
    /// instead of the symmetrizing one.
    pub fn from_directed_edges_with(
        edges: &[(VertexId, VertexId)],
        mut make_edge_data: impl FnMut(VertexId, VertexId) -> E,
    ) -> Self {
        let num_vertices = edges
            .iter()
            .flat_map(|&(a, b)| [a, b])
            .max()
            .map(|m| m as usize + 1)
            .unwrap_or(0);

        let mut adj: Vec<Vec<(VertexId, E)>> = vec![Vec::new(); num_vertices];
        for &(a, b) in edges {
            if a == b {
                continue;
            }
            adj[a as usize].push((b, make_edge_data(a, b)));
        }
        for list in adj.iter_mut() {
            list.sort_unstable_by_key(|&(n, _)| n);
            list.dedup_by_key(|&mut (n, _)| n);
        }

        let mut offsets = Vec::with_capacity(num_vertices + 1);
        let mut adjacency = Vec::new();
        offsets.push(0);
        for list in adj {
            adjacency.extend(list);
            offsets.push(adjacency.len());
        }

        Graph { num_vertices, offsets, adjacency }
    }
}

impl<E: Clone + Default> Graph<E> {
    pub fn from_edges(edges: &[(VertexId, VertexId)]) -> Self {
        Self::from_edges_with(edges, |_, _| E::default())
    }

    /// Reads the packed little-endian `(i64, i64)` edge stream used by the
    /// on-disk graph format: `num_edges` pairs of signed 64-bit integers.
    /// Self-loops are dropped and every edge is treated as undirected.
    pub fn from_edge_file(path: &std::path::Path, num_edges: usize) -> Result<Self, crate::error::SimError> {
        Ok(Self::from_edges(&read_edge_file(path, num_edges)?))
    }
}

/// Reads the packed little-endian `(i64, i64)` edge stream used by the
/// on-disk graph format: `num_edges` pairs of signed 64-bit integers.
/// Exposed separately from [`Graph::from_edge_file`] for algorithms that
/// need the raw edge list to attach their own per-edge data (e.g. SSSP's
/// randomly drawn weights) rather than `E::default()`.
pub fn read_edge_file(path: &std::path::Path, num_edges: usize) -> Result<Vec<(VertexId, VertexId)>, crate::error::SimError> {
    use std::io::Read;
    let mut file = std::fs::File::open(path)?;
    let mut buf = vec![0u8; num_edges * 16];
    file.read_exact(&mut buf)?;

    let mut edges = Vec::with_capacity(num_edges);
    for chunk in buf.chunks_exact(16) {
        let a = i64::from_le_bytes(chunk[0..8].try_into().unwrap());
        let b = i64::from_le_bytes(chunk[8..16].try_into().unwrap());
        if a < 0 || b < 0 {
            return Err(crate::error::SimError::GraphShape(format!(
                "negative vertex id in edge ({a}, {b})"
            )));
        }
        edges.push((a as VertexId, b as VertexId));
    }
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_reserves_global_zero() {
        let partition = Partition::new(4, 16);
        // Vertex 0 lands on (pe=1, local=0), not (pe=0, local=0).
        let id = partition.placement(0);
        assert_eq!(partition.pe_id(id), 1);
        assert_eq!(partition.local_id(id), 0);
        assert_ne!(id, 0);
    }

    #[test]
    fn placement_and_origin_are_inverse() {
        let partition = Partition::new(4, 64);
        for v in 0..40u64 {
            let id = partition.placement(v);
            assert_eq!(partition.origin_of(id), v as i64);
        }
    }

    #[test]
    fn undirected_csr_is_symmetric_and_self_loop_free() {
        let g: Graph<()> = Graph::from_edges(&[(0, 1), (1, 2), (2, 2), (2, 0)]);
        assert_eq!(g.degree(0), 2);
        assert_eq!(g.degree(1), 2);
        assert_eq!(g.degree(2), 2);
        let mut n0: Vec<_> = g.neighbors(0).iter().map(|&(v, _)| v).collect();
        n0.sort();
        assert_eq!(n0, vec![1, 2]);
    }

    #[test]
    fn directed_csr_keeps_single_direction() {
        let g: Graph<()> = Graph::from_directed_edges_with(&[(0, 1), (1, 2)], |_, _| ());
        assert_eq!(g.degree(0), 1);
        assert_eq!(g.degree(1), 1);
        assert_eq!(g.degree(2), 0);
    }
}
