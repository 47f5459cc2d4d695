//! The two transport-unit shapes that flow through the fabric: [`Message`]
//! between PEs (via Arbiter/Network) and [`Update`] between ApplyKernel and
//! ScatterKernel inside one PE.
//!
//! The source carries several incompatible variants of both shapes (some
//! missing `dest_fpga`, some missing `timestamp`). This is the one canonical
//! shape, each including `dest_pe`/`dest_fpga`/`timestamp` as required by the
//! open questions in the design notes.

/// A global vertex identifier: `(pe_id << PEID_SHIFT) | local_index`.
pub type VertexId = u64;

/// One transport unit, carried PE-to-PE through the Arbiter and Network.
#[derive(Debug, Clone)]
pub struct Message<P> {
    pub sender: VertexId,
    /// The destination vertex id, or, when `barrier` is set, a literal count
    /// of non-barrier messages the sender has emitted to this destination.
    pub dest_id: u64,
    pub dest_pe: usize,
    pub dest_fpga: usize,
    pub roundpar: usize,
    pub barrier: bool,
    pub timestamp: u64,
    pub payload: Option<P>,
}

/// One ApplyKernel output, carried from Apply to Scatter inside a single PE.
#[derive(Debug, Clone)]
pub struct Update<P> {
    pub sender: VertexId,
    pub roundpar: usize,
    pub barrier: bool,
    pub timestamp: u64,
    pub payload: Option<P>,
}

/// One per-local-slot vertex record, owned by a PE's ApplyKernel.
#[derive(Debug, Clone)]
pub struct VertexEntry<D> {
    pub global_id: VertexId,
    /// Mutual-exclusion token: set while a gather is in flight for this vertex.
    pub in_use: bool,
    /// Whether this vertex participates in the next apply sweep.
    pub active: bool,
    pub data: D,
}

impl<D: Default> VertexEntry<D> {
    pub fn new(global_id: VertexId) -> Self {
        VertexEntry {
            global_id,
            in_use: false,
            active: false,
            data: D::default(),
        }
    }
}
