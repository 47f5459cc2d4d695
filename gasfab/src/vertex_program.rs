//! The algorithm plug-in interface.
//!
//! Per the design notes' "polymorphism over algorithms": the reference uses
//! class inheritance plus a macro-parameterized hardware class; here one
//! trait stands in for the whole family, and `ApplyKernel<P: VertexProgram>`
//! / `ScatterKernel<P: VertexProgram>` are generic over it — monomorphized
//! per algorithm at build time, with no dynamic dispatch anywhere on the
//! per-message hot path.

use crate::graph::{Graph, Partition};
use crate::message::{Message, Update, VertexEntry, VertexId};

/// An algorithm's gather/apply/scatter kernels, plus its one-shot setup hooks.
///
/// Algorithms hold no protocol state of their own; they read and write only
/// `VertexData`, `MessagePayload`, and `UpdatePayload`.
pub trait VertexProgram {
    type VertexData: Clone + Default;
    type MessagePayload: Clone;
    type UpdatePayload: Clone;
    type EdgeData: Clone + Default;

    /// When true, `gather_apply_fused` replaces `gather` entirely and the
    /// generic active-sweep/barrier-apply path is not used: every incoming
    /// message produces an immediate, optional `Update` of its own. Used by
    /// triangle counting's two-hop relay.
    const FUSED_GATHER_APPLY: bool = false;

    /// One-shot initialization of a vertex at PE construction time.
    fn init_vertex(entry: &mut VertexEntry<Self::VertexData>, origin: VertexId, graph: &Graph<Self::EdgeData>);

    /// Folds one incoming Message into vertex state. May set `entry.active`.
    fn gather(msg: &Message<Self::MessagePayload>, entry: &mut VertexEntry<Self::VertexData>, level: usize);

    /// Produces at most one Update per vertex per superstep; must reset any
    /// accumulator state it consumes.
    fn apply(entry: &mut VertexEntry<Self::VertexData>, level: usize) -> Option<Self::UpdatePayload>;

    /// Produces at most one Message per out-edge per update; may suppress for
    /// edge predicates (e.g. degree ordering in triangle counting).
    fn scatter(update: &Update<Self::UpdatePayload>, edge: &Self::EdgeData, degree: usize) -> Option<Self::MessagePayload>;

    /// Fused gather+apply, used only when `FUSED_GATHER_APPLY` is true.
    #[allow(unused_variables)]
    fn gather_apply_fused(
        msg: &Message<Self::MessagePayload>,
        entry: &mut VertexEntry<Self::VertexData>,
        level: usize,
    ) -> Option<Self::UpdatePayload> {
        None
    }

    /// Seeds the messages a host would inject before superstep 0.
    fn send_init_messages(
        graph: &Graph<Self::EdgeData>,
        partition: &Partition,
        source: VertexId,
    ) -> Vec<(VertexId, Self::MessagePayload)>;
}
