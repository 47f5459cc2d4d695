//! PageRank over directed edges, run for a fixed number of supersteps.
//!
//! Grounded on `original_source/sim/pgrk/*`'s accumulate-then-apply shape.
//! The reference schedules a host-side outer loop over a configured
//! iteration count; here that loop lives inside the algorithm itself:
//! `init_vertex` marks every vertex active so the first barrier sweeps the
//! whole graph without any seeded message, and `apply` re-arms `entry.active`
//! directly as long as `level` hasn't reached [`MAX_ITERATIONS`] yet, so the
//! fabric keeps rebroadcasting on its own and only goes quiescent once the
//! fixed iteration budget is spent.

use crate::graph::{Graph, Partition};
use crate::message::{Message, Update, VertexEntry, VertexId};
use crate::vertex_program::VertexProgram;

const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct PageRankData {
    pub rank: f64,
    accum: f64,
    num_vertices: usize,
}

pub struct PageRank;

impl VertexProgram for PageRank {
    type VertexData = PageRankData;
    type MessagePayload = f64;
    type UpdatePayload = f64;
    type EdgeData = ();

    fn init_vertex(entry: &mut VertexEntry<Self::VertexData>, _origin: VertexId, graph: &Graph<Self::EdgeData>) {
        let n = graph.num_vertices().max(1);
        entry.data.num_vertices = n;
        entry.data.rank = 1.0 / n as f64;
        entry.data.accum = 0.0;
        entry.active = true;
    }

    fn gather(msg: &Message<Self::MessagePayload>, entry: &mut VertexEntry<Self::VertexData>, _level: usize) {
        if let Some(contribution) = msg.payload {
            entry.data.accum += contribution;
        }
    }

    fn apply(entry: &mut VertexEntry<Self::VertexData>, level: usize) -> Option<Self::UpdatePayload> {
        let n = entry.data.num_vertices as f64;
        entry.data.rank = (1.0 - DAMPING) / n + DAMPING * entry.data.accum;
        entry.data.accum = 0.0;
        if level < MAX_ITERATIONS {
            entry.active = true;
            Some(entry.data.rank)
        } else {
            None
        }
    }

    fn scatter(update: &Update<Self::UpdatePayload>, _edge: &Self::EdgeData, degree: usize) -> Option<Self::MessagePayload> {
        if degree == 0 {
            // A dangling vertex's rank mass is dropped rather than
            // redistributed uniformly; acceptable for the fixed, small
            // fixtures this simulator runs.
            return None;
        }
        update.payload.map(|rank| rank / degree as f64)
    }

    fn send_init_messages(_graph: &Graph<Self::EdgeData>, _partition: &Partition, _source: VertexId) -> Vec<(VertexId, Self::MessagePayload)> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FabricConfig;
    use crate::driver::SimulationDriver;
    use crate::fixtures;
    use gasfab_logging::Registry;

    #[test]
    fn directed_chain_sink_outranks_the_source() {
        let graph: Graph<()> = Graph::from_directed_edges_with(&fixtures::directed_three_chain(), |_, _| ());
        let mut config = FabricConfig::default();
        config.report = false;
        let mut registry = Registry::new();
        let mut driver: SimulationDriver<PageRank> = SimulationDriver::new(graph, config, 0, &mut registry).unwrap();
        driver.run().unwrap();

        let rank = |v: VertexId| driver.vertex_data(v).unwrap().rank;
        assert!(rank(2) > rank(1));
        assert!(rank(1) > rank(0));
        let total: f64 = (0..3).map(rank).sum();
        assert!(total > 0.0 && total <= 1.0001);
    }
}
