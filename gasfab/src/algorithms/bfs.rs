//! Breadth-first search: unweighted shortest hop-count from one source.
//!
//! Grounded on `original_source/sim/bfs/*`'s gather-min/apply-broadcast shape
//! (separate, non-fused gather and apply; the reference's edge data carries
//! no weight, so every relay step costs exactly one hop).

use crate::graph::{Graph, Partition};
use crate::message::{Message, Update, VertexEntry, VertexId};
use crate::vertex_program::VertexProgram;

/// A vertex's current best known distance from the source, or `u32::MAX`
/// while still unreached.
#[derive(Debug, Clone, Default)]
pub struct BfsData {
    pub distance: u32,
}

pub struct Bfs;

impl VertexProgram for Bfs {
    type VertexData = BfsData;
    type MessagePayload = u32;
    type UpdatePayload = u32;
    type EdgeData = ();

    fn init_vertex(entry: &mut VertexEntry<Self::VertexData>, _origin: VertexId, _graph: &Graph<Self::EdgeData>) {
        entry.data.distance = u32::MAX;
    }

    fn gather(msg: &Message<Self::MessagePayload>, entry: &mut VertexEntry<Self::VertexData>, _level: usize) {
        if let Some(candidate) = msg.payload {
            if candidate < entry.data.distance {
                entry.data.distance = candidate;
                entry.active = true;
            }
        }
    }

    fn apply(entry: &mut VertexEntry<Self::VertexData>, _level: usize) -> Option<Self::UpdatePayload> {
        Some(entry.data.distance)
    }

    fn scatter(update: &Update<Self::UpdatePayload>, _edge: &Self::EdgeData, _degree: usize) -> Option<Self::MessagePayload> {
        update.payload.map(|d| d.saturating_add(1))
    }

    fn send_init_messages(_graph: &Graph<Self::EdgeData>, _partition: &Partition, source: VertexId) -> Vec<(VertexId, Self::MessagePayload)> {
        vec![(source, 0)]
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
    fn four_cycle_distances_from_vertex_zero() {
        let graph: Graph<()> = Graph::from_edges(&fixtures::four_cycle());
        let mut config = FabricConfig::default();
        config.report = false;
        let mut registry = Registry::new();
        let mut driver: SimulationDriver<Bfs> = SimulationDriver::new(graph, config, 0, &mut registry).unwrap();
        driver.run().unwrap();

        assert_eq!(driver.vertex_data(0).unwrap().distance, 0);
        assert_eq!(driver.vertex_data(1).unwrap().distance, 1);
        assert_eq!(driver.vertex_data(2).unwrap().distance, 2);
        assert_eq!(driver.vertex_data(3).unwrap().distance, 1);
    }
}
