//! Connected components via minimum-label propagation.
//!
//! Grounded on `original_source/sim/ccs/*`: every vertex starts labeled with
//! its own id and active; `gather` adopts a smaller incoming label and
//! reactivates, `apply` simply re-broadcasts whatever label a vertex was just
//! swept in with (which is only ever a label that just got smaller). Not
//! fused: gather and apply are genuinely separate passes, unlike triangle
//! counting.

use crate::graph::{Graph, Partition};
use crate::message::{Message, Update, VertexEntry, VertexId};
use crate::vertex_program::VertexProgram;

#[derive(Debug, Clone, Default)]
pub struct CcData {
    pub label: u64,
}

pub struct ConnectedComponents;

impl VertexProgram for ConnectedComponents {
    type VertexData = CcData;
    type MessagePayload = u64;
    type UpdatePayload = u64;
    type EdgeData = ();

    fn init_vertex(entry: &mut VertexEntry<Self::VertexData>, origin: VertexId, _graph: &Graph<Self::EdgeData>) {
        entry.data.label = origin;
        entry.active = true;
    }

    fn gather(msg: &Message<Self::MessagePayload>, entry: &mut VertexEntry<Self::VertexData>, _level: usize) {
        if let Some(label) = msg.payload {
            if label < entry.data.label {
                entry.data.label = label;
                entry.active = true;
            }
        }
    }

    fn apply(entry: &mut VertexEntry<Self::VertexData>, _level: usize) -> Option<Self::UpdatePayload> {
        Some(entry.data.label)
    }

    fn scatter(update: &Update<Self::UpdatePayload>, _edge: &Self::EdgeData, _degree: usize) -> Option<Self::MessagePayload> {
        update.payload
    }

    fn send_init_messages(_graph: &Graph<Self::EdgeData>, _partition: &Partition, _source: VertexId) -> Vec<(VertexId, Self::MessagePayload)> {
        // Every vertex starts active via `init_vertex`; the first barrier
        // sweep broadcasts each vertex's own label without needing a
        // host-injected message.
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
    fn two_triangles_form_two_components() {
        let graph: Graph<()> = Graph::from_edges(&fixtures::two_triangles());
        let mut config = FabricConfig::default();
        config.report = false;
        let mut registry = Registry::new();
        let mut driver: SimulationDriver<ConnectedComponents> = SimulationDriver::new(graph, config, 0, &mut registry).unwrap();
        driver.run().unwrap();

        let label = |v: VertexId| driver.vertex_data(v).unwrap().label;
        assert_eq!(label(0), 0);
        assert_eq!(label(1), 0);
        assert_eq!(label(2), 0);
        assert_eq!(label(3), 3);
        assert_eq!(label(4), 3);
        assert_eq!(label(5), 3);
    }
}
