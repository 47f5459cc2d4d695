//! End-to-end seed scenarios, one per algorithm family plus one protocol
//! fault injection, each checked against known-by-hand results.
//!
//! Grounded on `timely/tests/shape_scaling.rs`'s style of a small top-level
//! `tests/` integration file driving the library's public entry points
//! end-to-end, rather than unit-testing internals.

use gasfab::algorithms::{bfs, cc, pagerank, sssp, triangles};
use gasfab::config::{FabricConfig, LatencyModel};
use gasfab::graph::{Graph, Partition};
use gasfab::message::{Message, VertexEntry};
use gasfab::pe::PE;
use gasfab::{SimulationDriver, VertexProgram};
use gasfab_logging::Registry;

fn small_config() -> FabricConfig {
    FabricConfig {
        num_pe: 2,
        num_fpga: 2,
        num_channels: 4,
        max_vertices_per_pe: 16,
        latency_model: LatencyModel::Software,
        report: false,
    }
}

/// S1: BFS on the 4-vertex cycle 0-1-2-3-0 from root 0 reaches every vertex
/// within 4 supersteps, with vertex 2 (the cycle's antipode) settling to
/// distance 2 via either neighbor.
#[test]
fn s1_bfs_four_cycle_from_root_zero() {
    let graph = Graph::from_edges(&gasfab::fixtures::four_cycle());
    let mut registry = Registry::new();
    let mut driver: SimulationDriver<bfs::Bfs> = SimulationDriver::new(graph, small_config(), 0, &mut registry).unwrap();
    let report = driver.run().unwrap();

    assert_eq!(driver.vertex_data(0).unwrap().distance, 0);
    assert_eq!(driver.vertex_data(1).unwrap().distance, 1);
    assert_eq!(driver.vertex_data(3).unwrap().distance, 1);
    assert_eq!(driver.vertex_data(2).unwrap().distance, 2);
    assert!(report.supersteps <= 4, "expected convergence within 4 supersteps, got {}", report.supersteps);
}

/// S2: PageRank on a directed 3-vertex chain 0->1->2. Rank strictly
/// increases along the chain since each vertex inherits all of its
/// predecessor's rank on top of its own teleport mass.
#[test]
fn s2_pagerank_directed_chain_ranks_increase_along_chain() {
    let graph: Graph<()> = Graph::from_directed_edges_with(&gasfab::fixtures::directed_three_chain(), |_, _| ());
    let mut registry = Registry::new();
    let mut driver: SimulationDriver<pagerank::PageRank> = SimulationDriver::new(graph, small_config(), 0, &mut registry).unwrap();
    driver.run().unwrap();

    let r0 = driver.vertex_data(0).unwrap().rank;
    let r1 = driver.vertex_data(1).unwrap().rank;
    let r2 = driver.vertex_data(2).unwrap().rank;
    assert!(r0 < r1 && r1 < r2, "expected r0 < r1 < r2, got {r0} {r1} {r2}");
    assert!((r0 - 0.05).abs() < 1e-6, "source-with-no-in-edges rank should be pure teleport mass, got {r0}");
}

/// S3: CC on two disconnected triangles {0,1,2} and {3,4,5}. Final labels
/// are each triangle's minimum vertex id: 0 and 3.
#[test]
fn s3_connected_components_two_triangles() {
    let graph = Graph::from_edges(&gasfab::fixtures::two_triangles());
    let mut registry = Registry::new();
    let mut driver: SimulationDriver<cc::ConnectedComponents> = SimulationDriver::new(graph, small_config(), 0, &mut registry).unwrap();
    driver.run().unwrap();

    for v in [0, 1, 2] {
        assert_eq!(driver.vertex_data(v).unwrap().label, 0);
    }
    for v in [3, 4, 5] {
        assert_eq!(driver.vertex_data(v).unwrap().label, 3);
    }
}

/// S4: SSSP on the path 0-(3)-1-(1)-2 from source 0: dist = [0, 3, 4].
#[test]
fn s4_sssp_weighted_path() {
    let edges = vec![(0, 1), (1, 2)];
    let weights = vec![3u32, 1u32];
    let graph = sssp::build_graph(&edges, &weights);
    let mut registry = Registry::new();
    let mut driver: SimulationDriver<sssp::Sssp> = SimulationDriver::new(graph, small_config(), 0, &mut registry).unwrap();
    driver.run().unwrap();

    assert_eq!(driver.vertex_data(0).unwrap().distance, 0);
    assert_eq!(driver.vertex_data(1).unwrap().distance, 3);
    assert_eq!(driver.vertex_data(2).unwrap().distance, 4);
}

/// S5: triangle counting on K4 (vertices 0-3): total_triangles = 4 once
/// summed across every vertex's local count.
#[test]
fn s5_triangle_counting_k4_totals_four() {
    let config = small_config();
    let partition = Partition::new(config.num_pe, config.max_vertices_per_pe);
    let graph = triangles::build_graph(&gasfab::fixtures::k4(), &partition);
    let mut registry = Registry::new();
    let mut driver: SimulationDriver<triangles::TriangleCounting> = SimulationDriver::new(graph, config, 0, &mut registry).unwrap();
    driver.run().unwrap();

    let total: u64 = (0..4).map(|v| driver.vertex_data(v).unwrap().num_triangles).sum();
    assert_eq!(total, 4);
}

/// S6: protocol fault injection. A Message whose `roundpar` differs from the
/// PE's expected round by more than one must be rejected by the Apply
/// wrapper's protocol check rather than silently accepted.
#[test]
fn s6_protocol_violation_on_mismatched_roundpar_is_rejected() {
    let config = small_config();
    let partition = Partition::new(config.num_pe, config.max_vertices_per_pe);
    let graph = Graph::from_edges(&gasfab::fixtures::four_cycle());

    let mut vertices = vec![VertexEntry::new(0); config.max_vertices_per_pe as usize];
    for origin in 0..graph.num_vertices() as u64 {
        let global = partition.placement(origin);
        if partition.pe_id(global) != 0 {
            continue;
        }
        let local = partition.local_id(global) as usize;
        let mut entry = VertexEntry::new(global);
        bfs::Bfs::init_vertex(&mut entry, origin, &graph);
        vertices[local] = entry;
    }

    let mut pe: PE<bfs::Bfs> = PE::new(0, vertices, &config, None);
    let bogus = Message {
        sender: 0,
        dest_id: partition.placement(0),
        dest_pe: 0,
        dest_fpga: 0,
        // The PE starts at level 0, whose only valid round is `num_channels
        // - 1` (the "previous" round wrap); offsetting by 2 from that is a
        // clear violation rather than an off-by-one.
        roundpar: (config.num_channels + 1) % config.num_channels,
        barrier: false,
        timestamp: 0,
        payload: Some(0),
    };
    pe.put_message_to_receive(bogus);

    let result = pe.tick(&partition, &graph, &config);
    assert!(result.is_err(), "expected a protocol violation error for mismatched roundpar");
}

/// Round-trip/idempotence: running any algorithm with zero active vertices
/// at start still terminates (one barrier-drain cycle per PE), and reports
/// zero messages sent.
#[test]
fn zero_active_vertices_still_terminates() {
    let graph: Graph<()> = Graph::from_directed_edges_with(&[], |_, _| ());
    let mut registry = Registry::new();
    let mut driver: SimulationDriver<pagerank::PageRank> = SimulationDriver::new(graph, small_config(), 0, &mut registry).unwrap();
    let report = driver.run().unwrap();
    assert_eq!(report.num_messages_sent, 0);
}
