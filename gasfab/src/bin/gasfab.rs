//! The `gasfab` CLI: parses fabric shape and algorithm choice, builds (or
//! loads) a graph, runs the simulation to quiescence, and reports the final
//! counters.
//!
//! Grounded on `sim/sim_main.cpp`'s `main` (parse argv, build the graph,
//! construct the simulator, run, print summary, exit) recast atop
//! [`gasfab::config::CliOptions::from_args`] the way the teacher's own
//! `timely::execute::execute_from_args` wraps `Configuration::from_args`.

use std::path::Path;
use std::process::ExitCode;

use gasfab::algorithms::{bfs, cc, pagerank, sssp, triangles};
use gasfab::config::{Algorithm, CliOptions};
use gasfab::graph::{self, Graph, Partition};
use gasfab::{SimError, SimulationDriver, SimulationReport};
use gasfab_logging::Registry;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gasfab: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), SimError> {
    let options = CliOptions::from_args(args)?;
    let partition = Partition::new(options.config.num_pe, options.config.max_vertices_per_pe);
    let mut registry = Registry::new();

    let report = match options.algorithm {
        Algorithm::Bfs => {
            let graph = load_undirected(&options)?;
            let mut driver: SimulationDriver<bfs::Bfs> =
                SimulationDriver::new(graph, options.config.clone(), options.source, &mut registry)?;
            driver.run()?
        }
        Algorithm::Sssp => {
            let graph = match &options.graph_path {
                Some(path) => sssp::load_graph_from_file(Path::new(path), options.num_edges.unwrap_or(0))?,
                None => {
                    let (edges, weights) = gasfab::fixtures::weighted_path();
                    sssp::build_graph(&edges, &weights)
                }
            };
            let mut driver: SimulationDriver<sssp::Sssp> =
                SimulationDriver::new(graph, options.config.clone(), options.source, &mut registry)?;
            driver.run()?
        }
        Algorithm::PageRank => {
            let graph: Graph<()> = match &options.graph_path {
                Some(path) => {
                    let edges = graph::read_edge_file(Path::new(path), options.num_edges.unwrap_or(0))?;
                    Graph::from_directed_edges_with(&edges, |_, _| ())
                }
                None => Graph::from_directed_edges_with(&gasfab::fixtures::directed_three_chain(), |_, _| ()),
            };
            let mut driver: SimulationDriver<pagerank::PageRank> =
                SimulationDriver::new(graph, options.config.clone(), options.source, &mut registry)?;
            driver.run()?
        }
        Algorithm::ConnectedComponents => {
            let graph = match &options.graph_path {
                Some(path) => Graph::from_edge_file(Path::new(path), options.num_edges.unwrap_or(0))?,
                None => Graph::from_edges(&gasfab::fixtures::two_triangles()),
            };
            let mut driver: SimulationDriver<cc::ConnectedComponents> =
                SimulationDriver::new(graph, options.config.clone(), options.source, &mut registry)?;
            driver.run()?
        }
        Algorithm::TriangleCounting => {
            let edges = match &options.graph_path {
                Some(path) => graph::read_edge_file(Path::new(path), options.num_edges.unwrap_or(0))?,
                None => gasfab::fixtures::k4(),
            };
            let graph = triangles::build_graph(&edges, &partition);
            let mut driver: SimulationDriver<triangles::TriangleCounting> =
                SimulationDriver::new(graph, options.config.clone(), options.source, &mut registry)?;
            driver.run()?
        }
    };

    print_report(&report);
    Ok(())
}

fn load_undirected(options: &CliOptions) -> Result<Graph<()>, SimError> {
    match &options.graph_path {
        Some(path) => Graph::from_edge_file(Path::new(path), options.num_edges.unwrap_or(0)),
        None => Ok(Graph::from_edges(&gasfab::fixtures::four_cycle())),
    }
}

fn print_report(report: &SimulationReport) {
    println!("supersteps:            {}", report.supersteps);
    println!("cycles:                 {}", report.cycles);
    println!("messages sent:          {}", report.num_messages_sent);
    println!("inter-fpga transports:  {}", report.inter_fpga_transports);
    println!("max timestamp:          {}", report.max_timestamp);
}
