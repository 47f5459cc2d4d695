//! Immutable run configuration, and CLI parsing grounded on the teacher's own
//! `getopts`-based `Configuration::from_args` (`communication/src/initialize.rs`).
//!
//! `num_pe`, `num_fpga`, `num_channels`, and `max_vertices_per_pe` were mutable
//! globals in the reference implementation; here they're fields of one struct,
//! constructed once and passed by reference into every component.

use crate::error::SimError;
use crate::message::VertexId;

/// Which algorithm to run. Each variant corresponds to one monomorphized
/// `VertexProgram` implementation; selecting among them at the CLI boundary
/// is the only place this simulator performs a runtime match on algorithm
/// identity — the simulation core itself never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Bfs,
    Sssp,
    PageRank,
    ConnectedComponents,
    TriangleCounting,
}

impl Algorithm {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "bfs" => Some(Algorithm::Bfs),
            "sssp" => Some(Algorithm::Sssp),
            "pagerank" => Some(Algorithm::PageRank),
            "cc" => Some(Algorithm::ConnectedComponents),
            "triangles" => Some(Algorithm::TriangleCounting),
            _ => None,
        }
    }
}

/// The analytic timing model applied by ApplyKernel/ScatterKernel.
///
/// `Software` is the default: timestamps pass through unchanged, matching a
/// behavioral (not gate-level) simulation. `Hardware` models each stage as a
/// fixed-latency FIFO, per the reference's Verilator-backed `applykernel.cpp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyModel {
    Software,
    Hardware { apply_latency: u64, scatter_latency: u64 },
}

impl LatencyModel {
    pub fn apply_latency(&self) -> u64 {
        match self {
            LatencyModel::Software => 0,
            LatencyModel::Hardware { apply_latency, .. } => *apply_latency,
        }
    }

    pub fn scatter_latency(&self) -> u64 {
        match self {
            LatencyModel::Software => 0,
            LatencyModel::Hardware { scatter_latency, .. } => *scatter_latency,
        }
    }
}

/// Immutable fabric shape, shared (by reference) across every component.
#[derive(Debug, Clone)]
pub struct FabricConfig {
    pub num_pe: usize,
    pub num_fpga: usize,
    pub num_channels: usize,
    pub max_vertices_per_pe: u64,
    pub latency_model: LatencyModel,
    pub report: bool,
}

impl Default for FabricConfig {
    fn default() -> Self {
        FabricConfig {
            num_pe: 4,
            num_fpga: 2,
            num_channels: 4,
            max_vertices_per_pe: 1 << 16,
            latency_model: LatencyModel::Software,
            report: true,
        }
    }
}

/// Fully-parsed CLI invocation: fabric shape, algorithm choice, and the
/// optional graph-file arguments.
#[derive(Debug, Clone)]
pub struct CliOptions {
    pub config: FabricConfig,
    pub algorithm: Algorithm,
    pub source: VertexId,
    pub graph_path: Option<String>,
    pub num_edges: Option<usize>,
}

#[cfg(feature = "getopts")]
impl CliOptions {
    /// Parses `gasfab [options] [<graph_path> <num_edges>]`, per the CLI
    /// surface: `-a/--algorithm -p/--pes -f/--fpgas -c/--channels
    /// -s/--source -r/--report -h/--help`.
    pub fn from_args(args: &[String]) -> Result<Self, SimError> {
        let mut opts = getopts::Options::new();
        opts.optopt("a", "algorithm", "bfs | sssp | pagerank | cc | triangles", "NAME");
        opts.optopt("p", "pes", "number of PEs", "NUM");
        opts.optopt("f", "fpgas", "number of FPGAs", "NUM");
        opts.optopt("c", "channels", "number of channels", "NUM");
        opts.optopt("s", "source", "source/root vertex for bfs/sssp", "NUM");
        opts.optflag("r", "report", "print per-superstep diagnostics");
        opts.optflag("h", "help", "print this help menu");

        let matches = opts
            .parse(args)
            .map_err(|e| SimError::GraphShape(e.to_string()))?;

        if matches.opt_present("h") {
            print!("{}", opts.usage("Usage: gasfab [options] [<graph_path> <num_edges>]"));
            std::process::exit(0);
        }

        let mut config = FabricConfig::default();
        if let Some(v) = matches.opt_str("p") {
            config.num_pe = v.parse().map_err(|_| SimError::GraphShape("invalid --pes".into()))?;
        }
        if let Some(v) = matches.opt_str("f") {
            config.num_fpga = v.parse().map_err(|_| SimError::GraphShape("invalid --fpgas".into()))?;
        }
        if let Some(v) = matches.opt_str("c") {
            config.num_channels = v.parse().map_err(|_| SimError::GraphShape("invalid --channels".into()))?;
        }

        let algorithm = match matches.opt_str("a") {
            Some(name) => Algorithm::parse(&name)
                .ok_or_else(|| SimError::GraphShape(format!("unknown algorithm '{name}'")))?,
            None => Algorithm::Bfs,
        };

        let source = match matches.opt_str("s") {
            Some(v) => v.parse().map_err(|_| SimError::GraphShape("invalid --source".into()))?,
            None => 0,
        };

        let (graph_path, num_edges) = if matches.free.len() >= 2 {
            let path = matches.free[0].clone();
            let edges = matches.free[1]
                .parse()
                .map_err(|_| SimError::GraphShape("invalid num_edges".into()))?;
            (Some(path), Some(edges))
        } else {
            (None, None)
        };

        Ok(CliOptions { config, algorithm, source, graph_path, num_edges })
    }
}
