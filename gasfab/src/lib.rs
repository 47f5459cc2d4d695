//! A cycle-accurate, single-threaded, deterministic software simulator of a
//! distributed BSP/GAS graph-processing fabric.
//!
//! The simulated fabric is a fixed number of Processing Elements (PEs)
//! grouped onto FPGAs, each running a streaming gather / barrier-triggered
//! apply / per-edge scatter pipeline ([`apply_kernel`], [`scatter_kernel`])
//! behind the protocol checks in [`pe`], synchronized by per-destination
//! [`arbiter`]s and routed by [`network`]. [`driver::SimulationDriver`] is
//! the single entry point that ties all of it together and runs one
//! algorithm, expressed as a [`vertex_program::VertexProgram`], to
//! quiescence.

pub mod algorithms;
pub mod apply_kernel;
pub mod arbiter;
pub mod config;
pub mod driver;
pub mod error;
pub mod fixtures;
pub mod graph;
pub mod logging;
pub mod message;
pub mod network;
pub mod pe;
pub mod scatter_kernel;
pub mod vertex_program;

pub use config::{Algorithm, CliOptions, FabricConfig, LatencyModel};
pub use driver::{SimulationDriver, SimulationReport};
pub use error::SimError;
pub use graph::{Graph, Partition};
pub use message::{Message, Update, VertexEntry, VertexId};
pub use vertex_program::VertexProgram;
