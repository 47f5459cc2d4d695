//! The five bundled [`crate::vertex_program::VertexProgram`] implementations.

pub mod bfs;
pub mod cc;
pub mod pagerank;
pub mod sssp;
pub mod triangles;

pub use bfs::Bfs;
pub use cc::ConnectedComponents;
pub use pagerank::PageRank;
pub use sssp::Sssp;
pub use triangles::TriangleCounting;
