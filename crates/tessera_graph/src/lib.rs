//! Graph model for CGRA mapping.
//!
//! A [`Dfg`] holds the operations of the computation and their operand
//! dependencies. An [`Mrrg`] holds the function and routing nodes of the array
//! unrolled over one pipeline period, with physical connectivity and per-node
//! latency. Both are immutable once loaded; the mapper keeps occupancy in its
//! own state.
//!
//! The [`load`] module reads the JSON descriptions of both graphs, the latency
//! table, and the optional fixed-mapping table.

#![warn(missing_docs)]

pub mod dfg;
pub mod error;
pub mod fixed;
pub mod ids;
pub mod load;
pub mod mrrg;

pub use dfg::{Dfg, DfgOp};
pub use error::LoadError;
pub use fixed::FixedMapping;
pub use ids::{DfgNodeId, MrrgNodeId, Opcode};
pub use load::{
    dfg_from_str, fixed_from_str, latencies_from_str, load_dfg, load_fixed, load_latencies,
    load_mrrg, mrrg_from_str, LatencyTable,
};
pub use mrrg::{Mrrg, MrrgNode, MrrgNodeKind};
