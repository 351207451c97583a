//! Configuration types deserialized from `tessera.toml`.

use serde::{Deserialize, Serialize};

/// The top-level mapper configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapperConfig {
    /// Search parameters.
    pub mapping: MappingConfig,
    /// Artifact naming.
    pub output: OutputConfig,
}

/// Parameters of the placement and routing search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    /// Initiation interval. Self-loop routes must take exactly this many cycles
    /// and route slack is only spent in multiples of it.
    pub ii: u32,
    /// Largest allowed difference between the arrival times of the inputs of
    /// one operation.
    pub max_delay: u32,
    /// How many cycles past the latest predecessor an operation may fire.
    pub single_path_time_limit: u32,
    /// Maximum number of hops in a single route.
    pub single_path_edge_limit: usize,
    /// Placement tries allowed per attempt.
    pub try_budget: u64,
    /// Number of attempts before giving up.
    pub max_attempts: u32,
    /// Optional wall-clock limit for the whole run, in seconds.
    pub time_limit_secs: Option<u64>,
    /// Seed for reshuffling candidate order between attempts.
    pub seed: u64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            ii: 1,
            max_delay: 4,
            single_path_time_limit: 5,
            single_path_edge_limit: 25,
            try_budget: 100,
            max_attempts: 64,
            time_limit_secs: None,
            seed: 0,
        }
    }
}

/// Naming of the report artifacts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Artifact base name; reports go to `<name>_r.txt` and `<name>_i.txt`.
    pub name: String,
    /// Routing nodes whose name contains this marker are listed in the
    /// interconnect report.
    pub internal_marker: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            name: "mapping".to_string(),
            internal_marker: "internalNode".to_string(),
        }
    }
}
