//! Results of a mapping run.

use serde::{Deserialize, Serialize};
use tessera_graph::{DfgNodeId, MrrgNodeId};

/// A committed route for one dependency edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// The producing operation.
    pub source: DfgNodeId,
    /// The consuming operation. Equal to `source` for a self-loop.
    pub sink: DfgNodeId,
    /// MRRG nodes from the source's function node to the sink's.
    pub nodes: Vec<MrrgNodeId>,
    /// The sink's input port the route enters through.
    pub entry_port: usize,
}

/// Firing times derived from the committed routes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// Firing time of each operation, by operation id.
    pub fire_times: Vec<i64>,
    /// Signed arrival disagreement at each operation, zero where all inputs
    /// agree. Positive when the input on port 0 arrives late.
    pub relative_skew: Vec<i64>,
}

/// A validated placement and routing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// Function node of each operation, by operation id.
    pub placement: Vec<MrrgNodeId>,
    /// One route per dependency edge, ordered by `(source, sink)`.
    pub routes: Vec<Route>,
    /// Occupancy of every MRRG node.
    pub used: Vec<bool>,
    /// Owning operation of every MRRG node.
    pub owners: Vec<Option<DfgNodeId>>,
    /// Schedule checked by the validator.
    pub timing: Timing,
    /// Which attempt found the mapping, counting from 1.
    pub attempts: u32,
    /// Placement tries spent in the successful attempt.
    pub tries: u64,
}

impl Mapping {
    /// The route for the edge `source -> sink`.
    pub fn route(&self, source: DfgNodeId, sink: DfgNodeId) -> Option<&Route> {
        self.routes
            .binary_search_by_key(&(source, sink), |r| (r.source, r.sink))
            .ok()
            .map(|i| &self.routes[i])
    }

    /// The operation placed on `node`, if any.
    pub fn host(&self, node: MrrgNodeId) -> Option<DfgNodeId> {
        self.placement
            .iter()
            .position(|&n| n == node)
            .map(|i| DfgNodeId::from_raw(i as u32))
    }
}

/// Why no mapping was produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnmappedReason {
    /// The DFG has a cycle that is not a self-loop.
    NotADag,
    /// An operation has no function node it could ever be placed on.
    NoCandidates {
        /// The operation.
        op: DfgNodeId,
    },
    /// Every attempt exhausted its try budget.
    AttemptLimit {
        /// Attempts made.
        attempts: u32,
    },
    /// The wall-clock limit passed.
    TimeLimit {
        /// Attempts started before the limit.
        attempts: u32,
    },
}

/// Terminal outcome of [`map`](crate::map).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "result", rename_all = "snake_case")]
pub enum MapOutcome {
    /// A validated mapping.
    Mapped(Mapping),
    /// No mapping within the configured bounds.
    Unmapped(UnmappedReason),
}

impl MapOutcome {
    /// The mapping, if one was found.
    pub fn mapping(&self) -> Option<&Mapping> {
        match self {
            MapOutcome::Mapped(m) => Some(m),
            MapOutcome::Unmapped(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(n: u32) -> DfgNodeId {
        DfgNodeId::from_raw(n)
    }

    fn m(n: u32) -> MrrgNodeId {
        MrrgNodeId::from_raw(n)
    }

    fn sample() -> Mapping {
        Mapping {
            placement: vec![m(0), m(2)],
            routes: vec![
                Route { source: d(0), sink: d(1), nodes: vec![m(0), m(1), m(2)], entry_port: 0 },
                Route { source: d(1), sink: d(1), nodes: vec![m(2), m(3), m(2)], entry_port: 1 },
            ],
            used: vec![true; 4],
            owners: vec![Some(d(0)), Some(d(0)), Some(d(1)), Some(d(1))],
            timing: Timing::default(),
            attempts: 1,
            tries: 3,
        }
    }

    #[test]
    fn route_lookup() {
        let map = sample();
        assert_eq!(map.route(d(1), d(1)).unwrap().entry_port, 1);
        assert!(map.route(d(1), d(0)).is_none());
    }

    #[test]
    fn host_lookup() {
        let map = sample();
        assert_eq!(map.host(m(2)), Some(d(1)));
        assert_eq!(map.host(m(1)), None);
    }

    #[test]
    fn outcome_json_is_tagged() {
        let out = MapOutcome::Unmapped(UnmappedReason::AttemptLimit { attempts: 4 });
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["outcome"], "unmapped");
        assert_eq!(json["result"]["reason"], "attempt_limit");
        assert_eq!(json["result"]["attempts"], 4);
    }
}
