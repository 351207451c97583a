//! Exact-length paths into a sink, grown backward from it.

use crate::state::Occupancy;
use std::collections::VecDeque;
use tessera_graph::{DfgNodeId, Mrrg, MrrgNodeId};

/// Which input port of the sink a route may enter through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PortRule {
    /// Any driver of the sink.
    Any,
    /// Only this driver: the operand has a fixed port on a non-commutative
    /// operation.
    Only(MrrgNodeId),
}

impl PortRule {
    pub(crate) fn allows(self, driver: MrrgNodeId) -> bool {
        match self {
            PortRule::Any => true,
            PortRule::Only(required) => required == driver,
        }
    }
}

/// `path[l][x]`: a path from `x` to the sink taking exactly `l` cycles.
///
/// Paths only continue backward through routing nodes that are free or
/// already carry `source`'s value, never revisit a node other than the sink,
/// and have at most `edge_limit` hops. The first path found for a cell wins.
#[derive(Debug)]
pub(crate) struct TailTable {
    path: Vec<Vec<Option<Vec<MrrgNodeId>>>>,
}

impl TailTable {
    pub(crate) fn build(
        mrrg: &Mrrg,
        occupancy: &Occupancy,
        sink: MrrgNodeId,
        source: DfgNodeId,
        max_len: u32,
        rule: PortRule,
        edge_limit: usize,
    ) -> Self {
        let len = max_len as usize;
        let mut path: Vec<Vec<Option<Vec<MrrgNodeId>>>> = vec![vec![None; mrrg.len()]; len + 1];
        path[0][sink.index()] = Some(vec![sink]);
        let mut queue = VecDeque::from([(0usize, sink)]);

        while let Some((l, x)) = queue.pop_front() {
            let Some(to_sink) = path[l][x.index()].clone() else {
                continue;
            };
            if to_sink.len() > edge_limit {
                continue;
            }
            for &y in mrrg.fanin(x) {
                if x == sink && !rule.allows(y) {
                    continue;
                }
                let reach_len = l + mrrg.latency(y) as usize;
                if reach_len > len || path[reach_len][y.index()].is_some() {
                    continue;
                }
                if y != sink && to_sink.contains(&y) {
                    continue;
                }
                let mut extended = Vec::with_capacity(to_sink.len() + 1);
                extended.push(y);
                extended.extend_from_slice(&to_sink);
                path[reach_len][y.index()] = Some(extended);
                if y != sink && !mrrg.is_function(y) && occupancy.is_free_for(y, source) {
                    queue.push_back((reach_len, y));
                }
            }
        }
        Self { path }
    }

    pub(crate) fn path(&self, from: MrrgNodeId, len: u32) -> Option<&[MrrgNodeId]> {
        self.path
            .get(len as usize)?
            .get(from.index())?
            .as_deref()
    }
}
