//! Candidate ordering for placement.
//!
//! A candidate function node is scored by its hop distance from the nodes of
//! already-placed predecessors, plus a lookahead penalty that pulls it toward
//! the forced nodes of fixed operations further downstream.

use crate::problem::MappingProblem;
use crate::state::Placement;
use std::collections::{BTreeSet, VecDeque};
use tessera_graph::{DfgNodeId, Mrrg, MrrgNodeId};

/// Distance assigned to unreachable pairs. A candidate whose predecessor
/// distance reaches this value is never tried.
pub(crate) const UNREACHABLE: u64 = 10_000_000;

/// Hop counts from every function node to every MRRG node, ignoring latency
/// and occupancy.
#[derive(Debug)]
pub(crate) struct DistanceTable {
    rows: Vec<Option<Vec<u64>>>,
}

impl DistanceTable {
    pub(crate) fn new(mrrg: &Mrrg) -> Self {
        let mut rows = vec![None; mrrg.len()];
        for from in mrrg.function_nodes() {
            rows[from.index()] = Some(bfs(mrrg, from));
        }
        Self { rows }
    }

    /// Hops from function node `from` to `to`.
    pub(crate) fn get(&self, from: MrrgNodeId, to: MrrgNodeId) -> u64 {
        self.rows[from.index()]
            .as_ref()
            .map_or(UNREACHABLE, |row| row[to.index()])
    }
}

fn bfs(mrrg: &Mrrg, from: MrrgNodeId) -> Vec<u64> {
    let mut dist = vec![UNREACHABLE; mrrg.len()];
    dist[from.index()] = 0;
    let mut queue = VecDeque::from([from]);
    while let Some(x) = queue.pop_front() {
        for &y in mrrg.fanout(x) {
            if dist[y.index()] == UNREACHABLE {
                dist[y.index()] = dist[x.index()] + 1;
                queue.push_back(y);
            }
        }
    }
    dist
}

/// Per-problem scoring data, shared by every attempt.
#[derive(Debug)]
pub(crate) struct CostModel {
    distances: DistanceTable,
    /// For each operation, the fixed operations downstream of it with the
    /// number of DFG edges on each distinct path length to them.
    lookahead: Vec<BTreeSet<(u64, DfgNodeId)>>,
}

impl CostModel {
    pub(crate) fn new(problem: &MappingProblem) -> Self {
        let lookahead = if problem.fixed.is_empty() {
            vec![BTreeSet::new(); problem.dfg.len()]
        } else {
            problem
                .dfg
                .ids()
                .map(|op| downstream_fixed(problem, op))
                .collect()
        };
        Self {
            distances: DistanceTable::new(&problem.mrrg),
            lookahead,
        }
    }

    /// Sum of distances from the nodes of `op`'s placed predecessors to
    /// `candidate`.
    pub(crate) fn predecessor_cost(
        &self,
        problem: &MappingProblem,
        placement: &Placement,
        op: DfgNodeId,
        candidate: MrrgNodeId,
    ) -> u64 {
        problem
            .dfg
            .true_inputs(op)
            .into_iter()
            .filter_map(|pred| placement.site(pred))
            .map(|site| self.distances.get(site, candidate))
            .sum()
    }

    /// Penalty for placing `op` on `candidate` given fixed operations it
    /// feeds. Each downstream fixed operation contributes the mean distance
    /// from `candidate` to its forced nodes, divided by its DFG distance
    /// from `op`.
    pub(crate) fn lookahead_penalty(
        &self,
        problem: &MappingProblem,
        op: DfgNodeId,
        candidate: MrrgNodeId,
    ) -> u64 {
        let mut penalty = 0;
        for &(hops, target) in &self.lookahead[op.index()] {
            let Some(forced) = problem.fixed.get(target) else { continue };
            if forced.is_empty() {
                continue;
            }
            let total: u64 = forced.iter().map(|&f| self.distances.get(candidate, f)).sum();
            penalty += total / (hops * forced.len() as u64);
        }
        penalty
    }
}

fn downstream_fixed(problem: &MappingProblem, op: DfgNodeId) -> BTreeSet<(u64, DfgNodeId)> {
    let dfg = &problem.dfg;
    let mut found = BTreeSet::new();
    let mut seen = BTreeSet::new();
    let mut queue: VecDeque<(DfgNodeId, u64)> = dfg
        .consumers(op)
        .iter()
        .filter(|&&c| c != op)
        .map(|&c| (c, 1))
        .collect();
    while let Some((node, hops)) = queue.pop_front() {
        if !seen.insert((node, hops)) {
            continue;
        }
        if problem.fixed.contains(node) {
            found.insert((hops, node));
        }
        for &next in dfg.consumers(node) {
            if next != node {
                queue.push_back((next, hops + 1));
            }
        }
    }
    found
}

/// Tries allowed below `depth` before the remaining candidates at that depth
/// are abandoned.
pub fn cut_tries(depth: usize, total: usize) -> u64 {
    (total.saturating_sub(depth) as u64 * 5).max(5)
}
