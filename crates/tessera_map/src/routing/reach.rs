//! Reachability ranking and the rank-ordered arrival table.

use crate::state::Occupancy;
use std::collections::VecDeque;
use tessera_graph::{DfgNodeId, Mrrg, MrrgNodeId};

const SINK_RANK: i64 = 100_000_000;

/// Breadth-first ranks from a route's start through nodes the value may use.
///
/// The start gets rank -1, the sink the highest rank, nodes in BFS order
/// their visit index, and unreached nodes one past the node count.
#[derive(Debug)]
pub(crate) struct Reach {
    rank: Vec<i64>,
    reached: Vec<bool>,
}

impl Reach {
    pub(crate) fn compute(
        mrrg: &Mrrg,
        occupancy: &Occupancy,
        start: MrrgNodeId,
        sink: MrrgNodeId,
        source: DfgNodeId,
    ) -> Self {
        let n = mrrg.len();
        let mut reached = vec![false; n];
        let mut visited = vec![start];
        reached[start.index()] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(x) = queue.pop_front() {
            for &y in mrrg.fanout(x) {
                if !reached[y.index()] && y != sink && occupancy.is_free_for(y, source) {
                    reached[y.index()] = true;
                    visited.push(y);
                    queue.push_back(y);
                }
            }
        }
        let mut rank = vec![n as i64 + 1; n];
        for (i, node) in visited.iter().enumerate() {
            rank[node.index()] = i as i64;
        }
        rank[sink.index()] = SINK_RANK;
        rank[start.index()] = -1;
        Self { rank, reached }
    }

    /// Returns `true` if some driver of `sink` is reachable, which any route
    /// into `sink` needs.
    pub(crate) fn can_enter(&self, mrrg: &Mrrg, sink: MrrgNodeId) -> bool {
        mrrg.fanin(sink).iter().any(|n| self.reached[n.index()])
    }

    fn rank(&self, node: MrrgNodeId) -> i64 {
        self.rank[node.index()]
    }
}

/// `next[l][x]`: the node after `x` on some path from `x` to the sink that
/// takes exactly `l` cycles, found by sweeping nodes in descending rank.
#[derive(Debug)]
pub(crate) struct ArrivalTable {
    sink: MrrgNodeId,
    next: Vec<Vec<Option<MrrgNodeId>>>,
}

impl ArrivalTable {
    pub(crate) fn build(
        mrrg: &Mrrg,
        occupancy: &Occupancy,
        reach: &Reach,
        sink: MrrgNodeId,
        max_len: u32,
    ) -> Self {
        let n = mrrg.len();
        let len = max_len as usize;
        let mut next = vec![vec![None; n]; len + 1];
        next[0][sink.index()] = Some(sink);

        let mut by_rank: Vec<MrrgNodeId> = (0..n as u32).map(MrrgNodeId::from_raw).collect();
        by_rank.sort_by_key(|&x| reach.rank(x));

        let sweep = std::iter::once(sink).chain(by_rank.into_iter().rev());
        let sweep: Vec<MrrgNodeId> = sweep.collect();
        for i in 0..=len {
            for &x in &sweep {
                if next[i][x.index()].is_none() {
                    continue;
                }
                if occupancy.is_used(x) && x != sink {
                    continue;
                }
                for &y in mrrg.fanin(x) {
                    if reach.rank(y) >= reach.rank(x) && x != sink {
                        continue;
                    }
                    let reach_len = i + mrrg.latency(y) as usize;
                    if reach_len <= len && next[reach_len][y.index()].is_none() {
                        next[reach_len][y.index()] = Some(x);
                    }
                }
            }
        }
        Self { sink, next }
    }

    /// Follows the table from `from` for exactly `len` cycles.
    pub(crate) fn path(&self, mrrg: &Mrrg, from: MrrgNodeId, len: u32) -> Option<Vec<MrrgNodeId>> {
        let mut remaining = len as usize;
        if remaining >= self.next.len() {
            return None;
        }
        let mut node = from;
        let mut path = Vec::new();
        let step_limit = self.next.len() * mrrg.len() + 1;
        for _ in 0..step_limit {
            path.push(node);
            if node == self.sink && remaining == 0 {
                return Some(path);
            }
            let after = self.next[remaining][node.index()]?;
            remaining = remaining.checked_sub(mrrg.latency(node) as usize)?;
            node = after;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_graph::Opcode;

    fn d(n: u32) -> DfgNodeId {
        DfgNodeId::from_raw(n)
    }

    /// s -> a -> t and s -> b -> c -> t, all latency 1.
    fn fork() -> (Mrrg, [MrrgNodeId; 5]) {
        let op = Opcode::from_raw(0);
        let mut g = Mrrg::new();
        let s = g.add_function("0:s", [op]);
        let t = g.add_function("0:t", [op]);
        let a = g.add_routing("a");
        let b = g.add_routing("b");
        let c = g.add_routing("c");
        for (x, y) in [(s, a), (a, t), (s, b), (b, c), (c, t)] {
            g.connect(x, y);
        }
        for n in [s, a, b, c] {
            g.set_latency(n, 1);
        }
        (g, [s, t, a, b, c])
    }

    #[test]
    fn ranks_follow_bfs() {
        let (g, [s, t, a, b, c]) = fork();
        let occ = Occupancy::new(g.len());
        let reach = Reach::compute(&g, &occ, s, t, d(0));
        assert_eq!(reach.rank(s), -1);
        assert_eq!(reach.rank(a), 1);
        assert_eq!(reach.rank(b), 2);
        assert_eq!(reach.rank(c), 3);
        assert_eq!(reach.rank(t), SINK_RANK);
        assert!(reach.can_enter(&g, t));
    }

    #[test]
    fn occupied_nodes_block_reach() {
        let (g, [s, t, a, b, _]) = fork();
        let mut occ = Occupancy::new(g.len());
        occ.mark(a, d(7));
        occ.mark(b, d(7));
        let reach = Reach::compute(&g, &occ, s, t, d(0));
        assert!(!reach.can_enter(&g, t));
        let shared = Reach::compute(&g, &occ, s, t, d(7));
        assert!(shared.can_enter(&g, t));
    }

    #[test]
    fn arrival_paths_of_exact_length() {
        let (g, [s, t, a, b, c]) = fork();
        let occ = Occupancy::new(g.len());
        let reach = Reach::compute(&g, &occ, s, t, d(0));
        let table = ArrivalTable::build(&g, &occ, &reach, t, 4);
        assert_eq!(table.path(&g, s, 2), Some(vec![s, a, t]));
        assert_eq!(table.path(&g, s, 3), Some(vec![s, b, c, t]));
        assert_eq!(table.path(&g, s, 4), None);
        assert_eq!(table.path(&g, s, 9), None);
    }
}
