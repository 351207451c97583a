//! Backtracking placement of operations onto function nodes.
//!
//! Operations are placed in topological order. At each depth the legal
//! candidates are ranked by [`cost`], and for each one the operation's
//! self-loop and incoming edges are routed before recursing.

pub(crate) mod cost;

use crate::search::Search;
use cost::{cut_tries, UNREACHABLE};
use log::trace;
use tessera_graph::{DfgNodeId, MrrgNodeId};

impl<'p> Search<'p> {
    /// Places `order[depth]` and everything after it.
    pub(crate) fn place(&mut self, depth: usize) {
        if self.halted() {
            return;
        }
        self.tries += 1;
        if self.tries > self.config.try_budget {
            return;
        }
        if depth == self.order.len() {
            self.accept();
            return;
        }

        let start = self.tries;
        let op = self.order[depth];
        for candidate in self.ranked_candidates(op) {
            if self.halted() {
                return;
            }
            trace!(
                "try {}: depth {depth}, `{}` on `{}`",
                self.tries,
                self.problem.dfg.op(op).name,
                self.problem.mrrg.node(candidate).name
            );
            self.placement.assign(op, candidate);
            let snapshot = self.occupancy.checkpoint();
            self.occupancy.mark(candidate, op);
            self.route_self_loop(op, depth);
            self.occupancy.restore(snapshot);
            self.placement.unassign(op);
            if self.tries - start >= cut_tries(depth, self.order.len()) {
                return;
            }
        }
    }

    /// Free function nodes that may host `op`, cheapest first. Equal costs
    /// keep this attempt's candidate order.
    fn ranked_candidates(&self, op: DfgNodeId) -> Vec<MrrgNodeId> {
        let problem = self.problem;
        let mut scored: Vec<(u64, MrrgNodeId)> = self
            .candidates
            .iter()
            .copied()
            .filter(|&node| problem.can_host(op, node) && !self.occupancy.is_used(node))
            .filter_map(|node| {
                let near = self
                    .cost
                    .predecessor_cost(problem, &self.placement, op, node);
                if near >= UNREACHABLE {
                    return None;
                }
                Some((near + self.cost.lookahead_penalty(problem, op, node), node))
            })
            .collect();
        scored.sort_by_key(|&(score, _)| score);
        scored.into_iter().map(|(_, node)| node).collect()
    }
}
