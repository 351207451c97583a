//! Routing of dependency edges between placed operations.
//!
//! A route for `source -> sink` must take exactly the number of cycles the
//! schedule asks for, less some slack spent in multiples of II. Candidate
//! routes start either at the source's function node or, for all but the
//! first consumer of a value, at a prefix of the value's first route so
//! fan-out shares physical nodes. The tail into the sink comes from
//! [`TailTable`], falling back to [`ArrivalTable`].
//!
//! Every accepted route is committed, the continuation runs, and the commit
//! is undone, so the caller sees unchanged state whatever the outcome.

mod reach;
mod tail;

use crate::mapping::Route;
use crate::search::Search;
use log::debug;
use reach::{ArrivalTable, Reach};
use tail::{PortRule, TailTable};
use tessera_graph::{DfgNodeId, MrrgNodeId};

/// What to do once an edge is routed.
type Next<'a, 'p> = &'a mut dyn FnMut(&mut Search<'p>);

impl<'p> Search<'p> {
    /// Routes `op`'s self-loop, if any, then its incoming edges.
    pub(crate) fn route_self_loop(&mut self, op: DfgNodeId, depth: usize) {
        if self.halted() {
            return;
        }
        if self.problem.dfg.has_self_loop(op) {
            let ii = self.config.ii;
            self.route_edge(op, op, ii, &mut move |s: &mut Search<'p>| {
                s.route_inputs(op, depth)
            });
        } else {
            self.route_inputs(op, depth);
        }
    }

    /// Tries every firing time of `op` from its latest predecessor onward,
    /// routing all incoming edges for each.
    fn route_inputs(&mut self, op: DfgNodeId, depth: usize) {
        if self.halted() {
            return;
        }
        let inputs = self.problem.dfg.true_inputs(op);
        let Some(latest) = inputs.iter().map(|p| self.fire[p.index()]).max() else {
            let previous = self.fire[op.index()];
            let Some(site) = self.placement.site(op) else {
                return;
            };
            self.fire[op.index()] = self.problem.mrrg.base_offset(site);
            self.place(depth + 1);
            self.fire[op.index()] = previous;
            return;
        };
        let slack = i64::from(self.config.single_path_time_limit.min(self.route_len_limit));
        for target in latest..=latest + slack {
            if self.halted() {
                return;
            }
            self.route_chain(op, &inputs, 0, target, depth);
        }
    }

    /// Routes `inputs[k..]` into `op` aiming at firing time `target`, then
    /// checks the arrival spread and recurses into the next depth.
    fn route_chain(&mut self, op: DfgNodeId, inputs: &[DfgNodeId], k: usize, target: i64, depth: usize) {
        let Some(&pred) = inputs.get(k) else {
            self.fire_and_descend(op, inputs, depth);
            return;
        };
        let Ok(len) = u32::try_from(target - self.fire[pred.index()]) else {
            return;
        };
        self.route_edge(pred, op, len, &mut move |s: &mut Search<'p>| {
            s.route_chain(op, inputs, k + 1, target, depth)
        });
    }

    fn fire_and_descend(&mut self, op: DfgNodeId, inputs: &[DfgNodeId], depth: usize) {
        let mrrg = &self.problem.mrrg;
        let mut earliest = i64::MAX;
        let mut latest = i64::MIN;
        for &pred in inputs {
            let Some(route) = self.routes.get(&(pred, op)) else {
                return;
            };
            let arrival = self.fire[pred.index()] + i64::from(mrrg.path_latency(&route.nodes));
            earliest = earliest.min(arrival);
            latest = latest.max(arrival);
        }
        if latest - earliest > i64::from(self.config.max_delay) {
            return;
        }
        let previous = std::mem::replace(&mut self.fire[op.index()], latest);
        self.place(depth + 1);
        self.fire[op.index()] = previous;
    }

    /// Searches routes for `source -> sink` taking at most `len` cycles and
    /// runs `next` with each accepted one committed.
    pub(crate) fn route_edge(&mut self, source: DfgNodeId, sink: DfgNodeId, len: u32, next: Next<'_, 'p>) {
        if self.halted() || len > self.route_len_limit {
            return;
        }
        let problem = self.problem;
        let (dfg, mrrg) = (&problem.dfg, &problem.mrrg);
        let (Some(start), Some(end)) = (self.placement.site(source), self.placement.site(sink)) else {
            return;
        };

        let rule = if !dfg.op(sink).commutative && dfg.operand_count(sink) > 1 {
            let port = dfg.operand_index(sink, source);
            match port.and_then(|p| mrrg.fanin(end).get(p)) {
                Some(&driver) => PortRule::Only(driver),
                None => return,
            }
        } else {
            PortRule::Any
        };

        let reach = Reach::compute(mrrg, &self.occupancy, start, end, source);
        if !reach.can_enter(mrrg, end) {
            return;
        }
        let arrivals = ArrivalTable::build(mrrg, &self.occupancy, &reach, end, len);
        let tails = TailTable::build(
            mrrg,
            &self.occupancy,
            end,
            source,
            len,
            rule,
            self.config.single_path_edge_limit,
        );

        let first = self.first_consumer[source.index()] == Some(sink);
        let prefixes: Vec<Vec<MrrgNodeId>> = match &self.wait_path[source.index()] {
            Some(shared) if !first => (1..shared.len()).map(|i| shared[..i].to_vec()).collect(),
            _ => vec![vec![start]],
        };

        for prefix in prefixes {
            let spent = mrrg.path_latency(&prefix);
            if spent > len {
                continue;
            }
            self.extend_prefix(source, sink, &prefix, len - spent, rule, &tails, &arrivals, first, next);
            if self.halted() {
                return;
            }
        }
    }

    /// Tries tails after `prefix` for every slack from `max_delay` down to
    /// zero that is a multiple of II.
    #[allow(clippy::too_many_arguments)]
    fn extend_prefix(
        &mut self,
        source: DfgNodeId,
        sink: DfgNodeId,
        prefix: &[MrrgNodeId],
        budget: u32,
        rule: PortRule,
        tails: &TailTable,
        arrivals: &ArrivalTable,
        first: bool,
        next: Next<'_, 'p>,
    ) {
        let mrrg = &self.problem.mrrg;
        let Some(&from) = prefix.last() else { return };
        let self_loop = source == sink;
        for delay in (0..=self.config.max_delay.min(budget)).rev() {
            if delay % self.config.ii != 0 {
                continue;
            }
            let tail_len = budget - delay;
            if tail_len == 0 && self_loop {
                continue;
            }
            let tail = match tails.path(from, tail_len) {
                Some(tail) => Some(tail.to_vec()),
                None => arrivals.path(mrrg, from, tail_len),
            };
            let Some(tail) = tail else { continue };
            let nodes = merge(prefix, &tail);
            let Some(entry_port) = self.legal_entry(source, &nodes, rule) else {
                continue;
            };
            self.commit(Route { source, sink, nodes, entry_port }, first, next);
            if self.halted() {
                return;
            }
        }
    }

    /// Checks a complete route and returns the sink port it enters through.
    fn legal_entry(&self, source: DfgNodeId, nodes: &[MrrgNodeId], rule: PortRule) -> Option<usize> {
        let mrrg = &self.problem.mrrg;
        let (&last, rest) = nodes.split_last()?;
        let &before = rest.last()?;
        if nodes.len() - 1 > self.config.single_path_edge_limit || !rule.allows(before) {
            return None;
        }
        if nodes.windows(2).any(|hop| !mrrg.has_edge(hop[0], hop[1])) {
            return None;
        }
        let interior = &nodes[1..nodes.len() - 1];
        for (i, &node) in interior.iter().enumerate() {
            if mrrg.is_function(node)
                || !self.occupancy.is_free_for(node, source)
                || interior[..i].contains(&node)
            {
                return None;
            }
        }
        mrrg.fanin(last).iter().position(|&n| n == before)
    }

    fn commit(&mut self, route: Route, first: bool, next: Next<'_, 'p>) {
        let key = (route.source, route.sink);
        let source = route.source.index();
        debug!(
            "route {} -> {} through {} nodes, port {}",
            route.source,
            route.sink,
            route.nodes.len(),
            route.entry_port
        );
        let snapshot = self.occupancy.checkpoint();
        for &node in &route.nodes {
            self.occupancy.mark(node, route.source);
        }
        let previous_wait = if first {
            Some(std::mem::replace(&mut self.wait_path[source], Some(route.nodes.clone())))
        } else {
            None
        };
        let previous_route = self.routes.insert(key, route);

        next(self);

        match previous_route {
            Some(route) => self.routes.insert(key, route),
            None => self.routes.remove(&key),
        };
        if let Some(wait) = previous_wait {
            self.wait_path[source] = wait;
        }
        self.occupancy.restore(snapshot);
    }
}

/// Joins a prefix and a tail that starts where the prefix ends.
fn merge(prefix: &[MrrgNodeId], tail: &[MrrgNodeId]) -> Vec<MrrgNodeId> {
    let mut nodes = prefix.to_vec();
    let skip = usize::from(prefix.last().is_some() && prefix.last() == tail.first());
    nodes.extend_from_slice(&tail[skip..]);
    nodes
}
