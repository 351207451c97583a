//! Processing order of DFG operations.

use tessera_graph::{Dfg, DfgNodeId};

/// The DFG still has a cycle after self-loops are removed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("DFG is not acyclic ignoring self-loops ({} operations on or behind a cycle)", stuck.len())]
pub struct CycleError {
    /// Operations that could not be ordered, in id order.
    pub stuck: Vec<DfgNodeId>,
}

/// Kahn's algorithm over operand edges, ignoring self-loops.
///
/// Operations with no predecessors start the queue in id order; the queue is
/// first in, first out.
pub fn topological_order(dfg: &Dfg) -> Result<Vec<DfgNodeId>, CycleError> {
    let mut indegree = vec![0usize; dfg.len()];
    for x in dfg.ids() {
        for &y in dfg.consumers(x) {
            if y != x {
                indegree[y.index()] += 1;
            }
        }
    }

    let mut order: Vec<DfgNodeId> = dfg.ids().filter(|x| indegree[x.index()] == 0).collect();
    let mut head = 0;
    while head < order.len() {
        let x = order[head];
        head += 1;
        for &y in dfg.consumers(x) {
            if y == x {
                continue;
            }
            indegree[y.index()] -= 1;
            if indegree[y.index()] == 0 {
                order.push(y);
            }
        }
    }

    if order.len() == dfg.len() {
        Ok(order)
    } else {
        let stuck = dfg.ids().filter(|x| indegree[x.index()] > 0).collect();
        Err(CycleError { stuck })
    }
}
