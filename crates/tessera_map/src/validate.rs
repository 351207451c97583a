//! Independent consistency check of a complete assignment.
//!
//! The search only hands over assignments it believes legal, so any failure
//! here is a defect in the search rather than a property of the input.

use crate::mapping::{Mapping, Timing};
use crate::problem::MappingProblem;
use tessera_graph::{DfgNodeId, MrrgNodeId};

/// The first violated invariant of an assignment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The placement does not cover every operation exactly once.
    #[error("placement lists {found} operations, DFG has {expected}")]
    PlacementLength {
        /// Operations in the DFG.
        expected: usize,
        /// Entries in the placement.
        found: usize,
    },
    /// An operation sits on a node id past the end of the MRRG.
    #[error("operation {op} placed on nonexistent node {node}")]
    PlacementOutOfRange {
        /// The operation.
        op: DfgNodeId,
        /// The bad node id.
        node: MrrgNodeId,
    },
    /// Two operations share one function node.
    #[error("operations {first} and {second} share function node {node}")]
    SharedFunctionNode {
        /// The earlier operation.
        first: DfgNodeId,
        /// The later operation.
        second: DfgNodeId,
        /// The shared node.
        node: MrrgNodeId,
    },
    /// An operation sits on a node that cannot execute it.
    #[error("operation {op} placed on node {node}, which does not support its opcode")]
    UnsupportedOpcode {
        /// The operation.
        op: DfgNodeId,
        /// The node.
        node: MrrgNodeId,
    },
    /// A dependency edge has no route.
    #[error("edge {producer} -> {sink} has no route")]
    MissingRoute {
        /// Producer.
        producer: DfgNodeId,
        /// Consumer.
        sink: DfgNodeId,
    },
    /// A route does not start and end on the placed function nodes.
    #[error("route {producer} -> {sink} does not connect the placed nodes")]
    RouteEndpoints {
        /// Producer.
        producer: DfgNodeId,
        /// Consumer.
        sink: DfgNodeId,
    },
    /// Values of two different operations pass through the same node.
    #[error("node {node} carries values of both {first} and {second}")]
    RouteConflict {
        /// The contested node.
        node: MrrgNodeId,
        /// The operation that claimed it first.
        first: DfgNodeId,
        /// The operation that claimed it second.
        second: DfgNodeId,
    },
    /// Consecutive route nodes are not physically connected.
    #[error("route uses missing MRRG edge {from} -> {to}")]
    MissingEdge {
        /// Driving node.
        from: MrrgNodeId,
        /// Driven node.
        to: MrrgNodeId,
    },
    /// The recorded entry port does not match the route's last hop.
    #[error("route {producer} -> {sink} records entry port {port}, which it does not use")]
    EntryPort {
        /// Producer.
        producer: DfgNodeId,
        /// Consumer.
        sink: DfgNodeId,
        /// The recorded port.
        port: usize,
    },
    /// Inputs of an operation arrive too far apart.
    #[error("inputs of operation {op} arrive {skew} cycles apart, more than {max_delay}")]
    SkewExceeded {
        /// The operation.
        op: DfgNodeId,
        /// Absolute arrival difference.
        skew: i64,
        /// Allowed difference.
        max_delay: u32,
    },
    /// A self-loop does not take exactly one initiation interval.
    #[error("self-loop of operation {op} takes {latency} cycles, II is {ii}")]
    SelfLoopLatency {
        /// The operation.
        op: DfgNodeId,
        /// Route latency.
        latency: u32,
        /// Initiation interval.
        ii: u32,
    },
}

/// Re-derives every invariant of `mapping` from the graphs alone and returns
/// the resulting schedule.
///
/// `order` must be a topological order of the DFG ignoring self-loops.
pub fn validate(
    problem: &MappingProblem,
    order: &[DfgNodeId],
    mapping: &Mapping,
    ii: u32,
    max_delay: u32,
) -> Result<Timing, ValidationError> {
    check_placement(problem, mapping)?;
    check_paths(problem, order, mapping)?;
    check_timing(problem, order, mapping, ii, max_delay)
}

fn check_placement(problem: &MappingProblem, mapping: &Mapping) -> Result<(), ValidationError> {
    let (dfg, mrrg) = (&problem.dfg, &problem.mrrg);
    if mapping.placement.len() != dfg.len() {
        return Err(ValidationError::PlacementLength {
            expected: dfg.len(),
            found: mapping.placement.len(),
        });
    }
    let mut host: Vec<Option<DfgNodeId>> = vec![None; mrrg.len()];
    for (op, &node) in dfg.ids().zip(&mapping.placement) {
        if node.index() >= mrrg.len() {
            return Err(ValidationError::PlacementOutOfRange { op, node });
        }
        if let Some(first) = host[node.index()] {
            return Err(ValidationError::SharedFunctionNode {
                first,
                second: op,
                node,
            });
        }
        host[node.index()] = Some(op);
        if !mrrg.is_function(node) || !mrrg.supports(node, dfg.op(op).opcode) {
            return Err(ValidationError::UnsupportedOpcode { op, node });
        }
    }
    Ok(())
}

fn check_paths(
    problem: &MappingProblem,
    order: &[DfgNodeId],
    mapping: &Mapping,
) -> Result<(), ValidationError> {
    let (dfg, mrrg) = (&problem.dfg, &problem.mrrg);
    let mut claimed: Vec<Option<DfgNodeId>> = vec![None; mrrg.len()];
    for &x in order {
        let mut sources = dfg.true_inputs(x);
        if dfg.has_self_loop(x) {
            sources.insert(0, x);
        }
        for y in sources {
            claimed[mapping.placement[x.index()].index()] = Some(x);
            claimed[mapping.placement[y.index()].index()] = Some(y);
            let route = mapping
                .route(y, x)
                .ok_or(ValidationError::MissingRoute { producer: y, sink: x })?;
            let nodes = &route.nodes;
            if nodes.len() < 2
                || nodes[0] != mapping.placement[y.index()]
                || nodes[nodes.len() - 1] != mapping.placement[x.index()]
            {
                return Err(ValidationError::RouteEndpoints { producer: y, sink: x });
            }
            for &node in &nodes[1..nodes.len() - 1] {
                if node.index() >= mrrg.len() {
                    return Err(ValidationError::MissingEdge {
                        from: nodes[0],
                        to: node,
                    });
                }
                match claimed[node.index()] {
                    Some(first) if first != y => {
                        return Err(ValidationError::RouteConflict {
                            node,
                            first,
                            second: y,
                        })
                    }
                    _ => claimed[node.index()] = Some(y),
                }
            }
            for hop in nodes.windows(2) {
                if !mrrg.has_edge(hop[0], hop[1]) {
                    return Err(ValidationError::MissingEdge {
                        from: hop[0],
                        to: hop[1],
                    });
                }
            }
            let last = nodes[nodes.len() - 2];
            if mrrg.fanin(nodes[nodes.len() - 1]).get(route.entry_port) != Some(&last) {
                return Err(ValidationError::EntryPort {
                    producer: y,
                    sink: x,
                    port: route.entry_port,
                });
            }
        }
    }
    Ok(())
}

fn check_timing(
    problem: &MappingProblem,
    order: &[DfgNodeId],
    mapping: &Mapping,
    ii: u32,
    max_delay: u32,
) -> Result<Timing, ValidationError> {
    let (dfg, mrrg) = (&problem.dfg, &problem.mrrg);
    let mut timing = Timing {
        fire_times: vec![0; dfg.len()],
        relative_skew: vec![0; dfg.len()],
    };
    for &x in order {
        let inputs = dfg.true_inputs(x);
        if inputs.is_empty() {
            timing.fire_times[x.index()] = mrrg.base_offset(mapping.placement[x.index()]);
        }
        let mut latest: Option<i64> = None;
        for y in inputs {
            let route = mapping
                .route(y, x)
                .ok_or(ValidationError::MissingRoute { producer: y, sink: x })?;
            let arrival = timing.fire_times[y.index()] + i64::from(mrrg.path_latency(&route.nodes));
            match latest {
                None => latest = Some(arrival),
                Some(current) if current != arrival => {
                    if (current - arrival).abs() > i64::from(max_delay) {
                        return Err(ValidationError::SkewExceeded {
                            op: x,
                            skew: (current - arrival).abs(),
                            max_delay,
                        });
                    }
                    timing.relative_skew[x.index()] = if route.entry_port == 0 {
                        arrival - current
                    } else {
                        current - arrival
                    };
                    latest = Some(current.max(arrival));
                }
                Some(_) => {}
            }
        }
        if dfg.has_self_loop(x) {
            let route = mapping
                .route(x, x)
                .ok_or(ValidationError::MissingRoute { producer: x, sink: x })?;
            let latency = mrrg.path_latency(&route.nodes);
            if latency != ii {
                return Err(ValidationError::SelfLoopLatency { op: x, latency, ii });
            }
        }
        if let Some(t) = latest {
            timing.fire_times[x.index()] = t;
        }
    }
    Ok(timing)
}
