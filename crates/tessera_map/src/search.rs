//! State of one search attempt.
//!
//! Placement ([`crate::placement`]) and routing ([`crate::routing`]) extend
//! [`Search`] with mutually nested recursive steps. Routing takes the next step
//! as a continuation and only invokes it once the edge is committed, so all
//! routing for an operation completes before the placement of the next one
//! starts.

use crate::mapping::{Mapping, Route};
use crate::placement::cost::CostModel;
use crate::problem::MappingProblem;
use crate::state::{Occupancy, Placement};
use crate::validate::{validate, ValidationError};
use std::collections::BTreeMap;
use std::time::Instant;
use tessera_config::MappingConfig;
use tessera_graph::{DfgNodeId, MrrgNodeId};

/// How an attempt ended.
#[derive(Debug)]
pub(crate) enum AttemptResult {
    /// A complete, validated mapping.
    Found(Box<Mapping>),
    /// The search produced an assignment the validator rejected.
    Invalid(ValidationError),
    /// Budget spent or search space exhausted.
    Exhausted {
        /// Tries spent.
        tries: u64,
    },
}

pub(crate) struct Search<'p> {
    pub(crate) problem: &'p MappingProblem,
    pub(crate) config: &'p MappingConfig,
    pub(crate) order: &'p [DfgNodeId],
    pub(crate) cost: &'p CostModel,
    /// Function nodes in this attempt's preference order.
    pub(crate) candidates: &'p [MrrgNodeId],
    deadline: Option<Instant>,
    /// Longest latency any route can have: `single_path_edge_limit` hops of
    /// the slowest node.
    pub(crate) route_len_limit: u32,
    /// First operation in `order` that reads each operation's value.
    pub(crate) first_consumer: Vec<Option<DfgNodeId>>,
    pub(crate) placement: Placement,
    pub(crate) occupancy: Occupancy,
    pub(crate) routes: BTreeMap<(DfgNodeId, DfgNodeId), Route>,
    /// Route of each value to its first consumer. Later consumers branch off
    /// one of its prefixes.
    pub(crate) wait_path: Vec<Option<Vec<MrrgNodeId>>>,
    pub(crate) fire: Vec<i64>,
    pub(crate) tries: u64,
    found: Option<Mapping>,
    invalid: Option<ValidationError>,
}

impl<'p> Search<'p> {
    pub(crate) fn new(
        problem: &'p MappingProblem,
        config: &'p MappingConfig,
        order: &'p [DfgNodeId],
        cost: &'p CostModel,
        candidates: &'p [MrrgNodeId],
        deadline: Option<Instant>,
    ) -> Self {
        let ops = problem.dfg.len();
        let nodes = problem.mrrg.len();
        let mut first_consumer = vec![None; ops];
        for &x in order {
            for src in problem.dfg.operands(x) {
                first_consumer[src.index()].get_or_insert(x);
            }
        }
        let slowest = problem.mrrg.nodes().iter().map(|n| u64::from(n.latency)).max();
        let route_len_limit = (config.single_path_edge_limit as u64)
            .saturating_mul(slowest.unwrap_or(0))
            .min(u64::from(u32::MAX)) as u32;
        Self {
            problem,
            config,
            order,
            cost,
            candidates,
            deadline,
            route_len_limit,
            first_consumer,
            placement: Placement::new(ops, nodes),
            occupancy: Occupancy::new(nodes),
            routes: BTreeMap::new(),
            wait_path: vec![None; ops],
            fire: vec![0; ops],
            tries: 0,
            found: None,
            invalid: None,
        }
    }

    /// Returns `true` once nothing more should be explored: a mapping was
    /// accepted or rejected, the try budget is spent, or time is up.
    pub(crate) fn halted(&self) -> bool {
        self.found.is_some()
            || self.invalid.is_some()
            || self.tries > self.config.try_budget
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Freezes the current complete assignment and validates it.
    pub(crate) fn accept(&mut self) {
        let Some(placement) = self.placement.complete() else {
            return;
        };
        let mut mapping = Mapping {
            placement,
            routes: self.routes.values().cloned().collect(),
            used: self.occupancy.used().to_vec(),
            owners: self.occupancy.owners().to_vec(),
            timing: Default::default(),
            attempts: 0,
            tries: self.tries,
        };
        match validate(
            self.problem,
            self.order,
            &mapping,
            self.config.ii,
            self.config.max_delay,
        ) {
            Ok(timing) => {
                mapping.timing = timing;
                self.found = Some(mapping);
            }
            Err(e) => {
                log::error!("search produced an invalid assignment: {e}");
                self.invalid = Some(e);
            }
        }
    }

    pub(crate) fn finish(self) -> AttemptResult {
        if let Some(mapping) = self.found {
            AttemptResult::Found(Box::new(mapping))
        } else if let Some(e) = self.invalid {
            AttemptResult::Invalid(e)
        } else {
            AttemptResult::Exhausted { tries: self.tries }
        }
    }
}
