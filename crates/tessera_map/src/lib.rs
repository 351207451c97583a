//! Heuristic placement and routing of data-flow graphs onto CGRAs.
//!
//! The mapper assigns every DFG operation to a function node of the MRRG and
//! every dependency edge to a timed path through its routing nodes, so that:
//!
//! - no function node hosts two operations and no routing node carries two
//!   different values,
//! - converging inputs of an operation arrive within `max_delay` cycles of
//!   each other,
//! - every self-loop takes exactly one initiation interval.
//!
//! # Pipeline
//!
//! 1. **Order**: topological order of the DFG ignoring self-loops ([`topo`]).
//! 2. **Search**: backtracking placement with nested routing, bounded by a
//!    try budget per attempt ([`placement`], [`routing`]).
//! 3. **Validate**: every found assignment is re-checked from scratch
//!    ([`validate`]).
//! 4. **Retry**: exhausted attempts restart with a reshuffled candidate order
//!    until the attempt or time limit ([`map`]).
//! 5. **Extract**: placement and port-usage reports ([`extract`]).

#![warn(missing_docs)]

pub mod extract;
pub mod mapping;
mod placement;
pub mod problem;
mod routing;
mod search;
pub mod state;
pub mod topo;
pub mod validate;

pub use extract::{interconnect_report, placement_report, write_artifacts};
pub use mapping::{MapOutcome, Mapping, Route, Timing, UnmappedReason};
pub use placement::cost::cut_tries;
pub use problem::MappingProblem;
pub use state::{Occupancy, Placement, Snapshot};
pub use topo::{topological_order, CycleError};
pub use validate::{validate, ValidationError};

use log::{debug, info};
use placement::cost::CostModel;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use search::{AttemptResult, Search};
use std::time::{Duration, Instant};
use tessera_common::{InternalError, TesseraResult};
use tessera_config::MappingConfig;
use tessera_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use tessera_graph::MrrgNodeId;

/// The DFG has a cycle that is not a self-loop.
pub const NOT_A_DAG: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);
/// All attempts exhausted without a mapping.
pub const ATTEMPT_LIMIT: DiagnosticCode = DiagnosticCode::new(Category::Search, 201);
/// The wall-clock limit passed without a mapping.
pub const TIME_LIMIT: DiagnosticCode = DiagnosticCode::new(Category::Search, 202);
/// A mapping was found.
pub const MAPPING_FOUND: DiagnosticCode = DiagnosticCode::new(Category::Search, 203);
/// An operation of the found mapping waits on inputs that arrive at
/// different cycles.
pub const INPUT_SKEW: DiagnosticCode = DiagnosticCode::new(Category::Timing, 301);
/// Some operation cannot be placed on any function node.
pub const NO_CANDIDATES: DiagnosticCode = DiagnosticCode::new(Category::Warning, 401);

/// Searches for a mapping of `problem` within the bounds of `config`.
///
/// Problems with the input (a cyclic DFG, an operation no node supports) and
/// exhausted bounds are reported through `sink` and yield
/// [`MapOutcome::Unmapped`]. `Err` is reserved for defects in the mapper
/// itself: an out-of-range configuration, or a found assignment that fails
/// validation.
pub fn map(
    problem: &MappingProblem,
    config: &MappingConfig,
    sink: &DiagnosticSink,
) -> TesseraResult<MapOutcome> {
    if config.ii == 0 || config.max_attempts == 0 {
        return Err(InternalError::new("mapping config needs ii >= 1 and max_attempts >= 1"));
    }

    let order = match topological_order(&problem.dfg) {
        Ok(order) => order,
        Err(cycle) => {
            let names: Vec<&str> = cycle
                .stuck
                .iter()
                .map(|&op| problem.dfg.op(op).name.as_str())
                .collect();
            sink.emit(
                Diagnostic::error(NOT_A_DAG, cycle.to_string())
                    .with_note(format!("unordered operations: {}", names.join(", "))),
            );
            return Ok(MapOutcome::Unmapped(UnmappedReason::NotADag));
        }
    };

    let mut candidates: Vec<MrrgNodeId> = problem.mrrg.function_nodes().collect();
    for op in problem.dfg.ids() {
        if !candidates.iter().any(|&node| problem.can_host(op, node)) {
            let dfg_op = problem.dfg.op(op);
            sink.emit(
                Diagnostic::warning(
                    NO_CANDIDATES,
                    format!("operation `{}` has no function node to run on", dfg_op.name),
                )
                .with_note(format!("no function node supports opcode {}", dfg_op.opcode))
                .with_help("check the fixed mapping and the architecture's opcode sets"),
            );
            return Ok(MapOutcome::Unmapped(UnmappedReason::NoCandidates { op }));
        }
    }

    let cost = CostModel::new(problem);
    let deadline = config
        .time_limit_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut rng = StdRng::seed_from_u64(config.seed);

    info!(
        "mapping {} operations onto {} MRRG nodes ({} function), II {}",
        problem.dfg.len(),
        problem.mrrg.len(),
        candidates.len(),
        config.ii
    );

    for attempt in 0..config.max_attempts {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            return Ok(time_limit(sink, attempt));
        }
        if attempt > 0 {
            candidates.shuffle(&mut rng);
        }
        debug!("attempt {}", attempt + 1);

        let mut search = Search::new(problem, config, &order, &cost, &candidates, deadline);
        search.place(0);
        match search.finish() {
            AttemptResult::Found(mut mapping) => {
                mapping.attempts = attempt + 1;
                info!(
                    "mapping found in attempt {} after {} tries",
                    mapping.attempts, mapping.tries
                );
                sink.emit(Diagnostic::note(
                    MAPPING_FOUND,
                    format!(
                        "mapping found in attempt {} after {} placement tries",
                        mapping.attempts, mapping.tries
                    ),
                ));
                report_skew(problem, &mapping, sink);
                return Ok(MapOutcome::Mapped(*mapping));
            }
            AttemptResult::Invalid(e) => {
                return Err(InternalError::new(format!(
                    "search accepted an assignment that fails validation: {e}"
                )));
            }
            AttemptResult::Exhausted { tries } => {
                debug!("attempt {} exhausted after {tries} tries", attempt + 1);
            }
        }
    }

    if deadline.is_some_and(|d| Instant::now() >= d) {
        return Ok(time_limit(sink, config.max_attempts));
    }
    sink.emit(
        Diagnostic::error(ATTEMPT_LIMIT, "no mapping found")
            .with_note(format!(
                "{} attempts of {} placement tries each were exhausted",
                config.max_attempts, config.try_budget
            ))
            .with_help("raise `max_attempts` or `try_budget`, or relax `ii` and `max_delay`"),
    );
    info!("no mapping after {} attempts", config.max_attempts);
    Ok(MapOutcome::Unmapped(UnmappedReason::AttemptLimit {
        attempts: config.max_attempts,
    }))
}

/// Notes every operation whose inputs are held to line up.
fn report_skew(problem: &MappingProblem, mapping: &Mapping, sink: &DiagnosticSink) {
    let timing = &mapping.timing;
    for (op, (&skew, &fire)) in problem
        .dfg
        .ops()
        .iter()
        .zip(timing.relative_skew.iter().zip(&timing.fire_times))
    {
        if skew == 0 {
            continue;
        }
        let late = if skew > 0 { "the port 0 input" } else { "an input on a later port" };
        sink.emit(
            Diagnostic::note(
                INPUT_SKEW,
                format!("inputs of `{}` arrive {} cycles apart", op.name, skew.abs()),
            )
            .with_note(format!("{late} arrives last, at cycle {fire}")),
        );
    }
}

fn time_limit(sink: &DiagnosticSink, attempts: u32) -> MapOutcome {
    sink.emit(
        Diagnostic::error(TIME_LIMIT, "no mapping found before the time limit")
            .with_note(format!("{attempts} attempts were started")),
    );
    info!("time limit reached after {attempts} attempts");
    MapOutcome::Unmapped(UnmappedReason::TimeLimit { attempts })
}
