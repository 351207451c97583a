//! Text reports consumed by the downstream configuration generator.
//!
//! `<name>_r.txt` lists one `<op> <function node>` line per operation.
//! `<name>_i.txt` lists, for every used internal routing node with active
//! inputs and outputs, the indices of its active fan-in and fan-out ports,
//! followed by the selected opcode of every used internal function node.

use crate::mapping::Mapping;
use crate::problem::MappingProblem;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tessera_graph::{DfgNodeId, MrrgNodeId};

/// One line per operation, in operation order: `"<op name> <node name>\n"`.
pub fn placement_report(problem: &MappingProblem, mapping: &Mapping) -> String {
    let mut out = String::new();
    for (op, &node) in problem.dfg.ops().iter().zip(&mapping.placement) {
        let _ = writeln!(out, "{} {}", op.name, problem.mrrg.node(node).name);
    }
    out
}

/// Port usage of internal nodes whose name contains `marker`.
///
/// A routing node's port counts as active when some route of the node's
/// owning value crosses the edge behind it. Routing blocks come first in
/// node order, then function blocks in node order.
pub fn interconnect_report(problem: &MappingProblem, mapping: &Mapping, marker: &str) -> String {
    let mrrg = &problem.mrrg;
    let mut hops: HashSet<(DfgNodeId, MrrgNodeId, MrrgNodeId)> = HashSet::new();
    for route in &mapping.routes {
        for hop in route.nodes.windows(2) {
            hops.insert((route.source, hop[0], hop[1]));
        }
    }

    let mut routing = String::new();
    let mut function = String::new();
    for node in mrrg.nodes() {
        let id = node.id;
        if !mapping.used.get(id.index()).copied().unwrap_or(false) || !node.name.contains(marker) {
            continue;
        }
        if mrrg.is_function(id) {
            if let Some(op) = mapping.host(id) {
                let _ = write!(
                    function,
                    "<{}>\nSELECTED_OP\n{}\n",
                    node.name,
                    problem.dfg.op(op).opcode
                );
            }
            continue;
        }
        let Some(owner) = mapping.owners.get(id.index()).copied().flatten() else {
            continue;
        };
        let fanin: Vec<usize> = mrrg
            .fanin(id)
            .iter()
            .enumerate()
            .filter(|&(_, &from)| hops.contains(&(owner, from, id)))
            .map(|(i, _)| i)
            .collect();
        let fanout: Vec<usize> = mrrg
            .fanout(id)
            .iter()
            .enumerate()
            .filter(|&(_, &to)| hops.contains(&(owner, id, to)))
            .map(|(i, _)| i)
            .collect();
        if fanin.len() > 1 {
            log::debug!("`{}` merges {} inputs", node.name, fanin.len());
        }
        if fanin.is_empty() || fanout.is_empty() {
            continue;
        }
        let _ = writeln!(routing, "<{}>", node.name);
        for i in fanin {
            let _ = write!(routing, "{i} ");
        }
        routing.push('\n');
        for i in fanout {
            let _ = write!(routing, "{i} ");
        }
        routing.push('\n');
    }
    routing.push_str(&function);
    routing
}

/// Writes `<base>_r.txt` and `<base>_i.txt` and returns their paths.
pub fn write_artifacts(
    problem: &MappingProblem,
    mapping: &Mapping,
    base: &Path,
    marker: &str,
) -> std::io::Result<(PathBuf, PathBuf)> {
    let with_suffix = |suffix: &str| {
        let mut name = base.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    };
    let placement_path = with_suffix("_r.txt");
    let interconnect_path = with_suffix("_i.txt");
    std::fs::write(&placement_path, placement_report(problem, mapping))?;
    std::fs::write(&interconnect_path, interconnect_report(problem, mapping, marker))?;
    Ok((placement_path, interconnect_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{Route, Timing};
    use tessera_graph::{Dfg, FixedMapping, Mrrg, Opcode};

    /// `a` on `0:internalNode_a` feeds `b` on `1:internalNode_b` through
    /// `internalNode_x`, which also has an unused input from `pad` and an
    /// unused output to `spare`.
    fn fixture() -> (MappingProblem, Mapping) {
        let op = Opcode::from_raw(6);
        let mut dfg = Dfg::new();
        let a = dfg.add_op("a", op, true);
        let b = dfg.add_op("b", op, true);
        dfg.connect(a, b, 0);

        let mut mrrg = Mrrg::new();
        let fa = mrrg.add_function("0:internalNode_a", [op]);
        let fb = mrrg.add_function("1:internalNode_b", [op]);
        let pad = mrrg.add_routing("pad");
        let x = mrrg.add_routing("internalNode_x");
        let spare = mrrg.add_routing("internalNode_spare");
        mrrg.connect(pad, x);
        mrrg.connect(fa, x);
        mrrg.connect(x, spare);
        mrrg.connect(x, fb);

        let problem = MappingProblem::new(dfg, mrrg, FixedMapping::new()).unwrap();
        let mapping = Mapping {
            placement: vec![fa, fb],
            routes: vec![Route { source: a, sink: b, nodes: vec![fa, x, fb], entry_port: 0 }],
            used: vec![true, true, false, true, false],
            owners: vec![Some(a), Some(a), None, Some(a), None],
            timing: Timing::default(),
            attempts: 1,
            tries: 3,
        };
        (problem, mapping)
    }

    #[test]
    fn placement_lines() {
        let (problem, mapping) = fixture();
        assert_eq!(
            placement_report(&problem, &mapping),
            "a 0:internalNode_a\nb 1:internalNode_b\n"
        );
    }

    #[test]
    fn interconnect_blocks() {
        let (problem, mapping) = fixture();
        assert_eq!(
            interconnect_report(&problem, &mapping, "internalNode"),
            "<internalNode_x>\n1 \n1 \n\
             <0:internalNode_a>\nSELECTED_OP\n6\n\
             <1:internalNode_b>\nSELECTED_OP\n6\n"
        );
    }

    #[test]
    fn marker_filters_nodes() {
        let (problem, mapping) = fixture();
        assert_eq!(interconnect_report(&problem, &mapping, "nothing"), "");
    }

    #[test]
    fn artifacts_written_next_to_base() {
        let (problem, mapping) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("kernel");
        let (r, i) = write_artifacts(&problem, &mapping, &base, "internalNode").unwrap();
        assert_eq!(r, dir.path().join("kernel_r.txt"));
        assert_eq!(i, dir.path().join("kernel_i.txt"));
        let placed = std::fs::read_to_string(r).unwrap();
        assert_eq!(placed.lines().count(), 2);
        let ports = std::fs::read_to_string(i).unwrap();
        assert!(ports.starts_with("<internalNode_x>\n"));
    }
}
