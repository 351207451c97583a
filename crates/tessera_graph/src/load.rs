//! JSON description loaders for the DFG, MRRG, latency table, and fixed
//! mapping.
//!
//! Each loader has a `load_*` variant reading a file and a `*_from_str`
//! variant used by tests.

use crate::dfg::Dfg;
use crate::error::LoadError;
use crate::fixed::FixedMapping;
use crate::ids::{DfgNodeId, MrrgNodeId, Opcode};
use crate::mrrg::{Mrrg, MrrgNodeKind};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Latency per MRRG node name. Nodes not listed have latency 0.
pub type LatencyTable = BTreeMap<String, u32>;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DfgDescription {
    ops: Vec<OpDescription>,
    #[serde(default)]
    values: Vec<ValueDescription>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OpDescription {
    name: String,
    #[serde(default)]
    output: Option<u32>,
    opcode: u32,
    #[serde(default)]
    commutative: bool,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ValueDescription {
    #[allow(dead_code)]
    name: String,
    #[serde(default)]
    fanout: Vec<UseDescription>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UseDescription {
    op: u32,
    operand: u32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MrrgDescription {
    #[serde(default)]
    function: Vec<NodeDescription>,
    #[serde(default)]
    routing: Vec<NodeDescription>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeDescription {
    name: String,
    #[serde(default)]
    fanin: Vec<PortDescription>,
    #[serde(default)]
    fanout: Vec<PortDescription>,
    #[serde(default)]
    ops: Vec<u32>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PortDescription {
    index: u32,
    kind: MrrgNodeKind,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FixedEntry {
    op: u32,
    nodes: Vec<u32>,
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T: DeserializeOwned>(what: &'static str, text: &str) -> Result<T, LoadError> {
    serde_json::from_str(text).map_err(|e| LoadError::Parse {
        what,
        message: e.to_string(),
    })
}

fn in_range(what: &'static str, index: u32, len: usize) -> Result<u32, LoadError> {
    if (index as usize) < len {
        Ok(index)
    } else {
        Err(LoadError::OutOfRange { what, index, len })
    }
}

/// Reads a DFG description file.
pub fn load_dfg(path: &Path) -> Result<Dfg, LoadError> {
    dfg_from_str(&read(path)?)
}

/// Builds a DFG from its JSON description.
///
/// Every operation with an `output` value becomes the source of a dependency
/// edge to each use of that value.
pub fn dfg_from_str(text: &str) -> Result<Dfg, LoadError> {
    let desc: DfgDescription = parse("DFG", text)?;
    let mut dfg = Dfg::new();
    for op in &desc.ops {
        dfg.add_op(op.name.clone(), Opcode::from_raw(op.opcode), op.commutative);
    }

    let mut driver: Vec<Option<usize>> = vec![None; desc.values.len()];
    for (i, op) in desc.ops.iter().enumerate() {
        let Some(value) = op.output else { continue };
        let v = in_range("DFG value", value, desc.values.len())? as usize;
        if let Some(first) = driver[v] {
            return Err(LoadError::DuplicateDriver {
                value,
                first: desc.ops[first].name.clone(),
                second: op.name.clone(),
            });
        }
        driver[v] = Some(i);
        for use_ in &desc.values[v].fanout {
            let sink = in_range("DFG operation", use_.op, desc.ops.len())?;
            dfg.connect(
                DfgNodeId::from_raw(i as u32),
                DfgNodeId::from_raw(sink),
                use_.operand,
            );
        }
    }
    Ok(dfg)
}

/// Reads an MRRG description file.
pub fn load_mrrg(path: &Path) -> Result<Mrrg, LoadError> {
    mrrg_from_str(&read(path)?)
}

/// Builds an MRRG from its JSON description.
///
/// Function nodes receive global ids first, in listed order, followed by
/// routing nodes. Fan-in lists keep their listed order as the physical port
/// order. Every edge must be listed on both of its ends.
pub fn mrrg_from_str(text: &str) -> Result<Mrrg, LoadError> {
    let desc: MrrgDescription = parse("MRRG", text)?;
    let functions = desc.function.len();
    let total = functions + desc.routing.len();

    let global = |port: &PortDescription| -> Result<MrrgNodeId, LoadError> {
        let raw = match port.kind {
            MrrgNodeKind::Function => in_range("function node", port.index, functions)?,
            MrrgNodeKind::Routing => {
                in_range("routing node", port.index, desc.routing.len())? + functions as u32
            }
        };
        Ok(MrrgNodeId::from_raw(raw))
    };

    let mut mrrg = Mrrg::new();
    for node in &desc.function {
        mrrg.add_function(node.name.clone(), node.ops.iter().map(|&o| Opcode::from_raw(o)));
    }
    for node in &desc.routing {
        mrrg.add_routing(node.name.clone());
    }

    let listed = desc.function.iter().chain(desc.routing.iter());
    let mut ports = Vec::with_capacity(total);
    for node in listed {
        let fanin = node.fanin.iter().map(&global).collect::<Result<Vec<_>, _>>()?;
        let fanout = node.fanout.iter().map(&global).collect::<Result<Vec<_>, _>>()?;
        ports.push((fanin, fanout));
    }
    for (i, (fanin, fanout)) in ports.into_iter().enumerate() {
        let id = MrrgNodeId::from_raw(i as u32);
        mrrg.set_ports(id, fanin, fanout);
    }
    check_symmetric(&mrrg)?;
    Ok(mrrg)
}

fn check_symmetric(mrrg: &Mrrg) -> Result<(), LoadError> {
    let mismatch = |from: MrrgNodeId, to: MrrgNodeId| LoadError::InconsistentEdge {
        from: mrrg.node(from).name.clone(),
        to: mrrg.node(to).name.clone(),
    };
    for node in mrrg.nodes() {
        for &to in mrrg.fanout(node.id) {
            if !mrrg.fanin(to).contains(&node.id) {
                return Err(mismatch(node.id, to));
            }
        }
        for &from in mrrg.fanin(node.id) {
            if !mrrg.fanout(from).contains(&node.id) {
                return Err(mismatch(from, node.id));
            }
        }
    }
    Ok(())
}

/// Reads a latency table file.
pub fn load_latencies(path: &Path) -> Result<LatencyTable, LoadError> {
    latencies_from_str(&read(path)?)
}

/// Parses a latency table: a JSON object from node name to latency.
pub fn latencies_from_str(text: &str) -> Result<LatencyTable, LoadError> {
    parse("latency table", text)
}

/// Reads a fixed-mapping file. Entries are checked against the graphs when
/// the mapping problem is assembled.
pub fn load_fixed(path: &Path) -> Result<FixedMapping, LoadError> {
    fixed_from_str(&read(path)?)
}

/// Parses a fixed mapping: `[{"op": <dfg index>, "nodes": [<mrrg id>, ...]}]`.
pub fn fixed_from_str(text: &str) -> Result<FixedMapping, LoadError> {
    let entries: Vec<FixedEntry> = parse("fixed mapping", text)?;
    let mut fixed = FixedMapping::new();
    for entry in entries {
        fixed.insert(
            DfgNodeId::from_raw(entry.op),
            entry.nodes.into_iter().map(MrrgNodeId::from_raw),
        );
    }
    Ok(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CHAIN_DFG: &str = r#"{
        "ops": [
            {"name": "load", "output": 0, "opcode": 1},
            {"name": "sub", "output": 1, "opcode": 2, "commutative": false},
            {"name": "store", "opcode": 3}
        ],
        "values": [
            {"name": "v0", "fanout": [{"op": 1, "operand": 1}, {"op": 1, "operand": 0}]},
            {"name": "v1", "fanout": [{"op": 2, "operand": 0}, {"op": 1, "operand": 2}]}
        ]
    }"#;

    const SMALL_MRRG: &str = r#"{
        "function": [
            {"name": "0:pe0", "ops": [1, 2], "fanout": [{"index": 0, "kind": "routing"}]},
            {"name": "1:pe1", "ops": [2, 3],
             "fanin": [{"index": 0, "kind": "routing"}, {"index": 1, "kind": "routing"}]}
        ],
        "routing": [
            {"name": "r0", "fanin": [{"index": 0, "kind": "function"}],
             "fanout": [{"index": 1, "kind": "function"}]},
            {"name": "r1", "fanout": [{"index": 1, "kind": "function"}]}
        ]
    }"#;

    #[test]
    fn dfg_edges_from_values() {
        let dfg = dfg_from_str(CHAIN_DFG).unwrap();
        let load = DfgNodeId::from_raw(0);
        let sub = DfgNodeId::from_raw(1);
        let store = DfgNodeId::from_raw(2);
        assert_eq!(dfg.len(), 3);
        assert_eq!(dfg.operands(sub).collect::<Vec<_>>(), vec![load, load, sub]);
        assert!(dfg.has_self_loop(sub));
        assert_eq!(dfg.true_inputs(store), vec![sub]);
        assert!(!dfg.op(sub).commutative);
        assert!(!dfg.op(store).commutative);
    }

    #[test]
    fn dfg_value_out_of_range() {
        let text = r#"{"ops": [{"name": "a", "output": 3, "opcode": 0}], "values": []}"#;
        assert!(matches!(
            dfg_from_str(text),
            Err(LoadError::OutOfRange { what: "DFG value", index: 3, .. })
        ));
    }

    #[test]
    fn dfg_use_out_of_range() {
        let text = r#"{"ops": [{"name": "a", "output": 0, "opcode": 0}],
                       "values": [{"name": "v", "fanout": [{"op": 5, "operand": 0}]}]}"#;
        assert!(matches!(
            dfg_from_str(text),
            Err(LoadError::OutOfRange { what: "DFG operation", .. })
        ));
    }

    #[test]
    fn dfg_duplicate_driver() {
        let text = r#"{"ops": [{"name": "a", "output": 0, "opcode": 0},
                               {"name": "b", "output": 0, "opcode": 0}],
                       "values": [{"name": "v"}]}"#;
        assert!(matches!(dfg_from_str(text), Err(LoadError::DuplicateDriver { .. })));
    }

    #[test]
    fn dfg_parse_error() {
        assert!(matches!(
            dfg_from_str("{\"ops\": 3}"),
            Err(LoadError::Parse { what: "DFG", .. })
        ));
    }

    #[test]
    fn mrrg_global_ids_and_port_order() {
        let mrrg = mrrg_from_str(SMALL_MRRG).unwrap();
        assert_eq!(mrrg.len(), 4);
        let pe0 = mrrg.find("0:pe0").unwrap();
        let pe1 = mrrg.find("1:pe1").unwrap();
        let r0 = mrrg.find("r0").unwrap();
        let r1 = mrrg.find("r1").unwrap();
        assert_eq!(r0.as_raw(), 2);
        assert_eq!(mrrg.fanin(pe1), &[r0, r1]);
        assert_eq!(mrrg.fanout(pe0), &[r0]);
        assert!(mrrg.supports(pe1, Opcode::from_raw(3)));
        assert_eq!(mrrg.base_offset(pe1), 1);
    }

    #[test]
    fn mrrg_rejects_one_sided_edge() {
        let text = r#"{
            "function": [{"name": "0:pe0", "fanout": [{"index": 0, "kind": "routing"}]}],
            "routing": [{"name": "r0"}]
        }"#;
        assert!(matches!(
            mrrg_from_str(text),
            Err(LoadError::InconsistentEdge { .. })
        ));
    }

    #[test]
    fn mrrg_rejects_out_of_range_port() {
        let text = r#"{"function": [{"name": "0:pe0", "fanout": [{"index": 7, "kind": "routing"}]}]}"#;
        assert!(matches!(
            mrrg_from_str(text),
            Err(LoadError::OutOfRange { what: "routing node", index: 7, len: 0 })
        ));
    }

    #[test]
    fn latencies_apply_by_name() {
        let mut mrrg = mrrg_from_str(SMALL_MRRG).unwrap();
        let table = latencies_from_str(r#"{"r0": 2, "0:pe0": 1, "ghost": 9}"#).unwrap();
        mrrg.apply_latencies(&table);
        let r0 = mrrg.find("r0").unwrap();
        let pe0 = mrrg.find("0:pe0").unwrap();
        let pe1 = mrrg.find("1:pe1").unwrap();
        assert_eq!(mrrg.latency(r0), 2);
        assert_eq!(mrrg.latency(pe0), 1);
        assert_eq!(mrrg.latency(pe1), 0);
        assert_eq!(mrrg.path_latency(&[pe0, r0, pe1]), 3);
    }

    #[test]
    fn fixed_entries_parse() {
        let fixed = fixed_from_str(r#"[{"op": 1, "nodes": [1]}, {"op": 1, "nodes": [0, 1]}]"#).unwrap();
        let nodes = fixed.get(DfgNodeId::from_raw(1)).unwrap();
        assert_eq!(nodes, &[MrrgNodeId::from_raw(1), MrrgNodeId::from_raw(0)]);
    }

    #[test]
    fn load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dfg.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(CHAIN_DFG.as_bytes()).unwrap();
        assert_eq!(load_dfg(&path).unwrap().len(), 3);
        assert!(matches!(
            load_mrrg(&dir.path().join("missing.json")),
            Err(LoadError::Io { .. })
        ));
    }
}
