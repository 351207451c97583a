//! The modulo routing-resource graph of the target array.

use crate::ids::{MrrgNodeId, Opcode};
use crate::load::LatencyTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Role of an MRRG node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MrrgNodeKind {
    /// Executes operations; hosts at most one DFG operation.
    Function,
    /// Carries values between function nodes.
    Routing,
}

/// One node of the MRRG.
#[derive(Clone, Debug)]
pub struct MrrgNode {
    /// Global id.
    pub id: MrrgNodeId,
    /// Textual identity. Function node names encode their base firing offset
    /// as a numeric prefix before the first `:`.
    pub name: String,
    /// Function or routing.
    pub kind: MrrgNodeKind,
    /// Opcodes a function node can execute. Empty for routing nodes.
    pub ops: BTreeSet<Opcode>,
    /// Cycles a value spends passing through this node.
    pub latency: u32,
    pub(crate) fanin: Vec<MrrgNodeId>,
    pub(crate) fanout: Vec<MrrgNodeId>,
}

/// An immutable MRRG.
#[derive(Clone, Debug, Default)]
pub struct Mrrg {
    nodes: Vec<MrrgNode>,
}

impl Mrrg {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: String, kind: MrrgNodeKind, ops: BTreeSet<Opcode>) -> MrrgNodeId {
        let id = MrrgNodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(MrrgNode {
            id,
            name,
            kind,
            ops,
            latency: 0,
            fanin: Vec::new(),
            fanout: Vec::new(),
        });
        id
    }

    /// Appends a function node supporting `ops`.
    pub fn add_function(
        &mut self,
        name: impl Into<String>,
        ops: impl IntoIterator<Item = Opcode>,
    ) -> MrrgNodeId {
        self.push(name.into(), MrrgNodeKind::Function, ops.into_iter().collect())
    }

    /// Appends a routing node.
    pub fn add_routing(&mut self, name: impl Into<String>) -> MrrgNodeId {
        self.push(name.into(), MrrgNodeKind::Routing, BTreeSet::new())
    }

    /// Adds the physical edge `from -> to`. The edge becomes the last fan-out of
    /// `from` and the last input port of `to`.
    pub fn connect(&mut self, from: MrrgNodeId, to: MrrgNodeId) {
        self.nodes[from.index()].fanout.push(to);
        self.nodes[to.index()].fanin.push(from);
    }

    /// Sets the latency of a node.
    pub fn set_latency(&mut self, id: MrrgNodeId, latency: u32) {
        self.nodes[id.index()].latency = latency;
    }

    pub(crate) fn set_ports(
        &mut self,
        id: MrrgNodeId,
        fanin: Vec<MrrgNodeId>,
        fanout: Vec<MrrgNodeId>,
    ) {
        let node = &mut self.nodes[id.index()];
        node.fanin = fanin;
        node.fanout = fanout;
    }

    /// Applies a latency table. Names that match no node are skipped with a
    /// warning.
    pub fn apply_latencies(&mut self, table: &LatencyTable) {
        for (name, &latency) in table {
            match self.find(name) {
                Some(id) => self.set_latency(id, latency),
                None => log::warn!("latency given for unknown MRRG node `{name}`"),
            }
        }
    }

    /// Number of nodes of both kinds.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node.
    pub fn node(&self, id: MrrgNodeId) -> &MrrgNode {
        &self.nodes[id.index()]
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> &[MrrgNode] {
        &self.nodes
    }

    /// Ids of all function nodes in declaration order.
    pub fn function_nodes(&self) -> impl Iterator<Item = MrrgNodeId> + '_ {
        self.nodes
            .iter()
            .filter(|n| n.kind == MrrgNodeKind::Function)
            .map(|n| n.id)
    }

    /// Returns `true` for function nodes.
    pub fn is_function(&self, id: MrrgNodeId) -> bool {
        self.nodes[id.index()].kind == MrrgNodeKind::Function
    }

    /// Drivers of `id`, in physical input-port order.
    pub fn fanin(&self, id: MrrgNodeId) -> &[MrrgNodeId] {
        &self.nodes[id.index()].fanin
    }

    /// Nodes driven by `id`.
    pub fn fanout(&self, id: MrrgNodeId) -> &[MrrgNodeId] {
        &self.nodes[id.index()].fanout
    }

    /// Latency of a single node.
    pub fn latency(&self, id: MrrgNodeId) -> u32 {
        self.nodes[id.index()].latency
    }

    /// Returns `true` if `id` can execute `opcode`.
    pub fn supports(&self, id: MrrgNodeId, opcode: Opcode) -> bool {
        self.nodes[id.index()].ops.contains(&opcode)
    }

    /// Returns `true` if the physical edge `from -> to` exists.
    pub fn has_edge(&self, from: MrrgNodeId, to: MrrgNodeId) -> bool {
        self.nodes[from.index()].fanout.contains(&to)
    }

    /// Cycles a value needs to travel `path`: the latency of every node except
    /// the last, which only receives it.
    pub fn path_latency(&self, path: &[MrrgNodeId]) -> u32 {
        match path.split_last() {
            Some((_, head)) => head.iter().map(|&n| self.latency(n)).sum(),
            None => 0,
        }
    }

    /// Base firing offset encoded in the node name, e.g. `2` for `"2:alu0"`.
    /// Names without a numeric prefix have offset 0.
    pub fn base_offset(&self, id: MrrgNodeId) -> i64 {
        let name = &self.nodes[id.index()].name;
        name.split_once(':')
            .and_then(|(prefix, _)| prefix.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Looks up a node by name.
    pub fn find(&self, name: &str) -> Option<MrrgNodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> (Mrrg, MrrgNodeId, MrrgNodeId, MrrgNodeId) {
        let mut g = Mrrg::new();
        let f0 = g.add_function("0:alu0", [Opcode::from_raw(1)]);
        let r0 = g.add_routing("r0");
        let f1 = g.add_function("1:alu1", [Opcode::from_raw(1), Opcode::from_raw(2)]);
        g.connect(f0, r0);
        g.connect(r0, f1);
        g.set_latency(f0, 1);
        g.set_latency(r0, 2);
        g.set_latency(f1, 5);
        (g, f0, r0, f1)
    }

    #[test]
    fn adjacency_both_directions() {
        let (g, f0, r0, f1) = line();
        assert_eq!(g.fanout(f0), &[r0]);
        assert_eq!(g.fanin(f1), &[r0]);
        assert!(g.has_edge(r0, f1));
        assert!(!g.has_edge(f1, r0));
    }

    #[test]
    fn path_latency_excludes_last_node() {
        let (g, f0, r0, f1) = line();
        assert_eq!(g.path_latency(&[f0, r0, f1]), 3);
        assert_eq!(g.path_latency(&[f0]), 0);
        assert_eq!(g.path_latency(&[]), 0);
    }

    #[test]
    fn base_offset_from_name() {
        let (mut g, f0, r0, f1) = line();
        assert_eq!(g.base_offset(f0), 0);
        assert_eq!(g.base_offset(f1), 1);
        assert_eq!(g.base_offset(r0), 0);
        let odd = g.add_function("pe:3", []);
        assert_eq!(g.base_offset(odd), 0);
    }

    #[test]
    fn function_nodes_and_support() {
        let (g, f0, r0, f1) = line();
        assert_eq!(g.function_nodes().collect::<Vec<_>>(), vec![f0, f1]);
        assert!(g.is_function(f0));
        assert!(!g.is_function(r0));
        assert!(g.supports(f1, Opcode::from_raw(2)));
        assert!(!g.supports(f0, Opcode::from_raw(2)));
        assert_eq!(g.find("r0"), Some(r0));
    }
}
