//! The data-flow graph of the computation being mapped.

use crate::ids::{DfgNodeId, Opcode};

/// One operation of the DFG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfgOp {
    /// The operation's id (its position in the DFG).
    pub id: DfgNodeId,
    /// Human-readable name, used in the placement report.
    pub name: String,
    /// What the operation computes.
    pub opcode: Opcode,
    /// Whether operand order is irrelevant. Non-commutative operations with
    /// several operands must receive each operand on a fixed input port.
    pub commutative: bool,
}

/// An immutable data-flow graph.
///
/// Operands are kept per operation in ascending operand-slot order, so the
/// position of an operand in [`operands`](Dfg::operands) is the input port it
/// expects on a non-commutative operation.
#[derive(Clone, Debug, Default)]
pub struct Dfg {
    ops: Vec<DfgOp>,
    operands: Vec<Vec<(u32, DfgNodeId)>>,
    consumers: Vec<Vec<DfgNodeId>>,
}

impl Dfg {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation and returns its id.
    pub fn add_op(&mut self, name: impl Into<String>, opcode: Opcode, commutative: bool) -> DfgNodeId {
        let id = DfgNodeId::from_raw(self.ops.len() as u32);
        self.ops.push(DfgOp {
            id,
            name: name.into(),
            opcode,
            commutative,
        });
        self.operands.push(Vec::new());
        self.consumers.push(Vec::new());
        id
    }

    /// Records that `sink` reads the output of `source` in operand `slot`.
    ///
    /// `source == sink` is a self-loop: the operation reads its own result from
    /// the previous pipeline iteration.
    pub fn connect(&mut self, source: DfgNodeId, sink: DfgNodeId, slot: u32) {
        let list = &mut self.operands[sink.index()];
        let at = list.partition_point(|&(s, _)| s <= slot);
        list.insert(at, (slot, source));
        let consumers = &mut self.consumers[source.index()];
        if !consumers.contains(&sink) {
            consumers.push(sink);
        }
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if the graph has no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Looks up an operation.
    pub fn op(&self, id: DfgNodeId) -> &DfgOp {
        &self.ops[id.index()]
    }

    /// All operations in id order.
    pub fn ops(&self) -> &[DfgOp] {
        &self.ops
    }

    /// All operation ids in order.
    pub fn ids(&self) -> impl Iterator<Item = DfgNodeId> {
        (0..self.ops.len() as u32).map(DfgNodeId::from_raw)
    }

    /// Operand producers of `id` in slot order, one entry per operand.
    pub fn operands(&self, id: DfgNodeId) -> impl Iterator<Item = DfgNodeId> + '_ {
        self.operands[id.index()].iter().map(|&(_, src)| src)
    }

    /// Number of operands of `id`, counting repeated producers.
    pub fn operand_count(&self, id: DfgNodeId) -> usize {
        self.operands[id.index()].len()
    }

    /// Position of the first operand of `sink` produced by `source`.
    pub fn operand_index(&self, sink: DfgNodeId, source: DfgNodeId) -> Option<usize> {
        self.operands(sink).position(|src| src == source)
    }

    /// Distinct producers feeding `id`, excluding `id` itself, in slot order.
    pub fn true_inputs(&self, id: DfgNodeId) -> Vec<DfgNodeId> {
        let mut inputs = Vec::new();
        for src in self.operands(id) {
            if src != id && !inputs.contains(&src) {
                inputs.push(src);
            }
        }
        inputs
    }

    /// Returns `true` if `id` consumes its own output.
    pub fn has_self_loop(&self, id: DfgNodeId) -> bool {
        self.operands(id).any(|src| src == id)
    }

    /// Distinct consumers of `id`'s output, in the order they were connected.
    /// Includes `id` itself when it has a self-loop.
    pub fn consumers(&self, id: DfgNodeId) -> &[DfgNodeId] {
        &self.consumers[id.index()]
    }

    /// Looks up an operation by name.
    pub fn find(&self, name: &str) -> Option<DfgNodeId> {
        self.ops.iter().find(|op| op.name == name).map(|op| op.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(n: u32) -> Opcode {
        Opcode::from_raw(n)
    }

    #[test]
    fn operands_sorted_by_slot() {
        let mut dfg = Dfg::new();
        let a = dfg.add_op("a", op(0), false);
        let b = dfg.add_op("b", op(0), false);
        let sub = dfg.add_op("sub", op(2), false);
        dfg.connect(b, sub, 1);
        dfg.connect(a, sub, 0);
        assert_eq!(dfg.operands(sub).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(dfg.operand_index(sub, b), Some(1));
        assert_eq!(dfg.operand_index(sub, sub), None);
    }

    #[test]
    fn self_loop_is_not_a_true_input() {
        let mut dfg = Dfg::new();
        let a = dfg.add_op("a", op(0), true);
        let acc = dfg.add_op("acc", op(1), true);
        dfg.connect(a, acc, 0);
        dfg.connect(acc, acc, 1);
        assert!(dfg.has_self_loop(acc));
        assert!(!dfg.has_self_loop(a));
        assert_eq!(dfg.true_inputs(acc), vec![a]);
        assert_eq!(dfg.consumers(acc), &[acc]);
    }

    #[test]
    fn repeated_producer_counted_once_as_input() {
        let mut dfg = Dfg::new();
        let a = dfg.add_op("a", op(0), true);
        let sq = dfg.add_op("square", op(3), true);
        dfg.connect(a, sq, 0);
        dfg.connect(a, sq, 1);
        assert_eq!(dfg.operand_count(sq), 2);
        assert_eq!(dfg.true_inputs(sq), vec![a]);
        assert_eq!(dfg.consumers(a), &[sq]);
    }

    #[test]
    fn find_by_name() {
        let mut dfg = Dfg::new();
        dfg.add_op("x", op(0), true);
        let y = dfg.add_op("y", op(0), true);
        assert_eq!(dfg.find("y"), Some(y));
        assert_eq!(dfg.find("z"), None);
        assert_eq!(dfg.len(), 2);
    }
}
