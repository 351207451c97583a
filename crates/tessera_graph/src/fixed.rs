//! Forced candidate sets for selected operations.

use crate::dfg::Dfg;
use crate::error::LoadError;
use crate::ids::{DfgNodeId, MrrgNodeId};
use crate::mrrg::Mrrg;
use std::collections::BTreeMap;

/// Pre-binds operations to explicit lists of function nodes.
///
/// An operation listed here may only be placed on one of its listed nodes;
/// every other operation is placed by opcode support.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedMapping {
    entries: BTreeMap<DfgNodeId, Vec<MrrgNodeId>>,
}

impl FixedMapping {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `nodes` to the candidate list of `op`.
    pub fn insert(&mut self, op: DfgNodeId, nodes: impl IntoIterator<Item = MrrgNodeId>) {
        let list = self.entries.entry(op).or_default();
        for node in nodes {
            if !list.contains(&node) {
                list.push(node);
            }
        }
    }

    /// The forced candidates for `op`, if it is fixed.
    pub fn get(&self, op: DfgNodeId) -> Option<&[MrrgNodeId]> {
        self.entries.get(&op).map(Vec::as_slice)
    }

    /// Returns `true` if `op` has a forced candidate list.
    pub fn contains(&self, op: DfgNodeId) -> bool {
        self.entries.contains_key(&op)
    }

    /// Returns `true` if no operation is fixed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over fixed operations and their candidates.
    pub fn iter(&self) -> impl Iterator<Item = (DfgNodeId, &[MrrgNodeId])> {
        self.entries.iter().map(|(&op, nodes)| (op, nodes.as_slice()))
    }

    /// Checks every entry against the graphs: ids in range, targets are
    /// function nodes that support the operation's opcode.
    pub fn check(&self, dfg: &Dfg, mrrg: &Mrrg) -> Result<(), LoadError> {
        for (op, nodes) in self.iter() {
            if op.index() >= dfg.len() {
                return Err(LoadError::OutOfRange {
                    what: "fixed operation",
                    index: op.as_raw(),
                    len: dfg.len(),
                });
            }
            let dfg_op = dfg.op(op);
            for &node in nodes {
                if node.index() >= mrrg.len() {
                    return Err(LoadError::OutOfRange {
                        what: "fixed MRRG node",
                        index: node.as_raw(),
                        len: mrrg.len(),
                    });
                }
                if !mrrg.is_function(node) {
                    return Err(LoadError::FixedNotFunction {
                        op: dfg_op.name.clone(),
                        node: mrrg.node(node).name.clone(),
                    });
                }
                if !mrrg.supports(node, dfg_op.opcode) {
                    return Err(LoadError::FixedUnsupported {
                        op: dfg_op.name.clone(),
                        node: mrrg.node(node).name.clone(),
                        opcode: dfg_op.opcode.as_raw(),
                    });
                }
            }
        }
        Ok(())
    }
}
