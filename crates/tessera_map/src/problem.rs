//! The immutable input of one mapping run.

use tessera_graph::{Dfg, DfgNodeId, FixedMapping, LoadError, Mrrg, MrrgNodeId};

/// A DFG, the MRRG it should be mapped onto, and optional forced placements.
#[derive(Clone, Debug)]
pub struct MappingProblem {
    /// The computation.
    pub dfg: Dfg,
    /// The target array.
    pub mrrg: Mrrg,
    /// Forced candidate lists for selected operations.
    pub fixed: FixedMapping,
}

impl MappingProblem {
    /// Assembles a problem, checking the fixed mapping against both graphs.
    pub fn new(dfg: Dfg, mrrg: Mrrg, fixed: FixedMapping) -> Result<Self, LoadError> {
        fixed.check(&dfg, &mrrg)?;
        Ok(Self { dfg, mrrg, fixed })
    }

    /// Returns `true` if `op` may be placed on `node`: one of its forced
    /// candidates when it is fixed, otherwise any function node supporting
    /// its opcode.
    pub fn can_host(&self, op: DfgNodeId, node: MrrgNodeId) -> bool {
        match self.fixed.get(op) {
            Some(forced) => forced.contains(&node),
            None => self.mrrg.is_function(node) && self.mrrg.supports(node, self.dfg.op(op).opcode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_graph::Opcode;

    fn graphs() -> (Dfg, Mrrg) {
        let mut dfg = Dfg::new();
        dfg.add_op("a", Opcode::from_raw(1), true);
        dfg.add_op("b", Opcode::from_raw(1), true);
        let mut mrrg = Mrrg::new();
        mrrg.add_function("0:pe0", [Opcode::from_raw(1)]);
        mrrg.add_function("0:pe1", [Opcode::from_raw(1)]);
        mrrg.add_routing("r0");
        (dfg, mrrg)
    }

    #[test]
    fn opcode_decides_unfixed_ops() {
        let (dfg, mrrg) = graphs();
        let p = MappingProblem::new(dfg, mrrg, FixedMapping::new()).unwrap();
        let a = DfgNodeId::from_raw(0);
        assert!(p.can_host(a, MrrgNodeId::from_raw(0)));
        assert!(p.can_host(a, MrrgNodeId::from_raw(1)));
        assert!(!p.can_host(a, MrrgNodeId::from_raw(2)));
    }

    #[test]
    fn fixed_list_overrides_opcode() {
        let (dfg, mrrg) = graphs();
        let mut fixed = FixedMapping::new();
        fixed.insert(DfgNodeId::from_raw(1), [MrrgNodeId::from_raw(1)]);
        let p = MappingProblem::new(dfg, mrrg, fixed).unwrap();
        let b = DfgNodeId::from_raw(1);
        assert!(!p.can_host(b, MrrgNodeId::from_raw(0)));
        assert!(p.can_host(b, MrrgNodeId::from_raw(1)));
    }

    #[test]
    fn bad_fixed_mapping_rejected() {
        let (dfg, mrrg) = graphs();
        let mut fixed = FixedMapping::new();
        fixed.insert(DfgNodeId::from_raw(0), [MrrgNodeId::from_raw(2)]);
        assert!(MappingProblem::new(dfg, mrrg, fixed).is_err());
    }
}
