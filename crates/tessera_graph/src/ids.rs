//! Index newtypes for graph entities.

use tessera_common::define_id;

define_id!(
    /// Position of an operation in the DFG operation list.
    DfgNodeId
);

define_id!(
    /// Global MRRG node id: function nodes first, then routing nodes.
    MrrgNodeId
);

define_id!(
    /// An operation code. Function nodes advertise the set they can execute.
    Opcode
);
