//! Mutable search state: MRRG occupancy and the tentative placement.
//!
//! Every speculative change is bracketed by [`Occupancy::checkpoint`] and
//! [`Occupancy::restore`]. Snapshots are full copies of the value arrays, so a
//! restore reproduces the exact prior contents however much changed in
//! between.

use tessera_graph::{DfgNodeId, MrrgNodeId};

/// Which MRRG nodes are in use and by which DFG operation's value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occupancy {
    used: Vec<bool>,
    owner: Vec<Option<DfgNodeId>>,
}

/// An opaque copy of an [`Occupancy`], consumed by [`Occupancy::restore`].
#[derive(Debug)]
pub struct Snapshot {
    used: Vec<bool>,
    owner: Vec<Option<DfgNodeId>>,
}

impl Occupancy {
    /// All `nodes` free and unowned.
    pub fn new(nodes: usize) -> Self {
        Self {
            used: vec![false; nodes],
            owner: vec![None; nodes],
        }
    }

    /// Marks `node` used by the value of `owner`.
    pub fn mark(&mut self, node: MrrgNodeId, owner: DfgNodeId) {
        self.used[node.index()] = true;
        self.owner[node.index()] = Some(owner);
    }

    /// Returns `true` if anything occupies `node`.
    pub fn is_used(&self, node: MrrgNodeId) -> bool {
        self.used[node.index()]
    }

    /// The operation whose value occupies `node`, if any.
    pub fn owner(&self, node: MrrgNodeId) -> Option<DfgNodeId> {
        self.owner[node.index()]
    }

    /// Returns `true` if a route carrying `source`'s value may pass `node`:
    /// it is free or already carries the same value.
    pub fn is_free_for(&self, node: MrrgNodeId, source: DfgNodeId) -> bool {
        !self.used[node.index()] || self.owner[node.index()] == Some(source)
    }

    /// Copies the current state.
    pub fn checkpoint(&self) -> Snapshot {
        Snapshot {
            used: self.used.clone(),
            owner: self.owner.clone(),
        }
    }

    /// Returns to the state captured by `snapshot`.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.used = snapshot.used;
        self.owner = snapshot.owner;
    }

    /// The raw `used` array.
    pub fn used(&self) -> &[bool] {
        &self.used
    }

    /// The raw owner array.
    pub fn owners(&self) -> &[Option<DfgNodeId>] {
        &self.owner
    }
}

/// The partial injective map from operations to function nodes, with its
/// inverse.
#[derive(Clone, Debug)]
pub struct Placement {
    site: Vec<Option<MrrgNodeId>>,
    host: Vec<Option<DfgNodeId>>,
}

impl Placement {
    /// An empty placement for `ops` operations over `nodes` MRRG nodes.
    pub fn new(ops: usize, nodes: usize) -> Self {
        Self {
            site: vec![None; ops],
            host: vec![None; nodes],
        }
    }

    /// Places `op` on `node`.
    pub fn assign(&mut self, op: DfgNodeId, node: MrrgNodeId) {
        self.site[op.index()] = Some(node);
        self.host[node.index()] = Some(op);
    }

    /// Removes `op` from wherever it was placed.
    pub fn unassign(&mut self, op: DfgNodeId) {
        if let Some(node) = self.site[op.index()].take() {
            self.host[node.index()] = None;
        }
    }

    /// Where `op` is placed.
    pub fn site(&self, op: DfgNodeId) -> Option<MrrgNodeId> {
        self.site[op.index()]
    }

    /// Which operation sits on `node`.
    pub fn host(&self, node: MrrgNodeId) -> Option<DfgNodeId> {
        self.host[node.index()]
    }

    /// All sites in operation order, or `None` if some operation is unplaced.
    pub fn complete(&self) -> Option<Vec<MrrgNodeId>> {
        self.site.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(n: u32) -> DfgNodeId {
        DfgNodeId::from_raw(n)
    }

    fn m(n: u32) -> MrrgNodeId {
        MrrgNodeId::from_raw(n)
    }

    #[test]
    fn restore_undoes_marks() {
        let mut occ = Occupancy::new(4);
        occ.mark(m(0), d(0));
        let before = occ.clone();
        let snap = occ.checkpoint();
        occ.mark(m(1), d(0));
        occ.mark(m(0), d(1));
        occ.restore(snap);
        assert_eq!(occ, before);
    }

    #[test]
    fn immediate_restore_is_noop() {
        let mut occ = Occupancy::new(3);
        occ.mark(m(2), d(5));
        let before = occ.clone();
        let snap = occ.checkpoint();
        occ.restore(snap);
        assert_eq!(occ, before);
    }

    #[test]
    fn free_for_same_owner_only() {
        let mut occ = Occupancy::new(2);
        occ.mark(m(0), d(3));
        assert!(occ.is_free_for(m(0), d(3)));
        assert!(!occ.is_free_for(m(0), d(4)));
        assert!(occ.is_free_for(m(1), d(4)));
        assert_eq!(occ.owner(m(0)), Some(d(3)));
    }

    #[test]
    fn placement_keeps_inverse() {
        let mut p = Placement::new(2, 3);
        p.assign(d(1), m(2));
        assert_eq!(p.site(d(1)), Some(m(2)));
        assert_eq!(p.host(m(2)), Some(d(1)));
        assert_eq!(p.complete(), None);
        p.assign(d(0), m(0));
        assert_eq!(p.complete(), Some(vec![m(0), m(2)]));
        p.unassign(d(1));
        assert_eq!(p.host(m(2)), None);
        assert_eq!(p.site(d(1)), None);
    }
}
