//! 按迁移存储的稀疏输入/输出弧关系。
//!
//! 每个迁移只保存与之相连的库所及权重，平行弧在插入时合并（权重相加）。
use std::fmt;

use smallvec::SmallVec;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::IndexVec;
use crate::net::structure::Weight;

type ArcRow = SmallVec<[(PlaceId, Weight); 4]>;

#[derive(Clone, PartialEq, Eq)]
pub struct Incidence {
    rows: IndexVec<TransitionId, ArcRow>,
}

impl Incidence {
    pub fn new(transitions: usize) -> Self {
        Self {
            rows: IndexVec::from_elem(ArcRow::new(), transitions),
        }
    }

    /// Adds `weight` to the arc between `place` and `transition`.
    /// Zero weights are ignored so they never show up as arcs.
    pub fn add(&mut self, transition: TransitionId, place: PlaceId, weight: Weight) {
        if weight == 0 {
            return;
        }
        let row = &mut self.rows[transition];
        match row.iter_mut().find(|(p, _)| *p == place) {
            Some((_, existing)) => *existing = existing.saturating_add(weight),
            None => row.push((place, weight)),
        }
    }

    pub fn arcs(&self, transition: TransitionId) -> &[(PlaceId, Weight)] {
        &self.rows[transition]
    }
}

impl fmt::Debug for Incidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (transition, row) in self.rows.iter_enumerated() {
            map.entry(&transition, &row.as_slice());
        }
        map.finish()
    }
}
