use crate::common::{NonZeroUInt, UInt};
use crate::parse::NodeId;
use std::collections::BTreeMap;

/// The individual results of one dice-roll node, in the order they were drawn.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RollRecord {
    pub count: NonZeroUInt,
    pub sides: NonZeroUInt,
    pub results: Vec<UInt>,
}

impl RollRecord {
    pub fn new(count: NonZeroUInt, sides: NonZeroUInt, results: Vec<UInt>) -> Self {
        Self {
            count,
            sides,
            results,
        }
    }
}

/// Roll records of one evaluation, keyed by the dice node they came from.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RollRecords {
    records: BTreeMap<NodeId, RollRecord>,
}

impl RollRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record, returning the one it replaced if the node was already recorded.
    pub fn insert(&mut self, id: NodeId, record: RollRecord) -> Option<RollRecord> {
        self.records.insert(id, record)
    }

    pub fn get(&self, id: NodeId) -> Option<&RollRecord> {
        self.records.get(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in node order, which is also the order the dice were rolled.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &RollRecord)> + '_ {
        self.records.iter().map(|(id, record)| (*id, record))
    }
}
