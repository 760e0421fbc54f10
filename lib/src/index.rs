//! Index permutations.

use std::collections::HashSet;
use std::fmt;

use crate::consts::SEP;
use crate::errors::{Error, Result};
use crate::model::Slot;
use crate::model::Slot::{Graph as G, Object as O, Predicate as P, Subject as S};

/// One stored permutation of the four quad slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Index {
    name: String,
    slots: [Slot; 4],
    prefix: String,
}

impl Index {
    /// Parse an index name such as `"GSPO"`.
    pub fn parse(name: &str) -> Result<Index> {
        let letters: Vec<char> = name.chars().collect();
        if letters.len() != 4 {
            return Err(Error::InvalidIndex(format!(
                "'{}' must name all four slots",
                name
            )));
        }
        let mut slots = [Slot::Subject; 4];
        let mut seen = HashSet::new();
        for (i, c) in letters.iter().enumerate() {
            let slot = Slot::from_letter(*c)
                .ok_or_else(|| Error::InvalidIndex(format!("'{}' has unknown slot '{}'", name, c)))?;
            if !seen.insert(slot) {
                return Err(Error::InvalidIndex(format!("'{}' repeats slot '{}'", name, c)));
            }
            slots[i] = slot;
        }
        Ok(Self::from_slots(slots))
    }

    /// Index over `slots` as given; callers ensure no slot repeats.
    fn from_slots(slots: [Slot; 4]) -> Index {
        let name: String = slots.iter().map(|s| s.letter()).collect();
        let prefix = format!("{}{}", name, SEP);
        Index { name, slots, prefix }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slots(&self) -> &[Slot; 4] {
        &self.slots
    }

    /// Key prefix shared by every entry of this index.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Slot order of each name in [`crate::consts::DEFAULT_INDEXES`].
const DEFAULT_SLOTS: [[Slot; 4]; 6] = [
    [S, P, O, G],
    [O, G, S, P],
    [G, S, P, O],
    [S, O, P, G],
    [P, O, G, S],
    [G, P, O, S],
];

pub fn default_indexes() -> Vec<Index> {
    DEFAULT_SLOTS.into_iter().map(Index::from_slots).collect()
}

/// Build a custom index set. Every slot has to lead at least one index so
/// that a single bound term can always be answered.
pub fn build_indexes<S: AsRef<str>>(names: &[S]) -> Result<Vec<Index>> {
    let mut indexes: Vec<Index> = Vec::with_capacity(names.len());
    for name in names {
        let index = Index::parse(name.as_ref())?;
        if indexes.iter().any(|i| i.name == index.name) {
            return Err(Error::InvalidIndex(format!("duplicate index '{}'", index.name)));
        }
        indexes.push(index);
    }
    for slot in Slot::ALL {
        if !indexes.iter().any(|i| i.slots[0] == slot) {
            return Err(Error::InvalidIndex(format!(
                "no index starts with {}; point queries on it could not be answered",
                slot
            )));
        }
    }
    Ok(indexes)
}
