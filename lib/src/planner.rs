//! Turns a pattern into one contiguous key range on one index.
//!
//! An index can answer a pattern when its leading slots are exactly the
//! pattern's bound terms (in any order), optionally followed by the range
//! slot. Among those, an index whose remaining slots already start with the
//! requested order is preferred; otherwise the first one is used and the
//! results have to be re-sorted in memory.

use std::ops::Bound;

use log::debug;

use crate::codec::{key_fragment, range_fragment};
use crate::consts::{BOUNDARY, SEP};
use crate::errors::{Error, Result};
use crate::index::Index;
use crate::model::{Literal, Slot};
use crate::pattern::{Matcher, Pattern, Range};
use crate::prefixes::Prefixes;

/// Where and how to scan for a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub index: Index,
    pub lower: Bound<String>,
    pub upper: Bound<String>,
    /// Order in which results come out, requested slots first.
    pub order: Vec<Slot>,
    /// The scan order differs from `order`; results need sorting.
    pub resorted: bool,
}

struct RangeKeys {
    axis: String,
    lower: Option<(String, bool)>,
    upper: Option<(String, bool)>,
}

fn range_keys(range: &Range, prefixes: &dyn Prefixes) -> Result<RangeKeys> {
    let mut axis: Option<String> = None;
    for bound in range.bounds() {
        let frag = range_fragment(bound, prefixes)?;
        match &axis {
            Some(a) if *a != frag.axis => {
                return Err(Error::InvalidPattern(format!(
                    "range bounds {:?} are not comparable with each other",
                    range
                )));
            }
            Some(_) => {}
            None => axis = Some(frag.axis),
        }
    }
    let axis = axis.ok_or_else(|| Error::InvalidPattern("range without bounds".to_string()))?;
    let frag = |lit: &Literal| range_fragment(lit, prefixes).map(|f| f.fragment);
    // strict bounds win over inclusive ones
    let lower = match (&range.gt, &range.gte) {
        (Some(gt), _) => Some((frag(gt)?, false)),
        (None, Some(gte)) => Some((frag(gte)?, true)),
        (None, None) => None,
    };
    let upper = match (&range.lt, &range.lte) {
        (Some(lt), _) => Some((frag(lt)?, false)),
        (None, Some(lte)) => Some((frag(lte)?, true)),
        (None, None) => None,
    };
    Ok(RangeKeys { axis, lower, upper })
}

fn is_compatible(index: &Index, concrete: &[Slot], range: Option<Slot>) -> bool {
    let slots = index.slots();
    let leading = &slots[..concrete.len()];
    if !concrete.iter().all(|s| leading.contains(s)) {
        return false;
    }
    match range {
        Some(slot) => slots[concrete.len()] == slot,
        None => true,
    }
}

/// Choose an index for `pattern` and compute its scan bounds.
pub fn plan_query(
    indexes: &[Index],
    pattern: &Pattern,
    order: &[Slot],
    prefixes: &dyn Prefixes,
) -> Result<QueryPlan> {
    let mut concrete = Vec::with_capacity(4);
    let mut range: Option<(Slot, &Range)> = None;
    for slot in Slot::ALL {
        match pattern.get(slot) {
            Some(Matcher::Term(_)) => concrete.push(slot),
            Some(Matcher::Range(r)) => {
                if let Some((other, _)) = range {
                    return Err(Error::InvalidPattern(format!(
                        "ranges on both {} and {}; at most one slot may hold a range",
                        other, slot
                    )));
                }
                range = Some((slot, r));
            }
            None => {}
        }
    }
    let range_keys = match range {
        Some((_, r)) => Some(range_keys(r, prefixes)?),
        None => None,
    };

    let mut requested: Vec<Slot> = Vec::with_capacity(4);
    for slot in order {
        if !concrete.contains(slot) && !requested.contains(slot) {
            requested.push(*slot);
        }
    }

    let mut fallback = None;
    let mut aligned = None;
    for index in indexes
        .iter()
        .filter(|i| is_compatible(i, &concrete, range.map(|(s, _)| s)))
    {
        if index.slots()[concrete.len()..].starts_with(&requested) {
            aligned = Some(index);
            break;
        }
        fallback.get_or_insert(index);
    }
    let (index, resorted) = match (aligned, fallback) {
        (Some(index), _) => (index, false),
        (None, Some(index)) => (index, true),
        (None, None) => {
            return Err(Error::UnsupportedPattern(format!(
                "no index can answer {:?} (order {:?})",
                pattern, order
            )));
        }
    };

    let mut achieved = requested;
    for slot in &index.slots()[concrete.len()..] {
        if !achieved.contains(slot) {
            achieved.push(*slot);
        }
    }

    let mut prefix = index.prefix().to_string();
    for slot in &index.slots()[..concrete.len()] {
        if let Some(Matcher::Term(term)) = pattern.get(*slot) {
            prefix.push_str(&key_fragment(term, prefixes)?);
            prefix.push_str(SEP);
        }
    }
    let (lower, upper) = match range_keys {
        None => (
            Bound::Included(prefix.clone()),
            Bound::Included(format!("{}{}", prefix, BOUNDARY)),
        ),
        Some(keys) => {
            let lower = match keys.lower {
                Some((frag, false)) => Bound::Excluded(format!("{}{}{}", prefix, frag, BOUNDARY)),
                Some((frag, true)) => Bound::Included(format!("{}{}", prefix, frag)),
                None => Bound::Included(format!("{}{}", prefix, keys.axis)),
            };
            let upper = match keys.upper {
                Some((frag, false)) => Bound::Excluded(format!("{}{}", prefix, frag)),
                Some((frag, true)) => Bound::Included(format!("{}{}{}", prefix, frag, BOUNDARY)),
                None => Bound::Included(format!("{}{}{}", prefix, keys.axis, BOUNDARY)),
            };
            (lower, upper)
        }
    };

    debug!(
        "Planned {:?} on index {} (order {:?}, resorted: {})",
        pattern, index, achieved, resorted
    );
    Ok(QueryPlan {
        index: index.clone(),
        lower,
        upper,
        order: achieved,
        resorted,
    })
}
