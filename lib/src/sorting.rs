//! In-memory re-sorting for results no index returns in the requested order.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::codec::quad_key;
use crate::errors::Result;
use crate::model::{Quad, Slot};
use crate::prefixes::Prefixes;
use crate::stream::QuadIter;

/// Buffers a whole source and yields it ordered by `order`.
///
/// The first call to `next` drains the source into a `BTreeMap` keyed by the
/// quad's encoded key in `order` (remaining slots appended), so ties break
/// exactly as an index in that order would. Items are then handed out
/// lazily from the front, or from the back when `reverse` is set, until
/// `limit` is reached.
pub struct SortingIterator {
    source: Option<QuadIter>,
    slots: Vec<Slot>,
    prefixes: Arc<dyn Prefixes>,
    reverse: bool,
    limit: Option<usize>,
    sorted: Option<BTreeMap<String, Quad>>,
    emitted: usize,
}

impl SortingIterator {
    pub fn new(
        source: QuadIter,
        order: &[Slot],
        prefixes: Arc<dyn Prefixes>,
        reverse: bool,
        limit: Option<usize>,
    ) -> Self {
        let mut slots = order.to_vec();
        for slot in Slot::ALL {
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        SortingIterator {
            source: Some(source),
            slots,
            prefixes,
            reverse,
            limit,
            sorted: None,
            emitted: 0,
        }
    }

    fn drain(&mut self) -> Result<()> {
        let Some(source) = self.source.take() else {
            return Ok(());
        };
        let mut sorted = BTreeMap::new();
        for quad in source {
            let quad = quad?;
            let key = quad_key("", &quad, &self.slots, self.prefixes.as_ref())?;
            sorted.insert(key, quad);
        }
        debug!("Sorted {} quads in memory by {:?}", sorted.len(), self.slots);
        self.sorted = Some(sorted);
        Ok(())
    }

    /// Release the source and everything buffered so far.
    pub fn close(&mut self) {
        self.source = None;
        self.sorted = None;
    }
}

impl Iterator for SortingIterator {
    type Item = Result<Quad>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.limit.is_some_and(|l| self.emitted >= l) {
            self.close();
            return None;
        }
        if self.sorted.is_none() {
            if self.source.is_none() {
                return None;
            }
            if let Err(e) = self.drain() {
                self.close();
                return Some(Err(e));
            }
        }
        let sorted = self.sorted.as_mut()?;
        let next = if self.reverse {
            sorted.pop_last()
        } else {
            sorted.pop_first()
        };
        match next {
            Some((_, quad)) => {
                self.emitted += 1;
                Some(Ok(quad))
            }
            None => {
                self.close();
                None
            }
        }
    }
}

impl Drop for SortingIterator {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SortingIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortingIterator")
            .field("slots", &self.slots)
            .field("reverse", &self.reverse)
            .field("limit", &self.limit)
            .field("buffered", &self.sorted.as_ref().map(|s| s.len()))
            .finish()
    }
}
