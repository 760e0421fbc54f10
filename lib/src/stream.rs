//! Pull-based quad streams.

use std::sync::Arc;

use crate::backend::KvIter;
use crate::codec::read_quad;
use crate::errors::Result;
use crate::index::Index;
use crate::model::{Quad, Slot};
use crate::prefixes::Prefixes;

pub type QuadIter = Box<dyn Iterator<Item = Result<Quad>> + Send>;

/// Stream of quads matching a pattern.
///
/// Dropping the stream, or calling [`QuadStream::close`], releases the
/// underlying engine scan. After an error the stream ends.
pub struct QuadStream {
    inner: Option<QuadIter>,
}

impl QuadStream {
    pub(crate) fn new(inner: QuadIter) -> Self {
        QuadStream { inner: Some(inner) }
    }

    pub fn empty() -> Self {
        QuadStream { inner: None }
    }

    /// Stop early and release the scan and any buffered results.
    pub fn close(&mut self) {
        self.inner = None;
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }
}

impl Iterator for QuadStream {
    type Item = Result<Quad>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.as_mut()?.next();
        match item {
            Some(Ok(quad)) => Some(Ok(quad)),
            Some(Err(e)) => {
                self.close();
                Some(Err(e))
            }
            None => {
                self.close();
                None
            }
        }
    }
}

/// Decodes the entries of an index scan.
pub(crate) struct IndexScan {
    entries: KvIter,
    slots: [Slot; 4],
    prefix_len: usize,
    prefixes: Arc<dyn Prefixes>,
}

impl IndexScan {
    pub(crate) fn new(entries: KvIter, index: &Index, prefixes: Arc<dyn Prefixes>) -> Self {
        IndexScan {
            entries,
            slots: *index.slots(),
            prefix_len: index.prefix().len(),
            prefixes,
        }
    }
}

impl Iterator for IndexScan {
    type Item = Result<Quad>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = match self.entries.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };
        Some(read_quad(
            &key,
            self.prefix_len,
            &value,
            0,
            &self.slots,
            self.prefixes.as_ref(),
        ))
    }
}
