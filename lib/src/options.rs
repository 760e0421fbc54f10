//! Option types for reads and writes.

use std::fmt;
use std::sync::Arc;

use crate::backend::WriteBatch;
use crate::errors::Result;
use crate::model::Slot;
use crate::prefixes::{NoPrefixes, Prefixes};
use crate::scope::Scope;

/// Controls result order and size of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Slots to order by, most significant first.
    pub order: Vec<Slot>,
    pub limit: Option<usize>,
    pub reverse: bool,
}

impl GetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(mut self, order: impl IntoIterator<Item = Slot>) -> Self {
        self.order = order.into_iter().collect();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }
}

/// Hook run on the complete batch right before it is committed.
pub type PreWrite<'a> = Box<dyn FnOnce(&mut WriteBatch) -> Result<()> + 'a>;

/// Per-write options.
#[derive(Default)]
pub struct WriteOptions<'a> {
    /// Rewrite blank nodes of inserted quads through this scope.
    pub scope: Option<&'a mut Scope>,
    pub pre_write: Option<PreWrite<'a>>,
}

impl<'a> WriteOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scope(mut self, scope: &'a mut Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn pre_write<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut WriteBatch) -> Result<()> + 'a,
    {
        self.pre_write = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for WriteOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOptions")
            .field("scope", &self.scope.as_ref().map(|s| s.id()))
            .field("pre_write", &self.pre_write.is_some())
            .finish()
    }
}

pub const DEFAULT_STREAM_BATCH_SIZE: usize = 128;

/// Batching for [`crate::QuadStore::put_stream`] and
/// [`crate::QuadStore::del_stream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    pub batch_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        StreamOptions {
            batch_size: DEFAULT_STREAM_BATCH_SIZE,
        }
    }
}

/// Construction options for [`crate::QuadStore::new`].
#[derive(Clone)]
pub struct StoreOptions {
    /// Index names; `None` uses the default six.
    pub indexes: Option<Vec<String>>,
    pub prefixes: Arc<dyn Prefixes>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            indexes: None,
            prefixes: Arc::new(NoPrefixes),
        }
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("indexes", &self.indexes)
            .finish_non_exhaustive()
    }
}
