use std::slice;
use std::sync::Arc;

use log::{debug, info};

use crate::backend::{Backend, MemoryBackend, RangeOptions, SledBackend, WriteBatch};
use crate::codec::{quad_value_len, write_quad};
use crate::config::{BackendConfig, StoreConfig};
use crate::consts::SCOPE_PREFIX;
use crate::errors::Result;
use crate::index::{build_indexes, default_indexes, Index};
use crate::model::{Quad, Slot};
use crate::options::{GetOptions, PreWrite, StoreOptions, StreamOptions, WriteOptions};
use crate::pattern::Pattern;
use crate::planner::plan_query;
use crate::prefixes::{NoPrefixes, Prefixes};
use crate::scope::{PendingMappings, Scope};
use crate::sorting::SortingIterator;
use crate::stream::{IndexScan, QuadIter, QuadStream};

/// Keys deleted per batch by [`QuadStore::clear`].
pub const CLEAR_BATCH_SIZE: usize = 1024;

/// Result of [`QuadStore::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetResult {
    pub items: Vec<Quad>,
    /// Order the items are in, most significant slot first.
    pub order: Vec<Slot>,
    /// True when the order was produced by sorting in memory.
    pub resorted: bool,
}

/// Result of [`QuadStore::get_stream`].
pub struct StreamResult {
    pub iterator: QuadStream,
    pub order: Vec<Slot>,
    pub resorted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApproximateSize {
    pub approximate_size: u64,
}

/// A quad store over an ordered key-value [`Backend`].
///
/// Every quad is written once per index; all keys of one write call go to
/// the engine as a single batch.
pub struct QuadStore {
    backend: Arc<dyn Backend>,
    indexes: Vec<Index>,
    prefixes: Arc<dyn Prefixes>,
}

impl QuadStore {
    pub fn new(backend: Arc<dyn Backend>, options: StoreOptions) -> Result<Self> {
        let indexes = match &options.indexes {
            Some(names) => build_indexes(names)?,
            None => default_indexes(),
        };
        Ok(QuadStore {
            backend,
            indexes,
            prefixes: options.prefixes,
        })
    }

    /// A volatile store with the default indexes.
    pub fn in_memory() -> Self {
        QuadStore {
            backend: Arc::new(MemoryBackend::new()),
            indexes: default_indexes(),
            prefixes: Arc::new(NoPrefixes),
        }
    }

    pub fn open(config: &StoreConfig) -> Result<Self> {
        let backend: Arc<dyn Backend> = match &config.backend {
            BackendConfig::Memory => Arc::new(MemoryBackend::new()),
            BackendConfig::Sled { path, sync } => Arc::new(SledBackend::open(path, *sync)?),
        };
        info!(
            "Opened {} store with indexes {:?}",
            backend.backend_type(),
            config.indexes
        );
        Self::new(backend, config.store_options())
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn prefixes(&self) -> &Arc<dyn Prefixes> {
        &self.prefixes
    }

    fn stage_dels(&self, quads: &[Quad], batch: &mut WriteBatch) -> Result<()> {
        for quad in quads {
            let mut scratch = vec![0u8; quad_value_len(quad)];
            for index in &self.indexes {
                let (key, _) = write_quad(
                    index.prefix(),
                    &mut scratch,
                    0,
                    quad,
                    index.slots(),
                    self.prefixes.as_ref(),
                )?;
                batch.del(key);
            }
        }
        Ok(())
    }

    /// Encode every quad into every index, one value buffer per key.
    fn stage_puts(&self, quads: &[Quad], batch: &mut WriteBatch) -> Result<()> {
        for quad in quads {
            let len = quad_value_len(quad);
            for index in &self.indexes {
                let mut value = vec![0u8; len];
                let (key, n) = write_quad(
                    index.prefix(),
                    &mut value,
                    0,
                    quad,
                    index.slots(),
                    self.prefixes.as_ref(),
                )?;
                value.truncate(n);
                batch.put(key, value);
            }
        }
        Ok(())
    }

    fn commit(&self, mut batch: WriteBatch, pre_write: Option<PreWrite<'_>>) -> Result<()> {
        if let Some(hook) = pre_write {
            hook(&mut batch)?;
        }
        debug!("Committing batch of {} ops", batch.len());
        self.backend.write(batch)
    }

    pub fn put(&self, quad: &Quad, opts: WriteOptions<'_>) -> Result<()> {
        self.multi_patch(&[], slice::from_ref(quad), opts)
    }

    pub fn multi_put(&self, quads: &[Quad], opts: WriteOptions<'_>) -> Result<()> {
        self.multi_patch(&[], quads, opts)
    }

    pub fn del(&self, quad: &Quad, opts: WriteOptions<'_>) -> Result<()> {
        self.multi_patch(slice::from_ref(quad), &[], opts)
    }

    pub fn multi_del(&self, quads: &[Quad], opts: WriteOptions<'_>) -> Result<()> {
        self.multi_patch(quads, &[], opts)
    }

    pub fn patch(&self, old: &Quad, new: &Quad, opts: WriteOptions<'_>) -> Result<()> {
        self.multi_patch(slice::from_ref(old), slice::from_ref(new), opts)
    }

    /// Delete `old` and insert `new` in one atomic batch. Deletes are staged
    /// first, so a quad present in both ends up stored. Blank-node mappings
    /// created through `opts.scope` are kept only if the batch commits.
    pub fn multi_patch(&self, old: &[Quad], new: &[Quad], opts: WriteOptions<'_>) -> Result<()> {
        let WriteOptions { scope, pre_write } = opts;
        let mut batch = WriteBatch::with_capacity((old.len() + new.len()) * self.indexes.len());
        self.stage_dels(old, &mut batch)?;
        let mut pending = PendingMappings::new();
        match scope.as_deref() {
            Some(scope) => {
                let scoped = new
                    .iter()
                    .map(|quad| scope.parse_quad(quad, &mut pending, &mut batch))
                    .collect::<Result<Vec<_>>>()?;
                self.stage_puts(&scoped, &mut batch)?;
            }
            None => self.stage_puts(new, &mut batch)?,
        }
        self.commit(batch, pre_write)?;
        if let Some(scope) = scope {
            scope.commit(pending);
        }
        Ok(())
    }

    /// Collect every match of `pattern`.
    pub fn get(&self, pattern: &Pattern, opts: &GetOptions) -> Result<GetResult> {
        let StreamResult {
            iterator,
            order,
            resorted,
        } = self.get_stream(pattern, opts)?;
        let items = iterator.collect::<Result<Vec<_>>>()?;
        Ok(GetResult {
            items,
            order,
            resorted,
        })
    }

    pub fn get_stream(&self, pattern: &Pattern, opts: &GetOptions) -> Result<StreamResult> {
        let plan = plan_query(&self.indexes, pattern, &opts.order, self.prefixes.as_ref())?;
        let mut range = RangeOptions::new(plan.lower, plan.upper);
        if !plan.resorted {
            range.reverse = opts.reverse;
            range.limit = opts.limit;
        }
        let entries = self.backend.range(range)?;
        let scan: QuadIter = Box::new(IndexScan::new(entries, &plan.index, Arc::clone(&self.prefixes)));
        let iterator = if plan.resorted {
            QuadStream::new(Box::new(SortingIterator::new(
                scan,
                &plan.order,
                Arc::clone(&self.prefixes),
                opts.reverse,
                opts.limit,
            )))
        } else {
            QuadStream::new(scan)
        };
        Ok(StreamResult {
            iterator,
            order: plan.order,
            resorted: plan.resorted,
        })
    }

    pub fn match_quads(&self, pattern: &Pattern, opts: &GetOptions) -> Result<QuadStream> {
        Ok(self.get_stream(pattern, opts)?.iterator)
    }

    pub fn get_approximate_size(&self, pattern: &Pattern, opts: &GetOptions) -> Result<ApproximateSize> {
        let plan = plan_query(&self.indexes, pattern, &opts.order, self.prefixes.as_ref())?;
        let approximate_size = self.backend.approximate_size(&plan.lower, &plan.upper)?;
        Ok(ApproximateSize { approximate_size })
    }

    fn consume_stream<I, F>(&self, quads: I, opts: StreamOptions, mut write: F) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Quad>>,
        F: FnMut(&[Quad]) -> Result<()>,
    {
        let size = opts.batch_size.max(1);
        let mut chunk = Vec::with_capacity(size);
        let mut total = 0;
        for quad in quads {
            chunk.push(quad?);
            if chunk.len() == size {
                write(&chunk)?;
                total += chunk.len();
                chunk.clear();
            }
        }
        if !chunk.is_empty() {
            write(&chunk)?;
            total += chunk.len();
        }
        Ok(total)
    }

    /// Insert quads from `quads`, one batch per `batch_size` quads. Returns
    /// how many were written; on error, earlier batches stay committed.
    pub fn put_stream<I>(&self, quads: I, opts: StreamOptions) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Quad>>,
    {
        self.put_stream_inner(quads, opts, None)
    }

    /// Like [`QuadStore::put_stream`], rewriting blank nodes through `scope`
    /// so one label maps to one generated node across every batch.
    pub fn put_stream_scoped<I>(&self, quads: I, scope: &mut Scope, opts: StreamOptions) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Quad>>,
    {
        self.put_stream_inner(quads, opts, Some(scope))
    }

    fn put_stream_inner<I>(&self, quads: I, opts: StreamOptions, mut scope: Option<&mut Scope>) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Quad>>,
    {
        let n = self.consume_stream(quads, opts, |chunk| {
            let opts = WriteOptions {
                scope: scope.as_deref_mut(),
                pre_write: None,
            };
            self.multi_put(chunk, opts)
        })?;
        debug!("Streamed {} quads in", n);
        Ok(n)
    }

    pub fn del_stream<I>(&self, quads: I, opts: StreamOptions) -> Result<usize>
    where
        I: IntoIterator<Item = Result<Quad>>,
    {
        let n = self.consume_stream(quads, opts, |chunk| self.multi_del(chunk, WriteOptions::default()))?;
        debug!("Streamed {} quads out", n);
        Ok(n)
    }

    pub fn init_scope(&self) -> Scope {
        Scope::new()
    }

    pub fn load_scope(&self, id: &str) -> Result<Scope> {
        Scope::load(id, self.backend.as_ref())
    }

    /// Remove the persisted mappings of scope `id`. Quads are untouched.
    pub fn delete_scope(&self, id: &str) -> Result<()> {
        self.delete_prefix(&Scope::key_prefix(id))
    }

    pub fn delete_all_scopes(&self) -> Result<()> {
        self.delete_prefix(SCOPE_PREFIX)
    }

    fn delete_prefix(&self, prefix: &str) -> Result<()> {
        let mut batch = WriteBatch::new();
        for entry in self.backend.range(RangeOptions::prefix(prefix))? {
            batch.del(entry?.0);
        }
        if !batch.is_empty() {
            info!("Deleting {} entries under {:?}", batch.len(), prefix);
            self.backend.write(batch)?;
        }
        Ok(())
    }

    /// Delete every key in the engine, quads and scopes alike.
    pub fn clear(&self) -> Result<()> {
        let mut removed = 0;
        loop {
            let mut opts = RangeOptions::all();
            opts.limit = Some(CLEAR_BATCH_SIZE);
            let mut batch = WriteBatch::with_capacity(CLEAR_BATCH_SIZE);
            for entry in self.backend.range(opts)? {
                batch.del(entry?.0);
            }
            if batch.is_empty() {
                break;
            }
            removed += batch.len();
            self.backend.write(batch)?;
        }
        info!("Cleared {} entries", removed);
        Ok(())
    }

    /// Persist buffered writes of a durable engine.
    pub fn flush(&self) -> Result<()> {
        self.backend.flush()
    }

    pub fn close(&self) -> Result<()> {
        self.backend.close()
    }
}
