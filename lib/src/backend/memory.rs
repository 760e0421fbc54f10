use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{is_empty_range, Backend, KvIter, Op, RangeOptions, WriteBatch};
use crate::errors::{Error, Result};

/// Entries fetched per lock acquisition while scanning.
const CHUNK: usize = 256;

type Map = BTreeMap<String, Vec<u8>>;

/// Volatile engine over a shared `BTreeMap`.
///
/// Batches are applied under one write lock, so readers never observe a
/// partially applied batch. Scans re-acquire the read lock per chunk and
/// resume after the last key they returned.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    map: Arc<RwLock<Map>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Map>> {
        self.map
            .read()
            .map_err(|_| Error::Backend("memory map lock poisoned".to_string()))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, Map>> {
        self.map
            .write()
            .map_err(|_| Error::Backend("memory map lock poisoned".to_string()))
    }

    fn apply(&self, ops: Vec<Op>) -> Result<()> {
        let mut map = self.write_lock()?;
        for op in ops {
            match op {
                Op::Put { key, value } => {
                    map.insert(key, value);
                }
                Op::Del { key } => {
                    map.remove(&key);
                }
            }
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.apply(batch.into_ops())
    }

    fn range(&self, opts: RangeOptions) -> Result<KvIter> {
        Ok(Box::new(Cursor {
            map: Arc::clone(&self.map),
            done: opts.limit == Some(0) || is_empty_range(&opts.lower, &opts.upper),
            lower: opts.lower,
            upper: opts.upper,
            reverse: opts.reverse,
            remaining: opts.limit,
            buf: VecDeque::new(),
        }))
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

struct Cursor {
    map: Arc<RwLock<Map>>,
    lower: Bound<String>,
    upper: Bound<String>,
    reverse: bool,
    remaining: Option<usize>,
    buf: VecDeque<(String, Vec<u8>)>,
    done: bool,
}

impl Cursor {
    fn fill(&mut self) -> Result<()> {
        if is_empty_range(&self.lower, &self.upper) {
            self.done = true;
            return Ok(());
        }
        let map = self
            .map
            .read()
            .map_err(|_| Error::Backend("memory map lock poisoned".to_string()))?;
        let want = self.remaining.map_or(CHUNK, |r| r.min(CHUNK));
        let range = map.range::<String, _>((self.lower.clone(), self.upper.clone()));
        if self.reverse {
            self.buf
                .extend(range.rev().take(want).map(|(k, v)| (k.clone(), v.clone())));
        } else {
            self.buf
                .extend(range.take(want).map(|(k, v)| (k.clone(), v.clone())));
        }
        drop(map);

        if self.buf.len() < want {
            self.done = true;
        }
        if let Some((last, _)) = self.buf.back() {
            if self.reverse {
                self.upper = Bound::Excluded(last.clone());
            } else {
                self.lower = Bound::Excluded(last.clone());
            }
        }
        Ok(())
    }
}

impl Iterator for Cursor {
    type Item = Result<(String, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }
        if self.buf.is_empty() && !self.done {
            if let Err(e) = self.fill() {
                self.done = true;
                return Some(Err(e));
            }
        }
        let item = self.buf.pop_front()?;
        if let Some(r) = self.remaining.as_mut() {
            *r -= 1;
        }
        Some(Ok(item))
    }
}
