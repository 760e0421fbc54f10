//! Ordered key-value engines the store is layered on.
//!
//! The store only needs point reads, atomic batches and ordered range
//! scans. [`MemoryBackend`] keeps everything in a `BTreeMap`;
//! [`SledBackend`] stores it in a sled database on disk.

use std::ops::Bound;

use crate::errors::Result;

pub mod disk;
pub mod memory;

pub use self::disk::SledBackend;
pub use self::memory::MemoryBackend;

/// One write of a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Put { key: String, value: Vec<u8> },
    Del { key: String },
}

impl Op {
    pub fn key(&self) -> &str {
        match self {
            Op::Put { key, .. } | Op::Del { key } => key,
        }
    }
}

/// Ordered list of puts and deletes committed as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<Op>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        WriteBatch {
            ops: Vec::with_capacity(n),
        }
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.ops.push(Op::Put {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn del(&mut self, key: impl Into<String>) {
        self.ops.push(Op::Del { key: key.into() });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }
}

/// Parameters of a range scan.
#[derive(Debug, Clone)]
pub struct RangeOptions {
    pub lower: Bound<String>,
    pub upper: Bound<String>,
    pub reverse: bool,
    pub limit: Option<usize>,
}

impl RangeOptions {
    pub fn new(lower: Bound<String>, upper: Bound<String>) -> Self {
        RangeOptions {
            lower,
            upper,
            reverse: false,
            limit: None,
        }
    }

    /// Every key starting with `prefix`.
    pub fn prefix(prefix: &str) -> Self {
        Self::new(
            Bound::Included(prefix.to_string()),
            Bound::Included(format!("{}{}", prefix, crate::consts::BOUNDARY)),
        )
    }

    pub fn all() -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded)
    }
}

/// Key/value pairs from a range scan, in scan order.
pub type KvIter = Box<dyn Iterator<Item = Result<(String, Vec<u8>)>> + Send>;

/// True when no key can satisfy both bounds.
pub(crate) fn is_empty_range(lower: &Bound<String>, upper: &Bound<String>) -> bool {
    match (lower, upper) {
        (Bound::Unbounded, _) | (_, Bound::Unbounded) => false,
        (Bound::Included(l), Bound::Included(u)) => l > u,
        (Bound::Included(l), Bound::Excluded(u))
        | (Bound::Excluded(l), Bound::Included(u))
        | (Bound::Excluded(l), Bound::Excluded(u)) => l >= u,
    }
}

pub trait Backend: Send + Sync {
    /// Point read; a missing key is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Apply every operation of `batch`, in order, atomically.
    fn write(&self, batch: WriteBatch) -> Result<()>;

    /// Lazily scan a key range. Dropping the iterator releases the scan.
    fn range(&self, opts: RangeOptions) -> Result<KvIter>;

    /// Estimate of the number of entries between the bounds.
    fn approximate_size(&self, lower: &Bound<String>, upper: &Bound<String>) -> Result<u64> {
        let mut n = 0u64;
        for entry in self.range(RangeOptions::new(lower.clone(), upper.clone()))? {
            entry?;
            n += 1;
        }
        Ok(n)
    }

    /// Persist buffered writes. No-op for volatile engines.
    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    fn backend_type(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range_detection() {
        let k = |s: &str| s.to_string();
        assert!(!is_empty_range(&Bound::Included(k("a")), &Bound::Included(k("a"))));
        assert!(is_empty_range(&Bound::Excluded(k("a")), &Bound::Included(k("a"))));
        assert!(is_empty_range(&Bound::Included(k("b")), &Bound::Excluded(k("a"))));
        assert!(!is_empty_range(&Bound::Unbounded, &Bound::Excluded(k("a"))));
    }
}
