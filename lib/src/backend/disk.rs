use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use fs2::FileExt;
use log::{debug, info};
use sled::{Db, IVec};

use super::{is_empty_range, Backend, KvIter, Op, RangeOptions, WriteBatch};
use crate::errors::{Error, Result};

/// Directory holding the sled database inside a store directory.
pub const DB_DIR: &str = "db";
pub const LOCK_FILE: &str = "store.lock";

/// Durable engine over a [sled](https://sled.rs/) database.
///
/// Every batch goes to sled as one `apply_batch`, so a batch is either fully
/// present after a crash or absent. With `sync` set, each batch is flushed
/// to disk before `write` returns. The store directory is guarded by an
/// exclusive lock file for the lifetime of the backend.
pub struct SledBackend {
    dir: PathBuf,
    db: RwLock<Option<Db>>,
    sync: bool,
    lock_file: File,
}

impl SledBackend {
    /// Open (or create) the store in `dir`.
    pub fn open<P: AsRef<Path>>(dir: P, sync: bool) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let lock_path = dir.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)?;
        if let Err(e) = lock_file.try_lock_exclusive() {
            return Err(Error::Backend(format!(
                "could not acquire exclusive lock on {:?}: {}. Another process has this store open.",
                lock_path, e
            )));
        }

        let db_path = dir.join(DB_DIR);
        if db_path.exists() {
            info!("Opening store at {:?}", dir);
        } else {
            info!("Creating new store at {:?}", dir);
        }
        let db = sled::Config::new().path(&db_path).open()?;
        debug!("Store at {:?} holds {} entries", dir, db.len());

        Ok(SledBackend {
            dir,
            db: RwLock::new(Some(db)),
            sync,
            lock_file,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Bytes the database occupies on disk.
    pub fn size_on_disk(&self) -> Result<u64> {
        Ok(self.db()?.size_on_disk()?)
    }

    fn db(&self) -> Result<Db> {
        let guard = self
            .db
            .read()
            .map_err(|_| Error::Backend("sled handle lock poisoned".to_string()))?;
        guard.clone().ok_or_else(closed)
    }
}

fn closed() -> Error {
    Error::Backend("store is closed".to_string())
}

fn decode_entry(entry: sled::Result<(IVec, IVec)>) -> Result<(String, Vec<u8>)> {
    let (key, value) = entry?;
    let key = String::from_utf8(key.to_vec())
        .map_err(|e| Error::Corrupt(format!("key is not UTF-8: {}", e)))?;
    Ok((key, value.to_vec()))
}

impl Backend for SledBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.db()?.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        let db = self.db()?;
        let n = batch.len();
        let mut ops = sled::Batch::default();
        for op in batch.into_ops() {
            match op {
                Op::Put { key, value } => ops.insert(key.as_bytes(), value),
                Op::Del { key } => ops.remove(key.as_bytes()),
            }
        }
        db.apply_batch(ops)?;
        if self.sync {
            db.flush()?;
        }
        debug!("Applied batch of {} ops to {:?}", n, self.dir);
        Ok(())
    }

    fn range(&self, opts: RangeOptions) -> Result<KvIter> {
        let db = self.db()?;
        if opts.limit == Some(0) || is_empty_range(&opts.lower, &opts.upper) {
            return Ok(Box::new(std::iter::empty()));
        }
        let scan = db.range::<String, _>((opts.lower, opts.upper));
        let entries: KvIter = if opts.reverse {
            Box::new(scan.rev().map(decode_entry))
        } else {
            Box::new(scan.map(decode_entry))
        };
        Ok(match opts.limit {
            Some(n) => Box::new(entries.take(n)),
            None => entries,
        })
    }

    fn flush(&self) -> Result<()> {
        let bytes = self.db()?.flush()?;
        info!("Flushed {} bytes to {:?}", bytes, self.dir);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut guard = self
            .db
            .write()
            .map_err(|_| Error::Backend("sled handle lock poisoned".to_string()))?;
        if let Some(db) = guard.take() {
            db.flush()?;
            drop(db);
            FileExt::unlock(&self.lock_file)?;
            info!("Closed store at {:?}", self.dir);
        }
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "sled"
    }
}
