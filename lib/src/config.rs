//! Store configuration, read from and written to JSON files.

use std::collections::BTreeMap;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::options::StoreOptions;
use crate::prefixes::{NoPrefixes, PrefixMap, Prefixes};

/// Which engine backs the store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    #[default]
    Memory,
    Sled {
        path: PathBuf,
        // flush to disk after every batch
        #[serde(default)]
        sync: bool,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    // index names such as "SPOG"; the default six when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexes: Option<Vec<String>>,
    // prefix -> namespace used to compact IRIs in keys
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prefixes: BTreeMap<String, String>,
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn sled<P: Into<PathBuf>>(path: P, sync: bool) -> Self {
        StoreConfig {
            backend: BackendConfig::Sled {
                path: path.into(),
                sync,
            },
            ..Self::default()
        }
    }

    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = std::fs::File::open(file)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let config_str = serde_json::to_string_pretty(&self)?;
        let mut file = std::fs::File::create(file)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    pub fn store_options(&self) -> StoreOptions {
        let prefixes: Arc<dyn Prefixes> = if self.prefixes.is_empty() {
            Arc::new(NoPrefixes)
        } else {
            Arc::new(PrefixMap::from(self.prefixes.clone()))
        };
        StoreOptions {
            indexes: self.indexes.clone(),
            prefixes,
        }
    }
}
