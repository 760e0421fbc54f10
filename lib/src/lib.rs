//! A quad store layered on an ordered key-value engine.
//!
//! Every quad is written under six key permutations (SPOG, OGSP, GSPO, SOPG,
//! POGS, GPOS). Keys are built so that string order matches term order,
//! numbers and dates included, which lets any pattern of bound slots, plus
//! at most one literal range, be answered by a single contiguous scan.
//!
//! ```
//! use quadstore::{GetOptions, Literal, Pattern, Quad, QuadStore, Range, Term, WriteOptions};
//! use quadstore::consts::{XSD_DOUBLE, XSD_INTEGER};
//!
//! let store = QuadStore::in_memory();
//! for (s, n) in [("http://ex.org/a", "5"), ("http://ex.org/b", "7")] {
//!     let quad = Quad::new(
//!         Term::named_node(s),
//!         Term::named_node("http://ex.org/value"),
//!         Term::typed_literal(n, XSD_INTEGER),
//!         Term::named_node("http://ex.org/g"),
//!     )?;
//!     store.put(&quad, WriteOptions::default())?;
//! }
//!
//! let pattern = Pattern::new().object(Range::new().gt(Literal::new_typed("6", XSD_DOUBLE)));
//! let result = store.get(&pattern, &GetOptions::default())?;
//! assert_eq!(result.items.len(), 1);
//! assert_eq!(result.items[0].subject, Term::named_node("http://ex.org/b"));
//! # Ok::<(), quadstore::Error>(())
//! ```

pub mod backend;
pub mod codec;
pub mod config;
pub mod consts;
pub mod errors;
pub mod fpstring;
pub mod index;
pub mod model;
pub mod options;
pub mod pattern;
pub mod planner;
pub mod prefixes;
pub mod scope;
pub mod sorting;
pub mod store;
pub mod stream;
pub mod util;

#[cfg(feature = "oxigraph")]
pub mod convert;

pub use backend::{Backend, MemoryBackend, Op, RangeOptions, SledBackend, WriteBatch};
pub use config::{BackendConfig, StoreConfig};
pub use errors::{Error, Result};
pub use index::Index;
pub use model::{Literal, Quad, Slot, Term};
pub use options::{GetOptions, StoreOptions, StreamOptions, WriteOptions};
pub use pattern::{Matcher, Pattern, Range};
pub use prefixes::{NoPrefixes, PrefixMap, Prefixes};
pub use scope::{PendingMappings, Scope};
pub use store::{ApproximateSize, GetResult, QuadStore, StreamResult};
pub use stream::QuadStream;
pub use util::init_logging;
