//! IRI compaction applied to named nodes and literal datatypes in keys.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

/// Marks an IRI stored verbatim that would otherwise read as `prefix:local`.
/// `<` cannot occur in an IRI, so the marker never collides with one.
pub const VERBATIM_MARKER: char = '<';

/// Hook used by the codecs to shorten IRIs before they enter a key and to
/// restore them on decode. `expand_term(compact_iri(x)) == x` must hold.
pub trait Prefixes: Send + Sync {
    fn expand_term(&self, term: &str) -> String;
    fn compact_iri(&self, iri: &str) -> String;
}

/// Identity hook.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrefixes;

impl Prefixes for NoPrefixes {
    fn expand_term(&self, term: &str) -> String {
        term.to_string()
    }

    fn compact_iri(&self, iri: &str) -> String {
        iri.to_string()
    }
}

/// Prefix to namespace table. The longest matching namespace wins when
/// compacting.
///
/// An IRI no namespace matches is kept as is, unless its scheme is itself a
/// known prefix (`ex:thing` next to `ex`): such IRIs get a leading
/// [`VERBATIM_MARKER`] so they never expand into a namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct PrefixMap {
    // sorted by namespace length, longest first
    entries: Vec<(String, String)>,
}

impl PrefixMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefixes containing `:` or starting with the verbatim marker cannot be
    /// told apart from stored IRIs and are ignored.
    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        if prefix.contains(':') || prefix.starts_with(VERBATIM_MARKER) {
            warn!("Ignoring unusable prefix {:?}", prefix);
            return;
        }
        self.entries.retain(|(p, _)| *p != prefix);
        self.entries.push((prefix, namespace.into()));
        self.entries
            .sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }
}

impl From<BTreeMap<String, String>> for PrefixMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        let mut prefixes = PrefixMap::new();
        for (prefix, namespace) in map {
            prefixes.insert(prefix, namespace);
        }
        prefixes
    }
}

impl From<PrefixMap> for BTreeMap<String, String> {
    fn from(map: PrefixMap) -> Self {
        map.entries.into_iter().collect()
    }
}

impl Prefixes for PrefixMap {
    fn expand_term(&self, term: &str) -> String {
        if let Some(iri) = term.strip_prefix(VERBATIM_MARKER) {
            return iri.to_string();
        }
        if let Some((prefix, local)) = term.split_once(':') {
            if let Some(ns) = self.namespace(prefix) {
                return format!("{}{}", ns, local);
            }
        }
        term.to_string()
    }

    fn compact_iri(&self, iri: &str) -> String {
        for (prefix, ns) in &self.entries {
            if let Some(local) = iri.strip_prefix(ns.as_str()) {
                return format!("{}:{}", prefix, local);
            }
        }
        let ambiguous = iri.starts_with(VERBATIM_MARKER)
            || iri
                .split_once(':')
                .is_some_and(|(scheme, _)| self.namespace(scheme).is_some());
        if ambiguous {
            format!("{}{}", VERBATIM_MARKER, iri)
        } else {
            iri.to_string()
        }
    }
}
