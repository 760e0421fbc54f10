//! Blank-node scopes.
//!
//! A scope maps the blank-node labels of one import to freshly generated
//! labels so that separate imports never share blank nodes by accident. New
//! mappings are persisted under `SCOPE/<id>/<original label>` in the same
//! batch as the quads that introduced them, and only join the scope once
//! that batch has been committed.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::backend::{Backend, RangeOptions, WriteBatch};
use crate::consts::SCOPE_PREFIX;
use crate::errors::{Error, Result};
use crate::model::{Quad, Slot, Term};

/// Persisted form of one mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeEntry {
    pub original_label: String,
    pub random_label: String,
}

/// Mappings allocated while staging one write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingMappings {
    blank_nodes: HashMap<String, Term>,
}

impl PendingMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blank_nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blank_nodes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    id: String,
    blank_nodes: HashMap<String, Term>,
}

/// 128 random bits as 32 hex digits.
pub fn random_id() -> String {
    format!("{:032x}", rand::rng().random::<u128>())
}

impl Scope {
    /// A new scope with a random id. Nothing is persisted until a mapping
    /// is created.
    pub fn new() -> Self {
        Self::with_id(random_id())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Scope {
            id: id.into(),
            blank_nodes: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.blank_nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blank_nodes.is_empty()
    }

    /// The generated term for an original label, if one exists.
    pub fn get(&self, original_label: &str) -> Option<&Term> {
        self.blank_nodes.get(original_label)
    }

    /// Key prefix of every mapping in scope `id`.
    pub fn key_prefix(id: &str) -> String {
        format!("{}{}/", SCOPE_PREFIX, id)
    }

    fn key(&self, original_label: &str) -> String {
        format!("{}{}", Self::key_prefix(&self.id), original_label)
    }

    /// Rebuild the scope `id` from its persisted mappings. An id with no
    /// mappings gives an empty scope.
    pub fn load(id: &str, backend: &dyn Backend) -> Result<Scope> {
        let mut scope = Scope::with_id(id);
        for entry in backend.range(RangeOptions::prefix(&Self::key_prefix(id)))? {
            let (key, value) = entry?;
            let entry: ScopeEntry = serde_json::from_slice(&value)
                .map_err(|e| Error::Corrupt(format!("scope entry {:?}: {}", key, e)))?;
            scope
                .blank_nodes
                .insert(entry.original_label, Term::BlankNode(entry.random_label));
        }
        Ok(scope)
    }

    /// Map `label`, allocating and staging a new mapping on first sight. The
    /// new mapping stays in `pending` until [`Scope::commit`].
    pub fn parse_blank_node(
        &self,
        label: &str,
        pending: &mut PendingMappings,
        batch: &mut WriteBatch,
    ) -> Result<Term> {
        if let Some(term) = self
            .blank_nodes
            .get(label)
            .or_else(|| pending.blank_nodes.get(label))
        {
            return Ok(term.clone());
        }
        let entry = ScopeEntry {
            original_label: label.to_string(),
            random_label: random_id(),
        };
        batch.put(self.key(label), serde_json::to_vec(&entry)?);
        let term = Term::BlankNode(entry.random_label);
        pending.blank_nodes.insert(entry.original_label, term.clone());
        Ok(term)
    }

    pub fn parse_term(
        &self,
        term: &Term,
        pending: &mut PendingMappings,
        batch: &mut WriteBatch,
    ) -> Result<Term> {
        match term {
            Term::BlankNode(label) => self.parse_blank_node(label, pending, batch),
            other => Ok(other.clone()),
        }
    }

    /// Rewrite the blank nodes of `quad`. Predicates are left alone.
    pub fn parse_quad(
        &self,
        quad: &Quad,
        pending: &mut PendingMappings,
        batch: &mut WriteBatch,
    ) -> Result<Quad> {
        let mut out = quad.clone();
        for slot in [Slot::Subject, Slot::Object, Slot::Graph] {
            if let Term::BlankNode(label) = quad.get(slot) {
                *out.get_mut(slot) = self.parse_blank_node(label, pending, batch)?;
            }
        }
        Ok(out)
    }

    /// Adopt mappings whose batch has been written.
    pub fn commit(&mut self, pending: PendingMappings) {
        self.blank_nodes.extend(pending.blank_nodes);
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
