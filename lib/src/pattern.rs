//! Query patterns: per slot nothing, an exact term, or one literal range.

use crate::model::{Literal, Slot, Term};

/// Inequality bounds over one literal value axis.
///
/// When both `gt` and `gte` (or `lt` and `lte`) are set the strict bound is
/// used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Range {
    pub gt: Option<Literal>,
    pub gte: Option<Literal>,
    pub lt: Option<Literal>,
    pub lte: Option<Literal>,
}

impl Range {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gt(mut self, lit: Literal) -> Self {
        self.gt = Some(lit);
        self
    }

    pub fn gte(mut self, lit: Literal) -> Self {
        self.gte = Some(lit);
        self
    }

    pub fn lt(mut self, lit: Literal) -> Self {
        self.lt = Some(lit);
        self
    }

    pub fn lte(mut self, lit: Literal) -> Self {
        self.lte = Some(lit);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }

    pub(crate) fn bounds(&self) -> impl Iterator<Item = &Literal> {
        [&self.gt, &self.gte, &self.lt, &self.lte]
            .into_iter()
            .filter_map(|b| b.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Term(Term),
    Range(Range),
}

impl From<Term> for Matcher {
    fn from(t: Term) -> Self {
        Matcher::Term(t)
    }
}

impl From<Range> for Matcher {
    fn from(r: Range) -> Self {
        Matcher::Range(r)
    }
}

/// Slots left as `None` match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    pub subject: Option<Matcher>,
    pub predicate: Option<Matcher>,
    pub object: Option<Matcher>,
    pub graph: Option<Matcher>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(self, m: impl Into<Matcher>) -> Self {
        self.with(Slot::Subject, m)
    }

    pub fn predicate(self, m: impl Into<Matcher>) -> Self {
        self.with(Slot::Predicate, m)
    }

    pub fn object(self, m: impl Into<Matcher>) -> Self {
        self.with(Slot::Object, m)
    }

    pub fn graph(self, m: impl Into<Matcher>) -> Self {
        self.with(Slot::Graph, m)
    }

    pub fn with(mut self, slot: Slot, m: impl Into<Matcher>) -> Self {
        *self.slot_mut(slot) = Some(m.into());
        self
    }

    pub fn get(&self, slot: Slot) -> Option<&Matcher> {
        match slot {
            Slot::Subject => self.subject.as_ref(),
            Slot::Predicate => self.predicate.as_ref(),
            Slot::Object => self.object.as_ref(),
            Slot::Graph => self.graph.as_ref(),
        }
        // a range without bounds constrains nothing
        .filter(|m| !matches!(m, Matcher::Range(r) if r.is_empty()))
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<Matcher> {
        match slot {
            Slot::Subject => &mut self.subject,
            Slot::Predicate => &mut self.predicate,
            Slot::Object => &mut self.object,
            Slot::Graph => &mut self.graph,
        }
    }
}
