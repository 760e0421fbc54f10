//! Owned RDF term and quad values.
//!
//! Terms are plain data: equality is structural and a [`Quad`] has no
//! identity beyond its four terms. The codecs in [`crate::codec`] turn them
//! into index keys and back.

use std::fmt::{self, Write};
use std::str::FromStr;

use crate::consts::{RDF_LANG_STRING, XSD_STRING};
use crate::errors::{Error, Result};

/// A literal value with either a language tag or a datatype.
///
/// The constructors keep the two consistent: a non-empty language always
/// carries `rdf:langString`, and a literal without either is `xsd:string`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    value: String,
    language: Option<String>,
    datatype: String,
}

impl Literal {
    /// A plain `xsd:string` literal.
    pub fn new_simple(value: impl Into<String>) -> Self {
        Literal {
            value: value.into(),
            language: None,
            datatype: XSD_STRING.to_string(),
        }
    }

    /// A language-tagged string. An empty tag yields a plain string.
    pub fn new_language_tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        let language = language.into();
        if language.is_empty() {
            return Self::new_simple(value);
        }
        Literal {
            value: value.into(),
            language: Some(language),
            datatype: RDF_LANG_STRING.to_string(),
        }
    }

    /// A typed literal. An empty datatype yields a plain string.
    pub fn new_typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        if datatype.is_empty() {
            return Self::new_simple(value);
        }
        Literal {
            value: value.into(),
            language: None,
            datatype,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn datatype(&self) -> &str {
        &self.datatype
    }

    pub fn is_plain(&self) -> bool {
        self.language.is_none() && self.datatype == XSD_STRING
    }
}

/// Writes `value` as an N-Triples string body.
fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for c in value.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{08}' => f.write_str("\\b")?,
            '\u{0C}' => f.write_str("\\f")?,
            c if c.is_control() => write!(f, "\\u{:04X}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        write_escaped(f, &self.value)?;
        f.write_char('"')?;
        if let Some(lang) = &self.language {
            write!(f, "@{}", lang)
        } else if self.datatype != XSD_STRING {
            write!(f, "^^<{}>", self.datatype)
        } else {
            Ok(())
        }
    }
}

/// Any value that can occupy a quad slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    NamedNode(String),
    BlankNode(String),
    Literal(Literal),
    DefaultGraph,
}

impl Term {
    pub fn named_node(iri: impl Into<String>) -> Self {
        Term::NamedNode(iri.into())
    }

    pub fn blank_node(label: impl Into<String>) -> Self {
        Term::BlankNode(label.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(Literal::new_simple(value))
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal(Literal::new_typed(value, datatype))
    }

    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal(Literal::new_language_tagged(value, language))
    }

    pub fn is_blank_node(&self) -> bool {
        matches!(self, Term::BlankNode(_))
    }

    pub fn is_default_graph(&self) -> bool {
        matches!(self, Term::DefaultGraph)
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(l) => Some(l),
            _ => None,
        }
    }
}

impl From<Literal> for Term {
    fn from(l: Literal) -> Self {
        Term::Literal(l)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(label) => write!(f, "_:{}", label),
            Term::Literal(l) => write!(f, "{}", l),
            Term::DefaultGraph => Ok(()),
        }
    }
}

/// One of the four positions of a quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Subject,
    Predicate,
    Object,
    Graph,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Subject, Slot::Predicate, Slot::Object, Slot::Graph];

    pub fn letter(self) -> char {
        match self {
            Slot::Subject => 'S',
            Slot::Predicate => 'P',
            Slot::Object => 'O',
            Slot::Graph => 'G',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Slot::Subject => "subject",
            Slot::Predicate => "predicate",
            Slot::Object => "object",
            Slot::Graph => "graph",
        }
    }

    pub fn from_letter(c: char) -> Option<Slot> {
        match c.to_ascii_uppercase() {
            'S' => Some(Slot::Subject),
            'P' => Some(Slot::Predicate),
            'O' => Some(Slot::Object),
            'G' => Some(Slot::Graph),
            _ => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Slot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(slot) = Slot::from_letter(c) {
                return Ok(slot);
            }
        }
        Slot::ALL
            .into_iter()
            .find(|slot| slot.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidPattern(format!("unknown slot '{}'", s)))
    }
}

/// A subject/predicate/object/graph tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quad {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph: Term,
}

impl Quad {
    /// Build a quad, rejecting the default graph marker outside the graph slot.
    pub fn new(subject: Term, predicate: Term, object: Term, graph: Term) -> Result<Self> {
        let quad = Quad {
            subject,
            predicate,
            object,
            graph,
        };
        quad.validate()?;
        Ok(quad)
    }

    pub fn validate(&self) -> Result<()> {
        for slot in [Slot::Subject, Slot::Predicate, Slot::Object] {
            if self.get(slot).is_default_graph() {
                return Err(Error::InvalidTerm(format!(
                    "the default graph cannot be used as {}",
                    slot
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, slot: Slot) -> &Term {
        match slot {
            Slot::Subject => &self.subject,
            Slot::Predicate => &self.predicate,
            Slot::Object => &self.object,
            Slot::Graph => &self.graph,
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut Term {
        match slot {
            Slot::Subject => &mut self.subject,
            Slot::Predicate => &mut self.predicate,
            Slot::Object => &mut self.object,
            Slot::Graph => &mut self.graph,
        }
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if !self.graph.is_default_graph() {
            write!(f, " {}", self.graph)?;
        }
        write!(f, " .")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_constructors_keep_language_and_datatype_consistent() {
        let l = Literal::new_language_tagged("chat", "fr");
        assert_eq!(l.datatype(), RDF_LANG_STRING);
        assert_eq!(l.language(), Some("fr"));

        let l = Literal::new_language_tagged("plain", "");
        assert!(l.is_plain());
        assert_eq!(l.datatype(), XSD_STRING);

        let l = Literal::new_typed("x", "");
        assert!(l.is_plain());
    }

    #[test]
    fn slot_parsing_accepts_letters_and_names() {
        assert_eq!("S".parse::<Slot>().unwrap(), Slot::Subject);
        assert_eq!("g".parse::<Slot>().unwrap(), Slot::Graph);
        assert_eq!("object".parse::<Slot>().unwrap(), Slot::Object);
        assert_eq!("Predicate".parse::<Slot>().unwrap(), Slot::Predicate);
        assert!("x".parse::<Slot>().is_err());
        assert!("subjects".parse::<Slot>().is_err());
    }

    #[test]
    fn quad_rejects_default_graph_outside_graph_slot() {
        let err = Quad::new(
            Term::DefaultGraph,
            Term::named_node("http://ex.org/p"),
            Term::literal("o"),
            Term::DefaultGraph,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTerm(_)));

        let q = Quad::new(
            Term::named_node("http://ex.org/s"),
            Term::named_node("http://ex.org/p"),
            Term::lang_literal("o", "en"),
            Term::DefaultGraph,
        )
        .unwrap();
        assert_eq!(q.to_string(), "<http://ex.org/s> <http://ex.org/p> \"o\"@en .");
    }

    #[test]
    fn literal_values_use_ntriples_escapes() {
        let l = Literal::new_simple("say \"hi\"\\\n\tbell\u{7}");
        assert_eq!(l.to_string(), r#""say \"hi\"\\\n\tbell\u0007""#);
        let l = Literal::new_typed("caf\u{e9}\r", "http://ex.org/dt");
        assert_eq!(l.to_string(), "\"caf\u{e9}\\r\"^^<http://ex.org/dt>");
    }
}
