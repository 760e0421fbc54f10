//! Conversions to and from the `oxigraph` data model.

use oxigraph::model::{
    BlankNode, GraphName, Literal as OxLiteral, NamedNode, NamedOrBlankNode, Quad as OxQuad,
    Term as OxTerm,
};

use crate::errors::{Error, Result};
use crate::model::{Literal, Quad, Term};

impl From<&OxLiteral> for Literal {
    fn from(l: &OxLiteral) -> Self {
        match l.language() {
            Some(lang) => Literal::new_language_tagged(l.value(), lang),
            None => Literal::new_typed(l.value(), l.datatype().as_str()),
        }
    }
}

impl From<&OxTerm> for Term {
    #[allow(unreachable_patterns)]
    fn from(t: &OxTerm) -> Self {
        match t {
            OxTerm::NamedNode(n) => Term::NamedNode(n.as_str().to_string()),
            OxTerm::BlankNode(b) => Term::BlankNode(b.as_str().to_string()),
            OxTerm::Literal(l) => Term::Literal(l.into()),
            // quoted triples have no counterpart
            other => Term::Literal(Literal::new_simple(other.to_string())),
        }
    }
}

impl From<&NamedOrBlankNode> for Term {
    fn from(t: &NamedOrBlankNode) -> Self {
        match t {
            NamedOrBlankNode::NamedNode(n) => Term::NamedNode(n.as_str().to_string()),
            NamedOrBlankNode::BlankNode(b) => Term::BlankNode(b.as_str().to_string()),
        }
    }
}

impl From<&GraphName> for Term {
    fn from(g: &GraphName) -> Self {
        match g {
            GraphName::NamedNode(n) => Term::NamedNode(n.as_str().to_string()),
            GraphName::BlankNode(b) => Term::BlankNode(b.as_str().to_string()),
            GraphName::DefaultGraph => Term::DefaultGraph,
        }
    }
}

impl From<&OxQuad> for Quad {
    fn from(q: &OxQuad) -> Self {
        Quad {
            subject: (&q.subject).into(),
            predicate: Term::NamedNode(q.predicate.as_str().to_string()),
            object: (&q.object).into(),
            graph: (&q.graph_name).into(),
        }
    }
}

fn named_node(iri: &str) -> Result<NamedNode> {
    NamedNode::new(iri).map_err(|e| Error::InvalidTerm(format!("<{}>: {}", iri, e)))
}

fn blank_node(label: &str) -> Result<BlankNode> {
    BlankNode::new(label).map_err(|e| Error::InvalidTerm(format!("_:{}: {}", label, e)))
}

impl TryFrom<&Literal> for OxLiteral {
    type Error = Error;

    fn try_from(l: &Literal) -> Result<Self> {
        if let Some(lang) = l.language() {
            return OxLiteral::new_language_tagged_literal(l.value(), lang)
                .map_err(|e| Error::InvalidTerm(format!("@{}: {}", lang, e)));
        }
        Ok(OxLiteral::new_typed_literal(l.value(), named_node(l.datatype())?))
    }
}

impl TryFrom<&Term> for OxTerm {
    type Error = Error;

    fn try_from(t: &Term) -> Result<Self> {
        Ok(match t {
            Term::NamedNode(iri) => named_node(iri)?.into(),
            Term::BlankNode(label) => blank_node(label)?.into(),
            Term::Literal(l) => OxLiteral::try_from(l)?.into(),
            Term::DefaultGraph => {
                return Err(Error::InvalidTerm("the default graph is not an RDF term".to_string()));
            }
        })
    }
}

impl TryFrom<&Quad> for OxQuad {
    type Error = Error;

    fn try_from(q: &Quad) -> Result<Self> {
        let subject: NamedOrBlankNode = match &q.subject {
            Term::NamedNode(iri) => named_node(iri)?.into(),
            Term::BlankNode(label) => blank_node(label)?.into(),
            other => {
                return Err(Error::InvalidTerm(format!("{} cannot be a subject", other)));
            }
        };
        let predicate = match &q.predicate {
            Term::NamedNode(iri) => named_node(iri)?,
            other => {
                return Err(Error::InvalidTerm(format!("{} cannot be a predicate", other)));
            }
        };
        let graph = match &q.graph {
            Term::NamedNode(iri) => GraphName::NamedNode(named_node(iri)?),
            Term::BlankNode(label) => GraphName::BlankNode(blank_node(label)?),
            Term::DefaultGraph => GraphName::DefaultGraph,
            Term::Literal(_) => {
                return Err(Error::InvalidTerm("a literal cannot name a graph".to_string()));
            }
        };
        Ok(OxQuad::new(subject, predicate, OxTerm::try_from(&q.object)?, graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::XSD_INTEGER;

    #[test]
    fn quads_convert_both_ways() {
        let quad = Quad::new(
            Term::blank_node("b0"),
            Term::named_node("http://ex.org/p"),
            Term::typed_literal("3", XSD_INTEGER),
            Term::named_node("http://ex.org/g"),
        )
        .unwrap();
        let ox = OxQuad::try_from(&quad).unwrap();
        assert_eq!(Quad::from(&ox), quad);

        let lang = Term::lang_literal("hi", "en");
        let ox = OxTerm::try_from(&lang).unwrap();
        assert_eq!(Term::from(&ox), lang);
    }

    #[test]
    fn literal_graph_names_are_rejected() {
        let quad = Quad {
            subject: Term::named_node("http://ex.org/s"),
            predicate: Term::named_node("http://ex.org/p"),
            object: Term::literal("o"),
            graph: Term::literal("g"),
        };
        assert!(OxQuad::try_from(&quad).is_err());
    }
}
