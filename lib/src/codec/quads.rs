//! Quad encoding: one key and one value per index permutation.
//!
//! `key = prefix + Σ(term fragment + SEP)` over the slots in index order;
//! the value is the concatenation of the term value fragments in the same
//! order, so its size does not depend on the permutation.

use crate::codec::terms::{read_term, term_value_len, write_term};
use crate::consts::SEP;
use crate::errors::{Error, Result};
use crate::model::{Quad, Slot, Term};
use crate::prefixes::Prefixes;

/// Value bytes one quad occupies in any index.
pub fn quad_value_len(quad: &Quad) -> usize {
    Slot::ALL.iter().map(|slot| term_value_len(quad.get(*slot))).sum()
}

/// Encode `quad` in `slots` order. The value fragments are written into
/// `value` starting at `value_offset`; returns the key and the number of
/// value bytes written.
pub fn write_quad(
    prefix: &str,
    value: &mut [u8],
    value_offset: usize,
    quad: &Quad,
    slots: &[Slot],
    prefixes: &dyn Prefixes,
) -> Result<(String, usize)> {
    let mut key = String::with_capacity(prefix.len() + 64);
    key.push_str(prefix);
    let mut written = 0;
    for &slot in slots {
        let term = quad.get(slot);
        if slot != Slot::Graph && term.is_default_graph() {
            return Err(Error::InvalidTerm(format!(
                "the default graph cannot be used as {}",
                slot
            )));
        }
        written += write_term(term, prefixes, &mut key, value, value_offset + written)?;
        key.push_str(SEP);
    }
    Ok((key, written))
}

/// Key of `quad` in `slots` order, without keeping the value.
pub fn quad_key(prefix: &str, quad: &Quad, slots: &[Slot], prefixes: &dyn Prefixes) -> Result<String> {
    let mut scratch = vec![0u8; quad_value_len(quad)];
    let (key, _) = write_quad(prefix, &mut scratch, 0, quad, slots, prefixes)?;
    Ok(key)
}

/// Inverse of [`write_quad`]; `key_offset` skips the index prefix.
pub fn read_quad(
    key: &str,
    key_offset: usize,
    value: &[u8],
    value_offset: usize,
    slots: &[Slot],
    prefixes: &dyn Prefixes,
) -> Result<Quad> {
    let mut terms: [Option<Term>; 4] = [None, None, None, None];
    let (mut k, mut v) = (key_offset, value_offset);
    for &slot in slots {
        let (term, kc, vc) = read_term(key, k, value, v, prefixes)?;
        k += kc;
        v += vc;
        if key.get(k..k + SEP.len()) != Some(SEP) {
            return Err(Error::Corrupt(format!("missing separator after {} in key", slot)));
        }
        k += SEP.len();
        terms[slot as usize] = Some(term);
    }
    if k != key.len() {
        return Err(Error::Corrupt(format!(
            "{} unexpected bytes at the end of a key",
            key.len() - k
        )));
    }
    let [subject, predicate, object, graph] = terms;
    match (subject, predicate, object, graph) {
        (Some(subject), Some(predicate), Some(object), Some(graph)) => Ok(Quad {
            subject,
            predicate,
            object,
            graph,
        }),
        _ => Err(Error::Corrupt("index does not cover every slot".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::XSD_INTEGER;
    use crate::prefixes::NoPrefixes;

    const SPOG: [Slot; 4] = [Slot::Subject, Slot::Predicate, Slot::Object, Slot::Graph];
    const OGSP: [Slot; 4] = [Slot::Object, Slot::Graph, Slot::Subject, Slot::Predicate];

    fn quad() -> Quad {
        Quad::new(
            Term::named_node("http://ex.org/s"),
            Term::named_node("http://ex.org/p"),
            Term::typed_literal("42", XSD_INTEGER),
            Term::DefaultGraph,
        )
        .unwrap()
    }

    #[test]
    fn encodes_every_permutation_into_one_shared_buffer() {
        let q = quad();
        let len = quad_value_len(&q);
        let mut arena = vec![0u8; 2 * len];
        let (k1, n1) = write_quad("SPOG\u{0}\u{0}", &mut arena, 0, &q, &SPOG, &NoPrefixes).unwrap();
        let (k2, n2) = write_quad("OGSP\u{0}\u{0}", &mut arena, n1, &q, &OGSP, &NoPrefixes).unwrap();
        assert_eq!((n1, n2), (len, len));

        assert_eq!(read_quad(&k1, 6, &arena, 0, &SPOG, &NoPrefixes).unwrap(), q);
        assert_eq!(read_quad(&k2, 6, &arena, n1, &OGSP, &NoPrefixes).unwrap(), q);
        assert!(k2.starts_with("OGSP\u{0}\u{0}6"));
        assert!(k1.ends_with("2d\u{0}\u{0}"));
    }

    #[test]
    fn default_graph_only_in_graph_slot() {
        let mut q = quad();
        q.object = Term::DefaultGraph;
        let err = quad_key("", &q, &SPOG, &NoPrefixes).unwrap_err();
        assert!(matches!(err, Error::InvalidTerm(_)));
    }

    #[test]
    fn malformed_keys_are_corrupt() {
        let q = quad();
        let mut value = vec![0u8; quad_value_len(&q)];
        let (key, _) = write_quad("", &mut value, 0, &q, &SPOG, &NoPrefixes).unwrap();

        let trailing = format!("{}x", key);
        assert!(matches!(read_quad(&trailing, 0, &value, 0, &SPOG, &NoPrefixes), Err(Error::Corrupt(_))));

        let missing_sep = key.replacen("\u{0}\u{0}", "\u{0}\u{1}", 1);
        assert!(matches!(read_quad(&missing_sep, 0, &value, 0, &SPOG, &NoPrefixes), Err(Error::Corrupt(_))));
    }
}
