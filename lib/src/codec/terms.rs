//! Single-term encoding.
//!
//! A term becomes a key fragment (compared by the engine) and a value
//! fragment (lengths needed to split the key again). Both start with the
//! same kind tag:
//!
//! | tag | kind              | key fragment                              | value fragment          |
//! |-----|-------------------|-------------------------------------------|-------------------------|
//! | `0` | named node        | `0` iri                                   | tag, len                |
//! | `1` | blank node        | `1` label                                 | tag, len                |
//! | `2` | default graph     | `2d`                                      | tag                     |
//! | `3` | typed literal     | `3` datatype SEP value                    | tag, dt len, value len  |
//! | `4` | language literal  | `4` language SEP value                    | tag, value len, lang len|
//! | `5` | `xsd:string`      | `5` value                                 | tag, len                |
//! | `6` | numeric literal   | `6` fpstring SEP datatype SEP value       | tag, fp, dt, value lens |
//! | `7` | `xsd:dateTime`    | `7` fpstring SEP datatype SEP value       | tag, fp, dt, value lens |
//!
//! Lengths are little-endian `u32` byte counts.

use chrono::{DateTime, NaiveDateTime};

use crate::consts::{is_numeric_datatype, FORBIDDEN_CHARS, SEP, XSD_DATE_TIME, XSD_STRING};
use crate::errors::{Error, Result};
use crate::fpstring;
use crate::model::{Literal, Term};
use crate::prefixes::Prefixes;

pub const TAG_NAMED_NODE: char = '0';
pub const TAG_BLANK_NODE: char = '1';
pub const TAG_DEFAULT_GRAPH: char = '2';
pub const TAG_TYPED_LITERAL: char = '3';
pub const TAG_LANG_LITERAL: char = '4';
pub const TAG_STRING_LITERAL: char = '5';
pub const TAG_NUMERIC_LITERAL: char = '6';
pub const TAG_DATE_TIME_LITERAL: char = '7';

pub const DEFAULT_GRAPH_KEY: &str = "2d";

const LEN_BYTES: usize = 4;

/// How a literal is laid out, decided from its datatype and lexical form.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LiteralKind {
    Typed,
    Lang,
    Plain,
    Numeric(String),
    DateTime(String),
}

/// Numbers that do not parse or are NaN, and dates that do not parse, are
/// rejected rather than stored under another layout.
fn classify(lit: &Literal) -> Result<LiteralKind> {
    if lit.language().is_some() {
        return Ok(LiteralKind::Lang);
    }
    let datatype = lit.datatype();
    if datatype == XSD_STRING {
        return Ok(LiteralKind::Plain);
    }
    if is_numeric_datatype(datatype) {
        let n = lit.value().parse::<f64>().map_err(|_| {
            Error::InvalidTerm(format!("{:?} is not a valid <{}>", lit.value(), datatype))
        })?;
        return Ok(LiteralKind::Numeric(fpstring::encode(n)?));
    }
    if datatype == XSD_DATE_TIME {
        let ms = parse_date_time_millis(lit.value()).ok_or_else(|| {
            Error::InvalidTerm(format!("{:?} is not a valid <{}>", lit.value(), datatype))
        })?;
        return Ok(LiteralKind::DateTime(fpstring::encode(ms as f64)?));
    }
    Ok(LiteralKind::Typed)
}

/// Milliseconds since the Unix epoch for an `xsd:dateTime` lexical form.
/// Values without a zone offset are read as UTC.
pub fn parse_date_time_millis(value: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc().timestamp_millis())
}

fn checked(s: &str) -> Result<&str> {
    if s.contains(&FORBIDDEN_CHARS[..]) {
        return Err(Error::InvalidTerm(format!(
            "{:?} contains a reserved character (U+0000 or U+10FFFF)",
            s
        )));
    }
    Ok(s)
}

/// Exact number of value bytes [`write_term`] produces for `term`.
pub fn term_value_len(term: &Term) -> usize {
    match term {
        Term::NamedNode(_) | Term::BlankNode(_) => 1 + LEN_BYTES,
        Term::DefaultGraph => 1,
        Term::Literal(lit) => match classify(lit) {
            Ok(LiteralKind::Plain) => 1 + LEN_BYTES,
            Ok(LiteralKind::Typed) | Ok(LiteralKind::Lang) => 1 + 2 * LEN_BYTES,
            // write_term fails on the literal before writing anything
            Ok(LiteralKind::Numeric(_)) | Ok(LiteralKind::DateTime(_)) | Err(_) => 1 + 3 * LEN_BYTES,
        },
    }
}

struct ValueWriter<'a> {
    buf: &'a mut [u8],
    start: usize,
    pos: usize,
}

impl<'a> ValueWriter<'a> {
    fn new(buf: &'a mut [u8], offset: usize) -> Self {
        ValueWriter {
            buf,
            start: offset,
            pos: offset,
        }
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        let end = self.pos + bytes.len();
        let dst = self
            .buf
            .get_mut(self.pos..end)
            .ok_or_else(|| Error::InvalidTerm(format!("value buffer too small at offset {}", self.pos)))?;
        dst.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn tag(&mut self, tag: char) -> Result<()> {
        self.put(&[tag as u8])
    }

    fn len(&mut self, s: &str) -> Result<()> {
        let n = u32::try_from(s.len())
            .map_err(|_| Error::InvalidTerm("term longer than 4 GiB".to_string()))?;
        self.put(&n.to_le_bytes())
    }

    fn written(&self) -> usize {
        self.pos - self.start
    }
}

/// Append the key fragment of `term` to `key` and write its value fragment
/// into `value` at `offset`. Returns the number of value bytes written.
pub fn write_term(
    term: &Term,
    prefixes: &dyn Prefixes,
    key: &mut String,
    value: &mut [u8],
    offset: usize,
) -> Result<usize> {
    let mut w = ValueWriter::new(value, offset);
    match term {
        Term::NamedNode(iri) => {
            let compact = prefixes.compact_iri(iri);
            let compact = checked(&compact)?;
            w.tag(TAG_NAMED_NODE)?;
            w.len(compact)?;
            key.push(TAG_NAMED_NODE);
            key.push_str(compact);
        }
        Term::BlankNode(label) => {
            let label = checked(label)?;
            w.tag(TAG_BLANK_NODE)?;
            w.len(label)?;
            key.push(TAG_BLANK_NODE);
            key.push_str(label);
        }
        Term::DefaultGraph => {
            w.tag(TAG_DEFAULT_GRAPH)?;
            key.push_str(DEFAULT_GRAPH_KEY);
        }
        Term::Literal(lit) => write_literal(lit, prefixes, key, &mut w)?,
    }
    Ok(w.written())
}

fn write_literal(
    lit: &Literal,
    prefixes: &dyn Prefixes,
    key: &mut String,
    w: &mut ValueWriter<'_>,
) -> Result<()> {
    let value = checked(lit.value())?;
    match classify(lit)? {
        LiteralKind::Plain => {
            w.tag(TAG_STRING_LITERAL)?;
            w.len(value)?;
            key.push(TAG_STRING_LITERAL);
            key.push_str(value);
        }
        LiteralKind::Lang => {
            let lang = checked(lit.language().unwrap_or_default())?;
            w.tag(TAG_LANG_LITERAL)?;
            w.len(value)?;
            w.len(lang)?;
            key.push(TAG_LANG_LITERAL);
            key.push_str(lang);
            key.push_str(SEP);
            key.push_str(value);
        }
        LiteralKind::Typed => {
            let datatype = prefixes.compact_iri(lit.datatype());
            let datatype = checked(&datatype)?;
            w.tag(TAG_TYPED_LITERAL)?;
            w.len(datatype)?;
            w.len(value)?;
            key.push(TAG_TYPED_LITERAL);
            key.push_str(datatype);
            key.push_str(SEP);
            key.push_str(value);
        }
        LiteralKind::Numeric(fp) | LiteralKind::DateTime(fp) => {
            let tag = if lit.datatype() == XSD_DATE_TIME {
                TAG_DATE_TIME_LITERAL
            } else {
                TAG_NUMERIC_LITERAL
            };
            let datatype = prefixes.compact_iri(lit.datatype());
            let datatype = checked(&datatype)?;
            w.tag(tag)?;
            w.len(&fp)?;
            w.len(datatype)?;
            w.len(value)?;
            key.push(tag);
            key.push_str(&fp);
            key.push_str(SEP);
            key.push_str(datatype);
            key.push_str(SEP);
            key.push_str(value);
        }
    }
    Ok(())
}

/// Key fragment of `term` on its own.
pub fn key_fragment(term: &Term, prefixes: &dyn Prefixes) -> Result<String> {
    let mut key = String::new();
    let mut scratch = vec![0u8; term_value_len(term)];
    write_term(term, prefixes, &mut key, &mut scratch, 0)?;
    Ok(key)
}

/// Position of a range bound in key space.
///
/// `axis` is the key prefix shared by every literal the bound can be compared
/// with (all numbers, all dates, all plain strings, strings of one language,
/// or literals of one other datatype). `fragment` is the bound itself,
/// terminated by SEP: numbers and dates compare on their fpstring only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFragment {
    pub axis: String,
    pub fragment: String,
}

pub fn range_fragment(lit: &Literal, prefixes: &dyn Prefixes) -> Result<RangeFragment> {
    let value = checked(lit.value())?;
    let (axis, rest) = match classify(lit)? {
        LiteralKind::Numeric(fp) => (TAG_NUMERIC_LITERAL.to_string(), fp),
        LiteralKind::DateTime(fp) => (TAG_DATE_TIME_LITERAL.to_string(), fp),
        LiteralKind::Plain => (TAG_STRING_LITERAL.to_string(), value.to_string()),
        LiteralKind::Lang => {
            let lang = checked(lit.language().unwrap_or_default())?;
            (format!("{}{}{}", TAG_LANG_LITERAL, lang, SEP), value.to_string())
        }
        LiteralKind::Typed => {
            let datatype = prefixes.compact_iri(lit.datatype());
            let datatype = checked(&datatype)?;
            (format!("{}{}{}", TAG_TYPED_LITERAL, datatype, SEP), value.to_string())
        }
    };
    let fragment = format!("{}{}{}", axis, rest, SEP);
    Ok(RangeFragment { axis, fragment })
}

struct Reader<'a> {
    key: &'a str,
    value: &'a [u8],
    k: usize,
    v: usize,
}

impl<'a> Reader<'a> {
    fn len(&mut self) -> Result<usize> {
        let bytes = self
            .value
            .get(self.v..self.v + LEN_BYTES)
            .ok_or_else(|| Error::Corrupt(format!("truncated length at value offset {}", self.v)))?;
        self.v += LEN_BYTES;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
    }

    fn take(&mut self, n: usize) -> Result<&'a str> {
        let s = self
            .key
            .get(self.k..self.k + n)
            .ok_or_else(|| Error::Corrupt(format!("key too short at offset {}", self.k)))?;
        self.k += n;
        Ok(s)
    }

    fn sep(&mut self) -> Result<()> {
        if self.take(SEP.len())? != SEP {
            return Err(Error::Corrupt(format!("missing separator at key offset {}", self.k)));
        }
        Ok(())
    }
}

/// Decode one term starting at `key_offset`/`value_offset`. Returns the term
/// and the key and value bytes it consumed.
pub fn read_term(
    key: &str,
    key_offset: usize,
    value: &[u8],
    value_offset: usize,
    prefixes: &dyn Prefixes,
) -> Result<(Term, usize, usize)> {
    let tag = *value
        .get(value_offset)
        .ok_or_else(|| Error::Corrupt(format!("missing term tag at value offset {}", value_offset)))?
        as char;
    let key_tag = key.get(key_offset..).and_then(|k| k.chars().next());
    if key_tag != Some(tag) {
        return Err(Error::Corrupt(format!(
            "key tag {:?} does not match value tag {:?}",
            key_tag, tag
        )));
    }
    let mut r = Reader {
        key,
        value,
        k: key_offset + 1,
        v: value_offset + 1,
    };
    let term = match tag {
        TAG_NAMED_NODE => {
            let n = r.len()?;
            Term::NamedNode(prefixes.expand_term(r.take(n)?))
        }
        TAG_BLANK_NODE => {
            let n = r.len()?;
            Term::BlankNode(r.take(n)?.to_string())
        }
        TAG_DEFAULT_GRAPH => {
            r.k = key_offset;
            if r.take(DEFAULT_GRAPH_KEY.len())? != DEFAULT_GRAPH_KEY {
                return Err(Error::Corrupt("malformed default graph key".to_string()));
            }
            Term::DefaultGraph
        }
        TAG_TYPED_LITERAL => {
            let (dl, vl) = (r.len()?, r.len()?);
            let datatype = prefixes.expand_term(r.take(dl)?);
            r.sep()?;
            Term::Literal(Literal::new_typed(r.take(vl)?, datatype))
        }
        TAG_LANG_LITERAL => {
            let (vl, ll) = (r.len()?, r.len()?);
            let lang = r.take(ll)?;
            r.sep()?;
            Term::Literal(Literal::new_language_tagged(r.take(vl)?, lang))
        }
        TAG_STRING_LITERAL => {
            let n = r.len()?;
            Term::Literal(Literal::new_simple(r.take(n)?))
        }
        TAG_NUMERIC_LITERAL | TAG_DATE_TIME_LITERAL => {
            let (fl, dl, vl) = (r.len()?, r.len()?, r.len()?);
            r.take(fl)?;
            r.sep()?;
            let datatype = prefixes.expand_term(r.take(dl)?);
            r.sep()?;
            Term::Literal(Literal::new_typed(r.take(vl)?, datatype))
        }
        other => {
            return Err(Error::Corrupt(format!("unknown term tag {:?}", other)));
        }
    };
    Ok((term, r.k - key_offset, r.v - value_offset))
}
