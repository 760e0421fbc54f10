//! Reserved key strings and the datatype IRIs the codecs distinguish.

/// Separator placed after every term fragment in an index key.
pub const SEP: &str = "\u{0}\u{0}";
/// Upper-bound sentinel; sorts above every encoded character.
pub const BOUNDARY: &str = "\u{10FFFF}\u{10FFFF}";

/// Characters no stored string may contain.
pub const FORBIDDEN_CHARS: [char; 2] = ['\u{0}', '\u{10FFFF}'];

/// Names of the default index permutations, in planning order.
pub const DEFAULT_INDEXES: [&str; 6] = ["SPOG", "OGSP", "GSPO", "SOPG", "POGS", "GPOS"];

/// Key namespace for persisted blank-node scopes.
pub const SCOPE_PREFIX: &str = "SCOPE/";

// rdf
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
// xsd
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

pub const NUMERIC_DATATYPES: [&str; 16] = [
    XSD_INTEGER,
    XSD_DECIMAL,
    XSD_DOUBLE,
    XSD_FLOAT,
    "http://www.w3.org/2001/XMLSchema#nonPositiveInteger",
    "http://www.w3.org/2001/XMLSchema#negativeInteger",
    "http://www.w3.org/2001/XMLSchema#long",
    "http://www.w3.org/2001/XMLSchema#int",
    "http://www.w3.org/2001/XMLSchema#short",
    "http://www.w3.org/2001/XMLSchema#byte",
    "http://www.w3.org/2001/XMLSchema#nonNegativeInteger",
    "http://www.w3.org/2001/XMLSchema#unsignedLong",
    "http://www.w3.org/2001/XMLSchema#unsignedInt",
    "http://www.w3.org/2001/XMLSchema#unsignedShort",
    "http://www.w3.org/2001/XMLSchema#unsignedByte",
    "http://www.w3.org/2001/XMLSchema#positiveInteger",
];

pub fn is_numeric_datatype(iri: &str) -> bool {
    NUMERIC_DATATYPES.contains(&iri)
}
