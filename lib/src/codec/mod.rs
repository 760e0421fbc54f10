//! Term and quad codecs.

pub mod quads;
pub mod terms;

pub use quads::{quad_key, quad_value_len, read_quad, write_quad};
pub use terms::{key_fragment, range_fragment, read_term, term_value_len, write_term, RangeFragment};
