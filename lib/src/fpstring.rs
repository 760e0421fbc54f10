//! Order-preserving string encoding of `f64`.
//!
//! Every finite value, and both infinities, map to a 23 character string
//! whose byte order matches numeric order:
//!
//! ```text
//! case(1) exponent(3) mantissa "d.ddddddddddddddddd"(19)
//! ```
//!
//! The case digit separates -inf, negatives with a non-negative exponent,
//! negatives with a negative exponent, zero, the two positive groups and
//! +inf. For negative numbers both the exponent and the mantissa are stored
//! inverted so that larger magnitudes sort first.

use crate::errors::{Error, Result};

/// Length of every encoded value.
pub const LEN: usize = 23;

const NEG_INF: &str = "00000.00000000000000000";
const ZERO: &str = "30000.00000000000000000";
const POS_INF: &str = "69999.99999999999999999";

const MANTISSA_DIGITS: usize = 18;
const MANTISSA_SCALE: u64 = 1_000_000_000_000_000_000;

/// Encode `n`; NaN has no place in the ordering and is rejected.
pub fn encode(n: f64) -> Result<String> {
    if n.is_nan() {
        return Err(Error::NotANumber);
    }
    if n == 0.0 {
        return Ok(ZERO.to_string());
    }
    if n == f64::INFINITY {
        return Ok(POS_INF.to_string());
    }
    if n == f64::NEG_INFINITY {
        return Ok(NEG_INF.to_string());
    }

    let (exp, mantissa) = normalize(n.abs())?;
    let negative = n < 0.0;
    let (case, exp_field) = match (negative, exp >= 0) {
        (true, true) => ('1', 999 - exp),
        (true, false) => ('2', -exp),
        (false, false) => ('4', 999 + exp),
        (false, true) => ('5', exp),
    };
    let mantissa = if negative {
        MANTISSA_SCALE - mantissa
    } else {
        mantissa
    };
    let digits = format!("{:0width$}", mantissa, width = MANTISSA_DIGITS);
    Ok(format!("{}{:03}{}.{}", case, exp_field, &digits[..1], &digits[1..]))
}

/// Split a positive finite value into a decimal exponent and its 18
/// significant digits, rounded correctly by the formatter.
fn normalize(n: f64) -> Result<(i32, u64)> {
    let formatted = format!("{:.17e}", n);
    let (mantissa, exp) = formatted
        .split_once('e')
        .ok_or_else(|| Error::InvalidTerm(format!("cannot normalize {}", n)))?;
    let exp: i32 = exp
        .parse()
        .map_err(|_| Error::InvalidTerm(format!("cannot normalize {}", n)))?;
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let mantissa: u64 = digits
        .parse()
        .map_err(|_| Error::InvalidTerm(format!("cannot normalize {}", n)))?;
    Ok((exp, mantissa))
}
