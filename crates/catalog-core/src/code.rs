//! Deterministic code allocation for reference entities.
//!
//! ## Summary
//! Codes have the shape `PREFIX` + two decimal digits + one uppercase letter
//! (`BRD00A`, `BRD00B`, ..., `BRD00Z`, `BRD01A`). Because the digit field is
//! fixed-width, lexicographic order of matching codes is also allocation order.

use crate::error::{CoreError, CoreResult};

/// Number of characters following the prefix.
const SUFFIX_LEN: usize = 3;

/// Highest value the two-digit counter can hold.
const MAX_COUNTER: u8 = 99;

/// ## Summary
/// Returns the next unused code for `prefix`, given a snapshot of the codes
/// already in use.
///
/// Codes that do not match `PREFIX` + `NN` + `L` are ignored. With no matching
/// code the first code is `PREFIX00A`. Otherwise the greatest matching code is
/// incremented: the letter advances, and on overflow past `Z` it wraps to `A`
/// while the counter advances by one.
///
/// The function keeps no state; callers should pass a fresh snapshot.
///
/// ## Errors
/// Returns `CodeSpaceExhausted` when the greatest code is already `PREFIX99Z`.
pub fn allocate_code<I, S>(prefix: &str, existing: I) -> CoreResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let last = existing
        .into_iter()
        .filter_map(|code| {
            let code = code.as_ref();
            is_allocated_code(prefix, code).then(|| code.to_owned())
        })
        .max();

    let Some(last) = last else {
        return Ok(format_code(prefix, 0, 'A'));
    };

    let (counter, letter) = decode_suffix(&last[prefix.len()..])
        .ok_or(CoreError::InvariantViolation("matched code has malformed suffix"))?;

    if letter < b'Z' {
        return Ok(format_code(prefix, counter, char::from(letter + 1)));
    }

    if counter >= MAX_COUNTER {
        return Err(CoreError::CodeSpaceExhausted {
            prefix: prefix.to_owned(),
            last,
        });
    }

    Ok(format_code(prefix, counter + 1, 'A'))
}

/// Returns `true` if `code` is `prefix` followed by two ASCII digits and one
/// uppercase ASCII letter.
#[must_use]
pub fn is_allocated_code(prefix: &str, code: &str) -> bool {
    code.len() == prefix.len() + SUFFIX_LEN
        && code.starts_with(prefix)
        && decode_suffix(&code[prefix.len()..]).is_some()
}

fn decode_suffix(suffix: &str) -> Option<(u8, u8)> {
    let bytes = suffix.as_bytes();
    match bytes {
        [tens, ones, letter]
            if tens.is_ascii_digit() && ones.is_ascii_digit() && letter.is_ascii_uppercase() =>
        {
            Some(((tens - b'0') * 10 + (ones - b'0'), *letter))
        }
        _ => None,
    }
}

fn format_code(prefix: &str, counter: u8, letter: char) -> String {
    format!("{prefix}{counter:02}{letter}")
}
