//! Constant-time helpers. None of these branch on the contents of their inputs,
//! only on lengths.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Compares two byte slices without an early exit on the first difference.
pub fn is_equal(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

/// Returns true if every byte of `data` is zero.
pub fn is_zero(data: &[u8]) -> bool {
    let acc = data.iter().fold(0u8, |acc, b| acc | b);
    bool::from(acc.ct_eq(&0))
}

/// Overwrites `data` with zeros when `condition` is set, touching every byte either way.
pub fn cmove_zero(data: &mut [u8], condition: bool) {
    let choice = Choice::from(condition as u8);
    for b in data.iter_mut() {
        *b = u8::conditional_select(&*b, &0, choice);
    }
}
