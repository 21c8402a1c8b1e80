//! Total orders over recipient sets.
//!
//! Every order breaks ties by ascending address, so two runs over the same
//! recipients always visit them in the same sequence no matter how the
//! input was assembled.

use std::cmp::Ordering;

use num_rational::BigRational;

use relaysettle_types::Address;

/// Amount descending, address ascending.
pub fn cmp_amount_desc(a: &(Address, u128), b: &(Address, u128)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Fractional remainder descending, address ascending.
pub fn cmp_fraction_desc(a: &(Address, BigRational), b: &(Address, BigRational)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Sort `(address, amount)` pairs by amount descending.
pub fn sort_by_amount_desc(entries: &mut [(Address, u128)]) {
    entries.sort_by(cmp_amount_desc);
}

/// Sort `(address, fraction)` pairs by fraction descending.
pub fn sort_by_fraction_desc(entries: &mut [(Address, BigRational)]) {
    entries.sort_by(cmp_fraction_desc);
}
