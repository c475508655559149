//! Block representation helpers.

/// XORs `rhs` into `dst`, byte by byte.
///
/// # Panics
///
/// Panics if the slices differ in length.
#[inline]
pub fn xor_in_place(dst: &mut [u8], rhs: &[u8]) {
    assert_eq!(
        dst.len(),
        rhs.len(),
        "xor_in_place expects slices of equal length"
    );
    for (d, r) in dst.iter_mut().zip(rhs.iter()) {
        *d ^= *r;
    }
}
