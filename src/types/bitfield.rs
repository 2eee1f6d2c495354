//! Bit-field packing over one-byte-per-bit arrays

/// Write the `width` least significant bits of `value` into
/// `dest[start..start + width]`, most significant bit first.
///
/// Bits of `value` above `width` are silently dropped. The caller owns the
/// field tables, so the only check here is the slice bound itself.
pub fn pack(dest: &mut [u8], start: usize, width: usize, value: u64) {
    debug_assert!(width <= 64, "field width {} exceeds 64 bits", width);
    for (i, bit) in dest[start..start + width].iter_mut().enumerate() {
        let shift = width - 1 - i;
        *bit = ((value >> shift) & 1) as u8;
    }
}

/// Read `width` bits starting at `src[start]`, most significant bit first.
pub fn unpack(src: &[u8], start: usize, width: usize) -> u64 {
    debug_assert!(width <= 64, "field width {} exceeds 64 bits", width);
    src[start..start + width].iter().fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit & 1))
}

/// Read a single flag bit.
pub fn flag(src: &[u8], index: usize) -> bool {
    src[index] & 1 == 1
}

/// Expand the low `width` bits of `value` into a new bit vector.
pub fn to_bits(value: u64, width: usize) -> Vec<u8> {
    let mut bits = vec![0u8; width];
    pack(&mut bits, 0, width, value);
    bits
}

/// Returns the index of the first byte that is not a 0/1 bit, if any.
pub fn first_non_bit(bits: &[u8]) -> Option<usize> {
    bits.iter().position(|&b| b > 1)
}
