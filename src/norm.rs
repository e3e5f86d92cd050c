//! Renormalization shift shared by the encoder and decoder.

/// Returns the number of left shifts that bring `range` back into `[128, 255]`.
///
/// Equivalent to `7 - floor(log2(range))`. `range` must be in `[1, 255]`.
#[inline(always)]
pub const fn shift_for(range: u32) -> u32 {
    //lookup tables are best avoided in modern CPUs
    range.leading_zeros() - 24
}

/// the normalization table as it appears in the VP8 reference coder
#[cfg(test)]
const VP8_NORM: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 1;
    while i < 256 {
        let mut shift = 0usize;
        while (i << shift) < 128 {
            shift += 1;
        }
        table[i] = shift as u8;
        i += 1;
    }
    table
};

#[test]
fn shift_matches_table() {
    for range in 1u32..=255 {
        assert_eq!(shift_for(range), u32::from(VP8_NORM[range as usize]), "range {range}");

        let normalized = range << shift_for(range);
        assert!((128..=255).contains(&normalized), "range {range}");
    }
}

#[test]
fn shift_known_values() {
    assert_eq!(VP8_NORM[..9], [0, 7, 6, 6, 5, 5, 5, 5, 4]);
    assert_eq!(shift_for(1), 7);
    assert_eq!(shift_for(127), 1);
    assert_eq!(shift_for(128), 0);
    assert_eq!(shift_for(255), 0);
}
