use crate::key::DepthKey;

pub const RADIX_BITS: u32 = 8;
pub const RADIX_BUCKETS: usize = 1 << RADIX_BITS;
pub const RADIX_PASSES: u32 = u32::BITS / RADIX_BITS;

/// Maps an f32 to a u32 whose unsigned order matches the float order:
/// negatives get every bit flipped, everything else only the sign bit.
#[inline]
pub fn float_to_sortable(value: f32) -> u32 {
    let bits = value.to_bits();
    let mask = ((bits >> 31) as i32).wrapping_neg() as u32 | 0x8000_0000;
    bits ^ mask
}

#[inline]
fn digit(key: &DepthKey, shift: u32) -> usize {
    ((float_to_sortable(key.depth) >> shift) & 0xFF) as usize
}

/// One counting-sort pass over the byte at `shift`. Returns `false` without
/// touching `dst` when every key shares that byte.
fn scatter_pass(src: &[DepthKey], dst: &mut [DepthKey], shift: u32) -> bool {
    let mut counts = [0usize; RADIX_BUCKETS];
    for key in src {
        counts[digit(key, shift)] += 1;
    }
    if counts.iter().any(|&c| c == src.len()) {
        return false;
    }

    let mut offsets = [0usize; RADIX_BUCKETS];
    let mut running = 0usize;
    for (offset, count) in offsets.iter_mut().zip(counts.iter()) {
        *offset = running;
        running += count;
    }

    for key in src {
        let bucket = digit(key, shift);
        dst[offsets[bucket]] = *key;
        offsets[bucket] += 1;
    }
    true
}

/// Stable LSB-first radix sort by ascending depth. Returns the number of
/// passes skipped because their digit was uniform.
pub fn sort_by_depth(keys: &mut Vec<DepthKey>) -> u32 {
    if keys.len() < 2 {
        return RADIX_PASSES;
    }

    let mut scratch = vec![DepthKey::default(); keys.len()];
    let mut skipped = 0;
    for pass in 0..RADIX_PASSES {
        if scatter_pass(keys, &mut scratch, pass * RADIX_BITS) {
            std::mem::swap(keys, &mut scratch);
        } else {
            skipped += 1;
        }
    }
    skipped
}

/// Sorts and returns the gather permutation (original indices in rank order).
pub fn sort_permutation(mut keys: Vec<DepthKey>) -> Vec<u32> {
    sort_by_depth(&mut keys);
    keys.into_iter().map(|k| k.index).collect()
}
