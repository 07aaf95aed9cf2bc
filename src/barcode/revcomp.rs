/// Complement for every byte value. A<->T and C<->G in both cases,
/// everything else (N, IUPAC codes, ...) is its own complement
const COMPLEMENT: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = i as u8;
        i += 1;
    }
    table[b'A' as usize] = b'T';
    table[b'T' as usize] = b'A';
    table[b'C' as usize] = b'G';
    table[b'G' as usize] = b'C';
    table[b'a' as usize] = b't';
    table[b't' as usize] = b'a';
    table[b'c' as usize] = b'g';
    table[b'g' as usize] = b'c';
    table
};

#[inline(always)]
pub fn complement(base: u8) -> u8 {
    COMPLEMENT[base as usize]
}

/// Reverse complement of a sequence
pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&c| complement(c)).collect()
}

/// Quality strings follow their sequence in orientation but have no complement
pub fn reverse_qual(qual: &[u8]) -> Vec<u8> {
    qual.iter().rev().copied().collect()
}
