/// Computes the additive checksum of `data`: the sum of every byte,
/// wrapping at 2^32.
///
/// This catches truncation and most accidental corruption. It is not
/// meant to detect tampering or reordered bytes.
pub fn checksum(data: &[u8]) -> u32 {
    data.iter().fold(0u32, |sum, &byte| sum.wrapping_add(byte as u32))
}
