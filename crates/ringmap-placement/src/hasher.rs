//! Hash adaptors mapping identifiers and keys to ring positions.

/// Deterministic mapping from bytes to a position on the `u32` ring.
///
/// Implementations must be pure: the same input always yields the same
/// position. Any `Fn(&[u8]) -> u32` closure is a `KeyHasher`, which makes it
/// easy to pin positions in tests.
pub trait KeyHasher: Send + Sync {
    /// Return the ring position for `data`.
    fn hash(&self, data: &[u8]) -> u32;
}

impl<F> KeyHasher for F
where
    F: Fn(&[u8]) -> u32 + Send + Sync,
{
    fn hash(&self, data: &[u8]) -> u32 {
        self(data)
    }
}

/// CRC-32 (IEEE polynomial) positions. The default hasher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc32Hasher;

impl KeyHasher for Crc32Hasher {
    fn hash(&self, data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}

/// BLAKE3 positions: the first 4 bytes of the digest, little endian.
///
/// Slower than CRC-32 but spreads short, similar identifiers more evenly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blake3Hasher;

impl KeyHasher for Blake3Hasher {
    fn hash(&self, data: &[u8]) -> u32 {
        let digest = blake3::hash(data);
        let bytes = digest.as_bytes();
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}
