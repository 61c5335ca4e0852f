use std::fmt;

use crate::encoding::{EncodingError, EncodingResult};

/// A fixed 32-byte value, used for hashes and script identities.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Byte32([u8; 32]);

impl Byte32 {
    /// Serialized size in bytes.
    pub const LEN: usize = 32;

    /// Creates a new `Byte32`.
    pub const fn new(inner: [u8; 32]) -> Self {
        Byte32(inner)
    }

    /// Creates a new `Byte32` whose bits are all zeros.
    pub const fn zero() -> Self {
        Byte32([0u8; 32])
    }

    /// Checks whether all bits in self are zeros.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|x| *x == 0)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn into_inner(self) -> [u8; 32] {
        self.0
    }

    /// Parses a `Byte32` out of a slice which must be exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> EncodingResult<Self> {
        if slice.len() != Self::LEN {
            return Err(EncodingError::TotalSizeNotMatch(
                "Byte32",
                Self::LEN,
                slice.len(),
            ));
        }
        let mut inner = [0u8; 32];
        inner.copy_from_slice(slice);
        Ok(Byte32(inner))
    }
}

impl From<[u8; 32]> for Byte32 {
    fn from(inner: [u8; 32]) -> Self {
        Byte32(inner)
    }
}

impl AsRef<[u8]> for Byte32 {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl fmt::Display for Byte32 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Byte32 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Byte32({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed_hex() {
        let mut inner = [0u8; 32];
        inner[0] = 0xab;
        inner[31] = 0x01;
        let hash = Byte32::new(inner);
        let text = hash.to_string();
        assert!(text.starts_with("0xab00"));
        assert!(text.ends_with("01"));
        assert_eq!(text.len(), 2 + 64);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert_eq!(
            Byte32::from_slice(&[0u8; 31]),
            Err(EncodingError::TotalSizeNotMatch("Byte32", 32, 31))
        );
    }
}
