//! The hash functions of the CoBuild protocol.
//!
//! Everything is blake2b-256; the signing modes are kept apart by distinct
//! 16-byte personalizations, so a preimage built for one mode can never
//! verify under another.

#[cfg(not(target_arch = "wasm32"))]
pub use blake2b_rs::{Blake2b, Blake2bBuilder};

#[cfg(target_arch = "wasm32")]
pub use blake2b_ref::{Blake2b, Blake2bBuilder};

/// Output length of all hashes in this crate, in bytes.
pub const BLAKE2B_LEN: usize = 32;
/// Personalization of the default hash, used for script hashes.
pub const CKB_HASH_PERSONALIZATION: &[u8] = b"ckb-default-hash";
/// Personalization of the whole-transaction signing hash with a message.
pub const SIGHASH_ALL_PERSONALIZATION: &[u8] = b"ckb-tcob-sighash";
/// Personalization of the whole-transaction signing hash without a message.
pub const SIGHASH_ALL_ONLY_PERSONALIZATION: &[u8] = b"ckb-tcob-sgohash";
/// Personalization of the per-fragment signing hash.
pub const OTX_PERSONALIZATION: &[u8] = b"ckb-tcob-otxhash";

fn new_personalized_blake2b(personal: &[u8]) -> Blake2b {
    Blake2bBuilder::new(BLAKE2B_LEN).personal(personal).build()
}

/// Creates a new blake2b hash state with the default personalization.
pub fn new_blake2b() -> Blake2b {
    new_personalized_blake2b(CKB_HASH_PERSONALIZATION)
}

/// Creates the hash state for a `SighashAll` signing preimage.
pub fn new_sighash_all_blake2b() -> Blake2b {
    new_personalized_blake2b(SIGHASH_ALL_PERSONALIZATION)
}

/// Creates the hash state for a `SighashAllOnly` signing preimage.
pub fn new_sighash_all_only_blake2b() -> Blake2b {
    new_personalized_blake2b(SIGHASH_ALL_ONLY_PERSONALIZATION)
}

/// Creates the hash state for an `Otx` fragment signing preimage.
pub fn new_otx_blake2b() -> Blake2b {
    new_personalized_blake2b(OTX_PERSONALIZATION)
}

/// Hashes `s` with the default personalization.
pub fn blake2b_256<T: AsRef<[u8]>>(s: T) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut blake2b = new_blake2b();
    blake2b.update(s.as_ref());
    blake2b.finalize(&mut result);
    result
}
