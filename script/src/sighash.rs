//! The signing-preimage builders.
//!
//! Each mode streams its preimage straight into a personalized blake2b
//! state; the preimage is never materialized, since its size is influenced
//! by whoever built the transaction. Self-delimiting fields are hashed as
//! is; raw byte strings are always preceded by their 4-byte little-endian
//! length, so no two distinct (boundary, content) splits hash to the same
//! stream.

use ckb_cobuild_hash::{
    new_otx_blake2b, new_sighash_all_blake2b, new_sighash_all_only_blake2b, Blake2b,
};
use ckb_cobuild_traits::{AccessError, Source, TransactionProvider};
use ckb_cobuild_types::{cobuild::Message, EncodingError};

use crate::{error::ScriptError, otx::OtxFragment};

// Byte-string sizes come from whoever built the transaction, so the cast
// into the 4-byte prefix is checked rather than truncating.
pub(crate) fn encodable_len(len: usize) -> Result<u32, ScriptError> {
    u32::try_from(len)
        .map_err(|_| EncodingError::InvalidValue("field length", len as u64).into())
}

fn update_length_prefixed(blake2b: &mut Blake2b, data: &[u8]) -> Result<(), ScriptError> {
    blake2b.update(&encodable_len(data.len())?.to_le_bytes());
    blake2b.update(data);
    Ok(())
}

// tx hash, then every input cell with its data, then the witnesses past the
// input count. Witnesses inside the input count are where the seals live,
// so hashing them would make the digest depend on itself.
fn hash_tx_body<P: TransactionProvider>(
    blake2b: &mut Blake2b,
    provider: &P,
) -> Result<(), ScriptError> {
    blake2b.update(provider.tx_hash().as_slice());
    let mut input_count = 0usize;
    loop {
        match provider.cell(input_count, Source::Input) {
            Ok(cell) => {
                blake2b.update(&cell.as_bytes());
                let data = provider.cell_data(input_count, Source::Input)?;
                update_length_prefixed(blake2b, &data)?;
                input_count += 1;
            }
            Err(AccessError::OutOfBound) => break,
            Err(err) => return Err(err.into()),
        }
    }
    for index in input_count..provider.witness_count() {
        let witness = provider.witness(index)?;
        update_length_prefixed(blake2b, &witness)?;
    }
    Ok(())
}

/// The whole-transaction digest covering `message`.
pub fn sighash_all_digest<P: TransactionProvider>(
    provider: &P,
    message: &Message,
) -> Result<[u8; 32], ScriptError> {
    let mut blake2b = new_sighash_all_blake2b();
    blake2b.update(&message.as_bytes());
    hash_tx_body(&mut blake2b, provider)?;
    let mut digest = [0u8; 32];
    blake2b.finalize(&mut digest);
    Ok(digest)
}

/// The whole-transaction digest with no message term.
///
/// The remaining bytes can coincide with a `SighashAll` preimage, which is
/// why this mode hashes under its own personalization.
pub fn sighash_all_only_digest<P: TransactionProvider>(
    provider: &P,
) -> Result<[u8; 32], ScriptError> {
    let mut blake2b = new_sighash_all_only_blake2b();
    hash_tx_body(&mut blake2b, provider)?;
    let mut digest = [0u8; 32];
    blake2b.finalize(&mut digest);
    Ok(digest)
}

/// The fragment-scoped digest for one open-transaction fragment.
pub fn otx_digest<P: TransactionProvider>(
    provider: &P,
    fragment: &OtxFragment,
) -> Result<[u8; 32], ScriptError> {
    let mut blake2b = new_otx_blake2b();
    blake2b.update(&fragment.message.as_bytes());

    let ranges = &fragment.ranges;
    blake2b.update(&ranges.inputs.len().to_le_bytes());
    for index in ranges.inputs.iter() {
        let input = provider.input(index as usize)?;
        blake2b.update(&input.as_bytes());
        let data = provider.cell_data(index as usize, Source::Input)?;
        update_length_prefixed(&mut blake2b, &data)?;
    }

    blake2b.update(&ranges.outputs.len().to_le_bytes());
    for index in ranges.outputs.iter() {
        let output = provider.cell(index as usize, Source::Output)?;
        blake2b.update(&output.as_bytes());
        let data = provider.cell_data(index as usize, Source::Output)?;
        update_length_prefixed(&mut blake2b, &data)?;
    }

    blake2b.update(&ranges.cell_deps.len().to_le_bytes());
    for index in ranges.cell_deps.iter() {
        blake2b.update(&provider.cell_dep(index as usize)?.as_bytes());
    }

    blake2b.update(&ranges.header_deps.len().to_le_bytes());
    for index in ranges.header_deps.iter() {
        blake2b.update(provider.header_dep(index as usize)?.as_slice());
    }

    let mut digest = [0u8; 32];
    blake2b.finalize(&mut digest);
    Ok(digest)
}
