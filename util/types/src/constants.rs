//! Reserved constants of the CoBuild witness encoding.

/// Union item id of the `SighashAll` witness layout.
pub const WITNESS_LAYOUT_SIGHASH_ALL: u32 = 0xFF00_0001;
/// Union item id of the `SighashAllOnly` witness layout.
pub const WITNESS_LAYOUT_SIGHASH_ALL_ONLY: u32 = 0xFF00_0002;
/// Union item id of the `Otx` witness layout.
pub const WITNESS_LAYOUT_OTX: u32 = 0xFF00_0003;
/// Union item id of the `OtxStart` witness layout.
pub const WITNESS_LAYOUT_OTX_START: u32 = 0xFF00_0004;

/// The smallest reserved witness-layout id.
///
/// A legacy `WitnessArgs` witness starts with its own total size in bytes as
/// a little-endian `u32`, so as long as no realistic witness ever reaches
/// 0xFF000001 (~4 GiB) bytes, the leading 4 bytes classify every witness
/// unambiguously.
pub const WITNESS_LAYOUT_RESERVED_START: u32 = WITNESS_LAYOUT_SIGHASH_ALL;
