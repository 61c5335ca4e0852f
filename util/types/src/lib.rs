//! # The CoBuild Types Library
//!
//! This library provides the transaction entities consumed by the validation
//! engine, the CoBuild witness structures, and their canonical binary
//! encoding.
//!
//! The encoding follows the molecule wire rules: fixed-size composites are
//! plain concatenations, tables and dynamic vectors are prefixed by their
//! total size and per-item offsets, and raw byte strings are prefixed by a
//! 4-byte little-endian length. Parsing here is strict: a slice is accepted
//! only if it is byte-identical to what the builders would produce, so
//! `parse` and `encode` are inverses in both directions. The engine relies
//! on this when it feeds a re-encoded [`cobuild::Message`] into a signing
//! preimage.

pub use bytes;

pub mod cobuild;
pub mod constants;
pub mod core;
mod encoding;
mod primitive;

pub use encoding::{EncodingError, EncodingResult};
pub use primitive::Byte32;
