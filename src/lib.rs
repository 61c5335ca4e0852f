//! CoBuild witness-layout validation engine for CKB-style lock and type
//! scripts.
//!
//! This crate is a facade which re-exports the workspace members:
//!
//! - [`types`] — transaction entities, CoBuild witness structures and their
//!   canonical binary encoding.
//! - [`traits`] — the host accessors a verifier environment must provide.
//! - [`script`] — the lock/type validation engine itself.
//! - [`hash`] — blake2b helpers with the CoBuild signing personalizations.

pub use ckb_cobuild_hash as hash;
pub use ckb_cobuild_script as script;
pub use ckb_cobuild_traits as traits;
pub use ckb_cobuild_types as types;
