//! The CoBuild validation engine for lock and type scripts.
//!
//! One script invocation is a pure, single-threaded computation over an
//! immutable transaction view: classify the witnesses, track the
//! open-transaction fragment ranges, match the declared actions against the
//! scripts they address, build the signing digests, and hand each digest to
//! the caller's signature check. Invocations for different scripts of the
//! same transaction share nothing and may run in parallel.

mod error;
pub mod message;
pub mod otx;
pub mod sighash;
mod verify;

#[cfg(test)]
mod tests;

pub use crate::error::ScriptError;
pub use crate::verify::{
    ActionVerifier, LockScriptVerifier, SealVerifier, TypeScriptConfig, TypeScriptVerifier,
};
