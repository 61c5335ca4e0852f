//! The host accessors a verifier environment provides to the engine.
//!
//! A script invocation reads one immutable transaction through this trait
//! and nothing else; the engine never mutates the view and never retries a
//! failed access. Array lengths other than the witness count are discovered
//! by probing indices until [`AccessError::OutOfBound`], the way on-chain
//! scripts iterate load syscalls.

use ckb_cobuild_types::{
    bytes::Bytes,
    core::{CellDep, CellInput, CellOutput},
    Byte32,
};
use thiserror::Error;

/// Which cell array an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The consumed cells, resolved through the inputs' out points.
    Input,
    /// The created cells.
    Output,
}

/// Failures an accessor may report.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// The entity exists but cannot be resolved.
    #[error("NotFound")]
    NotFound,
    /// The index is past the end of the array.
    #[error("OutOfBound")]
    OutOfBound,
}

/// A read-only view of the transaction under validation.
pub trait TransactionProvider {
    /// The hash of the transaction, excluding witnesses.
    fn tx_hash(&self) -> Byte32;

    /// The identity of the script this invocation runs for.
    fn current_script_hash(&self) -> Byte32;

    fn witness_count(&self) -> usize;

    fn witness(&self, index: usize) -> Result<Bytes, AccessError>;

    fn input(&self, index: usize) -> Result<CellInput, AccessError>;

    /// The cell at `index` in the `source` array.
    fn cell(&self, index: usize, source: Source) -> Result<CellOutput, AccessError>;

    /// The data of the cell at `index` in the `source` array.
    fn cell_data(&self, index: usize, source: Source) -> Result<Bytes, AccessError>;

    fn cell_dep(&self, index: usize) -> Result<CellDep, AccessError>;

    fn header_dep(&self, index: usize) -> Result<Byte32, AccessError>;
}
