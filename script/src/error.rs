use ckb_cobuild_traits::AccessError;
use ckb_cobuild_types::{Byte32, EncodingError};
use thiserror::Error;

/// The error kinds a script invocation may terminate with.
///
/// Every kind is fatal to the invocation; there is no recovery or retry.
/// The host ledger only observes success or failure, the kind is for
/// diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A witness matches neither encoding's expected shape.
    #[error("MalformedWitness: {0}")]
    MalformedWitness(#[from] EncodingError),

    /// More than one `OtxStart` witness in the transaction.
    #[error("MultipleOtxStart: witnesses {0} and {1} both mark a start")]
    MultipleOtxStart(usize, usize),

    /// An `Otx` witness outside the contiguous block after `OtxStart`.
    #[error("StrayOtxWitness: witness {0}")]
    StrayOtxWitness(usize),

    /// An `Otx` fragment claiming zero inputs, outputs and deps.
    #[error("EmptyOtxFragment: witness {0}")]
    EmptyOtxFragment(usize),

    /// Two actions in one message address the same script.
    #[error("DuplicateAction: script {0}")]
    DuplicateAction(Byte32),

    /// An action addresses a script absent from the transaction.
    #[error("ActionScopeMismatch: script {0}")]
    ActionScopeMismatch(Byte32),

    /// The script requires an action addressed to it and found none.
    #[error("ActionMissing")]
    ActionMissing,

    /// A witness appears where the protocol allows none.
    #[error("UnexpectedWitness: witness {0}")]
    UnexpectedWitness(usize),

    /// No seal addressed to the current script in its scope.
    #[error("SealNotFound: script {0}")]
    SealNotFound(Byte32),

    /// The caller-supplied seal check rejected the signing digest.
    #[error("SignatureVerificationFailed")]
    SignatureVerificationFailed,

    /// A host accessor failed.
    #[error("{0}")]
    Access(#[from] AccessError),
}
