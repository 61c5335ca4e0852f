//! The lock and type validators.
//!
//! Both run the same machine: `ScanOtx` builds the fragment tracking,
//! `ValidateFragments` handles every fragment the script participates in,
//! `ValidateOutsideScope` handles the cells outside all fragments, and any
//! error terminates the invocation. The cryptographic seal check and the
//! application meaning of an action are both caller-supplied; the engine
//! guarantees only which digest a seal must cover and that a matched action
//! is unique and well-scoped.

#[cfg(feature = "logging")]
use ckb_cobuild_logger::debug;
use ckb_cobuild_traits::{Source, TransactionProvider};
use ckb_cobuild_types::{
    cobuild::{classify_witness, Action, ClassifiedWitness, Message, WitnessLayout},
    Byte32,
};

use crate::{
    error::ScriptError,
    message::{check_actions, find_action},
    otx::{AxisRanges, OtxScan},
    sighash::{otx_digest, sighash_all_digest, sighash_all_only_digest},
};

/// Caller-supplied signature verification.
///
/// The engine is agnostic of the signature algorithm: it builds the digest
/// and hands it over together with the seal addressed to the current script.
pub trait SealVerifier {
    /// Checks `seal` against the 32-byte signing digest.
    fn verify_seal(&self, digest: &[u8; 32], seal: &[u8]) -> Result<(), ScriptError>;
}

/// Caller-supplied interpretation of a matched action's payload.
pub trait ActionVerifier {
    fn verify_action(&self, action: &Action) -> Result<(), ScriptError>;
}

/// Per-script policy knobs of the type validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeScriptConfig {
    /// Whether a scope the script participates in must carry an action
    /// addressed to it. With `false`, a scope without one falls back to
    /// legacy-only checks instead of failing.
    pub require_action: bool,
}

impl Default for TypeScriptConfig {
    fn default() -> Self {
        TypeScriptConfig {
            require_action: true,
        }
    }
}

/// Runs the validation a CoBuild lock script must perform.
pub struct LockScriptVerifier<'a, P, S> {
    provider: &'a P,
    seal_verifier: &'a S,
}

impl<'a, P, S> LockScriptVerifier<'a, P, S>
where
    P: TransactionProvider,
    S: SealVerifier,
{
    pub fn new(provider: &'a P, seal_verifier: &'a S) -> Self {
        LockScriptVerifier {
            provider,
            seal_verifier,
        }
    }

    /// Runs the machine to completion.
    pub fn verify(&self) -> Result<(), ScriptError> {
        let scan = OtxScan::scan(self.provider)?;
        let script_hash = self.provider.current_script_hash();
        self.validate_fragments(&scan, &script_hash)?;
        self.validate_outside_scope(&scan, &script_hash)?;
        Ok(())
    }

    // Every fragment the lock owns an input in is signed independently: the
    // fragment's own digest against the seal addressed to this lock inside
    // that fragment.
    fn validate_fragments(
        &self,
        scan: &OtxScan,
        script_hash: &Byte32,
    ) -> Result<(), ScriptError> {
        for fragment in &scan.fragments {
            let scopes = fragment.scopes();
            if !self.owns_input(&scopes.inputs, script_hash)? {
                continue;
            }
            check_actions(&fragment.message, self.provider)?;
            let digest = otx_digest(self.provider, fragment)?;
            let seal = fragment
                .seals
                .iter()
                .find(|seal| &seal.script_hash == script_hash)
                .ok_or(ScriptError::SealNotFound(*script_hash))?;
            self.seal_verifier.verify_seal(&digest, &seal.seal)?;
        }
        Ok(())
    }

    // Inputs outside all fragments form one witness group: the structured
    // witness at the group's first input index carries the seal, every
    // later witness in the group must be empty.
    fn validate_outside_scope(
        &self,
        scan: &OtxScan,
        script_hash: &Byte32,
    ) -> Result<(), ScriptError> {
        let outside = scan.outside_scopes();
        let mut owned = Vec::new();
        for index in outside.inputs.iter() {
            let cell = self.provider.cell(index as usize, Source::Input)?;
            if &cell.calc_lock_hash() == script_hash {
                owned.push(index as usize);
            }
        }
        let Some((&first, rest)) = owned.split_first() else {
            return Ok(());
        };

        #[cfg(feature = "logging")]
        debug!(
            "lock {script_hash}: witness group of {} inputs led by witness {first}",
            owned.len()
        );

        for &index in rest {
            match self.provider.witness(index) {
                Ok(witness) if !witness.is_empty() => {
                    return Err(ScriptError::UnexpectedWitness(index));
                }
                _ => {}
            }
        }

        let leading = self.provider.witness(first)?;
        match classify_witness(&leading)? {
            ClassifiedWitness::Layout(WitnessLayout::SighashAll(witness)) => {
                check_actions(&witness.message, self.provider)?;
                let digest = sighash_all_digest(self.provider, &witness.message)?;
                self.seal_verifier.verify_seal(&digest, &witness.seal)
            }
            ClassifiedWitness::Layout(WitnessLayout::SighashAllOnly(witness)) => {
                let digest = sighash_all_only_digest(self.provider)?;
                self.seal_verifier.verify_seal(&digest, &witness.seal)
            }
            _ => Err(ScriptError::UnexpectedWitness(first)),
        }
    }

    fn owns_input(&self, ranges: &AxisRanges, script_hash: &Byte32) -> Result<bool, ScriptError> {
        for index in ranges.iter() {
            let cell = self.provider.cell(index as usize, Source::Input)?;
            if &cell.calc_lock_hash() == script_hash {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Runs the validation a CoBuild type script must perform before its own
/// state-transition logic.
pub struct TypeScriptVerifier<'a, P, A> {
    provider: &'a P,
    action_verifier: &'a A,
    config: TypeScriptConfig,
}

impl<'a, P, A> TypeScriptVerifier<'a, P, A>
where
    P: TransactionProvider,
    A: ActionVerifier,
{
    pub fn new(provider: &'a P, action_verifier: &'a A, config: TypeScriptConfig) -> Self {
        TypeScriptVerifier {
            provider,
            action_verifier,
            config,
        }
    }

    /// Runs the machine to completion.
    pub fn verify(&self) -> Result<(), ScriptError> {
        let scan = OtxScan::scan(self.provider)?;
        let script_hash = self.provider.current_script_hash();
        self.validate_fragments(&scan, &script_hash)?;
        self.validate_outside_scope(&scan, &script_hash)?;
        Ok(())
    }

    fn validate_fragments(
        &self,
        scan: &OtxScan,
        script_hash: &Byte32,
    ) -> Result<(), ScriptError> {
        for fragment in &scan.fragments {
            let scopes = fragment.scopes();
            if !self.owns_cell(&scopes.inputs, &scopes.outputs, script_hash)? {
                continue;
            }
            check_actions(&fragment.message, self.provider)?;
            self.validate_matched_action(&fragment.message, script_hash)?;
        }
        Ok(())
    }

    // A type script with cells outside all fragments checks the single
    // whole-transaction message. No message at all is success: there is
    // nothing structured to validate, legacy checks stand on their own.
    fn validate_outside_scope(
        &self,
        scan: &OtxScan,
        script_hash: &Byte32,
    ) -> Result<(), ScriptError> {
        let outside = scan.outside_scopes();
        if !self.owns_cell(&outside.inputs, &outside.outputs, script_hash)? {
            return Ok(());
        }
        match &scan.sighash_all {
            None => Ok(()),
            Some((_, witness)) => {
                check_actions(&witness.message, self.provider)?;
                self.validate_matched_action(&witness.message, script_hash)
            }
        }
    }

    fn validate_matched_action(
        &self,
        message: &Message,
        script_hash: &Byte32,
    ) -> Result<(), ScriptError> {
        match find_action(message, script_hash)? {
            Some(action) => self.action_verifier.verify_action(action),
            None if self.config.require_action => Err(ScriptError::ActionMissing),
            None => Ok(()),
        }
    }

    fn owns_cell(
        &self,
        inputs: &AxisRanges,
        outputs: &AxisRanges,
        script_hash: &Byte32,
    ) -> Result<bool, ScriptError> {
        for index in inputs.iter() {
            let cell = self.provider.cell(index as usize, Source::Input)?;
            if cell.type_hash().as_ref() == Some(script_hash) {
                return Ok(true);
            }
        }
        for index in outputs.iter() {
            let cell = self.provider.cell(index as usize, Source::Output)?;
            if cell.type_hash().as_ref() == Some(script_hash) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
