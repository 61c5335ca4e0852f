//! An in-memory transaction view plus builders for the scenarios.

use ckb_cobuild_hash::blake2b_256;
use ckb_cobuild_traits::{AccessError, Source, TransactionProvider};
use ckb_cobuild_types::{
    bytes::Bytes,
    cobuild::{Action, Message, Otx, OtxStart, SealPair, SighashAll, SighashAllOnly, WitnessLayout},
    core::{CellDep, CellInput, CellOutput, DepType, OutPoint, Script, ScriptHashType},
    Byte32,
};

use crate::{ActionVerifier, ScriptError, SealVerifier};

pub struct MockTransaction {
    pub tx_hash: Byte32,
    pub script_hash: Byte32,
    pub inputs: Vec<(CellInput, CellOutput, Bytes)>,
    pub outputs: Vec<(CellOutput, Bytes)>,
    pub cell_deps: Vec<CellDep>,
    pub header_deps: Vec<Byte32>,
    pub witnesses: Vec<Bytes>,
}

impl MockTransaction {
    pub fn new() -> Self {
        MockTransaction {
            tx_hash: blake2b_256(b"mock transaction").into(),
            script_hash: Byte32::zero(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            cell_deps: Vec::new(),
            header_deps: Vec::new(),
            witnesses: Vec::new(),
        }
    }

    /// Sets the invocation identity to the given script's hash.
    pub fn run_as(&mut self, script: &Script) {
        self.script_hash = script.calc_script_hash();
    }
}

impl TransactionProvider for MockTransaction {
    fn tx_hash(&self) -> Byte32 {
        self.tx_hash
    }

    fn current_script_hash(&self) -> Byte32 {
        self.script_hash
    }

    fn witness_count(&self) -> usize {
        self.witnesses.len()
    }

    fn witness(&self, index: usize) -> Result<Bytes, AccessError> {
        self.witnesses
            .get(index)
            .cloned()
            .ok_or(AccessError::OutOfBound)
    }

    fn input(&self, index: usize) -> Result<CellInput, AccessError> {
        self.inputs
            .get(index)
            .map(|(input, _, _)| *input)
            .ok_or(AccessError::OutOfBound)
    }

    fn cell(&self, index: usize, source: Source) -> Result<CellOutput, AccessError> {
        match source {
            Source::Input => self.inputs.get(index).map(|(_, cell, _)| cell.clone()),
            Source::Output => self.outputs.get(index).map(|(cell, _)| cell.clone()),
        }
        .ok_or(AccessError::OutOfBound)
    }

    fn cell_data(&self, index: usize, source: Source) -> Result<Bytes, AccessError> {
        match source {
            Source::Input => self.inputs.get(index).map(|(_, _, data)| data.clone()),
            Source::Output => self.outputs.get(index).map(|(_, data)| data.clone()),
        }
        .ok_or(AccessError::OutOfBound)
    }

    fn cell_dep(&self, index: usize) -> Result<CellDep, AccessError> {
        self.cell_deps
            .get(index)
            .copied()
            .ok_or(AccessError::OutOfBound)
    }

    fn header_dep(&self, index: usize) -> Result<Byte32, AccessError> {
        self.header_deps
            .get(index)
            .copied()
            .ok_or(AccessError::OutOfBound)
    }
}

pub fn lock_script(tag: u8) -> Script {
    Script {
        code_hash: Byte32::new([tag; 32]),
        hash_type: ScriptHashType::Data,
        args: Bytes::new(),
    }
}

pub fn type_script(tag: u8) -> Script {
    Script {
        code_hash: Byte32::new([tag; 32]),
        hash_type: ScriptHashType::Type,
        args: Bytes::new(),
    }
}

pub fn input_cell(
    index: u32,
    lock: &Script,
    type_: Option<&Script>,
    data: &[u8],
) -> (CellInput, CellOutput, Bytes) {
    let input = CellInput {
        since: 0,
        previous_output: OutPoint {
            tx_hash: Byte32::new([0xee; 32]),
            index,
        },
    };
    let cell = CellOutput {
        capacity: 1_000,
        lock: lock.clone(),
        type_: type_.cloned(),
    };
    (input, cell, Bytes::copy_from_slice(data))
}

pub fn output_cell(lock: &Script, type_: Option<&Script>, data: &[u8]) -> (CellOutput, Bytes) {
    let cell = CellOutput {
        capacity: 1_000,
        lock: lock.clone(),
        type_: type_.cloned(),
    };
    (cell, Bytes::copy_from_slice(data))
}

pub fn cell_dep(index: u32) -> CellDep {
    CellDep {
        out_point: OutPoint {
            tx_hash: Byte32::new([0xdd; 32]),
            index,
        },
        dep_type: DepType::Code,
    }
}

pub fn action_for(script: &Script, data: &[u8]) -> Action {
    Action {
        script_info_hash: Byte32::new([0x11; 32]),
        script_hash: script.calc_script_hash(),
        data: Bytes::copy_from_slice(data),
    }
}

pub fn sighash_all_witness(seal: &[u8], message: Message) -> Bytes {
    WitnessLayout::SighashAll(SighashAll {
        seal: Bytes::copy_from_slice(seal),
        message,
    })
    .as_bytes()
}

pub fn sighash_all_only_witness(seal: &[u8]) -> Bytes {
    WitnessLayout::SighashAllOnly(SighashAllOnly {
        seal: Bytes::copy_from_slice(seal),
    })
    .as_bytes()
}

pub fn otx_start_witness(inputs: u32, outputs: u32, cell_deps: u32, header_deps: u32) -> Bytes {
    WitnessLayout::OtxStart(OtxStart {
        start_input_cell: inputs,
        start_output_cell: outputs,
        start_cell_deps: cell_deps,
        start_header_deps: header_deps,
    })
    .as_bytes()
}

pub struct OtxCounts {
    pub inputs: u32,
    pub outputs: u32,
    pub cell_deps: u32,
    pub header_deps: u32,
}

pub fn otx_witness(seals: Vec<SealPair>, counts: OtxCounts, message: Message) -> Bytes {
    WitnessLayout::Otx(Otx {
        seals,
        input_cells: counts.inputs,
        output_cells: counts.outputs,
        cell_deps: counts.cell_deps,
        header_deps: counts.header_deps,
        message,
    })
    .as_bytes()
}

pub fn seal_for(script: &Script, seal: &[u8]) -> SealPair {
    SealPair {
        script_hash: script.calc_script_hash(),
        seal: Bytes::copy_from_slice(seal),
    }
}

/// Accepts every seal, standing in for a correct signature.
pub struct AcceptAllSeals;

impl SealVerifier for AcceptAllSeals {
    fn verify_seal(&self, _digest: &[u8; 32], _seal: &[u8]) -> Result<(), ScriptError> {
        Ok(())
    }
}

/// Rejects every seal, standing in for a bad signature.
pub struct RejectAllSeals;

impl SealVerifier for RejectAllSeals {
    fn verify_seal(&self, _digest: &[u8; 32], _seal: &[u8]) -> Result<(), ScriptError> {
        Err(ScriptError::SignatureVerificationFailed)
    }
}

/// A "signature scheme" where the seal must be the digest itself, so tests
/// prove the engine built the digest they expect.
pub struct DigestSeals;

impl SealVerifier for DigestSeals {
    fn verify_seal(&self, digest: &[u8; 32], seal: &[u8]) -> Result<(), ScriptError> {
        if seal == digest {
            Ok(())
        } else {
            Err(ScriptError::SignatureVerificationFailed)
        }
    }
}

/// Accepts every matched action.
pub struct AcceptAllActions;

impl ActionVerifier for AcceptAllActions {
    fn verify_action(&self, _action: &Action) -> Result<(), ScriptError> {
        Ok(())
    }
}

/// The application check: the action payload must equal the expected state.
pub struct ExpectActionData(pub Bytes);

impl ActionVerifier for ExpectActionData {
    fn verify_action(&self, action: &Action) -> Result<(), ScriptError> {
        if action.data == self.0 {
            Ok(())
        } else {
            Err(ScriptError::SignatureVerificationFailed)
        }
    }
}
