//! The transaction entities a script invocation reads.
//!
//! Every entity carries its canonical wire encoding through `as_bytes` and
//! `from_slice`. `OutPoint`, `CellInput` and `CellDep` are fixed-size
//! composites with no headers; `Script` and `CellOutput` are tables.

use bytes::Bytes;
use ckb_cobuild_hash::blake2b_256;

use crate::{
    encoding::{
        build_bytes, build_table, parse_bytes, parse_table, read_u64, EncodingError,
        EncodingResult,
    },
    primitive::Byte32,
};

/// Shannons carried by a cell; opaque to the validation engine.
pub type Capacity = u64;

/// How the `code_hash` of a script references its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ScriptHashType {
    /// The `code_hash` matches the hash of a dep cell's data.
    Data = 0,
    /// The `code_hash` matches a dep cell's type script hash.
    Type = 1,
    /// As `Data`, under the CKB-VM version 1 ISA.
    Data1 = 2,
    /// As `Data`, under the CKB-VM version 2 ISA.
    Data2 = 4,
}

impl TryFrom<u8> for ScriptHashType {
    type Error = EncodingError;

    fn try_from(value: u8) -> EncodingResult<Self> {
        match value {
            0 => Ok(ScriptHashType::Data),
            1 => Ok(ScriptHashType::Type),
            2 => Ok(ScriptHashType::Data1),
            4 => Ok(ScriptHashType::Data2),
            _ => Err(EncodingError::InvalidValue("ScriptHashType", value.into())),
        }
    }
}

/// A lock or type script reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Script {
    pub code_hash: Byte32,
    pub hash_type: ScriptHashType,
    pub args: Bytes,
}

impl Script {
    pub fn as_bytes(&self) -> Bytes {
        build_table(&[
            self.code_hash.as_slice(),
            &[self.hash_type as u8],
            &build_bytes(&self.args),
        ])
    }

    pub fn from_slice(slice: &[u8]) -> EncodingResult<Self> {
        let fields = parse_table("Script", slice, 3)?;
        let code_hash = Byte32::from_slice(fields[0])?;
        if fields[1].len() != 1 {
            return Err(EncodingError::TotalSizeNotMatch(
                "ScriptHashType",
                1,
                fields[1].len(),
            ));
        }
        let hash_type = ScriptHashType::try_from(fields[1][0])?;
        let args = parse_bytes("Script.args", fields[2])?;
        Ok(Script {
            code_hash,
            hash_type,
            args,
        })
    }

    /// The identity scripts are addressed by: the hash of the canonical
    /// encoding.
    pub fn calc_script_hash(&self) -> Byte32 {
        blake2b_256(self.as_bytes()).into()
    }
}

/// A reference to a previously created cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub tx_hash: Byte32,
    pub index: u32,
}

impl OutPoint {
    /// Serialized size in bytes.
    pub const LEN: usize = Byte32::LEN + 4;

    /// Creates a new null `OutPoint`.
    pub fn null() -> Self {
        OutPoint {
            tx_hash: Byte32::zero(),
            index: u32::MAX,
        }
    }

    pub fn as_bytes(&self) -> Bytes {
        let mut raw = Vec::with_capacity(Self::LEN);
        raw.extend_from_slice(self.tx_hash.as_slice());
        raw.extend_from_slice(&self.index.to_le_bytes());
        raw.into()
    }

    pub fn from_slice(slice: &[u8]) -> EncodingResult<Self> {
        if slice.len() != Self::LEN {
            return Err(EncodingError::TotalSizeNotMatch(
                "OutPoint",
                Self::LEN,
                slice.len(),
            ));
        }
        let tx_hash = Byte32::from_slice(&slice[..Byte32::LEN])?;
        let mut index = [0u8; 4];
        index.copy_from_slice(&slice[Byte32::LEN..]);
        Ok(OutPoint {
            tx_hash,
            index: u32::from_le_bytes(index),
        })
    }
}

/// A consumed cell reference plus its maturity constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellInput {
    pub since: u64,
    pub previous_output: OutPoint,
}

impl CellInput {
    /// Serialized size in bytes.
    pub const LEN: usize = 8 + OutPoint::LEN;

    pub fn as_bytes(&self) -> Bytes {
        let mut raw = Vec::with_capacity(Self::LEN);
        raw.extend_from_slice(&self.since.to_le_bytes());
        raw.extend_from_slice(&self.previous_output.as_bytes());
        raw.into()
    }

    pub fn from_slice(slice: &[u8]) -> EncodingResult<Self> {
        if slice.len() != Self::LEN {
            return Err(EncodingError::TotalSizeNotMatch(
                "CellInput",
                Self::LEN,
                slice.len(),
            ));
        }
        let since = read_u64("CellInput.since", &slice[..8])?;
        let previous_output = OutPoint::from_slice(&slice[8..])?;
        Ok(CellInput {
            since,
            previous_output,
        })
    }
}

/// A created (or referenced) cell: value plus its governing scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellOutput {
    pub capacity: Capacity,
    pub lock: Script,
    pub type_: Option<Script>,
}

impl CellOutput {
    pub fn as_bytes(&self) -> Bytes {
        let type_ = self
            .type_
            .as_ref()
            .map(Script::as_bytes)
            .unwrap_or_default();
        build_table(&[
            &self.capacity.to_le_bytes(),
            &self.lock.as_bytes(),
            &type_,
        ])
    }

    pub fn from_slice(slice: &[u8]) -> EncodingResult<Self> {
        let fields = parse_table("CellOutput", slice, 3)?;
        let capacity = read_u64("CellOutput.capacity", fields[0])?;
        let lock = Script::from_slice(fields[1])?;
        let type_ = if fields[2].is_empty() {
            None
        } else {
            Some(Script::from_slice(fields[2])?)
        };
        Ok(CellOutput {
            capacity,
            lock,
            type_,
        })
    }

    /// The hash of the lock script, i.e. the cell's ownership identity.
    pub fn calc_lock_hash(&self) -> Byte32 {
        self.lock.calc_script_hash()
    }

    /// The hash of the type script, if the cell has one.
    pub fn type_hash(&self) -> Option<Byte32> {
        self.type_.as_ref().map(Script::calc_script_hash)
    }
}

/// How a dep cell's content is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DepType {
    /// The dep cell is code or data, used as is.
    Code = 0,
    /// The dep cell holds a vector of out points to expand.
    DepGroup = 1,
}

impl TryFrom<u8> for DepType {
    type Error = EncodingError;

    fn try_from(value: u8) -> EncodingResult<Self> {
        match value {
            0 => Ok(DepType::Code),
            1 => Ok(DepType::DepGroup),
            _ => Err(EncodingError::InvalidValue("DepType", value.into())),
        }
    }
}

/// A read-only cell dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellDep {
    pub out_point: OutPoint,
    pub dep_type: DepType,
}

impl CellDep {
    /// Serialized size in bytes.
    pub const LEN: usize = OutPoint::LEN + 1;

    pub fn as_bytes(&self) -> Bytes {
        let mut raw = Vec::with_capacity(Self::LEN);
        raw.extend_from_slice(&self.out_point.as_bytes());
        raw.push(self.dep_type as u8);
        raw.into()
    }

    pub fn from_slice(slice: &[u8]) -> EncodingResult<Self> {
        if slice.len() != Self::LEN {
            return Err(EncodingError::TotalSizeNotMatch(
                "CellDep",
                Self::LEN,
                slice.len(),
            ));
        }
        let out_point = OutPoint::from_slice(&slice[..OutPoint::LEN])?;
        let dep_type = DepType::try_from(slice[OutPoint::LEN])?;
        Ok(CellDep { out_point, dep_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_script() -> Script {
        Script {
            code_hash: Byte32::new([0x35; 32]),
            hash_type: ScriptHashType::Type,
            args: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
        }
    }

    #[test]
    fn script_round_trip() {
        let script = sample_script();
        let encoded = script.as_bytes();
        let decoded = Script::from_slice(&encoded).unwrap();
        assert_eq!(decoded, script);
        assert_eq!(decoded.as_bytes(), encoded);
    }

    #[test]
    fn script_hash_depends_on_args() {
        let a = sample_script();
        let mut b = a.clone();
        b.args = Bytes::from_static(&[0xde, 0xad]);
        assert_ne!(a.calc_script_hash(), b.calc_script_hash());
    }

    #[test]
    fn script_rejects_unknown_hash_type() {
        let mut encoded = sample_script().as_bytes().to_vec();
        let fields = parse_table("Script", &encoded, 3).unwrap();
        let pos = encoded.len() - fields[2].len() - 1;
        encoded[pos] = 3;
        assert_eq!(
            Script::from_slice(&encoded),
            Err(EncodingError::InvalidValue("ScriptHashType", 3))
        );
    }

    #[test]
    fn cell_input_is_fixed_size() {
        let input = CellInput {
            since: 0x2000_0000_0000_0001,
            previous_output: OutPoint {
                tx_hash: Byte32::new([7; 32]),
                index: 2,
            },
        };
        let encoded = input.as_bytes();
        assert_eq!(encoded.len(), CellInput::LEN);
        assert_eq!(CellInput::from_slice(&encoded).unwrap(), input);
    }

    #[test]
    fn cell_output_optional_type_script() {
        let without = CellOutput {
            capacity: 500,
            lock: sample_script(),
            type_: None,
        };
        let with = CellOutput {
            capacity: 500,
            lock: sample_script(),
            type_: Some(sample_script()),
        };
        for output in [&without, &with] {
            let encoded = output.as_bytes();
            assert_eq!(&CellOutput::from_slice(&encoded).unwrap(), output);
        }
        assert!(without.type_hash().is_none());
        assert_eq!(
            with.type_hash(),
            Some(sample_script().calc_script_hash())
        );
    }

    #[test]
    fn cell_dep_round_trip() {
        let dep = CellDep {
            out_point: OutPoint::null(),
            dep_type: DepType::DepGroup,
        };
        let encoded = dep.as_bytes();
        assert_eq!(encoded.len(), CellDep::LEN);
        assert_eq!(CellDep::from_slice(&encoded).unwrap(), dep);
    }
}
