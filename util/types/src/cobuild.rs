//! The CoBuild witness structures.
//!
//! A transaction witness is either a legacy [`WitnessArgs`] or one of the
//! tagged [`WitnessLayout`] variants. The two encodings are told apart by
//! the leading 4 bytes alone: a legacy witness starts with its own total
//! size, a layout witness starts with a reserved union id in
//! `[0xFF000001, 0xFFFFFFFF]`, and no realistic witness is ever 0xFF000001
//! bytes long. [`classify_witness`] is the single entry point for that
//! decision.

use bytes::Bytes;

use crate::{
    constants::{
        WITNESS_LAYOUT_OTX, WITNESS_LAYOUT_OTX_START, WITNESS_LAYOUT_RESERVED_START,
        WITNESS_LAYOUT_SIGHASH_ALL, WITNESS_LAYOUT_SIGHASH_ALL_ONLY,
    },
    encoding::{
        build_bytes, build_dynvec, build_table, build_union, parse_bytes, parse_dynvec,
        parse_table, parse_union, peek_number, read_u32, EncodingError, EncodingResult,
    },
    primitive::Byte32,
};

/// One human-meaningful operation, addressed to a single script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Hash of the script-info metadata a wallet uses to render this action.
    pub script_info_hash: Byte32,
    /// Identity of the script this action is addressed to.
    pub script_hash: Byte32,
    /// Application-specific payload, interpreted by the addressed script.
    pub data: Bytes,
}

impl Action {
    pub fn as_bytes(&self) -> Bytes {
        build_table(&[
            self.script_info_hash.as_slice(),
            self.script_hash.as_slice(),
            &build_bytes(&self.data),
        ])
    }

    pub fn from_slice(slice: &[u8]) -> EncodingResult<Self> {
        let fields = parse_table("Action", slice, 3)?;
        Ok(Action {
            script_info_hash: Byte32::from_slice(fields[0])?,
            script_hash: Byte32::from_slice(fields[1])?,
            data: parse_bytes("Action.data", fields[2])?,
        })
    }
}

/// The ordered actions carried by one signing scope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub actions: Vec<Action>,
}

impl Message {
    pub fn as_bytes(&self) -> Bytes {
        let actions: Vec<Bytes> = self.actions.iter().map(Action::as_bytes).collect();
        let items: Vec<&[u8]> = actions.iter().map(|action| action.as_ref()).collect();
        build_table(&[&build_dynvec(&items)])
    }

    pub fn from_slice(slice: &[u8]) -> EncodingResult<Self> {
        let fields = parse_table("Message", slice, 1)?;
        let items = parse_dynvec("Message.actions", fields[0])?;
        let actions = items
            .into_iter()
            .map(Action::from_slice)
            .collect::<EncodingResult<Vec<_>>>()?;
        Ok(Message { actions })
    }
}

/// An authorization proof bound to the script identity it unlocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealPair {
    pub script_hash: Byte32,
    pub seal: Bytes,
}

impl SealPair {
    pub fn as_bytes(&self) -> Bytes {
        build_table(&[self.script_hash.as_slice(), &build_bytes(&self.seal)])
    }

    pub fn from_slice(slice: &[u8]) -> EncodingResult<Self> {
        let fields = parse_table("SealPair", slice, 2)?;
        Ok(SealPair {
            script_hash: Byte32::from_slice(fields[0])?,
            seal: parse_bytes("SealPair.seal", fields[1])?,
        })
    }
}

fn build_seal_pair_vec(seals: &[SealPair]) -> Bytes {
    let encoded: Vec<Bytes> = seals.iter().map(SealPair::as_bytes).collect();
    let items: Vec<&[u8]> = encoded.iter().map(|seal| seal.as_ref()).collect();
    build_dynvec(&items)
}

fn parse_seal_pair_vec(slice: &[u8]) -> EncodingResult<Vec<SealPair>> {
    parse_dynvec("SealPairVec", slice)?
        .into_iter()
        .map(SealPair::from_slice)
        .collect()
}

/// The legacy three-field witness: one optional byte string per script kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WitnessArgs {
    pub lock: Option<Bytes>,
    pub input_type: Option<Bytes>,
    pub output_type: Option<Bytes>,
}

impl WitnessArgs {
    pub fn as_bytes(&self) -> Bytes {
        let fields: Vec<Bytes> = [&self.lock, &self.input_type, &self.output_type]
            .into_iter()
            .map(|field| field.as_ref().map(|data| build_bytes(data)).unwrap_or_default())
            .collect();
        build_table(&[&fields[0], &fields[1], &fields[2]])
    }

    pub fn from_slice(slice: &[u8]) -> EncodingResult<Self> {
        let fields = parse_table("WitnessArgs", slice, 3)?;
        let parse_opt = |name, field: &[u8]| -> EncodingResult<Option<Bytes>> {
            if field.is_empty() {
                Ok(None)
            } else {
                parse_bytes(name, field).map(Some)
            }
        };
        Ok(WitnessArgs {
            lock: parse_opt("WitnessArgs.lock", fields[0])?,
            input_type: parse_opt("WitnessArgs.input_type", fields[1])?,
            output_type: parse_opt("WitnessArgs.output_type", fields[2])?,
        })
    }
}

/// Whole-transaction witness carrying the message and one seal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SighashAll {
    pub seal: Bytes,
    pub message: Message,
}

/// Whole-transaction witness carrying a seal but no message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SighashAllOnly {
    pub seal: Bytes,
}

/// One open-transaction fragment: its seals, its claimed counts against the
/// running cursors, and its own message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Otx {
    pub seals: Vec<SealPair>,
    pub input_cells: u32,
    pub output_cells: u32,
    pub cell_deps: u32,
    pub header_deps: u32,
    pub message: Message,
}

/// Marks where the open-transaction fragments begin in each array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OtxStart {
    pub start_input_cell: u32,
    pub start_output_cell: u32,
    pub start_cell_deps: u32,
    pub start_header_deps: u32,
}

/// The tagged union over the structured witness variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WitnessLayout {
    SighashAll(SighashAll),
    SighashAllOnly(SighashAllOnly),
    Otx(Otx),
    OtxStart(OtxStart),
}

impl WitnessLayout {
    /// The reserved union id of this variant.
    pub fn item_id(&self) -> u32 {
        match self {
            WitnessLayout::SighashAll(_) => WITNESS_LAYOUT_SIGHASH_ALL,
            WitnessLayout::SighashAllOnly(_) => WITNESS_LAYOUT_SIGHASH_ALL_ONLY,
            WitnessLayout::Otx(_) => WITNESS_LAYOUT_OTX,
            WitnessLayout::OtxStart(_) => WITNESS_LAYOUT_OTX_START,
        }
    }

    pub fn as_bytes(&self) -> Bytes {
        let item = match self {
            WitnessLayout::SighashAll(s) => {
                build_table(&[&build_bytes(&s.seal), &s.message.as_bytes()])
            }
            WitnessLayout::SighashAllOnly(s) => build_table(&[&build_bytes(&s.seal)]),
            WitnessLayout::Otx(otx) => build_table(&[
                &build_seal_pair_vec(&otx.seals),
                &otx.input_cells.to_le_bytes(),
                &otx.output_cells.to_le_bytes(),
                &otx.cell_deps.to_le_bytes(),
                &otx.header_deps.to_le_bytes(),
                &otx.message.as_bytes(),
            ]),
            WitnessLayout::OtxStart(start) => build_table(&[
                &start.start_input_cell.to_le_bytes(),
                &start.start_output_cell.to_le_bytes(),
                &start.start_cell_deps.to_le_bytes(),
                &start.start_header_deps.to_le_bytes(),
            ]),
        };
        build_union(self.item_id(), &item)
    }

    pub fn from_slice(slice: &[u8]) -> EncodingResult<Self> {
        let (item_id, item) = parse_union("WitnessLayout", slice)?;
        match item_id {
            WITNESS_LAYOUT_SIGHASH_ALL => {
                let fields = parse_table("SighashAll", item, 2)?;
                Ok(WitnessLayout::SighashAll(SighashAll {
                    seal: parse_bytes("SighashAll.seal", fields[0])?,
                    message: Message::from_slice(fields[1])?,
                }))
            }
            WITNESS_LAYOUT_SIGHASH_ALL_ONLY => {
                let fields = parse_table("SighashAllOnly", item, 1)?;
                Ok(WitnessLayout::SighashAllOnly(SighashAllOnly {
                    seal: parse_bytes("SighashAllOnly.seal", fields[0])?,
                }))
            }
            WITNESS_LAYOUT_OTX => {
                let fields = parse_table("Otx", item, 6)?;
                Ok(WitnessLayout::Otx(Otx {
                    seals: parse_seal_pair_vec(fields[0])?,
                    input_cells: read_u32("Otx.input_cells", fields[1])?,
                    output_cells: read_u32("Otx.output_cells", fields[2])?,
                    cell_deps: read_u32("Otx.cell_deps", fields[3])?,
                    header_deps: read_u32("Otx.header_deps", fields[4])?,
                    message: Message::from_slice(fields[5])?,
                }))
            }
            WITNESS_LAYOUT_OTX_START => {
                let fields = parse_table("OtxStart", item, 4)?;
                Ok(WitnessLayout::OtxStart(OtxStart {
                    start_input_cell: read_u32("OtxStart.start_input_cell", fields[0])?,
                    start_output_cell: read_u32("OtxStart.start_output_cell", fields[1])?,
                    start_cell_deps: read_u32("OtxStart.start_cell_deps", fields[2])?,
                    start_header_deps: read_u32("OtxStart.start_header_deps", fields[3])?,
                }))
            }
            _ => Err(EncodingError::UnknownUnionItem("WitnessLayout", item_id)),
        }
    }
}

/// The decoded form of one raw witness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedWitness {
    /// A structured witness.
    Layout(WitnessLayout),
    /// A legacy three-field witness.
    Legacy(WitnessArgs),
    /// No bytes at all; commonly used as a group placeholder.
    Empty,
}

/// Decides which encoding a raw witness uses and parses it.
///
/// The decision is exclusive and total: any byte string is either a layout
/// witness, a legacy witness, empty, or malformed.
pub fn classify_witness(slice: &[u8]) -> EncodingResult<ClassifiedWitness> {
    if slice.is_empty() {
        return Ok(ClassifiedWitness::Empty);
    }
    match peek_number(slice) {
        None => Err(EncodingError::HeaderIsBroken("Witness", 4, slice.len())),
        Some(tag) if tag >= WITNESS_LAYOUT_RESERVED_START => {
            WitnessLayout::from_slice(slice).map(ClassifiedWitness::Layout)
        }
        Some(_) => WitnessArgs::from_slice(slice).map(ClassifiedWitness::Legacy),
    }
}

/// Parses a raw witness as a [`WitnessLayout`] if its leading tag is in the
/// reserved range; yields `None` for legacy and empty witnesses without
/// validating them.
pub fn try_parse_witness_layout(slice: &[u8]) -> EncodingResult<Option<WitnessLayout>> {
    match peek_number(slice) {
        Some(tag) if tag >= WITNESS_LAYOUT_RESERVED_START => {
            WitnessLayout::from_slice(slice).map(Some)
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn sample_message() -> Message {
        Message {
            actions: vec![Action {
                script_info_hash: Byte32::new([1; 32]),
                script_hash: Byte32::new([2; 32]),
                data: Bytes::from_static(&[0xaa, 0xbb]),
            }],
        }
    }

    #[test]
    fn message_round_trip() {
        let message = sample_message();
        let encoded = message.as_bytes();
        let decoded = Message::from_slice(&encoded).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.as_bytes(), encoded);
    }

    #[test]
    fn empty_message_round_trip() {
        let message = Message::default();
        let decoded = Message::from_slice(&message.as_bytes()).unwrap();
        assert!(decoded.actions.is_empty());
    }

    #[test]
    fn witness_layout_variants_round_trip() {
        let layouts = [
            WitnessLayout::SighashAll(SighashAll {
                seal: Bytes::from_static(&[1, 2, 3]),
                message: sample_message(),
            }),
            WitnessLayout::SighashAllOnly(SighashAllOnly {
                seal: Bytes::from_static(&[4, 5]),
            }),
            WitnessLayout::Otx(Otx {
                seals: vec![SealPair {
                    script_hash: Byte32::new([9; 32]),
                    seal: Bytes::from_static(&[6]),
                }],
                input_cells: 1,
                output_cells: 2,
                cell_deps: 0,
                header_deps: 0,
                message: sample_message(),
            }),
            WitnessLayout::OtxStart(OtxStart {
                start_input_cell: 1,
                start_output_cell: 1,
                start_cell_deps: 0,
                start_header_deps: 0,
            }),
        ];
        for layout in &layouts {
            let encoded = layout.as_bytes();
            let decoded = WitnessLayout::from_slice(&encoded).unwrap();
            assert_eq!(&decoded, layout);
            assert_eq!(decoded.as_bytes(), encoded);
        }
    }

    #[test]
    fn classify_layout_and_legacy() {
        let layout = WitnessLayout::SighashAllOnly(SighashAllOnly {
            seal: Bytes::new(),
        })
        .as_bytes();
        assert!(matches!(
            classify_witness(&layout).unwrap(),
            ClassifiedWitness::Layout(WitnessLayout::SighashAllOnly(_))
        ));

        let legacy = WitnessArgs {
            lock: Some(Bytes::from_static(&[0; 65])),
            ..Default::default()
        }
        .as_bytes();
        assert!(matches!(
            classify_witness(&legacy).unwrap(),
            ClassifiedWitness::Legacy(_)
        ));

        assert_eq!(classify_witness(&[]).unwrap(), ClassifiedWitness::Empty);
        assert!(classify_witness(&[1, 2]).is_err());
    }

    #[test]
    fn unknown_reserved_id_is_rejected() {
        let raw = 0xFF12_3456u32.to_le_bytes();
        assert_eq!(
            classify_witness(&raw),
            Err(EncodingError::UnknownUnionItem("WitnessLayout", 0xFF12_3456))
        );
    }

    proptest! {
        // Classification is total and exclusive: it never panics, and the
        // branch taken is fully determined by the leading 4 bytes.
        #[test]
        fn classification_is_total_and_exclusive(raw in prop::collection::vec(any::<u8>(), 0..512)) {
            let classified = classify_witness(&raw);
            match (raw.len(), peek_number(&raw)) {
                (0, _) => prop_assert_eq!(classified, Ok(ClassifiedWitness::Empty)),
                (_, None) => prop_assert!(classified.is_err()),
                (_, Some(tag)) if tag >= WITNESS_LAYOUT_RESERVED_START => {
                    if let Ok(witness) = classified {
                        prop_assert!(matches!(witness, ClassifiedWitness::Layout(_)));
                    }
                }
                (_, Some(_)) => {
                    if let Ok(witness) = classified {
                        prop_assert!(matches!(witness, ClassifiedWitness::Legacy(_)));
                    }
                }
            }
        }
    }
}
