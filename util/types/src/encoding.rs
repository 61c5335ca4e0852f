//! Strict readers and builders for the molecule wire format.
//!
//! Only the four shapes the CoBuild structures need are implemented here:
//! tables, dynamic vectors, length-prefixed byte strings and unions.
//! Fixed-size composites are handled inline by their owning types.
//!
//! Readers are stricter than general molecule verification: every header
//! number and offset must be exactly the value the builders would emit.
//! Canonical-only parsing is what lets the engine re-encode a parsed
//! structure into a signing preimage without keeping the original slice
//! around.

use bytes::{BufMut, Bytes, BytesMut};
use molecule::{pack_number, unpack_number, Number, NUMBER_SIZE};
use thiserror::Error;

/// Errors raised while parsing the canonical binary encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The slice is too short to hold the declared header.
    #[error("{0}: header is broken, expected at least {1} bytes but got {2}")]
    HeaderIsBroken(&'static str, usize, usize),
    /// The declared total size disagrees with the actual slice length.
    #[error("{0}: total size {1} does not match the actual size {2}")]
    TotalSizeNotMatch(&'static str, usize, usize),
    /// A table header declares a different number of fields.
    #[error("{0}: expected {1} fields but the header declares {2}")]
    FieldCountNotMatch(&'static str, usize, usize),
    /// Offsets are not the exact values a canonical encoder would produce.
    #[error("{0}: offsets are broken")]
    OffsetsNotMatch(&'static str),
    /// A union carries an item id this schema does not define.
    #[error("{0}: unknown union item id {1:#010x}")]
    UnknownUnionItem(&'static str, u32),
    /// A field holds a value outside its domain.
    #[error("{0}: invalid value {1}")]
    InvalidValue(&'static str, u64),
}

pub type EncodingResult<T> = Result<T, EncodingError>;

/// Reads the leading little-endian `u32` of a slice, if there is one.
pub fn peek_number(slice: &[u8]) -> Option<u32> {
    if slice.len() < NUMBER_SIZE {
        None
    } else {
        Some(unpack_number(&slice[..NUMBER_SIZE]))
    }
}

/// Parses a slice which must be exactly one little-endian `u32`.
pub(crate) fn read_u32(name: &'static str, slice: &[u8]) -> EncodingResult<u32> {
    if slice.len() != NUMBER_SIZE {
        return Err(EncodingError::TotalSizeNotMatch(
            name,
            NUMBER_SIZE,
            slice.len(),
        ));
    }
    Ok(unpack_number(slice))
}

/// Parses a slice which must be exactly one little-endian `u64`.
pub(crate) fn read_u64(name: &'static str, slice: &[u8]) -> EncodingResult<u64> {
    if slice.len() != 8 {
        return Err(EncodingError::TotalSizeNotMatch(name, 8, slice.len()));
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(slice);
    Ok(u64::from_le_bytes(raw))
}

// Shared by tables and dynamic vectors: checks the size/offset header of a
// slice expected to hold `item_count` items and returns the item sub-slices.
fn split_offset_items<'a>(
    name: &'static str,
    slice: &'a [u8],
    item_count: usize,
) -> EncodingResult<Vec<&'a [u8]>> {
    let header_size = NUMBER_SIZE * (item_count + 1);
    if slice.len() < header_size {
        return Err(EncodingError::HeaderIsBroken(name, header_size, slice.len()));
    }
    let total = unpack_number(&slice[..NUMBER_SIZE]) as usize;
    if total != slice.len() {
        return Err(EncodingError::TotalSizeNotMatch(name, total, slice.len()));
    }
    let mut ends = Vec::with_capacity(item_count + 1);
    for i in 1..=item_count {
        let offset = unpack_number(&slice[NUMBER_SIZE * i..NUMBER_SIZE * (i + 1)]) as usize;
        ends.push(offset);
    }
    ends.push(total);
    // The first offset must point right past the header and the rest must be
    // monotone within the slice, otherwise the encoding is not canonical.
    if ends[0] != header_size {
        return Err(EncodingError::OffsetsNotMatch(name));
    }
    for window in ends.windows(2) {
        if window[0] > window[1] {
            return Err(EncodingError::OffsetsNotMatch(name));
        }
    }
    Ok(ends
        .windows(2)
        .map(|window| &slice[window[0]..window[1]])
        .collect())
}

/// Parses a table with a fixed field count, yielding the field sub-slices.
pub(crate) fn parse_table<'a>(
    name: &'static str,
    slice: &'a [u8],
    field_count: usize,
) -> EncodingResult<Vec<&'a [u8]>> {
    if slice.len() < NUMBER_SIZE * 2 {
        return Err(EncodingError::HeaderIsBroken(
            name,
            NUMBER_SIZE * 2,
            slice.len(),
        ));
    }
    let first_offset = unpack_number(&slice[NUMBER_SIZE..NUMBER_SIZE * 2]) as usize;
    if first_offset % NUMBER_SIZE != 0 || first_offset < NUMBER_SIZE {
        return Err(EncodingError::OffsetsNotMatch(name));
    }
    let declared = first_offset / NUMBER_SIZE - 1;
    if declared != field_count {
        return Err(EncodingError::FieldCountNotMatch(name, field_count, declared));
    }
    split_offset_items(name, slice, field_count)
}

/// Parses a dynamic vector, yielding the item sub-slices.
pub(crate) fn parse_dynvec<'a>(
    name: &'static str,
    slice: &'a [u8],
) -> EncodingResult<Vec<&'a [u8]>> {
    if slice.len() < NUMBER_SIZE {
        return Err(EncodingError::HeaderIsBroken(name, NUMBER_SIZE, slice.len()));
    }
    let total = unpack_number(&slice[..NUMBER_SIZE]) as usize;
    if total != slice.len() {
        return Err(EncodingError::TotalSizeNotMatch(name, total, slice.len()));
    }
    if total == NUMBER_SIZE {
        return Ok(Vec::new());
    }
    if slice.len() < NUMBER_SIZE * 2 {
        return Err(EncodingError::HeaderIsBroken(
            name,
            NUMBER_SIZE * 2,
            slice.len(),
        ));
    }
    let first_offset = unpack_number(&slice[NUMBER_SIZE..NUMBER_SIZE * 2]) as usize;
    if first_offset % NUMBER_SIZE != 0 || first_offset < NUMBER_SIZE * 2 {
        return Err(EncodingError::OffsetsNotMatch(name));
    }
    split_offset_items(name, slice, first_offset / NUMBER_SIZE - 1)
}

/// Parses a length-prefixed byte string, copying out the payload.
pub(crate) fn parse_bytes(name: &'static str, slice: &[u8]) -> EncodingResult<Bytes> {
    if slice.len() < NUMBER_SIZE {
        return Err(EncodingError::HeaderIsBroken(name, NUMBER_SIZE, slice.len()));
    }
    let len = unpack_number(&slice[..NUMBER_SIZE]) as usize;
    if slice.len() != NUMBER_SIZE + len {
        return Err(EncodingError::TotalSizeNotMatch(
            name,
            NUMBER_SIZE + len,
            slice.len(),
        ));
    }
    Ok(Bytes::copy_from_slice(&slice[NUMBER_SIZE..]))
}

/// Parses a union header, yielding the item id and the item sub-slice.
pub(crate) fn parse_union<'a>(
    name: &'static str,
    slice: &'a [u8],
) -> EncodingResult<(u32, &'a [u8])> {
    if slice.len() < NUMBER_SIZE {
        return Err(EncodingError::HeaderIsBroken(name, NUMBER_SIZE, slice.len()));
    }
    Ok((unpack_number(&slice[..NUMBER_SIZE]), &slice[NUMBER_SIZE..]))
}

fn build_offset_items(items: &[&[u8]]) -> Bytes {
    let header_size = NUMBER_SIZE * (items.len() + 1);
    let total = header_size + items.iter().map(|item| item.len()).sum::<usize>();
    let mut buf = BytesMut::with_capacity(total);
    buf.put_slice(&pack_number(total as Number));
    let mut offset = header_size;
    for item in items {
        buf.put_slice(&pack_number(offset as Number));
        offset += item.len();
    }
    for item in items {
        buf.put_slice(item);
    }
    buf.freeze()
}

/// Builds a table out of already-encoded fields.
pub(crate) fn build_table(fields: &[&[u8]]) -> Bytes {
    build_offset_items(fields)
}

/// Builds a dynamic vector out of already-encoded items.
pub(crate) fn build_dynvec(items: &[&[u8]]) -> Bytes {
    if items.is_empty() {
        Bytes::copy_from_slice(&pack_number(NUMBER_SIZE as Number))
    } else {
        build_offset_items(items)
    }
}

/// Builds a length-prefixed byte string.
pub(crate) fn build_bytes(data: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(NUMBER_SIZE + data.len());
    buf.put_slice(&pack_number(data.len() as Number));
    buf.put_slice(data);
    buf.freeze()
}

/// Builds a union out of an item id and an already-encoded item.
pub(crate) fn build_union(item_id: u32, item: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(NUMBER_SIZE + item.len());
    buf.put_slice(&pack_number(item_id));
    buf.put_slice(item);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_round_trip() {
        let encoded = build_table(&[b"ab", b"", b"cdef"]);
        let fields = parse_table("test", &encoded, 3).unwrap();
        assert_eq!(fields, vec![&b"ab"[..], &b""[..], &b"cdef"[..]]);
    }

    #[test]
    fn table_rejects_wrong_field_count() {
        let encoded = build_table(&[b"ab", b"cd"]);
        assert_eq!(
            parse_table("test", &encoded, 3),
            Err(EncodingError::FieldCountNotMatch("test", 3, 2))
        );
    }

    #[test]
    fn table_rejects_padded_total_size() {
        let encoded = build_table(&[b"ab"]);
        let mut padded = encoded.to_vec();
        padded.push(0);
        assert_eq!(
            parse_table("test", &padded, 1),
            Err(EncodingError::TotalSizeNotMatch("test", encoded.len(), encoded.len() + 1))
        );
    }

    #[test]
    fn empty_dynvec_is_four_bytes() {
        let encoded = build_dynvec(&[]);
        assert_eq!(encoded.as_ref(), &[4, 0, 0, 0]);
        assert!(parse_dynvec("test", &encoded).unwrap().is_empty());
    }

    #[test]
    fn dynvec_round_trip() {
        let item0 = build_bytes(b"x");
        let item1 = build_bytes(b"yz");
        let encoded = build_dynvec(&[&item0, &item1]);
        let items = parse_dynvec("test", &encoded).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(parse_bytes("test", items[0]).unwrap().as_ref(), b"x");
        assert_eq!(parse_bytes("test", items[1]).unwrap().as_ref(), b"yz");
    }

    #[test]
    fn bytes_rejects_trailing_garbage() {
        let mut encoded = build_bytes(b"abc").to_vec();
        encoded.push(0xff);
        assert!(parse_bytes("test", &encoded).is_err());
    }

    #[test]
    fn offsets_must_be_monotone() {
        // A two-field table whose second offset goes backwards.
        let mut raw = Vec::new();
        raw.extend_from_slice(&16u32.to_le_bytes());
        raw.extend_from_slice(&12u32.to_le_bytes());
        raw.extend_from_slice(&11u32.to_le_bytes());
        raw.extend_from_slice(&[0u8; 4]);
        assert_eq!(
            parse_table("test", &raw, 2),
            Err(EncodingError::OffsetsNotMatch("test"))
        );
    }
}
