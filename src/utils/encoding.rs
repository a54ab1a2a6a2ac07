use crate::index::types::{DocId, Position, PostingItem};
use std::io::{self, Read, Write};

/// Encode a u32 as a variable-length integer
pub fn encode_varint(mut value: u32, buf: &mut Vec<u8>) {
    loop {
        if value < 0x80 {
            buf.push(value as u8);
            break;
        }
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
}

/// Decode a variable-length integer from a slice
/// Returns (value, bytes_consumed)
pub fn decode_varint(buf: &[u8]) -> Option<(u32, usize)> {
    let mut result: u32 = 0;
    let mut shift = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if shift >= 32 {
            return None; // Overflow
        }

        result |= ((byte & 0x7F) as u32) << shift;

        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }

        shift += 7;
    }

    None // Incomplete
}

/// Encode one posting record.
///
/// Layout: `varint(doc_id - prev_doc) varint(tf) varint(pos_delta)*tf`.
/// Positions are delta-coded against the previous position in the record.
pub fn encode_posting(item: &PostingItem, prev_doc: DocId, buf: &mut Vec<u8>) {
    encode_varint(item.doc_id - prev_doc, buf);
    encode_varint(item.positions.len() as u32, buf);
    delta_encode(&item.positions, buf);
}

/// Decode one posting record starting at `buf[0]` into `out`.
/// Returns the number of bytes consumed, or `None` on malformed input.
pub fn decode_posting(buf: &[u8], prev_doc: DocId, out: &mut PostingItem) -> Option<usize> {
    let (doc_id, tf, mut pos) = decode_posting_head(buf, prev_doc)?;

    out.doc_id = doc_id;
    out.tf = tf;
    out.positions.clear();
    out.positions.reserve(tf as usize);

    let mut prev: Position = 0;
    for _ in 0..tf {
        let (delta, consumed) = decode_varint(buf.get(pos..)?)?;
        prev = prev.checked_add(delta)?;
        out.positions.push(prev);
        pos += consumed;
    }

    Some(pos)
}

/// Decode only the document id of a record, skipping its positions.
/// Returns (doc_id, bytes_consumed).
pub fn skip_posting(buf: &[u8], prev_doc: DocId) -> Option<(DocId, usize)> {
    let (doc_id, tf, mut pos) = decode_posting_head(buf, prev_doc)?;

    for _ in 0..tf {
        let (_, consumed) = decode_varint(buf.get(pos..)?)?;
        pos += consumed;
    }

    Some((doc_id, pos))
}

fn decode_posting_head(buf: &[u8], prev_doc: DocId) -> Option<(DocId, u32, usize)> {
    let (delta, n1) = decode_varint(buf)?;
    // Document ids are strictly increasing within a posting list
    if delta == 0 {
        return None;
    }
    let doc_id = prev_doc.checked_add(delta)?;

    let (tf, n2) = decode_varint(buf.get(n1..)?)?;
    let pos = n1 + n2;

    // Every position takes at least one byte
    if tf as usize > buf.len() - pos {
        return None;
    }

    Some((doc_id, tf, pos))
}

/// Delta-encode a sorted list of u32s
pub fn delta_encode(values: &[u32], buf: &mut Vec<u8>) {
    let mut prev = 0u32;
    for &value in values {
        let delta = value - prev;
        encode_varint(delta, buf);
        prev = value;
    }
}

/// Write a u32 in little-endian format
pub fn write_u32_le<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a u32 in little-endian format
pub fn read_u32_le<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Write a u64 in little-endian format
pub fn write_u64_le<W: Write>(writer: &mut W, value: u64) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a u64 in little-endian format
pub fn read_u64_le<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Write a u16 in little-endian format
pub fn write_u16_le<W: Write>(writer: &mut W, value: u16) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

/// Read a u16 in little-endian format
pub fn read_u16_le<R: Read>(reader: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

/// Read a little-endian u32 at `index` (in u32 units) of a byte slice
#[inline]
pub fn u32_at(bytes: &[u8], index: usize) -> Option<u32> {
    let start = index.checked_mul(4)?;
    let chunk = bytes.get(start..start + 4)?;
    Some(u32::from_le_bytes(chunk.try_into().ok()?))
}

/// Read a little-endian u64 at `index` (in u64 units) of a byte slice
#[inline]
pub fn u64_at(bytes: &[u8], index: usize) -> Option<u64> {
    let start = index.checked_mul(8)?;
    let chunk = bytes.get(start..start + 8)?;
    Some(u64::from_le_bytes(chunk.try_into().ok()?))
}
