//! Keyed-archive payload decoding.
//!
//! Payloads arrive in one of two concrete encodings of the same object
//! graph, sniffed by magic:
//!
//! - the binary form (`bplist00` header): an object table addressed through
//!   an offset table and trailer, where references are UID-marker objects;
//! - the JSON-bridged form emitted by serialization bridges: a top-level
//!   object with an `$objects` array and `$top` root pointer, where a
//!   reference is either a `{"CF$UID": n}` wrapper or a bare integer in
//!   reference position.
//!
//! Every reference shape is normalized to [`Node::Reference`] here. No
//! other component branches on marker representation.
//!
//! All input is untrusted: malformed structure yields [`DecodeError`],
//! never a panic, and declared sizes are capped before allocation.

use std::collections::BTreeMap;

use crate::error::{DecodeError, Result};
use crate::graph::{Node, ObjectGraph, Scalar};

const BINARY_MAGIC: &[u8] = b"bplist00";
const TRAILER_LEN: usize = 32;

/// Upper bound on the number of graph objects a payload may declare.
const MAX_OBJECTS: usize = 65_536;
/// Upper bound on a single collection's declared length.
const MAX_COLLECTION_LEN: usize = 16_384;

/// Decode an opaque payload into a normalized [`ObjectGraph`].
pub fn decode(bytes: &[u8]) -> Result<ObjectGraph> {
    if bytes.starts_with(BINARY_MAGIC) {
        decode_binary(bytes)
    } else {
        decode_json(bytes)
    }
}

// ---------------------------------------------------------------------------
// Raw binary object table
// ---------------------------------------------------------------------------

/// A node as it appears in the binary object table, before normalization.
/// Collection members are object-table indices, not graph indices.
#[derive(Debug, Clone)]
enum RawNode {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
    Uid(usize),
    Array(Vec<usize>),
    Dict(Vec<(usize, usize)>),
}

struct BinaryReader<'a> {
    bytes: &'a [u8],
    ref_size: usize,
}

fn read_be_uint(bytes: &[u8], offset: usize, width: usize) -> Result<u64> {
    let end = offset
        .checked_add(width)
        .ok_or(DecodeError::Truncated("integer out of bounds"))?;
    let slice = bytes
        .get(offset..end)
        .ok_or(DecodeError::Truncated("integer out of bounds"))?;
    let mut value = 0u64;
    for &b in slice {
        value = (value << 8) | u64::from(b);
    }
    Ok(value)
}

impl<'a> BinaryReader<'a> {
    /// Read an object count from a marker's low nibble, or the trailing
    /// integer object when the nibble is the extension sentinel.
    fn read_count(&self, offset: usize, low: u8) -> Result<(usize, usize)> {
        if low != 0x0F {
            return Ok((low as usize, offset + 1));
        }
        let marker = *self
            .bytes
            .get(offset + 1)
            .ok_or(DecodeError::Truncated("count marker"))?;
        if marker >> 4 != 0x1 {
            return Err(DecodeError::Malformed("count is not an integer".into()));
        }
        let width = 1usize << (marker & 0x0F);
        if width > 8 {
            return Err(DecodeError::Malformed("count integer too wide".into()));
        }
        let count = read_be_uint(self.bytes, offset + 2, width)? as usize;
        if count > self.bytes.len() {
            return Err(DecodeError::Truncated("count exceeds payload"));
        }
        Ok((count, offset + 2 + width))
    }

    fn read_refs(&self, offset: usize, count: usize) -> Result<Vec<usize>> {
        if count > MAX_COLLECTION_LEN {
            return Err(DecodeError::Malformed("collection too large".into()));
        }
        let mut refs = Vec::with_capacity(count);
        for i in 0..count {
            refs.push(read_be_uint(self.bytes, offset + i * self.ref_size, self.ref_size)? as usize);
        }
        Ok(refs)
    }

    fn read_object(&self, offset: usize) -> Result<RawNode> {
        let marker = *self
            .bytes
            .get(offset)
            .ok_or(DecodeError::Truncated("object marker"))?;
        let low = marker & 0x0F;

        match marker >> 4 {
            0x0 => Ok(match marker {
                0x08 => RawNode::Bool(false),
                0x09 => RawNode::Bool(true),
                // 0x00 null, 0x0F fill, and anything unassigned
                _ => RawNode::Null,
            }),
            0x1 => {
                let width = 1usize << low;
                if width > 8 {
                    return Err(DecodeError::Malformed("integer too wide".into()));
                }
                let value = read_be_uint(self.bytes, offset + 1, width)?;
                Ok(RawNode::Int(value as i64))
            }
            0x2 => match low {
                0x2 => {
                    let bits = read_be_uint(self.bytes, offset + 1, 4)? as u32;
                    Ok(RawNode::Real(f64::from(f32::from_bits(bits))))
                }
                0x3 => {
                    let bits = read_be_uint(self.bytes, offset + 1, 8)?;
                    Ok(RawNode::Real(f64::from_bits(bits)))
                }
                _ => Err(DecodeError::Malformed("unsupported real width".into())),
            },
            // Dates and raw data carry nothing the extractor reads.
            0x3 | 0x4 => Ok(RawNode::Null),
            0x5 => {
                let (count, data) = self.read_count(offset, low)?;
                let slice = self
                    .bytes
                    .get(data..data + count)
                    .ok_or(DecodeError::Truncated("ascii string"))?;
                Ok(RawNode::Text(String::from_utf8_lossy(slice).into_owned()))
            }
            0x6 => {
                let (count, data) = self.read_count(offset, low)?;
                let slice = self
                    .bytes
                    .get(data..data + count * 2)
                    .ok_or(DecodeError::Truncated("utf16 string"))?;
                let units: Vec<u16> = slice
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                Ok(RawNode::Text(String::from_utf16_lossy(&units)))
            }
            0x7 => {
                let (count, data) = self.read_count(offset, low)?;
                let slice = self
                    .bytes
                    .get(data..data + count)
                    .ok_or(DecodeError::Truncated("utf8 string"))?;
                Ok(RawNode::Text(String::from_utf8_lossy(slice).into_owned()))
            }
            0x8 => {
                let width = low as usize + 1;
                let value = read_be_uint(self.bytes, offset + 1, width)? as usize;
                Ok(RawNode::Uid(value))
            }
            0xA | 0xC => {
                let (count, data) = self.read_count(offset, low)?;
                Ok(RawNode::Array(self.read_refs(data, count)?))
            }
            0xD => {
                let (count, data) = self.read_count(offset, low)?;
                let keys = self.read_refs(data, count)?;
                let values = self.read_refs(data + count * self.ref_size, count)?;
                Ok(RawNode::Dict(keys.into_iter().zip(values).collect()))
            }
            _ => Ok(RawNode::Null),
        }
    }
}

fn raw_text(raw: &[RawNode], index: usize) -> Option<&str> {
    match raw.get(index)? {
        RawNode::Text(s) => Some(s.as_str()),
        _ => None,
    }
}

/// Normalize a raw dict-value or root-pointer node to a graph index.
///
/// Accepts every observed reference shape: a UID object, a bare
/// non-negative integer in reference position, and a `{"CF$UID": n}`
/// wrapper dict. Anything else is not a reference.
fn raw_reference(raw: &[RawNode], index: usize) -> Option<usize> {
    match raw.get(index)? {
        RawNode::Uid(n) => Some(*n),
        RawNode::Int(n) if *n >= 0 => Some(*n as usize),
        RawNode::Dict(entries) => match entries.as_slice() {
            [(key, value)] if raw_text(raw, *key) == Some("CF$UID") => match raw.get(*value) {
                Some(RawNode::Int(n)) if *n >= 0 => Some(*n as usize),
                Some(RawNode::Uid(n)) => Some(*n),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

fn decode_binary(bytes: &[u8]) -> Result<ObjectGraph> {
    if bytes.len() < BINARY_MAGIC.len() + TRAILER_LEN {
        return Err(DecodeError::Truncated("missing trailer"));
    }

    let trailer = &bytes[bytes.len() - TRAILER_LEN..];
    let offset_size = trailer[6] as usize;
    let ref_size = trailer[7] as usize;
    let num_objects = read_be_uint(trailer, 8, 8)? as usize;
    let top_object = read_be_uint(trailer, 16, 8)? as usize;
    let table_offset = read_be_uint(trailer, 24, 8)? as usize;

    if !(1..=8).contains(&offset_size) || !(1..=8).contains(&ref_size) {
        return Err(DecodeError::Malformed("bad trailer field widths".into()));
    }
    if num_objects == 0 || num_objects > MAX_OBJECTS {
        return Err(DecodeError::Malformed("bad object count".into()));
    }

    let reader = BinaryReader { bytes, ref_size };

    // Object offsets, then the raw table itself.
    let mut raw = Vec::with_capacity(num_objects);
    for i in 0..num_objects {
        let offset = read_be_uint(bytes, table_offset + i * offset_size, offset_size)? as usize;
        raw.push(reader.read_object(offset)?);
    }

    // The top object holds the graph array and the root pointer.
    let top_entries = match raw.get(top_object) {
        Some(RawNode::Dict(entries)) => entries.clone(),
        _ => return Err(DecodeError::Malformed("top object is not a dict".into())),
    };

    let mut object_refs = None;
    let mut root = 0usize;
    for (key, value) in &top_entries {
        match raw_text(&raw, *key) {
            Some("$objects") => {
                if let Some(RawNode::Array(refs)) = raw.get(*value) {
                    object_refs = Some(refs.clone());
                }
            }
            Some("$top") => {
                if let Some(RawNode::Dict(entries)) = raw.get(*value) {
                    for (k, v) in entries {
                        if raw_text(&raw, *k) == Some("root") {
                            if let Some(index) = raw_reference(&raw, *v) {
                                root = index;
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }

    let object_refs =
        object_refs.ok_or_else(|| DecodeError::Malformed("missing $objects array".into()))?;

    let objects = object_refs
        .iter()
        .map(|&table_index| normalize_raw(&raw, table_index))
        .collect();

    Ok(ObjectGraph { objects, root })
}

/// Convert one raw table object into a normalized graph node.
fn normalize_raw(raw: &[RawNode], index: usize) -> Node {
    if let Some(reference) = match raw.get(index) {
        Some(RawNode::Uid(n)) => Some(*n),
        Some(RawNode::Dict(_)) => {
            // A dict may itself be a CF$UID wrapper.
            raw_reference(raw, index)
        }
        _ => None,
    } {
        return Node::Reference(reference);
    }

    match raw.get(index) {
        Some(RawNode::Bool(b)) => Node::Scalar(Scalar::Bool(*b)),
        Some(RawNode::Int(n)) => Node::Scalar(Scalar::Number(*n as f64)),
        Some(RawNode::Real(r)) => Node::Scalar(Scalar::Number(*r)),
        Some(RawNode::Text(s)) => Node::Scalar(Scalar::Text(s.clone())),
        Some(RawNode::Dict(entries)) => {
            let mut map = BTreeMap::new();
            for (key, value) in entries {
                let Some(key) = raw_text(raw, *key) else {
                    continue;
                };
                // Dict values are references by construction; entries whose
                // value is not reference-shaped carry nothing resolvable.
                if let Some(reference) = raw_reference(raw, *value) {
                    map.insert(key.to_string(), reference);
                }
            }
            Node::Dict(map)
        }
        // Nulls, nested collections, dangling table indices.
        _ => Node::Scalar(Scalar::Null),
    }
}

// ---------------------------------------------------------------------------
// JSON-bridged form
// ---------------------------------------------------------------------------

/// Normalize a JSON value in reference position to a graph index.
fn json_reference(value: &serde_json::Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return Some(n as usize);
    }
    let object = value.as_object()?;
    if object.len() == 1 {
        object.get("CF$UID")?.as_u64().map(|n| n as usize)
    } else {
        None
    }
}

fn json_node(value: &serde_json::Value) -> Node {
    use serde_json::Value;
    match value {
        Value::String(s) => Node::Scalar(Scalar::Text(s.clone())),
        Value::Number(n) => Node::Scalar(Scalar::Number(n.as_f64().unwrap_or(0.0))),
        Value::Bool(b) => Node::Scalar(Scalar::Bool(*b)),
        Value::Null | Value::Array(_) => Node::Scalar(Scalar::Null),
        Value::Object(map) => {
            if let Some(reference) = json_reference(value) {
                return Node::Reference(reference);
            }
            let mut dict = BTreeMap::new();
            for (key, entry) in map {
                if let Some(reference) = json_reference(entry) {
                    dict.insert(key.clone(), reference);
                }
            }
            Node::Dict(dict)
        }
    }
}

fn decode_json(bytes: &[u8]) -> Result<ObjectGraph> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|_| DecodeError::UnrecognizedFormat)?;
    let top = value
        .as_object()
        .ok_or_else(|| DecodeError::Malformed("top value is not an object".into()))?;

    let objects = top
        .get("$objects")
        .and_then(|v| v.as_array())
        .ok_or_else(|| DecodeError::Malformed("missing $objects array".into()))?;
    if objects.len() > MAX_OBJECTS {
        return Err(DecodeError::Malformed("bad object count".into()));
    }

    let root = top
        .get("$top")
        .and_then(|t| t.as_object())
        .and_then(|t| t.get("root"))
        .and_then(json_reference)
        .unwrap_or(0);

    Ok(ObjectGraph {
        objects: objects.iter().map(json_node).collect(),
        root,
    })
}
