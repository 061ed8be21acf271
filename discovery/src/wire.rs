//! Protobuf wire codec for Bazel's `FlagCollection` message.
//!
//! `bazel help flags-as-proto` prints a base64 `FlagCollection`. The
//! messages are defined in Bazel's `src/main/protobuf/bazel_flags.proto`;
//! field numbers below mirror that file as of Bazel 7:
//!
//! ```text
//! message FlagCollection { repeated FlagInfo flag_infos = 1; }
//! message FlagInfo {
//!   required string name = 1;
//!   optional bool has_negative_flag = 2;
//!   optional string documentation = 3;
//!   repeated string commands = 4;
//!   optional string abbreviation = 5;
//!   optional bool allows_multiple = 6;
//!   ...
//! }
//! ```
//!
//! Only the fields above are read; any other field is skipped by wire type,
//! so newer Bazel releases that add fields still decode.

use aspect_flags_core::FlagDescriptor;
use thiserror::Error;
use tracing::warn;

const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_LEN: u8 = 2;
const WIRE_FIXED32: u8 = 5;

const COLLECTION_FLAG_INFOS: u32 = 1;

const INFO_NAME: u32 = 1;
const INFO_HAS_NEGATIVE_FLAG: u32 = 2;
const INFO_DOCUMENTATION: u32 = 3;
const INFO_COMMANDS: u32 = 4;
const INFO_ABBREVIATION: u32 = 5;
const INFO_ALLOWS_MULTIPLE: u32 = 6;

/// Malformed protobuf input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("message truncated at byte {0}")]
    Truncated(usize),
    #[error("varint longer than 10 bytes at byte {0}")]
    VarintOverflow(usize),
    #[error("unsupported wire type {wire_type} at byte {offset}")]
    UnsupportedWireType { wire_type: u8, offset: usize },
    #[error("field {field} is not valid UTF-8")]
    InvalidUtf8 { field: u32 },
    #[error("FlagInfo without a name")]
    MissingName,
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn is_done(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn varint(&mut self) -> Result<u64, WireError> {
        let start = self.pos;
        let mut value = 0u64;
        for shift in (0..70).step_by(7) {
            let byte = *self.buf.get(self.pos).ok_or(WireError::Truncated(self.pos))?;
            self.pos += 1;
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(WireError::VarintOverflow(start))
    }

    fn key(&mut self) -> Result<(u32, u8), WireError> {
        let key = self.varint()?;
        Ok(((key >> 3) as u32, (key & 0x7) as u8))
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or(WireError::Truncated(self.buf.len()))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn len_delimited(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.varint()?;
        let len = usize::try_from(len).map_err(|_| WireError::Truncated(self.pos))?;
        self.take(len)
    }

    fn string(&mut self, field: u32) -> Result<String, WireError> {
        let bytes = self.len_delimited()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| WireError::InvalidUtf8 { field })
    }

    fn skip(&mut self, wire_type: u8) -> Result<(), WireError> {
        match wire_type {
            WIRE_VARINT => self.varint().map(drop),
            WIRE_FIXED64 => self.take(8).map(drop),
            WIRE_LEN => self.len_delimited().map(drop),
            WIRE_FIXED32 => self.take(4).map(drop),
            other => Err(WireError::UnsupportedWireType {
                wire_type: other,
                offset: self.pos,
            }),
        }
    }
}

/// Decodes a serialized `FlagCollection` into descriptors, in message order.
pub fn decode_flag_collection(bytes: &[u8]) -> Result<Vec<FlagDescriptor>, WireError> {
    let mut reader = Reader::new(bytes);
    let mut flags = Vec::new();
    while !reader.is_done() {
        let (field, wire_type) = reader.key()?;
        if field == COLLECTION_FLAG_INFOS && wire_type == WIRE_LEN {
            flags.push(decode_flag_info(reader.len_delimited()?)?);
        } else {
            reader.skip(wire_type)?;
        }
    }
    Ok(flags)
}

fn decode_flag_info(bytes: &[u8]) -> Result<FlagDescriptor, WireError> {
    let mut reader = Reader::new(bytes);
    let mut name = None;
    let mut flag = FlagDescriptor::default();

    while !reader.is_done() {
        let (field, wire_type) = reader.key()?;
        match (field, wire_type) {
            (INFO_NAME, WIRE_LEN) => name = Some(reader.string(field)?),
            (INFO_HAS_NEGATIVE_FLAG, WIRE_VARINT) => flag.has_negative_flag = reader.varint()? != 0,
            (INFO_DOCUMENTATION, WIRE_LEN) => flag.documentation = reader.string(field)?,
            (INFO_COMMANDS, WIRE_LEN) => {
                flag.commands.insert(reader.string(field)?);
            }
            (INFO_ABBREVIATION, WIRE_LEN) => {
                let raw = reader.string(field)?;
                let mut chars = raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => flag.abbreviation = Some(c),
                    (None, _) => {}
                    _ => warn!(abbreviation = %raw, "Ignoring multi-character flag abbreviation"),
                }
            }
            (INFO_ALLOWS_MULTIPLE, WIRE_VARINT) => flag.allows_multiple = reader.varint()? != 0,
            _ => reader.skip(wire_type)?,
        }
    }

    flag.name = name.ok_or(WireError::MissingName)?;
    Ok(flag)
}

/// Encodes descriptors as a `FlagCollection`.
///
/// Inverse of [`decode_flag_collection`] for the fields it reads. Used to
/// write schema fixtures that look like real Bazel output.
pub fn encode_flag_collection(flags: &[FlagDescriptor]) -> Vec<u8> {
    let mut out = Vec::new();
    for flag in flags {
        let info = encode_flag_info(flag);
        put_key(&mut out, COLLECTION_FLAG_INFOS, WIRE_LEN);
        put_bytes(&mut out, &info);
    }
    out
}

fn encode_flag_info(flag: &FlagDescriptor) -> Vec<u8> {
    let mut out = Vec::new();
    put_key(&mut out, INFO_NAME, WIRE_LEN);
    put_bytes(&mut out, flag.name.as_bytes());
    if flag.has_negative_flag {
        put_key(&mut out, INFO_HAS_NEGATIVE_FLAG, WIRE_VARINT);
        put_varint(&mut out, 1);
    }
    if !flag.documentation.is_empty() {
        put_key(&mut out, INFO_DOCUMENTATION, WIRE_LEN);
        put_bytes(&mut out, flag.documentation.as_bytes());
    }
    for command in &flag.commands {
        put_key(&mut out, INFO_COMMANDS, WIRE_LEN);
        put_bytes(&mut out, command.as_bytes());
    }
    if let Some(abbreviation) = flag.abbreviation {
        put_key(&mut out, INFO_ABBREVIATION, WIRE_LEN);
        put_bytes(&mut out, abbreviation.to_string().as_bytes());
    }
    if flag.allows_multiple {
        put_key(&mut out, INFO_ALLOWS_MULTIPLE, WIRE_VARINT);
        put_varint(&mut out, 1);
    }
    out
}

fn put_key(out: &mut Vec<u8>, field: u32, wire_type: u8) {
    put_varint(out, (u64::from(field) << 3) | u64::from(wire_type));
}

fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    put_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

fn put_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}
