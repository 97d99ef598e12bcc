/* Field keys: the (field number, wire type) pair preceding every value */

use std::io::{Read, Write};

use crate::error::{WireError, WireResult};
use crate::fixed::{read_fixed32, read_fixed64};
use crate::varint::{read_varint, read_varint_after, try_read_byte, write_varint};

/// Wire representation categories. The numeric values are the on-wire
/// tag bits; 3 and 4 (the retired group markers) are outside the modeled
/// feature set and surface as [`WireError::UnsupportedWireType`] when a
/// skip encounters them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    pub fn from_raw(raw: u8) -> Option<WireType> {
        match raw {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    pub fn raw(self) -> u8 {
        self as u8
    }
}

/// A decoded field key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub field: u32,
    /// Raw wire-type bits as read from the stream. Kept raw so unknown
    /// fields with unrecognized wire types can be reported from the skip
    /// path instead of failing the key read.
    pub wire: u8,
}

impl Key {
    pub fn wire_type(&self) -> Option<WireType> {
        WireType::from_raw(self.wire)
    }
}

/// Read one field key. Clean stream exhaustion before the first byte is
/// the normal end of a message and returns `Ok(None)`; exhaustion inside
/// the key varint is an error.
pub fn read_key<R: Read + ?Sized>(reader: &mut R) -> WireResult<Option<Key>> {
    let first = match try_read_byte(reader)? {
        Some(byte) => byte,
        None => return Ok(None),
    };
    let raw = read_varint_after(reader, first)?;
    Ok(Some(Key {
        field: (raw >> 3) as u32,
        wire: (raw & 0x7) as u8,
    }))
}

pub fn write_key<W: Write + ?Sized>(writer: &mut W, field: u32, wire: WireType) -> WireResult<()> {
    write_varint(writer, ((field as u64) << 3) | wire.raw() as u64)
}

/// Skip the payload of an unknown field, keyed only on its wire type.
pub fn skip<R: Read + ?Sized>(reader: &mut R, wire: u8) -> WireResult<()> {
    match WireType::from_raw(wire) {
        Some(WireType::Varint) => {
            read_varint(reader)?;
        }
        Some(WireType::Fixed64) => {
            read_fixed64(reader)?;
        }
        Some(WireType::Fixed32) => {
            read_fixed32(reader)?;
        }
        Some(WireType::LengthDelimited) => {
            let len = read_varint(reader)?;
            let copied = std::io::copy(&mut reader.take(len), &mut std::io::sink())?;
            if copied < len {
                return Err(WireError::UnexpectedEof {
                    context: "skipped length-delimited payload",
                });
            }
        }
        None => return Err(WireError::UnsupportedWireType { wire }),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn key_round_trips() {
        let mut buf = Vec::new();
        write_key(&mut buf, 1, WireType::Varint).expect("write succeeds");
        write_key(&mut buf, 19, WireType::LengthDelimited).expect("write succeeds");
        write_key(&mut buf, 1000, WireType::Fixed32).expect("write succeeds");

        let mut cursor = Cursor::new(buf);
        let first = read_key(&mut cursor).expect("read succeeds").expect("key");
        assert_eq!((first.field, first.wire_type()), (1, Some(WireType::Varint)));
        let second = read_key(&mut cursor).expect("read succeeds").expect("key");
        assert_eq!(
            (second.field, second.wire_type()),
            (19, Some(WireType::LengthDelimited))
        );
        let third = read_key(&mut cursor).expect("read succeeds").expect("key");
        assert_eq!(
            (third.field, third.wire_type()),
            (1000, Some(WireType::Fixed32))
        );
        assert!(read_key(&mut cursor).expect("read succeeds").is_none());
    }

    #[test]
    fn clean_exhaustion_reads_no_key() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(read_key(&mut cursor).expect("read succeeds").is_none());
    }

    #[test]
    fn skip_consumes_each_wire_shape() {
        let mut buf = Vec::new();
        crate::write_varint(&mut buf, 777).expect("write succeeds");
        buf.extend_from_slice(&1u64.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        crate::write_length_delimited(&mut buf, b"payload").expect("write succeeds");
        buf.push(0x2a); // trailing marker

        let mut cursor = Cursor::new(buf);
        skip(&mut cursor, WireType::Varint.raw()).expect("skips varint");
        skip(&mut cursor, WireType::Fixed64.raw()).expect("skips fixed64");
        skip(&mut cursor, WireType::Fixed32.raw()).expect("skips fixed32");
        skip(&mut cursor, WireType::LengthDelimited.raw()).expect("skips delimited");
        assert_eq!(crate::read_varint(&mut cursor).expect("marker"), 0x2a);
    }

    #[test]
    fn skip_rejects_group_wire_types() {
        let mut cursor = Cursor::new(vec![0u8; 8]);
        let result = skip(&mut cursor, 3);
        assert!(matches!(
            result,
            Err(WireError::UnsupportedWireType { wire: 3 })
        ));
    }

    #[test]
    fn skip_detects_truncated_delimited_payload() {
        let mut buf = Vec::new();
        crate::write_varint(&mut buf, 16).expect("write succeeds");
        buf.extend_from_slice(&[0u8; 4]); // 12 bytes short
        let result = skip(&mut Cursor::new(buf), WireType::LengthDelimited.raw());
        assert!(matches!(result, Err(WireError::UnexpectedEof { .. })));
    }
}
