/* Base-128 varint and zigzag primitives */

use std::io::{Read, Write};

use crate::error::{WireError, WireResult};

/// A 64-bit varint never spans more than 10 bytes.
const MAX_VARINT_BYTES: usize = 10;

/// Read a single byte, distinguishing clean end-of-stream (`Ok(None)`)
/// from an I/O failure.
pub(crate) fn try_read_byte<R: Read + ?Sized>(reader: &mut R) -> WireResult<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(WireError::Io(err)),
        }
    }
}

fn read_byte<R: Read + ?Sized>(reader: &mut R, context: &'static str) -> WireResult<u8> {
    try_read_byte(reader)?.ok_or(WireError::UnexpectedEof { context })
}

/// Read an unsigned base-128 varint. End-of-stream anywhere inside the
/// value, including before the first byte, is an error; callers that need
/// to treat exhaustion as loop termination go through [`crate::read_key`].
pub fn read_varint<R: Read + ?Sized>(reader: &mut R) -> WireResult<u64> {
    let first = read_byte(reader, "varint")?;
    read_varint_after(reader, first)
}

/// Continue a varint whose first byte was already consumed.
pub(crate) fn read_varint_after<R: Read + ?Sized>(reader: &mut R, first: u8) -> WireResult<u64> {
    let mut value = (first & 0x7f) as u64;
    if first & 0x80 == 0 {
        return Ok(value);
    }
    let mut shift = 7u32;
    for _ in 1..MAX_VARINT_BYTES {
        let byte = read_byte(reader, "varint")?;
        value |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
    Err(WireError::VarintTooLong)
}

/// Write an unsigned base-128 varint, 7 value bits per byte, high bit set
/// on every byte except the last.
pub fn write_varint<W: Write + ?Sized>(writer: &mut W, mut value: u64) -> WireResult<()> {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        writer.write_all(&[byte])?;
        if value == 0 {
            return Ok(());
        }
    }
}

/// Map a signed 32-bit value onto the unsigned range so small magnitudes
/// stay small under varint encoding.
pub fn zigzag_encode32(value: i32) -> u32 {
    ((value as u32) << 1) ^ ((value >> 31) as u32)
}

pub fn zigzag_decode32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

pub fn zigzag_encode64(value: i64) -> u64 {
    ((value as u64) << 1) ^ ((value >> 63) as u64)
}

pub fn zigzag_decode64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn encode(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(&mut out, value).expect("write succeeds");
        out
    }

    fn decode(bytes: &[u8]) -> WireResult<u64> {
        read_varint(&mut Cursor::new(bytes))
    }

    #[test]
    fn known_varint_encodings() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(1), vec![0x01]);
        assert_eq!(encode(127), vec![0x7f]);
        assert_eq!(encode(128), vec![0x80, 0x01]);
        assert_eq!(encode(300), vec![0xac, 0x02]);
        assert_eq!(encode(u64::MAX).len(), 10);
    }

    #[test]
    fn eof_inside_varint_is_an_error() {
        let result = decode(&[0x80]);
        assert!(matches!(result, Err(WireError::UnexpectedEof { .. })));
    }

    #[test]
    fn eleven_byte_varint_is_rejected() {
        let bytes = [0x80u8; 11];
        let result = decode(&bytes);
        assert!(matches!(result, Err(WireError::VarintTooLong)));
    }

    #[test]
    fn zigzag_keeps_small_magnitudes_small() {
        assert_eq!(zigzag_encode32(0), 0);
        assert_eq!(zigzag_encode32(-1), 1);
        assert_eq!(zigzag_encode32(1), 2);
        assert_eq!(zigzag_encode32(-2), 3);
        assert_eq!(zigzag_encode64(i64::MIN), u64::MAX);
        assert_eq!(zigzag_decode32(zigzag_encode32(i32::MIN)), i32::MIN);
        assert_eq!(zigzag_decode32(zigzag_encode32(i32::MAX)), i32::MAX);
        assert_eq!(zigzag_decode64(zigzag_encode64(i64::MAX)), i64::MAX);
    }

    #[test]
    fn matches_prost_varint_encoding() {
        for value in [0u64, 1, 127, 128, 300, 16384, u32::MAX as u64, u64::MAX] {
            let ours = encode(value);
            let mut theirs = Vec::new();
            prost::encoding::encode_varint(value, &mut theirs);
            assert_eq!(ours, theirs, "encoding of {value} diverges from prost");

            let decoded =
                prost::encoding::decode_varint(&mut ours.as_slice()).expect("prost decodes ours");
            assert_eq!(decoded, value);
        }
    }

    proptest! {
        #[test]
        fn varint_round_trips(value in any::<u64>()) {
            let bytes = encode(value);
            prop_assert!(bytes.len() <= 10);
            prop_assert_eq!(decode(&bytes).expect("decode succeeds"), value);
        }

        #[test]
        fn zigzag32_round_trips(value in any::<i32>()) {
            prop_assert_eq!(zigzag_decode32(zigzag_encode32(value)), value);
        }

        #[test]
        fn zigzag64_round_trips(value in any::<i64>()) {
            prop_assert_eq!(zigzag_decode64(zigzag_encode64(value)), value);
        }
    }
}
