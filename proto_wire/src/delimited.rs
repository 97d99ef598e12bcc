/* Length-delimited framing: a length varint followed by raw payload bytes */

use std::io::{Read, Write};

use crate::error::WireResult;
use crate::fixed::read_full;
use crate::varint::{read_varint, write_varint};

/// Read one length-delimited payload. A declared length that exceeds the
/// remaining input is a fatal error.
pub fn read_length_delimited<R: Read + ?Sized>(reader: &mut R) -> WireResult<Vec<u8>> {
    let len = read_varint(reader)? as usize;
    let mut payload = vec![0u8; len];
    read_full(reader, &mut payload, "length-delimited payload")?;
    Ok(payload)
}

pub fn write_length_delimited<W: Write + ?Sized>(writer: &mut W, payload: &[u8]) -> WireResult<()> {
    write_varint(writer, payload.len() as u64)?;
    writer.write_all(payload)?;
    Ok(())
}

/// Read a length-delimited payload and decode it as UTF-8 text.
pub fn read_string<R: Read + ?Sized>(reader: &mut R) -> WireResult<String> {
    let payload = read_length_delimited(reader)?;
    Ok(String::from_utf8(payload)?)
}

pub fn write_string<W: Write + ?Sized>(writer: &mut W, text: &str) -> WireResult<()> {
    write_length_delimited(writer, text.as_bytes())
}
