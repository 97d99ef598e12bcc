/* Fixed-width little-endian values */

use std::io::{Read, Write};

use crate::error::{WireError, WireResult};

/// `read_exact` with end-of-stream mapped onto the wire error space.
pub(crate) fn read_full<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    context: &'static str,
) -> WireResult<()> {
    reader.read_exact(buf).map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            WireError::UnexpectedEof { context }
        } else {
            WireError::Io(err)
        }
    })
}

pub fn read_fixed32<R: Read + ?Sized>(reader: &mut R) -> WireResult<u32> {
    let mut buf = [0u8; 4];
    read_full(reader, &mut buf, "fixed32")?;
    Ok(u32::from_le_bytes(buf))
}

pub fn read_fixed64<R: Read + ?Sized>(reader: &mut R) -> WireResult<u64> {
    let mut buf = [0u8; 8];
    read_full(reader, &mut buf, "fixed64")?;
    Ok(u64::from_le_bytes(buf))
}

pub fn write_fixed32<W: Write + ?Sized>(writer: &mut W, value: u32) -> WireResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_fixed64<W: Write + ?Sized>(writer: &mut W, value: u64) -> WireResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}
