//! Wire-format support runtime.
//!
//! Low-level read/write primitives for the protobuf binary wire format:
//! base-128 varints, zigzag mapping, field keys, fixed-width values and
//! length-delimited framing, all over `std::io::Read`/`Write`. Every
//! compiled codec depends on this one crate instead of carrying its own
//! copy of these routines.

pub mod delimited;
pub mod error;
pub mod fixed;
pub mod key;
pub mod varint;

pub use delimited::{read_length_delimited, read_string, write_length_delimited, write_string};
pub use error::{WireError, WireResult};
pub use fixed::{read_fixed32, read_fixed64, write_fixed32, write_fixed64};
pub use key::{read_key, skip, write_key, Key, WireType};
pub use varint::{
    read_varint, write_varint, zigzag_decode32, zigzag_decode64, zigzag_encode32, zigzag_encode64,
};

/// Version of the wire runtime surface consumed by compiled codecs.
pub const WIRE_RUNTIME_VERSION: u32 = 1;
