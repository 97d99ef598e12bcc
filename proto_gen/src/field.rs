/* Per-field wire behavior: the encode/decode mapping table */

use std::io::{Cursor, Read, Write};

use proto_types::{ProtoType, Rule};
use proto_wire::{
    read_fixed32, read_fixed64, read_length_delimited, read_string, read_varint, write_fixed32,
    write_fixed64, write_key, write_length_delimited, write_string, write_varint, zigzag_decode32,
    zigzag_decode64, zigzag_encode32, zigzag_encode64, WireType,
};

use crate::errors::{DecodeError, EncodeError};
use crate::value::{FieldSlot, Value};
use crate::walker::CompiledSchema;

/// Compiled encode/decode plan for one declared field.
#[derive(Debug, Clone)]
pub struct FieldCodec {
    /// Slot position inside the owning message, equal to declaration
    /// order.
    pub index: usize,
    pub name: String,
    pub tag: u32,
    pub proto_type: ProtoType,
    pub rule: Rule,
    pub wire_type: WireType,
    pub packed: bool,
    pub deprecated: bool,
    /// Omission baseline for optional enum fields: the explicit default
    /// member when declared, otherwise the enum's first member.
    pub enum_default: Option<i32>,
    /// Resolved display name of the stored type.
    pub type_name: String,
    pub(crate) owner: String,
}

impl FieldCodec {
    fn kind_mismatch(&self, expected: &'static str) -> EncodeError {
        EncodeError::ValueKindMismatch {
            message: self.owner.clone(),
            field: self.name.clone(),
            expected,
        }
    }

    fn shape_mismatch(&self) -> DecodeError {
        DecodeError::InstanceShapeMismatch {
            message: self.owner.clone(),
        }
    }

    /// Encode this field from its slot, applying the rule-specific
    /// wrapping around the raw value encoding.
    pub fn encode<W: Write + ?Sized>(
        &self,
        ctx: &CompiledSchema,
        slot: &mut FieldSlot,
        out: &mut W,
    ) -> Result<(), EncodeError> {
        match self.rule {
            Rule::Repeated => self.encode_repeated(ctx, slot, out),
            Rule::Optional => self.encode_optional(ctx, slot, out),
            Rule::Required => self.encode_required(ctx, slot, out),
        }
    }

    fn encode_repeated<W: Write + ?Sized>(
        &self,
        ctx: &CompiledSchema,
        slot: &mut FieldSlot,
        out: &mut W,
    ) -> Result<(), EncodeError> {
        let values = match slot {
            FieldSlot::Repeated(values) => values,
            FieldSlot::Single(_) => return Err(self.kind_mismatch("a repeated slot")),
        };
        if self.packed {
            // One key, then a single block of back-to-back raw element
            // encodings. An empty list still writes the key and a
            // zero-length block.
            write_key(out, self.tag, WireType::LengthDelimited).map_err(EncodeError::Wire)?;
            let mut block = Vec::new();
            for value in values.iter_mut() {
                self.encode_value(ctx, value, &mut block)?;
            }
            write_length_delimited(out, &block).map_err(EncodeError::Wire)?;
        } else {
            for value in values.iter_mut() {
                write_key(out, self.tag, self.wire_type).map_err(EncodeError::Wire)?;
                self.encode_value(ctx, value, out)?;
            }
        }
        Ok(())
    }

    fn encode_optional<W: Write + ?Sized>(
        &self,
        ctx: &CompiledSchema,
        slot: &mut FieldSlot,
        out: &mut W,
    ) -> Result<(), EncodeError> {
        match self.proto_type {
            // Reference types are omitted entirely when absent.
            ProtoType::String | ProtoType::Bytes | ProtoType::Message(_) => {
                let value = match slot {
                    FieldSlot::Single(Some(value)) => value,
                    FieldSlot::Single(None) => return Ok(()),
                    FieldSlot::Repeated(_) => return Err(self.kind_mismatch("a singular slot")),
                };
                write_key(out, self.tag, self.wire_type).map_err(EncodeError::Wire)?;
                self.encode_value(ctx, value, out)
            }
            // Enum fields are omitted at their default member.
            ProtoType::Enum(_) => {
                let value = match slot {
                    FieldSlot::Single(Some(value)) => value,
                    FieldSlot::Single(None) => return Ok(()),
                    FieldSlot::Repeated(_) => return Err(self.kind_mismatch("a singular slot")),
                };
                if let (Value::Enum(current), Some(default)) = (&*value, self.enum_default) {
                    if *current == default {
                        return Ok(());
                    }
                }
                write_key(out, self.tag, self.wire_type).map_err(EncodeError::Wire)?;
                self.encode_value(ctx, value, out)
            }
            // Every other optional field is emitted unconditionally,
            // default value or not.
            _ => self.encode_present(ctx, slot, out),
        }
    }

    fn encode_required<W: Write + ?Sized>(
        &self,
        ctx: &CompiledSchema,
        slot: &mut FieldSlot,
        out: &mut W,
    ) -> Result<(), EncodeError> {
        if let (
            ProtoType::String | ProtoType::Bytes | ProtoType::Message(_),
            FieldSlot::Single(None),
        ) = (&self.proto_type, &*slot)
        {
            // Checked before the key is written so the failed field
            // contributes zero output bytes.
            return Err(EncodeError::RequiredFieldMissing {
                message: self.owner.clone(),
                field: self.name.clone(),
            });
        }
        self.encode_present(ctx, slot, out)
    }

    fn encode_present<W: Write + ?Sized>(
        &self,
        ctx: &CompiledSchema,
        slot: &mut FieldSlot,
        out: &mut W,
    ) -> Result<(), EncodeError> {
        let value = match slot {
            FieldSlot::Single(Some(value)) => value,
            FieldSlot::Single(None) => return Err(self.kind_mismatch("a present value")),
            FieldSlot::Repeated(_) => return Err(self.kind_mismatch("a singular slot")),
        };
        write_key(out, self.tag, self.wire_type).map_err(EncodeError::Wire)?;
        self.encode_value(ctx, value, out)
    }

    /// Encode one raw value with no key, per the wire table. Sub-messages
    /// are serialized into a scratch buffer first so their byte length can
    /// prefix the payload.
    fn encode_value<W: Write + ?Sized>(
        &self,
        ctx: &CompiledSchema,
        value: &mut Value,
        out: &mut W,
    ) -> Result<(), EncodeError> {
        match self.proto_type {
            ProtoType::Double => match value {
                Value::Double(v) => write_fixed64(out, v.to_bits()).map_err(EncodeError::Wire),
                _ => Err(self.kind_mismatch("double")),
            },
            ProtoType::Float => match value {
                Value::Float(v) => write_fixed32(out, v.to_bits()).map_err(EncodeError::Wire),
                _ => Err(self.kind_mismatch("float")),
            },
            ProtoType::Int32 => match value {
                // Sign-extended to 64 bits, so negatives take the full
                // ten-byte varint form.
                Value::Int32(v) => {
                    write_varint(out, *v as i64 as u64).map_err(EncodeError::Wire)
                }
                _ => Err(self.kind_mismatch("int32")),
            },
            ProtoType::Int64 => match value {
                Value::Int64(v) => write_varint(out, *v as u64).map_err(EncodeError::Wire),
                _ => Err(self.kind_mismatch("int64")),
            },
            ProtoType::Uint32 => match value {
                Value::Uint32(v) => write_varint(out, *v as u64).map_err(EncodeError::Wire),
                _ => Err(self.kind_mismatch("uint32")),
            },
            ProtoType::Uint64 => match value {
                Value::Uint64(v) => write_varint(out, *v).map_err(EncodeError::Wire),
                _ => Err(self.kind_mismatch("uint64")),
            },
            ProtoType::Sint32 => match value {
                Value::Sint32(v) => {
                    write_varint(out, zigzag_encode32(*v) as u64).map_err(EncodeError::Wire)
                }
                _ => Err(self.kind_mismatch("sint32")),
            },
            ProtoType::Sint64 => match value {
                Value::Sint64(v) => {
                    write_varint(out, zigzag_encode64(*v)).map_err(EncodeError::Wire)
                }
                _ => Err(self.kind_mismatch("sint64")),
            },
            ProtoType::Fixed32 => match value {
                Value::Fixed32(v) => write_fixed32(out, *v).map_err(EncodeError::Wire),
                _ => Err(self.kind_mismatch("fixed32")),
            },
            ProtoType::Fixed64 => match value {
                Value::Fixed64(v) => write_fixed64(out, *v).map_err(EncodeError::Wire),
                _ => Err(self.kind_mismatch("fixed64")),
            },
            ProtoType::Sfixed32 => match value {
                Value::Sfixed32(v) => write_fixed32(out, *v as u32).map_err(EncodeError::Wire),
                _ => Err(self.kind_mismatch("sfixed32")),
            },
            ProtoType::Sfixed64 => match value {
                Value::Sfixed64(v) => write_fixed64(out, *v as u64).map_err(EncodeError::Wire),
                _ => Err(self.kind_mismatch("sfixed64")),
            },
            ProtoType::Bool => match value {
                Value::Bool(v) => write_varint(out, u64::from(*v)).map_err(EncodeError::Wire),
                _ => Err(self.kind_mismatch("bool")),
            },
            ProtoType::String => match value {
                Value::String(v) => write_string(out, v).map_err(EncodeError::Wire),
                _ => Err(self.kind_mismatch("string")),
            },
            ProtoType::Bytes => match value {
                Value::Bytes(v) => write_length_delimited(out, v).map_err(EncodeError::Wire),
                _ => Err(self.kind_mismatch("bytes")),
            },
            ProtoType::Enum(_) => match value {
                // Member values travel as the 32-bit pattern, like the
                // other 32-bit varint casts.
                Value::Enum(v) => {
                    write_varint(out, *v as u32 as u64).map_err(EncodeError::Wire)
                }
                _ => Err(self.kind_mismatch("enum")),
            },
            ProtoType::Message(id) => match value {
                Value::Message(instance) => {
                    let codec = ctx
                        .codec(id)
                        .ok_or(EncodeError::MissingCodec { index: id.0 })?;
                    let mut scratch = Vec::new();
                    codec.serialize(ctx, instance, &mut scratch)?;
                    write_length_delimited(out, &scratch).map_err(EncodeError::Wire)
                }
                _ => Err(self.kind_mismatch("message")),
            },
        }
    }

    /// Decode one occurrence of this field from the stream, appending to
    /// repeated slots and overwriting (or merging, for sub-messages)
    /// singular slots.
    pub fn decode_into<R: Read + ?Sized>(
        &self,
        ctx: &CompiledSchema,
        slot: &mut FieldSlot,
        reader: &mut R,
    ) -> Result<(), DecodeError> {
        match self.rule {
            Rule::Repeated => {
                let values = match slot {
                    FieldSlot::Repeated(values) => values,
                    FieldSlot::Single(_) => return Err(self.shape_mismatch()),
                };
                if self.packed {
                    let block = read_length_delimited(reader).map_err(DecodeError::Wire)?;
                    let len = block.len() as u64;
                    let mut cursor = Cursor::new(block);
                    while cursor.position() < len {
                        values.push(self.decode_value(ctx, &mut cursor)?);
                    }
                } else {
                    values.push(self.decode_value(ctx, reader)?);
                }
                Ok(())
            }
            Rule::Required | Rule::Optional => {
                let stored = match slot {
                    FieldSlot::Single(stored) => stored,
                    FieldSlot::Repeated(_) => return Err(self.shape_mismatch()),
                };
                if let ProtoType::Message(id) = self.proto_type {
                    // Merge into the existing sub-message when one is
                    // already present; otherwise decode a fresh instance.
                    let existing = match stored.take() {
                        Some(Value::Message(instance)) => Some(instance),
                        _ => None,
                    };
                    let codec = ctx
                        .codec(id)
                        .ok_or(DecodeError::MissingCodec { index: id.0 })?;
                    let payload = read_length_delimited(reader).map_err(DecodeError::Wire)?;
                    let decoded =
                        codec.deserialize_from(ctx, &mut Cursor::new(payload), existing)?;
                    *stored = Some(Value::Message(decoded));
                } else {
                    *stored = Some(self.decode_value(ctx, reader)?);
                }
                Ok(())
            }
        }
    }

    /// Decode one raw value with no key, per the wire table. Repeated
    /// sub-message elements always decode into a fresh instance.
    fn decode_value<R: Read + ?Sized>(
        &self,
        ctx: &CompiledSchema,
        reader: &mut R,
    ) -> Result<Value, DecodeError> {
        let value = match self.proto_type {
            ProtoType::Double => Value::Double(f64::from_bits(read_fixed64(reader)?)),
            ProtoType::Float => Value::Float(f32::from_bits(read_fixed32(reader)?)),
            ProtoType::Int32 => Value::Int32(read_varint(reader)? as i32),
            ProtoType::Int64 => Value::Int64(read_varint(reader)? as i64),
            ProtoType::Uint32 => Value::Uint32(read_varint(reader)? as u32),
            ProtoType::Uint64 => Value::Uint64(read_varint(reader)?),
            ProtoType::Sint32 => Value::Sint32(zigzag_decode32(read_varint(reader)? as u32)),
            ProtoType::Sint64 => Value::Sint64(zigzag_decode64(read_varint(reader)?)),
            ProtoType::Fixed32 => Value::Fixed32(read_fixed32(reader)?),
            ProtoType::Fixed64 => Value::Fixed64(read_fixed64(reader)?),
            ProtoType::Sfixed32 => Value::Sfixed32(read_fixed32(reader)? as i32),
            ProtoType::Sfixed64 => Value::Sfixed64(read_fixed64(reader)? as i64),
            ProtoType::Bool => Value::Bool(read_varint(reader)? != 0),
            ProtoType::String => Value::String(read_string(reader)?),
            ProtoType::Bytes => Value::Bytes(read_length_delimited(reader)?),
            ProtoType::Enum(_) => Value::Enum(read_varint(reader)? as u32 as i32),
            ProtoType::Message(id) => {
                let codec = ctx
                    .codec(id)
                    .ok_or(DecodeError::MissingCodec { index: id.0 })?;
                let payload = read_length_delimited(reader).map_err(DecodeError::Wire)?;
                Value::Message(codec.deserialize_from(ctx, &mut Cursor::new(payload), None)?)
            }
        };
        Ok(value)
    }
}
