use proto_wire::WireType;
use serde_derive::{Deserialize, Serialize};

use crate::schema::{EnumId, MessageId};

/// Scalar and composite field types of the modeled schema dialect.
///
/// The `Enum` and `Message` variants carry the arena id of the target
/// definition. The reference is non-owning and may point back at the
/// enclosing message, so self-referential and mutually-recursive message
/// types need no special casing.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum ProtoType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    Enum(EnumId),
    Message(MessageId),
}

impl ProtoType {
    /// Wire representation for this type. This is a pure function of the
    /// type; the schema never stores a wire type separately.
    pub fn wire_type(&self) -> WireType {
        match self {
            ProtoType::Int32
            | ProtoType::Int64
            | ProtoType::Uint32
            | ProtoType::Uint64
            | ProtoType::Sint32
            | ProtoType::Sint64
            | ProtoType::Bool
            | ProtoType::Enum(_) => WireType::Varint,
            ProtoType::Fixed64 | ProtoType::Sfixed64 | ProtoType::Double => WireType::Fixed64,
            ProtoType::Fixed32 | ProtoType::Sfixed32 | ProtoType::Float => WireType::Fixed32,
            ProtoType::String | ProtoType::Bytes | ProtoType::Message(_) => {
                WireType::LengthDelimited
            }
        }
    }

    /// Whether a repeated field of this type may be declared packed.
    /// Length-delimited payloads (strings, bytes, sub-messages) cannot be
    /// packed; everything else can.
    pub fn packable(&self) -> bool {
        !matches!(
            self,
            ProtoType::String | ProtoType::Bytes | ProtoType::Message(_)
        )
    }
}

/// Field cardinality and presence rule.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    Required,
    Optional,
    Repeated,
}

/// Typed default value attached to a field declaration.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Name of an enum member; resolved against the field's target enum.
    EnumMember(String),
}
