/* Dynamic instances operated on by compiled codecs */

use proto_types::MessageId;

/// One concrete field value. The variant set mirrors the schema's type
/// set one-to-one so codecs can check that a slot holds what the field
/// declares.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Double(f64),
    Float(f32),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Sint32(i32),
    Sint64(i64),
    Fixed32(u32),
    Fixed64(u64),
    Sfixed32(i32),
    Sfixed64(i64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    /// Raw member value of the target enum.
    Enum(i32),
    Message(MessageValue),
}

impl Value {
    /// Short kind label used in error reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Double(_) => "double",
            Value::Float(_) => "float",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Uint32(_) => "uint32",
            Value::Uint64(_) => "uint64",
            Value::Sint32(_) => "sint32",
            Value::Sint64(_) => "sint64",
            Value::Fixed32(_) => "fixed32",
            Value::Fixed64(_) => "fixed64",
            Value::Sfixed32(_) => "sfixed32",
            Value::Sfixed64(_) => "sfixed64",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::Message(_) => "message",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&MessageValue> {
        match self {
            Value::Message(message) => Some(message),
            _ => None,
        }
    }

    pub fn as_message_mut(&mut self) -> Option<&mut MessageValue> {
        match self {
            Value::Message(message) => Some(message),
            _ => None,
        }
    }

    /// Widen any integral variant to i64, when it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) | Value::Sint32(v) | Value::Sfixed32(v) | Value::Enum(v) => {
                Some(*v as i64)
            }
            Value::Int64(v) | Value::Sint64(v) | Value::Sfixed64(v) => Some(*v),
            Value::Uint32(v) | Value::Fixed32(v) => Some(*v as i64),
            Value::Uint64(v) | Value::Fixed64(v) => i64::try_from(*v).ok(),
            Value::Bool(v) => Some(*v as i64),
            _ => None,
        }
    }
}

/// Storage for one declared field of an instance. Repeated fields are an
/// ordered, always-present sequence; singular string/bytes/message fields
/// may be absent.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSlot {
    Single(Option<Value>),
    Repeated(Vec<Value>),
}

impl FieldSlot {
    pub fn value(&self) -> Option<&Value> {
        match self {
            FieldSlot::Single(value) => value.as_ref(),
            FieldSlot::Repeated(_) => None,
        }
    }

    pub fn values(&self) -> Option<&[Value]> {
        match self {
            FieldSlot::Repeated(values) => Some(values),
            FieldSlot::Single(_) => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldSlot::Single(None))
    }
}

/// A dynamic message instance: one slot per declared field, in schema
/// declaration order, tagged with the arena id of its message type.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageValue {
    pub message: MessageId,
    pub slots: Vec<FieldSlot>,
}

impl MessageValue {
    pub fn new(message: MessageId, slots: Vec<FieldSlot>) -> Self {
        Self { message, slots }
    }

    pub fn slot(&self, index: usize) -> Option<&FieldSlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut FieldSlot> {
        self.slots.get_mut(index)
    }
}
