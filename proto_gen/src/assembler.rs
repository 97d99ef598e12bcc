/* Per-message codec assembly */

use std::collections::HashMap;
use std::io::{Cursor, Read, Write};

use proto_types::{DefaultValue, FieldDef, MessageId, ProtoType, Rule, Schema};
use proto_wire::{read_key, skip};
use tracing::{debug, trace};

use crate::errors::{CompileError, CompileResult, DecodeError, EncodeError};
use crate::field::FieldCodec;
use crate::hooks::{Hook, HookSet};
use crate::resolver::TypeResolver;
use crate::value::{FieldSlot, MessageValue, Value};
use crate::walker::{Artifact, CompiledSchema, EnumArtifact};

/// The compiled artifact for one message: its field plans, the default
/// instance template, tag dispatch for the decode loop and the optional
/// lifecycle hook seams.
#[derive(Debug)]
pub struct MessageCodec {
    pub message: MessageId,
    pub name: String,
    pub qualified_name: String,
    /// Field plans in declaration order; encode walks this order, never
    /// tag order.
    pub fields: Vec<FieldCodec>,
    by_tag: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
    template: Vec<FieldSlot>,
    hooks: Option<HookSet>,
}

impl MessageCodec {
    /// Build a default-initialized instance: repeated fields as empty
    /// sequences, declared and implicit defaults applied, everything else
    /// in its natural zero/absent state.
    pub fn new_instance(&self) -> MessageValue {
        MessageValue::new(self.message, self.template.clone())
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Whether hook seams were compiled for this message.
    pub fn hooks_compiled(&self) -> bool {
        self.hooks.is_some()
    }

    pub fn set_pre_encode(&mut self, hook: Hook) -> CompileResult<()> {
        match &mut self.hooks {
            Some(seams) => {
                seams.pre_encode = Some(hook);
                Ok(())
            }
            None => Err(CompileError::HooksNotCompiled {
                message: self.qualified_name.clone(),
            }),
        }
    }

    pub fn set_post_decode(&mut self, hook: Hook) -> CompileResult<()> {
        match &mut self.hooks {
            Some(seams) => {
                seams.post_decode = Some(hook);
                Ok(())
            }
            None => Err(CompileError::HooksNotCompiled {
                message: self.qualified_name.clone(),
            }),
        }
    }

    /// Serialize an instance to a stream. The pre-encode hook runs first
    /// when seams are compiled, then every field in declaration order
    /// applies its rule-specific wrapping.
    pub fn serialize<W: Write + ?Sized>(
        &self,
        ctx: &CompiledSchema,
        instance: &mut MessageValue,
        out: &mut W,
    ) -> Result<(), EncodeError> {
        if let Some(seams) = &self.hooks {
            seams.run_pre_encode(instance);
        }
        for field in &self.fields {
            let slot = instance
                .slot_mut(field.index)
                .ok_or_else(|| EncodeError::InstanceShapeMismatch {
                    message: self.qualified_name.clone(),
                })?;
            field.encode(ctx, slot, out)?;
        }
        Ok(())
    }

    pub fn serialize_to_vec(
        &self,
        ctx: &CompiledSchema,
        instance: &mut MessageValue,
    ) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        self.serialize(ctx, instance, &mut out)?;
        Ok(out)
    }

    pub fn deserialize(&self, ctx: &CompiledSchema, bytes: &[u8]) -> Result<MessageValue, DecodeError> {
        self.deserialize_from(ctx, &mut Cursor::new(bytes), None)
    }

    /// Decode from a stream, optionally merging into an existing
    /// instance. Clean key exhaustion ends the loop successfully; a zero
    /// field id is a malformed stream; unknown fields are skipped by wire
    /// type alone.
    pub fn deserialize_from<R: Read + ?Sized>(
        &self,
        ctx: &CompiledSchema,
        reader: &mut R,
        existing: Option<MessageValue>,
    ) -> Result<MessageValue, DecodeError> {
        let mut instance = existing.unwrap_or_else(|| self.new_instance());
        loop {
            let key = match read_key(reader)? {
                Some(key) => key,
                None => break,
            };
            if key.field == 0 {
                return Err(DecodeError::ZeroFieldId {
                    message: self.qualified_name.clone(),
                });
            }
            match self.by_tag.get(&key.field) {
                Some(&index) => {
                    let field = &self.fields[index];
                    let slot = instance.slot_mut(index).ok_or_else(|| {
                        DecodeError::InstanceShapeMismatch {
                            message: self.qualified_name.clone(),
                        }
                    })?;
                    field.decode_into(ctx, slot, reader)?;
                }
                None => skip(reader, key.wire)?,
            }
        }
        if let Some(seams) = &self.hooks {
            seams.run_post_decode(&mut instance);
        }
        Ok(instance)
    }

    /// Merge the encoding in `bytes` into an existing instance.
    pub fn merge_from_slice(
        &self,
        ctx: &CompiledSchema,
        bytes: &[u8],
        instance: MessageValue,
    ) -> Result<MessageValue, DecodeError> {
        self.deserialize_from(ctx, &mut Cursor::new(bytes), Some(instance))
    }
}

/// Builds message codecs from schema nodes, recursing through nested
/// definitions.
pub struct MessageAssembler<'a> {
    schema: &'a Schema,
    resolver: TypeResolver<'a>,
    trace_fields: bool,
}

impl<'a> MessageAssembler<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self::with_field_tracing(schema, false)
    }

    pub fn with_field_tracing(schema: &'a Schema, trace_fields: bool) -> Self {
        Self {
            schema,
            resolver: TypeResolver::new(schema),
            trace_fields,
        }
    }

    /// Assemble the codec for `id` and every definition nested beneath
    /// it, appending artifacts in declaration order.
    pub fn assemble_into(
        &self,
        id: MessageId,
        codecs: &mut Vec<MessageCodec>,
        artifacts: &mut Vec<Artifact>,
    ) -> CompileResult<()> {
        let def = self
            .schema
            .message(id)
            .ok_or(CompileError::DanglingMessageRef { index: id.0 })?;
        let codec = self.build_codec(id)?;
        debug!(
            name = %codec.qualified_name,
            fields = codec.fields.len(),
            hooks = codec.hooks_compiled(),
            "assembled message codec"
        );
        artifacts.push(Artifact::Message {
            codec: codecs.len(),
        });
        codecs.push(codec);

        for &enum_id in &def.nested_enums {
            artifacts.push(Artifact::Enum(self.enum_artifact(enum_id)?));
        }
        for &nested in &def.nested_messages {
            self.assemble_into(nested, codecs, artifacts)?;
        }
        Ok(())
    }

    /// Capture an enum's member table verbatim as a constant-group
    /// artifact.
    pub fn enum_artifact(&self, id: proto_types::EnumId) -> CompileResult<EnumArtifact> {
        let def = self
            .schema
            .enum_def(id)
            .ok_or(CompileError::DanglingEnumRef { index: id.0 })?;
        Ok(EnumArtifact {
            id,
            name: def.name.clone(),
            qualified_name: self.resolver.enum_name(id)?,
            members: def
                .members
                .iter()
                .map(|(name, value)| (name.clone(), *value))
                .collect(),
        })
    }

    fn build_codec(&self, id: MessageId) -> CompileResult<MessageCodec> {
        let def = self
            .schema
            .message(id)
            .ok_or(CompileError::DanglingMessageRef { index: id.0 })?;
        let qualified_name = self.resolver.message_name(id)?;

        let mut fields = Vec::with_capacity(def.fields.len());
        let mut template = Vec::with_capacity(def.fields.len());
        let mut by_tag = HashMap::new();
        let mut by_name = HashMap::new();
        for (index, field) in def.fields.iter().enumerate() {
            let (codec, slot) = self.build_field(&qualified_name, index, field)?;
            if self.trace_fields {
                trace!(
                    owner = %qualified_name,
                    field = %codec.name,
                    tag = codec.tag,
                    wire = ?codec.wire_type,
                    stored = %codec.type_name,
                    "compiled field plan"
                );
            }
            by_tag.insert(codec.tag, index);
            by_name.insert(codec.name.clone(), index);
            fields.push(codec);
            template.push(slot);
        }

        Ok(MessageCodec {
            message: id,
            name: def.name.clone(),
            qualified_name,
            fields,
            by_tag,
            by_name,
            template,
            hooks: def.hooks_enabled().then(HookSet::default),
        })
    }

    fn build_field(
        &self,
        owner: &str,
        index: usize,
        field: &FieldDef,
    ) -> CompileResult<(FieldCodec, FieldSlot)> {
        let enum_default = self.enum_default(owner, field)?;
        let slot = self.template_slot(owner, field, enum_default)?;
        let codec = FieldCodec {
            index,
            name: field.name.clone(),
            tag: field.tag,
            proto_type: field.proto_type,
            rule: field.rule,
            wire_type: field.proto_type.wire_type(),
            packed: field.packed,
            deprecated: field.deprecated,
            enum_default,
            type_name: self.resolver.field_type_name(field)?,
            owner: owner.to_string(),
        };
        Ok((codec, slot))
    }

    /// Resolve the default member for an enum field: the declared default
    /// when present, otherwise the first member of the target enum.
    fn enum_default(&self, owner: &str, field: &FieldDef) -> CompileResult<Option<i32>> {
        let ProtoType::Enum(enum_id) = field.proto_type else {
            return Ok(None);
        };
        let target = self
            .schema
            .enum_def(enum_id)
            .ok_or(CompileError::DanglingEnumRef { index: enum_id.0 })?;
        match &field.default {
            Some(DefaultValue::EnumMember(member)) => match target.member_value(member) {
                Some(value) => Ok(Some(value)),
                None => Err(CompileError::UnknownDefaultMember {
                    message: owner.to_string(),
                    field: field.name.clone(),
                    member: member.clone(),
                }),
            },
            Some(DefaultValue::Int(value)) => Ok(Some(*value as i32)),
            Some(DefaultValue::Uint(value)) => Ok(Some(*value as i32)),
            Some(_) => Err(CompileError::InvalidDefault {
                message: owner.to_string(),
                field: field.name.clone(),
            }),
            None => Ok(target.default_member_value()),
        }
    }

    /// Compile the construction-time state of one field slot.
    fn template_slot(
        &self,
        owner: &str,
        field: &FieldDef,
        enum_default: Option<i32>,
    ) -> CompileResult<FieldSlot> {
        if field.rule == Rule::Repeated {
            return Ok(FieldSlot::Repeated(Vec::new()));
        }
        let initial = match field.proto_type {
            ProtoType::Enum(_) => match (field.default.is_some(), field.rule) {
                // Optional enum fields default to the first-declared
                // member even without an explicit default.
                (true, _) | (false, Rule::Optional) => {
                    Some(Value::Enum(enum_default.unwrap_or(0)))
                }
                _ => Some(Value::Enum(0)),
            },
            ProtoType::String => match &field.default {
                Some(DefaultValue::Str(text)) => Some(Value::String(text.clone())),
                Some(_) => {
                    return Err(CompileError::InvalidDefault {
                        message: owner.to_string(),
                        field: field.name.clone(),
                    })
                }
                // Optional strings start present-but-empty.
                None if field.rule == Rule::Optional => Some(Value::String(String::new())),
                None => None,
            },
            ProtoType::Bytes => match &field.default {
                Some(DefaultValue::Bytes(bytes)) => Some(Value::Bytes(bytes.clone())),
                Some(DefaultValue::Str(text)) => Some(Value::Bytes(text.clone().into_bytes())),
                Some(_) => {
                    return Err(CompileError::InvalidDefault {
                        message: owner.to_string(),
                        field: field.name.clone(),
                    })
                }
                None => None,
            },
            ProtoType::Message(_) => None,
            _ => match &field.default {
                Some(default) => Some(scalar_default(owner, field, default)?),
                None => Some(zero_value(field.proto_type)),
            },
        };
        Ok(FieldSlot::Single(initial))
    }
}

fn default_int(default: &DefaultValue) -> Option<i64> {
    match default {
        DefaultValue::Int(value) => Some(*value),
        DefaultValue::Uint(value) => Some(*value as i64),
        _ => None,
    }
}

fn default_float(default: &DefaultValue) -> Option<f64> {
    match default {
        DefaultValue::Float(value) => Some(*value),
        DefaultValue::Int(value) => Some(*value as f64),
        DefaultValue::Uint(value) => Some(*value as f64),
        _ => None,
    }
}

fn scalar_default(
    owner: &str,
    field: &FieldDef,
    default: &DefaultValue,
) -> CompileResult<Value> {
    let invalid = || CompileError::InvalidDefault {
        message: owner.to_string(),
        field: field.name.clone(),
    };
    let value = match field.proto_type {
        ProtoType::Double => Value::Double(default_float(default).ok_or_else(invalid)?),
        ProtoType::Float => Value::Float(default_float(default).ok_or_else(invalid)? as f32),
        ProtoType::Int32 => Value::Int32(default_int(default).ok_or_else(invalid)? as i32),
        ProtoType::Int64 => Value::Int64(default_int(default).ok_or_else(invalid)?),
        ProtoType::Uint32 => Value::Uint32(default_int(default).ok_or_else(invalid)? as u32),
        ProtoType::Uint64 => Value::Uint64(default_int(default).ok_or_else(invalid)? as u64),
        ProtoType::Sint32 => Value::Sint32(default_int(default).ok_or_else(invalid)? as i32),
        ProtoType::Sint64 => Value::Sint64(default_int(default).ok_or_else(invalid)?),
        ProtoType::Fixed32 => Value::Fixed32(default_int(default).ok_or_else(invalid)? as u32),
        ProtoType::Fixed64 => Value::Fixed64(default_int(default).ok_or_else(invalid)? as u64),
        ProtoType::Sfixed32 => Value::Sfixed32(default_int(default).ok_or_else(invalid)? as i32),
        ProtoType::Sfixed64 => Value::Sfixed64(default_int(default).ok_or_else(invalid)?),
        ProtoType::Bool => match default {
            DefaultValue::Bool(value) => Value::Bool(*value),
            _ => return Err(invalid()),
        },
        _ => return Err(invalid()),
    };
    Ok(value)
}

fn zero_value(proto_type: ProtoType) -> Value {
    match proto_type {
        ProtoType::Double => Value::Double(0.0),
        ProtoType::Float => Value::Float(0.0),
        ProtoType::Int32 => Value::Int32(0),
        ProtoType::Int64 => Value::Int64(0),
        ProtoType::Uint32 => Value::Uint32(0),
        ProtoType::Uint64 => Value::Uint64(0),
        ProtoType::Sint32 => Value::Sint32(0),
        ProtoType::Sint64 => Value::Sint64(0),
        ProtoType::Fixed32 => Value::Fixed32(0),
        ProtoType::Fixed64 => Value::Fixed64(0),
        ProtoType::Sfixed32 => Value::Sfixed32(0),
        ProtoType::Sfixed64 => Value::Sfixed64(0),
        ProtoType::Bool => Value::Bool(false),
        // Reference types have no zero scalar; their natural state is
        // absence and is handled by the caller.
        ProtoType::String | ProtoType::Bytes | ProtoType::Enum(_) | ProtoType::Message(_) => {
            Value::Int32(0)
        }
    }
}
