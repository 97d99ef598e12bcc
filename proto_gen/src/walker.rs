/* Whole-schema traversal and the compiled artifact set */

use std::collections::HashMap;
use std::io::{Read, Write};

use proto_types::{EnumId, MessageId, Schema};
use tracing::debug;

use crate::assembler::{MessageAssembler, MessageCodec};
use crate::errors::{CompileResult, DecodeError, EncodeError};
use crate::hooks::Hook;
use crate::value::{FieldSlot, MessageValue, Value};

/// Enum constant group captured from the schema, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumArtifact {
    pub id: EnumId,
    pub name: String,
    pub qualified_name: String,
    pub members: Vec<(String, i32)>,
}

/// One compiled output, in schema declaration order.
#[derive(Debug)]
pub enum Artifact {
    /// Index into the compiled codec list.
    Message { codec: usize },
    Enum(EnumArtifact),
}

/// Compiler knobs. Kept deliberately small; the walker itself has no
/// other state.
#[derive(Clone, Debug, Default)]
pub struct CompilerConfig {
    /// Emit a trace event per compiled field plan.
    pub trace_fields: bool,
}

/// Drives one pass over the schema tree: every top-level message goes
/// through the assembler (which recurses into nested definitions), and
/// the produced artifacts are aggregated in declaration order. Sibling
/// subtrees compile independently; nothing is mutated in place.
pub struct SchemaWalker<'a> {
    schema: &'a Schema,
    config: CompilerConfig,
}

impl<'a> SchemaWalker<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self::with_config(schema, CompilerConfig::default())
    }

    pub fn with_config(schema: &'a Schema, config: CompilerConfig) -> Self {
        Self { schema, config }
    }

    pub fn walk(&self) -> CompileResult<(Vec<MessageCodec>, Vec<Artifact>)> {
        let assembler =
            MessageAssembler::with_field_tracing(self.schema, self.config.trace_fields);
        let mut codecs = Vec::new();
        let mut artifacts = Vec::new();
        for &root in &self.schema.roots {
            assembler.assemble_into(root, &mut codecs, &mut artifacts)?;
        }
        for &enum_id in &self.schema.root_enums {
            artifacts.push(Artifact::Enum(assembler.enum_artifact(enum_id)?));
        }
        debug!(
            messages = codecs.len(),
            artifacts = artifacts.len(),
            "schema walk complete"
        );
        Ok((codecs, artifacts))
    }
}

/// Compile a resolved schema into its codec artifact set.
pub fn compile(schema: Schema) -> CompileResult<CompiledSchema> {
    compile_with_config(schema, CompilerConfig::default())
}

pub fn compile_with_config(
    schema: Schema,
    config: CompilerConfig,
) -> CompileResult<CompiledSchema> {
    let (codecs, artifacts) = SchemaWalker::with_config(&schema, config).walk()?;
    let mut by_message = HashMap::new();
    let mut by_qualified = HashMap::new();
    for (index, codec) in codecs.iter().enumerate() {
        by_message.insert(codec.message, index);
        by_qualified.insert(codec.qualified_name.clone(), index);
    }
    Ok(CompiledSchema {
        schema,
        codecs,
        artifacts,
        by_message,
        by_qualified,
    })
}

/// The full output of one compilation pass: the owned schema plus every
/// message codec and enum group, with lookup maps over both.
#[derive(Debug)]
pub struct CompiledSchema {
    schema: Schema,
    codecs: Vec<MessageCodec>,
    artifacts: Vec<Artifact>,
    by_message: HashMap<MessageId, usize>,
    by_qualified: HashMap<String, usize>,
}

impl CompiledSchema {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn codecs(&self) -> &[MessageCodec] {
        &self.codecs
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn codec(&self, id: MessageId) -> Option<&MessageCodec> {
        self.by_message.get(&id).map(|&index| &self.codecs[index])
    }

    pub fn codec_mut(&mut self, id: MessageId) -> Option<&mut MessageCodec> {
        let index = *self.by_message.get(&id)?;
        self.codecs.get_mut(index)
    }

    /// Look up a codec by fully-qualified name, falling back to a unique
    /// simple name.
    pub fn codec_by_name(&self, name: &str) -> Option<&MessageCodec> {
        if let Some(&index) = self.by_qualified.get(name) {
            return Some(&self.codecs[index]);
        }
        self.codecs.iter().find(|codec| codec.name == name)
    }

    pub fn codec_by_name_mut(&mut self, name: &str) -> Option<&mut MessageCodec> {
        if let Some(&index) = self.by_qualified.get(name) {
            return self.codecs.get_mut(index);
        }
        let index = self.codecs.iter().position(|codec| codec.name == name)?;
        self.codecs.get_mut(index)
    }

    pub fn new_instance(&self, id: MessageId) -> Option<MessageValue> {
        self.codec(id).map(MessageCodec::new_instance)
    }

    pub fn new_instance_by_name(&self, name: &str) -> Option<MessageValue> {
        self.codec_by_name(name).map(MessageCodec::new_instance)
    }

    fn codec_for_encode(&self, instance: &MessageValue) -> Result<&MessageCodec, EncodeError> {
        self.codec(instance.message).ok_or(EncodeError::MissingCodec {
            index: instance.message.0,
        })
    }

    pub fn serialize<W: Write + ?Sized>(
        &self,
        instance: &mut MessageValue,
        out: &mut W,
    ) -> Result<(), EncodeError> {
        self.codec_for_encode(instance)?.serialize(self, instance, out)
    }

    pub fn serialize_to_vec(&self, instance: &mut MessageValue) -> Result<Vec<u8>, EncodeError> {
        self.codec_for_encode(instance)?.serialize_to_vec(self, instance)
    }

    pub fn deserialize(&self, id: MessageId, bytes: &[u8]) -> Result<MessageValue, DecodeError> {
        self.codec(id)
            .ok_or(DecodeError::MissingCodec { index: id.0 })?
            .deserialize(self, bytes)
    }

    pub fn deserialize_from<R: Read + ?Sized>(
        &self,
        id: MessageId,
        reader: &mut R,
        existing: Option<MessageValue>,
    ) -> Result<MessageValue, DecodeError> {
        self.codec(id)
            .ok_or(DecodeError::MissingCodec { index: id.0 })?
            .deserialize_from(self, reader, existing)
    }

    pub fn merge_from_slice(
        &self,
        bytes: &[u8],
        instance: MessageValue,
    ) -> Result<MessageValue, DecodeError> {
        self.codec(instance.message)
            .ok_or(DecodeError::MissingCodec {
                index: instance.message.0,
            })?
            .merge_from_slice(self, bytes, instance)
    }

    pub fn set_pre_encode(&mut self, id: MessageId, hook: Hook) -> CompileResult<()> {
        match self.codec_mut(id) {
            Some(codec) => codec.set_pre_encode(hook),
            None => Err(crate::errors::CompileError::DanglingMessageRef { index: id.0 }),
        }
    }

    pub fn set_post_decode(&mut self, id: MessageId, hook: Hook) -> CompileResult<()> {
        match self.codec_mut(id) {
            Some(codec) => codec.set_post_decode(hook),
            None => Err(crate::errors::CompileError::DanglingMessageRef { index: id.0 }),
        }
    }

    fn slot_mut<'i>(
        &self,
        instance: &'i mut MessageValue,
        name: &str,
    ) -> Result<&'i mut FieldSlot, EncodeError> {
        let codec = self.codec_for_encode(instance)?;
        let message = codec.qualified_name.clone();
        let index = codec
            .field_index(name)
            .ok_or_else(|| EncodeError::UnknownField {
                message: message.clone(),
                field: name.to_string(),
            })?;
        instance
            .slot_mut(index)
            .ok_or(EncodeError::InstanceShapeMismatch { message })
    }

    /// Borrow a field slot by declared name.
    pub fn field<'i>(&self, instance: &'i MessageValue, name: &str) -> Option<&'i FieldSlot> {
        let codec = self.codec(instance.message)?;
        instance.slot(codec.field_index(name)?)
    }

    /// Store a singular field value.
    pub fn set_field(
        &self,
        instance: &mut MessageValue,
        name: &str,
        value: Value,
    ) -> Result<(), EncodeError> {
        let message = self.codec_for_encode(instance)?.qualified_name.clone();
        let slot = self.slot_mut(instance, name)?;
        match slot {
            FieldSlot::Single(stored) => {
                *stored = Some(value);
                Ok(())
            }
            FieldSlot::Repeated(_) => Err(EncodeError::ValueKindMismatch {
                message,
                field: name.to_string(),
                expected: "a singular field",
            }),
        }
    }

    /// Clear a singular field back to the absent state.
    pub fn clear_field(&self, instance: &mut MessageValue, name: &str) -> Result<(), EncodeError> {
        let slot = self.slot_mut(instance, name)?;
        match slot {
            FieldSlot::Single(stored) => {
                *stored = None;
                Ok(())
            }
            FieldSlot::Repeated(values) => {
                values.clear();
                Ok(())
            }
        }
    }

    /// Append an element to a repeated field.
    pub fn push_field(
        &self,
        instance: &mut MessageValue,
        name: &str,
        value: Value,
    ) -> Result<(), EncodeError> {
        let message = self.codec_for_encode(instance)?.qualified_name.clone();
        let slot = self.slot_mut(instance, name)?;
        match slot {
            FieldSlot::Repeated(values) => {
                values.push(value);
                Ok(())
            }
            FieldSlot::Single(_) => Err(EncodeError::ValueKindMismatch {
                message,
                field: name.to_string(),
                expected: "a repeated field",
            }),
        }
    }
}
