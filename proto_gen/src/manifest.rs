//! Serializable description of a compiled artifact set.
//!
//! The manifest is what the CLI writes after a compile: one entry per
//! message codec and enum group, in schema declaration order, with the
//! per-field wire plans spelled out. Consumers that package or inspect
//! compiled codecs read this instead of the in-memory artifact types.

use indexmap::IndexMap;
use proto_types::Rule;
use proto_wire::{WireType, WIRE_RUNTIME_VERSION};
use serde_derive::{Deserialize, Serialize};

use crate::walker::{Artifact, CompiledSchema};

/// Schema version of the serialized manifest layout.
pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecManifest {
    /// Mirrors [`MANIFEST_VERSION`].
    pub version: u32,
    /// Wire runtime surface the codecs were compiled against.
    pub wire_runtime: u32,
    pub messages: Vec<MessageManifest>,
    pub enums: Vec<EnumManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageManifest {
    pub name: String,
    pub qualified_name: String,
    /// Whether lifecycle hook seams were compiled in.
    pub hooks: bool,
    pub fields: Vec<FieldManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldManifest {
    pub name: String,
    pub tag: u32,
    pub rule: String,
    pub wire: String,
    pub stored_type: String,
    #[serde(default)]
    pub packed: bool,
    #[serde(default)]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumManifest {
    pub name: String,
    pub qualified_name: String,
    pub members: IndexMap<String, i32>,
}

fn rule_label(rule: Rule) -> &'static str {
    match rule {
        Rule::Required => "required",
        Rule::Optional => "optional",
        Rule::Repeated => "repeated",
    }
}

fn wire_label(wire: WireType) -> &'static str {
    match wire {
        WireType::Varint => "varint",
        WireType::Fixed64 => "fixed64",
        WireType::LengthDelimited => "length-delimited",
        WireType::Fixed32 => "fixed32",
    }
}

impl CodecManifest {
    /// Capture a compiled schema, preserving artifact declaration order.
    pub fn from_compiled(compiled: &CompiledSchema) -> Self {
        let mut messages = Vec::new();
        let mut enums = Vec::new();
        for artifact in compiled.artifacts() {
            match artifact {
                Artifact::Message { codec } => {
                    let codec = &compiled.codecs()[*codec];
                    messages.push(MessageManifest {
                        name: codec.name.clone(),
                        qualified_name: codec.qualified_name.clone(),
                        hooks: codec.hooks_compiled(),
                        fields: codec
                            .fields
                            .iter()
                            .map(|field| FieldManifest {
                                name: field.name.clone(),
                                tag: field.tag,
                                rule: rule_label(field.rule).to_string(),
                                wire: wire_label(field.wire_type).to_string(),
                                stored_type: field.type_name.clone(),
                                packed: field.packed,
                                deprecated: field.deprecated,
                            })
                            .collect(),
                    });
                }
                Artifact::Enum(group) => {
                    enums.push(EnumManifest {
                        name: group.name.clone(),
                        qualified_name: group.qualified_name.clone(),
                        members: group.members.iter().cloned().collect(),
                    });
                }
            }
        }
        Self {
            version: MANIFEST_VERSION,
            wire_runtime: WIRE_RUNTIME_VERSION,
            messages,
            enums,
        }
    }
}
