/* Fully-qualified type and field naming */

use proto_types::{EnumId, FieldDef, MessageId, ProtoType, Rule, Schema};

use crate::errors::{CompileError, CompileResult};

/// Resolves arena nodes to fully-qualified display names.
///
/// The qualified name of a node is built from its own ancestor chain, so a
/// field referencing a type in a different branch of the tree never leaks
/// the referencing message's namespace into the name. A namespace override
/// on a message re-roots the path at that message: segments above it are
/// subsumed by the override. Without any override the schema's root
/// default namespace prefixes the full chain.
pub struct TypeResolver<'a> {
    schema: &'a Schema,
}

impl<'a> TypeResolver<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Fully-qualified name of a message definition.
    pub fn message_name(&self, id: MessageId) -> CompileResult<String> {
        let def = self
            .schema
            .message(id)
            .ok_or(CompileError::DanglingMessageRef { index: id.0 })?;
        self.qualify(&def.name, def.namespace_override(), def.parent)
    }

    /// Fully-qualified name of an enum definition. Enums carry no options
    /// of their own, so the namespace walk starts at the enclosing
    /// message.
    pub fn enum_name(&self, id: EnumId) -> CompileResult<String> {
        let def = self
            .schema
            .enum_def(id)
            .ok_or(CompileError::DanglingEnumRef { index: id.0 })?;
        self.qualify(&def.name, None, def.parent)
    }

    fn qualify(
        &self,
        leaf: &str,
        leaf_namespace: Option<&str>,
        parent: Option<MessageId>,
    ) -> CompileResult<String> {
        let mut segments = vec![leaf.to_string()];
        let mut namespace = leaf_namespace.map(str::to_string);
        let mut cursor = parent;
        while namespace.is_none() {
            let Some(id) = cursor else { break };
            let ancestor = self
                .schema
                .message(id)
                .ok_or(CompileError::DanglingMessageRef { index: id.0 })?;
            segments.push(ancestor.name.clone());
            namespace = ancestor.namespace_override().map(str::to_string);
            cursor = ancestor.parent;
        }
        segments.reverse();
        let path = segments.join(".");
        let namespace =
            namespace.or_else(|| self.schema.default_namespace().map(str::to_string));
        Ok(match namespace {
            Some(ns) if !ns.is_empty() => format!("{ns}.{path}"),
            _ => path,
        })
    }

    /// Display name of the type stored for a field. Repeated fields wrap
    /// the element name in `Vec<...>`; the element name itself is never
    /// shortened.
    pub fn field_type_name(&self, field: &FieldDef) -> CompileResult<String> {
        let element = self.element_type_name(field)?;
        Ok(match field.rule {
            Rule::Repeated => format!("Vec<{element}>"),
            _ => element,
        })
    }

    fn element_type_name(&self, field: &FieldDef) -> CompileResult<String> {
        Ok(match field.proto_type {
            ProtoType::Double => "f64".to_string(),
            ProtoType::Float => "f32".to_string(),
            ProtoType::Int32 | ProtoType::Sint32 | ProtoType::Sfixed32 => "i32".to_string(),
            ProtoType::Int64 | ProtoType::Sint64 | ProtoType::Sfixed64 => "i64".to_string(),
            ProtoType::Uint32 | ProtoType::Fixed32 => "u32".to_string(),
            ProtoType::Uint64 | ProtoType::Fixed64 => "u64".to_string(),
            ProtoType::Bool => "bool".to_string(),
            ProtoType::String => "String".to_string(),
            ProtoType::Bytes => "Vec<u8>".to_string(),
            ProtoType::Enum(id) => self.enum_name(id)?,
            ProtoType::Message(id) => self.message_name(id)?,
        })
    }
}
